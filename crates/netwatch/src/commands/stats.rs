//! `netwatch stats`: the traffic history as a chronological series.

use tabled::Tabled;

use netwatch_core::{TimeSeriesPoint, fmt_speed};

use super::{CommandContext, util};
use crate::cli::{GlobalOpts, StatsArgs};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct StatRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Download")]
    download: String,
    #[tabled(rename = "Upload")]
    upload: String,
    #[tabled(rename = "Devices")]
    devices: u32,
}

fn stat_row(point: &TimeSeriesPoint) -> StatRow {
    StatRow {
        time: point.label.clone(),
        download: fmt_speed(point.download),
        upload: fmt_speed(point.upload),
        devices: point.devices,
    }
}

/// Keep the `limit` most recent points, still oldest first.
fn most_recent(mut points: Vec<TimeSeriesPoint>, limit: Option<usize>) -> Vec<TimeSeriesPoint> {
    if let Some(limit) = limit {
        let skip = points.len().saturating_sub(limit);
        points.drain(..skip);
    }
    points
}

pub async fn handle(
    ctx: &CommandContext,
    args: &StatsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let state = util::snapshot(ctx).await?;
    let points = most_recent(state.time_series(), args.limit);

    let out = output::render_list(global.output, &points, stat_row, |p| {
        p.timestamp.to_rfc3339()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
