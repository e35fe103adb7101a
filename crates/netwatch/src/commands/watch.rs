//! `netwatch watch`: follow the live feed, one line per state change.
//!
//! Runs until Ctrl-C, until the store goes away, or until the server
//! rejects the session.

use serde::Serialize;
use tracing::info;

use netwatch_core::{
    CoreError, Dashboard, DashboardState, DevicePartition, StatusSummary, UpdateSource,
};

use super::{CommandContext, status};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct WatchFrame {
    revision: u64,
    source: Option<UpdateSource>,
    status: Option<StatusSummary>,
    partition: Option<DevicePartition>,
}

impl WatchFrame {
    fn from_state(state: &DashboardState) -> Self {
        Self {
            revision: state.meta.revision,
            source: state.meta.source,
            status: state.status_summary(),
            partition: state.device_partition(),
        }
    }
}

fn frame_line(state: &DashboardState, color: bool) -> String {
    let time = state
        .meta
        .updated_at
        .map_or_else(
            || "--:--:--".into(),
            |at| at.with_timezone(&chrono::Local).format("%H:%M:%S").to_string(),
        );
    let source = state
        .meta
        .source
        .map_or_else(String::new, |s| format!(" [{s}]"));

    let Some(summary) = state.status_summary() else {
        return output::paint_dim(&format!("{time}  status unavailable{source}"), color);
    };

    format!(
        "{time}  {:<7}  down {:>12}  up {:>12}  devices {}{}",
        output::paint_state(summary.label, summary.is_online, color),
        summary.download,
        summary.upload,
        status::partition_line(state.device_partition()),
        output::paint_dim(&source, color),
    )
}

fn render_frame(state: &DashboardState, format: OutputFormat, color: bool) -> Result<String, CliError> {
    let frame = WatchFrame::from_state(state);
    match format {
        OutputFormat::Table => Ok(frame_line(state, color)),
        // One document per line so the output can be piped.
        OutputFormat::Json | OutputFormat::JsonCompact => output::render_json(&frame, true),
        OutputFormat::Yaml => Ok(format!("---\n{}", output::render_yaml(&frame)?)),
        OutputFormat::Plain => Ok(frame
            .status
            .map_or_else(|| "Unknown".to_owned(), |s| s.label.to_owned())),
    }
}

pub async fn handle(ctx: &CommandContext, global: &GlobalOpts) -> Result<(), CliError> {
    let dashboard = Dashboard::new(ctx.config.clone(), ctx.session.clone())?;
    dashboard.activate().await?;
    info!(url = %ctx.config.url, live = ctx.config.live_enabled, "watching");

    let color = output::should_color(global.color);
    let mut stream = dashboard.subscribe();
    output::print_output(
        &render_frame(stream.current(), global.output, color)?,
        global.quiet,
    );

    let interrupted = tokio::signal::ctrl_c();
    let invalidated = ctx.session.invalidated();
    tokio::pin!(interrupted, invalidated);

    let result = loop {
        tokio::select! {
            _ = &mut interrupted => {
                info!("interrupted, stopping");
                break Ok(());
            }
            () = &mut invalidated => break Err(CoreError::SessionInvalid.into()),
            next = stream.changed() => {
                let Some(state) = next else {
                    break Ok(());
                };
                if state.is_ready() {
                    match render_frame(&state, global.output, color) {
                        Ok(line) => output::print_output(&line, global.quiet),
                        Err(e) => break Err(e),
                    }
                }
            }
        }
    };

    dashboard.deactivate().await;
    result
}
