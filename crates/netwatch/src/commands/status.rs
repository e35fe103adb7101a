//! `netwatch status`: headline figures, device partition and device table.

use serde::Serialize;

use netwatch_core::{Device, DevicePartition, StatusSummary};

use super::{CommandContext, devices, util};
use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct StatusView<'a> {
    #[serde(flatten)]
    summary: StatusSummary,
    partition: Option<DevicePartition>,
    devices: &'a [Device],
}

fn detail(view: &StatusView<'_>, color: bool) -> String {
    let summary = &view.summary;
    let mut lines = vec![
        format!(
            "Network:   {}",
            output::paint_state(summary.label, summary.is_online, color)
        ),
        format!("Download:  {}", summary.download),
        format!("Upload:    {}", summary.upload),
        format!("Devices:   {}", partition_line(view.partition)),
    ];

    if !view.devices.is_empty() {
        lines.push(String::new());
        lines.push(devices::device_table(view.devices, color));
    }

    lines.join("\n")
}

/// `"3 online / 2 offline (5 total)"`, or `"none"` for an empty census.
pub fn partition_line(partition: Option<DevicePartition>) -> String {
    partition.map_or_else(
        || "none".into(),
        |p| {
            format!(
                "{} online / {} offline ({} total)",
                p.online,
                p.offline,
                p.total()
            )
        },
    )
}

pub async fn handle(ctx: &CommandContext, global: &GlobalOpts) -> Result<(), CliError> {
    let state = util::snapshot(ctx).await?;
    let status = state.status.as_ref().ok_or_else(|| CliError::Unavailable {
        resource: "Network status".into(),
    })?;

    let view = StatusView {
        summary: StatusSummary::from(status),
        partition: state.device_partition(),
        devices: &status.devices,
    };

    let color = output::should_color(global.color);
    let out = output::render_single(
        global.output,
        &view,
        |v| detail(v, color),
        |v| v.summary.label.to_owned(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
