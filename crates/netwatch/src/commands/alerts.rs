//! `netwatch alerts`: the most recent alerts, newest first.

use tabled::Tabled;

use netwatch_core::AlertFeedItem;

use super::{CommandContext, util};
use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct AlertRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Type")]
    alert_type: String,
    #[tabled(rename = "Message")]
    message: String,
    #[tabled(rename = "Device")]
    device: String,
}

fn alert_row(item: &AlertFeedItem, color: bool) -> AlertRow {
    let severity = item.severity.to_string();
    AlertRow {
        time: item.time_label.clone(),
        severity: if item.critical {
            output::paint_critical(&severity, color)
        } else {
            severity
        },
        alert_type: item.alert_type.clone(),
        message: if item.critical {
            output::paint_critical(&item.message, color)
        } else {
            item.message.clone()
        },
        device: util::or_dash(item.device_ip.as_deref()),
    }
}

pub async fn handle(ctx: &CommandContext, global: &GlobalOpts) -> Result<(), CliError> {
    let state = util::snapshot(ctx).await?;
    let feed = state.alert_feed();

    let color = output::should_color(global.color);
    let out = output::render_list(
        global.output,
        &feed,
        |item| alert_row(item, color),
        |item| format!("{}\t{}\t{}", item.id, item.severity, item.message),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
