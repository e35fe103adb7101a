//! `netwatch devices`: the device list from the current status.

use tabled::Tabled;

use netwatch_core::{Device, DeviceFilter};

use super::{CommandContext, util};
use crate::cli::{DevicesArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Vendor")]
    vendor: String,
    #[tabled(rename = "Link")]
    connection: String,
    #[tabled(rename = "State")]
    state: String,
}

fn device_row(device: &Device, color: bool) -> DeviceRow {
    DeviceRow {
        name: device.display_name().to_owned(),
        ip: device.ip.clone(),
        mac: util::or_dash(device.mac.as_deref()),
        vendor: util::or_dash(device.vendor.as_deref()),
        connection: util::or_dash(device.connection_type.as_deref()),
        state: output::paint_state(
            if device.is_online { "online" } else { "offline" },
            device.is_online,
            color,
        ),
    }
}

/// Table of devices, shared with `status`.
pub fn device_table(devices: &[Device], color: bool) -> String {
    let rows: Vec<DeviceRow> = devices.iter().map(|d| device_row(d, color)).collect();
    output::render_table(&rows)
}

fn filter_from(args: &DevicesArgs) -> DeviceFilter {
    match (args.online, args.offline) {
        (true, _) => DeviceFilter::Online,
        (false, true) => DeviceFilter::Offline,
        (false, false) => DeviceFilter::All,
    }
}

pub async fn handle(
    ctx: &CommandContext,
    args: &DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let state = util::snapshot(ctx).await?;
    let status = state.status.as_ref().ok_or_else(|| CliError::Unavailable {
        resource: "Network status".into(),
    })?;

    let filter = filter_from(args);
    let devices: Vec<Device> = status
        .devices
        .iter()
        .filter(|d| filter.matches(d))
        .cloned()
        .collect();

    let color = output::should_color(global.color);
    let out = output::render_list(
        global.output,
        &devices,
        |d| device_row(d, color),
        |d| d.ip.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
