//! Shared helpers for command handlers.

use std::sync::Arc;

use netwatch_core::{Dashboard, DashboardState};

use super::CommandContext;
use crate::error::CliError;

/// Activate once, capture the reconciled state, deactivate.
pub async fn snapshot(ctx: &CommandContext) -> Result<Arc<DashboardState>, CliError> {
    let state = Dashboard::oneshot(ctx.config.clone(), ctx.session.clone(), |dashboard| async move {
        Ok(dashboard.state())
    })
    .await?;
    Ok(state)
}

pub fn or_dash(value: Option<&str>) -> String {
    value
        .filter(|v| !v.is_empty())
        .map_or_else(|| "-".into(), str::to_owned)
}
