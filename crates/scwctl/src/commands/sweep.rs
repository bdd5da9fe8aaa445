//! `sweep`: bulk deletion of test resources

use scwctl_core::api::{block, container, instance};
use scwctl_core::sweep::sweep_all;
use tracing::info;

use super::CommandContext;
use crate::cli::{SweepArgs, SweepTarget};
use crate::error::{Result as CliResult, ScwCtlError};

pub async fn handle_sweep_command(args: &SweepArgs, ctx: &CommandContext<'_>) -> CliResult<()> {
    if !args.yes {
        return Err(ScwCtlError::ConfirmationRequired);
    }
    let client = ctx.client()?;
    info!(target = ?args.target, "sweeping");

    let result = match &args.target {
        SweepTarget::Block { zone: Some(zone) } => block::sweepers::sweep_zone(&client, zone).await,
        SweepTarget::Block { zone: None } => block::sweepers::sweep_all_localities(&client).await,
        SweepTarget::Container {
            region: Some(region),
        } => container::sweepers::sweep_region(&client, region).await,
        SweepTarget::Container { region: None } => {
            container::sweepers::sweep_all_localities(&client).await
        }
        SweepTarget::Instance { zone: Some(zone) } => {
            instance::sweepers::sweep_zone(&client, zone).await
        }
        SweepTarget::Instance { zone: None } => {
            instance::sweepers::sweep_all_localities(&client).await
        }
        SweepTarget::All => sweep_all(&client).await,
    };
    result?;
    eprintln!("Sweep complete");
    Ok(())
}
