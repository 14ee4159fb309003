//! Outlet switching handler.

use revogi_api::RevogiClient;

use crate::cli::{GlobalOpts, PowerArgs, PowerState};
use crate::config::{self, Config};
use crate::error::CliError;

use super::util;

pub async fn handle(
    client: &RevogiClient,
    cfg: &Config,
    args: PowerArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let on = args.state == PowerState::On;
    let label = config::device_label(cfg, &args.sn, "");

    if !on
        && !util::confirm(
            &format!("Switch off port {} of {label}?", args.port),
            "power off",
            global.yes,
        )?
    {
        return Ok(());
    }

    client.set_power(&args.sn, args.port, on).await?;

    if !global.quiet {
        let state = if on { "on" } else { "off" };
        eprintln!("Port {} of {label} switched {state}", args.port);
    }
    Ok(())
}
