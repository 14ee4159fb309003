//! Command dispatch: bridges CLI args -> relay calls -> output formatting.

pub mod apply;
pub mod config_cmd;
pub mod devices;
pub mod login;
pub mod power;
pub mod stats;
pub mod util;
pub mod watch;

use revogi_api::RevogiClient;

use crate::cli::{Command, GlobalOpts};
use crate::config::Config;
use crate::error::CliError;

/// Dispatch a relay-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    client: &RevogiClient,
    cfg: &Config,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Login => login::handle(client, global).await,
        Command::Devices(args) => devices::handle(client, cfg, args, global).await,
        Command::Stats(args) => stats::handle(client, cfg, args, global).await,
        Command::Power(args) => power::handle(client, cfg, args, global).await,
        Command::Watch(args) => watch::handle(client, cfg, args, global).await,
        Command::Apply(args) => apply::handle(client, cfg, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
