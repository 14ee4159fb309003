//! Switch ports to the states declared under `[devices]` in the config.

use revogi_api::{Device, PortState, RevogiClient};
use serde::Serialize;
use tabled::Tabled;
use tracing::{info, warn};

use crate::cli::{ApplyArgs, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

use super::util;

/// A port whose reported state differs from the configured one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub sn: String,
    pub port: u8,
    pub current: Option<PortState>,
    pub desired: PortState,
}

/// Compare configured port states against current telemetry.
///
/// Devices without telemetry are skipped with a warning. Ports already
/// in the desired state produce no change.
pub fn plan(cfg: &Config, devices: &[Device]) -> Vec<Change> {
    let mut changes = Vec::new();
    for (sn, overrides) in &cfg.devices {
        let stats = devices
            .iter()
            .find(|d| d.sn == *sn)
            .and_then(|d| d.stats.as_ref());
        let Some(stats) = stats else {
            if overrides.ports.iter().any(|p| p.state.is_some()) {
                warn!(sn = %sn, "no telemetry for configured device, skipping");
            }
            continue;
        };

        for port in &overrides.ports {
            let Some(desired) = port.state else { continue };
            let current = stats.port_state(port.port);
            if current != Some(desired) {
                changes.push(Change {
                    sn: sn.clone(),
                    port: port.port,
                    current,
                    desired,
                });
            }
        }
    }
    changes
}

#[derive(Tabled)]
struct ChangeRow {
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Port")]
    port: u8,
    #[tabled(rename = "Current")]
    current: String,
    #[tabled(rename = "Desired")]
    desired: String,
}

pub async fn handle(
    client: &RevogiClient,
    cfg: &Config,
    args: ApplyArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let devices = client.list_devices_with_stats().await?;
    let changes = plan(cfg, &devices);

    if changes.is_empty() {
        if !global.quiet {
            eprintln!("All configured ports are already in their desired state");
        }
        return Ok(());
    }

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &changes,
        |c| ChangeRow {
            device: config::device_label(cfg, &c.sn, ""),
            port: c.port,
            current: c
                .current
                .map_or_else(|| "-".into(), |s| output::paint_state(s, color)),
            desired: output::paint_state(c.desired, color),
        },
        |c| format!("{}:{}={}", c.sn, c.port, c.desired),
    );
    output::print_output(&out, global.quiet);

    if args.dry_run {
        return Ok(());
    }

    let switching_off = changes.iter().any(|c| !c.desired.is_on());
    if switching_off
        && !util::confirm(
            &format!("Apply {} change(s), switching ports off?", changes.len()),
            "apply",
            global.yes,
        )?
    {
        return Ok(());
    }

    for change in &changes {
        info!(sn = %change.sn, port = change.port, desired = %change.desired, "switching");
        client
            .set_power(&change.sn, change.port, change.desired.is_on())
            .await?;
    }
    if !global.quiet {
        eprintln!("Applied {} change(s)", changes.len());
    }
    Ok(())
}
