//! Device command handlers.

use revogi_api::{Device, RevogiClient};
use tabled::Tabled;

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

use super::util::{dash_if_empty, or_dash};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "SN")]
    sn: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Ports")]
    ports: usize,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Firmware")]
    firmware: String,
    #[tabled(rename = "Online")]
    online: String,
    #[tabled(rename = "Watts")]
    watts: String,
}

impl DeviceRow {
    fn new(cfg: &Config, d: &Device) -> Self {
        Self {
            sn: d.sn.clone(),
            name: config::device_label(cfg, &d.sn, &d.name),
            ports: d.pname.len(),
            ip: dash_if_empty(&d.ip).to_owned(),
            firmware: dash_if_empty(&d.ver).to_owned(),
            online: or_dash(d.stats.as_ref().map(|s| if s.is_online() { "yes" } else { "no" })),
            watts: or_dash(d.stats.as_ref().map(|s| s.watt.iter().sum::<i64>())),
        }
    }
}

fn detail(cfg: &Config, d: &Device) -> String {
    let mut lines = vec![
        format!("SN:         {}", d.sn),
        format!("Name:       {}", config::device_label(cfg, &d.sn, &d.name)),
        format!("Type:       {}", dash_if_empty(&d.socket_type)),
        format!("IP:         {}", dash_if_empty(&d.ip)),
        format!("MAC:        {}", dash_if_empty(&d.mac)),
        format!("Gateway:    {}", dash_if_empty(&d.gateway_ip)),
        format!("Firmware:   {}", dash_if_empty(&d.ver)),
        format!("Registered: {}", if d.is_registered() { "yes" } else { "no" }),
        format!("Added:      {}", dash_if_empty(&d.date_added)),
    ];
    let ports = u8::try_from(d.pname.len()).unwrap_or(u8::MAX);
    for port in 1..=ports {
        lines.push(format!("Port {port}:     {}", d.port_name(port)));
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    client: &RevogiClient,
    cfg: &Config,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        DevicesCommand::List { stats } => {
            let devices = if stats {
                client.list_devices_with_stats().await?
            } else {
                client.list_devices().await?
            };
            let out = output::render_list(
                &global.output,
                &devices,
                |d| DeviceRow::new(cfg, d),
                |d| d.sn.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Get { sn } => {
            let device = client.get_device(&sn).await?;
            // The relay answers an unknown serial with an empty list.
            if device.sn.is_empty() {
                return Err(CliError::NotFound {
                    resource_type: "device".into(),
                    identifier: sn,
                    list_command: "devices list".into(),
                });
            }
            let out = output::render_single(
                &global.output,
                &device,
                |d| detail(cfg, d),
                |d| d.sn.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
