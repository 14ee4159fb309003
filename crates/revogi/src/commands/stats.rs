//! Usage command handler: one row per port.

use revogi_api::{DeviceStats, PortState, RevogiClient};
use serde::Serialize;
use tabled::Tabled;
use tracing::warn;

use crate::cli::{GlobalOpts, StatsArgs};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

/// One port of one device, as reported by the relay.
#[derive(Debug, Clone, Serialize)]
pub struct PortReading {
    pub sn: String,
    pub port: u8,
    pub state: Option<PortState>,
    pub watts: Option<i64>,
    pub amps: Option<i64>,
}

/// Flatten per-device telemetry into per-port readings.
pub fn readings(stats: &DeviceStats) -> Vec<PortReading> {
    (1..=stats.port_count())
        .map_while(|n| u8::try_from(n).ok())
        .map(|port| PortReading {
            sn: stats.sn.clone(),
            port,
            state: stats.port_state(port),
            watts: stats.port_watts(port),
            amps: usize::from(port)
                .checked_sub(1)
                .and_then(|i| stats.amp.get(i))
                .copied(),
        })
        .collect()
}

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct PortRow {
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Port")]
    port: u8,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Watts")]
    watts: String,
    #[tabled(rename = "Amps")]
    amps: String,
}

fn row(cfg: &Config, r: &PortReading, color: bool) -> PortRow {
    use super::util::or_dash;

    PortRow {
        device: config::device_label(cfg, &r.sn, ""),
        port: r.port,
        state: r
            .state
            .map_or_else(|| "-".into(), |s| output::paint_state(s, color)),
        watts: or_dash(r.watts),
        amps: or_dash(r.amps),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    client: &RevogiClient,
    cfg: &Config,
    args: StatsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let serials: Vec<&str> = args.serials.iter().map(String::as_str).collect();
    let stats = client.get_devices_stats(&serials).await?;

    for sn in &serials {
        if !stats.iter().any(|s| s.sn == *sn) {
            warn!(sn, "relay returned no usage for device");
        }
    }
    if stats.is_empty() {
        return Err(CliError::NotFound {
            resource_type: "device".into(),
            identifier: args.serials.join(", "),
            list_command: "devices list".into(),
        });
    }

    let color = output::should_color(&global.color);
    let rows: Vec<PortReading> = stats.iter().flat_map(readings).collect();
    let out = output::render_list(
        &global.output,
        &rows,
        |r| row(cfg, r, color),
        |r| format!("{}:{}", r.sn, r.port),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn readings_follow_port_order() {
        let stats = DeviceStats {
            sn: "SWW1".into(),
            switch: vec![1, 0],
            watt: vec![1200, 0],
            amp: vec![10],
            ..DeviceStats::default()
        };

        let r = readings(&stats);
        assert_eq!(r.len(), 2);
        assert_eq!(r[0].port, 1);
        assert_eq!(r[0].state, Some(PortState::On));
        assert_eq!(r[0].watts, Some(1200));
        assert_eq!(r[1].state, Some(PortState::Off));
        assert_eq!(r[1].amps, None);
    }

    #[test]
    fn empty_stats_have_no_readings() {
        assert!(readings(&DeviceStats::default()).is_empty());
    }
}
