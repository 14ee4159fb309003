//! Periodic usage polling.

use chrono::{DateTime, Local};
use revogi_api::{PortState, RevogiClient};
use serde::Serialize;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{info, warn};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

use super::stats::{PortReading, readings};

/// One port reading taken during a poll.
#[derive(Debug, Serialize)]
struct Sample {
    timestamp: DateTime<Local>,
    sn: String,
    name: String,
    port: u8,
    state: Option<PortState>,
    watts: Option<i64>,
    /// Configured ceiling, present only when the reading exceeds it.
    #[serde(skip_serializing_if = "Option::is_none")]
    over_limit: Option<i64>,
}

/// The configured `max_watts` for this port if the reading exceeds it.
fn over_limit(cfg: &Config, reading: &PortReading) -> Option<i64> {
    let max = cfg.device(&reading.sn)?.port(reading.port)?.max_watts?;
    reading.watts.filter(|&w| w > max).map(|_| max)
}

fn render(sample: &Sample, format: &OutputFormat, color: bool) -> String {
    match format {
        // One document per sample so the stream can be consumed line by line.
        OutputFormat::Json | OutputFormat::JsonCompact => output::render_json(sample, true),
        OutputFormat::Yaml => format!("---\n{}", output::render_yaml(sample)),
        OutputFormat::Table | OutputFormat::Plain => {
            let mut line = format!(
                "{}  {:<20} port {:<2} {:>4} {:>8} W",
                sample.timestamp.format("%Y-%m-%d %H:%M:%S"),
                sample.name,
                sample.port,
                sample
                    .state
                    .map_or_else(|| "-".into(), |s| output::paint_state(s, color)),
                sample.watts.map_or_else(|| "-".into(), |w| w.to_string()),
            );
            if let Some(max) = sample.over_limit {
                line.push_str("  ");
                line.push_str(&output::paint_warning(&format!("above {max} W"), color));
            }
            line
        }
    }
}

async fn poll(client: &RevogiClient, cfg: &Config) -> Result<Vec<Sample>, CliError> {
    let devices = client.list_devices_with_stats().await?;
    let timestamp = Local::now();

    let mut samples = Vec::new();
    for device in &devices {
        let Some(ref stats) = device.stats else {
            continue;
        };
        let name = config::device_label(cfg, &device.sn, &device.name);
        for reading in readings(stats) {
            let over = over_limit(cfg, &reading);
            if let Some(max) = over {
                warn!(
                    sn = %reading.sn,
                    port = reading.port,
                    watts = ?reading.watts,
                    max,
                    "port draw above configured limit"
                );
            }
            samples.push(Sample {
                timestamp,
                sn: reading.sn,
                name: name.clone(),
                port: reading.port,
                state: reading.state,
                watts: reading.watts,
                over_limit: over,
            });
        }
    }
    Ok(samples)
}

pub async fn handle(
    client: &RevogiClient,
    cfg: &Config,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let period = args
        .interval
        .map_or_else(|| cfg.poll_interval(), std::time::Duration::from_secs);
    let color = output::should_color(&global.color);

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut polls = 0u32;
    loop {
        if args.count.is_some_and(|n| polls >= n) {
            break;
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
            _ = ticker.tick() => {}
        }
        polls += 1;

        match poll(client, cfg).await {
            Ok(samples) => {
                for sample in &samples {
                    output::print_output(&render(sample, &global.output, color), global.quiet);
                }
            }
            Err(CliError::ServerBusy { cooldown_secs }) => {
                warn!(cooldown_secs, "relay busy, skipping this poll");
            }
            Err(e @ (CliError::Timeout | CliError::ConnectionFailed { .. })) => {
                warn!(error = %e, "poll failed, retrying next interval");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
