// Device stats (command 511)

use serde_json::json;
use tracing::debug;

use crate::client::RevogiClient;
use crate::envelope::{Command, CommandCode, PROTOCOL};
use crate::error::Error;
use crate::models::DeviceStats;

impl RevogiClient {
    /// Current per-port telemetry for one device.
    ///
    /// Fails with `Error::NotFound` if the relay returns no rows.
    pub async fn get_device_stats(&self, sn: &str) -> Result<DeviceStats, Error> {
        self.get_devices_stats(&[sn])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound { sn: sn.to_owned() })
    }

    /// Telemetry for several devices in one call, in the relay's order.
    ///
    /// Unknown serials are simply absent from the result. A `null` answer
    /// counts as no rows.
    pub async fn get_devices_stats(&self, serials: &[&str]) -> Result<Vec<DeviceStats>, Error> {
        debug!(?serials, "fetching device stats");
        let command = Command::device(
            CommandCode::DeviceStats,
            &json!({
                "protocol": PROTOCOL,
                "sn": serials,
            }),
        )?;
        let envelope = self.send(&command).await?;
        let rows: Option<Vec<DeviceStats>> = envelope.data_as()?;
        Ok(rows.unwrap_or_default())
    }
}
