// Device query (command 500)

use std::collections::HashMap;

use serde_json::json;
use tracing::debug;

use crate::client::RevogiClient;
use crate::envelope::{Command, CommandCode, PROTOCOL};
use crate::error::Error;
use crate::models::{Device, DevicesData};

impl RevogiClient {
    /// List every device registered to the account.
    pub async fn list_devices(&self) -> Result<Vec<Device>, Error> {
        debug!("listing devices");
        Ok(self.query_devices("all").await?.dev)
    }

    /// Look up a single device by serial number.
    ///
    /// Returns an empty [`Device`] when the relay knows no such serial.
    pub async fn get_device(&self, sn: &str) -> Result<Device, Error> {
        debug!(sn, "fetching device");
        let data = self.query_devices(sn).await?;
        Ok(data.dev.into_iter().next().unwrap_or_default())
    }

    /// List every device with its current stats attached.
    ///
    /// Issues one device query and one stats query for all serials.
    pub async fn list_devices_with_stats(&self) -> Result<Vec<Device>, Error> {
        let mut devices = self.list_devices().await?;
        if devices.is_empty() {
            return Ok(devices);
        }

        let serials: Vec<&str> = devices.iter().map(|d| d.sn.as_str()).collect();
        let mut by_sn: HashMap<String, _> = self
            .get_devices_stats(&serials)
            .await?
            .into_iter()
            .map(|stats| (stats.sn.clone(), stats))
            .collect();

        for device in &mut devices {
            device.stats = by_sn.remove(&device.sn);
        }
        Ok(devices)
    }

    async fn query_devices(&self, dev: &str) -> Result<DevicesData, Error> {
        let command = Command::device(
            CommandCode::DeviceQuery,
            &json!({
                "protocol": PROTOCOL,
                "dev": dev,
            }),
        )?;
        let envelope = self.send(&command).await?;
        // `null` data means no devices.
        let data: DevicesData = envelope.data_as::<Option<_>>()?.unwrap_or_default();
        debug!(count = data.dev.len(), url = %data.url, "device query answered");
        Ok(data)
    }
}
