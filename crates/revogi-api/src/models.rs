// Relay response types
//
// Shapes of the `data` field for each command. Fields use `#[serde(default)]`
// liberally because the relay omits keys it has no value for.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

// ── Device ───────────────────────────────────────────────────────────

/// A registered power strip, as returned by the device query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Device {
    /// Firmware version.
    pub ver: String,
    /// Port names, in port order.
    pub pname: Vec<String>,
    /// Network module version.
    pub nver: String,
    pub line: i64,
    pub socket_type: String,
    pub ip: String,
    pub mac: String,
    #[serde(rename = "dateAdd")]
    pub date_added: String,
    pub name: String,
    pub gateway_ip: String,
    /// Serial number; the identity key for every device command.
    pub sn: String,
    pub protect: i64,
    pub sak: String,
    pub register: i64,
    /// Telemetry attached by [`RevogiClient::list_devices_with_stats`](crate::RevogiClient::list_devices_with_stats).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<DeviceStats>,
}

impl Device {
    pub fn is_registered(&self) -> bool {
        self.register != 0
    }

    /// Human name for a 1-based port, falling back to `port N`.
    pub fn port_name(&self, port: u8) -> String {
        usize::from(port)
            .checked_sub(1)
            .and_then(|i| self.pname.get(i))
            .filter(|n| !n.is_empty())
            .cloned()
            .unwrap_or_else(|| format!("port {port}"))
    }
}

/// `data` of the device query.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct DevicesData {
    pub dev: Vec<Device>,
    /// Regional endpoint the relay suggests; informational only.
    pub url: String,
}

// ── Stats ────────────────────────────────────────────────────────────

/// Per-port telemetry for one device.
///
/// `amp`, `watt` and `switch` are indexed by port, starting with port 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceStats {
    pub softver: String,
    pub amp: Vec<i64>,
    pub online: i64,
    pub sn: String,
    pub watt: Vec<i64>,
    pub switch: Vec<i64>,
}

impl DeviceStats {
    pub fn is_online(&self) -> bool {
        self.online != 0
    }

    /// Switch state of a 1-based port, `None` if the port is unknown.
    pub fn port_state(&self, port: u8) -> Option<PortState> {
        port_index(port)
            .and_then(|i| self.switch.get(i))
            .map(|&s| PortState::from(s != 0))
    }

    /// Reported draw of a 1-based port.
    pub fn port_watts(&self, port: u8) -> Option<i64> {
        port_index(port).and_then(|i| self.watt.get(i)).copied()
    }

    /// Number of ports the relay reported.
    pub fn port_count(&self) -> usize {
        self.switch.len().max(self.watt.len()).max(self.amp.len())
    }
}

fn port_index(port: u8) -> Option<usize> {
    usize::from(port).checked_sub(1)
}

/// Outlet switch state.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PortState {
    On,
    Off,
}

impl PortState {
    pub fn is_on(self) -> bool {
        self == Self::On
    }
}

impl From<bool> for PortState {
    fn from(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

// ── Login ────────────────────────────────────────────────────────────

/// `data` of a login response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct LoginData {
    pub user_id: String,
    pub domain: String,
    pub name: String,
    pub regid: String,
    pub avatar: String,
    pub message: String,
    pub url: String,
    pub token: String,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;

    use super::*;

    #[test]
    fn device_tolerates_sparse_payload() {
        let device: Device = serde_json::from_value(json!({
            "ver": "5.12",
            "pname": [],
            "sn": "1234",
            "register": 1
        }))
        .unwrap();

        assert_eq!(device.sn, "1234");
        assert!(device.is_registered());
        assert!(device.mac.is_empty());
        assert_eq!(device.stats, None);
        assert_eq!(device.port_name(2), "port 2");
    }

    #[test]
    fn device_port_names_are_one_based() {
        let device = Device {
            pname: vec!["Lamp".into(), String::new()],
            ..Device::default()
        };
        assert_eq!(device.port_name(1), "Lamp");
        assert_eq!(device.port_name(2), "port 2");
        assert_eq!(device.port_name(0), "port 0");
    }

    #[test]
    fn stats_port_accessors() {
        let stats: DeviceStats = serde_json::from_value(json!({
            "softver": "5.12",
            "amp": [0, 120, 0],
            "online": 1,
            "sn": "SWW6010040000451",
            "watt": [0, 27, 0],
            "switch": [0, 1, 0]
        }))
        .unwrap();

        assert!(stats.is_online());
        assert_eq!(stats.port_count(), 3);
        assert_eq!(stats.port_state(2), Some(PortState::On));
        assert_eq!(stats.port_state(1), Some(PortState::Off));
        assert_eq!(stats.port_state(0), None);
        assert_eq!(stats.port_state(9), None);
        assert_eq!(stats.port_watts(2), Some(27));
    }

    #[test]
    fn port_state_text_forms() {
        assert_eq!(PortState::On.to_string(), "on");
        assert_eq!("off".parse::<PortState>().unwrap(), PortState::Off);
        assert_eq!(serde_json::to_value(PortState::On).unwrap(), json!("on"));
    }
}
