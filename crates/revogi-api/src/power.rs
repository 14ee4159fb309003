// Outlet switching (command 200)

use serde_json::json;
use tracing::debug;

use crate::client::RevogiClient;
use crate::envelope::{Command, CommandCode, PROTOCOL};
use crate::error::Error;

/// Verb the relay echoes once a switch command has been forwarded.
const POWER_ACK_VERB: &str = "send2";

impl RevogiClient {
    /// Switch one port of a device on or off.
    ///
    /// The relay answers with `"send2:<sn>"`; anything else, including an
    /// echo for a different serial, is `Error::UnexpectedResult`.
    pub async fn set_power(&self, sn: &str, port: u8, on: bool) -> Result<(), Error> {
        debug!(sn, port, on, "switching port");
        let command = Command::device(
            CommandCode::PowerSet,
            &json!({
                "protocol": PROTOCOL,
                "sn": sn,
                "port": port,
                "state": u8::from(on),
            }),
        )?;
        let envelope = self.send(&command).await?;
        check_power_ack(&envelope.data, sn)
    }
}

fn check_power_ack(data: &serde_json::Value, sn: &str) -> Result<(), Error> {
    let Some(ack) = data.as_str() else {
        return Err(Error::UnexpectedResult {
            raw: data.to_string(),
        });
    };

    match ack.split_once(':') {
        Some((POWER_ACK_VERB, echoed)) if echoed == sn => Ok(()),
        _ => Err(Error::UnexpectedResult {
            raw: ack.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn ack_must_name_the_same_device() {
        assert!(check_power_ack(&json!("send2:SWW1234"), "SWW1234").is_ok());
        assert!(check_power_ack(&json!("send2:SWW9999"), "SWW1234").is_err());
        assert!(check_power_ack(&json!("send2:SWW1234:x"), "SWW1234").is_err());
        assert!(check_power_ack(&json!("send1:SWW1234"), "SWW1234").is_err());
        assert!(check_power_ack(&json!("send2"), "SWW1234").is_err());
    }

    #[test]
    fn non_string_ack_is_reported_raw() {
        match check_power_ack(&json!({ "ok": true }), "SWW1234") {
            Err(Error::UnexpectedResult { raw }) => assert_eq!(raw, r#"{"ok":true}"#),
            other => panic!("expected UnexpectedResult, got: {other:?}"),
        }
    }
}
