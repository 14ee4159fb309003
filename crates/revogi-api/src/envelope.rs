// Envelope codec
//
// Every relay call is a form POST of `{cmd, json, tokenlogin?}` and every
// answer is the same `{code, data, response, sn}` wrapper. The `data` field
// is kept as untyped JSON; each typed operation decodes it a second time.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

use crate::error::Error;

/// Envelope code for a successful command.
pub const STATUS_OK: i64 = 200;
/// Envelope code for an expired or missing session.
pub const STATUS_UNAUTHORIZED: i64 = 401;
/// Envelope code for an overloaded relay.
pub const STATUS_SERVER_ERROR: i64 = 500;

/// Protocol revision sent with every device command.
pub(crate) const PROTOCOL: &str = "3";

/// Vendor operation identifiers carried in the `cmd` form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum CommandCode {
    Login,
    DeviceQuery,
    DeviceStats,
    PowerSet,
}

impl CommandCode {
    /// Numeric wire value.
    pub const fn code(self) -> u16 {
        match self {
            Self::Login => 101,
            Self::DeviceQuery => 500,
            Self::DeviceStats => 511,
            Self::PowerSet => 200,
        }
    }
}

/// A fully encoded command, ready to hand to the dispatcher.
///
/// The payload is serialized once at construction so resubmissions after
/// a session renewal send byte-identical JSON.
#[derive(Debug, Clone)]
pub struct Command {
    code: CommandCode,
    payload: String,
    requires_session: bool,
}

impl Command {
    pub fn new(
        code: CommandCode,
        payload: &impl Serialize,
        requires_session: bool,
    ) -> Result<Self, Error> {
        let payload = serde_json::to_string(payload).map_err(Error::Encoding)?;
        Ok(Self {
            code,
            payload,
            requires_session,
        })
    }

    /// Shorthand for a device command, which always needs a session.
    pub fn device(code: CommandCode, payload: &impl Serialize) -> Result<Self, Error> {
        Self::new(code, payload, true)
    }

    pub fn code(&self) -> CommandCode {
        self.code
    }

    /// The JSON-encoded payload.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn requires_session(&self) -> bool {
        self.requires_session
    }

    /// Build the form body. `token` is only attached to session commands.
    pub(crate) fn form<'a>(&'a self, token: Option<&'a str>) -> CommandForm<'a> {
        CommandForm {
            cmd: self.code.code().to_string(),
            json: &self.payload,
            tokenlogin: token.filter(|_| self.requires_session),
        }
    }
}

/// Form fields of a relay POST.
#[derive(Debug, Serialize)]
pub(crate) struct CommandForm<'a> {
    cmd: String,
    json: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tokenlogin: Option<&'a str>,
}

/// The generic response wrapper.
///
/// ```json
/// { "code": 200, "data": ..., "response": 500, "sn": "" }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    /// Protocol-level status (200 / 401 / 500 / other).
    pub code: i64,
    /// Command-specific payload, decoded by the typed operation.
    #[serde(default)]
    pub data: serde_json::Value,
    /// Echo of the command code.
    #[serde(default)]
    pub response: i64,
    #[serde(default, rename = "sn")]
    pub correlation: String,
}

impl Envelope {
    /// Decode a raw response body.
    pub fn decode(body: &[u8]) -> Result<Self, Error> {
        serde_json::from_slice(body).map_err(|e| {
            let body = String::from_utf8_lossy(body).into_owned();
            let preview: String = body.chars().take(200).collect();
            Error::MalformedResponse {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }

    /// Decode the opaque `data` field into a command-specific shape.
    ///
    /// A `null` or absent `data` only decodes into types that accept it,
    /// such as `Option<T>`.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T, Error> {
        T::deserialize(&self.data).map_err(|e| Error::MalformedResponse {
            message: format!("unexpected data for response {}: {e}", self.response),
            body: self.data.to_string(),
        })
    }

    /// `data` rendered as JSON text, for error reporting.
    pub(crate) fn raw_data(&self) -> String {
        self.data.to_string()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;

    use super::*;

    #[test]
    fn payload_survives_encoding() {
        let payload = json!({ "protocol": PROTOCOL, "sn": ["SWW1", "SWW2"], "port": 3 });
        let command = Command::device(CommandCode::DeviceStats, &payload).unwrap();

        let decoded: serde_json::Value = serde_json::from_str(command.payload()).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn form_carries_token_only_for_session_commands() {
        let login = Command::new(CommandCode::Login, &json!({}), false).unwrap();
        let form = serde_json::to_value(login.form(Some("tok"))).unwrap();
        assert_eq!(form, json!({ "cmd": "101", "json": "{}" }));

        let power = Command::device(CommandCode::PowerSet, &json!({})).unwrap();
        let form = serde_json::to_value(power.form(Some("tok"))).unwrap();
        assert_eq!(form, json!({ "cmd": "200", "json": "{}", "tokenlogin": "tok" }));
    }

    #[test]
    fn decode_keeps_data_opaque() {
        let envelope =
            Envelope::decode(br#"{"code":200,"data":"send2:SWW1","response":200,"sn":"SWW1"}"#)
                .unwrap();
        assert_eq!(envelope.code, STATUS_OK);
        assert_eq!(envelope.response, i64::from(CommandCode::PowerSet.code()));
        assert_eq!(envelope.correlation, "SWW1");
        assert_eq!(envelope.data, json!("send2:SWW1"));
    }

    #[test]
    fn decode_rejects_truncated_body() {
        let result = Envelope::decode(br#"{"code":200,"data":{"incomplete":"data...,"#);
        assert!(matches!(result, Err(Error::MalformedResponse { .. })));
    }

    #[test]
    fn data_as_reports_shape_mismatch() {
        let envelope = Envelope::decode(br#"{"code":200,"data":"nope","response":511}"#).unwrap();
        let result: Result<Vec<u8>, _> = envelope.data_as();
        match result {
            Err(Error::MalformedResponse { message, body }) => {
                assert!(message.contains("511"), "message: {message}");
                assert_eq!(body, "\"nope\"");
            }
            other => panic!("expected MalformedResponse, got: {other:?}"),
        }
    }

    #[test]
    fn decode_accepts_codes_outside_http_range() {
        let envelope = Envelope::decode(br#"{"code":-1,"data":"oops","response":70000}"#).unwrap();
        assert_eq!(envelope.code, -1);
        assert_eq!(envelope.response, 70000);
    }

    #[test]
    fn null_data_decodes_as_none() {
        let envelope = Envelope::decode(br#"{"code":200,"data":null,"response":511}"#).unwrap();
        let rows: Option<Vec<u8>> = envelope.data_as().unwrap();
        assert_eq!(rows, None);

        let missing = Envelope::decode(br#"{"code":200,"response":500}"#).unwrap();
        let rows: Option<Vec<u8>> = missing.data_as().unwrap();
        assert_eq!(rows, None);
    }

    #[test]
    fn command_codes_match_wire_values() {
        assert_eq!(CommandCode::Login.code(), 101);
        assert_eq!(CommandCode::DeviceQuery.code(), 500);
        assert_eq!(CommandCode::DeviceStats.code(), 511);
        assert_eq!(CommandCode::PowerSet.code(), 200);
        assert_eq!(CommandCode::DeviceQuery.to_string(), "device-query");
    }
}
