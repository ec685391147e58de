// 🏧 DeviceClient - blocking HTTP binding to the cash device control API
//
// Stateless request/response mapping. Every endpoint speaks the same JSON
// envelope: an isSuccess flag, an optional errorMsg, and an endpoint-specific
// data payload. The device decides success; a 200 with isSuccess=false is a
// remote failure, not a transport one.
//
// No retry, no cancellation. Each call blocks until response or the
// configured timeout.

use crate::error::{Error, Result};
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

/// Fallback when the device fails without saying why
const FALLBACK_ERROR: &str = "unknown error";

/// Placeholder identifier when a successful withdraw response omits the uuid.
/// Multiple withdrawals can collide on this placeholder; the ledger resolves
/// duplicate ids first-match in scan order.
pub const UNKNOWN_ID: &str = "Unknown";

// ============================================================================
// RESPONSE ENVELOPE
// ============================================================================

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "isSuccess", default)]
    is_success: bool,

    #[serde(rename = "errorMsg")]
    error_msg: Option<String>,

    /// Only /api/getErrorMessage reports success through this field
    #[serde(rename = "errorCode")]
    error_code: Option<i64>,

    #[serde(default)]
    data: Option<Value>,
}

impl Envelope {
    fn remote_error(self) -> Error {
        Error::Remote(self.error_msg.unwrap_or_else(|| FALLBACK_ERROR.to_string()))
    }
}

// ============================================================================
// DEVICE CLIENT
// ============================================================================

pub struct DeviceClient {
    base_url: String,
    http: Client,
}

impl DeviceClient {
    /// Build a client for one device. `timeout` bounds every call.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Transport(e.to_string()))?;

        Ok(DeviceClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST /api/login. The gate in session.rs tracks the outcome; the
    /// client itself stays stateless.
    pub fn login(&self, username: &str, password: &str) -> Result<()> {
        let envelope = self.post(
            "/api/login",
            json!({ "account": username, "password": password }),
        )?;

        if envelope.is_success {
            Ok(())
        } else {
            Err(envelope.remote_error())
        }
    }

    /// POST /api/refund. `amount` is sent verbatim as a string - leading
    /// zeros and exact operator input survive, nothing is re-serialized as a
    /// number. Returns the device-assigned transaction id, or [`UNKNOWN_ID`]
    /// when the device omits it.
    pub fn withdraw(&self, amount: &str) -> Result<String> {
        let envelope = self.post("/api/refund", json!({ "amount": amount }))?;

        if !envelope.is_success {
            return Err(envelope.remote_error());
        }

        let id = envelope
            .data
            .as_ref()
            .and_then(|d| d.get("uuid"))
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN_ID)
            .to_string();

        Ok(id)
    }

    /// POST /api/query. Returns the raw remote status string, unmapped - the
    /// reconciliation engine owns the vocabulary.
    pub fn query_status(&self, transaction_id: &str) -> Result<String> {
        let envelope = self.post("/api/query", json!({ "uuid": transaction_id }))?;

        if !envelope.is_success {
            return Err(envelope.remote_error());
        }

        let status = envelope
            .data
            .as_ref()
            .and_then(|d| d.get("info"))
            .and_then(|info| info.get("status"))
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN_ID)
            .to_string();

        Ok(status)
    }

    // ========================================================================
    // READ-ONLY GETTERS
    // Out of reconciliation scope but same envelope and failure contract.
    // ========================================================================

    /// POST /api/getErrorMessage. This endpoint alone reports success either
    /// through the shared flag or through errorCode == 200.
    pub fn error_message(&self, error_code: i64) -> Result<Value> {
        let envelope = self.post("/api/getErrorMessage", json!({ "errorCode": error_code }))?;

        if envelope.is_success || envelope.error_code == Some(200) {
            Ok(envelope.data.unwrap_or(Value::Null))
        } else {
            Err(envelope.remote_error())
        }
    }

    /// GET /api/getStatus
    pub fn system_status(&self) -> Result<Value> {
        self.read_endpoint("/api/getStatus")
    }

    /// GET /api/machineInfo
    pub fn machine_info(&self) -> Result<Value> {
        self.read_endpoint("/api/machineInfo")
    }

    /// GET /api/cashInfo
    pub fn cash_info(&self) -> Result<Value> {
        self.read_endpoint("/api/cashInfo")
    }

    /// GET /api/sensorStatus
    pub fn sensor_status(&self) -> Result<Value> {
        self.read_endpoint("/api/sensorStatus")
    }

    fn read_endpoint(&self, endpoint: &str) -> Result<Value> {
        let envelope = self.get(endpoint)?;

        if envelope.is_success {
            Ok(envelope.data.unwrap_or(Value::Null))
        } else {
            Err(envelope.remote_error())
        }
    }

    // ========================================================================
    // TRANSPORT
    // ========================================================================

    fn post(&self, endpoint: &str, body: Value) -> Result<Envelope> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| Error::Transport(e.to_string()))?;

        decode(response)
    }

    fn get(&self, endpoint: &str) -> Result<Envelope> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self
            .http
            .get(&url)
            .send()
            .map_err(|e| Error::Transport(e.to_string()))?;

        decode(response)
    }
}

/// Non-2xx statuses and unparseable bodies are transport-layer failures;
/// only a parsed envelope can produce a remote failure.
fn decode(response: Response) -> Result<Envelope> {
    let status = response.status();
    if !status.is_success() {
        return Err(Error::Transport(format!("device returned HTTP {status}")));
    }

    response
        .json::<Envelope>()
        .map_err(|e| Error::Transport(e.to_string()))
}
