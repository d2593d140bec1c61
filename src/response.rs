use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

pub const MIME_JSON: &str = "application/json";

/// The code a payload carries when the server handled the call successfully.
pub const CODE_OK: i64 = 200;

/// The application envelope the server wraps every body in.
///
/// Decoding is field by field: a field of an unexpected type is left in
/// `rest` and does not affect the others.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Payload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(flatten)]
    pub rest: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
    pub data: Payload,
}

impl Payload {
    /// Bodies that are empty or not a json object decode to an empty payload.
    pub fn parse(body: &str) -> Self {
        if body.trim().is_empty() {
            return Self::default();
        }
        match serde_json::from_str(body) {
            Ok(Value::Object(fields)) => Self::from_fields(fields),
            _ => Self::default(),
        }
    }

    fn from_fields(mut fields: serde_json::Map<String, Value>) -> Self {
        let code = match fields.get("code").and_then(parse_code) {
            Some(code) => {
                fields.remove("code");
                Some(code)
            }
            None => None,
        };

        let message = match fields.get("message") {
            Some(Value::String(_)) => match fields.remove("message") {
                Some(Value::String(message)) => Some(message),
                _ => None,
            },
            _ => None,
        };

        Self {
            code,
            message,
            rest: fields,
        }
    }
}

/// Integral numbers only; `200.0` is the same code as `200`.
fn parse_code(value: &Value) -> Option<i64> {
    if let Some(code) = value.as_i64() {
        return Some(code);
    }
    let code = value.as_f64()?;
    if code.fract() == 0.0 && code >= i64::MIN as f64 && code <= i64::MAX as f64 {
        Some(code as i64)
    } else {
        None
    }
}

impl ApiResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: String) -> Self {
        let data = Payload::parse(&body);
        Self {
            status,
            headers,
            body,
            data,
        }
    }

    /// Both the transport status and the payload code have to be exactly 200.
    pub fn is_success(&self) -> bool {
        self.status == StatusCode::OK && self.data.code == Some(CODE_OK)
    }

    /// The message to report for a failed call: the server's own message if
    /// it sent one, otherwise the status reason.
    pub fn message(&self) -> String {
        match self.data.message {
            Some(ref message) if !message.is_empty() => message.clone(),
            _ => match self.status.canonical_reason() {
                Some(reason) => format!("{} {}", self.status.as_u16(), reason),
                None => self.status.as_u16().to_string(),
            },
        }
    }

    /// Header values are read as utf-8, not only visible ascii. `None` when
    /// the header is missing or its bytes are not utf-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .and_then(|value| std::str::from_utf8(value.as_bytes()).ok())
    }

    /// Decode the `data` field of the payload.
    pub fn decode<T: DeserializeOwned>(&self) -> serde_json::Result<Option<T>> {
        match self.data.rest.get("data") {
            Some(value) if !value.is_null() => serde_json::from_value(value.clone()).map(Some),
            _ => Ok(None),
        }
    }
}
