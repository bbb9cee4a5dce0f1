use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Malformed JSON record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Record is missing required field '{0}'")]
    MissingField(&'static str),
}

/// Why a URL cannot anchor a hierarchy
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UrlRejected {
    #[error("unparsable URL: {0}")]
    Unparsable(#[from] url::ParseError),

    #[error("unsupported scheme '{0}'")]
    UnsupportedScheme(String),

    #[error("URL has no host")]
    MissingHost,
}

/// An http(s) URL reduced to the parts the graph cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpUrl {
    pub scheme: String,
    pub host: String,
    pub path: String,
    pub query: Option<String>,
}

impl HttpUrl {
    pub fn parse(raw: &str) -> Result<Self, UrlRejected> {
        let url = Url::parse(raw)?;
        let scheme = url.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(UrlRejected::UnsupportedScheme(scheme.to_string()));
        }
        let host = match url.host_str() {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => return Err(UrlRejected::MissingHost),
        };

        Ok(Self {
            scheme: scheme.to_string(),
            host,
            path: url.path().to_string(),
            query: url.query().filter(|q| !q.is_empty()).map(str::to_string),
        })
    }

    /// `host + path`, the identity of a resource node
    pub fn resource_id(&self) -> String {
        format!("{}{}", self.host, self.path)
    }
}

/// One observation pushed by the capture side
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Redirect { url: String, redirect_url: String },
    Event(EventRecord),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventRecord {
    pub url: String,
    pub method: Option<String>,
    pub request_type: Option<String>,
    pub content_type: Option<String>,
    pub status: Option<i64>,
    pub ts: Option<f64>,
    pub bytes: Option<u64>,
    pub duration_ms: Option<f64>,
    pub referer: Option<String>,
    pub initiator: Option<String>,
    pub client: Option<String>,
    pub ip: Option<String>,
}

impl EventRecord {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}

// Loose wire shape: numeric fields arrive as numbers or strings depending on
// which collector produced them.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireRecord {
    edge_type: Option<String>,
    url: Option<String>,
    redirect_url: Option<String>,
    method: Option<String>,
    #[serde(rename = "type")]
    request_type: Option<String>,
    content_type: Option<String>,
    status: Option<Value>,
    ts: Option<Value>,
    bytes: Option<Value>,
    duration_ms: Option<Value>,
    referer: Option<String>,
    initiator: Option<String>,
    client: Option<String>,
    ip: Option<String>,
}

impl Record {
    /// Parse one newline-delimited JSON record
    pub fn from_json(line: &str) -> Result<Self, RecordError> {
        let wire: WireRecord = serde_json::from_str(line)?;
        Self::from_wire(wire)
    }

    pub fn from_value(value: Value) -> Result<Self, RecordError> {
        let wire: WireRecord = serde_json::from_value(value)?;
        Self::from_wire(wire)
    }

    fn from_wire(wire: WireRecord) -> Result<Self, RecordError> {
        // Each side of a redirect resolves on its own; an absent side is
        // carried as "" and fails to anchor a hierarchy downstream.
        if wire.edge_type.as_deref() == Some("redirect") {
            return Ok(Record::Redirect {
                url: wire.url.unwrap_or_default(),
                redirect_url: wire.redirect_url.unwrap_or_default(),
            });
        }

        let url = non_empty(wire.url).ok_or(RecordError::MissingField("url"))?;
        Ok(Record::Event(EventRecord {
            url,
            method: non_empty(wire.method),
            request_type: non_empty(wire.request_type),
            content_type: non_empty(wire.content_type),
            status: wire.status.as_ref().and_then(coerce_i64),
            ts: wire.ts.as_ref().and_then(coerce_f64),
            bytes: wire.bytes.as_ref().and_then(coerce_u64),
            duration_ms: wire.duration_ms.as_ref().and_then(coerce_f64),
            referer: non_empty(wire.referer),
            initiator: non_empty(wire.initiator),
            client: non_empty(wire.client),
            ip: non_empty(wire.ip),
        }))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn coerce_f64(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    number.filter(|n: &f64| n.is_finite())
}

fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Content lengths: non-negative numbers or numeric strings, truncated
fn coerce_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(truncate_u64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(truncate_u64))
        }
        _ => None,
    }
}

fn truncate_u64(value: f64) -> Option<u64> {
    (value.is_finite() && value >= 0.0).then(|| value.trunc() as u64)
}
