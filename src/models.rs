use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::ErrorKind;

/// The envelope returned by every JSON route.
///
/// Only `code` is always meaningful; the rest defaults to empty values when
/// the service leaves it out.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Response {
    /// API-level status. `200` (or `0`) on success.
    #[serde(deserialize_with = "null_default")]
    pub code: i64,

    /// Secondary status code.
    #[serde(deserialize_with = "null_default")]
    pub cscode: i64,

    /// Caller address as seen by the service.
    #[serde(deserialize_with = "null_default")]
    pub ip: String,

    /// Free-form diagnostic, any JSON shape.
    pub msg: Message,

    #[serde(deserialize_with = "null_default")]
    pub data: Data,
}

impl Response {
    /// Apply the error mapping to this envelope's code.
    pub fn error(&self) -> Option<ErrorKind> {
        ErrorKind::from_code(self.code)
    }

    /// `true` for the codes the service uses to report success.
    pub fn is_success_code(&self) -> bool {
        matches!(self.code, 0 | 200)
    }
}

/// Payload shared by all routes. Each route fills a subset of the fields.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Data {
    /// Uploaded image identifier, passed to [`Client::transform`](crate::Client::transform).
    #[serde(deserialize_with = "null_default")]
    pub uid: String,

    /// Display name of the uploaded image.
    #[serde(deserialize_with = "null_default")]
    pub name: String,

    #[serde(deserialize_with = "null_default")]
    pub thumbnail: String,

    /// Width in pixels.
    #[serde(deserialize_with = "null_default")]
    pub w: i64,

    /// Height in pixels.
    #[serde(deserialize_with = "null_default")]
    pub h: i64,

    /// Size in bytes. After processing this is the size of the result.
    #[serde(deserialize_with = "null_default")]
    pub filesize: i64,

    /// Transaction identifier of a submitted job.
    #[serde(deserialize_with = "null_default")]
    pub trans_id: String,

    /// Last status reported for the job, if the route carries one.
    #[serde(deserialize_with = "optional_status")]
    pub status: Option<Status>,

    /// Quota ceiling. The service sends counters as strings.
    #[serde(deserialize_with = "string_or_number")]
    pub max_num: String,

    /// Quota consumed so far.
    #[serde(deserialize_with = "string_or_number")]
    pub used_num: String,
}

/// Job processing status as reported by the service.
///
/// The client never changes this value; it only surfaces the last poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Wait,
    Process,
    /// Result is delivered to the configured webhook.
    Webhook,
    Finish,
    Fatal,
    /// The service was too busy to accept the job.
    Busy,
    /// A status string this SDK does not know about.
    #[serde(other)]
    Unknown,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Wait => "wait",
            Status::Process => "process",
            Status::Webhook => "webhook",
            Status::Finish => "finish",
            Status::Fatal => "fatal",
            Status::Busy => "busy",
            Status::Unknown => "unknown",
        }
    }

    /// The job is queued or running; polling again may change the answer.
    ///
    /// `Webhook` is not pending: the outcome goes to the webhook and progress
    /// may keep reporting `webhook`.
    pub fn is_pending(&self) -> bool {
        matches!(self, Status::Wait | Status::Process)
    }

    /// The result is ready for download.
    pub fn is_finished(&self) -> bool {
        matches!(self, Status::Finish)
    }

    /// Fatal.
    pub fn is_failed(&self) -> bool {
        matches!(self, Status::Fatal)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The untyped `msg` field of an envelope.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Message {
    #[default]
    Absent,
    Text(String),
    /// Any non-string JSON value.
    Other(serde_json::Value),
}

impl Message {
    /// Render the message as text. Non-string values use their JSON form.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Message::Absent => Cow::Borrowed(""),
            Message::Text(s) => Cow::Borrowed(s),
            Message::Other(v) => Cow::Owned(v.to_string()),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Message::Absent)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl<'de> Deserialize<'de> for Message {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
            None => Message::Absent,
            Some(serde_json::Value::String(s)) => Message::Text(s),
            Some(other) => Message::Other(other),
        })
    }
}

// ---------------------------------------------------------------------------
// Request bodies (not part of the public API surface)
// ---------------------------------------------------------------------------

/// POST /transform body. `jconfig` is the job descriptor as a JSON string.
#[derive(Serialize)]
pub(crate) struct TransformRequest<'a> {
    pub api_token: &'a str,
    pub uid: &'a str,
    pub webhook: &'a str,
    pub jconfig: String,
}

/// POST /progress body.
#[derive(Serialize)]
pub(crate) struct ProgressRequest<'a> {
    pub api_token: &'a str,
    pub trans_id: &'a str,
}

/// Treat an explicit `null` like a missing field.
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// An empty status string means no status, like a missing field.
fn optional_status<'de, D>(deserializer: D) -> Result<Option<Status>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::IntoDeserializer;

    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => Status::deserialize(s.into_deserializer()).map(Some),
    }
}

/// Quota counters arrive as strings; tolerate bare numbers too.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    use serde::de::Error;

    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None => Ok(String::new()),
        Some(serde_json::Value::String(s)) => Ok(s),
        Some(serde_json::Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(D::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}
