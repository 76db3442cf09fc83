use {
    std::{collections::BTreeMap, io},
    serde::{Serialize, Deserialize, de::DeserializeOwned},
    serde_json::ser::{Formatter, Serializer},
    http::StatusCode,
    thiserror::Error,
};

/// Table used when `TABLE_NAME` is not set.
pub const DEFAULT_TABLE_NAME: &str = "resume-visitor-counter";

/// There is exactly one counter, so every invocation targets the same record.
pub const COUNTER_KEY: &str = "counter";
pub const PARTITION_KEY_ATTRIBUTE: &str = "pk";
pub const COUNT_ATTRIBUTE: &str = "count";

pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Body returned to visitors: `{"count": <n>}`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CountBody {
    pub count: u64,
}

/// Response envelope understood by the HTTP gateway in front of the function.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResponse {
    #[serde(with = "http_serde::status_code")]
    pub status_code: StatusCode,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl InvocationResponse {
    pub fn new(status_code: StatusCode) -> Self {
        Self {
            status_code,
            headers: BTreeMap::new(),
            body: String::new(),
        }
    }

    /// Body is written with `", "` and `": "` separators, so `{"count": 1}` rather than `{"count":1}`.
    pub fn json<T: Serialize>(status_code: StatusCode, body: &T) -> Result<Self, ResponseError> {
        let mut buffer = Vec::new();
        body.serialize(&mut Serializer::with_formatter(&mut buffer, SpacedFormatter))
            .map_err(|err| ResponseError::SerializationError { reason: err.to_string() })?;
        let body = String::from_utf8(buffer)
            .map_err(|err| ResponseError::SerializationError { reason: err.to_string() })?;

        Ok(Self::new(status_code)
            .with_header(HEADER_CONTENT_TYPE, CONTENT_TYPE_JSON)
            .with_body(body))
    }

    pub fn count(count: u64) -> Result<Self, ResponseError> {
        Self::json(StatusCode::OK, &CountBody { count })
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn parse_body<T: DeserializeOwned>(&self) -> Result<T, ResponseError> {
        serde_json::from_str(&self.body)
            .map_err(|err| ResponseError::DeserializationError { reason: err.to_string() })
    }
}

/// Single-line json with a space after every separator.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}

#[derive(Error, Debug, Eq, PartialEq)]
pub enum ResponseError {
    #[error("failed to serialize response body: {reason}")]
    SerializationError { reason: String },

    #[error("failed to deserialize response body: {reason}")]
    DeserializationError { reason: String },
}
