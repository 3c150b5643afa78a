//! Opaque position tokens for keyset pagination.
//!
//! A cursor captures the sort-field value of the row at a page boundary. It is
//! serialized as a small versioned JSON payload and encoded as URL-safe base64
//! without padding, so it can travel in query strings untouched.
//!
//! Decoding is total: anything that is not a well-formed token of the current
//! version decodes to `None`, and callers fall back to the first page.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

use base64::prelude::*;
use jiff::Timestamp;
use jiff::civil::{Date, DateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use strum::Display;
use uuid::Uuid;

use crate::TRACING_TARGET_CURSOR;

/// Payload version written into every token.
const TOKEN_VERSION: u64 = 1;

/// `2^63`, the smallest float above every `i64`.
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;

/// Kind tag of a [`CursorValue`].
///
/// The declaration order is also the order used when comparing values of
/// different kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CursorKind {
    Bool,
    Number,
    Text,
    Date,
    DateTime,
    Timestamp,
    Uuid,
}

/// A scalar sort-key value that can be carried by a cursor.
///
/// Values are totally ordered: integers and floats compare by exact numeric
/// value (`-0.0 == 0`, NaNs sort below or above every number by sign), and
/// values of different kinds compare by [`CursorKind`].
///
/// Strings converted with `From` go through the same inference as
/// [`CursorValue::from_json`], so a string always maps to the kind its JSON
/// row value would have.
#[derive(Debug, Clone, derive_more::From)]
pub enum CursorValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    #[from(skip)]
    Text(String),
    Date(Date),
    DateTime(DateTime),
    Timestamp(Timestamp),
    Uuid(Uuid),
}

impl CursorValue {
    /// Returns the kind tag of this value.
    pub fn kind(&self) -> CursorKind {
        match self {
            Self::Bool(_) => CursorKind::Bool,
            Self::Int(_) | Self::Float(_) => CursorKind::Number,
            Self::Text(_) => CursorKind::Text,
            Self::Date(_) => CursorKind::Date,
            Self::DateTime(_) => CursorKind::DateTime,
            Self::Timestamp(_) => CursorKind::Timestamp,
            Self::Uuid(_) => CursorKind::Uuid,
        }
    }

    /// Converts a JSON scalar into a cursor value.
    ///
    /// Strings are inspected: RFC 3339 timestamps become [`Timestamp`]s,
    /// `YYYY-MM-DD` strings become [`Date`]s, datetimes without an offset
    /// become [`DateTime`]s, anything else stays text.
    /// Returns `None` for `null`, arrays and objects.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(Self::Int(i)),
                None => n.as_f64().map(Self::Float),
            },
            Value::String(s) => Some(Self::infer_text(s)),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    fn infer_text(s: &str) -> Self {
        if let Ok(timestamp) = s.parse::<Timestamp>() {
            return Self::Timestamp(timestamp);
        }
        // The date parser also accepts datetimes and drops the time.
        if is_date_shape(s)
            && let Ok(date) = s.parse::<Date>()
        {
            return Self::Date(date);
        }
        if let Ok(datetime) = s.parse::<DateTime>() {
            return Self::DateTime(datetime);
        }
        Self::Text(s.to_owned())
    }

    /// Canonical JSON representation used inside tokens.
    ///
    /// Temporal values and UUIDs are written as their canonical strings.
    /// Non-finite floats have no representation and become `null`.
    fn to_token_json(&self) -> Value {
        match self {
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::Number(Number::from(*i)),
            Self::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            Self::Text(s) => Value::String(s.clone()),
            Self::Date(d) => Value::String(d.to_string()),
            Self::DateTime(dt) => Value::String(dt.to_string()),
            Self::Timestamp(t) => Value::String(t.to_string()),
            Self::Uuid(u) => Value::String(u.hyphenated().to_string()),
        }
    }

    /// Reverses [`to_token_json`] for the given kind tag.
    ///
    /// [`to_token_json`]: Self::to_token_json
    fn from_token_json(kind: CursorKind, value: &Value) -> Option<Self> {
        match (kind, value) {
            (CursorKind::Bool, Value::Bool(b)) => Some(Self::Bool(*b)),
            (CursorKind::Number, Value::Number(n)) => match n.as_i64() {
                Some(i) if !n.is_f64() => Some(Self::Int(i)),
                _ => n.as_f64().filter(|f| f.is_finite()).map(Self::Float),
            },
            (CursorKind::Text, Value::String(s)) => Some(Self::Text(s.clone())),
            (CursorKind::Date, Value::String(s)) => s.parse().ok().map(Self::Date),
            (CursorKind::DateTime, Value::String(s)) => s.parse().ok().map(Self::DateTime),
            (CursorKind::Timestamp, Value::String(s)) => s.parse().ok().map(Self::Timestamp),
            (CursorKind::Uuid, Value::String(s)) => s.parse().ok().map(Self::Uuid),
            _ => None,
        }
    }
}

/// Checks for the exact `YYYY-MM-DD` layout.
fn is_date_shape(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Orders two floats numerically with `-0.0 == 0.0`; NaNs fall back to
/// IEEE 754 total ordering, which places them at the ends by sign.
fn cmp_floats(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or_else(|| a.total_cmp(&b))
}

/// Orders an integer against a float without rounding the integer.
fn cmp_int_float(int: i64, float: f64) -> Ordering {
    if float.is_nan() {
        return if float.is_sign_negative() {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }
    if float >= I64_UPPER {
        return Ordering::Less;
    }
    if float < -I64_UPPER {
        return Ordering::Greater;
    }

    // In range, so the truncated float converts to i64 exactly.
    let truncated = float.trunc();
    int.cmp(&(truncated as i64))
        .then_with(|| cmp_floats(truncated, float))
}

impl From<String> for CursorValue {
    fn from(value: String) -> Self {
        Self::infer_text(&value)
    }
}

impl From<&str> for CursorValue {
    fn from(value: &str) -> Self {
        Self::infer_text(value)
    }
}

impl PartialEq for CursorValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CursorValue {}

impl PartialOrd for CursorValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CursorValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => cmp_floats(*a, *b),
            (Self::Int(a), Self::Float(b)) => cmp_int_float(*a, *b),
            (Self::Float(a), Self::Int(b)) => cmp_int_float(*b, *a).reverse(),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::DateTime(a), Self::DateTime(b)) => a.cmp(b),
            (Self::Timestamp(a), Self::Timestamp(b)) => a.cmp(b),
            (Self::Uuid(a), Self::Uuid(b)) => a.cmp(b),
            (a, b) => a.kind().cmp(&b.kind()),
        }
    }
}

impl fmt::Display for CursorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
            Self::Date(d) => write!(f, "{d}"),
            Self::DateTime(dt) => write!(f, "{dt}"),
            Self::Timestamp(t) => write!(f, "{t}"),
            Self::Uuid(u) => write!(f, "{u}"),
        }
    }
}

/// Wire shape of a token.
#[derive(Serialize, Deserialize)]
struct CursorPayload<'a> {
    version: u64,
    field: Cow<'a, str>,
    kind: CursorKind,
    value: Value,
}

/// A position in an ordered result set.
///
/// Holds the sort-field name and the value of that field on the boundary row.
/// Cursors are produced by the paginator from real rows; callers treat the
/// encoded form as opaque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Cursor {
    /// Name of the sort field the value was read from.
    pub field: String,
    /// Value of the sort field on the boundary row.
    pub value: CursorValue,
}

impl Cursor {
    /// Creates a new cursor from a field name and its boundary value.
    pub fn new(field: impl Into<String>, value: impl Into<CursorValue>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Encodes the cursor as a URL-safe base64 string.
    ///
    /// Encoding is deterministic: equal cursors always produce equal tokens.
    pub fn encode(&self) -> String {
        let payload = CursorPayload {
            version: TOKEN_VERSION,
            field: Cow::Borrowed(&self.field),
            kind: self.value.kind(),
            value: self.value.to_token_json(),
        };

        // Strings, a unit enum and a JSON value always serialize.
        let data = serde_json::to_vec(&payload).unwrap_or_default();
        BASE64_URL_SAFE_NO_PAD.encode(data)
    }

    /// Decodes a cursor from a URL-safe base64 string.
    ///
    /// Returns `None` if the string is invalid or malformed.
    pub fn decode(encoded: &str) -> Option<Self> {
        let decoded = Self::decode_payload(encoded);
        if decoded.is_none() {
            tracing::trace!(
                target: TRACING_TARGET_CURSOR,
                token_len = encoded.len(),
                "rejected malformed cursor token"
            );
        }

        decoded
    }

    fn decode_payload(encoded: &str) -> Option<Self> {
        let bytes = BASE64_URL_SAFE_NO_PAD.decode(encoded).ok()?;
        let payload: CursorPayload = serde_json::from_slice(&bytes).ok()?;
        if payload.version != TOKEN_VERSION {
            return None;
        }

        let value = CursorValue::from_token_json(payload.kind, &payload.value)?;

        Some(Self {
            field: payload.field.into_owned(),
            value,
        })
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl From<Cursor> for String {
    fn from(cursor: Cursor) -> Self {
        cursor.encode()
    }
}

impl TryFrom<String> for Cursor {
    type Error = &'static str;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Cursor::decode(&value).ok_or("invalid cursor format")
    }
}
