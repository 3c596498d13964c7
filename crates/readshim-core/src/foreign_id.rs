use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A positive integer identifier in the legacy "foreign" ID scheme.
///
/// Foreign IDs are extracted from the last segment of a request path, e.g.
/// `/book/show/123-some-title` yields `123`. Existence is not checked here;
/// the upstream lookup decides that.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForeignId(i64);

impl ForeignId {
    /// Creates a `ForeignId` after checking that it is positive.
    pub fn new(id: i64) -> Result<Self, Error> {
        if id <= 0 {
            return Err(Error::BadRequest(format!("expected {id} to be positive")));
        }
        Ok(Self(id))
    }

    /// Parses the first signed integer found in the last segment of `path`.
    pub fn from_path(path: &str) -> Result<Self, Error> {
        let segment = last_segment(path);
        let digits = first_integer(segment)
            .ok_or_else(|| Error::BadRequest(format!("no id found in {segment:?}")))?;
        let id = digits
            .parse::<i64>()
            .map_err(|e| Error::BadRequest(format!("invalid id {digits:?}: {e}")))?;
        Self::new(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl Display for ForeignId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ForeignId> for i64 {
    fn from(id: ForeignId) -> Self {
        id.0
    }
}

/// Last element of a slash-separated path, ignoring trailing slashes.
fn last_segment(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// Leftmost match of `-?[0-9]+`.
fn first_integer(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let first_digit = bytes.iter().position(u8::is_ascii_digit)?;
    let start = if first_digit > 0 && bytes[first_digit - 1] == b'-' {
        first_digit - 1
    } else {
        first_digit
    };
    let end = bytes[first_digit..]
        .iter()
        .position(|b| !b.is_ascii_digit())
        .map_or(bytes.len(), |len| first_digit + len);
    Some(&s[start..end])
}
