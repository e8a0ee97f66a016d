use crate::{ODataError, ODataResult};
use std::{fmt, str::FromStr};

const CURSOR_PREFIX: &str = "cursor_";
const OFFSET_PREFIX: &str = "skip_";

/// Where in a collection a page request starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageState {
    /// No skip token: the first page, which also requests `$count`.
    FirstPage,
    Continuation(Cursor),
}

impl PageState {
    /// Interpret an optional skip token. Only an absent or empty token means
    /// the first page; any other value is a continuation.
    pub fn from_skip_token(token: Option<&str>) -> ODataResult<Self> {
        match token {
            None | Some("") => Ok(Self::FirstPage),
            Some(token) => Ok(Self::Continuation(token.parse()?)),
        }
    }

    pub fn is_first_page(&self) -> bool {
        matches!(self, Self::FirstPage)
    }
}

/// A continuation cursor as carried by a `skipToken`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cursor {
    /// `cursor_<value>`: the sort-field value of the last row already seen,
    /// held unescaped. On the wire single quotes are doubled.
    After(String),

    /// An opaque `$skiptoken` issued by the server in `@odata.nextLink`.
    SkipToken(String),

    /// `skip_<n>`: legacy numeric offset. Parsed but not applied, since
    /// Dataverse rejects `$skip`.
    Offset(u64),
}

impl FromStr for Cursor {
    type Err = ODataError;

    fn from_str(s: &str) -> ODataResult<Self> {
        if let Some(value) = s.strip_prefix(CURSOR_PREFIX) {
            return Ok(Self::After(unescape_odata_string(value)));
        }

        if let Some(offset) = s.strip_prefix(OFFSET_PREFIX) {
            return offset
                .parse()
                .map(Self::Offset)
                .map_err(|_| ODataError::InvalidSkipToken(s.to_string()));
        }

        Ok(Self::SkipToken(s.to_string()))
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::After(value) => {
                write!(f, "{CURSOR_PREFIX}{}", escape_odata_string(value))
            }
            Self::SkipToken(token) => f.write_str(token),
            Self::Offset(n) => write!(f, "{OFFSET_PREFIX}{n}"),
        }
    }
}

/// Escape a value for use inside an OData string literal (`'` becomes `''`).
pub fn escape_odata_string(value: &str) -> String {
    value.replace('\'', "''")
}

/// Inverse of [`escape_odata_string`].
pub fn unescape_odata_string(value: &str) -> String {
    value.replace("''", "'")
}
