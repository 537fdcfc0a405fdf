/// Page state definitions for tracking crawl progress
///
/// Every frontier item moves `Pending -> Fetching -> <terminal>` exactly once.
use crate::output::ErrorKind;
use std::fmt;

/// Represents the current state of a frontier item in the crawl process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    // ===== Active States =====
    /// Item is queued and waiting to be fetched
    Pending,

    /// Item is currently being fetched and analysed
    Fetching,

    // ===== Terminal Success States =====
    /// Text was extracted and the keyword occurred at least once
    Matched,

    /// Text was extracted but the keyword did not occur
    Unmatched,

    // ===== Terminal Error States =====
    /// HTTP 403/429 or a bot-protection challenge page
    Blocked,

    /// Declared or downloaded body exceeded the byte budget
    SkippedSize,

    /// Content type is intentionally not processed
    SkippedType,

    /// Transport failure or non-success HTTP status
    NetworkError,

    /// Structured extraction failed; fallback text was used instead
    ParseError,
}

impl PageState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    /// Returns true if this is an active state (item may still be processed)
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Fetching)
    }

    /// Maps a terminal error state onto the error counter it increments
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Blocked => Some(ErrorKind::Blocked),
            Self::SkippedSize => Some(ErrorKind::SkippedSize),
            Self::SkippedType => Some(ErrorKind::SkippedType),
            Self::NetworkError => Some(ErrorKind::NetworkError),
            Self::ParseError => Some(ErrorKind::ParseError),
            Self::Pending | Self::Fetching | Self::Matched | Self::Unmatched => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetching => "fetching",
            Self::Matched => "matched",
            Self::Unmatched => "unmatched",
            Self::Blocked => "blocked",
            Self::SkippedSize => "skipped_size",
            Self::SkippedType => "skipped_type",
            Self::NetworkError => "network_error",
            Self::ParseError => "parse_error",
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
