//! Error codes for the Durak backend edge (HTTP problem bodies and
//! WebSocket `error` frames).
//!
//! Add new codes here; never pass ad-hoc strings as error codes.
//! All codes are SCREAMING_SNAKE_CASE.

use core::fmt;

/// Centralized error codes.
///
/// Rule violations inside a match are deliberately absent: illegal moves
/// are rejected silently and never surface a code to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Request Validation
    /// Message could not be decoded
    BadRequest,
    /// Unsupported protocol version
    BadProtocol,
    /// Card token could not be parsed
    ParseCard,
    /// Stake outside the configured bounds
    InvalidStake,
    /// Invalid user id in path or payload
    InvalidUserId,
    /// General validation error
    ValidationError,

    // Resource Not Found
    /// Match not found among active matches
    MatchNotFound,
    /// General not found error
    NotFound,

    // Conflicts
    /// User already seated in an active match
    AlreadyInMatch,
    /// Generic conflict
    Conflict,

    // System Errors
    /// Match mailbox is no longer accepting commands
    MailboxClosed,
    /// Internal server error
    Internal,
    /// Configuration error
    ConfigError,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BadRequest => "BAD_REQUEST",
            Self::BadProtocol => "BAD_PROTOCOL",
            Self::ParseCard => "PARSE_CARD",
            Self::InvalidStake => "INVALID_STAKE",
            Self::InvalidUserId => "INVALID_USER_ID",
            Self::ValidationError => "VALIDATION_ERROR",

            Self::MatchNotFound => "MATCH_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",

            Self::AlreadyInMatch => "ALREADY_IN_MATCH",
            Self::Conflict => "CONFLICT",

            Self::MailboxClosed => "MAILBOX_CLOSED",
            Self::Internal => "INTERNAL",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
