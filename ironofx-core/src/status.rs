/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! OFX status codes.
//!
//! Servers report the outcome of every request as a numeric code. The codes
//! defined by the protocol are listed in [`KnownCode`]; anything else a server
//! sends is carried as [`StatusCode::Unknown`] so that new codes never break
//! parsing.

use crate::wire_enum;
use serde::{Deserialize, Serialize};
use std::fmt;

wire_enum! {
    /// Severity of a status code.
    #[derive(Serialize, Deserialize)]
    pub enum Severity {
        /// Informational only.
        Info => "INFO",
        /// Warning; the request may have partially succeeded.
        Warn => "WARN",
        /// The request failed.
        Error => "ERROR",
    }
}

/// Status codes defined by the OFX specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnownCode {
    /// 0: Success.
    Success,
    /// 1: Client is up-to-date.
    ClientUpToDate,
    /// 2000: General error.
    GeneralError,
    /// 2002: General account error.
    GeneralAccountError,
    /// 2003: Account not found.
    AccountNotFound,
    /// 2004: Account closed.
    AccountClosed,
    /// 2005: Account not authorized.
    AccountNotAuthorized,
    /// 2014: Date too soon.
    DateTooSoon,
    /// 2019: Duplicate request.
    DuplicateRequest,
    /// 2021: Unsupported version.
    UnsupportedVersion,
    /// 2022: Invalid transaction authorization number.
    InvalidTan,
    /// 3000: Further authentication required.
    MfaChallengeRequired,
    /// 3001: MFA failed.
    MfaChallengeFailed,
    /// 14701: No tax data for account.
    NoData,
    /// 14702: Database error.
    DbException,
    /// 14703: Tax year not supported.
    NoTaxSupport,
    /// 15000: Password change required.
    PasswordChangeRequired,
    /// 15500: Invalid signon.
    SignonInvalid,
    /// 15501: Customer account in use.
    CustomerAccountInUse,
    /// 15502: Password locked.
    PasswordLocked,
    /// 15510: Invalid client UID.
    InvalidClientUid,
    /// 15511: User must contact FI.
    ContactFi,
    /// 15512: Auth token required.
    AuthTokenRequired,
    /// 15513: Invalid auth token.
    InvalidAuthToken,
}

impl KnownCode {
    /// Every known code, in ascending numeric order.
    pub const ALL: &'static [KnownCode] = &[
        Self::Success,
        Self::ClientUpToDate,
        Self::GeneralError,
        Self::GeneralAccountError,
        Self::AccountNotFound,
        Self::AccountClosed,
        Self::AccountNotAuthorized,
        Self::DateTooSoon,
        Self::DuplicateRequest,
        Self::UnsupportedVersion,
        Self::InvalidTan,
        Self::MfaChallengeRequired,
        Self::MfaChallengeFailed,
        Self::NoData,
        Self::DbException,
        Self::NoTaxSupport,
        Self::PasswordChangeRequired,
        Self::SignonInvalid,
        Self::CustomerAccountInUse,
        Self::PasswordLocked,
        Self::InvalidClientUid,
        Self::ContactFi,
        Self::AuthTokenRequired,
        Self::InvalidAuthToken,
    ];

    /// Returns the numeric code.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::Success => 0,
            Self::ClientUpToDate => 1,
            Self::GeneralError => 2000,
            Self::GeneralAccountError => 2002,
            Self::AccountNotFound => 2003,
            Self::AccountClosed => 2004,
            Self::AccountNotAuthorized => 2005,
            Self::DateTooSoon => 2014,
            Self::DuplicateRequest => 2019,
            Self::UnsupportedVersion => 2021,
            Self::InvalidTan => 2022,
            Self::MfaChallengeRequired => 3000,
            Self::MfaChallengeFailed => 3001,
            Self::NoData => 14701,
            Self::DbException => 14702,
            Self::NoTaxSupport => 14703,
            Self::PasswordChangeRequired => 15000,
            Self::SignonInvalid => 15500,
            Self::CustomerAccountInUse => 15501,
            Self::PasswordLocked => 15502,
            Self::InvalidClientUid => 15510,
            Self::ContactFi => 15511,
            Self::AuthTokenRequired => 15512,
            Self::InvalidAuthToken => 15513,
        }
    }

    /// Returns the human readable message for the code.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::ClientUpToDate => "Client is up-to-date",
            Self::GeneralError => "General error.",
            Self::GeneralAccountError => "General account error.",
            Self::AccountNotFound => "Account not found.",
            Self::AccountClosed => "Account closed.",
            Self::AccountNotAuthorized => "Account not authorized.",
            Self::DateTooSoon => "Date too soon",
            Self::DuplicateRequest => "Duplicate request.",
            Self::UnsupportedVersion => "Unsupported version",
            Self::InvalidTan => "Invalid transaction authorization number.",
            Self::MfaChallengeRequired => "Further authentication required.",
            Self::MfaChallengeFailed => "MFA failed.",
            Self::NoData => "No Tax Data for Account.",
            Self::DbException => "Database error has occured.",
            Self::NoTaxSupport => "This Tax Year is not supported.",
            Self::PasswordChangeRequired => "Password change required.",
            Self::SignonInvalid => "Invalid signon",
            Self::CustomerAccountInUse => "Customer account in use.",
            Self::PasswordLocked => "Password locked.",
            Self::InvalidClientUid => "Invalid client UID.",
            Self::ContactFi => "User must contact FI.",
            Self::AuthTokenRequired => "Auth token required.",
            Self::InvalidAuthToken => "Invalid auth token.",
        }
    }

    /// Returns the severity the protocol assigns to the code.
    #[must_use]
    pub const fn default_severity(self) -> Severity {
        match self {
            Self::Success | Self::ClientUpToDate | Self::PasswordChangeRequired => Severity::Info,
            _ => Severity::Error,
        }
    }

    /// Looks up a known code by number.
    #[must_use]
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|known| known.code() == code)
    }
}

/// A status code as sent by a server: either one of the known codes or an
/// unrecognized one carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusCode {
    /// A code defined by the protocol.
    Known(KnownCode),
    /// A code this engine does not know about.
    Unknown {
        /// The raw numeric code.
        code: u32,
        /// Placeholder message.
        message: String,
        /// Severity assigned to unknown codes.
        severity: Severity,
    },
}

impl StatusCode {
    /// Resolves a numeric code, wrapping unrecognized codes with severity `ERROR`.
    #[must_use]
    pub fn from_code(code: u32) -> Self {
        match KnownCode::from_code(code) {
            Some(known) => Self::Known(known),
            None => Self::Unknown {
                code,
                message: "Unknown status code.".to_string(),
                severity: Severity::Error,
            },
        }
    }

    /// Returns the numeric code.
    #[must_use]
    pub fn code(&self) -> u32 {
        match self {
            Self::Known(known) => known.code(),
            Self::Unknown { code, .. } => *code,
        }
    }

    /// Returns the message associated with the code.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Known(known) => known.message(),
            Self::Unknown { message, .. } => message,
        }
    }

    /// Returns the default severity of the code.
    #[must_use]
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::Known(known) => known.default_severity(),
            Self::Unknown { severity, .. } => *severity,
        }
    }

    /// Returns true if the code is one of the protocol-defined codes.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }
}

impl Default for StatusCode {
    fn default() -> Self {
        Self::Known(KnownCode::Success)
    }
}

impl From<KnownCode> for StatusCode {
    fn from(known: KnownCode) -> Self {
        Self::Known(known)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_code_lookup() {
        assert_eq!(KnownCode::from_code(0), Some(KnownCode::Success));
        assert_eq!(KnownCode::from_code(15500), Some(KnownCode::SignonInvalid));
        assert_eq!(KnownCode::from_code(42), None);
    }

    #[test]
    fn test_known_codes_ascending() {
        let codes: Vec<u32> = KnownCode::ALL.iter().map(|k| k.code()).collect();
        let mut sorted = codes.clone();
        sorted.sort_unstable();
        assert_eq!(codes, sorted);
    }

    #[test]
    fn test_unknown_code_wraps_with_error_severity() {
        let status = StatusCode::from_code(9999);
        assert!(!status.is_known());
        assert_eq!(status.code(), 9999);
        assert_eq!(status.default_severity(), Severity::Error);
        assert_eq!(status.message(), "Unknown status code.");
        assert_eq!(status.to_string(), "9999");
    }

    #[test]
    fn test_default_severity() {
        assert_eq!(KnownCode::Success.default_severity(), Severity::Info);
        assert_eq!(
            KnownCode::PasswordChangeRequired.default_severity(),
            Severity::Info
        );
        assert_eq!(KnownCode::AccountClosed.default_severity(), Severity::Error);
    }

    #[test]
    fn test_severity_keys() {
        assert_eq!(Severity::KEYS, &["INFO", "WARN", "ERROR"]);
        assert_eq!(Severity::Warn.key(), "WARN");
    }
}
