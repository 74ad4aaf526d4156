/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! The `STATUS` aggregate carried by every OFX response.

use ironofx_core::{KnownCode, Severity, StatusCode};
use ironofx_derive::Aggregate;

/// Outcome of a request, as reported by the server.
#[derive(Debug, Clone, Default, PartialEq, Aggregate)]
#[ofx(name = "STATUS")]
pub struct Status {
    /// Status code.
    #[ofx(element = "CODE", order = 0, required)]
    pub code: Option<StatusCode>,
    /// Severity of the status.
    #[ofx(element = "SEVERITY", order = 10, required)]
    pub severity: Option<Severity>,
    /// Server-supplied message.
    #[ofx(element = "MESSAGE", order = 20)]
    pub message: Option<String>,
}

impl Status {
    /// Creates a status with the code's default severity.
    #[must_use]
    pub fn new(code: impl Into<StatusCode>) -> Self {
        let code = code.into();
        Self {
            severity: Some(code.default_severity()),
            code: Some(code),
            message: None,
        }
    }

    /// A successful status.
    #[must_use]
    pub fn success() -> Self {
        Self::new(KnownCode::Success)
    }

    /// Sets the message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Returns true if the severity is not `ERROR`.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        !matches!(self.severity, Some(Severity::Error))
    }
}
