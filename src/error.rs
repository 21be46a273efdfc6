use thiserror::Error;

/// Errors raised by the position pipeline and ephemeris source selection.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EphemerisError {
    #[error("unrecognized celestial body: {0}")]
    UnknownBody(String),
    #[error("high-precision ephemeris required but none was provided")]
    MissingEphemeris,
    #[error("position unavailable for {body}: {reason}")]
    PositionUnavailable { body: String, reason: String },
}

impl EphemerisError {
    pub fn unavailable(body: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PositionUnavailable {
            body: body.into(),
            reason: reason.into(),
        }
    }
}
