use thiserror::Error;

/// Errors shared by every pcadither crate.
///
/// A pass either returns a complete halftone grid or one of these; there is
/// no partial result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PdError {
    /// Bad threshold, mode selector, or grid dimensions.
    #[error("Paramètre invalide : {0}")]
    InvalidParameter(String),

    /// Input image missing, unreadable or corrupt.
    #[error("Impossible de charger {path} : {reason}")]
    ImageLoad {
        /// Path that failed to load.
        path: String,
        /// Decoder or filesystem message.
        reason: String,
    },

    /// Output image could not be written.
    #[error("Impossible d'écrire {path} : {reason}")]
    ImageSave {
        /// Destination path.
        path: String,
        /// Encoder or filesystem message.
        reason: String,
    },

    /// Unexpected fault while scanning.
    #[error("Erreur de traitement : {0}")]
    Processing(String),
}

impl PdError {
    /// Shorthand for [`PdError::InvalidParameter`].
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Shorthand for [`PdError::Processing`].
    pub fn processing(msg: impl Into<String>) -> Self {
        Self::Processing(msg.into())
    }
}
