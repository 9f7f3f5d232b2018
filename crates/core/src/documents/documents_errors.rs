use thiserror::Error;

/// Failures while opening a statement and pulling its text out.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecryptError {
    #[error("The statement is password protected; please provide its password")]
    PasswordRequired,

    #[error("Incorrect password for the statement")]
    InvalidPassword,

    #[error("The file is not a valid statement document: {0}")]
    MalformedDocument(String),

    #[error("The statement uses an encryption scheme that cannot be opened: {0}")]
    UnsupportedEncryption(String),

    #[error("Unsupported document type '{0}'")]
    UnsupportedMediaType(String),

    #[error("Document is {size} bytes, larger than the {limit} byte limit")]
    DocumentTooLarge { size: usize, limit: usize },
}

impl DecryptError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            DecryptError::PasswordRequired => "PASSWORD_REQUIRED",
            DecryptError::InvalidPassword => "INVALID_PASSWORD",
            DecryptError::MalformedDocument(_) => "MALFORMED_DOCUMENT",
            DecryptError::UnsupportedEncryption(_) => "UNSUPPORTED_ENCRYPTION",
            DecryptError::UnsupportedMediaType(_) => "UNSUPPORTED_MEDIA_TYPE",
            DecryptError::DocumentTooLarge { .. } => "DOCUMENT_TOO_LARGE",
        }
    }

    /// Whether resubmitting the same document with another credential can succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DecryptError::PasswordRequired | DecryptError::InvalidPassword
        )
    }
}
