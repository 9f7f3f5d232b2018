//! Decryptor trait.

use super::documents_errors::DecryptError;
use super::documents_model::{Credential, ExtractedText, RawDocument};

/// Opens a statement with a caller-supplied credential and returns its text.
///
/// Implementations make exactly one decryption attempt per call and never write
/// the plaintext anywhere durable.
pub trait DocumentDecryptorTrait: Send + Sync {
    fn decrypt(
        &self,
        document: &RawDocument,
        credential: &Credential,
    ) -> std::result::Result<ExtractedText, DecryptError>;
}
