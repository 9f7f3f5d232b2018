//! Documents module - raw uploads, credentials and text extraction.

mod decryptor;
mod documents_errors;
mod documents_model;
mod documents_traits;

pub use decryptor::DocumentDecryptor;
pub use documents_errors::DecryptError;
pub use documents_model::{Credential, ExtractedText, RawDocument};
pub use documents_traits::DocumentDecryptorTrait;
