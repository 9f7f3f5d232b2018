//! Default decryptor: password-protected PDFs via `lopdf`, plain text as-is.

use std::collections::BTreeMap;

use log::{debug, info, warn};
use lopdf::encryption::DecryptionError;
use lopdf::{Document, Encoding, Object, ObjectId};

use super::documents_errors::DecryptError;
use super::documents_model::{Credential, ExtractedText, RawDocument};
use super::documents_traits::DocumentDecryptorTrait;
use crate::constants::{DEFAULT_MAX_DOCUMENT_BYTES, PDF_MAGIC, PDF_MEDIA_TYPE, TEXT_MEDIA_TYPE};

type DecryptResult<T> = std::result::Result<T, DecryptError>;

/// Decryptor for the media types a statement can be uploaded as.
#[derive(Debug, Clone)]
pub struct DocumentDecryptor {
    max_document_bytes: usize,
}

impl Default for DocumentDecryptor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DOCUMENT_BYTES)
    }
}

impl DocumentDecryptor {
    pub fn new(max_document_bytes: usize) -> Self {
        Self { max_document_bytes }
    }

    fn decrypt_pdf(&self, bytes: &[u8], credential: &Credential) -> DecryptResult<ExtractedText> {
        if !bytes.starts_with(PDF_MAGIC) {
            return Err(DecryptError::MalformedDocument(
                "missing PDF header".to_string(),
            ));
        }

        // Owner-only documents come back already decrypted with the empty user password.
        let mut document = Document::load_mem(bytes).map_err(|e| {
            debug!("lopdf refused the document: {}", e);
            DecryptError::MalformedDocument(e.to_string())
        })?;

        if document.is_encrypted() {
            document
                .authenticate_password(credential.expose())
                .map_err(|e| authentication_error(e, credential))?;
            document = Document::load_mem_with_password(bytes, credential.expose())
                .map_err(|e| authentication_error(e, credential))?;
            debug!("PDF decrypted");
        } else if !credential.is_empty() && !document.was_encrypted() {
            debug!("Credential supplied for an unencrypted PDF; ignoring it");
        }

        let pages = document.get_pages();
        if pages.is_empty() {
            return Err(DecryptError::MalformedDocument(
                "document has no pages".to_string(),
            ));
        }

        let mut page_texts = Vec::with_capacity(pages.len());
        let mut failed_pages = 0usize;
        for (page_number, page_id) in &pages {
            match page_lines(&document, *page_id) {
                Ok(lines) => page_texts.push(lines.join("\n")),
                Err(e) => {
                    failed_pages += 1;
                    warn!("Skipping page {}: text extraction failed: {}", page_number, e);
                }
            }
        }

        if page_texts.is_empty() {
            return Err(DecryptError::MalformedDocument(format!(
                "text extraction failed on all {} pages",
                failed_pages
            )));
        }

        info!(
            "Extracted text from {} of {} PDF pages",
            page_texts.len(),
            pages.len()
        );
        Ok(ExtractedText::from_pages(page_texts))
    }

    fn decode_text(&self, bytes: &[u8]) -> DecryptResult<ExtractedText> {
        // UTF-8 BOM (EF BB BF)
        let content = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
        let text = std::str::from_utf8(content).map_err(|e| {
            DecryptError::MalformedDocument(format!(
                "invalid UTF-8 at byte {}",
                e.valid_up_to()
            ))
        })?;
        Ok(ExtractedText::from_pages([text]))
    }
}

impl DocumentDecryptorTrait for DocumentDecryptor {
    fn decrypt(
        &self,
        document: &RawDocument,
        credential: &Credential,
    ) -> DecryptResult<ExtractedText> {
        if document.size() > self.max_document_bytes {
            return Err(DecryptError::DocumentTooLarge {
                size: document.size(),
                limit: self.max_document_bytes,
            });
        }

        let media_type = document.media_type();
        debug!(
            "Opening {} document of {} bytes",
            media_type,
            document.size()
        );

        match media_type.as_str() {
            PDF_MEDIA_TYPE => self.decrypt_pdf(document.bytes(), credential),
            TEXT_MEDIA_TYPE => self.decode_text(document.bytes()),
            other => Err(DecryptError::UnsupportedMediaType(other.to_string())),
        }
    }
}

/// Maps a failed password check to what the caller can act on.
fn authentication_error(error: lopdf::Error, credential: &Credential) -> DecryptError {
    debug!("PDF authentication failed: {}", error);
    match error {
        lopdf::Error::InvalidPassword
        | lopdf::Error::Decryption(DecryptionError::IncorrectPassword)
        | lopdf::Error::Decryption(DecryptionError::StringPrep(_)) => {
            if credential.is_empty() {
                DecryptError::PasswordRequired
            } else {
                DecryptError::InvalidPassword
            }
        }
        lopdf::Error::UnsupportedSecurityHandler(handler) => DecryptError::UnsupportedEncryption(
            format!("security handler {}", String::from_utf8_lossy(&handler)),
        ),
        lopdf::Error::Decryption(
            e @ (DecryptionError::UnsupportedEncryption
            | DecryptionError::UnsupportedVersion
            | DecryptionError::UnsupportedRevision),
        ) => DecryptError::UnsupportedEncryption(e.to_string()),
        other => DecryptError::MalformedDocument(other.to_string()),
    }
}

/// Text of one page, one entry per visual line.
///
/// Lines break at the text-positioning operators, not only at `ET` as
/// `Document::extract_text` does, so a text object laid out with `Td`/`T*`
/// still yields one line per row.
fn page_lines(document: &Document, page_id: ObjectId) -> lopdf::Result<Vec<String>> {
    let fonts = document.get_page_fonts(page_id)?;
    let encodings: BTreeMap<Vec<u8>, Encoding> = fonts
        .into_iter()
        .filter_map(|(name, font)| match font.get_font_encoding(document) {
            Ok(encoding) => Some((name, encoding)),
            Err(e) => {
                debug!("No usable encoding for font {}: {}", String::from_utf8_lossy(&name), e);
                None
            }
        })
        .collect();
    let content = document.get_and_decode_page_content(page_id)?;

    let mut lines = LineBuffer::default();
    let mut encoding: Option<&Encoding> = None;
    let mut baseline: Option<f32> = None;
    for operation in &content.operations {
        let operands = operation.operands.as_slice();
        match operation.operator.as_str() {
            "Tf" => {
                encoding = operands
                    .first()
                    .and_then(|name| name.as_name().ok())
                    .and_then(|name| encodings.get(name));
            }
            "Td" | "TD" => match operands.get(1).and_then(|ty| ty.as_float().ok()) {
                Some(ty) if ty != 0.0 => lines.break_line(),
                _ => lines.separate(),
            },
            "Tm" => {
                let y = operands.get(5).and_then(|f| f.as_float().ok());
                if y.is_some() && y != baseline {
                    lines.break_line();
                } else {
                    lines.separate();
                }
                baseline = y;
            }
            "T*" => lines.break_line(),
            "BT" | "ET" => {
                lines.break_line();
                baseline = None;
            }
            "Tj" | "TJ" => lines.show(encoding, operands)?,
            // ' and " move to the next line before showing their string operand.
            "'" | "\"" => {
                lines.break_line();
                lines.show(encoding, operands.last().map(std::slice::from_ref).unwrap_or(&[]))?;
            }
            _ => {}
        }
    }
    Ok(lines.finish())
}

#[derive(Default)]
struct LineBuffer {
    lines: Vec<String>,
    current: String,
}

impl LineBuffer {
    fn break_line(&mut self) {
        let line = std::mem::take(&mut self.current);
        let line = line.trim();
        if !line.is_empty() {
            self.lines.push(line.to_string());
        }
    }

    /// Horizontal move on the same baseline; keeps neighbouring cells apart.
    fn separate(&mut self) {
        if !self.current.is_empty() && !self.current.ends_with(' ') {
            self.current.push(' ');
        }
    }

    fn show(&mut self, encoding: Option<&Encoding>, operands: &[Object]) -> lopdf::Result<()> {
        let Some(encoding) = encoding else {
            warn!("Text shown without a decodable font; skipping it");
            return Ok(());
        };
        for operand in operands {
            match operand {
                Object::String(bytes, _) => {
                    self.current.push_str(&Document::decode_text(encoding, bytes)?);
                }
                Object::Array(items) => self.show(Some(encoding), items)?,
                // Large negative kerning in a TJ array is a word gap.
                Object::Integer(i) if *i < -100 => self.separate(),
                Object::Real(r) if *r < -100.0 => self.separate(),
                _ => {}
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Vec<String> {
        self.break_line();
        self.lines
    }
}
