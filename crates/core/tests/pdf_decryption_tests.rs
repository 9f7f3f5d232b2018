//! Statements rendered as real PDFs, encrypted with the standard security
//! handler, and opened through `DocumentDecryptor`.

use std::collections::BTreeMap;
use std::sync::Arc;

use lopdf::encryption::crypt_filters::{Aes128CryptFilter, CryptFilter};
use lopdf::{dictionary, Document, EncryptionState, EncryptionVersion, Object, Permissions, Stream};
use rust_decimal::Decimal;

use casfolio_core::constants::PDF_MEDIA_TYPE;
use casfolio_core::documents::{DecryptError, DocumentDecryptor, DocumentDecryptorTrait};
use casfolio_core::holdings::extract;
use casfolio_core::{Credential, RawDocument};

const USER_PASSWORD: &str = "secret";
const OWNER_PASSWORD: &str = "owner-only";

/// One text object, every line placed with a positioning operator.
const SINGLE_BT_STATEMENT: &[u8] = b"BT
/F1 11 Tf
14 TL
72 720 Td
(ABC Equity Fund - Direct Growth) Tj
0 -14 Td
(Folio No: 12345678) Tj
0 -14 Td
(Units:) Tj
90 0 Td
(100) Tj
-90 -14 Td
[(NAV:) -250 (50.00)] TJ
T*
(Market Value: 5,000.00) Tj
ET
";

const STATEMENT_LINES: [&str; 5] = [
    "ABC Equity Fund - Direct Growth",
    "Folio No: 12345678",
    "Units: 100",
    "NAV: 50.00",
    "Market Value: 5,000.00",
];

#[derive(Clone, Copy)]
enum Cipher {
    Rc4,
    Aes,
}

fn statement_document(content: &[u8]) -> Document {
    let mut doc = Document::with_version("1.5");
    doc.trailer.set(
        "ID",
        Object::Array(vec![
            Object::string_literal(b"casfolio-file-id".to_vec()),
            Object::string_literal(b"casfolio-file-id".to_vec()),
        ]),
    );

    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.to_vec()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(612), Object::Integer(792)],
        "Resources" => dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        },
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

fn encrypt(doc: &mut Document, cipher: Cipher, user_password: &str) {
    let version = match cipher {
        Cipher::Rc4 => EncryptionVersion::V2 {
            document: doc,
            owner_password: OWNER_PASSWORD,
            user_password,
            key_length: 128,
            permissions: Permissions::all(),
        },
        Cipher::Aes => {
            let filter: Arc<dyn CryptFilter> = Arc::new(Aes128CryptFilter);
            EncryptionVersion::V4 {
                document: doc,
                encrypt_metadata: true,
                crypt_filters: BTreeMap::from([(b"StdCF".to_vec(), filter)]),
                stream_filter: b"StdCF".to_vec(),
                string_filter: b"StdCF".to_vec(),
                owner_password: OWNER_PASSWORD,
                user_password,
                permissions: Permissions::all(),
            }
        }
    };
    let state = EncryptionState::try_from(version).unwrap();
    doc.encrypt(&state).unwrap();
}

fn save(mut doc: Document) -> RawDocument {
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    RawDocument::new(bytes, PDF_MEDIA_TYPE)
}

/// Statement PDF encrypted with `cipher`; an empty `user_password` leaves only
/// the owner password set.
fn encrypted_statement(cipher: Cipher, user_password: &str) -> RawDocument {
    let mut doc = statement_document(SINGLE_BT_STATEMENT);
    encrypt(&mut doc, cipher, user_password);
    save(doc)
}

fn open(document: &RawDocument, password: &str) -> Result<Vec<String>, DecryptError> {
    DocumentDecryptor::default()
        .decrypt(document, &Credential::new(password))
        .map(|text| text.lines().to_vec())
}

#[test]
fn test_single_text_object_yields_one_line_per_positioned_line() {
    let document = save(statement_document(SINGLE_BT_STATEMENT));

    let lines = open(&document, "").unwrap();

    assert_eq!(lines, STATEMENT_LINES);
}

#[test]
fn test_unencrypted_statement_pdf_extracts_a_holding() {
    let document = save(statement_document(SINGLE_BT_STATEMENT));
    let text = DocumentDecryptor::default()
        .decrypt(&document, &Credential::empty())
        .unwrap();

    let candidates: Vec<_> = extract(text).collect();

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].scheme_name, "ABC Equity Fund - Direct Growth");
    assert_eq!(candidates[0].folio_number.as_deref(), Some("12345678"));
    assert_eq!(candidates[0].current_value, Decimal::new(500_000, 2));
}

#[test]
fn test_correct_user_password_opens_both_ciphers() {
    for cipher in [Cipher::Rc4, Cipher::Aes] {
        let document = encrypted_statement(cipher, USER_PASSWORD);

        assert_eq!(open(&document, USER_PASSWORD).unwrap(), STATEMENT_LINES);
    }
}

#[test]
fn test_wrong_password_is_invalid_for_both_ciphers() {
    for cipher in [Cipher::Rc4, Cipher::Aes] {
        let document = encrypted_statement(cipher, USER_PASSWORD);

        assert_eq!(open(&document, "wrong"), Err(DecryptError::InvalidPassword));
    }
}

#[test]
fn test_missing_password_is_required_never_invalid() {
    for cipher in [Cipher::Rc4, Cipher::Aes] {
        let document = encrypted_statement(cipher, USER_PASSWORD);

        let err = DocumentDecryptor::default()
            .decrypt(&document, &Credential::empty())
            .unwrap_err();

        assert_eq!(err, DecryptError::PasswordRequired);
        assert!(err.is_recoverable());
    }
}

#[test]
fn test_owner_only_statement_opens_without_a_password() {
    for cipher in [Cipher::Rc4, Cipher::Aes] {
        let document = encrypted_statement(cipher, "");

        assert_eq!(open(&document, "").unwrap(), STATEMENT_LINES);
    }
}

#[test]
fn test_owner_only_statement_ignores_a_supplied_password() {
    let document = encrypted_statement(Cipher::Aes, "");

    assert_eq!(open(&document, "anything").unwrap(), STATEMENT_LINES);
}
