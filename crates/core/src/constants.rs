/// Media type for portfolio statements delivered as PDF
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Media type for statements whose text was already extracted
pub const TEXT_MEDIA_TYPE: &str = "text/plain";

/// Magic bytes every PDF starts with
pub const PDF_MAGIC: &[u8] = b"%PDF";

/// Practical upload ceiling (16 MiB)
pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = 16 * 1024 * 1024;

/// Prefix for scheme codes derived from the scheme name
pub const SYNTHETIC_SCHEME_CODE_PREFIX: &str = "SYN-";

/// Hex characters of the name digest kept in a synthetic scheme code
pub const SYNTHETIC_SCHEME_CODE_HEX_LEN: usize = 16;
