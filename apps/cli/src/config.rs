use anyhow::Context;

use casfolio_core::constants::DEFAULT_MAX_DOCUMENT_BYTES;
use casfolio_core::PipelineConfig;

pub struct Config {
    pub db_path: String,
    pub max_document_bytes: usize,
    pub require_password: bool,
    pub log_format: String,
}

impl Config {
    /// Reads `CASFOLIO_*` variables, after loading `.env` if present.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let db_path =
            std::env::var("CASFOLIO_DB_PATH").unwrap_or_else(|_| "./db/casfolio.db".into());
        let max_document_bytes = match std::env::var("CASFOLIO_MAX_DOCUMENT_BYTES") {
            Ok(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid CASFOLIO_MAX_DOCUMENT_BYTES '{}'", raw))?,
            Err(_) => DEFAULT_MAX_DOCUMENT_BYTES,
        };
        let require_password = std::env::var("CASFOLIO_REQUIRE_PASSWORD")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);
        let log_format = std::env::var("CASFOLIO_LOG_FORMAT").unwrap_or_else(|_| "text".into());
        Ok(Self {
            db_path,
            max_document_bytes,
            require_password,
            log_format,
        })
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::default()
            .with_max_document_bytes(self.max_document_bytes)
            .with_require_credential(self.require_password)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
