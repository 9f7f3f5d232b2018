mod config;
mod main_lib;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;

use casfolio_core::holdings::HoldingServiceTrait;
use casfolio_core::import::ImportRequest;
use casfolio_core::{Credential, RawDocument};
use config::Config;
use main_lib::{
    build_state, init_tracing, media_type_for, AppState, ImportOutput, TracingProgressSink,
};

#[derive(Parser, Debug)]
#[command(
    name = "casfolio",
    about = "Import consolidated account statements into a local portfolio store."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decrypt a statement, extract its holdings and merge them into the store
    Import {
        /// Statement file (.pdf, or .txt for already extracted text)
        file: PathBuf,

        /// Owner the holdings belong to
        #[arg(long, env = "CASFOLIO_OWNER_ID")]
        owner: Option<String>,

        /// Statement password; leave unset for unencrypted documents
        #[arg(long, env = "CASFOLIO_STATEMENT_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Override the media type inferred from the file extension
        #[arg(long)]
        media_type: Option<String>,
    },

    /// List an owner's holdings
    Holdings {
        #[arg(long, env = "CASFOLIO_OWNER_ID")]
        owner: Option<String>,
    },

    /// Delete one of an owner's holdings
    Delete {
        /// Holding id as shown by `holdings`
        holding_id: String,

        #[arg(long, env = "CASFOLIO_OWNER_ID")]
        owner: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_tracing(&config.log_format);
    let state = build_state(&config).await?;

    match cli.command {
        Command::Import {
            file,
            owner,
            password,
            media_type,
        } => import(&state, file, owner, password, media_type).await,
        Command::Holdings { owner } => {
            let holdings = state.holding_service.list_holdings(owner.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&holdings)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Delete { holding_id, owner } => {
            state
                .holding_service
                .delete_holding(owner.as_deref(), &holding_id)
                .await?;
            println!("{}", json!({ "deleted": holding_id }));
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn import(
    state: &AppState,
    file: PathBuf,
    owner: Option<String>,
    password: Option<String>,
    media_type: Option<String>,
) -> anyhow::Result<ExitCode> {
    let bytes = std::fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
    let media_type = media_type.unwrap_or_else(|| media_type_for(&file).to_string());
    let request = ImportRequest::new(
        RawDocument::new(bytes, media_type),
        password.map(Credential::new).unwrap_or_default(),
        owner,
    );

    let result = state
        .pipeline
        .run_with_progress(request, &TracingProgressSink)
        .await;
    // A failed import is reported once, as JSON on stderr, not again by anyhow.
    Ok(ImportOutput::render(&result)?.emit())
}
