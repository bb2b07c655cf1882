// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! `embedded-sql` command line tool
//!
//! Runs extraction, virtual document synthesis and formatting on a single
//! host file.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use embedded_sql_ir::PositionEncoding;
use embedded_sql_lsp::{
    Document, DocumentSync, EngineConfig, TracingObserver, apply_edits,
};

/// Find, inspect and format SQL embedded in TypeScript and Rust sources.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Editor language id (inferred from the file extension when absent)
    #[arg(short, long, global = true)]
    language: Option<String>,

    /// Workspace root (default: the file's directory)
    #[arg(short, long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,

    /// JSON file with client settings (`{"embeddedSql": {...}}`)
    #[arg(short, long, global = true, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Position encoding of reported coordinates (utf-8, utf-16, utf-32)
    #[arg(short, long, global = true)]
    encoding: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the embedded SQL fragments as JSON
    Extract {
        file: PathBuf,
    },
    /// Print the virtual SQL documents
    Virtual {
        file: PathBuf,
    },
    /// Format the embedded SQL
    Format {
        file: PathBuf,

        /// Re-indent formatted SQL relative to the calling line
        #[arg(long)]
        indent: bool,

        /// Write the result back instead of printing it
        #[arg(short, long)]
        write: bool,
    },
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match &cli.command {
        Command::Extract { file } => {
            let (mut sync, document) = open(&cli, config, file)?;
            let refresh = sync.refresh(&document)?;
            println!("{}", serde_json::to_string_pretty(&refresh.fragments)?);
        }
        Command::Virtual { file } => {
            let (mut sync, document) = open(&cli, config, file)?;
            let refresh = sync.refresh(&document)?;
            let registry = sync
                .workspaces()
                .get(document.path())
                .context("File is outside the workspace root")?;

            for path in refresh.virtual_paths.unwrap_or_default() {
                println!("==> {} <==", path.display());
                println!("{}", registry.read(&path).unwrap_or_default());
            }
        }
        Command::Format {
            file,
            indent,
            write,
        } => {
            let mut config = config;
            config.format_sql.indent |= *indent;
            let encoding = config.position_encoding;

            let (mut sync, document) = open(&cli, config, file)?;
            let outcome = sync.format_document(&document)?;
            for (index, reason) in &outcome.skipped {
                tracing::info!("Fragment {} left as is: {}", index, reason);
            }

            let formatted = apply_edits(&document.get_content(), &outcome.edits, encoding)?;
            if *write {
                fs::write(document.path(), formatted)
                    .with_context(|| format!("failed to write {}", document.path().display()))?;
            } else {
                print!("{}", formatted);
            }
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.settings {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let settings: serde_json::Value = serde_json::from_str(&content)
                .with_context(|| format!("invalid JSON in {}", path.display()))?;
            EngineConfig::from_lsp_settings(&settings)?
        }
        None => EngineConfig::default(),
    };

    if let Some(name) = &cli.encoding {
        config.position_encoding = PositionEncoding::from_name(name)
            .with_context(|| format!("unknown position encoding '{}'", name))?;
    }

    Ok(config)
}

fn open(cli: &Cli, config: EngineConfig, file: &Path) -> Result<(DocumentSync, Document)> {
    let path = fs::canonicalize(file)
        .with_context(|| format!("file not found: {}", file.display()))?;
    let content = fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let root = match &cli.root {
        Some(root) => fs::canonicalize(root)
            .with_context(|| format!("directory not found: {}", root.display()))?,
        None => path
            .parent()
            .map(Path::to_path_buf)
            .context("file has no parent directory")?,
    };

    let language_id = match &cli.language {
        Some(language) => language.clone(),
        None => path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_string(),
    };

    let mut sync = DocumentSync::new(config, Arc::new(TracingObserver));
    sync.add_workspace_root(root);

    let document = Document::new(path, &content, 0, language_id);
    Ok((sync, document))
}
