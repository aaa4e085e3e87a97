//! Binstore CLI: operate on the configured binary storage.
//!
//! Reads BINARY_STORAGE, STORAGE_BASE_URL and optionally SIGNING_KEY /
//! SIGNING_KEY_PASSPHRASE from the environment (or a `.env` file).

use anyhow::Context;
use binstore_cli::{init_tracing, parse_binary_ref};
use binstore_core::StorageConfig;
use binstore_storage::StorageRegistry;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "binstore", about = "Binary storage CLI")]
struct Cli {
    /// Override BINARY_STORAGE, e.g. file:/var/lib/binstore or s3:my-bucket
    #[arg(long, global = true)]
    storage: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a file as a binary
    Put {
        /// Binary reference: <id> or <id>/<versionId>
        binary: String,
        /// Path to the file to upload
        file: PathBuf,
        /// Content type recorded with the object
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Download a binary to a file, or stdout when no output is given
    Get {
        /// Binary reference: <id> or <id>/<versionId>
        binary: String,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Copy one binary onto another
    Copy {
        /// Source reference
        source: String,
        /// Destination reference
        destination: String,
    },
    /// Print a time-limited URL for a binary
    Presign {
        /// Binary reference: <id> or <id>/<versionId>
        binary: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let mut config = StorageConfig::from_env()?;
    if let Some(storage) = cli.storage {
        config = config.with_binary_storage(storage);
    }

    let registry = StorageRegistry::from_config(&config).await?;
    let storage = registry
        .current()
        .context("BINARY_STORAGE is missing or not a recognized backend")?;

    match cli.command {
        Commands::Put {
            binary,
            file,
            content_type,
        } => {
            let binary = parse_binary_ref(&binary)?;
            let filename = file.file_name().and_then(|name| name.to_str()).map(String::from);
            let reader = tokio::fs::File::open(&file)
                .await
                .with_context(|| format!("Failed to open {}", file.display()))?;
            storage
                .write_binary(
                    &binary,
                    filename.as_deref(),
                    content_type.as_deref(),
                    Box::pin(reader),
                )
                .await?;
            tracing::info!(binary = %binary, "Uploaded");
        }
        Commands::Get { binary, output } => {
            let binary = parse_binary_ref(&binary)?;
            let content = storage.read_binary(&binary).await?;
            let mut reader = content.into_async_read();
            match output {
                Some(path) => {
                    let mut file = tokio::fs::File::create(&path)
                        .await
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    tokio::io::copy(&mut reader, &mut file).await?;
                }
                None => {
                    tokio::io::copy(&mut reader, &mut tokio::io::stdout()).await?;
                }
            }
        }
        Commands::Copy {
            source,
            destination,
        } => {
            let source = parse_binary_ref(&source)?;
            let destination = parse_binary_ref(&destination)?;
            storage.copy_binary(&source, &destination).await?;
            tracing::info!(source = %source, destination = %destination, "Copied");
        }
        Commands::Presign { binary } => {
            let binary = parse_binary_ref(&binary)?;
            println!("{}", storage.get_presigned_url(&binary).await?);
        }
    }

    Ok(())
}
