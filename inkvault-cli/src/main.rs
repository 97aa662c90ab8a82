//! inkvault command-line client.
//!
//! Documents live as encrypted JSON files under `<docs>/<workspace>/`; the
//! master key lives in a local SQLite key store. Nothing written to the docs
//! directory is readable without the key store.
//!
//! Usage:
//!   inkvault key init
//!   inkvault seal --title "Project Plan" notes.md
//!   inkvault search "budget"
//!   inkvault backlinks "Project Plan"

use anyhow::{Context, Result, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use clap::{Parser, Subcommand};
use inkvault_cli::render::mark_highlights;
use inkvault_cli::text::parse_body;
use inkvault_crypto::DocumentMetadata;
use inkvault_index::{
    ClientIndexer, DirectorySource, IndexerConfig, SearchField, SearchOptions, WorkspaceSession,
};
use inkvault_keystore::{MasterKeyService, SqliteKeyStore};
use inkvault_types::{DocumentId, WorkspaceId};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "inkvault")]
#[command(about = "Zero-knowledge encrypted notes from the command line")]
struct Args {
    /// Path to the local key store
    #[arg(long, default_value = "inkvault-keys.db")]
    store: PathBuf,

    /// Directory holding encrypted documents
    #[arg(long, default_value = "inkvault-docs")]
    docs: PathBuf,

    /// Workspace to operate on
    #[arg(short, long, default_value = "default")]
    workspace: String,

    /// JSON file with indexer settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage the master key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
    /// Encrypt a text or JSON block-tree file into the workspace
    Seal {
        /// Input file, or `-` for stdin
        input: PathBuf,
        #[arg(long)]
        title: String,
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        folder: Option<String>,
        /// Replace the body of an existing document instead
        #[arg(long)]
        id: Option<String>,
    },
    /// Decrypt a document and print it
    Open {
        id: String,
        /// Print the block tree as JSON instead of plain text
        #[arg(long)]
        json: bool,
    },
    /// Fuzzy search across the workspace
    Search {
        query: String,
        /// Restrict to fields (title, text, tags, folder)
        #[arg(long = "field")]
        fields: Vec<SearchField>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// List documents linking to a title with [[Title]]
    Backlinks {
        title: String,
        /// ID of the document carrying the title, excluded from results
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
enum KeyAction {
    /// Create a master key (random, or derived from --password)
    Init {
        #[arg(long)]
        password: Option<String>,
        /// Overwrite an existing key. Documents sealed under it become unreadable.
        #[arg(long)]
        force: bool,
    },
    /// Check a password against the stored password-derived key
    Derive {
        #[arg(long)]
        password: String,
    },
    /// Print the stored salt (base64)
    ShowSalt,
    /// Delete the stored master key
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let workspace = WorkspaceId::parse(&args.workspace).context("invalid workspace id")?;
    let service = open_key_service(&args.store)?;

    match args.command {
        Command::Key { action } => run_key(&service, action),
        Command::Seal {
            input,
            title,
            tags,
            folder,
            id,
        } => {
            let session = unlock(&service).await?;
            let source = DirectorySource::new(&args.docs);
            let text = read_input(&input)?;
            let body = parse_body(&text);
            let metadata = DocumentMetadata { title, tags, folder };

            let document = match id {
                Some(id) => {
                    let id = DocumentId::parse(&id).context("invalid document id")?;
                    let existing = source
                        .read_document(&workspace, &id)
                        .await
                        .with_context(|| format!("document {id} not found"))?;
                    let updated = session.update_document(&existing, &body)?;
                    inkvault_crypto::EncryptedDocument { metadata, ..updated }
                }
                None => session.create_document(metadata, &body)?,
            };

            let path = source.write_document(&workspace, &document).await?;
            info!(document_id = %document.id, "Sealed document");
            println!("{}\t{}", document.id, path.display());
            Ok(())
        }
        Command::Open { id, json } => {
            let session = unlock(&service).await?;
            let source = DirectorySource::new(&args.docs);
            let id = DocumentId::parse(&id).context("invalid document id")?;
            let document = source
                .read_document(&workspace, &id)
                .await
                .with_context(|| format!("document {id} not found"))?;
            let body = session
                .open_document(&document)
                .with_context(|| format!("cannot decrypt document {id}"))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!("# {}\n", document.metadata.title);
                println!("{}", body.plain_text());
            }
            Ok(())
        }
        Command::Search {
            query,
            fields,
            limit,
            json,
        } => {
            let indexer = indexer(&args.docs, args.config.as_deref(), unlock(&service).await?)?;
            let options = SearchOptions { fields, limit };
            let outcome = indexer.search(&workspace, &query, &options).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
                return Ok(());
            }
            for result in &outcome.results {
                println!("{:>8.1}  {}  ({})", result.score, result.title, result.document_id);
                for highlight in &result.highlights {
                    println!(
                        "          {}: {}",
                        highlight.field,
                        mark_highlights(&highlight.value, &highlight.positions)
                    );
                }
            }
            if outcome.total_matches > outcome.results.len() {
                println!("... {} more", outcome.total_matches - outcome.results.len());
            }
            report_skipped(outcome.skipped.len());
            Ok(())
        }
        Command::Backlinks { title, id, json } => {
            let indexer = indexer(&args.docs, args.config.as_deref(), unlock(&service).await?)?;
            let id = match id {
                Some(id) => DocumentId::parse(&id).context("invalid document id")?,
                None => DocumentId::new(),
            };
            let outcome = indexer.backlinks(&workspace, &id, &title).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
                return Ok(());
            }
            for backlink in &outcome.backlinks {
                println!("{}  ({})", backlink.title, backlink.document_id);
                for context in &backlink.contexts {
                    println!("    {context}");
                }
            }
            report_skipped(outcome.skipped.len());
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn open_key_service(path: &Path) -> Result<MasterKeyService> {
    let store = SqliteKeyStore::open(path)
        .with_context(|| format!("cannot open key store at {}", path.display()))?;
    debug!(path = %path.display(), "Opened key store");
    Ok(MasterKeyService::new(Arc::new(store)))
}

async fn unlock(service: &MasterKeyService) -> Result<Arc<WorkspaceSession>> {
    let session = WorkspaceSession::new();
    session
        .unlock(service)
        .await
        .context("run `inkvault key init` first, or check --store")?;
    Ok(Arc::new(session))
}

fn indexer(
    docs: &Path,
    config: Option<&Path>,
    session: Arc<WorkspaceSession>,
) -> Result<ClientIndexer<DirectorySource>> {
    let config = match config {
        Some(path) => {
            let raw = std::fs::read(path)
                .with_context(|| format!("cannot read config {}", path.display()))?;
            serde_json::from_slice::<IndexerConfig>(&raw)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => IndexerConfig::default(),
    };
    debug!(?config, "Indexer configured");
    Ok(ClientIndexer::with_config(
        Arc::new(DirectorySource::new(docs)),
        session,
        config,
    ))
}

fn run_key(service: &MasterKeyService, action: KeyAction) -> Result<()> {
    match action {
        KeyAction::Init { password, force } => {
            if service.retrieve()?.is_some() && !force {
                bail!("a master key already exists (use --force to replace it)");
            }
            let master = match password {
                Some(password) => service.initialize_with_password(&password)?,
                None => service.generate_random()?,
            };
            println!("master key created (salt {})", STANDARD.encode(master.salt().as_bytes()));
        }
        KeyAction::Derive { password } => {
            service
                .unlock_with_password(&password)
                .context("password does not match the stored master key")?;
            println!("password ok");
        }
        KeyAction::ShowSalt => {
            let master = service.retrieve()?.context("no master key stored")?;
            println!("{}", STANDARD.encode(master.salt().as_bytes()));
        }
        KeyAction::Clear => {
            if service.clear()? {
                println!("master key deleted");
            } else {
                println!("no master key stored");
            }
        }
    }
    Ok(())
}

fn read_input(input: &Path) -> Result<String> {
    if input == Path::new("-") {
        let mut text = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut text)?;
        return Ok(text);
    }
    std::fs::read_to_string(input).with_context(|| format!("cannot read {}", input.display()))
}

fn report_skipped(count: usize) {
    if count > 0 {
        eprintln!("{count} document(s) could not be decrypted and were skipped");
    }
}
