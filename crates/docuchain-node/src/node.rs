//! A ledger opened from [`NodeConfig`], and the CLI operations over it.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context};
use bytes::Bytes;
use docuchain::{
    DocumentRegistry, Fingerprint, IssueRequest, Ledger, LocatedRecord, VerifyOutcome,
};
use docuchain_store::Store;

use crate::archive::{self, DocumentArchive};
use crate::config::NodeConfig;
use crate::server::{build_router, AppState};
use crate::store::AnyStore;

/// Metadata supplied with a document on the command line.
#[derive(Debug, Clone)]
pub struct IssueArgs {
    pub issuer_org: String,
    pub doc_type: String,
    pub doc_title: String,
    pub recipient_name: String,
    pub recipient_id: String,
}

/// An open ledger plus its document archive.
pub struct Node<S: Store = AnyStore> {
    registry: DocumentRegistry<S>,
    archive: DocumentArchive,
}

impl Node<AnyStore> {
    /// Open the configured backend and load (or create) the ledger.
    pub async fn open(config: &NodeConfig) -> anyhow::Result<Self> {
        let store = AnyStore::open(config)
            .with_context(|| format!("opening store in {}", config.data_dir.display()))?;
        let ledger = Ledger::open(store, config.ledger_config()?).await?;
        Ok(Self::new(
            DocumentRegistry::new(Arc::new(ledger)),
            DocumentArchive::new(config.documents_dir()),
        ))
    }
}

impl<S: Store + 'static> Node<S> {
    pub fn new(registry: DocumentRegistry<S>, archive: DocumentArchive) -> Self {
        Self { registry, archive }
    }

    pub fn registry(&self) -> &DocumentRegistry<S> {
        &self.registry
    }

    /// Issue the document at `path` and archive a copy.
    pub async fn issue(&self, path: &Path, args: IssueArgs) -> anyhow::Result<ExitCode> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .context("document path has no file name")?
            .to_string();
        let Some(extension) = archive::allowed_extension(&file_name) else {
            bail!("invalid file type; allowed: {}", archive::allowed_list());
        };
        let content = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        let content = Bytes::from(content);

        let issued = self
            .registry
            .issue(IssueRequest {
                content: content.clone(),
                issuer_org: args.issuer_org,
                doc_type: args.doc_type,
                doc_title: args.doc_title,
                recipient_name: args.recipient_name,
                recipient_id: args.recipient_id,
                file_name: Some(file_name),
            })
            .await?;
        self.archive
            .store(&issued.record.fingerprint, extension, &content)
            .await
            .context("archiving document")?;

        println!("Document issued");
        println!("  fingerprint: {}", issued.record.fingerprint);
        println!("  block:       {}", issued.block_index);
        println!("  block hash:  {}", issued.block_hash);
        println!("  timestamp:   {}", issued.block_timestamp);
        Ok(ExitCode::SUCCESS)
    }

    /// Verify the document at `path`. Exits non-zero unless authentic.
    pub async fn verify(&self, path: &Path) -> anyhow::Result<ExitCode> {
        let content = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        let fingerprint = Fingerprint::of(&content);
        let outcome = self.registry.verify_fingerprint(&fingerprint);

        println!("fingerprint: {}", fingerprint);
        match &outcome {
            VerifyOutcome::Valid {
                block_index,
                record,
                ..
            } => {
                println!("AUTHENTIC: issued in block {}", block_index);
                print_record(record_line(*block_index, record));
            }
            VerifyOutcome::NotFound => println!("NOT FOUND: document was never issued"),
            VerifyOutcome::ChainTampered { index, reason } => {
                println!("LEDGER TAMPERED at block {}: {}", index, reason)
            }
        }
        Ok(exit_code(outcome.is_valid()))
    }

    /// List documents issued to one recipient.
    pub fn documents(&self, recipient_id: &str) -> anyhow::Result<ExitCode> {
        let documents = self.registry.documents_for(recipient_id);
        print_documents(&documents);
        Ok(ExitCode::SUCCESS)
    }

    /// List every issued document.
    pub fn list(&self) -> anyhow::Result<ExitCode> {
        print_documents(&self.registry.all_documents());
        Ok(ExitCode::SUCCESS)
    }

    /// Validate the chain. Exits non-zero if tampered.
    pub fn validate(&self) -> anyhow::Result<ExitCode> {
        let report = self.registry.health_check();
        match report.first_invalid {
            None => println!("Ledger valid: {} blocks", report.chain_length),
            Some(index) => println!(
                "Ledger INVALID: first bad block is {} of {}",
                index, report.chain_length
            ),
        }
        Ok(exit_code(report.is_valid))
    }

    /// Write the chain as JSON to `output`, or stdout.
    pub async fn export(&self, output: Option<&Path>) -> anyhow::Result<ExitCode> {
        let json = serde_json::to_string_pretty(&self.registry.export_chain())?;
        match output {
            Some(path) => {
                tokio::fs::write(path, json)
                    .await
                    .with_context(|| format!("writing {}", path.display()))?;
                tracing::info!(path = %path.display(), "chain exported");
            }
            None => println!("{}", json),
        }
        Ok(ExitCode::SUCCESS)
    }

    pub fn health(&self) -> anyhow::Result<ExitCode> {
        let report = self.registry.health_check();
        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(exit_code(report.is_valid))
    }

    /// Serve the HTTP API until ctrl-c, then cancel in-flight mining.
    pub async fn serve(self, bind: std::net::SocketAddr) -> anyhow::Result<ExitCode> {
        let ledger = Arc::clone(self.registry.ledger());
        let app = build_router(AppState::new(self.registry, self.archive));

        let listener = tokio::net::TcpListener::bind(bind)
            .await
            .with_context(|| format!("binding {}", bind))?;
        tracing::info!(addr = %bind, store = %ledger.store().describe(), "listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!(error = %e, "failed to listen for ctrl-c");
                    std::future::pending::<()>().await;
                }
                ledger.shutdown();
            })
            .await?;
        Ok(ExitCode::SUCCESS)
    }
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn record_line(block_index: u64, record: &docuchain::DocumentRecord) -> String {
    format!(
        "[block {}] {} | {} | {} | {} ({}) | {}",
        block_index,
        record.doc_title,
        record.doc_type,
        record.issuer_org,
        record.recipient_name,
        record.recipient_id,
        record.fingerprint
    )
}

fn print_record(line: String) {
    println!("  {}", line);
}

fn print_documents(documents: &[LocatedRecord]) {
    if documents.is_empty() {
        println!("No documents found");
        return;
    }
    println!("{} document(s)", documents.len());
    for located in documents {
        print_record(record_line(located.block_index, &located.record));
    }
}
