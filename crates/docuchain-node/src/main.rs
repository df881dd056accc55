use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use docuchain_node::{IssueArgs, Node, NodeConfig};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "docuchain")]
#[command(about = "Issue and verify documents against a proof-of-work ledger", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    config: NodeConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Issue a document and seal its fingerprint into a new block
    Issue {
        /// Document to issue (.pdf, .jpg, .jpeg, .png)
        file: PathBuf,
        #[arg(long)]
        issuer_org: String,
        #[arg(long)]
        doc_type: String,
        #[arg(long)]
        doc_title: String,
        #[arg(long)]
        recipient_name: String,
        #[arg(long)]
        recipient_id: String,
    },
    /// Check whether a document was issued
    Verify {
        file: PathBuf,
    },
    /// List documents issued to a recipient
    Documents {
        recipient_id: String,
    },
    /// List every issued document
    List,
    /// Re-validate the whole chain
    Validate,
    /// Export the chain as JSON
    Export {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print a health report
    Health,
    /// Serve the HTTP API
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,docuchain=info,docuchain_node=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let node = Node::open(&cli.config).await?;

    match cli.command {
        Commands::Issue {
            file,
            issuer_org,
            doc_type,
            doc_title,
            recipient_name,
            recipient_id,
        } => {
            let args = IssueArgs {
                issuer_org,
                doc_type,
                doc_title,
                recipient_name,
                recipient_id,
            };
            node.issue(&file, args).await
        }
        Commands::Verify { file } => node.verify(&file).await,
        Commands::Documents { recipient_id } => node.documents(&recipient_id),
        Commands::List => node.list(),
        Commands::Validate => node.validate(),
        Commands::Export { output } => node.export(output.as_deref()).await,
        Commands::Health => node.health(),
        Commands::Serve => node.serve(cli.config.bind).await,
    }
}
