//! Spree CLI - Main entry point

use clap::{Parser, Subcommand};
use spree_rpc::requests::MAX_LEADERBOARD_LIMIT;
use spree_rpc::AppContext;
use spree_store::AuditRow;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "spree")]
#[command(about = "Spree - spend-a-million game backend", long_about = None)]
struct Cli {
    /// Data directory path
    #[arg(short, long, default_value = "./data")]
    data: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and schema
    Init,

    /// Print the leaderboard
    Leaderboard {
        /// Maximum number of rows to show
        #[arg(long, default_value = "20")]
        limit: u32,
    },

    /// Verify that every session summary matches its ledger
    Audit,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    // Create application context
    let ctx = AppContext::new(&cli.data).await?;

    match cli.command {
        Commands::Init => {
            println!("✅ Database ready at {}", ctx.db_path().display());
        }

        Commands::Leaderboard { limit } => {
            let limit = limit.clamp(1, MAX_LEADERBOARD_LIMIT);
            let entries = ctx.leaderboard.top(limit).await?;

            if entries.is_empty() {
                println!("No finished sessions yet.");
            }
            for (rank, entry) in entries.iter().enumerate() {
                println!("{:>2}. {:<24} {:>9}", rank + 1, entry.display_name, entry.spent);
            }
        }

        Commands::Audit => {
            let rows = AuditRow::collect(ctx.store.pool()).await?;
            let broken: Vec<_> = rows.iter().filter(|row| !row.consistent()).collect();

            if broken.is_empty() {
                println!("✅ Ledger consistent ({} sessions)", rows.len());
            } else {
                for row in &broken {
                    println!(
                        "❌ Session {}: summary {} vs ledger {}",
                        row.session_id, row.spent, row.ledger_total
                    );
                }
                anyhow::bail!("{} inconsistent session(s)", broken.len());
            }
        }
    }

    Ok(())
}
