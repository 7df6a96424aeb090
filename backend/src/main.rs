//! apload CLI - Preview and load FBL1N exports
//!
//! # Commands
//!
//! ```bash
//! apload serve                         # Start HTTP server (port 4000)
//! apload preview fbl1n.xlsx            # Print the preview JSON
//! apload load fbl1n.csv -e 100234      # Load into the configured table
//! apload columns 30                    # Show the column names a..ad
//! ```

use apload::{
    column_names, load_into_mysql, plan_load, preview, Config, ExclusionSet, LoadResponse,
    PreviewResponse,
};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "apload")]
#[command(about = "Preview and bulk-load FBL1N accounts-payable exports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start HTTP server
    Serve {
        /// Port to listen on (default: PORT or 4000)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Filter an export and show what a load would contain
    Preview {
        /// Input .csv or .xlsx file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Load an export into the destination table
    Load {
        /// Input .csv or .xlsx file
        input: PathBuf,

        /// Client key (column b) to leave out; repeatable
        #[arg(short, long = "exclude")]
        exclude: Vec<String>,
    },

    /// Show the positional column names for a row width
    Columns {
        width: usize,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve { port } => cmd_serve(port).await,

        Commands::Preview { input, output } => cmd_preview(&input, output.as_deref()),

        Commands::Load { input, exclude } => cmd_load(&input, exclude).await,

        Commands::Columns { width } => cmd_columns(width),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_serve(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::from_env()?;
    if let Some(port) = port {
        config.server.port = port;
    }
    apload::server::start_server(config).await
}

fn cmd_preview(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Previewing: {}", input.display());

    let bytes = fs::read(input)?;
    let report = preview(&file_name(input), &bytes)?;

    if report.empty_after_filter {
        eprintln!("⚠️  Every row lacks a sociedad ({} removed)", report.removed);
    } else {
        eprintln!("   Rows:     {} ({} removed)", report.total, report.removed);
        eprintln!("   Clients:  {}", report.unique_clients.len());
        eprintln!("   Total o:  {:.2}", report.amount_total);
    }

    let json = serde_json::to_string_pretty(&PreviewResponse::from(report))?;
    write_output(&json, output)?;

    Ok(())
}

async fn cmd_load(input: &Path, exclude: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    eprintln!(
        "📄 Loading {} into {}.{}",
        input.display(),
        config.destination.database,
        config.destination.table
    );

    let bytes = fs::read(input)?;
    let exclusions: ExclusionSet = exclude.iter().collect();
    let plan = plan_load(&file_name(input), &bytes, &exclusions)?;
    let report = load_into_mysql(&config.destination, &plan).await?;

    eprintln!("\n✨ Done!");
    println!(
        "{}",
        serde_json::to_string_pretty(&LoadResponse::from(report))?
    );
    Ok(())
}

fn cmd_columns(width: usize) -> Result<(), Box<dyn std::error::Error>> {
    for (i, name) in column_names(width).iter().enumerate() {
        println!("{:>5}  {}", i + 1, name);
    }
    Ok(())
}

/// The upload format is chosen by extension, so keep only the file name.
fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
