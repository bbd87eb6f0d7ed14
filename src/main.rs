//! CLI entry point for folio

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio::content::Layout;
use folio::Folio;

#[derive(Parser)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "A static blog generator for Markdown posts", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the site into the public folder
    #[command(visible_alias = "b", alias = "generate", alias = "g")]
    Build,

    /// Remove the public folder
    Clean,

    /// List posts, newest first
    List,

    /// Create a new post or page
    New {
        /// Layout to use (post, page)
        #[arg(short, long, default_value = "post")]
        layout: String,

        /// Title of the new post
        title: String,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "folio=debug,info"
    } else {
        "folio=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Build => {
            let folio = Folio::new(&base_dir)?;
            tracing::info!("Building site in {:?}", base_dir);
            let summary = folio.build()?;
            println!(
                "Built {} posts into {} files",
                summary.posts, summary.files
            );
        }

        Commands::Clean => {
            let folio = Folio::new(&base_dir)?;
            folio.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List => {
            let folio = Folio::new(&base_dir)?;
            folio::commands::list::run(&folio)?;
        }

        Commands::New { layout, title } => {
            let layout: Layout = layout.parse().map_err(|_| {
                anyhow::anyhow!("Unknown layout: {}. Available: post, page", layout)
            })?;
            let folio = Folio::new(&base_dir)?;
            let path = folio.new_post(&title, layout)?;
            println!("Created: {}", path.display());
        }

        Commands::Version => {
            println!("folio version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
