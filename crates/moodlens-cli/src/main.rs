use clap::{ArgGroup, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod analyze;
mod journal;

#[derive(Debug, Parser)]
#[command(name = "moodlens")]
#[command(about = "Journal mood analysis command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Add a journal entry and wait for its analysis
    Add {
        #[arg(long)]
        user: i64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        text: String,
    },
    /// Edit an entry and wait for its re-analysis
    Edit {
        #[arg(long)]
        entry: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        text: Option<String>,
    },
    /// Delete an entry together with its analysis and embedding
    Delete {
        #[arg(long)]
        entry: i64,
    },
    /// Re-run analysis for one entry or every entry of a user
    #[command(group(ArgGroup::new("target").required(true).args(["entry", "user"])))]
    Reanalyze {
        #[arg(long)]
        entry: Option<i64>,
        #[arg(long)]
        user: Option<i64>,
    },
    /// Print the stored analysis of an entry as JSON
    Show {
        #[arg(long)]
        entry: i64,
    },
    /// Print a user's mined mood patterns as JSON
    Patterns {
        #[arg(long)]
        user: i64,
    },
    /// Analyse free text without a database or user history
    Analyze {
        #[arg(long)]
        text: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = moodlens_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Analyze { text } => analyze::run_analyze(&config, &text).await,
        Commands::Migrate => journal::run_migrate(&config).await,
        Commands::Add { user, title, text } => {
            let services = journal::Services::connect(&config).await?;
            journal::run_add(&services, user, &title, &text).await
        }
        Commands::Edit { entry, title, text } => {
            let services = journal::Services::connect(&config).await?;
            journal::run_edit(&services, entry, title.as_deref(), text.as_deref()).await
        }
        Commands::Delete { entry } => {
            let services = journal::Services::connect(&config).await?;
            journal::run_delete(&services, entry).await
        }
        Commands::Reanalyze { entry, user } => {
            let services = journal::Services::connect(&config).await?;
            journal::run_reanalyze(&services, entry, user).await
        }
        Commands::Show { entry } => {
            let services = journal::Services::connect(&config).await?;
            journal::run_show(&services, entry).await
        }
        Commands::Patterns { user } => {
            let services = journal::Services::connect(&config).await?;
            journal::run_patterns(&services, user).await
        }
    }
}
