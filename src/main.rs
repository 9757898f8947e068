use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dadjoke::registries::FileSettingsRegistry;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "dadjoke")]
#[command(about = "A cyberpunk dad joke generator backed by an LLM chat-completion API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true, help = "Enable verbose debug output")]
    verbose: bool,

    #[arg(long, global = true, help = "Show what would be sent or changed without doing it")]
    dry_run: bool,

    #[arg(long, global = true, value_name = "PATH", help = "Settings file (defaults to dadjoke.yml)")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Generate dad jokes with the LLM API")]
    Joke {
        #[arg(
            short,
            long,
            default_value_t = 1,
            value_parser = clap::value_parser!(u32).range(1..=100),
            help = "Number of jokes to generate"
        )]
        count: u32,
    },

    #[command(about = "Fetch a joke from the joke backend")]
    ServerJoke,

    #[command(about = "List recently generated jokes from the joke backend")]
    Recent,

    #[command(subcommand)]
    Key(KeyCommands),
}

#[derive(Subcommand)]
enum KeyCommands {
    #[command(about = "Store an API key locally")]
    Set {
        #[arg(help = "The API key (sk-...)")]
        key: String,
    },

    #[command(about = "Remove the locally stored API key")]
    Clear,

    #[command(about = "Show which API key would be used")]
    Show,
}

fn init_logging(verbose: bool) {
    // User-facing output goes through notifications; logs are opt-in.
    let default_filter = if verbose { "debug" } else { "off" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli::Config {
        verbose: cli.verbose,
        dry_run: cli.dry_run,
    };

    let settings = FileSettingsRegistry::new(cli.config)
        .load()
        .context("Failed to load settings")?;

    match cli.command {
        Commands::Joke { count } => {
            cli::generate_jokes(count as usize, &settings, &config).await?;
        }
        Commands::ServerJoke => {
            cli::server_joke(&settings, &config).await?;
        }
        Commands::Recent => {
            cli::recent_jokes(&settings, &config).await?;
        }
        Commands::Key(key_cmd) => match key_cmd {
            KeyCommands::Set { key } => {
                cli::set_key(&key, &settings, &config)?;
            }
            KeyCommands::Clear => {
                cli::clear_key(&settings, &config)?;
            }
            KeyCommands::Show => {
                cli::show_key(&settings, &config)?;
            }
        },
    }

    Ok(())
}
