use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use speshal_core::model::PostId;
use speshal_infrastructure::ConfigService;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "speshal")]
#[command(about = "Speshalgram command-line client", long_about = None)]
struct Cli {
    /// API host, e.g. http://localhost:8000 (overrides config and environment)
    #[arg(long, global = true)]
    api_host: Option<String>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session tokens
    Login {
        username: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Create an account
    Register {
        username: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Print the logged-in username
    Whoami,
    /// Show the home feed
    Feed {
        #[arg(long, default_value_t = 1)]
        pages: usize,
    },
    /// Show a profile and its posts
    Profile {
        username: String,
        #[arg(long, default_value_t = 1)]
        pages: usize,
    },
    /// Show a post and its comments
    Post { id: PostId },
    Like { id: PostId },
    Unlike { id: PostId },
    Comment { id: PostId, text: String },
    /// Subscribe to a user (pending until accepted for closed profiles)
    Follow { username: String },
    Unfollow { username: String },
    /// List follow requests waiting for an answer
    Pending,
    Accept { username: String },
    Reject { username: String },
    Followers { username: String },
    Followings { username: String },
    /// List users who liked a post
    Likes { id: PostId },
    Search { query: String },
    /// Publish a picture
    Upload {
        picture: PathBuf,
        #[arg(long)]
        description: Option<String>,
    },
    /// Edit your own profile
    EditProfile {
        #[arg(long)]
        avatar: Option<PathBuf>,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        opened: Option<bool>,
    },
}

fn init_logging(verbose: bool, configured: &str) {
    let filter = if std::env::var_os("RUST_LOG").is_some() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(configured)
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ConfigService::new(None)
        .context("Failed to locate config directory")?
        .load()
        .context("Failed to load configuration")?;
    if let Some(api_host) = cli.api_host {
        config = config.with_api_host(api_host);
    }
    init_logging(cli.verbose, &config.log_level);
    tracing::debug!(api_host = %config.api_host, "Configuration loaded");

    let app = commands::App::connect(&config).await?;

    match cli.command {
        Commands::Login { username, password } => commands::session::login(&app, &username, password).await?,
        Commands::Logout => commands::session::logout(&app).await?,
        Commands::Register { username, password } => {
            commands::session::register(&app, &username, password).await?
        }
        Commands::Whoami => commands::session::whoami(&app).await?,
        Commands::Feed { pages } => commands::browse::feed(&app, pages).await?,
        Commands::Profile { username, pages } => commands::browse::profile(&app, &username, pages).await?,
        Commands::Post { id } => commands::browse::post(&app, id).await?,
        Commands::Followers { username } => commands::browse::followers(&app, &username).await?,
        Commands::Followings { username } => commands::browse::followings(&app, &username).await?,
        Commands::Likes { id } => commands::browse::likes(&app, id).await?,
        Commands::Search { query } => commands::browse::search(&app, &query).await?,
        Commands::Like { id } => commands::social::like(&app, id, true).await?,
        Commands::Unlike { id } => commands::social::like(&app, id, false).await?,
        Commands::Comment { id, text } => commands::social::comment(&app, id, &text).await?,
        Commands::Follow { username } => commands::social::follow(&app, &username, true).await?,
        Commands::Unfollow { username } => commands::social::follow(&app, &username, false).await?,
        Commands::Pending => commands::social::pending(&app).await?,
        Commands::Accept { username } => commands::social::answer(&app, &username, true).await?,
        Commands::Reject { username } => commands::social::answer(&app, &username, false).await?,
        Commands::Upload {
            picture,
            description,
        } => commands::publish::upload(&app, &picture, description).await?,
        Commands::EditProfile {
            avatar,
            username,
            first_name,
            last_name,
            description,
            opened,
        } => {
            let edit = commands::publish::ProfileEdit {
                avatar,
                username,
                first_name,
                last_name,
                description,
                is_opened: opened,
            };
            commands::publish::edit_profile(&app, edit).await?
        }
    }

    Ok(())
}
