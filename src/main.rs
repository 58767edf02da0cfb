use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::info;

use filevault::{AuthContext, Config, FileCheck, Gateway, SessionStore};

#[derive(Parser)]
#[command(name = "filevault")]
#[command(about = "FileVault command-line client", long_about = None)]
struct Cli {
    /// Configuration file. Defaults apply when it does not exist.
    #[arg(short, long, default_value = "filevault.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session token
    Login { username: String, password: String },

    /// Log out and forget the session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// List files
    Files,

    /// Check whether a file is available locally on the server
    Check { filename: String },

    /// Ask the server to open a local file
    Open { filename: String },

    /// Download a file
    Download {
        filename: String,

        /// Output path. Defaults to the filename in the current directory.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the activity log
    Activity,
}

fn load_config(path: &Path) -> filevault::Result<Config> {
    let mut config = if path.exists() {
        Config::load(path)?
    } else {
        Config::default()
    };
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

fn print_json(value: &Value) -> filevault::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli) -> filevault::Result<()> {
    let config = load_config(&cli.config)?;

    if let Err(e) = filevault::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        filevault::logging::init_console_only(&config.logging.level);
    }

    let session = Arc::new(SessionStore::open(&config.session.file)?);
    let gateway = Gateway::new(&config.api, session)?;
    let auth = AuthContext::new(gateway.clone());

    info!(base_url = %gateway.base_url(), "FileVault client ready");

    match cli.command {
        Commands::Login { username, password } => {
            let user = auth.login(&username, &password).await?;
            println!("Logged in as {} ({})", user.username, user.role);
        }
        Commands::Logout => {
            auth.logout().await;
            println!("Logged out");
        }
        Commands::Whoami => match auth.restore().await {
            Some(user) => println!("{} <{}> ({})", user.username, user.email, user.role),
            None => println!("Not logged in"),
        },
        Commands::Files => print_json(&gateway.list_files().await?)?,
        Commands::Check { filename } => {
            let payload = gateway.check_file_exists(&filename).await?;
            if let Ok(check) = serde_json::from_value::<FileCheck>(payload.clone()) {
                if check.needs_download() {
                    println!("{filename} is not available locally; run `filevault download {filename}`");
                }
            }
            print_json(&payload)?;
        }
        Commands::Open { filename } => print_json(&gateway.open_file(&filename).await?)?,
        Commands::Download { filename, output } => {
            let response = gateway.download_file(&filename).await?;
            let bytes = response
                .bytes()
                .await
                .map_err(filevault::ApiError::network)?;
            let output = output.unwrap_or_else(|| PathBuf::from(&filename));
            tokio::fs::write(&output, &bytes).await?;
            println!("Saved {} bytes to {}", bytes.len(), output.display());
        }
        Commands::Activity => print_json(&gateway.get_activity_logs().await?)?,
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
