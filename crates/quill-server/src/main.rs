use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use tracing::info;

use quill_api::state::AppState;
use quill_db::Database;
use quill_server::config::Config;

#[derive(Parser)]
#[command(name = "quill", about = "A minimal multi-user blog server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (the default when no subcommand is given)
    Serve,
    /// Drop and recreate the database tables
    InitDb,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quill=debug,tower_http=debug".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let db = Database::open(&config.db_path)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::InitDb => {
            db.with_conn(quill_db::migrations::reset)?;
            println!("Initialized the database.");
            Ok(())
        }
        Command::Serve => serve(config, db).await,
    }
}

async fn serve(config: Config, db: Database) -> anyhow::Result<()> {
    let state = AppState::new(db, &config.secret_key);
    let app = quill_server::app(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Quill server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
