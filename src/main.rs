use clap::Parser;
use tracing_subscriber::EnvFilter;

use arcadia::config::{Cli, Command, Config};
use arcadia::db;
use arcadia::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse CLI args and load config
    let cli = Cli::parse();
    let data_dir = Config::data_dir(&cli);
    std::fs::create_dir_all(&data_dir)?;
    tracing::info!("Data directory: {}", data_dir.display());

    let config = Config::load(&cli)?;

    // Initialize database
    let pool = db::create_pool(config.db_path())?;
    db::run_migrations(&pool)?;

    let state = AppState::new(pool, config);

    match cli.command.unwrap_or(Command::Init) {
        Command::Init => {
            println!("Database ready at {}", state.config.db_path().display());
        }
        Command::Register {
            username,
            email,
            password,
            developer,
        } => {
            let user = state.users.create_user(&username, &email, &password, developer)?;
            println!("Registered {} (user id {})", user.username, user.id);
        }
        Command::Login {
            identifier,
            password,
        } => match state.users.login(&identifier, &password)? {
            Some(user) => {
                let session = state.context.current().expect("login mirrors a session");
                println!("Logged in as {} (session {})", user.username, session.id);
            }
            None => {
                println!("Invalid credentials.");
                std::process::exit(1);
            }
        },
        Command::Offers => {
            for offer in state.wallet.offers() {
                println!("{:>6.2} -> {} points", offer.price, offer.points);
            }
        }
        Command::Sweep => {
            let sessions = state.sessions.cleanup_expired_sessions_async().await?;
            let codes = state.password_reset.cleanup_expired()?;
            println!("Removed {sessions} expired sessions and {codes} expired reset codes");
        }
    }

    Ok(())
}
