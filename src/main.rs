use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use librarium::infrastructure::AppState;
use librarium::{auth, config, db, seed, server};

/// Value following `--profile` on the command line, if any
fn profile_arg() -> Option<String> {
    let args: Vec<String> = std::env::args().collect();
    args.iter()
        .position(|arg| arg == "--profile")
        .and_then(|pos| args.get(pos + 1).cloned())
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "librarium=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::with_profile(profile_arg());
    tracing::info!("Starting Librarium with profile '{}'", config.profile);

    if let Err(e) = auth::ensure_jwt_secret() {
        tracing::error!("{}", e);
        std::process::exit(1);
    }

    // Initialize database
    let db = match db::init_db(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to initialize database {}: {}", config.database_url, e);
            std::process::exit(1);
        }
    };
    let state = AppState::new(db);

    if let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password)
        && let Err(e) = seed::ensure_admin(&state, username, password).await
    {
        tracing::error!("Failed to create admin user {}: {}", username, e);
    }

    // Check for seed flag
    if config.seed_demo {
        tracing::info!("Seeding demo data...");
        if let Err(e) = seed::seed_demo_data(&state).await {
            tracing::error!("Failed to seed data: {}", e);
        } else {
            tracing::info!("Demo data seeded successfully.");
        }
    }

    let app = server::build_router(state, &config);

    if let Err(e) = server::serve(app, config.port).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
