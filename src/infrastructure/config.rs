use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub profile: String,
    pub static_dir: String,
    /// Credentials of the administrator created at startup when missing
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    pub seed_demo: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self::with_profile(None)
    }

    /// Like `from_env`, but a profile given on the command line wins over
    /// `PROFILE`.
    pub fn with_profile(profile_override: Option<String>) -> Self {
        let profile = profile_override
            .or_else(|| env::var("PROFILE").ok())
            .unwrap_or_else(|| "default".to_string());

        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| {
            if profile == "default" {
                "sqlite://librarium.db?mode=rwc".to_string()
            } else {
                format!("sqlite://librarium_{}.db?mode=rwc", profile)
            }
        });

        Self {
            database_url,
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .ok()
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_else(Vec::new),
            static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_string()),
            admin_username: env::var("ADMIN_USERNAME").ok().filter(|s| !s.is_empty()),
            admin_password: env::var("ADMIN_PASSWORD").ok().filter(|s| !s.is_empty()),
            seed_demo: env::var("SEED_DEMO").is_ok(),
            profile,
        }
    }
}
