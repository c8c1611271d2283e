use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: Option<String>,
    pub port: u16,
    pub session_ttl_secs: u64,
    pub analyst_name: String,
    pub analyst_email: String,
    pub analyst_password: String,
    pub cors_origin: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: std::env::var("DB_URL")
                .or_else(|_| std::env::var("DATABASE_URL"))
                .ok()
                .filter(|url| !url.trim().is_empty())
                .map(|url| {
                    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                        anyhow::bail!("DATABASE_URL must start with postgresql:// or postgres://");
                    }
                    Ok(url)
                })
                .transpose()?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            session_ttl_secs: std::env::var("SESSION_TTL_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("SESSION_TTL_SECS must be a positive number"))?,
            analyst_name: std::env::var("ANALYST_NAME")
                .unwrap_or_else(|_| "Analyst".to_string()),
            analyst_email: std::env::var("ANALYST_EMAIL")
                .unwrap_or_else(|_| "analyst@example.com".to_string())
                .to_lowercase(),
            analyst_password: std::env::var("ANALYST_PASSWORD")
                .unwrap_or_else(|_| "change-me".to_string()),
            cors_origin: std::env::var("CORS_ORIGIN")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(|origin| {
                    if !origin.starts_with("http://") && !origin.starts_with("https://") {
                        anyhow::bail!("CORS_ORIGIN must start with http:// or https://");
                    }
                    Ok(origin)
                })
                .transpose()?,
        };

        if config.session_ttl_secs == 0 {
            anyhow::bail!("SESSION_TTL_SECS must be a positive number");
        }
        if config.analyst_password.trim().is_empty() {
            anyhow::bail!("ANALYST_PASSWORD cannot be empty");
        }

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        match config.database_url {
            Some(ref url) => tracing::debug!("Database URL: {}...", &url[..20.min(url.len())]),
            None => tracing::info!("No DATABASE_URL configured, falling back to in-memory store"),
        }
        tracing::debug!("Bootstrap analyst: {}", config.analyst_email);
        tracing::debug!("Session TTL: {}s", config.session_ttl_secs);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}
