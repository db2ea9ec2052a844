//! Startup configuration, read once from the environment and passed by
//! value. Nothing here is consulted again after boot.

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub jwt_secret: String,
    /// When set, the Postgres store is used instead of the in-memory one.
    pub database_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });
        let database_url = std::env::var("DATABASE_URL").ok();
        Self {
            bind_addr,
            jwt_secret,
            database_url,
        }
    }
}
