use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_db")]
    pub database_url: String,
    #[serde(default = "default_session_secret")]
    pub session_secret: String,
}

fn default_port() -> u16 {
    3000
}

fn default_db() -> String {
    "warbler.db".into()
}

fn default_session_secret() -> String {
    // At least 64 bytes so the cookie signing key can be derived from it.
    "development-session-secret-change-in-production-0123456789abcdef".into()
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("WARBLER").separator("__"))
            .build()?;
        Ok(config.try_deserialize().unwrap_or_else(|_| Self {
            port: default_port(),
            database_url: default_db(),
            session_secret: default_session_secret(),
        }))
    }
}
