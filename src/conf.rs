use config::{Config, ConfigError, Environment};
use lazy_static::lazy_static;
use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct Settings {
    pub service_name: String,
    pub listen_port: String,
    pub base_path: String,
    pub database_url: String,
    pub database_pool_max_connections: u32,
    //auth
    pub jwt_secret: String,
    pub jwt_expires_in: i64,
    pub jwt_refresh_expires_in: i64,
    pub bcrypt_cost: u32,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let conf = Config::builder()
            .set_default("service_name", "rural-staffing")?
            .set_default("listen_port", "3000")?
            .set_default("base_path", "/api/v1")?
            .set_default("database_pool_max_connections", 5)?
            .set_default("jwt_expires_in", 900)?
            .set_default("jwt_refresh_expires_in", 604800)?
            .set_default("bcrypt_cost", 12)?
            .add_source(Environment::default())
            .build()?;
        let mut s: Settings = conf.try_deserialize()?;
        if s.jwt_secret.is_empty() {
            return Err(ConfigError::Message("JWT_SECRET must not be empty".into()));
        }
        if !s.base_path.starts_with('/') {
            s.base_path = format!("/{}", s.base_path);
        }
        let trimmed = s.base_path.trim_end_matches('/').to_string();
        s.base_path = trimmed;
        Ok(s)
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url.starts_with("memory://")
    }
}

lazy_static! {
    pub static ref settings: Settings = Settings::new().expect("improperly configured");
}
