use std::{env, fmt::Display, str::FromStr};

pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub public_dir: String,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("PORT", "8000"),
            database_url: try_load("DATABASE_URL", "sqlite://surveyor.db"),
            jwt_secret: try_load("JWT_SECRET", "insecure-local-secret"),
            public_dir: try_load("PUBLIC_DIR", "public"),
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            log::info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            log::warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
