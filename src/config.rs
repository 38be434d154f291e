use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

/// Application-level constants
pub const APP_NAME: &str = "MediCURE";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_WIKIPEDIA_BASE: &str = "https://en.wikipedia.org";
const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 5;
const DEFAULT_MAIL_PORT: u16 = 587;

/// Get the application data directory (~/MediCure on all platforms).
pub fn app_data_dir() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join("MediCure"),
        None => PathBuf::from("MediCure"),
    }
}

/// SMTP settings read from MAIL_* environment variables.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub server: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub sender: String,
}

/// Runtime configuration, assembled from environment variables with
/// sensible defaults for everything except SMTP delivery.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub data_dir: PathBuf,
    pub combined_dataset_path: PathBuf,
    pub normalized_dataset_path: PathBuf,
    pub model_path: PathBuf,
    pub remedies_path: PathBuf,
    pub database_path: PathBuf,
    pub wikipedia_base_url: String,
    pub lookup_timeout: Duration,
    pub mail: MailConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr = env_or("MEDICURE_BIND_ADDR", DEFAULT_BIND_ADDR)
            .parse()
            .context("MEDICURE_BIND_ADDR is not a valid socket address")?;

        let data_dir = match std::env::var("MEDICURE_DATA_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => app_data_dir(),
        };

        let lookup_timeout_secs = match std::env::var("MEDICURE_LOOKUP_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse()
                .context("MEDICURE_LOOKUP_TIMEOUT_SECS is not a number")?,
            Err(_) => DEFAULT_LOOKUP_TIMEOUT_SECS,
        };

        let mail_port = match std::env::var("MAIL_PORT") {
            Ok(raw) => raw.parse().context("MAIL_PORT is not a number")?,
            Err(_) => DEFAULT_MAIL_PORT,
        };

        Ok(Self {
            bind_addr,
            combined_dataset_path: data_dir.join("dis_sym_dataset_comb.csv"),
            normalized_dataset_path: data_dir.join("dis_sym_dataset_norm.csv"),
            model_path: data_dir.join("model_lr.json"),
            remedies_path: data_dir.join("home_remedies.csv"),
            database_path: data_dir.join("users.db"),
            data_dir,
            wikipedia_base_url: env_or("WIKIPEDIA_BASE_URL", DEFAULT_WIKIPEDIA_BASE),
            lookup_timeout: Duration::from_secs(lookup_timeout_secs),
            mail: MailConfig {
                server: env_or("MAIL_SERVER", "localhost"),
                port: mail_port,
                username: std::env::var("MAIL_USERNAME").ok(),
                password: std::env::var("MAIL_PASSWORD").ok(),
                sender: env_or("MAIL_DEFAULT_SENDER", "noreply@medicure.local"),
            },
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
