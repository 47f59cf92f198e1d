use std::env;

use log::*;
use spg_common::helpers::parse_boolean_flag;

const DEFAULT_SPG_HOST: &str = "127.0.0.1";
const DEFAULT_SPG_PORT: u16 = 8480;
const DEFAULT_PAGE_SIZE: i64 = 20;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The base URL stamped into each order's `payment_url`, e.g. `https://pay.example.com`. Payment links use
    /// relative URLs and are not affected by this.
    pub payment_url_base: String,
    /// The page size used for `/v1/orders` when the request does not carry a `limit`.
    pub default_page_size: i64,
    /// Whether the background sweep that expires overdue pending orders runs in this process.
    pub run_expiry_worker: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SPG_HOST.to_string(),
            port: DEFAULT_SPG_PORT,
            database_url: String::default(),
            payment_url_base: format!("http://{DEFAULT_SPG_HOST}:{DEFAULT_SPG_PORT}"),
            default_page_size: DEFAULT_PAGE_SIZE,
            run_expiry_worker: true,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SPG_HOST").ok().unwrap_or_else(|| DEFAULT_SPG_HOST.into());
        let port = env::var("SPG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for SPG_PORT. {e} Using the default, {DEFAULT_SPG_PORT}, instead."
                    );
                    DEFAULT_SPG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SPG_PORT);
        let database_url = env::var("SPG_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ SPG_DATABASE_URL is not set. Please set it to the URL for the gateway database.");
            String::default()
        });
        let payment_url_base = env::var("SPG_PAYMENT_URL").ok().unwrap_or_else(|| {
            let default = format!("http://{host}:{port}");
            warn!("🪛️ SPG_PAYMENT_URL is not set. Orders will carry payment URLs under {default}.");
            default
        });
        let default_page_size = env::var("SPG_PAGE_SIZE")
            .ok()
            .and_then(|s| {
                s.parse::<i64>()
                    .map_err(|e| warn!("🪛️ Invalid configuration value for SPG_PAGE_SIZE. {e}"))
                    .ok()
            })
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE);
        let run_expiry_worker = parse_boolean_flag(env::var("SPG_EXPIRY_WORKER").ok(), true);
        Self { host, port, database_url, payment_url_base, default_page_size, run_expiry_worker }
    }
}
