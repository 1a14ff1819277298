//! Runtime configuration, read from the environment (and `.env` if present).

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Result, WalletError};

const DEFAULT_UPLOAD_ENDPOINT: &str = "https://storage.thirdweb.com/ipfs/upload";
const DEFAULT_IPFS_GATEWAY: &str = "https://ipfs.io/ipfs/";
const DEFAULT_INSTALL_URL: &str = "https://docs.solanalabs.com/cli/install";
const DEFAULT_INSTALL_DELAY_MS: u64 = 2_000;
const DEFAULT_CONFIRM_TIMEOUT_SECS: u64 = 60;
const STORAGE_DIR_NAME: &str = "superteach-starter";
const STORAGE_FILE_NAME: &str = "local_storage.json";

/// Solana cluster the page talks to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Cluster {
    #[default]
    Devnet,
    Testnet,
    MainnetBeta,
}

impl Cluster {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Devnet => "devnet",
            Self::Testnet => "testnet",
            Self::MainnetBeta => "mainnet-beta",
        }
    }

    pub fn api_url(&self) -> &'static str {
        match self {
            Self::Devnet => "https://api.devnet.solana.com",
            Self::Testnet => "https://api.testnet.solana.com",
            Self::MainnetBeta => "https://api.mainnet-beta.solana.com",
        }
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Cluster {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "devnet" => Ok(Self::Devnet),
            "testnet" => Ok(Self::Testnet),
            "mainnet" | "mainnet-beta" => Ok(Self::MainnetBeta),
            other => Err(WalletError::Config(format!("unknown cluster '{other}'"))),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub cluster: Cluster,
    pub rpc_url: String,
    pub keypair_path: PathBuf,
    pub storage_path: PathBuf,
    pub upload_endpoint: String,
    pub thirdweb_client_id: Option<String>,
    pub ipfs_gateway: String,
    pub install_url: String,
    pub install_delay: Duration,
    pub confirm_timeout: Duration,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let cluster = Cluster::default();
        Self {
            cluster,
            rpc_url: cluster.api_url().to_string(),
            keypair_path: default_keypair_path(),
            storage_path: default_storage_path(),
            upload_endpoint: DEFAULT_UPLOAD_ENDPOINT.to_string(),
            thirdweb_client_id: None,
            ipfs_gateway: DEFAULT_IPFS_GATEWAY.to_string(),
            install_url: DEFAULT_INSTALL_URL.to_string(),
            install_delay: Duration::from_millis(DEFAULT_INSTALL_DELAY_MS),
            confirm_timeout: Duration::from_secs(DEFAULT_CONFIRM_TIMEOUT_SECS),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load `.env` (if any) and read `STARTER_*` variables over the defaults.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(cluster) = lookup("STARTER_CLUSTER") {
            config.cluster = cluster.parse()?;
            config.rpc_url = config.cluster.api_url().to_string();
        }
        if let Some(url) = lookup("STARTER_RPC_URL") {
            config.rpc_url = url;
        }
        if let Some(path) = lookup("STARTER_KEYPAIR_PATH") {
            config.keypair_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("STARTER_STORAGE_PATH") {
            config.storage_path = PathBuf::from(path);
        }
        if let Some(endpoint) = lookup("STARTER_UPLOAD_ENDPOINT") {
            config.upload_endpoint = endpoint;
        }
        config.thirdweb_client_id = lookup("THIRDWEB_CLIENT_ID").filter(|id| !id.is_empty());
        if let Some(gateway) = lookup("STARTER_IPFS_GATEWAY") {
            config.ipfs_gateway = gateway;
        }
        if let Some(url) = lookup("STARTER_INSTALL_URL") {
            config.install_url = url;
        }
        if let Some(ms) = lookup("STARTER_INSTALL_DELAY_MS") {
            config.install_delay = Duration::from_millis(parse_number("STARTER_INSTALL_DELAY_MS", &ms)?);
        }
        if let Some(secs) = lookup("STARTER_CONFIRM_TIMEOUT_SECS") {
            config.confirm_timeout =
                Duration::from_secs(parse_number("STARTER_CONFIRM_TIMEOUT_SECS", &secs)?);
        }
        if let Some(level) = lookup("STARTER_LOG") {
            config.log_level = level;
        }

        Ok(config)
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| WalletError::Config(format!("{key} must be a whole number, got '{value}'")))
}

fn default_keypair_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".config")
        .join("solana")
        .join("id.json")
}

fn default_storage_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(STORAGE_DIR_NAME)
        .join(STORAGE_FILE_NAME)
}
