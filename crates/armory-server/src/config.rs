use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use armory_catalog::PageLimits;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Deployment environment. Development mode exposes internal error details
/// in responses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl FromStr for Environment {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ServerError::Config(format!("unknown environment: {other}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Directory holding `nations.json` and the category documents.
    pub data_dir: PathBuf,
    /// Static front-end served for every non-API path.
    pub public_dir: Option<PathBuf>,
    pub default_page_limit: usize,
    pub max_page_limit: usize,
    pub environment: Environment,
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
            data_dir: PathBuf::from("data"),
            public_dir: Some(PathBuf::from("public")),
            default_page_limit: 20,
            max_page_limit: 100,
            environment: Environment::Production,
            cors_permissive: true,
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(text: &str) -> ServerResult<Self> {
        toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn from_toml_file(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Override fields from `HOST`, `PORT`, `ARMORY_DATA_DIR`,
    /// `ARMORY_PUBLIC_DIR` and `ARMORY_ENV`.
    pub fn apply_env(&mut self) -> ServerResult<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> ServerResult<()> {
        if let Some(host) = lookup("HOST") {
            let ip: IpAddr = host
                .parse()
                .map_err(|_| ServerError::Config(format!("invalid HOST: {host}")))?;
            self.bind_addr.set_ip(ip);
        }
        if let Some(port) = lookup("PORT") {
            let port: u16 = port
                .parse()
                .map_err(|_| ServerError::Config(format!("invalid PORT: {port}")))?;
            self.bind_addr.set_port(port);
        }
        if let Some(dir) = lookup("ARMORY_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("ARMORY_PUBLIC_DIR") {
            self.public_dir = (!dir.is_empty()).then(|| PathBuf::from(dir));
        }
        if let Some(env) = lookup("ARMORY_ENV") {
            self.environment = env.parse()?;
        }
        Ok(())
    }

    pub fn page_limits(&self) -> PageLimits {
        PageLimits {
            default_limit: self.default_page_limit.max(1),
            max_limit: self.max_page_limit.max(1),
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}
