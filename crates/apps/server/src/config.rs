use brickyard_gateway::GatewayConfig;
use std::{env, fmt, str::FromStr};

/// Whether failures are papered over with the development batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionMode {
    Development,
    #[default]
    Production,
}

impl ExecutionMode {
    pub fn is_development(self) -> bool {
        self == ExecutionMode::Development
    }
}

impl FromStr for ExecutionMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(ExecutionMode::Development),
            "production" | "prod" => Ok(ExecutionMode::Production),
            other => anyhow::bail!("unknown execution mode {other:?}"),
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExecutionMode::Development => "development",
            ExecutionMode::Production => "production",
        })
    }
}

/// Configuration for the Brickyard server binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address and port the server binds to (e.g. `0.0.0.0:3000`).
    pub bind_address: String,
    pub mode: ExecutionMode,
    /// Name reported by the health endpoint.
    pub service_name: String,
    /// Provider endpoints and credentials.
    pub gateway: GatewayConfig,
}

impl ServerConfig {
    /// Builds a configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let bind_address = lookup("BRICKYARD_BIND").unwrap_or_else(|| "0.0.0.0:3000".into());
        let mode = match lookup("BRICKYARD_MODE") {
            Some(mode) => mode.parse()?,
            None => ExecutionMode::default(),
        };
        let service_name =
            lookup("BRICKYARD_SERVICE_NAME").unwrap_or_else(|| "brickyard".into());

        anyhow::ensure!(!bind_address.trim().is_empty(), "bind address must not be empty");

        Ok(Self {
            bind_address,
            mode,
            service_name,
            gateway: GatewayConfig::from_lookup(lookup),
        })
    }
}
