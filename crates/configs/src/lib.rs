//! TOML configuration of a protocol deployment.
//!
//! ```toml
//! chain-id = 1
//! verifying-contract = "0x111111125421cA6dc452d289314280a0f8842A65"
//! weth = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"
//!
//! [domain]
//! name = "1inch Limit Order Protocol"
//! version = "4"
//!
//! [logging]
//! filter = "info,limit_order=debug"
//! ```

use {
    alloy_primitives::{Address, address},
    anyhow::{Context, Result},
    limit_order::Contracts,
    model::{DEFAULT_DOMAIN_NAME, DEFAULT_DOMAIN_VERSION, DomainSeparator},
    serde::Deserialize,
    std::path::Path,
};

/// The canonical Permit2 deployment, at the same address on every chain.
pub const PERMIT2: Address = address!("000000000022D473030F116dDEE9F6B43aC78BA3");

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    pub chain_id: u64,

    /// Address of the protocol contract: the EIP-712 verifying contract and
    /// the spender of both assets of every fill.
    pub verifying_contract: Address,

    /// The wrapped native token of the chain.
    pub weth: Address,

    #[serde(default = "default_permit2")]
    pub permit2: Address,

    #[serde(default)]
    pub domain: Domain,

    #[serde(default)]
    pub logging: Logging,
}

/// EIP-712 domain name and version orders are signed under.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Domain {
    pub name: String,
    pub version: String,
}

impl Default for Domain {
    fn default() -> Self {
        Self {
            name: DEFAULT_DOMAIN_NAME.to_string(),
            version: DEFAULT_DOMAIN_VERSION.to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Logging {
    /// `tracing-subscriber` env filter directives.
    #[serde(default = "default_filter")]
    pub filter: String,

    /// Level from which events also go to stderr.
    #[serde(default)]
    pub stderr_threshold: Option<String>,

    #[serde(default)]
    pub json: bool,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            stderr_threshold: None,
            json: false,
        }
    }
}

fn default_permit2() -> Address {
    PERMIT2
}

fn default_filter() -> String {
    "info".to_string()
}

impl Config {
    pub fn from_toml(data: &str) -> Result<Self> {
        toml::from_str(data).context("invalid configuration")
    }

    pub fn contracts(&self) -> Contracts {
        Contracts {
            protocol: self.verifying_contract,
            weth: self.weth,
            permit2: self.permit2,
        }
    }

    pub fn domain_separator(&self) -> DomainSeparator {
        DomainSeparator::with_name_and_version(
            &self.domain.name,
            &self.domain.version,
            self.chain_id,
            self.verifying_contract,
        )
    }

    pub fn observe(&self) -> Result<observe::Config> {
        let stderr_threshold = self
            .logging
            .stderr_threshold
            .as_deref()
            .map(str::parse::<tracing::Level>)
            .transpose()
            .context("invalid stderr threshold")?;
        Ok(observe::Config::new(
            &self.logging.filter,
            stderr_threshold,
            self.logging.json,
        ))
    }
}

/// Loads the configuration from a TOML file.
pub fn load(path: &Path) -> Result<Config> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration at {}", path.display()))?;
    let config = Config::from_toml(&data)
        .with_context(|| format!("failed to parse configuration at {}", path.display()))?;
    tracing::debug!(path = %path.display(), chain_id = config.chain_id, "loaded configuration");
    Ok(config)
}
