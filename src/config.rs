use crate::error::TipJarError;
use anyhow::Result;
use ethers::providers::{Http, Provider};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Move module that holds the tip ledger entry points.
pub const TIP_MODULE: &str = "sui_buy_me_coffee";

/// Entry function that records a tip and moves the payment to the creator.
pub const TIP_FUNCTION: &str = "buy_coffee";

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_REFRESH_DELAY: Duration = Duration::from_secs(2);

/// The three public Sui networks the client can talk to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Network {
    Mainnet,
    Testnet,
    Devnet,
}

/// A predefined Sui network with its label, fullnode and explorer.
#[derive(Clone, Debug)]
pub struct SuiNetwork {
    pub network: Network,
    pub label: &'static str,
    pub default_rpc: &'static str,
    pub explorer: &'static str,
}

impl SuiNetwork {
    pub const fn new(
        network: Network,
        label: &'static str,
        default_rpc: &'static str,
        explorer: &'static str,
    ) -> Self {
        Self {
            network,
            label,
            default_rpc,
            explorer,
        }
    }
}

pub const NETWORKS: &[SuiNetwork] = &[
    SuiNetwork::new(Network::Mainnet, "Mainnet", "https://fullnode.mainnet.sui.io:443", "https://suiscan.xyz/mainnet"),
    SuiNetwork::new(Network::Testnet, "Testnet", "https://fullnode.testnet.sui.io:443", "https://suiscan.xyz/testnet"),
    SuiNetwork::new(Network::Devnet, "Devnet", "https://fullnode.devnet.sui.io:443", "https://suiscan.xyz/devnet"),
];

impl Network {
    pub fn info(&self) -> &'static SuiNetwork {
        // NETWORKS lists every variant
        NETWORKS
            .iter()
            .find(|n| n.network == *self)
            .unwrap_or(&NETWORKS[1])
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Devnet => "devnet",
        }
    }
}

impl Default for Network {
    fn default() -> Self {
        Network::Testnet
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = TipJarError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            "devnet" => Ok(Network::Devnet),
            other => Err(TipJarError::Config(format!(
                "unknown network '{}' (expected mainnet, testnet or devnet)",
                other
            ))),
        }
    }
}

/// Normalize a Sui object id or address to the canonical `0x` + 64 lowercase hex form.
///
/// Short forms such as `0x2` are left-padded with zeros.
/// Returns `None` for anything that is not hex or is longer than 32 bytes.
pub fn normalize_sui_id(input: &str) -> Option<String> {
    let trimmed = input.trim();
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if body.is_empty() || body.len() > 64 {
        return None;
    }
    let padded = format!("{:0>64}", body.to_ascii_lowercase());
    hex::decode(&padded).ok()?;
    Some(format!("0x{}", padded))
}

/// Explorer link for an on-chain object (the ledger, a coin, ...)
pub fn get_object_explorer_url(network: Network, object_id: &str) -> String {
    format!("{}/object/{}", network.info().explorer, object_id)
}

/// Explorer link for an account address
pub fn get_account_explorer_url(network: Network, address: &str) -> String {
    format!("{}/account/{}", network.info().explorer, address)
}

#[derive(Clone, Debug)]
pub struct Config {
    pub package_id: String,
    pub ledger_object_id: String,
    pub network: Network,
    pub rpc_override: Option<String>,
    pub poll_interval: Duration,
    pub refresh_delay: Duration,
    pub export_directory: PathBuf,
    /// Addresses offered in the wallet menu
    pub accounts: Vec<String>,
}

impl Config {
    pub fn new(package_id: impl Into<String>, ledger_object_id: impl Into<String>, network: Network) -> Self {
        Self {
            package_id: package_id.into(),
            ledger_object_id: ledger_object_id.into(),
            network,
            rpc_override: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            refresh_delay: DEFAULT_REFRESH_DELAY,
            export_directory: default_export_directory(),
            accounts: Vec::new(),
        }
    }

    /// Build the configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Never fails: unparsable values are logged and replaced by defaults, so a
    /// misconfigured client still starts and shows its "unable to load" state.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let network = match get("TIPJAR_NETWORK") {
            Some(raw) => raw.parse().unwrap_or_else(|e: TipJarError| {
                tracing::warn!("{}; falling back to testnet", e);
                Network::Testnet
            }),
            None => Network::default(),
        };

        let mut config = Self::new(
            get("TIPJAR_PACKAGE_ID").unwrap_or_default(),
            get("TIPJAR_LEDGER_ID").unwrap_or_default(),
            network,
        );
        config.rpc_override = get("TIPJAR_RPC_URL");

        if let Some(secs) = get("TIPJAR_POLL_INTERVAL_SECS").and_then(|v| v.parse::<u64>().ok()) {
            if secs > 0 {
                config.poll_interval = Duration::from_secs(secs);
            }
        }
        if let Some(secs) = get("TIPJAR_REFRESH_DELAY_SECS").and_then(|v| v.parse::<u64>().ok()) {
            config.refresh_delay = Duration::from_secs(secs);
        }
        if let Some(dir) = get("TIPJAR_EXPORT_DIR") {
            config.export_directory = PathBuf::from(dir);
        }
        if let Some(list) = get("TIPJAR_ACCOUNTS") {
            config.accounts = list
                .split(',')
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_string)
                .collect();
        }

        config
    }

    /// Problems that will keep the client from reading or tipping.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.package_id.is_empty() {
            problems.push("TIPJAR_PACKAGE_ID is not set".to_string());
        } else if normalize_sui_id(&self.package_id).is_none() {
            problems.push(format!("TIPJAR_PACKAGE_ID '{}' is not a valid Sui id", self.package_id));
        }
        if self.ledger_object_id.is_empty() {
            problems.push("TIPJAR_LEDGER_ID is not set".to_string());
        } else if normalize_sui_id(&self.ledger_object_id).is_none() {
            problems.push(format!("TIPJAR_LEDGER_ID '{}' is not a valid Sui id", self.ledger_object_id));
        }
        if let Some(rpc) = &self.rpc_override {
            if Url::parse(rpc).is_err() {
                problems.push(format!("TIPJAR_RPC_URL '{}' is not a valid URL", rpc));
            }
        }
        for account in &self.accounts {
            if normalize_sui_id(account).is_none() {
                problems.push(format!("account '{}' in TIPJAR_ACCOUNTS is not a valid address", account));
            }
        }
        problems
    }

    /// Log each configuration problem as a warning. Startup continues regardless.
    pub fn warn_if_incomplete(&self) -> bool {
        let problems = self.validate();
        for problem in &problems {
            tracing::warn!("Missing or invalid configuration: {}", problem);
        }
        problems.is_empty()
    }

    /// The RPC endpoint in use: the override when it parses as a URL, otherwise
    /// the network's fullnode.
    pub fn rpc_url(&self) -> &str {
        match self.rpc_override.as_deref() {
            Some(rpc) if Url::parse(rpc).is_ok() => rpc,
            _ => self.network.info().default_rpc,
        }
    }

    pub fn network_label(&self) -> &str {
        self.network.info().label
    }

    pub fn get_provider(&self) -> Result<Arc<Provider<Http>>> {
        if let Some(rpc) = &self.rpc_override {
            if rpc.as_str() != self.rpc_url() {
                tracing::warn!(
                    "Ignoring invalid TIPJAR_RPC_URL '{}', using {}",
                    rpc,
                    self.network.info().default_rpc
                );
            }
        }
        let url = Url::parse(self.rpc_url())?;
        let provider = Provider::<Http>::try_from(url.as_str())?;
        Ok(Arc::new(provider))
    }
}

fn default_export_directory() -> PathBuf {
    dirs::document_dir()
        .or_else(dirs::home_dir)
        .map(|dir| dir.join("TipJar"))
        .unwrap_or_else(|| PathBuf::from("."))
}

impl Default for Config {
    fn default() -> Self {
        Self::new("", "", Network::Testnet)
    }
}
