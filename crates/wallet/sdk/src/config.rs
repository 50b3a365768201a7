use passkey_auth::ContractAddress;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

/// Average ledger close time
pub const LEDGER_CLOSE_SECS: u32 = 5;

pub const DEFAULT_TIMEOUT_SECS: u32 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Public,
    Testnet,
    Futurenet,
}

impl Network {
    pub const PUBLIC_PASSPHRASE: &str = "Public Global Stellar Network ; September 2015";
    pub const TESTNET_PASSPHRASE: &str = "Test SDF Network ; September 2015";
    pub const FUTURENET_PASSPHRASE: &str = "Test SDF Future Network ; October 2022";

    pub const fn passphrase(self) -> &'static str {
        match self {
            Self::Public => Self::PUBLIC_PASSPHRASE,
            Self::Testnet => Self::TESTNET_PASSPHRASE,
            Self::Futurenet => Self::FUTURENET_PASSPHRASE,
        }
    }
}

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("network passphrase is empty")]
    EmptyPassphrase,

    #[error("timeout must cover at least one ledger, got {0}s")]
    TimeoutTooShort(u32),

    #[error("factory contract id: {0}")]
    FactoryContractId(#[source] passkey_auth::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KitConfig {
    pub rpc_url: String,
    pub network_passphrase: String,
    /// `C...` strkey of the wallet factory
    pub factory_contract_id: String,
    /// Validity window of signatures
    pub timeout_secs: u32,
    /// Relying party id forwarded to WebAuthn ceremonies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rp_id: Option<String>,
}

impl Default for KitConfig {
    fn default() -> Self {
        Self {
            rpc_url: String::new(),
            network_passphrase: Network::TESTNET_PASSPHRASE.to_owned(),
            factory_contract_id: String::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            rp_id: None,
        }
    }
}

impl KitConfig {
    pub fn new(
        rpc_url: impl Into<String>,
        network: Network,
        factory_contract_id: impl Into<String>,
    ) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            network_passphrase: network.passphrase().to_owned(),
            factory_contract_id: factory_contract_id.into(),
            ..Default::default()
        }
    }

    /// Returns the parsed factory address
    pub fn validate(&self) -> Result<ContractAddress, ConfigError> {
        if self.network_passphrase.is_empty() {
            return Err(ConfigError::EmptyPassphrase);
        }
        if self.timeout_secs < LEDGER_CLOSE_SECS {
            return Err(ConfigError::TimeoutTooShort(self.timeout_secs));
        }
        self.factory_contract_id
            .parse()
            .map_err(ConfigError::FactoryContractId)
    }

    /// Ledgers a signature stays valid for
    #[inline]
    pub const fn ledgers_to_live(&self) -> u32 {
        self.timeout_secs / LEDGER_CLOSE_SECS
    }
}
