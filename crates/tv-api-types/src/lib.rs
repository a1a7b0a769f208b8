use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const ADDRESS_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("address is not valid base58: {0}")]
    Encoding(String),
    #[error("address must be 32 bytes, got {0}")]
    Length(usize),
}

/// 32-byte ed25519 public key, displayed in base58.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, AddressError> {
        let array: [u8; ADDRESS_LEN] = bytes
            .try_into()
            .map_err(|_| AddressError::Length(bytes.len()))?;
        Ok(Self(array))
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s.trim())
            .into_vec()
            .map_err(|e| AddressError::Encoding(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.to_string()
    }
}

/// One submitted link and the wallet that submitted it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entry {
    pub link: String,
    pub submitter: Address,
}

/// Base58 transaction signature as returned by `sendTransaction`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TxSignature(pub String);

impl fmt::Display for TxSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Cluster {
    #[default]
    Devnet,
    Testnet,
    MainnetBeta,
}

impl Cluster {
    pub fn rpc_url(&self) -> &'static str {
        match self {
            Cluster::Devnet => "https://api.devnet.solana.com",
            Cluster::Testnet => "https://api.testnet.solana.com",
            Cluster::MainnetBeta => "https://api.mainnet-beta.solana.com",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Cluster::Devnet => "devnet",
            Cluster::Testnet => "testnet",
            Cluster::MainnetBeta => "mainnet-beta",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Commitment {
    #[default]
    Processed,
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }

    /// Whether a status reported by `getSignatureStatuses` satisfies this level.
    pub fn is_reached_by(&self, status: &str) -> bool {
        let rank = |s: &str| match s {
            "processed" => 0,
            "confirmed" => 1,
            "finalized" => 2,
            _ => -1,
        };
        rank(status) >= rank(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORAGE: &str = "8spPVGmwidxe28EYvhzVUB6mJynkV5yWCThdFZvd8ArK";

    #[test]
    fn address_parses_and_displays_base58() {
        let address: Address = STORAGE.parse().expect("valid address");
        assert_eq!(address.to_string(), STORAGE);
        assert_eq!(address.as_bytes()[0], 117);
    }

    #[test]
    fn address_rejects_wrong_length_and_alphabet() {
        assert_eq!("1111".parse::<Address>(), Err(AddressError::Length(4)));
        assert!(matches!(
            "0OIl".parse::<Address>(),
            Err(AddressError::Encoding(_))
        ));
    }

    #[test]
    fn address_serializes_as_string() {
        let address: Address = STORAGE.parse().expect("valid address");
        let json = serde_json::to_string(&address).expect("serialize");
        assert_eq!(json, format!("\"{STORAGE}\""));
        let back: Address = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, address);
    }

    #[test]
    fn commitment_ordering() {
        assert!(Commitment::Processed.is_reached_by("confirmed"));
        assert!(Commitment::Confirmed.is_reached_by("finalized"));
        assert!(!Commitment::Finalized.is_reached_by("processed"));
        assert!(!Commitment::Processed.is_reached_by("unknown"));
    }

    #[test]
    fn cluster_names_match_config() {
        let cluster: Cluster = serde_json::from_str("\"devnet\"").expect("cluster");
        assert_eq!(cluster, Cluster::Devnet);
        assert_eq!(cluster.rpc_url(), "https://api.devnet.solana.com");
        let mainnet: Cluster = serde_json::from_str("\"mainnet-beta\"").expect("cluster");
        assert_eq!(mainnet.name(), "mainnet-beta");
    }
}
