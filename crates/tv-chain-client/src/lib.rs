//! Seams between the portal and the outside world: the browser wallet,
//! the remote list program, and the host timer.
//!
//! All traits are `?Send` because browser futures are not `Send`.

use async_trait::async_trait;
use tv_api_types::{Address, Entry, TxSignature};

pub type ChainResult<T> = Result<T, ChainError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("could not decode account: {0}")]
    AccountDecode(String),
    #[error("wallet error: {0}")]
    Wallet(String),
    #[error("signing error: {0}")]
    Signing(String),
    #[error("transaction {signature} not confirmed: {reason}")]
    Confirmation { signature: String, reason: String },
    #[error("program descriptor error: {0}")]
    Descriptor(String),
}

/// What the page exposes at `window.solana`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayPresence {
    Missing,
    /// Something is injected but does not advertise the expected capability.
    Unsupported,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectMode {
    /// Only succeeds if the user already trusts this site; never prompts.
    TrustedOnly,
    Interactive,
}

#[async_trait(?Send)]
pub trait WalletGateway {
    fn presence(&self) -> GatewayPresence;
    async fn connect(&self, mode: ConnectMode) -> ChainResult<Address>;
}

/// Signing identity held by the wallet.
#[async_trait(?Send)]
pub trait WalletSigner {
    /// Returns the 64-byte ed25519 signature over a serialized message.
    async fn sign_message(&self, signer: &Address, message: &[u8]) -> ChainResult<[u8; 64]>;
}

/// One short-lived connection bound to a wallet identity.
#[async_trait(?Send)]
pub trait ListSession {
    /// `Ok(None)` means the storage account does not exist yet.
    async fn fetch_entries(&self) -> ChainResult<Option<Vec<Entry>>>;
    async fn append_entry(&self, link: &str) -> ChainResult<TxSignature>;
    async fn initialize_storage(&self) -> ChainResult<TxSignature>;
}

pub trait ConnectionFactory {
    type Session: ListSession;

    fn open(&self, identity: &Address) -> Self::Session;
}

#[async_trait(?Send)]
pub trait Timer {
    async fn sleep_ms(&self, ms: u32);
}
