//! Solana adapter for the link list program.
//!
//! Builds Anchor instructions from the bundled IDL, compiles legacy
//! transactions by hand, collects the wallet's and the storage co-signer's
//! signatures, and talks JSON-RPC through `reqwest`.

pub mod anchor;
pub mod bundle;
pub mod rpc;
pub mod wire;

use async_trait::async_trait;
use std::rc::Rc;
use tracing::{debug, info, warn};
use tv_api_types::{Address, Entry, TxSignature};
use tv_chain_client::{
    ChainError, ChainResult, ConnectionFactory, ListSession, Timer, WalletSigner,
};
use tv_crypto::Signer;

pub use bundle::{BundleSettings, ProgramBundle};

use anchor::BaseAccount;
use rpc::RpcClient;
use wire::{Instruction, Message, Transaction};

pub const CONFIRM_ATTEMPTS: u32 = 60;
pub const CONFIRM_INTERVAL_MS: u32 = 500;

/// Opens a fresh [`SolanaSession`] per remote call.
pub struct SolanaConnector<W, T> {
    bundle: Rc<ProgramBundle>,
    wallet: Rc<W>,
    timer: Rc<T>,
}

impl<W, T> SolanaConnector<W, T> {
    pub fn new(bundle: Rc<ProgramBundle>, wallet: Rc<W>, timer: Rc<T>) -> Self {
        Self {
            bundle,
            wallet,
            timer,
        }
    }
}

impl<W, T> ConnectionFactory for SolanaConnector<W, T>
where
    W: WalletSigner,
    T: Timer,
{
    type Session = SolanaSession<W, T>;

    fn open(&self, identity: &Address) -> Self::Session {
        SolanaSession {
            rpc: RpcClient::new(self.bundle.rpc_url(), self.bundle.commitment()),
            bundle: Rc::clone(&self.bundle),
            wallet: Rc::clone(&self.wallet),
            timer: Rc::clone(&self.timer),
            identity: *identity,
        }
    }
}

pub struct SolanaSession<W, T> {
    rpc: RpcClient,
    bundle: Rc<ProgramBundle>,
    wallet: Rc<W>,
    timer: Rc<T>,
    identity: Address,
}

impl<W, T> SolanaSession<W, T>
where
    W: WalletSigner,
    T: Timer,
{
    async fn send(&self, instruction: Instruction, co_sign: bool) -> ChainResult<TxSignature> {
        let blockhash = self.rpc.latest_blockhash().await?;
        let message = Message::compile(&self.identity, &[instruction], blockhash)?;
        let bytes = message.serialize()?;
        let mut tx = Transaction::new(message);

        if co_sign {
            let storage = self.bundle.storage_signer();
            let signature = storage
                .sign(&bytes)
                .map_err(|e| ChainError::Signing(format!("{e:#}")))?;
            tx.add_signature(&storage.address(), signature)?;
        }

        let signature = self.wallet.sign_message(&self.identity, &bytes).await?;
        tx.add_signature(&self.identity, signature)?;

        let wire = tx.serialize()?;
        let tx_signature = self.rpc.send_transaction(&wire).await?;
        debug!(signature = %tx_signature, "transaction sent");
        self.confirm(&tx_signature).await?;
        Ok(tx_signature)
    }

    async fn confirm(&self, signature: &TxSignature) -> ChainResult<()> {
        let wanted = self.bundle.commitment();
        for attempt in 0..CONFIRM_ATTEMPTS {
            let status = match self.rpc.signature_status(signature).await {
                Ok(status) => status,
                Err(e) => {
                    // a failed poll does not fail the write
                    warn!(%signature, attempt, error = %e, "status poll failed");
                    None
                }
            };
            match status {
                Some(status) if status.err.is_some() => {
                    return Err(ChainError::Confirmation {
                        signature: signature.0.clone(),
                        reason: status.err.map(|e| e.to_string()).unwrap_or_default(),
                    });
                }
                Some(status)
                    if status
                        .confirmation_status
                        .as_deref()
                        .is_some_and(|s| wanted.is_reached_by(s)) =>
                {
                    debug!(%signature, attempt, "transaction confirmed");
                    return Ok(());
                }
                _ => self.timer.sleep_ms(CONFIRM_INTERVAL_MS).await,
            }
        }
        warn!(%signature, "confirmation window elapsed");
        Err(ChainError::Confirmation {
            signature: signature.0.clone(),
            reason: "not confirmed within the confirmation window".into(),
        })
    }
}

#[async_trait(?Send)]
impl<W, T> ListSession for SolanaSession<W, T>
where
    W: WalletSigner,
    T: Timer,
{
    async fn fetch_entries(&self) -> ChainResult<Option<Vec<Entry>>> {
        let storage = self.bundle.storage_account();
        let Some(data) = self.rpc.account_data(&storage).await? else {
            info!(%storage, "storage account does not exist yet");
            return Ok(None);
        };
        let account = BaseAccount::decode(&data)?;
        debug!(total = account.total_gifs, "fetched storage account");
        Ok(Some(account.entries()))
    }

    async fn append_entry(&self, link: &str) -> ChainResult<TxSignature> {
        let ix = self.bundle.append_instruction(&self.identity, link)?;
        self.send(ix, false).await
    }

    async fn initialize_storage(&self) -> ChainResult<TxSignature> {
        let ix = self.bundle.initialize_instruction(&self.identity)?;
        let signature = self.send(ix, true).await?;
        info!(storage = %self.bundle.storage_account(), "created storage account");
        Ok(signature)
    }
}
