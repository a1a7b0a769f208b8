//! Async driver: runs the operations against the wallet and the remote
//! list, feeding results back through [`PortalState`] transitions.
//!
//! State lives in a `RefCell` and is never borrowed across an await.

use std::cell::RefCell;
use tracing::{debug, info, warn};
use tv_chain_client::{
    ConnectMode, ConnectionFactory, GatewayPresence, ListSession, WalletGateway,
};

use crate::state::{Effect, FetchOutcome, PortalState, Refusal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// No wallet object was injected into the page.
    WalletMissing,
}

pub trait PortalObserver {
    fn state_changed(&self, state: &PortalState);
    fn notice(&self, notice: Notice);
}

pub struct Portal<G, F, O> {
    gateway: G,
    factory: F,
    observer: O,
    state: RefCell<PortalState>,
}

impl<G, F, O> Portal<G, F, O>
where
    G: WalletGateway,
    F: ConnectionFactory,
    O: PortalObserver,
{
    pub fn new(gateway: G, factory: F, observer: O) -> Self {
        Self {
            gateway,
            factory,
            observer,
            state: RefCell::new(PortalState::new()),
        }
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&PortalState) -> R) -> R {
        f(&self.state.borrow())
    }

    fn update<R>(&self, f: impl FnOnce(&mut PortalState) -> R) -> R {
        f(&mut self.state.borrow_mut())
    }

    fn publish(&self) {
        let state = self.state.borrow();
        self.observer.state_changed(&state);
    }

    pub fn render(&self) {
        self.publish();
    }

    /// Tracks the text field. Does not re-render.
    pub fn set_input(&self, text: &str) {
        self.update(|s| s.set_input(text));
    }

    /// Runs once at load; never prompts the user.
    pub async fn silent_connect(&self) {
        match self.gateway.presence() {
            GatewayPresence::Missing => {
                warn!("no wallet injected into the page");
                self.observer.notice(Notice::WalletMissing);
            }
            GatewayPresence::Unsupported => {
                debug!("injected wallet is not supported, skipping auto-connect");
            }
            GatewayPresence::Ready => {
                info!("wallet found, trying trusted connect");
                match self.gateway.connect(ConnectMode::TrustedOnly).await {
                    Ok(address) => self.adopt(address).await,
                    Err(e) => warn!(error = %e, "trusted connect declined"),
                }
            }
        }
    }

    /// User-triggered; the wallet may show its own approval prompt.
    pub async fn connect(&self) {
        if self.gateway.presence() == GatewayPresence::Missing {
            self.observer.notice(Notice::WalletMissing);
            return;
        }
        match self.gateway.connect(ConnectMode::Interactive).await {
            Ok(address) => self.adopt(address).await,
            Err(e) => warn!(error = %e, "wallet connect rejected"),
        }
    }

    async fn adopt(&self, address: tv_api_types::Address) {
        info!(%address, "connected");
        let effect = self.update(|s| s.connect(address));
        self.publish();
        self.run(effect).await;
    }

    async fn run(&self, effect: Option<Effect>) {
        if let Some(Effect::FetchList) = effect {
            self.refresh().await;
        }
    }

    /// Reads the whole list and replaces local state with it.
    pub async fn refresh(&self) {
        let ticket = match self.update(|s| s.begin_fetch()) {
            Ok(ticket) => ticket,
            Err(refusal) => {
                debug!(?refusal, "fetch skipped");
                return;
            }
        };

        let session = self.factory.open(ticket.identity());
        let outcome = match session.fetch_entries().await {
            Ok(Some(entries)) => {
                info!(count = entries.len(), "fetched list");
                FetchOutcome::Entries(entries)
            }
            Ok(None) => {
                info!("storage not initialized");
                FetchOutcome::Missing
            }
            Err(e) => {
                warn!(error = %e, "fetching list failed");
                FetchOutcome::Failed(e.to_string())
            }
        };

        if self.update(|s| s.finish_fetch(ticket, outcome)) {
            self.publish();
        } else {
            debug!("superseded fetch result dropped");
        }
    }

    pub async fn submit(&self) {
        let ticket = match self.update(|s| s.begin_submit()) {
            Ok(ticket) => ticket,
            Err(Refusal::EmptyInput) => {
                info!("no link given");
                return;
            }
            Err(refusal) => {
                debug!(?refusal, "submit refused");
                return;
            }
        };
        self.publish();
        info!(link = %ticket.payload, "submitting link");

        let session = self.factory.open(&ticket.identity);
        let succeeded = match session.append_entry(&ticket.payload).await {
            Ok(signature) => {
                info!(%signature, "link stored");
                true
            }
            Err(e) => {
                warn!(error = %e, "submitting link failed");
                false
            }
        };

        let effect = self.update(|s| s.finish_submit(succeeded));
        self.publish();
        self.run(effect).await;
    }

    pub async fn initialize(&self) {
        let ticket = match self.update(|s| s.begin_initialize()) {
            Ok(ticket) => ticket,
            Err(refusal) => {
                debug!(?refusal, "initialize refused");
                return;
            }
        };
        self.publish();

        let session = self.factory.open(&ticket.identity);
        let succeeded = match session.initialize_storage().await {
            Ok(signature) => {
                info!(%signature, "storage account created");
                true
            }
            Err(e) => {
                warn!(error = %e, "creating storage account failed");
                false
            }
        };

        let effect = self.update(|s| s.finish_initialize(succeeded));
        self.publish();
        self.run(effect).await;
    }
}
