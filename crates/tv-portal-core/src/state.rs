//! Portal state and its transitions.
//!
//! Transitions are synchronous and side-effect free. Anything that needs
//! the network comes back as an [`Effect`] or a ticket for the driver in
//! [`crate::portal`] to carry out.

use tv_api_types::{Address, Entry};

use crate::view::{View, select_view};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connected(Address),
}

impl ConnectionStatus {
    pub fn address(&self) -> Option<&Address> {
        match self {
            ConnectionStatus::Disconnected => None,
            ConnectionStatus::Connected(address) => Some(address),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListState {
    /// Connected, first fetch still outstanding.
    #[default]
    Loading,
    /// The storage account has not been created.
    Uninitialized,
    Entries(Vec<Entry>),
    /// The fetch failed for a reason other than a missing account.
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    FetchList,
}

/// Why a requested operation was not started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    NotConnected,
    EmptyInput,
    /// Another write is still in flight.
    Busy,
    AlreadyInitialized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    identity: Address,
}

impl FetchTicket {
    pub fn identity(&self) -> &Address {
        &self.identity
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Entries(Vec<Entry>),
    Missing,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteTicket {
    pub identity: Address,
    pub payload: String,
}

#[derive(Debug, Clone, Default)]
pub struct PortalState {
    connection: ConnectionStatus,
    input: String,
    list: ListState,
    write_in_flight: bool,
    fetch_seq: u64,
}

impl PortalState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection(&self) -> &ConnectionStatus {
        &self.connection
    }

    pub fn list(&self) -> &ListState {
        &self.list
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_writing(&self) -> bool {
        self.write_in_flight
    }

    pub fn view(&self) -> View<'_> {
        select_view(&self.connection, &self.list)
    }

    /// Records a wallet connection. Only a change of identity schedules a fetch.
    pub fn connect(&mut self, address: Address) -> Option<Effect> {
        if self.connection.address() == Some(&address) {
            return None;
        }
        self.connection = ConnectionStatus::Connected(address);
        self.list = ListState::Loading;
        Some(Effect::FetchList)
    }

    pub fn set_input(&mut self, text: &str) {
        text.clone_into(&mut self.input);
    }

    pub fn begin_fetch(&mut self) -> Result<FetchTicket, Refusal> {
        let identity = *self.connection.address().ok_or(Refusal::NotConnected)?;
        self.fetch_seq += 1;
        Ok(FetchTicket {
            seq: self.fetch_seq,
            identity,
        })
    }

    /// Replaces the list wholesale. Returns `false` if a newer fetch was
    /// issued since `ticket`, in which case nothing changes.
    pub fn finish_fetch(&mut self, ticket: FetchTicket, outcome: FetchOutcome) -> bool {
        if ticket.seq != self.fetch_seq || self.connection.address() != Some(&ticket.identity) {
            return false;
        }
        self.list = match outcome {
            FetchOutcome::Entries(entries) => ListState::Entries(entries),
            FetchOutcome::Missing => ListState::Uninitialized,
            FetchOutcome::Failed(reason) => ListState::Unavailable(reason),
        };
        true
    }

    pub fn begin_submit(&mut self) -> Result<WriteTicket, Refusal> {
        let identity = *self.connection.address().ok_or(Refusal::NotConnected)?;
        if self.input.is_empty() {
            return Err(Refusal::EmptyInput);
        }
        if self.write_in_flight {
            return Err(Refusal::Busy);
        }
        self.write_in_flight = true;
        Ok(WriteTicket {
            identity,
            payload: self.input.clone(),
        })
    }

    /// On success the input is cleared before the follow-up fetch runs.
    pub fn finish_submit(&mut self, succeeded: bool) -> Option<Effect> {
        self.write_in_flight = false;
        if !succeeded {
            return None;
        }
        self.input.clear();
        Some(Effect::FetchList)
    }

    pub fn begin_initialize(&mut self) -> Result<WriteTicket, Refusal> {
        let identity = *self.connection.address().ok_or(Refusal::NotConnected)?;
        if self.list != ListState::Uninitialized {
            return Err(Refusal::AlreadyInitialized);
        }
        if self.write_in_flight {
            return Err(Refusal::Busy);
        }
        self.write_in_flight = true;
        Ok(WriteTicket {
            identity,
            payload: String::new(),
        })
    }

    pub fn finish_initialize(&mut self, succeeded: bool) -> Option<Effect> {
        self.write_in_flight = false;
        succeeded.then_some(Effect::FetchList)
    }
}
