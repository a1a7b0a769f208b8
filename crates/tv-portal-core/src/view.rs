use tv_api_types::Entry;

use crate::state::{ConnectionStatus, ListState};

/// What the page should show. Depends only on connection and list state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View<'a> {
    ConnectPrompt,
    Loading,
    Initialize,
    Unavailable { reason: &'a str },
    Board { entries: &'a [Entry] },
}

impl View<'_> {
    /// Stable tag for deciding whether the page skeleton must be rebuilt.
    pub fn kind(&self) -> &'static str {
        match self {
            View::ConnectPrompt => "connect",
            View::Loading => "loading",
            View::Initialize => "initialize",
            View::Unavailable { .. } => "unavailable",
            View::Board { .. } => "board",
        }
    }
}

pub fn select_view<'a>(connection: &'a ConnectionStatus, list: &'a ListState) -> View<'a> {
    match (connection, list) {
        (ConnectionStatus::Disconnected, _) => View::ConnectPrompt,
        (ConnectionStatus::Connected(_), ListState::Loading) => View::Loading,
        (ConnectionStatus::Connected(_), ListState::Uninitialized) => View::Initialize,
        (ConnectionStatus::Connected(_), ListState::Unavailable(reason)) => {
            View::Unavailable {
                reason: reason.as_str(),
            }
        }
        (ConnectionStatus::Connected(_), ListState::Entries(entries)) => View::Board {
            entries: entries.as_slice(),
        },
    }
}
