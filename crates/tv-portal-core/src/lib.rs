//! Presentation core for the link portal: state, view selection, and the
//! async driver that talks to the wallet and the remote list.

pub mod portal;
pub mod state;
pub mod view;

pub use portal::{Notice, Portal, PortalObserver};
pub use state::{ConnectionStatus, Effect, FetchOutcome, ListState, PortalState, Refusal};
pub use view::{View, select_view};
