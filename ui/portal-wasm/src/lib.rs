//! Tronverse browser frontend.
//!
//! Wires the portal driver to the injected Phantom wallet, the Solana RPC
//! endpoint, and the page DOM. Each concern lives in its own module.

pub mod config;
pub mod dom;
pub mod events;
pub mod logging;
pub mod phantom;
pub mod render;
pub mod state;

use std::rc::Rc;
use tracing::info;
use tv_chain_solana::SolanaConnector;
use tv_portal_core::Portal;
use wasm_bindgen::prelude::*;

use phantom::{BrowserTimer, PhantomGateway};
use render::DomObserver;

/// The concrete driver the page runs.
pub type AppPortal =
    Portal<PhantomGateway, SolanaConnector<PhantomGateway, BrowserTimer>, DomObserver>;

/// WASM entry point, called when the module is instantiated.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    logging::init(tracing::Level::DEBUG);

    init()
}

fn init() -> Result<(), JsValue> {
    let config = config::PortalConfig::bundled()
        .map_err(|e| JsValue::from_str(&format!("config: {e:#}")))?;
    let els = dom::Elements::bind()?;
    render::apply_branding(&els, &config.branding);

    let bundle = Rc::new(config.bundle);
    info!(
        cluster = bundle.cluster().name(),
        rpc = bundle.rpc_url(),
        program = %bundle.program_id(),
        storage = %bundle.storage_account(),
        "portal configured"
    );

    let connector = SolanaConnector::new(bundle, Rc::new(PhantomGateway), Rc::new(BrowserTimer));
    let observer = DomObserver::new(els.clone(), config.branding);
    let portal = Rc::new(Portal::new(PhantomGateway, connector, observer));
    state::install(Rc::clone(&portal));

    portal.render();
    events::bind_events(&els)?;
    events::on_page_load(portal)?;
    Ok(())
}
