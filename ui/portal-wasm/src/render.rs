//! Paints [`PortalState`] into the page.
//!
//! The skeleton under `#portalBody` is rebuilt only when the view kind
//! changes, so the link input keeps focus while the user types. Link text
//! and addresses always go through `textContent` or attributes.

use std::cell::Cell;
use tracing::warn;
use tv_api_types::Entry;
use tv_portal_core::{Notice, PortalObserver, PortalState, View};
use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlImageElement, HtmlInputElement};

use crate::config::Branding;
use crate::dom::{self, Elements};

pub const WALLET_MISSING_ALERT: &str = "Solana object not found! Get a Phantom Wallet 👻";

pub fn apply_branding(els: &Elements, branding: &Branding) {
    dom::set_text(&els.title, &branding.title);
    dom::doc().set_title(&branding.title);
    match (branding.footer_text(), branding.twitter_url()) {
        (Some(text), Some(url)) => {
            dom::set_text(&els.footer_link, &text);
            els.footer_link.set_href(&url);
        }
        _ => {
            dom::clear(&els.footer_link);
            let _ = els.footer_link.remove_attribute("href");
        }
    }
}

pub struct DomObserver {
    els: Elements,
    branding: Branding,
    shown: Cell<Option<&'static str>>,
}

impl DomObserver {
    pub fn new(els: Elements, branding: Branding) -> Self {
        Self {
            els,
            branding,
            shown: Cell::new(None),
        }
    }

    fn paint(&self, state: &PortalState) -> Result<(), JsValue> {
        let connected = state.connection().address().is_some();
        dom::toggle_class(&self.els.shell, "authed-container", connected);
        dom::toggle_class(&self.els.shell, "container", !connected);

        let view = state.view();
        if self.shown.get() != Some(view.kind()) {
            self.build(&view)?;
            self.shown.set(Some(view.kind()));
        }
        self.fill(&view, state)
    }

    /// Replaces the skeleton for a new view kind.
    fn build(&self, view: &View<'_>) -> Result<(), JsValue> {
        let body = &self.els.portal_body;
        dom::clear(body);
        match view {
            View::ConnectPrompt => {
                body.append_child(&*dom::create_button(
                    "cta-button connect-wallet-button",
                    "connect",
                    "Connect to Wallet",
                )?)?;
            }
            View::Loading => {
                body.append_child(&*dom::create_text("p", "sub-text", "Loading links…")?)?;
            }
            View::Initialize => {
                let container = dom::create_text("div", "connected-container", "")?;
                container.append_child(&*dom::create_button(
                    "cta-button submit-gif-button",
                    "initialize",
                    &format!("Do One-Time Initialization For {}", self.branding.title),
                )?)?;
                body.append_child(&container)?;
            }
            View::Unavailable { .. } => {
                let container = dom::create_text("div", "connected-container", "")?;
                container.append_child(&*dom::create_text("p", "sub-text error-text", "")?)?;
                container.append_child(&*dom::create_button(
                    "cta-button submit-gif-button",
                    "retry",
                    "Retry",
                )?)?;
                body.append_child(&container)?;
            }
            View::Board { .. } => {
                let container = dom::create_text("div", "connected-container", "")?;
                let input: HtmlInputElement = dom::create_element("input")?.dyn_into()?;
                input.set_id("linkInput");
                input.set_type("text");
                input.set_placeholder("Enter gif link!");
                container.append_child(&input)?;
                container.append_child(&*dom::create_button(
                    "cta-button submit-gif-button",
                    "submit",
                    "Submit",
                )?)?;
                let grid = dom::create_text("div", "gif-grid", "")?;
                grid.set_id("entryGrid");
                container.append_child(&grid)?;
                body.append_child(&container)?;
            }
        }
        Ok(())
    }

    /// Updates the parts of the current skeleton that depend on data.
    fn fill(&self, view: &View<'_>, state: &PortalState) -> Result<(), JsValue> {
        let body: &Element = &self.els.portal_body;
        let write_button = "[data-action=submit], [data-action=initialize]";
        if let Some(button) = dom::query_within::<Element>(body, write_button) {
            dom::set_disabled(&button, state.is_writing());
        }
        match view {
            View::Unavailable { reason } => {
                if let Some(text) = dom::query_within::<Element>(body, ".error-text") {
                    dom::set_text(&text, &format!("Could not load links: {reason}"));
                }
            }
            View::Board { entries } => {
                if let Some(input) = self.els.link_input() {
                    if input.value() != state.input() {
                        input.set_value(state.input());
                    }
                }
                if let Some(grid) = dom::query_within::<Element>(body, "#entryGrid") {
                    dom::clear(&grid);
                    for entry in entries.iter() {
                        grid.append_child(&*entry_item(entry)?)?;
                    }
                }
            }
            View::ConnectPrompt | View::Loading | View::Initialize => {}
        }
        Ok(())
    }
}

fn entry_item(entry: &Entry) -> Result<Element, JsValue> {
    let item = dom::create_text("div", "gif-item", "")?;
    let img: HtmlImageElement = dom::create_element("img")?.dyn_into()?;
    img.set_src(&entry.link);
    img.set_alt(&entry.link);
    item.append_child(&img)?;
    item.append_child(&*dom::create_text(
        "p",
        "meme-user-address",
        &format!("Added by: {}", entry.submitter),
    )?)?;
    Ok(item)
}

impl PortalObserver for DomObserver {
    fn state_changed(&self, state: &PortalState) {
        if let Err(e) = self.paint(state) {
            warn!(error = ?e, "render failed");
        }
    }

    fn notice(&self, notice: Notice) {
        match notice {
            Notice::WalletMissing => {
                if gloo_utils::window()
                    .alert_with_message(WALLET_MISSING_ALERT)
                    .is_err()
                {
                    warn!("could not show wallet alert");
                }
            }
        }
    }
}
