//! Event binding.
//!
//! Buttons are recreated on every view change, so clicks are delegated from
//! `#portalBody` and dispatched on the `data-action` attribute. Async work is
//! spawned via `wasm_bindgen_futures::spawn_local`.

use std::rc::Rc;
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{AddEventListenerOptions, HtmlInputElement};

use crate::AppPortal;
use crate::dom::{self, Elements};
use crate::state;

/// Helper: spawn an async portal operation.
macro_rules! spawn_portal {
    ($portal:expr, $op:ident) => {{
        let portal = $portal;
        spawn_local(async move {
            portal.$op().await;
        });
    }};
}

fn dispatch(action: &str) {
    let Some(portal) = state::portal() else {
        warn!(action, "event before portal was installed");
        return;
    };
    debug!(action, "ui action");
    match action {
        "connect" => spawn_portal!(portal, connect),
        "submit" => spawn_portal!(portal, submit),
        "initialize" => spawn_portal!(portal, initialize),
        "retry" => spawn_portal!(portal, refresh),
        other => warn!(action = other, "unknown action"),
    }
}

/// Bind the delegated listeners. Call once after init.
pub fn bind_events(els: &Elements) -> Result<(), JsValue> {
    // ── Clicks ──
    let cb = Closure::wrap(Box::new(move |ev: web_sys::MouseEvent| {
        if let Some(action) = dom::action_of(ev.target()) {
            ev.prevent_default();
            dispatch(&action);
        }
    }) as Box<dyn FnMut(_)>);
    els.portal_body
        .add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())?;
    cb.forget();

    // ── Link input ──
    let cb = Closure::wrap(Box::new(move |ev: web_sys::Event| {
        let Some(input) = ev
            .target()
            .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
        else {
            return;
        };
        if input.id() != "linkInput" {
            return;
        }
        if let Some(portal) = state::portal() {
            portal.set_input(&input.value());
        }
    }) as Box<dyn FnMut(_)>);
    els.portal_body
        .add_event_listener_with_callback("input", cb.as_ref().unchecked_ref())?;
    cb.forget();

    Ok(())
}

/// Runs the silent connect once the page has finished loading.
pub fn on_page_load(portal: Rc<AppPortal>) -> Result<(), JsValue> {
    if dom::doc().ready_state() == "complete" {
        spawn_portal!(portal, silent_connect);
        return Ok(());
    }

    let cb = Closure::once(move |_: web_sys::Event| {
        spawn_portal!(portal, silent_connect);
    });
    let options = AddEventListenerOptions::new();
    options.set_once(true);
    gloo_utils::window().add_event_listener_with_callback_and_add_event_listener_options(
        "load",
        cb.as_ref().unchecked_ref(),
        &options,
    )?;
    cb.forget();
    Ok(())
}
