//! The page's single portal instance.
//!
//! `thread_local!` storage; WASM is single-threaded.

use std::cell::RefCell;
use std::rc::Rc;

use crate::AppPortal;

thread_local! {
    static PORTAL: RefCell<Option<Rc<AppPortal>>> = const { RefCell::new(None) };
}

/// Stores the portal. Called once from `init`.
pub fn install(portal: Rc<AppPortal>) {
    PORTAL.with(|p| *p.borrow_mut() = Some(portal));
}

pub fn portal() -> Option<Rc<AppPortal>> {
    PORTAL.with(|p| p.borrow().clone())
}
