//! DOM element bindings.
//!
//! The page shell is static; everything under `portal_body` is rebuilt by
//! [`crate::render`]. Fields are resolved once at startup.

use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlAnchorElement, HtmlElement, HtmlInputElement};

// ── Helpers ──

pub fn doc() -> Document {
    gloo_utils::document()
}

pub fn by_id(id: &str) -> Option<Element> {
    doc().get_element_by_id(id)
}

pub fn by_id_typed<T: JsCast>(id: &str) -> Option<T> {
    by_id(id).and_then(|e| e.dyn_into::<T>().ok())
}

pub fn query_within<T: JsCast>(parent: &Element, selector: &str) -> Option<T> {
    parent
        .query_selector(selector)
        .ok()
        .flatten()
        .and_then(|e| e.dyn_into::<T>().ok())
}

pub fn create_element(tag: &str) -> Result<Element, JsValue> {
    doc().create_element(tag)
}

/// Creates `<tag class="...">` with plain text content.
pub fn create_text(tag: &str, class: &str, text: &str) -> Result<Element, JsValue> {
    let el = create_element(tag)?;
    el.set_class_name(class);
    el.set_text_content(Some(text));
    Ok(el)
}

pub fn create_button(class: &str, action: &str, label: &str) -> Result<Element, JsValue> {
    let button = create_text("button", class, label)?;
    button.set_attribute("type", "button")?;
    button.set_attribute("data-action", action)?;
    Ok(button)
}

pub fn set_text(el: &Element, text: &str) {
    el.set_text_content(Some(text));
}

pub fn clear(el: &Element) {
    el.set_text_content(None);
}

pub fn toggle_class(el: &Element, cls: &str, force: bool) {
    let _ = el.class_list().toggle_with_force(cls, force);
}

pub fn set_disabled(el: &Element, disabled: bool) {
    let _ = el.toggle_attribute_with_force("disabled", disabled);
}

/// The `data-action` of the nearest tagged ancestor of an event target.
pub fn action_of(target: Option<web_sys::EventTarget>) -> Option<String> {
    let el: Element = target?.dyn_into().ok()?;
    el.closest("[data-action]").ok()??.get_attribute("data-action")
}

// ── Elements struct ──

/// Static page elements. Clone-friendly; the handles are JS references.
#[derive(Clone)]
pub struct Elements {
    pub shell: Element,
    pub title: Element,
    pub portal_body: HtmlElement,
    pub footer_link: HtmlAnchorElement,
}

macro_rules! get_el {
    ($id:expr) => {
        by_id($id).ok_or_else(|| JsValue::from_str(&format!("missing element #{}", $id)))?
    };
}

macro_rules! get_typed {
    ($ty:ty, $id:expr) => {
        by_id_typed::<$ty>($id)
            .ok_or_else(|| JsValue::from_str(&format!("missing element #{}", $id)))?
    };
}

impl Elements {
    pub fn bind() -> Result<Self, JsValue> {
        Ok(Self {
            shell: get_el!("shell"),
            title: get_el!("title"),
            portal_body: get_typed!(HtmlElement, "portalBody"),
            footer_link: get_typed!(HtmlAnchorElement, "footerLink"),
        })
    }

    /// The link input, present only while the board is shown.
    pub fn link_input(&self) -> Option<HtmlInputElement> {
        query_within(&self.portal_body, "#linkInput")
    }
}
