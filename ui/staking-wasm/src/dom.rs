//! DOM element bindings.
//!
//! All fields are resolved once at startup. To add new UI elements, add a
//! field here and bind it in `Elements::bind()`.

use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlButtonElement, HtmlElement, HtmlInputElement};

// ── Helpers ──

fn doc() -> Option<Document> {
    web_sys::window()?.document()
}

pub fn by_id(id: &str) -> Option<Element> {
    doc()?.get_element_by_id(id)
}

pub fn by_id_typed<T: JsCast>(id: &str) -> Option<T> {
    by_id(id).and_then(|e| e.dyn_into::<T>().ok())
}

pub fn set_text(el: &Element, text: &str) {
    el.set_text_content(Some(text));
}

pub fn set_input_value(el: &HtmlInputElement, val: &str) {
    el.set_value(val);
}

pub fn get_input_value(el: &HtmlInputElement) -> String {
    el.value().trim().to_string()
}

pub fn show(el: &HtmlElement) {
    let _ = el.style().set_property("display", "");
}

pub fn hide(el: &HtmlElement) {
    let _ = el.style().set_property("display", "none");
}

// ── Element references ──

#[derive(Clone)]
pub struct Elements {
    pub connect_btn: HtmlButtonElement,
    pub disconnect_btn: HtmlButtonElement,

    pub connected_panel: HtmlElement,
    pub account_label: Element,
    pub balance_label: Element,
    pub staked_label: Element,

    pub amount_input: HtmlInputElement,
    pub stake_btn: HtmlButtonElement,
    pub unstake_btn: HtmlButtonElement,

    pub status_line: Element,
}

macro_rules! get_el {
    ($id:expr) => {
        by_id($id).ok_or_else(|| JsValue::from_str(&format!("missing element #{}", $id)))?
    };
}

macro_rules! get_typed {
    ($ty:ty, $id:expr) => {
        by_id_typed::<$ty>($id).ok_or_else(|| {
            JsValue::from_str(&format!("missing {} #{}", stringify!($ty), $id))
        })?
    };
}

impl Elements {
    /// Resolve all DOM references. Call once after DOMContentLoaded.
    pub fn bind() -> Result<Elements, JsValue> {
        Ok(Elements {
            connect_btn: get_typed!(HtmlButtonElement, "connectBtn"),
            disconnect_btn: get_typed!(HtmlButtonElement, "disconnectBtn"),

            connected_panel: get_typed!(HtmlElement, "connectedPanel"),
            account_label: get_el!("accountLabel"),
            balance_label: get_el!("balanceLabel"),
            staked_label: get_el!("stakedLabel"),

            amount_input: get_typed!(HtmlInputElement, "amountInput"),
            stake_btn: get_typed!(HtmlButtonElement, "stakeBtn"),
            unstake_btn: get_typed!(HtmlButtonElement, "unstakeBtn"),

            status_line: get_el!("statusLine"),
        })
    }
}
