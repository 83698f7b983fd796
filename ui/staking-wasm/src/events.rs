//! Event binding.
//!
//! Wires the four buttons to their async actions. Handlers run via
//! `wasm_bindgen_futures::spawn_local`; the controller rejects overlapping
//! commands itself.

use crate::actions;
use crate::dom::Elements;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// Helper: attach async click handler to an element.
macro_rules! on_click_async {
    ($el:expr, $els:expr, $handler:expr) => {{
        let els = $els.clone();
        let cb = Closure::wrap(Box::new(move |_: web_sys::MouseEvent| {
            let els2 = els.clone();
            wasm_bindgen_futures::spawn_local(async move {
                $handler(&els2).await;
            });
        }) as Box<dyn FnMut(_)>);
        if $el
            .add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())
            .is_err()
        {
            gloo_console::error!("failed to bind click handler");
        }
        cb.forget();
    }};
}

/// Bind all UI event listeners. Call once after init.
pub fn bind_events(els: &Elements) {
    // ── Session ──
    on_click_async!(els.connect_btn, els, actions::on_connect);
    on_click_async!(els.disconnect_btn, els, actions::on_disconnect);

    // ── Staking ──
    on_click_async!(els.stake_btn, els, actions::on_stake);
    on_click_async!(els.unstake_btn, els, actions::on_unstake);
}
