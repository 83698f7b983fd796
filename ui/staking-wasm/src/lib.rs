//! Asva Staking dApp – WASM frontend
//!
//! Renders the staking session and forwards button clicks to the
//! `SessionController`. All chain access goes through the injected wallet.

pub mod actions;
pub mod config;
pub mod dom;
pub mod events;
pub mod provider;
pub mod render;
pub mod state;

use asva_chain_eip1193::Eip1193Accessor;
use asva_session::{SessionConfig, SessionController};
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::prelude::*;

/// WASM entry point – called automatically when the module is instantiated.
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    // Improve panic messages in the browser console
    console_error_panic_hook::set_once();

    init().await
}

async fn init() -> Result<(), JsValue> {
    let els = dom::Elements::bind()?;

    let staking_config = config::load().map_err(|e| JsValue::from_str(&e))?;
    let session_config = SessionConfig::try_from(&staking_config)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let accessor = Eip1193Accessor::new(provider::BrowserProvider)
        .with_poll_interval(Duration::from_millis(staking_config.poll_interval_ms));
    let controller = Rc::new(SessionController::new(accessor, session_config));

    {
        let els = els.clone();
        controller.subscribe(move |event| render::on_event(&els, event));
    }
    render::render_view(&els, &controller.view());
    state::install(controller);

    events::bind_events(&els);

    if !provider::is_available() {
        render::show_status(&els, "Please install MetaMask");
    } else if state::auto_connect() {
        // Wallets that already granted access answer without a prompt
        actions::on_connect(&els).await;
    }

    Ok(())
}
