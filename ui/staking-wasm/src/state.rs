//! Global application state.
//!
//! Uses `RefCell`-wrapped `thread_local!` storage (WASM is single-threaded).
//! The controller itself owns the session; this only keeps it reachable
//! from event handlers.

use asva_chain_eip1193::Eip1193Accessor;
use asva_session::SessionController;
use gloo_storage::{LocalStorage, Storage};
use std::cell::RefCell;
use std::rc::Rc;

use crate::provider::BrowserProvider;

pub type Controller = SessionController<Eip1193Accessor<BrowserProvider>>;

const AUTO_CONNECT_KEY: &str = "asva_auto_connect";

thread_local! {
    static CONTROLLER: RefCell<Option<Rc<Controller>>> = const { RefCell::new(None) };
}

pub fn install(controller: Rc<Controller>) {
    CONTROLLER.with(|c| *c.borrow_mut() = Some(controller));
}

pub fn controller() -> Option<Rc<Controller>> {
    CONTROLLER.with(|c| c.borrow().clone())
}

// ── localStorage helpers ──

pub fn auto_connect() -> bool {
    LocalStorage::get::<bool>(AUTO_CONNECT_KEY).unwrap_or(false)
}

pub fn set_auto_connect(enabled: bool) {
    if enabled {
        let _ = LocalStorage::set(AUTO_CONNECT_KEY, true);
    } else {
        LocalStorage::delete(AUTO_CONNECT_KEY);
    }
}
