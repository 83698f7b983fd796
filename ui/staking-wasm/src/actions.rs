//! Button actions.
//!
//! Failures are already reported to the user through the controller's
//! notices, so results are only inspected for follow-up UI work.

use asva_api_types::SessionStatus;

use crate::dom::{self, Elements};
use crate::state;

pub async fn on_connect(_els: &Elements) {
    let Some(controller) = state::controller() else {
        return;
    };
    if controller.connect().await.is_ok() && controller.status() == SessionStatus::Connected {
        state::set_auto_connect(true);
    }
}

pub async fn on_disconnect(_els: &Elements) {
    let Some(controller) = state::controller() else {
        return;
    };
    if controller.disconnect().is_ok() {
        state::set_auto_connect(false);
    }
}

pub async fn on_stake(els: &Elements) {
    let Some(controller) = state::controller() else {
        return;
    };
    let amount = dom::get_input_value(&els.amount_input);
    if controller.stake(&amount).await.is_ok() {
        dom::set_input_value(&els.amount_input, "");
    }
}

pub async fn on_unstake(els: &Elements) {
    let Some(controller) = state::controller() else {
        return;
    };
    let amount = dom::get_input_value(&els.amount_input);
    if controller.unstake(&amount).await.is_ok() {
        dom::set_input_value(&els.amount_input, "");
    }
}
