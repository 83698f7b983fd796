//! Session rendering.

use asva_api_types::{NoticeLevel, OutcomeKind, SessionStatus, SessionView, TransactionOutcome};
use asva_session::SessionEvent;

use crate::dom::{self, Elements};

pub fn on_event(els: &Elements, event: &SessionEvent) {
    match event {
        SessionEvent::Changed(view) => render_view(els, view),
        SessionEvent::Transaction(outcome) => show_status(els, &outcome_line(outcome)),
        SessionEvent::Notice(notice) => {
            show_status(els, &notice.message);
            if notice.level == NoticeLevel::Error {
                gloo_console::error!(notice.message.clone());
            }
            alert(&notice.message);
        }
    }
}

pub fn render_view(els: &Elements, view: &SessionView) {
    match view.status {
        SessionStatus::Connected => {
            dom::hide(&els.connect_btn);
            dom::show(&els.disconnect_btn);
            dom::show(&els.connected_panel);
        }
        SessionStatus::Connecting | SessionStatus::Disconnected => {
            dom::show(&els.connect_btn);
            dom::hide(&els.disconnect_btn);
            dom::hide(&els.connected_panel);
        }
    }

    let connect_label = match view.status {
        SessionStatus::Connecting => "Connecting…",
        _ => "Connect Wallet",
    };
    dom::set_text(&els.connect_btn, connect_label);

    dom::set_text(
        &els.account_label,
        view.short_account.as_deref().unwrap_or_default(),
    );
    dom::set_text(&els.balance_label, &format!("Balance: {}", view.display_token));
    dom::set_text(&els.staked_label, &format!("Staked: {}", view.display_staked));

    let locked = view.busy || view.status == SessionStatus::Connecting;
    els.connect_btn.set_disabled(locked);
    els.disconnect_btn.set_disabled(locked);
    els.stake_btn.set_disabled(locked);
    els.unstake_btn.set_disabled(locked);
    els.amount_input.set_disabled(locked);
}

pub fn show_status(els: &Elements, text: &str) {
    dom::set_text(&els.status_line, text);
}

fn outcome_line(outcome: &TransactionOutcome) -> String {
    let action = outcome.action.as_str();
    match (&outcome.kind, &outcome.tx_hash, &outcome.reason) {
        (OutcomeKind::Submitted, Some(hash), _) => format!("{action} submitted: {hash}"),
        (OutcomeKind::Confirmed, Some(hash), _) => format!("{action} confirmed: {hash}"),
        (OutcomeKind::Failed, _, Some(reason)) => format!("{action} failed: {reason}"),
        (kind, _, _) => format!("{action}: {kind:?}"),
    }
}

fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}
