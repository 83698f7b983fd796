use asva_api_types::StakeAction;
use asva_chain_client::ChainError;
use std::time::Duration;
use thiserror::Error;

use crate::units::AmountError;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StakingError {
    #[error("no wallet found; please install MetaMask")]
    WalletUnavailable,
    #[error("wallet access was denied")]
    AccessDenied,
    #[error("invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),
    #[error("{} failed: {}", action_label(.action), .reason.as_deref().unwrap_or("unknown error"))]
    TransactionFailed {
        action: StakeAction,
        reason: Option<String>,
    },
    #[error("{} was not confirmed within {}s", action_label(.action), .timeout.as_secs())]
    Timeout {
        action: StakeAction,
        timeout: Duration,
    },
    #[error("could not read balances: {0}")]
    ChainReadError(ChainError),
    #[error("connect wallet first")]
    NotConnected,
    #[error("another command is still in progress")]
    Busy,
}

fn action_label(action: &StakeAction) -> &'static str {
    match action {
        StakeAction::Stake => "Stake",
        StakeAction::Unstake => "Unstake",
    }
}

impl StakingError {
    /// Translates an `eth_requestAccounts` failure. A declined prompt is the
    /// only failure the user caused; everything else means no usable wallet.
    pub(crate) fn from_connect(err: ChainError) -> Self {
        match err {
            ChainError::UserRejected => StakingError::AccessDenied,
            _ => StakingError::WalletUnavailable,
        }
    }

    /// Translates a submission or confirmation failure.
    pub(crate) fn from_transaction(action: StakeAction, err: ChainError) -> Self {
        match err {
            ChainError::Timeout(timeout) => StakingError::Timeout { action, timeout },
            other => StakingError::TransactionFailed {
                action,
                reason: Some(other.user_reason()),
            },
        }
    }
}

pub(crate) fn success_message(action: StakeAction) -> &'static str {
    match action {
        StakeAction::Stake => "Staked successfully!",
        StakeAction::Unstake => "Unstaked successfully!",
    }
}
