use alloy_primitives::hex;
use alloy_sol_types::{Panic, Revert, SolError};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("no wallet provider available")]
    ProviderUnavailable,
    #[error("request rejected by the user")]
    UserRejected,
    #[error("execution reverted{}", .reason.as_deref().map(|r| format!(": {r}")).unwrap_or_default())]
    Reverted { reason: Option<String> },
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("no confirmation within {0:?}")]
    Timeout(Duration),
}

impl ChainError {
    pub fn revert_reason(&self) -> Option<&str> {
        match self {
            ChainError::Reverted { reason } => reason.as_deref(),
            _ => None,
        }
    }

    /// Reason to show the user: the contract's revert reason when present,
    /// the error's own message otherwise.
    pub fn user_reason(&self) -> String {
        self.revert_reason()
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| self.to_string())
    }
}

/// Best-effort decoding of revert data for display.
pub fn decode_revert(data: &[u8]) -> Option<String> {
    if data.is_empty() {
        return None;
    }

    // Solidity `Error(string)`
    if let Ok(revert) = Revert::abi_decode(data, false) {
        return Some(revert.reason);
    }

    // Solidity `Panic(uint256)`
    if let Ok(panic) = Panic::abi_decode(data, false) {
        return Some(format!("panic code {:#x}", panic.code));
    }

    if let Ok(text) = std::str::from_utf8(data) {
        if !text.trim().is_empty() && text.chars().all(|c| !c.is_control()) {
            return Some(text.to_owned());
        }
    }

    Some(format!("custom error {}", hex::encode_prefixed(data)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_error_string() {
        let data = Revert {
            reason: "insufficient balance".to_owned(),
        }
        .abi_encode();
        assert_eq!(decode_revert(&data).as_deref(), Some("insufficient balance"));
    }

    #[test]
    fn unknown_selector_is_reported_as_custom_error() {
        let decoded = decode_revert(&[0xde, 0xad, 0xbe, 0xef]).expect("non-empty data");
        assert_eq!(decoded, "custom error 0xdeadbeef");
    }

    #[test]
    fn empty_revert_data_has_no_reason() {
        assert_eq!(decode_revert(&[]), None);
    }

    #[test]
    fn user_reason_prefers_revert_reason() {
        let reverted = ChainError::Reverted {
            reason: Some("insufficient balance".to_owned()),
        };
        assert_eq!(reverted.user_reason(), "insufficient balance");
        assert_eq!(reverted.to_string(), "execution reverted: insufficient balance");

        let bare = ChainError::Reverted { reason: None };
        assert_eq!(bare.user_reason(), "execution reverted");

        let rpc = ChainError::Rpc {
            code: -32000,
            message: "nonce too low".to_owned(),
        };
        assert_eq!(rpc.user_reason(), "rpc error -32000: nonce too low");
    }
}
