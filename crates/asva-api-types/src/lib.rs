use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StakeAction {
    Stake,
    Unstake,
}

impl StakeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            StakeAction::Stake => "stake",
            StakeAction::Unstake => "unstake",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Submitted,
    Confirmed,
    Failed,
}

/// Result of a single mutating call. Produced per command, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionOutcome {
    pub action: StakeAction,
    pub kind: OutcomeKind,
    pub tx_hash: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Human-readable message for the user, one per command result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Everything a presentation layer needs to render the session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SessionView {
    pub status: SessionStatus,
    pub account: Option<String>,
    pub short_account: Option<String>,
    pub display_token: String,
    pub display_staked: String,
    pub busy: bool,
}

impl SessionView {
    pub fn is_connected(&self) -> bool {
        self.status == SessionStatus::Connected
    }
}

/// `0xABCD...1234`: first six and last four characters of an address.
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_owned();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StakingConfig {
    pub token_address: String,
    pub staking_address: String,
    #[serde(default)]
    pub rpc_url: Option<String>,
    #[serde(default = "default_confirmation_timeout_secs")]
    pub confirmation_timeout_secs: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

pub fn default_confirmation_timeout_secs() -> u64 {
    120
}

pub fn default_poll_interval_ms() -> u64 {
    1_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortens_long_addresses() {
        assert_eq!(
            short_address("0xABCD00000000000000000000000000000000001234"),
            "0xABCD...1234"
        );
        assert_eq!(short_address("0x1234"), "0x1234");
    }

    #[test]
    fn config_defaults_apply() {
        let config: StakingConfig = serde_json::from_str(
            r#"{
                "token_address": "0x0000000000000000000000000000000000000001",
                "staking_address": "0x0000000000000000000000000000000000000002"
            }"#,
        )
        .expect("config should parse");

        assert_eq!(config.confirmation_timeout_secs, 120);
        assert_eq!(config.poll_interval_ms, 1_000);
        assert!(config.rpc_url.is_none());
    }
}
