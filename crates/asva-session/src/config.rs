use alloy_primitives::Address;
use asva_api_types::StakingConfig;
use asva_chain_client::ContractAddresses;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} is not a valid address: {value}")]
    InvalidAddress { field: &'static str, value: String },
    #[error("confirmation timeout must be greater than zero")]
    ZeroTimeout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub contracts: ContractAddresses,
    pub confirmation_timeout: Duration,
}

impl SessionConfig {
    pub fn new(contracts: ContractAddresses) -> Self {
        Self {
            contracts,
            confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
        }
    }

    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self
    }
}

impl TryFrom<&StakingConfig> for SessionConfig {
    type Error = ConfigError;

    fn try_from(config: &StakingConfig) -> Result<Self, Self::Error> {
        if config.confirmation_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(Self {
            contracts: ContractAddresses {
                token: parse_address("token_address", &config.token_address)?,
                staking: parse_address("staking_address", &config.staking_address)?,
            },
            confirmation_timeout: Duration::from_secs(config.confirmation_timeout_secs),
        })
    }
}

fn parse_address(field: &'static str, value: &str) -> Result<Address, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidAddress {
            field,
            value: value.to_owned(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staking_config(token: &str) -> StakingConfig {
        StakingConfig {
            token_address: token.to_owned(),
            staking_address: "0x00000000000000000000000000000000000000b2".to_owned(),
            rpc_url: None,
            confirmation_timeout_secs: 30,
            poll_interval_ms: 500,
        }
    }

    #[test]
    fn builds_from_staking_config() {
        let config =
            SessionConfig::try_from(&staking_config("0x00000000000000000000000000000000000000a1"))
                .expect("valid config");
        assert_eq!(config.contracts.token, Address::with_last_byte(0xa1));
        assert_eq!(config.contracts.staking, Address::with_last_byte(0xb2));
        assert_eq!(config.confirmation_timeout, Duration::from_secs(30));
    }

    #[test]
    fn rejects_bad_address() {
        let err = SessionConfig::try_from(&staking_config("not-an-address")).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidAddress {
                field: "token_address",
                value: "not-an-address".to_owned(),
            }
        );
    }
}
