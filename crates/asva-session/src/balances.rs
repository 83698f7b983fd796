use alloy_primitives::{Address, U256};
use asva_chain_client::{ChainError, StakingBinding, TokenBinding};

use crate::units::format_amount;

/// Token and staked balances of one account, always derived from a pair of
/// chain reads taken together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceSnapshot {
    pub raw_token: U256,
    pub raw_staked: U256,
    pub display_token: String,
    pub display_staked: String,
}

impl BalanceSnapshot {
    pub fn from_raw(raw_token: U256, raw_staked: U256) -> Self {
        Self {
            raw_token,
            raw_staked,
            display_token: format_amount(raw_token),
            display_staked: format_amount(raw_staked),
        }
    }
}

impl Default for BalanceSnapshot {
    fn default() -> Self {
        Self::from_raw(U256::ZERO, U256::ZERO)
    }
}

/// Reads both balances for `account`. Either read failing fails the whole
/// operation; no partial snapshot is ever built.
pub async fn read_balances(
    account: Address,
    token: &dyn TokenBinding,
    staking: &dyn StakingBinding,
) -> Result<BalanceSnapshot, ChainError> {
    let (raw_token, raw_staked) = futures::try_join!(
        token.balance_of(account),
        staking.staked_balance_of(account)
    )?;
    Ok(BalanceSnapshot::from_raw(raw_token, raw_staked))
}
