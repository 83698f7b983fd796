use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use std::rc::Rc;
use std::time::Duration;

mod error;

pub use error::{ChainError, decode_revert};

pub mod contracts {
    use alloy_sol_types::sol;

    sol! {
        interface IERC20 {
            function balanceOf(address owner) external view returns (uint256);
        }

        interface IStaking {
            function getStakedBalance(address account) external view returns (uint256);
            function stake(uint256 amount) external;
            function unstake(uint256 amount) external;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub tx_hash: B256,
    pub block_number: Option<u64>,
}

/// A submitted state-changing call whose effect is not yet authoritative.
#[async_trait(?Send)]
pub trait PendingTransaction {
    fn tx_hash(&self) -> B256;

    /// Resolves once the ledger has finalized the call, or fails with
    /// [`ChainError::Timeout`] when `timeout` elapses first.
    async fn wait(&self, timeout: Duration) -> Result<Confirmation, ChainError>;
}

#[async_trait(?Send)]
pub trait TokenBinding {
    fn address(&self) -> Address;
    async fn balance_of(&self, owner: Address) -> Result<U256, ChainError>;
}

#[async_trait(?Send)]
pub trait StakingBinding {
    fn address(&self) -> Address;
    async fn staked_balance_of(&self, owner: Address) -> Result<U256, ChainError>;
    async fn stake(&self, amount: U256) -> Result<Box<dyn PendingTransaction>, ChainError>;
    async fn unstake(&self, amount: U256) -> Result<Box<dyn PendingTransaction>, ChainError>;
}

/// Capability to authorize transactions for one account. Contract bindings
/// created from it submit writes on behalf of that account.
pub trait SigningHandle {
    fn address(&self) -> Address;
    fn bind_token(&self, contract: Address) -> Rc<dyn TokenBinding>;
    fn bind_staking(&self, contract: Address) -> Rc<dyn StakingBinding>;
}

#[derive(Clone)]
pub struct Account {
    pub address: Address,
    pub signer: Rc<dyn SigningHandle>,
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[async_trait(?Send)]
pub trait ChainAccessor {
    /// Suspends until the wallet's approval prompt is accepted or declined.
    async fn request_account(&self) -> Result<Account, ChainError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractAddresses {
    pub token: Address,
    pub staking: Address,
}
