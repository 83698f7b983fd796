//! Wallet staking session: connects a wallet, binds the token and staking
//! contracts to its signer, and runs stake/unstake commands against them.

pub mod balances;
pub mod config;
pub mod controller;
mod error;
pub mod units;

pub use balances::{BalanceSnapshot, read_balances};
pub use config::{ConfigError, SessionConfig};
pub use controller::{SessionController, SessionEvent};
pub use error::StakingError;
pub use units::{AmountError, canonicalize, format_amount, parse_amount};
