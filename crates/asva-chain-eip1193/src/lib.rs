use alloy_primitives::{Address, B256, Bytes, U256, hex};
use alloy_sol_types::SolCall;
use asva_chain_client::contracts::{IERC20, IStaking};
use asva_chain_client::{
    Account, ChainAccessor, ChainError, Confirmation, PendingTransaction, SigningHandle,
    StakingBinding, TokenBinding, decode_revert,
};
use async_trait::async_trait;
use futures::future::{self, Either};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::pin::pin;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[cfg(feature = "http")]
mod http;

#[cfg(feature = "http")]
pub use http::{DEFAULT_RPC_URL, HttpTransport};

#[cfg(test)]
mod tests;

/// EIP-1193 `userRejectedRequest`.
pub const USER_REJECTED_CODE: i64 = 4001;

/// Anything that can carry an EIP-1193 `request({ method, params })`:
/// an injected browser wallet or a JSON-RPC node.
#[async_trait(?Send)]
pub trait Eip1193Transport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ChainError>;

    /// Suspends the caller between receipt polls.
    async fn sleep(&self, duration: Duration);
}

/// Error object as reported by wallets and JSON-RPC nodes.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

pub fn rpc_error(err: RpcErrorObject) -> ChainError {
    if err.code == USER_REJECTED_CODE {
        return ChainError::UserRejected;
    }

    if let Some(data) = err.data.as_ref().and_then(revert_data) {
        return ChainError::Reverted {
            reason: decode_revert(&data),
        };
    }

    if let Some(rest) = err.message.strip_prefix("execution reverted") {
        let reason = rest.trim_start_matches(':').trim();
        return ChainError::Reverted {
            reason: (!reason.is_empty()).then(|| reason.to_owned()),
        };
    }

    ChainError::Rpc {
        code: err.code,
        message: err.message,
    }
}

// Wallets nest the revert bytes one level down (`data.data`) or report them directly.
fn revert_data(data: &Value) -> Option<Vec<u8>> {
    match data {
        Value::String(raw) => hex::decode(raw).ok().filter(|bytes| !bytes.is_empty()),
        Value::Object(map) => map.get("data").and_then(revert_data),
        _ => None,
    }
}

fn decode_error(method: &str) -> impl FnOnce(serde_json::Error) -> ChainError + '_ {
    move |err| ChainError::Decode(format!("{method}: {err}"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
        }
    }
}

pub struct Eip1193Accessor<T> {
    transport: Rc<T>,
    poll: PollConfig,
}

impl<T> Eip1193Accessor<T>
where
    T: Eip1193Transport + 'static,
{
    pub fn new(transport: T) -> Self {
        Self {
            transport: Rc::new(transport),
            poll: PollConfig::default(),
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll.interval = interval;
        self
    }
}

#[async_trait(?Send)]
impl<T> ChainAccessor for Eip1193Accessor<T>
where
    T: Eip1193Transport + 'static,
{
    async fn request_account(&self) -> Result<Account, ChainError> {
        let value = self
            .transport
            .request("eth_requestAccounts", json!([]))
            .await?;
        let accounts: Vec<Address> =
            serde_json::from_value(value).map_err(decode_error("eth_requestAccounts"))?;

        let Some(address) = accounts.first().copied() else {
            return Err(ChainError::UserRejected);
        };

        info!(%address, "wallet account granted");
        Ok(Account {
            address,
            signer: Rc::new(Eip1193Signer {
                transport: Rc::clone(&self.transport),
                from: address,
                poll: self.poll,
            }),
        })
    }
}

pub struct Eip1193Signer<T> {
    transport: Rc<T>,
    from: Address,
    poll: PollConfig,
}

impl<T> Eip1193Signer<T> {
    fn client(&self, contract: Address) -> ContractClient<T> {
        ContractClient {
            transport: Rc::clone(&self.transport),
            from: self.from,
            contract,
            poll: self.poll,
        }
    }
}

impl<T> SigningHandle for Eip1193Signer<T>
where
    T: Eip1193Transport + 'static,
{
    fn address(&self) -> Address {
        self.from
    }

    fn bind_token(&self, contract: Address) -> Rc<dyn TokenBinding> {
        Rc::new(Eip1193Token {
            client: self.client(contract),
        })
    }

    fn bind_staking(&self, contract: Address) -> Rc<dyn StakingBinding> {
        Rc::new(Eip1193Staking {
            client: self.client(contract),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
struct CallRequest {
    from: Address,
    to: Address,
    data: Bytes,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Receipt {
    transaction_hash: B256,
    #[serde(default)]
    block_number: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

fn parse_quantity(raw: &str) -> Result<u64, ChainError> {
    u64::from_str_radix(raw.trim_start_matches("0x"), 16)
        .map_err(|err| ChainError::Decode(format!("quantity {raw}: {err}")))
}

struct ContractClient<T> {
    transport: Rc<T>,
    from: Address,
    contract: Address,
    poll: PollConfig,
}

impl<T> Clone for ContractClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Rc::clone(&self.transport),
            from: self.from,
            contract: self.contract,
            poll: self.poll,
        }
    }
}

impl<T> ContractClient<T>
where
    T: Eip1193Transport + 'static,
{
    fn request_for(&self, data: Bytes) -> CallRequest {
        CallRequest {
            from: self.from,
            to: self.contract,
            data,
        }
    }

    async fn eth_call(&self, data: Bytes, block: Value) -> Result<Bytes, ChainError> {
        let params = json!([self.request_for(data), block]);
        let value = self.transport.request("eth_call", params).await?;
        serde_json::from_value(value).map_err(decode_error("eth_call"))
    }

    async fn read<C: SolCall>(&self, call: C) -> Result<C::Return, ChainError> {
        let output = self
            .eth_call(call.abi_encode().into(), json!("latest"))
            .await?;
        C::abi_decode_returns(&output, false)
            .map_err(|err| ChainError::Decode(format!("{}: {err}", C::SIGNATURE)))
    }

    async fn send<C: SolCall>(&self, call: C) -> Result<Box<dyn PendingTransaction>, ChainError> {
        let data: Bytes = call.abi_encode().into();
        let params = json!([self.request_for(data.clone())]);
        let value = self
            .transport
            .request("eth_sendTransaction", params)
            .await?;
        let tx_hash: B256 =
            serde_json::from_value(value).map_err(decode_error("eth_sendTransaction"))?;

        info!(%tx_hash, method = C::SIGNATURE, "transaction submitted");
        Ok(Box::new(Eip1193PendingTx {
            client: self.clone(),
            tx_hash,
            data,
        }))
    }
}

pub struct Eip1193Token<T> {
    client: ContractClient<T>,
}

#[async_trait(?Send)]
impl<T> TokenBinding for Eip1193Token<T>
where
    T: Eip1193Transport + 'static,
{
    fn address(&self) -> Address {
        self.client.contract
    }

    async fn balance_of(&self, owner: Address) -> Result<U256, ChainError> {
        Ok(self.client.read(IERC20::balanceOfCall { owner }).await?._0)
    }
}

pub struct Eip1193Staking<T> {
    client: ContractClient<T>,
}

#[async_trait(?Send)]
impl<T> StakingBinding for Eip1193Staking<T>
where
    T: Eip1193Transport + 'static,
{
    fn address(&self) -> Address {
        self.client.contract
    }

    async fn staked_balance_of(&self, owner: Address) -> Result<U256, ChainError> {
        let call = IStaking::getStakedBalanceCall { account: owner };
        Ok(self.client.read(call).await?._0)
    }

    async fn stake(&self, amount: U256) -> Result<Box<dyn PendingTransaction>, ChainError> {
        self.client.send(IStaking::stakeCall { amount }).await
    }

    async fn unstake(&self, amount: U256) -> Result<Box<dyn PendingTransaction>, ChainError> {
        self.client.send(IStaking::unstakeCall { amount }).await
    }
}

struct Eip1193PendingTx<T> {
    client: ContractClient<T>,
    tx_hash: B256,
    data: Bytes,
}

impl<T> Eip1193PendingTx<T>
where
    T: Eip1193Transport + 'static,
{
    /// Polls until a receipt appears. Also gives up once the slept
    /// intervals alone add up to `timeout`.
    async fn poll_receipt(&self, timeout: Duration) -> Result<Confirmation, ChainError> {
        let interval = self.client.poll.interval.max(Duration::from_millis(1));
        let mut waited = Duration::ZERO;

        loop {
            if let Some(receipt) = self.fetch_receipt().await? {
                return self.settle(receipt).await;
            }
            if waited >= timeout {
                warn!(tx_hash = %self.tx_hash, ?timeout, "no receipt before timeout");
                return Err(ChainError::Timeout(timeout));
            }
            debug!(tx_hash = %self.tx_hash, ?waited, "receipt pending");
            self.client.transport.sleep(interval).await;
            waited += interval;
        }
    }

    async fn fetch_receipt(&self) -> Result<Option<Receipt>, ChainError> {
        let value = self
            .client
            .transport
            .request("eth_getTransactionReceipt", json!([self.tx_hash]))
            .await?;
        serde_json::from_value(value).map_err(decode_error("eth_getTransactionReceipt"))
    }

    async fn settle(&self, receipt: Receipt) -> Result<Confirmation, ChainError> {
        let block_number = receipt
            .block_number
            .as_deref()
            .map(parse_quantity)
            .transpose()?;
        let succeeded = match receipt.status.as_deref() {
            Some(status) => parse_quantity(status)? == 1,
            // pre-Byzantium receipts carry no status
            None => true,
        };

        if succeeded {
            info!(tx_hash = %receipt.transaction_hash, ?block_number, "transaction confirmed");
            return Ok(Confirmation {
                tx_hash: receipt.transaction_hash,
                block_number,
            });
        }

        let reason = self.replay_for_reason(block_number).await;
        warn!(tx_hash = %self.tx_hash, ?reason, "transaction reverted");
        Err(ChainError::Reverted { reason })
    }

    /// Re-executes the call at the mined block; the node reports the revert
    /// reason the receipt does not carry.
    async fn replay_for_reason(&self, block_number: Option<u64>) -> Option<String> {
        let block = match block_number {
            Some(number) => json!(format!("{number:#x}")),
            None => json!("latest"),
        };
        match self.client.eth_call(self.data.clone(), block).await {
            Err(ChainError::Reverted { reason }) => reason,
            Err(err) => {
                debug!(tx_hash = %self.tx_hash, %err, "revert replay failed");
                None
            }
            Ok(_) => None,
        }
    }
}

#[async_trait(?Send)]
impl<T> PendingTransaction for Eip1193PendingTx<T>
where
    T: Eip1193Transport + 'static,
{
    fn tx_hash(&self) -> B256 {
        self.tx_hash
    }

    /// Bounded by `timeout` of wall time, stalled receipt requests included.
    async fn wait(&self, timeout: Duration) -> Result<Confirmation, ChainError> {
        let polling = pin!(self.poll_receipt(timeout));
        let deadline = self.client.transport.sleep(timeout);

        match future::select(polling, deadline).await {
            Either::Left((result, _)) => result,
            Either::Right(((), _)) => {
                warn!(tx_hash = %self.tx_hash, ?timeout, "confirmation deadline passed");
                Err(ChainError::Timeout(timeout))
            }
        }
    }
}
