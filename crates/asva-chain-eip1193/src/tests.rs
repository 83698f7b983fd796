use super::*;
use alloy_sol_types::{Revert, SolError};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

const ACCOUNT: &str = "0xabcd000000000000000000000000000000001234";

fn token_address() -> Address {
    Address::repeat_byte(0x11)
}

fn staking_address() -> Address {
    Address::repeat_byte(0x22)
}

/// Scripted transport: answers each method from its own queue and returns
/// `null` once a queue runs dry.
#[derive(Default)]
struct ScriptedTransport {
    responses: RefCell<HashMap<String, VecDeque<Result<Value, ChainError>>>>,
    calls: RefCell<Vec<(String, Value)>>,
    stalled: RefCell<Vec<String>>,
    sleeps: RefCell<Vec<Duration>>,
}

impl ScriptedTransport {
    fn respond(self, method: &str, response: Result<Value, ChainError>) -> Self {
        self.responses
            .borrow_mut()
            .entry(method.to_owned())
            .or_default()
            .push_back(response);
        self
    }

    /// Requests for `method` are recorded but never answered.
    fn stall(self, method: &str) -> Self {
        self.stalled.borrow_mut().push(method.to_owned());
        self
    }

    fn calls_to(&self, method: &str) -> Vec<Value> {
        self.calls
            .borrow()
            .iter()
            .filter(|(name, _)| name == method)
            .map(|(_, params)| params.clone())
            .collect()
    }
}

#[async_trait(?Send)]
impl Eip1193Transport for Rc<ScriptedTransport> {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ChainError> {
        self.calls.borrow_mut().push((method.to_owned(), params));
        if self.stalled.borrow().iter().any(|name| name == method) {
            std::future::pending::<()>().await;
        }
        self.responses
            .borrow_mut()
            .get_mut(method)
            .and_then(VecDeque::pop_front)
            .unwrap_or(Ok(Value::Null))
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
    }
}

fn word(value: u128) -> Value {
    json!(hex::encode_prefixed(U256::from(value).to_be_bytes::<32>()))
}

fn tx_hash() -> B256 {
    B256::repeat_byte(0xaa)
}

fn receipt(status: &str) -> Value {
    json!({
        "transactionHash": tx_hash(),
        "blockNumber": "0x10",
        "status": status,
    })
}

async fn connect(transport: &Rc<ScriptedTransport>) -> Account {
    Eip1193Accessor::new(Rc::clone(transport))
        .request_account()
        .await
        .expect("account should be granted")
}

fn granted(transport: ScriptedTransport) -> Rc<ScriptedTransport> {
    Rc::new(transport.respond("eth_requestAccounts", Ok(json!([ACCOUNT]))))
}

#[tokio::test]
async fn request_account_takes_first_address() {
    let transport = granted(ScriptedTransport::default());
    let account = connect(&transport).await;

    assert_eq!(account.address, ACCOUNT.parse::<Address>().unwrap());
    assert_eq!(account.signer.address(), account.address);
}

#[tokio::test]
async fn empty_account_list_counts_as_rejection() {
    let transport = Rc::new(
        ScriptedTransport::default().respond("eth_requestAccounts", Ok(json!([]))),
    );
    let err = Eip1193Accessor::new(transport)
        .request_account()
        .await
        .unwrap_err();
    assert_eq!(err, ChainError::UserRejected);
}

#[test]
fn user_rejection_code_maps_to_user_rejected() {
    let err = rpc_error(RpcErrorObject {
        code: 4001,
        message: "User rejected the request.".to_owned(),
        data: None,
    });
    assert_eq!(err, ChainError::UserRejected);
}

#[test]
fn revert_bytes_in_nested_data_are_decoded() {
    let revert = Revert {
        reason: "insufficient balance".to_owned(),
    }
    .abi_encode();
    let err = rpc_error(RpcErrorObject {
        code: -32603,
        message: "Internal JSON-RPC error.".to_owned(),
        data: Some(json!({ "code": 3, "data": hex::encode_prefixed(revert) })),
    });
    assert_eq!(err.revert_reason(), Some("insufficient balance"));
}

#[test]
fn revert_reason_is_taken_from_message_when_no_data() {
    let err = rpc_error(RpcErrorObject {
        code: -32000,
        message: "execution reverted: amount exceeds stake".to_owned(),
        data: None,
    });
    assert_eq!(err.revert_reason(), Some("amount exceeds stake"));

    let other = rpc_error(RpcErrorObject {
        code: -32000,
        message: "nonce too low".to_owned(),
        data: None,
    });
    assert!(matches!(other, ChainError::Rpc { code: -32000, .. }));
}

#[tokio::test]
async fn balance_reads_use_typed_calldata() {
    let transport = granted(
        ScriptedTransport::default()
            .respond("eth_call", Ok(word(5_000_000_000_000_000_000)))
            .respond("eth_call", Ok(word(2))),
    );
    let account = connect(&transport).await;
    let token = account.signer.bind_token(token_address());
    let staking = account.signer.bind_staking(staking_address());

    let balance = token.balance_of(account.address).await.unwrap();
    let staked = staking.staked_balance_of(account.address).await.unwrap();

    assert_eq!(balance, U256::from(5_000_000_000_000_000_000_u128));
    assert_eq!(staked, U256::from(2));

    let calls = transport.calls_to("eth_call");
    assert_eq!(calls.len(), 2);

    let expected = IERC20::balanceOfCall {
        owner: account.address,
    }
    .abi_encode();
    let sent: Bytes = serde_json::from_value(calls[0][0]["data"].clone()).unwrap();
    assert_eq!(sent.as_ref(), expected.as_slice());
    let to: Address = serde_json::from_value(calls[0][0]["to"].clone()).unwrap();
    assert_eq!(to, token_address());
    assert_eq!(calls[0][1], json!("latest"));

    let sent: Bytes = serde_json::from_value(calls[1][0]["data"].clone()).unwrap();
    assert_eq!(&sent[..4], IStaking::getStakedBalanceCall::SELECTOR.as_slice());
}

#[tokio::test]
async fn stake_submits_and_polls_until_receipt() {
    let transport = granted(
        ScriptedTransport::default()
            .respond("eth_sendTransaction", Ok(json!(tx_hash())))
            .respond("eth_getTransactionReceipt", Ok(Value::Null))
            .respond("eth_getTransactionReceipt", Ok(Value::Null))
            .respond("eth_getTransactionReceipt", Ok(receipt("0x1"))),
    );
    let account = connect(&transport).await;
    let staking = account.signer.bind_staking(staking_address());

    let amount = U256::from(2_000_000_000_000_000_000_u128);
    let pending = staking.stake(amount).await.unwrap();
    assert_eq!(pending.tx_hash(), tx_hash());

    let confirmation = pending.wait(Duration::from_secs(30)).await.unwrap();
    assert_eq!(confirmation.tx_hash, tx_hash());
    assert_eq!(confirmation.block_number, Some(16));
    assert_eq!(transport.sleeps.borrow().len(), 2);

    let sent = transport.calls_to("eth_sendTransaction");
    let from: Address = serde_json::from_value(sent[0][0]["from"].clone()).unwrap();
    assert_eq!(from, account.address);
    let data: Bytes = serde_json::from_value(sent[0][0]["data"].clone()).unwrap();
    assert_eq!(data.as_ref(), IStaking::stakeCall { amount }.abi_encode().as_slice());
}

#[tokio::test]
async fn wait_gives_up_after_timeout() {
    let transport = granted(
        ScriptedTransport::default().respond("eth_sendTransaction", Ok(json!(tx_hash()))),
    );
    let account = connect(&transport).await;
    let staking = account.signer.bind_staking(staking_address());

    let pending = staking.unstake(U256::from(1)).await.unwrap();
    let err = pending.wait(Duration::from_secs(3)).await.unwrap_err();

    assert_eq!(err, ChainError::Timeout(Duration::from_secs(3)));
    assert_eq!(transport.calls_to("eth_getTransactionReceipt").len(), 4);
    assert_eq!(transport.sleeps.borrow().len(), 3);
}

#[tokio::test]
async fn wait_times_out_when_receipt_request_stalls() {
    let transport = granted(
        ScriptedTransport::default()
            .respond("eth_sendTransaction", Ok(json!(tx_hash())))
            .stall("eth_getTransactionReceipt"),
    );
    let account = connect(&transport).await;
    let staking = account.signer.bind_staking(staking_address());

    let pending = staking.stake(U256::from(1)).await.unwrap();
    let timeout = Duration::from_millis(200);
    let result = tokio::time::timeout(Duration::from_secs(3), pending.wait(timeout))
        .await
        .expect("wait should end at its own deadline");

    assert_eq!(result.unwrap_err(), ChainError::Timeout(timeout));
    assert_eq!(transport.calls_to("eth_getTransactionReceipt").len(), 1);
    assert_eq!(*transport.sleeps.borrow(), vec![timeout]);
}

#[tokio::test]
async fn reverted_receipt_replays_call_for_reason() {
    let revert = Revert {
        reason: "insufficient balance".to_owned(),
    }
    .abi_encode();
    let transport = granted(
        ScriptedTransport::default()
            .respond("eth_sendTransaction", Ok(json!(tx_hash())))
            .respond("eth_getTransactionReceipt", Ok(receipt("0x0")))
            .respond(
                "eth_call",
                Err(rpc_error(RpcErrorObject {
                    code: 3,
                    message: "execution reverted".to_owned(),
                    data: Some(json!(hex::encode_prefixed(revert))),
                })),
            ),
    );
    let account = connect(&transport).await;
    let staking = account.signer.bind_staking(staking_address());

    let pending = staking.stake(U256::from(1)).await.unwrap();
    let err = pending.wait(Duration::from_secs(30)).await.unwrap_err();

    assert_eq!(err.revert_reason(), Some("insufficient balance"));
    let replay = transport.calls_to("eth_call");
    assert_eq!(replay.len(), 1);
    assert_eq!(replay[0][1], json!("0x10"));
}

#[tokio::test]
async fn rejected_submission_is_user_rejected() {
    let transport = granted(
        ScriptedTransport::default().respond("eth_sendTransaction", Err(ChainError::UserRejected)),
    );
    let account = connect(&transport).await;
    let staking = account.signer.bind_staking(staking_address());

    let err = staking.stake(U256::from(1)).await.err().expect("submission should fail");
    assert_eq!(err, ChainError::UserRejected);
    assert!(transport.calls_to("eth_getTransactionReceipt").is_empty());
}
