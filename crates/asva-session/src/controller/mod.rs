use alloy_primitives::Address;
use asva_api_types::{
    Notice, OutcomeKind, SessionStatus, SessionView, StakeAction, TransactionOutcome,
    short_address,
};
use asva_chain_client::{
    Account, ChainAccessor, ChainError, ContractAddresses, SigningHandle, StakingBinding,
    TokenBinding,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{debug, info, warn};

use crate::balances::{BalanceSnapshot, read_balances};
use crate::config::SessionConfig;
use crate::error::{StakingError, success_message};
use crate::units::parse_amount;


/// Change notification delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Changed(SessionView),
    Transaction(TransactionOutcome),
    Notice(Notice),
}

type Observer = Box<dyn Fn(&SessionEvent)>;

/// Signer and contract bindings of a connected account. Exists only as a
/// whole, so a connected session always has all of them.
#[derive(Clone)]
struct Session {
    account: Address,
    signer: Rc<dyn SigningHandle>,
    token: Rc<dyn TokenBinding>,
    staking: Rc<dyn StakingBinding>,
}

impl Session {
    fn bind(account: Account, contracts: &ContractAddresses) -> Self {
        Self {
            account: account.address,
            token: account.signer.bind_token(contracts.token),
            staking: account.signer.bind_staking(contracts.staking),
            signer: account.signer,
        }
    }
}

enum SessionState {
    Disconnected,
    Connecting,
    Connected(Session),
}

impl SessionState {
    fn status(&self) -> SessionStatus {
        match self {
            SessionState::Disconnected => SessionStatus::Disconnected,
            SessionState::Connecting => SessionStatus::Connecting,
            SessionState::Connected(_) => SessionStatus::Connected,
        }
    }
}

/// Owns the session and the latest balance snapshot.
///
/// Runs on a single cooperative thread. State is never borrowed across a
/// suspension point, and only one command runs at a time: a command issued
/// while another is outstanding fails with [`StakingError::Busy`].
pub struct SessionController<A> {
    accessor: A,
    config: SessionConfig,
    state: RefCell<SessionState>,
    snapshot: RefCell<BalanceSnapshot>,
    busy: Cell<bool>,
    observers: RefCell<Vec<Observer>>,
}

struct CommandGuard<'a, A> {
    controller: &'a SessionController<A>,
}

impl<A> Drop for CommandGuard<'_, A> {
    fn drop(&mut self) {
        self.controller.busy.set(false);
        self.controller.notify_changed();
    }
}

impl<A> SessionController<A> {
    pub fn new(accessor: A, config: SessionConfig) -> Self {
        Self {
            accessor,
            config,
            state: RefCell::new(SessionState::Disconnected),
            snapshot: RefCell::new(BalanceSnapshot::default()),
            busy: Cell::new(false),
            observers: RefCell::new(Vec::new()),
        }
    }

    /// Registers an observer. Observers must not subscribe from inside a callback.
    pub fn subscribe(&self, observer: impl Fn(&SessionEvent) + 'static) {
        self.observers.borrow_mut().push(Box::new(observer));
    }

    pub fn status(&self) -> SessionStatus {
        self.state.borrow().status()
    }

    pub fn account(&self) -> Option<Address> {
        match &*self.state.borrow() {
            SessionState::Connected(session) => Some(session.account),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> BalanceSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    pub fn view(&self) -> SessionView {
        let account = self.account().map(|address| address.to_string());
        let snapshot = self.snapshot.borrow();
        SessionView {
            status: self.status(),
            short_account: account.as_deref().map(short_address),
            account,
            display_token: snapshot.display_token.clone(),
            display_staked: snapshot.display_staked.clone(),
            busy: self.busy.get(),
        }
    }

    /// Drops the account and its bindings and returns to `Disconnected`.
    pub fn disconnect(&self) -> Result<(), StakingError> {
        if self.busy.get() {
            return Err(self.report(StakingError::Busy));
        }
        if matches!(*self.state.borrow(), SessionState::Disconnected) {
            return Ok(());
        }

        *self.state.borrow_mut() = SessionState::Disconnected;
        *self.snapshot.borrow_mut() = BalanceSnapshot::default();
        info!("wallet disconnected");
        self.notify_changed();
        Ok(())
    }

    fn begin_command(&self) -> Result<CommandGuard<'_, A>, StakingError> {
        if self.busy.replace(true) {
            return Err(StakingError::Busy);
        }
        self.notify_changed();
        Ok(CommandGuard { controller: self })
    }

    fn connected_session(&self) -> Result<Session, StakingError> {
        match &*self.state.borrow() {
            SessionState::Connected(session) => Ok(session.clone()),
            _ => Err(StakingError::NotConnected),
        }
    }

    fn set_state(&self, state: SessionState) {
        *self.state.borrow_mut() = state;
        self.notify_changed();
    }

    fn emit(&self, event: SessionEvent) {
        for observer in self.observers.borrow().iter() {
            observer(&event);
        }
    }

    fn notify_changed(&self) {
        self.emit(SessionEvent::Changed(self.view()));
    }

    /// Surfaces an error to the user and hands it back to the caller.
    fn report(&self, error: StakingError) -> StakingError {
        self.emit(SessionEvent::Notice(Notice::error(error.to_string())));
        error
    }

    /// Reads both balances and swaps the snapshot in one step. On failure
    /// the previous snapshot stays in place.
    async fn refresh_with(&self, session: &Session) -> Result<(), StakingError> {
        match read_balances(session.account, &*session.token, &*session.staking).await {
            Ok(snapshot) => {
                debug!(
                    token = %snapshot.display_token,
                    staked = %snapshot.display_staked,
                    "balances refreshed"
                );
                *self.snapshot.borrow_mut() = snapshot;
                self.notify_changed();
                Ok(())
            }
            Err(err) => {
                warn!(%err, "balance refresh failed; keeping last snapshot");
                Err(StakingError::ChainReadError(err))
            }
        }
    }

    fn transaction_event(
        &self,
        action: StakeAction,
        kind: OutcomeKind,
        tx_hash: Option<String>,
        reason: Option<String>,
    ) -> TransactionOutcome {
        let outcome = TransactionOutcome {
            action,
            kind,
            tx_hash,
            reason,
        };
        self.emit(SessionEvent::Transaction(outcome.clone()));
        outcome
    }

    fn fail_transaction(
        &self,
        action: StakeAction,
        tx_hash: Option<String>,
        err: ChainError,
    ) -> StakingError {
        warn!(action = action.as_str(), %err, "transaction failed");
        let error = StakingError::from_transaction(action, err);
        let reason = match &error {
            StakingError::TransactionFailed { reason, .. } => reason.clone(),
            other => Some(other.to_string()),
        };
        self.transaction_event(action, OutcomeKind::Failed, tx_hash, reason);
        self.report(error)
    }
}

impl<A> SessionController<A>
where
    A: ChainAccessor,
{
    /// Requests wallet access and binds both contracts to the granted
    /// signer. A no-op while already connecting or connected.
    pub async fn connect(&self) -> Result<(), StakingError> {
        if !matches!(*self.state.borrow(), SessionState::Disconnected) {
            debug!(status = ?self.status(), "connect ignored");
            return Ok(());
        }
        let _guard = self.begin_command().map_err(|err| self.report(err))?;
        self.set_state(SessionState::Connecting);

        let account = match self.accessor.request_account().await {
            Ok(account) => account,
            Err(err) => {
                warn!(%err, "wallet connection failed");
                self.set_state(SessionState::Disconnected);
                return Err(self.report(StakingError::from_connect(err)));
            }
        };

        let session = Session::bind(account, &self.config.contracts);
        info!(account = %session.account, "wallet connected");
        self.set_state(SessionState::Connected(session.clone()));

        if let Err(err) = self.refresh_with(&session).await {
            self.report(err);
        }
        Ok(())
    }

    /// Re-reads both balances for the connected account.
    pub async fn refresh_balances(&self) -> Result<BalanceSnapshot, StakingError> {
        let session = self.connected_session().map_err(|err| self.report(err))?;
        let _guard = self.begin_command().map_err(|err| self.report(err))?;

        self.refresh_with(&session)
            .await
            .map_err(|err| self.report(err))?;
        Ok(self.snapshot())
    }

    pub async fn stake(&self, amount_text: &str) -> Result<TransactionOutcome, StakingError> {
        self.submit(StakeAction::Stake, amount_text).await
    }

    pub async fn unstake(&self, amount_text: &str) -> Result<TransactionOutcome, StakingError> {
        self.submit(StakeAction::Unstake, amount_text).await
    }

    /// Validates, submits, and awaits confirmation; balances are refreshed
    /// only after the ledger has confirmed the call.
    async fn submit(
        &self,
        action: StakeAction,
        amount_text: &str,
    ) -> Result<TransactionOutcome, StakingError> {
        let session = self.connected_session().map_err(|err| self.report(err))?;
        let _guard = self.begin_command().map_err(|err| self.report(err))?;
        let amount = parse_amount(amount_text).map_err(|err| self.report(err.into()))?;

        debug!(
            action = action.as_str(),
            from = %session.signer.address(),
            %amount,
            "submitting transaction"
        );
        let submitted = match action {
            StakeAction::Stake => session.staking.stake(amount).await,
            StakeAction::Unstake => session.staking.unstake(amount).await,
        };
        let pending = submitted.map_err(|err| self.fail_transaction(action, None, err))?;

        let tx_hash = pending.tx_hash().to_string();
        self.transaction_event(action, OutcomeKind::Submitted, Some(tx_hash.clone()), None);

        let confirmation = pending
            .wait(self.config.confirmation_timeout)
            .await
            .map_err(|err| self.fail_transaction(action, Some(tx_hash), err))?;
        info!(
            action = action.as_str(),
            tx_hash = %confirmation.tx_hash,
            block = ?confirmation.block_number,
            "transaction confirmed"
        );

        if let Err(err) = self.refresh_with(&session).await {
            self.report(err);
        }

        let outcome = self.transaction_event(
            action,
            OutcomeKind::Confirmed,
            Some(confirmation.tx_hash.to_string()),
            None,
        );
        self.emit(SessionEvent::Notice(Notice::info(success_message(action))));
        Ok(outcome)
    }
}
