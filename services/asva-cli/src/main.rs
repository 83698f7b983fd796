use anyhow::{Context, Result};
use asva_api_types::{
    NoticeLevel, SessionView, StakingConfig, default_confirmation_timeout_secs,
    default_poll_interval_ms,
};
use asva_chain_eip1193::{DEFAULT_RPC_URL, Eip1193Accessor, HttpTransport};
use asva_session::{SessionConfig, SessionController, SessionEvent};
use clap::{Parser, Subcommand};
use std::time::Duration;
use tracing::info;

/// Stake and unstake tokens against the staking contract through a JSON-RPC
/// node that holds the account (e.g. a local anvil instance).
#[derive(Debug, Parser)]
#[command(name = "asva", version)]
struct Cli {
    /// JSON-RPC endpoint of the node.
    #[arg(long, env = "ASVA_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,

    /// Token contract address.
    #[arg(long, env = "ASVA_TOKEN_ADDRESS")]
    token: String,

    /// Staking contract address.
    #[arg(long, env = "ASVA_STAKING_ADDRESS")]
    staking: String,

    /// Seconds to wait for a transaction to be confirmed.
    #[arg(long, env = "ASVA_CONFIRM_TIMEOUT_SECS", default_value_t = default_confirmation_timeout_secs())]
    timeout_secs: u64,

    #[arg(long, env = "ASVA_POLL_INTERVAL_MS", default_value_t = default_poll_interval_ms())]
    poll_interval_ms: u64,

    /// Print the final session view as JSON.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show token and staked balances.
    Balances,
    /// Stake an amount of tokens, e.g. `2` or `0.5`.
    Stake { amount: String },
    /// Unstake an amount of tokens.
    Unstake { amount: String },
}

impl Cli {
    fn staking_config(&self) -> StakingConfig {
        StakingConfig {
            token_address: self.token.clone(),
            staking_address: self.staking.clone(),
            rpc_url: Some(self.rpc_url.clone()),
            confirmation_timeout_secs: self.timeout_secs,
            poll_interval_ms: self.poll_interval_ms,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let staking_config = cli.staking_config();
    let config = SessionConfig::try_from(&staking_config).context("invalid configuration")?;

    let transport = HttpTransport::new(staking_config.rpc_url.clone());
    info!(endpoint = transport.endpoint(), "using json-rpc node");
    let accessor = Eip1193Accessor::new(transport)
        .with_poll_interval(Duration::from_millis(staking_config.poll_interval_ms));

    let controller = SessionController::new(accessor, config);
    controller.subscribe(print_event);

    tokio::select! {
        result = run(&controller, &cli.command) => result?,
        _ = tokio::signal::ctrl_c() => {
            anyhow::bail!("interrupted; a submitted transaction may still be confirmed");
        }
    }

    print_view(&controller.view(), cli.json)?;
    Ok(())
}

async fn run(
    controller: &SessionController<Eip1193Accessor<HttpTransport>>,
    command: &Command,
) -> Result<()> {
    controller.connect().await.context("connect wallet")?;
    match command {
        Command::Balances => {}
        Command::Stake { amount } => {
            controller.stake(amount).await?;
        }
        Command::Unstake { amount } => {
            controller.unstake(amount).await?;
        }
    }
    Ok(())
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::Notice(notice) => match notice.level {
            NoticeLevel::Info => println!("{}", notice.message),
            NoticeLevel::Error => eprintln!("error: {}", notice.message),
        },
        SessionEvent::Transaction(outcome) => {
            if let Some(tx_hash) = &outcome.tx_hash {
                info!(action = outcome.action.as_str(), kind = ?outcome.kind, %tx_hash, "transaction");
            }
        }
        SessionEvent::Changed(_) => {}
    }
}

fn print_view(view: &SessionView, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(view)?);
        return Ok(());
    }

    if let Some(account) = &view.short_account {
        println!("{account}");
    }
    println!("Balance: {}", view.display_token);
    println!("Staked: {}", view.display_staked);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::{CommandFactory, FromArgMatches};

    /// Parses as the binary would, but ignores `ASVA_*` variables set in the
    /// test environment.
    fn parse_without_env(args: &[&str]) -> Result<Cli, clap::Error> {
        let matches = Cli::command()
            .mut_args(|arg| arg.env(None::<&'static str>))
            .try_get_matches_from(args)?;
        Cli::from_arg_matches(&matches)
    }

    #[test]
    fn parses_stake_command() {
        let cli = parse_without_env(&[
            "asva",
            "--token",
            "0x00000000000000000000000000000000000000a1",
            "--staking",
            "0x00000000000000000000000000000000000000b2",
            "stake",
            "2.5",
        ])
        .expect("arguments should parse");

        assert!(matches!(&cli.command, Command::Stake { amount } if amount == "2.5"));
        assert_eq!(cli.rpc_url, DEFAULT_RPC_URL);
        let config = cli.staking_config();
        assert_eq!(config.confirmation_timeout_secs, 120);
        assert!(SessionConfig::try_from(&config).is_ok());
    }

    #[test]
    fn requires_contract_addresses() {
        let err = parse_without_env(&["asva", "balances"])
            .err()
            .expect("contract addresses are required");
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }
}
