pub mod deploy;
pub mod run;

use std::path::PathBuf;

use alloy::{primitives::Address, signers::local::PrivateKeySigner};
use clap::{ArgAction, Parser, Subcommand};
use deploy::DeployCli;
use eyre::eyre;
use run::RunCli;
use tracing::{Level, debug};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};
use uniswap_v3::{WalletProviderRpc, connect};

use crate::{config::LoadTestConfig, environment::LoadTestEnvironment};

#[derive(Parser)]
#[clap(about = "Deploys a Uniswap V3 suite, seeds a pool and swaps against it")]
pub struct LoadTestCli {
    #[clap(subcommand)]
    pub command:     LoadTestSubcommand,
    /// eth rpc/ws/ipc endpoint
    #[clap(long, default_value = "http://localhost:8545", global = true)]
    pub rpc_url:     String,
    /// hex private key signing every transaction
    #[clap(long, env = "PRIVATE_KEY", hide_env_values = true, global = true)]
    pub private_key: Option<PrivateKeySigner>,
    /// path to the toml config, defaults apply when omitted
    #[clap(short, long, global = true)]
    pub config:      Option<PathBuf>,
    /// Set the minimum log level.
    ///
    /// -v      Errors
    /// -vv     Warnings
    /// -vvv    Info
    /// -vvvv   Debug
    /// -vvvvv  Traces
    #[clap(short = 'v', long, action = ArgAction::Count, default_value_t = 3, help_heading = "Display", global = true)]
    pub verbosity:   u8
}

impl LoadTestCli {
    pub async fn run_all() -> eyre::Result<()> {
        let this = Self::parse();
        init_tracing(this.verbosity);

        let config = match &this.config {
            Some(path) => LoadTestConfig::load_toml_config(path)?,
            None => LoadTestConfig::default()
        };
        debug!(?config, "load test config");

        let signer = this
            .private_key
            .ok_or_else(|| eyre!("a private key is required, pass --private-key or set PRIVATE_KEY"))?;
        let sender = signer.address();
        let provider = connect(&this.rpc_url, signer).await?;

        this.command.run_command(provider, sender, config).await
    }
}

#[derive(Debug, Subcommand, Clone)]
pub enum LoadTestSubcommand {
    /// deploy or bind the suite, tokens and pool, then print the known
    /// addresses
    #[command(name = "deploy")]
    Deploy(DeployCli),
    /// same setup as `deploy`, then send swaps
    #[command(name = "run")]
    Run(RunCli)
}

impl LoadTestSubcommand {
    async fn run_command(
        self,
        provider: WalletProviderRpc,
        sender: Address,
        config: LoadTestConfig
    ) -> eyre::Result<()> {
        let env = LoadTestEnvironment::setup(provider, sender, &config).await?;

        match self {
            LoadTestSubcommand::Deploy(deploy_cli) => deploy_cli.run(&env, &config),
            LoadTestSubcommand::Run(run_cli) => run_cli.run(&env, &config).await
        }
    }
}

pub fn init_tracing(verbosity: u8) {
    let level = match verbosity.saturating_sub(1) {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE
    };

    let envfilter = filter::EnvFilter::builder().try_from_env().ok();
    let format = tracing_subscriber::fmt::layer()
        .with_ansi(true)
        .with_target(true);

    if let Some(f) = envfilter {
        let _ = tracing_subscriber::registry()
            .with(format)
            .with(f)
            .try_init();
    } else {
        let filter = filter::Targets::new()
            .with_target("v3_loadtest", level)
            .with_target("uniswap_v3", level);
        let _ = tracing_subscriber::registry()
            .with(format)
            .with(filter)
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_is_well_formed() {
        LoadTestCli::command().debug_assert();
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = LoadTestCli::try_parse_from([
            "v3-loadtest",
            "run",
            "--count",
            "10",
            "--rpc-url",
            "ws://localhost:8546",
            "--private-key",
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
            "-vvvv"
        ])
        .unwrap();

        assert_eq!(cli.rpc_url, "ws://localhost:8546");
        assert_eq!(cli.verbosity, 4);
        assert!(cli.config.is_none());
        assert_eq!(
            cli.private_key.unwrap().address(),
            alloy::primitives::address!("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266")
        );
        let LoadTestSubcommand::Run(run) = cli.command else { panic!("expected run") };
        assert_eq!(run.count, Some(10));
        assert_eq!(run.amount_in, None);
    }

    #[test]
    fn defaults_without_flags() {
        let cli = LoadTestCli::try_parse_from(["v3-loadtest", "deploy"]).unwrap();
        assert_eq!(cli.rpc_url, "http://localhost:8545");
        assert_eq!(cli.verbosity, 3);
        assert!(matches!(cli.command, LoadTestSubcommand::Deploy(_)));
    }
}
