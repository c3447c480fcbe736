use alloy::providers::Provider;
use eyre::Context;
use tracing::info;

use crate::{config::LoadTestConfig, environment::LoadTestEnvironment};

#[derive(Debug, Clone, Default, clap::Parser)]
pub struct DeployCli {
    /// only print the `[known_addresses]` table instead of the full config
    #[clap(long)]
    pub addresses_only: bool
}

impl DeployCli {
    pub fn run<P: Provider + Clone>(
        &self,
        env: &LoadTestEnvironment<P>,
        config: &LoadTestConfig
    ) -> eyre::Result<()> {
        let rendered = self.render(env, config)?;
        info!("deployment complete, feed the config below back with --config to reuse it");
        println!("{rendered}");

        Ok(())
    }

    fn render<P: Provider + Clone>(
        &self,
        env: &LoadTestEnvironment<P>,
        config: &LoadTestConfig
    ) -> eyre::Result<String> {
        let known = env.known_config(config);
        let rendered = if self.addresses_only {
            toml::to_string_pretty(&known.known_addresses)
        } else {
            toml::to_string_pretty(&known)
        };

        rendered.wrap_err("could not serialize the deployed addresses")
    }
}
