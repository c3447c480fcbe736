//! CLI definition and entrypoint to executable
pub mod cli;
pub mod config;
pub mod environment;
pub mod load;

pub fn run() -> eyre::Result<()> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(cli::LoadTestCli::run_all())
}
