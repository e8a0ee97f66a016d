use crate::{ops::tap_status, utils::defaults};
use clap::Parser;

/// Check the health of a running API server.
#[derive(Debug, Parser)]
pub struct Command {
    /// URL at which to find the TAP API server.
    #[clap(long, default_value = defaults::TAP_API_SERVER_URL, help = "URL at which to find the TAP API server.")]
    pub url: String,

    /// Enable verbose output.
    #[clap(short, long, help = "Enable verbose output.")]
    pub verbose: bool,
}

pub async fn exec(command: Command) -> anyhow::Result<()> {
    tap_status::status(command).await
}
