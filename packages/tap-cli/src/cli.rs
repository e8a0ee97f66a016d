pub(crate) use crate::commands::{
    generate::Command as GenerateCommand, odata_url::Command as OdataUrlCommand,
    paginate::Command as PaginateCommand, status::Command as StatusCommand,
};
use crate::utils::log::LoggerConfig;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[clap(name = "tap", about = "TAP console companion", version)]
pub(crate) struct Opt {
    /// The command to run
    #[clap(subcommand)]
    pub(crate) command: Tap,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Tap {
    Generate(GenerateCommand),
    OdataUrl(OdataUrlCommand),
    Paginate(PaginateCommand),
    Status(StatusCommand),
}

pub async fn run_cli() -> Result<(), anyhow::Error> {
    let opt = Opt::parse();

    LoggerConfig::new(&opt.command).init()?;

    match opt.command {
        Tap::Generate(command) => crate::commands::generate::exec(command),
        Tap::OdataUrl(command) => crate::commands::odata_url::exec(command),
        Tap::Paginate(command) => crate::commands::paginate::exec(command).await,
        Tap::Status(command) => crate::commands::status::exec(command).await,
    }
}
