use crate::api::TapApi;
use tap_lib::{
    config::{ApiServerArgs, TapConfig},
    utils::init_logging,
};
use tracing::info;

pub async fn exec(args: ApiServerArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => TapConfig::from_file(path)?,
        None => TapConfig::try_from(args)?,
    };

    init_logging(&config)?;

    info!("Configuration: {:?}", config);

    if config.environments.is_empty() {
        info!("No environments configured; only /api/health and /api/graphql/generate with an inline schema will succeed");
    }

    TapApi::build_and_run(config).await
}
