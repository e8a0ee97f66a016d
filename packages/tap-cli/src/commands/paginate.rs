use crate::{ops::tap_paginate, utils::defaults};
use clap::Parser;
use tap_lib::defaults as tap_defaults;

/// Fetch one page of missionaries through a running API server.
#[derive(Debug, Parser)]
pub struct Command {
    /// URL at which to find the TAP API server.
    #[clap(long, default_value = defaults::TAP_API_SERVER_URL, help = "URL at which to find the TAP API server.")]
    pub url: String,

    /// Environment to query.
    #[clap(long, default_value = defaults::ENVIRONMENT, help = "Environment to query.")]
    pub environment: String,

    /// Rows per page.
    #[clap(long, default_value_t = tap_defaults::PAGE_SIZE, help = "Rows per page.")]
    pub page_size: u32,

    /// Page number being requested.
    #[clap(long, default_value_t = tap_defaults::CURRENT_PAGE, help = "Page number being requested.")]
    pub current_page: u32,

    /// OData $orderby expression.
    #[clap(long, default_value = defaults::ODATA_ORDER_BY, help = "OData $orderby expression.")]
    pub order_by: String,

    /// OData $filter expression.
    #[clap(long, help = "OData $filter expression.")]
    pub filter: Option<String>,

    /// OData $select expression.
    #[clap(long, help = "OData $select expression.")]
    pub select: Option<String>,

    /// Skip token from a previous page.
    #[clap(long, help = "Skip token from a previous page.")]
    pub skip_token: Option<String>,

    /// Access token to use instead of acquiring one.
    #[clap(long, help = "Access token to use instead of acquiring one.")]
    pub access_token: Option<String>,

    /// Enable verbose output.
    #[clap(short, long, help = "Enable verbose output.")]
    pub verbose: bool,
}

pub async fn exec(command: Command) -> anyhow::Result<()> {
    tap_paginate::init(command).await
}
