use crate::{ops::tap_odata_url, utils::defaults};
use clap::Parser;
use tap_lib::defaults as tap_defaults;

/// Print the OData request URL for a page.
#[derive(Debug, Parser)]
pub struct Command {
    /// OData Web API base URL, e.g. https://org.crm.dynamics.com/api/data/v9.2
    #[clap(long, help = "OData Web API base URL.")]
    pub base_url: String,

    /// Rows per page.
    #[clap(long, default_value_t = tap_defaults::PAGE_SIZE, help = "Rows per page.")]
    pub page_size: u32,

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

    /// Enable verbose output.
    #[clap(short, long, help = "Enable verbose output.")]
    pub verbose: bool,
}

pub fn exec(command: Command) -> anyhow::Result<()> {
    tap_odata_url::init(command)
}
