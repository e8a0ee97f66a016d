use crate::cli::OdataUrlCommand;
use tap_lib::defaults;
use tap_odata::{ODataQuery, PaginationParams};

pub fn init(command: OdataUrlCommand) -> anyhow::Result<()> {
    println!("{}", request_url(command)?);
    Ok(())
}

pub fn request_url(
    OdataUrlCommand {
        base_url,
        page_size,
        order_by,
        filter,
        select,
        skip_token,
        ..
    }: OdataUrlCommand,
) -> anyhow::Result<String> {
    let params = PaginationParams {
        page_size,
        current_page: defaults::CURRENT_PAGE,
        order_by,
        filter,
        select,
        skip_token,
    };

    let query = ODataQuery::build(&params)?;

    Ok(query.request_url(&base_url))
}
