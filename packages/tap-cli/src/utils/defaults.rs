use tap_lib::defaults;

/// Base URL of a locally running `tap-api-server`.
pub const TAP_API_SERVER_URL: &str = "http://127.0.0.1:29988";

pub const ENVIRONMENT: &str = "dev";

pub const ODATA_ORDER_BY: &str = defaults::ORDER_BY;
