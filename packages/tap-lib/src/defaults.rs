pub const WEB_API_HOST: &str = "127.0.0.1";
pub const WEB_API_PORT: &str = "29988";
pub const MAX_BODY_SIZE: usize = 5242880; // 5MB in bytes

pub const LOG_LEVEL: &str = "info";
pub const VERBOSE_LOGGING: bool = false;

/// Seconds before an upstream OAuth, GraphQL, or OData call is abandoned.
pub const UPSTREAM_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const PAGE_SIZE: u32 = 25;
pub const CURRENT_PAGE: u32 = 1;
pub const ORDER_BY: &str = "inq_name";
pub const ODATA_COLLECTION: &str = "inq_missionaries";

pub const GENERATOR_MAX_DEPTH: usize = 3;
pub const GENERATOR_MAX_FIELDS: usize = 5;
pub const GENERATOR_MAX_ROOT_FIELDS: usize = 3;

/// Largest `max_depth` / `max_fields` a caller may request.
pub const GENERATOR_MAX_DEPTH_LIMIT: usize = 10;
pub const GENERATOR_MAX_FIELDS_LIMIT: usize = 20;

/// Total fields one generated document may select.
pub const GENERATOR_MAX_SELECTIONS: usize = 500;
