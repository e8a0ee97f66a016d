//! Cursor pagination over Dataverse OData collections.
//!
//! Dataverse does not support `$skip`, so pages beyond the first are reached by
//! filtering on the sort field (`cursor_<value>` tokens) or by forwarding the
//! `$skiptoken` the server put in `@odata.nextLink`.
#![deny(unused_crate_dependencies)]

pub mod cursor;
pub mod headers;
pub mod query;
pub mod response;

pub use cursor::{escape_odata_string, unescape_odata_string, Cursor, PageState};
pub use headers::request_headers;
pub use query::{
    sort_direction, strip_sort_direction, ODataQuery, PaginationParams, SortDirection,
};
pub use response::{ODataCollection, PageInfo, PaginationRequest, PaginationResponse};

use thiserror::Error;

pub type ODataResult<T> = Result<T, ODataError>;

#[derive(Debug, Error)]
pub enum ODataError {
    #[error("Page size must be a positive integer, got {0}")]
    InvalidPageSize(u32),
    #[error("Current page must be a positive integer, got {0}")]
    InvalidCurrentPage(u32),
    #[error("Malformed skip token: {0:?}")]
    InvalidSkipToken(String),
    #[error("A cursor_ skip token requires an orderBy expression")]
    CursorWithoutOrderBy,
    #[error("Invalid header value: {0:?}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),
}
