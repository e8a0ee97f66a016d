use crate::{
    cursor::Cursor,
    query::{strip_sort_direction, PaginationParams},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tap_lib::utils::Clock;
use tracing::debug;
use url::Url;

/// A page of an OData collection as returned by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ODataCollection {
    #[serde(rename = "@odata.context", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    #[serde(rename = "@odata.count", default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,

    #[serde(rename = "@odata.nextLink", default, skip_serializing_if = "Option::is_none")]
    pub next_link: Option<String>,

    #[serde(default)]
    pub value: Vec<Value>,
}

/// Paging signals derived from one page of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInfo {
    pub total_records: Option<u64>,

    /// Advisory only beyond the first page.
    pub total_pages: Option<u64>,

    pub has_next_page: bool,

    /// `current_page > 1`. The server has no notion of a previous cursor page.
    pub has_previous_page: bool,

    pub next_skip_token: Option<String>,
}

impl PageInfo {
    pub fn interpret(params: &PaginationParams, collection: &ODataCollection) -> Self {
        let page_size = u64::from(params.page_size);
        let current_page = u64::from(params.current_page);
        let total_records = collection.count;

        let more_by_count = total_records.map_or(false, |total| total > current_page * page_size);
        let more_by_link = collection.next_link.is_some();
        let full_page = collection.value.len() as u64 == page_size;
        let has_next_page = more_by_count || more_by_link || full_page;

        let total_pages = match (total_records, page_size) {
            (Some(total), size) if size > 0 => Some(total.div_ceil(size)),
            _ => None,
        };

        let next_skip_token = collection
            .next_link
            .as_deref()
            .and_then(skip_token_from_next_link)
            .or_else(|| {
                if !has_next_page {
                    return None;
                }
                let last = collection.value.last()?;
                let field = strip_sort_direction(&params.order_by);
                sort_value(last, field).map(|v| Cursor::After(v).to_string())
            });

        debug!(
            "Page {current_page}: {} row(s), next by count={more_by_count} link={more_by_link} full={full_page}",
            collection.value.len()
        );

        Self {
            total_records,
            total_pages,
            has_next_page,
            has_previous_page: params.current_page > 1,
            next_skip_token,
        }
    }
}

/// The `$skiptoken` query parameter of an `@odata.nextLink`, decoded.
fn skip_token_from_next_link(link: &str) -> Option<String> {
    let url = Url::parse(link).ok()?;
    url.query_pairs()
        .find(|(k, _)| k == "$skiptoken")
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}

fn sort_value(row: &Value, field: &str) -> Option<String> {
    match row.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Body of a pagination request made to the API server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationRequest {
    pub environment: String,

    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(flatten)]
    pub params: PaginationParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResponse {
    pub success: bool,
    pub environment: String,
    pub current_page: u32,
    pub page_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_records: Option<u64>,
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub data: Vec<Value>,
    pub query_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_skip_token: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl PaginationResponse {
    pub fn new(
        environment: impl Into<String>,
        params: &PaginationParams,
        query_url: String,
        collection: ODataCollection,
        clock: &dyn Clock,
    ) -> Self {
        let info = PageInfo::interpret(params, &collection);

        Self {
            success: true,
            environment: environment.into(),
            current_page: params.current_page,
            page_size: params.page_size,
            total_pages: info.total_pages,
            total_records: info.total_records,
            has_next_page: info.has_next_page,
            has_previous_page: info.has_previous_page,
            data: collection.value,
            query_url,
            next_page_url: collection.next_link,
            next_skip_token: info.next_skip_token,
            timestamp: clock.now(),
        }
    }
}
