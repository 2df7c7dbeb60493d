use serde::Deserialize;
use serde_json::{Map, Value};

use super::body::TransportError;
use crate::domain::{Page, Query};

const COUNT_PARAM: &str = "count";
const OFFSET_PARAM: &str = "offset";
const MARKER_PARAM: &str = "marker";

#[derive(Debug, Clone, Deserialize)]
struct PageJsonResponse {
    data: Vec<Map<String, Value>>,
    #[serde(default)]
    truncated: bool,
    #[serde(default)]
    next_marker: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct CountJsonResponse {
    count: u64,
}

/// Parameters for one page request: the query's filters plus paging state.
///
/// `marker` takes precedence over `offset` when both are given.
pub fn encode_page_params(
    query: &Query,
    page_size: usize,
    offset: Option<usize>,
    marker: Option<&str>,
) -> Map<String, Value> {
    let mut params = query.params().clone();
    params.insert(Query::PAGE_SIZE.to_owned(), Value::from(page_size));
    match (marker, offset) {
        (Some(marker), _) => {
            params.insert(MARKER_PARAM.to_owned(), Value::String(marker.to_owned()));
        }
        (None, Some(offset)) if offset > 0 => {
            params.insert(OFFSET_PARAM.to_owned(), Value::from(offset));
        }
        _ => {}
    }
    params
}

/// Parameters asking the server for the number of matches only.
pub fn encode_count_params(query: &Query) -> Map<String, Value> {
    let mut params = query.params().clone();
    params.insert(COUNT_PARAM.to_owned(), Value::from(1));
    params
}

pub fn decode_page(value: Value) -> Result<Page, TransportError> {
    let parsed: PageJsonResponse = serde_json::from_value(value)?;
    Ok(Page {
        data: parsed.data,
        truncated: parsed.truncated,
        next_marker: parsed.next_marker.filter(|marker| !marker.is_empty()),
    })
}

pub fn decode_count(value: Value) -> Result<u64, TransportError> {
    let parsed: CountJsonResponse = serde_json::from_value(value)?;
    Ok(parsed.count)
}
