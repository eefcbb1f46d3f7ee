use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of entity a hit refers to. Codes are stable and match the values the
/// indexing pipeline writes into the resource type field. Descending code
/// order is the display-priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceType {
    Item = 2,
    Collection = 3,
    Community = 4,
}

impl ResourceType {
    /// Map an index type code to a resource type, if it is one of the known codes.
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            2 => Some(Self::Item),
            3 => Some(Self::Collection),
            4 => Some(Self::Community),
            _ => None,
        }
    }

    pub fn code(self) -> u64 {
        self as u64
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Item => "ITEM",
            Self::Collection => "COLLECTION",
            Self::Community => "COMMUNITY",
        }
    }
}

/// Requested ordering for the secondary sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

/// Arguments for one query. Built by the caller per request; the scoped query
/// builder rewrites the query field, nothing else is mutated.
#[derive(Debug, Clone)]
pub struct QueryArgs {
    /// Raw query string. Sanitized before parsing, rewritten by scoping.
    pub query: String,
    /// Offset of the first hit to materialize.
    pub start: usize,
    /// Maximum number of hits to materialize.
    pub page_size: usize,
    /// Named sortable field, or None for relevance ordering.
    pub sort_by: Option<String>,
    pub sort_order: SortOrder,
    /// Display threshold echoed through to the result, not interpreted here.
    pub et_al: usize,
}

impl Default for QueryArgs {
    fn default() -> Self {
        Self {
            query: String::new(),
            start: 0,
            page_size: 10,
            sort_by: None,
            sort_order: SortOrder::default(),
            et_al: 0,
        }
    }
}

impl QueryArgs {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_start(mut self, start: usize) -> Self {
        self.start = start;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_sort(mut self, sort_by: impl Into<String>, sort_order: SortOrder) -> Self {
        self.sort_by = Some(sort_by.into());
        self.sort_order = sort_order;
        self
    }

    pub fn with_sort_order(mut self, sort_order: SortOrder) -> Self {
        self.sort_order = sort_order;
        self
    }

    pub fn with_et_al(mut self, et_al: usize) -> Self {
        self.et_al = et_al;
        self
    }
}

/// Caller-visible query failure, carried on the result instead of thrown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QueryErrorCode {
    /// An identifier field in an index record held non-numeric text.
    NumberFormat,
    /// The query string failed to parse.
    InvalidSearchString,
    /// The parsed query exceeded the configured boolean-clause limit.
    QueryTooBroad,
}

impl QueryErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NumberFormat => "number-format-exception",
            Self::InvalidSearchString => "invalid-search-string",
            Self::QueryTooBroad => "query-too-broad",
        }
    }
}

impl fmt::Display for QueryErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One page of query results.
///
/// The three hit vectors are parallel and always equal in length. When
/// `error` is set the vectors are empty and `hit_count` is zero; an error
/// never accompanies partial results.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryResults {
    pub hit_handles: Vec<String>,
    /// None marks a hit record missing its identifier.
    pub hit_ids: Vec<Option<u32>>,
    pub hit_types: Vec<ResourceType>,
    /// Total number of matches in the index, not just this page.
    pub hit_count: usize,
    pub start: usize,
    pub page_size: usize,
    pub et_al: usize,
    pub error: Option<QueryErrorCode>,
}

impl QueryResults {
    /// Empty results echoing the pagination fields of the arguments.
    pub fn for_args(args: &QueryArgs) -> Self {
        Self {
            start: args.start,
            page_size: args.page_size,
            et_al: args.et_al,
            ..Default::default()
        }
    }

    /// Number of hits materialized on this page.
    pub fn len(&self) -> usize {
        self.hit_handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hit_handles.is_empty()
    }

    /// Convert into an error result, discarding any accumulated hits.
    pub(crate) fn into_error(mut self, code: QueryErrorCode) -> Self {
        self.hit_handles.clear();
        self.hit_ids.clear();
        self.hit_types.clear();
        self.hit_count = 0;
        self.error = Some(code);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_type_codes() {
        assert_eq!(ResourceType::from_code(2), Some(ResourceType::Item));
        assert_eq!(ResourceType::from_code(3), Some(ResourceType::Collection));
        assert_eq!(ResourceType::from_code(4), Some(ResourceType::Community));
        assert_eq!(ResourceType::from_code(0), None);
        assert_eq!(ResourceType::from_code(999), None);
        assert_eq!(ResourceType::Community.code(), 4);
    }

    #[test]
    fn test_error_code_strings() {
        assert_eq!(QueryErrorCode::NumberFormat.as_str(), "number-format-exception");
        assert_eq!(
            QueryErrorCode::InvalidSearchString.as_str(),
            "invalid-search-string"
        );
        assert_eq!(QueryErrorCode::QueryTooBroad.as_str(), "query-too-broad");
    }

    #[test]
    fn test_into_error_discards_hits() {
        let mut results = QueryResults::default();
        results.hit_handles.push("123/1".to_string());
        results.hit_ids.push(Some(1));
        results.hit_types.push(ResourceType::Item);
        results.hit_count = 1;

        let results = results.into_error(QueryErrorCode::NumberFormat);
        assert!(results.is_empty());
        assert_eq!(results.hit_count, 0);
        assert_eq!(results.error, Some(QueryErrorCode::NumberFormat));
    }
}
