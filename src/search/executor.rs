use anyhow::Result;
use std::sync::Arc;
use tantivy::collector::{Count, ScoreSegmentTweaker, ScoreTweaker, TopDocs};
use tantivy::columnar::Column;
use tantivy::query::{Query, QueryParser};
use tantivy::schema::Value;
use tantivy::{DocAddress, DocId, Score, Searcher, SegmentReader, TantivyDocument};
use tracing::{debug, error, warn};

use crate::config::{DefaultOperator, SearchConfig};

use super::handle_cache::IndexHandleCache;
use super::results::{QueryArgs, QueryErrorCode, QueryResults, ResourceType, SortOrder};
use super::sanitize::sanitize;
use super::schema::{RESOURCE_TYPE_FIELD, sort_field_name};
use super::scope;

/// Composite ranking key: resource type (descending, so higher-priority
/// types surface first), then the requested secondary key, then a relevance
/// tiebreak. TopDocs returns the largest keys first.
type SortKey = (u64, f64, Score);

/// Executes queries against the repository index: sanitization, parsing,
/// sorted execution with relevance fallback, result windowing, and error
/// classification.
pub struct QueryExecutor {
    config: SearchConfig,
    cache: Arc<IndexHandleCache>,
}

impl std::fmt::Debug for QueryExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryExecutor")
            .field("config", &self.config)
            .finish()
    }
}

impl QueryExecutor {
    /// Create an executor with its own handle cache over the configured index.
    pub fn new(config: SearchConfig) -> Self {
        let cache = Arc::new(IndexHandleCache::new(config.index_dir.clone()));
        Self { config, cache }
    }

    /// Create an executor sharing an existing handle cache.
    pub fn with_cache(config: SearchConfig, cache: Arc<IndexHandleCache>) -> Self {
        Self { config, cache }
    }

    pub fn cache(&self) -> &Arc<IndexHandleCache> {
        &self.cache
    }

    /// Run a query and return one windowed page of results.
    ///
    /// Query-level failures (unparsable string, too many clauses, malformed
    /// id in an index record) come back as an error code on the results, not
    /// as an `Err`. Only an unreadable index is a hard failure.
    pub fn execute(&self, args: &QueryArgs) -> Result<QueryResults> {
        let querystring = sanitize(&args.query);
        let mut results = QueryResults::for_args(args);

        let handle = self.cache.acquire()?;
        let schema = handle.schema();

        let mut parser = QueryParser::for_index(handle.index(), vec![schema.default]);
        if self.config.default_operator == DefaultOperator::And {
            parser.set_conjunction_by_default();
        }
        debug!("final query string: {querystring}");

        let query = match parser.parse_query(&querystring) {
            Ok(query) => query,
            Err(err) => {
                warn!("invalid search string {querystring:?}: {err}");
                return Ok(results.into_error(QueryErrorCode::InvalidSearchString));
            }
        };

        let clauses = clause_count(query.as_ref());
        if clauses > self.config.max_clauses {
            warn!(
                "query too broad: {clauses} clauses exceed the limit of {}",
                self.config.max_clauses
            );
            return Ok(results.into_error(QueryErrorCode::QueryTooBroad));
        }

        let searcher = handle.searcher();
        // TopDocs rejects a zero limit; the window below stays empty anyway.
        let limit = (args.start + args.page_size).max(1);

        let (total, ranked) = match self.search_sorted(&searcher, query.as_ref(), args, limit) {
            Ok(hits) => hits,
            Err(err) => {
                // The index may be unable to sort on the requested field.
                // Fall back to plain relevancy; a failure of the fallback
                // itself propagates.
                error!(
                    "unable to use requested sort option {}: {err}",
                    args.sort_by.as_deref().unwrap_or("type/relevance")
                );
                let (total, top_docs) =
                    searcher.search(query.as_ref(), &(Count, TopDocs::with_limit(limit)))?;
                let ranked = top_docs.into_iter().map(|(_score, addr)| addr).collect();
                (total, ranked)
            }
        };

        results.hit_count = total;

        // Snip out the requested window. A start past the end is zero hits,
        // not an error.
        if args.start >= total {
            return Ok(results);
        }
        let to_process = (total - args.start).min(args.page_size);

        for doc_address in ranked.into_iter().skip(args.start).take(to_process) {
            let doc: TantivyDocument = searcher.doc(doc_address)?;

            let type_code = doc
                .get_first(schema.resource_type)
                .and_then(|value| value.as_u64());
            let Some(resource_type) = type_code.and_then(ResourceType::from_code) else {
                warn!("dropping hit with unrecognized resource type {type_code:?}");
                continue;
            };

            let hit_handle = doc
                .get_first(schema.handle)
                .and_then(|value| value.as_str())
                .unwrap_or("")
                .to_string();

            let hit_id = match doc
                .get_first(schema.resource_id)
                .and_then(|value| value.as_str())
            {
                None => None,
                Some(raw) => match raw.parse::<u32>() {
                    Ok(id) => Some(id),
                    Err(err) => {
                        warn!("non-numeric resource id {raw:?} in index record: {err}");
                        return Ok(results.into_error(QueryErrorCode::NumberFormat));
                    }
                },
            };

            results.hit_types.push(resource_type);
            results.hit_handles.push(hit_handle);
            results.hit_ids.push(hit_id);
        }

        Ok(results)
    }

    /// Run a query restricted to members of a collection.
    pub fn execute_in_collection(
        &self,
        args: &mut QueryArgs,
        collection_id: u32,
    ) -> Result<QueryResults> {
        scope::scope_to_collection(args, collection_id);
        self.execute(args)
    }

    /// Run a query restricted to members of a community.
    pub fn execute_in_community(
        &self,
        args: &mut QueryArgs,
        community_id: u32,
    ) -> Result<QueryResults> {
        scope::scope_to_community(args, community_id);
        self.execute(args)
    }

    /// Release the cached index handle. Safe to call repeatedly.
    pub fn close(&self) {
        self.cache.close_all();
    }

    fn search_sorted(
        &self,
        searcher: &Searcher,
        query: &dyn Query,
        args: &QueryArgs,
        limit: usize,
    ) -> tantivy::Result<(usize, Vec<DocAddress>)> {
        let tweaker = TypedSortTweaker {
            type_field: RESOURCE_TYPE_FIELD.to_string(),
            sort_field: args.sort_by.as_deref().map(sort_field_name),
            descending: args.sort_order == SortOrder::Descending,
        };
        let collector = TopDocs::with_limit(limit).tweak_score(tweaker);
        let (total, top_docs) = searcher.search(query, &(Count, collector))?;
        let ranked = top_docs.into_iter().map(|(_key, addr)| addr).collect();
        Ok((total, ranked))
    }
}

/// Count the boolean clauses a parsed query expands to.
fn clause_count(query: &dyn Query) -> usize {
    let mut clauses = 0;
    query.query_terms(&mut |_term, _need_positions| clauses += 1);
    clauses
}

/// Score tweaker producing the composite [`SortKey`].
///
/// Resolving the sort column happens per segment and fails if the field is
/// not a usable fast field, which is what lets an unusable sort option
/// surface as a catchable search error.
struct TypedSortTweaker {
    type_field: String,
    sort_field: Option<String>,
    descending: bool,
}

impl ScoreTweaker<SortKey> for TypedSortTweaker {
    type Child = TypedSortSegmentTweaker;

    fn segment_tweaker(&self, segment_reader: &SegmentReader) -> tantivy::Result<Self::Child> {
        let type_column = segment_reader.fast_fields().u64(&self.type_field)?;
        let sort_column = self
            .sort_field
            .as_deref()
            .map(|name| segment_reader.fast_fields().u64(name))
            .transpose()?;
        Ok(TypedSortSegmentTweaker {
            type_column,
            sort_column,
            descending: self.descending,
        })
    }
}

struct TypedSortSegmentTweaker {
    type_column: Column<u64>,
    sort_column: Option<Column<u64>>,
    descending: bool,
}

impl ScoreSegmentTweaker<SortKey> for TypedSortSegmentTweaker {
    fn score(&mut self, doc: DocId, score: Score) -> SortKey {
        let type_code = self.type_column.first(doc).unwrap_or(0);
        match &self.sort_column {
            Some(column) => {
                // Named sort field, relevance as the tiebreak.
                let value = column.first(doc).unwrap_or(0) as f64;
                let value = if self.descending { value } else { -value };
                (type_code, value, score)
            }
            None => {
                let relevance = if self.descending { score } else { -score };
                (type_code, f64::from(relevance), 0.0)
            }
        }
    }
}
