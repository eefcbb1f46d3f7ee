use regex::Regex;
use std::sync::LazyLock;

/// Sentinel substituted for empty input so the query parser never sees
/// syntactically empty text. It still parses as a term and matches nothing
/// a real document contains.
pub const EMPTY_QUERY: &str = "empty_query_string";

static HANDLE_URL_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*http://hdl\.handle\.net/").unwrap());
static HANDLE_SHORT_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*hdl:").unwrap());
static LEADING_WILDCARD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\*").unwrap());
static WILDCARD_AFTER_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s\*").unwrap());
static WILDCARD_AFTER_PAREN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(\*").unwrap());
static WILDCARD_AFTER_COLON: LazyLock<Regex> = LazyLock::new(|| Regex::new(r":\*").unwrap());
static INTERSPERSED_DASH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" - ").unwrap());

/// Rewrite an untrusted query string into one the query parser will accept.
///
/// The steps run in a fixed order: empty-query substitution, handle-prefix
/// stripping, leading-wildcard stripping, interspersed-dash removal. Pure and
/// total, and idempotent on its own output.
pub fn sanitize(raw: &str) -> String {
    let query = check_empty_query(raw);
    let query = strip_handle_prefix(&query);
    let query = strip_wildcards(&query);
    strip_interspersed_dash(&query)
}

/// Replace empty input (or the literal `()`) with the sentinel term.
pub(crate) fn check_empty_query(query: &str) -> String {
    if query.is_empty() || query == "()" {
        EMPTY_QUERY.to_string()
    } else {
        query.to_string()
    }
}

/// Drop a leading handle URL or `hdl:` prefix, leaving the bare identifier.
pub(crate) fn strip_handle_prefix(query: &str) -> String {
    let query = HANDLE_URL_PREFIX.replace(query, "");
    HANDLE_SHORT_PREFIX.replace(&query, "").into_owned()
}

/// Remove a `*` wildcard where the parser cannot accept one: at the start of
/// the string, after whitespace, after an open parenthesis, or after a field
/// qualifier colon. A wildcard inside a term is left alone.
pub(crate) fn strip_wildcards(query: &str) -> String {
    let query = LEADING_WILDCARD.replace(query, "");
    let query = WILDCARD_AFTER_SPACE.replace_all(&query, " ");
    let query = WILDCARD_AFTER_PAREN.replace_all(&query, "(");
    WILDCARD_AFTER_COLON.replace_all(&query, ":").into_owned()
}

/// Collapse a dash with whitespace on both sides to a single space. A dash
/// touching a term is a negation operator and survives.
pub(crate) fn strip_interspersed_dash(query: &str) -> String {
    INTERSPERSED_DASH.replace_all(query, " ").into_owned()
}
