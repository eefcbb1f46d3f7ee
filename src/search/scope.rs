use super::results::QueryArgs;
use super::sanitize::check_empty_query;

/// Location term prefix for collection scoping.
pub const COLLECTION_PREFIX: char = 'l';
/// Location term prefix for community scoping.
pub const COMMUNITY_PREFIX: char = 'm';

/// Rewrite the query so results are restricted to members of a collection.
pub fn scope_to_collection(args: &mut QueryArgs, collection_id: u32) {
    scope(args, COLLECTION_PREFIX, collection_id);
}

/// Rewrite the query so results are restricted to members of a community.
pub fn scope_to_community(args: &mut QueryArgs, community_id: u32) {
    scope(args, COMMUNITY_PREFIX, community_id);
}

fn scope(args: &mut QueryArgs, prefix: char, id: u32) {
    // Empty-query substitution first, so scoping an empty query still yields
    // a parseable filtered query.
    let base = check_empty_query(&args.query);
    args.query = format!("+({base}) +location:\"{prefix}{id}\"");
}
