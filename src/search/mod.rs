// Module declarations
pub mod executor;
pub mod handle_cache;
pub mod results;
pub mod sanitize;
pub mod schema;
pub mod scope;

// Re-export public APIs
pub use executor::QueryExecutor;
pub use handle_cache::{IndexHandle, IndexHandleCache, VersionStamp};
pub use results::{QueryArgs, QueryErrorCode, QueryResults, ResourceType, SortOrder};
pub use sanitize::sanitize;
pub use schema::RepositorySchema;
pub use scope::{scope_to_collection, scope_to_community};
