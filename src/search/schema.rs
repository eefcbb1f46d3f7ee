use anyhow::{Context, Result};
use tantivy::Index;
use tantivy::schema::{FAST, Field, INDEXED, STORED, STRING, Schema, TEXT};

/// Catch-all text field the indexing pipeline writes searchable text into.
pub const DEFAULT_FIELD: &str = "default";
/// Persistent handle of the indexed entity.
pub const HANDLE_FIELD: &str = "handle";
/// Numeric entity id, stored as text so a malformed record is representable.
pub const RESOURCE_ID_FIELD: &str = "resource_id";
/// Resource type code, a fast field so it can drive the primary sort.
pub const RESOURCE_TYPE_FIELD: &str = "resource_type";
/// Containment terms of the form `l<collection-id>` / `m<community-id>`.
pub const LOCATION_FIELD: &str = "location";
/// Standard sortable date field populated by the indexing pipeline.
pub const SORT_DATE_FIELD: &str = "sort_date";

/// Fast-field name for a named sort option.
pub fn sort_field_name(option: &str) -> String {
    format!("sort_{option}")
}

/// Field bindings for the repository index schema.
#[derive(Clone, Debug)]
pub struct RepositorySchema {
    pub schema: Schema,
    pub default: Field,
    pub handle: Field,
    pub resource_id: Field,
    pub resource_type: Field,
    pub location: Field,
    pub sort_date: Field,
}

impl RepositorySchema {
    /// Build the canonical schema. The indexing pipeline creates indexes with
    /// this schema; it may register further `sort_*` fast fields of its own.
    pub fn new() -> Self {
        let mut builder = Schema::builder();

        let default = builder.add_text_field(DEFAULT_FIELD, TEXT);
        let handle = builder.add_text_field(HANDLE_FIELD, STRING | STORED);
        let resource_id = builder.add_text_field(RESOURCE_ID_FIELD, STRING | STORED);
        let resource_type = builder.add_u64_field(RESOURCE_TYPE_FIELD, INDEXED | STORED | FAST);
        let location = builder.add_text_field(LOCATION_FIELD, STRING);
        let sort_date = builder.add_u64_field(SORT_DATE_FIELD, STORED | FAST);

        let schema = builder.build();

        Self {
            schema,
            default,
            handle,
            resource_id,
            resource_type,
            location,
            sort_date,
        }
    }

    /// Resolve the field bindings against an already-opened index.
    pub fn for_index(index: &Index) -> Result<Self> {
        let schema = index.schema();
        let field = |name: &str| {
            schema
                .get_field(name)
                .with_context(|| format!("Index is missing the {name} field"))
        };

        Ok(Self {
            default: field(DEFAULT_FIELD)?,
            handle: field(HANDLE_FIELD)?,
            resource_id: field(RESOURCE_ID_FIELD)?,
            resource_type: field(RESOURCE_TYPE_FIELD)?,
            location: field(LOCATION_FIELD)?,
            sort_date: field(SORT_DATE_FIELD)?,
            schema,
        })
    }
}

impl Default for RepositorySchema {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_creation() {
        let schema = RepositorySchema::new();

        assert!(schema.schema.get_field(DEFAULT_FIELD).is_ok());
        assert!(schema.schema.get_field(HANDLE_FIELD).is_ok());
        assert!(schema.schema.get_field(RESOURCE_ID_FIELD).is_ok());
        assert!(schema.schema.get_field(RESOURCE_TYPE_FIELD).is_ok());
        assert!(schema.schema.get_field(LOCATION_FIELD).is_ok());
        assert!(schema.schema.get_field(SORT_DATE_FIELD).is_ok());
    }

    #[test]
    fn test_for_index_roundtrip() {
        let canonical = RepositorySchema::new();
        let index = Index::create_in_ram(canonical.schema.clone());
        let resolved = RepositorySchema::for_index(&index).unwrap();

        assert_eq!(resolved.default, canonical.default);
        assert_eq!(resolved.handle, canonical.handle);
        assert_eq!(resolved.resource_type, canonical.resource_type);
    }

    #[test]
    fn test_sort_field_name() {
        assert_eq!(sort_field_name("date"), "sort_date");
        assert_eq!(sort_field_name("title"), "sort_title");
    }
}
