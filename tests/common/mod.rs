use std::path::Path;
use tantivy::{Index, TantivyDocument};

use repo_search::search::RepositorySchema;

const WRITER_HEAP_SIZE: usize = 50_000_000;

/// One fixture document for the test index.
pub struct TestDoc {
    pub handle: &'static str,
    pub resource_id: &'static str,
    pub resource_type: u64,
    pub text: &'static str,
    pub locations: &'static [&'static str],
    pub sort_date: u64,
}

/// A small repository: one community and one collection about dogs, three
/// dog items spread over two collections, and one unrelated item.
pub fn corpus() -> Vec<TestDoc> {
    vec![
        TestDoc {
            handle: "123456789/1",
            resource_id: "1",
            resource_type: 2,
            text: "a brown dog sleeping",
            locations: &["l1", "m1"],
            sort_date: 2001,
        },
        TestDoc {
            handle: "123456789/2",
            resource_id: "2",
            resource_type: 2,
            text: "a black dog and a cat",
            locations: &["l1", "m1"],
            sort_date: 2003,
        },
        TestDoc {
            handle: "123456789/3",
            resource_id: "3",
            resource_type: 2,
            text: "a dog running through fields",
            locations: &["l2", "m1"],
            sort_date: 2002,
        },
        TestDoc {
            handle: "123456789/10",
            resource_id: "1",
            resource_type: 3,
            text: "dog pictures collection",
            locations: &["m1"],
            sort_date: 0,
        },
        TestDoc {
            handle: "123456789/20",
            resource_id: "1",
            resource_type: 4,
            text: "the dog community",
            locations: &[],
            sort_date: 0,
        },
        TestDoc {
            handle: "123456789/4",
            resource_id: "4",
            resource_type: 2,
            text: "a treatise on cats",
            locations: &["l2", "m1"],
            sort_date: 1999,
        },
    ]
}

/// Create an index at `dir` holding the given documents.
pub fn build_index(dir: &Path, docs: &[TestDoc]) {
    let schema = RepositorySchema::new();
    let index = Index::create_in_dir(dir, schema.schema.clone()).unwrap();
    write_docs(&index, &schema, docs);
}

/// Add documents to an existing index, committing a new generation.
pub fn append_docs(dir: &Path, docs: &[TestDoc]) {
    let index = Index::open_in_dir(dir).unwrap();
    let schema = RepositorySchema::for_index(&index).unwrap();
    write_docs(&index, &schema, docs);
}

fn write_docs(index: &Index, schema: &RepositorySchema, docs: &[TestDoc]) {
    let mut writer = index.writer(WRITER_HEAP_SIZE).unwrap();
    for doc in docs {
        let mut document = TantivyDocument::default();
        document.add_text(schema.default, doc.text);
        document.add_text(schema.handle, doc.handle);
        document.add_text(schema.resource_id, doc.resource_id);
        document.add_u64(schema.resource_type, doc.resource_type);
        document.add_u64(schema.sort_date, doc.sort_date);
        for location in doc.locations {
            document.add_text(schema.location, location);
        }
        writer.add_document(document).unwrap();
    }
    writer.commit().unwrap();
}
