use offthread::runtime::Scheduler;
use offthread::task::{DocumentTask, WorkState};
use offthread::xml::{Document, SharedDocument, path};
use offthread::{ConstructionError, WorkError};

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(tag: &str) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock drift")
        .as_nanos();

    std::env::temp_dir().join(format!("offthread-{tag}-{}-{unique}.tmp", std::process::id()))
}

const CATALOG: &str = concat!(
    "<catalog>",
    "<book id=\"bk101\"><author>X</author></book>",
    "<book id=\"bk102\"><author>Y</author></book>",
    "</catalog>",
);

#[test]
fn well_formed_text_populates_the_shared_document() {
    let path = temp_path("doc-load");
    std::fs::write(&path, CATALOG).unwrap();

    let sched = Scheduler::new();
    let doc = SharedDocument::new();
    let mut task = DocumentTask::new(path.to_string_lossy().into_owned(), doc.clone()).unwrap();

    sched.block_on(task.begin());

    assert_eq!(task.state(), WorkState::Completed);
    assert_eq!(task.content(), CATALOG);

    doc.with(|doc| {
        let root = doc.root().expect("parsed root");
        assert_eq!(doc.name(root), "catalog");

        let authors = path::query(doc, "//book/author").expect("valid expression");
        let texts: Vec<String> = authors.iter().map(|&id| doc.text(id)).collect();
        assert_eq!(texts, ["X", "Y"]);
    });

    let _ = std::fs::remove_file(path);
}

#[test]
fn serialization_round_trips_queryable_content() {
    let parsed = Document::parse(CATALOG).expect("well-formed");
    let reparsed = Document::parse(&parsed.to_xml_string()).expect("serialized output parses");

    let before = path::query(&parsed, "//book[@id='bk102']/author").expect("valid");
    let after = path::query(&reparsed, "//book[@id='bk102']/author").expect("valid");

    assert_eq!(before.len(), 1);
    assert_eq!(after.len(), 1);
    assert_eq!(parsed.text(before[0]), reparsed.text(after[0]));
}

#[test]
fn malformed_text_still_completes_and_leaves_the_document_alone() {
    let path = temp_path("doc-malformed");
    std::fs::write(&path, "<catalog><book></catalog>").unwrap();

    let sched = Scheduler::new();
    let doc = SharedDocument::new();
    let mut task = DocumentTask::new(path.to_string_lossy().into_owned(), doc.clone()).unwrap();

    sched.block_on(task.begin());

    // The parse failure is captured, not propagated.
    assert_eq!(task.state(), WorkState::Completed);
    assert!(matches!(task.outcome(), Some(Err(WorkError::Parse(_)))));
    assert!(doc.with(|doc| doc.root().is_none()));

    // The read succeeded before the parse failed, so the loaded text
    // stays observable.
    assert_eq!(task.content(), "<catalog><book></catalog>");

    let _ = std::fs::remove_file(path);
}

#[test]
fn missing_file_still_completes_with_an_untouched_document() {
    let sched = Scheduler::new();
    let doc = SharedDocument::new();
    let mut task = DocumentTask::new("missing.xml", doc.clone()).unwrap();

    sched.block_on(task.begin());

    assert_eq!(task.state(), WorkState::Completed);
    assert!(matches!(task.outcome(), Some(Err(WorkError::Io(_)))));
    assert!(doc.with(|doc| doc.root().is_none()));
}

#[test]
fn empty_path_fails_at_construction() {
    assert_eq!(
        DocumentTask::new("", SharedDocument::new()).err(),
        Some(ConstructionError::EmptyPath)
    );
}

#[test]
fn documents_can_be_edited_in_place_through_the_handle() {
    let sched = Scheduler::new();
    let doc = SharedDocument::from_document(Document::parse(CATALOG).expect("well-formed"));

    // Caller-side edit under the same lock the tasks use.
    doc.with_mut(|d| {
        let book = path::query_single(d, "//book[@id='bk101']")
            .expect("valid expression")
            .expect("one match");
        d.set_attribute(book, "status", "checked-out");
    });

    let mut task =
        offthread::task::QuerySingleTask::new(doc.clone(), "//book[@status='checked-out']")
            .unwrap();
    sched.block_on(task.begin());

    let node = task.node().expect("one match");
    assert_eq!(doc.with(|d| d.attribute(node, "id").to_string()), "bk101");
}

#[test]
fn built_documents_are_queryable_and_serializable() {
    let mut doc = Document::with_root("catalog");
    let root = doc.root().unwrap();

    let book = doc.create_element("book");
    doc.set_attribute(book, "id", "bk201");
    doc.append_child(root, book);

    let author = doc.create_element("author");
    let name = doc.create_text("Z");
    doc.append_child(author, name);
    doc.append_child(book, author);

    let found = path::query_single(&doc, "//book[@id='bk201']/author")
        .expect("valid expression")
        .expect("one match");
    assert_eq!(doc.text(found), "Z");

    let reparsed = Document::parse(&doc.to_xml_string()).expect("serialized output parses");
    let again = path::query_single(&reparsed, "//book[@id='bk201']/author")
        .expect("valid expression")
        .expect("one match");
    assert_eq!(reparsed.text(again), "Z");
}
