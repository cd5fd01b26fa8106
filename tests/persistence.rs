use quire::document::{self, BlockId, BlockKind, BlockStore, ContentBlock, Document, TemplateSet};

fn sample() -> Document {
    let mut document = Document::new(
        "Academic Notes",
        vec![
            ContentBlock::new(BlockId(1), BlockKind::Heading, "## Lecture 3"),
            ContentBlock::new(BlockId(2), BlockKind::Math, "$\\int_0^1 x^2 dx$"),
            ContentBlock::new(BlockId(7), BlockKind::Code, "fn main() {}").with_language("rust"),
        ],
    );
    document
        .variables
        .insert("course".to_string(), "Analysis".to_string());
    document
}

#[test]
fn test_save_and_load_preserves_blocks_and_variables() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lecture.quire");
    let mut original = sample();

    document::save(&mut original, &path).unwrap();
    let loaded = document::load(&path).unwrap();

    assert_eq!(loaded, original);
    assert_eq!(loaded.blocks[2].language.as_deref(), Some("rust"));
    assert_eq!(loaded.variables.get("course").map(String::as_str), Some("Analysis"));
}

#[test]
fn test_store_save_clears_modified_and_continues_ids() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lecture.quire");

    let mut store = BlockStore::new(sample());
    store.append(BlockKind::Text, "closing remarks");
    assert!(store.is_modified());
    store.save_to(&path).unwrap();
    assert!(!store.is_modified());

    let mut reopened = BlockStore::new(document::load(&path).unwrap());
    assert_eq!(reopened.len(), 4);
    let id = reopened.append(BlockKind::Text, "");
    assert!(reopened.blocks()[..4].iter().all(|b| b.id < id));
}

#[test]
fn test_malformed_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.quire");
    std::fs::write(&path, "{\"version\": \"1.0\", \"content\": [").unwrap();

    let err = document::load(&path).unwrap_err();
    assert!(err.to_string().contains("not a valid document"));
}

#[test]
fn test_missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = document::load(&dir.path().join("absent.quire")).unwrap_err();
    assert!(matches!(err, document::DocumentError::Io { .. }));
}

#[test]
fn test_failed_save_leaves_previous_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lecture.quire");
    let mut original = sample();
    document::save(&mut original, &path).unwrap();
    let before = std::fs::read_to_string(&path).unwrap();

    let mut other = sample();
    let target = dir.path().join("missing-dir").join("lecture.quire");
    assert!(document::save(&mut other, &target).is_err());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn test_every_template_survives_a_save() {
    let dir = tempfile::tempdir().unwrap();
    for (i, template) in TemplateSet::builtin().all().iter().enumerate() {
        let path = dir.path().join(format!("t{i}.quire"));
        let mut doc = template.instantiate();
        document::save(&mut doc, &path).unwrap();
        let loaded = document::load(&path).unwrap();
        assert_eq!(loaded.template, template.name);
        assert_eq!(loaded.blocks.len(), doc.blocks.len());
    }
}
