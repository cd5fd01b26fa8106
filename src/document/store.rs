use chrono::Utc;
use thiserror::Error;
use tracing::debug;

use super::types::{BlockId, BlockKind, ContentBlock, Document};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("block index {index} out of range (document has {len} blocks)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("a document must keep at least one block")]
    SoleBlock,
}

/// Owns the ordered blocks of one document and the current-block cursor.
///
/// Mutating operations reject out-of-range indices; only navigation clamps.
/// Ids come from a monotonically increasing counter so they stay unique
/// across any sequence of inserts and deletes.
#[derive(Debug, Clone)]
pub struct BlockStore {
    document: Document,
    current: usize,
    next_id: u64,
    modified: bool,
}

impl BlockStore {
    /// Wrap a document. An empty document receives one blank text block.
    pub fn new(mut document: Document) -> Self {
        let mut next_id = document.max_id().map_or(1, |id| id.0 + 1);
        if document.blocks.is_empty() {
            document
                .blocks
                .push(ContentBlock::new(BlockId(next_id), BlockKind::Text, ""));
            next_id += 1;
        }
        Self {
            document,
            current: 0,
            next_id,
            modified: false,
        }
    }

    pub const fn document(&self) -> &Document {
        &self.document
    }

    pub fn blocks(&self) -> &[ContentBlock] {
        &self.document.blocks
    }

    pub fn len(&self) -> usize {
        self.document.blocks.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.document.blocks.is_empty()
    }

    pub const fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &ContentBlock {
        &self.document.blocks[self.current]
    }

    pub const fn is_modified(&self) -> bool {
        self.modified
    }

    pub const fn mark_saved(&mut self) {
        self.modified = false;
    }

    /// Persist the document to `path` and clear the modified flag.
    ///
    /// On failure the flag is left set.
    pub fn save_to(&mut self, path: &std::path::Path) -> Result<(), super::DocumentError> {
        super::persist::save(&mut self.document, path)?;
        self.mark_saved();
        Ok(())
    }

    pub fn get(&self, index: usize) -> Result<&ContentBlock, StoreError> {
        self.document
            .blocks
            .get(index)
            .ok_or(StoreError::IndexOutOfRange {
                index,
                len: self.len(),
            })
    }

    /// Move the cursor by `delta`, clamped to the valid range.
    pub fn navigate(&mut self, delta: isize) {
        let last = self.len().saturating_sub(1);
        self.current = self.current.saturating_add_signed(delta).min(last);
    }

    /// Place the cursor at `index`, clamped to the valid range.
    pub fn select(&mut self, index: usize) {
        self.current = index.min(self.len().saturating_sub(1));
    }

    fn allocate_id(&mut self) -> BlockId {
        let id = BlockId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Append a new block at the end; it becomes current.
    pub fn append(&mut self, kind: BlockKind, content: impl Into<String>) -> BlockId {
        let id = self.allocate_id();
        self.document
            .blocks
            .push(ContentBlock::new(id, kind, content));
        self.current = self.len() - 1;
        self.touch();
        debug!(%id, ?kind, index = self.current, "block appended");
        id
    }

    /// Insert a new block before `index` (`index == len` appends); it becomes current.
    pub fn insert_at(
        &mut self,
        index: usize,
        kind: BlockKind,
        content: impl Into<String>,
    ) -> Result<BlockId, StoreError> {
        if index > self.len() {
            return Err(StoreError::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        let id = self.allocate_id();
        self.document
            .blocks
            .insert(index, ContentBlock::new(id, kind, content));
        self.current = index;
        self.touch();
        debug!(%id, ?kind, index, "block inserted");
        Ok(id)
    }

    /// Remove the block at `index`, keeping the cursor on a valid block.
    ///
    /// The last remaining block can never be removed.
    pub fn delete_at(&mut self, index: usize) -> Result<ContentBlock, StoreError> {
        self.check_index(index)?;
        if self.len() == 1 {
            return Err(StoreError::SoleBlock);
        }
        let removed = self.document.blocks.remove(index);
        if self.current > index || self.current >= self.len() {
            self.current = self.current.saturating_sub(1);
        }
        self.touch();
        debug!(id = %removed.id, index, "block deleted");
        Ok(removed)
    }

    pub fn set_content(&mut self, index: usize, text: impl Into<String>) -> Result<(), StoreError> {
        self.check_index(index)?;
        self.document.blocks[index].content = text.into();
        self.touch();
        Ok(())
    }

    /// Change the type tag only; content and id are preserved.
    pub fn convert_type(&mut self, index: usize, kind: BlockKind) -> Result<(), StoreError> {
        self.check_index(index)?;
        let block = &mut self.document.blocks[index];
        if block.kind != kind {
            debug!(id = %block.id, from = ?block.kind, to = ?kind, "block converted");
            block.kind = kind;
            self.touch();
        }
        Ok(())
    }

    pub fn set_language(&mut self, index: usize, language: Option<String>) -> Result<(), StoreError> {
        self.check_index(index)?;
        self.document.blocks[index].language = language;
        self.touch();
        Ok(())
    }

    /// Flip the numbering flag; returns the new value.
    pub fn toggle_numbered(&mut self, index: usize) -> Result<bool, StoreError> {
        self.check_index(index)?;
        let block = &mut self.document.blocks[index];
        block.numbered = !block.numbered;
        let numbered = block.numbered;
        self.touch();
        Ok(numbered)
    }

    /// Remember the committed preview on the block itself.
    pub fn set_rendered(&mut self, index: usize, preview: String) -> Result<(), StoreError> {
        self.check_index(index)?;
        let block = &mut self.document.blocks[index];
        block.rendered = Some(preview);
        block.rendered_at = Some(Utc::now());
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), StoreError> {
        if index < self.len() {
            Ok(())
        } else {
            Err(StoreError::IndexOutOfRange {
                index,
                len: self.len(),
            })
        }
    }

    fn touch(&mut self) {
        self.modified = true;
        self.document.modified = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(contents: &[&str]) -> BlockStore {
        let blocks = contents
            .iter()
            .enumerate()
            .map(|(i, c)| ContentBlock::new(BlockId(i as u64 + 1), BlockKind::Text, *c))
            .collect();
        BlockStore::new(Document::new("custom", blocks))
    }

    #[test]
    fn test_empty_document_gets_one_block() {
        let store = BlockStore::new(Document::new("custom", Vec::new()));
        assert_eq!(store.len(), 1);
        assert_eq!(store.current().kind, BlockKind::Text);
    }

    #[test]
    fn test_append_becomes_current() {
        let mut store = store_with(&["a", "b"]);
        store.append(BlockKind::Text, "c");
        assert_eq!(store.current_index(), 2);
        assert_eq!(store.current().content, "c");
        assert!(store.is_modified());
    }

    #[test]
    fn test_ids_stay_unique_after_delete_and_append() {
        let mut store = store_with(&["a", "b", "c"]);
        store.delete_at(1).unwrap();
        let id = store.append(BlockKind::Text, "d");
        let ids: Vec<_> = store.blocks().iter().map(|b| b.id).collect();
        assert_eq!(ids.iter().filter(|i| **i == id).count(), 1);
        assert_eq!(id, BlockId(4));
    }

    #[test]
    fn test_delete_sole_block_is_rejected() {
        let mut store = store_with(&["only"]);
        assert_eq!(store.delete_at(0), Err(StoreError::SoleBlock));
        assert_eq!(store.len(), 1);
        assert_eq!(store.current().content, "only");
        assert!(!store.is_modified());
    }

    #[test]
    fn test_delete_last_moves_cursor_back() {
        let mut store = store_with(&["a", "b", "c"]);
        store.select(2);
        store.delete_at(2).unwrap();
        assert_eq!(store.current_index(), 1);
    }

    #[test]
    fn test_delete_before_cursor_keeps_same_block_current() {
        let mut store = store_with(&["a", "b", "c"]);
        store.select(2);
        store.delete_at(0).unwrap();
        assert_eq!(store.current().content, "c");
    }

    #[test]
    fn test_mutations_reject_out_of_range() {
        let mut store = store_with(&["a"]);
        assert_eq!(
            store.set_content(3, "x"),
            Err(StoreError::IndexOutOfRange { index: 3, len: 1 })
        );
        assert!(store.convert_type(1, BlockKind::Math).is_err());
        assert!(store.delete_at(5).is_err());
        assert!(store.insert_at(2, BlockKind::Text, "x").is_err());
    }

    #[test]
    fn test_insert_at_shifts_following_blocks() {
        let mut store = store_with(&["a", "c"]);
        store.insert_at(1, BlockKind::Text, "b").unwrap();
        let contents: Vec<_> = store.blocks().iter().map(|b| b.content.as_str()).collect();
        assert_eq!(contents, ["a", "b", "c"]);
        assert_eq!(store.current_index(), 1);
    }

    #[test]
    fn test_convert_type_preserves_content() {
        let mut store = store_with(&["x^2"]);
        store.convert_type(0, BlockKind::Math).unwrap();
        assert_eq!(store.current().kind, BlockKind::Math);
        assert_eq!(store.current().content, "x^2");
    }

    #[test]
    fn test_navigate_clamps() {
        let mut store = store_with(&["a", "b"]);
        store.navigate(-3);
        assert_eq!(store.current_index(), 0);
        store.navigate(10);
        assert_eq!(store.current_index(), 1);
    }

    #[test]
    fn test_loaded_document_continues_id_sequence() {
        let blocks = vec![
            ContentBlock::new(BlockId(7), BlockKind::Text, "a"),
            ContentBlock::new(BlockId(3), BlockKind::Text, "b"),
        ];
        let mut store = BlockStore::new(Document::new("custom", blocks));
        assert_eq!(store.append(BlockKind::Text, "c"), BlockId(8));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn cursor_always_valid(
                ops in proptest::collection::vec((0..4u8, -5..5isize), 0..60),
            ) {
                let mut store = store_with(&["seed"]);
                for (op, arg) in ops {
                    match op {
                        0 => { store.append(BlockKind::Text, "x"); }
                        1 => { let _ = store.delete_at(store.current_index()); }
                        2 => store.navigate(arg),
                        _ => { let _ = store.delete_at(arg.unsigned_abs()); }
                    }
                    prop_assert!(store.len() >= 1);
                    prop_assert!(store.current_index() < store.len());
                }
            }
        }
    }
}
