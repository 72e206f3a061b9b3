//! crates/index/src/block_index.rs
//! Strong-sum lookup over a completed tree.

use std::sync::Arc;

use checksums::StrongSum;
use rustc_hash::FxHashMap;

use crate::node::{NodeId, NodeKind};
use crate::tree::{IndexTree, NodeRef};

/// Maps strong checksums to the blocks and files that carry them.
///
/// Built once from a finished [`IndexTree`] and never updated; a changed tree
/// needs a new index. Files with identical content stay separate entries, so
/// [`files_with`](Self::files_with) can return every path holding the content.
#[derive(Clone)]
pub struct BlockIndex {
    tree: Arc<IndexTree>,
    blocks: FxHashMap<StrongSum, Vec<NodeId>>,
    files: FxHashMap<StrongSum, Vec<NodeId>>,
}

impl BlockIndex {
    /// Visits every reachable block and file of `tree`.
    #[must_use]
    pub fn new(tree: Arc<IndexTree>) -> Self {
        let mut blocks: FxHashMap<StrongSum, Vec<NodeId>> = FxHashMap::default();
        let mut files: FxHashMap<StrongSum, Vec<NodeId>> = FxHashMap::default();

        for node in tree.iter() {
            match node.kind() {
                NodeKind::Block => blocks.entry(node.strong()).or_default().push(node.id()),
                NodeKind::File => files.entry(node.strong()).or_default().push(node.id()),
                NodeKind::Dir => {}
            }
        }

        logging::trace_index!(
            debug,
            blocks = blocks.len(),
            files = files.len(),
            "block index built"
        );

        Self {
            tree,
            blocks,
            files,
        }
    }

    /// Tree the index was built from.
    #[must_use]
    pub fn tree(&self) -> &IndexTree {
        &self.tree
    }

    /// Shared handle to the indexed tree.
    #[must_use]
    pub fn shared_tree(&self) -> Arc<IndexTree> {
        Arc::clone(&self.tree)
    }

    /// First block, in tree order, whose content hashes to `strong`.
    #[must_use]
    pub fn strong_block(&self, strong: &StrongSum) -> Option<NodeRef<'_>> {
        self.blocks_with(strong).next()
    }

    /// First file, in tree order, whose content hashes to `strong`.
    #[must_use]
    pub fn strong_file(&self, strong: &StrongSum) -> Option<NodeRef<'_>> {
        self.files_with(strong).next()
    }

    /// Every block whose content hashes to `strong`.
    pub fn blocks_with(&self, strong: &StrongSum) -> impl Iterator<Item = NodeRef<'_>> {
        self.lookup(&self.blocks, strong)
    }

    /// Every file whose content hashes to `strong`.
    pub fn files_with(&self, strong: &StrongSum) -> impl Iterator<Item = NodeRef<'_>> {
        self.lookup(&self.files, strong)
    }

    /// Number of distinct block checksums.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Number of file entries, counting duplicate content separately.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }

    fn lookup<'a>(
        &'a self,
        map: &'a FxHashMap<StrongSum, Vec<NodeId>>,
        strong: &StrongSum,
    ) -> impl Iterator<Item = NodeRef<'a>> + use<'a> {
        map.get(strong)
            .into_iter()
            .flatten()
            .filter_map(|id| self.tree.get(*id))
    }
}

impl std::fmt::Debug for BlockIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockIndex")
            .field("root", &self.tree.root().strong())
            .field("blocks", &self.blocks.len())
            .field("files", &self.file_count())
            .finish()
    }
}

impl From<IndexTree> for BlockIndex {
    fn from(tree: IndexTree) -> Self {
        Self::new(Arc::new(tree))
    }
}
