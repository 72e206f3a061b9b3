//! crates/index/src/tree.rs
//! Arena storage for index trees.
//!
//! Nodes live in a flat `Vec` and refer to each other by [`NodeId`]. Ownership
//! flows from the arena only: parent links are plain ids written by
//! [`TreeBuilder`] once the owning node exists, so no reference cycle can form.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use checksums::StrongSum;

use crate::node::{Block, Dir, File, Node, NodeId, NodeKind};

#[derive(Clone, Debug)]
struct Slot {
    node: Node,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Incrementally assembles an [`IndexTree`] bottom-up.
///
/// Children are pushed first; pushing the owner links them to it. A builder
/// can be rolled back to an earlier [`len`](Self::len) with
/// [`truncate`](Self::truncate), which decoders use to discard partially
/// decoded subtrees.
#[derive(Clone, Debug, Default)]
pub struct TreeBuilder {
    slots: Vec<Slot>,
}

impl TreeBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes pushed so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` when no nodes have been pushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the node stored at `id`, if any.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.0).map(|slot| &slot.node)
    }

    /// Drops every node pushed after the builder had `len` nodes.
    ///
    /// Links from surviving nodes into the dropped range are cleared as well,
    /// so the builder is observably identical to its state at `len`.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.slots.len() {
            return;
        }
        self.slots.truncate(len);
        for slot in &mut self.slots {
            if slot.parent.is_some_and(|parent| parent.0 >= len) {
                slot.parent = None;
            }
        }
    }

    /// Pushes a block with no owner yet.
    pub fn push_block(&mut self, block: Block) -> NodeId {
        self.push(Node::Block(block), Vec::new())
    }

    /// Pushes a file owning `blocks`, in file order.
    ///
    /// # Panics
    ///
    /// Panics if any id in `blocks` is not an unowned block pushed into this
    /// builder.
    pub fn push_file(&mut self, file: File, blocks: Vec<NodeId>) -> NodeId {
        self.assert_orphans(&blocks, NodeKind::Block);
        self.push(Node::File(file), blocks)
    }

    /// Pushes a directory owning `dirs` and `files`.
    ///
    /// Children are stored sub-directories first, then files, each group
    /// ordered by name.
    ///
    /// # Panics
    ///
    /// Panics if any id in `dirs` or `files` is not an unowned node of the
    /// matching kind pushed into this builder.
    pub fn push_dir(&mut self, dir: Dir, mut dirs: Vec<NodeId>, mut files: Vec<NodeId>) -> NodeId {
        self.assert_orphans(&dirs, NodeKind::Dir);
        self.assert_orphans(&files, NodeKind::File);
        dirs.sort_by(|a, b| self.name_of(*a).cmp(&self.name_of(*b)));
        files.sort_by(|a, b| self.name_of(*a).cmp(&self.name_of(*b)));
        dirs.append(&mut files);
        self.push(Node::Dir(dir), dirs)
    }

    /// Consumes the builder, producing a tree rooted at `root`.
    ///
    /// # Panics
    ///
    /// Panics if `root` was not pushed into this builder or is a block.
    #[must_use]
    pub fn finish(self, root: NodeId) -> IndexTree {
        assert!(
            matches!(self.kind_of(root), Some(NodeKind::File | NodeKind::Dir)),
            "tree root must be a pushed file or directory"
        );
        IndexTree {
            slots: self.slots,
            root,
        }
    }

    fn assert_orphans(&self, ids: &[NodeId], kind: NodeKind) {
        for id in ids {
            let slot = self.slots.get(id.0);
            assert!(
                slot.is_some_and(|slot| slot.node.kind() == kind),
                "child {} is not a pushed {kind}",
                id.0
            );
            assert!(
                slot.is_some_and(|slot| slot.parent.is_none()),
                "child {} already has a parent",
                id.0
            );
        }
    }

    fn push(&mut self, node: Node, children: Vec<NodeId>) -> NodeId {
        let id = NodeId(self.slots.len());
        for child in &children {
            if let Some(slot) = self.slots.get_mut(child.0) {
                slot.parent = Some(id);
            }
        }
        self.slots.push(Slot {
            node,
            parent: None,
            children,
        });
        id
    }

    fn kind_of(&self, id: NodeId) -> Option<NodeKind> {
        self.node(id).map(Node::kind)
    }

    fn name_of(&self, id: NodeId) -> Option<&str> {
        self.node(id).and_then(Node::name)
    }
}

/// Immutable content-addressed tree rooted at a directory or a single file.
#[derive(Clone)]
pub struct IndexTree {
    slots: Vec<Slot>,
    root: NodeId,
}

impl IndexTree {
    /// Returns the root node.
    #[must_use]
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            tree: self,
            id: self.root,
        }
    }

    /// Returns the root id.
    #[must_use]
    pub const fn root_id(&self) -> NodeId {
        self.root
    }

    /// Returns the node at `id`, if it exists in this tree.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_>> {
        (id.0 < self.slots.len()).then_some(NodeRef { tree: self, id })
    }

    /// Number of nodes in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Always `false`; a tree has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterates nodes reachable from the root in pre-order.
    ///
    /// Directory children are visited sub-directories first, then files;
    /// file children (blocks) are visited in file order.
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder {
            tree: self,
            stack: vec![self.root],
        }
    }

    /// Iterates reachable files in pre-order.
    pub fn files(&self) -> impl Iterator<Item = NodeRef<'_>> {
        self.iter().filter(|node| node.kind() == NodeKind::File)
    }

    /// Number of reachable files.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files().count()
    }

    /// Number of reachable blocks.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.iter()
            .filter(|node| node.kind() == NodeKind::Block)
            .count()
    }

    /// Number of reachable directories, including a directory root.
    #[must_use]
    pub fn dir_count(&self) -> usize {
        self.iter().filter(|node| node.kind() == NodeKind::Dir).count()
    }

    /// Path of `id` relative to the directory the tree was indexed from.
    ///
    /// A directory root maps to the empty path; a file root maps to its own
    /// name. Blocks resolve to their owning file's path.
    #[must_use]
    pub fn rel_path(&self, id: NodeId) -> Option<PathBuf> {
        let mut names = Vec::new();
        let mut current = self.get(id)?;
        if current.kind() == NodeKind::Block {
            current = current.parent()?;
        }

        loop {
            match current.parent() {
                Some(parent) => {
                    names.extend(current.name());
                    current = parent;
                }
                None => {
                    if current.kind() == NodeKind::File {
                        names.extend(current.name());
                    }
                    break;
                }
            }
        }

        Some(names.iter().rev().collect())
    }

    /// Looks up a file or directory by its path relative to the tree base.
    #[must_use]
    pub fn find(&self, rel_path: &Path) -> Option<NodeRef<'_>> {
        let mut components = rel_path
            .components()
            .filter(|component| !matches!(component, Component::CurDir));
        let root = self.root();

        let mut current = match root.kind() {
            NodeKind::File => {
                let name = components.next()?;
                if components.next().is_some() || name.as_os_str() != root.name()? {
                    return None;
                }
                return Some(root);
            }
            _ => root,
        };

        for component in components {
            let Component::Normal(name) = component else {
                return None;
            };
            current = current
                .children()
                .find(|child| child.kind() != NodeKind::Block && child.name() == name.to_str())?;
        }

        Some(current)
    }
}

impl fmt::Debug for IndexTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexTree")
            .field("root", &self.root())
            .field("nodes", &self.slots.len())
            .finish()
    }
}

impl PartialEq for IndexTree {
    fn eq(&self, other: &Self) -> bool {
        self.root().same_content(&other.root())
    }
}

/// Borrowed view of one node together with its tree.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a IndexTree,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    fn slot(&self) -> &'a Slot {
        &self.tree.slots[self.id.0]
    }

    /// Arena id of this node.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// Tree the node belongs to.
    #[must_use]
    pub const fn tree(&self) -> &'a IndexTree {
        self.tree
    }

    /// Node payload.
    #[must_use]
    pub fn node(&self) -> &'a Node {
        &self.slot().node
    }

    /// Variant discriminant.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.node().kind()
    }

    /// Strong checksum of the node content.
    #[must_use]
    pub fn strong(&self) -> StrongSum {
        self.node().strong()
    }

    /// Entry name for files and directories.
    #[must_use]
    pub fn name(&self) -> Option<&'a str> {
        self.node().name()
    }

    /// Owning node; `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.slot().parent.map(|id| Self {
            tree: self.tree,
            id,
        })
    }

    /// Child nodes in stored order. Empty for blocks.
    pub fn children(&self) -> impl ExactSizeIterator<Item = NodeRef<'a>> + use<'a> {
        let tree = self.tree;
        self.slot()
            .children
            .iter()
            .map(move |&id| NodeRef { tree, id })
    }

    /// Sub-directories of a directory, by name.
    pub fn dirs(&self) -> impl Iterator<Item = NodeRef<'a>> + use<'a> {
        self.children().filter(|child| child.kind() == NodeKind::Dir)
    }

    /// Files of a directory, or an empty iterator for other kinds.
    pub fn files(&self) -> impl Iterator<Item = NodeRef<'a>> + use<'a> {
        self.children().filter(|child| child.kind() == NodeKind::File)
    }

    /// Blocks of a file in file order.
    pub fn blocks(&self) -> impl Iterator<Item = NodeRef<'a>> + use<'a> {
        self.children().filter(|child| child.kind() == NodeKind::Block)
    }

    /// Block payload, when this node is a block.
    #[must_use]
    pub fn as_block(&self) -> Option<&'a Block> {
        match self.node() {
            Node::Block(block) => Some(block),
            _ => None,
        }
    }

    /// File payload, when this node is a file.
    #[must_use]
    pub fn as_file(&self) -> Option<&'a File> {
        match self.node() {
            Node::File(file) => Some(file),
            _ => None,
        }
    }

    /// Directory payload, when this node is a directory.
    #[must_use]
    pub fn as_dir(&self) -> Option<&'a Dir> {
        match self.node() {
            Node::Dir(dir) => Some(dir),
            _ => None,
        }
    }

    /// Byte range `(offset, len)` of a block within its owning file.
    #[must_use]
    pub fn block_range(&self) -> Option<(u64, u64)> {
        let block = self.as_block()?;
        let file = self.parent()?.as_file()?;
        Some((block.offset(), block.len_in(file.size())))
    }

    /// Path relative to the tree base; see [`IndexTree::rel_path`].
    #[must_use]
    pub fn rel_path(&self) -> Option<PathBuf> {
        self.tree.rel_path(self.id)
    }

    /// Compares payloads and child structure recursively, ignoring arena ids.
    #[must_use]
    pub fn same_content(&self, other: &NodeRef<'_>) -> bool {
        self.node() == other.node()
            && self.children().len() == other.children().len()
            && self
                .children()
                .zip(other.children())
                .all(|(a, b)| a.same_content(&b))
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("NodeRef");
        debug.field("id", &self.id.0).field("kind", &self.kind());
        if let Some(name) = self.name() {
            debug.field("name", &name);
        }
        debug.field("strong", &self.strong()).finish()
    }
}

/// Pre-order iterator returned by [`IndexTree::iter`].
#[derive(Debug)]
pub struct PreOrder<'a> {
    tree: &'a IndexTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let children = &self.tree.slots[id.0].children;
        self.stack.extend(children.iter().rev());
        Some(NodeRef {
            tree: self.tree,
            id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checksums::strong::Sha1;

    fn sample() -> IndexTree {
        let strong = Sha1::digest(b"x");
        let mut builder = TreeBuilder::new();
        let b0 = builder.push_block(Block::new(0, 1, Sha1::digest(b"b0")));
        let b1 = builder.push_block(Block::new(1, 2, Sha1::digest(b"b1")));
        let zeta = builder.push_file(File::new("zeta.txt", 0o644, strong, 9000), vec![b0, b1]);
        let alpha = builder.push_file(File::new("alpha.txt", 0o644, strong, 0), Vec::new());
        let inner = builder.push_file(File::new("inner.txt", 0o600, strong, 0), Vec::new());
        let sub = builder.push_dir(Dir::new("sub", 0o755, strong), Vec::new(), vec![inner]);
        let root = builder.push_dir(Dir::new("top", 0o755, strong), vec![sub], vec![zeta, alpha]);
        builder.finish(root)
    }

    #[test]
    #[should_panic(expected = "is not a pushed block")]
    fn file_with_unpushed_block_panics() {
        let mut builder = TreeBuilder::new();
        builder.push_file(File::new("a", 0o644, Sha1::digest(b"a"), 1), vec![NodeId(3)]);
    }

    #[test]
    #[should_panic(expected = "is not a pushed dir")]
    fn dir_with_file_in_dir_slot_panics() {
        let strong = Sha1::digest(b"a");
        let mut builder = TreeBuilder::new();
        let file = builder.push_file(File::new("a", 0o644, strong, 0), Vec::new());
        builder.push_dir(Dir::new("d", 0o755, strong), vec![file], Vec::new());
    }

    #[test]
    #[should_panic(expected = "already has a parent")]
    fn shared_block_panics() {
        let strong = Sha1::digest(b"a");
        let mut builder = TreeBuilder::new();
        let block = builder.push_block(Block::new(0, 1, strong));
        builder.push_file(File::new("a", 0o644, strong, 1), vec![block]);
        builder.push_file(File::new("b", 0o644, strong, 1), vec![block]);
    }

    #[test]
    fn truncated_parent_frees_children() {
        let strong = Sha1::digest(b"a");
        let mut builder = TreeBuilder::new();
        let block = builder.push_block(Block::new(0, 1, strong));
        builder.push_file(File::new("a", 0o644, strong, 1), vec![block]);
        builder.truncate(1);

        let file = builder.push_file(File::new("b", 0o644, strong, 1), vec![block]);
        let tree = builder.finish(file);
        assert_eq!(tree.root().blocks().count(), 1);
    }

    #[test]
    fn dir_children_are_dirs_then_sorted_files() {
        let tree = sample();
        let names: Vec<_> = tree.root().children().filter_map(|c| c.name()).collect();
        assert_eq!(names, ["sub", "alpha.txt", "zeta.txt"]);
    }

    #[test]
    fn parents_link_upwards() {
        let tree = sample();
        let zeta = tree.find(Path::new("zeta.txt")).expect("zeta");
        let block = zeta.blocks().nth(1).expect("second block");
        assert_eq!(block.parent().map(|p| p.id()), Some(zeta.id()));
        assert_eq!(zeta.parent().map(|p| p.id()), Some(tree.root_id()));
        assert!(tree.root().parent().is_none());
    }

    #[test]
    fn rel_path_excludes_dir_root_name() {
        let tree = sample();
        let inner = tree.find(Path::new("sub/inner.txt")).expect("inner");
        assert_eq!(inner.rel_path(), Some(PathBuf::from("sub/inner.txt")));
        assert_eq!(tree.root().rel_path(), Some(PathBuf::new()));
    }

    #[test]
    fn rel_path_of_block_is_owning_file() {
        let tree = sample();
        let zeta = tree.find(Path::new("zeta.txt")).expect("zeta");
        let block = zeta.blocks().next().expect("block");
        assert_eq!(block.rel_path(), Some(PathBuf::from("zeta.txt")));
        assert_eq!(block.block_range(), Some((0, 8192)));
        assert_eq!(zeta.blocks().nth(1).and_then(|b| b.block_range()), Some((8192, 808)));
    }

    #[test]
    fn file_root_rel_path_is_its_name() {
        let mut builder = TreeBuilder::new();
        let block = builder.push_block(Block::new(0, 0, Sha1::digest(b"a")));
        let file =
            builder.push_file(File::new("one.bin", 0o644, Sha1::digest(b"a"), 1), vec![block]);
        let tree = builder.finish(file);
        assert_eq!(tree.root().rel_path(), Some(PathBuf::from("one.bin")));
        assert_eq!(tree.find(Path::new("one.bin")).map(|n| n.id()), Some(file));
        assert!(tree.find(Path::new("other.bin")).is_none());
    }

    #[test]
    fn counts_cover_reachable_nodes() {
        let tree = sample();
        assert_eq!(tree.file_count(), 3);
        assert_eq!(tree.block_count(), 2);
        assert_eq!(tree.dir_count(), 2);
        assert_eq!(tree.iter().count(), tree.len());
    }

    #[test]
    fn truncate_discards_links_into_dropped_range() {
        let mut builder = TreeBuilder::new();
        let block = builder.push_block(Block::new(0, 0, Sha1::digest(b"a")));
        let checkpoint = builder.len();
        builder.push_file(File::new("f", 0, Sha1::digest(b"a"), 1), vec![block]);
        builder.truncate(checkpoint);
        assert_eq!(builder.len(), checkpoint);
        let file = builder.push_file(File::new("g", 0, Sha1::digest(b"a"), 1), vec![block]);
        let tree = builder.finish(file);
        assert_eq!(tree.root().blocks().count(), 1);
    }

    #[test]
    fn find_rejects_parent_components() {
        let tree = sample();
        assert!(tree.find(Path::new("../zeta.txt")).is_none());
        assert!(tree.find(Path::new("missing")).is_none());
        assert_eq!(tree.find(Path::new("sub")).map(|n| n.kind()), Some(NodeKind::Dir));
    }
}
