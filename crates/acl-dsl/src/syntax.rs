//! The syntax tree produced by the parser.
//!
//! Nodes live in an arena indexed by [`NodeId`]. IDs are handed out in
//! creation order starting with the root at `0`, so iterating a node's
//! children by ID visits them in source order.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::Range;

/// Tree-wide node identifier. The root is `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Classification of a syntax node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxKind {
    /// A reserved keyword statement.
    Command,
    /// A `{`-opened group under a non-reserved word.
    Grouping,
    /// A `{`-opened group under a reserved keyword.
    GroupingCommand,
    /// A plain `key: value` statement.
    Value,
}

impl SyntaxKind {
    /// The grouping form of this kind.
    pub fn grouped(self) -> Self {
        match self {
            Self::Command | Self::GroupingCommand => Self::GroupingCommand,
            Self::Value | Self::Grouping => Self::Grouping,
        }
    }

    /// Whether nodes of this kind take children.
    pub fn is_grouping(self) -> bool {
        matches!(self, Self::Grouping | Self::GroupingCommand)
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Command => "command",
            Self::Grouping => "grouping",
            Self::GroupingCommand => "grouping_command",
            Self::Value => "value",
        };
        write!(f, "{name}")
    }
}

/// What a statement said.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxData {
    /// Node classification.
    pub kind: SyntaxKind,
    /// Nesting depth. A grouping records the depth in effect before it opened.
    pub depth: usize,
    /// Text before the first `:`, trimmed.
    pub keyword: String,
    /// Up to two raw argument fragments.
    pub arguments: Vec<String>,
}

/// A node of the [`SyntaxTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    id: NodeId,
    /// The node's content.
    pub data: SyntaxData,
    parent: Option<NodeId>,
    children: BTreeSet<NodeId>,
    min_child: Option<NodeId>,
    max_child: Option<NodeId>,
    span: Range<usize>,
}

impl SyntaxNode {
    /// The node's ID.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The node this one is attached to. `None` for the root and for
    /// nodes not yet attached.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// IDs of direct children, ascending.
    pub fn child_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children.iter().copied()
    }

    /// Smallest child ID seen.
    pub fn min_child(&self) -> Option<NodeId> {
        self.min_child
    }

    /// Largest child ID seen.
    pub fn max_child(&self) -> Option<NodeId> {
        self.max_child
    }

    /// Byte range of the statement that produced the node.
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }
}

/// Arena of syntax nodes rooted at node `0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    nodes: Vec<SyntaxNode>,
}

impl Default for SyntaxTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxTree {
    /// A tree holding only the root grouping.
    pub fn new() -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.create_node(
            SyntaxData {
                kind: SyntaxKind::Grouping,
                depth: 0,
                keyword: String::new(),
                arguments: Vec::new(),
            },
            0..0,
        );
        tree
    }

    /// The root node's ID.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Create an unattached node with the next ID.
    pub fn create_node(&mut self, data: SyntaxData, span: Range<usize>) -> NodeId {
        let id = NodeId(self.nodes.len() as u64);
        self.nodes.push(SyntaxNode {
            id,
            data,
            parent: None,
            children: BTreeSet::new(),
            min_child: None,
            max_child: None,
            span,
        });
        id
    }

    /// Attach `child` under `parent`. Unknown IDs are ignored.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        if self.get(parent).is_none() {
            return;
        }
        let Some(node) = self.get_mut(child) else {
            return;
        };
        node.parent = Some(parent);
        tracing::trace!(%child, %parent, "adding child");

        if let Some(node) = self.get_mut(parent) {
            node.children.insert(child);
            node.min_child = Some(node.min_child.map_or(child, |m| m.min(child)));
            node.max_child = Some(node.max_child.map_or(child, |m| m.max(child)));
        }
    }

    /// Look up a node.
    pub fn get(&self, id: NodeId) -> Option<&SyntaxNode> {
        usize::try_from(id.0).ok().and_then(|i| self.nodes.get(i))
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut SyntaxNode> {
        usize::try_from(id.0).ok().and_then(|i| self.nodes.get_mut(i))
    }

    /// Direct children of `id`, in ID order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &SyntaxNode> {
        self.get(id)
            .into_iter()
            .flat_map(|n| n.children.iter())
            .filter_map(|c| self.get(*c))
    }

    /// Number of nodes besides the root.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - 1
    }

    /// All nodes in ID order, root first.
    pub fn nodes(&self) -> impl Iterator<Item = &SyntaxNode> {
        self.nodes.iter()
    }

    /// Render the subtree at `id`:
    /// `<id> <keyword>(<kind>): {\n<tabs><child>, <child>, }`.
    ///
    /// Every ID between the smallest and largest child is visited; IDs that are
    /// not direct children are skipped.
    pub fn render(&self, id: NodeId) -> String {
        let Some(node) = self.get(id) else {
            return String::new();
        };
        let mut children = String::new();
        if let (Some(min), Some(max)) = (node.min_child, node.max_child) {
            for raw in min.0..=max.0 {
                let child = NodeId(raw);
                if !node.children.contains(&child) {
                    tracing::debug!(node = %id, %child, "no child with this ID");
                    continue;
                }
                children.push_str(&self.render(child));
                children.push_str(", ");
            }
        }
        let tabs = "\t".repeat(node.data.depth);
        format!(
            "{} {}({}): {{\n{tabs}{children}}}",
            node.id, node.data.keyword, node.data.kind
        )
    }
}

impl fmt::Display for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render(self.root()))
    }
}
