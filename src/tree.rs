//! # Component Tree
//!
//! A manifest's nested `components` lists are copied into an index-addressed
//! arena. Each [`ComponentNode`] knows its parent and its ordered children by
//! [`NodeId`], so the tree can be walked in either direction without shared
//! ownership.
//!
//! [`ComponentTree::flatten`] produces the pre-order linearization: a node is
//! immediately followed by its whole subtree, siblings keep manifest order.
//! [`ComponentTree::work_list`] turns that order into the [`WorkItem`]s the
//! sync engine, the command executor and the bulk git operations consume. The
//! root (the manifest itself) never appears in a work list.

use crate::manifest::ComponentDescriptor;
use crate::source::ResolvedSource;

/// Index of a node in a [`ComponentTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One component in the arena.
#[derive(Debug, Clone)]
pub struct ComponentNode {
    /// The descriptor with its `components` list emptied; children live in
    /// `children` instead.
    pub descriptor: ComponentDescriptor,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// 0 for the root, 1 for top-level components, and so on.
    pub depth: usize,
}

/// A unit of work derived from a non-root node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub id: NodeId,
    /// Effective name, also the directory name under the workspace root.
    pub name: String,
    /// `None` for grouping nodes without a source.
    pub source: Option<ResolvedSource>,
    pub depth: usize,
    pub description: Option<String>,
}

impl WorkItem {
    /// Builds an item outside of any tree, e.g. for graph-mode nodes.
    pub fn new(name: impl Into<String>, source: Option<ResolvedSource>) -> Self {
        Self {
            id: NodeId(0),
            name: name.into(),
            source,
            depth: 1,
            description: None,
        }
    }

    /// The version requested for this item, empty when none.
    pub fn version(&self) -> &str {
        self.source.as_ref().map(|s| s.version.as_str()).unwrap_or("")
    }
}

/// Arena-backed component tree.
#[derive(Debug, Clone)]
pub struct ComponentTree {
    nodes: Vec<ComponentNode>,
}

impl ComponentTree {
    /// Copies a descriptor tree into a new arena. The root gets [`NodeId`] 0.
    pub fn from_root(root: &ComponentDescriptor) -> Self {
        let mut nodes: Vec<ComponentNode> = Vec::new();
        let mut stack: Vec<(&ComponentDescriptor, Option<NodeId>, usize)> = vec![(root, None, 0)];

        while let Some((descriptor, parent, depth)) = stack.pop() {
            let id = NodeId(nodes.len());
            nodes.push(ComponentNode {
                descriptor: ComponentDescriptor {
                    name: descriptor.name.clone(),
                    source: descriptor.source.clone(),
                    version: descriptor.version.clone(),
                    description: descriptor.description.clone(),
                    components: Vec::new(),
                },
                parent,
                children: Vec::with_capacity(descriptor.components.len()),
                depth,
            });
            if let Some(parent) = parent {
                nodes[parent.0].children.push(id);
            }
            // Reverse so the first child is popped (and attached) first.
            for child in descriptor.components.iter().rev() {
                stack.push((child, Some(id), depth + 1));
            }
        }

        Self { nodes }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn get(&self, id: NodeId) -> Option<&ComponentNode> {
        self.nodes.get(id.0)
    }

    /// Total number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Ordered children of a node.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|node| node.parent)
    }

    /// Effective names from the first top-level ancestor down to `id`.
    pub fn path_names(&self, id: NodeId) -> Vec<String> {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let Some(node) = self.get(node_id) else { break };
            if node.parent.is_none() {
                break;
            }
            names.push(node.descriptor.effective_name());
            current = node.parent;
        }
        names.reverse();
        names
    }

    /// All node ids in pre-order, root first.
    pub fn flatten(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        if self.nodes.is_empty() {
            return order;
        }
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            order.push(id);
            for child in self.children(id).iter().rev() {
                stack.push(*child);
            }
        }
        order
    }

    /// Pre-order work items for every node except the root.
    pub fn work_list(&self) -> Vec<WorkItem> {
        self.flatten()
            .into_iter()
            .filter(|id| *id != self.root())
            .filter_map(|id| {
                let node = self.get(id)?;
                Some(WorkItem {
                    id,
                    name: node.descriptor.effective_name(),
                    source: node.descriptor.resolved(),
                    depth: node.depth,
                    description: node.descriptor.description.clone(),
                })
            })
            .collect()
    }
}
