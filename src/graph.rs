//! # Dependency Graph
//!
//! Graph-mode manifests describe a [`Project`] whose `deps` lists reference
//! other components, optionally with nested `deps` of their own. This module
//! turns that description into a directed graph and orders it for `boot`.
//!
//! ## Construction
//!
//! 1.  The project itself is the first node.
//! 2.  Every dependency reference becomes a node, deduplicated by name: the
//!     first declaration of a name wins, later ones only contribute edges.
//! 3.  A dependency without its own `repoconfig` inherits the one of the
//!     component that declares it.
//! 4.  An edge runs from the declaring component to the dependency, labelled
//!     with its [`DependencyKind`].
//!
//! ## Ordering
//!
//! [`DependencyGraph::topological_order`] performs a depth-first post-order
//! traversal from the project node (then from any node not yet reached), so
//! every dependency is emitted before the components that depend on it. A
//! node reached again while it is still on the current path closes a cycle,
//! reported as [`Error::CycleDetected`] with the path spelled out.

use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::manifest::{ComponentRef, Project, RepoConfig};
use crate::source::ResolvedSource;
use crate::tree::WorkItem;

/// Dependency class of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyKind {
    Build,
    Runtime,
    Install,
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DependencyKind::Build => "build",
            DependencyKind::Runtime => "runtime",
            DependencyKind::Install => "install",
        };
        f.write_str(label)
    }
}

/// A component in the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub name: String,
    pub version: String,
    pub repo: String,
    pub repoconfig: Option<RepoConfig>,
}

impl GraphNode {
    fn from_ref(component: &ComponentRef, repoconfig: Option<RepoConfig>) -> Self {
        Self {
            name: component.name.clone(),
            version: component.version.clone(),
            repo: component.repo.clone(),
            repoconfig,
        }
    }

    /// The URL to clone: `repoconfig.base + repo`, or `repo` alone.
    pub fn clone_url(&self) -> String {
        match &self.repoconfig {
            Some(config) => format!("{}{}", config.base, self.repo),
            None => self.repo.clone(),
        }
    }

    /// The VCS type declared by the node's repoconfig, defaulting to git.
    pub fn vcs_type(&self) -> String {
        self.repoconfig
            .as_ref()
            .map(|config| config.vcs_type.clone())
            .filter(|vcs_type| !vcs_type.is_empty())
            .unwrap_or_else(|| crate::defaults::DEFAULT_VCS_TYPE.to_string())
    }

    /// Converts the node into a work item for the sync engine.
    pub fn work_item(&self) -> WorkItem {
        WorkItem::new(
            self.name.clone(),
            Some(ResolvedSource {
                url: self.clone_url(),
                version: self.version.clone(),
                vcs_type: self.vcs_type(),
            }),
        )
    }
}

/// A directed edge from a component to one of its dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencyEdge {
    pub from: usize,
    pub to: usize,
    pub kind: DependencyKind,
}

/// Directed dependency graph keyed by component name.
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    nodes: Vec<GraphNode>,
    index: HashMap<String, usize>,
    edges: Vec<DependencyEdge>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the graph for a project manifest.
    pub fn from_project(project: &Project) -> Self {
        let mut graph = Self::new();
        graph.add_node(GraphNode::from_ref(project, project.repoconfig.clone()));
        graph.add_deps_of(project, project.repoconfig.as_ref());
        log::debug!(
            "dependency graph for {}: {} nodes, {} edges",
            project.name,
            graph.nodes.len(),
            graph.edges.len()
        );
        graph
    }

    fn add_deps_of(&mut self, owner: &ComponentRef, owner_config: Option<&RepoConfig>) {
        let Some(deps) = &owner.deps else {
            return;
        };
        let classes = [
            (DependencyKind::Build, &deps.build),
            (DependencyKind::Runtime, &deps.runtime),
            (DependencyKind::Install, &deps.install),
        ];
        for (kind, refs) in classes {
            for dep in refs {
                let repoconfig = dep.repoconfig.clone().or_else(|| owner_config.cloned());
                if dep.repoconfig.is_none() && repoconfig.is_some() {
                    log::debug!("{} inherits repoconfig from {}", dep.name, owner.name);
                }
                self.add_node(GraphNode::from_ref(dep, repoconfig.clone()));
                // Both names were just inserted, so the lookup cannot miss.
                if let Err(e) = self.add_edge(&owner.name, &dep.name, kind) {
                    log::warn!("skipping edge {} -> {}: {}", owner.name, dep.name, e);
                }
                self.add_deps_of(dep, repoconfig.as_ref());
            }
        }
    }

    /// Inserts a node unless one with the same name exists. Returns its index.
    pub fn add_node(&mut self, node: GraphNode) -> usize {
        if let Some(&existing) = self.index.get(&node.name) {
            return existing;
        }
        let idx = self.nodes.len();
        self.index.insert(node.name.clone(), idx);
        self.nodes.push(node);
        idx
    }

    /// Adds an edge between two existing nodes. Duplicate edges are ignored.
    pub fn add_edge(&mut self, from: &str, to: &str, kind: DependencyKind) -> Result<()> {
        let from = self.lookup(from)?;
        let to = self.lookup(to)?;
        let edge = DependencyEdge { from, to, kind };
        if !self.edges.contains(&edge) {
            self.edges.push(edge);
        }
        Ok(())
    }

    fn lookup(&self, name: &str) -> Result<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownDependency {
                name: name.to_string(),
            })
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[DependencyEdge] {
        &self.edges
    }

    pub fn node(&self, name: &str) -> Option<&GraphNode> {
        self.index.get(name).map(|&idx| &self.nodes[idx])
    }

    /// Direct dependencies of `name` with their classes, in declaration order.
    pub fn dependencies_of(&self, name: &str) -> Vec<(&GraphNode, DependencyKind)> {
        let Some(&from) = self.index.get(name) else {
            return Vec::new();
        };
        self.edges
            .iter()
            .filter(|edge| edge.from == from)
            .map(|edge| (&self.nodes[edge.to], edge.kind))
            .collect()
    }

    /// Orders nodes so that every dependency precedes its dependents.
    pub fn topological_order(&self) -> Result<Vec<&GraphNode>> {
        let mut marks = vec![Mark::Unvisited; self.nodes.len()];
        let mut path = Vec::new();
        let mut order = Vec::with_capacity(self.nodes.len());

        for start in 0..self.nodes.len() {
            if marks[start] == Mark::Unvisited {
                self.visit(start, &mut marks, &mut path, &mut order)?;
            }
        }

        Ok(order.into_iter().map(|idx| &self.nodes[idx]).collect())
    }

    fn visit(
        &self,
        idx: usize,
        marks: &mut [Mark],
        path: &mut Vec<usize>,
        order: &mut Vec<usize>,
    ) -> Result<()> {
        match marks[idx] {
            Mark::Done => return Ok(()),
            Mark::OnPath => {
                let start = path.iter().position(|&p| p == idx).unwrap_or(0);
                let mut cycle: Vec<&str> = path[start..]
                    .iter()
                    .map(|&p| self.nodes[p].name.as_str())
                    .collect();
                cycle.push(self.nodes[idx].name.as_str());
                return Err(Error::CycleDetected {
                    cycle: cycle.join(" -> "),
                });
            }
            Mark::Unvisited => {}
        }

        marks[idx] = Mark::OnPath;
        path.push(idx);
        for edge in self.edges.iter().filter(|edge| edge.from == idx) {
            self.visit(edge.to, marks, path, order)?;
        }
        path.pop();
        marks[idx] = Mark::Done;
        order.push(idx);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnPath,
    Done,
}
