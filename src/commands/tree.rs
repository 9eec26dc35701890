//! # Tree Command Implementation
//!
//! This module implements the `tree` subcommand, which displays the component
//! tree declared in the manifest in a hierarchical format.
//!
//! ## Functionality
//!
//! - **Component Tree Visualization**: Displays nested components as declared
//! - **Depth Control**: Supports `--depth` flag to limit tree depth
//! - **Version Display**: Shows the version each component resolves to
//!
//! This command is a safe, read-only operation that does not modify any files
//! and never invokes git.

use anyhow::Result;
use clap::Args;
use ptree::{print_tree, TreeItem};
use std::path::PathBuf;

use monhang::defaults::DEFAULT_MANIFEST_FILENAME;
use monhang::tree::{ComponentTree, NodeId};

/// Display the component tree
#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Path to the manifest file.
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "MONHANG_CONFIG",
        default_value = DEFAULT_MANIFEST_FILENAME
    )]
    pub config: PathBuf,

    /// Maximum depth to display in the tree.
    ///
    /// If not specified, displays the full tree.
    /// Use 0 to show only the manifest itself, 1 to show top-level components, etc.
    #[arg(long, value_name = "NUM")]
    pub depth: Option<usize>,
}

/// Execute the `tree` command.
///
/// Loads the manifest and prints its components, one line per component with
/// the version it resolves to.
pub fn execute(args: TreeArgs) -> Result<()> {
    let workspace = super::load_workspace(&args.config, None)?;
    let tree = &workspace.tree;

    let tree_root = build_tree_node(tree, tree.root(), args.depth.unwrap_or(usize::MAX));
    print_tree(&tree_root).map_err(|e| anyhow::anyhow!("Failed to display tree: {}", e))?;

    Ok(())
}

/// Build a display node for `id` and its descendants down to `max_depth`.
fn build_tree_node(tree: &ComponentTree, id: NodeId, max_depth: usize) -> TreeNode {
    let Some(node) = tree.get(id) else {
        return TreeNode {
            label: String::new(),
            children: vec![],
        };
    };
    let descriptor = &node.descriptor;

    let label = if node.parent.is_none() {
        descriptor.effective_name()
    } else {
        let version = descriptor
            .effective_version()
            .unwrap_or_else(|| "default branch".to_string());
        match descriptor.resolved() {
            Some(source) => format!("{} @ {} ({})", descriptor.effective_name(), version, source.url),
            None => descriptor.effective_name(),
        }
    };

    let children = if node.depth >= max_depth {
        vec![]
    } else {
        tree.children(id)
            .iter()
            .map(|child| build_tree_node(tree, *child, max_depth))
            .collect()
    };
    TreeNode { label, children }
}

/// Tree node structure for ptree visualization
#[derive(Clone)]
struct TreeNode {
    label: String,
    children: Vec<TreeNode>,
}

impl TreeItem for TreeNode {
    type Child = TreeNode;

    fn write_self<W: std::io::Write>(
        &self,
        f: &mut W,
        _style: &ptree::Style,
    ) -> std::io::Result<()> {
        write!(f, "{}", self.label)
    }

    fn children(&self) -> std::borrow::Cow<'_, [Self::Child]> {
        std::borrow::Cow::Borrowed(&self.children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use monhang::manifest::parse_json;

    fn sample_tree() -> ComponentTree {
        let root = parse_json(
            r#"{
                "name": "workspace",
                "components": [
                    {"source": "git://github.com/org/core.git?version=v1.0.0",
                     "components": [{"name": "plugin", "source": "https://github.com/org/plugin.git"}]},
                    {"name": "docs"}
                ]
            }"#,
        )
        .unwrap();
        ComponentTree::from_root(&root)
    }

    #[test]
    fn test_execute_missing_config() {
        let args = TreeArgs {
            config: PathBuf::from("/nonexistent/monhang.json"),
            depth: None,
        };

        let result = execute(args);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Manifest not found"));
    }

    #[test]
    fn test_labels_show_resolved_version() {
        let tree = sample_tree();
        let root = build_tree_node(&tree, tree.root(), usize::MAX);

        assert_eq!(root.label, "workspace");
        assert_eq!(
            root.children[0].label,
            "core @ v1.0.0 (https://github.com/org/core.git)"
        );
        assert_eq!(
            root.children[0].children[0].label,
            "plugin @ default branch (https://github.com/org/plugin.git)"
        );
        assert_eq!(root.children[1].label, "docs");
    }

    #[test]
    fn test_depth_limits_children() {
        let tree = sample_tree();

        let root = build_tree_node(&tree, tree.root(), 0);
        assert!(root.children.is_empty());

        let root = build_tree_node(&tree, tree.root(), 1);
        assert_eq!(root.children.len(), 2);
        assert!(root.children[0].children.is_empty());
    }
}
