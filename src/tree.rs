//! ASCII tree rendering for declared dependencies.

use crate::manifest::{DependencyKind, Manifest};

const ROOT_LABEL: &str = "Installed dependencies";
const EMPTY_LABEL: &str = "No dependencies installed";

/// A labelled node with nested children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub label: String,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
        }
    }

    pub fn branch(label: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            label: label.into(),
            children,
        }
    }
}

fn section_label(kind: DependencyKind) -> &'static str {
    match kind {
        DependencyKind::Production => "Dependencies",
        DependencyKind::Development => "DevDependencies",
    }
}

/// Build the dependency tree: one section per non-empty table, one leaf per
/// package as `name (specifier)`.
pub fn dependency_tree(manifest: &Manifest) -> TreeNode {
    let sections = [DependencyKind::Production, DependencyKind::Development]
        .into_iter()
        .filter(|kind| !manifest.entries(*kind).is_empty())
        .map(|kind| {
            let leaves = manifest
                .entries(kind)
                .iter()
                .map(|(name, version)| TreeNode::leaf(format!("{} ({})", name, version)))
                .collect();
            TreeNode::branch(section_label(kind), leaves)
        })
        .collect();

    TreeNode::branch(ROOT_LABEL, sections)
}

/// Render the declared dependencies of `manifest`.
///
/// Example output:
/// ```text
/// Installed dependencies
/// ├── Dependencies
/// │   ├── left-pad (^1.3.0)
/// │   └── lodash (^4.17.21)
/// └── DevDependencies
///     └── jest (^29.0.0)
/// ```
pub fn render_dependencies(manifest: &Manifest) -> String {
    if manifest.is_empty() {
        return format!("{}\n", EMPTY_LABEL);
    }
    render_tree(&[dependency_tree(manifest)])
}

/// Render nodes as ASCII art. Roots are printed bare, descendants with
/// branch characters.
pub fn render_tree(nodes: &[TreeNode]) -> String {
    let mut output = String::new();
    for node in nodes {
        output.push_str(&node.label);
        output.push('\n');
        render_children(&mut output, &node.children, "");
    }
    output
}

fn render_children(output: &mut String, children: &[TreeNode], prefix: &str) {
    for (i, child) in children.iter().enumerate() {
        let is_last = i == children.len() - 1;
        let branch = if is_last { "└── " } else { "├── " };
        output.push_str(prefix);
        output.push_str(branch);
        output.push_str(&child.label);
        output.push('\n');

        let continuation = if is_last { "    " } else { "│   " };
        render_children(output, &child.children, &format!("{}{}", prefix, continuation));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(json: &str) -> Manifest {
        Manifest::parse(json).expect("valid manifest")
    }

    #[test]
    fn test_single_root() {
        let output = render_tree(&[TreeNode::leaf("Root")]);
        assert_eq!(output, "Root\n");
    }

    #[test]
    fn test_nested_children() {
        let tree = TreeNode::branch(
            "Root",
            vec![
                TreeNode::branch("A", vec![TreeNode::leaf("A1"), TreeNode::leaf("A2")]),
                TreeNode::leaf("B"),
            ],
        );
        let output = render_tree(&[tree]);
        assert_eq!(output, "Root\n├── A\n│   ├── A1\n│   └── A2\n└── B\n");
    }

    #[test]
    fn test_both_sections() {
        let output = render_dependencies(&manifest(
            r#"{"dependencies":{"lodash":"^4.17.21","left-pad":"^1.3.0"},"devDependencies":{"jest":"^29.0.0"}}"#,
        ));
        let expected = "Installed dependencies\n├── Dependencies\n│   ├── left-pad (^1.3.0)\n│   └── lodash (^4.17.21)\n└── DevDependencies\n    └── jest (^29.0.0)\n";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_empty_section_is_omitted() {
        let output = render_dependencies(&manifest(r#"{"devDependencies":{"jest":"^29.0.0"}}"#));
        assert_eq!(output, "Installed dependencies\n└── DevDependencies\n    └── jest (^29.0.0)\n");
    }

    #[test]
    fn test_no_dependencies() {
        assert_eq!(render_dependencies(&manifest("{}")), "No dependencies installed\n");
    }
}
