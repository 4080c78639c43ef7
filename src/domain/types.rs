//! Type hierarchy rooted at `object`.

use serde::{Deserialize, Serialize};

/// Name of the implicit root type.
pub const ROOT_TYPE: &str = "object";

/// A node in the type tree. The root of a well-formed hierarchy is `object`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeNode {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TypeNode>,
}

impl TypeNode {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            children: Vec::new(),
        }
    }

    /// An `object` root with no children.
    pub fn root() -> Self {
        Self::new(ROOT_TYPE, "Object is always root, everything is an object")
    }

    /// Builder-style child attachment.
    pub fn with_child(mut self, child: TypeNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn is_rooted(&self) -> bool {
        self.name == ROOT_TYPE
    }

    /// All type names in pre-order, root included.
    pub fn flatten(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_names(&mut out);
        out
    }

    fn collect_names(&self, out: &mut Vec<String>) {
        out.push(self.name.clone());
        for child in &self.children {
            child.collect_names(out);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.name == name || self.children.iter().any(|c| c.contains(name))
    }

    /// `(child, parent)` pairs in pre-order, used for the PDDL `:types` block.
    pub fn parent_pairs(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        self.collect_pairs(&mut out);
        out
    }

    fn collect_pairs(&self, out: &mut Vec<(String, String)>) {
        for child in &self.children {
            out.push((child.name.clone(), self.name.clone()));
            child.collect_pairs(out);
        }
    }

    /// Indented bullet rendering for prompts.
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        self.render_into(0, &mut lines);
        lines.join("\n")
    }

    fn render_into(&self, depth: usize, lines: &mut Vec<String>) {
        let indent = "    ".repeat(depth);
        if self.description.is_empty() {
            lines.push(format!("{}- {}", indent, self.name));
        } else {
            lines.push(format!("{}- {}: {}", indent, self.name, self.description));
        }
        for child in &self.children {
            child.render_into(depth + 1, lines);
        }
    }

    /// Keep only the named types. The root always survives; children of a
    /// dropped node are re-attached to the nearest kept ancestor.
    pub fn retain(&self, keep: &[String]) -> TypeNode {
        TypeNode {
            name: self.name.clone(),
            description: self.description.clone(),
            children: retain_children(&self.children, keep),
        }
    }
}

fn retain_children(children: &[TypeNode], keep: &[String]) -> Vec<TypeNode> {
    let mut out = Vec::new();
    for child in children {
        let kept = retain_children(&child.children, keep);
        if keep.iter().any(|k| k == &child.name) {
            out.push(TypeNode {
                name: child.name.clone(),
                description: child.description.clone(),
                children: kept,
            });
        } else {
            out.extend(kept);
        }
    }
    out
}

impl Default for TypeNode {
    fn default() -> Self {
        Self::root()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logistics() -> TypeNode {
        TypeNode::root()
            .with_child(
                TypeNode::new("vehicle", "moves packages")
                    .with_child(TypeNode::new("truck", "road vehicle"))
                    .with_child(TypeNode::new("plane", "air vehicle")),
            )
            .with_child(TypeNode::new("location", "a place"))
    }

    #[test]
    fn test_flatten_preorder() {
        assert_eq!(
            logistics().flatten(),
            vec!["object", "vehicle", "truck", "plane", "location"]
        );
    }

    #[test]
    fn test_parent_pairs() {
        let pairs = logistics().parent_pairs();
        assert_eq!(pairs[0], ("vehicle".to_string(), "object".to_string()));
        assert_eq!(pairs[1], ("truck".to_string(), "vehicle".to_string()));
        assert_eq!(pairs.len(), 4);
    }

    #[test]
    fn test_render_indents_children() {
        let text = logistics().render();
        assert!(text.starts_with("- object:"));
        assert!(text.contains("\n    - vehicle: moves packages"));
        assert!(text.contains("\n        - truck: road vehicle"));
    }

    #[test]
    fn test_retain_reparents_children() {
        let kept = logistics().retain(&["truck".to_string(), "location".to_string()]);
        assert_eq!(kept.flatten(), vec!["object", "truck", "location"]);
        assert_eq!(kept.children[0].name, "truck");
    }

    #[test]
    fn test_yaml_roundtrip_defaults() {
        let yaml = "name: object\nchildren:\n  - name: block\n    description: a cube\n";
        let node: TypeNode = serde_yaml::from_str(yaml).unwrap();
        assert!(node.is_rooted());
        assert!(node.contains("block"));
        assert_eq!(node.children[0].description, "a cube");
    }
}
