//! Read-only view of the host's entity graph.

use serde::{Deserialize, Serialize};

/// A named trait value attached to a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitEntry {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

/// One node of the host scene. All lists are ordered.
pub trait Hierarchy {
    fn name(&self) -> &str;
    fn traits(&self) -> Vec<TraitEntry>;
    fn components(&self) -> Vec<String>;
    fn children(&self) -> Vec<&dyn Hierarchy>;
}

/// Owned scene node, loadable from JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub traits: Vec<TraitEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_trait(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.traits.push(TraitEntry {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn with_component(mut self, name: impl Into<String>) -> Self {
        self.components.push(name.into());
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }
}

impl Hierarchy for Node {
    fn name(&self) -> &str {
        &self.name
    }

    fn traits(&self) -> Vec<TraitEntry> {
        self.traits.clone()
    }

    fn components(&self) -> Vec<String> {
        self.components.clone()
    }

    fn children(&self) -> Vec<&dyn Hierarchy> {
        self.children.iter().map(|c| c as &dyn Hierarchy).collect()
    }
}

/// Nodes in the subtree rooted at `root`, including `root`.
pub fn count_nodes(root: &dyn Hierarchy) -> usize {
    1 + root
        .children()
        .into_iter()
        .map(count_nodes)
        .sum::<usize>()
}
