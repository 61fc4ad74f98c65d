//! Decision tree storage shared by the forest and boosting scorers

use anyhow::Result;
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

/// A node of a binary decision tree.
///
/// Serialized as `{"split": {...}}` or `{"leaf": {"value": [...]}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    /// Rows with `x[feature] <= threshold` go left
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf { value: Vec<f64> },
}

/// Flat array of nodes, root at index 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    pub fn new(nodes: Vec<TreeNode>) -> Self {
        Self { nodes }
    }

    /// Structural check run once at load time.
    ///
    /// Every node reachable from the root must be reached exactly once, so
    /// traversal always terminates at a leaf.
    pub fn validate(&self, n_features: usize, leaf_width: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![0usize];

        while let Some(idx) = stack.pop() {
            if visited[idx] {
                return Err(format!("node {} reached more than once", idx));
            }
            visited[idx] = true;

            match &self.nodes[idx] {
                TreeNode::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    if *feature >= n_features {
                        return Err(format!(
                            "node {} splits on feature {} of {}",
                            idx, feature, n_features
                        ));
                    }
                    for (side, child) in [("left", *left), ("right", *right)] {
                        if child >= self.nodes.len() {
                            return Err(format!(
                                "node {} {} child {} out of bounds ({} nodes)",
                                idx,
                                side,
                                child,
                                self.nodes.len()
                            ));
                        }
                        stack.push(child);
                    }
                }
                TreeNode::Leaf { value } => {
                    if value.len() != leaf_width {
                        return Err(format!(
                            "leaf {} has {} values, expected {}",
                            idx,
                            value.len(),
                            leaf_width
                        ));
                    }
                }
            }
        }

        Ok(())
    }

    /// Walk from the root to the leaf selected by `row`
    pub fn leaf(&self, row: ArrayView1<'_, f64>) -> Result<&[f64]> {
        let mut idx = 0;
        // A valid tree reaches a leaf in fewer steps than it has nodes
        for _ in 0..self.nodes.len() {
            match self.nodes.get(idx) {
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let x = row.get(*feature).copied().ok_or_else(|| {
                        anyhow::anyhow!("feature {} missing from row of {}", feature, row.len())
                    })?;
                    idx = if x <= *threshold { *left } else { *right };
                }
                Some(TreeNode::Leaf { value }) => return Ok(value),
                None => anyhow::bail!("node {} out of bounds", idx),
            }
        }
        anyhow::bail!("tree traversal did not reach a leaf")
    }
}
