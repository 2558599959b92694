use std::collections::BTreeSet;

use crate::{
    animation::variant::{Transition, Variant, VariantSet, VisualStyle},
    foundation::core::{Millis, NodeId},
    foundation::error::{RevealError, RevealResult},
};

/// One node of a declarative variant tree. A node's index is its position in its
/// parent's `children`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnimationNode {
    /// Identifier, unique within the tree.
    pub id: NodeId,
    /// Hidden/visible states and their timing.
    #[serde(default)]
    pub variants: VariantSet,
    /// Ordered children.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<AnimationNode>,
}

/// Effective timing of one node, as derived from the tree.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct PlannedNode {
    /// Node identifier.
    pub id: NodeId,
    /// Parent identifier (`None` for the root).
    pub parent: Option<NodeId>,
    /// Position among siblings.
    pub index: usize,
    /// Distance from the root.
    pub depth: usize,
    /// Offset from the start of the visibility epoch.
    pub effective_delay: Millis,
}

impl AnimationNode {
    /// Leaf node with default variants.
    pub fn leaf(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            variants: VariantSet::default(),
            children: Vec::new(),
        }
    }

    fn transition(&self) -> &Transition {
        &self.variants.visible.transition
    }

    /// Ensure ids are unique and every variant is well formed.
    pub fn validate(&self) -> RevealResult<()> {
        let mut seen = BTreeSet::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.id.as_str().is_empty() {
                return Err(RevealError::validation("node id must not be empty"));
            }
            if !seen.insert(&node.id) {
                return Err(RevealError::validation(format!(
                    "duplicate node id '{}'",
                    node.id
                )));
            }
            node.variants
                .validate()
                .map_err(|e| RevealError::validation(format!("node '{}': {e}", node.id)))?;
            stack.extend(node.children.iter());
        }
        Ok(())
    }

    /// Total number of nodes including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }

    /// Depth-first lookup.
    pub fn find(&self, id: &NodeId) -> Option<&AnimationNode> {
        if &self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    pub(crate) fn find_mut(&mut self, id: &NodeId) -> Option<&mut AnimationNode> {
        if &self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(id))
    }

    pub(crate) fn remove_descendant(&mut self, id: &NodeId) -> Option<AnimationNode> {
        if let Some(pos) = self.children.iter().position(|c| &c.id == id) {
            return Some(self.children.remove(pos));
        }
        self.children
            .iter_mut()
            .find_map(|c| c.remove_descendant(id))
    }

    /// Ids of `self` and every descendant, pre-order.
    pub fn ids(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.node_count());
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node.id.clone());
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// Compute every node's effective delay, pre-order (parents before children,
    /// siblings in index order).
    pub fn plan(&self) -> Vec<PlannedNode> {
        let mut out = Vec::with_capacity(self.node_count());
        let root_delay = root_delay(self);
        plan_subtree(self, None, 0, 0, root_delay, true, &mut out);
        out
    }
}

/// Activation offset of the root: its own `delay_children` plus `delay`.
pub(crate) fn root_delay(root: &AnimationNode) -> Millis {
    root.transition()
        .delay_children
        .saturating_add(root.transition().delay)
}

/// Base offset a node hands down to its children.
///
/// The root's `delay_children` is already folded into its own effective delay.
pub(crate) fn children_base(node: &AnimationNode, effective: Millis, is_root: bool) -> Millis {
    if is_root {
        effective
    } else {
        effective.saturating_add(node.transition().delay_children)
    }
}

/// Effective delay of the child at `index` under `parent`.
pub(crate) fn child_delay(
    parent: &AnimationNode,
    parent_base: Millis,
    index: usize,
    child: &AnimationNode,
) -> Millis {
    parent_base
        .saturating_add(parent.transition().stagger_children.saturating_mul(index as u64))
        .saturating_add(child.transition().delay)
}

pub(crate) fn plan_subtree<'a>(
    node: &'a AnimationNode,
    parent: Option<&'a NodeId>,
    index: usize,
    depth: usize,
    effective: Millis,
    is_root: bool,
    out: &mut Vec<PlannedNode>,
) {
    let mut stack = vec![(node, parent, index, depth, effective, is_root)];
    while let Some((node, parent, index, depth, effective, is_root)) = stack.pop() {
        out.push(PlannedNode {
            id: node.id.clone(),
            parent: parent.cloned(),
            index,
            depth,
            effective_delay: effective,
        });
        let base = children_base(node, effective, is_root);
        for (i, child) in node.children.iter().enumerate().rev() {
            let d = child_delay(node, base, i, child);
            stack.push((child, Some(&node.id), i, depth + 1, d, false));
        }
    }
}

/// Builder for [`AnimationNode`] trees.
#[derive(Debug)]
pub struct NodeBuilder {
    id: NodeId,
    variants: VariantSet,
    children: Vec<AnimationNode>,
}

impl NodeBuilder {
    /// Start a node with default variants.
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            variants: VariantSet::default(),
            children: Vec::new(),
        }
    }

    /// Replace both variants.
    pub fn variants(mut self, variants: VariantSet) -> Self {
        self.variants = variants;
        self
    }

    /// Set the hidden style.
    pub fn hidden(mut self, style: VisualStyle) -> Self {
        self.variants.hidden = Variant {
            style,
            ..self.variants.hidden
        };
        self
    }

    /// Set the visible style.
    pub fn visible(mut self, style: VisualStyle) -> Self {
        self.variants.visible = Variant {
            style,
            ..self.variants.visible
        };
        self
    }

    /// Set the transition into the visible state.
    pub fn transition(mut self, transition: Transition) -> Self {
        self.variants.visible.transition = transition;
        self
    }

    /// Append a child.
    pub fn child(mut self, child: impl Into<AnimationNode>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Append several children in order.
    pub fn children<I, C>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<AnimationNode>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    /// Finish without validation; used when nesting builders.
    pub fn into_node(self) -> AnimationNode {
        AnimationNode {
            id: self.id,
            variants: self.variants,
            children: self.children,
        }
    }

    /// Build and validate the tree.
    pub fn build(self) -> RevealResult<AnimationNode> {
        let node = self.into_node();
        node.validate()?;
        Ok(node)
    }
}

impl From<NodeBuilder> for AnimationNode {
    fn from(b: NodeBuilder) -> Self {
        b.into_node()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/tree.rs"]
mod tests;
