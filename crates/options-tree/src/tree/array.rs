use std::fmt;
use std::ops::{Bound, Index, RangeBounds};
use std::sync::Arc;

use smol_str::SmolStr;

use crate::dict::OptionsDict;
use crate::error::{Error, Result};
use crate::node_info::{ArrayNodeInfo, NodeInfo, resolve_index};

use super::element::{ArrayConfig, Element};
use super::node::OptionsNode;
use super::{Donor, OptionsTreeElement, TreeElement, accept};

/// Selects a node of an array by position (negative counts from the end) or
/// by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKey {
    Index(isize),
    Name(SmolStr),
}

impl From<isize> for NodeKey {
    fn from(index: isize) -> Self {
        NodeKey::Index(index)
    }
}

impl From<i32> for NodeKey {
    fn from(index: i32) -> Self {
        NodeKey::Index(index as isize)
    }
}

impl From<usize> for NodeKey {
    fn from(index: usize) -> Self {
        NodeKey::Index(index as isize)
    }
}

impl From<&str> for NodeKey {
    fn from(name: &str) -> Self {
        NodeKey::Name(name.into())
    }
}

impl From<String> for NodeKey {
    fn from(name: String) -> Self {
        NodeKey::Name(name.into())
    }
}

impl From<SmolStr> for NodeKey {
    fn from(name: SmolStr) -> Self {
        NodeKey::Name(name)
    }
}

/// An ordered collection of sibling nodes.
///
/// Every node's dictionary carries an [`ArrayNodeInfo`] describing its place
/// in this array. All mutating methods refresh that information before they
/// return, so the node infos never go stale through this API.
#[derive(Clone, Debug, PartialEq)]
pub struct OptionsArray {
    name: SmolStr,
    nodes: Vec<OptionsNode>,
}

impl OptionsArray {
    pub fn new<I>(name: impl Into<SmolStr>, elements: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<Element>,
    {
        Self::with_config(name, elements, &ArrayConfig::default())
    }

    pub fn with_config<I>(name: impl Into<SmolStr>, elements: I, config: &ArrayConfig) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<Element>,
    {
        let name = name.into();

        if name.is_empty() {
            return Err(Error::Construction("array name must not be empty".to_string()));
        }

        let nodes = elements
            .into_iter()
            .map(|element| Into::<Element>::into(element).into_node(&name, config))
            .collect::<Result<Vec<_>>>()?;

        let mut array = Self { name, nodes };
        array.update_node_info();
        Ok(array)
    }

    pub fn from_nodes(
        name: impl Into<SmolStr>,
        nodes: impl IntoIterator<Item = OptionsNode>,
    ) -> Result<Self> {
        Self::new(name, nodes)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[OptionsNode] {
        &self.nodes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OptionsNode> {
        self.nodes.iter()
    }

    pub fn names(&self) -> Vec<SmolStr> {
        self.nodes.iter().map(|node| SmolStr::new(node.name())).collect()
    }

    fn position(&self, key: &NodeKey) -> Result<usize> {
        match key {
            NodeKey::Index(index) => resolve_index(*index, self.nodes.len()),
            NodeKey::Name(name) => self
                .nodes
                .iter()
                .position(|node| node.name() == name.as_str())
                .ok_or_else(|| Error::NodeNotFound(name.clone())),
        }
    }

    fn bounds(&self, range: impl RangeBounds<usize>) -> (usize, usize) {
        let len = self.nodes.len();
        let start = match range.start_bound() {
            Bound::Included(start) => *start,
            Bound::Excluded(start) => start.saturating_add(1),
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(end) => end.saturating_add(1),
            Bound::Excluded(end) => *end,
            Bound::Unbounded => len,
        };
        let end = end.min(len);
        (start.min(end), end)
    }

    pub fn get(&self, key: impl Into<NodeKey>) -> Result<&OptionsNode> {
        let index = self.position(&key.into())?;
        Ok(&self.nodes[index])
    }

    /// Mutable access to a node's dictionary and subtree. Node names are
    /// fixed, so this cannot invalidate the array's node infos.
    pub fn get_mut(&mut self, key: impl Into<NodeKey>) -> Result<&mut OptionsNode> {
        let index = self.position(&key.into())?;
        Ok(&mut self.nodes[index])
    }

    /// Copies a range of nodes into a new array of the same name. Out of range
    /// bounds are clamped.
    pub fn slice(&self, range: impl RangeBounds<usize>) -> Self {
        let (start, end) = self.bounds(range);
        let mut array = Self {
            name: self.name.clone(),
            nodes: self.nodes[start..end].to_vec(),
        };
        array.update_node_info();
        array
    }

    /// Replaces a node and returns the old one, detached from this array.
    pub fn set(&mut self, key: impl Into<NodeKey>, node: OptionsNode) -> Result<OptionsNode> {
        let index = self.position(&key.into())?;
        let old = std::mem::replace(&mut self.nodes[index], node);
        self.update_node_info();
        Ok(old.orphaned())
    }

    pub fn insert(&mut self, index: usize, node: OptionsNode) -> Result<()> {
        if index > self.nodes.len() {
            return Err(Error::IndexOutOfRange {
                index: index as isize,
                size: self.nodes.len(),
            });
        }

        self.nodes.insert(index, node);
        self.update_node_info();
        Ok(())
    }

    pub fn push(&mut self, node: OptionsNode) {
        self.nodes.push(node);
        self.update_node_info();
    }

    pub fn pop(&mut self) -> Option<OptionsNode> {
        let node = self.nodes.pop();
        self.update_node_info();
        node.map(OptionsNode::orphaned)
    }

    pub fn remove(&mut self, key: impl Into<NodeKey>) -> Result<OptionsNode> {
        let index = self.position(&key.into())?;
        let node = self.nodes.remove(index);
        self.update_node_info();
        Ok(node.orphaned())
    }

    /// Replaces a range of nodes (slice assignment) and returns the removed
    /// ones.
    pub fn splice(
        &mut self,
        range: impl RangeBounds<usize>,
        nodes: impl IntoIterator<Item = OptionsNode>,
    ) -> Vec<OptionsNode> {
        let (start, end) = self.bounds(range);
        let removed = self
            .nodes
            .splice(start..end, nodes)
            .map(OptionsNode::orphaned)
            .collect();
        self.update_node_info();
        removed
    }

    /// Rebuilds the node info of every member from the current order.
    pub fn update_node_info(&mut self) {
        let names: Arc<[SmolStr]> = self.names().into();

        log::trace!("refreshing node info of \"{}\" ({} nodes)", self.name, names.len());

        for (index, node) in self.nodes.iter_mut().enumerate() {
            node.set_node_info(NodeInfo::Array(ArrayNodeInfo {
                array_name: self.name.clone(),
                node_names: Arc::clone(&names),
                node_index: index,
            }));
        }
    }

    /// Node info describing the member at `index` as the array stands now.
    pub fn create_node_info(&self, index: usize) -> Result<NodeInfo> {
        ArrayNodeInfo::new(self.name.clone(), self.names(), index).map(NodeInfo::Array)
    }
}

fn warn_unattached(array_name: &str, left: usize, total: usize) {
    log::warn!(
        "sequential attach to \"{}\" ran out of elements, {} of {} nodes left unattached",
        array_name,
        left,
        total
    );
}

impl TreeElement for OptionsArray {
    fn collapse(&self) -> Vec<OptionsDict> {
        let leaves = self
            .nodes
            .iter()
            .flat_map(|node| node.collapse())
            .collect::<Vec<_>>();

        log::debug!("collapsed \"{}\" into {} leaves", self.name, leaves.len());
        leaves
    }

    fn multiply_attach(&mut self, tree: &OptionsTreeElement) {
        log::debug!(
            "attaching a copy of \"{}\" to every leaf of \"{}\"",
            tree,
            self.name
        );

        for node in &mut self.nodes {
            node.multiply_attach(tree);
        }
    }

    /// Each node receives the remainder left by the previous one. Nodes after
    /// the donor runs out stay unattached.
    fn feed<D: Donor>(&mut self, tree: D) -> Option<D> {
        let total = self.nodes.len();
        log::debug!("attaching sequentially to the {} nodes of \"{}\"", total, self.name);

        let mut remainder = Some(tree);

        for (index, node) in self.nodes.iter_mut().enumerate() {
            let Some(tree) = remainder.take() else {
                warn_unattached(&self.name, total - index, total);
                break;
            };

            if tree.is_depleted() {
                remainder = Some(tree);
                warn_unattached(&self.name, total - index, total);
                break;
            }

            remainder = node.feed(tree);
        }

        remainder
    }

    fn count_leaves(&self) -> usize {
        self.nodes.iter().map(|node| node.count_leaves()).sum()
    }
}

/// An array donates its first node as a one-element array and keeps the rest.
impl Donor for OptionsArray {
    fn donate(
        mut self,
        acceptor: Option<OptionsTreeElement>,
    ) -> (Option<OptionsTreeElement>, Option<Self>) {
        if self.nodes.is_empty() {
            return (acceptor, None);
        }

        let mut piece = Self {
            name: self.name.clone(),
            nodes: vec![self.nodes.remove(0)],
        };
        piece.update_node_info();

        (Some(accept(acceptor, OptionsTreeElement::Array(piece))), Some(self))
    }

    fn donate_copy(
        &self,
        acceptor: Option<OptionsTreeElement>,
    ) -> (Option<OptionsTreeElement>, Option<Self>) {
        if self.nodes.is_empty() {
            return (acceptor, None);
        }

        let piece = OptionsTreeElement::Array(self.slice(..1));
        (Some(accept(acceptor, piece)), Some(self.slice(1..)))
    }

    fn is_depleted(&self) -> bool {
        self.nodes.is_empty()
    }

    fn settle(&mut self) {
        self.update_node_info();
    }
}

impl Index<usize> for OptionsArray {
    type Output = OptionsNode;

    fn index(&self, index: usize) -> &Self::Output {
        &self.nodes[index]
    }
}

impl<'a> IntoIterator for &'a OptionsArray {
    type Item = &'a OptionsNode;
    type IntoIter = std::slice::Iter<'a, OptionsNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

impl Extend<OptionsNode> for OptionsArray {
    fn extend<T: IntoIterator<Item = OptionsNode>>(&mut self, iter: T) {
        self.nodes.extend(iter);
        self.update_node_info();
    }
}

impl fmt::Display for OptionsArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
