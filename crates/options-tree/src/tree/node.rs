use std::fmt;

use smol_str::SmolStr;

use crate::dict::OptionsDict;
use crate::error::{Error, Result};
use crate::node_info::NodeInfo;

use super::{Donor, OptionsTreeElement, TreeElement, accept};

/// A single option dictionary with an optional subtree below it.
#[derive(Clone, Debug, PartialEq)]
pub struct OptionsNode {
    name: SmolStr,
    options_dict: OptionsDict,
    child: Option<Box<OptionsTreeElement>>,
}

impl OptionsNode {
    pub fn new(name: impl Into<SmolStr>) -> Result<Self> {
        Self::with_dict(name, OptionsDict::new())
    }

    /// The dictionary's node infos are replaced by an orphan node info named
    /// after this node.
    pub fn with_dict(name: impl Into<SmolStr>, options_dict: impl Into<OptionsDict>) -> Result<Self> {
        let name = name.into();

        if name.is_empty() {
            return Err(Error::Construction("node name must not be empty".to_string()));
        }

        let mut options_dict = options_dict.into();
        options_dict.replace_node_info(NodeInfo::orphan(name.clone()));

        Ok(Self {
            name,
            options_dict,
            child: None,
        })
    }

    pub fn with_child(mut self, child: impl Into<OptionsTreeElement>) -> Self {
        self.child = Some(Box::new(child.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options_dict(&self) -> &OptionsDict {
        &self.options_dict
    }

    pub fn options_dict_mut(&mut self) -> &mut OptionsDict {
        &mut self.options_dict
    }

    pub fn child(&self) -> Option<&OptionsTreeElement> {
        self.child.as_deref()
    }

    pub fn child_mut(&mut self) -> Option<&mut OptionsTreeElement> {
        self.child.as_deref_mut()
    }

    pub fn set_child(&mut self, child: Option<OptionsTreeElement>) -> Option<OptionsTreeElement> {
        std::mem::replace(&mut self.child, child.map(Box::new)).map(|child| *child)
    }

    pub fn is_leaf(&self) -> bool {
        self.child.is_none()
    }

    pub(crate) fn set_node_info(&mut self, node_info: NodeInfo) {
        self.options_dict.replace_node_info(node_info);
    }

    /// Drops array membership, used when a node leaves an array.
    pub(crate) fn orphaned(mut self) -> Self {
        self.set_node_info(NodeInfo::orphan(self.name.clone()));
        self
    }
}

impl TreeElement for OptionsNode {
    fn collapse(&self) -> Vec<OptionsDict> {
        match &self.child {
            None => vec![self.options_dict.clone()],
            Some(child) => child
                .collapse()
                .into_iter()
                .map(|leaf| {
                    let mut dict = self.options_dict.clone();
                    dict.update(&leaf);
                    dict
                })
                .collect(),
        }
    }

    fn multiply_attach(&mut self, tree: &OptionsTreeElement) {
        match &mut self.child {
            Some(child) => child.multiply_attach(tree),
            None => self.child = Some(Box::new(tree.clone())),
        }
    }

    fn feed<D: Donor>(&mut self, tree: D) -> Option<D> {
        match &mut self.child {
            Some(child) => child.feed(tree),
            None => {
                let (piece, remainder) = tree.donate(None);
                self.child = piece.map(Box::new);
                remainder
            }
        }
    }

    fn count_leaves(&self) -> usize {
        self.child.as_ref().map_or(1, |child| child.count_leaves())
    }
}

/// A node donates itself whole and leaves nothing behind.
impl Donor for OptionsNode {
    fn donate(
        self,
        acceptor: Option<OptionsTreeElement>,
    ) -> (Option<OptionsTreeElement>, Option<Self>) {
        let piece = OptionsTreeElement::Node(self);
        (Some(accept(acceptor, piece)), None)
    }

    fn is_depleted(&self) -> bool {
        false
    }
}

impl fmt::Display for OptionsNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
