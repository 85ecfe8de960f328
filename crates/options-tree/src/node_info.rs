//! Per-node descriptors that remember where a dictionary came from.
//!
//! Every [`OptionsDict`](crate::OptionsDict) carries one [`NodeInfo`] per
//! collection it was merged from. The descriptors know the node's own name, its
//! [`Position`] and, for array members, the names of all siblings so that a
//! neighbouring node can be named without going back to the tree.
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::error::{Error, Result};
use crate::position::Position;

/// Index offset supplied to [`NodeInfo::get_string`], either for every node
/// info or keyed by collection name.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexHint {
    At(isize),
    PerCollection(FxHashMap<SmolStr, isize>),
}

impl IndexHint {
    /// Resolves the hint for a collection; orphans (`None`) only match `At`.
    pub fn for_collection(&self, collection_name: Option<&str>) -> Option<isize> {
        match self {
            IndexHint::At(index) => Some(*index),
            IndexHint::PerCollection(indices) => {
                collection_name.and_then(|name| indices.get(name).copied())
            }
        }
    }
}

impl From<isize> for IndexHint {
    fn from(index: isize) -> Self {
        IndexHint::At(index)
    }
}

impl From<i32> for IndexHint {
    fn from(index: i32) -> Self {
        IndexHint::At(index as isize)
    }
}

impl<K: Into<SmolStr>, const N: usize> From<[(K, isize); N]> for IndexHint {
    fn from(indices: [(K, isize); N]) -> Self {
        IndexHint::PerCollection(indices.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Combines the node's own index with absolute/relative hints.
///
/// `absolute` replaces `default`; `relative` is added on top of whichever base
/// was chosen and the sum must not be negative. A lone negative `absolute`
/// counts from the end and is resolved by [`resolve_index`].
pub(crate) fn create_index(
    default: usize,
    absolute: Option<isize>,
    relative: Option<isize>,
    collection_size: usize,
) -> Result<isize> {
    let mut index = absolute.unwrap_or(default as isize);

    if let Some(relative) = relative {
        index += relative;
        if index < 0 {
            return Err(Error::IndexOutOfRange {
                index,
                size: collection_size,
            });
        }
    }

    Ok(index)
}

pub(crate) fn resolve_index(index: isize, collection_size: usize) -> Result<usize> {
    let size = collection_size as isize;
    let resolved = if index < 0 { index + size } else { index };

    if resolved < 0 || resolved >= size {
        Err(Error::IndexOutOfRange {
            index,
            size: collection_size,
        })
    } else {
        Ok(resolved as usize)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrphanNodeInfo {
    node_name: SmolStr,
}

impl OrphanNodeInfo {
    pub fn new(node_name: impl Into<SmolStr>) -> Self {
        Self {
            node_name: node_name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayNodeInfo {
    pub(crate) array_name: SmolStr,
    pub(crate) node_names: Arc<[SmolStr]>,
    pub(crate) node_index: usize,
}

impl ArrayNodeInfo {
    /// Fails when `node_index` lies outside `node_names`.
    pub fn new(
        array_name: impl Into<SmolStr>,
        node_names: impl Into<Arc<[SmolStr]>>,
        node_index: usize,
    ) -> Result<Self> {
        let node_names = node_names.into();

        if node_index >= node_names.len() {
            return Err(Error::IndexOutOfRange {
                index: node_index as isize,
                size: node_names.len(),
            });
        }

        Ok(Self {
            array_name: array_name.into(),
            node_names,
            node_index,
        })
    }

    pub fn array_name(&self) -> &str {
        &self.array_name
    }

    pub fn node_names(&self) -> &[SmolStr] {
        &self.node_names
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeInfo {
    Orphan(OrphanNodeInfo),
    Array(ArrayNodeInfo),
}

impl From<OrphanNodeInfo> for NodeInfo {
    fn from(info: OrphanNodeInfo) -> Self {
        NodeInfo::Orphan(info)
    }
}

impl From<ArrayNodeInfo> for NodeInfo {
    fn from(info: ArrayNodeInfo) -> Self {
        NodeInfo::Array(info)
    }
}

impl NodeInfo {
    pub fn orphan(node_name: impl Into<SmolStr>) -> Self {
        NodeInfo::Orphan(OrphanNodeInfo::new(node_name))
    }

    pub fn position(&self) -> Position {
        match self {
            NodeInfo::Orphan(_) => Position::orphan(),
            NodeInfo::Array(info) => Position::new(info.node_index, info.node_names.len()),
        }
    }

    /// Name of the owning collection; orphans have none.
    pub fn collection_name(&self) -> Option<&str> {
        match self {
            NodeInfo::Orphan(_) => None,
            NodeInfo::Array(info) => Some(&info.array_name),
        }
    }

    pub fn node_name(&self) -> &str {
        match self {
            NodeInfo::Orphan(info) => &info.node_name,
            NodeInfo::Array(info) => &info.node_names[info.node_index],
        }
    }

    pub fn belongs_to(&self, collection_name: &str) -> bool {
        self.collection_name() == Some(collection_name)
    }

    /// Returns the first of `collection_names` this node belongs to.
    pub fn belongs_to_any<'a>(&self, collection_names: &'a [impl AsRef<str>]) -> Option<&'a str> {
        collection_names
            .iter()
            .map(|name| name.as_ref())
            .find(|name| self.belongs_to(name))
    }

    /// Names this node, or a sibling selected by `absolute`/`relative`.
    ///
    /// With a `collection_separator` array members render as
    /// `{array_name}{separator}{node_name}`.
    pub fn get_string(
        &self,
        absolute: Option<&IndexHint>,
        relative: Option<&IndexHint>,
        collection_separator: Option<&str>,
    ) -> Result<String> {
        let collection = self.collection_name();
        let absolute = absolute.and_then(|hint| hint.for_collection(collection));
        let relative = relative.and_then(|hint| hint.for_collection(collection));

        match self {
            NodeInfo::Orphan(info) => {
                let index = create_index(0, absolute, relative, 1)?;
                resolve_index(index, 1)?;
                Ok(info.node_name.to_string())
            }
            NodeInfo::Array(info) => {
                let size = info.node_names.len();
                let index = create_index(info.node_index, absolute, relative, size)?;
                let name = &info.node_names[resolve_index(index, size)?];

                Ok(match collection_separator {
                    Some(separator) => format!("{}{}{}", info.array_name, separator, name),
                    None => name.to_string(),
                })
            }
        }
    }
}

impl fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.node_name())
    }
}
