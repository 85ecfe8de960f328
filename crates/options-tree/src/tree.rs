//! Composable option trees.
//!
//! A tree is built from [`OptionsNode`]s (one dictionary plus an optional
//! subtree) and [`OptionsArray`]s (ordered siblings). Trees are combined with
//! two operators:
//!
//! - `*` attaches an independent copy of the right-hand tree below every leaf
//!   of the left-hand tree (Cartesian product).
//! - `+` pairs leaves index by index, handing each leaf the next element of
//!   the right-hand tree.
//!
//! [`TreeElement::collapse`] flattens a tree into one merged dictionary per
//! leaf.
pub mod array;
pub mod element;
pub mod node;

use std::fmt;
use std::iter::{Product, Sum};
use std::ops::{Add, AddAssign, Mul, MulAssign};

use crate::dict::OptionsDict;

pub use array::{NodeKey, OptionsArray};
pub use element::{ArrayConfig, Element, NameFormat};
pub use node::OptionsNode;

/// Operations shared by nodes and arrays.
pub trait TreeElement {
    /// Returns one dictionary per leaf, each the merge of the dictionaries on
    /// the path from the root with deeper entries overriding.
    fn collapse(&self) -> Vec<OptionsDict>;

    /// Attaches a copy of `tree` below every leaf.
    fn multiply_attach(&mut self, tree: &OptionsTreeElement);

    /// Hands successive elements of `tree` to the leaves in order and
    /// returns what is left of it.
    fn attach<D: Donor>(&mut self, tree: D) -> Option<D> {
        let mut remainder = self.feed(tree);
        if let Some(remainder) = remainder.as_mut() {
            remainder.settle();
        }
        remainder
    }

    /// The work behind [`attach`](Self::attach). The returned remainder may
    /// still need [`Donor::settle`].
    fn feed<D: Donor>(&mut self, tree: D) -> Option<D>;

    fn count_leaves(&self) -> usize;
}

/// Source of elements for [`TreeElement::attach`].
pub trait Donor: Clone {
    /// Moves the first element out, attaches it to `acceptor` (or returns it
    /// as the acceptor when there is none) and returns the remainder, if any.
    ///
    /// The remainder is left unsettled so that repeated donations stay cheap.
    fn donate(
        self,
        acceptor: Option<OptionsTreeElement>,
    ) -> (Option<OptionsTreeElement>, Option<Self>);

    /// Like [`donate`](Self::donate) but leaves `self` untouched and returns a
    /// settled remainder.
    fn donate_copy(
        &self,
        acceptor: Option<OptionsTreeElement>,
    ) -> (Option<OptionsTreeElement>, Option<Self>) {
        let (acceptor, mut remainder) = self.clone().donate(acceptor);
        if let Some(remainder) = remainder.as_mut() {
            remainder.settle();
        }
        (acceptor, remainder)
    }

    /// `true` once there is nothing left to donate.
    fn is_depleted(&self) -> bool;

    /// Restores bookkeeping skipped by [`donate`](Self::donate).
    fn settle(&mut self) {}
}

pub(crate) fn accept(
    acceptor: Option<OptionsTreeElement>,
    piece: OptionsTreeElement,
) -> OptionsTreeElement {
    match acceptor {
        Some(mut acceptor) => {
            acceptor.attach(piece);
            acceptor
        }
        None => piece,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum OptionsTreeElement {
    Node(OptionsNode),
    Array(OptionsArray),
}

impl From<OptionsNode> for OptionsTreeElement {
    fn from(node: OptionsNode) -> Self {
        OptionsTreeElement::Node(node)
    }
}

impl From<OptionsArray> for OptionsTreeElement {
    fn from(array: OptionsArray) -> Self {
        OptionsTreeElement::Array(array)
    }
}

impl OptionsTreeElement {
    pub fn name(&self) -> &str {
        match self {
            OptionsTreeElement::Node(node) => node.name(),
            OptionsTreeElement::Array(array) => array.name(),
        }
    }
}

impl TreeElement for OptionsTreeElement {
    fn collapse(&self) -> Vec<OptionsDict> {
        match self {
            OptionsTreeElement::Node(node) => node.collapse(),
            OptionsTreeElement::Array(array) => array.collapse(),
        }
    }

    fn multiply_attach(&mut self, tree: &OptionsTreeElement) {
        match self {
            OptionsTreeElement::Node(node) => node.multiply_attach(tree),
            OptionsTreeElement::Array(array) => array.multiply_attach(tree),
        }
    }

    fn feed<D: Donor>(&mut self, tree: D) -> Option<D> {
        match self {
            OptionsTreeElement::Node(node) => node.feed(tree),
            OptionsTreeElement::Array(array) => array.feed(tree),
        }
    }

    fn count_leaves(&self) -> usize {
        match self {
            OptionsTreeElement::Node(node) => node.count_leaves(),
            OptionsTreeElement::Array(array) => array.count_leaves(),
        }
    }
}

impl Donor for OptionsTreeElement {
    fn donate(
        self,
        acceptor: Option<OptionsTreeElement>,
    ) -> (Option<OptionsTreeElement>, Option<Self>) {
        match self {
            OptionsTreeElement::Node(node) => {
                let (acceptor, _) = node.donate(acceptor);
                (acceptor, None)
            }
            OptionsTreeElement::Array(array) => {
                let (acceptor, remainder) = array.donate(acceptor);
                (acceptor, remainder.map(OptionsTreeElement::Array))
            }
        }
    }

    fn donate_copy(
        &self,
        acceptor: Option<OptionsTreeElement>,
    ) -> (Option<OptionsTreeElement>, Option<Self>) {
        match self {
            OptionsTreeElement::Node(node) => {
                let (acceptor, _) = node.donate_copy(acceptor);
                (acceptor, None)
            }
            OptionsTreeElement::Array(array) => {
                let (acceptor, remainder) = array.donate_copy(acceptor);
                (acceptor, remainder.map(OptionsTreeElement::Array))
            }
        }
    }

    fn is_depleted(&self) -> bool {
        match self {
            OptionsTreeElement::Node(node) => node.is_depleted(),
            OptionsTreeElement::Array(array) => array.is_depleted(),
        }
    }

    fn settle(&mut self) {
        if let OptionsTreeElement::Array(array) = self {
            array.settle();
        }
    }
}

/// A plain sequence donates its first element and keeps the rest.
impl Donor for Vec<OptionsTreeElement> {
    fn donate(
        mut self,
        acceptor: Option<OptionsTreeElement>,
    ) -> (Option<OptionsTreeElement>, Option<Self>) {
        if self.is_empty() {
            return (acceptor, None);
        }

        let first = self.remove(0);
        (Some(accept(acceptor, first)), Some(self))
    }

    fn donate_copy(
        &self,
        acceptor: Option<OptionsTreeElement>,
    ) -> (Option<OptionsTreeElement>, Option<Self>) {
        match self.split_first() {
            Some((first, rest)) => (Some(accept(acceptor, first.clone())), Some(rest.to_vec())),
            None => (acceptor, None),
        }
    }

    fn is_depleted(&self) -> bool {
        self.is_empty()
    }
}

impl fmt::Display for OptionsTreeElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

macro_rules! impl_tree_ops {
    ($($ty:ty),*) => {
        $(
            impl<R: Into<OptionsTreeElement>> Add<R> for $ty {
                type Output = $ty;

                fn add(mut self, rhs: R) -> Self::Output {
                    let rhs: OptionsTreeElement = rhs.into();
                    self.attach(rhs);
                    self
                }
            }

            impl<R: Into<OptionsTreeElement>> Add<R> for &$ty {
                type Output = $ty;

                fn add(self, rhs: R) -> Self::Output {
                    self.clone() + rhs
                }
            }

            impl<R: Into<OptionsTreeElement>> AddAssign<R> for $ty {
                fn add_assign(&mut self, rhs: R) {
                    let rhs: OptionsTreeElement = rhs.into();
                    self.attach(rhs);
                }
            }

            impl<R: Into<OptionsTreeElement>> Mul<R> for $ty {
                type Output = $ty;

                fn mul(mut self, rhs: R) -> Self::Output {
                    self.multiply_attach(&rhs.into());
                    self
                }
            }

            impl<R: Into<OptionsTreeElement>> Mul<R> for &$ty {
                type Output = $ty;

                fn mul(self, rhs: R) -> Self::Output {
                    self.clone() * rhs
                }
            }

            impl<R: Into<OptionsTreeElement>> MulAssign<R> for $ty {
                fn mul_assign(&mut self, rhs: R) {
                    self.multiply_attach(&rhs.into());
                }
            }
        )*
    };
}

impl_tree_ops!(OptionsNode, OptionsArray, OptionsTreeElement);

/// `None` is the identity: summing nothing yields `None` and a `None` operand
/// leaves the other side unchanged.
impl Sum<OptionsTreeElement> for Option<OptionsTreeElement> {
    fn sum<I: Iterator<Item = OptionsTreeElement>>(iter: I) -> Self {
        iter.fold(None, |acc, element| match acc {
            Some(acc) => Some(acc + element),
            None => Some(element),
        })
    }
}

impl Product<OptionsTreeElement> for Option<OptionsTreeElement> {
    fn product<I: Iterator<Item = OptionsTreeElement>>(iter: I) -> Self {
        iter.fold(None, |acc, element| match acc {
            Some(acc) => Some(acc * element),
            None => Some(element),
        })
    }
}

/// Sequentially attaches every element to the first one.
pub fn sum<I>(elements: I) -> Option<OptionsTreeElement>
where
    I: IntoIterator,
    I::Item: Into<OptionsTreeElement>,
{
    elements.into_iter().map(Into::into).sum()
}

/// Cartesian product of all elements, the first varying slowest.
pub fn product<I>(elements: I) -> Option<OptionsTreeElement>
where
    I: IntoIterator,
    I::Item: Into<OptionsTreeElement>,
{
    elements.into_iter().map(Into::into).product()
}
