//! `options-tree` builds combinatorial parameter sets out of named option
//! dictionaries.
//!
//! Arrays of alternatives are combined with `*` (Cartesian product) and `+`
//! (index-wise pairing) and then collapsed into one merged [`OptionsDict`] per
//! combination. Every dictionary remembers where it came from, which gives each
//! combination a readable identifier.
//!
//! ## Examples
//!
//! ```rust
//! use options_tree::{ArrayConfig, OptionsArray, TreeElement};
//!
//! let dims = OptionsArray::with_config(
//!     "dim",
//!     [1, 2, 3],
//!     &ArrayConfig::default().with_name_format("{}d").unwrap(),
//! )
//! .unwrap();
//! let resolutions = OptionsArray::new("res", [10, 20]).unwrap();
//!
//! let leaves = (dims * resolutions).collapse();
//! let names = leaves.iter().map(|leaf| leaf.to_string()).collect::<Vec<_>>();
//!
//! assert_eq!(names, ["1d_10", "1d_20", "2d_10", "2d_20", "3d_10", "3d_20"]);
//! assert_eq!(leaves[3].get_f64("res").unwrap(), 20.0);
//!
//! // Dynamic entries are computed from the merged dictionary on lookup.
//! let mut leaf = leaves[5].clone();
//! leaf.insert_dynamic("cells", |d| Ok((d.get_f64("res")? * d.get_f64("dim")?).into()));
//! assert_eq!(leaf.get_f64("cells").unwrap(), 60.0);
//! ```
mod error;
mod formatter;
mod node_info;
mod number;
mod position;
mod value;

pub mod dict;
pub mod tree;

pub use dict::{DynamicFn, Entry, MAX_RESOLVE_DEPTH, OptionsDict, StrOptions};
pub use error::{Error, Result};
pub use formatter::{Formatter, FormatterConfig, NodeInfoFormatter, SimpleFormatter, TreeFormatter};
pub use node_info::{ArrayNodeInfo, IndexHint, NodeInfo, OrphanNodeInfo};
pub use number::Number;
pub use position::Position;
pub use tree::{
    ArrayConfig, Donor, Element, NameFormat, NodeKey, OptionsArray, OptionsNode,
    OptionsTreeElement, TreeElement, product, sum,
};
pub use value::Value;
