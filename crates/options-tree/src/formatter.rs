use itertools::Itertools;
use smol_str::SmolStr;

use crate::error::Result;
use crate::node_info::{IndexHint, NodeInfo};

/// Separators shared by the built-in formatters.
#[derive(Clone, Debug, PartialEq)]
pub struct FormatterConfig {
    pub node_separator: SmolStr,
    pub collection_separator: Option<SmolStr>,
    pub indent: SmolStr,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            node_separator: SmolStr::new_static("_"),
            collection_separator: None,
            indent: SmolStr::new_static("  "),
        }
    }
}

/// Renders an ordered list of node infos into an identifier.
pub trait NodeInfoFormatter {
    fn format(
        &self,
        node_info: &[&NodeInfo],
        absolute: Option<&IndexHint>,
        relative: Option<&IndexHint>,
    ) -> Result<String>;
}

/// Joins node names into a single flat string, e.g. `water_10mm_0.5`.
#[derive(Clone, Debug, PartialEq)]
pub struct SimpleFormatter {
    node_separator: SmolStr,
    collection_separator: Option<SmolStr>,
}

impl SimpleFormatter {
    pub fn new(config: &FormatterConfig) -> Self {
        Self {
            node_separator: config.node_separator.clone(),
            collection_separator: config.collection_separator.clone(),
        }
    }
}

impl Default for SimpleFormatter {
    fn default() -> Self {
        Self::new(&FormatterConfig::default())
    }
}

impl NodeInfoFormatter for SimpleFormatter {
    fn format(
        &self,
        node_info: &[&NodeInfo],
        absolute: Option<&IndexHint>,
        relative: Option<&IndexHint>,
    ) -> Result<String> {
        let names = node_info
            .iter()
            .map(|info| info.get_string(absolute, relative, self.collection_separator.as_deref()))
            .collect::<Result<Vec<_>>>()?;

        Ok(names
            .into_iter()
            .filter(|name| !name.is_empty())
            .join(&self.node_separator))
    }
}

/// Renders node infos as an indented tree fragment.
///
/// Output restarts at the deepest node that is not the first of its
/// collection, so formatting the leaves of a collapsed tree one after another
/// prints every branch exactly once.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeFormatter {
    indent: SmolStr,
    collection_separator: Option<SmolStr>,
    only_indent: bool,
}

impl TreeFormatter {
    pub fn new(config: &FormatterConfig) -> Self {
        Self {
            indent: config.indent.clone(),
            collection_separator: config.collection_separator.clone(),
            only_indent: false,
        }
    }

    /// Emit only the indentation that follows the last printed level.
    pub fn only_indent(mut self, only_indent: bool) -> Self {
        self.only_indent = only_indent;
        self
    }
}

impl Default for TreeFormatter {
    fn default() -> Self {
        Self::new(&FormatterConfig::default())
    }
}

impl NodeInfoFormatter for TreeFormatter {
    fn format(
        &self,
        node_info: &[&NodeInfo],
        absolute: Option<&IndexHint>,
        relative: Option<&IndexHint>,
    ) -> Result<String> {
        if self.only_indent {
            return Ok(self.indent.repeat(node_info.len()));
        }

        let mut lines = Vec::with_capacity(node_info.len());

        for (depth, info) in node_info.iter().enumerate() {
            if !info.position().is_first() {
                lines.clear();
            }

            let name =
                info.get_string(absolute, relative, self.collection_separator.as_deref())?;
            lines.push(format!("{}{}", self.indent.repeat(depth), name));
        }

        Ok(lines.join("\n"))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Formatter {
    Simple(SimpleFormatter),
    Tree(TreeFormatter),
}

impl Default for Formatter {
    fn default() -> Self {
        Formatter::Simple(SimpleFormatter::default())
    }
}

impl From<SimpleFormatter> for Formatter {
    fn from(formatter: SimpleFormatter) -> Self {
        Formatter::Simple(formatter)
    }
}

impl From<TreeFormatter> for Formatter {
    fn from(formatter: TreeFormatter) -> Self {
        Formatter::Tree(formatter)
    }
}

impl NodeInfoFormatter for Formatter {
    fn format(
        &self,
        node_info: &[&NodeInfo],
        absolute: Option<&IndexHint>,
        relative: Option<&IndexHint>,
    ) -> Result<String> {
        match self {
            Formatter::Simple(formatter) => formatter.format(node_info, absolute, relative),
            Formatter::Tree(formatter) => formatter.format(node_info, absolute, relative),
        }
    }
}
