use std::fmt;
use std::sync::Arc;

use smol_str::SmolStr;

use crate::dict::OptionsDict;
use crate::error::{Error, Result};
use crate::formatter::Formatter;
use crate::number::Number;
use crate::value::Value;

use super::node::OptionsNode;

/// How an array names the nodes it creates from raw values.
#[derive(Clone)]
pub enum NameFormat {
    /// Every `{}` is replaced by the value, e.g. `"{}mm"`.
    Template(SmolStr),
    Function(Arc<dyn Fn(&Value) -> String + Send + Sync>),
}

impl NameFormat {
    pub fn template(template: impl Into<SmolStr>) -> Result<Self> {
        let template = template.into();

        if !template.contains("{}") {
            return Err(Error::InvalidNameFormat(template.to_string()));
        }

        Ok(NameFormat::Template(template))
    }

    pub fn from_fn<F>(func: F) -> Self
    where
        F: Fn(&Value) -> String + Send + Sync + 'static,
    {
        NameFormat::Function(Arc::new(func))
    }

    pub fn apply(&self, value: &Value) -> String {
        match self {
            NameFormat::Template(template) => template.replace("{}", &value.to_string()),
            NameFormat::Function(func) => func(value),
        }
    }
}

impl Default for NameFormat {
    fn default() -> Self {
        NameFormat::Template(SmolStr::new_static("{}"))
    }
}

impl fmt::Debug for NameFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameFormat::Template(template) => write!(f, "Template({:?})", template),
            NameFormat::Function(_) => write!(f, "Function"),
        }
    }
}

/// Construction settings for [`OptionsArray`](super::OptionsArray).
#[derive(Clone, Debug, Default)]
pub struct ArrayConfig {
    pub name_format: NameFormat,
    /// Formatter given to the dictionaries of created nodes.
    pub formatter: Formatter,
}

impl ArrayConfig {
    pub fn with_name_format(mut self, template: &str) -> Result<Self> {
        self.name_format = NameFormat::template(template)?;
        Ok(self)
    }

    pub fn with_name_fn<F>(mut self, func: F) -> Self
    where
        F: Fn(&Value) -> String + Send + Sync + 'static,
    {
        self.name_format = NameFormat::from_fn(func);
        self
    }

    pub fn with_formatter(mut self, formatter: impl Into<Formatter>) -> Self {
        self.formatter = formatter.into();
        self
    }
}

/// One member handed to an array constructor.
#[derive(Clone, Debug)]
pub enum Element {
    /// A raw value; the node is named by the array's [`NameFormat`] and its
    /// dictionary maps the array name to the value.
    Value(Value),
    /// An existing node, kept as is.
    Node(OptionsNode),
    /// A named group of entries.
    Named { name: SmolStr, entries: OptionsDict },
}

impl Element {
    pub fn named(name: impl Into<SmolStr>, entries: impl Into<OptionsDict>) -> Self {
        Element::Named {
            name: name.into(),
            entries: entries.into(),
        }
    }

    pub(crate) fn into_node(self, array_name: &str, config: &ArrayConfig) -> Result<OptionsNode> {
        match self {
            Element::Value(value) => {
                let name = config.name_format.apply(&value);
                let dict = OptionsDict::from([(array_name, value)])
                    .with_formatter(config.formatter.clone());
                OptionsNode::with_dict(name, dict)
            }
            Element::Node(node) => Ok(node),
            Element::Named { name, entries } => {
                OptionsNode::with_dict(name, entries.with_formatter(config.formatter.clone()))
            }
        }
    }
}

impl From<OptionsNode> for Element {
    fn from(node: OptionsNode) -> Self {
        Element::Node(node)
    }
}

macro_rules! element_from_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Element {
                fn from(value: $ty) -> Self {
                    Element::Value(value.into())
                }
            }
        )*
    };
}

element_from_value!(Value, Number, bool, String, &str, i32, i64, u32, u64, usize, f32, f64);
