use miette::Diagnostic;
use smol_str::SmolStr;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    #[diagnostic(code(options_tree::construction))]
    Construction(String),
    #[error("Invalid name format \"{0}\", expected a template containing \"{{}}\"")]
    #[diagnostic(
        code(options_tree::name_format),
        help("use a template such as \"{{}}mm\" or NameFormat::from_fn")
    )]
    InvalidNameFormat(String),
    #[error("{}", missing_node_info_message(.0))]
    #[diagnostic(code(options_tree::missing_node_info))]
    MissingNodeInfo(Option<SmolStr>),
    #[error("\"{0}\" is not defined")]
    #[diagnostic(code(options_tree::key_not_found))]
    KeyNotFound(SmolStr),
    #[error("Index {index} out of range for a collection of size {size}")]
    #[diagnostic(code(options_tree::index_out_of_range))]
    IndexOutOfRange { index: isize, size: usize },
    #[error("Maximum resolution depth exceeded while resolving \"{0}\"")]
    #[diagnostic(
        code(options_tree::recursion_limit),
        help("check for dynamic entries that depend on each other")
    )]
    RecursionLimit(SmolStr),
    #[error("Expected {expected} for \"{key}\", got {actual}")]
    #[diagnostic(code(options_tree::invalid_type))]
    InvalidType {
        key: SmolStr,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("No node named \"{0}\"")]
    #[diagnostic(code(options_tree::node_not_found))]
    NodeNotFound(SmolStr),
    #[error("{0}")]
    #[diagnostic(code(options_tree::dynamic))]
    Dynamic(String),
    #[cfg(feature = "file-io")]
    #[error("I/O error: {0}")]
    #[diagnostic(code(options_tree::io))]
    Io(String),
}

fn missing_node_info_message(collection: &Option<SmolStr>) -> String {
    match collection {
        Some(name) => format!("No node info belonging to \"{}\"", name),
        None => "No node info".to_string(),
    }
}

impl Error {
    /// Returns `true` for the missing-dependency condition, which callers
    /// usually treat as "not yet computable".
    pub fn is_key_not_found(&self) -> bool {
        matches!(self, Error::KeyNotFound(_))
    }
}

#[cfg(feature = "file-io")]
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}
