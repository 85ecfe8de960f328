//! Option dictionaries with lazily resolved entries.
//!
//! An [`OptionsDict`] maps names to [`Entry`] values. Static entries hold a
//! [`Value`]; dynamic entries hold a [`DynamicFn`] that is evaluated against
//! the dictionary on every lookup, so changing an input changes everything
//! derived from it.
//!
//! ```rust
//! use options_tree::{DynamicFn, OptionsDict, Value};
//!
//! let mut dict = OptionsDict::from([("x", 5)]);
//! dict.register(DynamicFn::new("f", |d| Ok((d.get_f64("x")? * 2.0).into())));
//!
//! assert_eq!(dict.get("f").unwrap(), Value::from(10));
//! dict.insert("x", 7);
//! assert_eq!(dict.get("f").unwrap(), Value::from(14));
//! ```
pub mod entry;
pub mod template;

use std::cell::Cell;
use std::collections::BTreeMap;
use std::fmt;

use smol_str::SmolStr;

use crate::error::{Error, Result};
use crate::formatter::{Formatter, NodeInfoFormatter};
use crate::node_info::{IndexHint, NodeInfo};
use crate::value::Value;

pub use entry::{DynamicFn, Entry};

/// Maximum number of nested dynamic resolutions on one thread.
pub const MAX_RESOLVE_DEPTH: u32 = 128;

thread_local! {
    static RESOLVE_DEPTH: Cell<u32> = const { Cell::new(0) };
}

struct DepthGuard;

impl DepthGuard {
    fn enter(key: &str) -> Result<Self> {
        RESOLVE_DEPTH.with(|depth| {
            if depth.get() >= MAX_RESOLVE_DEPTH {
                Err(Error::RecursionLimit(key.into()))
            } else {
                depth.set(depth.get() + 1);
                Ok(DepthGuard)
            }
        })
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        RESOLVE_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Filters and index hints for [`OptionsDict::str_with`].
#[derive(Debug, Clone, Default)]
pub struct StrOptions {
    only: Option<Vec<SmolStr>>,
    exclude: Vec<SmolStr>,
    absolute: Option<IndexHint>,
    relative: Option<IndexHint>,
    formatter: Option<Formatter>,
}

impl StrOptions {
    /// Keep only node infos belonging to one of these collections.
    pub fn only<I, S>(mut self, collections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        self.only = Some(collections.into_iter().map(Into::into).collect());
        self
    }

    pub fn exclude<I, S>(mut self, collections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        self.exclude = collections.into_iter().map(Into::into).collect();
        self
    }

    pub fn absolute(mut self, hint: impl Into<IndexHint>) -> Self {
        self.absolute = Some(hint.into());
        self
    }

    pub fn relative(mut self, hint: impl Into<IndexHint>) -> Self {
        self.relative = Some(hint.into());
        self
    }

    pub fn formatter(mut self, formatter: impl Into<Formatter>) -> Self {
        self.formatter = Some(formatter.into());
        self
    }

    fn keeps(&self, info: &NodeInfo) -> bool {
        let included = self
            .only
            .as_ref()
            .is_none_or(|only| info.belongs_to_any(only).is_some());

        included && info.belongs_to_any(&self.exclude).is_none()
    }
}

#[derive(Clone, Default)]
pub struct OptionsDict {
    entries: BTreeMap<SmolStr, Entry>,
    node_info: Vec<NodeInfo>,
    formatter: Formatter,
}

impl OptionsDict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a dictionary of dynamic entries, each registered under its own
    /// name.
    pub fn from_fns(funcs: impl IntoIterator<Item = DynamicFn>) -> Self {
        let mut dict = Self::new();
        dict.extend(funcs);
        dict
    }

    pub fn with_formatter(mut self, formatter: impl Into<Formatter>) -> Self {
        self.formatter = formatter.into();
        self
    }

    pub fn with_node_info(mut self, node_info: NodeInfo) -> Self {
        self.node_info.push(node_info);
        self
    }

    pub fn formatter(&self) -> &Formatter {
        &self.formatter
    }

    pub fn set_formatter(&mut self, formatter: impl Into<Formatter>) {
        self.formatter = formatter.into();
    }

    /// Looks up `key`, evaluating dynamic entries against this dictionary.
    ///
    /// A missing key, including one looked up from inside a dynamic entry,
    /// surfaces as [`Error::KeyNotFound`].
    pub fn get(&self, key: &str) -> Result<Value> {
        match self.entries.get(key) {
            Some(Entry::Static(value)) => Ok(value.clone()),
            Some(Entry::Dynamic(func)) => {
                let _guard = DepthGuard::enter(key)?;
                func.call(self)
            }
            None => Err(Error::KeyNotFound(key.into())),
        }
    }

    pub fn get_f64(&self, key: &str) -> Result<f64> {
        let value = self.get(key)?;
        value.as_f64().ok_or_else(|| invalid_type(key, "number", &value))
    }

    pub fn get_str(&self, key: &str) -> Result<String> {
        match self.get(key)? {
            Value::String(s) => Ok(s),
            value => Err(invalid_type(key, "string", &value)),
        }
    }

    pub fn get_bool(&self, key: &str) -> Result<bool> {
        let value = self.get(key)?;
        value.as_bool().ok_or_else(|| invalid_type(key, "bool", &value))
    }

    pub fn get_entry(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: impl Into<SmolStr>, entry: impl Into<Entry>) -> Option<Entry> {
        self.entries.insert(key.into(), entry.into())
    }

    pub fn insert_dynamic<F>(&mut self, key: impl Into<SmolStr>, func: F) -> Option<Entry>
    where
        F: Fn(&OptionsDict) -> Result<Value> + Send + Sync + 'static,
    {
        let key = key.into();
        let func = DynamicFn::new(key.clone(), func);
        self.entries.insert(key, Entry::Dynamic(func))
    }

    /// Registers a dynamic entry under its own name.
    pub fn register(&mut self, func: DynamicFn) -> Option<Entry> {
        self.entries.insert(func.name().into(), Entry::Dynamic(func))
    }

    pub fn remove(&mut self, key: &str) -> Option<Entry> {
        self.entries.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|key| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merges `other` into this dictionary. Node infos are concatenated and
    /// entries of `other` override existing keys.
    pub fn update(&mut self, other: &OptionsDict) {
        self.node_info.extend(other.node_info.iter().cloned());
        self.entries.extend(
            other
                .entries
                .iter()
                .map(|(key, entry)| (key.clone(), entry.clone())),
        );
    }

    /// Evaluates every entry.
    pub fn resolve_all(&self) -> Result<BTreeMap<SmolStr, Value>> {
        self.entries
            .keys()
            .map(|key| Ok((key.clone(), self.get(key)?)))
            .collect()
    }

    /// Replaces every dynamic entry with its current value.
    ///
    /// All values are computed before any entry is replaced, so the result
    /// does not depend on key order. Fails without modifying the dictionary.
    pub fn freeze(&mut self) -> Result<()> {
        let resolved = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_dynamic())
            .map(|(key, _)| Ok((key.clone(), self.get(key)?)))
            .collect::<Result<Vec<_>>>()?;

        log::trace!("freezing {} dynamic entries", resolved.len());

        for (key, value) in resolved {
            self.entries.insert(key, Entry::Static(value));
        }

        Ok(())
    }

    pub fn frozen(&self) -> Result<Self> {
        let mut dict = self.clone();
        dict.freeze()?;
        Ok(dict)
    }

    /// Like [`freeze`](Self::freeze) but leaves entries whose dependencies are
    /// missing dynamic. Returns the number of frozen entries.
    pub fn freeze_resolvable(&mut self) -> Result<usize> {
        let mut resolved = Vec::new();

        for (key, entry) in &self.entries {
            if !entry.is_dynamic() {
                continue;
            }

            match self.get(key) {
                Ok(value) => resolved.push((key.clone(), value)),
                Err(Error::KeyNotFound(missing)) => {
                    log::debug!("leaving \"{}\" dynamic, \"{}\" is not defined", key, missing);
                }
                Err(err) => return Err(err),
            }
        }

        let count = resolved.len();
        for (key, value) in resolved {
            self.entries.insert(key, Entry::Static(value));
        }

        Ok(count)
    }

    pub fn node_info(&self) -> &[NodeInfo] {
        &self.node_info
    }

    /// Returns the first node info, or the first belonging to
    /// `collection_name`.
    pub fn get_node_info(&self, collection_name: Option<&str>) -> Result<&NodeInfo> {
        let found = match collection_name {
            None => self.node_info.first(),
            Some(name) => self.node_info.iter().find(|info| info.belongs_to(name)),
        };

        found.ok_or_else(|| Error::MissingNodeInfo(collection_name.map(SmolStr::new)))
    }

    /// Replaces the first node info (appending when there is none), or the
    /// first belonging to `collection_name`.
    pub fn set_node_info(
        &mut self,
        node_info: NodeInfo,
        collection_name: Option<&str>,
    ) -> Result<()> {
        match collection_name {
            None => match self.node_info.first_mut() {
                Some(first) => *first = node_info,
                None => self.node_info.push(node_info),
            },
            Some(name) => {
                let slot = self
                    .node_info
                    .iter_mut()
                    .find(|info| info.belongs_to(name))
                    .ok_or_else(|| Error::MissingNodeInfo(Some(name.into())))?;
                *slot = node_info;
            }
        }

        Ok(())
    }

    pub(crate) fn replace_node_info(&mut self, node_info: NodeInfo) {
        self.node_info.clear();
        self.node_info.push(node_info);
    }

    /// Builds an identifier from a filtered subset of the node infos.
    pub fn str_with(&self, options: &StrOptions) -> Result<String> {
        let node_info = self
            .node_info
            .iter()
            .filter(|info| options.keeps(info))
            .collect::<Vec<_>>();

        options.formatter.as_ref().unwrap_or(&self.formatter).format(
            &node_info,
            options.absolute.as_ref(),
            options.relative.as_ref(),
        )
    }
}

fn invalid_type(key: &str, expected: &'static str, value: &Value) -> Error {
    Error::InvalidType {
        key: key.into(),
        expected,
        actual: value.type_name(),
    }
}

impl fmt::Display for OptionsDict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.str_with(&StrOptions::default()).map_err(|_| fmt::Error)?;
        write!(f, "{}", name)
    }
}

impl fmt::Debug for OptionsDict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionsDict")
            .field(
                "node_info",
                &self
                    .node_info
                    .iter()
                    .map(|info| info.to_string())
                    .collect::<Vec<_>>(),
            )
            .field("entries", &self.entries)
            .finish()
    }
}

/// Equal when node infos match and every entry resolves to the same result.
impl PartialEq for OptionsDict {
    fn eq(&self, other: &Self) -> bool {
        self.node_info == other.node_info
            && self.entries.len() == other.entries.len()
            && self
                .entries
                .keys()
                .all(|key| other.contains_key(key) && self.get(key) == other.get(key))
    }
}

impl<K: Into<SmolStr>, V: Into<Entry>> Extend<(K, V)> for OptionsDict {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        self.entries
            .extend(iter.into_iter().map(|(key, value)| (key.into(), value.into())));
    }
}

impl Extend<DynamicFn> for OptionsDict {
    fn extend<T: IntoIterator<Item = DynamicFn>>(&mut self, iter: T) {
        for func in iter {
            self.register(func);
        }
    }
}

impl<K: Into<SmolStr>, V: Into<Entry>> FromIterator<(K, V)> for OptionsDict {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut dict = Self::new();
        dict.extend(iter);
        dict
    }
}

impl<K: Into<SmolStr>, V: Into<Entry>, const N: usize> From<[(K, V); N]> for OptionsDict {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::formatter::{FormatterConfig, SimpleFormatter};
    use crate::node_info::ArrayNodeInfo;
    use rstest::{fixture, rstest};

    fn array_info(array: &str, names: &[&str], index: usize) -> NodeInfo {
        let names: Arc<[SmolStr]> = names.iter().map(SmolStr::new).collect();
        ArrayNodeInfo::new(array, names, index).unwrap().into()
    }

    #[fixture]
    fn leaf() -> OptionsDict {
        OptionsDict::from([("fluid", "water")])
            .with_node_info(array_info("fluid", &["water", "oil"], 0))
            .with_node_info(array_info("pipe", &["10mm", "20mm", "30mm"], 1))
            .with_node_info(array_info("velocity", &["slow", "fast"], 1))
    }

    #[test]
    fn test_dynamic_resolution() {
        let mut dict = OptionsDict::new();
        dict.insert_dynamic("f", |d| Ok((d.get_f64("x")? * 2.0).into()));

        assert_eq!(dict.get("f"), Err(Error::KeyNotFound("x".into())));

        dict.insert("x", 5);
        assert_eq!(dict.get("f"), Ok(Value::from(10)));

        dict.insert("x", 6);
        assert_eq!(dict.get("f"), Ok(Value::from(12)));
    }

    #[test]
    fn test_chained_dynamic_resolution() {
        let mut dict = OptionsDict::from_fns([
            DynamicFn::new("area", |d| {
                let d_ = d.get_f64("diameter")?;
                Ok((d_ * d_ / 4.0).into())
            }),
            DynamicFn::new("flow", |d| {
                Ok((d.get_f64("area")? * d.get_f64("velocity")?).into())
            }),
        ]);
        dict.extend([("diameter", 2.0), ("velocity", 3.0)]);

        assert_eq!(dict.get("flow"), Ok(Value::from(3)));
    }

    #[test]
    fn test_missing_dependency_propagates_through_chain() {
        let dict = OptionsDict::from_fns([
            DynamicFn::new("a", |d| d.get("b")),
            DynamicFn::new("b", |d| d.get("c")),
        ]);

        assert_eq!(dict.get("a"), Err(Error::KeyNotFound("c".into())));
    }

    #[test]
    fn test_recursion_limit() {
        let dict = OptionsDict::from_fns([
            DynamicFn::new("ping", |d| d.get("pong")),
            DynamicFn::new("pong", |d| d.get("ping")),
        ]);

        assert!(matches!(dict.get("ping"), Err(Error::RecursionLimit(_))));
        // the guard unwinds, so later lookups start from zero again
        assert!(matches!(dict.get("pong"), Err(Error::RecursionLimit(_))));
    }

    #[rstest]
    #[case("x", Ok(1.5))]
    #[case("name", Err(Error::InvalidType { key: "name".into(), expected: "number", actual: "string" }))]
    #[case("missing", Err(Error::KeyNotFound("missing".into())))]
    fn test_get_f64(#[case] key: &str, #[case] expected: Result<f64>) {
        let dict = OptionsDict::from([("x", Entry::from(1.5)), ("name", Entry::from("a"))]);
        assert_eq!(dict.get_f64(key), expected);
    }

    #[test]
    fn test_typed_getters() {
        let dict = OptionsDict::from([("name", Entry::from("oil")), ("hot", Entry::from(true))]);
        assert_eq!(dict.get_str("name"), Ok("oil".to_string()));
        assert_eq!(dict.get_bool("hot"), Ok(true));
        assert!(dict.get_str("hot").is_err());
    }

    #[test]
    fn test_update_concatenates_node_info_and_overrides() {
        let mut left = OptionsDict::from([("a", 1), ("b", 2)]).with_node_info(NodeInfo::orphan("left"));
        let right = OptionsDict::from([("b", 3), ("c", 4)]).with_node_info(NodeInfo::orphan("right"));

        left.update(&right);

        assert_eq!(left.get("b"), Ok(Value::from(3)));
        assert_eq!(left.len(), 3);
        assert_eq!(left.to_string(), "left_right");
        assert_eq!(right.to_string(), "right");
    }

    #[test]
    fn test_update_with_plain_mapping() {
        let mut dict = OptionsDict::new().with_node_info(NodeInfo::orphan("run"));
        dict.extend([("a", 1)]);

        assert_eq!(dict.node_info().len(), 1);
        assert_eq!(dict.get("a"), Ok(Value::from(1)));
    }

    #[test]
    fn test_copy_does_not_share_node_info() {
        let original = OptionsDict::from([("a", 1)]).with_node_info(NodeInfo::orphan("first"));
        let mut copy = original.clone();

        copy.set_node_info(NodeInfo::orphan("second"), None).unwrap();
        copy.insert("a", 2);

        assert_eq!(original.to_string(), "first");
        assert_eq!(original.get("a"), Ok(Value::from(1)));
        assert_eq!(copy.to_string(), "second");
    }

    #[rstest]
    fn test_get_node_info(leaf: OptionsDict) {
        assert_eq!(leaf.get_node_info(None).unwrap().node_name(), "water");
        assert_eq!(leaf.get_node_info(Some("pipe")).unwrap().node_name(), "20mm");
        assert_eq!(
            leaf.get_node_info(Some("colour")),
            Err(Error::MissingNodeInfo(Some("colour".into())))
        );
        assert_eq!(
            OptionsDict::new().get_node_info(None),
            Err(Error::MissingNodeInfo(None))
        );
    }

    #[rstest]
    fn test_set_node_info(mut leaf: OptionsDict) {
        leaf.set_node_info(array_info("pipe", &["10mm", "20mm", "30mm"], 2), Some("pipe"))
            .unwrap();
        assert_eq!(leaf.to_string(), "water_30mm_fast");

        assert_eq!(
            leaf.set_node_info(NodeInfo::orphan("x"), Some("colour")),
            Err(Error::MissingNodeInfo(Some("colour".into())))
        );

        let mut empty = OptionsDict::new();
        empty.set_node_info(NodeInfo::orphan("x"), None).unwrap();
        assert_eq!(empty.to_string(), "x");
    }

    #[rstest]
    #[case(StrOptions::default(), Ok("water_20mm_fast"))]
    #[case(StrOptions::default().only(["velocity", "fluid"]), Ok("water_fast"))]
    #[case(StrOptions::default().exclude(["pipe"]), Ok("water_fast"))]
    #[case(StrOptions::default().only(["pipe"]).exclude(["pipe"]), Ok(""))]
    #[case(StrOptions::default().absolute([("pipe", 0)]), Ok("water_10mm_fast"))]
    #[case(StrOptions::default().relative([("pipe", 1)]), Ok("water_30mm_fast"))]
    #[case(StrOptions::default().relative([("velocity", 1)]), Err(Error::IndexOutOfRange { index: 2, size: 2 }))]
    #[case(StrOptions::default().absolute(-1), Ok("oil_30mm_fast"))]
    #[case(
        StrOptions::default().formatter(SimpleFormatter::new(&FormatterConfig {
            node_separator: "-".into(),
            collection_separator: Some(":".into()),
            ..Default::default()
        })),
        Ok("fluid:water-pipe:20mm-velocity:fast")
    )]
    fn test_str_with(leaf: OptionsDict, #[case] options: StrOptions, #[case] expected: Result<&str>) {
        assert_eq!(leaf.str_with(&options), expected.map(ToString::to_string));
    }

    #[test]
    fn test_only_drops_orphans() {
        let dict = OptionsDict::new()
            .with_node_info(NodeInfo::orphan("base"))
            .with_node_info(array_info("pipe", &["10mm"], 0));

        assert_eq!(dict.to_string(), "base_10mm");
        assert_eq!(
            dict.str_with(&StrOptions::default().only(["pipe"])).unwrap(),
            "10mm"
        );
    }

    #[test]
    fn test_equality_uses_resolved_values() {
        let mut dynamic = OptionsDict::from([("x", 2)]);
        dynamic.insert_dynamic("y", |d| Ok((d.get_f64("x")? + 1.0).into()));
        let fixed = OptionsDict::from([("x", 2), ("y", 3)]);

        assert_eq!(dynamic, fixed);
        assert_ne!(
            dynamic.clone().with_node_info(NodeInfo::orphan("a")),
            fixed.clone().with_node_info(NodeInfo::orphan("b"))
        );
        assert_ne!(fixed, OptionsDict::from([("x", 2)]));
    }

    #[test]
    fn test_freeze() {
        let mut dict = OptionsDict::from([("x", 2)]);
        dict.insert_dynamic("y", |d| Ok((d.get_f64("x")? * 10.0).into()));

        let frozen = dict.frozen().unwrap();
        dict.insert("x", 3);

        assert_eq!(dict.get("y"), Ok(Value::from(30)));
        assert_eq!(frozen.get("y"), Ok(Value::from(20)));
        assert!(!frozen.get_entry("y").unwrap().is_dynamic());
    }

    #[test]
    fn test_freeze_fails_without_modifying() {
        let mut dict = OptionsDict::from([("x", 2)]);
        dict.insert_dynamic("y", |d| Ok((d.get_f64("x")? * 10.0).into()));
        dict.insert_dynamic("z", |d| d.get("missing"));

        assert_eq!(dict.freeze(), Err(Error::KeyNotFound("missing".into())));
        assert!(dict.get_entry("y").unwrap().is_dynamic());

        assert_eq!(dict.freeze_resolvable(), Ok(1));
        assert!(!dict.get_entry("y").unwrap().is_dynamic());
        assert!(dict.get_entry("z").unwrap().is_dynamic());
    }

    #[test]
    fn test_resolve_all() {
        let mut dict = OptionsDict::from([("x", 1)]);
        dict.insert_dynamic("y", |d| d.get("x"));

        let resolved = dict.resolve_all().unwrap();
        assert_eq!(resolved.get("y"), Some(&Value::from(1)));
        assert_eq!(dict.keys().collect::<Vec<_>>(), vec!["x", "y"]);
    }

    #[test]
    fn test_dict_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<OptionsDict>();
    }
}
