use std::fmt;
use std::sync::Arc;

use smol_str::SmolStr;

use crate::error::Result;
use crate::number::Number;
use crate::value::Value;

use super::OptionsDict;

type DynamicFnInner = dyn Fn(&OptionsDict) -> Result<Value> + Send + Sync;

/// A value computed from the dictionary that owns it.
///
/// The function receives the whole dictionary and may look up other entries,
/// including other dynamic ones. It must not capture shared mutable state so
/// that the dictionary stays evaluable on another thread or process.
#[derive(Clone)]
pub struct DynamicFn {
    name: SmolStr,
    func: Arc<DynamicFnInner>,
}

impl DynamicFn {
    pub fn new<F>(name: impl Into<SmolStr>, func: F) -> Self
    where
        F: Fn(&OptionsDict) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline(always)]
    pub fn call(&self, dict: &OptionsDict) -> Result<Value> {
        (self.func)(dict)
    }
}

impl fmt::Debug for DynamicFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DynamicFn({})", self.name)
    }
}

#[derive(Clone, Debug)]
pub enum Entry {
    Static(Value),
    Dynamic(DynamicFn),
}

impl Entry {
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Entry::Dynamic(_))
    }
}

impl From<DynamicFn> for Entry {
    fn from(func: DynamicFn) -> Self {
        Entry::Dynamic(func)
    }
}

macro_rules! entry_from_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Entry {
                fn from(value: $ty) -> Self {
                    Entry::Static(value.into())
                }
            }
        )*
    };
}

entry_from_value!(Value, Number, bool, String, &str, i32, i64, u32, u64, usize, f32, f64);

impl<T: Into<Value>> From<Vec<T>> for Entry {
    fn from(values: Vec<T>) -> Self {
        Entry::Static(values.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_from_value() {
        assert!(matches!(Entry::from(1), Entry::Static(Value::Number(_))));
        assert!(matches!(Entry::from("water"), Entry::Static(Value::String(_))));
        assert!(!Entry::from(true).is_dynamic());
    }

    #[test]
    fn test_dynamic_fn() {
        let func = DynamicFn::new("double", |dict| Ok((dict.get_f64("x")? * 2.0).into()));
        let dict = OptionsDict::from([("x", 4)]);

        assert_eq!(func.name(), "double");
        assert_eq!(func.call(&dict), Ok(Value::from(8)));
        assert!(Entry::from(func.clone()).is_dynamic());
        assert_eq!(format!("{:?}", func), "DynamicFn(double)");
    }
}
