use std::fmt;

/// Integers above this magnitude are not all exactly representable.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// Numeric option value. Integers and floats share one representation so that
/// `1` and `1.0` name the same node.
#[derive(Debug, Clone, PartialEq, Copy, Default)]
pub struct Number(f64);

impl Number {
    pub fn new(value: f64) -> Self {
        Number(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

macro_rules! number_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Number {
                fn from(value: $ty) -> Self {
                    Number(value as f64)
                }
            }
        )*
    };
}

number_from!(i32, i64, u32, u64, usize, isize, f32, f64);

/// Whole numbers print without a fractional part, everything else uses the
/// shortest representation that reads back to the same value.
impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 && self.0.abs() < MAX_EXACT_INT {
            write!(f, "{}", self.0 as i64)
        } else {
            write!(f, "{}", self.0)
        }
    }
}
