//! Compare module - dual-axis alignment of CPI against one exchange rate

mod comparator;

pub use comparator::{CompareError, Comparator, ComparisonView, Selection};
