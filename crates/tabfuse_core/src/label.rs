//! Label domain trait.

use std::fmt::{Debug, Display};

/// A value usable as a class label.
///
/// Labels only need a total order (so classes get a stable, sorted index),
/// cloning, and a display form for reports and figures. Strings, integers
/// and most user enums qualify through the blanket implementation.
///
/// ```rust
/// use tabfuse_core::ClassLabel;
///
/// fn takes_label<L: ClassLabel>(_l: L) {}
/// takes_label("cat".to_string());
/// takes_label(3_i64);
/// ```
pub trait ClassLabel: Clone + Ord + Debug + Display {}

impl<T> ClassLabel for T where T: Clone + Ord + Debug + Display {}
