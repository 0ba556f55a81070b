//! The realized scale: a function from data values to visual values
//!
//! Each family implements `ScaleTrait`; `Scale` wraps a trait object so that
//! encoders can hold any family behind one cheap-to-clone type.

use std::fmt;
use std::sync::Arc;

use super::ScaleType;
use crate::Value;

/// Behavior shared by every realized scale family
pub trait ScaleTrait: fmt::Debug + Send + Sync {
    fn scale_type(&self) -> ScaleType;

    /// Map a data value; unmappable input yields `Value::Null`
    fn apply(&self, value: &Value) -> Value;

    fn domain(&self) -> Vec<Value>;

    fn range(&self) -> Vec<Value>;

    /// Band width for band and point scales
    fn bandwidth(&self) -> Option<f64> {
        None
    }

    /// Representative domain values for axes and legends
    fn ticks(&self, _count: usize) -> Vec<Value> {
        self.domain()
    }
}

/// A realized scale of any family
#[derive(Clone)]
pub struct Scale(Arc<dyn ScaleTrait>);

impl Scale {
    pub fn new<S: ScaleTrait + 'static>(scale: S) -> Self {
        Self(Arc::new(scale))
    }

    pub fn scale_type(&self) -> ScaleType {
        self.0.scale_type()
    }

    pub fn apply(&self, value: &Value) -> Value {
        self.0.apply(value)
    }

    pub fn domain(&self) -> Vec<Value> {
        self.0.domain()
    }

    pub fn range(&self) -> Vec<Value> {
        self.0.range()
    }

    pub fn bandwidth(&self) -> Option<f64> {
        self.0.bandwidth()
    }

    pub fn ticks(&self, count: usize) -> Vec<Value> {
        self.0.ticks(count)
    }

    /// Borrow the scale as a plain function
    pub fn as_fn(&self) -> impl Fn(&Value) -> Value + '_ {
        move |value| self.apply(value)
    }
}

impl fmt::Debug for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
