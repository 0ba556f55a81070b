//! Discrete-domain scales: band, point, ordinal and bin-ordinal

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::breaks::bisect_right;
use super::color::CategoricalColorScale;
use super::realized::ScaleTrait;
use super::ScaleType;
use crate::Value;

/// Deduplicate values by key, keeping first-seen order
pub(crate) fn unique_values(values: impl IntoIterator<Item = Value>) -> (Vec<Value>, HashMap<String, usize>) {
    let mut unique = Vec::new();
    let mut index = HashMap::new();
    for value in values {
        let key = value.to_key_string();
        if !index.contains_key(&key) {
            index.insert(key, unique.len());
            unique.push(value);
        }
    }
    (unique, index)
}

// =============================================================================
// Band / point
// =============================================================================

/// Evenly spaced positions across a numeric interval, one per domain value
///
/// A point scale is a band scale whose inner padding is fixed at 1, so every
/// band collapses to a position.
#[derive(Debug, Clone)]
pub struct BandScale {
    scale_type: ScaleType,
    domain: Vec<Value>,
    index: HashMap<String, usize>,
    range: (f64, f64),
    padding_inner: f64,
    padding_outer: f64,
    align: f64,
    round: bool,
    step: f64,
    bandwidth: f64,
    positions: Vec<f64>,
}

impl BandScale {
    pub fn band() -> Self {
        Self::with_type(ScaleType::Band, 0.0)
    }

    pub fn point() -> Self {
        Self::with_type(ScaleType::Point, 1.0)
    }

    fn with_type(scale_type: ScaleType, padding_inner: f64) -> Self {
        let mut scale = Self {
            scale_type,
            domain: Vec::new(),
            index: HashMap::new(),
            range: (0.0, 1.0),
            padding_inner,
            padding_outer: 0.0,
            align: 0.5,
            round: false,
            step: 0.0,
            bandwidth: 0.0,
            positions: Vec::new(),
        };
        scale.rescale();
        scale
    }

    pub fn set_domain(&mut self, values: Vec<Value>) {
        let (domain, index) = unique_values(values);
        self.domain = domain;
        self.index = index;
        self.rescale();
    }

    pub fn set_range(&mut self, start: f64, stop: f64) {
        self.range = (start, stop);
        self.rescale();
    }

    pub fn reverse_range(&mut self) {
        self.range = (self.range.1, self.range.0);
        self.rescale();
    }

    pub fn set_align(&mut self, align: f64) {
        self.align = align.clamp(0.0, 1.0);
        self.rescale();
    }

    /// Band: inner and outer padding at once. Point: outer padding.
    pub fn set_padding(&mut self, padding: f64) {
        if self.scale_type == ScaleType::Band {
            self.padding_inner = padding.min(1.0);
        }
        self.padding_outer = padding;
        self.rescale();
    }

    pub fn set_padding_inner(&mut self, padding: f64) {
        if self.scale_type == ScaleType::Band {
            self.padding_inner = padding.min(1.0);
            self.rescale();
        }
    }

    pub fn set_padding_outer(&mut self, padding: f64) {
        self.padding_outer = padding;
        self.rescale();
    }

    pub fn set_round(&mut self, round: bool) {
        self.round = round;
        self.rescale();
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    fn rescale(&mut self) {
        let n = self.domain.len() as f64;
        let (r0, r1) = self.range;
        let reverse = r1 < r0;
        let (start, stop) = if reverse { (r1, r0) } else { (r0, r1) };

        let mut step = (stop - start) / (n - self.padding_inner + self.padding_outer * 2.0).max(1.0);
        if self.round {
            step = step.floor();
        }
        let mut first = start + (stop - start - step * (n - self.padding_inner)) * self.align;
        let mut bandwidth = step * (1.0 - self.padding_inner);
        if self.round {
            first = first.round();
            bandwidth = bandwidth.round();
        }

        self.step = step;
        self.bandwidth = bandwidth;
        self.positions = (0..self.domain.len())
            .map(|i| first + step * i as f64)
            .collect();
        if reverse {
            self.positions.reverse();
        }
    }
}

impl ScaleTrait for BandScale {
    fn scale_type(&self) -> ScaleType {
        self.scale_type
    }

    fn apply(&self, value: &Value) -> Value {
        self.index
            .get(&value.to_key_string())
            .map_or(Value::Null, |i| Value::Number(self.positions[*i]))
    }

    fn domain(&self) -> Vec<Value> {
        self.domain.clone()
    }

    fn range(&self) -> Vec<Value> {
        vec![Value::Number(self.range.0), Value::Number(self.range.1)]
    }

    fn bandwidth(&self) -> Option<f64> {
        Some(self.bandwidth)
    }
}

// =============================================================================
// Ordinal
// =============================================================================

#[derive(Debug, Default)]
struct OrdinalDomain {
    values: Vec<Value>,
    index: HashMap<String, usize>,
}

/// Maps the i-th domain value to the i-th range value, cycling the range
///
/// Values outside the domain are appended to it on first lookup.
#[derive(Debug)]
pub struct OrdinalScale {
    range: Vec<Value>,
    domain: RwLock<OrdinalDomain>,
}

impl OrdinalScale {
    pub fn new(domain: Vec<Value>, range: Vec<Value>) -> Self {
        let (values, index) = unique_values(domain);
        Self {
            range,
            domain: RwLock::new(OrdinalDomain { values, index }),
        }
    }

    fn slot(&self, i: usize) -> Value {
        if self.range.is_empty() {
            Value::Null
        } else {
            self.range[i % self.range.len()].clone()
        }
    }
}

impl ScaleTrait for OrdinalScale {
    fn scale_type(&self) -> ScaleType {
        ScaleType::Ordinal
    }

    fn apply(&self, value: &Value) -> Value {
        let key = value.to_key_string();
        {
            let domain = self.domain.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(i) = domain.index.get(&key) {
                return self.slot(*i);
            }
        }

        let mut domain = self.domain.write().unwrap_or_else(PoisonError::into_inner);
        let i = match domain.index.get(&key) {
            Some(i) => *i,
            None => {
                let i = domain.values.len();
                domain.values.push(value.clone());
                domain.index.insert(key, i);
                i
            }
        };
        self.slot(i)
    }

    fn domain(&self) -> Vec<Value> {
        self.domain
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values
            .clone()
    }

    fn range(&self) -> Vec<Value> {
        self.range.clone()
    }
}

/// Ordinal scale over bins: the domain lists ascending bin boundaries
#[derive(Debug, Clone)]
pub struct BinOrdinalScale {
    boundaries: Vec<f64>,
    range: Vec<Value>,
}

impl BinOrdinalScale {
    pub fn new(boundaries: Vec<f64>, range: Vec<Value>) -> Self {
        Self { boundaries, range }
    }
}

impl ScaleTrait for BinOrdinalScale {
    fn scale_type(&self) -> ScaleType {
        ScaleType::BinOrdinal
    }

    fn apply(&self, value: &Value) -> Value {
        let Some(x) = value.as_f64() else {
            return Value::Null;
        };
        match bisect_right(&self.boundaries, x) {
            0 => Value::Null,
            _ if self.range.is_empty() => Value::Null,
            i => self.range[(i - 1) % self.range.len()].clone(),
        }
    }

    fn domain(&self) -> Vec<Value> {
        self.boundaries.iter().map(|b| Value::Number(*b)).collect()
    }

    fn range(&self) -> Vec<Value> {
        self.range.clone()
    }
}

// =============================================================================
// Shared categorical colors
// =============================================================================

/// Ordinal color scale backed by a namespace-wide color table
#[derive(Debug)]
pub struct NamespacedColorScale {
    table: Arc<CategoricalColorScale>,
    domain: Vec<Value>,
}

impl NamespacedColorScale {
    /// Pre-assigns the i-th domain value the i-th palette color
    pub fn new(table: Arc<CategoricalColorScale>, domain: Vec<Value>) -> Self {
        let (domain, _) = unique_values(domain);
        let colors = table.colors();
        if !colors.is_empty() {
            for (i, value) in domain.iter().enumerate() {
                table.set_color(value, colors[i % colors.len()].clone());
            }
        }
        Self { table, domain }
    }
}

impl ScaleTrait for NamespacedColorScale {
    fn scale_type(&self) -> ScaleType {
        ScaleType::Ordinal
    }

    fn apply(&self, value: &Value) -> Value {
        if value.is_null() {
            return Value::Null;
        }
        Value::String(self.table.color_for(value))
    }

    fn domain(&self) -> Vec<Value> {
        self.domain.clone()
    }

    fn range(&self) -> Vec<Value> {
        self.table
            .colors()
            .iter()
            .map(|c| Value::String(c.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(items: &[&str]) -> Vec<Value> {
        items.iter().map(|s| Value::from(*s)).collect()
    }

    #[test]
    fn test_point_scale() {
        let mut scale = BandScale::point();
        scale.set_domain(values(&["a", "b", "c"]));
        scale.set_range(0.0, 100.0);
        assert_eq!(scale.apply(&Value::from("a")), Value::Number(0.0));
        assert_eq!(scale.apply(&Value::from("b")), Value::Number(50.0));
        assert_eq!(scale.apply(&Value::from("c")), Value::Number(100.0));
        assert_eq!(scale.apply(&Value::from("d")), Value::Null);
        assert_eq!(scale.bandwidth(), Some(0.0));
    }

    #[test]
    fn test_point_padding() {
        let mut scale = BandScale::point();
        scale.set_domain(values(&["a", "b"]));
        scale.set_range(0.0, 100.0);
        scale.set_padding(0.5);
        assert_eq!(scale.apply(&Value::from("a")), Value::Number(25.0));
        assert_eq!(scale.apply(&Value::from("b")), Value::Number(75.0));
    }

    #[test]
    fn test_band_scale() {
        let mut scale = BandScale::band();
        scale.set_domain(values(&["a", "b", "c", "d"]));
        scale.set_range(0.0, 100.0);
        assert_eq!(scale.apply(&Value::from("b")), Value::Number(25.0));
        assert_eq!(scale.bandwidth(), Some(25.0));

        scale.set_padding(0.2);
        // step = 100 / (4 - 0.2 + 0.4)
        let step = 100.0 / 4.2;
        assert!((scale.step() - step).abs() < 1e-9);
        assert!((scale.bandwidth().unwrap() - step * 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_band_align_and_round() {
        let mut scale = BandScale::band();
        scale.set_domain(values(&["a", "b", "c"]));
        scale.set_range(0.0, 100.0);
        scale.set_padding_outer(1.0);
        scale.set_align(0.0);
        assert_eq!(scale.apply(&Value::from("a")), Value::Number(0.0));

        scale.set_round(true);
        assert_eq!(scale.step(), 20.0);
        assert_eq!(scale.bandwidth(), Some(20.0));
    }

    #[test]
    fn test_reversed_range() {
        let mut scale = BandScale::point();
        scale.set_domain(values(&["a", "b"]));
        scale.set_range(100.0, 0.0);
        assert_eq!(scale.apply(&Value::from("a")), Value::Number(100.0));
        assert_eq!(scale.apply(&Value::from("b")), Value::Number(0.0));
    }

    #[test]
    fn test_ordinal_implicit_domain() {
        let scale = OrdinalScale::new(values(&["a"]), vec![Value::from(1), Value::from(2)]);
        assert_eq!(scale.apply(&Value::from("a")), Value::from(1));
        assert_eq!(scale.apply(&Value::from("z")), Value::from(2));
        assert_eq!(scale.apply(&Value::from("y")), Value::from(1));
        assert_eq!(scale.domain(), values(&["a", "z", "y"]));
    }

    #[test]
    fn test_bin_ordinal() {
        let scale = BinOrdinalScale::new(vec![0.0, 10.0, 20.0], values(&["low", "high"]));
        assert_eq!(scale.apply(&Value::from(5)), Value::from("low"));
        assert_eq!(scale.apply(&Value::from(15)), Value::from("high"));
        assert_eq!(scale.apply(&Value::from(-1)), Value::Null);
    }

    #[test]
    fn test_namespaced_colors_follow_domain() {
        let table = Arc::new(CategoricalColorScale::new(vec!["red".into(), "blue".into()]));
        let scale = NamespacedColorScale::new(Arc::clone(&table), values(&["b", "a"]));
        assert_eq!(scale.apply(&Value::from("a")), Value::from("blue"));
        assert_eq!(scale.apply(&Value::from("b")), Value::from("red"));
        assert_eq!(scale.apply(&Value::Null), Value::Null);
    }
}
