//! Continuous-domain to discrete-range scales: quantize, quantile, threshold

use super::breaks::{bisect_right, linear_nice, linear_ticks};
use super::realized::ScaleTrait;
use super::ScaleType;
use crate::Value;

fn pick(range: &[Value], i: usize) -> Value {
    range.get(i).cloned().unwrap_or(Value::Null)
}

/// Splits `[x0, x1]` into equal-width segments, one per range value
#[derive(Debug, Clone)]
pub struct QuantizeScale {
    extent: (f64, f64),
    range: Vec<Value>,
    thresholds: Vec<f64>,
}

impl QuantizeScale {
    pub fn new(extent: (f64, f64), range: Vec<Value>) -> Self {
        let mut scale = Self {
            extent,
            range,
            thresholds: Vec::new(),
        };
        scale.rescale();
        scale
    }

    fn rescale(&mut self) {
        let (x0, x1) = self.extent;
        let n = self.range.len().saturating_sub(1);
        let segments = (n + 1) as f64;
        self.thresholds = (0..n)
            .map(|i| {
                let i = i as f64;
                ((i + 1.0) * x1 - (i - n as f64) * x0) / segments
            })
            .collect();
    }

    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    pub fn nice(&mut self, count: usize) {
        self.extent = linear_nice(self.extent.0, self.extent.1, count);
        self.rescale();
    }

    pub fn include_zero(&mut self) {
        let (x0, x1) = self.extent;
        self.extent = if x0 <= x1 {
            (x0.min(0.0), x1.max(0.0))
        } else {
            (x0.max(0.0), x1.min(0.0))
        };
        self.rescale();
    }
}

impl ScaleTrait for QuantizeScale {
    fn scale_type(&self) -> ScaleType {
        ScaleType::Quantize
    }

    fn apply(&self, value: &Value) -> Value {
        value
            .as_f64()
            .map_or(Value::Null, |x| pick(&self.range, bisect_right(&self.thresholds, x)))
    }

    fn domain(&self) -> Vec<Value> {
        vec![Value::Number(self.extent.0), Value::Number(self.extent.1)]
    }

    fn range(&self) -> Vec<Value> {
        self.range.clone()
    }

    fn ticks(&self, count: usize) -> Vec<Value> {
        linear_ticks(self.extent.0, self.extent.1, count)
            .into_iter()
            .map(Value::Number)
            .collect()
    }
}

/// Quantile of a sorted sample, interpolating between closest ranks
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 || p.is_nan() {
        return None;
    }
    if p <= 0.0 || n == 1 {
        return Some(sorted[0]);
    }
    if p >= 1.0 {
        return Some(sorted[n - 1]);
    }
    let i = (n - 1) as f64 * p;
    let i0 = i.floor() as usize;
    let (v0, v1) = (sorted[i0], sorted[i0 + 1]);
    Some(v0 + (v1 - v0) * (i - i0 as f64))
}

/// Splits a sample into groups of equal size, one per range value
#[derive(Debug, Clone)]
pub struct QuantileScale {
    sample: Vec<f64>,
    range: Vec<Value>,
    thresholds: Vec<f64>,
}

impl QuantileScale {
    pub fn new(sample: Vec<f64>, range: Vec<Value>) -> Self {
        let mut sample: Vec<f64> = sample.into_iter().filter(|x| !x.is_nan()).collect();
        sample.sort_by(|a, b| a.total_cmp(b));
        let n = range.len();
        let thresholds = (1..n.max(1))
            .filter_map(|i| quantile_sorted(&sample, i as f64 / n as f64))
            .collect();
        Self {
            sample,
            range,
            thresholds,
        }
    }

    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }
}

impl ScaleTrait for QuantileScale {
    fn scale_type(&self) -> ScaleType {
        ScaleType::Quantile
    }

    fn apply(&self, value: &Value) -> Value {
        value
            .as_f64()
            .map_or(Value::Null, |x| pick(&self.range, bisect_right(&self.thresholds, x)))
    }

    fn domain(&self) -> Vec<Value> {
        self.sample.iter().map(|x| Value::Number(*x)).collect()
    }

    fn range(&self) -> Vec<Value> {
        self.range.clone()
    }
}

/// Maps values below `domain[0]` to `range[0]`, between `domain[0]` and
/// `domain[1]` to `range[1]`, and so on
#[derive(Debug, Clone)]
pub struct ThresholdScale {
    thresholds: Vec<f64>,
    range: Vec<Value>,
}

impl ThresholdScale {
    pub fn new(thresholds: Vec<f64>, range: Vec<Value>) -> Self {
        Self { thresholds, range }
    }
}

impl ScaleTrait for ThresholdScale {
    fn scale_type(&self) -> ScaleType {
        ScaleType::Threshold
    }

    fn apply(&self, value: &Value) -> Value {
        let Some(x) = value.as_f64() else {
            return Value::Null;
        };
        let usable = self
            .thresholds
            .len()
            .min(self.range.len().saturating_sub(1));
        pick(&self.range, bisect_right(&self.thresholds[..usable], x))
    }

    fn domain(&self) -> Vec<Value> {
        self.thresholds.iter().map(|x| Value::Number(*x)).collect()
    }

    fn range(&self) -> Vec<Value> {
        self.range.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<Value> {
        items.iter().map(|s| Value::from(*s)).collect()
    }

    #[test]
    fn test_quantize() {
        let scale = QuantizeScale::new((0.0, 1.0), labels(&["a", "b", "c", "d"]));
        assert_eq!(scale.thresholds(), &[0.25, 0.5, 0.75]);
        assert_eq!(scale.apply(&Value::from(0.1)), Value::from("a"));
        assert_eq!(scale.apply(&Value::from(0.5)), Value::from("c"));
        assert_eq!(scale.apply(&Value::from(2.0)), Value::from("d"));
        assert_eq!(scale.apply(&Value::Null), Value::Null);
    }

    #[test]
    fn test_quantize_nice() {
        let mut scale = QuantizeScale::new((0.3, 9.6), labels(&["a", "b"]));
        scale.nice(10);
        assert_eq!(scale.domain(), vec![Value::from(0.0), Value::from(10.0)]);
        assert_eq!(scale.thresholds(), &[5.0]);
    }

    #[test]
    fn test_quantile() {
        let sample = (1..=10).map(|x| x as f64).collect();
        let scale = QuantileScale::new(sample, labels(&["a", "b", "c", "d"]));
        assert_eq!(scale.thresholds(), &[3.25, 5.5, 7.75]);
        assert_eq!(scale.apply(&Value::from(1)), Value::from("a"));
        assert_eq!(scale.apply(&Value::from(5)), Value::from("b"));
        assert_eq!(scale.apply(&Value::from(10)), Value::from("d"));
    }

    #[test]
    fn test_quantile_sorted() {
        assert_eq!(quantile_sorted(&[], 0.5), None);
        assert_eq!(quantile_sorted(&[1.0, 3.0], 0.5), Some(2.0));
        assert_eq!(quantile_sorted(&[1.0, 3.0], 1.0), Some(3.0));
    }

    #[test]
    fn test_threshold() {
        let scale = ThresholdScale::new(vec![0.0, 1.0], labels(&["neg", "low", "high"]));
        assert_eq!(scale.apply(&Value::from(-0.5)), Value::from("neg"));
        assert_eq!(scale.apply(&Value::from(0.0)), Value::from("low"));
        assert_eq!(scale.apply(&Value::from(1.5)), Value::from("high"));
    }

    #[test]
    fn test_threshold_with_short_range() {
        let scale = ThresholdScale::new(vec![0.0, 1.0, 2.0], labels(&["a", "b"]));
        assert_eq!(scale.apply(&Value::from(5.0)), Value::from("b"));
    }
}
