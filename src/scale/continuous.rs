//! Continuous scales: linear, log, pow, sqrt, time and utc
//!
//! Domains may have more than two stops (piecewise/polylinear); each segment of
//! the domain maps onto the matching segment of the range. Ranges are either
//! numbers or colors.

use super::breaks::{
    bisect_right, linear_nice, linear_ticks, log_inverse, log_nice, log_ticks, log_transform,
};
use super::palettes::{ColorRamp, ColorSpace};
use super::realized::ScaleTrait;
use super::time::{millis_to_datetime, time_nice, time_ticks};
use super::ScaleType;
use crate::{EncodableError, Result, Value};

/// Numeric transform applied before interpolation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    Identity,
    Log { base: f64 },
    Pow { exponent: f64 },
}

/// Output side of a continuous scale
#[derive(Debug, Clone, PartialEq)]
pub enum OutputRange {
    Numeric(Vec<f64>),
    Color(ColorRamp),
}

impl OutputRange {
    /// Numbers stay numeric; anything else must parse as colors
    pub fn from_values(values: &[Value], space: ColorSpace) -> Result<Self> {
        let numbers: Option<Vec<f64>> = values
            .iter()
            .map(|v| match v {
                Value::Number(n) => Some(*n),
                _ => None,
            })
            .collect();
        match numbers {
            Some(numbers) => Ok(OutputRange::Numeric(numbers)),
            None => {
                let colors = values
                    .iter()
                    .map(|v| match v {
                        Value::String(s) => Ok(s.as_str()),
                        other => Err(EncodableError::InvalidConfig(format!(
                            "Range value {} is neither a number nor a color",
                            other
                        ))),
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(OutputRange::Color(ColorRamp::new(&colors, space)?))
            }
        }
    }

    pub fn len(&self) -> usize {
        match self {
            OutputRange::Numeric(values) => values.len(),
            OutputRange::Color(ramp) => ramp.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn reversed(self) -> Self {
        match self {
            OutputRange::Numeric(mut values) => {
                values.reverse();
                OutputRange::Numeric(values)
            }
            OutputRange::Color(ramp) => OutputRange::Color(ramp.reversed()),
        }
    }

    fn values(&self) -> Vec<Value> {
        match self {
            OutputRange::Numeric(values) => values.iter().map(|v| Value::Number(*v)).collect(),
            OutputRange::Color(ramp) => ramp.colors().into_iter().map(Value::String).collect(),
        }
    }

    fn value_at(&self, i: usize) -> Value {
        match self {
            OutputRange::Numeric(values) => values.get(i).map_or(Value::Null, |v| Value::Number(*v)),
            OutputRange::Color(ramp) => Value::String(ramp.mix(i, i, 0.0)),
        }
    }
}

/// A continuous-domain scale
#[derive(Debug, Clone)]
pub struct ContinuousScale {
    scale_type: ScaleType,
    transform: Transform,
    /// Epoch milliseconds for time scales
    domain: Vec<f64>,
    range: OutputRange,
    clamp: bool,
    round: bool,
}

impl ContinuousScale {
    pub fn new(scale_type: ScaleType, transform: Transform) -> Self {
        Self {
            scale_type,
            transform,
            domain: vec![0.0, 1.0],
            range: OutputRange::Numeric(vec![0.0, 1.0]),
            clamp: false,
            round: false,
        }
    }

    pub fn set_domain(&mut self, domain: Vec<f64>) {
        self.domain = domain;
    }

    pub fn domain_numbers(&self) -> &[f64] {
        &self.domain
    }

    pub fn set_range(&mut self, range: OutputRange) {
        self.range = range;
    }

    pub fn reverse_range(&mut self) {
        let range = std::mem::replace(&mut self.range, OutputRange::Numeric(vec![]));
        self.range = range.reversed();
    }

    pub fn set_clamp(&mut self, clamp: bool) {
        self.clamp = clamp;
    }

    pub fn set_round(&mut self, round: bool) {
        self.round = round;
    }

    /// Only affects color ranges
    pub fn set_interpolate(&mut self, space: ColorSpace) {
        if let OutputRange::Color(ramp) = &self.range {
            self.range = OutputRange::Color(ramp.clone().with_space(space));
        }
    }

    fn is_local_time(&self) -> bool {
        self.scale_type == ScaleType::Time
    }

    fn reflected(&self) -> bool {
        self.domain.first().is_some_and(|d| *d < 0.0)
    }

    fn forward(&self, x: f64) -> f64 {
        match self.transform {
            Transform::Identity => x,
            Transform::Log { base } => log_transform(x, base, self.reflected()),
            Transform::Pow { exponent } => {
                if x < 0.0 {
                    -(-x).powf(exponent)
                } else {
                    x.powf(exponent)
                }
            }
        }
    }

    /// Map a number (epoch milliseconds for time scales)
    pub fn map(&self, x: f64) -> Value {
        let n = self.domain.len().min(self.range.len());
        if n == 0 {
            return Value::Null;
        }
        if n == 1 {
            return self.range.value_at(0);
        }

        let mut stops: Vec<f64> = self.domain[..n].iter().map(|d| self.forward(*d)).collect();
        let mut slots: Vec<usize> = (0..n).collect();
        if stops.iter().any(|s| !s.is_finite()) {
            return Value::Null;
        }
        if stops[n - 1] < stops[0] {
            stops.reverse();
            slots.reverse();
        }

        let mut t = self.forward(x);
        if t.is_nan() {
            return Value::Null;
        }
        if self.clamp {
            t = t.clamp(stops[0], stops[n - 1]);
        }

        let i = bisect_right(&stops[1..n - 1], t);
        let (a, b) = (stops[i], stops[i + 1]);
        let u = if b == a { 0.5 } else { (t - a) / (b - a) };

        match &self.range {
            OutputRange::Numeric(values) => {
                let (r0, r1) = (values[slots[i]], values[slots[i + 1]]);
                let mut y = r0 + (r1 - r0) * u;
                if self.round {
                    y = y.round();
                }
                if y.is_finite() {
                    Value::Number(y)
                } else {
                    Value::Null
                }
            }
            OutputRange::Color(ramp) => {
                if !u.is_finite() {
                    Value::Null
                } else if self.domain.len() == 2 && ramp.len() > 2 {
                    // two-stop domain spreads over every color of a scheme
                    let u = u.clamp(0.0, 1.0);
                    Value::String(ramp.at(if slots[0] > slots[1] { 1.0 - u } else { u }))
                } else {
                    Value::String(ramp.mix(slots[i], slots[i + 1], u.clamp(0.0, 1.0)))
                }
            }
        }
    }

    /// Extend the domain ends to round values
    pub fn nice(&mut self, count: usize) {
        let last = self.domain.len().saturating_sub(1);
        if last == 0 {
            return;
        }
        let (start, stop) = (self.domain[0], self.domain[last]);
        let (start, stop) = match self.transform {
            _ if self.scale_type.is_time() => time_nice(start, stop, count, self.is_local_time()),
            Transform::Log { base } => log_nice(start, stop, base),
            Transform::Identity | Transform::Pow { .. } => linear_nice(start, stop, count),
        };
        self.domain[0] = start;
        self.domain[last] = stop;
    }

    /// Extend the domain ends to include zero, keeping their order
    pub fn include_zero(&mut self) {
        let last = self.domain.len().saturating_sub(1);
        if last == 0 {
            return;
        }
        let (start, stop) = (self.domain[0], self.domain[last]);
        if start <= stop {
            self.domain[0] = start.min(0.0);
            self.domain[last] = stop.max(0.0);
        } else {
            self.domain[0] = start.max(0.0);
            self.domain[last] = stop.min(0.0);
        }
    }

    pub fn tick_numbers(&self, count: usize) -> Vec<f64> {
        let (Some(start), Some(stop)) = (self.domain.first(), self.domain.last()) else {
            return Vec::new();
        };
        match self.transform {
            _ if self.scale_type.is_time() => {
                time_ticks(*start, *stop, count, self.is_local_time())
            }
            Transform::Log { base } => log_ticks(*start, *stop, base, count),
            Transform::Identity | Transform::Pow { .. } => linear_ticks(*start, *stop, count),
        }
    }

    /// Inverse of `map` for numeric ranges
    pub fn invert(&self, y: f64) -> Option<f64> {
        let OutputRange::Numeric(values) = &self.range else {
            return None;
        };
        let n = self.domain.len().min(values.len());
        if n < 2 {
            return None;
        }
        let mut outputs: Vec<f64> = values[..n].to_vec();
        let mut stops: Vec<f64> = self.domain[..n].iter().map(|d| self.forward(*d)).collect();
        if outputs[n - 1] < outputs[0] {
            outputs.reverse();
            stops.reverse();
        }
        let y = if self.clamp {
            y.clamp(outputs[0], outputs[n - 1])
        } else {
            y
        };
        let i = bisect_right(&outputs[1..n - 1], y);
        let (a, b) = (outputs[i], outputs[i + 1]);
        let u = if b == a { 0.5 } else { (y - a) / (b - a) };
        let t = stops[i] + (stops[i + 1] - stops[i]) * u;
        let x = match self.transform {
            Transform::Identity => t,
            Transform::Log { base } => log_inverse(t, base, self.reflected()),
            Transform::Pow { exponent } => {
                if t < 0.0 {
                    -(-t).powf(1.0 / exponent)
                } else {
                    t.powf(1.0 / exponent)
                }
            }
        };
        x.is_finite().then_some(x)
    }

    fn to_value(&self, x: f64) -> Value {
        if self.scale_type.is_time() {
            millis_to_datetime(x).map_or(Value::Null, Value::DateTime)
        } else {
            Value::Number(x)
        }
    }
}

impl ScaleTrait for ContinuousScale {
    fn scale_type(&self) -> ScaleType {
        self.scale_type
    }

    fn apply(&self, value: &Value) -> Value {
        let x = if self.scale_type.is_time() {
            value.as_datetime().map(|dt| dt.timestamp_millis() as f64)
        } else {
            value.as_f64()
        };
        x.map_or(Value::Null, |x| self.map(x))
    }

    fn domain(&self) -> Vec<Value> {
        self.domain.iter().map(|d| self.to_value(*d)).collect()
    }

    fn range(&self) -> Vec<Value> {
        self.range.values()
    }

    fn ticks(&self, count: usize) -> Vec<Value> {
        self.tick_numbers(count)
            .into_iter()
            .map(|t| self.to_value(t))
            .collect()
    }
}
