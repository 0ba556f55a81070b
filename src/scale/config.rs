//! Scale configuration and its completion
//!
//! `ScaleConfig` is what callers write (everything optional, including the
//! type). `CompleteScaleConfig` has a concrete type, only legal properties, and
//! the family defaults for `nice`, `clamp` and `zero` filled in.

use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use super::scale_type::{infer_scale_type, ScaleProperty, ScaleType};
use crate::channel::{ChannelType, CompletionOptions, Configurable, FieldDef};
use crate::value::DateTimeSpec;
use crate::Value;

/// `nice` as a flag, a tick count, or a time interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Nice {
    Flag(bool),
    Count(f64),
    Interval(String),
    IntervalStep { interval: String, step: f64 },
}

/// `interpolate` as a method name or a parameterized method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Interpolate {
    Name(String),
    Params {
        #[serde(rename = "type")]
        method: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        gamma: Option<f64>,
    },
}

/// A domain entry: a plain value or a structured date-time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DomainValue {
    Value(Value),
    DateTime(DateTimeSpec),
}

impl From<Value> for DomainValue {
    fn from(value: Value) -> Self {
        DomainValue::Value(value)
    }
}

impl From<f64> for DomainValue {
    fn from(value: f64) -> Self {
        DomainValue::Value(Value::Number(value))
    }
}

impl From<&str> for DomainValue {
    fn from(value: &str) -> Self {
        DomainValue::Value(Value::from(value))
    }
}

/// Every scale property besides `type`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<Vec<DomainValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reverse: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clamp: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nice: Option<Nice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zero: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpolate: Option<Interpolate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_inner: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_outer: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bins: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exponent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant: Option<f64>,
}

impl ScaleOptions {
    fn is_set(&self, property: ScaleProperty) -> bool {
        match property {
            ScaleProperty::Domain => self.domain.is_some(),
            ScaleProperty::Range => self.range.is_some(),
            ScaleProperty::Reverse => self.reverse.is_some(),
            ScaleProperty::Clamp => self.clamp.is_some(),
            ScaleProperty::Nice => self.nice.is_some(),
            ScaleProperty::Zero => self.zero.is_some(),
            ScaleProperty::Round => self.round.is_some(),
            ScaleProperty::Interpolate => self.interpolate.is_some(),
            ScaleProperty::Padding => self.padding.is_some(),
            ScaleProperty::PaddingInner => self.padding_inner.is_some(),
            ScaleProperty::PaddingOuter => self.padding_outer.is_some(),
            ScaleProperty::Align => self.align.is_some(),
            ScaleProperty::Scheme => self.scheme.is_some(),
            ScaleProperty::Namespace => self.namespace.is_some(),
            ScaleProperty::Bins => self.bins.is_some(),
            ScaleProperty::Base => self.base.is_some(),
            ScaleProperty::Exponent => self.exponent.is_some(),
            ScaleProperty::Constant => self.constant.is_some(),
        }
    }

    fn clear(&mut self, property: ScaleProperty) {
        match property {
            ScaleProperty::Domain => self.domain = None,
            ScaleProperty::Range => self.range = None,
            ScaleProperty::Reverse => self.reverse = None,
            ScaleProperty::Clamp => self.clamp = None,
            ScaleProperty::Nice => self.nice = None,
            ScaleProperty::Zero => self.zero = None,
            ScaleProperty::Round => self.round = None,
            ScaleProperty::Interpolate => self.interpolate = None,
            ScaleProperty::Padding => self.padding = None,
            ScaleProperty::PaddingInner => self.padding_inner = None,
            ScaleProperty::PaddingOuter => self.padding_outer = None,
            ScaleProperty::Align => self.align = None,
            ScaleProperty::Scheme => self.scheme = None,
            ScaleProperty::Namespace => self.namespace = None,
            ScaleProperty::Bins => self.bins = None,
            ScaleProperty::Base => self.base = None,
            ScaleProperty::Exponent => self.exponent = None,
            ScaleProperty::Constant => self.constant = None,
        }
    }
}

const ALL_PROPERTIES: [ScaleProperty; 18] = [
    ScaleProperty::Domain,
    ScaleProperty::Range,
    ScaleProperty::Reverse,
    ScaleProperty::Clamp,
    ScaleProperty::Nice,
    ScaleProperty::Zero,
    ScaleProperty::Round,
    ScaleProperty::Interpolate,
    ScaleProperty::Padding,
    ScaleProperty::PaddingInner,
    ScaleProperty::PaddingOuter,
    ScaleProperty::Align,
    ScaleProperty::Scheme,
    ScaleProperty::Namespace,
    ScaleProperty::Bins,
    ScaleProperty::Base,
    ScaleProperty::Exponent,
    ScaleProperty::Constant,
];

/// A user-supplied scale config; the type may be left to inference
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScaleConfig {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub scale_type: Option<ScaleType>,
    #[serde(flatten)]
    pub options: ScaleOptions,
}

impl ScaleConfig {
    pub fn of_type(scale_type: ScaleType) -> Self {
        Self {
            scale_type: Some(scale_type),
            options: ScaleOptions::default(),
        }
    }
}

impl Deref for ScaleConfig {
    type Target = ScaleOptions;

    fn deref(&self) -> &Self::Target {
        &self.options
    }
}

impl DerefMut for ScaleConfig {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.options
    }
}

/// A scale config with a resolved type and defaults applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteScaleConfig {
    #[serde(rename = "type")]
    pub scale_type: ScaleType,
    #[serde(flatten)]
    pub options: ScaleOptions,
}

impl CompleteScaleConfig {
    pub fn new(scale_type: ScaleType) -> Self {
        Self {
            scale_type,
            options: ScaleOptions::default(),
        }
    }

    pub fn with_options(scale_type: ScaleType, options: ScaleOptions) -> Self {
        Self {
            scale_type,
            options,
        }
    }
}

impl Deref for CompleteScaleConfig {
    type Target = ScaleOptions;

    fn deref(&self) -> &Self::Target {
        &self.options
    }
}

impl DerefMut for CompleteScaleConfig {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.options
    }
}

impl From<CompleteScaleConfig> for ScaleConfig {
    fn from(config: CompleteScaleConfig) -> Self {
        Self {
            scale_type: Some(config.scale_type),
            options: config.options,
        }
    }
}

/// Complete the scale config of a field channel
///
/// Returns `None` (scaling disabled) when the caller passed `scale: false` or
/// no scale family can be inferred for the channel.
pub fn complete_scale_config(
    channel_type: ChannelType,
    def: &FieldDef,
    options: &CompletionOptions,
) -> Option<CompleteScaleConfig> {
    let config = match &def.scale {
        Some(Configurable::Disabled) => return None,
        Some(Configurable::Enabled(config)) => config.clone(),
        None => ScaleConfig::default(),
    };

    let scale_type = match config.scale_type {
        Some(scale_type) => scale_type,
        None => {
            let inferred = infer_scale_type(
                channel_type,
                def.data_type,
                def.bin.as_ref(),
                options.use_local_time,
            );
            match inferred {
                Some(scale_type) => {
                    tracing::debug!(
                        "Inferred {} scale for field '{}' on {} channel",
                        scale_type,
                        def.field,
                        channel_type
                    );
                    scale_type
                }
                None => {
                    tracing::debug!(
                        "No scale applies to {} field '{}' on {} channel",
                        def.data_type,
                        def.field,
                        channel_type
                    );
                    return None;
                }
            }
        }
    };

    let mut scale_options = config.options;
    for property in ALL_PROPERTIES {
        if scale_options.is_set(property) && !scale_type.supports(property) {
            tracing::warn!(
                "Dropping '{}' from {} scale of field '{}': not supported by this scale type",
                property.name(),
                scale_type,
                def.field
            );
            scale_options.clear(property);
        }
    }

    if scale_type.defaults_on(ScaleProperty::Nice) && scale_options.nice.is_none() {
        scale_options.nice = Some(Nice::Flag(true));
    }
    if scale_type.defaults_on(ScaleProperty::Clamp) && scale_options.clamp.is_none() {
        scale_options.clamp = Some(true);
    }
    if scale_type.defaults_on(ScaleProperty::Zero) && scale_options.zero.is_none() {
        scale_options.zero = Some(true);
    }

    Some(CompleteScaleConfig::with_options(scale_type, scale_options))
}
