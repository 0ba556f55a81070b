//! Axis configuration and its completion
//!
//! Only positional channels (X/Y and their band variants) carry an axis.

use serde::{Deserialize, Serialize};

use crate::channel::{ChannelType, Configurable, FieldDef};
use crate::Value;

/// Label angle used when the overlap strategy rotates labels
pub const DEFAULT_ROTATE_ANGLE: f64 = 40.0;

/// Which side of the plot the axis sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisOrient {
    Top,
    Bottom,
    Left,
    Right,
}

impl AxisOrient {
    pub fn default_for(channel_type: ChannelType) -> Self {
        if channel_type.is_x() {
            AxisOrient::Bottom
        } else {
            AxisOrient::Left
        }
    }
}

/// How to handle labels that would overlap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "lowercase")]
pub enum LabelOverlapStrategy {
    Flat,
    Rotate {
        #[serde(rename = "labelAngle")]
        label_angle: f64,
    },
}

/// Shorthand names accepted for `labelOverlap`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelOverlapShorthand {
    Flat,
    Rotate,
    Auto,
}

/// `labelOverlap` as written: a shorthand or an expanded strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelOverlap {
    Shorthand(LabelOverlapShorthand),
    Strategy(LabelOverlapStrategy),
}

impl LabelOverlap {
    /// Expand to a concrete strategy; `auto` rotates X labels and keeps Y labels flat
    pub fn resolve(&self, channel_type: ChannelType) -> LabelOverlapStrategy {
        match self {
            LabelOverlap::Strategy(strategy) => strategy.clone(),
            LabelOverlap::Shorthand(LabelOverlapShorthand::Flat) => LabelOverlapStrategy::Flat,
            LabelOverlap::Shorthand(LabelOverlapShorthand::Rotate) => LabelOverlapStrategy::Rotate {
                label_angle: DEFAULT_ROTATE_ANGLE,
            },
            LabelOverlap::Shorthand(LabelOverlapShorthand::Auto) if channel_type.is_x() => {
                LabelOverlapStrategy::Rotate {
                    label_angle: DEFAULT_ROTATE_ANGLE,
                }
            }
            LabelOverlap::Shorthand(LabelOverlapShorthand::Auto) => LabelOverlapStrategy::Flat,
        }
    }
}

/// Axis options as written; omitted options are filled in by completion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_angle: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_flush: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_overlap: Option<LabelOverlap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_padding: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orient: Option<AxisOrient>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tick_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticks: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_padding: Option<f64>,
    /// Explicit tick values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Value>>,
}

/// An axis with every option resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteAxisConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    pub label_angle: f64,
    pub label_flush: bool,
    pub label_overlap: LabelOverlapStrategy,
    pub label_padding: f64,
    pub orient: AxisOrient,
    pub tick_count: u32,
    pub ticks: bool,
    pub title: String,
    pub title_padding: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Value>>,
}

impl From<CompleteAxisConfig> for AxisConfig {
    fn from(axis: CompleteAxisConfig) -> Self {
        Self {
            format: axis.format,
            label_angle: Some(axis.label_angle),
            label_flush: Some(axis.label_flush),
            label_overlap: Some(LabelOverlap::Strategy(axis.label_overlap)),
            label_padding: Some(axis.label_padding),
            orient: Some(axis.orient),
            tick_count: Some(axis.tick_count),
            ticks: Some(axis.ticks),
            title: Some(axis.title),
            title_padding: Some(axis.title_padding),
            values: axis.values,
        }
    }
}

/// Fill in axis defaults for a field channel
///
/// Returns `None` when the channel has no axis or the axis is disabled. The
/// axis title and format fall back to the channel's own.
pub fn complete_axis_config(channel_type: ChannelType, def: &FieldDef) -> Option<CompleteAxisConfig> {
    if !channel_type.supports_axis() {
        return None;
    }
    let axis = match &def.axis {
        Some(Configurable::Disabled) => return None,
        Some(Configurable::Enabled(axis)) => axis.clone(),
        None => AxisConfig::default(),
    };

    let label_overlap = axis
        .label_overlap
        .unwrap_or(LabelOverlap::Shorthand(LabelOverlapShorthand::Auto))
        .resolve(channel_type);

    Some(CompleteAxisConfig {
        format: axis.format.or_else(|| def.format.clone()),
        label_angle: axis.label_angle.unwrap_or(0.0),
        label_flush: axis.label_flush.unwrap_or(true),
        label_overlap,
        label_padding: axis.label_padding.unwrap_or(4.0),
        orient: axis.orient.unwrap_or_else(|| AxisOrient::default_for(channel_type)),
        tick_count: axis.tick_count.unwrap_or(5),
        ticks: axis.ticks.unwrap_or(true),
        title: axis
            .title
            .or_else(|| def.title.clone())
            .unwrap_or_else(|| def.field.clone()),
        title_padding: axis.title_padding.unwrap_or(4.0),
        values: axis.values,
    })
}
