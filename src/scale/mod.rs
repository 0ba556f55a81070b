//! Scales: type inference, config completion, realization and color services
//!
//! A channel's scale goes through three shapes:
//!
//! - `ScaleConfig`: whatever the caller wrote, every field optional
//! - `CompleteScaleConfig`: `type` resolved, unsupported properties removed,
//!   defaults (`nice`, `clamp`, `zero`) filled in
//! - `Scale`: the realized function from data values to visual values
//!
//! Ordinal color scales without an explicit range are backed by the shared
//! categorical color tables in [`ScaleContext`], so equal values get equal
//! colors across every chart that shares the context.

pub mod breaks;
mod color;
mod config;
mod continuous;
mod discrete;
mod discretizing;
mod factory;
pub mod palettes;
mod realized;
mod scale_type;
pub mod time;

pub use color::{CategoricalColorNamespace, CategoricalColorScale, ColorSchemeRegistry, ScaleContext};
pub use config::{
    complete_scale_config, CompleteScaleConfig, DomainValue, Interpolate, Nice, ScaleConfig,
    ScaleOptions,
};
pub use continuous::{ContinuousScale, OutputRange, Transform};
pub(crate) use discrete::unique_values;
pub use discrete::{BandScale, BinOrdinalScale, NamespacedColorScale, OrdinalScale};
pub use discretizing::{quantile_sorted, QuantileScale, QuantizeScale, ThresholdScale};
pub use factory::create_scale_from_scale_config;
pub use realized::{Scale, ScaleTrait};
pub use scale_type::{infer_scale_type, ScaleProperty, ScaleType};
