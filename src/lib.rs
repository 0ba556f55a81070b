/*!
# encodable - channel encoding for declarative visualization

encodable resolves sparse, Vega-Lite style channel definitions into executable
encoders. A chart declares which channels it has (`x`, `y`, `color`, ...) and the
role each one plays; callers bind those channels to data fields. encodable then:

1. infers the scale family for every field channel,
2. fills every omitted scale and axis option with a type-appropriate default,
3. realizes the scale as a function from data values to visual values, and
4. exposes per-channel accessors for encoding, formatting and domain computation.

## Example

```rust
use encodable::{ChannelType, Encoder, Encoding, ScaleContext};
use serde_json::json;

let encoding: Encoding = serde_json::from_value(json!({
    "x": { "field": "speed", "type": "quantitative", "scale": { "domain": [0, 10], "range": [0, 100] } },
    "color": { "field": "brand", "type": "nominal" }
}))
.unwrap();

let encoder = Encoder::new(
    &[("x", ChannelType::X), ("color", ChannelType::Color)],
    encoding,
    &ScaleContext::default(),
)
.unwrap();

assert_eq!(encoder.get_group_bys(), vec!["brand".to_string()]);
assert!(encoder.has_legend());
```

## Architecture

- [`value`] - data values and records
- [`channel`] - channel roles, data types, channel definitions and their completion
- [`scale`] - scale type inference, config completion, color services and the scale factory
- [`axis`] - axis config completion
- [`format`] - number/time formatters
- [`encoder`] - `ChannelEncoder` and `Encoder`
*/

pub mod axis;
pub mod channel;
pub mod encoder;
pub mod format;
pub mod scale;
pub mod value;

pub use axis::{
    complete_axis_config, AxisConfig, AxisOrient, CompleteAxisConfig, LabelOverlap,
    LabelOverlapStrategy,
};
pub use channel::{
    complete_channel_def, complete_channel_def_with, Bin, ChannelDef, ChannelType,
    CompleteChannelDef, CompleteFieldDef, CompletionOptions, Configurable, DataType, FieldDef,
    ValueDef,
};
pub use encoder::{ChannelEncoder, ChannelEncoders, Encoder, EncoderFactory, Encoding, EncodingEntry};
pub use format::{create_formatter, create_number_formatter, create_time_formatter, Formatter};
pub use scale::{
    complete_scale_config, create_scale_from_scale_config, infer_scale_type,
    CategoricalColorNamespace, CategoricalColorScale, ColorSchemeRegistry, CompleteScaleConfig,
    Scale, ScaleConfig, ScaleContext, ScaleProperty, ScaleType,
};
pub use value::{DateTimeSpec, Datum, Value};

/// Main library error type
#[derive(thiserror::Error, Debug)]
pub enum EncodableError {
    #[error("Not implemented: {0}")]
    Unimplemented(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EncodableError>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
