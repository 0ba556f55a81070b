//! Channel definitions and their completion
//!
//! A `ChannelDef` is what callers write: either a constant (`{"value": ...}`) or a
//! binding to a data field with optional scale/axis overrides. Completion turns it
//! into a `CompleteChannelDef` in which every downstream knob is concrete or
//! explicitly disabled.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::ChannelType;
use super::DataType;
use crate::axis::{complete_axis_config, AxisConfig, CompleteAxisConfig};
use crate::scale::{complete_scale_config, CompleteScaleConfig, ScaleConfig};
use crate::Value;

// =============================================================================
// Configurable: `false` / `null` disable, an object configures
// =============================================================================

/// A nested config that can be switched off with `false` or `null`
///
/// `true` enables the config with every option left to its default.
#[derive(Debug, Clone, PartialEq)]
pub enum Configurable<T> {
    Disabled,
    Enabled(T),
}

impl<T> Configurable<T> {
    pub fn as_enabled(&self) -> Option<&T> {
        match self {
            Configurable::Disabled => None,
            Configurable::Enabled(config) => Some(config),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ConfigurableRepr<T> {
    Flag(Option<bool>),
    Config(T),
}

impl<'de, T: DeserializeOwned + Default> Deserialize<'de> for Configurable<T> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match ConfigurableRepr::<T>::deserialize(deserializer)? {
            ConfigurableRepr::Flag(Some(true)) => Configurable::Enabled(T::default()),
            ConfigurableRepr::Flag(_) => Configurable::Disabled,
            ConfigurableRepr::Config(config) => Configurable::Enabled(config),
        })
    }
}

impl<T: Serialize> Serialize for Configurable<T> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Configurable::Disabled => serializer.serialize_bool(false),
            Configurable::Enabled(config) => config.serialize(serializer),
        }
    }
}

/// Present-but-null must stay distinguishable from absent, so the field-level
/// deserializer wraps whatever is present in `Some`.
fn deserialize_configurable<'de, D, T>(
    deserializer: D,
) -> std::result::Result<Option<Configurable<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Configurable::<T>::deserialize(deserializer).map(Some)
}

// =============================================================================
// Binning
// =============================================================================

/// Bin parameters for a quantitative field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxbins: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
}

/// `bin: true` or an explicit parameter object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bin {
    Flag(bool),
    Params(BinParams),
}

impl Bin {
    pub fn is_enabled(&self) -> bool {
        match self {
            Bin::Flag(flag) => *flag,
            Bin::Params(_) => true,
        }
    }

    /// Whether a fixed number or width of buckets was asked for
    pub fn requests_buckets(&self) -> bool {
        match self {
            Bin::Flag(_) => false,
            Bin::Params(params) => params.maxbins.is_some() || params.step.is_some(),
        }
    }
}

// =============================================================================
// Partial definitions
// =============================================================================

/// A constant channel: no data binding, no scale, no axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValueDef {
    pub value: Value,
}

/// A channel bound to a data field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FieldDef {
    pub field: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin: Option<Bin>,
    #[serde(
        default,
        deserialize_with = "deserialize_configurable",
        skip_serializing_if = "Option::is_none"
    )]
    pub scale: Option<Configurable<ScaleConfig>>,
    #[serde(
        default,
        deserialize_with = "deserialize_configurable",
        skip_serializing_if = "Option::is_none"
    )]
    pub axis: Option<Configurable<AxisConfig>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legend: Option<bool>,
}

impl FieldDef {
    pub fn new(field: impl Into<String>, data_type: DataType) -> Self {
        Self {
            field: field.into(),
            data_type,
            format: None,
            title: None,
            bin: None,
            scale: None,
            axis: None,
            legend: None,
        }
    }

    pub fn with_scale(mut self, scale: ScaleConfig) -> Self {
        self.scale = Some(Configurable::Enabled(scale));
        self
    }

    pub fn with_axis(mut self, axis: AxisConfig) -> Self {
        self.axis = Some(Configurable::Enabled(axis));
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn without_scale(mut self) -> Self {
        self.scale = Some(Configurable::Disabled);
        self
    }

    pub fn without_axis(mut self) -> Self {
        self.axis = Some(Configurable::Disabled);
        self
    }
}

/// A user-supplied channel definition
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChannelDef {
    Value(ValueDef),
    Field(FieldDef),
}

/// Dispatches on the `field` / `value` key so errors name the offending key
impl<'de> Deserialize<'de> for ChannelDef {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        let raw = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        let def = match (raw.contains_key("field"), raw.contains_key("value")) {
            (true, true) => {
                return Err(D::Error::custom(
                    "channel definition has both 'field' and 'value'",
                ))
            }
            (false, true) => serde_json::from_value(serde_json::Value::Object(raw)).map(ChannelDef::Value),
            (_, false) => serde_json::from_value(serde_json::Value::Object(raw)).map(ChannelDef::Field),
        };
        def.map_err(D::Error::custom)
    }
}

impl ChannelDef {
    pub fn value(value: impl Into<Value>) -> Self {
        ChannelDef::Value(ValueDef {
            value: value.into(),
        })
    }

    pub fn field(field: impl Into<String>, data_type: DataType) -> Self {
        ChannelDef::Field(FieldDef::new(field, data_type))
    }

    pub fn is_value_def(&self) -> bool {
        matches!(self, ChannelDef::Value(_))
    }

    pub fn is_field_def(&self) -> bool {
        matches!(self, ChannelDef::Field(_))
    }

    /// The bound field, if any
    pub fn field_name(&self) -> Option<&str> {
        match self {
            ChannelDef::Value(_) => None,
            ChannelDef::Field(def) => Some(&def.field),
        }
    }
}

impl From<FieldDef> for ChannelDef {
    fn from(def: FieldDef) -> Self {
        ChannelDef::Field(def)
    }
}

impl From<ValueDef> for ChannelDef {
    fn from(def: ValueDef) -> Self {
        ChannelDef::Value(def)
    }
}

// =============================================================================
// Complete definitions
// =============================================================================

/// Serializes as `false`; marks a knob that can never apply
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Disabled;

impl Serialize for Disabled {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bool(false)
    }
}

fn serialize_or_false<S, T>(value: &Option<T>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize,
{
    match value {
        Some(config) => config.serialize(serializer),
        None => serializer.serialize_bool(false),
    }
}

/// A completed constant channel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompleteValueDef {
    pub value: Value,
    pub axis: Disabled,
    pub scale: Disabled,
    pub title: String,
}

/// A completed field channel. `scale`/`axis` of `None` mean disabled.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteFieldDef {
    pub field: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bin: Option<Bin>,
    #[serde(serialize_with = "serialize_or_false")]
    pub scale: Option<CompleteScaleConfig>,
    #[serde(serialize_with = "serialize_or_false")]
    pub axis: Option<CompleteAxisConfig>,
    pub legend: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CompleteChannelDef {
    Value(CompleteValueDef),
    Field(CompleteFieldDef),
}

impl CompleteChannelDef {
    pub fn is_value_def(&self) -> bool {
        matches!(self, CompleteChannelDef::Value(_))
    }

    pub fn is_field_def(&self) -> bool {
        matches!(self, CompleteChannelDef::Field(_))
    }

    pub fn field_name(&self) -> Option<&str> {
        match self {
            CompleteChannelDef::Value(_) => None,
            CompleteChannelDef::Field(def) => Some(&def.field),
        }
    }

    pub fn data_type(&self) -> Option<DataType> {
        match self {
            CompleteChannelDef::Value(_) => None,
            CompleteChannelDef::Field(def) => Some(def.data_type),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            CompleteChannelDef::Value(def) => &def.title,
            CompleteChannelDef::Field(def) => &def.title,
        }
    }

    pub fn format(&self) -> Option<&str> {
        match self {
            CompleteChannelDef::Value(_) => None,
            CompleteChannelDef::Field(def) => def.format.as_deref(),
        }
    }

    pub fn scale(&self) -> Option<&CompleteScaleConfig> {
        match self {
            CompleteChannelDef::Value(_) => None,
            CompleteChannelDef::Field(def) => def.scale.as_ref(),
        }
    }

    pub fn axis(&self) -> Option<&CompleteAxisConfig> {
        match self {
            CompleteChannelDef::Value(_) => None,
            CompleteChannelDef::Field(def) => def.axis.as_ref(),
        }
    }
}

impl From<CompleteChannelDef> for ChannelDef {
    fn from(def: CompleteChannelDef) -> Self {
        match def {
            CompleteChannelDef::Value(def) => ChannelDef::Value(ValueDef { value: def.value }),
            CompleteChannelDef::Field(def) => ChannelDef::Field(FieldDef {
                field: def.field,
                data_type: def.data_type,
                format: def.format,
                title: Some(def.title),
                bin: def.bin,
                scale: Some(match def.scale {
                    Some(scale) => Configurable::Enabled(scale.into()),
                    None => Configurable::Disabled,
                }),
                axis: Some(match def.axis {
                    Some(axis) => Configurable::Enabled(axis.into()),
                    None => Configurable::Disabled,
                }),
                legend: Some(def.legend),
            }),
        }
    }
}

// =============================================================================
// Completion
// =============================================================================

/// Caller-level switches threaded through completion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompletionOptions {
    /// Infer `time` (local) instead of `utc` scales for temporal fields
    pub use_local_time: bool,
}

/// Complete a channel definition with default options
pub fn complete_channel_def(channel_type: ChannelType, def: &ChannelDef) -> CompleteChannelDef {
    complete_channel_def_with(channel_type, def, &CompletionOptions::default())
}

/// Complete a channel definition
///
/// The title is resolved before the axis is completed so that an axis without
/// an explicit title inherits the channel's resolved title.
pub fn complete_channel_def_with(
    channel_type: ChannelType,
    def: &ChannelDef,
    options: &CompletionOptions,
) -> CompleteChannelDef {
    match def {
        ChannelDef::Value(def) => CompleteChannelDef::Value(CompleteValueDef {
            value: def.value.clone(),
            axis: Disabled,
            scale: Disabled,
            title: String::new(),
        }),
        ChannelDef::Field(def) => {
            let title = def.title.clone().unwrap_or_else(|| def.field.clone());
            let titled = FieldDef {
                title: Some(title.clone()),
                ..def.clone()
            };
            CompleteChannelDef::Field(CompleteFieldDef {
                field: titled.field.clone(),
                data_type: titled.data_type,
                format: titled.format.clone(),
                title,
                bin: titled.bin.clone(),
                scale: complete_scale_config(channel_type, &titled, options),
                axis: complete_axis_config(channel_type, &titled),
                legend: titled.legend.unwrap_or(true),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::{AxisOrient, LabelOverlapStrategy};
    use crate::scale::{Nice, ScaleOptions, ScaleType};
    use proptest::prelude::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> ChannelDef {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_deserialize_value_and_field_defs() {
        assert!(parse(json!({"value": 1})).is_value_def());
        let def = parse(json!({"field": "price", "type": "quantitative"}));
        assert_eq!(def.field_name(), Some("price"));
    }

    #[test]
    fn test_deserialize_rejects_ambiguous_defs() {
        let err = serde_json::from_value::<ChannelDef>(json!({
            "field": "price", "type": "quantitative", "value": 3
        }))
        .unwrap_err();
        assert!(err.to_string().contains("both 'field' and 'value'"));

        let err = serde_json::from_value::<ChannelDef>(json!({
            "field": "price", "type": "quantitative", "titel": "Price"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("titel"));

        let err = serde_json::from_value::<ChannelDef>(json!({"value": 1, "scale": false})).unwrap_err();
        assert!(err.to_string().contains("scale"));

        let err = serde_json::from_value::<ChannelDef>(json!({"type": "nominal"})).unwrap_err();
        assert!(err.to_string().contains("field"));
    }

    #[test]
    fn test_deserialize_disabled_configs() {
        let def = parse(json!({"field": "a", "type": "nominal", "scale": false, "axis": null}));
        let ChannelDef::Field(def) = def else {
            panic!("Expected field def");
        };
        assert_eq!(def.scale, Some(Configurable::Disabled));
        assert_eq!(def.axis, Some(Configurable::Disabled));

        let def = parse(json!({"field": "a", "type": "nominal", "axis": true}));
        let ChannelDef::Field(def) = def else {
            panic!("Expected field def");
        };
        assert_eq!(def.axis, Some(Configurable::Enabled(AxisConfig::default())));
        assert_eq!(def.scale, None);
    }

    #[test]
    fn test_value_def_completes_to_sentinels() {
        let complete = complete_channel_def(ChannelType::X, &ChannelDef::value(1));
        let json = serde_json::to_value(&complete).unwrap();
        assert_eq!(
            json,
            json!({"value": 1.0, "axis": false, "scale": false, "title": ""})
        );
    }

    #[test]
    fn test_title_defaults_to_field() {
        let complete = complete_channel_def(ChannelType::X, &ChannelDef::field("speed", DataType::Quantitative));
        assert_eq!(complete.title(), "speed");
        assert_eq!(complete.axis().unwrap().title, "speed");
    }

    #[test]
    fn test_axis_inherits_channel_title() {
        let def = FieldDef::new("speed", DataType::Quantitative).with_title("Speed (km/h)");
        let complete = complete_channel_def(ChannelType::Y, &def.into());
        let axis = complete.axis().unwrap();
        assert_eq!(axis.title, "Speed (km/h)");
        assert_eq!(axis.orient, AxisOrient::Left);
        assert_eq!(axis.label_overlap, LabelOverlapStrategy::Flat);
    }

    #[test]
    fn test_field_def_complete_scale() {
        let complete = complete_channel_def(ChannelType::X, &ChannelDef::field("x", DataType::Quantitative));
        let scale = complete.scale().unwrap();
        assert_eq!(scale.scale_type, ScaleType::Linear);
        assert_eq!(scale.nice, Some(Nice::Flag(true)));
        assert_eq!(scale.clamp, Some(true));
        assert_eq!(scale.zero, Some(true));
    }

    #[test]
    fn test_non_positional_has_no_axis() {
        let complete = complete_channel_def(ChannelType::Color, &ChannelDef::field("brand", DataType::Nominal));
        assert!(complete.axis().is_none());
        let json = serde_json::to_value(&complete).unwrap();
        assert_eq!(json["axis"], json!(false));
        assert_eq!(json["scale"]["type"], json!("ordinal"));
    }

    #[test]
    fn test_geojson_disables_scale() {
        let complete = complete_channel_def(ChannelType::Color, &ChannelDef::field("shape", DataType::Geojson));
        assert!(complete.scale().is_none());
    }

    #[test]
    fn test_completion_idempotent_examples() {
        let defs = vec![
            parse(json!({"value": "red"})),
            parse(json!({"field": "x", "type": "quantitative"})),
            parse(json!({"field": "x", "type": "nominal", "scale": {"type": "point"}})),
            parse(json!({"field": "t", "type": "temporal", "axis": {"labelOverlap": "rotate"}})),
            parse(json!({"field": "g", "type": "geojson"})),
            parse(json!({"field": "c", "type": "ordinal", "scale": false, "legend": false})),
        ];
        for def in defs {
            for channel_type in ChannelType::ALL {
                let once = complete_channel_def(channel_type, &def);
                let twice = complete_channel_def(channel_type, &once.clone().into());
                assert_eq!(once, twice, "not idempotent for {:?} on {}", def, channel_type);
            }
        }
    }

    fn arb_data_type() -> impl Strategy<Value = DataType> {
        prop_oneof![
            Just(DataType::Nominal),
            Just(DataType::Ordinal),
            Just(DataType::Quantitative),
            Just(DataType::Temporal),
            Just(DataType::Geojson),
        ]
    }

    fn arb_channel_type() -> impl Strategy<Value = ChannelType> {
        prop::sample::select(ChannelType::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_completion_is_idempotent(
            field in "[a-z]{1,8}",
            data_type in arb_data_type(),
            channel_type in arb_channel_type(),
            title in proptest::option::of("[A-Za-z ]{0,12}"),
            nice in proptest::option::of(any::<bool>()),
            zero in proptest::option::of(any::<bool>()),
            disable_axis in any::<bool>(),
        ) {
            let mut def = FieldDef::new(field, data_type);
            def.title = title;
            def.scale = Some(Configurable::Enabled(ScaleConfig {
                options: ScaleOptions {
                    nice: nice.map(Nice::Flag),
                    zero,
                    ..Default::default()
                },
                ..Default::default()
            }));
            if disable_axis {
                def = def.without_axis();
            }
            let def = ChannelDef::Field(def);
            let once = complete_channel_def(channel_type, &def);
            let twice = complete_channel_def(channel_type, &once.clone().into());
            prop_assert_eq!(once, twice);
        }
    }
}
