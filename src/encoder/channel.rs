//! One completed channel plus its realized scale

use crate::channel::{
    complete_channel_def_with, ChannelDef, ChannelType, CompleteChannelDef, CompletionOptions,
    DataType,
};
use crate::format::{create_formatter, Formatter};
use crate::scale::{
    create_scale_from_scale_config, unique_values, DomainValue, Scale, ScaleContext,
};
use crate::{Datum, Result, Value};

/// Encodes, formats and measures the values of one channel
#[derive(Debug, Clone)]
pub struct ChannelEncoder {
    name: String,
    channel_type: ChannelType,
    definition: CompleteChannelDef,
    scale: Option<Scale>,
    formatter: Formatter,
    context: ScaleContext,
    options: CompletionOptions,
}

impl ChannelEncoder {
    /// Complete `def` for `channel_type` and realize its scale
    pub fn new(
        name: impl Into<String>,
        channel_type: ChannelType,
        def: &ChannelDef,
        context: &ScaleContext,
        options: &CompletionOptions,
    ) -> Result<Self> {
        let definition = complete_channel_def_with(channel_type, def, options);
        Self::from_complete(name.into(), channel_type, definition, context.clone(), *options)
    }

    fn from_complete(
        name: String,
        channel_type: ChannelType,
        definition: CompleteChannelDef,
        context: ScaleContext,
        options: CompletionOptions,
    ) -> Result<Self> {
        let scale = match definition.scale() {
            Some(config) => Some(create_scale_from_scale_config(config, &context)?),
            None => None,
        };
        let formatter = create_formatter(
            definition.format(),
            definition.data_type(),
            options.use_local_time,
        )
        .unwrap_or_else(|e| {
            tracing::warn!("Channel '{}': {}, showing raw values", name, e);
            Formatter::Passthrough
        });

        Ok(Self {
            name,
            channel_type,
            definition,
            scale,
            formatter,
            context,
            options,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn channel_type(&self) -> ChannelType {
        self.channel_type
    }

    pub fn definition(&self) -> &CompleteChannelDef {
        &self.definition
    }

    /// The realized scale; `None` when scaling is disabled
    pub fn scale(&self) -> Option<&Scale> {
        self.scale.as_ref()
    }

    /// Raw value for this channel: the constant of a value channel, or the
    /// bound field of `datum`. Missing and null values yield `fallback`.
    pub fn get_value_from_datum(&self, datum: &Datum, fallback: Option<&Value>) -> Value {
        let value = match &self.definition {
            CompleteChannelDef::Value(def) => Some(&def.value),
            CompleteChannelDef::Field(def) => datum.get(&def.field),
        };
        match value {
            Some(value) if !value.is_null() => value.clone(),
            _ => fallback.cloned().unwrap_or_default(),
        }
    }

    /// Apply the scale, or pass the value through when scaling is disabled
    pub fn encode_value(&self, value: &Value) -> Value {
        match &self.scale {
            Some(scale) => scale.apply(value),
            None => value.clone(),
        }
    }

    /// Scaled value of `datum`, or `fallback` when either the raw or the scaled
    /// value is null
    pub fn encode_datum(&self, datum: &Datum, fallback: Option<&Value>) -> Value {
        let raw = self.get_value_from_datum(datum, None);
        let encoded = if raw.is_null() {
            Value::Null
        } else {
            self.encode_value(&raw)
        };
        match (encoded.is_null(), fallback) {
            (true, Some(fallback)) => fallback.clone(),
            _ => encoded,
        }
    }

    pub fn format_value(&self, value: &Value) -> String {
        self.formatter.format(value)
    }

    pub fn format_datum(&self, datum: &Datum) -> String {
        self.format_value(&self.get_value_from_datum(datum, None))
    }

    /// Observed domain of this channel over `dataset`
    ///
    /// Categorical fields give their distinct values in first-seen order;
    /// quantitative and temporal fields give `[min, max]`, or `[0, 1]` when no
    /// value is defined.
    pub fn get_domain(&self, dataset: &[Datum]) -> Vec<Value> {
        let data_type = match &self.definition {
            CompleteChannelDef::Value(def) => return vec![def.value.clone()],
            CompleteChannelDef::Field(def) => def.data_type,
        };
        let values = dataset
            .iter()
            .map(|datum| self.get_value_from_datum(datum, None))
            .filter(|value| !value.is_null());

        match data_type {
            DataType::Quantitative => {
                let numbers: Vec<f64> = values.filter_map(|v| v.as_f64()).collect();
                extent(numbers, Value::Number)
            }
            DataType::Temporal => {
                let instants: Vec<_> = values.filter_map(|v| v.as_datetime()).collect();
                extent(instants, Value::DateTime)
            }
            DataType::Nominal | DataType::Ordinal | DataType::Geojson => unique_values(values).0,
        }
    }

    /// A copy whose scale domain is the observed domain of `dataset`, unless
    /// the definition fixes its own domain
    pub fn with_domain_from_dataset(&self, dataset: &[Datum]) -> Result<Self> {
        let CompleteChannelDef::Field(def) = &self.definition else {
            return Ok(self.clone());
        };
        let Some(scale) = def.scale.as_ref().filter(|scale| scale.domain.is_none()) else {
            return Ok(self.clone());
        };

        let mut scale = scale.clone();
        scale.domain = Some(
            self.get_domain(dataset)
                .into_iter()
                .map(DomainValue::Value)
                .collect(),
        );
        let mut def = def.clone();
        def.scale = Some(scale);
        Self::from_complete(
            self.name.clone(),
            self.channel_type,
            CompleteChannelDef::Field(def),
            self.context.clone(),
            self.options,
        )
    }

    pub fn is_x(&self) -> bool {
        self.channel_type.is_x()
    }

    pub fn is_y(&self) -> bool {
        self.channel_type.is_y()
    }

    pub fn is_x_or_y(&self) -> bool {
        self.channel_type.is_x_or_y()
    }

    /// Whether this channel partitions the data rather than positioning it on
    /// a continuum
    pub fn is_group_by(&self) -> bool {
        let Some(data_type) = self.definition.data_type() else {
            return false;
        };
        self.channel_type.is_inherently_categorical()
            || ((self.channel_type == ChannelType::Color || self.channel_type.is_x_or_y())
                && data_type.is_discrete())
    }

    /// Field channels of a legend-eligible role, unless the legend was switched off
    pub fn has_legend(&self) -> bool {
        match &self.definition {
            CompleteChannelDef::Value(_) => false,
            CompleteChannelDef::Field(def) => def.legend && self.channel_type.is_legend_eligible(),
        }
    }
}

fn extent<T: PartialOrd + Copy>(items: Vec<T>, wrap: impl Fn(T) -> Value) -> Vec<Value> {
    let mut items = items.into_iter();
    let Some(first) = items.next() else {
        return vec![Value::Number(0.0), Value::Number(1.0)];
    };
    let (min, max) = items.fold((first, first), |(min, max), x| {
        (
            if x < min { x } else { min },
            if x > max { x } else { max },
        )
    });
    vec![wrap(min), wrap(max)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn encoder(channel_type: ChannelType, def: serde_json::Value) -> ChannelEncoder {
        let def: ChannelDef = serde_json::from_value(def).unwrap();
        ChannelEncoder::new(
            "test",
            channel_type,
            &def,
            &ScaleContext::default(),
            &CompletionOptions::default(),
        )
        .unwrap()
    }

    fn data(rows: serde_json::Value) -> Vec<Datum> {
        serde_json::from_value(rows).unwrap()
    }

    #[test]
    fn test_encode_datum_with_scale() {
        let x = encoder(
            ChannelType::X,
            json!({"field": "speed", "type": "quantitative", "scale": {"domain": [0, 10], "range": [0, 100]}}),
        );
        let rows = data(json!([{"speed": 5}, {"speed": null}, {}]));
        assert_eq!(x.encode_datum(&rows[0], None), Value::from(50.0));
        assert_eq!(x.encode_datum(&rows[1], None), Value::Null);
        assert_eq!(x.encode_datum(&rows[2], Some(&Value::from(-1))), Value::from(-1));
    }

    #[test]
    fn test_value_channel_passes_constant() {
        let color = encoder(ChannelType::Color, json!({"value": "steelblue"}));
        assert!(color.scale().is_none());
        assert_eq!(
            color.encode_datum(&Datum::new(), None),
            Value::from("steelblue")
        );
        assert_eq!(color.get_domain(&[]), vec![Value::from("steelblue")]);
        assert!(!color.has_legend());
    }

    #[test]
    fn test_disabled_scale_is_identity() {
        let text = encoder(ChannelType::Text, json!({"field": "name", "type": "nominal", "scale": false}));
        let rows = data(json!([{"name": "Ada"}]));
        assert_eq!(text.encode_datum(&rows[0], None), Value::from("Ada"));
    }

    #[test]
    fn test_format_datum() {
        let y = encoder(
            ChannelType::Y,
            json!({"field": "price", "type": "quantitative", "format": "%.1f"}),
        );
        let rows = data(json!([{"price": 3.14159}, {}]));
        assert_eq!(y.format_datum(&rows[0]), "3.1");
        assert_eq!(y.format_datum(&rows[1]), "");

        let broken = encoder(
            ChannelType::Y,
            json!({"field": "price", "type": "quantitative", "format": "no conversion"}),
        );
        assert_eq!(broken.format_datum(&rows[0]), "3.14159");
    }

    #[test]
    fn test_get_domain() {
        let rows = data(json!([
            {"brand": "b", "price": 3, "day": "2020-01-02"},
            {"brand": "a", "price": -1, "day": "2020-01-01"},
            {"brand": "b", "price": null, "day": null}
        ]));

        let color = encoder(ChannelType::Color, json!({"field": "brand", "type": "nominal"}));
        assert_eq!(color.get_domain(&rows), vec![Value::from("b"), Value::from("a")]);

        let y = encoder(ChannelType::Y, json!({"field": "price", "type": "quantitative"}));
        assert_eq!(y.get_domain(&rows), vec![Value::from(-1.0), Value::from(3.0)]);
        assert_eq!(y.get_domain(&[]), vec![Value::from(0.0), Value::from(1.0)]);

        let x = encoder(ChannelType::X, json!({"field": "day", "type": "temporal"}));
        assert_eq!(
            x.get_domain(&rows),
            vec![
                Value::DateTime(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()),
                Value::DateTime(Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap()),
            ]
        );
    }

    #[test]
    fn test_with_domain_from_dataset() {
        let y = encoder(
            ChannelType::Y,
            json!({"field": "price", "type": "quantitative", "scale": {"range": [0, 100], "nice": false, "zero": false}}),
        );
        let rows = data(json!([{"price": 10}, {"price": 20}]));
        let fitted = y.with_domain_from_dataset(&rows).unwrap();
        assert_eq!(fitted.encode_datum(&rows[1], None), Value::from(100.0));
        assert_eq!(fitted.encode_datum(&rows[0], None), Value::from(0.0));

        let fixed = encoder(
            ChannelType::Y,
            json!({"field": "price", "type": "quantitative", "scale": {"domain": [0, 40], "range": [0, 100]}}),
        );
        let fitted = fixed.with_domain_from_dataset(&rows).unwrap();
        assert_eq!(fitted.encode_datum(&rows[0], None), Value::from(25.0));
    }

    #[test]
    fn test_role_predicates() {
        let x = encoder(ChannelType::X, json!({"field": "speed", "type": "quantitative"}));
        assert!(x.is_x() && x.is_x_or_y() && !x.is_y());
        assert!(!x.is_group_by());

        let x_band = encoder(ChannelType::XBand, json!({"field": "brand", "type": "nominal"}));
        assert!(x_band.is_group_by());

        let size = encoder(ChannelType::Size, json!({"field": "brand", "type": "nominal"}));
        assert!(!size.is_group_by());
        assert!(size.has_legend());

        let tooltip = encoder(ChannelType::Text, json!({"field": "price", "type": "quantitative"}));
        assert!(tooltip.is_group_by());

        let hidden = encoder(ChannelType::Color, json!({"field": "brand", "type": "nominal", "legend": false}));
        assert!(!hidden.has_legend());
    }

    #[test]
    fn test_unimplemented_scale_option_fails() {
        let def: ChannelDef = serde_json::from_value(
            json!({"field": "v", "type": "quantitative", "scale": {"interpolate": "hcl"}}),
        )
        .unwrap();
        let result = ChannelEncoder::new(
            "v",
            ChannelType::Color,
            &def,
            &ScaleContext::default(),
            &CompletionOptions::default(),
        );
        assert!(matches!(result, Err(crate::EncodableError::Unimplemented(_))));
    }
}
