//! Scale families, their legal properties and scale type inference
//!
//! # Property legality
//!
//! Not every scale property means something for every family (`padding` on a
//! log scale, `base` on a band scale). `ScaleType::supports` is the single
//! table answering "may this property be set on this family"; completion drops
//! everything the table rejects.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::channel::{Bin, ChannelType, DataType};

/// Enum of all scale families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScaleType {
    Linear,
    Log,
    Pow,
    Sqrt,
    Symlog,
    /// Local time
    Time,
    /// UTC time
    Utc,
    Ordinal,
    Point,
    Band,
    Quantile,
    Quantize,
    Threshold,
    BinOrdinal,
}

/// Every configurable scale property besides `type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScaleProperty {
    Domain,
    Range,
    Reverse,
    Clamp,
    Nice,
    Zero,
    Round,
    Interpolate,
    Padding,
    PaddingInner,
    PaddingOuter,
    Align,
    Scheme,
    Namespace,
    Bins,
    Base,
    Exponent,
    Constant,
}

impl ScaleProperty {
    pub fn name(&self) -> &'static str {
        match self {
            ScaleProperty::Domain => "domain",
            ScaleProperty::Range => "range",
            ScaleProperty::Reverse => "reverse",
            ScaleProperty::Clamp => "clamp",
            ScaleProperty::Nice => "nice",
            ScaleProperty::Zero => "zero",
            ScaleProperty::Round => "round",
            ScaleProperty::Interpolate => "interpolate",
            ScaleProperty::Padding => "padding",
            ScaleProperty::PaddingInner => "paddingInner",
            ScaleProperty::PaddingOuter => "paddingOuter",
            ScaleProperty::Align => "align",
            ScaleProperty::Scheme => "scheme",
            ScaleProperty::Namespace => "namespace",
            ScaleProperty::Bins => "bins",
            ScaleProperty::Base => "base",
            ScaleProperty::Exponent => "exponent",
            ScaleProperty::Constant => "constant",
        }
    }
}

impl ScaleType {
    pub fn name(&self) -> &'static str {
        match self {
            ScaleType::Linear => "linear",
            ScaleType::Log => "log",
            ScaleType::Pow => "pow",
            ScaleType::Sqrt => "sqrt",
            ScaleType::Symlog => "symlog",
            ScaleType::Time => "time",
            ScaleType::Utc => "utc",
            ScaleType::Ordinal => "ordinal",
            ScaleType::Point => "point",
            ScaleType::Band => "band",
            ScaleType::Quantile => "quantile",
            ScaleType::Quantize => "quantize",
            ScaleType::Threshold => "threshold",
            ScaleType::BinOrdinal => "bin-ordinal",
        }
    }

    /// Continuous domain to continuous range
    pub fn is_continuous(&self) -> bool {
        matches!(
            self,
            ScaleType::Linear
                | ScaleType::Log
                | ScaleType::Pow
                | ScaleType::Sqrt
                | ScaleType::Symlog
                | ScaleType::Time
                | ScaleType::Utc
        )
    }

    /// Discrete domain (ordinal, point, band, bin-ordinal)
    pub fn is_discrete(&self) -> bool {
        matches!(
            self,
            ScaleType::Ordinal | ScaleType::Point | ScaleType::Band | ScaleType::BinOrdinal
        )
    }

    /// Continuous domain to discrete range
    pub fn is_discretizing(&self) -> bool {
        matches!(
            self,
            ScaleType::Quantile | ScaleType::Quantize | ScaleType::Threshold
        )
    }

    pub fn is_time(&self) -> bool {
        matches!(self, ScaleType::Time | ScaleType::Utc)
    }

    /// Point and band scales
    pub fn is_banded(&self) -> bool {
        matches!(self, ScaleType::Point | ScaleType::Band)
    }

    /// Whether `property` may be set on this family
    pub fn supports(&self, property: ScaleProperty) -> bool {
        match property {
            ScaleProperty::Domain | ScaleProperty::Range | ScaleProperty::Reverse => true,
            ScaleProperty::Clamp => self.is_continuous(),
            ScaleProperty::Nice => {
                self.is_continuous() || matches!(self, ScaleType::Quantize | ScaleType::Threshold)
            }
            ScaleProperty::Zero => matches!(
                self,
                ScaleType::Linear
                    | ScaleType::Pow
                    | ScaleType::Sqrt
                    | ScaleType::Symlog
                    | ScaleType::Quantize
            ),
            ScaleProperty::Round => self.is_continuous() || self.is_banded(),
            ScaleProperty::Interpolate => self.is_continuous(),
            ScaleProperty::Padding | ScaleProperty::PaddingOuter | ScaleProperty::Align => {
                self.is_banded()
            }
            ScaleProperty::PaddingInner => matches!(self, ScaleType::Band),
            ScaleProperty::Scheme => !self.is_banded(),
            ScaleProperty::Namespace => matches!(self, ScaleType::Ordinal),
            ScaleProperty::Bins => self.is_continuous() || matches!(self, ScaleType::BinOrdinal),
            ScaleProperty::Base => matches!(self, ScaleType::Log),
            ScaleProperty::Exponent => matches!(self, ScaleType::Pow),
            ScaleProperty::Constant => matches!(self, ScaleType::Symlog),
        }
    }

    /// Whether completion turns `property` on when the caller left it unset.
    /// `nice`, `clamp` and `zero` default to `true` wherever they are legal.
    pub fn defaults_on(&self, property: ScaleProperty) -> bool {
        matches!(
            property,
            ScaleProperty::Nice | ScaleProperty::Clamp | ScaleProperty::Zero
        ) && self.supports(property)
    }
}

impl fmt::Display for ScaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Infer the scale family for a field channel
///
/// Returns `None` when no scale applies (text channels, geojson fields); the
/// caller treats that as scaling disabled.
pub fn infer_scale_type(
    channel_type: ChannelType,
    data_type: DataType,
    bin: Option<&Bin>,
    use_local_time: bool,
) -> Option<ScaleType> {
    if channel_type == ChannelType::Text {
        return None;
    }

    match data_type {
        DataType::Nominal | DataType::Ordinal => Some(match channel_type {
            ChannelType::Color | ChannelType::Category => ScaleType::Ordinal,
            ChannelType::XBand | ChannelType::YBand => ScaleType::Band,
            _ => ScaleType::Point,
        }),
        DataType::Quantitative => {
            if channel_type == ChannelType::Category {
                return Some(ScaleType::Ordinal);
            }
            match bin {
                Some(bin) if bin.is_enabled() && !channel_type.is_x_or_y() => {
                    if bin.requests_buckets() {
                        Some(ScaleType::Quantize)
                    } else {
                        Some(ScaleType::BinOrdinal)
                    }
                }
                _ => Some(ScaleType::Linear),
            }
        }
        DataType::Temporal => {
            if channel_type == ChannelType::Category {
                Some(ScaleType::Ordinal)
            } else if use_local_time {
                Some(ScaleType::Time)
            } else {
                Some(ScaleType::Utc)
            }
        }
        DataType::Geojson => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::BinParams;

    #[test]
    fn test_scale_type_serialization() {
        let json = serde_json::to_string(&ScaleType::BinOrdinal).unwrap();
        assert_eq!(json, "\"bin-ordinal\"");
        let parsed: ScaleType = serde_json::from_str("\"utc\"").unwrap();
        assert_eq!(parsed, ScaleType::Utc);
        assert_eq!(format!("{}", ScaleType::Quantize), "quantize");
    }

    #[test]
    fn test_family_predicates() {
        assert!(ScaleType::Log.is_continuous());
        assert!(!ScaleType::Quantize.is_continuous());
        assert!(ScaleType::Quantize.is_discretizing());
        assert!(ScaleType::Band.is_discrete());
        assert!(ScaleType::Utc.is_time());
    }

    #[test]
    fn test_property_table() {
        assert!(ScaleType::Linear.supports(ScaleProperty::Zero));
        assert!(!ScaleType::Log.supports(ScaleProperty::Zero));
        assert!(!ScaleType::Time.supports(ScaleProperty::Zero));
        assert!(!ScaleType::Quantile.supports(ScaleProperty::Zero));
        assert!(!ScaleType::Threshold.supports(ScaleProperty::Zero));

        assert!(ScaleType::Log.supports(ScaleProperty::Nice));
        assert!(ScaleType::Threshold.supports(ScaleProperty::Nice));
        assert!(!ScaleType::Quantile.supports(ScaleProperty::Nice));
        assert!(!ScaleType::Point.supports(ScaleProperty::Nice));

        assert!(ScaleType::Utc.supports(ScaleProperty::Clamp));
        assert!(!ScaleType::Quantize.supports(ScaleProperty::Clamp));
        assert!(!ScaleType::Ordinal.supports(ScaleProperty::Clamp));

        assert!(ScaleType::Band.supports(ScaleProperty::PaddingInner));
        assert!(!ScaleType::Point.supports(ScaleProperty::PaddingInner));
        assert!(ScaleType::Ordinal.supports(ScaleProperty::Namespace));
        assert!(!ScaleType::Band.supports(ScaleProperty::Scheme));
        assert!(ScaleType::Log.supports(ScaleProperty::Base));
        assert!(!ScaleType::Linear.supports(ScaleProperty::Base));
    }

    #[test]
    fn test_defaults_on() {
        assert!(ScaleType::Linear.defaults_on(ScaleProperty::Nice));
        assert!(ScaleType::Linear.defaults_on(ScaleProperty::Zero));
        assert!(!ScaleType::Linear.defaults_on(ScaleProperty::Round));
        assert!(!ScaleType::Point.defaults_on(ScaleProperty::Nice));
        assert!(!ScaleType::Log.defaults_on(ScaleProperty::Zero));
    }

    #[test]
    fn test_infer_discrete_fields() {
        use ChannelType::*;
        assert_eq!(infer_scale_type(Color, DataType::Nominal, None, false), Some(ScaleType::Ordinal));
        assert_eq!(infer_scale_type(Category, DataType::Ordinal, None, false), Some(ScaleType::Ordinal));
        assert_eq!(infer_scale_type(X, DataType::Nominal, None, false), Some(ScaleType::Point));
        assert_eq!(infer_scale_type(YBand, DataType::Nominal, None, false), Some(ScaleType::Band));
        assert_eq!(infer_scale_type(Size, DataType::Ordinal, None, false), Some(ScaleType::Point));
        assert_eq!(infer_scale_type(Text, DataType::Nominal, None, false), None);
    }

    #[test]
    fn test_infer_quantitative_fields() {
        use ChannelType::*;
        assert_eq!(infer_scale_type(X, DataType::Quantitative, None, false), Some(ScaleType::Linear));
        assert_eq!(infer_scale_type(Size, DataType::Quantitative, None, false), Some(ScaleType::Linear));
        assert_eq!(
            infer_scale_type(Color, DataType::Quantitative, Some(&Bin::Flag(true)), false),
            Some(ScaleType::BinOrdinal)
        );
        let buckets = Bin::Params(BinParams {
            maxbins: Some(5),
            step: None,
        });
        assert_eq!(
            infer_scale_type(Color, DataType::Quantitative, Some(&buckets), false),
            Some(ScaleType::Quantize)
        );
        assert_eq!(
            infer_scale_type(X, DataType::Quantitative, Some(&Bin::Flag(true)), false),
            Some(ScaleType::Linear)
        );
        assert_eq!(
            infer_scale_type(Color, DataType::Quantitative, Some(&Bin::Flag(false)), false),
            Some(ScaleType::Linear)
        );
    }

    #[test]
    fn test_infer_temporal_and_geojson() {
        use ChannelType::*;
        assert_eq!(infer_scale_type(X, DataType::Temporal, None, false), Some(ScaleType::Utc));
        assert_eq!(infer_scale_type(X, DataType::Temporal, None, true), Some(ScaleType::Time));
        assert_eq!(infer_scale_type(Category, DataType::Temporal, None, true), Some(ScaleType::Ordinal));
        assert_eq!(infer_scale_type(Color, DataType::Geojson, None, false), None);
    }
}
