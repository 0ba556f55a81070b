//! Channel roles and field data types
//!
//! A channel's role (`ChannelType`) and its field's `DataType` are orthogonal:
//! the role decides which defaults apply (axes only exist for positional roles),
//! the data type decides which scale family is inferred.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::EncodableError;

/// The role a channel plays in a chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelType {
    /// Horizontal position
    X,
    /// Vertical position
    Y,
    /// Horizontal position that reserves band width (bars)
    XBand,
    /// Vertical position that reserves band width (bars)
    YBand,
    /// Fill or stroke color
    Color,
    /// Mark size
    Size,
    /// Any other numeric visual property (opacity, stroke width, ...)
    Numeric,
    /// Discrete visual property (shape, dash pattern, ...)
    Category,
    /// Text content (labels, tooltips)
    Text,
}

impl ChannelType {
    pub const ALL: [ChannelType; 9] = [
        ChannelType::X,
        ChannelType::Y,
        ChannelType::XBand,
        ChannelType::YBand,
        ChannelType::Color,
        ChannelType::Size,
        ChannelType::Numeric,
        ChannelType::Category,
        ChannelType::Text,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ChannelType::X => "X",
            ChannelType::Y => "Y",
            ChannelType::XBand => "XBand",
            ChannelType::YBand => "YBand",
            ChannelType::Color => "Color",
            ChannelType::Size => "Size",
            ChannelType::Numeric => "Numeric",
            ChannelType::Category => "Category",
            ChannelType::Text => "Text",
        }
    }

    pub fn is_x(&self) -> bool {
        matches!(self, ChannelType::X | ChannelType::XBand)
    }

    pub fn is_y(&self) -> bool {
        matches!(self, ChannelType::Y | ChannelType::YBand)
    }

    pub fn is_x_or_y(&self) -> bool {
        self.is_x() || self.is_y()
    }

    /// Position channels that reserve a band for each category
    pub fn is_band(&self) -> bool {
        matches!(self, ChannelType::XBand | ChannelType::YBand)
    }

    /// Only positional channels get an axis
    pub fn supports_axis(&self) -> bool {
        self.is_x_or_y()
    }

    /// Channels that can be explained by a legend
    pub fn is_legend_eligible(&self) -> bool {
        matches!(
            self,
            ChannelType::Color | ChannelType::Size | ChannelType::Numeric | ChannelType::Category
        )
    }

    /// Channels that partition data regardless of their field type
    pub fn is_inherently_categorical(&self) -> bool {
        matches!(self, ChannelType::Category | ChannelType::Text)
    }
}

impl fmt::Display for ChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ChannelType {
    type Err = EncodableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChannelType::ALL
            .iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| {
                let names: Vec<&str> = ChannelType::ALL.iter().map(|t| t.name()).collect();
                EncodableError::ValidationError(format!(
                    "Unknown channel type '{}'. Expected one of: {}",
                    s,
                    names.join(", ")
                ))
            })
    }
}

/// The declared type of a data field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Nominal,
    Ordinal,
    Quantitative,
    Temporal,
    Geojson,
}

impl DataType {
    /// Nominal and ordinal fields hold categories
    pub fn is_discrete(&self) -> bool {
        matches!(self, DataType::Nominal | DataType::Ordinal)
    }

    /// Quantitative and temporal fields hold points on a continuum
    pub fn is_continuous(&self) -> bool {
        matches!(self, DataType::Quantitative | DataType::Temporal)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DataType::Nominal => "nominal",
            DataType::Ordinal => "ordinal",
            DataType::Quantitative => "quantitative",
            DataType::Temporal => "temporal",
            DataType::Geojson => "geojson",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_predicates() {
        assert!(ChannelType::X.is_x());
        assert!(ChannelType::XBand.is_x());
        assert!(!ChannelType::X.is_y());
        assert!(ChannelType::YBand.is_y());
        assert!(ChannelType::YBand.is_x_or_y());
        assert!(!ChannelType::Color.is_x_or_y());
        assert!(!ChannelType::Text.supports_axis());
    }

    #[test]
    fn test_legend_eligibility() {
        assert!(ChannelType::Color.is_legend_eligible());
        assert!(ChannelType::Category.is_legend_eligible());
        assert!(!ChannelType::X.is_legend_eligible());
        assert!(!ChannelType::Text.is_legend_eligible());
    }

    #[test]
    fn test_channel_type_from_str() {
        assert_eq!("xband".parse::<ChannelType>().unwrap(), ChannelType::XBand);
        assert_eq!("Color".parse::<ChannelType>().unwrap(), ChannelType::Color);
        let err = "Shape".parse::<ChannelType>().unwrap_err();
        assert!(err.to_string().contains("Unknown channel type"));
    }

    #[test]
    fn test_channel_type_serialization() {
        let json = serde_json::to_string(&ChannelType::YBand).unwrap();
        assert_eq!(json, "\"YBand\"");
        let data_type: DataType = serde_json::from_str("\"temporal\"").unwrap();
        assert_eq!(data_type, DataType::Temporal);
        assert_eq!(format!("{}", DataType::Geojson), "geojson");
    }
}
