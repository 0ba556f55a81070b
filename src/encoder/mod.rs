//! Encoders: every channel of one chart, resolved
//!
//! A chart declares its channels up front (name and role). An [`Encoding`]
//! binds each declared channel to one definition, or to a list of definitions
//! for multi-valued channels such as tooltips.

mod channel;

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

pub use channel::ChannelEncoder;

use crate::channel::{ChannelDef, ChannelType, CompletionOptions};
use crate::scale::ScaleContext;
use crate::{Datum, EncodableError, Result};

/// What an encoding binds to one channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EncodingEntry {
    Single(ChannelDef),
    Multiple(Vec<ChannelDef>),
}

impl From<ChannelDef> for EncodingEntry {
    fn from(def: ChannelDef) -> Self {
        EncodingEntry::Single(def)
    }
}

impl From<Vec<ChannelDef>> for EncodingEntry {
    fn from(defs: Vec<ChannelDef>) -> Self {
        EncodingEntry::Multiple(defs)
    }
}

/// Channel name to definition(s)
pub type Encoding = HashMap<String, EncodingEntry>;

/// The encoder(s) of one channel
#[derive(Debug, Clone)]
pub enum ChannelEncoders {
    Single(ChannelEncoder),
    Multiple(Vec<ChannelEncoder>),
}

impl ChannelEncoders {
    pub fn iter(&self) -> impl Iterator<Item = &ChannelEncoder> {
        let encoders: &[ChannelEncoder] = match self {
            ChannelEncoders::Single(encoder) => std::slice::from_ref(encoder),
            ChannelEncoders::Multiple(encoders) => encoders,
        };
        encoders.iter()
    }

    pub fn as_single(&self) -> Option<&ChannelEncoder> {
        match self {
            ChannelEncoders::Single(encoder) => Some(encoder),
            ChannelEncoders::Multiple(_) => None,
        }
    }

    fn try_map(&self, f: impl Fn(&ChannelEncoder) -> Result<ChannelEncoder>) -> Result<Self> {
        Ok(match self {
            ChannelEncoders::Single(encoder) => ChannelEncoders::Single(f(encoder)?),
            ChannelEncoders::Multiple(encoders) => ChannelEncoders::Multiple(
                encoders.iter().map(f).collect::<Result<Vec<_>>>()?,
            ),
        })
    }
}

/// All channels of a chart
#[derive(Debug, Clone)]
pub struct Encoder {
    channel_types: Vec<(String, ChannelType)>,
    channels: HashMap<String, ChannelEncoders>,
    legends: BTreeMap<String, Vec<String>>,
}

impl Encoder {
    /// Build an encoder with default completion options
    pub fn new(
        channel_types: &[(&str, ChannelType)],
        encoding: Encoding,
        context: &ScaleContext,
    ) -> Result<Self> {
        Self::with_options(channel_types, encoding, context, &CompletionOptions::default())
    }

    /// Build an encoder from an encoding written as JSON
    pub fn from_json(
        channel_types: &[(&str, ChannelType)],
        encoding: &str,
        context: &ScaleContext,
    ) -> Result<Self> {
        let encoding: Encoding = serde_json::from_str(encoding)?;
        Self::new(channel_types, encoding, context)
    }

    /// Build an encoder; `encoding` must bind exactly the declared channels
    pub fn with_options(
        channel_types: &[(&str, ChannelType)],
        mut encoding: Encoding,
        context: &ScaleContext,
        options: &CompletionOptions,
    ) -> Result<Self> {
        if let Some(name) = encoding
            .keys()
            .find(|name| !channel_types.iter().any(|(declared, _)| declared == *name))
        {
            return Err(EncodableError::ValidationError(format!(
                "Encoding has channel '{}' which is not declared. Declared channels: {}",
                name,
                channel_types
                    .iter()
                    .map(|(name, _)| *name)
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }

        let mut channels = HashMap::new();
        for (name, channel_type) in channel_types {
            let entry = encoding.remove(*name).ok_or_else(|| {
                EncodableError::ValidationError(format!(
                    "Encoding is missing declared channel '{}'",
                    name
                ))
            })?;
            let encoders = match entry {
                EncodingEntry::Single(def) => ChannelEncoders::Single(ChannelEncoder::new(
                    *name,
                    *channel_type,
                    &def,
                    context,
                    options,
                )?),
                EncodingEntry::Multiple(defs) => ChannelEncoders::Multiple(
                    defs.iter()
                        .enumerate()
                        .map(|(i, def)| {
                            ChannelEncoder::new(
                                format!("{}[{}]", name, i),
                                *channel_type,
                                def,
                                context,
                                options,
                            )
                        })
                        .collect::<Result<Vec<_>>>()?,
                ),
            };
            channels.insert(name.to_string(), encoders);
        }

        let channel_types = channel_types
            .iter()
            .map(|(name, channel_type)| (name.to_string(), *channel_type))
            .collect();
        Ok(Self::assemble(channel_types, channels))
    }

    fn assemble(
        channel_types: Vec<(String, ChannelType)>,
        channels: HashMap<String, ChannelEncoders>,
    ) -> Self {
        let mut legends: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, _) in &channel_types {
            let Some(encoder) = channels.get(name).and_then(ChannelEncoders::as_single) else {
                continue;
            };
            if !encoder.has_legend() {
                continue;
            }
            if let Some(field) = encoder.definition().field_name() {
                legends.entry(field.to_string()).or_default().push(name.clone());
            }
        }

        Self {
            channel_types,
            channels,
            legends,
        }
    }

    /// Declared channel names in declaration order
    pub fn get_channel_names(&self) -> Vec<&str> {
        self.channel_types.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn channel(&self, name: &str) -> Option<&ChannelEncoders> {
        self.channels.get(name)
    }

    /// Every channel encoder, array elements included, in declaration order
    pub fn encoders(&self) -> impl Iterator<Item = &ChannelEncoder> {
        self.channel_types
            .iter()
            .filter_map(|(name, _)| self.channels.get(name))
            .flat_map(ChannelEncoders::iter)
    }

    /// Fields of the group-by channels, deduplicated in first-seen order
    pub fn get_group_bys(&self) -> Vec<String> {
        let mut fields: Vec<String> = Vec::new();
        for encoder in self.encoders().filter(|e| e.is_group_by()) {
            match encoder.definition().field_name() {
                Some(field) if !field.is_empty() && !fields.iter().any(|f| f == field) => {
                    fields.push(field.to_string())
                }
                _ => {}
            }
        }
        fields
    }

    /// Field to the names of the channels its legend represents
    pub fn legends(&self) -> &BTreeMap<String, Vec<String>> {
        &self.legends
    }

    pub fn has_legend(&self) -> bool {
        !self.legends.is_empty()
    }

    /// A copy whose scales take their domains from `dataset` where the
    /// definitions leave them open
    pub fn with_domains_from_dataset(&self, dataset: &[Datum]) -> Result<Self> {
        let channels = self
            .channels
            .iter()
            .map(|(name, encoders)| {
                let fitted = encoders.try_map(|e| e.with_domain_from_dataset(dataset))?;
                Ok((name.clone(), fitted))
            })
            .collect::<Result<HashMap<_, _>>>()?;
        Ok(Self::assemble(self.channel_types.clone(), channels))
    }
}

/// Builds encoders for one chart type from its channel declarations and
/// default encoding
#[derive(Debug, Clone)]
pub struct EncoderFactory {
    channel_types: Vec<(String, ChannelType)>,
    default_encoding: Encoding,
    options: CompletionOptions,
}

impl EncoderFactory {
    pub fn new(channel_types: &[(&str, ChannelType)], default_encoding: Encoding) -> Self {
        Self {
            channel_types: channel_types
                .iter()
                .map(|(name, channel_type)| (name.to_string(), *channel_type))
                .collect(),
            default_encoding,
            options: CompletionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }

    /// Defaults with each overridden channel replaced wholesale
    pub fn merge_encoding(&self, overrides: Encoding) -> Encoding {
        let mut merged = self.default_encoding.clone();
        merged.extend(overrides);
        merged
    }

    pub fn create(&self, overrides: Encoding, context: &ScaleContext) -> Result<Encoder> {
        let channel_types: Vec<(&str, ChannelType)> = self
            .channel_types
            .iter()
            .map(|(name, channel_type)| (name.as_str(), *channel_type))
            .collect();
        Encoder::with_options(
            &channel_types,
            self.merge_encoding(overrides),
            context,
            &self.options,
        )
    }
}
