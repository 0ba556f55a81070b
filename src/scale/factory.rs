//! Turning a completed scale config into a realized scale
//!
//! Configuration is applied in a fixed order: domain, range, align, bins,
//! clamp, interpolate, nice, padding, round, zero. Later stages see the effect
//! of earlier ones (`zero` extends the niced domain, for example).

use super::breaks::DEFAULT_TICK_COUNT;
use super::color::ScaleContext;
use super::config::{CompleteScaleConfig, DomainValue, Interpolate, Nice};
use super::continuous::{ContinuousScale, OutputRange, Transform};
use super::discrete::{BandScale, BinOrdinalScale, NamespacedColorScale, OrdinalScale};
use super::discretizing::{QuantileScale, QuantizeScale, ThresholdScale};
use super::palettes::ColorSpace;
use super::realized::Scale;
use super::ScaleType;
use crate::{EncodableError, Result, Value};

/// Realize a completed scale config
pub fn create_scale_from_scale_config(
    config: &CompleteScaleConfig,
    ctx: &ScaleContext,
) -> Result<Scale> {
    let scale = match config.scale_type {
        ScaleType::Ordinal if config.range.is_none() => categorical_color_scale(config, ctx)?,
        ScaleType::Ordinal => {
            let domain = discrete_domain(config)?.unwrap_or_default();
            Scale::new(OrdinalScale::new(domain, config.range.clone().unwrap_or_default()))
        }
        ScaleType::Point | ScaleType::Band => Scale::new(band_scale(config)?),
        ScaleType::BinOrdinal => {
            check_bins(config)?;
            let boundaries = numeric_domain(config, false)?.unwrap_or_default();
            Scale::new(BinOrdinalScale::new(boundaries, discrete_range(config, ctx)))
        }
        ScaleType::Quantize => Scale::new(quantize_scale(config, ctx)?),
        ScaleType::Quantile => {
            let sample = numeric_domain(config, false)?.unwrap_or_default();
            Scale::new(QuantileScale::new(sample, discrete_range(config, ctx)))
        }
        ScaleType::Threshold => {
            let thresholds = numeric_domain(config, false)?.unwrap_or_else(|| vec![0.5]);
            Scale::new(ThresholdScale::new(thresholds, discretizing_range(config, ctx)))
        }
        ScaleType::Symlog => {
            return Err(EncodableError::Unimplemented("symlog scales".to_string()))
        }
        ScaleType::Linear
        | ScaleType::Log
        | ScaleType::Pow
        | ScaleType::Sqrt
        | ScaleType::Time
        | ScaleType::Utc => Scale::new(continuous_scale(config, ctx)?),
    };

    tracing::debug!("Realized {} scale", config.scale_type);
    Ok(scale)
}

fn categorical_color_scale(config: &CompleteScaleConfig, ctx: &ScaleContext) -> Result<Scale> {
    let table = ctx
        .namespace
        .get_scale(config.scheme.as_deref(), config.namespace.as_deref());
    let domain = discrete_domain(config)?.unwrap_or_default();
    Ok(Scale::new(NamespacedColorScale::new(table, domain)))
}

// =============================================================================
// Shared stages
// =============================================================================

fn check_bins(config: &CompleteScaleConfig) -> Result<()> {
    if config.bins.is_some() {
        return Err(EncodableError::Unimplemented("scale.bins".to_string()));
    }
    Ok(())
}

fn nice_count(config: &CompleteScaleConfig) -> Result<Option<usize>> {
    match &config.nice {
        None | Some(Nice::Flag(false)) => Ok(None),
        Some(Nice::Flag(true)) => Ok(Some(DEFAULT_TICK_COUNT)),
        Some(Nice::Count(count)) if *count >= 1.0 => Ok(Some(*count as usize)),
        Some(Nice::Count(_)) => Ok(None),
        Some(Nice::Interval(interval)) | Some(Nice::IntervalStep { interval, .. }) => Err(
            EncodableError::Unimplemented(format!("scale.nice with time interval '{}'", interval)),
        ),
    }
}

/// Numeric domain in the order written; time scales read date descriptors and
/// date strings as epoch milliseconds
fn numeric_domain(config: &CompleteScaleConfig, time: bool) -> Result<Option<Vec<f64>>> {
    let Some(domain) = &config.domain else {
        return Ok(None);
    };
    let local = config.scale_type == ScaleType::Time;
    domain
        .iter()
        .map(|entry| {
            let number = match entry {
                DomainValue::DateTime(spec) => {
                    Some(spec.resolve(local)?.timestamp_millis() as f64)
                }
                DomainValue::Value(value) if time => {
                    value.as_datetime().map(|dt| dt.timestamp_millis() as f64)
                }
                DomainValue::Value(value) => value.as_f64(),
            };
            number.ok_or_else(|| {
                EncodableError::InvalidConfig(format!(
                    "Domain value {:?} is not valid for a {} scale",
                    entry, config.scale_type
                ))
            })
        })
        .collect::<Result<Vec<_>>>()
        .map(Some)
}

fn discrete_domain(config: &CompleteScaleConfig) -> Result<Option<Vec<Value>>> {
    let Some(domain) = &config.domain else {
        return Ok(None);
    };
    let mut values = domain
        .iter()
        .map(|entry| match entry {
            DomainValue::Value(value) => Ok(value.clone()),
            DomainValue::DateTime(spec) => spec.resolve(false).map(Value::DateTime),
        })
        .collect::<Result<Vec<_>>>()?;
    if config.reverse == Some(true) {
        values.reverse();
    }
    Ok(Some(values))
}

/// Explicit range, or the named sequential scheme when only `scheme` is set
fn scheme_range(config: &CompleteScaleConfig, ctx: &ScaleContext) -> Option<Vec<Value>> {
    if let Some(range) = &config.range {
        return Some(range.clone());
    }
    let scheme = config.scheme.as_deref()?;
    match ctx.schemes.sequential(scheme) {
        Some(colors) => Some(colors.iter().map(|c| Value::String(c.clone())).collect()),
        None => {
            tracing::warn!("Unknown sequential scheme '{}', ignoring", scheme);
            None
        }
    }
}

/// Range of a scale whose domain is a sorted sample or a list of boundaries;
/// `reverse` flips the range so the domain stays sorted
fn discrete_range(config: &CompleteScaleConfig, ctx: &ScaleContext) -> Vec<Value> {
    let mut range = scheme_range(config, ctx).unwrap_or_default();
    if config.reverse == Some(true) {
        range.reverse();
    }
    range
}

/// Quantize and threshold scales default to the unit range
fn discretizing_range(config: &CompleteScaleConfig, ctx: &ScaleContext) -> Vec<Value> {
    let mut range = scheme_range(config, ctx)
        .unwrap_or_else(|| vec![Value::Number(0.0), Value::Number(1.0)]);
    if config.reverse == Some(true) {
        range.reverse();
    }
    range
}

fn color_space(config: &CompleteScaleConfig) -> Result<Option<ColorSpace>> {
    match &config.interpolate {
        None => Ok(None),
        Some(Interpolate::Name(name)) => Err(EncodableError::Unimplemented(format!(
            "scale.interpolate '{}'",
            name
        ))),
        Some(Interpolate::Params { method, gamma }) => {
            ColorSpace::from_method(method, *gamma).map(Some)
        }
    }
}

// =============================================================================
// Families
// =============================================================================

fn continuous_scale(config: &CompleteScaleConfig, ctx: &ScaleContext) -> Result<ContinuousScale> {
    let transform = match config.scale_type {
        ScaleType::Log => Transform::Log {
            base: config.base.unwrap_or(10.0),
        },
        ScaleType::Pow => Transform::Pow {
            exponent: config.exponent.unwrap_or(1.0),
        },
        ScaleType::Sqrt => Transform::Pow { exponent: 0.5 },
        _ => Transform::Identity,
    };
    let mut scale = ContinuousScale::new(config.scale_type, transform);

    let domain = numeric_domain(config, config.scale_type.is_time())?;
    let has_domain = domain.is_some();
    if let Some(mut domain) = domain {
        if config.reverse == Some(true) {
            domain.reverse();
        }
        scale.set_domain(domain);
    }

    if let Some(range) = scheme_range(config, ctx) {
        scale.set_range(OutputRange::from_values(&range, ColorSpace::default())?);
    }
    if config.reverse == Some(true) && !has_domain {
        scale.reverse_range();
    }

    check_bins(config)?;

    if let Some(clamp) = config.clamp {
        scale.set_clamp(clamp);
    }

    if let Some(space) = color_space(config)? {
        scale.set_interpolate(space);
    }

    if let Some(count) = nice_count(config)? {
        scale.nice(count);
    }

    if let Some(round) = config.round {
        scale.set_round(round);
    }

    if config.zero == Some(true) && !config.scale_type.is_time() {
        scale.include_zero();
    }

    Ok(scale)
}

fn band_scale(config: &CompleteScaleConfig) -> Result<BandScale> {
    let mut scale = if config.scale_type == ScaleType::Point {
        BandScale::point()
    } else {
        BandScale::band()
    };

    let domain = discrete_domain(config)?;
    let has_domain = domain.is_some();
    if let Some(domain) = domain {
        scale.set_domain(domain);
    }

    if let Some(range) = &config.range {
        let numbers = range
            .iter()
            .map(|v| v.as_f64())
            .collect::<Option<Vec<_>>>()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                EncodableError::InvalidConfig(format!(
                    "{} scale range must be numeric, got {:?}",
                    config.scale_type, range
                ))
            })?;
        let (start, stop) = (numbers[0], numbers[numbers.len() - 1]);
        scale.set_range(start, stop);
    }
    if config.reverse == Some(true) && !has_domain {
        scale.reverse_range();
    }

    if let Some(align) = config.align {
        scale.set_align(align);
    }

    if let Some(padding) = config.padding {
        scale.set_padding(padding);
    }
    if let Some(padding) = config.padding_inner {
        scale.set_padding_inner(padding);
    }
    if let Some(padding) = config.padding_outer {
        scale.set_padding_outer(padding);
    }

    if let Some(round) = config.round {
        scale.set_round(round);
    }

    Ok(scale)
}

fn quantize_scale(config: &CompleteScaleConfig, ctx: &ScaleContext) -> Result<QuantizeScale> {
    let extent = match numeric_domain(config, false)? {
        Some(domain) if !domain.is_empty() => (domain[0], domain[domain.len() - 1]),
        _ => (0.0, 1.0),
    };
    let mut scale = QuantizeScale::new(extent, discretizing_range(config, ctx));

    check_bins(config)?;

    if let Some(count) = nice_count(config)? {
        scale.nice(count);
    }

    if config.zero == Some(true) {
        scale.include_zero();
    }

    Ok(scale)
}
