//! Built-in color schemes and color interpolation
//!
//! Categorical schemes back ordinal color scales; sequential and diverging
//! schemes become the range of continuous color scales when `scheme` is set
//! and `range` is not.

use palette::{FromColor, Hsl, IntoColor, Lab, Lch, LinSrgb, Mix, Oklab, Srgb};

use crate::{EncodableError, Result};

// =============================================================================
// Categorical Schemes
// =============================================================================

/// Tableau 10, the default categorical scheme
pub const TABLEAU10: &[&str] = &[
    "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f",
    "#edc948", "#b07aa1", "#ff9da7", "#9c755f", "#bab0ac",
];

/// D3 Category 10
pub const CATEGORY10: &[&str] = &[
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd",
    "#8c564b", "#e377c2", "#7f7f7f", "#bcbd22", "#17becf",
];

pub const SET1: &[&str] = &[
    "#e41a1c", "#377eb8", "#4daf4a", "#984ea3", "#ff7f00",
    "#ffff33", "#a65628", "#f781bf", "#999999",
];

pub const SET2: &[&str] = &[
    "#66c2a5", "#fc8d62", "#8da0cb", "#e78ac3", "#a6d854",
    "#ffd92f", "#e5c494", "#b3b3b3",
];

pub const SET3: &[&str] = &[
    "#8dd3c7", "#ffffb3", "#bebada", "#fb8072", "#80b1d3",
    "#fdb462", "#b3de69", "#fccde5", "#d9d9d9", "#bc80bd",
    "#ccebc5", "#ffed6f",
];

pub const PASTEL1: &[&str] = &[
    "#fbb4ae", "#b3cde3", "#ccebc5", "#decbe4", "#fed9a6",
    "#ffffcc", "#e5d8bd", "#fddaec", "#f2f2f2",
];

pub const DARK2: &[&str] = &[
    "#1b9e77", "#d95f02", "#7570b3", "#e7298a", "#66a61e",
    "#e6ab02", "#a6761d", "#666666",
];

pub const PAIRED: &[&str] = &[
    "#a6cee3", "#1f78b4", "#b2df8a", "#33a02c", "#fb9a99",
    "#e31a1c", "#fdbf6f", "#ff7f00", "#cab2d6", "#6a3d9a",
    "#ffff99", "#b15928",
];

pub const ACCENT: &[&str] = &[
    "#7fc97f", "#beaed4", "#fdc086", "#ffff99", "#386cb0",
    "#f0027f", "#bf5b17", "#666666",
];

// =============================================================================
// Sequential Schemes
// =============================================================================

pub const VIRIDIS: &[&str] = &[
    "#440154", "#482878", "#3e4a89", "#31688e", "#26828e",
    "#1f9e89", "#35b779", "#6ece58", "#b5de2b", "#fde725",
];

pub const PLASMA: &[&str] = &[
    "#0d0887", "#46039f", "#7201a8", "#9c179e", "#bd3786",
    "#d8576b", "#ed7953", "#fb9f3a", "#fdca26", "#f0f921",
];

pub const MAGMA: &[&str] = &[
    "#000004", "#180f3d", "#440f76", "#721f81", "#9e2f7f",
    "#cd4071", "#f1605d", "#fd9668", "#feca8d", "#fcfdbf",
];

pub const INFERNO: &[&str] = &[
    "#000004", "#1b0c41", "#4a0c6b", "#781c6d", "#a52c60",
    "#cf4446", "#ed6925", "#fb9b06", "#f7d13d", "#fcffa4",
];

pub const BLUES: &[&str] = &[
    "#f7fbff", "#deebf7", "#c6dbef", "#9ecae1", "#6baed6",
    "#4292c6", "#2171b5", "#08519c", "#08306b",
];

pub const GREENS: &[&str] = &[
    "#f7fcf5", "#e5f5e0", "#c7e9c0", "#a1d99b", "#74c476",
    "#41ab5d", "#238b45", "#006d2c", "#00441b",
];

pub const ORANGES: &[&str] = &[
    "#fff5eb", "#fee6ce", "#fdd0a2", "#fdae6b", "#fd8d3c",
    "#f16913", "#d94801", "#a63603", "#7f2704",
];

pub const REDS: &[&str] = &[
    "#fff5f0", "#fee0d2", "#fcbba1", "#fc9272", "#fb6a4a",
    "#ef3b2c", "#cb181d", "#a50f15", "#67000d",
];

// =============================================================================
// Diverging Schemes
// =============================================================================

pub const RDBU: &[&str] = &[
    "#67001f", "#b2182b", "#d6604d", "#f4a582", "#fddbc7",
    "#f7f7f7", "#d1e5f0", "#92c5de", "#4393c3", "#2166ac", "#053061",
];

pub const RDYLGN: &[&str] = &[
    "#a50026", "#d73027", "#f46d43", "#fdae61", "#fee08b",
    "#ffffbf", "#d9ef8b", "#a6d96a", "#66bd63", "#1a9850", "#006837",
];

pub const SPECTRAL: &[&str] = &[
    "#9e0142", "#d53e4f", "#f46d43", "#fdae61", "#fee08b",
    "#ffffbf", "#e6f598", "#abdda4", "#66c2a5", "#3288bd", "#5e4fa2",
];

/// Name/colors pairs for every built-in categorical scheme
pub const CATEGORICAL_SCHEMES: &[(&str, &[&str])] = &[
    ("tableau10", TABLEAU10),
    ("category10", CATEGORY10),
    ("set1", SET1),
    ("set2", SET2),
    ("set3", SET3),
    ("pastel1", PASTEL1),
    ("dark2", DARK2),
    ("paired", PAIRED),
    ("accent", ACCENT),
];

/// Name/colors pairs for every built-in sequential or diverging scheme
pub const SEQUENTIAL_SCHEMES: &[(&str, &[&str])] = &[
    ("viridis", VIRIDIS),
    ("plasma", PLASMA),
    ("magma", MAGMA),
    ("inferno", INFERNO),
    ("blues", BLUES),
    ("greens", GREENS),
    ("oranges", ORANGES),
    ("reds", REDS),
    ("redblue", RDBU),
    ("redyellowgreen", RDYLGN),
    ("spectral", SPECTRAL),
];

pub const DEFAULT_CATEGORICAL_SCHEME: &str = "tableau10";

// =============================================================================
// Color Utilities
// =============================================================================

/// Normalize any CSS color to lowercase `#rrggbb`
pub fn color_to_hex(value: &str) -> Result<String> {
    parse_to_srgb(value).map(|c| srgb_to_hex(&c))
}

fn parse_to_srgb(color: &str) -> Result<Srgb<f32>> {
    let parsed = csscolorparser::parse(color)
        .map_err(|e| EncodableError::InvalidConfig(format!("Invalid color '{}': {}", color, e)))?;

    Ok(Srgb::new(parsed.r as f32, parsed.g as f32, parsed.b as f32))
}

fn srgb_to_hex(color: &Srgb<f32>) -> String {
    let r = (color.red.clamp(0.0, 1.0) * 255.0).round() as u8;
    let g = (color.green.clamp(0.0, 1.0) * 255.0).round() as u8;
    let b = (color.blue.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

// =============================================================================
// Color Interpolation
// =============================================================================

/// Space in which range colors are blended
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ColorSpace {
    #[default]
    Oklab,
    /// Per-channel sRGB blending with a gamma exponent (1.0 is plain sRGB)
    Rgb { gamma: f32 },
    /// CIE L*a*b*
    Lab,
    /// CIE LCh, hue along the shorter arc
    Hcl,
    /// HSL, hue along the shorter arc
    Hsl,
}

impl ColorSpace {
    /// Map an `interpolate.type` name to a color space
    pub fn from_method(method: &str, gamma: Option<f64>) -> Result<Self> {
        match method.to_lowercase().as_str() {
            "rgb" => Ok(ColorSpace::Rgb {
                gamma: gamma.unwrap_or(1.0) as f32,
            }),
            "oklab" => Ok(ColorSpace::Oklab),
            "lab" => Ok(ColorSpace::Lab),
            "hcl" => Ok(ColorSpace::Hcl),
            "hsl" => Ok(ColorSpace::Hsl),
            "hcl-long" | "hsl-long" | "cubehelix" | "cubehelix-long" => Err(
                EncodableError::Unimplemented(format!("'{}' color interpolation", method)),
            ),
            other => Err(EncodableError::InvalidConfig(format!(
                "Unknown interpolation type '{}'",
                other
            ))),
        }
    }
}

/// An ordered list of color stops that can be blended pairwise
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRamp {
    stops: Vec<Srgb<f32>>,
    space: ColorSpace,
}

impl ColorRamp {
    pub fn new<S: AsRef<str>>(colors: &[S], space: ColorSpace) -> Result<Self> {
        if colors.is_empty() {
            return Err(EncodableError::InvalidConfig(
                "At least one color is required".to_string(),
            ));
        }
        let stops = colors
            .iter()
            .map(|c| parse_to_srgb(c.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { stops, space })
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn with_space(mut self, space: ColorSpace) -> Self {
        self.space = space;
        self
    }

    pub fn reversed(mut self) -> Self {
        self.stops.reverse();
        self
    }

    /// The stops as `#rrggbb` strings
    pub fn colors(&self) -> Vec<String> {
        self.stops.iter().map(srgb_to_hex).collect()
    }

    /// Blend stop `from` into stop `to` at `t` in `[0, 1]`
    pub fn mix(&self, from: usize, to: usize, t: f64) -> String {
        let last = self.stops.len() - 1;
        let a = self.stops[from.min(last)];
        let b = self.stops[to.min(last)];
        let t = t as f32;
        match self.space {
            ColorSpace::Oklab => {
                let a = Oklab::from_color(LinSrgb::from(a));
                let b = Oklab::from_color(LinSrgb::from(b));
                let lin: LinSrgb<f32> = a.mix(b, t).into_color();
                srgb_to_hex(&Srgb::from(lin))
            }
            ColorSpace::Lab => {
                let (a, b): (Lab, Lab) = (a.into_color(), b.into_color());
                srgb_to_hex(&Srgb::from_color(a.mix(b, t)))
            }
            ColorSpace::Hcl => {
                let (a, b): (Lch, Lch) = (a.into_color(), b.into_color());
                srgb_to_hex(&Srgb::from_color(a.mix(b, t)))
            }
            ColorSpace::Hsl => {
                let (a, b): (Hsl, Hsl) = (a.into_color(), b.into_color());
                srgb_to_hex(&Srgb::from_color(a.mix(b, t)))
            }
            ColorSpace::Rgb { gamma } => {
                let channel = |x: f32, y: f32| {
                    if (gamma - 1.0).abs() < f32::EPSILON {
                        x + (y - x) * t
                    } else {
                        let (x, y) = (x.powf(gamma), y.powf(gamma));
                        (x + (y - x) * t).powf(1.0 / gamma)
                    }
                };
                srgb_to_hex(&Srgb::new(
                    channel(a.red, b.red),
                    channel(a.green, b.green),
                    channel(a.blue, b.blue),
                ))
            }
        }
    }

    /// Blend across all stops at `t` in `[0, 1]`
    pub fn at(&self, t: f64) -> String {
        if self.stops.len() == 1 {
            return srgb_to_hex(&self.stops[0]);
        }
        let segments = self.stops.len() - 1;
        let scaled = t.clamp(0.0, 1.0) * segments as f64;
        let segment = (scaled.floor() as usize).min(segments - 1);
        self.mix(segment, segment + 1, scaled - segment as f64)
    }

    /// `count` evenly spaced colors from the first stop to the last
    pub fn sample(&self, count: usize) -> Vec<String> {
        match count {
            0 => vec![],
            1 => vec![self.at(0.0)],
            _ => (0..count)
                .map(|i| self.at(i as f64 / (count - 1) as f64))
                .collect(),
        }
    }
}
