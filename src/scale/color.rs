//! Color scheme registry and the shared categorical color table
//!
//! Categorical color scales are shared per `(scheme, namespace)`: two charts that
//! color the same value under the same namespace get the same color, whichever
//! chart asked first.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use super::palettes::{CATEGORICAL_SCHEMES, DEFAULT_CATEGORICAL_SCHEME, SEQUENTIAL_SCHEMES};
use crate::Value;

pub const DEFAULT_NAMESPACE: &str = "GLOBAL";

// =============================================================================
// Scheme registry
// =============================================================================

/// Named color schemes, keyed case-insensitively
#[derive(Debug, Clone)]
pub struct ColorSchemeRegistry {
    categorical: HashMap<String, Vec<String>>,
    sequential: HashMap<String, Vec<String>>,
    default_categorical: String,
}

impl ColorSchemeRegistry {
    /// A registry preloaded with the built-in palettes
    pub fn builtin() -> Self {
        Self {
            categorical: load(CATEGORICAL_SCHEMES),
            sequential: load(SEQUENTIAL_SCHEMES),
            default_categorical: DEFAULT_CATEGORICAL_SCHEME.to_string(),
        }
    }

    pub fn register_categorical(&mut self, name: &str, colors: Vec<String>) {
        self.categorical.insert(name.to_lowercase(), colors);
    }

    pub fn register_sequential(&mut self, name: &str, colors: Vec<String>) {
        self.sequential.insert(name.to_lowercase(), colors);
    }

    pub fn default_categorical_name(&self) -> &str {
        &self.default_categorical
    }

    /// Look up a categorical scheme; `None` asks for the default scheme
    pub fn categorical(&self, name: Option<&str>) -> Option<&[String]> {
        let name = name.unwrap_or(&self.default_categorical).to_lowercase();
        self.categorical.get(&name).map(Vec::as_slice)
    }

    pub fn sequential(&self, name: &str) -> Option<&[String]> {
        self.sequential.get(&name.to_lowercase()).map(Vec::as_slice)
    }
}

fn load(schemes: &[(&str, &[&str])]) -> HashMap<String, Vec<String>> {
    schemes
        .iter()
        .map(|(name, colors)| {
            (
                name.to_string(),
                colors.iter().map(|c| c.to_string()).collect(),
            )
        })
        .collect()
}

impl Default for ColorSchemeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

// =============================================================================
// Categorical color scale
// =============================================================================

/// Value-to-color assignments for one `(scheme, namespace)` pair
///
/// Unseen values take the next palette color in first-seen order, cycling when
/// the palette runs out.
pub struct CategoricalColorScale {
    colors: Vec<String>,
    assignments: RwLock<HashMap<String, String>>,
}

impl CategoricalColorScale {
    pub fn new(colors: Vec<String>) -> Self {
        Self {
            colors,
            assignments: RwLock::new(HashMap::new()),
        }
    }

    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    /// The color for `value`, assigning one if this is the first lookup
    pub fn color_for(&self, value: &Value) -> String {
        let key = value.to_key_string();
        {
            let assignments = self.assignments.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(color) = assignments.get(&key) {
                return color.clone();
            }
        }

        let mut assignments = self.assignments.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(color) = assignments.get(&key) {
            return color.clone();
        }
        if self.colors.is_empty() {
            return String::new();
        }
        let color = self.colors[assignments.len() % self.colors.len()].clone();
        tracing::debug!("Assigned color {} to '{}'", color, key);
        assignments.insert(key, color.clone());
        color
    }

    /// Pin `value` to `color`; the last writer wins
    pub fn set_color(&self, value: &Value, color: impl Into<String>) {
        let mut assignments = self.assignments.write().unwrap_or_else(PoisonError::into_inner);
        assignments.insert(value.to_key_string(), color.into());
    }

    /// Number of values with an assigned color
    pub fn assigned_count(&self) -> usize {
        self.assignments.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl fmt::Debug for CategoricalColorScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CategoricalColorScale")
            .field("colors", &self.colors)
            .field("assigned", &self.assigned_count())
            .finish()
    }
}

// =============================================================================
// Namespace
// =============================================================================

/// Process-wide table of categorical color scales
#[derive(Debug)]
pub struct CategoricalColorNamespace {
    schemes: Arc<ColorSchemeRegistry>,
    scales: RwLock<HashMap<(String, String), Arc<CategoricalColorScale>>>,
}

impl CategoricalColorNamespace {
    pub fn new(schemes: Arc<ColorSchemeRegistry>) -> Self {
        Self {
            schemes,
            scales: RwLock::new(HashMap::new()),
        }
    }

    /// The shared scale for `(scheme, namespace)`, created on first use.
    /// Unknown schemes fall back to the default categorical scheme.
    pub fn get_scale(
        &self,
        scheme: Option<&str>,
        namespace: Option<&str>,
    ) -> Arc<CategoricalColorScale> {
        let scheme_name = match scheme {
            Some(name) if self.schemes.categorical(Some(name)).is_some() => name.to_lowercase(),
            Some(name) => {
                tracing::warn!(
                    "Unknown categorical scheme '{}', using '{}'",
                    name,
                    self.schemes.default_categorical_name()
                );
                self.schemes.default_categorical_name().to_string()
            }
            None => self.schemes.default_categorical_name().to_string(),
        };
        let key = (
            scheme_name,
            namespace.unwrap_or(DEFAULT_NAMESPACE).to_string(),
        );

        {
            let scales = self.scales.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(scale) = scales.get(&key) {
                return Arc::clone(scale);
            }
        }

        let mut scales = self.scales.write().unwrap_or_else(PoisonError::into_inner);
        let colors = self
            .schemes
            .categorical(Some(&key.0))
            .map(<[String]>::to_vec)
            .unwrap_or_default();
        Arc::clone(
            scales
                .entry(key)
                .or_insert_with(|| Arc::new(CategoricalColorScale::new(colors))),
        )
    }

    /// Drop every scale and assignment
    pub fn reset(&self) {
        self.scales.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl Default for CategoricalColorNamespace {
    fn default() -> Self {
        Self::new(Arc::new(ColorSchemeRegistry::builtin()))
    }
}

// =============================================================================
// Context
// =============================================================================

/// Shared services handed to the scale factory
#[derive(Debug, Clone)]
pub struct ScaleContext {
    pub namespace: Arc<CategoricalColorNamespace>,
    pub schemes: Arc<ColorSchemeRegistry>,
}

impl ScaleContext {
    pub fn new(schemes: ColorSchemeRegistry) -> Self {
        let schemes = Arc::new(schemes);
        Self {
            namespace: Arc::new(CategoricalColorNamespace::new(Arc::clone(&schemes))),
            schemes,
        }
    }
}

impl Default for ScaleContext {
    fn default() -> Self {
        Self::new(ColorSchemeRegistry::builtin())
    }
}
