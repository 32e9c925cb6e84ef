use crate::animation::PlaybackSettings;
use crate::color::{parse_color, Palette, Rgb};
use crate::data::{DEFAULT_MAX_VALUE, DEFAULT_MIN_VALUE};
use crate::error::ConfigError;
use crate::recording::RecordingConfig;
use crate::render::RenderConfig;
use crate::Algorithm;

/// Visualizer settings, typically read from a `sortviz.toml` file.
///
/// Every field has a default so partial files are accepted. Speed and
/// array size are clamped when converted to [`PlaybackSettings`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VisualizerConfig {
    pub algorithm: Algorithm,
    pub speed_ms: u32,
    pub array_size: usize,
    pub min_value: u32,
    pub max_value: u32,
    pub recording: RecordingConfig,
    pub colors: ColorConfig,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        let playback = PlaybackSettings::default();
        Self {
            algorithm: Algorithm::default(),
            speed_ms: playback.speed_ms,
            array_size: playback.array_size,
            min_value: DEFAULT_MIN_VALUE,
            max_value: DEFAULT_MAX_VALUE,
            recording: RecordingConfig::default(),
            colors: ColorConfig::default(),
        }
    }
}

impl VisualizerConfig {
    /// Parse a TOML string into a `VisualizerConfig`.
    ///
    /// ```rust
    /// use sortviz_core::{Algorithm, VisualizerConfig};
    ///
    /// let config = VisualizerConfig::from_toml_str(r#"
    ///     algorithm = "bubble"
    ///     speed_ms = 500
    ///
    ///     [colors]
    ///     sorted = "teal"
    /// "#).unwrap();
    ///
    /// assert_eq!(config.algorithm, Algorithm::Bubble);
    /// assert_eq!(config.playback_settings().speed_ms, 150);
    /// assert_eq!(config.palette().unwrap().sorted, (45, 212, 191));
    /// ```
    #[cfg(feature = "toml")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Controller settings with speed and size clamped to their ranges.
    pub fn playback_settings(&self) -> PlaybackSettings {
        PlaybackSettings {
            speed_ms: self.speed_ms,
            array_size: self.array_size,
            min_value: self.min_value,
            max_value: self.max_value,
        }
        .clamped()
    }

    /// Palette with configured colors applied over the neon theme.
    pub fn palette(&self) -> Result<Palette, ConfigError> {
        self.colors.palette()
    }

    /// Render config of the given size using the configured palette.
    pub fn render_config(&self, width: u32, height: u32) -> Result<RenderConfig, ConfigError> {
        Ok(RenderConfig {
            palette: self.palette()?,
            ..RenderConfig::new(width, height)
        })
    }
}

/// Optional color overrides, one per bar state plus the background.
///
/// Values accept anything [`parse_color`] does.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ColorConfig {
    pub idle: Option<String>,
    pub active: Option<String>,
    pub compare: Option<String>,
    pub overwrite: Option<String>,
    pub sorted: Option<String>,
    pub background: Option<String>,
}

impl ColorConfig {
    /// Resolve overrides into a [`Palette`].
    ///
    /// Unlike the lenient fallback for missing fields, a present but
    /// unparsable color is an error.
    pub fn palette(&self) -> Result<Palette, ConfigError> {
        let base = Palette::neon();
        Ok(Palette {
            idle: resolve("idle", self.idle.as_deref(), base.idle)?,
            active: resolve("active", self.active.as_deref(), base.active)?,
            compare: resolve("compare", self.compare.as_deref(), base.compare)?,
            overwrite: resolve("overwrite", self.overwrite.as_deref(), base.overwrite)?,
            sorted: resolve("sorted", self.sorted.as_deref(), base.sorted)?,
            background: resolve("background", self.background.as_deref(), base.background)?,
        })
    }
}

fn resolve(field: &'static str, value: Option<&str>, fallback: Rgb) -> Result<Rgb, ConfigError> {
    match value {
        None => Ok(fallback),
        Some(s) => parse_color(s).ok_or_else(|| ConfigError::InvalidColor {
            field,
            value: s.to_string(),
        }),
    }
}
