use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const BUILTIN_STYLES: &[(&str, &str)] = &[
    ("classic", include_str!("../styles/classic.toml")),
    ("compact", include_str!("../styles/compact.toml")),
];

const BACKGROUND: &str = "#fdfdf8";

const STATION_RADIUS: f64 = 16.0;
const STATION_SCALE: f64 = 50.0;
const STATION_OFFSET_X: f64 = 250.0;
const STATION_OFFSET_Y: f64 = 30.0;
const STATION_FILL: &str = "#ffffff";
const STATION_STROKE: &str = "#222222";
const STATION_STROKE_WIDTH: f64 = 4.0;

const CARS_VERTICAL_PADDING: f64 = 4.0;
const CARS_HORIZONTAL_PADDING: f64 = 7.0;
const CAR_GAP: f64 = 7.0;
const CAR_WIDTH: f64 = 27.0;
const CAR_HEIGHT: f64 = 27.0;
const CAR_WINDOW_FILL: &str = "#ffffff";

const LABEL_RADIUS: f64 = 20.0;
const LABEL_GRID_OFFSET_X: f64 = -2.0;
const LABEL_TEXT: &str = "#ffffff";
const LABEL_FONT_FAMILY: &str = "sans-serif";
const LABEL_FONT_SIZE: f64 = 18.0;

const TRACK_STROKE_WIDTH: f64 = 9.0;

/// Display constants for a rendered map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapStyle {
    #[serde(default = "default_background")]
    pub background: String,
    #[serde(default)]
    pub station: StationStyle,
    #[serde(default)]
    pub cars: CarsStyle,
    #[serde(default)]
    pub label: LabelStyle,
    #[serde(default)]
    pub track: TrackStyle,
}

/// Station discs, and the grid-to-display projection they sit on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationStyle {
    pub radius: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarsStyle {
    pub vertical_padding: f64,
    pub horizontal_padding: f64,
    pub car_gap: f64,
    pub car_width: f64,
    pub car_height: f64,
    /// Center the first car on the group's grid position instead of starting
    /// the group there.
    pub center_first_car: bool,
    pub window_fill: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelStyle {
    pub radius: f64,
    /// Horizontal distance, in grid units, from the car group to the label.
    pub grid_offset_x: f64,
    pub text_color: String,
    pub font_family: String,
    pub font_size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackStyle {
    pub stroke_width: f64,
}

fn default_background() -> String {
    BACKGROUND.to_string()
}

impl Default for StationStyle {
    fn default() -> Self {
        Self {
            radius: STATION_RADIUS,
            scale_x: STATION_SCALE,
            scale_y: STATION_SCALE,
            offset_x: STATION_OFFSET_X,
            offset_y: STATION_OFFSET_Y,
            fill: STATION_FILL.to_string(),
            stroke: STATION_STROKE.to_string(),
            stroke_width: STATION_STROKE_WIDTH,
        }
    }
}

impl Default for CarsStyle {
    fn default() -> Self {
        Self {
            vertical_padding: CARS_VERTICAL_PADDING,
            horizontal_padding: CARS_HORIZONTAL_PADDING,
            car_gap: CAR_GAP,
            car_width: CAR_WIDTH,
            car_height: CAR_HEIGHT,
            center_first_car: true,
            window_fill: CAR_WINDOW_FILL.to_string(),
        }
    }
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            radius: LABEL_RADIUS,
            grid_offset_x: LABEL_GRID_OFFSET_X,
            text_color: LABEL_TEXT.to_string(),
            font_family: LABEL_FONT_FAMILY.to_string(),
            font_size: LABEL_FONT_SIZE,
        }
    }
}

impl Default for TrackStyle {
    fn default() -> Self {
        Self {
            stroke_width: TRACK_STROKE_WIDTH,
        }
    }
}

impl Default for MapStyle {
    fn default() -> Self {
        Self {
            background: default_background(),
            station: StationStyle::default(),
            cars: CarsStyle::default(),
            label: LabelStyle::default(),
            track: TrackStyle::default(),
        }
    }
}

impl MapStyle {
    pub fn from_builtin(name: &str) -> Result<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace('-', "_");
        let content = BUILTIN_STYLES
            .iter()
            .find(|(n, _)| *n == normalized)
            .map(|(_, c)| *c)
            .ok_or_else(|| Error::Style {
                message: format!(
                    "unknown built-in style '{}'. Available: {}",
                    name,
                    Self::list_builtins().join(", ")
                ),
            })?;
        Self::from_toml(content)
    }

    pub fn list_builtins() -> Vec<&'static str> {
        BUILTIN_STYLES.iter().map(|(n, _)| *n).collect()
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let style: MapStyle = toml::from_str(content).map_err(|e| Error::Style {
            message: format!("failed to parse TOML: {}", e),
        })?;
        style.validated()
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let style: MapStyle = serde_yaml::from_str(content).map_err(|e| Error::Style {
            message: format!("failed to parse YAML: {}", e),
        })?;
        style.validated()
    }

    /// Load a style file by extension; without a known extension, try TOML
    /// first and then YAML.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::Style {
                message: format!("style file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => return Self::from_yaml(&content),
            Some("toml") => return Self::from_toml(&content),
            _ => {}
        }

        Self::from_toml(&content).or_else(|toml_err| {
            tracing::debug!(error = %toml_err, "style is not TOML, trying YAML");
            Self::from_yaml(&content)
        })
    }

    /// Style for a command line: a style file wins, then a built-in preset,
    /// then the defaults.
    pub fn resolve(path: Option<&Path>, preset: Option<&str>) -> Result<Self> {
        match (path, preset) {
            (Some(path), _) => Self::load(path),
            (None, Some(name)) => Self::from_builtin(name),
            (None, None) => Ok(Self::default()),
        }
    }

    fn validated(self) -> Result<Self> {
        let positive = [
            ("station.radius", self.station.radius),
            ("track.stroke_width", self.track.stroke_width),
            ("label.radius", self.label.radius),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::Style {
                    message: format!("{} must be a positive number, got {}", name, value),
                });
            }
        }

        let finite = [
            ("station.scale_x", self.station.scale_x),
            ("station.scale_y", self.station.scale_y),
            ("station.offset_x", self.station.offset_x),
            ("station.offset_y", self.station.offset_y),
            ("cars.vertical_padding", self.cars.vertical_padding),
            ("cars.horizontal_padding", self.cars.horizontal_padding),
            ("cars.car_gap", self.cars.car_gap),
            ("cars.car_width", self.cars.car_width),
            ("cars.car_height", self.cars.car_height),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(Error::Style {
                    message: format!("{} must be finite, got {}", name, value),
                });
            }
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_builtin_accepts_hyphenated_and_case_insensitive_names() {
        let lower = MapStyle::from_builtin("compact").expect("lowercase variant");
        let upper = MapStyle::from_builtin(" Compact ").expect("mixed case variant");
        assert_eq!(lower, upper);
    }

    #[test]
    fn classic_builtin_matches_defaults() {
        let classic = MapStyle::from_builtin("classic").unwrap();
        assert_eq!(classic, MapStyle::default());
    }

    #[test]
    fn compact_builtin_starts_cars_at_origin() {
        let compact = MapStyle::from_builtin("compact").unwrap();
        assert!(!compact.cars.center_first_car);
        assert_eq!(compact.station.offset_x, 50.0);
        assert_eq!(compact.cars.car_width, 30.0);
    }

    #[test]
    fn unknown_builtin_lists_available_styles() {
        let err = MapStyle::from_builtin("neon").unwrap_err().to_string();
        assert!(err.contains("classic"));
        assert!(err.contains("compact"));
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let style = MapStyle::from_toml("[station]\nradius = 10.0\n").unwrap();
        assert_eq!(style.station.radius, 10.0);
        assert_eq!(style.station.scale_x, STATION_SCALE);
        assert_eq!(style.cars, CarsStyle::default());
    }

    #[test]
    fn yaml_styles_are_accepted() {
        let style = MapStyle::from_yaml("background: \"#000000\"\ntrack:\n  stroke_width: 5\n")
            .unwrap();
        assert_eq!(style.background, "#000000");
        assert_eq!(style.track.stroke_width, 5.0);
    }

    #[test]
    fn resolve_prefers_file_over_preset() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        std::io::Write::write_all(&mut file, b"[track]\nstroke_width = 3.0\n").unwrap();

        let style = MapStyle::resolve(Some(file.path()), Some("compact")).unwrap();
        assert_eq!(style.track.stroke_width, 3.0);
        assert_eq!(style.station.offset_x, STATION_OFFSET_X);

        let preset = MapStyle::resolve(None, Some("compact")).unwrap();
        assert!(!preset.cars.center_first_car);
        assert_eq!(MapStyle::resolve(None, None).unwrap(), MapStyle::default());
    }

    #[test]
    fn missing_style_file_is_reported() {
        let err = MapStyle::load(Path::new("/no/such/style.toml")).unwrap_err();
        assert!(err.to_string().contains("style file not found"));
    }

    #[test]
    fn non_positive_radius_is_rejected() {
        let err = MapStyle::from_toml("[station]\nradius = 0.0\n").unwrap_err();
        assert!(matches!(err, Error::Style { .. }));
    }
}
