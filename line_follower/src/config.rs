//! Process-wide configuration. Values are validated once at construction and
//! never change while the loop runs.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CENTER_MIN: u32 = 210;
pub const DEFAULT_CENTER_MAX: u32 = 430;
pub const DEFAULT_INTERSECTION_THRESHOLD: f64 = 0.80;
pub const DEFAULT_TICK_PAUSE: Duration = Duration::from_millis(1);

/// Lateral steering bounds and the intersection density threshold.
///
/// Fields are private so an inverted band cannot be built; use
/// [`Calibration::new`] or deserialize through [`RobotConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCalibration", into = "RawCalibration")]
pub struct Calibration {
    center_min: u32,
    center_max: u32,
    intersection_threshold: f64,
}

impl Calibration {
    pub fn new(center_min: u32, center_max: u32, intersection_threshold: f64) -> Result<Self, ConfigError> {
        if center_min >= center_max {
            return Err(ConfigError::InvertedCenterBand { center_min, center_max });
        }
        if !intersection_threshold.is_finite() || !(0.0..=1.0).contains(&intersection_threshold) {
            return Err(ConfigError::ThresholdOutOfRange(intersection_threshold));
        }
        Ok(Self { center_min, center_max, intersection_threshold })
    }

    pub fn center_min(&self) -> u32 {
        self.center_min
    }

    pub fn center_max(&self) -> u32 {
        self.center_max
    }

    pub fn intersection_threshold(&self) -> f64 {
        self.intersection_threshold
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            center_min: DEFAULT_CENTER_MIN,
            center_max: DEFAULT_CENTER_MAX,
            intersection_threshold: DEFAULT_INTERSECTION_THRESHOLD,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct RawCalibration {
    center_min: u32,
    center_max: u32,
    intersection_threshold: f64,
}

impl TryFrom<RawCalibration> for Calibration {
    type Error = ConfigError;

    fn try_from(raw: RawCalibration) -> Result<Self, Self::Error> {
        Calibration::new(raw.center_min, raw.center_max, raw.intersection_threshold)
    }
}

impl From<Calibration> for RawCalibration {
    fn from(calibration: Calibration) -> Self {
        Self {
            center_min: calibration.center_min,
            center_max: calibration.center_max,
            intersection_threshold: calibration.intersection_threshold,
        }
    }
}

/// BCM pin numbers of the two H-bridge inputs per motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "[u8; 4]", into = "[u8; 4]")]
pub struct MotorPins {
    pub motor_a_in1: u8,
    pub motor_a_in2: u8,
    pub motor_b_in1: u8,
    pub motor_b_in2: u8,
}

impl MotorPins {
    pub fn new(pins: [u8; 4]) -> Result<Self, ConfigError> {
        for (i, pin) in pins.iter().enumerate() {
            if pins[i + 1..].contains(pin) {
                return Err(ConfigError::DuplicatePins(pins));
            }
        }
        let [motor_a_in1, motor_a_in2, motor_b_in1, motor_b_in2] = pins;
        Ok(Self { motor_a_in1, motor_a_in2, motor_b_in1, motor_b_in2 })
    }

    /// Pins in drive-pattern order: A.in1, A.in2, B.in1, B.in2.
    pub fn as_array(&self) -> [u8; 4] {
        [self.motor_a_in1, self.motor_a_in2, self.motor_b_in1, self.motor_b_in2]
    }
}

impl Default for MotorPins {
    fn default() -> Self {
        Self { motor_a_in1: 14, motor_a_in2: 15, motor_b_in1: 18, motor_b_in2: 23 }
    }
}

impl TryFrom<[u8; 4]> for MotorPins {
    type Error = ConfigError;

    fn try_from(pins: [u8; 4]) -> Result<Self, Self::Error> {
        MotorPins::new(pins)
    }
}

impl From<MotorPins> for [u8; 4] {
    fn from(pins: MotorPins) -> Self {
        pins.as_array()
    }
}

/// Everything the robot binary needs to bring the loop up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    pub camera_index: i32,
    pub calibration: Calibration,
    pub pins: MotorPins,
    #[serde(with = "millis")]
    pub tick_pause: Duration,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            camera_index: 0,
            calibration: Calibration::default(),
            pins: MotorPins::default(),
            tick_pause: DEFAULT_TICK_PAUSE,
        }
    }
}

impl RobotConfig {
    /// Defaults overlaid with any `LF_*` variables present in the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    /// Loads a complete configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file_error = |reason: String| ConfigError::File { path: path.display().to_string(), reason };
        let contents = std::fs::read_to_string(path).map_err(|e| file_error(e.to_string()))?;
        serde_json::from_str(&contents).map_err(|e| file_error(e.to_string()))
    }

    /// Applies overrides from `lookup`, then re-validates the combined values.
    pub fn overlay<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(index) = parse_var(&lookup, "LF_CAMERA_INDEX")? {
            self.camera_index = index;
        }

        let center_min = parse_var(&lookup, "LF_CENTER_MIN")?.unwrap_or(self.calibration.center_min);
        let center_max = parse_var(&lookup, "LF_CENTER_MAX")?.unwrap_or(self.calibration.center_max);
        let threshold = parse_var(&lookup, "LF_INTERSECTION_THRESHOLD")?
            .unwrap_or(self.calibration.intersection_threshold);
        self.calibration = Calibration::new(center_min, center_max, threshold)?;

        if let Some(raw) = lookup("LF_MOTOR_PINS") {
            self.pins = MotorPins::new(parse_pins(&raw)?)?;
        }

        if let Some(millis) = parse_var::<u64, _>(&lookup, "LF_TICK_PAUSE_MS")? {
            self.tick_pause = Duration::from_millis(millis);
        }

        Ok(self)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key: key.to_string(), value }),
    }
}

fn parse_pins(raw: &str) -> Result<[u8; 4], ConfigError> {
    let invalid = || ConfigError::InvalidValue { key: "LF_MOTOR_PINS".to_string(), value: raw.to_string() };
    let pins = raw
        .split(',')
        .map(|part| part.trim().parse::<u8>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| invalid())?;
    pins.try_into().map_err(|_| invalid())
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
