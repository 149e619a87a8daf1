use clap::{Parser, ValueEnum};
use glam::Vec2;
use thiserror::Error;

/// Total active chase time before the cat gets tired (ms).
pub const CHASE_BUDGET_MS: f64 = 8000.0;
/// How long a tired cat rests before it can chase again (ms).
pub const REST_DURATION_MS: f64 = 4000.0;
/// Wall-clock period of the fatigue accumulator (ms).
pub const FATIGUE_TICK_MS: f64 = 100.0;
/// Pointer displacement (px) that counts as "the laser moved".
pub const MOVEMENT_THRESHOLD: f32 = 5.0;
/// Standoff the trailing cat keeps behind the laser (px).
pub const TRAIL_DISTANCE: f32 = 80.0;
/// Per-frame easing toward the trail point.
pub const TRAILING_EASE: f32 = 0.12;
/// Per-frame easing when the easing cat is already close.
pub const CLOSE_EASE: f32 = 0.05;
/// Per-frame easing when the easing cat is far away.
pub const FAR_EASE: f32 = 0.08;
/// Below this distance (px) the easing cat counts as close.
pub const CLOSE_DISTANCE: f32 = 50.0;
/// One display refresh at 60 Hz (ms).
pub const FRAME_INTERVAL_MS: f64 = 1000.0 / 60.0;
/// Max wall-clock gap consumed per redraw (ms). Prevents catch-up storms.
pub const MAX_FRAME_GAP_MS: f64 = 250.0;
/// How often the fact panel changes (ms).
pub const FACT_INTERVAL_MS: f64 = 5000.0;
/// Where a freshly mounted cat appears.
pub const INITIAL_FOLLOWER: Vec2 = Vec2::new(100.0, 100.0);
/// Half width/height of the drawn cat (px).
pub const CAT_HALF_SIZE: f32 = 32.0;

/// Which pursuit rule drives the cat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PursuitVariant {
    /// Converge onto the laser, slower when close. No fatigue.
    Easing,
    /// Hang back `trail_distance` behind the laser. Gets tired.
    Trailing,
}

impl PursuitVariant {
    pub fn label(self) -> &'static str {
        match self {
            PursuitVariant::Easing => "Easing",
            PursuitVariant::Trailing => "Trailing",
        }
    }
}

/// How pointer displacement is compared against the movement threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MovementCheck {
    /// Either axis alone must exceed the threshold.
    PerAxis,
    /// Straight-line displacement must exceed the threshold.
    Euclidean,
}

impl MovementCheck {
    pub fn exceeds(self, delta: Vec2, threshold: f32) -> bool {
        match self {
            MovementCheck::PerAxis => delta.x.abs() > threshold || delta.y.abs() > threshold,
            MovementCheck::Euclidean => delta.length() > threshold,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a positive duration, got {value}")]
    NonPositiveDuration { name: &'static str, value: f64 },
    #[error("{name} must not be negative, got {value}")]
    NegativeDistance { name: &'static str, value: f32 },
    #[error("{name} must lie in (0, 1], got {value}")]
    EaseOutOfRange { name: &'static str, value: f32 },
    #[error("initial follower position must be finite, got {0:?}")]
    NonFiniteOrigin(Vec2),
}

/// Every tunable of the chase, with the classic values as defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ChaseConfig {
    pub variant: PursuitVariant,
    pub chase_budget_ms: f64,
    pub rest_duration_ms: f64,
    pub fatigue_tick_ms: f64,
    pub movement_threshold: f32,
    pub movement_check: MovementCheck,
    pub trail_distance: f32,
    pub trailing_ease: f32,
    pub close_ease: f32,
    pub far_ease: f32,
    pub close_distance: f32,
    pub frame_interval_ms: f64,
    pub max_frame_gap_ms: f64,
    pub fact_interval_ms: f64,
    pub initial_follower: Vec2,
    pub cat_half_size: f32,
}

impl Default for ChaseConfig {
    fn default() -> Self {
        Self {
            variant: PursuitVariant::Trailing,
            chase_budget_ms: CHASE_BUDGET_MS,
            rest_duration_ms: REST_DURATION_MS,
            fatigue_tick_ms: FATIGUE_TICK_MS,
            movement_threshold: MOVEMENT_THRESHOLD,
            movement_check: MovementCheck::PerAxis,
            trail_distance: TRAIL_DISTANCE,
            trailing_ease: TRAILING_EASE,
            close_ease: CLOSE_EASE,
            far_ease: FAR_EASE,
            close_distance: CLOSE_DISTANCE,
            frame_interval_ms: FRAME_INTERVAL_MS,
            max_frame_gap_ms: MAX_FRAME_GAP_MS,
            fact_interval_ms: FACT_INTERVAL_MS,
            initial_follower: INITIAL_FOLLOWER,
            cat_half_size: CAT_HALF_SIZE,
        }
    }
}

impl ChaseConfig {
    /// Reject values that would stall the scheduler or make the cat diverge.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let durations = [
            ("chase_budget_ms", self.chase_budget_ms),
            ("rest_duration_ms", self.rest_duration_ms),
            ("fatigue_tick_ms", self.fatigue_tick_ms),
            ("frame_interval_ms", self.frame_interval_ms),
            ("max_frame_gap_ms", self.max_frame_gap_ms),
            ("fact_interval_ms", self.fact_interval_ms),
        ];
        for (name, value) in durations {
            if !(value > 0.0) || !value.is_finite() {
                return Err(ConfigError::NonPositiveDuration { name, value });
            }
        }

        let distances = [
            ("movement_threshold", self.movement_threshold),
            ("trail_distance", self.trail_distance),
            ("close_distance", self.close_distance),
            ("cat_half_size", self.cat_half_size),
        ];
        for (name, value) in distances {
            if !(value >= 0.0) {
                return Err(ConfigError::NegativeDistance { name, value });
            }
        }

        let eases = [
            ("trailing_ease", self.trailing_ease),
            ("close_ease", self.close_ease),
            ("far_ease", self.far_ease),
        ];
        for (name, value) in eases {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::EaseOutOfRange { name, value });
            }
        }

        if !self.initial_follower.is_finite() {
            return Err(ConfigError::NonFiniteOrigin(self.initial_follower));
        }
        Ok(())
    }

    /// Fatigue only exists for the trailing cat.
    pub fn fatigue_enabled(&self) -> bool {
        self.variant == PursuitVariant::Trailing
    }
}

/// A cat chases your laser pointer until it gets tired.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Pursuit rule
    #[arg(long, value_enum, default_value_t = PursuitVariant::Trailing)]
    pub variant: PursuitVariant,

    /// How laser movement is detected
    #[arg(long, value_enum, default_value_t = MovementCheck::PerAxis)]
    pub movement_check: MovementCheck,

    #[arg(long)]
    pub chase_budget_ms: Option<f64>,
    #[arg(long)]
    pub rest_duration_ms: Option<f64>,
    #[arg(long)]
    pub fatigue_tick_ms: Option<f64>,
    #[arg(long)]
    pub movement_threshold: Option<f32>,
    #[arg(long)]
    pub trail_distance: Option<f32>,
    #[arg(long)]
    pub trailing_ease: Option<f32>,
    #[arg(long)]
    pub close_ease: Option<f32>,
    #[arg(long)]
    pub far_ease: Option<f32>,
    #[arg(long)]
    pub close_distance: Option<f32>,
    #[arg(long)]
    pub fact_interval_ms: Option<f64>,
    #[arg(long)]
    pub frame_interval_ms: Option<f64>,
    #[arg(long)]
    pub max_frame_gap_ms: Option<f64>,
    #[arg(long)]
    pub cat_half_size: Option<f32>,

    /// Where a new cat appears
    #[arg(long, num_args = 2, value_names = ["X", "Y"], allow_negative_numbers = true)]
    pub initial_follower: Option<Vec<f32>>,
}

impl Args {
    /// Defaults with every given flag applied on top.
    pub fn chase_config(&self) -> Result<ChaseConfig, ConfigError> {
        let d = ChaseConfig::default();
        let config = ChaseConfig {
            variant: self.variant,
            movement_check: self.movement_check,
            chase_budget_ms: self.chase_budget_ms.unwrap_or(d.chase_budget_ms),
            rest_duration_ms: self.rest_duration_ms.unwrap_or(d.rest_duration_ms),
            fatigue_tick_ms: self.fatigue_tick_ms.unwrap_or(d.fatigue_tick_ms),
            movement_threshold: self.movement_threshold.unwrap_or(d.movement_threshold),
            trail_distance: self.trail_distance.unwrap_or(d.trail_distance),
            trailing_ease: self.trailing_ease.unwrap_or(d.trailing_ease),
            close_ease: self.close_ease.unwrap_or(d.close_ease),
            far_ease: self.far_ease.unwrap_or(d.far_ease),
            close_distance: self.close_distance.unwrap_or(d.close_distance),
            fact_interval_ms: self.fact_interval_ms.unwrap_or(d.fact_interval_ms),
            frame_interval_ms: self.frame_interval_ms.unwrap_or(d.frame_interval_ms),
            max_frame_gap_ms: self.max_frame_gap_ms.unwrap_or(d.max_frame_gap_ms),
            cat_half_size: self.cat_half_size.unwrap_or(d.cat_half_size),
            initial_follower: match self.initial_follower.as_deref() {
                Some(&[x, y]) => Vec2::new(x, y),
                _ => d.initial_follower,
            },
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(ChaseConfig::default().validate(), Ok(()));
    }

    #[test]
    fn no_flags_gives_defaults() {
        let args = Args::parse_from(["laserchase"]);
        assert_eq!(args.chase_config(), Ok(ChaseConfig::default()));
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::parse_from([
            "laserchase",
            "--variant",
            "easing",
            "--movement-check",
            "euclidean",
            "--chase-budget-ms",
            "2000",
            "--trail-distance",
            "40",
        ]);
        let config = args.chase_config().unwrap();
        assert_eq!(config.variant, PursuitVariant::Easing);
        assert_eq!(config.movement_check, MovementCheck::Euclidean);
        assert_eq!(config.chase_budget_ms, 2000.0);
        assert_eq!(config.trail_distance, 40.0);
        assert_eq!(config.rest_duration_ms, REST_DURATION_MS);
        assert!(!config.fatigue_enabled());
    }

    #[test]
    fn timing_and_geometry_flags_override_defaults() {
        let args = Args::parse_from([
            "laserchase",
            "--frame-interval-ms",
            "8",
            "--max-frame-gap-ms",
            "500",
            "--cat-half-size",
            "24",
            "--initial-follower",
            "-20",
            "300",
        ]);
        let config = args.chase_config().unwrap();
        assert_eq!(config.frame_interval_ms, 8.0);
        assert_eq!(config.max_frame_gap_ms, 500.0);
        assert_eq!(config.cat_half_size, 24.0);
        assert_eq!(config.initial_follower, Vec2::new(-20.0, 300.0));
        assert_eq!(config.chase_budget_ms, CHASE_BUDGET_MS);
    }

    #[test]
    fn zero_frame_gap_is_rejected() {
        let args = Args::parse_from(["laserchase", "--max-frame-gap-ms", "0"]);
        assert_eq!(
            args.chase_config(),
            Err(ConfigError::NonPositiveDuration {
                name: "max_frame_gap_ms",
                value: 0.0
            })
        );
    }

    #[test]
    fn zero_tick_is_rejected() {
        let args = Args::parse_from(["laserchase", "--fatigue-tick-ms", "0"]);
        assert_eq!(
            args.chase_config(),
            Err(ConfigError::NonPositiveDuration {
                name: "fatigue_tick_ms",
                value: 0.0
            })
        );
    }

    #[rstest]
    #[case::zero(0.0)]
    #[case::negative(-0.1)]
    #[case::above_one(1.5)]
    #[case::nan(f32::NAN)]
    fn ease_must_be_a_fraction(#[case] value: f32) {
        let config = ChaseConfig {
            trailing_ease: value,
            ..ChaseConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EaseOutOfRange { name: "trailing_ease", .. })
        ));
    }

    #[test]
    fn negative_trail_distance_is_rejected() {
        let config = ChaseConfig {
            trail_distance: -1.0,
            ..ChaseConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NegativeDistance {
                name: "trail_distance",
                value: -1.0
            })
        );
    }

    #[rstest]
    #[case::x_only(Vec2::new(6.0, 0.0), true, true)]
    #[case::diagonal_under_axis(Vec2::new(4.0, 4.0), false, true)]
    #[case::exactly_threshold(Vec2::new(5.0, 0.0), false, false)]
    #[case::still(Vec2::ZERO, false, false)]
    fn movement_checks(#[case] delta: Vec2, #[case] per_axis: bool, #[case] euclidean: bool) {
        assert_eq!(MovementCheck::PerAxis.exceeds(delta, 5.0), per_axis);
        assert_eq!(MovementCheck::Euclidean.exceeds(delta, 5.0), euclidean);
    }
}
