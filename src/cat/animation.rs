use std::f32::consts::TAU;

/// Idle animation the cat plays, keyed off tired/chasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mood {
    /// Tired: slow breathing fade.
    Pulse,
    /// Chasing: quick hops.
    Bounce,
    /// Anything else: gentle hover.
    Float,
}

const BOUNCE_PERIOD: f32 = 0.5;
const BOUNCE_HEIGHT: f32 = 6.0;
const FLOAT_PERIOD: f32 = 3.0;
const FLOAT_HEIGHT: f32 = 4.0;
const PULSE_PERIOD: f32 = 2.0;
const PULSE_MIN_ALPHA: f32 = 0.5;
const WIGGLE_PERIOD: f32 = 0.3;
const WIGGLE_DEGREES: f32 = 5.0;

impl Mood {
    pub fn from_flags(tired: bool, chasing: bool) -> Self {
        if tired {
            Mood::Pulse
        } else if chasing {
            Mood::Bounce
        } else {
            Mood::Float
        }
    }

    /// Vertical draw offset in pixels (negative is up).
    pub fn offset_y(self, time_s: f32) -> f32 {
        match self {
            Mood::Bounce => -(time_s * TAU / BOUNCE_PERIOD).sin().abs() * BOUNCE_HEIGHT,
            Mood::Float => (time_s * TAU / FLOAT_PERIOD).sin() * FLOAT_HEIGHT,
            Mood::Pulse => 0.0,
        }
    }

    /// Opacity in [PULSE_MIN_ALPHA, 1].
    pub fn alpha(self, time_s: f32) -> f32 {
        match self {
            Mood::Pulse => {
                let t = 0.5 + 0.5 * (time_s * TAU / PULSE_PERIOD).cos();
                PULSE_MIN_ALPHA + (1.0 - PULSE_MIN_ALPHA) * t
            }
            _ => 1.0,
        }
    }
}

/// Extra rotation for the wiggle, in degrees.
pub fn wiggle_degrees(time_s: f32) -> f32 {
    (time_s * TAU / WIGGLE_PERIOD).sin() * WIGGLE_DEGREES
}
