use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::f64::consts::PI;
use strum::{Display as StrumDisplay, EnumIter, EnumString};

/// Overshoot used by `BackOut` when a keyframe does not ask for another one.
pub const DEFAULT_OVERSHOOT: f64 = 1.70158;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    SerializeDisplay,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
pub enum Ease {
    #[strum(to_string = "linear", serialize = "none")]
    Linear,
    #[strum(serialize = "power1.out")]
    Power1Out,
    #[strum(serialize = "power2.in")]
    Power2In,
    #[default]
    #[strum(serialize = "power2.out")]
    Power2Out,
    #[strum(serialize = "power3.out")]
    Power3Out,
    #[strum(serialize = "power2.inOut")]
    Power2InOut,
    #[strum(serialize = "power3.inOut")]
    Power3InOut,
    #[strum(serialize = "sine.inOut")]
    SineInOut,
    #[strum(serialize = "expo.out")]
    ExpoOut,
    #[strum(serialize = "back.out")]
    BackOut,
}

impl Ease {
    /// Maps linear progress `t` in `[0, 1]` to eased progress. `BackOut` may
    /// leave `[0, 1]` on the way; every curve starts at 0 and ends at 1.
    pub fn apply(self, t: f64, overshoot: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Power1Out => 1.0 - (1.0 - t).powi(2),
            Self::Power2In => t.powi(3),
            Self::Power2Out => 1.0 - (1.0 - t).powi(3),
            Self::Power3Out => 1.0 - (1.0 - t).powi(4),
            Self::Power2InOut => in_out(t, 3),
            Self::Power3InOut => in_out(t, 4),
            Self::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
            Self::ExpoOut => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2f64.powf(-10.0 * t)
                }
            }
            Self::BackOut => {
                let u = t - 1.0;
                u * u * ((overshoot + 1.0) * u + overshoot) + 1.0
            }
        }
    }
}

fn in_out(t: f64, power: i32) -> f64 {
    if t < 0.5 {
        2f64.powi(power - 1) * t.powi(power)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(power) / 2.0
    }
}

/// One leg of an animated property: from wherever the property is when the
/// leg starts, to `to`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub to: f64,
    pub duration_ms: f64,
    pub ease: Ease,
    pub overshoot: f64,
}

impl Keyframe {
    pub fn new(to: f64, duration_ms: f64, ease: Ease) -> Self {
        Self {
            to,
            duration_ms: duration_ms.max(0.0),
            ease,
            overshoot: DEFAULT_OVERSHOOT,
        }
    }

    pub fn with_overshoot(mut self, overshoot: f64) -> Self {
        self.overshoot = overshoot;
        self
    }

    pub fn sample(&self, from: f64, elapsed_ms: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return self.to;
        }
        let t = elapsed_ms / self.duration_ms;
        from + (self.to - from) * self.ease.apply(t, self.overshoot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_curves_hit_endpoints() {
        for ease in Ease::iter() {
            assert!(ease.apply(0.0, DEFAULT_OVERSHOOT).abs() < 1e-9, "{ease}");
            assert!((ease.apply(1.0, DEFAULT_OVERSHOOT) - 1.0).abs() < 1e-9, "{ease}");
        }
    }

    #[test]
    fn test_back_out_overshoots() {
        let peak = (1..100)
            .map(|i| Ease::BackOut.apply(i as f64 / 100.0, DEFAULT_OVERSHOOT))
            .fold(f64::MIN, f64::max);
        assert!(peak > 1.0);
    }

    #[test]
    fn test_ease_deserialization() {
        let cases = vec![
            ("\"power3.inOut\"", Ease::Power3InOut),
            ("\"POWER3.INOUT\"", Ease::Power3InOut),
            ("\"back.out\"", Ease::BackOut),
            ("\"none\"", Ease::Linear),
        ];

        for (json, expected) in cases {
            let deserialized: Ease = serde_json::from_str(json).unwrap();
            assert_eq!(deserialized, expected);
        }
    }

    #[test]
    fn test_zero_duration_keyframe_jumps() {
        let kf = Keyframe::new(10.0, 0.0, Ease::Linear);
        assert_eq!(kf.sample(0.0, 0.0), 10.0);
    }
}
