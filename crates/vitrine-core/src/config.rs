use crate::tween::Ease;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use strum::{Display as StrumDisplay, EnumIter, EnumString};

pub use crate::gesture::SwipeRule;

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
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum Layout {
    #[default]
    Linear,
    #[strum(to_string = "arc", serialize = "curved")]
    Arc,
}

/// Tunables for the carousel's motion. None of them affect which card ends up
/// current; they only shape the tweens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub layout: Layout,
    pub swipe: SwipeRule,

    pub track_duration_ms: f64,
    pub track_ease: Ease,

    pub stagger_ms: f64,
    pub push_distance: f64,
    pub push_duration_ms: f64,
    pub push_ease: Ease,
    pub settle_duration_ms: f64,
    pub settle_ease: Ease,
    pub settle_overshoot: f64,

    pub content_out_ms: f64,
    pub content_in_ms: f64,
    pub content_slide: f64,
    pub caption_delay_ms: f64,
    pub background_fade_ms: f64,

    pub arc_strength: f64,
    /// Degrees at the viewport edge.
    pub arc_rotation: f64,

    pub resize_debounce_ms: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            layout: Layout::Linear,
            swipe: SwipeRule::default(),
            track_duration_ms: 650.0,
            track_ease: Ease::Power3InOut,
            stagger_ms: 35.0,
            push_distance: 28.0,
            push_duration_ms: 180.0,
            push_ease: Ease::Power2Out,
            settle_duration_ms: 560.0,
            settle_ease: Ease::BackOut,
            settle_overshoot: 2.2,
            content_out_ms: 220.0,
            content_in_ms: 420.0,
            content_slide: 26.0,
            caption_delay_ms: 60.0,
            background_fade_ms: 800.0,
            arc_strength: 90.0,
            arc_rotation: 14.0,
            resize_debounce_ms: 200.0,
        }
    }
}
