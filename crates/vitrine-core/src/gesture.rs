use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

/// Samples older than this at release mean the pointer had stopped.
pub const VELOCITY_STALE_MS: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, From, Into)]
pub struct PointerId(u32);

impl PointerId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// What a finished drag resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swipe {
    Next,
    Prev,
    /// Below every threshold: animate back to the current card.
    Settle,
}

/// Rule that turns a released drag into a [`Swipe`]. Exactly one rule is
/// active; they are never combined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum SwipeRule {
    /// Past `fraction` of a card width in either direction.
    Distance { fraction: f64 },
    /// Past `fraction` of a card width, or released faster than `velocity`
    /// px/ms, in which case the direction of travel wins.
    DistanceOrVelocity { fraction: f64, velocity: f64 },
}

impl Default for SwipeRule {
    fn default() -> Self {
        Self::Distance { fraction: 0.2 }
    }
}

impl SwipeRule {
    pub fn resolve(&self, delta: f64, velocity: f64, card_width: f64) -> Swipe {
        match *self {
            Self::Distance { fraction } => by_distance(delta, card_width * fraction),
            Self::DistanceOrVelocity {
                fraction,
                velocity: limit,
            } => {
                if velocity.abs() > limit {
                    direction(velocity)
                } else {
                    by_distance(delta, card_width * fraction)
                }
            }
        }
    }
}

fn by_distance(delta: f64, threshold: f64) -> Swipe {
    if delta.abs() > threshold {
        direction(delta)
    } else {
        Swipe::Settle
    }
}

// Dragging the track left brings the next card in.
fn direction(movement: f64) -> Swipe {
    if movement < 0.0 { Swipe::Next } else { Swipe::Prev }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub pointer: PointerId,
    pub start_x: f64,
    pub start_offset: f64,
    pub last_x: f64,
    pub last_time: f64,
    /// px/ms over the latest sample.
    pub velocity: f64,
}

impl DragSession {
    fn sample(&mut self, x: f64, now: f64) {
        let dt = now - self.last_time;
        if dt > 0.0 {
            self.velocity = (x - self.last_x) / dt;
            self.last_x = x;
            self.last_time = now;
        } else {
            self.last_x = x;
        }
    }

    pub fn delta(&self) -> f64 {
        self.last_x - self.start_x
    }

    pub fn offset(&self) -> f64 {
        self.start_offset + self.delta()
    }
}

/// Result of a completed drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Release {
    pub swipe: Swipe,
    pub delta: f64,
    pub velocity: f64,
}

/// Owns at most one drag at a time, keyed by the pointer that started it.
#[derive(Debug, Clone, Default)]
pub struct GestureTracker {
    session: Option<DragSession>,
}

impl GestureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn owns(&self, pointer: PointerId) -> bool {
        self.session.is_some_and(|s| s.pointer == pointer)
    }

    /// Starts a drag. Refused while another pointer holds the session.
    pub fn begin(&mut self, pointer: PointerId, x: f64, now: f64, start_offset: f64) -> bool {
        if self.session.is_some() {
            return false;
        }
        self.session = Some(DragSession {
            pointer,
            start_x: x,
            start_offset,
            last_x: x,
            last_time: now,
            velocity: 0.0,
        });
        true
    }

    /// Feeds a move of the captured pointer and returns the updated session.
    pub fn update(&mut self, pointer: PointerId, x: f64, now: f64) -> Option<DragSession> {
        let session = self.session.as_mut().filter(|s| s.pointer == pointer)?;
        session.sample(x, now);
        Some(*session)
    }

    /// Ends the drag owned by `pointer` and resolves it. `x` is the release
    /// position when the platform reports one.
    pub fn finish(
        &mut self,
        pointer: PointerId,
        x: Option<f64>,
        now: f64,
        card_width: f64,
        rule: &SwipeRule,
    ) -> Option<Release> {
        if !self.owns(pointer) {
            return None;
        }
        let mut session = self.session.take()?;
        if let Some(x) = x {
            session.sample(x, now);
        }
        let velocity = if now - session.last_time > VELOCITY_STALE_MS {
            0.0
        } else {
            session.velocity
        };
        let delta = session.delta();
        let swipe = if card_width > 0.0 {
            rule.resolve(delta, velocity, card_width)
        } else {
            Swipe::Settle
        };
        Some(Release {
            swipe,
            delta,
            velocity,
        })
    }

    /// Drops the drag owned by `pointer` without resolving it.
    pub fn cancel(&mut self, pointer: PointerId) -> bool {
        if self.owns(pointer) {
            self.session = None;
            true
        } else {
            false
        }
    }
}
