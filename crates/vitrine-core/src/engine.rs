//! Tween engine seam.
//!
//! Everything that moves on screen is a numeric property of a [`Target`]. The
//! orchestration code only talks to [`TweenEngine`]; [`SoftEngine`] is the
//! in-process implementation, advanced once per frame by whoever owns the
//! frame clock.

use crate::tween::Keyframe;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackgroundLayer {
    A,
    B,
}

impl BackgroundLayer {
    pub fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    pub fn slot(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Track,
    Card(usize),
    Title,
    Caption,
    Background(BackgroundLayer),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    X,
    Y,
    Rotation,
    Scale,
    Opacity,
}

impl Property {
    /// Value a property reads as before anything wrote it.
    pub fn rest_value(self) -> f64 {
        match self {
            Self::Scale | Self::Opacity => 1.0,
            Self::X | Self::Y | Self::Rotation => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickerId(u64);

/// Keyframes played back to back on one property of one target.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub target: Target,
    pub property: Property,
    pub delay_ms: f64,
    pub keyframes: Vec<Keyframe>,
}

impl Track {
    pub fn new(target: Target, property: Property) -> Self {
        Self {
            target,
            property,
            delay_ms: 0.0,
            keyframes: Vec::new(),
        }
    }

    pub fn delay(mut self, delay_ms: f64) -> Self {
        self.delay_ms = delay_ms.max(0.0);
        self
    }

    pub fn then(mut self, keyframe: Keyframe) -> Self {
        self.keyframes.push(keyframe);
        self
    }

    pub fn duration_ms(&self) -> f64 {
        self.delay_ms + self.keyframes.iter().map(|k| k.duration_ms).sum::<f64>()
    }
}

/// Per-item delay radiating out from `origin`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stagger {
    pub each_ms: f64,
    pub origin: usize,
}

impl Stagger {
    pub fn new(each_ms: f64, origin: usize) -> Self {
        Self { each_ms, origin }
    }

    pub fn delay_for(&self, index: usize) -> f64 {
        index.abs_diff(self.origin) as f64 * self.each_ms.max(0.0)
    }
}

/// What happened during one call to [`TweenEngine::advance`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub completed: Vec<TweenId>,
    pub tickers: Vec<TickerId>,
}

impl Frame {
    pub fn finished(&self, id: TweenId) -> bool {
        self.completed.contains(&id)
    }

    pub fn ticks(&self, id: TickerId) -> bool {
        self.tickers.contains(&id)
    }
}

pub trait TweenEngine {
    /// Time of the latest frame, in milliseconds.
    fn now(&self) -> f64;

    /// Writes a property immediately. Running tweens on the same property
    /// keep running; kill them first to take ownership.
    fn set(&mut self, target: Target, property: Property, value: f64);

    fn get(&self, target: Target, property: Property) -> f64;

    /// Starts a group of tracks that completes when its longest track does.
    fn timeline(&mut self, tracks: Vec<Track>) -> TweenId;

    /// Stops a tween where it is. Returns false if it was not running.
    fn kill(&mut self, id: TweenId) -> bool;

    fn is_active(&self, id: TweenId) -> bool;

    fn add_ticker(&mut self) -> TickerId;

    fn remove_ticker(&mut self, id: TickerId) -> bool;

    /// Moves the clock to `now_ms` and renders every running tween.
    fn advance(&mut self, now_ms: f64) -> Frame;

    fn tween(&mut self, target: Target, property: Property, keyframe: Keyframe) -> TweenId {
        self.timeline(vec![Track::new(target, property).then(keyframe)])
    }

    /// Plays per-item keyframes over `targets`, each delayed by `stagger`
    /// according to its position in the slice.
    fn stagger<F>(
        &mut self,
        targets: &[Target],
        property: Property,
        stagger: Stagger,
        mut keyframes: F,
    ) -> TweenId
    where
        F: FnMut(usize) -> Vec<Keyframe>,
    {
        let tracks = targets
            .iter()
            .enumerate()
            .map(|(i, &target)| Track {
                target,
                property,
                delay_ms: stagger.delay_for(i),
                keyframes: keyframes(i),
            })
            .collect();
        self.timeline(tracks)
    }
}

#[derive(Debug)]
struct RunningTrack {
    track: Track,
    // Start value of each keyframe, captured when that keyframe begins.
    from: Vec<Option<f64>>,
}

#[derive(Debug)]
struct Running {
    id: TweenId,
    start: f64,
    duration: f64,
    tracks: Vec<RunningTrack>,
}

/// Deterministic engine driven by explicit timestamps.
#[derive(Debug, Default)]
pub struct SoftEngine {
    clock: Option<f64>,
    next_id: u64,
    values: HashMap<(Target, Property), f64>,
    running: Vec<Running>,
    tickers: Vec<TickerId>,
}

impl SoftEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn render(values: &mut HashMap<(Target, Property), f64>, running: &mut Running, now: f64) {
        let elapsed = now - running.start;
        for rt in &mut running.tracks {
            let key = (rt.track.target, rt.track.property);
            let mut cursor = rt.track.delay_ms;
            for (keyframe, from) in rt.track.keyframes.iter().zip(rt.from.iter_mut()) {
                if elapsed < cursor {
                    break;
                }
                let start = *from.get_or_insert_with(|| {
                    values
                        .get(&key)
                        .copied()
                        .unwrap_or_else(|| key.1.rest_value())
                });
                let local = (elapsed - cursor).min(keyframe.duration_ms);
                values.insert(key, keyframe.sample(start, local));
                cursor += keyframe.duration_ms;
            }
        }
    }
}

impl TweenEngine for SoftEngine {
    fn now(&self) -> f64 {
        self.clock.unwrap_or(0.0)
    }

    fn set(&mut self, target: Target, property: Property, value: f64) {
        self.values.insert((target, property), value);
    }

    fn get(&self, target: Target, property: Property) -> f64 {
        self.values
            .get(&(target, property))
            .copied()
            .unwrap_or_else(|| property.rest_value())
    }

    fn timeline(&mut self, tracks: Vec<Track>) -> TweenId {
        let id = TweenId(self.next_id());
        let duration = tracks.iter().map(Track::duration_ms).fold(0.0, f64::max);
        let tracks = tracks
            .into_iter()
            .map(|track| RunningTrack {
                from: vec![None; track.keyframes.len()],
                track,
            })
            .collect();
        self.running.push(Running {
            id,
            start: self.now(),
            duration,
            tracks,
        });
        id
    }

    fn kill(&mut self, id: TweenId) -> bool {
        let before = self.running.len();
        self.running.retain(|r| r.id != id);
        self.running.len() != before
    }

    fn is_active(&self, id: TweenId) -> bool {
        self.running.iter().any(|r| r.id == id)
    }

    fn add_ticker(&mut self) -> TickerId {
        let id = TickerId(self.next_id());
        self.tickers.push(id);
        id
    }

    fn remove_ticker(&mut self, id: TickerId) -> bool {
        let before = self.tickers.len();
        self.tickers.retain(|t| *t != id);
        self.tickers.len() != before
    }

    fn advance(&mut self, now_ms: f64) -> Frame {
        let now = match self.clock {
            Some(previous) => now_ms.max(previous),
            None => {
                // Anything created before the first frame starts on it.
                for running in &mut self.running {
                    running.start += now_ms;
                }
                now_ms
            }
        };
        self.clock = Some(now);

        let mut completed = Vec::new();
        for running in &mut self.running {
            Self::render(&mut self.values, running, now);
            if now - running.start >= running.duration {
                completed.push(running.id);
            }
        }
        self.running.retain(|r| !completed.contains(&r.id));

        Frame {
            completed,
            tickers: self.tickers.clone(),
        }
    }
}
