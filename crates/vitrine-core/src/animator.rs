//! Imperative side of the carousel: turns "go from card A to card B" into
//! tweens on the track, the cards, the title/caption pair and the two
//! background layers.

use crate::config::{AnimationConfig, Layout};
use crate::engine::{
    BackgroundLayer, Property, Stagger, TickerId, Target, Track, TweenEngine, TweenId,
};
use crate::geometry::{ArcTransform, TrackLayout};
use crate::tween::{Ease, Keyframe};
use std::cmp::Ordering;

pub type Completion = Box<dyn FnOnce()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    fn sign(self) -> f64 {
        match self {
            Self::Forward => 1.0,
            Self::Backward => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardTransform {
    /// Push/settle offset relative to the card's slot in the track.
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub scale: f64,
}

impl CardTransform {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        rotation: 0.0,
        scale: 1.0,
    };
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundView {
    pub index: Option<usize>,
    pub opacity: f64,
}

/// Everything the shell needs to draw the title, caption and backdrop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentView {
    /// Card whose title and author are on screen right now.
    pub index: usize,
    pub title_y: f64,
    pub title_opacity: f64,
    pub caption_y: f64,
    pub caption_opacity: f64,
    /// Back to front.
    pub backgrounds: [BackgroundView; 2],
}

struct Pending {
    tween: TweenId,
    on_complete: Completion,
}

#[derive(Debug)]
struct ContentFlow {
    shown: usize,
    incoming: Option<usize>,
    direction: Direction,
    exit: Option<TweenId>,
    entry: Option<TweenId>,
    fade: Option<TweenId>,
    front: BackgroundLayer,
    layers: [Option<usize>; 2],
}

impl ContentFlow {
    fn new(index: usize) -> Self {
        let mut layers = [None; 2];
        layers[BackgroundLayer::A.slot()] = Some(index);
        Self {
            shown: index,
            incoming: None,
            direction: Direction::Forward,
            exit: None,
            entry: None,
            fade: None,
            front: BackgroundLayer::A,
            layers,
        }
    }

    fn heading_to(&self) -> usize {
        self.incoming.unwrap_or(self.shown)
    }
}

pub struct Animator<E: TweenEngine> {
    engine: E,
    layout: TrackLayout,
    config: AnimationConfig,
    len: usize,
    track: Option<TweenId>,
    cards: Option<TweenId>,
    pending: Option<Pending>,
    content: ContentFlow,
    ticker: Option<TickerId>,
    arc_offset: Option<f64>,
}

impl<E: TweenEngine> Animator<E> {
    /// Takes over `engine`, subscribes to its frames and centers `index`.
    pub fn new(
        mut engine: E,
        len: usize,
        layout: TrackLayout,
        config: AnimationConfig,
        index: usize,
    ) -> Self {
        let ticker = engine.add_ticker();
        let content = ContentFlow::new(index);
        engine.set(
            Target::Background(content.front),
            Property::Opacity,
            1.0,
        );
        engine.set(
            Target::Background(content.front.other()),
            Property::Opacity,
            0.0,
        );

        let mut animator = Self {
            engine,
            layout,
            config,
            len,
            track: None,
            cards: None,
            pending: None,
            content,
            ticker: Some(ticker),
            arc_offset: None,
        };
        animator.snap(index);
        if animator.config.layout == Layout::Arc {
            animator.apply_arc();
        }
        animator
    }

    pub fn layout(&self) -> &TrackLayout {
        &self.layout
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    pub fn track_offset(&self) -> f64 {
        self.engine.get(Target::Track, Property::X)
    }

    pub fn closest_index(&self) -> Option<usize> {
        self.layout.closest_index(self.track_offset())
    }

    /// Whether the track or the cards are still tweening.
    pub fn is_moving(&self) -> bool {
        [self.track, self.cards]
            .into_iter()
            .flatten()
            .any(|id| self.engine.is_active(id))
    }

    pub fn card_transform(&self, index: usize) -> CardTransform {
        let target = Target::Card(index);
        CardTransform {
            x: self.engine.get(target, Property::X),
            y: self.engine.get(target, Property::Y),
            rotation: self.engine.get(target, Property::Rotation),
            scale: self.engine.get(target, Property::Scale),
        }
    }

    pub fn content(&self) -> ContentView {
        let back = self.content.front.other();
        let layer = |l: BackgroundLayer| BackgroundView {
            index: self.content.layers[l.slot()],
            opacity: self.engine.get(Target::Background(l), Property::Opacity),
        };
        ContentView {
            index: self.content.shown,
            title_y: self.engine.get(Target::Title, Property::Y),
            title_opacity: self.engine.get(Target::Title, Property::Opacity),
            caption_y: self.engine.get(Target::Caption, Property::Y),
            caption_opacity: self.engine.get(Target::Caption, Property::Opacity),
            backgrounds: [layer(back), layer(self.content.front)],
        }
    }

    /// Centers `index` with no tween. Used at startup and after a resize.
    pub fn snap(&mut self, index: usize) {
        self.cancel();
        let Some(target) = self.layout.target_offset(index) else {
            log::debug!("Snap to {} skipped: layout not measured", index);
            return;
        };
        self.engine.set(Target::Track, Property::X, target);
        for i in 0..self.len {
            self.engine.set(Target::Card(i), Property::X, 0.0);
        }
        self.arc_offset = None;
    }

    /// Puts the track at `base + delta` immediately.
    pub fn drag(&mut self, base: f64, delta: f64) {
        self.cancel();
        self.engine.set(Target::Track, Property::X, base + delta);
    }

    /// Animates the track to `to` with the push-and-settle card effect.
    /// `on_complete` runs once when the track arrives, unless the transition
    /// is cancelled or superseded first.
    pub fn transition<F>(&mut self, from: usize, to: usize, on_complete: F) -> bool
    where
        F: FnOnce() + 'static,
    {
        if to >= self.len {
            log::warn!("Transition to {} ignored: deck has {} cards", to, self.len);
            return false;
        }
        self.cancel();

        let Some(target) = self.layout.target_offset(to) else {
            log::debug!("Transition to {} has no geometry; completing in place", to);
            on_complete();
            return true;
        };

        let cfg = &self.config;
        let track = self.engine.tween(
            Target::Track,
            Property::X,
            Keyframe::new(target, cfg.track_duration_ms, cfg.track_ease),
        );

        let settle = Keyframe::new(0.0, cfg.settle_duration_ms, cfg.settle_ease)
            .with_overshoot(cfg.settle_overshoot);
        let push = Keyframe::new(0.0, cfg.push_duration_ms, cfg.push_ease);
        let distance = cfg.push_distance;
        let targets: Vec<_> = (0..self.len).map(Target::Card).collect();
        let cards = self.engine.stagger(
            &targets,
            Property::X,
            Stagger::new(cfg.stagger_ms, to),
            |i| {
                if from == to {
                    return vec![settle];
                }
                match i.cmp(&to) {
                    Ordering::Less => vec![Keyframe { to: -distance, ..push }, settle],
                    Ordering::Greater => vec![Keyframe { to: distance, ..push }, settle],
                    Ordering::Equal => vec![settle],
                }
            },
        );

        log::debug!("Transition {} -> {} (track to {:.1})", from, to, target);
        self.track = Some(track);
        self.cards = Some(cards);
        self.pending = Some(Pending {
            tween: track,
            on_complete: Box::new(on_complete),
        });
        self.arc_offset = None;
        true
    }

    /// Stops the track and card tweens where they are. The pending
    /// completion is dropped without running.
    pub fn cancel(&mut self) {
        for id in [self.track.take(), self.cards.take()].into_iter().flatten() {
            self.engine.kill(id);
        }
        self.pending = None;
    }

    /// Swaps the title/caption to card `to` and cross-fades the backdrop.
    pub fn show_content(&mut self, to: usize, direction: Direction) {
        if to >= self.len {
            log::warn!("Content for {} ignored: deck has {} cards", to, self.len);
            return;
        }
        if to == self.content.heading_to() {
            return;
        }
        self.fade_background(to);

        for id in [self.content.exit.take(), self.content.entry.take()]
            .into_iter()
            .flatten()
        {
            self.engine.kill(id);
        }
        self.content.incoming = Some(to);
        self.content.direction = direction;

        let cfg = &self.config;
        let y = -direction.sign() * cfg.content_slide;
        let out = |to: f64| Keyframe::new(to, cfg.content_out_ms, Ease::Power2In);
        let exit = self.engine.timeline(vec![
            Track::new(Target::Title, Property::Y).then(out(y)),
            Track::new(Target::Title, Property::Opacity).then(out(0.0)),
            Track::new(Target::Caption, Property::Y)
                .delay(cfg.caption_delay_ms)
                .then(out(y)),
            Track::new(Target::Caption, Property::Opacity)
                .delay(cfg.caption_delay_ms)
                .then(out(0.0)),
        ]);
        self.content.exit = Some(exit);
    }

    fn fade_background(&mut self, to: usize) {
        if let Some(id) = self.content.fade.take() {
            self.engine.kill(id);
        }
        let incoming = self.content.front.other();
        let outgoing = self.content.front;
        self.content.layers[incoming.slot()] = Some(to);
        self.engine
            .set(Target::Background(incoming), Property::Opacity, 0.0);

        let duration = self.config.background_fade_ms;
        let fade = |to: f64| Keyframe::new(to, duration, Ease::SineInOut);
        let id = self.engine.timeline(vec![
            Track::new(Target::Background(incoming), Property::Opacity).then(fade(1.0)),
            Track::new(Target::Background(outgoing), Property::Opacity).then(fade(0.0)),
        ]);
        self.content.fade = Some(id);
        self.content.front = incoming;
    }

    fn begin_entry(&mut self) {
        let Some(index) = self.content.incoming.take() else {
            return;
        };
        self.content.shown = index;

        let cfg = &self.config;
        let y = self.content.direction.sign() * cfg.content_slide;
        for target in [Target::Title, Target::Caption] {
            self.engine.set(target, Property::Y, y);
            self.engine.set(target, Property::Opacity, 0.0);
        }
        let enter = |to: f64| Keyframe::new(to, cfg.content_in_ms, Ease::Power3Out);
        let entry = self.engine.timeline(vec![
            Track::new(Target::Title, Property::Y).then(enter(0.0)),
            Track::new(Target::Title, Property::Opacity).then(enter(1.0)),
            Track::new(Target::Caption, Property::Y)
                .delay(cfg.caption_delay_ms)
                .then(enter(0.0)),
            Track::new(Target::Caption, Property::Opacity)
                .delay(cfg.caption_delay_ms)
                .then(enter(1.0)),
        ]);
        self.content.entry = Some(entry);
    }

    pub fn set_geometry(&mut self, layout: TrackLayout) {
        self.layout = layout;
        self.arc_offset = None;
    }

    pub fn set_config(&mut self, config: AnimationConfig) {
        let layout = config.layout;
        self.config = AnimationConfig {
            layout: self.config.layout,
            ..config
        };
        // arc tunables may have changed; recompute on the next frame
        self.arc_offset = None;
        self.set_layout_mode(layout);
    }

    pub fn set_layout_mode(&mut self, layout: Layout) {
        if self.config.layout == layout {
            return;
        }
        self.config.layout = layout;
        match layout {
            Layout::Linear => {
                for i in 0..self.len {
                    let card = Target::Card(i);
                    self.engine.set(card, Property::Y, 0.0);
                    self.engine.set(card, Property::Rotation, 0.0);
                    self.engine.set(card, Property::Scale, 1.0);
                }
                self.arc_offset = None;
            }
            Layout::Arc => self.apply_arc(),
        }
        log::debug!("Layout mode is now {}", layout);
    }

    fn apply_arc(&mut self) {
        let offset = self.track_offset();
        for i in 0..self.len {
            let local = self.engine.get(Target::Card(i), Property::X);
            let Some(n) = self.layout.normalized_distance(i, offset, local) else {
                continue;
            };
            let t = ArcTransform::calculate(n, self.config.arc_strength, self.config.arc_rotation);
            let card = Target::Card(i);
            self.engine.set(card, Property::Y, t.lift);
            self.engine.set(card, Property::Rotation, t.rotation);
            self.engine.set(card, Property::Scale, t.scale);
        }
        self.arc_offset = Some(offset);
    }

    fn on_frame(&mut self) {
        if self.config.layout != Layout::Arc {
            return;
        }
        let cards_moving = self.cards.is_some_and(|id| self.engine.is_active(id));
        if cards_moving || self.arc_offset != Some(self.track_offset()) {
            self.apply_arc();
        }
    }

    /// Advances the engine to `now` and runs whatever finished this frame.
    pub fn tick(&mut self, now: f64) {
        let frame = self.engine.advance(now);

        if self.track.is_some_and(|id| frame.finished(id)) {
            self.track = None;
        }
        if self.cards.is_some_and(|id| frame.finished(id)) {
            self.cards = None;
        }
        if self.content.exit.is_some_and(|id| frame.finished(id)) {
            self.content.exit = None;
            self.begin_entry();
        }
        if self.content.entry.is_some_and(|id| frame.finished(id)) {
            self.content.entry = None;
        }
        if self.content.fade.is_some_and(|id| frame.finished(id)) {
            self.content.fade = None;
        }

        if self.ticker.is_some_and(|id| frame.ticks(id)) {
            self.on_frame();
        }

        if let Some(pending) = self.pending.take_if(|p| frame.finished(p.tween)) {
            (pending.on_complete)();
        }
    }
}

impl<E: TweenEngine> Drop for Animator<E> {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            self.engine.remove_ticker(ticker);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::engine::{Frame, SoftEngine};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum Op {
        Set(Target, Property),
        Timeline(usize),
        Kill(TweenId),
        AddTicker,
        RemoveTicker,
    }

    /// Wraps the soft engine and records the calls made on it.
    pub(crate) struct RecordingEngine {
        pub inner: SoftEngine,
        pub log: Rc<RefCell<Vec<Op>>>,
    }

    impl RecordingEngine {
        pub(crate) fn new() -> (Self, Rc<RefCell<Vec<Op>>>) {
            let log = Rc::new(RefCell::new(Vec::new()));
            let engine = Self {
                inner: SoftEngine::new(),
                log: log.clone(),
            };
            (engine, log)
        }
    }

    impl TweenEngine for RecordingEngine {
        fn now(&self) -> f64 {
            self.inner.now()
        }

        fn set(&mut self, target: Target, property: Property, value: f64) {
            self.log.borrow_mut().push(Op::Set(target, property));
            self.inner.set(target, property, value);
        }

        fn get(&self, target: Target, property: Property) -> f64 {
            self.inner.get(target, property)
        }

        fn timeline(&mut self, tracks: Vec<Track>) -> TweenId {
            self.log.borrow_mut().push(Op::Timeline(tracks.len()));
            self.inner.timeline(tracks)
        }

        fn kill(&mut self, id: TweenId) -> bool {
            self.log.borrow_mut().push(Op::Kill(id));
            self.inner.kill(id)
        }

        fn is_active(&self, id: TweenId) -> bool {
            self.inner.is_active(id)
        }

        fn add_ticker(&mut self) -> TickerId {
            self.log.borrow_mut().push(Op::AddTicker);
            self.inner.add_ticker()
        }

        fn remove_ticker(&mut self, id: TickerId) -> bool {
            self.log.borrow_mut().push(Op::RemoveTicker);
            self.inner.remove_ticker(id)
        }

        fn advance(&mut self, now_ms: f64) -> Frame {
            self.inner.advance(now_ms)
        }
    }

    const N: usize = 7;

    fn layout() -> TrackLayout {
        TrackLayout::uniform(N, 200.0, 20.0, 1000.0)
    }

    fn animator(config: AnimationConfig) -> Animator<SoftEngine> {
        let mut a = Animator::new(SoftEngine::new(), N, layout(), config, 3);
        a.tick(0.0);
        a
    }

    fn counter() -> (Rc<Cell<u32>>, impl FnOnce() + 'static) {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        (count, move || c.set(c.get() + 1))
    }

    fn run(a: &mut Animator<SoftEngine>, from: f64, to: f64) {
        let mut t = from;
        while t < to {
            t += 16.0;
            a.tick(t);
        }
    }

    #[test]
    fn test_new_centers_initial_card() {
        let a = animator(AnimationConfig::default());
        assert_eq!(a.track_offset(), layout().target_offset(3).unwrap());
        assert_eq!(a.closest_index(), Some(3));
        assert_eq!(a.content().index, 3);
    }

    #[test]
    fn test_snap_creates_no_tween() {
        let (engine, log) = RecordingEngine::new();
        let mut a = Animator::new(engine, N, layout(), AnimationConfig::default(), 3);
        log.borrow_mut().clear();
        a.snap(5);
        assert!(!log.borrow().iter().any(|op| matches!(op, Op::Timeline(_))));
        assert_eq!(a.track_offset(), layout().target_offset(5).unwrap());
    }

    #[test]
    fn test_drag_sets_offset_directly() {
        let mut a = animator(AnimationConfig::default());
        a.drag(-100.0, -35.0);
        assert_eq!(a.track_offset(), -135.0);
        assert!(!a.is_moving());
    }

    #[test]
    fn test_transition_completes_once_on_target() {
        let mut a = animator(AnimationConfig::default());
        let (count, done) = counter();
        assert!(a.transition(3, 4, done));
        run(&mut a, 0.0, 2000.0);
        assert_eq!(count.get(), 1);
        assert_eq!(a.track_offset(), layout().target_offset(4).unwrap());
        for i in 0..N {
            assert!(a.card_transform(i).x.abs() < 1e-9);
        }
        assert!(!a.is_moving());
    }

    #[test]
    fn test_cancel_never_completes() {
        let mut a = animator(AnimationConfig::default());
        let (count, done) = counter();
        a.transition(3, 5, done);
        run(&mut a, 0.0, 200.0);
        let frozen = a.track_offset();
        a.cancel();
        run(&mut a, 200.0, 2000.0);
        assert_eq!(count.get(), 0);
        assert_eq!(a.track_offset(), frozen);
    }

    #[test]
    fn test_superseded_transition_drops_its_completion() {
        let mut a = animator(AnimationConfig::default());
        let (first, done_first) = counter();
        let (second, done_second) = counter();
        a.transition(3, 4, done_first);
        run(&mut a, 0.0, 160.0);
        let mid = a.track_offset();
        a.transition(4, 5, done_second);
        a.tick(176.0);
        // Picks up from where the track was, not from a stale target.
        let now = a.track_offset();
        assert!(now <= mid && now > layout().target_offset(5).unwrap());
        run(&mut a, 176.0, 2000.0);
        assert_eq!((first.get(), second.get()), (0, 1));
        assert_eq!(a.track_offset(), layout().target_offset(5).unwrap());
    }

    #[test]
    fn test_push_directions() {
        let cfg = AnimationConfig {
            stagger_ms: 0.0,
            push_ease: Ease::Linear,
            ..AnimationConfig::default()
        };
        let mut a = animator(cfg.clone());
        a.transition(3, 4, || {});
        a.tick(cfg.push_duration_ms);
        assert_eq!(a.card_transform(0).x, -cfg.push_distance);
        assert_eq!(a.card_transform(3).x, -cfg.push_distance);
        assert_eq!(a.card_transform(5).x, cfg.push_distance);
        assert!(a.card_transform(4).x.abs() < cfg.push_distance);
    }

    #[test]
    fn test_same_index_only_settles() {
        let cfg = AnimationConfig {
            stagger_ms: 0.0,
            ..AnimationConfig::default()
        };
        let mut a = animator(cfg.clone());
        a.drag(a.track_offset(), 30.0);
        let (count, done) = counter();
        a.transition(3, 3, done);
        for t in [16.0, 80.0, 160.0] {
            a.tick(t);
            for i in 0..N {
                assert_eq!(a.card_transform(i).x, 0.0);
            }
        }
        run(&mut a, 160.0, 2000.0);
        assert_eq!(count.get(), 1);
        assert_eq!(a.track_offset(), layout().target_offset(3).unwrap());
    }

    #[test]
    fn test_out_of_range_transition_is_ignored() {
        let mut a = animator(AnimationConfig::default());
        let (count, done) = counter();
        assert!(!a.transition(3, N, done));
        run(&mut a, 0.0, 2000.0);
        assert_eq!(count.get(), 0);
        assert_eq!(a.closest_index(), Some(3));
    }

    #[test]
    fn test_unmeasured_transition_completes_in_place() {
        let mut a = Animator::new(
            SoftEngine::new(),
            N,
            TrackLayout::default(),
            AnimationConfig::default(),
            3,
        );
        let (count, done) = counter();
        assert!(a.transition(3, 4, done));
        assert_eq!(count.get(), 1);
        assert_eq!(a.track_offset(), 0.0);
    }

    #[test]
    fn test_arc_follows_track_and_resets() {
        let cfg = AnimationConfig {
            layout: Layout::Arc,
            ..AnimationConfig::default()
        };
        let mut a = animator(cfg.clone());
        assert_eq!(a.card_transform(3).scale, 1.0);
        let side = a.card_transform(4);
        assert!(side.y > 0.0 && side.rotation > 0.0 && side.scale < 1.0);
        assert!(a.card_transform(2).rotation < 0.0);

        a.drag(a.track_offset(), -220.0);
        a.tick(16.0);
        assert!((a.card_transform(4).scale - 1.0).abs() < 1e-9);

        a.set_layout_mode(Layout::Linear);
        for i in 0..N {
            let t = a.card_transform(i);
            assert_eq!((t.y, t.rotation, t.scale), (0.0, 0.0, 1.0));
        }
        a.drag(a.track_offset(), 300.0);
        a.tick(32.0);
        assert_eq!(a.card_transform(0).scale, 1.0);
    }

    #[test]
    fn test_content_swaps_between_phases() {
        let cfg = AnimationConfig::default();
        let mut a = animator(cfg.clone());
        a.show_content(4, Direction::Forward);
        assert_eq!(a.content().index, 3);
        assert_eq!(a.content().backgrounds[1].index, Some(4));

        run(&mut a, 0.0, cfg.content_out_ms + cfg.caption_delay_ms + 16.0);
        let view = a.content();
        assert_eq!(view.index, 4);

        run(&mut a, 400.0, 3000.0);
        let view = a.content();
        assert_eq!((view.title_y, view.title_opacity), (0.0, 1.0));
        assert_eq!((view.caption_y, view.caption_opacity), (0.0, 1.0));
        assert_eq!(view.backgrounds[1].opacity, 1.0);
        assert_eq!(view.backgrounds[0].opacity, 0.0);
    }

    #[test]
    fn test_content_retargets_mid_exit() {
        let mut a = animator(AnimationConfig::default());
        a.show_content(4, Direction::Forward);
        run(&mut a, 0.0, 96.0);
        a.show_content(5, Direction::Forward);
        run(&mut a, 96.0, 3000.0);
        let view = a.content();
        assert_eq!(view.index, 5);
        assert_eq!(view.backgrounds[1].index, Some(5));
        assert_eq!(view.backgrounds[1].opacity, 1.0);
    }

    #[test]
    fn test_drop_removes_ticker_once() {
        let (engine, log) = RecordingEngine::new();
        let a = Animator::new(engine, N, layout(), AnimationConfig::default(), 0);
        drop(a);
        let log = log.borrow();
        let added = log.iter().filter(|op| **op == Op::AddTicker).count();
        let removed = log.iter().filter(|op| **op == Op::RemoveTicker).count();
        assert_eq!((added, removed), (1, 1));
    }
}
