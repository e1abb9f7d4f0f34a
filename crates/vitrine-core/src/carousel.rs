use crate::animator::{Animator, Completion, Direction};
use crate::config::{AnimationConfig, Layout};
use crate::debounce::Debouncer;
use crate::engine::TweenEngine;
use crate::geometry::TrackLayout;
use crate::gesture::{GestureTracker, PointerId, Swipe};
use crate::state::{Action, CarouselState, Store};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CarouselError {
    #[error("a carousel needs at least one card")]
    Empty,
    #[error("start index {index} is out of range for {len} cards")]
    InitialIndex { index: usize, len: usize },
}

type Mailbox = Rc<RefCell<VecDeque<Action>>>;

/// The interactive carousel: reducer, gesture tracker and animator wired
/// together. The shell feeds it input, geometry and frame times, and reads
/// back offsets and transforms to draw.
pub struct Carousel<E: TweenEngine> {
    store: Store,
    animator: Animator<E>,
    gesture: GestureTracker,
    resize: Debouncer,
    pending_layout: Option<TrackLayout>,
    mailbox: Mailbox,
}

impl<E: TweenEngine> Carousel<E> {
    pub fn new(
        engine: E,
        len: usize,
        layout: TrackLayout,
        config: AnimationConfig,
        start: usize,
    ) -> Result<Self, CarouselError> {
        if len == 0 {
            return Err(CarouselError::Empty);
        }
        if start >= len {
            return Err(CarouselError::InitialIndex { index: start, len });
        }
        let resize = Debouncer::new(config.resize_debounce_ms);
        Ok(Self {
            store: Store::new(len, start),
            animator: Animator::new(engine, len, layout, config, start),
            gesture: GestureTracker::new(),
            resize,
            pending_layout: None,
            mailbox: Rc::default(),
        })
    }

    pub fn state(&self) -> CarouselState {
        self.store.state()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn animator(&self) -> &Animator<E> {
        &self.animator
    }

    pub fn config(&self) -> &AnimationConfig {
        self.animator.config()
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.is_dragging()
    }

    pub fn next(&mut self) {
        self.dispatch(Action::Next);
    }

    pub fn prev(&mut self) {
        self.dispatch(Action::Prev);
    }

    pub fn go_to(&mut self, index: usize) {
        self.dispatch(Action::GoTo(index));
    }

    /// Navigation is ignored while a drag owns the track; the release
    /// decides where it ends up.
    pub fn dispatch(&mut self, action: Action) {
        if self.gesture.is_dragging()
            && matches!(action, Action::Next | Action::Prev | Action::GoTo(_))
        {
            log::debug!("Ignoring {:?} during a drag", action);
            return;
        }
        if let Some(previous) = self.store.dispatch(action) {
            self.apply(action, previous);
        }
        self.drain();
    }

    // Runs the side effects of a state change.
    fn apply(&mut self, action: Action, previous: CarouselState) {
        let state = self.store.state();

        if state.is_animating() {
            let done = self.completion();
            self.animator
                .transition(state.from_index, state.current_index, done);
        }

        if state.current_index != previous.current_index {
            let direction = match action {
                Action::Next => Direction::Forward,
                Action::Prev => Direction::Backward,
                _ if state.current_index > previous.current_index => Direction::Forward,
                _ => Direction::Backward,
            };
            self.animator.show_content(state.current_index, direction);
        }
    }

    fn completion(&self) -> Completion {
        let mailbox = Rc::clone(&self.mailbox);
        Box::new(move || mailbox.borrow_mut().push_back(Action::AnimationEnd))
    }

    fn drain(&mut self) {
        loop {
            let next = self.mailbox.borrow_mut().pop_front();
            let Some(action) = next else {
                break;
            };
            if let Some(previous) = self.store.dispatch(action) {
                self.apply(action, previous);
            }
        }
    }

    /// Starts a drag. A transition in flight is stopped first and the state
    /// settles on whichever card the track is closest to at that moment.
    pub fn pointer_down(&mut self, pointer: PointerId, x: f64, now: f64) -> bool {
        if self.gesture.is_dragging() {
            return false;
        }
        self.animator.cancel();
        let state = self.store.state();
        if state.is_animating() {
            let settled = self
                .animator
                .closest_index()
                .unwrap_or(state.current_index);
            log::debug!("Drag interrupts transition, settling on {}", settled);
            self.dispatch(Action::Interrupt(settled));
        }
        self.gesture
            .begin(pointer, x, now, self.animator.track_offset())
    }

    pub fn pointer_move(&mut self, pointer: PointerId, x: f64, now: f64) -> bool {
        let Some(session) = self.gesture.update(pointer, x, now) else {
            return false;
        };
        self.animator.drag(session.start_offset, session.delta());
        true
    }

    /// Ends a drag on release. `x` is the release position if known.
    pub fn pointer_up(&mut self, pointer: PointerId, x: Option<f64>, now: f64) -> Option<Swipe> {
        let current = self.store.state().current_index;
        let card_width = self
            .animator
            .layout()
            .card(current)
            .map_or(0.0, |c| c.width);
        let rule = self.animator.config().swipe;
        let release = self.gesture.finish(pointer, x, now, card_width, &rule)?;
        log::debug!(
            "Drag released: delta {:.1}px, {:.2}px/ms -> {:?}",
            release.delta,
            release.velocity,
            release.swipe
        );

        match release.swipe {
            Swipe::Next => self.next(),
            Swipe::Prev => self.prev(),
            Swipe::Settle => {
                let done = self.completion();
                self.animator.transition(current, current, done);
            }
        }
        Some(release.swipe)
    }

    /// Pointer cancel or leave: resolved like a release at the last position.
    pub fn pointer_cancel(&mut self, pointer: PointerId, now: f64) -> Option<Swipe> {
        self.pointer_up(pointer, None, now)
    }

    /// Records new geometry. The current card is re-centered without
    /// animation once resizes stop for the debounce period.
    /// The first measurement is applied straight away.
    pub fn resize(&mut self, layout: TrackLayout, now: f64) {
        if !self.animator.layout().is_measured() {
            self.animator.set_geometry(layout);
            self.animator.snap(self.store.state().current_index);
            return;
        }
        self.pending_layout = Some(layout);
        self.resize.poke(now);
    }

    pub fn set_config(&mut self, config: AnimationConfig) {
        self.resize.set_quiet_ms(config.resize_debounce_ms);
        self.animator.set_config(config);
    }

    pub fn set_layout_mode(&mut self, layout: Layout) {
        self.animator.set_layout_mode(layout);
    }

    /// One frame: advance animations, settle resizes, run completions.
    pub fn tick(&mut self, now: f64) {
        self.animator.tick(now);
        if !self.gesture.is_dragging() && self.resize.ready(now) {
            self.resnap();
        }
        self.drain();
    }

    fn resnap(&mut self) {
        if let Some(layout) = self.pending_layout.take() {
            self.animator.set_geometry(layout);
        }
        let state = self.store.state();
        self.animator.snap(state.current_index);
        if state.is_animating() {
            self.dispatch(Action::Interrupt(state.current_index));
        }
        log::debug!("Re-centered card {} after resize", state.current_index);
    }
}
