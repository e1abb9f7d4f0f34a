use strum::Display as StrumDisplay;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
pub enum Status {
    #[default]
    Idle,
    Animating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Next,
    Prev,
    GoTo(usize),
    /// Settles an aborted transition on a concrete index.
    Interrupt(usize),
    AnimationEnd,
}

/// Navigation state of the carousel.
///
/// `from_index` is the card the track is animating away from; it equals
/// `current_index` whenever nothing is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarouselState {
    pub current_index: usize,
    pub from_index: usize,
    pub status: Status,
}

impl CarouselState {
    pub fn new(index: usize) -> Self {
        Self {
            current_index: index,
            from_index: index,
            status: Status::Idle,
        }
    }

    pub fn is_animating(&self) -> bool {
        self.status == Status::Animating
    }

    /// Pure transition function over a deck of `len` cards. Actions that do
    /// not apply hand back `self` untouched.
    pub fn reduce(self, action: Action, len: usize) -> Self {
        if len == 0 {
            return self;
        }
        match action {
            Action::Next => self.retarget((self.current_index + 1) % len),
            Action::Prev => self.retarget((self.current_index + len - 1) % len),
            Action::GoTo(index) if index < len && index != self.current_index => {
                self.retarget(index)
            }
            Action::GoTo(_) => self,
            Action::Interrupt(index) if index < len && self.is_animating() => Self::new(index),
            Action::Interrupt(_) => self,
            Action::AnimationEnd if self.is_animating() => Self::new(self.current_index),
            Action::AnimationEnd => self,
        }
    }

    fn retarget(self, index: usize) -> Self {
        Self {
            current_index: index,
            from_index: self.current_index,
            status: Status::Animating,
        }
    }
}

/// Holds the state for a fixed-size deck and reports what each dispatch did.
#[derive(Debug, Clone)]
pub struct Store {
    state: CarouselState,
    len: usize,
}

impl Store {
    pub fn new(len: usize, initial_index: usize) -> Self {
        Self {
            state: CarouselState::new(initial_index.min(len.saturating_sub(1))),
            len,
        }
    }

    pub fn state(&self) -> CarouselState {
        self.state
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Applies `action` and returns the previous state if anything changed.
    pub fn dispatch(&mut self, action: Action) -> Option<CarouselState> {
        let next = self.state.reduce(action, self.len);
        if next == self.state {
            match action {
                Action::GoTo(i) | Action::Interrupt(i) if i >= self.len => {
                    log::warn!("Ignoring {:?}: deck has {} cards", action, self.len);
                }
                _ => log::trace!("{:?} left state unchanged", action),
            }
            return None;
        }
        let previous = std::mem::replace(&mut self.state, next);
        log::debug!(
            "{:?}: {} -> {} ({})",
            action,
            previous.current_index,
            next.current_index,
            next.status
        );
        Some(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const N: usize = 7;

    #[test]
    fn test_next_wraps() {
        let s = CarouselState::new(6).reduce(Action::Next, N);
        assert_eq!(s.current_index, 0);
        assert_eq!(s.from_index, 6);
        assert_eq!(s.status, Status::Animating);
    }

    #[test]
    fn test_prev_wraps() {
        let s = CarouselState::new(0).reduce(Action::Prev, N);
        assert_eq!(s.current_index, 6);
        assert_eq!(s.from_index, 0);
    }

    #[test]
    fn test_three_nexts() {
        let mut store = Store::new(N, 0);
        for _ in 0..2 {
            store.dispatch(Action::Next);
            assert!(store.state().is_animating());
            store.dispatch(Action::AnimationEnd);
            assert_eq!(store.state().status, Status::Idle);
        }
        store.dispatch(Action::Next);
        assert!(store.state().is_animating());
        store.dispatch(Action::AnimationEnd);
        assert_eq!(store.state(), CarouselState::new(3));
    }

    #[test]
    fn test_retarget_while_animating() {
        let s = CarouselState::new(0)
            .reduce(Action::Next, N)
            .reduce(Action::Next, N)
            .reduce(Action::Next, N);
        assert_eq!(s.current_index, 3);
        assert_eq!(s.from_index, 2);
        assert!(s.is_animating());
        assert_eq!(s.reduce(Action::AnimationEnd, N), CarouselState::new(3));
    }

    #[test]
    fn test_goto_current_is_noop() {
        let mut store = Store::new(N, 4);
        let before = store.state();
        assert_eq!(store.dispatch(Action::GoTo(4)), None);
        assert_eq!(store.state(), before);
    }

    #[test]
    fn test_goto_out_of_range_is_ignored() {
        let mut store = Store::new(N, 4);
        assert_eq!(store.dispatch(Action::GoTo(N)), None);
        assert_eq!(store.state(), CarouselState::new(4));
    }

    #[test]
    fn test_goto() {
        let s = CarouselState::new(1).reduce(Action::GoTo(5), N);
        assert_eq!((s.from_index, s.current_index, s.status), (1, 5, Status::Animating));
    }

    #[test]
    fn test_interrupt_settles() {
        let s = CarouselState::new(1).reduce(Action::Next, N);
        assert_eq!(s.reduce(Action::Interrupt(4), N), CarouselState::new(4));
    }

    #[test]
    fn test_idle_only_actions_are_noops() {
        let idle = CarouselState::new(2);
        assert_eq!(idle.reduce(Action::AnimationEnd, N), idle);
        assert_eq!(idle.reduce(Action::Interrupt(5), N), idle);
    }

    #[test]
    fn test_dispatch_returns_previous() {
        let mut store = Store::new(N, 3);
        assert_eq!(store.dispatch(Action::Prev), Some(CarouselState::new(3)));
        assert_eq!(store.dispatch(Action::AnimationEnd).map(|s| s.status), Some(Status::Animating));
    }
}
