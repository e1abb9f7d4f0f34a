//! Toolkit-free core of the vitrine carousel: geometry, gestures, the
//! navigation reducer, a frame-driven tween engine and the orchestration
//! that ties them together.

pub mod animator;
pub mod card;
pub mod carousel;
pub mod config;
pub mod debounce;
pub mod engine;
pub mod geometry;
pub mod gesture;
pub mod state;
pub mod tween;

pub use animator::{Animator, CardTransform, ContentView};
pub use card::{Card, CardId, Deck, DeckError, ImageRef};
pub use carousel::{Carousel, CarouselError};
pub use config::{AnimationConfig, Layout, SwipeRule};
pub use engine::{SoftEngine, TweenEngine};
pub use geometry::{CardBox, TrackLayout};
pub use gesture::{GestureTracker, PointerId, Swipe};
pub use state::{Action, CarouselState, Status, Store};
pub use tween::Ease;
