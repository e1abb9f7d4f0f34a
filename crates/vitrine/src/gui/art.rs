use crate::config::TrackConfig;
use gdk_pixbuf::{InterpType, Pixbuf};
use std::path::Path;
use vitrine_core::{Card, Deck};

/// Width of the backdrop thumbnail. Painting it stretched over the window
/// is what blurs it.
const BACKDROP_WIDTH: i32 = 24;

pub struct CardArt {
    pub image: Option<Pixbuf>,
    pub backdrop: Option<Pixbuf>,
}

impl CardArt {
    fn load(path: &Path, width: i32, height: i32) -> Self {
        let image = match Pixbuf::from_file_at_scale(path, width, height, true) {
            Ok(p) => Some(p),
            Err(e) => {
                log::warn!("Failed to load {}: {}", path.display(), e);
                None
            }
        };
        let backdrop = image.as_ref().and_then(|p| {
            let height = (BACKDROP_WIDTH * p.height() / p.width().max(1)).max(1);
            p.scale_simple(BACKDROP_WIDTH, height, InterpType::Bilinear)
        });
        Self { image, backdrop }
    }
}

/// The deck plus its decoded artwork, indexed like the deck.
pub struct Gallery {
    deck: Deck,
    art: Vec<CardArt>,
}

impl Gallery {
    pub fn load(deck: Deck, track: &TrackConfig) -> Self {
        // decode at twice the card size for HiDPI
        let (w, h) = (
            (track.card_width * 2.0).round() as i32,
            (track.card_height * 2.0).round() as i32,
        );
        let art = deck
            .iter()
            .map(|card| CardArt::load(&card.image, w, h))
            .collect();
        Self { deck, art }
    }

    pub fn card(&self, index: usize) -> Option<&Card> {
        self.deck.get(index)
    }

    pub fn art(&self, index: usize) -> Option<&CardArt> {
        self.art.get(index)
    }
}
