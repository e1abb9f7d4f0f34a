/// How much an off-center card shrinks at the viewport edge in arc layout.
pub const ARC_SCALE_FALLOFF: f64 = 0.15;

/// Measured horizontal box of one card, relative to the track's origin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CardBox {
    pub left: f64,
    pub width: f64,
}

impl CardBox {
    pub fn new(left: f64, width: f64) -> Self {
        Self { left, width }
    }

    pub fn center(&self) -> f64 {
        self.left + self.width / 2.0
    }
}

/// Live geometry of the track: the viewport it is centered in and the box of
/// every card. An unmeasured layout (zero viewport, zero-width cards) makes
/// every query come back empty rather than produce a bogus target.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackLayout {
    pub viewport_width: f64,
    pub cards: Vec<CardBox>,
}

impl TrackLayout {
    pub fn new(viewport_width: f64, cards: Vec<CardBox>) -> Self {
        Self {
            viewport_width,
            cards,
        }
    }

    /// A row of `count` equally sized cards separated by `gap`.
    pub fn uniform(count: usize, card_width: f64, gap: f64, viewport_width: f64) -> Self {
        let cards = (0..count)
            .map(|i| CardBox::new(i as f64 * (card_width + gap), card_width))
            .collect();
        Self::new(viewport_width, cards)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn card(&self, index: usize) -> Option<&CardBox> {
        self.cards.get(index)
    }

    pub fn is_measured(&self) -> bool {
        self.viewport_width > 0.0 && !self.cards.is_empty()
    }

    /// Track translation that puts the center of card `index` on the
    /// viewport center.
    pub fn target_offset(&self, index: usize) -> Option<f64> {
        if self.viewport_width <= 0.0 {
            return None;
        }
        let card = self.cards.get(index).filter(|c| c.width > 0.0)?;
        Some(self.viewport_width / 2.0 - card.left - card.width / 2.0)
    }

    /// Card whose centering offset is nearest `current_offset`. Ties go to the
    /// lower index.
    pub fn closest_index(&self, current_offset: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for i in 0..self.cards.len() {
            let Some(target) = self.target_offset(i) else {
                continue;
            };
            let distance = (current_offset - target).abs();
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((i, distance));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Distance of a card's midpoint from the viewport center, normalized so
    /// that the viewport edges sit at -1 and 1.
    pub fn normalized_distance(&self, index: usize, track_offset: f64, local_x: f64) -> Option<f64> {
        if self.viewport_width <= 0.0 {
            return None;
        }
        let card = self.cards.get(index)?;
        let half = self.viewport_width / 2.0;
        let mid = track_offset + local_x + card.center();
        Some(((mid - half) / half).clamp(-1.0, 1.0))
    }
}

/// Visual transform applied on top of a card's slot in the track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcTransform {
    pub lift: f64,
    pub rotation: f64,
    pub scale: f64,
}

impl ArcTransform {
    pub const IDENTITY: Self = Self {
        lift: 0.0,
        rotation: 0.0,
        scale: 1.0,
    };

    pub fn calculate(normalized: f64, arc_strength: f64, arc_rotation: f64) -> Self {
        let n = normalized.clamp(-1.0, 1.0);
        Self {
            lift: n * n * arc_strength,
            rotation: n * arc_rotation,
            scale: 1.0 - n.abs() * ARC_SCALE_FALLOFF,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> TrackLayout {
        TrackLayout::uniform(7, 200.0, 20.0, 1000.0)
    }

    #[test]
    fn test_target_offset_centers_card() {
        let layout = layout();
        for i in 0..layout.len() {
            let card = layout.card(i).unwrap();
            let offset = layout.target_offset(i).unwrap();
            let center = card.left + offset + card.width / 2.0;
            assert!((center - layout.viewport_width / 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_target_offset_on_uneven_cards() {
        let layout = TrackLayout::new(
            800.0,
            vec![CardBox::new(0.0, 100.0), CardBox::new(130.0, 300.0)],
        );
        assert_eq!(layout.target_offset(1), Some(400.0 - 130.0 - 150.0));
    }

    #[test]
    fn test_unmeasured_layout_has_no_targets() {
        assert_eq!(layout().target_offset(7), None);
        assert_eq!(TrackLayout::uniform(3, 200.0, 0.0, 0.0).target_offset(0), None);
        assert_eq!(TrackLayout::uniform(3, 0.0, 0.0, 500.0).target_offset(1), None);
        assert_eq!(TrackLayout::default().closest_index(0.0), None);
    }

    #[test]
    fn test_closest_index() {
        let layout = layout();
        let at_two = layout.target_offset(2).unwrap();
        assert_eq!(layout.closest_index(at_two), Some(2));
        assert_eq!(layout.closest_index(at_two - 80.0), Some(2));
        assert_eq!(layout.closest_index(at_two - 140.0), Some(3));
        assert_eq!(layout.closest_index(f64::MAX / 2.0), Some(0));
    }

    #[test]
    fn test_closest_index_tie_prefers_first() {
        let layout = layout();
        let halfway = (layout.target_offset(1).unwrap() + layout.target_offset(2).unwrap()) / 2.0;
        assert_eq!(layout.closest_index(halfway), Some(1));
    }

    #[test]
    fn test_closest_index_is_idempotent() {
        let layout = layout();
        let first = layout.closest_index(-333.0);
        assert_eq!(first, layout.closest_index(-333.0));
    }

    #[test]
    fn test_arc_transform() {
        assert_eq!(ArcTransform::calculate(0.0, 80.0, 12.0), ArcTransform::IDENTITY);

        let edge = ArcTransform::calculate(-1.0, 80.0, 12.0);
        assert_eq!(edge.lift, 80.0);
        assert_eq!(edge.rotation, -12.0);
        assert!((edge.scale - 0.85).abs() < 1e-9);

        let half = ArcTransform::calculate(0.5, 80.0, 12.0);
        assert_eq!(half.lift, 20.0);
        assert_eq!(half.rotation, 6.0);
    }

    #[test]
    fn test_normalized_distance() {
        let layout = layout();
        let centered = layout.target_offset(3).unwrap();
        assert_eq!(layout.normalized_distance(3, centered, 0.0), Some(0.0));
        let next = layout.normalized_distance(4, centered, 0.0).unwrap();
        assert!((next - 220.0 / 500.0).abs() < 1e-9);
        assert_eq!(layout.normalized_distance(6, centered, 0.0), Some(1.0));
    }
}
