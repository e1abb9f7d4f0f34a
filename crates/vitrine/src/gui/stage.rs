use super::art::Gallery;
use super::theme::ThemeColors;
use crate::config::TrackConfig;
use cairo::Context;
use gdk_pixbuf::Pixbuf;
use gdk4::prelude::*;
use palette::Srgba;
use std::f64::consts::PI;
use vitrine_core::{Carousel, ContentView, SoftEngine};

const CARD_RADIUS: f64 = 18.0;
/// Vertical position of the card row's center, as a share of the height.
const ROW_CENTER: f64 = 0.42;
const TITLE_GAP: f64 = 56.0;
const CAPTION_GAP: f64 = 30.0;
const TITLE_SIZE: f64 = 26.0;
const CAPTION_SIZE: f64 = 15.0;

/// One frame of the carousel, drawn from whatever the tweens currently hold.
pub struct Stage<'a> {
    pub carousel: &'a Carousel<SoftEngine>,
    pub gallery: &'a Gallery,
    pub track: &'a TrackConfig,
    pub colors: &'a ThemeColors,
}

impl Stage<'_> {
    pub fn draw(&self, cr: &Context, width: f64, height: f64) -> Result<(), cairo::Error> {
        let content = self.carousel.animator().content();
        let row_y = height * ROW_CENTER;

        self.draw_backdrop(cr, &content, width, height)?;
        self.draw_cards(cr, width, row_y)?;
        self.draw_content(cr, &content, width, row_y + self.track.card_height / 2.0)
    }

    fn draw_backdrop(
        &self,
        cr: &Context,
        content: &ContentView,
        width: f64,
        height: f64,
    ) -> Result<(), cairo::Error> {
        set_color(cr, self.colors.backdrop);
        cr.paint()?;

        for layer in &content.backgrounds {
            let pixbuf = layer
                .index
                .and_then(|i| self.gallery.art(i))
                .and_then(|art| art.backdrop.as_ref());
            if let Some(pixbuf) = pixbuf
                && layer.opacity > 0.0
            {
                paint_cover(cr, pixbuf, 0.0, 0.0, width, height, layer.opacity)?;
            }
        }

        set_color(cr, self.colors.scrim);
        cr.paint()
    }

    fn draw_cards(&self, cr: &Context, width: f64, row_y: f64) -> Result<(), cairo::Error> {
        let animator = self.carousel.animator();
        let offset = animator.track_offset();
        let (card_w, card_h) = (self.track.card_width, self.track.card_height);

        for (i, slot) in animator.layout().cards.iter().enumerate() {
            let t = animator.card_transform(i);
            let cx = offset + slot.center() + t.x;
            // off screen even at full scale
            if cx + card_w < 0.0 || cx - card_w > width {
                continue;
            }

            cr.save()?;
            cr.translate(cx, row_y + t.y);
            cr.rotate(t.rotation.to_radians());
            cr.scale(t.scale, t.scale);
            rounded_rect(cr, -card_w / 2.0, -card_h / 2.0, card_w, card_h, CARD_RADIUS);
            match self.gallery.art(i).and_then(|art| art.image.as_ref()) {
                Some(pixbuf) => {
                    cr.clip();
                    paint_cover(cr, pixbuf, -card_w / 2.0, -card_h / 2.0, card_w, card_h, 1.0)?;
                }
                None => {
                    set_color(cr, self.colors.placeholder);
                    cr.fill()?;
                }
            }
            cr.restore()?;
        }
        Ok(())
    }

    fn draw_content(
        &self,
        cr: &Context,
        content: &ContentView,
        width: f64,
        row_bottom: f64,
    ) -> Result<(), cairo::Error> {
        let Some(card) = self.gallery.card(content.index) else {
            return Ok(());
        };
        let title_y = row_bottom + TITLE_GAP + content.title_y;
        let caption_y = row_bottom + TITLE_GAP + CAPTION_GAP + content.caption_y;

        draw_text(
            cr,
            &card.title,
            width / 2.0,
            title_y,
            TITLE_SIZE,
            cairo::FontWeight::Bold,
            faded(self.colors.title, content.title_opacity),
        )?;
        draw_text(
            cr,
            &card.author,
            width / 2.0,
            caption_y,
            CAPTION_SIZE,
            cairo::FontWeight::Normal,
            faded(self.colors.caption, content.caption_opacity),
        )
    }
}

fn set_color(cr: &Context, color: Srgba<f64>) {
    let (r, g, b, a) = color.into_components();
    cr.set_source_rgba(r, g, b, a);
}

fn faded(color: Srgba<f64>, opacity: f64) -> Srgba<f64> {
    let (r, g, b, a) = color.into_components();
    Srgba::new(r, g, b, a * opacity)
}

fn rounded_rect(cr: &Context, x: f64, y: f64, w: f64, h: f64, r: f64) {
    cr.new_sub_path();
    cr.arc(x + w - r, y + r, r, -PI / 2.0, 0.0);
    cr.arc(x + w - r, y + h - r, r, 0.0, PI / 2.0);
    cr.arc(x + r, y + h - r, r, PI / 2.0, PI);
    cr.arc(x + r, y + r, r, PI, 1.5 * PI);
    cr.close_path();
}

/// Scales `pixbuf` to cover the box, cropping the overflow.
fn paint_cover(
    cr: &Context,
    pixbuf: &Pixbuf,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    alpha: f64,
) -> Result<(), cairo::Error> {
    let (pw, ph) = (pixbuf.width() as f64, pixbuf.height() as f64);
    if pw <= 0.0 || ph <= 0.0 {
        return Ok(());
    }
    let scale = (w / pw).max(h / ph);

    cr.save()?;
    cr.rectangle(x, y, w, h);
    cr.clip();
    cr.translate(x + (w - pw * scale) / 2.0, y + (h - ph * scale) / 2.0);
    cr.scale(scale, scale);
    cr.set_source_pixbuf(pixbuf, 0.0, 0.0);
    cr.source().set_filter(cairo::Filter::Good);
    cr.paint_with_alpha(alpha)?;
    cr.restore()
}

fn draw_text(
    cr: &Context,
    text: &str,
    center_x: f64,
    baseline: f64,
    size: f64,
    weight: cairo::FontWeight,
    color: Srgba<f64>,
) -> Result<(), cairo::Error> {
    if color.alpha <= 0.0 || text.is_empty() {
        return Ok(());
    }
    set_color(cr, color);
    cr.select_font_face("Sans", cairo::FontSlant::Normal, weight);
    cr.set_font_size(size);
    if let Ok(ext) = cr.text_extents(text) {
        cr.move_to(center_x - ext.width() / 2.0 - ext.x_bearing(), baseline);
        cr.show_text(text)?;
    }
    Ok(())
}
