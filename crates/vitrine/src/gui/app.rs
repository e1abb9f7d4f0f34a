use crate::config::{self, CardConfig, Config, TrackConfig};
use crate::events::AppEvent;
use crate::gui::art::Gallery;
use crate::gui::stage::Stage;
use crate::gui::theme::{self, ThemeColors};
use gtk::prelude::*;
use gtk4 as gtk;
use relm4::prelude::*;
use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::Rc;
use vitrine_core::{Carousel, Deck, Layout, PointerId, SoftEngine};

pub struct AppInit {
    pub carousel: Carousel<SoftEngine>,
    pub deck: Deck,
    pub config: Config,
    pub config_path: PathBuf,
    /// Layout forced from the command line; survives config reloads.
    pub layout_override: Option<Layout>,
    pub events: async_channel::Receiver<AppEvent>,
}

pub struct AppModel {
    pub carousel: Rc<RefCell<Carousel<SoftEngine>>>,
    pub track: TrackConfig,
    pub cards: Vec<CardConfig>,
    pub config_path: PathBuf,
    pub layout_override: Option<Layout>,
    pub root: gtk::ApplicationWindow,
    pub drawing_area: gtk::DrawingArea,
    pub dots: Vec<gtk::Button>,
    pub tick: Option<gtk::TickCallbackId>,
}

#[derive(Debug)]
pub enum AppMsg {
    Next,
    Prev,
    GoTo(usize),
    PointerDown { pointer: PointerId, x: f64 },
    PointerMove { pointer: PointerId, x: f64 },
    PointerUp { pointer: PointerId, x: Option<f64> },
    PointerCancel { pointer: PointerId },
    Resize(i32),
    ToggleLayout,
    ConfigReload,
    Quit,
}

impl From<AppEvent> for AppMsg {
    fn from(event: AppEvent) -> Self {
        match event {
            AppEvent::ConfigReload => AppMsg::ConfigReload,
        }
    }
}

/// Milliseconds on the same monotonic clock GTK frame times use.
fn now_ms() -> f64 {
    glib::monotonic_time() as f64 / 1000.0
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = AppInit;
    type Input = AppMsg;
    type Output = ();

    view! {
        #[root]
        #[name = "window"]
        gtk::ApplicationWindow {
            set_title: Some("Vitrine"),
            set_default_size: (1280, 760),
            add_css_class: "vitrine-window",

            add_controller = gtk::EventControllerKey {
                connect_key_pressed[sender] => move |_, key, _, _| {
                    let msg = match key {
                        gtk::gdk::Key::Left => AppMsg::Prev,
                        gtk::gdk::Key::Right => AppMsg::Next,
                        gtk::gdk::Key::l => AppMsg::ToggleLayout,
                        gtk::gdk::Key::Escape => AppMsg::Quit,
                        _ => return glib::Propagation::Proceed,
                    };
                    sender.input(msg);
                    glib::Propagation::Stop
                }
            },

            gtk::Box {
                set_orientation: gtk::Orientation::Vertical,

                #[name = "drawing_area"]
                gtk::DrawingArea {
                    set_hexpand: true,
                    set_vexpand: true,
                    add_css_class: "vitrine-stage",
                },

                gtk::Box {
                    set_orientation: gtk::Orientation::Horizontal,
                    set_halign: gtk::Align::Center,
                    set_spacing: 12,
                    add_css_class: "vitrine-controls",

                    gtk::Button {
                        set_icon_name: "go-previous-symbolic",
                        set_tooltip_text: Some("Previous card"),
                        connect_clicked => AppMsg::Prev,
                    },

                    #[name = "dots"]
                    gtk::Box {
                        set_orientation: gtk::Orientation::Horizontal,
                        set_valign: gtk::Align::Center,
                        set_spacing: 8,
                    },

                    gtk::Button {
                        set_icon_name: "go-next-symbolic",
                        set_tooltip_text: Some("Next card"),
                        connect_clicked => AppMsg::Next,
                    },
                }
            }
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let AppInit {
            carousel,
            deck,
            config,
            config_path,
            layout_override,
            events,
        } = init;

        theme::load_css();

        let model = AppModel {
            carousel: Rc::new(RefCell::new(carousel)),
            track: config.track,
            cards: config.cards,
            config_path,
            layout_override,
            root: root.clone(),
            drawing_area: gtk::DrawingArea::default(),
            dots: Vec::new(),
            tick: None,
        };

        let widgets = view_output!();

        let mut model = model;
        model.drawing_area = widgets.drawing_area.clone();

        for (i, card) in deck.iter().enumerate() {
            let dot = gtk::Button::new();
            dot.add_css_class("vitrine-dot");
            dot.set_tooltip_text(Some(card.title.as_str()));
            let sender = sender.clone();
            dot.connect_clicked(move |_| sender.input(AppMsg::GoTo(i)));
            widgets.dots.append(&dot);
            model.dots.push(dot);
        }
        model.sync_dots();

        let gallery = Rc::new(Gallery::load(deck, &model.track));
        let carousel_draw = model.carousel.clone();
        let track = model.track;
        widgets
            .drawing_area
            .set_draw_func(move |drawing_area, cr, width, height| {
                let style_context = drawing_area.style_context();
                let colors = ThemeColors::from_context(&style_context);
                let carousel = carousel_draw.borrow();
                let stage = Stage {
                    carousel: &carousel,
                    gallery: &gallery,
                    track: &track,
                    colors: &colors,
                };
                if let Err(e) = stage.draw(cr, width as f64, height as f64) {
                    log::error!("Drawing error: {}", e);
                }
            });

        {
            let sender = sender.clone();
            widgets.drawing_area.connect_resize(move |_, width, _| {
                sender.input(AppMsg::Resize(width));
            });
        }

        init_drag(&widgets.drawing_area, &sender);

        let carousel_tick = model.carousel.clone();
        model.tick = Some(
            widgets
                .drawing_area
                .add_tick_callback(move |drawing_area, _| {
                    carousel_tick.borrow_mut().tick(now_ms());
                    drawing_area.queue_draw();
                    glib::ControlFlow::Continue
                }),
        );

        let sender_clone = sender.clone();
        relm4::spawn(async move {
            while let Ok(event) = events.recv().await {
                sender_clone.input(AppMsg::from(event));
            }
        });

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, _sender: ComponentSender<Self>) {
        let now = now_ms();
        let carousel = self.carousel.clone();
        let mut carousel = carousel.borrow_mut();

        match msg {
            AppMsg::Next => carousel.next(),
            AppMsg::Prev => carousel.prev(),
            AppMsg::GoTo(index) => carousel.go_to(index),
            AppMsg::PointerDown { pointer, x } => {
                carousel.pointer_down(pointer, x, now);
            }
            AppMsg::PointerMove { pointer, x } => {
                carousel.pointer_move(pointer, x, now);
            }
            AppMsg::PointerUp { pointer, x } => {
                if let Some(swipe) = carousel.pointer_up(pointer, x, now) {
                    log::debug!("Drag released as {:?}", swipe);
                }
            }
            AppMsg::PointerCancel { pointer } => {
                carousel.pointer_cancel(pointer, now);
            }
            AppMsg::Resize(width) => {
                let layout = self.track.layout(carousel.len(), width as f64);
                carousel.resize(layout, now);
            }
            AppMsg::ToggleLayout => {
                let layout = match carousel.config().layout {
                    Layout::Linear => Layout::Arc,
                    Layout::Arc => Layout::Linear,
                };
                log::info!("Switching to the {} layout", layout);
                carousel.set_layout_mode(layout);
            }
            AppMsg::ConfigReload => match config::load_config(&self.config_path) {
                Ok(new_config) => {
                    if !new_config.cards.is_empty() && new_config.cards != self.cards {
                        log::warn!("The card list changed on disk; restart to show it");
                    }
                    let mut animation = new_config.animation;
                    if let Some(layout) = self.layout_override {
                        animation.layout = layout;
                    }
                    carousel.set_config(animation);
                    log::info!("Configuration reloaded");
                }
                Err(e) => log::error!("Failed to reload config: {}", e),
            },
            AppMsg::Quit => {
                self.root.close();
                return;
            }
        }

        drop(carousel);
        self.sync_dots();
        self.drawing_area.queue_draw();
    }

    fn shutdown(&mut self, _widgets: &mut Self::Widgets, _output: relm4::Sender<Self::Output>) {
        if let Some(tick) = self.tick.take() {
            tick.remove();
        }
    }
}

impl AppModel {
    fn sync_dots(&self) {
        let current = self.carousel.borrow().state().current_index;
        for (i, dot) in self.dots.iter().enumerate() {
            if i == current {
                dot.add_css_class("active");
            } else {
                dot.remove_css_class("active");
            }
        }
    }
}

/// Feeds drags on the stage into the carousel. The pointer that began the
/// drag is remembered so the end and cancel signals report the same id.
fn init_drag(area: &gtk::DrawingArea, sender: &ComponentSender<AppModel>) {
    let drag = gtk::GestureDrag::new();
    drag.set_button(0);
    let active: Rc<Cell<Option<PointerId>>> = Rc::default();

    {
        let sender = sender.clone();
        let active = active.clone();
        drag.connect_drag_begin(move |gesture, x, _| {
            let pointer = PointerId::new(gesture.current_button());
            active.set(Some(pointer));
            sender.input(AppMsg::PointerDown { pointer, x });
        });
    }
    {
        let sender = sender.clone();
        let active = active.clone();
        drag.connect_drag_update(move |gesture, dx, _| {
            if let (Some(pointer), Some((start_x, _))) = (active.get(), gesture.start_point()) {
                sender.input(AppMsg::PointerMove {
                    pointer,
                    x: start_x + dx,
                });
            }
        });
    }
    {
        let sender = sender.clone();
        let active = active.clone();
        drag.connect_drag_end(move |gesture, dx, _| {
            if let Some(pointer) = active.take() {
                let x = gesture.start_point().map(|(start_x, _)| start_x + dx);
                sender.input(AppMsg::PointerUp { pointer, x });
            }
        });
    }
    {
        let sender = sender.clone();
        drag.connect_cancel(move |_, _| {
            if let Some(pointer) = active.take() {
                sender.input(AppMsg::PointerCancel { pointer });
            }
        });
    }

    area.add_controller(drag);
}
