use anyhow::Context;
use clap::Parser;
use relm4::prelude::*;
use std::path::PathBuf;
use vitrine::config;
use vitrine::gui::app::{AppInit, AppModel};
use vitrine::sys::runtime;
use vitrine_core::{Carousel, Layout, SoftEngine, TrackLayout};

#[derive(Parser, Debug)]
#[command(name = "vitrine", version, about = "A swipeable card carousel")]
struct Cli {
    /// Config file to use instead of the per-user one
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Card layout, overriding `animation.layout` (linear or arc)
    #[arg(short, long)]
    layout: Option<Layout>,
    /// Index of the card to show first
    #[arg(short, long)]
    start: Option<usize>,
    /// Write the default config file and exit
    #[arg(long)]
    init: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config_path = match cli.config {
        Some(path) => path,
        None => config::get_config_path()?,
    };

    if cli.init {
        config::write_default_config(&config_path)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        println!("{}", config_path.display());
        return Ok(());
    }

    let mut config = config::load_or_setup(&config_path);
    if let Some(layout) = cli.layout {
        config.animation.layout = layout;
    }
    if cli.start.is_some() {
        config.start = cli.start;
    }

    let deck = config.deck(config_path.parent())?;
    let start = config.start_index(&deck);
    let carousel = Carousel::new(
        SoftEngine::new(),
        deck.len(),
        TrackLayout::default(),
        config.animation.clone(),
        start,
    )?;

    let (tx, rx) = async_channel::bounded(32);

    // Start Background Services
    runtime::start_background_services(tx, config_path.clone());

    let app = RelmApp::new("org.vitrine.Vitrine").with_args(Vec::new());

    app.run::<AppModel>(AppInit {
        carousel,
        deck,
        config,
        config_path,
        layout_override: cli.layout,
        events: rx,
    });
    Ok(())
}
