use crate::events::AppEvent;
use async_channel::Sender;
use directories::ProjectDirs;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use vitrine_core::{AnimationConfig, Card, Deck, DeckError, TrackLayout};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CardConfig {
    /// Falls back to the card's position in the deck.
    pub id: Option<String>,
    pub image: PathBuf,
    pub title: String,
    #[serde(default)]
    pub author: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TrackConfig {
    pub card_width: f64,
    pub card_height: f64,
    pub gap: f64,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            card_width: 260.0,
            card_height: 360.0,
            gap: 28.0,
        }
    }
}

impl TrackConfig {
    pub fn layout(&self, count: usize, viewport_width: f64) -> TrackLayout {
        TrackLayout::uniform(count, self.card_width, self.gap, viewport_width)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub cards: Vec<CardConfig>,
    #[serde(default)]
    pub start: Option<usize>,
    #[serde(default)]
    pub track: TrackConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
}

impl Config {
    /// Builds the deck, resolving relative image paths against `base`.
    pub fn deck(&self, base: Option<&Path>) -> Result<Deck, DeckError> {
        let cards = self
            .cards
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let image = match base {
                    Some(dir) if c.image.is_relative() => dir.join(&c.image),
                    _ => c.image.clone(),
                };
                let id = c.id.clone().unwrap_or_else(|| format!("card-{}", i));
                Card::new(id, image, c.title.clone(), c.author.clone())
            })
            .collect();
        Deck::new(cards)
    }

    /// The configured start card, or the middle one when unset or out of range.
    pub fn start_index(&self, deck: &Deck) -> usize {
        match self.start {
            Some(i) if i < deck.len() => i,
            Some(i) => {
                log::warn!(
                    "Start index {} is outside a deck of {}, using the middle card",
                    i,
                    deck.len()
                );
                deck.middle()
            }
            None => deck.middle(),
        }
    }

    fn demo() -> Self {
        parse(DEFAULT_CONFIG).unwrap_or_default()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "vitrine", "vitrine").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let s = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(environment())
        .build()?;

    Ok(s.try_deserialize()?)
}

/// `VITRINE_<SECTION>__<KEY>`, e.g. `VITRINE_ANIMATION__LAYOUT=arc`.
fn environment() -> config::Environment {
    config::Environment::with_prefix("VITRINE")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

pub fn parse(source: &str) -> Result<Config, ConfigError> {
    let s = config::Config::builder()
        .add_source(config::File::from_str(source, config::FileFormat::Toml))
        .build()?;

    Ok(s.try_deserialize()?)
}

/// Loads the user's config, falling back to the bundled demo deck when the
/// file is missing, broken or lists no cards.
pub fn load_or_setup(path: &Path) -> Config {
    if !path.exists() {
        log::info!("No config at {}, showing the demo deck", path.display());
        return Config::demo();
    }

    match load_config(path) {
        Ok(c) if c.cards.is_empty() => {
            log::warn!("{} lists no cards, showing the demo deck", path.display());
            Config {
                cards: Config::demo().cards,
                ..c
            }
        }
        Ok(c) => c,
        Err(e) => {
            log::error!("Failed to load {}: {}", path.display(), e);
            Config::demo()
        }
    }
}

pub fn write_default_config(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(path, DEFAULT_CONFIG)?;
    }
    Ok(())
}

pub const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

pub async fn run_async_watcher(tx: Sender<AppEvent>, config_path: PathBuf) {
    let config_dir = match config_path.parent() {
        Some(p) => p.to_path_buf(),
        None => return,
    };

    if let Err(e) = fs_err::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", ConfigError::from(e));
            return;
        }
    };

    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch config directory: {}", e);
        return;
    }

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) => {
                let touches_config = matches!(
                    event.kind,
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                ) && event.paths.iter().any(|p| p == &config_path);

                if touches_config && tx.send(AppEvent::ConfigReload).await.is_err() {
                    break;
                }
            }
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
}
