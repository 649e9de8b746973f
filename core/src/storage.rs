use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::*;

/// Value stored under a fixed key.
pub trait StorageKey {
    const KEY: &'static str;
}

/// Flat string key-value store, such as browser local storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    fn remove(&mut self, key: &str);

    /// Reads and decodes `T`. Missing and malformed values both come back as `None`.
    fn load<T: StorageKey + DeserializeOwned>(&self) -> Option<T>
    where
        Self: Sized,
    {
        let raw = self.get(T::KEY)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                log::warn!("Ignoring malformed {}: {}", T::KEY, err);
                None
            }
        }
    }

    fn save<T: StorageKey + Serialize>(&mut self, value: &T) -> Result<()>
    where
        Self: Sized,
    {
        let raw = encode(value)?;
        self.set(T::KEY, &raw)
    }

    fn forget<T: StorageKey>(&mut self)
    where
        Self: Sized,
    {
        self.remove(T::KEY);
    }
}

/// In-memory store, for tests and headless use.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoredCoinCount(pub usize);

impl StorageKey for StoredCoinCount {
    const KEY: &'static str = "geocoin:player:coin-count:v1";
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoredInventory(pub Vec<Coin>);

impl StorageKey for StoredInventory {
    const KEY: &'static str = "geocoin:player:inventory:v1";
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoredPosition(pub LatLng);

impl StorageKey for StoredPosition {
    const KEY: &'static str = "geocoin:player:position:v1";
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoredPath(pub Vec<LatLng>);

impl StorageKey for StoredPath {
    const KEY: &'static str = "geocoin:player:path:v1";
}

/// Mementos by cell key (`"i,j"`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoredCaches(pub BTreeMap<String, Memento>);

impl StorageKey for StoredCaches {
    const KEY: &'static str = "geocoin:caches:v1";
}

fn encode<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|err| GameError::Storage(err.to_string()))
}

fn player_entries(player: &Player) -> Result<[(&'static str, String); 4]> {
    Ok([
        (StoredCoinCount::KEY, encode(&StoredCoinCount(player.coin_count()))?),
        (StoredInventory::KEY, encode(&StoredInventory(player.coins.clone()))?),
        (StoredPosition::KEY, encode(&StoredPosition(player.position))?),
        (StoredPath::KEY, encode(&StoredPath(player.path.clone()))?),
    ])
}

fn write_all<S: KeyValueStore>(
    store: &mut S,
    entries: impl IntoIterator<Item = (&'static str, String)>,
) -> Result<()> {
    for (key, raw) in entries {
        store.set(key, &raw)?;
    }
    Ok(())
}

pub fn save_player<S: KeyValueStore>(store: &mut S, player: &Player) -> Result<()> {
    let entries = player_entries(player)?;
    write_all(store, entries)
}

pub fn save_cache<S: KeyValueStore>(store: &mut S, cache: &Cache) -> Result<()> {
    let mut caches: StoredCaches = store.load().unwrap_or_default();
    caches.0.insert(cache.cell().key(), cache.snapshot());
    store.save(&caches)
}

/// Writes the player and one changed cache after a coin moved between them. Every value is
/// encoded before the first write, and the player is written before the cache.
pub fn save_transfer<S: KeyValueStore>(store: &mut S, player: &Player, cache: &Cache) -> Result<()> {
    let mut caches: StoredCaches = store.load().unwrap_or_default();
    caches.0.insert(cache.cell().key(), cache.snapshot());
    let player = player_entries(player)?;
    let caches = (StoredCaches::KEY, encode(&caches)?);
    write_all(store, player.into_iter().chain([caches]))
}

pub fn save_world<S: KeyValueStore>(store: &mut S, world: &World) -> Result<()> {
    save_player(store, world.player())?;
    let caches = world
        .caches()
        .map(|cache| (cache.cell().key(), cache.snapshot()))
        .collect();
    store.save(&StoredCaches(caches))
}

pub fn clear<S: KeyValueStore>(store: &mut S) {
    store.forget::<StoredCoinCount>();
    store.forget::<StoredInventory>();
    store.forget::<StoredPosition>();
    store.forget::<StoredPath>();
    store.forget::<StoredCaches>();
}

/// Rebuilds the world from `store`. Every value is read independently: anything missing or
/// malformed falls back to its fresh-game value, and bad cache entries are skipped.
pub fn load_world<S: KeyValueStore>(store: &S, config: GameConfig) -> World {
    let board = Board::from_config(&config);
    let mut player = Player::new(config.start);
    match store.load::<StoredPosition>() {
        Some(StoredPosition(position)) if position.is_on_map() => player.position = position,
        Some(StoredPosition(position)) => log::warn!("Ignoring stored position {:?}", position),
        None => {}
    }
    player.path = match store.load::<StoredPath>() {
        Some(StoredPath(path)) => {
            let stored = path.len();
            let path: Vec<LatLng> = path.into_iter().filter(|pos| pos.is_on_map()).collect();
            if path.len() != stored {
                log::warn!("Dropped {} stored path points", stored - path.len());
            }
            path
        }
        None => Vec::new(),
    };
    if player.path.is_empty() {
        player.path.push(player.position);
    }
    if let Some(StoredInventory(coins)) = store.load::<StoredInventory>() {
        let stored = coins.len();
        player.coins = coins
            .into_iter()
            .filter(|coin| board.is_on_map(coin.home()))
            .collect();
        if player.coins.len() != stored {
            log::warn!("Dropped {} stored coins minted off the map", stored - player.coins.len());
        }
    }
    if let Some(StoredCoinCount(count)) = store.load::<StoredCoinCount>() {
        if count != player.coin_count() {
            log::warn!(
                "Stored coin count {} does not match inventory of {}",
                count,
                player.coin_count()
            );
        }
    }

    let StoredCaches(entries) = store.load::<StoredCaches>().unwrap_or_default();
    let caches = entries.iter().filter_map(|(key, memento)| {
        let cell = match key.parse::<Cell>() {
            Ok(cell) if board.is_on_map(cell) => cell,
            Ok(cell) => {
                log::warn!("Skipping stored cache off the map at {}", cell);
                return None;
            }
            Err(err) => {
                log::warn!("Skipping stored cache: {}", err);
                return None;
            }
        };
        let mut cache = Cache::empty(cell);
        match cache.restore(memento) {
            Ok(()) => Some(cache),
            Err(err) => {
                log::warn!("Skipping stored cache at {}: {}", cell, err);
                None
            }
        }
    });

    World::from_parts(config, player, caches)
}
