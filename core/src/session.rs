use serde::{Deserialize, Serialize};

use crate::*;

/// Everything the input surface can ask for.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    Move(Direction),
    ToggleTracking,
    PositionUpdate(LatLng),
    PositionError(String),
    Reset { confirmed: bool },
    Collect(Cell),
    Deposit(Cell),
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Outcome {
    Moved(LatLng),
    Collected(Coin),
    NothingToCollect,
    Deposited(Coin),
    NothingToDeposit,
    TrackingChanged(bool),
    Ignored,
    PositionUnavailable,
    Reset,
    ResetDeclined,
}

impl Outcome {
    pub const fn has_update(self) -> bool {
        use Outcome::*;
        match self {
            Moved(_) | Collected(_) | Deposited(_) | TrackingChanged(_) | Reset => true,
            NothingToCollect | NothingToDeposit | Ignored | PositionUnavailable | ResetDeclined => {
                false
            }
        }
    }
}

/// The world together with the store it is persisted to.
///
/// Each [`Command`] is applied and written out within a single [`Session::dispatch`] call.
#[derive(Debug)]
pub struct Session<S> {
    world: World,
    store: S,
    tracking: bool,
}

impl<S: KeyValueStore> Session<S> {
    /// Loads whatever `store` holds, falling back to a fresh world for anything missing.
    pub fn open(store: S, config: GameConfig) -> Self {
        let world = load_world(&store, config);
        log::debug!(
            "session opened at {:?} with {} known caches",
            world.player().position,
            world.cache_count()
        );
        Self {
            world,
            store,
            tracking: false,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    pub fn status(&self) -> String {
        self.world.player().status()
    }

    pub fn dispatch(&mut self, command: Command) -> Result<Outcome> {
        use Command::*;

        log::trace!("dispatch {:?}", command);
        match command {
            Move(direction) => {
                let pos = self.world.step(direction);
                save_player(&mut self.store, self.world.player())?;
                Ok(Outcome::Moved(pos))
            }
            ToggleTracking => {
                self.tracking = !self.tracking;
                log::debug!("tracking: {}", self.tracking);
                Ok(Outcome::TrackingChanged(self.tracking))
            }
            PositionUpdate(pos) if self.tracking && !pos.is_on_map() => {
                log::warn!("position unavailable: {:?} is off the map", pos);
                Ok(Outcome::PositionUnavailable)
            }
            PositionUpdate(pos) if self.tracking => {
                self.world.move_to(pos);
                save_player(&mut self.store, self.world.player())?;
                Ok(Outcome::Moved(pos))
            }
            PositionUpdate(pos) => {
                log::trace!("ignoring position {:?} while not tracking", pos);
                Ok(Outcome::Ignored)
            }
            PositionError(message) => {
                log::warn!("position unavailable: {}", message);
                Ok(Outcome::PositionUnavailable)
            }
            Reset { confirmed: false } => Ok(Outcome::ResetDeclined),
            Reset { confirmed: true } => {
                self.world.reset();
                clear(&mut self.store);
                log::debug!("reset to {:?}", self.world.player().position);
                Ok(Outcome::Reset)
            }
            Collect(cell) => match self.world.collect(cell)? {
                Some(coin) => {
                    self.persist_transfer(cell)?;
                    Ok(Outcome::Collected(coin))
                }
                None => Ok(Outcome::NothingToCollect),
            },
            Deposit(cell) => match self.world.deposit(cell)? {
                Some(coin) => {
                    self.persist_transfer(cell)?;
                    Ok(Outcome::Deposited(coin))
                }
                None => Ok(Outcome::NothingToDeposit),
            },
        }
    }

    fn persist_transfer(&mut self, cell: Cell) -> Result<()> {
        match self.world.cache(cell) {
            Some(cache) => save_transfer(&mut self.store, self.world.player(), cache),
            None => save_player(&mut self.store, self.world.player()),
        }
    }
}
