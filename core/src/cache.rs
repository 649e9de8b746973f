use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::*;

/// Opaque serialized snapshot of a cache's coins, in order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Memento(String);

impl Memento {
    pub fn encode(coins: &[Coin]) -> Self {
        Self(serde_json::to_string(coins).expect("coins serialize to JSON"))
    }

    pub fn decode(&self) -> Result<Vec<Coin>> {
        serde_json::from_str(&self.0).map_err(|err| GameError::MalformedMemento(err.to_string()))
    }

    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Coin inventory located at a cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Cache {
    cell: Cell,
    coins: VecDeque<Coin>,
}

impl Cache {
    pub fn new(cell: Cell, coins: impl IntoIterator<Item = Coin>) -> Self {
        Self {
            cell,
            coins: coins.into_iter().collect(),
        }
    }

    pub fn empty(cell: Cell) -> Self {
        Self::new(cell, [])
    }

    /// Cache as first discovered: `floor(luck("i,j,initialValue") * max_coins)` coins minted in
    /// `cell` with serials counting up from zero.
    pub fn discover(cell: Cell, max_coins: u32) -> Self {
        let count = initial_coin_count(cell, max_coins);
        Self::new(cell, (0..count).map(|serial| Coin::new(cell, serial)))
    }

    pub fn cell(&self) -> Cell {
        self.cell
    }

    pub fn amount(&self) -> usize {
        self.coins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    pub fn coins(&self) -> impl Iterator<Item = &Coin> {
        self.coins.iter()
    }

    pub fn take_coin(&mut self) -> Option<Coin> {
        self.coins.pop_front()
    }

    pub fn give_coin(&mut self, coin: Coin) {
        self.coins.push_back(coin);
    }

    pub fn snapshot(&self) -> Memento {
        let coins: Vec<Coin> = self.coins.iter().copied().collect();
        Memento::encode(&coins)
    }

    /// Replaces the inventory with the memento's contents. A malformed memento leaves the
    /// cache untouched.
    pub fn restore(&mut self, memento: &Memento) -> Result<()> {
        self.coins = memento.decode()?.into();
        Ok(())
    }
}

pub fn initial_coin_count(cell: Cell, max_coins: u32) -> u32 {
    let key = format!("{},initialValue", cell.key());
    (luck(&key) * f64::from(max_coins)).floor() as u32
}
