use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

use crate::*;

/// The player's position, coin inventory and travelled path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub position: LatLng,
    /// Collected coins; the last one collected is the first one deposited.
    pub coins: Vec<Coin>,
    pub path: Vec<LatLng>,
}

impl Player {
    pub fn new(start: LatLng) -> Self {
        Self {
            position: start,
            coins: Vec::new(),
            path: vec![start],
        }
    }

    pub fn coin_count(&self) -> usize {
        self.coins.len()
    }

    pub fn status(&self) -> String {
        match self.coins.len() {
            0 => "No coins yet...".to_string(),
            1 => "You have 1 coin".to_string(),
            count => format!("You have {} coins", count),
        }
    }
}

/// Every cache discovered so far, which of them are on screen, and the player.
#[derive(Clone, Debug)]
pub struct World {
    config: GameConfig,
    board: Board,
    caches: HashMap<Cell, Cache>,
    visible: HashSet<Cell>,
    player: Player,
}

impl World {
    /// Fresh world with the start neighbourhood already seeded.
    pub fn new(config: GameConfig) -> Self {
        Self::from_parts(config, Player::new(config.start), [])
    }

    /// Rebuilds a world from persisted parts. The caches are registered hidden, then the
    /// neighbourhood around the player is revealed.
    pub fn from_parts(
        config: GameConfig,
        player: Player,
        caches: impl IntoIterator<Item = Cache>,
    ) -> Self {
        let mut world = Self {
            config,
            board: Board::from_config(&config),
            caches: HashMap::new(),
            visible: HashSet::new(),
            player,
        };
        for cache in caches {
            let cell = *world.board.canonical_cell(cache.cell());
            if world.caches.insert(cell, cache).is_some() {
                log::warn!("Duplicate cache at {}, keeping the last one", cell);
            }
        }
        world.ensure_caches_near(world.player.position);
        world
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn cache(&self, cell: Cell) -> Option<&Cache> {
        self.caches.get(&cell)
    }

    pub fn caches(&self) -> impl Iterator<Item = &Cache> {
        self.caches.values()
    }

    pub fn cache_count(&self) -> usize {
        self.caches.len()
    }

    pub fn is_visible(&self, cell: Cell) -> bool {
        self.visible.contains(&cell)
    }

    pub fn visible_caches(&self) -> impl Iterator<Item = &Cache> {
        self.visible.iter().filter_map(|cell| self.caches.get(cell))
    }

    /// Coins held by caches plus coins held by the player.
    pub fn total_coins(&self) -> usize {
        self.caches.values().map(Cache::amount).sum::<usize>() + self.player.coin_count()
    }

    pub fn cell_bounds(&self, cell: Cell) -> CellBounds {
        self.board.cell_bounds(cell)
    }

    /// Centre of the cell a coin was minted in.
    pub fn coin_home(&self, coin: Coin) -> LatLng {
        self.board.cell_bounds(coin.home()).center()
    }

    /// Reveals known caches around `pos` and discovers new ones where the spawn test passes.
    /// Returns how many caches were newly discovered.
    pub fn ensure_caches_near(&mut self, pos: LatLng) -> usize {
        let mut spawned = 0;
        for cell in self.board.cells_near_position(pos) {
            let cell = *cell;
            if !self.caches.contains_key(&cell) {
                if !self.config.spawns_cache(cell) {
                    continue;
                }
                let cache = Cache::discover(cell, self.config.max_coins_per_cache);
                log::trace!("discovered cache at {} with {} coins", cell, cache.amount());
                self.caches.insert(cell, cache);
                spawned += 1;
            }
            self.visible.insert(cell);
        }
        log::debug!(
            "{} caches visible, {} new, {} known",
            self.visible.len(),
            spawned,
            self.caches.len()
        );
        spawned
    }

    /// Shows or hides a known cache. Returns whether visibility changed.
    pub fn set_visible(&mut self, cell: Cell, visible: bool) -> Result<bool> {
        if !self.caches.contains_key(&cell) {
            return Err(GameError::UnknownCache(cell));
        }
        Ok(if visible {
            self.visible.insert(cell)
        } else {
            self.visible.remove(&cell)
        })
    }

    pub fn hide_all(&mut self) {
        self.visible.clear();
    }

    /// Moves the player to `pos`, extending the path and refreshing which caches are in view.
    pub fn move_to(&mut self, pos: LatLng) {
        self.player.position = pos;
        self.player.path.push(pos);
        self.hide_all();
        self.ensure_caches_near(pos);
    }

    /// Moves the player one cell width in `direction`.
    pub fn step(&mut self, direction: Direction) -> LatLng {
        let (d_lat, d_lng) = direction.delta();
        let w = self.board.tile_width();
        let pos = self.player.position.offset(d_lat * w, d_lng * w);
        log::debug!("step {:?} to {:?}", direction, pos);
        self.move_to(pos);
        pos
    }

    /// Moves the first coin of the cache at `cell` into the player's inventory.
    pub fn collect(&mut self, cell: Cell) -> Result<Option<Coin>> {
        let cache = self
            .caches
            .get_mut(&cell)
            .ok_or(GameError::UnknownCache(cell))?;
        let coin = cache.take_coin();
        if let Some(coin) = coin {
            self.player.coins.push(coin);
        }
        Ok(coin)
    }

    /// Moves the player's most recently collected coin into the cache at `cell`.
    pub fn deposit(&mut self, cell: Cell) -> Result<Option<Coin>> {
        let cache = self
            .caches
            .get_mut(&cell)
            .ok_or(GameError::UnknownCache(cell))?;
        let coin = self.player.coins.pop();
        if let Some(coin) = coin {
            cache.give_coin(coin);
        }
        Ok(coin)
    }

    /// Forgets every cache and puts the player back at the start, then re-seeds the start
    /// neighbourhood.
    pub fn reset(&mut self) {
        self.caches.clear();
        self.visible.clear();
        self.player = Player::new(self.config.start);
        self.ensure_caches_near(self.config.start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Unit-width cells with the player in cell (0, 0).
    fn unit_config() -> GameConfig {
        GameConfig::new(LatLng::new(0.5, 0.5), 1., 4, 0.09, 30)
    }

    fn sorted_cells<'a>(caches: impl Iterator<Item = &'a Cache>) -> Vec<Cell> {
        let mut cells: Vec<Cell> = caches.map(Cache::cell).collect();
        cells.sort();
        cells
    }

    const UNIT_CACHES: [(Cell, usize); 5] = [
        (Cell::new(-4, 3), 25),
        (Cell::new(-3, 0), 19),
        (Cell::new(-1, -4), 21),
        (Cell::new(-1, 3), 6),
        (Cell::new(1, 1), 11),
    ];

    #[test]
    fn new_world_seeds_start_neighborhood() {
        let world = World::new(unit_config());

        assert_eq!(
            sorted_cells(world.caches()),
            UNIT_CACHES.iter().map(|&(cell, _)| cell).collect::<Vec<_>>()
        );
        for (cell, amount) in UNIT_CACHES {
            assert_eq!(world.cache(cell).map(Cache::amount), Some(amount));
            assert!(world.is_visible(cell));
        }
        assert_eq!(world.total_coins(), 82);
        assert_eq!(world.player().path, vec![LatLng::new(0.5, 0.5)]);
    }

    #[test]
    fn default_start_neighborhood_has_known_caches() {
        let world = World::new(GameConfig::default());

        assert_eq!(world.cache_count(), 23);
        assert_eq!(
            world.cache(Cell::new(369895, -1220635)).map(Cache::amount),
            Some(29)
        );
        assert_eq!(
            world.cache(Cell::new(369891, -1220626)).map(Cache::amount),
            Some(1)
        );
        assert!(world.cache(Cell::new(369894, -1220628)).is_none());
    }

    #[test]
    fn ensure_caches_near_is_idempotent() {
        let mut world = World::new(unit_config());
        let cell = Cell::new(1, 1);
        world.collect(cell).unwrap();
        world.collect(cell).unwrap();

        let spawned = world.ensure_caches_near(LatLng::new(0.5, 0.5));

        assert_eq!(spawned, 0);
        assert_eq!(world.cache_count(), 5);
        assert_eq!(world.cache(cell).map(Cache::amount), Some(9));
    }

    #[test]
    fn moving_away_hides_and_returning_reveals() {
        let mut world = World::new(unit_config());
        let cell = Cell::new(-4, 3);

        world.move_to(LatLng::new(100.5, 100.5));
        assert!(!world.is_visible(cell));
        assert!(world.cache(cell).is_some());

        world.move_to(LatLng::new(0.5, 0.5));
        assert!(world.is_visible(cell));
        assert_eq!(world.cache(cell).map(Cache::amount), Some(25));
        assert_eq!(world.player().path.len(), 3);
    }

    #[test]
    fn set_visible_does_not_touch_inventory() {
        let mut world = World::new(unit_config());
        let cell = Cell::new(-3, 0);

        assert_eq!(world.set_visible(cell, false), Ok(true));
        assert_eq!(world.set_visible(cell, false), Ok(false));
        assert!(!world.is_visible(cell));
        assert_eq!(world.cache(cell).map(Cache::amount), Some(19));
        assert_eq!(
            world.set_visible(Cell::new(0, 0), true),
            Err(GameError::UnknownCache(Cell::new(0, 0)))
        );
    }

    #[test]
    fn step_moves_one_cell() {
        let mut world = World::new(unit_config());

        world.step(Direction::North);
        world.step(Direction::East);
        world.step(Direction::East);

        assert_eq!(world.player().position, LatLng::new(1.5, 2.5));
        assert_eq!(
            world.player().path,
            vec![
                LatLng::new(0.5, 0.5),
                LatLng::new(1.5, 0.5),
                LatLng::new(1.5, 1.5),
                LatLng::new(1.5, 2.5),
            ]
        );
    }

    #[test]
    fn collect_then_deposit_is_lifo_on_player() {
        let mut world = World::new(unit_config());
        let a = Cell::new(1, 1);
        let b = Cell::new(-1, 3);

        let first = world.collect(a).unwrap();
        let second = world.collect(b).unwrap();
        assert_eq!(first, Some(Coin::new(a, 0)));
        assert_eq!(second, Some(Coin::new(b, 0)));

        assert_eq!(world.deposit(a).unwrap(), second);
        assert_eq!(world.player().coins, vec![Coin::new(a, 0)]);
        assert_eq!(world.cache(a).and_then(|cache| cache.coins().last().copied()), second);
    }

    #[test]
    fn collect_from_empty_cache_returns_none() {
        let mut world = World::new(unit_config());
        let cell = Cell::new(-1, 3);
        for _ in 0..6 {
            assert!(world.collect(cell).unwrap().is_some());
        }
        let held = world.player().coins.clone();

        assert_eq!(world.collect(cell).unwrap(), None);
        assert_eq!(world.player().coins, held);
    }

    #[test]
    fn deposit_with_empty_inventory_returns_none() {
        let mut world = World::new(unit_config());
        let cell = Cell::new(1, 1);
        let before = world.cache(cell).cloned();

        assert_eq!(world.deposit(cell).unwrap(), None);
        assert_eq!(world.cache(cell).cloned(), before);
    }

    #[test]
    fn unknown_cache_is_an_error() {
        let mut world = World::new(unit_config());
        let cell = Cell::new(0, 0);

        assert_eq!(world.collect(cell), Err(GameError::UnknownCache(cell)));
        assert_eq!(world.deposit(cell), Err(GameError::UnknownCache(cell)));
    }

    #[test]
    fn reset_matches_fresh_world() {
        let config = unit_config();
        let fresh = World::new(config);
        let mut world = World::new(config);
        world.collect(Cell::new(1, 1)).unwrap();
        world.step(Direction::South);
        world.move_to(LatLng::new(40.5, -3.5));

        world.reset();

        assert_eq!(world.player(), fresh.player());
        assert_eq!(sorted_cells(world.caches()), sorted_cells(fresh.caches()));
        assert_eq!(sorted_cells(world.visible_caches()), sorted_cells(fresh.visible_caches()));
        for cache in fresh.caches() {
            assert_eq!(world.cache(cache.cell()), Some(cache));
        }
    }

    #[test]
    fn coin_home_is_center_of_minting_cell() {
        let world = World::new(unit_config());

        assert_eq!(world.coin_home(Coin::new(Cell::new(-4, 3), 2)), LatLng::new(-3.5, 3.5));
    }

    #[test]
    fn coin_home_of_extreme_cell_does_not_overflow() {
        let world = World::new(unit_config());

        let home = world.coin_home(Coin::new(Cell::new(Coord::MAX, Coord::MIN), 0));

        assert_eq!(home, LatLng::new(f64::from(Coord::MAX) + 0.5, f64::from(Coord::MIN) + 0.5));
    }

    #[test]
    fn restored_caches_outside_view_stay_hidden() {
        let config = unit_config();
        let far = Cache::new(Cell::new(50, 50), [Coin::new(Cell::new(50, 50), 0)]);

        let world = World::from_parts(config, Player::new(config.start), [far]);

        assert_eq!(world.cache_count(), 6);
        assert!(!world.is_visible(Cell::new(50, 50)));
        assert!(world.is_visible(Cell::new(1, 1)));
    }

    #[derive(Copy, Clone, Debug)]
    enum Transfer {
        Collect(usize),
        Deposit(usize),
    }

    fn transfer() -> impl Strategy<Value = Transfer> {
        prop_oneof![
            (0..UNIT_CACHES.len()).prop_map(Transfer::Collect),
            (0..UNIT_CACHES.len()).prop_map(Transfer::Deposit),
        ]
    }

    proptest! {
        #[test]
        fn transfers_conserve_coins(ops in prop::collection::vec(transfer(), 0..200)) {
            let mut world = World::new(unit_config());
            let total = world.total_coins();

            for op in ops {
                let held = world.player().coin_count();
                let moved = match op {
                    Transfer::Collect(idx) => {
                        world.collect(UNIT_CACHES[idx].0).unwrap().map(|_| held + 1)
                    }
                    Transfer::Deposit(idx) => {
                        world.deposit(UNIT_CACHES[idx].0).unwrap().map(|_| held - 1)
                    }
                };
                prop_assert_eq!(world.player().coin_count(), moved.unwrap_or(held));
                prop_assert_eq!(world.total_coins(), total);
            }
        }
    }
}
