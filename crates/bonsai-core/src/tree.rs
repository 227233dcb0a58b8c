//! A player's bonsai: the tiles they have placed around the bud.
//!
//! This module contains:
//! - Tile and resource types
//! - The `Tree` map of placed tiles keyed by cell
//! - Legal move enumeration per tile type
//! - Tile-based scoring and cluster queries used by goal scoring

use crate::game::GameError;
use crate::hex::{Coord, Direction};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Player identifier, as assigned by the host
pub type PlayerId = u32;

/// Placeable tile types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TileType {
    Wood,
    Leaf,
    Flower,
    Fruit,
}

impl TileType {
    /// All tile types, in seat-bonus order
    pub const ALL: [TileType; 4] = [
        TileType::Wood,
        TileType::Leaf,
        TileType::Flower,
        TileType::Fruit,
    ];

    /// Points this tile is worth on its own (flowers are scored by exposure)
    pub fn base_points(&self) -> u32 {
        match self {
            TileType::Wood => 0,
            TileType::Leaf => 3,
            TileType::Flower => 0,
            TileType::Fruit => 7,
        }
    }
}

/// A resource slot on a card or placement allowance.
///
/// `Wild` stands for any tile type chosen by the player; it is never placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Resource {
    Wood,
    Leaf,
    Flower,
    Fruit,
    Wild,
}

impl Resource {
    /// The concrete tile type, or `None` for `Wild`
    pub fn tile(&self) -> Option<TileType> {
        match self {
            Resource::Wood => Some(TileType::Wood),
            Resource::Leaf => Some(TileType::Leaf),
            Resource::Flower => Some(TileType::Flower),
            Resource::Fruit => Some(TileType::Fruit),
            Resource::Wild => None,
        }
    }

    pub fn is_wild(&self) -> bool {
        matches!(self, Resource::Wild)
    }
}

impl From<TileType> for Resource {
    fn from(tile: TileType) -> Self {
        match tile {
            TileType::Wood => Resource::Wood,
            TileType::Leaf => Resource::Leaf,
            TileType::Flower => Resource::Flower,
            TileType::Fruit => Resource::Fruit,
        }
    }
}

/// A tile sitting in a tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedTile {
    #[serde(rename = "type")]
    pub tile_type: TileType,
    pub x: i32,
    pub y: i32,
    /// Presentation only (0-5); kept for replay fidelity
    #[serde(default)]
    pub rotation: u8,
}

impl PlacedTile {
    /// Create a new placed tile
    pub fn new(tile_type: TileType, x: i32, y: i32, rotation: u8) -> Self {
        Self {
            tile_type,
            x,
            y,
            rotation,
        }
    }

    /// The cell this tile occupies
    pub fn coord(&self) -> Coord {
        Coord::new(self.x, self.y)
    }
}

/// Legal cells for a tile type, with the rotations allowed at each cell
pub type LegalMoves = BTreeMap<String, Vec<Direction>>;

/// The tiles a player has placed, keyed by [`Coord::key`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tree {
    tiles: BTreeMap<String, PlacedTile>,
}

impl Tree {
    /// Create a tree holding only the bud
    pub fn new() -> Self {
        let bud = PlacedTile::new(TileType::Wood, 0, 0, 0);
        let mut tiles = BTreeMap::new();
        tiles.insert(bud.coord().key(), bud);
        Self { tiles }
    }

    /// Build a tree from tiles, e.g. for fixtures. The bud is added if missing.
    pub fn from_tiles(tiles: impl IntoIterator<Item = PlacedTile>) -> Result<Self, GameError> {
        let mut tree = Self::new();
        for tile in tiles {
            if tile.coord() == Coord::ORIGIN {
                continue;
            }
            tree.place(tile)?;
        }
        Ok(tree)
    }

    /// Number of tiles, bud included
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether the tree has no tiles (never true for a tree built by this crate)
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Iterate all placed tiles in key order
    pub fn tiles(&self) -> impl Iterator<Item = &PlacedTile> {
        self.tiles.values()
    }

    /// Tile at a cell, if any
    pub fn get(&self, coord: &Coord) -> Option<&PlacedTile> {
        self.tiles.get(&coord.key())
    }

    /// Tile type at a cell, if any
    pub fn tile_type_at(&self, coord: &Coord) -> Option<TileType> {
        self.get(coord).map(|t| t.tile_type)
    }

    pub fn is_occupied(&self, coord: &Coord) -> bool {
        self.tiles.contains_key(&coord.key())
    }

    /// Whether the bud is still in place
    pub fn has_bud(&self) -> bool {
        self.tile_type_at(&Coord::ORIGIN) == Some(TileType::Wood)
    }

    /// Count of tiles of a type
    pub fn count(&self, tile_type: TileType) -> usize {
        self.tiles().filter(|t| t.tile_type == tile_type).count()
    }

    /// Insert a tile. Legality is the caller's business; only occupancy and
    /// grid bounds are checked.
    pub fn place(&mut self, tile: PlacedTile) -> Result<(), GameError> {
        let cell = tile.coord();
        if !cell.is_on_grid() {
            return Err(GameError::Validation(format!("{} is off the grid", cell)));
        }
        let key = cell.key();
        if self.tiles.contains_key(&key) {
            return Err(GameError::DuplicateTile {
                x: tile.x,
                y: tile.y,
            });
        }
        self.tiles.insert(key, tile);
        Ok(())
    }

    /// Remove the tile at a cell. Tiles left disconnected stay in place.
    /// The bud can never be removed.
    pub fn remove(&mut self, coord: &Coord) -> Result<PlacedTile, GameError> {
        if *coord == Coord::ORIGIN {
            return Err(GameError::Validation("The bud cannot be removed".into()));
        }
        self.tiles
            .remove(&coord.key())
            .ok_or(GameError::TileNotFound {
                x: coord.x,
                y: coord.y,
            })
    }

    /// Check a tree that came from outside the engine: every key names its
    /// own tile's cell, no tile sits in the pot or off the grid, and the bud
    /// is in place.
    pub fn validate(&self) -> Result<(), GameError> {
        for (key, tile) in &self.tiles {
            let cell = tile.coord();
            if Coord::from_key(key) != Some(cell) {
                return Err(GameError::Validation(format!(
                    "key {:?} holds a tile at {}",
                    key, cell
                )));
            }
            if !cell.is_on_grid() || cell.is_pot() {
                return Err(GameError::Validation(format!(
                    "no tile may sit at {}",
                    cell
                )));
            }
        }
        if !self.has_bud() {
            return Err(GameError::Validation("the bud is missing".into()));
        }
        Ok(())
    }

    /// Tiles around a cell, with the direction they lie in
    pub fn occupied_neighbors(&self, coord: &Coord) -> Vec<(Direction, &PlacedTile)> {
        coord
            .neighbors()
            .into_iter()
            .filter_map(|(dir, cell)| self.get(&cell).map(|tile| (dir, tile)))
            .collect()
    }

    /// Vacant cells touching at least one tile
    pub fn frontier(&self) -> BTreeSet<Coord> {
        self.tiles()
            .flat_map(|tile| tile.coord().neighbors())
            .map(|(_, cell)| cell)
            .filter(|cell| !self.is_occupied(cell))
            .collect()
    }

    /// Legal cells for a tile type and, per cell, the rotations that face a
    /// qualifying neighbour.
    pub fn legal_moves(&self, tile_type: TileType) -> LegalMoves {
        let mut moves = LegalMoves::new();

        for cell in self.frontier() {
            let around: BTreeMap<Direction, TileType> = self
                .occupied_neighbors(&cell)
                .into_iter()
                .map(|(dir, tile)| (dir, tile.tile_type))
                .collect();
            let facing = |wanted: TileType| -> Vec<Direction> {
                Direction::ALL
                    .iter()
                    .copied()
                    .filter(|dir| around.get(dir) == Some(&wanted))
                    .collect()
            };

            let rotations = match tile_type {
                TileType::Wood => {
                    if around.values().any(|t| *t == TileType::Wood) {
                        Direction::ALL.to_vec()
                    } else {
                        Vec::new()
                    }
                }
                TileType::Leaf => facing(TileType::Wood),
                TileType::Flower => facing(TileType::Leaf),
                TileType::Fruit => {
                    if around.values().any(|t| *t == TileType::Fruit) {
                        Vec::new()
                    } else {
                        // Neighbours in consecutive directions touch each other
                        Direction::ALL
                            .iter()
                            .copied()
                            .filter(|dir| {
                                around.get(dir) == Some(&TileType::Leaf)
                                    && around.get(&dir.clockwise()) == Some(&TileType::Leaf)
                            })
                            .collect()
                    }
                }
            };

            if !rotations.is_empty() {
                moves.insert(cell.key(), rotations);
            }
        }

        moves
    }

    /// Whether a tile could be placed at its cell right now. Rotation is not checked.
    pub fn is_legal_placement(&self, tile: &PlacedTile) -> bool {
        tile.coord().is_on_grid()
            && self
                .legal_moves(tile.tile_type)
            .contains_key(&tile.coord().key())
    }

    /// Open sides around a flower: 6 minus the tiles touching it
    pub fn flower_exposure(&self, coord: &Coord) -> u32 {
        6 - self.occupied_neighbors(coord).len() as u32
    }

    /// Points from leaves
    pub fn leaf_score(&self) -> u32 {
        self.count(TileType::Leaf) as u32 * TileType::Leaf.base_points()
    }

    /// Points from flowers, one per open side
    pub fn flower_score(&self) -> u32 {
        self.tiles()
            .filter(|t| t.tile_type == TileType::Flower)
            .map(|t| self.flower_exposure(&t.coord()))
            .sum()
    }

    /// Points from fruit
    pub fn fruit_score(&self) -> u32 {
        self.count(TileType::Fruit) as u32 * TileType::Fruit.base_points()
    }

    /// Tile score: wood 0, leaf 3, flower per open side, fruit 7
    pub fn score(&self) -> u32 {
        self.leaf_score() + self.flower_score() + self.fruit_score()
    }

    /// Size of the largest connected group of tiles of one type
    pub fn largest_cluster(&self, tile_type: TileType) -> usize {
        let mut seen: BTreeSet<Coord> = BTreeSet::new();
        let mut largest = 0;

        for start in self.tiles().filter(|t| t.tile_type == tile_type) {
            let start = start.coord();
            if !seen.insert(start) {
                continue;
            }

            let mut size = 0;
            let mut queue = VecDeque::from([start]);
            while let Some(cell) = queue.pop_front() {
                size += 1;
                for (_, next) in cell.neighbors() {
                    if self.tile_type_at(&next) == Some(tile_type) && seen.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
            largest = largest.max(size);
        }

        largest
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}
