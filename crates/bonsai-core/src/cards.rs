//! Static card and goal-tile catalog.
//!
//! Cards are minted once per process from a list of archetypes. Each
//! archetype lists how many copies are in play for 1, 2, 3 and 4 players;
//! copies are numbered sequentially and stamped with the smallest player
//! count that uses them, so ids are stable whatever the table size.

use crate::tree::{Resource, TileType};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Card identifier (1-based, stable across games)
pub type CardId = u32;

/// Goal tile identifier (1-based, stable across games)
pub type GoalId = u32;

/// Card families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CardType {
    Tool,
    Growth,
    Master,
    Helper,
    Parchment,
}

/// What a Parchment card counts at the end of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParchmentTarget {
    /// Tiles of one type in the tree
    Tiles(TileType),
    /// Cards of one family held face up or face down
    Cards(CardType),
}

/// Card effect, one variant per family
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardKind {
    /// Raises tile capacity permanently
    Tool { capacity_bonus: u32 },
    /// Raises the per-turn placement allowance for one tile type
    Growth { tile: TileType },
    /// Grants tiles immediately; `Wild` slots are chosen by the player
    Master { resources: Vec<Resource> },
    /// Lets the player place these tiles on the turn it is taken
    Helper { resources: [Resource; 2] },
    /// Scores `points` per matching tile or card at game end
    Parchment { points: u32, target: ParchmentTarget },
}

impl CardKind {
    pub fn card_type(&self) -> CardType {
        match self {
            CardKind::Tool { .. } => CardType::Tool,
            CardKind::Growth { .. } => CardType::Growth,
            CardKind::Master { .. } => CardType::Master,
            CardKind::Helper { .. } => CardType::Helper,
            CardKind::Parchment { .. } => CardType::Parchment,
        }
    }
}

/// A minted card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    /// Smallest player count whose deck includes this copy
    pub min_players: u8,
    pub kind: CardKind,
}

impl Card {
    pub fn card_type(&self) -> CardType {
        self.kind.card_type()
    }

    /// Tool and Growth cards are kept face up; the rest face down
    pub fn is_face_up(&self) -> bool {
        matches!(self.card_type(), CardType::Tool | CardType::Growth)
    }
}

/// Goal colours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GoalType {
    Wood,
    Leaf,
    Flower,
    Fruit,
    Placement,
}

impl GoalType {
    pub const ALL: [GoalType; 5] = [
        GoalType::Wood,
        GoalType::Leaf,
        GoalType::Flower,
        GoalType::Fruit,
        GoalType::Placement,
    ];
}

/// Goal size tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GoalSize {
    Small,
    Medium,
    Large,
}

impl GoalSize {
    pub const ALL: [GoalSize; 3] = [GoalSize::Small, GoalSize::Medium, GoalSize::Large];
}

/// A goal tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalTile {
    pub id: GoalId,
    pub goal_type: GoalType,
    pub size: GoalSize,
    /// Threshold the achievement metric must reach
    pub requirement: u32,
    pub points: u32,
}

/// A card design and its cumulative copy counts for 1-4 players
struct Archetype {
    kind: CardKind,
    copies: [u8; 4],
}

fn archetype(kind: CardKind, copies: [u8; 4]) -> Archetype {
    Archetype { kind, copies }
}

fn master(resources: &[Resource]) -> CardKind {
    CardKind::Master {
        resources: resources.to_vec(),
    }
}

fn helper(with: Resource) -> CardKind {
    CardKind::Helper {
        resources: [Resource::Wild, with],
    }
}

fn parchment(points: u32, target: ParchmentTarget) -> CardKind {
    CardKind::Parchment { points, target }
}

fn archetypes() -> Vec<Archetype> {
    use Resource::*;

    vec![
        archetype(CardKind::Tool { capacity_bonus: 2 }, [2, 2, 3, 3]),
        archetype(CardKind::Growth { tile: TileType::Wood }, [1, 1, 1, 2]),
        archetype(CardKind::Growth { tile: TileType::Leaf }, [1, 1, 2, 2]),
        archetype(CardKind::Growth { tile: TileType::Flower }, [1, 1, 1, 2]),
        archetype(CardKind::Growth { tile: TileType::Fruit }, [1, 1, 1, 2]),
        archetype(master(&[Wild]), [2, 2, 3, 3]),
        archetype(master(&[Wood, Leaf]), [1, 1, 1, 1]),
        archetype(master(&[Leaf, Leaf]), [1, 1, 1, 2]),
        archetype(master(&[Leaf, Flower]), [1, 1, 1, 1]),
        archetype(master(&[Leaf, Fruit]), [0, 1, 1, 1]),
        archetype(master(&[Wood, Wild]), [0, 1, 1, 1]),
        archetype(master(&[Leaf, Flower, Flower]), [0, 0, 1, 1]),
        archetype(helper(Wood), [1, 1, 1, 2]),
        archetype(helper(Leaf), [1, 1, 2, 2]),
        archetype(helper(Flower), [1, 1, 1, 1]),
        archetype(helper(Fruit), [0, 1, 1, 1]),
        archetype(parchment(1, ParchmentTarget::Tiles(TileType::Wood)), [1, 1, 1, 1]),
        archetype(parchment(1, ParchmentTarget::Tiles(TileType::Leaf)), [1, 1, 1, 1]),
        archetype(parchment(1, ParchmentTarget::Tiles(TileType::Flower)), [1, 1, 1, 1]),
        archetype(parchment(2, ParchmentTarget::Tiles(TileType::Fruit)), [1, 1, 1, 1]),
        archetype(parchment(2, ParchmentTarget::Cards(CardType::Master)), [0, 1, 1, 1]),
        archetype(parchment(2, ParchmentTarget::Cards(CardType::Helper)), [0, 1, 1, 1]),
        archetype(parchment(2, ParchmentTarget::Cards(CardType::Growth)), [0, 0, 1, 1]),
        archetype(parchment(2, ParchmentTarget::Cards(CardType::Tool)), [0, 0, 0, 1]),
    ]
}

/// Requirement and points per goal type, indexed by size
fn goal_table(goal_type: GoalType) -> [(u32, u32); 3] {
    match goal_type {
        GoalType::Wood => [(8, 5), (10, 10), (12, 15)],
        GoalType::Leaf => [(5, 6), (7, 9), (9, 12)],
        GoalType::Flower => [(3, 8), (4, 12), (5, 16)],
        GoalType::Fruit => [(3, 9), (4, 11), (5, 13)],
        // Placement goals are pass/fail
        GoalType::Placement => [(1, 7), (1, 10), (1, 14)],
    }
}

/// The immutable card and goal reference data
#[derive(Debug)]
pub struct Catalog {
    cards: Vec<Card>,
    goals: Vec<GoalTile>,
}

impl Catalog {
    fn build() -> Self {
        let mut cards = Vec::new();
        for archetype in archetypes() {
            let mut minted = 0;
            for (bracket, &copies) in archetype.copies.iter().enumerate() {
                while minted < copies {
                    cards.push(Card {
                        id: cards.len() as CardId + 1,
                        min_players: bracket as u8 + 1,
                        kind: archetype.kind.clone(),
                    });
                    minted += 1;
                }
            }
        }

        let mut goals = Vec::new();
        for goal_type in GoalType::ALL {
            let table = goal_table(goal_type);
            for (size, (requirement, points)) in GoalSize::ALL.into_iter().zip(table) {
                goals.push(GoalTile {
                    id: goals.len() as GoalId + 1,
                    goal_type,
                    size,
                    requirement,
                    points,
                });
            }
        }

        Self { cards, goals }
    }

    /// Look up a card by id
    pub fn card(&self, id: CardId) -> Option<&Card> {
        let index = (id as usize).checked_sub(1)?;
        self.cards.get(index)
    }

    /// Look up a goal tile by id
    pub fn goal(&self, id: GoalId) -> Option<&GoalTile> {
        let index = (id as usize).checked_sub(1)?;
        self.goals.get(index)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn goals(&self) -> &[GoalTile] {
        &self.goals
    }

    /// The goal tile of a given colour and size
    pub fn goal_of(&self, goal_type: GoalType, size: GoalSize) -> Option<&GoalTile> {
        self.goals
            .iter()
            .find(|g| g.goal_type == goal_type && g.size == size)
    }

    /// Ids of every card in an unshuffled deck for this many players
    pub fn deck_for(&self, player_count: usize) -> Vec<CardId> {
        self.cards
            .iter()
            .filter(|c| c.min_players as usize <= player_count)
            .map(|c| c.id)
            .collect()
    }

    /// Card family for an id, if known
    pub fn card_type(&self, id: CardId) -> Option<CardType> {
        self.card(id).map(Card::card_type)
    }
}

/// The process-wide catalog, built on first use
pub fn catalog() -> &'static Catalog {
    static CATALOG: OnceLock<Catalog> = OnceLock::new();
    CATALOG.get_or_init(Catalog::build)
}
