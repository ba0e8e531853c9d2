use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::entity::{DamageNumber, Echo, Enemy, Item, Particle, Player, Projectile};
use crate::world::Room;

pub type EntityId = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tile {
    Void,
    Floor,
    Wall,
    DoorOpen,
    DoorClosed,
}

impl Tile {
    pub fn is_blocking(self) -> bool {
        matches!(self, Self::Void | Self::Wall | Self::DoorClosed)
    }

    pub fn glyph(self) -> char {
        match self {
            Self::Void => ' ',
            Self::Floor => '.',
            Self::Wall => '#',
            Self::DoorOpen => '+',
            Self::DoorClosed => '=',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Dash,
    PrimaryAbility,
    SecondaryAbility,
    Interact,
    LeftMouse,
    RightMouse,
}

impl Action {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "move_up" => Some(Self::MoveUp),
            "move_down" => Some(Self::MoveDown),
            "move_left" => Some(Self::MoveLeft),
            "move_right" => Some(Self::MoveRight),
            "dash" => Some(Self::Dash),
            "primary_ability" => Some(Self::PrimaryAbility),
            "secondary_ability" => Some(Self::SecondaryAbility),
            "interact" => Some(Self::Interact),
            "left_mouse" => Some(Self::LeftMouse),
            "right_mouse" => Some(Self::RightMouse),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputSnapshot {
    pub held: BTreeSet<Action>,
    pub pointer_x: f32,
    pub pointer_y: f32,
}

impl InputSnapshot {
    pub fn is_held(&self, action: Action) -> bool {
        self.held.contains(&action)
    }

    pub fn move_vector(&self) -> (f32, f32) {
        let mut dx = 0.0;
        let mut dy = 0.0;
        if self.is_held(Action::MoveLeft) {
            dx -= 1.0;
        }
        if self.is_held(Action::MoveRight) {
            dx += 1.0;
        }
        if self.is_held(Action::MoveUp) {
            dy -= 1.0;
        }
        if self.is_held(Action::MoveDown) {
            dy += 1.0;
        }
        let len = f32::hypot(dx, dy);
        if len <= f32::EPSILON {
            return (0.0, 0.0);
        }
        (dx / len, dy / len)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    Grunt,
    Archer,
    Brute,
}

impl EnemyKind {
    pub fn echo_tier(self) -> u8 {
        match self {
            Self::Grunt => 1,
            Self::Archer => 2,
            Self::Brute => 3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponKind {
    Blade,
    Scythe,
    Bow,
    Staff,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 4] = [Self::Blade, Self::Scythe, Self::Bow, Self::Staff];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "blade" => Some(Self::Blade),
            "scythe" => Some(Self::Scythe),
            "bow" => Some(Self::Bow),
            "staff" => Some(Self::Staff),
            _ => None,
        }
    }

    pub fn is_melee(self) -> bool {
        matches!(self, Self::Blade | Self::Scythe)
    }

    pub fn secondary(self) -> SecondaryAbility {
        match self {
            Self::Blade => SecondaryAbility::SlashDash,
            Self::Scythe => SecondaryAbility::Spin,
            Self::Bow => SecondaryAbility::Volley,
            Self::Staff => SecondaryAbility::Wave,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SecondaryAbility {
    Wave,
    SlashDash,
    Spin,
    Volley,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemId {
    Whetstone,
    SwiftBoots,
    Quickdraw,
    Clover,
    Scope,
    Razor,
    Plating,
    Hourglass,
    Resonator,
    Magnet,
    Vitality,
    VampiricFang,
    StormCoil,
    NaniteSwarm,
    SerratedEdge,
    VoidCore,
    SoulHarvest,
    BerserkerBlood,
    PhoenixFeather,
}

impl ItemId {
    pub const ALL: [ItemId; 19] = [
        Self::Whetstone,
        Self::SwiftBoots,
        Self::Quickdraw,
        Self::Clover,
        Self::Scope,
        Self::Razor,
        Self::Plating,
        Self::Hourglass,
        Self::Resonator,
        Self::Magnet,
        Self::Vitality,
        Self::VampiricFang,
        Self::StormCoil,
        Self::NaniteSwarm,
        Self::SerratedEdge,
        Self::VoidCore,
        Self::SoulHarvest,
        Self::BerserkerBlood,
        Self::PhoenixFeather,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|item| item.key() == value)
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Whetstone => "whetstone",
            Self::SwiftBoots => "swift_boots",
            Self::Quickdraw => "quickdraw",
            Self::Clover => "clover",
            Self::Scope => "scope",
            Self::Razor => "razor",
            Self::Plating => "plating",
            Self::Hourglass => "hourglass",
            Self::Resonator => "resonator",
            Self::Magnet => "magnet",
            Self::Vitality => "vitality",
            Self::VampiricFang => "vampiric_fang",
            Self::StormCoil => "storm_coil",
            Self::NaniteSwarm => "nanite_swarm",
            Self::SerratedEdge => "serrated_edge",
            Self::VoidCore => "void_core",
            Self::SoulHarvest => "soul_harvest",
            Self::BerserkerBlood => "berserker_blood",
            Self::PhoenixFeather => "phoenix_feather",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemKind {
    HealVial,
    DamageBuff,
    SpeedBuff,
    Weapon { weapon: WeaponKind },
    Portal,
}

impl ItemKind {
    pub fn is_interactable(self) -> bool {
        matches!(self, Self::Weapon { .. } | Self::Portal)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuffKind {
    Damage,
    Speed,
    AttackSpeed,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveBuff {
    pub kind: BuffKind,
    pub remaining: u32,
    pub magnitude: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomState {
    Undiscovered,
    Active,
    Cleared,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectileOwner {
    Player,
    Enemy,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    RoomActivated {
        #[serde(rename = "roomId")]
        room_id: usize,
        enemies: usize,
    },
    RoomCleared {
        #[serde(rename = "roomId")]
        room_id: usize,
    },
    EnemyDefeated {
        #[serde(rename = "enemyId")]
        enemy_id: EntityId,
        kind: EnemyKind,
        elite: bool,
    },
    LevelUp {
        level: u32,
        choices: Vec<ItemId>,
    },
    UpgradeSelected {
        item: ItemId,
        stacks: u32,
    },
    EchoesSummoned {
        count: usize,
    },
    ItemPickedUp {
        item: ItemKind,
    },
    WeaponEquipped {
        weapon: WeaponKind,
    },
    FloorEntered {
        floor: u32,
    },
    PlayerRevived,
    GameOver {
        floor: u32,
        level: u32,
    },
}

#[derive(Clone, Copy, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Camera {
    pub x: f32,
    pub y: f32,
    pub shake: f32,
    pub shake_x: f32,
    pub shake_y: f32,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub tick: u64,
    pub floor: u32,
    pub width: i32,
    pub height: i32,
    pub tile_size: f32,
    pub tiles: Vec<String>,
    pub rooms: Vec<Room>,
    pub portal_room: usize,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub echoes: Vec<Echo>,
    pub projectiles: Vec<Projectile>,
    pub items: Vec<Item>,
    pub particles: Vec<Particle>,
    pub damage_numbers: Vec<DamageNumber>,
    pub camera: Camera,
    pub events: Vec<RuntimeEvent>,
}

#[derive(Clone, Copy, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CooldownView {
    pub attack: u32,
    pub dash: u32,
    pub secondary: u32,
    pub summon: u32,
}

#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractableView {
    pub item_id: EntityId,
    pub kind: ItemKind,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryEntry {
    pub item: ItemId,
    pub stacks: u32,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HudView {
    pub hp: f32,
    pub max_hp: f32,
    pub xp: f32,
    pub max_xp: f32,
    pub level: u32,
    pub floor: u32,
    pub weapon: WeaponKind,
    pub cooldowns: CooldownView,
    pub combo: u32,
    pub shadow_stack: usize,
    pub buffs: Vec<ActiveBuff>,
    pub inventory: Vec<InventoryEntry>,
    pub interactable: Option<InteractableView>,
    pub is_paused: bool,
    pub pending_level_up: bool,
    pub upgrade_choices: Vec<ItemId>,
    pub is_game_over: bool,
}
