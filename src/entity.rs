use std::collections::{HashSet, VecDeque};

use serde::Serialize;

use crate::constants::{PLAYER_BASE_MAX_HP, PLAYER_BASE_MAX_XP, PLAYER_SIZE};
use crate::stats::{Inventory, Stats};
use crate::types::{
    ActiveBuff, BuffKind, EnemyKind, EntityId, ItemKind, ProjectileOwner, WeaponKind,
};

#[derive(Clone, Debug, Serialize)]
pub struct Body {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub vx: f32,
    pub vy: f32,
    pub color: &'static str,
    pub alive: bool,
}

impl Body {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            x,
            y,
            w,
            h,
            vx: 0.0,
            vy: 0.0,
            color: "#ffffff",
            alive: true,
        }
    }

    pub fn centered(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Self::new(cx - w / 2.0, cy - h / 2.0, w, h)
    }

    pub fn with_color(mut self, color: &'static str) -> Self {
        self.color = color;
        self
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn set_center(&mut self, cx: f32, cy: f32) {
        self.x = cx - self.w / 2.0;
        self.y = cy - self.h / 2.0;
    }

    pub fn intersects(&self, other: &Body) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }

    pub fn intersects_circle(&self, cx: f32, cy: f32, radius: f32) -> bool {
        let nx = cx.clamp(self.x, self.x + self.w);
        let ny = cy.clamp(self.y, self.y + self.h);
        let dx = cx - nx;
        let dy = cy - ny;
        dx * dx + dy * dy <= radius * radius
    }

    pub fn distance_to(&self, other: &Body) -> f32 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        f32::hypot(ax - bx, ay - by)
    }
}

pub trait Positioned {
    fn body(&self) -> &Body;
    fn body_mut(&mut self) -> &mut Body;

    fn center(&self) -> (f32, f32) {
        self.body().center()
    }
}

pub trait Lifetimed: Positioned {
    fn tick_lifetime(&mut self) -> bool;
}

pub trait Damageable: Positioned {
    fn hp(&self) -> f32;

    fn is_defeated(&self) -> bool {
        self.hp() <= 0.0
    }
}

macro_rules! impl_positioned {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Positioned for $ty {
                fn body(&self) -> &Body {
                    &self.body
                }

                fn body_mut(&mut self) -> &mut Body {
                    &mut self.body
                }
            }
        )*
    };
}

impl_positioned!(Player, Enemy, Echo, Projectile, Item, Particle, DamageNumber);

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlayerMode {
    Grounded,
    Dashing,
    SlashDashing {
        #[serde(rename = "ticksLeft")]
        ticks_left: u32,
        #[serde(skip)]
        struck: HashSet<EntityId>,
    },
    Spinning {
        #[serde(rename = "ticksLeft")]
        ticks_left: u32,
        angle: f32,
    },
}

impl PlayerMode {
    pub fn is_grounded(&self) -> bool {
        matches!(self, Self::Grounded)
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Swing {
    pub ticks_left: u32,
    pub angle: f32,
    #[serde(skip)]
    pub struck: HashSet<EntityId>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub body: Body,
    pub hp: f32,
    pub max_hp: f32,
    pub level: u32,
    pub xp: f32,
    pub max_xp: f32,
    pub aim: f32,
    pub weapon: WeaponKind,
    pub mode: PlayerMode,
    pub swing: Option<Swing>,
    pub attack_cooldown: u32,
    pub dash_cooldown: u32,
    pub secondary_cooldown: u32,
    pub summon_cooldown: u32,
    pub invulnerable: u32,
    pub hit_flash: u32,
    pub stats: Stats,
    pub inventory: Inventory,
    pub shadow_stack: VecDeque<EnemyKind>,
    pub combo: u32,
    pub combo_timer: u32,
    pub buffs: Vec<ActiveBuff>,
    pub revive_used: bool,
}

impl Player {
    pub fn new(cx: f32, cy: f32, weapon: WeaponKind) -> Self {
        Self {
            body: Body::centered(cx, cy, PLAYER_SIZE, PLAYER_SIZE).with_color("#7fd4ff"),
            hp: PLAYER_BASE_MAX_HP,
            max_hp: PLAYER_BASE_MAX_HP,
            level: 1,
            xp: 0.0,
            max_xp: PLAYER_BASE_MAX_XP,
            aim: 0.0,
            weapon,
            mode: PlayerMode::Grounded,
            swing: None,
            attack_cooldown: 0,
            dash_cooldown: 0,
            secondary_cooldown: 0,
            summon_cooldown: 0,
            invulnerable: 0,
            hit_flash: 0,
            stats: Stats::base(),
            inventory: Inventory::default(),
            shadow_stack: VecDeque::new(),
            combo: 0,
            combo_timer: 0,
            buffs: Vec::new(),
            revive_used: false,
        }
    }

    pub fn heal(&mut self, amount: f32) {
        self.hp = (self.hp + amount.max(0.0)).min(self.max_hp);
    }

    pub fn buff_magnitude(&self, kind: BuffKind) -> f32 {
        self.buffs
            .iter()
            .filter(|buff| buff.kind == kind)
            .map(|buff| buff.magnitude)
            .sum()
    }

    pub fn grant_buff(&mut self, kind: BuffKind, ticks: u32, magnitude: f32) {
        if let Some(buff) = self.buffs.iter_mut().find(|buff| buff.kind == kind) {
            buff.remaining = ticks;
            buff.magnitude = buff.magnitude.max(magnitude);
            return;
        }
        self.buffs.push(ActiveBuff {
            kind,
            remaining: ticks,
            magnitude,
        });
    }

    pub fn effective_damage(&self) -> f32 {
        self.stats.damage * (1.0 + self.buff_magnitude(BuffKind::Damage))
    }

    pub fn effective_speed(&self) -> f32 {
        self.stats.speed * (1.0 + self.buff_magnitude(BuffKind::Speed))
    }

    pub fn effective_attack_speed(&self) -> f32 {
        (self.stats.attack_speed + self.buff_magnitude(BuffKind::AttackSpeed)).max(0.1)
    }

    pub fn effective_crit_chance(&self) -> f32 {
        self.stats.crit_chance.clamp(0.0, 1.0)
    }
}

impl Damageable for Player {
    fn hp(&self) -> f32 {
        self.hp
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DotState {
    pub stacks: u32,
    pub timer: u32,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Enemy {
    pub id: EntityId,
    pub body: Body,
    pub kind: EnemyKind,
    pub elite: bool,
    pub hp: f32,
    pub max_hp: f32,
    pub contact_damage: f32,
    pub speed: f32,
    pub attack_cooldown: u32,
    pub aggro_radius: f32,
    pub room_id: Option<usize>,
    pub bleed: Option<DotState>,
    pub nanites: Option<DotState>,
    pub channel_immunity: u32,
    pub hit_flash: u32,
    #[serde(skip)]
    pub knockback: (f32, f32),
    #[serde(skip)]
    pub xp: f32,
}

impl Enemy {
    pub fn is_alive(&self) -> bool {
        !self.is_defeated()
    }
}

impl Damageable for Enemy {
    fn hp(&self) -> f32 {
        self.hp
    }

    fn is_defeated(&self) -> bool {
        self.hp <= 0.0 || !self.body.alive
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Echo {
    pub id: EntityId,
    pub body: Body,
    pub tier: u8,
    pub lifetime: u32,
    pub damage: f32,
    pub speed: f32,
    pub target: Option<EntityId>,
    pub attack_cooldown: u32,
}

impl Lifetimed for Echo {
    fn tick_lifetime(&mut self) -> bool {
        self.lifetime = self.lifetime.saturating_sub(1);
        self.lifetime > 0
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projectile {
    pub id: EntityId,
    pub body: Body,
    pub owner: ProjectileOwner,
    pub damage: f32,
    pub lifetime: u32,
    pub pierce: bool,
    #[serde(skip)]
    pub struck: HashSet<EntityId>,
}

impl Lifetimed for Projectile {
    fn tick_lifetime(&mut self) -> bool {
        self.lifetime = self.lifetime.saturating_sub(1);
        self.lifetime > 0
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: EntityId,
    pub body: Body,
    pub kind: ItemKind,
    pub float_phase: f32,
}

#[derive(Clone, Debug, Serialize)]
pub struct Particle {
    pub body: Body,
    pub lifetime: u32,
}

impl Lifetimed for Particle {
    fn tick_lifetime(&mut self) -> bool {
        self.lifetime = self.lifetime.saturating_sub(1);
        self.lifetime > 0
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct DamageNumber {
    pub body: Body,
    pub value: f32,
    pub crit: bool,
    pub lifetime: u32,
}

impl Lifetimed for DamageNumber {
    fn tick_lifetime(&mut self) -> bool {
        self.lifetime = self.lifetime.saturating_sub(1);
        self.lifetime > 0
    }
}
