pub const TICK_RATE: u32 = 60;
pub const TICK_MS: u64 = 1000 / TICK_RATE as u64;

pub const MAP_SIZE: i32 = 60;
pub const TILE_SIZE: f32 = 32.0;
pub const ROOM_MIN_SIDE: i32 = 8;
pub const ROOM_MAX_SIDE: i32 = 16;
pub const ROOM_PADDING: i32 = 2;
pub const ROOM_PLACEMENT_ATTEMPTS: usize = 400;

pub const PLAYER_SIZE: f32 = 22.0;
pub const PLAYER_BASE_MAX_HP: f32 = 100.0;
pub const PLAYER_BASE_MAX_XP: f32 = 50.0;
pub const MAX_XP_GROWTH: f32 = 1.2;
pub const UPGRADE_CHOICE_COUNT: usize = 3;

pub const BASE_DAMAGE: f32 = 10.0;
pub const BASE_SPEED: f32 = 3.0;
pub const BASE_ATTACK_SPEED: f32 = 1.0;
pub const BASE_CRIT_CHANCE: f32 = 0.05;
pub const BASE_CRIT_DAMAGE: f32 = 1.5;
pub const BASE_PICKUP_RANGE: f32 = 48.0;
pub const MAX_DAMAGE_REDUCTION: f32 = 0.8;
pub const MAX_COOLDOWN_REDUCTION: f32 = 0.75;

pub const ATTACK_COOLDOWN_TICKS: f32 = 24.0;
pub const SWING_TICKS: u32 = 12;
pub const SWING_REACH: f32 = 34.0;
pub const SWING_RADIUS: f32 = 30.0;
pub const SHOT_SPEED: f32 = 8.0;
pub const SHOT_LIFETIME: u32 = 60;
pub const SHOT_SIZE: f32 = 8.0;

pub const DASH_COOLDOWN_TICKS: u32 = 60;
pub const DASH_SPEED: f32 = 12.0;
pub const DASH_FRICTION: f32 = 0.85;

pub const SLASH_DASH_COOLDOWN_TICKS: u32 = 90;
pub const SLASH_DASH_TICKS: u32 = 12;
pub const SLASH_DASH_SPEED: f32 = 11.0;
pub const SLASH_DASH_DAMAGE_MULT: f32 = 1.5;

pub const SPIN_COOLDOWN_TICKS: u32 = 180;
pub const SPIN_TICKS: u32 = 60;
pub const SPIN_RADIUS: f32 = 70.0;
pub const SPIN_ARC_SPEED: f32 = 0.4;
pub const SPIN_DAMAGE_MULT: f32 = 0.6;
pub const SPIN_IMMUNITY_TICKS: u32 = 10;
pub const SPIN_MOVE_MULT: f32 = 0.5;

pub const WAVE_COOLDOWN_TICKS: u32 = 120;
pub const WAVE_SPEED: f32 = 7.0;
pub const WAVE_LIFETIME: u32 = 50;
pub const WAVE_SIZE: f32 = 24.0;
pub const WAVE_DAMAGE_MULT: f32 = 2.0;

pub const VOLLEY_COOLDOWN_TICKS: u32 = 150;
pub const VOLLEY_SPREAD: [f32; 5] = [-0.4, -0.2, 0.0, 0.2, 0.4];
pub const VOLLEY_DAMAGE_MULT: f32 = 0.8;

pub const SUMMON_COOLDOWN_TICKS: u32 = 300;
pub const SUMMON_RING_RADIUS: f32 = 48.0;

pub const COMBO_DECAY_TICKS: u32 = 120;
pub const COMBO_STEP: f32 = 0.05;
pub const COMBO_MAX_MULT: f32 = 2.0;

pub const HIT_FLASH_TICKS: u32 = 6;
pub const KNOCKBACK_FORCE: f32 = 4.0;
pub const KNOCKBACK_FRICTION: f32 = 0.8;
pub const HIT_STOP_TICKS: u32 = 4;
pub const PLAYER_HURT_INVULN_TICKS: u32 = 20;

pub const LIFESTEAL_PER_STACK: f32 = 1.0;
pub const CHAIN_BASE_CHANCE: f32 = 0.20;
pub const CHAIN_LUCK_CHANCE: f32 = 0.05;
pub const CHAIN_RADIUS: f32 = 150.0;
pub const CHAIN_DAMAGE_PER_STACK: f32 = 6.0;
pub const NANITE_DURATION_TICKS: u32 = 180;
pub const NANITE_PERIOD_TICKS: u32 = 30;
pub const NANITE_DAMAGE_PER_STACK: f32 = 2.0;
pub const BLEED_DURATION_TICKS: u32 = 120;
pub const BLEED_PERIOD_TICKS: u32 = 20;
pub const BLEED_DAMAGE_PER_STACK: f32 = 1.5;
pub const VOID_BASE_CHANCE: f32 = 0.30;
pub const VOID_LUCK_CHANCE: f32 = 0.10;
pub const VOID_RADIUS: f32 = 120.0;
pub const VOID_PULL: f32 = 0.35;
pub const VOID_DAMAGE_PER_STACK: f32 = 8.0;
pub const HARVEST_CHANCE_PER_STACK: f32 = 0.20;
pub const BERSERK_TICKS: u32 = 180;
pub const BERSERK_ATTACK_SPEED_PER_STACK: f32 = 0.3;
pub const REVIVE_INVULN_TICKS: u32 = 120;
pub const REVIVE_BURST_RADIUS: f32 = 200.0;
pub const REVIVE_BURST_DAMAGE: f32 = 100.0;

pub const ECHO_SIZE: f32 = 18.0;
pub const ECHO_BASE_LIFETIME: f32 = 600.0;
pub const ECHO_SEEK_RADIUS: f32 = 400.0;
pub const ECHO_ATTACK_COOLDOWN_TICKS: u32 = 40;

pub const ENEMY_ATTACK_COOLDOWN_TICKS: u32 = 60;
pub const ENEMY_AGGRO_RADIUS: f32 = 320.0;
pub const ENEMY_SPAWN_PLAYER_CLEARANCE: f32 = 96.0;
pub const ARCHER_PREFERRED_RANGE: f32 = 180.0;
pub const ARCHER_SHOT_COOLDOWN_TICKS: u32 = 90;
pub const ARCHER_SHOT_SPEED: f32 = 4.0;
pub const ARCHER_SHOT_LIFETIME: u32 = 120;

pub const ITEM_SIZE: f32 = 16.0;
pub const HEAL_VIAL_AMOUNT: f32 = 25.0;
pub const BUFF_TICKS: u32 = 600;
pub const DAMAGE_BUFF_MAGNITUDE: f32 = 0.5;
pub const SPEED_BUFF_MAGNITUDE: f32 = 0.4;

pub const PARTICLE_LIFETIME_MIN: i32 = 15;
pub const PARTICLE_LIFETIME_MAX: i32 = 35;
pub const DAMAGE_NUMBER_TICKS: u32 = 40;
pub const CAMERA_SHAKE_DECAY: f32 = 0.9;

pub fn get_room_target(floor: u32) -> usize {
    10 + (floor as f32 * 0.5).floor() as usize
}

pub fn get_elite_chance(floor: u32) -> f32 {
    (0.05 + floor as f32 * 0.05).min(0.5)
}

pub fn get_floor_multiplier(floor: u32) -> (f32, f32) {
    (1.0 + floor as f32 * 0.15, 1.0 + floor as f32 * 0.1)
}

/// Cooldown after reduction; the reduction is capped so no cooldown collapses to zero.
pub fn ability_cooldown(base_ticks: u32, cooldown_reduction: f32) -> u32 {
    let reduction = cooldown_reduction.clamp(0.0, MAX_COOLDOWN_REDUCTION);
    (base_ticks as f32 * (1.0 - reduction)).ceil() as u32
}
