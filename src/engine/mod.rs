use std::collections::HashSet;

use serde::Serialize;

use crate::collision;
use crate::constants::{
    ability_cooldown, get_elite_chance, get_floor_multiplier, ARCHER_PREFERRED_RANGE,
    ARCHER_SHOT_COOLDOWN_TICKS, ARCHER_SHOT_LIFETIME, ARCHER_SHOT_SPEED, ATTACK_COOLDOWN_TICKS,
    BERSERK_ATTACK_SPEED_PER_STACK, BERSERK_TICKS, BLEED_DAMAGE_PER_STACK, BLEED_DURATION_TICKS,
    BLEED_PERIOD_TICKS, BUFF_TICKS, CAMERA_SHAKE_DECAY, CHAIN_BASE_CHANCE,
    CHAIN_DAMAGE_PER_STACK, CHAIN_LUCK_CHANCE, CHAIN_RADIUS, COMBO_DECAY_TICKS, COMBO_MAX_MULT,
    COMBO_STEP, DAMAGE_BUFF_MAGNITUDE, DAMAGE_NUMBER_TICKS, DASH_COOLDOWN_TICKS, DASH_FRICTION,
    DASH_SPEED, ECHO_ATTACK_COOLDOWN_TICKS, ECHO_BASE_LIFETIME, ECHO_SEEK_RADIUS, ECHO_SIZE,
    ENEMY_AGGRO_RADIUS, ENEMY_ATTACK_COOLDOWN_TICKS, ENEMY_SPAWN_PLAYER_CLEARANCE,
    HARVEST_CHANCE_PER_STACK, HEAL_VIAL_AMOUNT, HIT_FLASH_TICKS, HIT_STOP_TICKS, ITEM_SIZE,
    KNOCKBACK_FORCE, KNOCKBACK_FRICTION, LIFESTEAL_PER_STACK, MAX_XP_GROWTH,
    NANITE_DAMAGE_PER_STACK, NANITE_DURATION_TICKS, NANITE_PERIOD_TICKS, PARTICLE_LIFETIME_MAX,
    PARTICLE_LIFETIME_MIN, PLAYER_HURT_INVULN_TICKS, REVIVE_BURST_DAMAGE, REVIVE_BURST_RADIUS,
    REVIVE_INVULN_TICKS, SHOT_LIFETIME, SHOT_SIZE, SHOT_SPEED, SLASH_DASH_COOLDOWN_TICKS,
    SLASH_DASH_DAMAGE_MULT, SLASH_DASH_SPEED, SLASH_DASH_TICKS, SPEED_BUFF_MAGNITUDE,
    SPIN_ARC_SPEED, SPIN_COOLDOWN_TICKS, SPIN_DAMAGE_MULT, SPIN_IMMUNITY_TICKS, SPIN_MOVE_MULT,
    SPIN_RADIUS, SPIN_TICKS, SUMMON_COOLDOWN_TICKS, SUMMON_RING_RADIUS, SWING_RADIUS,
    SWING_REACH, SWING_TICKS, TILE_SIZE, UPGRADE_CHOICE_COUNT, VOID_BASE_CHANCE,
    VOID_DAMAGE_PER_STACK, VOID_LUCK_CHANCE, VOID_PULL, VOID_RADIUS, VOLLEY_COOLDOWN_TICKS,
    VOLLEY_DAMAGE_MULT, VOLLEY_SPREAD, WAVE_COOLDOWN_TICKS, WAVE_DAMAGE_MULT, WAVE_LIFETIME,
    WAVE_SIZE, WAVE_SPEED,
};
use crate::entity::{
    Body, DamageNumber, Damageable, DotState, Echo, Enemy, Item, Lifetimed, Particle, Player,
    PlayerMode, Positioned, Projectile, Swing,
};
use crate::rng::Rng;
use crate::stats::{max_hp_for, Stats};
use crate::types::{
    Action, BuffKind, Camera, CooldownView, EnemyKind, EntityId, HudView, InputSnapshot,
    InteractableView, ItemId, ItemKind, ProjectileOwner, RuntimeEvent, SecondaryAbility, Snapshot,
    Tile,
};
use crate::world::{generate_dungeon, world_to_tile, Dungeon};

mod ability_system;
mod combat_system;
mod entity_system;
mod room_system;
mod spawn_system;
mod utils;

pub use self::combat_system::HitOrigin;
pub use crate::config::GameEngineOptions;

use self::spawn_system::ShotSpec;
use self::utils::{
    advance_lifetimed, angle_to, distance, enemy_template, pick_enemy_kind, roll_reward,
    roll_upgrade_choices, tick_dot,
};

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    pub enemies_defeated: u64,
    pub rooms_cleared: u64,
    pub floors_entered: u64,
    pub damage_applications: u64,
    pub damage_taken: f32,
    pub echoes_summoned: u64,
    pub upgrades_taken: u64,
}

#[derive(Clone, Debug)]
pub struct GameEngine {
    options: GameEngineOptions,
    dungeon: Dungeon,
    rng: Rng,

    player: Player,
    enemies: Vec<Enemy>,
    echoes: Vec<Echo>,
    projectiles: Vec<Projectile>,
    items: Vec<Item>,
    particles: Vec<Particle>,
    damage_numbers: Vec<DamageNumber>,
    events: Vec<RuntimeEvent>,
    camera: Camera,

    input: InputSnapshot,
    prev_input: InputSnapshot,
    paused: bool,
    pending_level_up: bool,
    upgrade_choices: Vec<ItemId>,
    game_over: bool,
    hit_stop: u32,

    tick_counter: u64,
    next_id_counter: EntityId,
    run_stats: RunStats,
}

impl GameEngine {
    pub fn new(options: GameEngineOptions) -> Self {
        let mut rng = Rng::new(options.seed);
        let dungeon = generate_dungeon(options.starting_floor, &mut rng);
        let (cx, cy) = spawn_point(&dungeon);
        let player = Player::new(cx, cy, options.starting_weapon);

        let mut engine = Self {
            options,
            dungeon,
            rng,
            player,
            enemies: Vec::new(),
            echoes: Vec::new(),
            projectiles: Vec::new(),
            items: Vec::new(),
            particles: Vec::new(),
            damage_numbers: Vec::new(),
            events: Vec::new(),
            camera: Camera::default(),
            input: InputSnapshot::default(),
            prev_input: InputSnapshot::default(),
            paused: false,
            pending_level_up: false,
            upgrade_choices: Vec::new(),
            game_over: false,
            hit_stop: 0,
            tick_counter: 0,
            next_id_counter: 1,
            run_stats: RunStats::default(),
        };
        engine.prepare_floor();
        engine.update_camera();
        engine
    }

    pub fn options(&self) -> &GameEngineOptions {
        &self.options
    }

    pub fn tick(&self) -> u64 {
        self.tick_counter
    }

    pub fn floor(&self) -> u32 {
        self.dungeon.floor
    }

    pub fn dungeon(&self) -> &Dungeon {
        &self.dungeon
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn echoes(&self) -> &[Echo] {
        &self.echoes
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_pending_level_up(&self) -> bool {
        self.pending_level_up
    }

    pub fn upgrade_choices(&self) -> &[ItemId] {
        &self.upgrade_choices
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn run_stats(&self) -> &RunStats {
        &self.run_stats
    }

    pub fn step(&mut self, input: &InputSnapshot) {
        self.prev_input = std::mem::replace(&mut self.input, input.clone());
        if self.game_over || self.paused || self.pending_level_up {
            return;
        }

        self.decay_camera_shake();
        if self.hit_stop > 0 {
            self.hit_stop -= 1;
            return;
        }
        self.tick_counter += 1;

        self.update_player();
        self.resolve_player_hits();
        self.reap_enemies();
        if self.pending_level_up {
            return;
        }

        self.update_enemies();
        self.tick_damage_over_time();
        self.reap_enemies();
        if self.game_over || self.pending_level_up {
            return;
        }

        self.update_rooms();

        self.update_echoes();
        self.update_projectiles();
        self.reap_enemies();
        if self.game_over || self.pending_level_up {
            return;
        }
        self.update_items();
        self.update_effects();
        self.update_buffs();
        self.update_camera();
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let snapshot = Snapshot {
            tick: self.tick_counter,
            floor: self.dungeon.floor,
            width: self.dungeon.width,
            height: self.dungeon.height,
            tile_size: TILE_SIZE,
            tiles: self.dungeon.tile_rows(),
            rooms: self.dungeon.rooms.clone(),
            portal_room: self.dungeon.portal_room,
            player: self.player.clone(),
            enemies: self.enemies.clone(),
            echoes: self.echoes.clone(),
            projectiles: self.projectiles.clone(),
            items: self.items.clone(),
            particles: self.particles.clone(),
            damage_numbers: self.damage_numbers.clone(),
            camera: self.camera,
            events: if include_events {
                self.events.clone()
            } else {
                Vec::new()
            },
        };
        if include_events {
            self.events.clear();
        }
        snapshot
    }

    pub fn build_hud(&self) -> HudView {
        let player = &self.player;
        HudView {
            hp: player.hp,
            max_hp: player.max_hp,
            xp: player.xp,
            max_xp: player.max_xp,
            level: player.level,
            floor: self.dungeon.floor,
            weapon: player.weapon,
            cooldowns: CooldownView {
                attack: player.attack_cooldown,
                dash: player.dash_cooldown,
                secondary: player.secondary_cooldown,
                summon: player.summon_cooldown,
            },
            combo: player.combo,
            shadow_stack: player.shadow_stack.len(),
            buffs: player.buffs.clone(),
            inventory: player.inventory.entries(),
            interactable: self.nearest_interactable().map(|idx| InteractableView {
                item_id: self.items[idx].id,
                kind: self.items[idx].kind,
            }),
            is_paused: self.paused,
            pending_level_up: self.pending_level_up,
            upgrade_choices: self.upgrade_choices.clone(),
            is_game_over: self.game_over,
        }
    }

    /// Applies an upgrade while a level-up is pending. Any item id is accepted,
    /// not only the offered choices; without a pending level-up this is a no-op.
    pub fn select_upgrade(&mut self, item: ItemId) {
        if !self.pending_level_up {
            return;
        }
        let stacks = self.player.inventory.add(item);
        self.refresh_player_stats();
        self.run_stats.upgrades_taken += 1;
        self.events.push(RuntimeEvent::UpgradeSelected { item, stacks });
        self.pending_level_up = false;
        self.upgrade_choices.clear();
        self.check_level_up();
    }

    pub fn restart(&mut self) {
        let options = GameEngineOptions {
            seed: self.rng.next_u32(),
            ..self.options.clone()
        };
        *self = Self::new(options);
    }

    pub fn toggle_pause(&mut self) {
        if self.game_over {
            return;
        }
        self.paused = !self.paused;
    }

    fn pressed(&self, action: Action) -> bool {
        self.input.is_held(action) && !self.prev_input.is_held(action)
    }

    fn refresh_player_stats(&mut self) {
        let inventory = &self.player.inventory;
        self.player.stats = Stats::from_inventory(inventory);
        let max_hp = max_hp_for(inventory);
        if max_hp > self.player.max_hp {
            self.player.hp += max_hp - self.player.max_hp;
        }
        self.player.max_hp = max_hp;
        self.player.hp = self.player.hp.min(self.player.max_hp);
    }

    fn update_buffs(&mut self) {
        for buff in &mut self.player.buffs {
            buff.remaining = buff.remaining.saturating_sub(1);
        }
        self.player.buffs.retain(|buff| buff.remaining > 0);

        if self.player.combo_timer > 0 {
            self.player.combo_timer -= 1;
            if self.player.combo_timer == 0 {
                self.player.combo = 0;
            }
        }
    }

    fn add_shake(&mut self, amount: f32) {
        self.camera.shake = self.camera.shake.max(amount);
    }

    fn decay_camera_shake(&mut self) {
        if self.camera.shake <= 0.1 {
            self.camera.shake = 0.0;
            self.camera.shake_x = 0.0;
            self.camera.shake_y = 0.0;
            return;
        }
        let shake = self.camera.shake;
        self.camera.shake_x = self.rng.range(-shake, shake);
        self.camera.shake_y = self.rng.range(-shake, shake);
        self.camera.shake *= CAMERA_SHAKE_DECAY;
    }

    fn update_camera(&mut self) {
        let (px, py) = self.player.center();
        self.camera.x = px - self.options.viewport_width / 2.0 + self.camera.shake_x;
        self.camera.y = py - self.options.viewport_height / 2.0 + self.camera.shake_y;
    }

    fn make_id(&mut self) -> EntityId {
        let id = self.next_id_counter;
        self.next_id_counter = self.next_id_counter.saturating_add(1);
        id
    }
}

fn spawn_point(dungeon: &Dungeon) -> (f32, f32) {
    dungeon
        .rooms
        .first()
        .map(|room| room.center_world())
        .unwrap_or((TILE_SIZE * 1.5, TILE_SIZE * 1.5))
}

#[cfg(test)]
fn test_engine(seed: u32) -> GameEngine {
    GameEngine::new(GameEngineOptions {
        seed,
        ..GameEngineOptions::default()
    })
}

#[cfg(test)]
impl GameEngine {
    fn place_test_enemy(&mut self, kind: EnemyKind, dx: f32, dy: f32, hp: f32) -> usize {
        let (px, py) = self.player.center();
        let id = self.make_id();
        let template = enemy_template(kind);
        self.enemies.push(Enemy {
            id,
            body: Body::centered(px + dx, py + dy, template.size, template.size),
            kind,
            elite: false,
            hp,
            max_hp: hp,
            contact_damage: template.contact_damage,
            speed: template.speed,
            attack_cooldown: ENEMY_ATTACK_COOLDOWN_TICKS,
            aggro_radius: ENEMY_AGGRO_RADIUS,
            room_id: None,
            bleed: None,
            nanites: None,
            channel_immunity: 0,
            hit_flash: 0,
            knockback: (0.0, 0.0),
            xp: template.xp,
        });
        self.enemies.len() - 1
    }

    fn grant_items(&mut self, item: ItemId, stacks: u32) {
        for _ in 0..stacks {
            self.player.inventory.add(item);
        }
        self.refresh_player_stats();
    }
}

#[cfg(test)]
mod tests {
    use super::{test_engine, GameEngine, GameEngineOptions};
    use crate::types::{Action, EnemyKind, InputSnapshot, ItemId, RuntimeEvent, WeaponKind};

    fn held(actions: &[Action], pointer: (f32, f32)) -> InputSnapshot {
        InputSnapshot {
            held: actions.iter().copied().collect(),
            pointer_x: pointer.0,
            pointer_y: pointer.1,
        }
    }

    fn scripted_input(engine: &GameEngine, tick: u32) -> InputSnapshot {
        let (px, py) = engine.player.body.center();
        let dir = match (tick / 40) % 4 {
            0 => Action::MoveRight,
            1 => Action::MoveDown,
            2 => Action::MoveLeft,
            _ => Action::MoveUp,
        };
        let mut actions = vec![dir, Action::LeftMouse];
        if tick % 90 == 0 {
            actions.push(Action::Dash);
        }
        if tick % 150 == 0 {
            actions.push(Action::SecondaryAbility);
        }
        held(&actions, (px + 50.0, py + 10.0))
    }

    #[test]
    fn same_seed_produces_same_progression() {
        let mut a = test_engine(424_242);
        let mut b = test_engine(424_242);
        for idx in 0..3 {
            a.place_test_enemy(EnemyKind::Grunt, 60.0 + idx as f32 * 20.0, 0.0, 40.0);
            b.place_test_enemy(EnemyKind::Grunt, 60.0 + idx as f32 * 20.0, 0.0, 40.0);
        }

        for tick in 0..600 {
            let input_a = scripted_input(&a, tick);
            let input_b = scripted_input(&b, tick);
            assert_eq!(input_a, input_b);
            a.step(&input_a);
            b.step(&input_b);
            if a.pending_level_up {
                a.select_upgrade(ItemId::Whetstone);
                b.select_upgrade(ItemId::Whetstone);
            }

            assert_eq!(a.player.body.x.to_bits(), b.player.body.x.to_bits());
            assert_eq!(a.player.body.y.to_bits(), b.player.body.y.to_bits());
            assert_eq!(a.player.hp.to_bits(), b.player.hp.to_bits());
            assert_eq!(a.enemies.len(), b.enemies.len());
            for (ea, eb) in a.enemies.iter().zip(b.enemies.iter()) {
                assert_eq!(ea.id, eb.id);
                assert_eq!(ea.hp.to_bits(), eb.hp.to_bits());
                assert_eq!(ea.body.x.to_bits(), eb.body.x.to_bits());
            }
            assert_eq!(a.is_game_over(), b.is_game_over());
        }
    }

    #[test]
    fn different_seeds_generate_different_floors() {
        let a = test_engine(1);
        let b = test_engine(2);
        assert_ne!(a.dungeon.tile_rows(), b.dungeon.tile_rows());
    }

    #[test]
    fn pause_freezes_every_entity() {
        let mut engine = test_engine(77);
        engine.place_test_enemy(EnemyKind::Grunt, 40.0, 0.0, 30.0);
        engine.place_test_enemy(EnemyKind::Archer, -120.0, 20.0, 30.0);
        let (px, py) = engine.player.body.center();
        let busy = held(
            &[Action::MoveRight, Action::LeftMouse, Action::Dash, Action::SecondaryAbility],
            (px + 40.0, py),
        );
        for _ in 0..10 {
            engine.step(&busy);
        }

        engine.toggle_pause();
        assert!(engine.is_paused());
        let before = engine.clone();
        for _ in 0..120 {
            engine.step(&busy);
        }

        assert_eq!(engine.tick_counter, before.tick_counter);
        assert_eq!(engine.player.body.x, before.player.body.x);
        assert_eq!(engine.player.body.y, before.player.body.y);
        assert_eq!(engine.player.body.vx, before.player.body.vx);
        assert_eq!(engine.player.hp, before.player.hp);
        assert_eq!(engine.player.attack_cooldown, before.player.attack_cooldown);
        assert_eq!(engine.player.dash_cooldown, before.player.dash_cooldown);
        assert_eq!(engine.player.secondary_cooldown, before.player.secondary_cooldown);
        assert_eq!(engine.enemies.len(), before.enemies.len());
        for (after, prior) in engine.enemies.iter().zip(before.enemies.iter()) {
            assert_eq!(after.body.x, prior.body.x);
            assert_eq!(after.body.y, prior.body.y);
            assert_eq!(after.hp, prior.hp);
            assert_eq!(after.attack_cooldown, prior.attack_cooldown);
        }
        assert_eq!(engine.projectiles.len(), before.projectiles.len());
        for (after, prior) in engine.projectiles.iter().zip(before.projectiles.iter()) {
            assert_eq!(after.body.x, prior.body.x);
            assert_eq!(after.lifetime, prior.lifetime);
        }

        engine.toggle_pause();
        engine.step(&busy);
        assert_eq!(engine.tick_counter, before.tick_counter + 1);
    }

    #[test]
    fn pending_level_up_blocks_until_an_upgrade_is_selected() {
        let mut engine = test_engine(5);
        engine.player.xp = engine.player.max_xp + 1.0;
        engine.check_level_up();
        assert!(engine.pending_level_up);
        assert_eq!(engine.player.level, 2);
        assert_eq!(engine.upgrade_choices.len(), 3);

        let tick = engine.tick_counter;
        engine.step(&InputSnapshot::default());
        assert_eq!(engine.tick_counter, tick);

        let choice = engine.upgrade_choices[0];
        engine.select_upgrade(choice);
        assert!(!engine.pending_level_up);
        assert!(engine.upgrade_choices.is_empty());
        assert_eq!(engine.player.inventory.stacks(choice), 1);
        engine.step(&InputSnapshot::default());
        assert_eq!(engine.tick_counter, tick + 1);
    }

    #[test]
    fn level_up_freezes_the_rest_of_the_tick() {
        let mut engine = test_engine(5);
        engine.player.xp = engine.player.max_xp - 1.0;
        engine.place_test_enemy(EnemyKind::Grunt, 30.0, 0.0, 1.0);
        let attacker = engine.place_test_enemy(EnemyKind::Grunt, -14.0, 0.0, 30.0);
        engine.enemies[attacker].attack_cooldown = 1;
        let attacker_id = engine.enemies[attacker].id;
        let hp_before = engine.player.hp;

        let (px, py) = engine.player.body.center();
        engine.step(&held(&[Action::LeftMouse], (px + 100.0, py)));

        assert!(engine.pending_level_up);
        assert_eq!(engine.player.hp, hp_before);
        let attacker = engine
            .enemies
            .iter()
            .find(|enemy| enemy.id == attacker_id)
            .expect("attacker survives the swing");
        assert_eq!(attacker.attack_cooldown, 1);
        assert!(!engine.game_over);
    }

    #[test]
    fn queued_level_ups_reenter_the_pending_state() {
        let mut engine = test_engine(6);
        engine.player.xp = engine.player.max_xp * 3.0;
        engine.check_level_up();
        engine.select_upgrade(ItemId::Vitality);
        assert!(engine.pending_level_up);
        assert_eq!(engine.player.level, 3);
    }

    #[test]
    fn select_upgrade_without_pending_level_up_is_ignored() {
        let mut engine = test_engine(8);
        engine.select_upgrade(ItemId::Whetstone);
        assert!(engine.player.inventory.is_empty());
        assert!(engine.events.is_empty());
    }

    #[test]
    fn select_upgrade_accepts_items_outside_the_offer() {
        let mut engine = test_engine(9);
        engine.player.xp = engine.player.max_xp;
        engine.check_level_up();
        let outside = ItemId::ALL
            .into_iter()
            .find(|item| !engine.upgrade_choices.contains(item))
            .expect("pool is larger than the offer");
        engine.select_upgrade(outside);
        assert_eq!(engine.player.inventory.stacks(outside), 1);
    }

    #[test]
    fn vitality_raises_max_hp_and_current_hp_together() {
        let mut engine = test_engine(10);
        engine.player.hp = 50.0;
        engine.grant_items(ItemId::Vitality, 2);
        assert_eq!(engine.player.max_hp, 140.0);
        assert_eq!(engine.player.hp, 90.0);
    }

    #[test]
    fn build_snapshot_drains_events_when_requested() {
        let mut engine = test_engine(333);
        engine.events.push(RuntimeEvent::PlayerRevived);

        let peek = engine.build_snapshot(false);
        assert!(peek.events.is_empty());
        let first = engine.build_snapshot(true);
        let second = engine.build_snapshot(true);
        assert_eq!(first.events.len(), 1);
        assert_eq!(second.events.len(), 0);
        assert_eq!(first.tiles.len(), engine.dungeon.height as usize);
    }

    #[test]
    fn hud_reflects_player_state() {
        let mut engine = GameEngine::new(GameEngineOptions {
            seed: 12,
            starting_weapon: WeaponKind::Bow,
            ..GameEngineOptions::default()
        });
        engine.player.shadow_stack.push_back(EnemyKind::Brute);
        engine.grant_items(ItemId::Scope, 2);
        let hud = engine.build_hud();
        assert_eq!(hud.weapon, WeaponKind::Bow);
        assert_eq!(hud.shadow_stack, 1);
        assert_eq!(hud.inventory.len(), 1);
        assert_eq!(hud.inventory[0].stacks, 2);
        assert!(!hud.is_paused && !hud.pending_level_up && !hud.is_game_over);
    }

    #[test]
    fn hit_stop_freezes_simulation_but_decays_shake() {
        let mut engine = test_engine(21);
        engine.place_test_enemy(EnemyKind::Grunt, 150.0, 0.0, 30.0);
        engine.hit_stop = 3;
        engine.camera.shake = 8.0;
        let enemy_x = engine.enemies[0].body.x;
        let tick = engine.tick_counter;

        engine.step(&held(&[Action::MoveRight], (0.0, 0.0)));
        assert_eq!(engine.tick_counter, tick);
        assert_eq!(engine.enemies[0].body.x, enemy_x);
        assert!(engine.camera.shake < 8.0);
        assert_eq!(engine.hit_stop, 2);
    }

    #[test]
    fn restart_resets_the_run_with_a_derived_seed() {
        let mut engine = test_engine(31);
        engine.place_test_enemy(EnemyKind::Grunt, 60.0, 0.0, 10.0);
        engine.grant_items(ItemId::Clover, 1);
        engine.game_over = true;
        let old_seed = engine.options.seed;

        engine.restart();
        assert!(!engine.is_game_over());
        assert!(engine.enemies.is_empty());
        assert!(engine.player.inventory.is_empty());
        assert_eq!(engine.tick_counter, 0);
        assert_ne!(engine.options.seed, old_seed);
    }

    #[test]
    fn game_over_stops_the_simulation() {
        let mut engine = test_engine(41);
        engine.player.hp = 1.0;
        engine.damage_player(50.0);
        assert!(engine.is_game_over());
        assert!(engine
            .events
            .iter()
            .any(|event| matches!(event, RuntimeEvent::GameOver { .. })));
        let tick = engine.tick_counter;
        engine.step(&InputSnapshot::default());
        assert_eq!(engine.tick_counter, tick);
        engine.toggle_pause();
        assert!(!engine.is_paused());
    }
}
