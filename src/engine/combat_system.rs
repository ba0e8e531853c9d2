use super::*;

/// Where a damage application came from. Only `Direct` hits run on-hit item
/// effects; everything an effect deals is tagged `Effect`, so proc chains
/// never recurse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitOrigin {
    Direct,
    Effect,
}

impl GameEngine {
    pub(super) fn deal_damage(&mut self, idx: usize, amount: f32, crit: bool, origin: HitOrigin) {
        let (px, py) = self.player.center();
        let Some(enemy) = self.enemies.get_mut(idx) else {
            return;
        };
        if !enemy.is_alive() {
            return;
        }
        self.run_stats.damage_applications += 1;

        let amount = amount.max(0.0);
        enemy.hp -= amount;
        let center = enemy.body.center();
        if origin == HitOrigin::Direct {
            enemy.hit_flash = HIT_FLASH_TICKS;
            let angle = angle_to((px, py), center);
            enemy.knockback = (angle.cos() * KNOCKBACK_FORCE, angle.sin() * KNOCKBACK_FORCE);
        }
        let killed = enemy.hp <= 0.0;

        self.spawn_damage_number(center, amount, crit);
        if origin == HitOrigin::Direct {
            self.apply_on_hit_effects(idx, crit);
        }
        if killed {
            self.on_enemy_killed(center);
        }
    }

    fn apply_on_hit_effects(&mut self, idx: usize, crit: bool) {
        let inventory = &self.player.inventory;
        let fang = inventory.stacks(ItemId::VampiricFang);
        let coil = inventory.stacks(ItemId::StormCoil);
        let nanite = inventory.stacks(ItemId::NaniteSwarm);
        let serrated = inventory.stacks(ItemId::SerratedEdge);
        let void_core = inventory.stacks(ItemId::VoidCore);
        let luck = self.player.stats.luck;
        let origin = self.enemies[idx].body.center();

        if fang > 0 {
            self.player.heal(LIFESTEAL_PER_STACK * fang as f32);
        }

        if coil > 0 && self.rng.bool(CHAIN_BASE_CHANCE + luck * CHAIN_LUCK_CHANCE) {
            let damage = CHAIN_DAMAGE_PER_STACK * coil as f32;
            for target in self.living_enemies_near(origin, CHAIN_RADIUS, Some(idx)) {
                self.deal_damage(target, damage, false, HitOrigin::Effect);
            }
            self.spawn_particles(origin, 6, "#9fe3ff");
        }

        if nanite > 0 {
            let state = self.enemies[idx].nanites.get_or_insert_with(DotState::default);
            state.stacks += nanite;
            state.timer = NANITE_DURATION_TICKS;
        }

        if serrated > 0 && crit {
            let state = self.enemies[idx].bleed.get_or_insert_with(DotState::default);
            state.stacks += serrated;
            state.timer = BLEED_DURATION_TICKS;
        }

        if void_core > 0 && self.rng.bool(VOID_BASE_CHANCE + luck * VOID_LUCK_CHANCE) {
            let damage = VOID_DAMAGE_PER_STACK * void_core as f32;
            for target in self.living_enemies_near(origin, VOID_RADIUS, Some(idx)) {
                self.pull_enemy_toward(target, origin, VOID_PULL);
                self.deal_damage(target, damage, false, HitOrigin::Effect);
            }
            self.spawn_particles(origin, 10, "#5b2a86");
        }
    }

    fn on_enemy_killed(&mut self, at: (f32, f32)) {
        self.spawn_particles(at, 8, "#ffffff");
        let harvest = self.player.inventory.stacks(ItemId::SoulHarvest);
        if harvest > 0 && self.rng.bool(HARVEST_CHANCE_PER_STACK * harvest as f32) {
            self.spawn_echo(EnemyKind::Archer.echo_tier(), at);
        }
    }

    fn pull_enemy_toward(&mut self, idx: usize, to: (f32, f32), fraction: f32) {
        let Some(enemy) = self.enemies.get_mut(idx) else {
            return;
        };
        let (cx, cy) = enemy.body.center();
        let nx = enemy.body.x + (to.0 - cx) * fraction;
        let ny = enemy.body.y + (to.1 - cy) * fraction;
        if !collision::blocked(&self.dungeon, nx, ny, enemy.body.w, enemy.body.h) {
            enemy.body.x = nx;
            enemy.body.y = ny;
        }
    }

    pub(super) fn living_enemies_near(
        &self,
        at: (f32, f32),
        radius: f32,
        exclude: Option<usize>,
    ) -> Vec<usize> {
        self.enemies
            .iter()
            .enumerate()
            .filter(|(idx, enemy)| {
                Some(*idx) != exclude
                    && enemy.is_alive()
                    && distance(enemy.body.center(), at) <= radius
            })
            .map(|(idx, _)| idx)
            .collect()
    }

    pub(super) fn roll_player_damage(&mut self, multiplier: f32, melee: bool) -> (f32, bool) {
        let mut damage = self.player.effective_damage() * multiplier;
        if melee {
            damage *= self.combo_multiplier();
        }
        self.roll_crit(damage)
    }

    pub(super) fn roll_crit(&mut self, damage: f32) -> (f32, bool) {
        if self.rng.bool(self.player.effective_crit_chance()) {
            (damage * self.player.stats.crit_damage, true)
        } else {
            (damage, false)
        }
    }

    pub(super) fn combo_multiplier(&self) -> f32 {
        (1.0 + COMBO_STEP * self.player.combo as f32).min(COMBO_MAX_MULT)
    }

    pub(super) fn register_combo_hit(&mut self) {
        self.player.combo = self.player.combo.saturating_add(1);
        self.player.combo_timer = COMBO_DECAY_TICKS;
    }

    pub(super) fn damage_player(&mut self, amount: f32) {
        if self.game_over || self.player.invulnerable > 0 {
            return;
        }
        let reduction = self.player.stats.damage_reduction.clamp(0.0, 1.0);
        let effective = (amount * (1.0 - reduction)).max(1.0);
        self.player.hp -= effective;
        self.run_stats.damage_taken += effective;
        self.player.invulnerable = PLAYER_HURT_INVULN_TICKS;
        self.player.hit_flash = HIT_FLASH_TICKS;
        self.player.combo = 0;
        self.player.combo_timer = 0;
        self.add_shake(4.0);

        let berserk = self.player.inventory.stacks(ItemId::BerserkerBlood);
        if berserk > 0 {
            self.player.grant_buff(
                BuffKind::AttackSpeed,
                BERSERK_TICKS,
                BERSERK_ATTACK_SPEED_PER_STACK * berserk as f32,
            );
        }

        if !self.player.is_defeated() {
            return;
        }
        if self.player.inventory.has(ItemId::PhoenixFeather) && !self.player.revive_used {
            self.revive_player();
        } else {
            self.player.hp = 0.0;
            self.game_over = true;
            self.events.push(RuntimeEvent::GameOver {
                floor: self.dungeon.floor,
                level: self.player.level,
            });
        }
    }

    fn revive_player(&mut self) {
        self.player.revive_used = true;
        self.player.hp = self.player.max_hp * 0.5;
        self.player.invulnerable = REVIVE_INVULN_TICKS;
        let center = self.player.center();
        for target in self.living_enemies_near(center, REVIVE_BURST_RADIUS, None) {
            self.deal_damage(target, REVIVE_BURST_DAMAGE, false, HitOrigin::Effect);
        }
        self.spawn_particles(center, 24, "#ff9f1c");
        self.hit_stop = HIT_STOP_TICKS;
        self.add_shake(10.0);
        self.events.push(RuntimeEvent::PlayerRevived);
    }

    pub(super) fn tick_damage_over_time(&mut self) {
        for idx in 0..self.enemies.len() {
            if !self.enemies[idx].is_alive() {
                continue;
            }
            let enemy = &mut self.enemies[idx];
            let nanite = tick_dot(&mut enemy.nanites, NANITE_PERIOD_TICKS, NANITE_DAMAGE_PER_STACK);
            let bleed = tick_dot(&mut enemy.bleed, BLEED_PERIOD_TICKS, BLEED_DAMAGE_PER_STACK);
            if let Some(damage) = nanite {
                self.deal_damage(idx, damage, false, HitOrigin::Effect);
            }
            if let Some(damage) = bleed {
                self.deal_damage(idx, damage, false, HitOrigin::Effect);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_engine;
    use super::HitOrigin;
    use crate::entity::DotState;
    use crate::types::{BuffKind, EnemyKind, ItemId, RuntimeEvent};

    #[test]
    fn plain_hit_subtracts_exact_amount() {
        let mut engine = test_engine(1);
        let idx = engine.place_test_enemy(EnemyKind::Grunt, 80.0, 0.0, 30.0);
        engine.deal_damage(idx, 12.0, false, HitOrigin::Direct);
        assert_eq!(engine.enemies[idx].hp, 18.0);
        assert_eq!(engine.run_stats.damage_applications, 1);
    }

    #[test]
    fn direct_hits_flash_and_knock_back_but_effects_do_not() {
        let mut engine = test_engine(2);
        let a = engine.place_test_enemy(EnemyKind::Grunt, 80.0, 0.0, 30.0);
        let b = engine.place_test_enemy(EnemyKind::Grunt, -80.0, 0.0, 30.0);
        engine.deal_damage(a, 1.0, false, HitOrigin::Direct);
        engine.deal_damage(b, 1.0, false, HitOrigin::Effect);
        assert!(engine.enemies[a].hit_flash > 0);
        assert!(engine.enemies[a].knockback.0 > 0.0);
        assert_eq!(engine.enemies[b].hit_flash, 0);
        assert_eq!(engine.enemies[b].knockback, (0.0, 0.0));
    }

    #[test]
    fn damage_reduction_scales_and_floors_at_one() {
        let mut engine = test_engine(3);
        engine.player.stats.damage_reduction = 0.5;
        let before = engine.player.hp;
        engine.damage_player(10.0);
        assert_eq!(before - engine.player.hp, 5.0);

        let mut engine = test_engine(3);
        engine.player.stats.damage_reduction = 0.95;
        let before = engine.player.hp;
        engine.damage_player(10.0);
        assert_eq!(before - engine.player.hp, 1.0);
    }

    #[test]
    fn invulnerable_player_takes_no_damage() {
        let mut engine = test_engine(4);
        engine.player.invulnerable = 5;
        engine.damage_player(40.0);
        assert_eq!(engine.player.hp, engine.player.max_hp);
    }

    #[test]
    fn taking_damage_resets_combo_and_triggers_berserk() {
        let mut engine = test_engine(5);
        engine.grant_items(ItemId::BerserkerBlood, 2);
        engine.player.combo = 7;
        engine.player.combo_timer = 30;
        engine.damage_player(5.0);
        assert_eq!(engine.player.combo, 0);
        let buff = engine.player.buff_magnitude(BuffKind::AttackSpeed);
        assert!((buff - 0.6).abs() < 1e-6);
    }

    #[test]
    fn effect_damage_never_chains_further() {
        let mut engine = test_engine(6);
        engine.grant_items(ItemId::StormCoil, 3);
        engine.grant_items(ItemId::VoidCore, 3);
        engine.grant_items(ItemId::NaniteSwarm, 2);
        engine.grant_items(ItemId::VampiricFang, 2);
        engine.grant_items(ItemId::SerratedEdge, 2);
        engine.grant_items(ItemId::Clover, 20);
        let count = 8;
        for idx in 0..count {
            let offset = idx as f32 * 6.0;
            engine.place_test_enemy(EnemyKind::Brute, 60.0 + offset, offset - 20.0, 10_000.0);
        }

        engine.deal_damage(0, 5.0, true, HitOrigin::Direct);
        let others = (count - 1) as u64;
        let applications = engine.run_stats.damage_applications;
        // one primary hit, then at most one chain and one void application per neighbour
        assert!(applications <= 1 + 2 * others, "applications={applications}");
        assert_eq!(applications, 1 + 2 * others);
        for enemy in &engine.enemies[1..] {
            assert!(enemy.nanites.is_none());
            assert!(enemy.bleed.is_none());
        }
        assert!(engine.enemies[0].nanites.is_some());
        assert!(engine.enemies[0].bleed.is_some());
    }

    #[test]
    fn nanites_stack_and_refresh_without_adding_time() {
        let mut engine = test_engine(7);
        engine.grant_items(ItemId::NaniteSwarm, 2);
        let idx = engine.place_test_enemy(EnemyKind::Brute, 80.0, 0.0, 500.0);
        engine.deal_damage(idx, 1.0, false, HitOrigin::Direct);
        engine.enemies[idx].nanites.as_mut().expect("nanites applied").timer = 10;
        engine.deal_damage(idx, 1.0, false, HitOrigin::Direct);
        assert_eq!(
            engine.enemies[idx].nanites,
            Some(DotState {
                stacks: 4,
                timer: super::NANITE_DURATION_TICKS,
            })
        );
    }

    #[test]
    fn bleed_requires_a_critical_hit() {
        let mut engine = test_engine(8);
        engine.grant_items(ItemId::SerratedEdge, 1);
        let idx = engine.place_test_enemy(EnemyKind::Brute, 80.0, 0.0, 500.0);
        engine.deal_damage(idx, 1.0, false, HitOrigin::Direct);
        assert!(engine.enemies[idx].bleed.is_none());
        engine.deal_damage(idx, 1.0, true, HitOrigin::Direct);
        assert!(engine.enemies[idx].bleed.is_some());
    }

    #[test]
    fn lifesteal_heals_per_stack_and_clamps() {
        let mut engine = test_engine(9);
        engine.grant_items(ItemId::VampiricFang, 3);
        engine.player.hp = 50.0;
        let idx = engine.place_test_enemy(EnemyKind::Brute, 80.0, 0.0, 500.0);
        engine.deal_damage(idx, 1.0, false, HitOrigin::Direct);
        assert_eq!(engine.player.hp, 53.0);
        engine.player.hp = engine.player.max_hp - 1.0;
        engine.deal_damage(idx, 1.0, false, HitOrigin::Direct);
        assert_eq!(engine.player.hp, engine.player.max_hp);
    }

    #[test]
    fn dead_enemies_are_not_processed_twice() {
        let mut engine = test_engine(10);
        let idx = engine.place_test_enemy(EnemyKind::Grunt, 80.0, 0.0, 5.0);
        engine.deal_damage(idx, 10.0, false, HitOrigin::Direct);
        engine.deal_damage(idx, 10.0, false, HitOrigin::Direct);
        assert_eq!(engine.run_stats.damage_applications, 1);
        engine.reap_enemies();
        assert!(engine.enemies.is_empty());
        assert_eq!(engine.player.shadow_stack.len(), 1);
        assert_eq!(engine.run_stats.enemies_defeated, 1);
    }

    #[test]
    fn soul_harvest_spawns_tier_two_echoes_on_kill() {
        let mut engine = test_engine(11);
        engine.grant_items(ItemId::SoulHarvest, 5);
        let idx = engine.place_test_enemy(EnemyKind::Grunt, 80.0, 0.0, 5.0);
        engine.deal_damage(idx, 10.0, false, HitOrigin::Direct);
        assert_eq!(engine.echoes.len(), 1);
        assert_eq!(engine.echoes[0].tier, 2);
    }

    #[test]
    fn phoenix_revives_once_without_consuming_the_stack() {
        let mut engine = test_engine(12);
        engine.grant_items(ItemId::PhoenixFeather, 1);
        let idx = engine.place_test_enemy(EnemyKind::Grunt, 60.0, 0.0, 50.0);
        engine.player.hp = 5.0;
        engine.damage_player(50.0);

        assert!(!engine.is_game_over());
        assert_eq!(engine.player.hp, engine.player.max_hp * 0.5);
        assert!(engine.player.revive_used);
        assert_eq!(engine.player.inventory.stacks(ItemId::PhoenixFeather), 1);
        assert!(engine.enemies[idx].hp <= 0.0);
        assert!(engine
            .events
            .iter()
            .any(|event| matches!(event, RuntimeEvent::PlayerRevived)));

        engine.player.invulnerable = 0;
        engine.player.hp = 1.0;
        engine.damage_player(50.0);
        assert!(engine.is_game_over());
    }

    #[test]
    fn damage_over_time_ticks_as_effect_damage() {
        let mut engine = test_engine(13);
        let idx = engine.place_test_enemy(EnemyKind::Brute, 80.0, 0.0, 100.0);
        engine.enemies[idx].bleed = Some(DotState {
            stacks: 2,
            timer: super::BLEED_PERIOD_TICKS + 2,
        });
        engine.tick_damage_over_time();
        assert_eq!(engine.enemies[idx].hp, 100.0);
        engine.tick_damage_over_time();
        assert_eq!(engine.enemies[idx].hp, 100.0 - 2.0 * super::BLEED_DAMAGE_PER_STACK);
        assert_eq!(engine.enemies[idx].hit_flash, 0);
    }
}
