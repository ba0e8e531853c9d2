use super::*;

const ARCHER_RETREAT_RATIO: f32 = 0.8;
const ITEM_FLOAT_STEP: f32 = 0.1;
const PARTICLE_FRICTION: f32 = 0.9;

impl GameEngine {
    pub(super) fn update_enemies(&mut self) {
        let player_center = self.player.center();

        for idx in 0..self.enemies.len() {
            if !self.enemies[idx].is_alive() {
                continue;
            }
            let enemy = &mut self.enemies[idx];
            enemy.hit_flash = enemy.hit_flash.saturating_sub(1);
            enemy.channel_immunity = enemy.channel_immunity.saturating_sub(1);
            enemy.attack_cooldown = enemy.attack_cooldown.saturating_sub(1);

            let center = enemy.body.center();
            let dist = distance(center, player_center);
            let angle = angle_to(center, player_center);
            let aggro = dist <= enemy.aggro_radius;
            let step = match (aggro, enemy.kind) {
                (false, _) => 0.0,
                (true, EnemyKind::Archer) if dist < ARCHER_PREFERRED_RANGE * ARCHER_RETREAT_RATIO => {
                    -enemy.speed
                }
                (true, EnemyKind::Archer) if dist <= ARCHER_PREFERRED_RANGE => 0.0,
                (true, _) => enemy.speed,
            };
            let (kx, ky) = enemy.knockback;
            enemy.body.vx = angle.cos() * step + kx;
            enemy.body.vy = angle.sin() * step + ky;
            enemy.knockback = (kx * KNOCKBACK_FRICTION, ky * KNOCKBACK_FRICTION);
            collision::resolve(&mut enemy.body, &self.dungeon);

            let fires = aggro && enemy.kind == EnemyKind::Archer && enemy.attack_cooldown == 0;
            let touching = enemy.body.intersects(&self.player.body) && enemy.attack_cooldown == 0;
            let contact_damage = enemy.contact_damage;
            if fires {
                enemy.attack_cooldown = ARCHER_SHOT_COOLDOWN_TICKS;
                let from = enemy.body.center();
                let shot = ShotSpec {
                    damage: contact_damage,
                    speed: ARCHER_SHOT_SPEED,
                    size: SHOT_SIZE,
                    lifetime: ARCHER_SHOT_LIFETIME,
                    pierce: false,
                };
                self.spawn_projectile(ProjectileOwner::Enemy, from, angle, shot);
            } else if touching {
                enemy.attack_cooldown = ENEMY_ATTACK_COOLDOWN_TICKS;
                self.damage_player(contact_damage);
            }
            if self.game_over {
                return;
            }
        }
    }

    pub(super) fn reap_enemies(&mut self) {
        if !self.enemies.iter().any(Damageable::is_defeated) {
            return;
        }
        let (defeated, alive): (Vec<Enemy>, Vec<Enemy>) = std::mem::take(&mut self.enemies)
            .into_iter()
            .partition(Damageable::is_defeated);
        self.enemies = alive;

        for enemy in defeated {
            self.player.shadow_stack.push_back(enemy.kind);
            self.player.xp += enemy.xp;
            self.run_stats.enemies_defeated += 1;
            if enemy.elite {
                self.hit_stop = HIT_STOP_TICKS;
                self.add_shake(6.0);
            }
            self.events.push(RuntimeEvent::EnemyDefeated {
                enemy_id: enemy.id,
                kind: enemy.kind,
                elite: enemy.elite,
            });
        }
        self.check_level_up();
    }

    /// Enters the pending-upgrade state when xp has reached the threshold.
    /// Only one level is taken at a time; the rest wait for `select_upgrade`.
    pub(super) fn check_level_up(&mut self) {
        if self.pending_level_up || self.player.xp < self.player.max_xp {
            return;
        }
        self.player.level += 1;
        self.player.xp -= self.player.max_xp;
        self.player.max_xp *= MAX_XP_GROWTH;
        self.upgrade_choices = roll_upgrade_choices(&mut self.rng, UPGRADE_CHOICE_COUNT);
        self.pending_level_up = true;
        self.events.push(RuntimeEvent::LevelUp {
            level: self.player.level,
            choices: self.upgrade_choices.clone(),
        });
    }

    pub(super) fn update_projectiles(&mut self) {
        let mut projectiles = std::mem::take(&mut self.projectiles);

        for projectile in projectiles.iter_mut() {
            let body = &mut projectile.body;
            body.x += body.vx;
            body.y += body.vy;
            if collision::blocked(&self.dungeon, body.x, body.y, body.w, body.h)
                || !projectile.tick_lifetime()
            {
                projectile.lifetime = 0;
                continue;
            }

            match projectile.owner {
                ProjectileOwner::Player => self.projectile_hits_enemies(projectile),
                ProjectileOwner::Enemy => {
                    if projectile.body.intersects(&self.player.body) {
                        self.damage_player(projectile.damage);
                        projectile.lifetime = 0;
                    }
                }
            }
        }

        projectiles.retain(|projectile| projectile.lifetime > 0);
        projectiles.append(&mut self.projectiles);
        self.projectiles = projectiles;
    }

    fn projectile_hits_enemies(&mut self, projectile: &mut Projectile) {
        let targets: Vec<usize> = self
            .enemies
            .iter()
            .enumerate()
            .filter(|(_, enemy)| {
                enemy.is_alive()
                    && !projectile.struck.contains(&enemy.id)
                    && enemy.body.intersects(&projectile.body)
            })
            .map(|(idx, _)| idx)
            .collect();
        for idx in targets {
            projectile.struck.insert(self.enemies[idx].id);
            let (damage, crit) = self.roll_crit(projectile.damage);
            self.deal_damage(idx, damage, crit, HitOrigin::Direct);
            self.register_combo_hit();
            if !projectile.pierce {
                projectile.lifetime = 0;
                return;
            }
        }
    }

    pub(super) fn update_items(&mut self) {
        let player_center = self.player.center();
        let range = self.player.stats.pickup_range;
        let mut collected = Vec::new();

        for (idx, item) in self.items.iter_mut().enumerate() {
            item.float_phase = (item.float_phase + ITEM_FLOAT_STEP) % std::f32::consts::TAU;
            if !item.kind.is_interactable() && distance(item.center(), player_center) <= range {
                collected.push(idx);
            }
        }
        for idx in collected.into_iter().rev() {
            let item = self.items.remove(idx);
            self.apply_consumable(item.kind);
        }

        if self.pressed(Action::Interact) {
            if let Some(idx) = self.nearest_interactable() {
                let item = self.items.remove(idx);
                self.interact_with(item.kind);
            }
        }
    }

    fn apply_consumable(&mut self, kind: ItemKind) {
        match kind {
            ItemKind::HealVial => self.player.heal(HEAL_VIAL_AMOUNT),
            ItemKind::DamageBuff => {
                self.player
                    .grant_buff(BuffKind::Damage, BUFF_TICKS, DAMAGE_BUFF_MAGNITUDE)
            }
            ItemKind::SpeedBuff => {
                self.player
                    .grant_buff(BuffKind::Speed, BUFF_TICKS, SPEED_BUFF_MAGNITUDE)
            }
            ItemKind::Weapon { .. } | ItemKind::Portal => return,
        }
        self.events.push(RuntimeEvent::ItemPickedUp { item: kind });
    }

    fn interact_with(&mut self, kind: ItemKind) {
        match kind {
            ItemKind::Weapon { weapon } => {
                self.player.weapon = weapon;
                self.player.swing = None;
                self.events.push(RuntimeEvent::WeaponEquipped { weapon });
            }
            ItemKind::Portal => self.enter_floor(self.dungeon.floor + 1),
            ItemKind::HealVial | ItemKind::DamageBuff | ItemKind::SpeedBuff => {}
        }
    }

    pub(super) fn nearest_interactable(&self) -> Option<usize> {
        let player_center = self.player.center();
        let range = self.player.stats.pickup_range;
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.kind.is_interactable())
            .map(|(idx, item)| (idx, distance(item.center(), player_center)))
            .filter(|(_, dist)| *dist <= range)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(idx, _)| idx)
    }

    pub(super) fn enter_floor(&mut self, floor: u32) {
        self.dungeon = generate_dungeon(floor, &mut self.rng);
        self.enemies.clear();
        self.echoes.clear();
        self.projectiles.clear();
        self.items.clear();
        self.particles.clear();
        self.damage_numbers.clear();

        let (cx, cy) = spawn_point(&self.dungeon);
        let player = &mut self.player;
        player.body.set_center(cx, cy);
        player.body.vx = 0.0;
        player.body.vy = 0.0;
        player.mode = PlayerMode::Grounded;
        player.swing = None;

        self.prepare_floor();
        self.run_stats.floors_entered += 1;
        self.events.push(RuntimeEvent::FloorEntered { floor });
    }

    pub(super) fn update_effects(&mut self) {
        advance_lifetimed(&mut self.particles, PARTICLE_FRICTION);
        advance_lifetimed(&mut self.damage_numbers, 1.0);
    }
}
