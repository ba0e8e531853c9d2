use super::*;

const SPAWN_ATTEMPTS: usize = 24;

impl GameEngine {
    pub(super) fn spawn_enemy_in_room(&mut self, room_idx: usize) -> bool {
        let floor = self.dungeon.floor;
        let kind = pick_enemy_kind(floor, &mut self.rng);
        let elite = self.rng.bool(get_elite_chance(floor));
        let template = enemy_template(kind);
        let (hp_mult, damage_mult) = get_floor_multiplier(floor);
        let (elite_hp, elite_damage, elite_size, elite_xp) = if elite {
            (2.5, 1.5, 1.3, 3.0)
        } else {
            (1.0, 1.0, 1.0, 1.0)
        };
        let size = template.size * elite_size;

        let Some((cx, cy)) = self.pick_enemy_spawn_position(room_idx, size) else {
            return false;
        };
        let id = self.make_id();
        let hp = template.hp * hp_mult * elite_hp;
        let color = if elite { "#ffd700" } else { template.color };
        self.enemies.push(Enemy {
            id,
            body: Body::centered(cx, cy, size, size).with_color(color),
            kind,
            elite,
            hp,
            max_hp: hp,
            contact_damage: template.contact_damage * damage_mult * elite_damage,
            speed: template.speed,
            attack_cooldown: ENEMY_ATTACK_COOLDOWN_TICKS,
            aggro_radius: ENEMY_AGGRO_RADIUS,
            room_id: Some(room_idx),
            bleed: None,
            nanites: None,
            channel_immunity: 0,
            hit_flash: 0,
            knockback: (0.0, 0.0),
            xp: template.xp * elite_xp,
        });
        true
    }

    fn pick_enemy_spawn_position(&mut self, room_idx: usize, size: f32) -> Option<(f32, f32)> {
        let bounds = self.dungeon.rooms.get(room_idx)?.bounds;
        let player_center = self.player.center();
        let mut fallback = None;

        for _ in 0..SPAWN_ATTEMPTS {
            let tx = self.rng.int(bounds.x, bounds.x + bounds.w - 1);
            let ty = self.rng.int(bounds.y, bounds.y + bounds.h - 1);
            let cx = tx as f32 * TILE_SIZE + TILE_SIZE / 2.0;
            let cy = ty as f32 * TILE_SIZE + TILE_SIZE / 2.0;
            if collision::blocked(&self.dungeon, cx - size / 2.0, cy - size / 2.0, size, size) {
                continue;
            }
            if distance((cx, cy), player_center) < ENEMY_SPAWN_PLAYER_CLEARANCE {
                fallback.get_or_insert((cx, cy));
                continue;
            }
            return Some((cx, cy));
        }
        fallback
    }

    pub(super) fn spawn_echo(&mut self, tier: u8, at: (f32, f32)) {
        let id = self.make_id();
        let tier_f = f32::from(tier);
        let size = ECHO_SIZE + tier_f * 2.0;
        let lifetime = (ECHO_BASE_LIFETIME * self.player.stats.echo_duration_mult).max(1.0) as u32;
        self.echoes.push(Echo {
            id,
            body: Body::centered(at.0, at.1, size, size).with_color("#6c5ce7"),
            tier,
            lifetime,
            damage: self.player.effective_damage() * 0.5 * tier_f,
            speed: 2.5 + 0.5 * tier_f,
            target: None,
            attack_cooldown: 0,
        });
    }

    pub(super) fn spawn_item(&mut self, kind: ItemKind, at: (f32, f32)) {
        let id = self.make_id();
        let phase = self.rng.angle();
        let color = match kind {
            ItemKind::HealVial => "#2ecc71",
            ItemKind::DamageBuff => "#e74c3c",
            ItemKind::SpeedBuff => "#3498db",
            ItemKind::Weapon { .. } => "#bdc3c7",
            ItemKind::Portal => "#9b59b6",
        };
        let size = if kind == ItemKind::Portal {
            ITEM_SIZE * 2.0
        } else {
            ITEM_SIZE
        };
        self.items.push(Item {
            id,
            body: Body::centered(at.0, at.1, size, size).with_color(color),
            kind,
            float_phase: phase,
        });
    }

    pub(super) fn spawn_projectile(
        &mut self,
        owner: ProjectileOwner,
        from: (f32, f32),
        angle: f32,
        shot: ShotSpec,
    ) {
        let id = self.make_id();
        let color = match owner {
            ProjectileOwner::Player => "#f1c40f",
            ProjectileOwner::Enemy => "#e67e22",
        };
        let mut body = Body::centered(from.0, from.1, shot.size, shot.size).with_color(color);
        body.vx = angle.cos() * shot.speed;
        body.vy = angle.sin() * shot.speed;
        self.projectiles.push(Projectile {
            id,
            body,
            owner,
            damage: shot.damage,
            lifetime: shot.lifetime,
            pierce: shot.pierce,
            struck: HashSet::new(),
        });
    }

    pub(super) fn spawn_particles(&mut self, at: (f32, f32), count: usize, color: &'static str) {
        for _ in 0..count {
            let angle = self.rng.angle();
            let speed = self.rng.range(0.5, 3.0);
            let lifetime = self.rng.int(PARTICLE_LIFETIME_MIN, PARTICLE_LIFETIME_MAX) as u32;
            let mut body = Body::centered(at.0, at.1, 3.0, 3.0).with_color(color);
            body.vx = angle.cos() * speed;
            body.vy = angle.sin() * speed;
            self.particles.push(Particle { body, lifetime });
        }
    }

    pub(super) fn spawn_damage_number(&mut self, at: (f32, f32), value: f32, crit: bool) {
        let color = if crit { "#ff4757" } else { "#ffffff" };
        let mut body = Body::centered(at.0, at.1, 1.0, 1.0).with_color(color);
        body.vy = -0.8;
        self.damage_numbers.push(DamageNumber {
            body,
            value,
            crit,
            lifetime: DAMAGE_NUMBER_TICKS,
        });
    }
}

#[derive(Clone, Copy, Debug)]
pub(super) struct ShotSpec {
    pub damage: f32,
    pub speed: f32,
    pub size: f32,
    pub lifetime: u32,
    pub pierce: bool,
}
