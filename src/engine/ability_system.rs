use super::*;

const ECHO_FOLLOW_DISTANCE: f32 = 60.0;

impl GameEngine {
    pub(super) fn update_player(&mut self) {
        let player = &mut self.player;
        player.attack_cooldown = player.attack_cooldown.saturating_sub(1);
        player.dash_cooldown = player.dash_cooldown.saturating_sub(1);
        player.secondary_cooldown = player.secondary_cooldown.saturating_sub(1);
        player.summon_cooldown = player.summon_cooldown.saturating_sub(1);
        player.invulnerable = player.invulnerable.saturating_sub(1);
        player.hit_flash = player.hit_flash.saturating_sub(1);
        player.aim = angle_to(
            player.center(),
            (self.input.pointer_x, self.input.pointer_y),
        );

        self.advance_player_mode();
        if self.player.mode.is_grounded() {
            self.try_dash();
            self.try_secondary();
        }
        if matches!(self.player.mode, PlayerMode::Grounded | PlayerMode::Dashing) {
            self.try_attack();
        }
        self.try_summon();

        collision::resolve(&mut self.player.body, &self.dungeon);
    }

    fn advance_player_mode(&mut self) {
        let (mx, my) = self.input.move_vector();
        let speed = self.player.effective_speed();
        let player = &mut self.player;

        match &mut player.mode {
            PlayerMode::Grounded => {
                player.body.vx = mx * speed;
                player.body.vy = my * speed;
            }
            PlayerMode::Dashing => {
                player.body.vx *= DASH_FRICTION;
                player.body.vy *= DASH_FRICTION;
                if f32::hypot(player.body.vx, player.body.vy) <= speed {
                    player.mode = PlayerMode::Grounded;
                }
            }
            PlayerMode::SlashDashing { ticks_left, .. } => {
                *ticks_left = ticks_left.saturating_sub(1);
                player.invulnerable = player.invulnerable.max(1);
                if *ticks_left == 0 {
                    player.mode = PlayerMode::Grounded;
                    player.body.vx = 0.0;
                    player.body.vy = 0.0;
                }
            }
            PlayerMode::Spinning { ticks_left, angle } => {
                *ticks_left = ticks_left.saturating_sub(1);
                *angle += SPIN_ARC_SPEED;
                player.body.vx = mx * speed * SPIN_MOVE_MULT;
                player.body.vy = my * speed * SPIN_MOVE_MULT;
                if *ticks_left == 0 {
                    player.mode = PlayerMode::Grounded;
                }
            }
        }
    }

    fn try_dash(&mut self) {
        if !self.input.is_held(Action::Dash) || self.player.dash_cooldown > 0 {
            return;
        }
        let (mx, my) = self.input.move_vector();
        let angle = if mx == 0.0 && my == 0.0 {
            self.player.aim
        } else {
            my.atan2(mx)
        };
        self.player.body.vx = angle.cos() * DASH_SPEED;
        self.player.body.vy = angle.sin() * DASH_SPEED;
        self.player.mode = PlayerMode::Dashing;
        self.player.dash_cooldown =
            ability_cooldown(DASH_COOLDOWN_TICKS, self.player.stats.cooldown_reduction);
    }

    fn try_attack(&mut self) {
        if !self.input.is_held(Action::LeftMouse) || self.player.attack_cooldown > 0 {
            return;
        }
        let cooldown = (ATTACK_COOLDOWN_TICKS / self.player.effective_attack_speed()).ceil();
        self.player.attack_cooldown = (cooldown as u32).max(1);

        let aim = self.player.aim;
        if self.player.weapon.is_melee() {
            self.player.swing = Some(Swing {
                ticks_left: SWING_TICKS,
                angle: aim,
                struck: HashSet::new(),
            });
            return;
        }
        let shot = ShotSpec {
            damage: self.player.effective_damage(),
            speed: SHOT_SPEED,
            size: SHOT_SIZE,
            lifetime: SHOT_LIFETIME,
            pierce: false,
        };
        self.spawn_projectile(ProjectileOwner::Player, self.player.center(), aim, shot);
    }

    fn try_secondary(&mut self) {
        let wants = self.input.is_held(Action::SecondaryAbility)
            || self.input.is_held(Action::RightMouse);
        if !wants || self.player.secondary_cooldown > 0 {
            return;
        }
        let aim = self.player.aim;
        let center = self.player.center();
        let base_cooldown = match self.player.weapon.secondary() {
            SecondaryAbility::Wave => {
                let shot = ShotSpec {
                    damage: self.player.effective_damage() * WAVE_DAMAGE_MULT,
                    speed: WAVE_SPEED,
                    size: WAVE_SIZE,
                    lifetime: WAVE_LIFETIME,
                    pierce: true,
                };
                self.spawn_projectile(ProjectileOwner::Player, center, aim, shot);
                WAVE_COOLDOWN_TICKS
            }
            SecondaryAbility::SlashDash => {
                self.player.mode = PlayerMode::SlashDashing {
                    ticks_left: SLASH_DASH_TICKS,
                    struck: HashSet::new(),
                };
                self.player.body.vx = aim.cos() * SLASH_DASH_SPEED;
                self.player.body.vy = aim.sin() * SLASH_DASH_SPEED;
                self.player.invulnerable = self.player.invulnerable.max(SLASH_DASH_TICKS);
                SLASH_DASH_COOLDOWN_TICKS
            }
            SecondaryAbility::Spin => {
                self.player.mode = PlayerMode::Spinning {
                    ticks_left: SPIN_TICKS,
                    angle: aim,
                };
                SPIN_COOLDOWN_TICKS
            }
            SecondaryAbility::Volley => {
                let damage = self.player.effective_damage() * VOLLEY_DAMAGE_MULT;
                for spread in VOLLEY_SPREAD {
                    let shot = ShotSpec {
                        damage,
                        speed: SHOT_SPEED,
                        size: SHOT_SIZE,
                        lifetime: SHOT_LIFETIME,
                        pierce: false,
                    };
                    self.spawn_projectile(ProjectileOwner::Player, center, aim + spread, shot);
                }
                VOLLEY_COOLDOWN_TICKS
            }
        };
        self.player.secondary_cooldown =
            ability_cooldown(base_cooldown, self.player.stats.cooldown_reduction);
    }

    fn try_summon(&mut self) {
        if !self.input.is_held(Action::PrimaryAbility)
            || self.player.summon_cooldown > 0
            || self.player.shadow_stack.is_empty()
        {
            return;
        }
        let charges: Vec<EnemyKind> = self.player.shadow_stack.drain(..).collect();
        let (cx, cy) = self.player.center();
        let count = charges.len();
        for (idx, kind) in charges.into_iter().enumerate() {
            let angle = std::f32::consts::TAU * idx as f32 / count as f32;
            let at = (
                cx + angle.cos() * SUMMON_RING_RADIUS,
                cy + angle.sin() * SUMMON_RING_RADIUS,
            );
            self.spawn_echo(kind.echo_tier(), at);
        }
        self.run_stats.echoes_summoned += count as u64;
        self.events.push(RuntimeEvent::EchoesSummoned { count });
        self.player.summon_cooldown =
            ability_cooldown(SUMMON_COOLDOWN_TICKS, self.player.stats.cooldown_reduction);
    }

    pub(super) fn resolve_player_hits(&mut self) {
        self.resolve_swing();
        self.resolve_slash_dash();
        self.resolve_spin();
    }

    fn resolve_swing(&mut self) {
        let Some(mut swing) = self.player.swing.take() else {
            return;
        };
        let (px, py) = self.player.center();
        let hx = px + swing.angle.cos() * SWING_REACH;
        let hy = py + swing.angle.sin() * SWING_REACH;
        let targets: Vec<usize> = self
            .enemies
            .iter()
            .enumerate()
            .filter(|(_, enemy)| {
                enemy.is_alive()
                    && !swing.struck.contains(&enemy.id)
                    && enemy.body.intersects_circle(hx, hy, SWING_RADIUS)
            })
            .map(|(idx, _)| idx)
            .collect();
        for idx in targets {
            swing.struck.insert(self.enemies[idx].id);
            let (damage, crit) = self.roll_player_damage(1.0, true);
            self.deal_damage(idx, damage, crit, HitOrigin::Direct);
            self.register_combo_hit();
        }

        swing.ticks_left = swing.ticks_left.saturating_sub(1);
        if swing.ticks_left > 0 {
            self.player.swing = Some(swing);
        }
    }

    fn resolve_slash_dash(&mut self) {
        let PlayerMode::SlashDashing { struck, .. } = &mut self.player.mode else {
            return;
        };
        let body = &self.player.body;
        let targets: Vec<usize> = self
            .enemies
            .iter()
            .enumerate()
            .filter(|(_, enemy)| {
                enemy.is_alive() && !struck.contains(&enemy.id) && enemy.body.intersects(body)
            })
            .map(|(idx, _)| idx)
            .collect();
        for &idx in &targets {
            struck.insert(self.enemies[idx].id);
        }
        for idx in targets {
            let (damage, crit) = self.roll_player_damage(SLASH_DASH_DAMAGE_MULT, true);
            self.deal_damage(idx, damage, crit, HitOrigin::Direct);
            self.register_combo_hit();
        }
    }

    fn resolve_spin(&mut self) {
        let PlayerMode::Spinning { angle, .. } = self.player.mode else {
            return;
        };
        let (px, py) = self.player.center();
        let reach = SPIN_RADIUS / 2.0;
        let hx = px + angle.cos() * reach;
        let hy = py + angle.sin() * reach;
        let targets: Vec<usize> = self
            .enemies
            .iter()
            .enumerate()
            .filter(|(_, enemy)| {
                enemy.is_alive()
                    && enemy.channel_immunity == 0
                    && enemy.body.intersects_circle(hx, hy, reach)
            })
            .map(|(idx, _)| idx)
            .collect();
        for idx in targets {
            self.enemies[idx].channel_immunity = SPIN_IMMUNITY_TICKS;
            let (damage, crit) = self.roll_player_damage(SPIN_DAMAGE_MULT, true);
            self.deal_damage(idx, damage, crit, HitOrigin::Direct);
            self.register_combo_hit();
        }
    }

    pub(super) fn update_echoes(&mut self) {
        let mut echoes = std::mem::take(&mut self.echoes);
        let player_center = self.player.center();

        for echo in echoes.iter_mut() {
            if !echo.tick_lifetime() {
                continue;
            }
            echo.attack_cooldown = echo.attack_cooldown.saturating_sub(1);
            let center = echo.center();

            let locked = echo
                .target
                .and_then(|id| self.enemies.iter().position(|enemy| enemy.id == id))
                .filter(|&idx| {
                    let enemy = &self.enemies[idx];
                    enemy.is_alive() && distance(enemy.body.center(), center) <= ECHO_SEEK_RADIUS
                });
            let target = locked.or_else(|| self.nearest_enemy(center, ECHO_SEEK_RADIUS));
            echo.target = target.map(|idx| self.enemies[idx].id);

            let goal = match target {
                Some(idx) => Some(self.enemies[idx].body.center()),
                None if distance(center, player_center) > ECHO_FOLLOW_DISTANCE => {
                    Some(player_center)
                }
                None => None,
            };
            if let Some(goal) = goal {
                let angle = angle_to(center, goal);
                echo.body.x += angle.cos() * echo.speed;
                echo.body.y += angle.sin() * echo.speed;
            }

            if let Some(idx) = target {
                if echo.attack_cooldown == 0 && echo.body.intersects(&self.enemies[idx].body) {
                    echo.attack_cooldown = ECHO_ATTACK_COOLDOWN_TICKS;
                    let damage = echo.damage;
                    self.deal_damage(idx, damage, false, HitOrigin::Direct);
                }
            }
        }

        echoes.retain(|echo| echo.lifetime > 0);
        echoes.append(&mut self.echoes);
        self.echoes = echoes;
    }

    pub(super) fn nearest_enemy(&self, at: (f32, f32), radius: f32) -> Option<usize> {
        self.enemies
            .iter()
            .enumerate()
            .filter(|(_, enemy)| enemy.is_alive())
            .map(|(idx, enemy)| (idx, distance(enemy.body.center(), at)))
            .filter(|(_, dist)| *dist <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(idx, _)| idx)
    }
}
