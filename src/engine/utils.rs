use crate::entity::{DotState, Lifetimed};
use crate::rng::Rng;
use crate::types::{EnemyKind, ItemId, ItemKind, WeaponKind};

#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct EnemyTemplate {
    pub hp: f32,
    pub contact_damage: f32,
    pub speed: f32,
    pub size: f32,
    pub xp: f32,
    pub color: &'static str,
}

pub(super) fn enemy_template(kind: EnemyKind) -> EnemyTemplate {
    match kind {
        EnemyKind::Grunt => EnemyTemplate {
            hp: 30.0,
            contact_damage: 8.0,
            speed: 1.6,
            size: 22.0,
            xp: 10.0,
            color: "#d9534f",
        },
        EnemyKind::Archer => EnemyTemplate {
            hp: 22.0,
            contact_damage: 5.0,
            speed: 1.3,
            size: 20.0,
            xp: 14.0,
            color: "#f0ad4e",
        },
        EnemyKind::Brute => EnemyTemplate {
            hp: 70.0,
            contact_damage: 16.0,
            speed: 1.0,
            size: 30.0,
            xp: 25.0,
            color: "#8e44ad",
        },
    }
}

pub(super) fn pick_enemy_kind(floor: u32, rng: &mut Rng) -> EnemyKind {
    let roll = rng.next_f32();
    if floor == 0 {
        if roll < 0.75 {
            EnemyKind::Grunt
        } else {
            EnemyKind::Archer
        }
    } else if floor < 3 {
        if roll < 0.5 {
            EnemyKind::Grunt
        } else if roll < 0.8 {
            EnemyKind::Archer
        } else {
            EnemyKind::Brute
        }
    } else if roll < 0.4 {
        EnemyKind::Grunt
    } else if roll < 0.7 {
        EnemyKind::Archer
    } else {
        EnemyKind::Brute
    }
}

pub(super) fn roll_reward(rng: &mut Rng) -> ItemKind {
    let roll = rng.int(1, 100);
    if roll <= 50 {
        ItemKind::HealVial
    } else if roll <= 75 {
        ItemKind::DamageBuff
    } else if roll <= 93 {
        ItemKind::SpeedBuff
    } else {
        let weapon = WeaponKind::ALL[rng.pick_index(WeaponKind::ALL.len())];
        ItemKind::Weapon { weapon }
    }
}

pub(super) fn roll_upgrade_choices(rng: &mut Rng, count: usize) -> Vec<ItemId> {
    let mut pool = ItemId::ALL.to_vec();
    let mut choices = Vec::with_capacity(count);
    while choices.len() < count && !pool.is_empty() {
        let idx = rng.pick_index(pool.len());
        choices.push(pool.swap_remove(idx));
    }
    choices
}

pub(super) fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    f32::hypot(a.0 - b.0, a.1 - b.1)
}

pub(super) fn angle_to(from: (f32, f32), to: (f32, f32)) -> f32 {
    (to.1 - from.1).atan2(to.0 - from.0)
}

pub(super) fn tick_dot(state: &mut Option<DotState>, period: u32, per_stack: f32) -> Option<f32> {
    let dot = state.as_mut()?;
    dot.timer = dot.timer.saturating_sub(1);
    let damage = (dot.timer % period.max(1) == 0).then(|| dot.stacks as f32 * per_stack);
    if dot.timer == 0 {
        *state = None;
    }
    damage
}

pub(super) fn advance_lifetimed<T: Lifetimed>(list: &mut Vec<T>, friction: f32) {
    list.retain_mut(|entity| {
        let body = entity.body_mut();
        body.x += body.vx;
        body.y += body.vy;
        body.vx *= friction;
        body.vy *= friction;
        entity.tick_lifetime()
    });
}

#[cfg(test)]
mod tests {
    use super::{pick_enemy_kind, roll_reward, roll_upgrade_choices, tick_dot};
    use crate::entity::DotState;
    use crate::rng::Rng;
    use crate::types::{EnemyKind, ItemKind};

    #[test]
    fn reward_weights_are_roughly_respected() {
        let mut rng = Rng::new(99);
        let mut heals = 0;
        let mut weapons = 0;
        for _ in 0..10_000 {
            match roll_reward(&mut rng) {
                ItemKind::HealVial => heals += 1,
                ItemKind::Weapon { .. } => weapons += 1,
                ItemKind::DamageBuff | ItemKind::SpeedBuff => {}
                ItemKind::Portal => panic!("portal is never a room reward"),
            }
        }
        assert!((4_500..5_500).contains(&heals), "heals={heals}");
        assert!((400..1_000).contains(&weapons), "weapons={weapons}");
    }

    #[test]
    fn upgrade_choices_are_distinct() {
        for seed in 0..200u32 {
            let mut rng = Rng::new(seed);
            let choices = roll_upgrade_choices(&mut rng, 3);
            assert_eq!(choices.len(), 3);
            assert_ne!(choices[0], choices[1]);
            assert_ne!(choices[0], choices[2]);
            assert_ne!(choices[1], choices[2]);
        }
    }

    #[test]
    fn first_floor_never_rolls_brutes() {
        let mut rng = Rng::new(4);
        for _ in 0..1_000 {
            assert_ne!(pick_enemy_kind(0, &mut rng), EnemyKind::Brute);
        }
    }

    #[test]
    fn dot_fires_on_period_and_expires() {
        let mut state = Some(DotState {
            stacks: 2,
            timer: 6,
        });
        let mut total = 0.0;
        let mut fired = 0;
        for _ in 0..10 {
            if let Some(damage) = tick_dot(&mut state, 3, 1.5) {
                total += damage;
                fired += 1;
            }
        }
        assert_eq!(fired, 2);
        assert!((total - 6.0).abs() < 1e-6);
        assert!(state.is_none());
    }
}
