use std::collections::{HashMap, HashSet, VecDeque};

use crate::constants::TILE_SIZE;
use crate::engine::GameEngine;
use crate::entity::Positioned;
use crate::types::{Action, InputSnapshot, ItemId, ItemKind, RoomState};
use crate::world::{is_walkable, world_to_tile, Dungeon};

const ENGAGE_RADIUS: f32 = 260.0;
const MELEE_HOLD_RANGE: f32 = 26.0;
const RANGED_HOLD_RANGE: f32 = 170.0;
const RANGED_RETREAT_RANGE: f32 = 90.0;
const SECONDARY_RANGE: f32 = 140.0;
const STEER_DEADZONE: f32 = 2.0;

#[derive(Clone, Debug, Default)]
pub struct Autopilot {
    ticks: u64,
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn choose_upgrade(&self, engine: &GameEngine) -> Option<ItemId> {
        engine.upgrade_choices().first().copied()
    }

    pub fn decide(&mut self, engine: &GameEngine) -> InputSnapshot {
        self.ticks += 1;
        let player = engine.player();
        let center = player.center();

        if let Some(target) = nearest_enemy_center(engine, center, ENGAGE_RADIUS) {
            return self.fight(engine, center, target);
        }

        let mut input = InputSnapshot {
            pointer_x: center.0 + player.aim.cos() * TILE_SIZE,
            pointer_y: center.1 + player.aim.sin() * TILE_SIZE,
            ..InputSnapshot::default()
        };
        let Some((goal, interact)) = pick_goal(engine) else {
            return input;
        };
        steer(engine.dungeon(), center, goal, &mut input);
        if interact
            && distance(center, goal) <= player.stats.pickup_range
            && self.ticks % 2 == 0
        {
            input.held.insert(Action::Interact);
        }
        input
    }

    fn fight(&self, engine: &GameEngine, from: (f32, f32), target: (f32, f32)) -> InputSnapshot {
        let player = engine.player();
        let mut input = InputSnapshot {
            pointer_x: target.0,
            pointer_y: target.1,
            ..InputSnapshot::default()
        };
        input.held.insert(Action::LeftMouse);

        let gap = distance(from, target);
        if player.weapon.is_melee() {
            if gap > MELEE_HOLD_RANGE {
                steer(engine.dungeon(), from, target, &mut input);
            }
        } else if gap > RANGED_HOLD_RANGE {
            steer(engine.dungeon(), from, target, &mut input);
        } else if gap < RANGED_RETREAT_RANGE {
            let away = (from.0 * 2.0 - target.0, from.1 * 2.0 - target.1);
            push_direction(from, away, &mut input);
        }

        if gap <= SECONDARY_RANGE {
            input.held.insert(Action::SecondaryAbility);
        }
        if !player.shadow_stack.is_empty() {
            input.held.insert(Action::PrimaryAbility);
        }
        input
    }
}

fn nearest_enemy_center(engine: &GameEngine, at: (f32, f32), radius: f32) -> Option<(f32, f32)> {
    engine
        .enemies()
        .iter()
        .filter(|enemy| enemy.is_alive())
        .map(|enemy| enemy.center())
        .map(|center| (center, distance(center, at)))
        .filter(|(_, dist)| *dist <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(center, _)| center)
}

fn pick_goal(engine: &GameEngine) -> Option<((f32, f32), bool)> {
    let dungeon = engine.dungeon();
    let center = engine.player().center();

    if let Some(target) = nearest_enemy_center(engine, center, f32::INFINITY) {
        return Some((target, false));
    }
    if let Some(item) = engine
        .items()
        .iter()
        .filter(|item| !item.kind.is_interactable())
        .min_by(|a, b| distance(a.center(), center).total_cmp(&distance(b.center(), center)))
    {
        return Some((item.center(), false));
    }
    if let Some(portal) = engine
        .items()
        .iter()
        .find(|item| item.kind == ItemKind::Portal)
    {
        return Some((portal.center(), true));
    }
    dungeon
        .rooms
        .iter()
        .filter(|room| room.state() == RoomState::Undiscovered)
        .map(|room| room.center_world())
        .min_by(|a, b| distance(*a, center).total_cmp(&distance(*b, center)))
        .map(|goal| (goal, false))
}

fn steer(dungeon: &Dungeon, from: (f32, f32), goal: (f32, f32), input: &mut InputSnapshot) {
    let start = (world_to_tile(from.0), world_to_tile(from.1));
    let end = (world_to_tile(goal.0), world_to_tile(goal.1));
    let waypoint = match first_step(dungeon, start, end) {
        Some(step) if step != start => tile_center(step),
        _ => goal,
    };
    push_direction(from, waypoint, input);
}

fn push_direction(from: (f32, f32), to: (f32, f32), input: &mut InputSnapshot) {
    let dx = to.0 - from.0;
    let dy = to.1 - from.1;
    if dx > STEER_DEADZONE {
        input.held.insert(Action::MoveRight);
    } else if dx < -STEER_DEADZONE {
        input.held.insert(Action::MoveLeft);
    }
    if dy > STEER_DEADZONE {
        input.held.insert(Action::MoveDown);
    } else if dy < -STEER_DEADZONE {
        input.held.insert(Action::MoveUp);
    }
}

fn tile_center((x, y): (i32, i32)) -> (f32, f32) {
    (
        x as f32 * TILE_SIZE + TILE_SIZE / 2.0,
        y as f32 * TILE_SIZE + TILE_SIZE / 2.0,
    )
}

/// Breadth-first search over walkable tiles; returns the first tile on a shortest
/// path from `start` to `goal`, or `start` itself when already there.
pub fn first_step(dungeon: &Dungeon, start: (i32, i32), goal: (i32, i32)) -> Option<(i32, i32)> {
    if start == goal {
        return Some(start);
    }
    let mut parents: HashMap<(i32, i32), (i32, i32)> = HashMap::new();
    let mut seen = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);

    while let Some((x, y)) = queue.pop_front() {
        for next in [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)] {
            if !is_walkable(dungeon, next.0, next.1) || !seen.insert(next) {
                continue;
            }
            parents.insert(next, (x, y));
            if next == goal {
                let mut step = next;
                while let Some(&parent) = parents.get(&step) {
                    if parent == start {
                        return Some(step);
                    }
                    step = parent;
                }
                return None;
            }
            queue.push_back(next);
        }
    }
    None
}

fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    f32::hypot(a.0 - b.0, a.1 - b.1)
}
