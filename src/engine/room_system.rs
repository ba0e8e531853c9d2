use super::*;

impl GameEngine {
    pub(super) fn prepare_floor(&mut self) {
        if self.dungeon.rooms.len() > 1 {
            if let Some(first) = self.dungeon.rooms.first_mut() {
                first.is_cleared = true;
            }
        }
    }

    pub(super) fn update_rooms(&mut self) {
        let (px, py) = self.player.center();
        let (tx, ty) = (world_to_tile(px), world_to_tile(py));

        for room_idx in 0..self.dungeon.rooms.len() {
            let room = &self.dungeon.rooms[room_idx];
            if room.is_cleared {
                continue;
            }
            if room.is_active {
                let remaining = self
                    .enemies
                    .iter()
                    .any(|enemy| enemy.room_id == Some(room_idx) && !enemy.is_defeated());
                if !remaining {
                    self.clear_room(room_idx);
                }
            } else if room.bounds.contains(tx, ty)
                && !collision::overlaps_tiles(&self.player.body, &room.doors)
            {
                self.activate_room(room_idx);
            }
        }
    }

    fn activate_room(&mut self, room_idx: usize) {
        let doors = self.dungeon.rooms[room_idx].doors.clone();
        for door in &doors {
            self.dungeon.set_tile(door.x, door.y, Tile::DoorClosed);
        }
        self.dungeon.rooms[room_idx].is_active = true;

        let count = 2 + self.dungeon.floor as usize + self.rng.int(0, 2) as usize;
        let spawned = (0..count)
            .filter(|_| self.spawn_enemy_in_room(room_idx))
            .count();
        self.events.push(RuntimeEvent::RoomActivated {
            room_id: room_idx,
            enemies: spawned,
        });
    }

    fn clear_room(&mut self, room_idx: usize) {
        let doors = self.dungeon.rooms[room_idx].doors.clone();
        for door in &doors {
            self.dungeon.set_tile(door.x, door.y, Tile::DoorOpen);
        }
        let room = &mut self.dungeon.rooms[room_idx];
        room.is_active = false;
        room.is_cleared = true;
        let center = room.center_world();

        let reward = if room_idx == self.dungeon.portal_room {
            ItemKind::Portal
        } else {
            roll_reward(&mut self.rng)
        };
        self.spawn_item(reward, center);
        self.run_stats.rooms_cleared += 1;
        self.events.push(RuntimeEvent::RoomCleared { room_id: room_idx });
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_engine;
    use crate::types::{InputSnapshot, ItemKind, RoomState, RuntimeEvent, Tile};

    fn first_engine_with_rooms(min_rooms: usize) -> super::GameEngine {
        (0..500u32)
            .map(test_engine)
            .find(|engine| engine.dungeon.rooms.len() >= min_rooms)
            .expect("some seed yields enough rooms")
    }

    fn move_player_to_room(engine: &mut super::GameEngine, room_idx: usize) {
        let (cx, cy) = engine.dungeon.rooms[room_idx].center_world();
        engine.player.body.set_center(cx, cy);
    }

    #[test]
    fn start_room_begins_cleared() {
        for seed in 0..50u32 {
            let engine = test_engine(seed);
            let rooms = &engine.dungeon.rooms;
            if rooms.len() > 1 {
                assert_eq!(rooms[0].state(), RoomState::Cleared);
                assert!(rooms[1..]
                    .iter()
                    .all(|room| room.state() == RoomState::Undiscovered));
            }
        }
    }

    #[test]
    fn entering_a_room_seals_doors_and_spawns_a_wave() {
        let mut engine = first_engine_with_rooms(3);
        move_player_to_room(&mut engine, 1);
        engine.update_rooms();

        let room = &engine.dungeon.rooms[1];
        assert_eq!(room.state(), RoomState::Active);
        for door in &room.doors {
            assert_eq!(engine.dungeon.tile(door.x, door.y), Tile::DoorClosed);
        }
        let owned = engine
            .enemies
            .iter()
            .filter(|enemy| enemy.room_id == Some(1))
            .count();
        assert!((2..=4).contains(&owned), "owned={owned}");
    }

    #[test]
    fn standing_in_a_doorway_does_not_activate() {
        let mut engine = first_engine_with_rooms(3);
        let door = engine.dungeon.rooms[1].doors[0];
        let bounds = engine.dungeon.rooms[1].bounds;
        let inside_x = door.x.clamp(bounds.x, bounds.x + bounds.w - 1);
        let inside_y = door.y.clamp(bounds.y, bounds.y + bounds.h - 1);
        let tile = crate::constants::TILE_SIZE;
        let cx = (inside_x as f32 + 0.5) * tile;
        let cy = (inside_y as f32 + 0.5) * tile;
        let dx = (door.x - inside_x) as f32 * 0.6 * tile;
        let dy = (door.y - inside_y) as f32 * 0.6 * tile;
        engine.player.body.set_center(cx + dx * 0.5, cy + dy * 0.5);
        assert!(crate::collision::overlaps_tiles(
            &engine.player.body,
            &engine.dungeon.rooms[1].doors
        ));
        engine.update_rooms();
        assert_eq!(engine.dungeon.rooms[1].state(), RoomState::Undiscovered);
    }

    #[test]
    fn room_clears_only_when_its_enemies_are_gone() {
        let mut engine = first_engine_with_rooms(3);
        move_player_to_room(&mut engine, 1);
        engine.update_rooms();
        engine.update_rooms();
        assert_eq!(engine.dungeon.rooms[1].state(), RoomState::Active);

        for enemy in engine.enemies.iter_mut().skip(1) {
            enemy.hp = 0.0;
        }
        engine.reap_enemies();
        engine.update_rooms();
        assert_eq!(engine.dungeon.rooms[1].state(), RoomState::Active);

        for enemy in engine.enemies.iter_mut() {
            enemy.hp = 0.0;
        }
        engine.reap_enemies();
        engine.update_rooms();
        let room = &engine.dungeon.rooms[1];
        assert_eq!(room.state(), RoomState::Cleared);
        for door in &room.doors {
            assert_eq!(engine.dungeon.tile(door.x, door.y), Tile::DoorOpen);
        }
        assert_eq!(engine.items.len(), 1);
        assert!(engine
            .events
            .iter()
            .any(|event| matches!(event, RuntimeEvent::RoomCleared { room_id: 1 })));
    }

    #[test]
    fn cleared_room_never_reactivates() {
        let mut engine = first_engine_with_rooms(3);
        move_player_to_room(&mut engine, 1);
        engine.update_rooms();
        for enemy in engine.enemies.iter_mut() {
            enemy.hp = 0.0;
        }
        engine.reap_enemies();
        engine.update_rooms();
        assert_eq!(engine.dungeon.rooms[1].state(), RoomState::Cleared);

        engine.enemies.clear();
        for _ in 0..30 {
            engine.update_rooms();
        }
        assert_eq!(engine.dungeon.rooms[1].state(), RoomState::Cleared);
        assert!(engine.enemies.is_empty());
    }

    #[test]
    fn portal_room_yields_only_the_portal() {
        let mut engine = first_engine_with_rooms(3);
        let portal = engine.dungeon.portal_room;
        assert_eq!(portal, engine.dungeon.rooms.len() - 1);
        move_player_to_room(&mut engine, portal);
        engine.update_rooms();
        for enemy in engine.enemies.iter_mut() {
            enemy.hp = 0.0;
        }
        engine.reap_enemies();
        engine.update_rooms();
        assert_eq!(engine.items.len(), 1);
        assert_eq!(engine.items[0].kind, ItemKind::Portal);
    }

    #[test]
    fn room_states_are_monotone_over_a_long_run() {
        let mut engine = first_engine_with_rooms(3);
        let rank = |state: RoomState| match state {
            RoomState::Undiscovered => 0,
            RoomState::Active => 1,
            RoomState::Cleared => 2,
        };
        let mut last: Vec<u8> = engine
            .dungeon
            .rooms
            .iter()
            .map(|room| rank(room.state()))
            .collect();
        for room_idx in 1..engine.dungeon.rooms.len() {
            move_player_to_room(&mut engine, room_idx);
            for _ in 0..5 {
                engine.step(&InputSnapshot::default());
                for enemy in engine.enemies.iter_mut() {
                    enemy.hp = 0.0;
                }
                if engine.pending_level_up {
                    engine.select_upgrade(crate::types::ItemId::Vitality);
                }
                let now: Vec<u8> = engine
                    .dungeon
                    .rooms
                    .iter()
                    .map(|room| rank(room.state()))
                    .collect();
                for (before, after) in last.iter().zip(now.iter()) {
                    assert!(after >= before);
                }
                last = now;
            }
        }
    }
}
