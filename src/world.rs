use std::collections::{HashSet, VecDeque};

use serde::Serialize;

use crate::constants::{
    get_room_target, MAP_SIZE, ROOM_MAX_SIDE, ROOM_MIN_SIDE, ROOM_PADDING,
    ROOM_PLACEMENT_ATTEMPTS, TILE_SIZE,
};
use crate::rng::Rng;
use crate::types::{RoomState, Tile};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn center(&self) -> TilePos {
        TilePos {
            x: self.x + self.w / 2,
            y: self.y + self.h / 2,
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }

    pub fn padded(&self, margin: i32) -> Rect {
        Rect {
            x: self.x - margin,
            y: self.y - margin,
            w: self.w + margin * 2,
            h: self.h + margin * 2,
        }
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: usize,
    pub bounds: Rect,
    pub doors: Vec<TilePos>,
    pub is_active: bool,
    pub is_cleared: bool,
}

impl Room {
    pub fn state(&self) -> RoomState {
        if self.is_cleared {
            RoomState::Cleared
        } else if self.is_active {
            RoomState::Active
        } else {
            RoomState::Undiscovered
        }
    }

    pub fn center_world(&self) -> (f32, f32) {
        let c = self.bounds.center();
        (
            c.x as f32 * TILE_SIZE + TILE_SIZE / 2.0,
            c.y as f32 * TILE_SIZE + TILE_SIZE / 2.0,
        )
    }
}

#[derive(Clone, Debug)]
pub struct Dungeon {
    pub width: i32,
    pub height: i32,
    pub floor: u32,
    pub rooms: Vec<Room>,
    pub portal_room: usize,
    tiles: Vec<Tile>,
}

impl Dungeon {
    fn blank(floor: u32) -> Self {
        Self {
            width: MAP_SIZE,
            height: MAP_SIZE,
            floor,
            rooms: Vec::new(),
            portal_room: 0,
            tiles: vec![Tile::Void; (MAP_SIZE * MAP_SIZE) as usize],
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some((y * self.width + x) as usize)
    }

    /// Tile at grid coordinates; anything outside the grid reads as `Void`.
    pub fn tile(&self, x: i32, y: i32) -> Tile {
        self.index(x, y)
            .and_then(|idx| self.tiles.get(idx).copied())
            .unwrap_or(Tile::Void)
    }

    pub fn set_tile(&mut self, x: i32, y: i32, tile: Tile) {
        if let Some(idx) = self.index(x, y) {
            self.tiles[idx] = tile;
        }
    }

    pub fn tile_rows(&self) -> Vec<String> {
        (0..self.height)
            .map(|y| (0..self.width).map(|x| self.tile(x, y).glyph()).collect())
            .collect()
    }
}

pub fn world_to_tile(value: f32) -> i32 {
    (value / TILE_SIZE).floor() as i32
}

pub fn is_walkable(dungeon: &Dungeon, x: i32, y: i32) -> bool {
    matches!(dungeon.tile(x, y), Tile::Floor | Tile::DoorOpen)
}

pub fn generate_dungeon(floor: u32, rng: &mut Rng) -> Dungeon {
    let mut dungeon = Dungeon::blank(floor);
    let target = get_room_target(floor);
    let mut accepted: Vec<Rect> = Vec::new();

    for _ in 0..ROOM_PLACEMENT_ATTEMPTS {
        if accepted.len() >= target {
            break;
        }
        let w = rng.int(ROOM_MIN_SIDE, ROOM_MAX_SIDE);
        let h = rng.int(ROOM_MIN_SIDE, ROOM_MAX_SIDE);
        let candidate = Rect {
            x: rng.int(1, MAP_SIZE - w - 1),
            y: rng.int(1, MAP_SIZE - h - 1),
            w,
            h,
        };
        let padded = candidate.padded(ROOM_PADDING);
        if accepted.iter().any(|room| padded.overlaps(room)) {
            continue;
        }

        carve_room(&mut dungeon, &candidate);
        if let Some(previous) = accepted.last() {
            let horizontal_first = rng.bool(0.5);
            carve_corridor(&mut dungeon, previous.center(), candidate.center(), horizontal_first);
        }
        accepted.push(candidate);
    }

    dungeon.rooms = accepted
        .into_iter()
        .enumerate()
        .map(|(id, bounds)| Room {
            id,
            bounds,
            doors: Vec::new(),
            is_active: false,
            is_cleared: false,
        })
        .collect();
    build_room_walls(&mut dungeon);
    seal_void_edges(&mut dungeon);
    dungeon.portal_room = dungeon.rooms.len().saturating_sub(1);
    dungeon
}

fn carve_room(dungeon: &mut Dungeon, rect: &Rect) {
    for y in rect.y..(rect.y + rect.h) {
        for x in rect.x..(rect.x + rect.w) {
            dungeon.set_tile(x, y, Tile::Floor);
        }
    }
}

fn carve_corridor_cell(dungeon: &mut Dungeon, x: i32, y: i32) {
    if matches!(dungeon.tile(x, y), Tile::Void | Tile::Wall) {
        dungeon.set_tile(x, y, Tile::Floor);
    }
}

fn carve_horizontal(dungeon: &mut Dungeon, x0: i32, x1: i32, y: i32) {
    for x in x0.min(x1)..=x0.max(x1) {
        carve_corridor_cell(dungeon, x, y);
    }
}

fn carve_vertical(dungeon: &mut Dungeon, y0: i32, y1: i32, x: i32) {
    for y in y0.min(y1)..=y0.max(y1) {
        carve_corridor_cell(dungeon, x, y);
    }
}

fn carve_corridor(dungeon: &mut Dungeon, from: TilePos, to: TilePos, horizontal_first: bool) {
    if horizontal_first {
        carve_horizontal(dungeon, from.x, to.x, from.y);
        carve_vertical(dungeon, from.y, to.y, to.x);
    } else {
        carve_vertical(dungeon, from.y, to.y, from.x);
        carve_horizontal(dungeon, from.x, to.x, to.y);
    }
}

fn perimeter(rect: &Rect) -> Vec<TilePos> {
    let mut out = Vec::new();
    let (x0, y0) = (rect.x - 1, rect.y - 1);
    let (x1, y1) = (rect.x + rect.w, rect.y + rect.h);
    for x in x0..=x1 {
        out.push(TilePos { x, y: y0 });
        out.push(TilePos { x, y: y1 });
    }
    for y in (y0 + 1)..y1 {
        out.push(TilePos { x: x0, y });
        out.push(TilePos { x: x1, y });
    }
    out
}

fn build_room_walls(dungeon: &mut Dungeon) {
    for room_idx in 0..dungeon.rooms.len() {
        let bounds = dungeon.rooms[room_idx].bounds;
        let mut doors = Vec::new();
        for pos in perimeter(&bounds) {
            match dungeon.tile(pos.x, pos.y) {
                Tile::Floor | Tile::DoorOpen => {
                    dungeon.set_tile(pos.x, pos.y, Tile::DoorOpen);
                    doors.push(pos);
                }
                _ => dungeon.set_tile(pos.x, pos.y, Tile::Wall),
            }
        }
        dungeon.rooms[room_idx].doors = doors;
    }
}

fn seal_void_edges(dungeon: &mut Dungeon) {
    let mut to_wall = Vec::new();
    for y in 0..dungeon.height {
        for x in 0..dungeon.width {
            if dungeon.tile(x, y) != Tile::Void {
                continue;
            }
            let touches_open = (-1..=1).any(|dy| {
                (-1..=1).any(|dx| {
                    (dx != 0 || dy != 0) && is_walkable(dungeon, x + dx, y + dy)
                })
            });
            if touches_open {
                to_wall.push((x, y));
            }
        }
    }
    for (x, y) in to_wall {
        dungeon.set_tile(x, y, Tile::Wall);
    }
}

pub fn reachable_tiles(dungeon: &Dungeon, start: TilePos) -> HashSet<(i32, i32)> {
    let mut out = HashSet::new();
    if !is_walkable(dungeon, start.x, start.y) {
        return out;
    }
    let mut queue = VecDeque::new();
    out.insert((start.x, start.y));
    queue.push_back((start.x, start.y));

    while let Some((x, y)) = queue.pop_front() {
        for (nx, ny) in [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)] {
            if !is_walkable(dungeon, nx, ny) {
                continue;
            }
            if out.insert((nx, ny)) {
                queue.push_back((nx, ny));
            }
        }
    }
    out
}
