use crate::entity::Body;
use crate::world::{world_to_tile, Dungeon, TilePos};

const EDGE_INSET: f32 = 0.01;

pub fn blocked(dungeon: &Dungeon, x: f32, y: f32, w: f32, h: f32) -> bool {
    let right = x + w - EDGE_INSET;
    let bottom = y + h - EDGE_INSET;
    [(x, y), (right, y), (x, bottom), (right, bottom)]
        .into_iter()
        .any(|(px, py)| {
            dungeon
                .tile(world_to_tile(px), world_to_tile(py))
                .is_blocking()
        })
}

pub fn resolve(body: &mut Body, dungeon: &Dungeon) {
    let next_x = body.x + body.vx;
    if blocked(dungeon, next_x, body.y, body.w, body.h) {
        body.vx = 0.0;
    } else {
        body.x = next_x;
    }

    let next_y = body.y + body.vy;
    if blocked(dungeon, body.x, next_y, body.w, body.h) {
        body.vy = 0.0;
    } else {
        body.y = next_y;
    }
}

pub fn overlaps_tiles(body: &Body, tiles: &[TilePos]) -> bool {
    let x0 = world_to_tile(body.x);
    let y0 = world_to_tile(body.y);
    let x1 = world_to_tile(body.x + body.w - EDGE_INSET);
    let y1 = world_to_tile(body.y + body.h - EDGE_INSET);
    tiles
        .iter()
        .any(|tile| tile.x >= x0 && tile.x <= x1 && tile.y >= y0 && tile.y <= y1)
}

#[cfg(test)]
mod tests {
    use super::{blocked, overlaps_tiles, resolve};
    use crate::constants::TILE_SIZE;
    use crate::entity::Body;
    use crate::rng::Rng;
    use crate::types::Tile;
    use crate::world::{generate_dungeon, Dungeon, TilePos};

    fn open_dungeon() -> Dungeon {
        let mut dungeon = generate_dungeon(0, &mut Rng::new(3));
        for y in 0..dungeon.height {
            for x in 0..dungeon.width {
                dungeon.set_tile(x, y, Tile::Floor);
            }
        }
        dungeon
    }

    #[test]
    fn out_of_bounds_is_blocking() {
        let dungeon = open_dungeon();
        assert!(blocked(&dungeon, -5.0, 40.0, 10.0, 10.0));
        let far = dungeon.width as f32 * TILE_SIZE;
        assert!(blocked(&dungeon, far - 4.0, 40.0, 10.0, 10.0));
        assert!(!blocked(&dungeon, 40.0, 40.0, 10.0, 10.0));
    }

    #[test]
    fn wall_cancels_only_the_blocked_axis() {
        let mut dungeon = open_dungeon();
        for y in 0..dungeon.height {
            dungeon.set_tile(5, y, Tile::Wall);
        }
        let mut body = Body::new(4.0 * TILE_SIZE + 10.0, 3.0 * TILE_SIZE, 20.0, 20.0);
        body.vx = 6.0;
        body.vy = 4.0;
        resolve(&mut body, &dungeon);
        assert_eq!(body.vx, 0.0);
        assert_eq!(body.x, 4.0 * TILE_SIZE + 10.0);
        assert_eq!(body.vy, 4.0);
        assert_eq!(body.y, 3.0 * TILE_SIZE + 4.0);
    }

    #[test]
    fn closed_door_blocks_and_open_door_does_not() {
        let mut dungeon = open_dungeon();
        dungeon.set_tile(2, 2, Tile::DoorClosed);
        let x = 2.0 * TILE_SIZE + 2.0;
        let y = 2.0 * TILE_SIZE + 2.0;
        assert!(blocked(&dungeon, x, y, 10.0, 10.0));
        dungeon.set_tile(2, 2, Tile::DoorOpen);
        assert!(!blocked(&dungeon, x, y, 10.0, 10.0));
    }

    #[test]
    fn tile_overlap_uses_every_covered_cell() {
        let body = Body::new(TILE_SIZE - 4.0, TILE_SIZE - 4.0, 10.0, 10.0);
        assert!(overlaps_tiles(&body, &[TilePos { x: 1, y: 1 }]));
        assert!(overlaps_tiles(&body, &[TilePos { x: 0, y: 0 }]));
        assert!(!overlaps_tiles(&body, &[TilePos { x: 2, y: 1 }]));
    }
}
