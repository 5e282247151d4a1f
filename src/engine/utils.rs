use crate::types::{Direction, Vec2};

pub fn manhattan(a: Vec2, b: Vec2) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

pub(super) fn neighboring(a: Vec2, b: Vec2) -> bool {
    manhattan(a, b) == 1
}

pub fn offset(pos: Vec2, dir: Direction) -> Vec2 {
    let delta = dir.delta();
    Vec2 {
        x: pos.x + delta.x,
        y: pos.y + delta.y,
    }
}

pub(super) fn in_bounds(pos: Vec2, width: i32, height: i32) -> bool {
    pos.x >= 0 && pos.y >= 0 && pos.x < width && pos.y < height
}
