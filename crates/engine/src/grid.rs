use serde::{Deserialize, Serialize};

/// Grid convention:
/// - World coordinates are pixel values and stay multiples of `GRID_SIZE`,
///   except while a move interpolates between two adjacent cells.
/// - `y` grows downward, matching the screen.
pub const GRID_SIZE: i32 = 16;

pub const fn to_pixels(units: i32) -> i32 {
    units * GRID_SIZE
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit vector in pixel space, before scaling by any step size.
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The cell one grid unit away in `direction`.
    pub const fn step(self, direction: Direction) -> GridPos {
        let (dx, dy) = direction.offset();
        GridPos {
            x: self.x + dx * GRID_SIZE,
            y: self.y + dy * GRID_SIZE,
        }
    }

    /// Canonical membership key. Two coordinates are equal iff their keys are.
    pub fn key(self) -> String {
        format!("{},{}", self.x, self.y)
    }

    pub fn parse_key(key: &str) -> Option<GridPos> {
        let (x, y) = key.split_once(',')?;
        Some(GridPos {
            x: x.trim().parse().ok()?,
            y: y.trim().parse().ok()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_pixels_scales_by_grid_size() {
        assert_eq!(to_pixels(0), 0);
        assert_eq!(to_pixels(3), 48);
        assert_eq!(to_pixels(-2), -32);
    }

    #[test]
    fn step_moves_one_grid_unit_per_direction() {
        let origin = GridPos::new(32, 32);
        assert_eq!(origin.step(Direction::Up), GridPos::new(32, 16));
        assert_eq!(origin.step(Direction::Down), GridPos::new(32, 48));
        assert_eq!(origin.step(Direction::Left), GridPos::new(16, 32));
        assert_eq!(origin.step(Direction::Right), GridPos::new(48, 32));
    }

    #[test]
    fn keys_agree_exactly_with_coordinate_equality() {
        let a = GridPos::new(16, -32);
        let b = GridPos::new(16, -32);
        let c = GridPos::new(-32, 16);
        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), c.key());
        assert_eq!(a.key(), "16,-32");
    }

    #[test]
    fn parse_key_round_trips() {
        let pos = GridPos::new(-48, 112);
        assert_eq!(GridPos::parse_key(&pos.key()), Some(pos));
    }

    #[test]
    fn parse_key_rejects_malformed_input() {
        assert_eq!(GridPos::parse_key(""), None);
        assert_eq!(GridPos::parse_key("16"), None);
        assert_eq!(GridPos::parse_key("a,b"), None);
        assert_eq!(GridPos::parse_key("1,2,3"), None);
    }

    #[test]
    fn opposite_is_an_involution() {
        for direction in [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ] {
            assert_eq!(direction.opposite().opposite(), direction);
        }
    }

    #[test]
    fn direction_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Direction::Left).expect("serialize"),
            "\"left\""
        );
        let parsed: Direction = serde_json::from_str("\"up\"").expect("deserialize");
        assert_eq!(parsed, Direction::Up);
    }
}
