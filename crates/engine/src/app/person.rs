use serde::{Deserialize, Serialize};

use crate::app::events::Scenario;
use crate::grid::{Direction, GridPos, GRID_SIZE};

pub const WALK_SPEED_PX_PER_TICK: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMode {
    Player,
    Behavior,
}

/// One action of an idle loop. A dedicated type rather than a full event
/// step: idle scripts may walk and stand, nothing else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BehaviorStep {
    Walk {
        direction: Direction,
    },
    Stand {
        direction: Direction,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time: Option<u32>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveProgress {
    pub target: GridPos,
    pub remaining_px: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BehaviorWait {
    Ready,
    /// `ticks_left` of None stands forever; only sensible as a loop's last
    /// action.
    Standing { ticks_left: Option<u32> },
}

/// A movable actor: the player avatar or an NPC. Positions stay
/// grid-aligned except while a move interpolates toward an adjacent cell.
#[derive(Debug, Clone)]
pub struct Person {
    id: String,
    pos: GridPos,
    direction: Direction,
    move_progress: Option<MoveProgress>,
    control: ControlMode,
    sprite: Option<String>,
    behavior_loop: Vec<BehaviorStep>,
    behavior_cursor: usize,
    behavior_wait: BehaviorWait,
    talking: Vec<Scenario>,
}

impl Person {
    pub fn new(pos: GridPos, control: ControlMode) -> Self {
        Self {
            id: String::new(),
            pos,
            direction: Direction::default(),
            move_progress: None,
            control,
            sprite: None,
            behavior_loop: Vec::new(),
            behavior_cursor: 0,
            behavior_wait: BehaviorWait::Ready,
            talking: Vec::new(),
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_sprite(mut self, sprite: &str) -> Self {
        self.sprite = Some(sprite.to_string());
        self
    }

    pub fn with_behavior_loop(mut self, behavior_loop: Vec<BehaviorStep>) -> Self {
        self.behavior_loop = behavior_loop;
        self
    }

    pub fn with_talking(mut self, talking: Vec<Scenario>) -> Self {
        self.talking = talking;
        self
    }

    /// Attaches the person to a map under its roster key and arms the idle
    /// loop from the top.
    pub(crate) fn mount(&mut self, id: &str) {
        self.id = id.to_string();
        self.arm_behavior_loop();
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn pos(&self) -> GridPos {
        self.pos
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn control(&self) -> ControlMode {
        self.control
    }

    pub fn is_player_controlled(&self) -> bool {
        self.control == ControlMode::Player
    }

    pub fn sprite(&self) -> Option<&str> {
        self.sprite.as_deref()
    }

    pub fn talking(&self) -> &[Scenario] {
        &self.talking
    }

    pub fn is_moving(&self) -> bool {
        self.move_progress.is_some()
    }

    pub fn move_target(&self) -> Option<GridPos> {
        self.move_progress.map(|progress| progress.target)
    }

    /// Interpolated pixel position: the standing cell, or a point on the
    /// segment toward the move target.
    pub fn pixel_position(&self) -> (i32, i32) {
        match self.move_progress {
            None => (self.pos.x, self.pos.y),
            Some(progress) => {
                let traveled = GRID_SIZE - progress.remaining_px;
                let dx = (progress.target.x - self.pos.x).signum();
                let dy = (progress.target.y - self.pos.y).signum();
                (self.pos.x + dx * traveled, self.pos.y + dy * traveled)
            }
        }
    }

    pub fn face(&mut self, direction: Direction) {
        self.direction = direction;
    }

    /// Starts interpolating toward the adjacent cell. The caller owns
    /// collision; this only flips the animation on.
    pub(crate) fn begin_move(&mut self, direction: Direction) {
        debug_assert!(self.move_progress.is_none(), "move already in flight");
        self.direction = direction;
        self.move_progress = Some(MoveProgress {
            target: self.pos.step(direction),
            remaining_px: GRID_SIZE,
        });
    }

    /// Advances an in-flight move by the per-tick increment. Returns true
    /// on the tick the move completes and the position snaps to the target.
    pub(crate) fn advance_move(&mut self) -> bool {
        let Some(progress) = self.move_progress.as_mut() else {
            return false;
        };
        progress.remaining_px -= WALK_SPEED_PX_PER_TICK;
        if progress.remaining_px > 0 {
            return false;
        }
        self.pos = progress.target;
        self.move_progress = None;
        true
    }

    /// Restarts the idle loop at its first action so NPCs resume
    /// predictable behavior after a cutscene.
    pub fn arm_behavior_loop(&mut self) {
        self.behavior_cursor = 0;
        self.behavior_wait = BehaviorWait::Ready;
    }

    pub(crate) fn behavior_step(&self) -> Option<&BehaviorStep> {
        self.behavior_loop.get(self.behavior_cursor)
    }

    pub fn behavior_cursor(&self) -> usize {
        self.behavior_cursor
    }

    pub(crate) fn advance_behavior_cursor(&mut self) {
        if self.behavior_loop.is_empty() {
            return;
        }
        self.behavior_cursor = (self.behavior_cursor + 1) % self.behavior_loop.len();
        self.behavior_wait = BehaviorWait::Ready;
    }

    pub(crate) fn is_standing(&self) -> bool {
        matches!(self.behavior_wait, BehaviorWait::Standing { .. })
    }

    pub(crate) fn begin_stand(&mut self, ticks: Option<u32>) {
        self.behavior_wait = BehaviorWait::Standing { ticks_left: ticks };
    }

    /// Counts one tick off the current stand. Returns true when it elapses;
    /// an untimed stand never does.
    pub(crate) fn tick_stand(&mut self) -> bool {
        let BehaviorWait::Standing { ticks_left } = &mut self.behavior_wait else {
            return false;
        };
        match ticks_left {
            None => false,
            Some(0) => true,
            Some(remaining) => {
                *remaining -= 1;
                *remaining == 0
            }
        }
    }
}
