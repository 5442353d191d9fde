mod events;
mod flags;
mod input;
mod loop_runner;
mod map;
mod overworld;
mod person;
mod rendering;

pub use events::{
    select_scenario, EventSequencer, EventStep, Scenario, SequencerOutcome, SequencerState,
};
pub use flags::StoryFlags;
pub use input::{InputAction, InputSnapshot};
pub use loop_runner::{
    run_session, ticks_from_millis, AppError, InputSource, LoopConfig, LoopMetricsSnapshot,
    TICKS_PER_SECOND,
};
pub use map::{OverworldMap, TickReport};
pub use overworld::Overworld;
pub use person::{BehaviorStep, ControlMode, MoveProgress, Person, WALK_SPEED_PX_PER_TICK};
pub use rendering::{
    camera_offset, to_screen_px, NullRenderSink, RenderSink, CAMERA_ANCHOR_X_PX,
    CAMERA_ANCHOR_Y_PX,
};
