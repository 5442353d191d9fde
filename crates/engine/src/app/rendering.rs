use crate::grid::{to_pixels, Direction, GRID_SIZE};

/// Screen-space pixel position the camera person is pinned to. Everything
/// else is drawn relative to it.
pub const CAMERA_ANCHOR_X_PX: i32 = to_pixels(10) + GRID_SIZE / 2;
pub const CAMERA_ANCHOR_Y_PX: i32 = to_pixels(6);

/// Offset that places `camera_px` at the camera anchor.
pub fn camera_offset(camera_px: (i32, i32)) -> (i32, i32) {
    (
        CAMERA_ANCHOR_X_PX - camera_px.0,
        CAMERA_ANCHOR_Y_PX - camera_px.1,
    )
}

pub fn to_screen_px(world_px: (i32, i32), offset: (i32, i32)) -> (i32, i32) {
    (world_px.0 + offset.0, world_px.1 + offset.1)
}

/// Presentation boundary. The engine decides what is visible and where; how
/// pixels (or dialogue text) are produced is the sink's problem. Layer and
/// sprite handles are opaque strings from authored content.
pub trait RenderSink {
    fn draw_lower(&mut self, layer: &str, offset: (i32, i32));
    fn draw_person(
        &mut self,
        sprite: Option<&str>,
        screen_px: (i32, i32),
        facing: Direction,
        walking: bool,
    );
    fn draw_upper(&mut self, layer: &str, offset: (i32, i32));
    fn present_message(&mut self, text: &str);
}

/// Discards every draw call. Useful for headless sessions and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderSink;

impl RenderSink for NullRenderSink {
    fn draw_lower(&mut self, _layer: &str, _offset: (i32, i32)) {}

    fn draw_person(
        &mut self,
        _sprite: Option<&str>,
        _screen_px: (i32, i32),
        _facing: Direction,
        _walking: bool,
    ) {
    }

    fn draw_upper(&mut self, _layer: &str, _offset: (i32, i32)) {}

    fn present_message(&mut self, _text: &str) {}
}
