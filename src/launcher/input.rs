//! Pointer input: mouse and touch folded into one drag signal.
//!
//! [`pointer_clear_system`] resets [`PointerInput`] at the start of every
//! frame; the device systems then OR their state into it.  Launcher systems
//! only ever read [`PointerInput`], so tests can drive a drag by inserting the
//! resource directly.

use crate::session::ResetRequest;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

/// Aggregated pointer state for the current frame, in world coordinates.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    /// A button or finger is down this frame.
    pub pressed: bool,
    /// Went down this frame.
    pub just_pressed: bool,
    /// Went up this frame.
    pub just_released: bool,
    /// Cursor / first touch position in world space, if known.
    pub world_pos: Option<Vec2>,
}

/// Clear last frame's pointer state.  Runs first in the input chain.
pub fn pointer_clear_system(mut pointer: ResMut<PointerInput>) {
    *pointer = PointerInput::default();
}

fn screen_to_world(camera: &Camera, camera_transform: &GlobalTransform, screen: Vec2) -> Option<Vec2> {
    camera.viewport_to_world_2d(camera_transform, screen).ok()
}

/// Left mouse button + cursor position.
pub fn mouse_to_pointer_system(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    mut pointer: ResMut<PointerInput>,
) {
    pointer.pressed |= buttons.pressed(MouseButton::Left);
    pointer.just_pressed |= buttons.just_pressed(MouseButton::Left);
    pointer.just_released |= buttons.just_released(MouseButton::Left);

    let Ok(window) = windows.single() else {
        return;
    };
    let Ok((camera, camera_transform)) = cameras.single() else {
        return;
    };
    if let Some(cursor) = window.cursor_position() {
        pointer.world_pos = screen_to_world(camera, camera_transform, cursor);
    }
}

/// First active touch; takes precedence over the cursor position.
pub fn touch_to_pointer_system(
    touches: Res<Touches>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    mut pointer: ResMut<PointerInput>,
) {
    pointer.just_pressed |= touches.any_just_pressed();
    pointer.just_released |= touches.any_just_released();

    let Some(touch) = touches.iter().next() else {
        return;
    };
    pointer.pressed = true;
    let Ok((camera, camera_transform)) = cameras.single() else {
        return;
    };
    if let Some(world) = screen_to_world(camera, camera_transform, touch.position()) {
        pointer.world_pos = Some(world);
    }
}

/// `R` requests a full scene reset.
pub fn reset_key_system(keys: Res<ButtonInput<KeyCode>>, mut requests: MessageWriter<ResetRequest>) {
    if keys.just_pressed(KeyCode::KeyR) {
        requests.write(ResetRequest);
    }
}
