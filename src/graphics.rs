use crate::scene::SceneLayout;
use bevy::prelude::*;

/// Centre of the viewport in world units.  World origin is the viewport's
/// bottom-left corner, so the camera sits at half the viewport size.
fn camera_center(layout: &SceneLayout) -> Vec3 {
    (layout.viewport * 0.5).extend(0.0)
}

/// Setup camera for 2D rendering, centred on the scene.
pub fn setup_camera(mut commands: Commands, layout: Res<SceneLayout>) {
    commands.spawn((Camera2d, Transform::from_translation(camera_center(&layout))));
    info!("Camera spawned at {:?}", camera_center(&layout));
}

/// Keep the camera centred after the layout has been recomputed for a new
/// viewport size.
pub fn camera_follow_layout_system(
    layout: Res<SceneLayout>,
    mut q_camera: Query<&mut Transform, With<Camera2d>>,
) {
    if !layout.is_changed() {
        return;
    }
    for mut transform in q_camera.iter_mut() {
        transform.translation = camera_center(&layout);
    }
}
