use bevy::prelude::*;
use bevy::window::WindowResolution;
use bevy_rapier2d::prelude::*;
use catapult::config::GameConfig;
use catapult::simulation::{CatapultPlugin, CatapultViewPlugin};

fn main() {
    // The window opens before assets/game.toml is read.
    let defaults = GameConfig::default();

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Catapult".into(),
                resolution: WindowResolution::new(
                    defaults.viewport_width as u32,
                    defaults.viewport_height as u32,
                ),
                ..Default::default()
            }),
            ..Default::default()
        }))
        .insert_resource(ClearColor(Color::srgb(0.08, 0.09, 0.12)))
        // pixels_per_meter(1.0): world units are pixels, gravity is in px/s².
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(1.0))
        .add_plugins((CatapultPlugin, CatapultViewPlugin))
        .run();
}
