//! Driving demo client - opens the window, renders the scene and feeds keyboard
//! input and terrain loading into the shared simulation.
//!
//! Updated for Bevy 0.17

mod camera;
mod input;
mod systems;
mod terrain;

use std::path::PathBuf;

use bevy::asset::io::file::FileAssetReader;
use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::window::WindowResolution;
use drive_shared::{SimConfig, Simulation, CONFIG_FILE};

/// Get the asset path - for bundled macOS apps, use path relative to executable
fn get_asset_path() -> String {
    // Try to find assets relative to executable (for .app bundles)
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let bundled_assets = exe_dir.join("assets");
            if bundled_assets.exists() {
                return bundled_assets.to_string_lossy().to_string();
            }
        }
    }
    // Fall back to default "assets" folder (for development)
    "assets".to_string()
}

/// Config file inside the asset folder, resolved the same way the asset
/// server resolves `file_path`.
fn config_path(asset_path: &str) -> PathBuf {
    FileAssetReader::new(asset_path).root_path().join(CONFIG_FILE)
}

fn main() {
    let asset_path = get_asset_path();
    // Loaded before the window exists; the outcome is logged at startup once
    // the logger is installed.
    let (config, source) = SimConfig::load_or_default(&config_path(&asset_path));

    let mut app = App::new();

    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: config.window_title.clone(),
                    resolution: WindowResolution::new(config.window_width, config.window_height),
                    ..default()
                }),
                ..default()
            })
            .set(AssetPlugin {
                file_path: asset_path.clone(),
                ..default()
            }),
    );

    app.insert_resource(systems::ConfigReport {
        asset_path,
        source,
    });
    app.insert_resource(systems::DrivingSim(Simulation::new(&config)));
    app.insert_resource(systems::DemoConfig(config));
    app.init_resource::<input::InputState>();

    app.add_plugins(terrain::TerrainPlugin);

    app.add_systems(
        Startup,
        (
            systems::report_config,
            systems::spawn_world,
            systems::spawn_car_visuals,
            camera::spawn_camera,
        ),
    );

    // ORDER MATTERS: input -> tick (force, step, sync) -> visuals -> camera.
    app.add_systems(
        Update,
        (
            input::handle_keyboard_input,
            input::release_keys_on_focus_loss,
            systems::tick_simulation,
            systems::sync_car_transforms,
            camera::update_camera,
        )
            .chain(),
    );
    app.add_systems(Update, camera::handle_window_resize);

    info!("Starting driving demo");
    app.run();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_is_inside_asset_root() {
        // Under cargo the asset root is the crate directory, not the CWD
        let path = config_path("assets");
        assert!(path.is_absolute(), "path: {:?}", path);
        assert!(path.ends_with("assets/driving.ron"), "path: {:?}", path);
        assert!(path.exists(), "shipped config not found at {:?}", path);
    }

    #[test]
    fn test_bundled_asset_path_is_used_as_is() {
        let bundled = std::env::temp_dir().join("Drive.app").join("assets");
        let path = config_path(&bundled.to_string_lossy());
        assert_eq!(path, bundled.join(CONFIG_FILE));
    }
}
