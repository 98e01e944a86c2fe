//! Simulation resources and the per-frame tick system.

use bevy::prelude::*;
use drive_shared::{ConfigSource, SimConfig, Simulation, TickInput};

use crate::input::InputState;

/// Loaded demo configuration
#[derive(Resource)]
pub struct DemoConfig(pub SimConfig);

/// How the config was found, kept until it can be logged
#[derive(Resource)]
pub struct ConfigReport {
    pub asset_path: String,
    pub source: ConfigSource,
}

/// The shared simulation context. Only the frame systems mutate it.
#[derive(Resource)]
pub struct DrivingSim(pub Simulation);

/// Log where the assets and config came from. Runs once the logger exists.
pub fn report_config(mut commands: Commands, report: Res<ConfigReport>) {
    info!("Using assets at: {}", report.asset_path);
    report.source.log();
    commands.remove_resource::<ConfigReport>();
}

/// Run one simulation tick with this frame's intents.
pub fn tick_simulation(
    mut sim: ResMut<DrivingSim>,
    input_state: Res<InputState>,
    time: Res<Time>,
) {
    let report = sim.0.tick(&TickInput {
        intents: input_state.intents,
        frame_delta: time.delta_secs(),
    });

    if !report.forces.is_empty() {
        trace!("Frame {}: {} drive force(s)", sim.0.frame(), report.forces.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;

    #[test]
    fn test_config_report_is_consumed_at_startup() {
        let mut world = World::new();
        world.insert_resource(ConfigReport {
            asset_path: "assets".to_string(),
            source: ConfigSource::Defaults {
                reason: "Failed to read assets/driving.ron".to_string(),
            },
        });

        world.run_system_once(report_config).unwrap();

        assert!(!world.contains_resource::<ConfigReport>());
    }
}
