use bevy::app::AppExit;
use bevy::prelude::*;
use bevy::window::WindowCloseRequested;
use solar_orbits::LoopState;

use crate::draw::{tick_due, BevyPlatform, Painter};
use crate::Simulation;

/// Runs one tick of the frame loop whenever the frame clock allows it
pub fn frame(
    simulation: Option<ResMut<Simulation>>,
    mut painter: Painter,
    time: Res<Time>,
    mut close_requests: EventReader<WindowCloseRequested>,
    mut exit: EventWriter<AppExit>,
) {
    // Missing when the scene failed to build, the app is exiting anyway
    let Some(mut simulation) = simulation else {
        return;
    };

    let close_requested = close_requests.read().count() > 0;
    let now = time.elapsed();

    // Gizmos only last a frame, so in between ticks the scene is redrawn as is
    if !tick_due(now, simulation.resume_at, close_requested) {
        simulation.app.scene().render(&mut painter);
        painter.finish();
        return;
    }

    let mut platform = BevyPlatform::new(close_requested, now, painter);
    let state = simulation.app.tick(&mut platform);
    simulation.resume_at = platform.resume_at();

    if state == LoopState::Stopped {
        info!(ticks = simulation.app.scene().ticks(), "Window closed");
        exit.send(AppExit);
    }
}
