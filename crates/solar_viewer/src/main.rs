use std::time::Duration;

use bevy::app::AppExit;
use bevy::gizmos::GizmoConfig;
use bevy::prelude::*;
use bevy::sprite::{MaterialMesh2dBundle, Mesh2dHandle};
use bevy::window::WindowResolution;
use solar_orbits::config::ScreenSpec;
use solar_orbits::{FrameClock, Scene, SceneConfig, SolarApp};

mod draw;
mod update;

fn main() {
    let config = SceneConfig::default();

    let window = Window {
        title: config.screen.title.clone(),
        resolution: WindowResolution::new(
            config.screen.width as f32,
            config.screen.height as f32,
        )
        .with_scale_factor_override(1.0),
        resizable: false,
        ..default()
    };

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(window),
            // Closing goes through the frame loop
            close_when_requested: false,
            ..default()
        }))
        .insert_resource(ClearColor(Color::BLACK))
        .insert_resource(GizmoConfig {
            line_width: 1.0,
            ..default()
        })
        .insert_resource(Config(config))
        .init_resource::<draw::Surface>()
        .add_systems(Startup, setup)
        .add_systems(Update, update::frame)
        .run();
}

#[derive(Resource)]
struct Config(SceneConfig);

#[derive(Resource)]
struct Simulation {
    app: SolarApp,
    resume_at: Duration,
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut surface: ResMut<draw::Surface>,
    config: Res<Config>,
    mut exit: EventWriter<AppExit>,
) {
    let scene = match Scene::new(&config.0, &mut rand::thread_rng()) {
        Ok(scene) => scene,
        Err(err) => {
            error!("Failed to build the scene: {err}");
            exit.send(AppExit);
            return;
        }
    };

    let ScreenSpec {
        width, height, fps, ..
    } = config.0.screen;

    commands.spawn(Camera2dBundle::default());

    // Body and star counts never change, one unit disc each is scaled and
    // moved into place when drawn
    let mesh: Mesh2dHandle = meshes.add(Mesh::from(shape::Circle::new(1.0))).into();
    let count = scene.stars().len() + scene.bodies().len();
    let discs = (0..count)
        .map(|_| {
            commands
                .spawn((
                    MaterialMesh2dBundle::<ColorMaterial> {
                        mesh: mesh.clone(),
                        visibility: Visibility::Hidden,
                        ..default()
                    },
                    draw::Disc,
                ))
                .id()
        })
        .collect();

    *surface = draw::Surface::new(width, height, discs);

    commands.insert_resource(Simulation {
        app: SolarApp::new(scene, FrameClock::from_fps(fps)),
        resume_at: Duration::ZERO,
    });

    info!(width, height, fps, discs = count, "Window ready");
}
