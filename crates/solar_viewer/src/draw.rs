use std::time::Duration;

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy::utils::HashMap;
use solar_orbits::{Canvas, Platform, Rgb};

/// Orbit guides are big, the default segment count makes them look polygonal
const GUIDE_SEGMENTS: usize = 128;

/// Z distance between two consecutive discs
const DEPTH_STEP: f32 = 1e-3;

/// Marks the pooled circle meshes filled circles are drawn with
#[derive(Component)]
pub struct Disc;

/// Disc entities, spawned once and handed out in draw order every frame
#[derive(Resource, Default)]
pub struct Surface {
    size: Vec2,
    discs: Vec<Entity>,
    materials: HashMap<Rgb, Handle<ColorMaterial>>,
    next: usize,
}

impl Surface {
    pub fn new(width: u32, height: u32, discs: Vec<Entity>) -> Self {
        Self {
            size: Vec2::new(width as f32, height as f32),
            discs,
            materials: HashMap::default(),
            next: 0,
        }
    }
}

/// Screen pixels (origin top left, Y down) to world units around the camera
pub fn to_world(point: solar_orbits::Vec2, size: Vec2) -> Vec2 {
    Vec2::new(point.x - size.x / 2.0, size.y / 2.0 - point.y)
}

pub fn to_color(Rgb(r, g, b): Rgb) -> Color {
    Color::rgb_u8(r, g, b)
}

type DiscItem = (
    &'static mut Transform,
    &'static mut Handle<ColorMaterial>,
    &'static mut Visibility,
);

/// Draws a frame with gizmo outlines and the disc pool
#[derive(SystemParam)]
pub struct Painter<'w, 's> {
    gizmos: Gizmos<'s>,
    surface: ResMut<'w, Surface>,
    clear_color: ResMut<'w, ClearColor>,
    materials: ResMut<'w, Assets<ColorMaterial>>,
    discs: Query<'w, 's, DiscItem, With<Disc>>,
}

impl Painter<'_, '_> {
    /// Hides every disc nothing was drawn with since the last call
    pub fn finish(&mut self) {
        let used = std::mem::take(&mut self.surface.next);

        for &entity in self.surface.discs.iter().skip(used) {
            if let Ok((_, _, mut visibility)) = self.discs.get_mut(entity) {
                *visibility = Visibility::Hidden;
            }
        }
    }

    fn material(&mut self, color: Rgb) -> Handle<ColorMaterial> {
        let materials = &mut self.materials;

        self.surface
            .materials
            .entry(color)
            .or_insert_with(|| materials.add(ColorMaterial::from(to_color(color))))
            .clone()
    }
}

impl Canvas for Painter<'_, '_> {
    fn clear(&mut self, color: Rgb) {
        self.clear_color.0 = to_color(color);
    }

    fn fill_circle(&mut self, center: solar_orbits::Vec2, radius: f32, color: Rgb) {
        let Some(&entity) = self.surface.discs.get(self.surface.next) else {
            debug!("Out of discs, circle dropped");
            return;
        };
        self.surface.next += 1;

        let material = self.material(color);
        let position = to_world(center, self.surface.size);
        let depth = self.surface.next as f32 * DEPTH_STEP;

        let Ok((mut transform, mut handle, mut visibility)) = self.discs.get_mut(entity) else {
            return;
        };

        // Later discs cover earlier ones
        transform.translation = position.extend(depth);
        transform.scale = Vec3::splat(radius);
        *handle = material;
        *visibility = Visibility::Visible;
    }

    fn stroke_circle(&mut self, center: solar_orbits::Vec2, radius: f32, color: Rgb) {
        let position = to_world(center, self.surface.size);

        self.gizmos
            .circle_2d(position, radius, to_color(color))
            .segments(GUIDE_SEGMENTS);
    }
}

/// One bevy frame's worth of access to the window
pub struct BevyPlatform<'w, 's> {
    close_requested: bool,
    now: Duration,
    resume_at: Duration,
    painter: Painter<'w, 's>,
}

impl<'w, 's> BevyPlatform<'w, 's> {
    pub fn new(close_requested: bool, now: Duration, painter: Painter<'w, 's>) -> Self {
        Self {
            close_requested,
            now,
            resume_at: now,
            painter,
        }
    }

    /// When the next tick is due
    pub fn resume_at(&self) -> Duration {
        self.resume_at
    }
}

impl<'w, 's> Platform for BevyPlatform<'w, 's> {
    type Canvas = Painter<'w, 's>;

    fn close_requested(&mut self) -> bool {
        self.close_requested
    }

    fn canvas(&mut self) -> &mut Painter<'w, 's> {
        &mut self.painter
    }

    fn present(&mut self) {
        self.painter.finish();
    }

    fn elapsed(&self) -> Duration {
        self.now
    }

    /// Bevy keeps running frames, the wait is served by skipping ticks
    /// until it is over
    fn sleep(&mut self, duration: Duration) {
        self.resume_at = self.now + duration;
    }
}

/// Whether a frame starting at `now` runs a tick or only redraws
pub fn tick_due(now: Duration, resume_at: Duration, close_requested: bool) -> bool {
    close_requested || now >= resume_at
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: Vec2 = Vec2::new(1000.0, 900.0);

    #[test]
    fn screen_center_is_the_world_origin() {
        let center = solar_orbits::vec2(500.0, 450.0);

        assert_eq!(to_world(center, SIZE), Vec2::ZERO);
    }

    #[test]
    fn screen_y_points_down() {
        let top_left = solar_orbits::vec2(0.0, 0.0);
        let bottom_right = solar_orbits::vec2(1000.0, 900.0);

        assert_eq!(to_world(top_left, SIZE), Vec2::new(-500.0, 450.0));
        assert_eq!(to_world(bottom_right, SIZE), Vec2::new(500.0, -450.0));
    }

    #[test]
    fn colors_map_to_full_intensity_channels() {
        assert_eq!(to_color(Rgb(255, 0, 0)), Color::RED);
        assert_eq!(to_color(Rgb::BLACK), Color::BLACK);
    }

    #[test]
    fn ticks_wait_for_the_clock() {
        let resume_at = Duration::from_millis(20);

        assert!(!tick_due(Duration::from_millis(10), resume_at, false));
        assert!(tick_due(Duration::from_millis(20), resume_at, false));
        assert!(tick_due(Duration::from_millis(25), resume_at, false));
    }

    #[test]
    fn close_requests_never_wait() {
        assert!(tick_due(Duration::ZERO, Duration::from_secs(1), true));
    }
}
