use std::f32::consts::FRAC_PI_4;
use std::f32::consts::TAU;

use bevy_math::Mat4;
use bevy_math::Vec3;

/// A left-handed camera described by where it sits and where it looks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub forward: Vec3,
    pub upward: Vec3,
}

impl Camera {
    pub const fn new(position: Vec3, forward: Vec3, upward: Vec3) -> Self {
        Self {
            position,
            forward,
            upward,
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_to_lh(self.position, self.forward, self.upward)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub fov_y_radians: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_y_radians: FRAC_PI_4,
            near: 0.01,
            far: 100.0,
        }
    }
}

impl Projection {
    pub fn matrix(&self, aspect_ratio: f32) -> Mat4 {
        Mat4::perspective_lh(self.fov_y_radians, aspect_ratio, self.near, self.far)
    }
}

/// Width over height, falling back to square for a collapsed client area.
pub fn aspect_ratio(width: u32, height: u32) -> f32 {
    if width == 0 || height == 0 {
        1.0
    } else {
        width as f32 / height as f32
    }
}

/// Where an object sits and how fast it spins. Angles stay within `[0, TAU)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    /// Radians per second around the Y axis.
    pub yaw_rate: f32,
    /// Radians per second around the X axis.
    pub pitch_rate: f32,
}

impl Placement {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            yaw_rate: 0.0,
            pitch_rate: 0.0,
        }
    }

    pub fn spinning(mut self, yaw_rate: f32, pitch_rate: f32) -> Self {
        self.yaw_rate = yaw_rate;
        self.pitch_rate = pitch_rate;
        self
    }

    pub fn advance(&mut self, seconds: f32) {
        self.yaw = (self.yaw + self.yaw_rate * seconds).rem_euclid(TAU);
        self.pitch = (self.pitch + self.pitch_rate * seconds).rem_euclid(TAU);
    }

    pub fn world(&self) -> Mat4 {
        Mat4::from_translation(self.position)
            * Mat4::from_rotation_y(self.yaw)
            * Mat4::from_rotation_x(self.pitch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_moves_the_camera_to_the_origin() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, -2.5), Vec3::Z, Vec3::Y);
        let eye = camera.view().transform_point3(camera.position);
        assert!(eye.length() < 1e-5);

        let ahead = camera.view().transform_point3(Vec3::ZERO);
        assert!((ahead.z - 2.5).abs() < 1e-5, "origin should be in front of the camera");
    }

    #[test]
    fn advance_wraps_angles() {
        let mut placement = Placement::at(Vec3::ZERO).spinning(TAU, -1.0);
        placement.advance(1.25);
        assert!((placement.yaw - 0.25 * TAU).abs() < 1e-4);
        assert!(placement.pitch >= 0.0 && placement.pitch < TAU);
    }

    #[test]
    fn world_translates_after_rotating() {
        let placement = Placement {
            yaw: std::f32::consts::FRAC_PI_2,
            ..Placement::at(Vec3::new(1.0, 0.0, 0.0))
        };
        let moved = placement.world().transform_point3(Vec3::X);
        assert!((moved - Vec3::new(1.0, 0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn collapsed_client_area_is_square() {
        assert_eq!(aspect_ratio(800, 0), 1.0);
        assert_eq!(aspect_ratio(800, 400), 2.0);
    }
}
