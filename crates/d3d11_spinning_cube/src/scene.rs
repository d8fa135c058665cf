use bevy_math::Vec3;
use frame_plumbing::constants::SceneConstants;
use frame_plumbing::transform::aspect_ratio;
use frame_plumbing::transform::Camera;
use frame_plumbing::transform::Placement;
use frame_plumbing::transform::Projection;

pub const CLEAR_COLOR: [f32; 4] = [0.0, 0.125, 0.25, 0.75];
pub const CUBE_HALF_EXTENT: f32 = 0.5;

const CAMERA: Camera = Camera::new(Vec3::new(0.0, 1.0, -3.0), Vec3::new(0.0, -0.3, 1.0), Vec3::Y);
const LIGHT_DIRECTION: Vec3 = Vec3::new(0.4, -1.0, 0.6);

/// The cube's motion plus the fixed camera it is seen through.
#[derive(Debug, Clone)]
pub struct CubeScene {
    pub placement: Placement,
    projection: Projection,
}

impl Default for CubeScene {
    fn default() -> Self {
        Self {
            placement: Placement::at(Vec3::ZERO).spinning(1.0, 0.4),
            projection: Projection::default(),
        }
    }
}

impl CubeScene {
    pub fn advance(&mut self, seconds: f32) {
        self.placement.advance(seconds);
    }

    pub fn constants(&self, width: u32, height: u32) -> SceneConstants {
        SceneConstants::new(
            self.placement.world(),
            CAMERA.view(),
            self.projection.matrix(aspect_ratio(width, height)),
            LIGHT_DIRECTION,
        )
    }
}

#[cfg(test)]
mod tests {
    use bevy_math::Mat4;
    use bevy_math::Vec4;

    use super::*;

    #[test]
    fn cube_center_lands_inside_the_view_volume() {
        let scene = CubeScene::default();
        let constants = scene.constants(800, 600);
        let view = Mat4::from_cols_array(&constants.view);
        let projection = Mat4::from_cols_array(&constants.projection);

        let clip = projection * view * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip / clip.w;
        assert!(ndc.x.abs() < 1.0 && ndc.y.abs() < 1.0);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn advancing_spins_the_cube() {
        let mut scene = CubeScene::default();
        let before = scene.constants(800, 600).world;
        scene.advance(0.5);
        assert_ne!(scene.constants(800, 600).world, before);
    }
}
