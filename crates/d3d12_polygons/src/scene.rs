use bevy_math::Mat4;
use bevy_math::Vec3;
use frame_plumbing::constants::ObjectConstants;
use frame_plumbing::transform::aspect_ratio;
use frame_plumbing::transform::Camera;
use frame_plumbing::transform::Placement;
use frame_plumbing::transform::Projection;

pub const POLYGON_COUNT: usize = 3;
pub const CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 1.0, 1.0];

const CAMERA: Camera = Camera::new(Vec3::new(0.0, 0.0, -2.5), Vec3::Z, Vec3::Y);

/// Three copies of the same triangle, side by side, each spinning at its own pace.
#[derive(Debug, Clone)]
pub struct PolygonScene {
    pub placements: [Placement; POLYGON_COUNT],
    projection: Projection,
}

impl Default for PolygonScene {
    fn default() -> Self {
        Self {
            placements: [
                Placement::at(Vec3::new(-0.7, 0.0, 0.0)).spinning(0.8, 0.0),
                Placement::at(Vec3::new(0.0, 0.0, 0.0)).spinning(0.0, 1.2),
                Placement::at(Vec3::new(0.7, 0.0, 0.0)).spinning(-1.5, 0.5),
            ],
            projection: Projection::default(),
        }
    }
}

impl PolygonScene {
    pub fn advance(&mut self, seconds: f32) {
        for placement in &mut self.placements {
            placement.advance(seconds);
        }
    }

    pub fn view_projection(&self, width: u32, height: u32) -> Mat4 {
        self.projection.matrix(aspect_ratio(width, height)) * CAMERA.view()
    }

    /// Per-polygon constants in draw order.
    pub fn object_constants(&self, width: u32, height: u32) -> [ObjectConstants; POLYGON_COUNT] {
        let view_projection = self.view_projection(width, height);
        self.placements
            .map(|placement| ObjectConstants::new(view_projection * placement.world()))
    }
}

#[cfg(test)]
mod tests {
    use bevy_math::Vec4;

    use super::*;

    fn to_ndc(constants: &ObjectConstants, point: Vec3) -> Vec3 {
        let clip = Mat4::from_cols_array(&constants.transform) * point.extend(1.0);
        (clip / clip.w).truncate()
    }

    #[test]
    fn every_polygon_starts_on_screen() {
        let scene = PolygonScene::default();
        for constants in scene.object_constants(800, 600) {
            let center = to_ndc(&constants, Vec3::ZERO);
            assert!(center.x.abs() < 1.0 && center.y.abs() < 1.0, "{center:?}");
            assert!(center.z > 0.0 && center.z < 1.0);
        }
    }

    #[test]
    fn polygons_are_laid_out_left_to_right() {
        let scene = PolygonScene::default();
        let centers = scene
            .object_constants(800, 600)
            .map(|constants| to_ndc(&constants, Vec3::ZERO).x);
        assert!(centers[0] < centers[1] && centers[1] < centers[2]);
    }

    #[test]
    fn each_polygon_spins_independently() {
        let mut scene = PolygonScene::default();
        let before = scene.object_constants(800, 600);
        scene.advance(0.5);
        let after = scene.object_constants(800, 600);
        for (old, new) in before.iter().zip(after.iter()) {
            assert_ne!(old.transform, new.transform);
        }
        assert_ne!(scene.placements[0].yaw, scene.placements[2].yaw);
    }

    #[test]
    fn transform_is_projection_after_view_after_world() {
        let scene = PolygonScene::default();
        let expected = scene.view_projection(800, 600) * scene.placements[1].world();
        let corner = Vec4::new(0.22, -0.15, 0.0, 1.0);
        let actual = Mat4::from_cols_array(&scene.object_constants(800, 600)[1].transform);
        assert!((actual * corner - expected * corner).length() < 1e-5);
    }
}
