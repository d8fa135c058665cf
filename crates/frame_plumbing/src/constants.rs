//! Constant-buffer layouts shared with the HLSL side.
//!
//! Matrices are stored column by column, which matches HLSL's default
//! `column_major` packing, so shaders multiply as `mul(M, v)`.

use bevy_math::Mat4;
use bevy_math::Vec3;
use bytemuck::Pod;
use bytemuck::Zeroable;

/// Direct3D 12 requires constant buffer views to start on 256-byte boundaries.
pub const CONSTANT_BUFFER_ALIGNMENT: usize = 256;

/// Byte offset of `slot` in a buffer of back-to-back aligned constant slots.
pub fn constant_slot_offset(slot: usize) -> u64 {
    (slot * CONSTANT_BUFFER_ALIGNMENT) as u64
}

/// Per-frame constants for the spinning cube, bound to `b0`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SceneConstants {
    pub world: [f32; 16],
    pub view: [f32; 16],
    pub projection: [f32; 16],
    /// Direction the light travels, `w` unused.
    pub light_direction: [f32; 4],
}

impl SceneConstants {
    pub fn new(world: Mat4, view: Mat4, projection: Mat4, light_direction: Vec3) -> Self {
        Self {
            world: world.to_cols_array(),
            view: view.to_cols_array(),
            projection: projection.to_cols_array(),
            light_direction: light_direction.normalize_or_zero().extend(0.0).to_array(),
        }
    }
}

/// One object's combined transform, padded to a whole constant-buffer slot.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ObjectConstants {
    pub transform: [f32; 16],
    padding: [f32; 48],
}

impl ObjectConstants {
    pub fn new(transform: Mat4) -> Self {
        Self {
            transform: transform.to_cols_array(),
            padding: [0.0; 48],
        }
    }
}

impl Default for ObjectConstants {
    fn default() -> Self {
        Self::zeroed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_constants_fill_one_aligned_slot() {
        assert_eq!(std::mem::size_of::<ObjectConstants>(), CONSTANT_BUFFER_ALIGNMENT);
    }

    #[test]
    fn slot_offsets_step_by_one_alignment() {
        assert_eq!(constant_slot_offset(0), 0);
        assert_eq!(constant_slot_offset(1), 256);
        assert_eq!(constant_slot_offset(2), 512);
        assert_eq!(constant_slot_offset(2) % CONSTANT_BUFFER_ALIGNMENT as u64, 0);
    }

    #[test]
    fn scene_constants_pack_into_16_byte_registers() {
        assert_eq!(std::mem::size_of::<SceneConstants>() % 16, 0);
        assert_eq!(std::mem::size_of::<SceneConstants>(), 208);
    }

    #[test]
    fn matrices_are_stored_column_major() {
        let translation = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let constants = ObjectConstants::new(translation);
        assert_eq!(&constants.transform[12..15], &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn light_direction_is_normalized() {
        let constants = SceneConstants::new(
            Mat4::IDENTITY,
            Mat4::IDENTITY,
            Mat4::IDENTITY,
            Vec3::new(0.0, -4.0, 0.0),
        );
        assert_eq!(constants.light_direction, [0.0, -1.0, 0.0, 0.0]);
    }

    #[test]
    fn default_transform_is_all_zero() {
        assert!(ObjectConstants::default().transform.iter().all(|&v| v == 0.0));
    }
}
