//! Platform-neutral bookkeeping shared by the Direct3D demos.

pub mod asset_path;
pub mod constants;
pub mod device_loss;
pub mod driver_fallback;
pub mod frame_stats;
pub mod frame_sync;
pub mod launch_options;
pub mod mesh;
pub mod present_gate;
pub mod shader_stages;
pub mod transform;
