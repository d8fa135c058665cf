//! Win32 glue for the Direct3D demos: windows, message pumping, shader
//! compilation and fatal error reporting.

#[cfg(windows)]
pub mod compile_shader;
pub mod fatal;
pub mod pump_state;
pub mod wide;
#[cfg(windows)]
pub mod window;
#[cfg(windows)]
pub mod window_class;
pub mod windy_error;
#[cfg(windows)]
pub mod windy_window_class_id;

use eyre::eyre;
use tracing::Level;

use crate::windy_error::MyResult;

/// Installs colored error reports and a formatted tracing subscriber.
pub fn init_tracing() -> MyResult<()> {
    color_eyre::install()?;
    let max_level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt::SubscriberBuilder::default()
        .with_max_level(max_level)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .with_target(false)
        .try_init()
        .map_err(|e| eyre!("failed to install tracing subscriber: {e}"))?;
    Ok(())
}
