#[cfg(windows)]
mod core;
#[cfg(windows)]
mod device;
#[cfg(windows)]
mod pipeline;
#[cfg(windows)]
mod resources;
#[cfg_attr(not(windows), allow(dead_code))]
mod scene;
#[cfg_attr(not(windows), allow(dead_code))]
mod texture_image;

#[cfg(windows)]
pub fn main() -> windy::windy_error::MyResult<()> {
    use frame_plumbing::launch_options::LaunchOptions;
    use tracing::info;
    use windy::fatal::report_fatal;
    use windy::window::current_module;
    use windy::window::Window;

    use crate::core::Core;

    windy::init_tracing()?;
    let options = LaunchOptions::from_env()?;
    info!(?options, "starting spinning cube");

    let mut window = Window::new(
        current_module()?,
        "SpinningCubeWindow",
        "D3D11 Spinning Cube",
        800,
        600,
    )?;

    let mut core = match Core::new(window.hwnd(), options) {
        Ok(core) => core,
        Err(e) => {
            report_fatal("Error", &e);
            return Err(e);
        }
    };

    while !window.termination_requested() && !core.termination_requested() {
        window.update();
        core.update();
        core.draw();
    }

    // release GPU objects while the window still exists
    drop(core);
    drop(window);
    info!("Goodbye");
    Ok(())
}

#[cfg(not(windows))]
fn main() {
    eprintln!("d3d11_spinning_cube needs Windows and Direct3D 11");
}
