#[cfg(windows)]
mod buffers;
#[cfg(windows)]
mod core;
#[cfg(windows)]
mod device;
#[cfg(windows)]
mod fence_timeline;
#[cfg(windows)]
mod info_queue;
#[cfg(windows)]
mod pipeline;
#[cfg_attr(not(windows), allow(dead_code))]
mod scene;

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
    info!(?options, "starting polygons");

    let title = if options.use_warp_device {
        "D3D12 Polygons (WARP)"
    } else {
        "D3D12 Polygons"
    };
    let mut window = Window::new(current_module()?, "PolygonsWindow", title, 800, 600)?;

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
        core.render();
    }

    // waits for the GPU, then releases everything before the window goes
    drop(core);
    drop(window);
    info!("Goodbye");
    Ok(())
}

#[cfg(not(windows))]
fn main() {
    eprintln!("d3d12_polygons needs Windows and Direct3D 12");
}
