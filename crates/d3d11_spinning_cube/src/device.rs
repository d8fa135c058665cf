use eyre::eyre;
use frame_plumbing::driver_fallback::create_with_fallback;
use frame_plumbing::driver_fallback::fallback_order;
use frame_plumbing::driver_fallback::DriverKind;
use tracing::info;
use tracing::warn;
use windows::Win32::Foundation::*;
use windows::Win32::Graphics::Direct3D::*;
use windows::Win32::Graphics::Direct3D11::*;
use windows::Win32::Graphics::Dxgi::Common::*;
use windows::Win32::Graphics::Dxgi::*;
use windy::windy_error::MyResult;

const FEATURE_LEVELS: [D3D_FEATURE_LEVEL; 3] = [
    D3D_FEATURE_LEVEL_11_0,
    D3D_FEATURE_LEVEL_10_1,
    D3D_FEATURE_LEVEL_10_0,
];

/// Declared in reverse creation order, which is also drop order.
pub struct DeviceBundle {
    pub swap_chain: IDXGISwapChain,
    pub context: ID3D11DeviceContext,
    pub device: ID3D11Device,
    pub feature_level: D3D_FEATURE_LEVEL,
}

fn driver_type(kind: DriverKind) -> D3D_DRIVER_TYPE {
    match kind {
        DriverKind::Hardware => D3D_DRIVER_TYPE_HARDWARE,
        DriverKind::Warp => D3D_DRIVER_TYPE_WARP,
        DriverKind::Reference => D3D_DRIVER_TYPE_REFERENCE,
    }
}

/// Creates the device, its immediate context and a windowed single-buffer swap chain.
pub fn create_device_and_swap_chain(
    hwnd: HWND,
    width: u32,
    height: u32,
    use_warp_device: bool,
) -> MyResult<DeviceBundle> {
    let swap_chain_desc = DXGI_SWAP_CHAIN_DESC {
        BufferDesc: DXGI_MODE_DESC {
            Width: width,
            Height: height,
            RefreshRate: DXGI_RATIONAL {
                Numerator: 60,
                Denominator: 1,
            },
            Format: DXGI_FORMAT_R8G8B8A8_UNORM,
            ..Default::default()
        },
        SampleDesc: DXGI_SAMPLE_DESC {
            Count: 1,
            Quality: 0,
        },
        BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
        BufferCount: 1,
        OutputWindow: hwnd,
        Windowed: TRUE,
        SwapEffect: DXGI_SWAP_EFFECT_DISCARD,
        Flags: 0,
    };

    let (driver, bundle) = create_with_fallback(fallback_order(use_warp_device), |kind| {
        create_for_driver(kind, &swap_chain_desc)
    })
    .map_err(|e| eyre!("{e}"))?;

    info!(
        %driver,
        feature_level = ?bundle.feature_level,
        "Direct3D 11 device ready"
    );
    Ok(bundle)
}

fn create_for_driver(kind: DriverKind, swap_chain_desc: &DXGI_SWAP_CHAIN_DESC) -> MyResult<DeviceBundle> {
    if cfg!(debug_assertions) {
        match create_with_flags(kind, D3D11_CREATE_DEVICE_DEBUG, swap_chain_desc) {
            Ok(bundle) => {
                info!("D3D11 Debug Layer Enabled");
                return Ok(bundle);
            }
            Err(e) if e.code() == DXGI_ERROR_SDK_COMPONENT_MISSING => {
                warn!("Warning: D3D11 Debug Layer unavailable.");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(create_with_flags(kind, D3D11_CREATE_DEVICE_FLAG(0), swap_chain_desc)?)
}

fn create_with_flags(
    kind: DriverKind,
    flags: D3D11_CREATE_DEVICE_FLAG,
    swap_chain_desc: &DXGI_SWAP_CHAIN_DESC,
) -> windows::core::Result<DeviceBundle> {
    let mut swap_chain = None;
    let mut device = None;
    let mut context = None;
    let mut feature_level = D3D_FEATURE_LEVEL_11_0;
    unsafe {
        D3D11CreateDeviceAndSwapChain(
            None, // default adapter
            driver_type(kind),
            HMODULE::default(), // no software rasterizer module
            flags,
            Some(&FEATURE_LEVELS),
            D3D11_SDK_VERSION,
            Some(swap_chain_desc),
            Some(&mut swap_chain),
            Some(&mut device),
            Some(&mut feature_level),
            Some(&mut context),
        )?;
    }

    match (swap_chain, device, context) {
        (Some(swap_chain), Some(device), Some(context)) => Ok(DeviceBundle {
            swap_chain,
            context,
            device,
            feature_level,
        }),
        _ => Err(E_POINTER.into()),
    }
}

#[cfg(test)]
mod tests {
    use windy::window::current_module;
    use windy::window::Window;

    use super::*;

    #[test]
    fn warp_device_comes_up_with_a_swap_chain() {
        let window =
            Window::new(current_module().unwrap(), "cube-device-test", "device test", 64, 64)
                .unwrap();
        let bundle = create_device_and_swap_chain(window.hwnd(), 64, 64, true).unwrap();
        assert!(bundle.feature_level.0 >= D3D_FEATURE_LEVEL_10_0.0);
    }
}
