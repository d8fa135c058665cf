use eyre::eyre;
use frame_plumbing::driver_fallback::create_with_fallback;
use frame_plumbing::driver_fallback::fallback_order;
use frame_plumbing::driver_fallback::DriverKind;
use tracing::debug;
use tracing::info;
use tracing::warn;
use windows::Win32::Graphics::Direct3D::*;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::*;
use windy::wide::from_wide;
use windy::windy_error::MyResult;

/// Factory, device and (in debug builds) the DXGI message queue.
pub struct DeviceBundle {
    pub info_queue: Option<IDXGIInfoQueue>,
    pub device: ID3D12Device,
    pub dxgi_factory: IDXGIFactory4,
}

/// Enables the debug layer, then walks the driver fallback order until a device is created.
pub fn create_device(use_warp_device: bool) -> MyResult<DeviceBundle> {
    let (debug_flags, info_queue) = if cfg!(debug_assertions) {
        enable_debug_layer()
    } else {
        (DXGI_CREATE_FACTORY_FLAGS(0), None)
    };

    let dxgi_factory: IDXGIFactory4 = unsafe { CreateDXGIFactory2(debug_flags)? };

    let (driver, device) = create_with_fallback(fallback_order(use_warp_device), |kind| {
        create_for_driver(kind, &dxgi_factory)
    })
    .map_err(|e| eyre!("{e}"))?;

    info!(%driver, "Direct3D 12 device ready");
    Ok(DeviceBundle {
        info_queue,
        device,
        dxgi_factory,
    })
}

fn enable_debug_layer() -> (DXGI_CREATE_FACTORY_FLAGS, Option<IDXGIInfoQueue>) {
    let mut debug_enabled = false;
    unsafe {
        let mut debug1: Option<ID3D12Debug1> = None;
        let mut debug: Option<ID3D12Debug> = None;
        if let Some(debug1) = D3D12GetDebugInterface(&mut debug1).ok().and(debug1) {
            debug1.EnableDebugLayer();
            debug1.SetEnableGPUBasedValidation(true);
            info!("D3D12 Debug Layer Enabled (ID3D12Debug1 + GBV)");
            debug_enabled = true;
        } else if let Some(debug) = D3D12GetDebugInterface(&mut debug).ok().and(debug) {
            debug.EnableDebugLayer();
            info!("D3D12 Debug Layer Enabled (ID3D12Debug)");
            debug_enabled = true;
        } else {
            warn!("Warning: D3D12 Debug Layer unavailable.");
        }
    }
    if !debug_enabled {
        return (DXGI_CREATE_FACTORY_FLAGS(0), None);
    }

    let info_queue = match unsafe { DXGIGetDebugInterface1::<IDXGIInfoQueue>(0) } {
        Ok(queue) => {
            debug!("DXGI Info Queue obtained.");
            Some(queue)
        }
        Err(e) => {
            warn!("Failed to get DXGI Info Queue: {e}");
            None
        }
    };
    (DXGI_CREATE_FACTORY_DEBUG, info_queue)
}

fn create_for_driver(kind: DriverKind, factory: &IDXGIFactory4) -> MyResult<ID3D12Device> {
    let adapter: IDXGIAdapter1 = match kind {
        DriverKind::Hardware => get_hardware_adapter(factory)?,
        DriverKind::Warp => unsafe { factory.EnumWarpAdapter()? },
        DriverKind::Reference => {
            return Err(eyre!("Direct3D 12 has no reference rasterizer").into());
        }
    };

    let mut device: Option<ID3D12Device> = None;
    unsafe { D3D12CreateDevice(&adapter, D3D_FEATURE_LEVEL_11_0, &mut device)? };
    device.ok_or_else(|| eyre!("D3D12CreateDevice returned no device").into())
}

/// First non-software adapter that can create a feature level 11.0 device.
fn get_hardware_adapter(factory: &IDXGIFactory4) -> MyResult<IDXGIAdapter1> {
    for i in 0.. {
        let adapter = match unsafe { factory.EnumAdapters1(i) } {
            Ok(adapter) => adapter,
            Err(e) if e.code() == DXGI_ERROR_NOT_FOUND => break,
            Err(e) => return Err(e.into()),
        };

        let desc = unsafe { adapter.GetDesc1()? };
        let name = from_wide(&desc.Description);
        if (DXGI_ADAPTER_FLAG(desc.Flags as i32) & DXGI_ADAPTER_FLAG_SOFTWARE)
            != DXGI_ADAPTER_FLAG_NONE
        {
            debug!(index = i, %name, "skipping software adapter");
            continue;
        }

        let supported = unsafe {
            D3D12CreateDevice(
                &adapter,
                D3D_FEATURE_LEVEL_11_0,
                std::ptr::null_mut::<Option<ID3D12Device>>(),
            )
        }
        .is_ok();
        if supported {
            info!(index = i, %name, "selected adapter");
            return Ok(adapter);
        }
        debug!(index = i, %name, "adapter lacks feature level 11.0");
    }

    Err(eyre!("no hardware adapter supports Direct3D 12").into())
}
