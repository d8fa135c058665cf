use std::time::Instant;

use array_init::try_array_init;
use frame_plumbing::asset_path::locate_asset;
use frame_plumbing::device_loss::DeviceLoss;
use frame_plumbing::frame_stats::FrameStats;
use frame_plumbing::frame_sync::FrameSync;
use frame_plumbing::launch_options::LaunchOptions;
use frame_plumbing::mesh::polygon;
use frame_plumbing::mesh::POLYGON_CORNERS;
use tracing::debug;
use tracing::info;
use tracing::warn;
use windows::core::Interface;
use windows::Win32::Foundation::*;
use windows::Win32::Graphics::Direct3D::*;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;
use windows::Win32::Graphics::Dxgi::*;
use windows::Win32::UI::WindowsAndMessaging::GetClientRect;
use windy::fatal::report_fatal;
use windy::windy_error::MyReport;
use windy::windy_error::MyResult;
use windy::windy_error::MyWrapErr;

use crate::buffers::transition_barrier;
use crate::buffers::ObjectConstantRing;
use crate::buffers::PolygonVertices;
use crate::device::create_device;
use crate::fence_timeline::FenceTimeline;
use crate::info_queue::print_dxgi_debug_messages;
use crate::pipeline::create_pipeline_state;
use crate::pipeline::create_root_signature;
use crate::pipeline::OBJECT_CONSTANTS_SLOT;
use crate::pipeline::SHADER_FILE;
use crate::scene::PolygonScene;
use crate::scene::CLEAR_COLOR;
use crate::scene::POLYGON_COUNT;

pub const FRAME_COUNT: usize = 3;

/// A polygon's GPU data: its vertices plus a transform slot per frame.
struct PolygonObject {
    constants: ObjectConstantRing,
    vertices: PolygonVertices,
}

/// Owns the Direct3D 12 device and everything created from it.
///
/// Fields are declared in reverse creation order so that dropping `Core`
/// releases them newest first. [`Drop`] waits for the GPU before any of them go.
pub struct Core {
    termination: bool,
    stats: FrameStats,
    scene: PolygonScene,
    options: LaunchOptions,
    last_tick: Instant,
    width: u32,
    height: u32,

    frame_sync: FrameSync<FRAME_COUNT>,
    timeline: FenceTimeline,
    objects: [PolygonObject; POLYGON_COUNT],
    command_list: ID3D12GraphicsCommandList,
    pso: ID3D12PipelineState,
    root_signature: ID3D12RootSignature,
    scissor_rect: RECT,
    viewport: D3D12_VIEWPORT,
    command_allocators: [ID3D12CommandAllocator; FRAME_COUNT],
    render_targets: [ID3D12Resource; FRAME_COUNT],
    rtv_descriptor_size: usize,
    rtv_heap: ID3D12DescriptorHeap,
    swap_chain: IDXGISwapChain3,
    command_queue: ID3D12CommandQueue,
    info_queue: Option<IDXGIInfoQueue>,
    device: ID3D12Device,
    /// Held so the factory outlives the swap chain it created.
    _dxgi_factory: IDXGIFactory4,
}

impl Core {
    pub fn new(hwnd: HWND, options: LaunchOptions) -> MyResult<Self> {
        let mut rect = RECT::default();
        unsafe { GetClientRect(hwnd, &mut rect)? };
        let width = (rect.right - rect.left).max(1) as u32;
        let height = (rect.bottom - rect.top).max(1) as u32;

        let bundle = create_device(options.use_warp_device)
            .wrap_err("Direct3D 12 device creation failed")?;
        let info_queue = bundle.info_queue;
        Self::bind_to_window(
            hwnd,
            width,
            height,
            options,
            bundle.dxgi_factory,
            bundle.device,
            info_queue.clone(),
        )
        .inspect_err(|_| print_dxgi_debug_messages(info_queue.as_ref()))
    }

    fn bind_to_window(
        hwnd: HWND,
        width: u32,
        height: u32,
        options: LaunchOptions,
        dxgi_factory: IDXGIFactory4,
        device: ID3D12Device,
        info_queue: Option<IDXGIInfoQueue>,
    ) -> MyResult<Self> {
        let command_queue: ID3D12CommandQueue = unsafe {
            device.CreateCommandQueue(&D3D12_COMMAND_QUEUE_DESC {
                Type: D3D12_COMMAND_LIST_TYPE_DIRECT,
                ..Default::default()
            })?
        };

        let swap_chain_desc = DXGI_SWAP_CHAIN_DESC1 {
            BufferCount: FRAME_COUNT as u32,
            Width: width,
            Height: height,
            Format: DXGI_FORMAT_R8G8B8A8_UNORM,
            BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
            SwapEffect: DXGI_SWAP_EFFECT_FLIP_DISCARD,
            SampleDesc: DXGI_SAMPLE_DESC {
                Count: 1,
                Quality: 0,
            },
            ..Default::default()
        };
        let swap_chain: IDXGISwapChain3 = unsafe {
            dxgi_factory.CreateSwapChainForHwnd(&command_queue, hwnd, &swap_chain_desc, None, None)?
        }
        .cast()?;

        // fullscreen is not supported
        unsafe { dxgi_factory.MakeWindowAssociation(hwnd, DXGI_MWA_NO_ALT_ENTER)? };

        let frame_index = unsafe { swap_chain.GetCurrentBackBufferIndex() };

        let rtv_heap: ID3D12DescriptorHeap = unsafe {
            device.CreateDescriptorHeap(&D3D12_DESCRIPTOR_HEAP_DESC {
                NumDescriptors: FRAME_COUNT as u32,
                Type: D3D12_DESCRIPTOR_HEAP_TYPE_RTV,
                Flags: D3D12_DESCRIPTOR_HEAP_FLAG_NONE,
                ..Default::default()
            })?
        };
        let rtv_descriptor_size =
            unsafe { device.GetDescriptorHandleIncrementSize(D3D12_DESCRIPTOR_HEAP_TYPE_RTV) }
                as usize;
        let rtv_start = unsafe { rtv_heap.GetCPUDescriptorHandleForHeapStart() };

        let render_targets: [ID3D12Resource; FRAME_COUNT] =
            try_array_init(|i| -> MyResult<ID3D12Resource> {
                let resource: ID3D12Resource = unsafe { swap_chain.GetBuffer(i as u32)? };
                let handle = D3D12_CPU_DESCRIPTOR_HANDLE {
                    ptr: rtv_start.ptr + i * rtv_descriptor_size,
                };
                unsafe { device.CreateRenderTargetView(&resource, None, handle) };
                Ok(resource)
            })?;

        let command_allocators: [ID3D12CommandAllocator; FRAME_COUNT] =
            try_array_init(|_| -> MyResult<ID3D12CommandAllocator> {
                Ok(unsafe { device.CreateCommandAllocator(D3D12_COMMAND_LIST_TYPE_DIRECT)? })
            })?;

        let viewport = D3D12_VIEWPORT {
            TopLeftX: 0.0,
            TopLeftY: 0.0,
            Width: width as f32,
            Height: height as f32,
            MinDepth: D3D12_MIN_DEPTH,
            MaxDepth: D3D12_MAX_DEPTH,
        };
        let scissor_rect = RECT {
            left: 0,
            top: 0,
            right: width as i32,
            bottom: height as i32,
        };

        let root_signature = create_root_signature(&device)?;
        let shader_path = locate_asset(SHADER_FILE, env!("CARGO_MANIFEST_DIR"))?;
        let pso = create_pipeline_state(&device, &root_signature, &shader_path)?;

        let command_list: ID3D12GraphicsCommandList = unsafe {
            device.CreateCommandList(
                0,
                D3D12_COMMAND_LIST_TYPE_DIRECT,
                &command_allocators[frame_index as usize],
                &pso,
            )?
        };
        unsafe { command_list.Close()? };

        let vertices = polygon(POLYGON_CORNERS);
        let objects: [PolygonObject; POLYGON_COUNT] =
            try_array_init(|i| -> MyResult<PolygonObject> {
                let vertices =
                    PolygonVertices::new(&device, &vertices, &format!("Polygon{i}Vertices"))?;
                let constants =
                    ObjectConstantRing::new(&device, FRAME_COUNT, &format!("Polygon{i}Constants"))?;
                Ok(PolygonObject {
                    constants,
                    vertices,
                })
            })?;

        let timeline = FenceTimeline::new(&device, &command_queue)?;
        let frame_sync = FrameSync::new(frame_index);

        info!(width, height, frame_index, "polygons ready");
        let now = Instant::now();
        let mut core = Self {
            termination: false,
            stats: FrameStats::new(now),
            scene: PolygonScene::default(),
            options,
            last_tick: now,
            width,
            height,
            frame_sync,
            timeline,
            objects,
            command_list,
            pso,
            root_signature,
            scissor_rect,
            viewport,
            command_allocators,
            render_targets,
            rtv_descriptor_size,
            rtv_heap,
            swap_chain,
            command_queue,
            info_queue,
            device,
            _dxgi_factory: dxgi_factory,
        };
        // every slot starts with a valid transform
        for slot in 0..FRAME_COUNT {
            core.write_constants(slot);
        }
        Ok(core)
    }

    pub fn termination_requested(&self) -> bool {
        self.termination
    }

    /// Advances every polygon and writes the transforms for the current frame slot.
    pub fn update(&mut self) {
        if self.termination {
            return;
        }
        let now = Instant::now();
        let seconds = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;

        self.scene.advance(seconds);
        self.write_constants(self.frame_sync.frame_index() as usize);
    }

    fn write_constants(&mut self, slot: usize) {
        let constants = self.scene.object_constants(self.width, self.height);
        for (object, constants) in self.objects.iter_mut().zip(constants.iter()) {
            object.constants.write(slot, constants);
        }
    }

    /// Records, submits and presents one frame. Any failure is reported once and ends the loop.
    pub fn render(&mut self) {
        if self.termination {
            return;
        }
        if let Err(e) = self.try_render() {
            print_dxgi_debug_messages(self.info_queue.as_ref());
            report_fatal("Error", &e);
            self.termination = true;
        }
    }

    fn try_render(&mut self) -> MyResult<()> {
        self.check_device()?;
        self.populate_command_list()?;

        let command_lists = [Some(self.command_list.cast::<ID3D12CommandList>()?)];
        unsafe { self.command_queue.ExecuteCommandLists(&command_lists) };

        let sync_interval = if self.options.vsync { 1 } else { 0 };
        let presented = unsafe { self.swap_chain.Present(sync_interval, DXGI_PRESENT::default()) };
        if presented.is_err() {
            self.check_device()?;
            presented.ok().wrap_err("Present failed")?;
        }

        let next_index = unsafe { self.swap_chain.GetCurrentBackBufferIndex() };
        self.frame_sync
            .end_frame(&mut self.timeline, next_index)
            .map_err(|e| eyre::eyre!("{e}"))?;

        if let Some(fps) = self.stats.record_frame(Instant::now()) {
            debug!(fps, "frame rate");
        }
        if self.options.frame_limit_reached(self.stats.total_frames()) {
            info!(frames = self.stats.total_frames(), "frame limit reached");
            self.termination = true;
        }
        Ok(())
    }

    fn check_device(&self) -> MyResult<()> {
        let code = match unsafe { self.device.GetDeviceRemovedReason() } {
            Ok(()) => return Ok(()),
            Err(e) => e.code().0,
        };
        match DeviceLoss::from_hresult(code) {
            Some(loss) => Err(MyReport::from(eyre::eyre!("{loss}"))),
            None => Ok(()),
        }
    }

    fn populate_command_list(&self) -> MyResult<()> {
        let frame_index = self.frame_sync.frame_index() as usize;
        let command_allocator = &self.command_allocators[frame_index];
        unsafe { command_allocator.Reset()? };

        let command_list = &self.command_list;
        unsafe { command_list.Reset(command_allocator, &self.pso)? };

        unsafe {
            command_list.SetGraphicsRootSignature(&self.root_signature);
            command_list.RSSetViewports(&[self.viewport]);
            command_list.RSSetScissorRects(&[self.scissor_rect]);
        }

        let back_buffer = &self.render_targets[frame_index];
        let barrier = transition_barrier(
            back_buffer,
            D3D12_RESOURCE_STATE_PRESENT,
            D3D12_RESOURCE_STATE_RENDER_TARGET,
        );
        unsafe { command_list.ResourceBarrier(&[barrier]) };

        let rtv_handle = D3D12_CPU_DESCRIPTOR_HANDLE {
            ptr: unsafe { self.rtv_heap.GetCPUDescriptorHandleForHeapStart() }.ptr
                + frame_index * self.rtv_descriptor_size,
        };

        unsafe {
            command_list.OMSetRenderTargets(1, Some(&rtv_handle), false, None);
            command_list.ClearRenderTargetView(rtv_handle, &CLEAR_COLOR, None);
            command_list.IASetPrimitiveTopology(D3D_PRIMITIVE_TOPOLOGY_TRIANGLELIST);
            for object in &self.objects {
                command_list.SetGraphicsRootConstantBufferView(
                    OBJECT_CONSTANTS_SLOT,
                    object.constants.gpu_address(frame_index),
                );
                command_list.IASetVertexBuffers(0, Some(&[object.vertices.view]));
                command_list.DrawInstanced(3, 1, 0, 0);
            }
        }

        let barrier = transition_barrier(
            back_buffer,
            D3D12_RESOURCE_STATE_RENDER_TARGET,
            D3D12_RESOURCE_STATE_PRESENT,
        );
        unsafe {
            command_list.ResourceBarrier(&[barrier]);
            command_list.Close()?;
        }
        Ok(())
    }
}

impl Drop for Core {
    fn drop(&mut self) {
        // the GPU may still be reading buffers from the last frames
        if let Err(e) = self.frame_sync.wait_for_idle(&mut self.timeline) {
            warn!("waiting for GPU idle on destroy failed: {e}");
        }
        debug!(frames = self.stats.total_frames(), "released Direct3D 12 resources");
    }
}
