use std::time::Instant;

use eyre::eyre;
use frame_plumbing::asset_path::locate_asset;
use frame_plumbing::device_loss::DeviceLoss;
use frame_plumbing::frame_stats::FrameStats;
use frame_plumbing::launch_options::LaunchOptions;
use frame_plumbing::mesh::cube;
use frame_plumbing::mesh::TexturedVertex;
use frame_plumbing::present_gate::PresentGate;
use frame_plumbing::present_gate::PresentStatus;
use tracing::debug;
use tracing::info;
use windows::Win32::Foundation::*;
use windows::Win32::Graphics::Direct3D11::*;
use windows::Win32::Graphics::Dxgi::Common::*;
use windows::Win32::Graphics::Dxgi::*;
use windows::Win32::UI::WindowsAndMessaging::GetClientRect;
use windy::fatal::report_fatal;
use windy::windy_error::MyResult;
use windy::windy_error::MyWrapErr;

use crate::device::create_device_and_swap_chain;
use crate::pipeline;
use crate::pipeline::create_input_layout;
use crate::pipeline::create_pipeline_states;
use crate::pipeline::create_shaders;
use crate::pipeline::CubeShaders;
use crate::pipeline::PipelineStates;
use crate::pipeline::SHADER_FILE;
use crate::resources::*;
use crate::scene::CubeScene;
use crate::scene::CLEAR_COLOR;
use crate::scene::CUBE_HALF_EXTENT;
use crate::texture_image::load_rgba8;
use crate::texture_image::TEXTURE_FILE;

/// Owns every Direct3D 11 object used to draw the spinning cube.
///
/// Fields are declared in reverse creation order so that dropping `Core`
/// releases views and states before the swap chain, context and device.
pub struct Core {
    termination: bool,
    gate: PresentGate,
    stats: FrameStats,
    scene: CubeScene,
    options: LaunchOptions,
    last_tick: Instant,
    width: u32,
    height: u32,

    sampler: ID3D11SamplerState,
    texture_view: ID3D11ShaderResourceView,
    constant_buffer: ID3D11Buffer,
    mesh: MeshBuffers,
    states: PipelineStates,
    input_layout: ID3D11InputLayout,
    shaders: CubeShaders,
    depth_stencil_view: ID3D11DepthStencilView,
    render_target_view: ID3D11RenderTargetView,
    swap_chain: IDXGISwapChain,
    context: ID3D11DeviceContext,
    device: ID3D11Device,
}

impl Core {
    pub fn new(hwnd: HWND, options: LaunchOptions) -> MyResult<Self> {
        let mut rect = RECT::default();
        unsafe { GetClientRect(hwnd, &mut rect)? };
        let width = (rect.right - rect.left).max(1) as u32;
        let height = (rect.bottom - rect.top).max(1) as u32;

        let bundle = create_device_and_swap_chain(hwnd, width, height, options.use_warp_device)
            .wrap_err("Direct3D 11 device creation failed")?;
        let device = bundle.device;
        let context = bundle.context;
        let swap_chain = bundle.swap_chain;

        let render_target_view = create_render_target_view(&device, &swap_chain)?;
        let depth_stencil_view = create_depth_stencil_view(&device, width, height)?;

        let source_dir = env!("CARGO_MANIFEST_DIR");
        let shader_path = locate_asset(SHADER_FILE, source_dir)?;
        let shaders = create_shaders(&device, &shader_path)?;
        let input_layout = create_input_layout(&device, &shaders.vertex)?;
        let states = create_pipeline_states(&device)?;

        let mesh = create_mesh_buffers(&device, &cube(CUBE_HALF_EXTENT))?;
        let constant_buffer = create_constant_buffer(&device)?;

        let texture_path = locate_asset(TEXTURE_FILE, source_dir)?;
        let image = load_rgba8(&texture_path)?;
        let texture_view = create_texture_view(&device, &image)?;
        let sampler = create_sampler(&device)?;

        info!(width, height, "spinning cube ready");
        let now = Instant::now();
        Ok(Self {
            termination: false,
            gate: PresentGate::default(),
            stats: FrameStats::new(now),
            scene: CubeScene::default(),
            options,
            last_tick: now,
            width,
            height,
            sampler,
            texture_view,
            constant_buffer,
            mesh,
            states,
            input_layout,
            shaders,
            depth_stencil_view,
            render_target_view,
            swap_chain,
            context,
            device,
        })
    }

    pub fn termination_requested(&self) -> bool {
        self.termination
    }

    /// Advances the animation and uploads the new constants.
    pub fn update(&mut self) {
        if self.termination {
            return;
        }
        let now = Instant::now();
        let seconds = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;

        self.scene.advance(seconds);
        let constants = self.scene.constants(self.width, self.height);
        unsafe {
            self.context.UpdateSubresource(
                &self.constant_buffer,
                0,
                None,
                &constants as *const _ as *const _,
                0,
                0,
            );
        }
    }

    /// Draws and presents one frame. Any failure is reported once and ends the loop.
    pub fn draw(&mut self) {
        if self.termination {
            return;
        }
        if let Err(e) = self.try_draw() {
            report_fatal("Error", &e);
            self.termination = true;
        }
    }

    fn try_draw(&mut self) -> MyResult<()> {
        self.check_device()?;

        let swap_chain = &self.swap_chain;
        let render = self.gate.should_render(|| {
            let result = unsafe { swap_chain.Present(0, DXGI_PRESENT_TEST) };
            if result == DXGI_STATUS_OCCLUDED {
                PresentStatus::Occluded
            } else {
                PresentStatus::Shown
            }
        });
        if !render {
            return Ok(());
        }

        self.record_draw();

        let sync_interval = if self.options.vsync { 1 } else { 0 };
        let result = unsafe { self.swap_chain.Present(sync_interval, DXGI_PRESENT(0)) };
        if result == DXGI_STATUS_OCCLUDED {
            self.gate.record(PresentStatus::Occluded);
        } else if result.is_err() {
            self.check_device()?;
            result.ok().wrap_err("Present failed")?;
        } else {
            self.gate.record(PresentStatus::Shown);
        }

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
        let reason = unsafe { self.device.GetDeviceRemovedReason() };
        let code = match reason {
            Ok(()) => return Ok(()),
            Err(e) => e.code().0,
        };
        match DeviceLoss::from_hresult(code) {
            Some(loss) => Err(eyre!("{loss}").into()),
            None => Ok(()),
        }
    }

    fn record_draw(&self) {
        let context = &self.context;
        let viewport = D3D11_VIEWPORT {
            TopLeftX: 0.0,
            TopLeftY: 0.0,
            Width: self.width as f32,
            Height: self.height as f32,
            MinDepth: 0.0,
            MaxDepth: 1.0,
        };
        let stride = std::mem::size_of::<TexturedVertex>() as u32;
        let offset = 0;

        unsafe {
            context.OMSetRenderTargets(
                Some(&[Some(self.render_target_view.clone())]),
                &self.depth_stencil_view,
            );
            context.RSSetViewports(Some(&[viewport]));
            context.ClearRenderTargetView(&self.render_target_view, &CLEAR_COLOR);
            context.ClearDepthStencilView(
                &self.depth_stencil_view,
                D3D11_CLEAR_DEPTH.0 as u32,
                1.0,
                0,
            );
        }

        pipeline::bind(context, &self.shaders, &self.input_layout, &self.states);

        let constant_buffers = [Some(self.constant_buffer.clone())];
        unsafe {
            context.IASetVertexBuffers(
                0,
                1,
                Some(&Some(self.mesh.vertex_buffer.clone())),
                Some(&stride),
                Some(&offset),
            );
            context.IASetIndexBuffer(&self.mesh.index_buffer, DXGI_FORMAT_R16_UINT, 0);
            context.VSSetConstantBuffers(0, Some(&constant_buffers));
            context.GSSetConstantBuffers(0, Some(&constant_buffers));
            context.PSSetConstantBuffers(0, Some(&constant_buffers));
            context.PSSetShaderResources(0, Some(&[Some(self.texture_view.clone())]));
            context.PSSetSamplers(0, Some(&[Some(self.sampler.clone())]));
            context.DrawIndexed(self.mesh.index_count, 0, 0);
        }
    }
}

impl Drop for Core {
    fn drop(&mut self) {
        unsafe { self.context.ClearState() };
        debug!(frames = self.stats.total_frames(), "released Direct3D 11 resources");
    }
}
