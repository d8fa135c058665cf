use std::path::Path;

use eyre::eyre;
use frame_plumbing::mesh::TexturedVertex;
use frame_plumbing::shader_stages::ShaderStages;
use windows::core::s;
use windows::Win32::Foundation::*;
use windows::Win32::Graphics::Direct3D::*;
use windows::Win32::Graphics::Direct3D11::*;
use windows::Win32::Graphics::Dxgi::Common::*;
use windy::compile_shader::blob_bytes;
use windy::compile_shader::compile_shader;
use windy::compile_shader::default_compile_flags;
use windy::windy_error::MyResult;
use windy::windy_error::MyWrapErr;

pub const SHADER_FILE: &str = "shaders/cube.hlsl";

/// A vertex shader plus the byte code its input layout is validated against.
pub struct VertexStage {
    pub shader: ID3D11VertexShader,
    pub byte_code: ID3DBlob,
}

pub type CubeShaders = ShaderStages<VertexStage, ID3D11GeometryShader, ID3D11PixelShader>;

/// Fixed-function state for an opaque, depth-tested, back-face-culled mesh.
pub struct PipelineStates {
    pub blend: ID3D11BlendState,
    pub depth_stencil: ID3D11DepthStencilState,
    pub rasterizer: ID3D11RasterizerState,
}

macro_rules! created {
    ($out:expr, $what:literal) => {
        $out.ok_or_else(|| eyre!(concat!($what, " creation returned nothing")))
    };
}

/// Compiles and creates the vertex, geometry and pixel shaders in that order.
pub fn create_shaders(device: &ID3D11Device, hlsl_path: &Path) -> MyResult<CubeShaders> {
    let flags = default_compile_flags();
    ShaderStages::build(
        || -> MyResult<VertexStage> {
            let byte_code = compile_shader(hlsl_path, s!("VertexShade"), s!("vs_4_0"), flags)
                .wrap_err("VertexShader loading failed")?;
            let mut shader = None;
            unsafe { device.CreateVertexShader(blob_bytes(&byte_code), None, Some(&mut shader))? };
            Ok(VertexStage {
                shader: created!(shader, "vertex shader")?,
                byte_code,
            })
        },
        || -> MyResult<Option<ID3D11GeometryShader>> {
            let byte_code = compile_shader(hlsl_path, s!("GeometryShade"), s!("gs_4_0"), flags)
                .wrap_err("GeometryShader loading failed")?;
            let mut shader = None;
            unsafe {
                device.CreateGeometryShader(blob_bytes(&byte_code), None, Some(&mut shader))?
            };
            Ok(Some(created!(shader, "geometry shader")?))
        },
        || -> MyResult<ID3D11PixelShader> {
            let byte_code = compile_shader(hlsl_path, s!("PixelShade"), s!("ps_4_0"), flags)
                .wrap_err("PixelShader loading failed")?;
            let mut shader = None;
            unsafe { device.CreatePixelShader(blob_bytes(&byte_code), None, Some(&mut shader))? };
            Ok(created!(shader, "pixel shader")?)
        },
    )
}

pub fn create_input_layout(device: &ID3D11Device, vertex: &VertexStage) -> MyResult<ID3D11InputLayout> {
    let layout = [
        D3D11_INPUT_ELEMENT_DESC {
            SemanticName: s!("POSITION"),
            SemanticIndex: 0,
            Format: DXGI_FORMAT_R32G32B32_FLOAT,
            InputSlot: 0,
            AlignedByteOffset: 0,
            InputSlotClass: D3D11_INPUT_PER_VERTEX_DATA,
            InstanceDataStepRate: 0,
        },
        D3D11_INPUT_ELEMENT_DESC {
            SemanticName: s!("TEXCOORD"),
            SemanticIndex: 0,
            Format: DXGI_FORMAT_R32G32_FLOAT,
            InputSlot: 0,
            AlignedByteOffset: TexturedVertex::TEX_COORD_OFFSET,
            InputSlotClass: D3D11_INPUT_PER_VERTEX_DATA,
            InstanceDataStepRate: 0,
        },
    ];

    let mut input_layout = None;
    unsafe {
        device.CreateInputLayout(&layout, blob_bytes(&vertex.byte_code), Some(&mut input_layout))?
    };
    Ok(created!(input_layout, "input layout")?)
}

pub fn create_pipeline_states(device: &ID3D11Device) -> MyResult<PipelineStates> {
    let rasterizer_desc = D3D11_RASTERIZER_DESC {
        FillMode: D3D11_FILL_SOLID,
        CullMode: D3D11_CULL_BACK,
        FrontCounterClockwise: FALSE,
        DepthClipEnable: TRUE,
        ..Default::default()
    };
    let mut rasterizer = None;
    unsafe { device.CreateRasterizerState(&rasterizer_desc, Some(&mut rasterizer))? };

    let depth_stencil_desc = D3D11_DEPTH_STENCIL_DESC {
        DepthEnable: TRUE,
        DepthWriteMask: D3D11_DEPTH_WRITE_MASK_ALL,
        DepthFunc: D3D11_COMPARISON_LESS,
        StencilEnable: FALSE,
        ..Default::default()
    };
    let mut depth_stencil = None;
    unsafe { device.CreateDepthStencilState(&depth_stencil_desc, Some(&mut depth_stencil))? };

    let mut blend_desc = D3D11_BLEND_DESC::default();
    blend_desc.RenderTarget[0] = D3D11_RENDER_TARGET_BLEND_DESC {
        BlendEnable: FALSE,
        SrcBlend: D3D11_BLEND_ONE,
        DestBlend: D3D11_BLEND_ZERO,
        BlendOp: D3D11_BLEND_OP_ADD,
        SrcBlendAlpha: D3D11_BLEND_ONE,
        DestBlendAlpha: D3D11_BLEND_ZERO,
        BlendOpAlpha: D3D11_BLEND_OP_ADD,
        RenderTargetWriteMask: D3D11_COLOR_WRITE_ENABLE_ALL.0 as u8,
    };
    let mut blend = None;
    unsafe { device.CreateBlendState(&blend_desc, Some(&mut blend))? };

    Ok(PipelineStates {
        blend: created!(blend, "blend state")?,
        depth_stencil: created!(depth_stencil, "depth-stencil state")?,
        rasterizer: created!(rasterizer, "rasterizer state")?,
    })
}

/// Binds shaders, layout and fixed-function state to the immediate context.
pub fn bind(
    context: &ID3D11DeviceContext,
    shaders: &CubeShaders,
    input_layout: &ID3D11InputLayout,
    states: &PipelineStates,
) {
    unsafe {
        context.IASetInputLayout(input_layout);
        context.IASetPrimitiveTopology(D3D11_PRIMITIVE_TOPOLOGY_TRIANGLELIST);
        context.VSSetShader(&shaders.vertex.shader, None);
        if let Some(geometry) = &shaders.geometry {
            context.GSSetShader(geometry, None);
        }
        context.PSSetShader(&shaders.pixel, None);
        context.RSSetState(&states.rasterizer);
        context.OMSetDepthStencilState(&states.depth_stencil, 0);
        context.OMSetBlendState(&states.blend, None, 0xffff_ffff);
    }
}
