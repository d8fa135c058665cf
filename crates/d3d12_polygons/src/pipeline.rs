use std::path::Path;

use eyre::eyre;
use frame_plumbing::mesh::NormalVertex;
use frame_plumbing::shader_stages::ShaderStages;
use tracing::error;
use windows::core::s;
use windows::Win32::Foundation::*;
use windows::Win32::Graphics::Direct3D::*;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;
use windy::compile_shader::blob_bytes;
use windy::compile_shader::compile_shader;
use windy::compile_shader::default_compile_flags;
use windy::windy_error::MyResult;
use windy::windy_error::MyWrapErr;

pub const SHADER_FILE: &str = "shaders/polygons.hlsl";

/// Root parameter slot of the per-object transform.
pub const OBJECT_CONSTANTS_SLOT: u32 = 0;

/// Input-assembler root signature with a single root CBV at `b0` for the vertex stage.
pub fn create_root_signature(device: &ID3D12Device) -> MyResult<ID3D12RootSignature> {
    let parameters = [D3D12_ROOT_PARAMETER {
        ParameterType: D3D12_ROOT_PARAMETER_TYPE_CBV,
        Anonymous: D3D12_ROOT_PARAMETER_0 {
            Descriptor: D3D12_ROOT_DESCRIPTOR {
                ShaderRegister: 0,
                RegisterSpace: 0,
            },
        },
        ShaderVisibility: D3D12_SHADER_VISIBILITY_VERTEX,
    }];
    let desc = D3D12_ROOT_SIGNATURE_DESC {
        NumParameters: parameters.len() as u32,
        pParameters: parameters.as_ptr(),
        Flags: D3D12_ROOT_SIGNATURE_FLAG_ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT,
        ..Default::default()
    };

    let mut signature_blob = None;
    let mut error_blob = None;
    let serialized = unsafe {
        D3D12SerializeRootSignature(
            &desc,
            D3D_ROOT_SIGNATURE_VERSION_1,
            &mut signature_blob,
            Some(&mut error_blob),
        )
    };
    if let Err(e) = serialized {
        let diagnostic = error_blob
            .as_ref()
            .map(|blob| String::from_utf8_lossy(blob_bytes(blob)).trim().to_owned())
            .unwrap_or_default();
        error!("Root Signature Serialization Error: {diagnostic}");
        return Err(e).wrap_err(format!("root signature serialization failed: {diagnostic}"));
    }
    let signature_blob =
        signature_blob.ok_or_else(|| eyre!("root signature serialization returned nothing"))?;

    Ok(unsafe { device.CreateRootSignature(0, blob_bytes(&signature_blob))? })
}

/// Vertex and pixel byte code; this pipeline has no geometry stage.
type PolygonShaders = ShaderStages<ID3DBlob, ID3DBlob, ID3DBlob>;

fn compile_shaders(hlsl_path: &Path) -> MyResult<PolygonShaders> {
    let flags = default_compile_flags();
    ShaderStages::build(
        || {
            compile_shader(hlsl_path, s!("VSMain"), s!("vs_5_0"), flags)
                .wrap_err("VertexShader loading failed")
        },
        || Ok(None),
        || {
            compile_shader(hlsl_path, s!("PSMain"), s!("ps_5_0"), flags)
                .wrap_err("PixelShader loading failed")
        },
    )
}

fn byte_code(blob: &ID3DBlob) -> D3D12_SHADER_BYTECODE {
    D3D12_SHADER_BYTECODE {
        pShaderBytecode: unsafe { blob.GetBufferPointer() },
        BytecodeLength: unsafe { blob.GetBufferSize() },
    }
}

/// Opaque triangles with both faces drawn and no depth buffer.
pub fn create_pipeline_state(
    device: &ID3D12Device,
    root_signature: &ID3D12RootSignature,
    hlsl_path: &Path,
) -> MyResult<ID3D12PipelineState> {
    let shaders = compile_shaders(hlsl_path)?;

    let input_element_descs = [
        D3D12_INPUT_ELEMENT_DESC {
            SemanticName: s!("POSITION"),
            Format: DXGI_FORMAT_R32G32B32_FLOAT,
            InputSlotClass: D3D12_INPUT_CLASSIFICATION_PER_VERTEX_DATA,
            ..Default::default()
        },
        D3D12_INPUT_ELEMENT_DESC {
            SemanticName: s!("NORMAL"),
            Format: DXGI_FORMAT_R32G32B32_FLOAT,
            AlignedByteOffset: NormalVertex::NORMAL_OFFSET,
            InputSlotClass: D3D12_INPUT_CLASSIFICATION_PER_VERTEX_DATA,
            ..Default::default()
        },
    ];

    let mut rtv_formats = [DXGI_FORMAT_UNKNOWN; 8];
    rtv_formats[0] = DXGI_FORMAT_R8G8B8A8_UNORM;

    let pso_desc = D3D12_GRAPHICS_PIPELINE_STATE_DESC {
        pRootSignature: unsafe { std::mem::transmute_copy(root_signature) },
        VS: byte_code(&shaders.vertex),
        PS: byte_code(&shaders.pixel),
        InputLayout: D3D12_INPUT_LAYOUT_DESC {
            pInputElementDescs: input_element_descs.as_ptr(),
            NumElements: input_element_descs.len() as u32,
        },
        RasterizerState: D3D12_RASTERIZER_DESC {
            FillMode: D3D12_FILL_MODE_SOLID,
            CullMode: D3D12_CULL_MODE_NONE,
            DepthClipEnable: TRUE,
            ..Default::default()
        },
        BlendState: D3D12_BLEND_DESC {
            AlphaToCoverageEnable: FALSE,
            IndependentBlendEnable: FALSE,
            RenderTarget: [D3D12_RENDER_TARGET_BLEND_DESC {
                BlendEnable: FALSE,
                LogicOpEnable: FALSE,
                SrcBlend: D3D12_BLEND_ONE,
                DestBlend: D3D12_BLEND_ZERO,
                BlendOp: D3D12_BLEND_OP_ADD,
                SrcBlendAlpha: D3D12_BLEND_ONE,
                DestBlendAlpha: D3D12_BLEND_ZERO,
                BlendOpAlpha: D3D12_BLEND_OP_ADD,
                LogicOp: D3D12_LOGIC_OP_NOOP,
                RenderTargetWriteMask: D3D12_COLOR_WRITE_ENABLE_ALL.0 as u8,
            }; 8],
        },
        DepthStencilState: D3D12_DEPTH_STENCIL_DESC {
            DepthEnable: FALSE,
            StencilEnable: FALSE,
            ..Default::default()
        },
        SampleMask: u32::MAX,
        PrimitiveTopologyType: D3D12_PRIMITIVE_TOPOLOGY_TYPE_TRIANGLE,
        NumRenderTargets: 1,
        RTVFormats: rtv_formats,
        SampleDesc: DXGI_SAMPLE_DESC {
            Count: 1,
            Quality: 0,
        },
        ..Default::default()
    };

    unsafe { device.CreateGraphicsPipelineState(&pso_desc) }
        .wrap_err("pipeline state creation failed")
}
