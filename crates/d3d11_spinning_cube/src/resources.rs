use eyre::eyre;
use frame_plumbing::constants::SceneConstants;
use frame_plumbing::mesh::IndexedMesh;
use frame_plumbing::mesh::TexturedVertex;
use image::RgbaImage;
use windows::Win32::Graphics::Direct3D11::*;
use windows::Win32::Graphics::Dxgi::Common::*;
use windows::Win32::Graphics::Dxgi::IDXGISwapChain;
use windy::windy_error::MyResult;

use crate::texture_image::row_pitch;

pub fn create_render_target_view(
    device: &ID3D11Device,
    swap_chain: &IDXGISwapChain,
) -> MyResult<ID3D11RenderTargetView> {
    let back_buffer: ID3D11Texture2D = unsafe { swap_chain.GetBuffer(0)? };
    let mut render_target_view = None;
    unsafe { device.CreateRenderTargetView(&back_buffer, None, Some(&mut render_target_view))? };
    render_target_view.ok_or_else(|| eyre!("render target view creation returned nothing").into())
}

/// A 24-bit depth, 8-bit stencil buffer matching the back buffer size.
pub fn create_depth_stencil_view(
    device: &ID3D11Device,
    width: u32,
    height: u32,
) -> MyResult<ID3D11DepthStencilView> {
    let desc = D3D11_TEXTURE2D_DESC {
        Width: width,
        Height: height,
        MipLevels: 1,
        ArraySize: 1,
        Format: DXGI_FORMAT_D24_UNORM_S8_UINT,
        SampleDesc: DXGI_SAMPLE_DESC {
            Count: 1,
            Quality: 0,
        },
        Usage: D3D11_USAGE_DEFAULT,
        BindFlags: D3D11_BIND_DEPTH_STENCIL.0 as u32,
        CPUAccessFlags: 0,
        MiscFlags: 0,
    };
    let mut depth_buffer = None;
    unsafe { device.CreateTexture2D(&desc, None, Some(&mut depth_buffer))? };
    let depth_buffer = depth_buffer.ok_or_else(|| eyre!("depth buffer creation returned nothing"))?;

    let mut depth_stencil_view = None;
    unsafe { device.CreateDepthStencilView(&depth_buffer, None, Some(&mut depth_stencil_view))? };
    depth_stencil_view.ok_or_else(|| eyre!("depth-stencil view creation returned nothing").into())
}

/// Immutable buffer initialized from `contents`.
fn create_static_buffer(
    device: &ID3D11Device,
    contents: &[u8],
    bind_flags: D3D11_BIND_FLAG,
) -> MyResult<ID3D11Buffer> {
    let desc = D3D11_BUFFER_DESC {
        ByteWidth: contents.len() as u32,
        Usage: D3D11_USAGE_IMMUTABLE,
        BindFlags: bind_flags.0 as u32,
        CPUAccessFlags: 0,
        MiscFlags: 0,
        StructureByteStride: 0,
    };
    let init_data = D3D11_SUBRESOURCE_DATA {
        pSysMem: contents.as_ptr() as *const _,
        SysMemPitch: 0,
        SysMemSlicePitch: 0,
    };
    let mut buffer = None;
    unsafe { device.CreateBuffer(&desc, Some(&init_data), Some(&mut buffer))? };
    buffer.ok_or_else(|| eyre!("buffer creation returned nothing").into())
}

pub struct MeshBuffers {
    pub index_count: u32,
    pub index_buffer: ID3D11Buffer,
    pub vertex_buffer: ID3D11Buffer,
}

pub fn create_mesh_buffers(
    device: &ID3D11Device,
    mesh: &IndexedMesh<TexturedVertex>,
) -> MyResult<MeshBuffers> {
    let vertex_buffer = create_static_buffer(
        device,
        bytemuck::cast_slice(&mesh.vertices),
        D3D11_BIND_VERTEX_BUFFER,
    )?;
    let index_buffer = create_static_buffer(
        device,
        bytemuck::cast_slice(&mesh.indices),
        D3D11_BIND_INDEX_BUFFER,
    )?;
    Ok(MeshBuffers {
        index_count: mesh.indices.len() as u32,
        index_buffer,
        vertex_buffer,
    })
}

/// Default-usage constant buffer rewritten each frame with `UpdateSubresource`.
pub fn create_constant_buffer(device: &ID3D11Device) -> MyResult<ID3D11Buffer> {
    let desc = D3D11_BUFFER_DESC {
        ByteWidth: std::mem::size_of::<SceneConstants>() as u32,
        Usage: D3D11_USAGE_DEFAULT,
        BindFlags: D3D11_BIND_CONSTANT_BUFFER.0 as u32,
        CPUAccessFlags: 0,
        MiscFlags: 0,
        StructureByteStride: 0,
    };
    let mut buffer = None;
    unsafe { device.CreateBuffer(&desc, None, Some(&mut buffer))? };
    buffer.ok_or_else(|| eyre!("constant buffer creation returned nothing").into())
}

pub fn create_texture_view(
    device: &ID3D11Device,
    image: &RgbaImage,
) -> MyResult<ID3D11ShaderResourceView> {
    let (width, height) = image.dimensions();
    let desc = D3D11_TEXTURE2D_DESC {
        Width: width,
        Height: height,
        MipLevels: 1,
        ArraySize: 1,
        Format: DXGI_FORMAT_R8G8B8A8_UNORM,
        SampleDesc: DXGI_SAMPLE_DESC {
            Count: 1,
            Quality: 0,
        },
        Usage: D3D11_USAGE_IMMUTABLE,
        BindFlags: D3D11_BIND_SHADER_RESOURCE.0 as u32,
        CPUAccessFlags: 0,
        MiscFlags: 0,
    };
    let init_data = D3D11_SUBRESOURCE_DATA {
        pSysMem: image.as_raw().as_ptr() as *const _,
        SysMemPitch: row_pitch(image),
        SysMemSlicePitch: 0,
    };
    let mut texture = None;
    unsafe { device.CreateTexture2D(&desc, Some(&init_data), Some(&mut texture))? };
    let texture = texture.ok_or_else(|| eyre!("texture creation returned nothing"))?;

    let mut view = None;
    unsafe { device.CreateShaderResourceView(&texture, None, Some(&mut view))? };
    view.ok_or_else(|| eyre!("shader resource view creation returned nothing").into())
}

pub fn create_sampler(device: &ID3D11Device) -> MyResult<ID3D11SamplerState> {
    let desc = D3D11_SAMPLER_DESC {
        Filter: D3D11_FILTER_MIN_MAG_MIP_LINEAR,
        AddressU: D3D11_TEXTURE_ADDRESS_WRAP,
        AddressV: D3D11_TEXTURE_ADDRESS_WRAP,
        AddressW: D3D11_TEXTURE_ADDRESS_WRAP,
        MipLODBias: 0.0,
        MaxAnisotropy: 1,
        ComparisonFunc: D3D11_COMPARISON_NEVER,
        BorderColor: [0.0, 0.0, 0.0, 0.0],
        MinLOD: 0.0,
        MaxLOD: f32::MAX,
    };
    let mut sampler = None;
    unsafe { device.CreateSamplerState(&desc, Some(&mut sampler))? };
    sampler.ok_or_else(|| eyre!("sampler creation returned nothing").into())
}
