use std::mem::ManuallyDrop;

use eyre::eyre;
use frame_plumbing::constants::ObjectConstants;
use frame_plumbing::constants::constant_slot_offset;
use frame_plumbing::constants::CONSTANT_BUFFER_ALIGNMENT;
use frame_plumbing::mesh::NormalVertex;
use windows::core::PCWSTR;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;
use windy::wide::to_wide;
use windy::windy_error::MyResult;

/// A committed buffer on the upload heap, readable by the GPU and writable by the CPU.
fn create_upload_buffer(device: &ID3D12Device, size: u64, name: &str) -> MyResult<ID3D12Resource> {
    let heap_props = D3D12_HEAP_PROPERTIES {
        Type: D3D12_HEAP_TYPE_UPLOAD,
        ..Default::default()
    };
    let resource_desc = D3D12_RESOURCE_DESC {
        Dimension: D3D12_RESOURCE_DIMENSION_BUFFER,
        Alignment: 0,
        Width: size,
        Height: 1,
        DepthOrArraySize: 1,
        MipLevels: 1,
        Format: DXGI_FORMAT_UNKNOWN,
        SampleDesc: DXGI_SAMPLE_DESC {
            Count: 1,
            Quality: 0,
        },
        Layout: D3D12_TEXTURE_LAYOUT_ROW_MAJOR,
        Flags: D3D12_RESOURCE_FLAG_NONE,
    };

    let mut buffer: Option<ID3D12Resource> = None;
    unsafe {
        device.CreateCommittedResource(
            &heap_props,
            D3D12_HEAP_FLAG_NONE,
            &resource_desc,
            D3D12_RESOURCE_STATE_GENERIC_READ,
            None,
            &mut buffer,
        )?
    };
    let buffer = buffer.ok_or_else(|| eyre!("{name} creation returned nothing"))?;
    let wide_name = to_wide(name);
    // debug names are best effort
    unsafe { buffer.SetName(PCWSTR(wide_name.as_ptr())) }.ok();
    Ok(buffer)
}

/// One polygon's three vertices, written once and never touched again.
pub struct PolygonVertices {
    pub view: D3D12_VERTEX_BUFFER_VIEW,
    /// Backs the GPU address in `view`.
    _buffer: ID3D12Resource,
}

impl PolygonVertices {
    pub fn new(device: &ID3D12Device, vertices: &[NormalVertex; 3], name: &str) -> MyResult<Self> {
        let bytes: &[u8] = bytemuck::cast_slice(vertices);
        let buffer = create_upload_buffer(device, bytes.len() as u64, name)?;

        unsafe {
            let mut data = std::ptr::null_mut();
            let read_range = D3D12_RANGE { Begin: 0, End: 0 };
            buffer.Map(0, Some(&read_range), Some(&mut data))?;
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), data as *mut u8, bytes.len());
            buffer.Unmap(0, None);
        }

        let view = D3D12_VERTEX_BUFFER_VIEW {
            BufferLocation: unsafe { buffer.GetGPUVirtualAddress() },
            StrideInBytes: std::mem::size_of::<NormalVertex>() as u32,
            SizeInBytes: bytes.len() as u32,
        };
        Ok(Self {
            view,
            _buffer: buffer,
        })
    }
}

/// One polygon's transform, one 256-byte slot per frame in flight.
///
/// The buffer stays mapped for its whole life. The slot for a frame is only
/// written after that frame's fence has completed, so the GPU never reads a
/// half-written matrix.
pub struct ObjectConstantRing {
    mapped: *mut ObjectConstants,
    slots: usize,
    buffer: ID3D12Resource,
}

impl ObjectConstantRing {
    pub fn new(device: &ID3D12Device, slots: usize, name: &str) -> MyResult<Self> {
        debug_assert_eq!(std::mem::size_of::<ObjectConstants>(), CONSTANT_BUFFER_ALIGNMENT);
        let size = (CONSTANT_BUFFER_ALIGNMENT * slots) as u64;
        let buffer = create_upload_buffer(device, size, name)?;

        let mut data = std::ptr::null_mut();
        let read_range = D3D12_RANGE { Begin: 0, End: 0 };
        unsafe { buffer.Map(0, Some(&read_range), Some(&mut data))? };
        let mapped = data as *mut ObjectConstants;
        for slot in 0..slots {
            unsafe { mapped.add(slot).write(ObjectConstants::default()) };
        }

        Ok(Self {
            mapped,
            slots,
            buffer,
        })
    }

    pub fn write(&mut self, slot: usize, constants: &ObjectConstants) {
        assert!(slot < self.slots, "constant slot {slot} out of range");
        unsafe { self.mapped.add(slot).write(*constants) };
    }

    pub fn gpu_address(&self, slot: usize) -> u64 {
        let base = unsafe { self.buffer.GetGPUVirtualAddress() };
        base + constant_slot_offset(slot)
    }
}

impl Drop for ObjectConstantRing {
    fn drop(&mut self) {
        unsafe { self.buffer.Unmap(0, None) };
    }
}

pub fn transition_barrier(
    resource: &ID3D12Resource,
    state_before: D3D12_RESOURCE_STATES,
    state_after: D3D12_RESOURCE_STATES,
) -> D3D12_RESOURCE_BARRIER {
    D3D12_RESOURCE_BARRIER {
        Type: D3D12_RESOURCE_BARRIER_TYPE_TRANSITION,
        Flags: D3D12_RESOURCE_BARRIER_FLAG_NONE,
        Anonymous: D3D12_RESOURCE_BARRIER_0 {
            Transition: ManuallyDrop::new(D3D12_RESOURCE_TRANSITION_BARRIER {
                pResource: unsafe { std::mem::transmute_copy(resource) },
                StateBefore: state_before,
                StateAfter: state_after,
                Subresource: D3D12_RESOURCE_BARRIER_ALL_SUBRESOURCES,
            }),
        },
    }
}
