use std::path::Path;

use eyre::eyre;
use tracing::debug;
use tracing::error;
use widestring::U16CString;
use windows::core::PCSTR;
use windows::core::PCWSTR;
use windows::Win32::Graphics::Direct3D::Fxc::*;
use windows::Win32::Graphics::Direct3D::*;

use crate::windy_error::MyResult;
use crate::windy_error::MyWrapErr;

/// Flags for development builds: strict HLSL plus debug info without optimization.
pub fn default_compile_flags() -> u32 {
    if cfg!(debug_assertions) {
        D3DCOMPILE_ENABLE_STRICTNESS | D3DCOMPILE_DEBUG | D3DCOMPILE_SKIP_OPTIMIZATION
    } else {
        D3DCOMPILE_ENABLE_STRICTNESS
    }
}

/// Borrows a blob's contents, e.g. compiled byte code or a compiler message.
pub fn blob_bytes(blob: &ID3DBlob) -> &[u8] {
    unsafe { std::slice::from_raw_parts(blob.GetBufferPointer() as *const u8, blob.GetBufferSize()) }
}

/// Compiles one entry point of an HLSL file. Compiler diagnostics become part of the error.
pub fn compile_shader(
    hlsl_path: &Path,
    entry_point: PCSTR,
    target: PCSTR,
    flags: u32,
) -> MyResult<ID3DBlob> {
    let entry_point_str = unsafe { String::from_utf8_lossy(entry_point.as_bytes()) }.into_owned();
    let target_str = unsafe { String::from_utf8_lossy(target.as_bytes()) }.into_owned();
    let wide_path = U16CString::from_os_str(hlsl_path.as_os_str())
        .map_err(|e| eyre!("shader path {} is not a valid file name: {e}", hlsl_path.display()))?;

    let mut shader_blob = None;
    let mut error_blob = None;
    let result = unsafe {
        D3DCompileFromFile(
            PCWSTR(wide_path.as_ptr()),
            None, // Defines
            None, // Include handler
            entry_point,
            target,
            flags,
            0, // Effect flags
            &mut shader_blob,
            Some(&mut error_blob),
        )
    };

    if let Err(e) = result {
        let diagnostic = error_blob
            .as_ref()
            .map(|blob| String::from_utf8_lossy(blob_bytes(blob)).trim_end_matches('\0').trim().to_owned())
            .unwrap_or_default();
        error!(
            "Shader compile error ({} {}): {}",
            entry_point_str, target_str, diagnostic
        );
        let context = if diagnostic.is_empty() {
            format!("compiling {entry_point_str} ({target_str}) from {}", hlsl_path.display())
        } else {
            format!("compiling {entry_point_str} ({target_str}): {diagnostic}")
        };
        return Err(e).wrap_err(context);
    }

    debug!(entry_point = %entry_point_str, target = %target_str, "compiled shader");
    shader_blob.ok_or_else(|| eyre!("D3DCompileFromFile returned no byte code").into())
}
