use frame_plumbing::frame_sync::GpuTimeline;
use tracing::warn;
use windows::Win32::Foundation::*;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::System::Threading::*;
use windy::windy_error::MyResult;

/// A fence signaled from the direct queue, waited on through a Win32 event.
pub struct FenceTimeline {
    fence_event: HANDLE,
    fence: ID3D12Fence,
    command_queue: ID3D12CommandQueue,
}

impl FenceTimeline {
    pub fn new(device: &ID3D12Device, command_queue: &ID3D12CommandQueue) -> MyResult<Self> {
        let fence: ID3D12Fence = unsafe { device.CreateFence(0, D3D12_FENCE_FLAG_NONE)? };
        let fence_event = unsafe { CreateEventA(None, false, false, None)? };
        Ok(Self {
            fence_event,
            fence,
            command_queue: command_queue.clone(),
        })
    }
}

impl GpuTimeline for FenceTimeline {
    type Error = windows::core::Error;

    fn signal(&mut self, value: u64) -> windows::core::Result<()> {
        unsafe { self.command_queue.Signal(&self.fence, value) }
    }

    fn completed_value(&self) -> u64 {
        unsafe { self.fence.GetCompletedValue() }
    }

    fn wait_until(&mut self, value: u64) -> windows::core::Result<()> {
        unsafe { self.fence.SetEventOnCompletion(value, self.fence_event)? };
        let outcome = unsafe { WaitForSingleObjectEx(self.fence_event, INFINITE, false) };
        fence_wait_result(outcome)
    }
}

/// Only a signaled event means the fence value was reached.
fn fence_wait_result(outcome: WAIT_EVENT) -> windows::core::Result<()> {
    match outcome {
        WAIT_OBJECT_0 => Ok(()),
        WAIT_FAILED => Err(windows::core::Error::from_win32()),
        other => Err(windows::core::Error::new(
            E_UNEXPECTED,
            format!("fence event wait ended with {:#x}", other.0),
        )),
    }
}

impl Drop for FenceTimeline {
    fn drop(&mut self) {
        if self.fence_event.is_invalid() {
            return;
        }
        if let Err(e) = unsafe { CloseHandle(self.fence_event) } {
            warn!("closing fence event failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signaled_event_completes_the_wait() {
        assert!(fence_wait_result(WAIT_OBJECT_0).is_ok());
    }

    #[test]
    fn failed_or_unfinished_waits_are_errors() {
        assert!(fence_wait_result(WAIT_FAILED).is_err());
        assert!(fence_wait_result(WAIT_TIMEOUT).is_err());
        assert!(fence_wait_result(WAIT_ABANDONED).is_err());
    }
}
