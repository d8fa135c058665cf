use std::fmt;

use tracing::debug;

/// The CPU side of a GPU completion counter.
///
/// On Direct3D 12 this is an `ID3D12Fence` paired with the queue that signals it.
pub trait GpuTimeline {
    type Error;

    /// Enqueues a signal that sets the counter to `value` once all previously
    /// submitted work has finished.
    fn signal(&mut self, value: u64) -> Result<(), Self::Error>;

    /// The highest value the GPU has reported as complete.
    fn completed_value(&self) -> u64;

    /// Blocks until `completed_value() >= value`.
    fn wait_until(&mut self, value: u64) -> Result<(), Self::Error>;
}

#[derive(Debug)]
pub enum FrameSyncError<E> {
    Timeline(E),
    BackBufferOutOfRange { index: u32, frame_count: usize },
}

impl<E: fmt::Display> fmt::Display for FrameSyncError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameSyncError::Timeline(e) => write!(f, "fence operation failed: {e}"),
            FrameSyncError::BackBufferOutOfRange { index, frame_count } => write!(
                f,
                "back buffer index {index} is outside the {frame_count}-buffer swap chain"
            ),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for FrameSyncError<E> {}

/// Tracks which fence value guards each back buffer's command allocator.
///
/// Every submitted frame gets a fresh, strictly larger fence value. Before the
/// CPU records into a frame slot again, [`FrameSync::end_frame`] blocks until
/// the value last signaled for that slot has completed.
#[derive(Debug, Clone)]
pub struct FrameSync<const N: usize> {
    frame_index: usize,
    fence_values: [u64; N],
    next_fence_value: u64,
}

impl<const N: usize> FrameSync<N> {
    pub fn new(initial_index: u32) -> Self {
        assert!(N > 0, "a swap chain needs at least one buffer");
        debug_assert!((initial_index as usize) < N);
        Self {
            frame_index: initial_index as usize % N,
            fence_values: [0; N],
            next_fence_value: 1,
        }
    }

    pub fn frame_index(&self) -> u32 {
        self.frame_index as u32
    }

    /// Fence value that must complete before slot `index` is recorded into again.
    pub fn fence_value(&self, index: usize) -> u64 {
        self.fence_values[index]
    }

    /// The most recent value handed to [`GpuTimeline::signal`], zero before the first frame.
    pub fn last_signaled(&self) -> u64 {
        self.next_fence_value - 1
    }

    /// The slot a flip-model swap chain will hand out after the current one.
    pub fn expected_next_index(&self) -> u32 {
        ((self.frame_index + 1) % N) as u32
    }

    /// Whether the GPU has finished with the current slot's last submission.
    pub fn is_frame_reusable(&self, completed_value: u64) -> bool {
        completed_value >= self.fence_values[self.frame_index]
    }

    /// Signals the end of the current frame and moves to `next_index`, waiting
    /// for the GPU if that slot is still in flight. Returns the signaled value.
    pub fn end_frame<T: GpuTimeline>(
        &mut self,
        timeline: &mut T,
        next_index: u32,
    ) -> Result<u64, FrameSyncError<T::Error>> {
        if next_index as usize >= N {
            return Err(FrameSyncError::BackBufferOutOfRange {
                index: next_index,
                frame_count: N,
            });
        }

        let signaled = self.next_fence_value;
        timeline.signal(signaled).map_err(FrameSyncError::Timeline)?;
        self.fence_values[self.frame_index] = signaled;
        self.next_fence_value += 1;

        self.frame_index = next_index as usize;
        if !self.is_frame_reusable(timeline.completed_value()) {
            let required = self.fence_values[self.frame_index];
            debug!(slot = self.frame_index, required, "waiting for GPU to release frame slot");
            timeline
                .wait_until(required)
                .map_err(FrameSyncError::Timeline)?;
        }

        Ok(signaled)
    }

    /// Waits until every frame submitted so far has finished on the GPU.
    pub fn wait_for_idle<T: GpuTimeline>(&mut self, timeline: &mut T) -> Result<(), T::Error> {
        let value = self.next_fence_value;
        timeline.signal(value)?;
        self.next_fence_value += 1;
        if timeline.completed_value() < value {
            timeline.wait_until(value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A GPU that only finishes work when the CPU explicitly waits on it,
    /// unless `complete_on_signal` is set.
    #[derive(Default)]
    struct MockTimeline {
        signaled: Vec<u64>,
        waits: Vec<u64>,
        completed: u64,
        complete_on_signal: bool,
        fail_signals: bool,
    }

    impl GpuTimeline for MockTimeline {
        type Error = String;

        fn signal(&mut self, value: u64) -> Result<(), Self::Error> {
            if self.fail_signals {
                return Err("queue lost".to_string());
            }
            self.signaled.push(value);
            if self.complete_on_signal {
                self.completed = value;
            }
            Ok(())
        }

        fn completed_value(&self) -> u64 {
            self.completed
        }

        fn wait_until(&mut self, value: u64) -> Result<(), Self::Error> {
            assert!(
                self.signaled.iter().any(|&v| v >= value),
                "waiting on {value} which was never signaled"
            );
            self.waits.push(value);
            self.completed = self.completed.max(value);
            Ok(())
        }
    }

    #[test]
    fn signaled_values_strictly_increase() {
        let mut sync = FrameSync::<3>::new(0);
        let mut gpu = MockTimeline::default();
        for _ in 0..10 {
            let next = sync.expected_next_index();
            sync.end_frame(&mut gpu, next).unwrap();
        }
        assert_eq!(gpu.signaled.len(), 10);
        assert!(gpu.signaled.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(sync.last_signaled(), 10);
    }

    #[test]
    fn back_buffer_index_cycles_round_robin() {
        let mut sync = FrameSync::<3>::new(0);
        let mut gpu = MockTimeline::default();
        let mut seen = vec![sync.frame_index()];
        for _ in 0..6 {
            let next = sync.expected_next_index();
            sync.end_frame(&mut gpu, next).unwrap();
            seen.push(sync.frame_index());
        }
        assert_eq!(seen, vec![0, 1, 2, 0, 1, 2, 0]);
    }

    #[test]
    fn slot_is_never_reused_before_its_fence_completes() {
        let mut sync = FrameSync::<3>::new(0);
        let mut gpu = MockTimeline::default();
        for _ in 0..12 {
            assert!(sync.is_frame_reusable(gpu.completed_value()));
            let next = sync.expected_next_index();
            sync.end_frame(&mut gpu, next).unwrap();
            let slot = sync.frame_index() as usize;
            assert!(gpu.completed_value() >= sync.fence_value(slot));
        }
        // The first two slots start untouched, so the first wait happens on frame three.
        assert_eq!(gpu.waits.first(), Some(&1));
        assert_eq!(gpu.waits.len(), 10);
    }

    #[test]
    fn fast_gpu_never_blocks_the_cpu() {
        let mut sync = FrameSync::<2>::new(1);
        let mut gpu = MockTimeline {
            complete_on_signal: true,
            ..Default::default()
        };
        for _ in 0..5 {
            let next = sync.expected_next_index();
            sync.end_frame(&mut gpu, next).unwrap();
        }
        assert!(gpu.waits.is_empty());
    }

    #[test]
    fn out_of_range_index_is_rejected_before_signaling() {
        let mut sync = FrameSync::<3>::new(0);
        let mut gpu = MockTimeline::default();
        let err = sync.end_frame(&mut gpu, 3).unwrap_err();
        assert!(matches!(
            err,
            FrameSyncError::BackBufferOutOfRange { index: 3, frame_count: 3 }
        ));
        assert!(gpu.signaled.is_empty());
        assert_eq!(sync.frame_index(), 0);
    }

    #[test]
    fn timeline_failure_propagates() {
        let mut sync = FrameSync::<3>::new(0);
        let mut gpu = MockTimeline {
            fail_signals: true,
            ..Default::default()
        };
        let err = sync.end_frame(&mut gpu, 1).unwrap_err();
        assert_eq!(err.to_string(), "fence operation failed: queue lost");
        assert_eq!(sync.last_signaled(), 0);
    }

    #[test]
    fn idle_wait_covers_every_submitted_frame() {
        let mut sync = FrameSync::<3>::new(0);
        let mut gpu = MockTimeline::default();
        for _ in 0..4 {
            let next = sync.expected_next_index();
            sync.end_frame(&mut gpu, next).unwrap();
        }
        sync.wait_for_idle(&mut gpu).unwrap();
        assert_eq!(gpu.waits.last(), Some(&5));
        assert!(gpu.signaled.iter().all(|&v| v <= gpu.completed_value()));
    }
}
