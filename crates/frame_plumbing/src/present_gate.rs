use tracing::info;

/// What a present (or a test present) reported about the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentStatus {
    Shown,
    Occluded,
}

/// Skips rendering while the window is occluded.
///
/// After a present reports occlusion the gate enters standby. In standby each
/// tick runs a cheap test present instead of drawing, and rendering resumes once
/// the test stops reporting occlusion.
#[derive(Debug, Default)]
pub struct PresentGate {
    standby: bool,
}

impl PresentGate {
    pub fn is_standby(&self) -> bool {
        self.standby
    }

    pub fn should_render(&mut self, probe: impl FnOnce() -> PresentStatus) -> bool {
        if !self.standby {
            return true;
        }
        match probe() {
            PresentStatus::Occluded => false,
            PresentStatus::Shown => {
                info!("window visible again, leaving standby");
                self.standby = false;
                true
            }
        }
    }

    pub fn record(&mut self, status: PresentStatus) {
        if status == PresentStatus::Occluded && !self.standby {
            info!("window occluded, entering standby");
            self.standby = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visible_window_renders_without_probing() {
        let mut gate = PresentGate::default();
        assert!(gate.should_render(|| panic!("probe must not run outside standby")));
    }

    #[test]
    fn occlusion_pauses_until_probe_reports_visible() {
        let mut gate = PresentGate::default();
        gate.record(PresentStatus::Occluded);
        assert!(gate.is_standby());

        assert!(!gate.should_render(|| PresentStatus::Occluded));
        assert!(!gate.should_render(|| PresentStatus::Occluded));
        assert!(gate.is_standby());

        assert!(gate.should_render(|| PresentStatus::Shown));
        assert!(!gate.is_standby());
    }

    #[test]
    fn shown_present_keeps_rendering() {
        let mut gate = PresentGate::default();
        gate.record(PresentStatus::Shown);
        assert!(!gate.is_standby());
    }
}
