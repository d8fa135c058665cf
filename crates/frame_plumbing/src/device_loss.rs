use std::fmt;

/// Raw `HRESULT` values a removed device can report.
pub mod codes {
    pub const INVALID_CALL: i32 = 0x887A_0001_u32 as i32;
    pub const DEVICE_REMOVED: i32 = 0x887A_0005_u32 as i32;
    pub const DEVICE_HUNG: i32 = 0x887A_0006_u32 as i32;
    pub const DEVICE_RESET: i32 = 0x887A_0007_u32 as i32;
    pub const DRIVER_INTERNAL_ERROR: i32 = 0x887A_0020_u32 as i32;
}

/// Why the GPU device went away. Every reason ends rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceLoss {
    Hung,
    Removed,
    Reset,
    DriverInternalError,
    InvalidCall,
    Other(i32),
}

impl DeviceLoss {
    /// Classifies the result of a device-removed-reason query. Success codes mean the device is healthy.
    pub fn from_hresult(code: i32) -> Option<Self> {
        if code >= 0 {
            return None;
        }
        Some(match code {
            codes::DEVICE_HUNG => DeviceLoss::Hung,
            codes::DEVICE_REMOVED => DeviceLoss::Removed,
            codes::DEVICE_RESET => DeviceLoss::Reset,
            codes::DRIVER_INTERNAL_ERROR => DeviceLoss::DriverInternalError,
            codes::INVALID_CALL => DeviceLoss::InvalidCall,
            other => DeviceLoss::Other(other),
        })
    }

    pub fn code(self) -> i32 {
        match self {
            DeviceLoss::Hung => codes::DEVICE_HUNG,
            DeviceLoss::Removed => codes::DEVICE_REMOVED,
            DeviceLoss::Reset => codes::DEVICE_RESET,
            DeviceLoss::DriverInternalError => codes::DRIVER_INTERNAL_ERROR,
            DeviceLoss::InvalidCall => codes::INVALID_CALL,
            DeviceLoss::Other(code) => code,
        }
    }
}

impl fmt::Display for DeviceLoss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            DeviceLoss::Hung => "the GPU stopped responding",
            DeviceLoss::Removed => "the GPU was physically removed or the driver was upgraded",
            DeviceLoss::Reset => "the GPU was reset by a badly formed command",
            DeviceLoss::DriverInternalError => "the driver hit an internal error",
            DeviceLoss::InvalidCall => "the application made an invalid call",
            DeviceLoss::Other(_) => "unrecognized device removal reason",
        };
        write!(f, "device lost: {reason} (0x{:08X})", self.code() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_codes_are_healthy() {
        assert_eq!(DeviceLoss::from_hresult(0), None);
        assert_eq!(DeviceLoss::from_hresult(1), None);
    }

    #[test]
    fn known_reasons_round_trip_through_their_codes() {
        for loss in [
            DeviceLoss::Hung,
            DeviceLoss::Removed,
            DeviceLoss::Reset,
            DeviceLoss::DriverInternalError,
            DeviceLoss::InvalidCall,
        ] {
            assert_eq!(DeviceLoss::from_hresult(loss.code()), Some(loss));
        }
    }

    #[test]
    fn unknown_failure_is_still_a_loss() {
        let e_fail = 0x8000_4005_u32 as i32;
        assert_eq!(DeviceLoss::from_hresult(e_fail), Some(DeviceLoss::Other(e_fail)));
    }

    #[test]
    fn message_names_the_reason_and_code() {
        let text = DeviceLoss::Hung.to_string();
        assert_eq!(text, "device lost: the GPU stopped responding (0x887A0006)");
    }
}
