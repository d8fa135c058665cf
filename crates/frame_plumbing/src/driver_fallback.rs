use std::fmt;

use tracing::info;
use tracing::warn;

/// Where a device's rendering actually happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverKind {
    Hardware,
    /// The Windows Advanced Rasterization Platform software renderer.
    Warp,
    Reference,
}

impl DriverKind {
    pub const FALLBACK_ORDER: [DriverKind; 3] =
        [DriverKind::Hardware, DriverKind::Warp, DriverKind::Reference];

    pub fn name(self) -> &'static str {
        match self {
            DriverKind::Hardware => "hardware",
            DriverKind::Warp => "warp",
            DriverKind::Reference => "reference",
        }
    }
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The driver types to try, in priority order. Starting at WARP skips the hardware attempt.
pub fn fallback_order(start_at_warp: bool) -> &'static [DriverKind] {
    if start_at_warp {
        &DriverKind::FALLBACK_ORDER[1..]
    } else {
        &DriverKind::FALLBACK_ORDER
    }
}

/// Every driver type was tried and none produced a device.
#[derive(Debug)]
pub struct FallbackError<E> {
    attempts: Vec<(DriverKind, E)>,
}

impl<E> FallbackError<E> {
    pub fn attempts(&self) -> &[(DriverKind, E)] {
        &self.attempts
    }
}

impl<E: fmt::Display> fmt::Display for FallbackError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.attempts.is_empty() {
            return f.write_str("no driver types were attempted");
        }
        f.write_str("device creation failed for every driver type")?;
        for (kind, error) in &self.attempts {
            write!(f, "\n  {kind}: {error}")?;
        }
        Ok(())
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for FallbackError<E> {}

/// Runs `attempt` for each driver type in `order` and keeps the first success.
pub fn create_with_fallback<T, E: fmt::Display>(
    order: &[DriverKind],
    mut attempt: impl FnMut(DriverKind) -> Result<T, E>,
) -> Result<(DriverKind, T), FallbackError<E>> {
    let mut attempts = Vec::with_capacity(order.len());
    for &kind in order {
        match attempt(kind) {
            Ok(created) => {
                info!(driver = %kind, "device created");
                return Ok((kind, created));
            }
            Err(error) => {
                warn!(driver = %kind, %error, "device creation failed, trying next driver type");
                attempts.push((kind, error));
            }
        }
    }
    Err(FallbackError { attempts })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_available_driver_wins() {
        let mut tried = Vec::new();
        let (kind, device) = create_with_fallback(fallback_order(false), |kind| {
            tried.push(kind);
            match kind {
                DriverKind::Hardware => Err("no adapter"),
                other => Ok(format!("{other} device")),
            }
        })
        .unwrap();
        assert_eq!(kind, DriverKind::Warp);
        assert_eq!(device, "warp device");
        assert_eq!(tried, vec![DriverKind::Hardware, DriverKind::Warp]);
    }

    #[test]
    fn hardware_success_stops_the_search() {
        let mut calls = 0;
        let (kind, _) = create_with_fallback(fallback_order(false), |_| {
            calls += 1;
            Ok::<_, &str>(())
        })
        .unwrap();
        assert_eq!(kind, DriverKind::Hardware);
        assert_eq!(calls, 1);
    }

    #[test]
    fn only_reference_available_still_succeeds() {
        let (kind, _) = create_with_fallback(fallback_order(false), |kind| {
            if kind == DriverKind::Reference {
                Ok(())
            } else {
                Err("unsupported")
            }
        })
        .unwrap();
        assert_eq!(kind, DriverKind::Reference);
    }

    #[test]
    fn exhausting_every_driver_reports_each_failure() {
        let err = create_with_fallback(fallback_order(false), |kind| {
            Err::<(), _>(format!("{kind} refused"))
        })
        .unwrap_err();
        let kinds: Vec<_> = err.attempts().iter().map(|(k, _)| *k).collect();
        assert_eq!(kinds, DriverKind::FALLBACK_ORDER.to_vec());
        let message = err.to_string();
        assert!(message.contains("hardware: hardware refused"));
        assert!(message.contains("reference: reference refused"));
    }

    #[test]
    fn warp_preference_skips_hardware() {
        assert_eq!(
            fallback_order(true),
            &[DriverKind::Warp, DriverKind::Reference]
        );
    }

    #[test]
    fn empty_order_fails_without_attempts() {
        let err = create_with_fallback::<(), &str>(&[], |_| Ok(())).unwrap_err();
        assert!(err.attempts().is_empty());
        assert_eq!(err.to_string(), "no driver types were attempted");
    }
}
