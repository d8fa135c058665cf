use std::fmt::Display;

pub type MyResult<T, E = MyReport> = core::result::Result<T, E>;

pub struct MyReport {
    inner: eyre::Report,
}

impl MyReport {
    pub fn into_report(self) -> eyre::Report {
        self.inner
    }

    pub fn wrap_err<D>(self, message: D) -> Self
    where
        D: Display + Send + Sync + 'static,
    {
        Self {
            inner: self.inner.wrap_err(message),
        }
    }
}

impl From<eyre::Report> for MyReport {
    fn from(report: eyre::Report) -> Self {
        Self { inner: report }
    }
}

impl std::fmt::Display for MyReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.inner, f)
    }
}

impl std::fmt::Debug for MyReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&self.inner, f)
    }
}

#[cfg(windows)]
impl From<windows::core::Error> for MyReport {
    fn from(error: windows::core::Error) -> Self {
        Self {
            inner: eyre::Report::new(WrappedWindowsError::from(error)),
        }
    }
}

/// `windows::core::Error` carries a COM error-info pointer, so it travels inside eyre behind this wrapper.
#[cfg(windows)]
pub struct WrappedWindowsError {
    inner: windows::core::Error,
}

#[cfg(windows)]
impl WrappedWindowsError {
    pub fn code(&self) -> windows::core::HRESULT {
        self.inner.code()
    }
}

#[cfg(windows)]
impl From<windows::core::Error> for WrappedWindowsError {
    fn from(error: windows::core::Error) -> Self {
        Self { inner: error }
    }
}

#[cfg(windows)]
impl std::error::Error for WrappedWindowsError {}

#[cfg(windows)]
impl std::fmt::Display for WrappedWindowsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.inner.message(), self.inner.code())
    }
}

#[cfg(windows)]
impl std::fmt::Debug for WrappedWindowsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

/// Attaches context to anything that converts into a [`MyReport`].
pub trait MyWrapErr<T> {
    fn wrap_err<D>(self, message: D) -> MyResult<T>
    where
        D: Display + Send + Sync + 'static;
}

impl<T, E> MyWrapErr<T> for Result<T, E>
where
    E: Into<MyReport>,
{
    fn wrap_err<D>(self, message: D) -> MyResult<T>
    where
        D: Display + Send + Sync + 'static,
    {
        self.map_err(|error| {
            let report: MyReport = error.into();
            report.wrap_err(message)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyre::eyre;

    fn failing_step() -> MyResult<()> {
        Err(eyre!("cube.hlsl(12,5): error X3004: undeclared identifier 'normal'").into())
    }

    #[test]
    fn context_wraps_the_underlying_message() {
        let report = failing_step().wrap_err("vertex shader loading failed").unwrap_err();
        assert_eq!(report.to_string(), "vertex shader loading failed");

        let chain = format!("{report:#}");
        assert!(chain.contains("vertex shader loading failed"));
        assert!(chain.contains("X3004"));
    }

    #[test]
    fn eyre_reports_convert_with_question_mark() {
        fn inner() -> MyResult<u32> {
            let value: eyre::Result<u32> = Ok(7);
            Ok(value?)
        }
        assert_eq!(inner().unwrap(), 7);
    }
}
