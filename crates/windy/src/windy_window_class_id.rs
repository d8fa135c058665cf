use eyre::eyre;
use tracing::debug;
use tracing::warn;
use widestring::U16CString;
use windows::core::Param;
use windows::core::ParamValue;
use windows::core::PCWSTR;
use windows::Win32::Foundation::HINSTANCE;
use windows::Win32::UI::WindowsAndMessaging::RegisterClassExW;
use windows::Win32::UI::WindowsAndMessaging::UnregisterClassW;
use windows::Win32::UI::WindowsAndMessaging::WNDCLASSEXW;

use crate::windy_error::MyResult;

/// Equivalent to the MAKEINTATOM macro in C/C++.
///
/// https://learn.microsoft.com/en-us/windows/win32/api/winbase/nf-winbase-makeintatom
#[allow(non_snake_case)]
pub fn MAKEINTOATOM(atom: u16) -> PCWSTR {
    // low word is the atom, high word zero
    PCWSTR(atom as usize as *const u16)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassIdAtom(u16);

impl From<u16> for ClassIdAtom {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl Param<PCWSTR> for &ClassIdAtom {
    unsafe fn param(self) -> ParamValue<PCWSTR> {
        ParamValue::Owned(MAKEINTOATOM(self.0))
    }
}

/// A registered window class. Unregisters itself on drop.
pub struct RegisteredClass {
    atom: ClassIdAtom,
    instance: HINSTANCE,
    // lpszClassName must outlive the registration
    _name: U16CString,
}

impl RegisteredClass {
    /// Registers `class` whose `lpszClassName` points into `name`.
    pub fn register(class: &WNDCLASSEXW, name: U16CString) -> MyResult<Self> {
        let atom = unsafe { RegisterClassExW(class) };
        if atom == 0 {
            let error = std::io::Error::last_os_error();
            return Err(eyre!("RegisterClassExW failed: {error}").into());
        }
        debug!(atom, class = %name.to_string_lossy(), "registered window class");
        Ok(Self {
            atom: ClassIdAtom(atom),
            instance: class.hInstance,
            _name: name,
        })
    }

    pub fn atom(&self) -> &ClassIdAtom {
        &self.atom
    }
}

impl Drop for RegisteredClass {
    fn drop(&mut self) {
        if let Err(error) = unsafe { UnregisterClassW(&self.atom, Some(self.instance)) } {
            warn!(%error, "failed to unregister window class");
        }
    }
}
