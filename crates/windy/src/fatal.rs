use tracing::error;

use crate::windy_error::MyReport;

/// Logs `report` and shows it in a modal message box titled `caption`.
pub fn report_fatal(caption: &str, report: &MyReport) {
    error!("{caption}: {report:?}");
    show_message_box(caption, &format!("{report:#}"));
}

#[cfg(windows)]
fn show_message_box(caption: &str, text: &str) {
    use windows::core::PCWSTR;
    use windows::Win32::UI::WindowsAndMessaging::MessageBoxW;
    use windows::Win32::UI::WindowsAndMessaging::MB_ICONERROR;
    use windows::Win32::UI::WindowsAndMessaging::MB_OK;

    let caption = crate::wide::to_wide(caption);
    let text = crate::wide::to_wide(text);
    unsafe {
        MessageBoxW(
            None,
            PCWSTR(text.as_ptr()),
            PCWSTR(caption.as_ptr()),
            MB_OK | MB_ICONERROR,
        );
    }
}

#[cfg(not(windows))]
fn show_message_box(_caption: &str, _text: &str) {}
