use windows::core::PCWSTR;
use windows::Win32::Foundation::*;
use windows::Win32::Graphics::Gdi::*;
use windows::Win32::UI::Input::KeyboardAndMouse::VK_ESCAPE;
use windows::Win32::UI::WindowsAndMessaging::*;

use crate::windy_error::MyResult;

pub fn create_window_class_struct(
    instance: HINSTANCE,
    class_name: PCWSTR,
) -> MyResult<WNDCLASSEXW> {
    // WNDCLASSEXW - https://learn.microsoft.com/en-us/windows/win32/api/winuser/ns-winuser-wndclassexw
    let wc = WNDCLASSEXW {
        cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
        style: CS_HREDRAW | CS_VREDRAW,
        lpfnWndProc: Some(wndproc),
        hInstance: instance,
        hCursor: unsafe { LoadCursorW(None, IDC_ARROW)? },
        hbrBackground: HBRUSH(unsafe { GetStockObject(BLACK_BRUSH) }.0),
        lpszClassName: class_name,
        ..Default::default()
    };
    Ok(wc)
}

extern "system" fn wndproc(window: HWND, message: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    match message {
        WM_KEYDOWN if wparam.0 == VK_ESCAPE.0 as usize => {
            // closing goes through DefWindowProc, which destroys the window
            unsafe { _ = PostMessageW(Some(window), WM_CLOSE, WPARAM(0), LPARAM(0)) };
            LRESULT(0)
        }
        WM_PAINT => {
            let mut paint = PAINTSTRUCT::default();
            unsafe {
                BeginPaint(window, &mut paint);
                _ = EndPaint(window, &paint);
            }
            LRESULT(0)
        }
        WM_DESTROY => {
            unsafe { PostQuitMessage(0) };
            LRESULT(0)
        }
        _ => unsafe { DefWindowProcW(window, message, wparam, lparam) },
    }
}
