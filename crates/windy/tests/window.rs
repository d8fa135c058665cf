#![cfg(windows)]

use windows::Win32::Foundation::LPARAM;
use windows::Win32::Foundation::WPARAM;
use windows::Win32::UI::Input::KeyboardAndMouse::VK_ESCAPE;
use windows::Win32::UI::WindowsAndMessaging::IsWindow;
use windows::Win32::UI::WindowsAndMessaging::PostMessageW;
use windows::Win32::UI::WindowsAndMessaging::PostQuitMessage;
use windows::Win32::UI::WindowsAndMessaging::WM_KEYDOWN;
use windows::Win32::UI::WindowsAndMessaging::WM_QUIT;
use windy::pump_state;
use windy::window::current_module;
use windy::window::Window;

// Each test gets its own thread and so its own message queue; class names keep registrations apart.

fn pump_until_terminated(window: &mut Window) -> bool {
    for _ in 0..1000 {
        window.update();
        if window.termination_requested() {
            return true;
        }
    }
    false
}

#[test]
fn fresh_window_does_not_request_termination() {
    let mut window =
        Window::new(current_module().unwrap(), "windy-test-fresh", "fresh", 800, 600).unwrap();
    assert!(unsafe { IsWindow(Some(window.hwnd())) }.as_bool());
    assert!(!window.termination_requested());

    window.update();
    assert!(!window.termination_requested());
}

#[test]
fn quit_message_requests_termination() {
    let mut window =
        Window::new(current_module().unwrap(), "windy-test-quit", "quit", 320, 240).unwrap();
    unsafe { PostQuitMessage(0) };
    assert!(pump_until_terminated(&mut window));
}

#[test]
fn escape_closes_the_window() {
    let mut window =
        Window::new(current_module().unwrap(), "windy-test-escape", "escape", 320, 240).unwrap();
    unsafe {
        PostMessageW(
            Some(window.hwnd()),
            WM_KEYDOWN,
            WPARAM(VK_ESCAPE.0 as usize),
            LPARAM(0),
        )
        .unwrap()
    };
    assert!(pump_until_terminated(&mut window));
    assert!(!unsafe { IsWindow(Some(window.hwnd())) }.as_bool());
}

#[test]
fn quit_constant_matches_win32() {
    assert_eq!(pump_state::WM_QUIT, WM_QUIT);
}
