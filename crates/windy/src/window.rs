use tracing::debug;
use tracing::info;
use windows::core::PCWSTR;
use windows::Win32::Foundation::*;
use windows::Win32::Graphics::Gdi::UpdateWindow;
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::*;

use crate::pump_state::MessagePumpState;
use crate::pump_state::PeekOutcome;
use crate::wide::to_wide;
use crate::window_class::create_window_class_struct;
use crate::windy_error::MyResult;
use crate::windy_error::MyWrapErr;
use crate::windy_window_class_id::RegisteredClass;

/// Handle of the executable that started this process.
pub fn current_module() -> MyResult<HINSTANCE> {
    let module = unsafe { GetModuleHandleW(None)? };
    Ok(module.into())
}

/// A top-level window with its own class, pumped one message at a time.
///
/// Escape closes the window. Closing posts `WM_QUIT`, which the next
/// [`Window::update`] picks up.
pub struct Window {
    hwnd: HWND,
    pump: MessagePumpState,
    class: RegisteredClass,
}

impl Window {
    /// Creates and shows a window whose client area is `width` by `height`.
    pub fn new(
        instance: HINSTANCE,
        class_name: &str,
        title: &str,
        width: i32,
        height: i32,
    ) -> MyResult<Self> {
        let class_name = to_wide(class_name);
        let window_class = create_window_class_struct(instance, PCWSTR(class_name.as_ptr()))?;
        let class = RegisteredClass::register(&window_class, class_name)
            .wrap_err("window class registration failed")?;

        let mut window_rect = RECT {
            left: 0,
            top: 0,
            right: width,
            bottom: height,
        };
        // grow the outer rect so the client area gets the requested size
        unsafe { AdjustWindowRect(&mut window_rect, WS_OVERLAPPEDWINDOW, false)? };

        let title = to_wide(title);
        let hwnd = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                class.atom(),
                PCWSTR(title.as_ptr()),
                WS_OVERLAPPEDWINDOW,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                window_rect.right - window_rect.left,
                window_rect.bottom - window_rect.top,
                None, // no parent window
                None, // no menus
                Some(instance),
                None,
            )
        }
        .wrap_err("window creation failed")?;

        unsafe {
            _ = ShowWindow(hwnd, SW_SHOWNORMAL);
            _ = UpdateWindow(hwnd);
        }
        info!(width, height, "window created");

        Ok(Self {
            hwnd,
            pump: MessagePumpState::default(),
            class,
        })
    }

    pub fn hwnd(&self) -> HWND {
        self.hwnd
    }

    /// Handles at most one pending message without blocking.
    pub fn update(&mut self) {
        let mut message = MSG::default();
        let peeked = unsafe { PeekMessageW(&mut message, None, 0, 0, PM_REMOVE) };
        let outcome = match peeked.0 {
            0 => PeekOutcome::Empty,
            -1 => PeekOutcome::Failed,
            _ => {
                unsafe {
                    _ = TranslateMessage(&message);
                    DispatchMessageW(&message);
                }
                PeekOutcome::Message(message.message)
            }
        };
        self.pump.observe(outcome);
    }

    pub fn termination_requested(&self) -> bool {
        self.pump.termination_requested()
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        // the class cannot be unregistered while a window still uses it
        if unsafe { IsWindow(Some(self.hwnd)) }.as_bool() {
            debug!("destroying window");
            unsafe { _ = DestroyWindow(self.hwnd) };
        }
        debug!(atom = ?self.class.atom(), "releasing window class");
    }
}
