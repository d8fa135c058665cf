use tracing::warn;
use windows::Win32::Graphics::Dxgi::*;

/// Drains the DXGI debug message queue into the log.
pub fn print_dxgi_debug_messages(info_queue: Option<&IDXGIInfoQueue>) {
    let Some(queue) = info_queue else {
        warn!("DXGI info queue not available");
        return;
    };

    warn!("--- DXGI Debug Messages START ---");
    let num_messages = unsafe { queue.GetNumStoredMessages(DXGI_DEBUG_ALL) };
    for i in 0..num_messages {
        let mut message_size: usize = 0;
        if unsafe { queue.GetMessage(DXGI_DEBUG_ALL, i, None, &mut message_size) }.is_err() {
            warn!(index = i, "could not size debug message");
            continue;
        }

        // u64 backing keeps the message header aligned
        let mut buffer = vec![0u64; message_size.div_ceil(8)];
        let message = buffer.as_mut_ptr() as *mut DXGI_INFO_QUEUE_MESSAGE;
        if unsafe { queue.GetMessage(DXGI_DEBUG_ALL, i, Some(message), &mut message_size) }.is_err() {
            warn!(index = i, "could not read debug message");
            continue;
        }

        let (severity, id, description) = unsafe {
            let message = &*message;
            let bytes = std::slice::from_raw_parts(
                message.pDescription as *const u8,
                message.DescriptionByteLength,
            );
            (
                severity_name(message.Severity),
                message.ID,
                String::from_utf8_lossy(bytes)
                    .trim_end_matches('\0')
                    .trim()
                    .to_string(),
            )
        };
        warn!("DXGI Debug [{severity} ID:{id}]: {description}");
    }
    unsafe { queue.ClearStoredMessages(DXGI_DEBUG_ALL) };
    warn!("--- DXGI Debug Messages END ---");
}

fn severity_name(severity: DXGI_INFO_QUEUE_MESSAGE_SEVERITY) -> &'static str {
    match severity {
        DXGI_INFO_QUEUE_MESSAGE_SEVERITY_CORRUPTION => "CORRUPTION",
        DXGI_INFO_QUEUE_MESSAGE_SEVERITY_ERROR => "ERROR",
        DXGI_INFO_QUEUE_MESSAGE_SEVERITY_WARNING => "WARNING",
        DXGI_INFO_QUEUE_MESSAGE_SEVERITY_INFO => "INFO",
        DXGI_INFO_QUEUE_MESSAGE_SEVERITY_MESSAGE => "MESSAGE",
        _ => "UNKNOWN",
    }
}
