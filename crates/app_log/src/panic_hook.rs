//! Panic hook for crash reporting

use backtrace::Backtrace;
use chrono::Local;
use std::panic::PanicHookInfo;

/// Initialize the panic hook for crash reporting
pub fn init_panic_hook() {
    std::panic::set_hook(Box::new(panic_handler));
    tracing::debug!("Panic hook initialized");
}

/// Extract the panic message from either payload type `panic!` produces
fn payload_message(info: &PanicHookInfo) -> String {
    let payload = info.payload();
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "<unknown>".to_string()
    }
}

fn panic_handler(info: &PanicHookInfo) {
    let backtrace = Backtrace::new();
    let thread = std::thread::current();
    let thread_name = thread.name().unwrap_or("<unnamed>");
    let message = payload_message(info);

    let report = format!(
        "=== CRITICAL PANIC ===\n\
         Timestamp: {}\n\
         Thread: {}\n\
         Location: {:?}\n\
         Payload: {}\n\n\
         Stack Trace:\n{:?}",
        Local::now().to_rfc3339(),
        thread_name,
        info.location(),
        message,
        backtrace
    );

    eprintln!("{}", report);
    tracing::error!("{}", report);

    let dump_path = std::env::temp_dir().join(format!(
        "image_tagger_crash_{}.txt",
        Local::now().format("%Y%m%d_%H%M%S")
    ));

    if let Err(e) = std::fs::write(&dump_path, &report) {
        eprintln!("Failed to write crash dump: {}", e);
    }

    #[cfg(windows)]
    show_error_dialog(&dump_path, &message);
}

#[cfg(windows)]
fn show_error_dialog(dump_path: &std::path::Path, message: &str) {
    use windows::core::HSTRING;
    use windows::Win32::UI::WindowsAndMessaging::{MessageBoxW, MB_ICONERROR, MB_OK};

    let msg = format!(
        "An unexpected error occurred.\n\n\
         Log file: {}\n\n\
         Error: {}",
        dump_path.display(),
        message
    );

    unsafe {
        MessageBoxW(
            None,
            &HSTRING::from(msg),
            &HSTRING::from("ImageTagger - Fatal Error"),
            MB_ICONERROR | MB_OK,
        );
    }
}
