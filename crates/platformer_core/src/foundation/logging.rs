//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system
///
/// Safe to call more than once; later calls are ignored.
pub fn init() {
    // Each test calls this; only the first call installs the logger and the
    // rest get an already-initialized error, which is dropped.
    let _ = env_logger::builder().is_test(cfg!(test)).try_init();
}
