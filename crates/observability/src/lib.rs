//! Tracing and logging setup shared by the binaries.

/// Initialize process-wide JSON logging.
///
/// `RUST_LOG` wins when set; otherwise `default_directive` is used.
/// Safe to call multiple times; later calls are no-ops.
pub fn init(default_directive: &str) {
    tracing::init(default_directive);
}

pub mod tracing;
