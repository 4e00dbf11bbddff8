//! Process-wide logging setup for the catalog service.

pub mod subscriber;

/// Initialize logging. Later calls are no-ops.
pub fn init() {
    subscriber::install();
}
