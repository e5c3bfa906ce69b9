//! Version information

/// Crate version baked in at compile time
pub fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
