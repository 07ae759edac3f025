// Indentation library - exposes all core modules for testing

// Config types are always available (needed for schema generation)
pub mod config;

// Runtime-only modules (require the "runtime" feature)
#[cfg(feature = "runtime")]
pub mod config_io;
#[cfg(feature = "runtime")]
pub mod error;

// Organized modules (runtime-only)
#[cfg(feature = "runtime")]
pub mod indent;
#[cfg(feature = "runtime")]
pub mod model;
#[cfg(feature = "runtime")]
pub mod primitives;
