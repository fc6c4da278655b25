// All core functionality is in docgrade-core
// This CLI acts as a thin wrapper around the core library

// CLI-specific modules
pub mod report;

// Re-export core types for convenience
pub use docgrade_core::*;
