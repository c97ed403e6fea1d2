//! Type-safe script argument contracts.
//!
//! Arguments for the provisioning script are built from Rust structs rather than
//! raw string vectors, so a flag name lives in exactly one place.

/// Trait for typed script arguments.
///
/// # Contract
///
/// - `to_cli_args()` returns arguments exactly as the script's parameter
///   parser expects them, in order.
/// - Flags with no value are emitted only when enabled.
pub trait ScriptArgs {
    /// Convert struct fields to CLI arguments.
    ///
    /// Example: `["-PackageManager", "winget", "-Verbose"]`
    fn to_cli_args(&self) -> Vec<String>;
}
