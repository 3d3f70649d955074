pub mod attendance;
pub mod disciplinary;
pub mod leave;
pub(crate) mod macros;
pub mod staff;

// Re-export all models for easy importing
pub use attendance::*;
pub use disciplinary::*;
pub use leave::*;
pub use staff::*;

/// Closed set of string-valued variants shared by the record enums.
pub trait StringEnum: Sized + Copy + 'static {
    fn variants() -> &'static [Self];
    fn as_str(&self) -> &'static str;
}
