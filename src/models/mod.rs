pub mod case;
pub mod evidence;
pub mod user;

// Re-export commonly used types
pub use case::*;
pub use evidence::*;
pub use user::*;
