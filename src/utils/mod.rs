pub mod crypto;
pub mod validation;

pub use crypto::*;
pub use validation::*;
