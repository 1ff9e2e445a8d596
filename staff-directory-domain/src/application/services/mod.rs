pub mod error_translator;
pub mod identity_management;

pub use error_translator::*;
pub use identity_management::*;
