pub mod common;
pub mod identity;
pub mod role;

pub use common::*;
pub use identity::*;
pub use role::*;
