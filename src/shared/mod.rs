pub mod errors;
pub mod locks;
pub mod shutdown;

pub use errors::*;
pub use locks::{KeyedGuard, KeyedLocks};
pub use shutdown::*;
