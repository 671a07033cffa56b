pub mod emitter;
pub mod error;
pub mod result;

pub use emitter::*;
pub use error::*;
pub use result::*;
