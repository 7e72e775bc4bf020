pub mod fault;
pub mod limits;

pub use fault::*;
pub use limits::*;
