pub mod merger;
pub mod screenplay;
pub mod script;
pub mod timestamp;

pub use merger::*;
pub use script::*;
