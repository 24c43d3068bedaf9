pub mod scope;
pub mod scrambler;

pub use scope::*;
pub use scrambler::*;
