pub mod info;
pub mod new;
pub mod run;

pub use info::*;
pub use new::*;
pub use run::*;
