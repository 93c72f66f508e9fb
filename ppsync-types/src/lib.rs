pub mod capture;
pub mod error;
pub mod frame;
pub mod position;
pub mod sample;

pub use capture::*;
pub use error::*;
pub use frame::*;
pub use position::*;
pub use sample::*;
