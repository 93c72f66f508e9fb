pub mod config;
pub mod error;
pub mod metrics;
pub mod output;
pub mod pipeline;
pub mod source;
pub mod ticks;

pub use config::*;
pub use error::*;
pub use metrics::*;
pub use output::*;
pub use pipeline::*;
pub use source::*;
pub use ticks::*;
