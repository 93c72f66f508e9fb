//! Ядро декодирования ppsync
//!
//! Декодеры двух бинарных форматов: телеметрических кадров GPSDO,
//! поступающих по последовательному порту, и файлов захвата IQ,
//! синхронизированных по PPS.
//!
//! # Быстрый старт
//!
//! ```no_run
//! use ppsync_core::{decode_capture, load_capture, decode_frame};
//!
//! let raw = load_capture("data/1700000000.bin")?;
//! let capture = decode_capture(&raw)?;
//! println!("PPS offset: {}", capture.header.pps_offset());
//! for s in capture.samples.iter().take(4) {
//!     println!("{} {}", s.i, s.q);
//! }
//!
//! let frame = [0u8; 128];
//! if let Err(e) = decode_frame(&frame) {
//!     eprintln!("skip: {e}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod binary;
pub mod capture;
pub mod pps;
pub mod stats;
pub mod stream;
pub mod summary;
pub mod telemetry;

pub use binary::*;
pub use capture::*;
pub use pps::*;
pub use stats::*;
pub use stream::*;
pub use summary::*;
pub use telemetry::*;

/// Версия библиотеки.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
