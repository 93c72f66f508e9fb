//! Курсоры для чтения и записи полей фиксированной ширины.
//!
//! Порядок байт всегда задаётся явно параметром типа из `byteorder`
//! (`LittleEndian`, `BigEndian`), однобайтовые поля его не требуют.

pub mod read;
pub mod write;

pub use read::*;
pub use write::*;
