//! Расширение 32-битного счётчика устройства до монотонного u64.
//!
//! Тик устройства (100 мкс) переполняется примерно каждые 4.97 суток.
//! Декодер кадров переполнение не учитывает; это делает потребитель.

/// Отслеживает переполнения счётчика тиков.
#[derive(Debug, Clone, Default)]
pub struct TickTracker {
    last: Option<u32>,
    wraps: u64,
}

impl TickTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Принимает очередной тик и возвращает монотонное значение.
    ///
    /// Переполнением считается скачок назад больше чем на половину
    /// диапазона u32; меньший скачок назад (перезапуск устройства,
    /// пропуск кадров) переполнением не считается.
    pub fn observe(
        &mut self,
        tick: u32,
    ) -> u64 {
        if let Some(last) = self.last {
            if tick < last && last - tick > u32::MAX / 2 {
                self.wraps += 1;
            }
        }

        self.last = Some(tick);
        (self.wraps << 32) | tick as u64
    }

    /// Количество обнаруженных переполнений.
    pub fn wraps(&self) -> u64 {
        self.wraps
    }

    /// Последний принятый тик.
    pub fn last(&self) -> Option<u32> {
        self.last
    }
}
