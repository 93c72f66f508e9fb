use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Размер позиционной нагрузки в байтах (смещения кадра [5..27)).
pub const POSITION_PAYLOAD_SIZE: usize = 22;

/// Масштаб долготы и широты: 1e-7 градуса на единицу.
pub const DEGREES_PER_UNIT: f64 = 1e-7;

/// Масштаб высоты: 1 мм на единицу.
pub const METERS_PER_UNIT: f64 = 1e-3;

/// Значение `fix_type`, которое приёмник выдаёт при 3D решении.
pub const FIX_TYPE_3D: u8 = 3;

/// Позиция, время GNSS и состояние PLL (тип сообщения 1).
///
/// Поля хранятся в сыром виде, как их передаёт устройство; единицы
/// измерения доступны через методы.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PositionRecord {
    /// Долгота, 1e-7 градуса
    pub longitude_raw: i32,
    /// Широта, 1e-7 градуса
    pub latitude_raw: i32,
    /// Высота, мм
    pub height_raw: i32,
    /// Число спутников в решении
    pub satellite_count: u8,
    /// Тип решения (перечисление приёмника, декодером не интерпретируется)
    pub fix_type: u8,
    pub year: i16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    /// PLL синтезатора захвачен на опорную частоту GNSS
    pub pll_locked: bool,
}

impl PositionRecord {
    /// Долгота в градусах.
    pub fn longitude_deg(&self) -> f64 {
        self.longitude_raw as f64 * DEGREES_PER_UNIT
    }

    /// Широта в градусах.
    pub fn latitude_deg(&self) -> f64 {
        self.latitude_raw as f64 * DEGREES_PER_UNIT
    }

    /// Высота в метрах.
    pub fn height_m(&self) -> f64 {
        self.height_raw as f64 * METERS_PER_UNIT
    }

    /// Время GNSS (UTC) или `None`, если поля не образуют корректную дату.
    pub fn utc(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year as i32, self.month as u32, self.day as u32)?.and_hms_opt(
            self.hour as u32,
            self.minute as u32,
            self.second as u32,
        )
    }

    pub fn has_3d_fix(&self) -> bool {
        self.fix_type == FIX_TYPE_3D
    }

    /// Генератор дисциплинирован: есть 3D решение и PLL захвачен.
    pub fn is_disciplined(&self) -> bool {
        self.has_3d_fix() && self.pll_locked
    }
}

impl std::fmt::Display for PositionRecord {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        writeln!(f, "  Longitude     : {:.7} deg", self.longitude_deg())?;
        writeln!(f, "  Latitude      : {:.7} deg", self.latitude_deg())?;
        writeln!(f, "  Height        : {:.3} m", self.height_m())?;
        writeln!(f, "  Satellites    : {}", self.satellite_count)?;
        writeln!(f, "  Fix type      : {}", self.fix_type)?;
        match self.utc() {
            Some(t) => writeln!(f, "  Date          : {}", t.format("%Y-%m-%d %H:%M:%S"))?,
            None => writeln!(f, "  Date          : <invalid>")?,
        }
        write!(
            f,
            "  PLL status    : {}",
            if self.pll_locked { "Locked" } else { "Unlocked" }
        )
    }
}
