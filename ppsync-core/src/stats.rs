use ppsync_types::IqSample;
use serde::Serialize;

/// Простая статистика по IQ выборкам: уровни, DC смещение, клиппинг.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SampleStats {
    pub count: u64,
    /// Максимум |I|
    pub peak_i: u16,
    /// Максимум |Q|
    pub peak_q: u16,
    /// Среднее I (DC смещение)
    pub mean_i: f64,
    /// Среднее Q (DC смещение)
    pub mean_q: f64,
    /// Средняя мощность I² + Q²
    pub mean_power: f64,
    /// Выборок, упёршихся в предел АЦП
    pub clipped: u64,
}

impl SampleStats {
    pub fn from_samples<I>(samples: I) -> Self
    where
        I: IntoIterator<Item = IqSample>,
    {
        let mut stats = Self::default();
        let mut sum_i = 0i64;
        let mut sum_q = 0i64;
        let mut sum_power = 0f64;

        for s in samples {
            stats.count += 1;
            stats.peak_i = stats.peak_i.max(s.i.unsigned_abs());
            stats.peak_q = stats.peak_q.max(s.q.unsigned_abs());
            sum_i += s.i as i64;
            sum_q += s.q as i64;
            sum_power += s.power();

            if s.is_clipped() {
                stats.clipped += 1;
            }
        }

        if stats.count > 0 {
            let n = stats.count as f64;
            stats.mean_i = sum_i as f64 / n;
            stats.mean_q = sum_q as f64 / n;
            stats.mean_power = sum_power / n;
        }

        stats
    }

    /// Средняя мощность в дБ относительно полной шкалы (0 dBFS = 32767²).
    pub fn mean_power_dbfs(&self) -> Option<f64> {
        if self.mean_power <= 0.0 {
            return None;
        }

        let full_scale = i16::MAX as f64 * i16::MAX as f64;
        Some(10.0 * (self.mean_power / full_scale).log10())
    }

    /// Доля клиппированных выборок (0.0-100.0).
    pub fn clipped_pct(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.clipped as f64 / self.count as f64 * 100.0
        }
    }
}

impl std::fmt::Display for SampleStats {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        writeln!(f, "  Peak |I|/|Q|  : {} / {}", self.peak_i, self.peak_q)?;
        writeln!(f, "  DC offset     : I={:.2} Q={:.2}", self.mean_i, self.mean_q)?;
        match self.mean_power_dbfs() {
            Some(db) => writeln!(f, "  Mean power    : {db:.2} dBFS")?,
            None => writeln!(f, "  Mean power    : -inf dBFS")?,
        }
        write!(
            f,
            "  Clipped       : {} ({:.2}%)",
            self.clipped,
            self.clipped_pct()
        )
    }
}
