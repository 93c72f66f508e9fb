use serde::Serialize;

/// Одна комплексная выборка: синфазная (I) и квадратурная (Q) составляющие.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct IqSample {
    pub i: i16,
    pub q: i16,
}

impl IqSample {
    pub fn new(
        i: i16,
        q: i16,
    ) -> Self {
        Self { i, q }
    }

    /// Мгновенная мощность `I² + Q²`.
    pub fn power(&self) -> f64 {
        let i = self.i as f64;
        let q = self.q as f64;
        i * i + q * q
    }

    /// Модуль комплексной выборки.
    pub fn magnitude(&self) -> f64 {
        self.power().sqrt()
    }

    /// Хотя бы одна составляющая упёрлась в предел АЦП.
    pub fn is_clipped(&self) -> bool {
        matches!(self.i, i16::MIN | i16::MAX) || matches!(self.q, i16::MIN | i16::MAX)
    }
}

impl From<(i16, i16)> for IqSample {
    fn from((i, q): (i16, i16)) -> Self {
        Self { i, q }
    }
}
