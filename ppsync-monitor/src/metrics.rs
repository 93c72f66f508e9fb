use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Instant,
};

use serde::Serialize;

/// Метрики, обновляемые lock-free из потока источника и декодера.
#[derive(Debug, Default)]
pub struct MonitorMetrics {
    pub chunks_received: AtomicU64,
    pub frames_decoded: AtomicU64,
    pub unknown_type: AtomicU64,
    pub payload_errors: AtomicU64,
    pub truncated_frames: AtomicU64,
    pub dropped_chunks: AtomicU64,
    pub disciplined_frames: AtomicU64,
    pub tick_wraps: AtomicU64,
}

/// Snapshot метрик для отображения / тестирования.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSummary {
    pub duration_secs: f64,
    pub chunks_received: u64,
    pub frames_decoded: u64,
    pub unknown_type: u64,
    pub payload_errors: u64,
    pub truncated_frames: u64,
    pub dropped_chunks: u64,
    pub disciplined_frames: u64,
    pub tick_wraps: u64,
    pub frame_rate_hz: f64,
    pub error_rate_pct: f64,
}

impl MonitorMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Все кадры, отброшенные декодером.
    pub fn frame_errors(&self) -> u64 {
        self.unknown_type.load(Ordering::Relaxed)
            + self.payload_errors.load(Ordering::Relaxed)
            + self.truncated_frames.load(Ordering::Relaxed)
    }

    /// Декодированных кадров в секунду.
    pub fn frame_rate_hz(
        &self,
        elapsed: &Instant,
    ) -> f64 {
        let secs = elapsed.elapsed().as_secs_f64();

        if secs < 1e-9 {
            return 0.0;
        }

        self.frames_decoded.load(Ordering::Relaxed) as f64 / secs
    }

    /// Процент принятых чанков, которые не дали кадра (0.0-100.0).
    pub fn error_rate_pct(&self) -> f64 {
        let errors = self.frame_errors();
        let total = errors + self.frames_decoded.load(Ordering::Relaxed);

        if total == 0 {
            0.0
        } else {
            errors as f64 / total as f64 * 100.0
        }
    }

    /// Итоговая сводка для вывода в конце сессии.
    pub fn summary(
        &self,
        elapsed: &Instant,
    ) -> MetricsSummary {
        MetricsSummary {
            duration_secs: elapsed.elapsed().as_secs_f64(),
            chunks_received: self.chunks_received.load(Ordering::Relaxed),
            frames_decoded: self.frames_decoded.load(Ordering::Relaxed),
            unknown_type: self.unknown_type.load(Ordering::Relaxed),
            payload_errors: self.payload_errors.load(Ordering::Relaxed),
            truncated_frames: self.truncated_frames.load(Ordering::Relaxed),
            dropped_chunks: self.dropped_chunks.load(Ordering::Relaxed),
            disciplined_frames: self.disciplined_frames.load(Ordering::Relaxed),
            tick_wraps: self.tick_wraps.load(Ordering::Relaxed),
            frame_rate_hz: self.frame_rate_hz(elapsed),
            error_rate_pct: self.error_rate_pct(),
        }
    }
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(f, "  Duration      : {:.1}s", self.duration_secs)?;
        writeln!(f, "  Chunks        : {}", self.chunks_received)?;
        writeln!(f, "  Frames        : {}", self.frames_decoded)?;
        writeln!(f, "  Disciplined   : {}", self.disciplined_frames)?;
        writeln!(
            f,
            "  Errors        : unknown={} payload={} truncated={} ({:.2}%)",
            self.unknown_type, self.payload_errors, self.truncated_frames, self.error_rate_pct
        )?;
        writeln!(f, "  Dropped       : {}", self.dropped_chunks)?;
        writeln!(f, "  Tick wraps    : {}", self.tick_wraps)?;
        writeln!(f, "  Frame rate    : {:.2} Hz", self.frame_rate_hz)?;
        write!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")
    }
}
