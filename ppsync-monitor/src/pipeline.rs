use std::{
    io::Write,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use log::{debug, info, warn};
use ppsync_core::decode;
use ppsync_types::FrameError;

use crate::{
    metrics::MonitorMetrics,
    output::{write_event, FrameEvent},
    source::{RawChunk, TelemetrySource},
    ticks::TickTracker,
    MonitorConfig, MonitorResult,
};

/// Сколько ждать поток источника после остановки декодера.
pub const SOURCE_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// Оркестрирует сессию мониторинга: поток источника и цикл декодирования.
pub struct MonitorPipeline {
    config: MonitorConfig,
    metrics: Arc<MonitorMetrics>,
    stop_flag: Arc<AtomicBool>,
}

impl MonitorPipeline {
    /// Создаёт пайплайн. Возвращает также shared-ссылку на метрики.
    pub fn new(config: MonitorConfig) -> (Self, Arc<MonitorMetrics>) {
        let metrics = MonitorMetrics::new();
        let stop_flag = Arc::new(AtomicBool::new(false));
        let p = Self {
            config,
            metrics: metrics.clone(),
            stop_flag,
        };

        (p, metrics)
    }

    /// Флаг остановки. Устанавливается в `true` для graceful shutdown.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Запускает мониторинг и пишет события в `out`. Блокируется до
    /// завершения.
    pub fn run<W: Write>(
        self,
        mut source: Box<dyn TelemetrySource>,
        out: &mut W,
    ) -> MonitorResult<()> {
        let info = source.info();

        info!(
            "Starting monitor: {} ({}), format={}",
            info.name,
            info.path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "-".to_string()),
            self.config.output
        );

        let (tx, rx) = crossbeam_channel::bounded::<RawChunk>(self.config.ring_capacity.max(1));
        let stop_flag = self.stop_flag.clone();
        let stop_flag_source = stop_flag.clone();
        let metrics_source = self.metrics.clone();

        // Закрывается, когда поток источника завершился (или упал)
        let (done_tx, done_rx) = crossbeam_channel::bounded::<()>(1);

        // Поток источника
        let source_handle = std::thread::spawn(move || {
            let _done = done_tx;
            let result = source.run(tx, metrics_source, stop_flag_source);

            if let Err(ref e) = result {
                warn!("Source thread error: {e}");
            }

            result
        });

        // Цикл декодирования (текущий поток)
        let decode_result = self.decode_loop(rx, out);

        // Сигнализируем потоку источника остановиться
        stop_flag.store(true, Ordering::Relaxed);

        // Источник, зависший в блокирующем read, не держит завершение сессии
        match done_rx.recv_timeout(SOURCE_SHUTDOWN_TIMEOUT) {
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    "Source thread did not stop within {:?}, detaching",
                    SOURCE_SHUTDOWN_TIMEOUT
                );
            }
            _ => match source_handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("Source thread finished with error: {e}"),
                Err(_) => warn!("Source thread panicked"),
            },
        }

        out.flush()?;
        decode_result
    }

    fn decode_loop<W: Write>(
        &self,
        rx: Receiver<RawChunk>,
        out: &mut W,
    ) -> MonitorResult<()> {
        let cfg = &self.config;
        let metrics = &self.metrics;

        let recv_timeout = Duration::from_millis(100);
        let stats_interval = Duration::from_secs(cfg.stats_interval_secs.max(1));

        let mut ticks = TickTracker::new();
        let session_start = Instant::now();
        let mut last_stats = Instant::now();

        loop {
            if let Some(limit) = cfg.max_frames {
                if metrics.frames_decoded.load(Ordering::Relaxed) >= limit {
                    info!("Frame limit reached ({limit}). Stopping...");
                    break;
                }
            }

            if let Some(dur) = cfg.duration_secs {
                if session_start.elapsed().as_secs() >= dur {
                    info!("Duration limit reached ({dur}s). Stopping...");
                    break;
                }
            }

            if self.stop_flag.load(Ordering::Relaxed) {
                info!("Stop signal received. Stopping...");
                break;
            }

            let chunk = match rx.recv_timeout(recv_timeout) {
                Ok(c) => c,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    info!("Source channel closed");
                    break;
                }
            };

            match decode(&chunk.data) {
                Ok(frame) => {
                    let before = ticks.wraps();
                    let extended = ticks.observe(frame.header.tick);
                    if ticks.wraps() > before {
                        info!("Device tick counter wrapped (#{})", ticks.wraps());
                        metrics.tick_wraps.fetch_add(1, Ordering::Relaxed);
                    }

                    let event = FrameEvent::new(chunk.seq, frame, extended);
                    if event.disciplined {
                        metrics.disciplined_frames.fetch_add(1, Ordering::Relaxed);
                    }
                    metrics.frames_decoded.fetch_add(1, Ordering::Relaxed);

                    write_event(out, cfg.output, &event)?;
                }
                Err(e) => self.record_error(chunk.seq, &e),
            }

            if last_stats.elapsed() >= stats_interval {
                self.log_progress(&session_start);
                last_stats = Instant::now();
            }
        }

        Ok(())
    }

    /// Ошибки отдельного кадра не прерывают поток: считаем и логируем.
    fn record_error(
        &self,
        seq: u64,
        err: &FrameError,
    ) {
        let m = &self.metrics;

        match err {
            FrameError::UnknownMessageType(t) => {
                m.unknown_type.fetch_add(1, Ordering::Relaxed);
                debug!("Chunk #{seq}: unknown message type {t:#04x}, skipped");
            }
            FrameError::PayloadDecode { .. } => {
                m.payload_errors.fetch_add(1, Ordering::Relaxed);
                warn!("Chunk #{seq}: {err}");
            }
            FrameError::TruncatedHeader { .. } => {
                m.truncated_frames.fetch_add(1, Ordering::Relaxed);
                warn!("Chunk #{seq}: {err}");
            }
        }
    }

    fn log_progress(
        &self,
        start: &Instant,
    ) {
        let m = &self.metrics;

        info!(
            "[ {:.0}s ] frames={} errors={} ({:.2}%) dropped={} wraps={}",
            start.elapsed().as_secs_f64(),
            m.frames_decoded.load(Ordering::Relaxed),
            m.frame_errors(),
            m.error_rate_pct(),
            m.dropped_chunks.load(Ordering::Relaxed),
            m.tick_wraps.load(Ordering::Relaxed),
        );
    }
}
