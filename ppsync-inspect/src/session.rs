use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

use log::{error, info, warn};
use ppsync_core::{
    decode_capture, load_capture, CaptureSummary, FrameReader, ReadStats, SampleStats,
};
use ppsync_types::{Frame, IqSample, StreamError};
use serde::Serialize;

use crate::{InputKind, InspectConfig, InspectError, InspectResult};

/// Сессия проверки файлов (single-threaded).
pub struct InspectSession {
    config: InspectConfig,
}

/// Итог сессии по всем файлам.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InspectReport {
    pub files_ok: usize,
    pub files_failed: usize,
    /// Файлы, прочитанные с предупреждениями (хвостовые байты)
    pub files_with_warnings: usize,
}

#[derive(Serialize)]
struct CaptureJson<'a> {
    path: &'a Path,
    summary: CaptureSummary,
    stats: SampleStats,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    samples: Vec<IqSample>,
}

#[derive(Serialize)]
struct TelemetryJson<'a> {
    path: &'a Path,
    stats: ReadStats,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    frames: Vec<Frame>,
}

impl InspectReport {
    pub fn is_success(&self) -> bool {
        self.files_failed == 0
    }
}

impl InspectSession {
    /// Создаёт сессию, проверяя конфигурацию.
    pub fn new(config: InspectConfig) -> InspectResult<Self> {
        if config.inputs.is_empty() {
            return Err(InspectError::Config("no input files".to_string()));
        }

        if config.sample_rate_hz == 0 {
            return Err(InspectError::Config("sample rate must be > 0".to_string()));
        }

        Ok(Self { config })
    }

    pub fn config(&self) -> &InspectConfig {
        &self.config
    }

    /// Проверяет все файлы по очереди. Ошибка одного файла не прерывает
    /// остальные.
    pub fn run<W: Write>(
        &self,
        out: &mut W,
    ) -> InspectReport {
        let mut report = InspectReport::default();

        for path in &self.config.inputs {
            let result = match self.config.kind {
                InputKind::Capture => self.inspect_capture(path, out),
                InputKind::Telemetry => self.inspect_telemetry(path, out),
            };

            match result {
                Ok(warned) => {
                    report.files_ok += 1;
                    if warned {
                        report.files_with_warnings += 1;
                    }
                }
                Err(e) => {
                    error!("{}: {e}", path.display());
                    report.files_failed += 1;
                }
            }
        }

        info!(
            "Inspected {} file(s): {} ok, {} failed",
            self.config.inputs.len(),
            report.files_ok,
            report.files_failed
        );

        report
    }

    /// Возвращает `true`, если файл прочитан с предупреждением.
    fn inspect_capture<W: Write>(
        &self,
        path: &Path,
        out: &mut W,
    ) -> InspectResult<bool> {
        let cfg = &self.config;
        let raw = load_capture(path)?;
        let capture = decode_capture(&raw)?;

        let warned = match capture.warning {
            Some(_) if cfg.strict => {
                return Err(InspectError::TrailingBytes {
                    path: path.to_path_buf(),
                    count: capture.trailing_bytes() as u64,
                });
            }
            Some(w) => {
                warn!("{}: {w}", path.display());
                true
            }
            None => false,
        };

        let summary = capture.summary(cfg.sample_rate_hz);
        let stats = SampleStats::from_samples(capture.samples.iter());

        if !summary.pps_in_capture() {
            warn!(
                "{}: PPS edge at offset {} lies beyond the {} recorded samples",
                path.display(),
                summary.pps_offset_samples,
                summary.sample_count
            );
        }

        if cfg.json {
            let doc = CaptureJson {
                path,
                summary,
                stats,
                samples: capture.samples.iter().take(cfg.dump).collect(),
            };
            serde_json::to_writer(&mut *out, &doc)?;
            writeln!(out)?;
        } else {
            writeln!(out, "{}", path.display())?;
            writeln!(out, "{summary}")?;
            writeln!(out, "{stats}")?;

            for (n, s) in capture.samples.iter().take(cfg.dump).enumerate() {
                writeln!(out, "  [{n:>6}] I={:>6} Q={:>6}", s.i, s.q)?;
            }
        }

        Ok(warned)
    }

    fn inspect_telemetry<W: Write>(
        &self,
        path: &Path,
        out: &mut W,
    ) -> InspectResult<bool> {
        let cfg = &self.config;
        let file = File::open(path)?;
        let mut reader = FrameReader::new(BufReader::new(file));
        let mut frames = Vec::new();

        if !cfg.json {
            writeln!(out, "{}", path.display())?;
        }

        while let Some(result) = reader.next_frame() {
            match result {
                Ok(frame) => {
                    if frames.len() < cfg.dump {
                        if !cfg.json {
                            print_frame(out, frames.len(), &frame)?;
                        }
                        frames.push(frame);
                    }
                }
                Err(StreamError::Frame(e)) => {
                    warn!("{}: frame skipped: {e}", path.display());
                }
                Err(e) => return Err(e.into()),
            }
        }

        let stats = reader.stats().clone();

        if cfg.strict && stats.trailing_bytes > 0 {
            return Err(InspectError::TrailingBytes {
                path: path.to_path_buf(),
                count: stats.trailing_bytes,
            });
        }

        let warned = stats.trailing_bytes > 0;
        if warned {
            warn!(
                "{}: {} trailing bytes ignored",
                path.display(),
                stats.trailing_bytes
            );
        }

        if cfg.json {
            let doc = TelemetryJson {
                path,
                stats,
                frames,
            };
            serde_json::to_writer(&mut *out, &doc)?;
            writeln!(out)?;
        } else {
            writeln!(out, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
            writeln!(out, "  Frames        : {}", stats.frames_ok)?;
            writeln!(out, "  Unknown type  : {}", stats.unknown_type)?;
            writeln!(out, "  Payload errors: {}", stats.payload_errors)?;
            writeln!(out, "  Bytes         : {}", stats.bytes_processed)?;
            writeln!(out, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        }

        Ok(warned)
    }
}

fn print_frame<W: Write>(
    out: &mut W,
    n: usize,
    frame: &Frame,
) -> InspectResult<()> {
    writeln!(out, "[{n}] POSITION INFO @ {:.4} s", frame.header.seconds())?;
    if let Some(p) = frame.position() {
        writeln!(out, "{p}")?;
    }
    Ok(())
}
