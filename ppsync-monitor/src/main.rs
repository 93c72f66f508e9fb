use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Instant,
};

use clap::Parser;
use log::{error, info, warn, LevelFilter};
use ppsync_monitor::{
    create_source, MonitorConfig, MonitorPipeline, OutputFormat, SourceKind, DEFAULT_BAUD_RATE,
};

#[derive(Parser, Debug)]
#[command(
    name = "ppsync-monitor",
    version = env!("CARGO_PKG_VERSION"),
    about = "Decode GPSDO telemetry frames from a serial port",
    long_about = None,
)]
struct Cli {
    /// Источник: путь к порту (/dev/ttyACM0) или sim
    #[arg(short, long, default_value = "/dev/ttyACM0")]
    source: SourceKind,
    /// Скорость порта (бод)
    #[arg(short, long, default_value_t = DEFAULT_BAUD_RATE)]
    baud: u32,
    /// Формат вывода: text, json
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,
    /// Остановиться после N кадров
    #[arg(short = 'n', long)]
    max_frames: Option<u64>,
    /// Ограничение по времени (секунды). По умолчанию: до Ctrl+C
    #[arg(short, long)]
    duration: Option<u64>,
    /// Ёмкость канала между источником и декодером (кадров)
    #[arg(long, default_value = "256")]
    ring_capacity: usize,
    /// Интервал вывода статистики (секунды)
    #[arg(long, default_value = "10")]
    stats_interval: u64,
    /// Частота кадров симулятора (Гц)
    #[arg(long, default_value = "1")]
    sim_rate: u32,
    /// Симулятор: кадр неизвестного типа каждые N кадров
    #[arg(long)]
    sim_unknown_every: Option<u32>,
    /// Тихий режим (только ошибки)
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.quiet {
        LevelFilter::Error
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(level)
        .format_target(false)
        .format_timestamp_secs()
        .init();

    let config = MonitorConfig {
        source: cli.source,
        baud_rate: cli.baud,
        output: cli.format,
        max_frames: cli.max_frames,
        duration_secs: cli.duration,
        ring_capacity: cli.ring_capacity,
        stats_interval_secs: cli.stats_interval,
        sim_frame_rate_hz: cli.sim_rate,
        sim_unknown_every: cli.sim_unknown_every,
    };

    let source = match create_source(&config) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to open source: {e}");
            std::process::exit(1);
        }
    };

    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("  Source        : {}", config.source);
    if let SourceKind::Serial(_) = config.source {
        info!("  Baud rate     : {}", config.baud_rate);
    }
    info!("  Format        : {}", config.output);
    if let Some(n) = config.max_frames {
        info!("  Frame limit   : {n}");
    }
    if let Some(d) = config.duration_secs {
        info!("  Duration      : {d}s");
    }
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let (pipeline, metrics) = MonitorPipeline::new(config);
    let stop_flag: Arc<AtomicBool> = pipeline.stop_flag();
    let stop_ctrlc = stop_flag.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        if stop_ctrlc.swap(true, Ordering::SeqCst) {
            // Второй Ctrl+C: принудительный выход
            warn!("Force exit");
            std::process::exit(130);
        }
        warn!("Ctrl+C received, stopping after current frame...");
    }) {
        warn!("Failed to set Ctrl+C handler: {e}");
    }

    let session_start = Instant::now();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if let Err(e) = pipeline.run(source, &mut out) {
        if !e.is_broken_pipe() {
            error!("Monitor failed: {e}");
            std::process::exit(1);
        }
    }

    // --- Итоговая статистика ---
    let summary = metrics.summary(&session_start);
    info!("\n{summary}");

    if summary.dropped_chunks > 0 {
        warn!(
            "⚠ {} chunks dropped. Consider a larger --ring-capacity",
            summary.dropped_chunks
        );
    }

    if summary.frames_decoded == 0 {
        warn!("⚠ No frames decoded");
    }
}
