use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use log::{error, LevelFilter};
use ppsync_inspect::{parse_rate_hz, InputKind, InspectConfig, InspectSession};
use ppsync_types::DEFAULT_SAMPLE_RATE_HZ;

#[derive(Parser, Debug)]
#[command(
    name = "ppsync-inspect",
    version = env!("CARGO_PKG_VERSION"),
    about = "Inspect PPS-aligned IQ captures and GPSDO telemetry dumps",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
    /// Тихий режим (только ошибки)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Сводка по файлам захвата IQ
    Capture {
        #[command(flatten)]
        common: CommonArgs,
        /// Частота дискретизации (30.72MHz, 30720000)
        #[arg(
            short = 'r',
            long,
            value_parser = parse_rate_hz,
            default_value_t = DEFAULT_SAMPLE_RATE_HZ
        )]
        sample_rate: u32,
    },
    /// Декодирование дампа телеметрического потока
    Telemetry {
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Входные файлы
    #[arg(required = true)]
    files: Vec<PathBuf>,
    /// Напечатать первые N выборок (кадров)
    #[arg(long, default_value = "0")]
    dump: usize,
    /// Вывод в JSON (один объект на файл)
    #[arg(long)]
    json: bool,
    /// Хвостовые байты считать ошибкой
    #[arg(long)]
    strict: bool,
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

    let (kind, common, sample_rate_hz) = match cli.command {
        Command::Capture {
            common,
            sample_rate,
        } => (InputKind::Capture, common, sample_rate),
        Command::Telemetry { common } => (InputKind::Telemetry, common, DEFAULT_SAMPLE_RATE_HZ),
    };

    let config = InspectConfig {
        kind,
        inputs: common.files,
        sample_rate_hz,
        dump: common.dump,
        json: common.json,
        strict: common.strict,
    };

    let session = match InspectSession::new(config) {
        Ok(s) => s,
        Err(e) => {
            error!("{e}");
            std::process::exit(2);
        }
    };

    let stdout = std::io::stdout();
    let report = session.run(&mut stdout.lock());

    if !report.is_success() {
        std::process::exit(1);
    }
}
