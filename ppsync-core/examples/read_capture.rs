//! Пример: чтение файла захвата и вывод сводки
//!
//! Демонстрирует:
//! - загрузку файла и декодирование заголовка
//! - ленивый обход IQ выборок
//! - производные величины (длительность, смещение PPS)

use ppsync_core::{decode_capture, load_capture, SampleStats};
use ppsync_types::DEFAULT_SAMPLE_RATE_HZ;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let input_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "data/capture.bin".to_string());

    let raw = load_capture(&input_path)?;
    let capture = match decode_capture(&raw) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("✗ Decode failed: {e}");
            return Err(Box::new(e));
        }
    };

    if let Some(w) = capture.warning {
        eprintln!("⚠ {w}");
    }

    println!("{}", capture.summary(DEFAULT_SAMPLE_RATE_HZ));
    println!("{}", SampleStats::from_samples(capture.samples.iter()));

    println!("\nFirst samples:");
    for (n, s) in capture.samples.iter().take(5).enumerate() {
        println!("  [{n}] I={:6} Q={:6}", s.i, s.q);
    }

    Ok(())
}
