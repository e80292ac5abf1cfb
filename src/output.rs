//! CLI output formatting and batch reporting.
//!
//! Formatting functions return plain strings so they are unit-testable and
//! the binary decides where they go. The batch report is the one structure
//! serialized to disk (`report.json`), for scripting against batch runs.

use crate::batch::BatchEvent;
use crate::transform::ConversionResult;
use serde::Serialize;

/// Human-readable byte count: `"0 Bytes"`, `"1.5 KB"`, `"2.04 MB"`.
///
/// Binary units (1024), rounded to two decimals with trailing zeros dropped.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    let exponent = ((bytes as f64).ln() / 1024f64.ln()).floor() as usize;
    let exponent = exponent.min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exponent as i32);
    let rounded = (value * 100.0).round() / 100.0;

    format!("{} {}", rounded, UNITS[exponent])
}

/// Space saved as a percentage of the original, rounded to the nearest
/// integer. Negative when the output grew. A zero-byte original reports 0.
pub fn compression_ratio(original: u64, compressed: u64) -> i64 {
    if original == 0 {
        return 0;
    }
    (100.0 * (1.0 - compressed as f64 / original as f64)).round() as i64
}

/// One display line per batch progress event.
pub fn format_batch_event(event: &BatchEvent) -> String {
    match event {
        BatchEvent::ItemCompleted { completed, total } => {
            format!("  [{completed}/{total}] converted")
        }
    }
}

/// Summary lines for a single conversion.
pub fn format_conversion_summary(original_bytes: u64, result: &ConversionResult) -> Vec<String> {
    let converted = result.size() as u64;
    vec![
        format!(
            "{} {}x{} · {}",
            result.format,
            result.width,
            result.height,
            format_file_size(converted)
        ),
        format!(
            "{} → {} ({}% saved)",
            format_file_size(original_bytes),
            format_file_size(converted),
            compression_ratio(original_bytes, converted)
        ),
    ]
}

/// Machine-readable record of a batch run, written as `report.json`.
#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub total: usize,
    pub items: Vec<BatchReportItem>,
}

#[derive(Debug, Serialize)]
pub struct BatchReportItem {
    pub file: String,
    pub original_bytes: u64,
    pub converted_bytes: u64,
    pub ratio_percent: i64,
    pub width: u32,
    pub height: u32,
}

impl BatchReport {
    /// Pair input names and sizes with their conversion results.
    pub fn new(
        names: &[String],
        original_sizes: &[u64],
        results: &[ConversionResult],
    ) -> Self {
        let items = names
            .iter()
            .zip(original_sizes)
            .zip(results)
            .map(|((name, &original), result)| BatchReportItem {
                file: name.clone(),
                original_bytes: original,
                converted_bytes: result.size() as u64,
                ratio_percent: compression_ratio(original, result.size() as u64),
                width: result.width,
                height: result.height,
            })
            .collect();
        Self {
            total: results.len(),
            items,
        }
    }
}
