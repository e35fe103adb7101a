//! Human-readable byte and byte-rate formatting.
//!
//! Values are scaled to the largest unit not exceeding them among
//! `B`, `KB`, `MB` and `GB` (powers of 1024) and printed with two decimals:
//!
//! ```
//! use netwatch_core::format::{fmt_bytes, fmt_speed};
//!
//! assert_eq!(fmt_speed(1_048_576.0), "1.00 MB/s");
//! assert_eq!(fmt_bytes(1536.0), "1.50 KB");
//! assert_eq!(fmt_bytes(0.0), "0 B");
//! ```

const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
const STEP: f64 = 1024.0;

/// Index into `B, KB, MB, GB` for `value`: `floor(log_1024(value))`
/// clamped to `0..=3`.
///
/// Values below one byte, negative values and NaN map to `0`.
pub fn unit_index(value: f64) -> usize {
    let mut index = 0;
    let mut scaled = value;
    while scaled >= STEP && index < UNITS.len() - 1 {
        scaled /= STEP;
        index += 1;
    }
    index
}

/// Format a byte count, e.g. `"3.25 GB"`.
pub fn fmt_bytes(bytes: f64) -> String {
    format_scaled(bytes, "")
}

/// Format a byte rate, e.g. `"2.00 KB/s"`.
pub fn fmt_speed(bytes_per_sec: f64) -> String {
    format_scaled(bytes_per_sec, "/s")
}

fn format_scaled(value: f64, suffix: &str) -> String {
    // Negative and NaN inputs are out of contract; render them as zero.
    if value.is_nan() || value <= 0.0 {
        return format!("0 B{suffix}");
    }
    let index = unit_index(value);
    let scaled = value / STEP.powi(i32::try_from(index).unwrap_or(0));
    format!("{scaled:.2} {}{suffix}", UNITS[index])
}
