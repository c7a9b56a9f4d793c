//! Plain-text renderers.
//!
//! Pure formatting over a slice of results; nothing here touches the
//! channel or the clock.

use crate::dns::types::ProbeResult;
use std::io::{self, Write};

/// Column headers of the results table.
pub const HEADERS: [&str; 3] = ["DNS Owner", "DNS Provider", "Average Time(ms)"];

/// Spaces between columns.
const PADDING: usize = 2;

/// Latency cell for failed measurements.
const TIMEOUT_MARKER: &str = "Timeout";

const RECOMMENDATION: &str = "*We recommend using the DNS provider that has the fastest \
                              connection time.\nLess time is better.";

/// Latency column text: whole milliseconds, or `Timeout` for any failure.
#[must_use]
pub fn latency_cell(result: &ProbeResult) -> String {
    result
        .average()
        .map(|avg| avg.as_millis().to_string())
        .unwrap_or_else(|| TIMEOUT_MARKER.to_string())
}

/// Build the table rows, header first.
#[must_use]
pub fn rows(results: &[ProbeResult]) -> Vec<[String; 3]> {
    let mut rows = Vec::with_capacity(results.len() + 1);
    rows.push(HEADERS.map(String::from));
    for result in results {
        let provider = result.provider();
        rows.push([
            provider.name.clone(),
            provider.ip.clone(),
            latency_cell(result),
        ]);
    }
    rows
}

/// Lay rows out as left-aligned columns separated by at least two spaces.
///
/// The last column is not padded.
#[must_use]
pub fn align(rows: &[[String; 3]]) -> String {
    let mut widths = [0usize; 3];
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for row in rows {
        let [name, ip, latency] = row;
        out.push_str(&format!(
            "{:<w0$}{:<w1$}{}\n",
            name,
            ip,
            latency,
            w0 = widths[0] + PADDING,
            w1 = widths[1] + PADDING,
        ));
    }
    out
}

/// Write the aligned results table preceded by a blank line.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_table<W: Write>(out: &mut W, results: &[ProbeResult]) -> io::Result<()> {
    writeln!(out)?;
    out.write_all(align(&rows(results)).as_bytes())?;
    out.flush()
}

/// Write the closing recommendation message.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_recommendation<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "\n{RECOMMENDATION}")
}

/// Write results as CSV, keeping the failure reason.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_csv<W: Write>(out: &mut W, results: &[ProbeResult]) -> io::Result<()> {
    writeln!(out, "#Idx,Name,IP,Latency(ms),Success,Reason")?;
    for (idx, r) in results.iter().enumerate() {
        let latency = r.average_ms().unwrap_or(-1.0);
        let reason = r.reason().map(ToString::to_string).unwrap_or_default();
        writeln!(
            out,
            "{},{},{},{:.1},{},{}",
            idx + 1,
            csv_field(&r.provider().name),
            csv_field(&r.provider().ip),
            latency,
            r.is_success(),
            csv_field(&reason)
        )?;
    }
    Ok(())
}

/// Quote a CSV field when it contains a separator, quote or newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
