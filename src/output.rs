//! Output formatting for ranked predictions.
//!
//! Supports debug pretty-printing and JSON for scripting.

use anyhow::Result;
use std::io::Write;
use tracing::debug;

use crate::predictions::Prediction;

/// Logs predictions using Rust's debug pretty-print format.
pub fn print_pretty(predictions: &[Prediction]) {
    debug!("{:#?}", predictions);
}

/// Writes predictions as a pretty-printed JSON array followed by a newline.
pub fn write_json<W: Write>(mut writer: W, predictions: &[Prediction]) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, predictions)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
