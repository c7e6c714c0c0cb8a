use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::types::Report;

/// Tab-indented JSON. Titles and names are written as-is, without escaping
/// non-ASCII characters.
pub fn render_report(report: &Report) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"\t");
    let mut serializer = Serializer::with_formatter(&mut buf, formatter);
    report
        .serialize(&mut serializer)
        .context("Failed to serialize report")?;
    String::from_utf8(buf).context("Report is not valid UTF-8")
}
