//! Rendering of command results.
//!
//! Every result type implements [`TableDisplay`] for humans and
//! [`Serialize`] for `--format json`.

use std::collections::BTreeMap;
use std::io::Write;

use serde::Serialize;
use serde_json::Value;

use crate::cli::Format;
use crate::error::CliError;

/// Writes command results in the format chosen on the command line.
#[derive(Debug, Clone, Copy)]
pub struct OutputFormat {
    format: Format,
}

impl OutputFormat {
    /// Formatter for `format`.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    /// Render `value` to `writer`.
    ///
    /// JSON output is pretty-printed and newline-terminated.
    pub fn write<W, T>(&self, writer: &mut W, value: &T) -> Result<(), CliError>
    where
        W: Write,
        T: Serialize + TableDisplay,
    {
        if let Format::Json = self.format {
            serde_json::to_writer_pretty(&mut *writer, value)
                .map_err(|e| CliError::Format(format!("cannot encode output: {e}")))?;
            writeln!(writer)?;
            return Ok(());
        }
        value.write_table(writer)
    }

    /// Render `value` into a string.
    pub fn render<T>(&self, value: &T) -> Result<String, CliError>
    where
        T: Serialize + TableDisplay,
    {
        let mut buf = Vec::new();
        self.write(&mut buf, value)?;
        String::from_utf8(buf).map_err(|e| CliError::Format(e.to_string()))
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::new(Format::Table)
    }
}

/// Human-readable rendering.
pub trait TableDisplay {
    /// Write `self` for a terminal.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError>;
}

/// A one-line status message.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    /// Text shown to the user.
    pub message: String,
    /// Set for completed actions; omitted from JSON otherwise.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub success: bool,
}

impl Message {
    /// A completed action, shown with a check mark.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self { message: message.into(), success: true }
    }

    /// A plain notice.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self { message: message.into(), success: false }
    }
}

impl TableDisplay for Message {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        let mark = if self.success { "✓ " } else { "" };
        writeln!(writer, "{mark}{}", self.message)?;
        Ok(())
    }
}

/// A flat key/value mapping, such as metrics or cluster configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct KeyValues(pub BTreeMap<String, Value>);

impl TableDisplay for KeyValues {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.0.is_empty() {
            writeln!(writer, "No values")?;
            return Ok(());
        }

        let mut table = Table::new(["KEY", "VALUE"]);
        for (key, value) in &self.0 {
            table.row([key.clone(), display_value(value)]);
        }
        table.write(writer)
    }
}

/// Column-aligned text table.
///
/// Column widths are computed from the content, so cells are never cut.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    indent: usize,
}

impl Table {
    /// Create a table with the given column headers.
    #[must_use]
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            indent: 0,
        }
    }

    /// Indent every line by `width` spaces.
    #[must_use]
    pub const fn indent(mut self, width: usize) -> Self {
        self.indent = width;
        self
    }

    /// Append a row. Missing cells render empty.
    pub fn row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    /// Write the table.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        let widths: Vec<usize> = (0..self.headers.len())
            .map(|col| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(col))
                    .chain(std::iter::once(&self.headers[col]))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let margin = " ".repeat(self.indent);
        write_row(writer, &margin, &self.headers, &widths)?;
        let rule = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        writeln!(writer, "{margin}{}", "─".repeat(rule))?;
        for row in &self.rows {
            write_row(writer, &margin, row, &widths)?;
        }
        Ok(())
    }
}

fn write_row<W: Write>(
    writer: &mut W,
    margin: &str,
    cells: &[String],
    widths: &[usize],
) -> Result<(), CliError> {
    write!(writer, "{margin}")?;
    let last = widths.len().saturating_sub(1);
    for (col, width) in widths.iter().enumerate() {
        let cell = cells.get(col).map_or("", String::as_str);
        if col == last {
            write!(writer, "{cell}")?;
        } else {
            let pad = width.saturating_sub(cell.chars().count());
            write!(writer, "{cell}{}  ", " ".repeat(pad))?;
        }
    }
    writeln!(writer)?;
    Ok(())
}

/// Render a JSON value for a table cell: strings without quotes, everything
/// else as compact JSON.
#[must_use]
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Truncate a string to at most `max_len` characters.
#[must_use]
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{head}...")
    } else {
        s.chars().take(max_len).collect()
    }
}
