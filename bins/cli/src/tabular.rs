//! Tabular adapter: CSV extract rows in, CSV or JSON report tables out.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::ValueEnum;
use posrecon_core::ingestion::RawRow;
use posrecon_core::reports::Table;

/// File format of a written table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TableFormat {
    /// Header row plus one line per row.
    Csv,
    /// Array of objects keyed by column.
    Json,
}

impl TableFormat {
    /// File extension, without the dot.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

/// Reads a headed CSV extract into raw rows.
///
/// Fully blank lines are skipped; short records leave missing cells out.
pub fn read_rows<R: io::Read>(reader: R) -> Result<Vec<RawRow>, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        rows.push(
            headers
                .iter()
                .zip(record.iter())
                .map(|(h, v)| (h.to_string(), v.to_string()))
                .collect(),
        );
    }
    Ok(rows)
}

/// Reads a CSV extract from disk.
pub fn read_rows_from_path(path: &Path) -> anyhow::Result<Vec<RawRow>> {
    let file = fs::File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    read_rows(file).with_context(|| format!("failed to parse {}", path.display()))
}

/// Writes a table as CSV with a header row.
pub fn write_table<W: io::Write>(table: &Table, writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&table.columns)?;
    for row in &table.rows {
        wtr.write_record(row.iter().map(ToString::to_string))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes a table as a pretty-printed JSON array of records.
pub fn write_table_json<W: io::Write>(table: &Table, writer: W) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(writer, &table.to_records())
}

/// Writes a table to `dir/file_name`, creating the directory if needed.
pub fn write_table_to_dir(
    table: &Table,
    dir: &Path,
    file_name: &str,
    format: TableFormat,
) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(file_name);
    let file =
        fs::File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
    let written = match format {
        TableFormat::Csv => write_table(table, file).map_err(anyhow::Error::from),
        TableFormat::Json => {
            write_table_json(table, io::BufWriter::new(file)).map_err(anyhow::Error::from)
        }
    };
    written.with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
