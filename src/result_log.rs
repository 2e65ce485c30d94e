// src/result_log.rs - session-scoped list of analysis results with CSV export

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use chrono::{Local, NaiveDateTime, Timelike};
use csv::{ReaderBuilder, Writer};
use serde::{Deserialize, Serialize};

use crate::classify::RipenessLabel;
use crate::color::AverageColor;
use crate::errors::{MangoRipenessError, Result};
use crate::pipeline::Analysis;

/// Timestamp layout used in exported logs
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Column headers of an exported log
pub const CSV_HEADER: [&str; 6] = ["Timestamp", "Avg_R", "Avg_G", "Avg_B", "Hue", "Ripeness"];

/// One analyzed photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub timestamp: NaiveDateTime,
    /// File the photo came from; not part of the CSV export
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source: Option<String>,
    pub average_color: AverageColor,
    pub hue: f64,
    pub label: RipenessLabel,
}

impl ResultRecord {
    /// Record an analysis stamped with the current local time, truncated to whole seconds
    pub fn from_analysis(analysis: &Analysis, source: Option<String>) -> Self {
        let now = Local::now().naive_local();
        Self {
            timestamp: now.with_nanosecond(0).unwrap_or(now),
            source,
            average_color: analysis.average_color,
            hue: analysis.hue_degrees,
            label: analysis.label,
        }
    }

    fn to_csv_row(&self) -> [String; 6] {
        [
            self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            self.average_color.r.to_string(),
            self.average_color.g.to_string(),
            self.average_color.b.to_string(),
            self.hue.to_string(),
            self.label.to_string(),
        ]
    }

    fn from_csv_row(row: &csv::StringRecord, line: u64) -> Result<Self> {
        let invalid = |reason: String| MangoRipenessError::InvalidRecord { line, reason };

        if row.len() != CSV_HEADER.len() {
            return Err(invalid(format!("expected {} fields, found {}", CSV_HEADER.len(), row.len())));
        }

        let timestamp = NaiveDateTime::parse_from_str(&row[0], TIMESTAMP_FORMAT)
            .map_err(|e| invalid(format!("bad timestamp '{}': {}", &row[0], e)))?;

        let mut channels = [0u8; 3];
        for (i, channel) in channels.iter_mut().enumerate() {
            let field = &row[i + 1];
            *channel = field
                .trim()
                .parse()
                .map_err(|_| invalid(format!("bad {} value '{}'", CSV_HEADER[i + 1], field)))?;
        }

        let hue: f64 = row[4]
            .trim()
            .parse()
            .map_err(|_| invalid(format!("bad hue '{}'", &row[4])))?;

        let label = row[5]
            .parse()
            .map_err(|_| invalid(format!("unknown ripeness label '{}'", &row[5])))?;

        Ok(Self {
            timestamp,
            source: None,
            average_color: AverageColor::from(channels),
            hue,
            label,
        })
    }
}

/// Ordered, append-only list of results owned by the caller
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultLog {
    entries: Vec<ResultRecord>,
}

impl ResultLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ResultRecord) {
        self.entries.push(record);
    }

    /// Remove and return the entry at `index`, keeping the order of the rest
    pub fn delete(&mut self, index: usize) -> Result<ResultRecord> {
        if index >= self.entries.len() {
            return Err(MangoRipenessError::EntryNotFound {
                index,
                len: self.entries.len(),
            });
        }
        Ok(self.entries.remove(index))
    }

    pub fn get(&self, index: usize) -> Option<&ResultRecord> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResultRecord> {
        self.entries.iter()
    }

    pub fn records(&self) -> &[ResultRecord] {
        &self.entries
    }

    /// Write the log as CSV (Timestamp, Avg_R, Avg_G, Avg_B, Hue, Ripeness)
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = Writer::from_writer(writer);

        writer.write_record(CSV_HEADER)?;
        for record in &self.entries {
            writer.write_record(record.to_csv_row())?;
        }

        writer.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        String::from_utf8(buffer).map_err(|e| MangoRipenessError::Other(e.to_string()))
    }

    pub fn save_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        self.write_csv(fs::File::create(path)?)
    }

    /// Read a log previously written by `write_csv`
    pub fn read_csv<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);

        let headers = reader.headers()?.clone();
        if headers.iter().map(str::trim).ne(CSV_HEADER.iter().copied()) {
            return Err(MangoRipenessError::InvalidRecord {
                line: 1,
                reason: format!("unexpected header: {}", headers.iter().collect::<Vec<_>>().join(",")),
            });
        }

        let mut log = Self::new();
        for row in reader.records() {
            let row = row?;
            let line = row.position().map(|p| p.line()).unwrap_or(0);
            log.push(ResultRecord::from_csv_row(&row, line)?);
        }

        Ok(log)
    }

    pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::read_csv(fs::File::open(path)?)
    }
}

impl Extend<ResultRecord> for ResultLog {
    fn extend<I: IntoIterator<Item = ResultRecord>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}
