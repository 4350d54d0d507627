//! Builds the combined site table from per-metric CSV files.
//!
//! Each input file holds `country_code`, `port_name` and one or more metric
//! columns. Files are outer-joined on `(country_code, port_name)`: every site
//! in any input appears once in the output, with empty cells for metrics it
//! lacks.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

const KEY_COLUMNS: [&str; 2] = ["country_code", "port_name"];

/// An outer-joined site table.
#[derive(Debug, Default, PartialEq)]
pub struct MergedSites {
    /// Non-key columns in first-seen order.
    columns: Vec<String>,
    /// Rows keyed by `(country_code, port_name)`, sorted by key.
    rows: BTreeMap<(String, String), BTreeMap<String, String>>,
}

impl MergedSites {
    /// Joins one more table into the result. On a duplicated column the first
    /// non-empty value wins.
    pub fn join(&mut self, label: &str, bytes: &[u8]) -> Result<()> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(bytes);
        let headers = rdr.headers()?.clone();

        let position = |name: &str| headers.iter().position(|h| h == name);
        let (Some(cc_idx), Some(port_idx)) = (position(KEY_COLUMNS[0]), position(KEY_COLUMNS[1]))
        else {
            bail!("{label} lacks the key columns {:?}", KEY_COLUMNS);
        };

        for header in headers.iter() {
            if !KEY_COLUMNS.contains(&header) && !self.columns.iter().any(|c| c == header) {
                self.columns.push(header.to_string());
            }
        }

        let mut count = 0usize;
        for record in rdr.records() {
            let record = record.with_context(|| format!("malformed row in {label}"))?;
            let key = (
                record.get(cc_idx).unwrap_or_default().to_string(),
                record.get(port_idx).unwrap_or_default().to_string(),
            );
            let row = self.rows.entry(key).or_default();
            for (header, value) in headers.iter().zip(record.iter()) {
                if KEY_COLUMNS.contains(&header) || value.is_empty() {
                    continue;
                }
                row.entry(header.to_string()).or_insert_with(|| value.to_string());
            }
            count += 1;
        }

        debug!(source = label, rows = count, "Site table joined");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Writes the merged table as CSV with the key columns first.
    pub fn write_csv<W: std::io::Write>(&self, out: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(out);
        let header: Vec<&str> = KEY_COLUMNS
            .iter()
            .copied()
            .chain(self.columns.iter().map(String::as_str))
            .collect();
        writer.write_record(&header)?;

        for ((country_code, port_name), values) in &self.rows {
            let mut record = vec![country_code.as_str(), port_name.as_str()];
            record.extend(
                self.columns
                    .iter()
                    .map(|c| values.get(c).map_or("", String::as_str)),
            );
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Merges the CSV files at `inputs` and writes the result to `output`.
pub fn merge_site_files(inputs: &[impl AsRef<Path>], output: impl AsRef<Path>) -> Result<MergedSites> {
    let mut merged = MergedSites::default();
    for input in inputs {
        let path = input.as_ref();
        let bytes =
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        merged.join(&path.display().to_string(), &bytes)?;
    }

    let output = output.as_ref();
    let file = std::fs::File::create(output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    merged.write_csv(file)?;

    info!(
        inputs = inputs.len(),
        sites = merged.len(),
        output = %output.display(),
        "Merged site table written"
    );
    Ok(merged)
}
