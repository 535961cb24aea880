//! NAMASTE CSV export parsing.
//!
//! Provides a streaming parser over NAMASTE CSV rows. Ingestion is
//! partial-success: a row missing its mandatory fields is rejected
//! individually and counted, never aborting the rest of the batch.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{Reader, ReaderBuilder, StringRecord};
use namaste_types::NamasteConcept;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{TermError, TermResult};

/// Mandatory column holding the native code.
const COL_CODE: &str = "code";
/// Mandatory column holding the display name.
const COL_DISPLAY: &str = "disease";
/// Optional column holding the short definition.
const COL_DEFINITION: &str = "short_definition";
/// Optional column holding the reporting region.
const COL_REGION: &str = "state";
/// Optional column holding the observed patient count.
const COL_COUNT: &str = "patient_count";
/// Optional column holding a pre-resolved TM2 code.
const COL_TM2: &str = "icd11_tm2_code";
/// Optional column holding a pre-resolved biomedicine code.
const COL_BIOMED: &str = "icd11_biomed_code";

/// Resolved column positions for one CSV file.
#[derive(Debug, Clone)]
struct ColumnIndex {
    code: usize,
    display: usize,
    definition: Option<usize>,
    region: Option<usize>,
    observed_count: Option<usize>,
    tm2: Option<usize>,
    biomed: Option<usize>,
}

impl ColumnIndex {
    /// Locates columns by header name, case-insensitively.
    ///
    /// Fails when a mandatory column (`Code`, `Disease`) is absent.
    fn from_headers(headers: &StringRecord) -> TermResult<Self> {
        let find = |name: &str| {
            headers.iter().position(|h| {
                h.trim_start_matches('\u{feff}').trim().eq_ignore_ascii_case(name)
            })
        };

        let code = find(COL_CODE).ok_or_else(|| {
            TermError::validation(format!("missing mandatory CSV column: {COL_CODE}"))
        })?;
        let display = find(COL_DISPLAY).ok_or_else(|| {
            TermError::validation(format!("missing mandatory CSV column: {COL_DISPLAY}"))
        })?;

        Ok(Self {
            code,
            display,
            definition: find(COL_DEFINITION),
            region: find(COL_REGION),
            observed_count: find(COL_COUNT),
            tm2: find(COL_TM2),
            biomed: find(COL_BIOMED),
        })
    }

    /// Builds a concept from one record.
    ///
    /// Rejects the row when the code or display field is empty.
    fn concept_from_record(&self, record: &StringRecord) -> TermResult<NamasteConcept> {
        let field = |idx: usize| record.get(idx).unwrap_or("").trim();
        let optional = |idx: Option<usize>| idx.map(field).filter(|v| !v.is_empty());

        let code = field(self.code);
        if code.is_empty() {
            return Err(TermError::validation("row has empty code"));
        }

        let display = field(self.display);
        if display.is_empty() {
            return Err(TermError::validation(format!(
                "row {code} has empty display name"
            )));
        }

        Ok(NamasteConcept {
            code: code.to_string(),
            display: display.to_string(),
            definition: optional(self.definition).unwrap_or("").to_string(),
            tm2_code: optional(self.tm2).unwrap_or("").to_string(),
            biomed_code: optional(self.biomed).unwrap_or("").to_string(),
            region: optional(self.region).map(str::to_string),
            observed_count: optional(self.observed_count).and_then(|v| v.parse().ok()),
        })
    }
}

/// Outcome of an ingestion batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Rows that produced a valid concept.
    pub accepted: usize,
    /// Rows rejected for missing mandatory fields or parse failures.
    pub rejected: usize,
}

/// A streaming parser for NAMASTE CSV exports.
///
/// Iterates row by row, yielding `Ok(concept)` for valid rows and
/// `Err(TermError::Validation)` for individually rejected ones.
///
/// # Example
///
/// ```ignore
/// let parser = CsvRowParser::from_path("namaste_export.csv")?;
/// let (concepts, rejected) = parser.collect_rows();
/// ```
pub struct CsvRowParser<R: Read> {
    reader: Reader<R>,
    columns: ColumnIndex,
    records_read: usize,
}

impl CsvRowParser<BufReader<File>> {
    /// Creates a parser from a file path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or lacks the
    /// mandatory header columns.
    pub fn from_path<P: AsRef<Path>>(path: P) -> TermResult<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read> CsvRowParser<R> {
    /// Creates a parser from a reader.
    pub fn from_reader(reader: R) -> TermResult<Self> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::None)
            .from_reader(reader);

        let columns = ColumnIndex::from_headers(csv_reader.headers()?)?;

        Ok(Self {
            reader: csv_reader,
            columns,
            records_read: 0,
        })
    }

    /// Returns the number of records read so far.
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    /// Drains the parser, partitioning rows into accepted concepts and a
    /// rejected-row count.
    pub fn collect_rows(mut self) -> (Vec<NamasteConcept>, usize) {
        let mut concepts = Vec::new();
        let mut rejected = 0;

        for row in self.by_ref() {
            match row {
                Ok(concept) => concepts.push(concept),
                Err(err) => {
                    tracing::warn!("rejected ingestion row: {err}");
                    rejected += 1;
                }
            }
        }

        (concepts, rejected)
    }

    /// Drains the parser, building concepts in parallel.
    ///
    /// Records are read sequentially (I/O bound), then converted on the
    /// rayon pool. Useful for large morbidity exports.
    #[cfg(feature = "parallel")]
    pub fn collect_rows_parallel(mut self) -> (Vec<NamasteConcept>, usize) {
        let columns = self.columns.clone();
        let mut records = Vec::new();
        let mut rejected = 0;

        loop {
            let mut record = StringRecord::new();
            match self.reader.read_record(&mut record) {
                Ok(true) => {
                    self.records_read += 1;
                    if !record.iter().all(|f| f.trim().is_empty()) {
                        records.push(record);
                    }
                }
                Ok(false) => break,
                Err(err) => {
                    tracing::warn!("rejected ingestion row: {err}");
                    rejected += 1;
                }
            }
        }

        let results: Vec<TermResult<NamasteConcept>> = records
            .par_iter()
            .map(|record| columns.concept_from_record(record))
            .collect();

        let mut concepts = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(concept) => concepts.push(concept),
                Err(err) => {
                    tracing::warn!("rejected ingestion row: {err}");
                    rejected += 1;
                }
            }
        }

        (concepts, rejected)
    }
}

impl<R: Read> Iterator for CsvRowParser<R> {
    type Item = TermResult<NamasteConcept>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut record = StringRecord::new();
            match self.reader.read_record(&mut record) {
                Ok(true) => {
                    self.records_read += 1;

                    // Skip blank lines entirely rather than rejecting them
                    if record.is_empty() || record.iter().all(|f| f.trim().is_empty()) {
                        continue;
                    }

                    return Some(self.columns.concept_from_record(&record));
                }
                Ok(false) => return None,
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}
