//! On-disk raw index: four newline-delimited files under one directory.
//!
//! | File   | Content                                            |
//! |--------|----------------------------------------------------|
//! | `.xco` | row coordinate of each presence pair, one per line |
//! | `.yco` | column coordinate pairing with the same `.xco` line|
//! | `.ids` | external item id of each row, in row order         |
//! | `.fts` | feature label of each column, in column order      |
//!
//! The writer appends pairs as they arrive and never deduplicates; the
//! matrix construction collapses repeats when the index is loaded. The
//! format is plain UTF-8 text so an index diffs and greps like any other
//! artifact.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::vocab::{FeatureTable, ItemTable};

const ROW_FILE: &str = ".xco";
const COL_FILE: &str = ".yco";
const IDS_FILE: &str = ".ids";
const FTS_FILE: &str = ".fts";

/// Append-only writer for the four raw index files.
///
/// `add` interns unseen ids and labels, emitting their dense index lines,
/// and appends one coordinate pair per call. `close` flushes and seals the
/// writer; any `add` after that is an error and no partial index should be
/// trusted if either call fails.
pub struct IndexWriter {
    dir: PathBuf,
    items: ItemTable,
    features: FeatureTable,
    rows_out: BufWriter<File>,
    cols_out: BufWriter<File>,
    ids_out: BufWriter<File>,
    fts_out: BufWriter<File>,
    pairs: u64,
    closed: bool,
}

impl IndexWriter {
    /// Opens `dir` for writing, creating it if missing and truncating any
    /// previous index inside it.
    pub fn create(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        info!("Opening raw index for writing at {}", dir.display());
        fs::create_dir_all(&dir).map_err(|e| Error::io(dir.display().to_string(), e))?;

        let open = |name: &str| -> Result<BufWriter<File>> {
            let path = dir.join(name);
            let file = File::create(&path)
                .map_err(|e| Error::io(path.display().to_string(), e))?;
            Ok(BufWriter::new(file))
        };

        Ok(Self {
            rows_out: open(ROW_FILE)?,
            cols_out: open(COL_FILE)?,
            ids_out: open(IDS_FILE)?,
            fts_out: open(FTS_FILE)?,
            dir,
            items: ItemTable::new(),
            features: FeatureTable::new(),
            pairs: 0,
            closed: false,
        })
    }

    /// Appends one presence pair. Duplicate pairs are permitted and land in
    /// the coordinate streams as-is.
    pub fn add(&mut self, item_id: u64, feature: &str) -> Result<()> {
        if self.closed {
            return Err(Error::build("add called on a closed index writer"));
        }

        let (row, new_item) = self.items.intern(item_id);
        if new_item {
            writeln!(self.ids_out, "{item_id}")
                .map_err(|e| Error::io(self.dir.join(IDS_FILE).display().to_string(), e))?;
        }
        let (col, new_feature) = self.features.intern(feature);
        if new_feature {
            writeln!(self.fts_out, "{feature}")
                .map_err(|e| Error::io(self.dir.join(FTS_FILE).display().to_string(), e))?;
        }

        writeln!(self.rows_out, "{row}")
            .map_err(|e| Error::io(self.dir.join(ROW_FILE).display().to_string(), e))?;
        writeln!(self.cols_out, "{col}")
            .map_err(|e| Error::io(self.dir.join(COL_FILE).display().to_string(), e))?;
        self.pairs += 1;
        Ok(())
    }

    /// Flushes all four streams and seals the writer.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        for (out, name) in [
            (&mut self.rows_out, ROW_FILE),
            (&mut self.cols_out, COL_FILE),
            (&mut self.ids_out, IDS_FILE),
            (&mut self.fts_out, FTS_FILE),
        ] {
            out.flush()
                .map_err(|e| Error::io(self.dir.join(name).display().to_string(), e))?;
        }
        self.closed = true;
        info!(
            "Sealed raw index at {}: {} pairs, {} items, {} features",
            self.dir.display(),
            self.pairs,
            self.items.len(),
            self.features.len()
        );
        Ok(())
    }

    /// Pairs appended so far, duplicates included.
    #[inline]
    pub fn num_pairs(&self) -> u64 {
        self.pairs
    }

    #[inline]
    pub fn num_items(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn num_features(&self) -> usize {
        self.features.len()
    }
}

/// Counters reported after a bulk ingestion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexStats {
    pub pairs: u64,
    pub items: usize,
    pub features: usize,
}

/// Drives a pair source into an [`IndexWriter`].
///
/// Any iterator of `(item_id, feature)` satisfies the source contract, so a
/// database cursor, a test fixture and an in-memory list all ingest through
/// the same path.
pub struct Indexer {
    writer: IndexWriter,
}

impl Indexer {
    pub fn new(writer: IndexWriter) -> Self {
        Self { writer }
    }

    /// Consumes the source, appends every pair and seals the index.
    pub fn index_all<I>(mut self, source: I) -> Result<IndexStats>
    where
        I: IntoIterator<Item = (u64, String)>,
    {
        for (item_id, feature) in source {
            self.writer.add(item_id, &feature)?;
        }
        self.writer.close()?;

        let stats = IndexStats {
            pairs: self.writer.num_pairs(),
            items: self.writer.num_items(),
            features: self.writer.num_features(),
        };
        info!(
            "Done processing the dataset: {} pairs over {} items and {} features",
            stats.pairs, stats.items, stats.features
        );
        Ok(stats)
    }
}

/// The four streams of a raw index, read back and validated.
///
/// Validation is strict: a directory that fails any check is rejected
/// whole, there is no partially usable index.
#[derive(Debug, Clone)]
pub struct RawIndex {
    pub xco: Vec<u32>,
    pub yco: Vec<u32>,
    pub items: ItemTable,
    pub features: FeatureTable,
}

impl RawIndex {
    /// Reads and validates the four files under `dir`.
    pub fn read(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        info!("Loading raw index from {}", dir.display());

        let ids = read_integers(&dir.join(IDS_FILE))?;
        let labels = read_lines(&dir.join(FTS_FILE))?;
        let n = ids.len();
        let m = labels.len();

        let items = ItemTable::from_rows(ids).map_err(|dup| {
            Error::corrupt(
                dir.join(IDS_FILE).display().to_string(),
                format!("duplicate item id {dup}"),
            )
        })?;
        let features = FeatureTable::from_cols(labels);

        let xco = read_coordinates(&dir.join(ROW_FILE), n)?;
        let yco = read_coordinates(&dir.join(COL_FILE), m)?;
        if xco.len() != yco.len() {
            return Err(Error::corrupt(
                dir.display().to_string(),
                format!(
                    "coordinate streams disagree: {} rows vs {} columns",
                    xco.len(),
                    yco.len()
                ),
            ));
        }

        debug!(
            "Raw index read: {} pairs, {} items, {} features",
            xco.len(),
            n,
            m
        );
        if n == 0 && xco.is_empty() {
            warn!("Raw index at {} is empty", dir.display());
        }

        Ok(Self { xco, yco, items, features })
    }
}

fn open_reader(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).map_err(|e| Error::io(path.display().to_string(), e))?;
    Ok(BufReader::new(file))
}

/// Reads a stream of decimal integers, one per line.
fn read_integers(path: &Path) -> Result<Vec<u64>> {
    let reader = open_reader(path)?;
    let mut values = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| Error::io(path.display().to_string(), e))?;
        let value = line.trim().parse::<u64>().map_err(|_| {
            Error::corrupt(
                path.display().to_string(),
                format!("line {}: {:?} is not a non-negative integer", lineno + 1, line),
            )
        })?;
        values.push(value);
    }
    Ok(values)
}

/// Reads a coordinate stream and bounds-checks every entry against `limit`.
fn read_coordinates(path: &Path, limit: usize) -> Result<Vec<u32>> {
    let raw = read_integers(path)?;
    let mut coords = Vec::with_capacity(raw.len());
    for (lineno, value) in raw.into_iter().enumerate() {
        if value >= limit as u64 {
            return Err(Error::corrupt(
                path.display().to_string(),
                format!("line {}: coordinate {} out of range 0..{}", lineno + 1, value, limit),
            ));
        }
        coords.push(value as u32);
    }
    Ok(coords)
}

/// Reads the label stream; the line number is the column index.
fn read_lines(path: &Path) -> Result<Vec<String>> {
    let reader = open_reader(path)?;
    let mut lines = Vec::new();
    for line in reader.lines() {
        lines.push(line.map_err(|e| Error::io(path.display().to_string(), e))?);
    }
    Ok(lines)
}
