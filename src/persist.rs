//! Snapshot persistence for the face database.
//!
//! A snapshot is a single self-describing binary container holding
//! everything needed to reconstruct an equivalent database; the index is
//! never serialized and is rebuilt on load. Layout, little-endian
//! throughout:
//!
//! | field          | type                                          |
//! |----------------|-----------------------------------------------|
//! | magic          | 4 bytes `VSGE`                                |
//! | format version | u32                                           |
//! | model name     | length-prefixed string                        |
//! | metric         | length-prefixed string (`cosine`/`euclidean`) |
//! | count `n`      | u32                                           |
//! | dimension `D`  | u32 (0 iff `n == 0`)                          |
//! | identities     | `n` length-prefixed strings                   |
//! | vectors        | `n · D` f32                                   |
//! | checksum       | u32 CRC32 of all preceding bytes              |
//!
//! Any structural or consistency violation on load is reported as
//! [`VisageError::Corrupt`]; callers treat that as "no prior database".

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::database::{FaceDatabase, FaceRecord};
use crate::embedding::Embedding;
use crate::error::{Result, VisageError};
use crate::metric::DistanceMetric;
use crate::structfile::{StructReader, StructWriter};

const MAGIC: &[u8; 4] = b"VSGE";
const FORMAT_VERSION: u32 = 1;

/// Upper bound on a plausible embedding dimension; declared dimensions
/// above this are treated as corruption rather than allocated.
const MAX_DIMENSION: usize = 1 << 16;

/// Write a complete snapshot of `database` to `writer`.
pub fn save<W: Write>(database: &FaceDatabase, writer: W) -> Result<()> {
    let mut output = StructWriter::new(writer);

    output.write_raw(MAGIC)?;
    output.write_u32(FORMAT_VERSION)?;
    output.write_string(database.model_name())?;
    output.write_string(database.metric().name())?;
    output.write_u32(database.count() as u32)?;
    output.write_u32(database.dimension().unwrap_or(0) as u32)?;

    for record in database.records() {
        output.write_string(&record.identity)?;
    }
    for record in database.records() {
        for &value in &record.embedding.data {
            output.write_f32(value)?;
        }
    }

    output.close()
}

/// Save a snapshot to a file at `path`.
pub fn save_to_path<P: AsRef<Path>>(database: &FaceDatabase, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    save(database, BufWriter::new(file))?;
    log::info!(
        "face database saved to {} ({} faces)",
        path.display(),
        database.count()
    );
    Ok(())
}

/// Read, validate, and reassemble a database snapshot from `reader`.
///
/// The index is rebuilt from the deserialized records before returning.
pub fn load<R: Read>(reader: R) -> Result<FaceDatabase> {
    let mut input = StructReader::new(reader);

    let magic = input.read_raw(MAGIC.len())?;
    if magic != *MAGIC {
        return Err(VisageError::corrupt("bad magic, not a face database file"));
    }
    let version = input.read_u32()?;
    if version != FORMAT_VERSION {
        return Err(VisageError::corrupt(format!(
            "unsupported format version {version} (expected {FORMAT_VERSION})"
        )));
    }

    let model_name = input.read_string()?;
    let metric_tag = input.read_string()?;
    let metric = DistanceMetric::parse_str(&metric_tag)
        .map_err(|_| VisageError::corrupt(format!("unknown metric tag '{metric_tag}'")))?;

    let count = input.read_u32()? as usize;
    let dimension = input.read_u32()? as usize;
    if (count == 0) != (dimension == 0) {
        return Err(VisageError::corrupt(format!(
            "count {count} and dimension {dimension} disagree"
        )));
    }
    if dimension > MAX_DIMENSION {
        return Err(VisageError::corrupt(format!(
            "dimension {dimension} exceeds limit {MAX_DIMENSION}"
        )));
    }

    // The declared count is untrusted until the payload has actually been
    // read, so the record buffers grow by reading instead of preallocating.
    let mut identities = Vec::new();
    for _ in 0..count {
        identities.push(input.read_string()?);
    }

    let mut records = Vec::new();
    for identity in identities {
        let mut data = Vec::with_capacity(dimension);
        for _ in 0..dimension {
            data.push(input.read_f32()?);
        }
        let embedding = Embedding::new(data);
        if !embedding.is_valid() {
            return Err(VisageError::corrupt(format!(
                "embedding for '{identity}' contains non-finite values"
            )));
        }
        records.push(FaceRecord {
            identity,
            embedding,
        });
    }

    input.verify_checksum()?;

    FaceDatabase::from_parts(model_name, metric, records)
}

/// Load a database from a file at `path`.
pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<FaceDatabase> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let database = load(BufReader::new(file))?;
    log::info!(
        "face database loaded from {} ({} faces)",
        path.display(),
        database.count()
    );
    Ok(database)
}
