//! Structured binary I/O with checksum validation.
//!
//! Little-endian primitive and length-prefixed string serialization over
//! any `Write`/`Read`, with a running CRC32 that the writer appends as a
//! footer and the reader verifies after the payload has been consumed.

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use crc32fast::Hasher;

use crate::error::{Result, VisageError};

/// Upper bound on a serialized string's byte length. Lengths above this are
/// treated as corruption rather than allocated.
const MAX_STRING_LEN: usize = 1 << 20;

/// A checksumming writer for binary database files.
pub struct StructWriter<W: Write> {
    writer: W,
    hasher: Hasher,
}

impl<W: Write> StructWriter<W> {
    /// Create a new structured writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            hasher: Hasher::new(),
        }
    }

    /// Write a u32 value (little-endian).
    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.writer.write_u32::<LittleEndian>(value)?;
        self.hasher.update(&value.to_le_bytes());
        Ok(())
    }

    /// Write a f32 value (little-endian).
    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        self.writer.write_f32::<LittleEndian>(value)?;
        self.hasher.update(&value.to_le_bytes());
        Ok(())
    }

    /// Write raw bytes without a length prefix.
    pub fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        self.hasher.update(bytes);
        Ok(())
    }

    /// Write a UTF-8 string with a u32 length prefix.
    pub fn write_string(&mut self, value: &str) -> Result<()> {
        let bytes = value.as_bytes();
        self.write_u32(bytes.len() as u32)?;
        self.write_raw(bytes)
    }

    /// Append the CRC32 footer and flush.
    pub fn close(self) -> Result<()> {
        let Self { mut writer, hasher } = self;
        writer.write_u32::<LittleEndian>(hasher.finalize())?;
        writer.flush()?;
        Ok(())
    }
}

/// A checksumming reader for binary database files.
///
/// A short read is reported as [`VisageError::Corrupt`]: the declared
/// structure promised more payload than the stream holds.
pub struct StructReader<R: Read> {
    reader: R,
    hasher: Hasher,
}

impl<R: Read> StructReader<R> {
    /// Create a new structured reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            hasher: Hasher::new(),
        }
    }

    /// Read a u32 value (little-endian).
    pub fn read_u32(&mut self) -> Result<u32> {
        let value = self.reader.read_u32::<LittleEndian>().map_err(map_eof)?;
        self.hasher.update(&value.to_le_bytes());
        Ok(value)
    }

    /// Read a f32 value (little-endian).
    pub fn read_f32(&mut self) -> Result<f32> {
        let value = self.reader.read_f32::<LittleEndian>().map_err(map_eof)?;
        self.hasher.update(&value.to_le_bytes());
        Ok(value)
    }

    /// Read an exact number of raw bytes.
    pub fn read_raw(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut bytes = vec![0u8; len];
        self.reader.read_exact(&mut bytes).map_err(map_eof)?;
        self.hasher.update(&bytes);
        Ok(bytes)
    }

    /// Read a string written with [`StructWriter::write_string`].
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_u32()? as usize;
        if len > MAX_STRING_LEN {
            return Err(VisageError::corrupt(format!(
                "string length {len} exceeds limit {MAX_STRING_LEN}"
            )));
        }
        let bytes = self.read_raw(len)?;
        String::from_utf8(bytes)
            .map_err(|e| VisageError::corrupt(format!("invalid UTF-8 sequence: {e}")))
    }

    /// Read the CRC32 footer and compare it against the running checksum
    /// of everything read so far.
    pub fn verify_checksum(self) -> Result<()> {
        let Self { mut reader, hasher } = self;
        let computed = hasher.finalize();
        let stored = reader.read_u32::<LittleEndian>().map_err(map_eof)?;
        if stored != computed {
            return Err(VisageError::corrupt(format!(
                "checksum mismatch: stored {stored:#010x}, computed {computed:#010x}"
            )));
        }
        Ok(())
    }
}

fn map_eof(err: io::Error) -> VisageError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        VisageError::corrupt("unexpected end of file")
    } else {
        VisageError::Io(err)
    }
}
