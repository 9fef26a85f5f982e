use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{CoreError, Phase, Result};

const CHUNK_SIZE: usize = 8 * 1024;

/// Hex SHA-256 digest of a file's bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Checksum(String);

impl Checksum {
    pub fn from_digest(hasher: Sha256) -> Self {
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn of_reader<R: Read>(reader: R) -> io::Result<Self> {
        Self::copy_hashing(reader, io::sink())
    }

    /// Copy `reader` into `dest` and hash the bytes in the same pass.
    pub fn copy_hashing<R: Read, W: Write>(mut reader: R, mut dest: W) -> io::Result<Self> {
        let mut hasher = Sha256::new();
        let mut buf = [0u8; CHUNK_SIZE];
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
            dest.write_all(&buf[..n])?;
        }
        dest.flush()?;
        Ok(Self::from_digest(hasher))
    }

    pub fn of_file(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(CoreError::io(Phase::Checksum))?;
        Self::of_reader(BufReader::new(file)).map_err(CoreError::io(Phase::Checksum))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
