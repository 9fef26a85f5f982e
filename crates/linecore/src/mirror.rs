use std::fs::{self, File};
use std::io::{Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::checksum::Checksum;
use crate::error::{CoreError, Phase, Result};

const MIRROR_PREFIX: &str = "linesift-";

/// Scratch copy of the original taken when a session starts. Browsing reads
/// from it so the original is never held open, and it outlives a declined
/// commit so marked work is not lost.
#[derive(Debug)]
pub struct Mirror {
    path: PathBuf,
    checksum: Checksum,
}

impl Mirror {
    /// Copy `original` into a new file under `scratch_dir`, hashing the bytes on
    /// the way. Returns the mirror and a handle positioned at its start.
    pub fn create(original: &Path, scratch_dir: &Path) -> Result<(Self, File)> {
        let mut source = File::open(original).map_err(CoreError::io(Phase::Mirror))?;
        let (mut file, path) = tempfile::Builder::new()
            .prefix(MIRROR_PREFIX)
            .tempfile_in(scratch_dir)
            .and_then(|tmp| tmp.keep().map_err(|e| e.error))
            .map_err(CoreError::io(Phase::Mirror))?;

        let copied = Checksum::copy_hashing(&mut source, &mut file)
            .and_then(|checksum| file.seek(SeekFrom::Start(0)).map(|_| checksum));
        let checksum = match copied {
            Ok(checksum) => checksum,
            Err(e) => {
                let _ = fs::remove_file(&path);
                return Err(CoreError::io(Phase::Mirror)(e));
            }
        };

        log::debug!(
            "Mirrored {} to {} (sha256 {})",
            original.display(),
            path.display(),
            checksum
        );
        Ok((Self { path, checksum }, file))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Checksum of the original at the moment it was mirrored.
    pub fn checksum(&self) -> &Checksum {
        &self.checksum
    }

    pub fn remove(&self) -> Result<()> {
        fs::remove_file(&self.path).map_err(CoreError::io(Phase::Cleanup))
    }
}
