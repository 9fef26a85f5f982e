//! Writing the marked deletions back to the original file.
//!
//! The filtered content is staged in a scratch file and moved over the
//! original in one rename, so readers of the original never see a partial
//! write. When the scratch directory lives on another filesystem the staged
//! file is first copied next to the original and renamed from there.

use std::fs;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::checksum::Checksum;
use crate::deletion::DeletionSet;
use crate::error::{CoreError, Phase, Result};

const SCRATCH_PREFIX: &str = "linesift-del-";

/// Result of comparing the live original with the session checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitCheck {
    Clean,
    Modified { current: Checksum },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Nothing was marked; the original was not touched.
    Unchanged,
    Rewritten { removed: usize },
}

/// Everything needed to rewrite one original file.
#[derive(Debug, Clone, Copy)]
pub struct CommitPlan<'a> {
    pub original: &'a Path,
    pub mirror_path: &'a Path,
    pub deletions: &'a DeletionSet,
    pub session_checksum: &'a Checksum,
    pub scratch_dir: &'a Path,
}

impl<'a> CommitPlan<'a> {
    pub fn check(&self) -> Result<CommitCheck> {
        let current = Checksum::of_file(self.original)?;
        if &current == self.session_checksum {
            Ok(CommitCheck::Clean)
        } else {
            log::warn!(
                "{} changed since it was mirrored ({} -> {})",
                self.original.display(),
                self.session_checksum,
                current
            );
            Ok(CommitCheck::Modified { current })
        }
    }

    /// Filter `mirror` into a scratch file and move it over the original.
    pub fn apply<R: Read>(&self, mirror: R) -> Result<CommitOutcome> {
        if self.deletions.is_empty() {
            return Ok(CommitOutcome::Unchanged);
        }
        let (scratch, removed) = write_filtered(mirror, self.deletions, self.scratch_dir)?;
        replace_original(scratch, self.original)?;
        log::info!(
            "Removed {} line(s) from {}",
            removed,
            self.original.display()
        );
        Ok(CommitOutcome::Rewritten { removed })
    }

    pub fn declined(&self) -> CoreError {
        log::warn!(
            "Overwrite declined; marked lines {:?} were not applied, mirror kept at {}",
            self.deletions.iter().collect::<Vec<_>>(),
            self.mirror_path.display()
        );
        CoreError::AbortedDueToExternalModification {
            mirror: self.mirror_path.to_path_buf(),
        }
    }
}

/// Copy every line not in `deletions` into a new scratch file, each ending in a
/// single `\n`. Returns the scratch file and the number of lines dropped.
pub fn write_filtered<R: Read>(
    mirror: R,
    deletions: &DeletionSet,
    scratch_dir: &Path,
) -> Result<(NamedTempFile, usize)> {
    let scratch = tempfile::Builder::new()
        .prefix(SCRATCH_PREFIX)
        .tempfile_in(scratch_dir)
        .map_err(CoreError::io(Phase::Filter))?;

    let mut reader = BufReader::new(mirror);
    let mut writer = BufWriter::new(scratch.as_file());
    let mut line = Vec::new();
    let mut line_number: u32 = 0;
    let mut removed = 0;
    loop {
        line.clear();
        let read = reader
            .read_until(b'\n', &mut line)
            .map_err(CoreError::io(Phase::Filter))?;
        if read == 0 {
            break;
        }
        line_number += 1;
        if deletions.contains(line_number) {
            removed += 1;
            continue;
        }
        let content = strip_terminator(&line);
        writer
            .write_all(content)
            .and_then(|_| writer.write_all(b"\n"))
            .map_err(CoreError::io(Phase::Filter))?;
    }
    writer.flush().map_err(CoreError::io(Phase::Filter))?;
    drop(writer);
    scratch
        .as_file()
        .sync_all()
        .map_err(CoreError::io(Phase::Filter))?;

    Ok((scratch, removed))
}

fn strip_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Give `scratch` the original's permission bits and move it into place.
pub fn replace_original(scratch: NamedTempFile, original: &Path) -> Result<()> {
    let permissions = fs::metadata(original)
        .map_err(CoreError::io(Phase::Permissions))?
        .permissions();
    fs::set_permissions(scratch.path(), permissions.clone())
        .map_err(CoreError::io(Phase::Permissions))?;

    match scratch.persist(original) {
        Ok(_) => Ok(()),
        Err(err) if is_cross_device(&err.error) => {
            log::debug!(
                "Scratch file is on another filesystem, staging a copy next to {}",
                original.display()
            );
            let scratch = err.file;
            replace_via_sibling(scratch.path(), original, permissions)?;
            scratch.close().map_err(CoreError::io(Phase::Cleanup))
        }
        Err(err) => Err(CoreError::io(Phase::Replace)(err.error)),
    }
}

/// Copy `staged` into a temp file beside `original`, then rename it over the
/// original. The sibling is removed if anything fails before the rename.
fn replace_via_sibling(staged: &Path, original: &Path, permissions: fs::Permissions) -> Result<()> {
    let parent = match original.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut sibling = tempfile::Builder::new()
        .prefix(SCRATCH_PREFIX)
        .tempfile_in(parent)
        .map_err(CoreError::io(Phase::Replace))?;

    let mut source = fs::File::open(staged).map_err(CoreError::io(Phase::Replace))?;
    io::copy(&mut source, sibling.as_file_mut()).map_err(CoreError::io(Phase::Replace))?;
    sibling
        .as_file()
        .sync_all()
        .map_err(CoreError::io(Phase::Replace))?;
    fs::set_permissions(sibling.path(), permissions).map_err(CoreError::io(Phase::Permissions))?;

    sibling
        .persist(original)
        .map(|_| ())
        .map_err(|e| CoreError::io(Phase::Replace)(e.error))
}

#[cfg(unix)]
const EXDEV: i32 = 18;

#[cfg(windows)]
const ERROR_NOT_SAME_DEVICE: i32 = 17;

#[cfg(unix)]
fn is_cross_device(err: &io::Error) -> bool {
    err.raw_os_error() == Some(EXDEV)
}

#[cfg(windows)]
fn is_cross_device(err: &io::Error) -> bool {
    err.raw_os_error() == Some(ERROR_NOT_SAME_DEVICE)
}

#[cfg(not(any(unix, windows)))]
fn is_cross_device(_err: &io::Error) -> bool {
    false
}
