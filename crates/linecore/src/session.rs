//! One editing session over one file, driven by discrete commands.

use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::commit::{CommitCheck, CommitOutcome, CommitPlan};
use crate::deletion::DeletionSet;
use crate::error::{CoreError, Phase, Result};
use crate::line_index::LineIndex;
use crate::mirror::Mirror;
use crate::navigation::Navigator;
use crate::range_reader::RangeReader;
use crate::sampler::{LineSampler, SeededSampler};
use crate::window::WindowView;

#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Where the mirror and commit scratch files go. Defaults to the system temp dir.
    pub scratch_dir: Option<PathBuf>,
    /// Fixed sampler seed; `None` seeds from the OS.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Shuffle,
    MoveUp,
    MoveDown,
    ToggleDelete,
    Commit,
    Abort,
    ConfirmOverwrite(bool),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// State changed; render `Session::view` again.
    Redraw,
    /// The original changed on disk. Answer with `Command::ConfirmOverwrite`.
    ConfirmOverwrite { path: PathBuf },
    Finished(Finish),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finish {
    Committed { removed: usize },
    NoChanges,
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Browsing,
    AwaitingConfirmation,
    Finished,
}

/// Render state handed to the front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub window: WindowView,
    pub line_count: u32,
    pub marked: usize,
    pub awaiting_confirmation: bool,
}

pub struct Session {
    original: PathBuf,
    scratch_dir: PathBuf,
    mirror: Mirror,
    reader: RangeReader<File>,
    deletions: DeletionSet,
    sampler: Box<dyn LineSampler + Send>,
    navigator: Navigator,
    stage: Stage,
}

impl Session {
    /// Mirror `original`, index the mirror and load the first random buffer.
    pub fn open(original: &Path, options: &SessionOptions) -> Result<Self> {
        let sampler: Box<dyn LineSampler + Send> = match options.seed {
            Some(seed) => Box::new(SeededSampler::new(seed)),
            None => Box::new(SeededSampler::from_entropy()),
        };
        Self::open_with_sampler(original, options, sampler)
    }

    pub fn open_with_sampler(
        original: &Path,
        options: &SessionOptions,
        mut sampler: Box<dyn LineSampler + Send>,
    ) -> Result<Self> {
        let scratch_dir = options
            .scratch_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir);
        let (mirror, file) = Mirror::create(original, &scratch_dir)?;

        let index = LineIndex::build(BufReader::new(&file));
        let loaded = index.and_then(|index| {
            log::info!(
                "Indexed {} lines of {}",
                index.line_count(),
                original.display()
            );
            let mut reader = RangeReader::new(index, file);
            let deletions = DeletionSet::new();
            let navigator = Navigator::shuffle(&mut reader, sampler.as_mut(), &deletions)?;
            Ok((reader, deletions, navigator))
        });

        let (reader, deletions, navigator) = match loaded {
            Ok(loaded) => loaded,
            Err(e) => {
                // nothing marked yet, so the mirror holds no work
                if let Err(cleanup) = mirror.remove() {
                    log::warn!("Failed to remove mirror {}: {}", mirror.path().display(), cleanup);
                }
                return Err(e);
            }
        };

        Ok(Self {
            original: original.to_path_buf(),
            scratch_dir,
            mirror,
            reader,
            deletions,
            sampler,
            navigator,
            stage: Stage::Browsing,
        })
    }

    /// Apply one command. Errors leave the session usable unless it has finished.
    pub fn apply(&mut self, command: Command) -> Result<Effect> {
        match self.stage {
            Stage::Finished => Err(CoreError::InvalidState(format!(
                "{:?} after the session finished",
                command
            ))),
            Stage::AwaitingConfirmation => match command {
                Command::ConfirmOverwrite(true) => {
                    log::info!("Overwrite of {} confirmed", self.original.display());
                    self.write_back()
                }
                Command::ConfirmOverwrite(false) | Command::Abort => {
                    self.stage = Stage::Finished;
                    let err = self.plan().declined();
                    self.deletions.clear();
                    Err(err)
                }
                other => Err(CoreError::InvalidState(format!(
                    "{:?} while waiting for overwrite confirmation",
                    other
                ))),
            },
            Stage::Browsing => self.browse(command),
        }
    }

    fn browse(&mut self, command: Command) -> Result<Effect> {
        match command {
            Command::Shuffle => {
                self.navigator =
                    Navigator::shuffle(&mut self.reader, self.sampler.as_mut(), &self.deletions)?;
                Ok(Effect::Redraw)
            }
            Command::MoveUp => {
                self.navigator.move_up()?;
                Ok(Effect::Redraw)
            }
            Command::MoveDown => {
                self.navigator.move_down()?;
                Ok(Effect::Redraw)
            }
            Command::ToggleDelete => {
                let marked = self.navigator.toggle_delete(&mut self.deletions);
                log::debug!(
                    "Line {} {}",
                    self.navigator.selected_file_line(),
                    if marked { "marked" } else { "unmarked" }
                );
                Ok(Effect::Redraw)
            }
            Command::Commit => {
                if self.deletions.is_empty() {
                    self.finish_clean();
                    return Ok(Effect::Finished(Finish::NoChanges));
                }
                match self.plan().check()? {
                    CommitCheck::Clean => self.write_back(),
                    CommitCheck::Modified { .. } => {
                        self.stage = Stage::AwaitingConfirmation;
                        Ok(Effect::ConfirmOverwrite {
                            path: self.original.clone(),
                        })
                    }
                }
            }
            Command::Abort => {
                log::info!(
                    "Session for {} aborted, {} mark(s) discarded",
                    self.original.display(),
                    self.deletions.len()
                );
                self.deletions.clear();
                self.finish_clean();
                Ok(Effect::Finished(Finish::Aborted))
            }
            Command::ConfirmOverwrite(_) => Err(CoreError::InvalidState(
                "no overwrite confirmation pending".to_string(),
            )),
        }
    }

    fn plan(&self) -> CommitPlan<'_> {
        CommitPlan {
            original: &self.original,
            mirror_path: self.mirror.path(),
            deletions: &self.deletions,
            session_checksum: self.mirror.checksum(),
            scratch_dir: &self.scratch_dir,
        }
    }

    fn write_back(&mut self) -> Result<Effect> {
        // any failure from here on ends the session; the mirror stays on disk
        self.stage = Stage::Finished;
        let removed = match self.rewrite_original() {
            Ok(removed) => removed,
            Err(e) => {
                log::warn!(
                    "Commit of {} failed; marked lines {:?} were not applied, mirror kept at {}",
                    self.original.display(),
                    self.deletions.iter().collect::<Vec<_>>(),
                    self.mirror.path().display()
                );
                return Err(e);
            }
        };
        self.deletions.clear();
        self.remove_mirror();
        Ok(Effect::Finished(Finish::Committed { removed }))
    }

    fn rewrite_original(&mut self) -> Result<usize> {
        let file = self.reader.source_mut();
        file.seek(SeekFrom::Start(0))
            .map_err(CoreError::io(Phase::Filter))?;

        let plan = CommitPlan {
            original: &self.original,
            mirror_path: self.mirror.path(),
            deletions: &self.deletions,
            session_checksum: self.mirror.checksum(),
            scratch_dir: &self.scratch_dir,
        };
        match plan.apply(&mut *file)? {
            CommitOutcome::Rewritten { removed } => Ok(removed),
            CommitOutcome::Unchanged => Ok(0),
        }
    }

    /// The mirror path while it still holds marks that never reached the original.
    pub fn unapplied_mirror(&self) -> Option<&Path> {
        let pending = self.stage == Stage::Finished && !self.deletions.is_empty();
        (pending && self.mirror.path().exists()).then(|| self.mirror.path())
    }

    fn finish_clean(&mut self) {
        self.stage = Stage::Finished;
        self.remove_mirror();
    }

    fn remove_mirror(&self) {
        if let Err(e) = self.mirror.remove() {
            log::warn!(
                "Failed to remove mirror {}: {}",
                self.mirror.path().display(),
                e
            );
        }
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            window: self.navigator.view(),
            line_count: self.reader.line_count(),
            marked: self.deletions.len(),
            awaiting_confirmation: self.stage == Stage::AwaitingConfirmation,
        }
    }

    pub fn original(&self) -> &Path {
        &self.original
    }

    pub fn mirror_path(&self) -> &Path {
        self.mirror.path()
    }

    pub fn deletions(&self) -> &DeletionSet {
        &self.deletions
    }

    pub fn line_count(&self) -> u32 {
        self.reader.line_count()
    }

    pub fn is_finished(&self) -> bool {
        self.stage == Stage::Finished
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("original", &self.original)
            .field("mirror", &self.mirror)
            .field("deletions", &self.deletions)
            .field("stage", &self.stage)
            .finish_non_exhaustive()
    }
}
