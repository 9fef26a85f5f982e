use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use linecore::{Command, CoreError, Effect, Finish, Session, SessionView};
use std::fmt;
use std::path::PathBuf;

use crate::config::Config;
use crate::status_manager::StatusManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Browsing,
    /// The original changed on disk; waiting for y/n.
    ConfirmOverwrite,
    Done,
}

/// How the session for one file ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Committed { removed: usize },
    NoChanges,
    Aborted,
    DryRun { marked: Vec<u32> },
    /// Overwrite declined; the marked work is still in the mirror.
    Declined { mirror: PathBuf },
    Failed(String),
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileOutcome::Committed { removed } => write!(f, "removed {} line(s)", removed),
            FileOutcome::NoChanges => f.write_str("no lines marked, file unchanged"),
            FileOutcome::Aborted => f.write_str("aborted, file unchanged"),
            FileOutcome::DryRun { marked } if marked.is_empty() => {
                f.write_str("dry run, no lines marked")
            }
            FileOutcome::DryRun { marked } => write!(f, "dry run, would remove lines {:?}", marked),
            FileOutcome::Declined { mirror } => write!(
                f,
                "file changed on disk, marked lines not applied (sampled copy kept at {})",
                mirror.display()
            ),
            FileOutcome::Failed(reason) => write!(f, "error: {}", reason),
        }
    }
}

impl FileOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, FileOutcome::Failed(_))
    }
}

pub struct App {
    session: Session,
    pub config: Config,
    pub status: StatusManager,
    mode: Mode,
    dry_run: bool,
    outcome: Option<FileOutcome>,
}

/// Key bindings. Returns `None` for keys that do nothing in `mode`.
pub fn command_for_key(key: KeyEvent, mode: Mode) -> Option<Command> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match mode {
        Mode::Done => None,
        Mode::ConfirmOverwrite => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') if !ctrl => Some(Command::ConfirmOverwrite(true)),
            KeyCode::Char('n') | KeyCode::Char('N') if !ctrl => {
                Some(Command::ConfirmOverwrite(false))
            }
            KeyCode::Esc => Some(Command::ConfirmOverwrite(false)),
            KeyCode::Char('c') if ctrl => Some(Command::Abort),
            _ => None,
        },
        Mode::Browsing if ctrl => match key.code {
            KeyCode::Char('j') | KeyCode::Char('n') => Some(Command::MoveDown),
            KeyCode::Char('k') | KeyCode::Char('p') => Some(Command::MoveUp),
            KeyCode::Char('d') => Some(Command::ToggleDelete),
            KeyCode::Char('q') => Some(Command::Commit),
            KeyCode::Char('c') => Some(Command::Abort),
            _ => None,
        },
        Mode::Browsing => match key.code {
            KeyCode::Char('j') | KeyCode::Down => Some(Command::MoveDown),
            KeyCode::Char('k') | KeyCode::Up => Some(Command::MoveUp),
            KeyCode::Char('d') => Some(Command::ToggleDelete),
            KeyCode::Char(' ') | KeyCode::Char('s') => Some(Command::Shuffle),
            KeyCode::Enter => Some(Command::Commit),
            KeyCode::Esc => Some(Command::Abort),
            _ => None,
        },
    }
}

impl App {
    pub fn new(session: Session, config: Config, status: StatusManager, dry_run: bool) -> Self {
        let mut app = Self {
            session,
            config,
            status,
            mode: Mode::Browsing,
            dry_run,
            outcome: None,
        };
        if dry_run {
            app.status
                .set_info("Dry run: marked lines are logged, the file is not changed");
        }
        app
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if let Some(command) = command_for_key(key, self.mode) {
            self.dispatch(command);
        }
    }

    pub fn dispatch(&mut self, command: Command) {
        if self.dry_run && command == Command::Commit {
            self.finish_dry_run();
            return;
        }
        match self.session.apply(command) {
            Ok(effect) => self.on_effect(command, effect),
            Err(e) => self.on_error(e),
        }
    }

    fn on_effect(&mut self, command: Command, effect: Effect) {
        match effect {
            Effect::Redraw => match command {
                Command::ToggleDelete => {
                    let window = self.session.view().window;
                    if window.selected_marked() {
                        self.status
                            .set_info(format!("Line {} marked", window.selected_line));
                    } else {
                        self.status
                            .set_info(format!("Line {} unmarked", window.selected_line));
                    }
                }
                Command::Shuffle => self.status.clear(),
                _ => {}
            },
            Effect::ConfirmOverwrite { path } => {
                self.mode = Mode::ConfirmOverwrite;
                self.status
                    .set_warning(format!("{} changed on disk", path.display()));
            }
            Effect::Finished(finish) => {
                let outcome = match finish {
                    Finish::Committed { removed } => FileOutcome::Committed { removed },
                    Finish::NoChanges => FileOutcome::NoChanges,
                    Finish::Aborted => FileOutcome::Aborted,
                };
                self.finish(outcome);
            }
        }
    }

    fn on_error(&mut self, error: CoreError) {
        match error {
            CoreError::AbortedDueToExternalModification { mirror } => {
                self.finish(FileOutcome::Declined { mirror });
            }
            CoreError::OutOfBounds { .. } => {
                log::warn!("{}; reloading a random window", error);
                self.status.set_error(error.to_string());
                if let Err(e) = self.session.apply(Command::Shuffle) {
                    self.fail(e);
                }
            }
            CoreError::InvalidState(ref reason) => {
                log::debug!("Ignored command: {}", reason);
            }
            other => self.fail(other),
        }
    }

    fn fail(&mut self, error: CoreError) {
        log::error!("{}: {}", self.session.original().display(), error);
        if self.session.is_finished() {
            let reason = match self.session.unapplied_mirror() {
                Some(mirror) => format!(
                    "{}; marked lines {:?} were not applied (sampled copy kept at {})",
                    error,
                    self.session.deletions().iter().collect::<Vec<_>>(),
                    mirror.display()
                ),
                None => error.to_string(),
            };
            self.finish(FileOutcome::Failed(reason));
        } else {
            self.status.set_error(error.to_string());
        }
    }

    fn finish_dry_run(&mut self) {
        let marked: Vec<u32> = self.session.deletions().iter().collect();
        log::info!(
            "Dry run for {}: would remove lines {:?}",
            self.session.original().display(),
            marked
        );
        if let Err(e) = self.session.apply(Command::Abort) {
            log::warn!("Failed to close dry-run session: {}", e);
        }
        self.finish(FileOutcome::DryRun { marked });
    }

    fn finish(&mut self, outcome: FileOutcome) {
        log::info!(
            "Session for {} finished: {:?}",
            self.session.original().display(),
            outcome
        );
        self.outcome = Some(outcome);
        self.mode = Mode::Done;
    }

    pub fn update_status(&mut self) {
        self.status.update();
    }

    pub fn should_quit(&self) -> bool {
        self.mode == Mode::Done
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn view(&self) -> SessionView {
        self.session.view()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn outcome(&self) -> Option<&FileOutcome> {
        self.outcome.as_ref()
    }

    /// The recorded outcome. A session that never finished counts as aborted.
    pub fn into_outcome(self) -> FileOutcome {
        self.outcome.unwrap_or(FileOutcome::Aborted)
    }
}
