#[cfg(test)]
mod session_tests {
    use super::super::*;
    use crate::test_support::numbered_lines;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    struct Workspace {
        _files: TempDir,
        scratch: TempDir,
        original: PathBuf,
    }

    fn workspace(content: &[u8]) -> Workspace {
        let files = TempDir::new().unwrap();
        let scratch = TempDir::new().unwrap();
        let original = files.path().join("history.txt");
        fs::write(&original, content).unwrap();
        Workspace {
            _files: files,
            scratch,
            original,
        }
    }

    impl Workspace {
        fn options(&self) -> SessionOptions {
            SessionOptions {
                scratch_dir: Some(self.scratch.path().to_path_buf()),
                seed: None,
            }
        }

        fn open(&self, anchors: Vec<u32>) -> Result<Session> {
            Session::open_with_sampler(
                &self.original,
                &self.options(),
                Box::new(FixedSampler::new(anchors)),
            )
        }

        fn scratch_entries(&self) -> usize {
            fs::read_dir(self.scratch.path()).unwrap().count()
        }
    }

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_open_shows_anchor_and_progress() {
        let ws = workspace(numbered_lines(100).as_bytes());
        let session = ws.open(vec![42]).unwrap();
        let view = session.view();
        assert_eq!(view.window.selected, "42");
        assert_eq!(view.window.selected_line, 42);
        assert_eq!(view.line_count, 100);
        assert_eq!(view.marked, 0);
        assert!(!view.awaiting_confirmation);
        assert!(session.mirror_path().starts_with(ws.scratch.path()));
    }

    #[test]
    fn test_mark_survives_shuffles() {
        let ws = workspace(numbered_lines(300).as_bytes());
        let mut session = ws.open(vec![150, 7, 151]).unwrap();

        session.apply(Command::ToggleDelete).unwrap();
        assert!(session.view().window.selected_marked());

        session.apply(Command::Shuffle).unwrap();
        assert_eq!(session.view().window.selected_line, 7);
        assert!(session.view().window.gutter.iter().all(|m| !m));

        session.apply(Command::Shuffle).unwrap();
        let view = session.view();
        assert_eq!(view.window.before, vec!["149", "150"]);
        assert!(view.window.gutter[1]);
        assert_eq!(view.marked, 1);
    }

    #[test]
    fn test_commit_without_marks_keeps_bytes() {
        let content = b"alpha\nbeta\ngamma";
        let ws = workspace(content);
        let mut session = ws.open(vec![2]).unwrap();
        session.apply(Command::MoveDown).unwrap();

        let effect = session.apply(Command::Commit).unwrap();
        assert_eq!(effect, Effect::Finished(Finish::NoChanges));
        assert_eq!(fs::read(&ws.original).unwrap(), content.to_vec());
        assert_eq!(ws.scratch_entries(), 0);
    }

    #[test]
    fn test_commit_removes_marked_lines_only() {
        let ws = workspace(numbered_lines(40).as_bytes());
        let mut session = ws.open(vec![10, 30]).unwrap();

        session.apply(Command::ToggleDelete).unwrap(); // 10
        session.apply(Command::MoveDown).unwrap();
        session.apply(Command::MoveDown).unwrap();
        session.apply(Command::ToggleDelete).unwrap(); // 12
        session.apply(Command::Shuffle).unwrap();
        session.apply(Command::MoveUp).unwrap();
        session.apply(Command::ToggleDelete).unwrap(); // 29
        assert_eq!(session.deletions().iter().collect::<Vec<_>>(), vec![10, 12, 29]);

        let effect = session.apply(Command::Commit).unwrap();
        assert_eq!(effect, Effect::Finished(Finish::Committed { removed: 3 }));

        let expected: String = (1..=40)
            .filter(|n| ![10, 12, 29].contains(n))
            .map(|n| format!("{}\n", n))
            .collect();
        assert_eq!(read(&ws.original), expected);
        assert_eq!(ws.scratch_entries(), 0);
        assert!(session.is_finished());
    }

    #[cfg(unix)]
    #[test]
    fn test_commit_keeps_permission_bits() {
        use std::os::unix::fs::PermissionsExt;

        let ws = workspace(b"a\nb\nc\n");
        fs::set_permissions(&ws.original, fs::Permissions::from_mode(0o600)).unwrap();
        let mut session = ws.open(vec![1]).unwrap();
        session.apply(Command::ToggleDelete).unwrap();
        session.apply(Command::Commit).unwrap();

        assert_eq!(read(&ws.original), "b\nc\n");
        let mode = fs::metadata(&ws.original).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_external_change_declined_leaves_original() {
        let ws = workspace(numbered_lines(20).as_bytes());
        let mut session = ws.open(vec![5]).unwrap();
        session.apply(Command::ToggleDelete).unwrap();

        let changed = format!("{}21\n", numbered_lines(20));
        fs::write(&ws.original, &changed).unwrap();

        let effect = session.apply(Command::Commit).unwrap();
        assert_eq!(
            effect,
            Effect::ConfirmOverwrite {
                path: ws.original.clone()
            }
        );
        assert!(session.view().awaiting_confirmation);

        let err = session.apply(Command::ConfirmOverwrite(false)).unwrap_err();
        match err {
            CoreError::AbortedDueToExternalModification { mirror } => {
                assert!(mirror.exists());
                assert_eq!(read(&mirror), numbered_lines(20));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(read(&ws.original), changed);
        assert!(session.is_finished());
    }

    #[test]
    fn test_external_change_confirmed_overwrites() {
        let ws = workspace(numbered_lines(20).as_bytes());
        let mut session = ws.open(vec![20]).unwrap();
        session.apply(Command::ToggleDelete).unwrap();
        fs::write(&ws.original, "something else\n").unwrap();

        assert!(matches!(
            session.apply(Command::Commit).unwrap(),
            Effect::ConfirmOverwrite { .. }
        ));
        assert!(matches!(
            session.apply(Command::MoveUp),
            Err(CoreError::InvalidState(_))
        ));
        let effect = session.apply(Command::ConfirmOverwrite(true)).unwrap();
        assert_eq!(effect, Effect::Finished(Finish::Committed { removed: 1 }));
        assert_eq!(read(&ws.original), numbered_lines(19));
    }

    #[test]
    fn test_failed_write_back_keeps_mirror_and_marks() {
        let ws = workspace(numbered_lines(10).as_bytes());
        let mut session = ws.open(vec![4]).unwrap();
        session.apply(Command::ToggleDelete).unwrap();
        fs::write(&ws.original, "edited\n").unwrap();
        assert!(matches!(
            session.apply(Command::Commit).unwrap(),
            Effect::ConfirmOverwrite { .. }
        ));

        // the original vanishes between the prompt and the answer
        fs::remove_file(&ws.original).unwrap();
        let err = session.apply(Command::ConfirmOverwrite(true)).unwrap_err();
        assert!(matches!(err, CoreError::Io { .. }));
        assert!(session.is_finished());

        let mirror = session.unapplied_mirror().unwrap();
        assert_eq!(read(mirror), numbered_lines(10));
        assert_eq!(session.deletions().iter().collect::<Vec<_>>(), vec![4]);
    }

    #[test]
    fn test_finished_sessions_hold_no_unapplied_mirror() {
        let ws = workspace(numbered_lines(10).as_bytes());
        let mut session = ws.open(vec![2]).unwrap();
        assert!(session.unapplied_mirror().is_none());
        session.apply(Command::ToggleDelete).unwrap();
        assert!(session.unapplied_mirror().is_none());
        session.apply(Command::Commit).unwrap();
        assert!(session.unapplied_mirror().is_none());
    }

    #[test]
    fn test_abort_discards_marks() {
        let ws = workspace(numbered_lines(10).as_bytes());
        let mut session = ws.open(vec![3]).unwrap();
        session.apply(Command::ToggleDelete).unwrap();

        let effect = session.apply(Command::Abort).unwrap();
        assert_eq!(effect, Effect::Finished(Finish::Aborted));
        assert!(session.deletions().is_empty());
        assert_eq!(read(&ws.original), numbered_lines(10));
        assert_eq!(ws.scratch_entries(), 0);
        assert!(matches!(
            session.apply(Command::Shuffle),
            Err(CoreError::InvalidState(_))
        ));
    }

    #[test]
    fn test_confirmation_without_prompt_is_rejected() {
        let ws = workspace(b"only\n");
        let mut session = ws.open(vec![1]).unwrap();
        assert!(matches!(
            session.apply(Command::ConfirmOverwrite(true)),
            Err(CoreError::InvalidState(_))
        ));
        assert!(!session.is_finished());
    }

    #[test]
    fn test_unreadable_files_are_skippable() {
        let ws = workspace(b"\xff\xfe\xfd\nsecond\n");
        let err = ws.open(vec![1]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidEncoding { .. }));
        assert!(err.is_skippable());
        assert_eq!(ws.scratch_entries(), 0);

        let empty = workspace(b"");
        let err = empty.open(vec![1]).unwrap_err();
        assert!(matches!(err, CoreError::EmptyFile));
        assert_eq!(empty.scratch_entries(), 0);
    }

    #[test]
    fn test_seeded_sessions_are_reproducible() {
        let ws = workspace(numbered_lines(500).as_bytes());
        let options = SessionOptions {
            scratch_dir: Some(ws.scratch.path().to_path_buf()),
            seed: Some(99),
        };
        let mut first = Session::open(&ws.original, &options).unwrap();
        let mut second = Session::open(&ws.original, &options).unwrap();
        for _ in 0..5 {
            first.apply(Command::Shuffle).unwrap();
            second.apply(Command::Shuffle).unwrap();
            assert_eq!(first.view(), second.view());
        }
        first.apply(Command::Abort).unwrap();
        second.apply(Command::Abort).unwrap();
    }
}
