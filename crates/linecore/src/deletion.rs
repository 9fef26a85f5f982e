use std::collections::BTreeSet;

/// Absolute 1-based line numbers marked for deletion in the current session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionSet {
    lines: BTreeSet<u32>,
}

impl DeletionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the mark on `line`. Returns whether the line is marked afterwards.
    pub fn toggle(&mut self, line: u32) -> bool {
        if self.lines.remove(&line) {
            false
        } else {
            self.lines.insert(line);
            true
        }
    }

    pub fn contains(&self, line: u32) -> bool {
        self.lines.contains(&line)
    }

    /// Per-line flags for `start_line..start_line + len`.
    pub fn flags_for(&self, start_line: u32, len: usize) -> Vec<bool> {
        let mut flags = vec![false; len];
        if len == 0 {
            return flags;
        }
        let end_line = start_line + len as u32 - 1;
        for &line in self.lines.range(start_line..=end_line) {
            flags[(line - start_line) as usize] = true;
        }
        flags
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Marked lines in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.lines.iter().copied()
    }
}

impl FromIterator<u32> for DeletionSet {
    fn from_iter<T: IntoIterator<Item = u32>>(iter: T) -> Self {
        Self {
            lines: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_flips_membership() {
        let mut set = DeletionSet::new();
        assert!(set.toggle(7));
        assert!(set.contains(7));
        assert!(!set.toggle(7));
        assert!(!set.contains(7));
        assert!(set.is_empty());
    }

    #[test]
    fn test_flags_for_intersects_range() {
        let set: DeletionSet = [2, 5, 6, 40].into_iter().collect();
        assert_eq!(
            set.flags_for(4, 4),
            vec![false, true, true, false]
        );
        assert_eq!(set.flags_for(1, 2), vec![false, true]);
        assert!(set.flags_for(10, 0).is_empty());
    }

    #[test]
    fn test_iter_is_sorted_and_clear_empties() {
        let mut set: DeletionSet = [9, 3, 5].into_iter().collect();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![3, 5, 9]);
        assert_eq!(set.len(), 3);
        set.clear();
        assert!(set.is_empty());
    }
}
