//! Back/forward navigation over locations.

use super::location::Location;

/// A browser-style location history.
///
/// Navigating to a new location drops everything after the cursor.
#[derive(Debug, Clone)]
pub struct LocationHistory {
    entries: Vec<Location>,
    cursor: usize,
}

impl LocationHistory {
    /// Start a history at `initial`.
    pub fn new(initial: Location) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
        }
    }

    /// The current location.
    pub fn current(&self) -> &Location {
        &self.entries[self.cursor]
    }

    /// Push a location. Pushing the current location again is a no-op.
    pub fn push(&mut self, location: Location) {
        if *self.current() == location {
            return;
        }
        self.entries.truncate(self.cursor + 1);
        self.entries.push(location);
        self.cursor += 1;
    }

    /// Step back. Returns false at the oldest entry.
    pub fn back(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Step forward. Returns false at the newest entry.
    pub fn forward(&mut self) -> bool {
        if self.cursor + 1 >= self.entries.len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_back_and_forward() {
        let mut history = LocationHistory::new(Location::root());
        history.push(Location::parse("/movies/42"));
        history.push(Location::root());

        assert!(history.back());
        assert_eq!(history.current().path(), "/movies/42");
        assert!(history.back());
        assert!(!history.back());
        assert_eq!(history.current(), &Location::root());

        assert!(history.forward());
        assert!(history.forward());
        assert!(!history.forward());
    }

    #[test]
    fn test_push_truncates_forward_entries() {
        let mut history = LocationHistory::new(Location::root());
        history.push(Location::parse("/tv"));
        history.back();
        history.push(Location::parse("/search?keyword=dune"));

        assert!(!history.can_go_forward());
        assert!(history.back());
        assert_eq!(history.current(), &Location::root());
    }

    #[test]
    fn test_push_same_location_is_ignored() {
        let mut history = LocationHistory::new(Location::root());
        history.push(Location::root());
        assert!(!history.can_go_back());
    }
}
