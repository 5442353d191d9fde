use std::collections::BTreeSet;

/// Accumulated narrative facts. Presence-only: a flag is either set or it
/// is not, and nothing ever unsets one short of a fresh session.
#[derive(Debug, Clone, Default)]
pub struct StoryFlags {
    flags: BTreeSet<String>,
}

impl StoryFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the flag was newly set.
    pub fn add(&mut self, flag: &str) -> bool {
        self.flags.insert(flag.to_string())
    }

    pub fn contains(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    pub fn satisfies<'a, I>(&self, required: I) -> bool
    where
        I: IntoIterator<Item = &'a String>,
    {
        required.into_iter().all(|flag| self.flags.contains(flag))
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_is_idempotent_and_reports_novelty() {
        let mut flags = StoryFlags::new();
        assert!(flags.add("MET_KEEPER"));
        assert!(!flags.add("MET_KEEPER"));
        assert_eq!(flags.len(), 1);
        assert!(flags.contains("MET_KEEPER"));
    }

    #[test]
    fn satisfies_requires_every_listed_flag() {
        let mut flags = StoryFlags::new();
        flags.add("A");
        flags.add("B");

        let both = vec!["A".to_string(), "B".to_string()];
        let missing = vec!["A".to_string(), "C".to_string()];
        assert!(flags.satisfies(&both));
        assert!(!flags.satisfies(&missing));
    }

    #[test]
    fn empty_requirement_always_matches() {
        let flags = StoryFlags::new();
        assert!(flags.satisfies(&Vec::new()));
    }
}
