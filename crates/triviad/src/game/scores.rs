//! Per-player score table

/// Username to score, kept in roster order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreTable {
    entries: Vec<(String, u32)>,
}

impl ScoreTable {
    /// Start every player at zero
    pub fn new<I, T>(usernames: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            entries: usernames.into_iter().map(|name| (name.into(), 0)).collect(),
        }
    }

    /// Add one point, returning the new score
    pub fn award(&mut self, username: &str) -> Option<u32> {
        let entry = self.entries.iter_mut().find(|(name, _)| name == username)?;
        entry.1 += 1;
        Some(entry.1)
    }

    pub fn get(&self, username: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(name, _)| name == username)
            .map(|(_, score)| *score)
    }

    pub fn standings(&self) -> &[(String, u32)] {
        &self.entries
    }

    /// END message body: one `name : score` line per player
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|(name, score)| format!("{} : {}\n", name, score))
            .collect()
    }
}
