use std::fmt;

/// Award earned by a best streak.
///
/// Streaks of 5, 12 and 20 unlock a star, a medal and a crown; each tier keeps
/// the awards below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TrophyTier {
    Unranked,
    Star,
    Medal,
    Crown,
}

impl TrophyTier {
    #[must_use]
    pub fn for_score(score: u32) -> Self {
        match score {
            0..=4 => TrophyTier::Unranked,
            5..=11 => TrophyTier::Star,
            12..=19 => TrophyTier::Medal,
            _ => TrophyTier::Crown,
        }
    }

    /// Glyphs for every award reached so far.
    #[must_use]
    pub fn glyphs(self) -> &'static str {
        match self {
            TrophyTier::Unranked => "",
            TrophyTier::Star => "\u{1F31F}",
            TrophyTier::Medal => "\u{1F31F}\u{1F3C5}",
            TrophyTier::Crown => "\u{1F31F}\u{1F3C5}\u{1F451}",
        }
    }

    /// A score of at least one marks the cell as attempted successfully.
    #[must_use]
    pub fn has_streak(score: u32) -> bool {
        score >= 1
    }
}

impl fmt::Display for TrophyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glyphs())
    }
}
