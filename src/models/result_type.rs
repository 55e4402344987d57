//! Game outcome classification.
//!
//! Result types follow a two-character code convention: the letter names the
//! kind of ending and the digit names the winner (1 = home, 2 = away). So
//! `A2` reads "away team wins because the home team was absent".

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const BLACK_AUTO_SCORE: i32 = 4;
pub const TIME_AUTO_SCORE: i32 = 4;
pub const SERIOUS_FOUL_AUTO_SCORE: i32 = 8;
pub const ABSENCE_AUTO_SCORE: i32 = 8;

/// Words the home team has to cover.
pub const HOME_TEAM_WORDS_NUMBER: i32 = 9;
/// Words the away team has to cover.
pub const AWAY_TEAM_WORDS_NUMBER: i32 = 8;

/// Placeholder shown when there is no score.
pub const NO_SCORE: &str = "---------";

/// Violations of the result invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidResult {
    #[error("result type {0}: auto end game needs an auto score")]
    MissingAutoScore(String),

    #[error("result type {0}: non-auto end game cannot carry an auto score")]
    UnexpectedAutoScore(String),

    #[error("result type {code}: auto score {score} contradicts the winner")]
    AutoScoreSign { code: String, score: i32 },

    #[error("game {0}: do not set a score for an auto end game")]
    ScoreOnAutoResult(String),

    #[error("game {0}: non-auto end game needs a score")]
    MissingScore(String),

    #[error("game {game}: score {score} contradicts the winner")]
    ScoreSign { game: String, score: i32 },

    #[error("game {game}: score {score} is out of range")]
    ScoreOutOfRange { game: String, score: i32 },
}

/// How an auto-resolved game was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForfeitKind {
    /// Assassin (black card) revealed
    Black,
    /// Out of time
    Time,
    /// Team did not show up
    Absence,
    SeriousFoul,
}

impl ForfeitKind {
    fn from_code_letter(letter: char) -> Option<Self> {
        match letter {
            'B' => Some(ForfeitKind::Black),
            'T' => Some(ForfeitKind::Time),
            'A' => Some(ForfeitKind::Absence),
            'F' => Some(ForfeitKind::SeriousFoul),
            _ => None,
        }
    }
}

/// A tagged outcome classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultType {
    /// Short code, e.g. "W1" or "A2"
    pub code: String,

    pub description: String,

    /// Game ended by forfeit, foul or time rather than by covering all words
    pub is_auto: bool,

    pub is_home_win: bool,

    /// Fixed home-perspective score for auto end games
    #[serde(default)]
    pub auto_score: Option<i32>,
}

impl ResultType {
    /// Regular end: the winner covered all their words.
    pub fn words(code: &str, description: &str, is_home_win: bool) -> Self {
        Self {
            code: code.to_string(),
            description: description.to_string(),
            is_auto: false,
            is_home_win,
            auto_score: None,
        }
    }

    /// Auto end with a fixed home-perspective score.
    pub fn auto(code: &str, description: &str, is_home_win: bool, auto_score: i32) -> Self {
        Self {
            code: code.to_string(),
            description: description.to_string(),
            is_auto: true,
            is_home_win,
            auto_score: Some(auto_score),
        }
    }

    /// The ten result types every cup uses.
    pub fn standard_set() -> Vec<ResultType> {
        vec![
            Self::words("W1", "Team 1 covered all words", true),
            Self::words("W2", "Team 2 covered all words", false),
            Self::auto("B2", "Team 1 black lose", false, -BLACK_AUTO_SCORE),
            Self::auto("B1", "Team 2 black lose", true, BLACK_AUTO_SCORE),
            Self::auto("T2", "Team 1 time lose", false, -TIME_AUTO_SCORE),
            Self::auto("T1", "Team 2 time lose", true, TIME_AUTO_SCORE),
            Self::auto("A2", "Team 1 absence", false, -ABSENCE_AUTO_SCORE),
            Self::auto("A1", "Team 2 absence", true, ABSENCE_AUTO_SCORE),
            Self::auto("F2", "Team 1 serious foul", false, -SERIOUS_FOUL_AUTO_SCORE),
            Self::auto("F1", "Team 2 serious foul", true, SERIOUS_FOUL_AUTO_SCORE),
        ]
    }

    pub fn is_away_win(&self) -> bool {
        !self.is_home_win
    }

    /// Kind of forfeit, for auto end games with a conventional code.
    pub fn forfeit(&self) -> Option<ForfeitKind> {
        if !self.is_auto {
            return None;
        }
        self.code.chars().next().and_then(ForfeitKind::from_code_letter)
    }

    /// Magnitude of the fixed auto score (0 for non-auto types).
    pub fn auto_magnitude(&self) -> i32 {
        self.auto_score.map(i32::abs).unwrap_or(0)
    }

    /// Check the auto-score invariants.
    pub fn validate(&self) -> Result<(), InvalidResult> {
        match (self.is_auto, self.auto_score) {
            (true, None) => Err(InvalidResult::MissingAutoScore(self.code.clone())),
            (false, Some(_)) => Err(InvalidResult::UnexpectedAutoScore(self.code.clone())),
            (true, Some(score))
                if (self.is_home_win && score < 0) || (self.is_away_win() && score > 0) =>
            {
                Err(InvalidResult::AutoScoreSign {
                    code: self.code.clone(),
                    score,
                })
            }
            _ => Ok(()),
        }
    }
}

impl std::fmt::Display for ResultType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description)
    }
}

/// Score with a colon: positive for a home lead, negative for an away lead.
pub fn score_string(score: i32) -> String {
    match score {
        0 => NO_SCORE.to_string(),
        s if s > 0 => format!("{}:0", s),
        s => format!("0:{}", -s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_set_is_valid() {
        let types = ResultType::standard_set();
        assert_eq!(types.len(), 10);
        for rt in &types {
            assert!(rt.validate().is_ok(), "{} should be valid", rt.code);
        }
    }

    #[test]
    fn test_forfeit_kinds() {
        let types = ResultType::standard_set();
        let by_code = |code: &str| types.iter().find(|t| t.code == code).unwrap();

        assert_eq!(by_code("W1").forfeit(), None);
        assert_eq!(by_code("A2").forfeit(), Some(ForfeitKind::Absence));
        assert_eq!(by_code("F1").forfeit(), Some(ForfeitKind::SeriousFoul));
        assert_eq!(by_code("B2").forfeit(), Some(ForfeitKind::Black));
        assert_eq!(by_code("T1").forfeit(), Some(ForfeitKind::Time));
        assert!(by_code("A2").is_away_win());
    }

    #[test]
    fn test_validate_missing_auto_score() {
        let mut rt = ResultType::auto("X1", "custom", true, 3);
        rt.auto_score = None;
        assert_eq!(
            rt.validate(),
            Err(InvalidResult::MissingAutoScore("X1".to_string()))
        );
    }

    #[test]
    fn test_validate_unexpected_auto_score() {
        let mut rt = ResultType::words("W1", "words", true);
        rt.auto_score = Some(2);
        assert!(matches!(
            rt.validate(),
            Err(InvalidResult::UnexpectedAutoScore(_))
        ));
    }

    #[test]
    fn test_validate_auto_score_sign() {
        let rt = ResultType::auto("A1", "bad", true, -8);
        assert!(matches!(
            rt.validate(),
            Err(InvalidResult::AutoScoreSign { score: -8, .. })
        ));
    }

    #[test]
    fn test_score_string() {
        assert_eq!(score_string(0), NO_SCORE);
        assert_eq!(score_string(5), "5:0");
        assert_eq!(score_string(-7), "0:7");
    }

    #[test]
    fn test_result_type_serialization() {
        let rt = ResultType::auto("B1", "Team 2 black lose", true, 4);
        let json = serde_json::to_string(&rt).unwrap();
        let parsed: ResultType = serde_json::from_str(&json).unwrap();
        assert_eq!(rt, parsed);
    }
}
