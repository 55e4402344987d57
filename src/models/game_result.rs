//! Game model: a scheduled or finished game between two teams of a group.

use serde::{Deserialize, Serialize};

use super::{
    ArenaId, EntityId, GameId, GroupId, InvalidResult, ResultType, TeamId,
    AWAY_TEAM_WORDS_NUMBER, HOME_TEAM_WORDS_NUMBER,
};

/// Persisted form of a game. The result type is referenced by its short code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Unique identifier (derived from group + round + both teams)
    pub id: GameId,

    pub group_id: GroupId,

    pub home_team: TeamId,

    pub away_team: TeamId,

    pub arena_id: Option<ArenaId>,

    /// Zero-based round number
    pub round_number: u32,

    /// Result type code; `None` while the game is scheduled
    #[serde(default)]
    pub result_type: Option<String>,

    /// Home-perspective word lead: 4 is "4:0", -7 is "0:7", 0 for auto end games
    #[serde(default)]
    pub score: i32,

    #[serde(default)]
    pub home_team_fouls: u32,

    #[serde(default)]
    pub away_team_fouls: u32,
}

impl GameRecord {
    /// Create a new scheduled game with auto-generated ID.
    pub fn new(group_id: GroupId, round_number: u32, home_team: TeamId, away_team: TeamId) -> Self {
        let id = EntityId::generate(&[
            "game",
            group_id.as_str(),
            &round_number.to_string(),
            home_team.as_str(),
            away_team.as_str(),
        ]);

        Self {
            id,
            group_id,
            home_team,
            away_team,
            arena_id: None,
            round_number,
            result_type: None,
            score: 0,
            home_team_fouls: 0,
            away_team_fouls: 0,
        }
    }

    /// Builder method to set the arena.
    pub fn with_arena(mut self, arena_id: ArenaId) -> Self {
        self.arena_id = Some(arena_id);
        self
    }

    /// Builder method to record a result.
    pub fn with_result(mut self, code: &str, score: i32) -> Self {
        self.result_type = Some(code.to_string());
        self.score = score;
        self
    }

    /// Builder method to record fouls for both teams.
    pub fn with_fouls(mut self, home: u32, away: u32) -> Self {
        self.home_team_fouls = home;
        self.away_team_fouls = away;
        self
    }

    /// Attach the looked-up result type.
    pub fn resolve(self, result_type: Option<ResultType>) -> GameResult {
        GameResult {
            id: self.id,
            group_id: self.group_id,
            home_team: self.home_team,
            away_team: self.away_team,
            arena_id: self.arena_id,
            round_number: self.round_number,
            result_type,
            score: self.score,
            home_team_fouls: self.home_team_fouls,
            away_team_fouls: self.away_team_fouls,
        }
    }
}

/// A game with its result type resolved, as consumed by the standings engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameResult {
    pub id: GameId,
    pub group_id: GroupId,
    pub home_team: TeamId,
    pub away_team: TeamId,
    pub arena_id: Option<ArenaId>,
    pub round_number: u32,
    pub result_type: Option<ResultType>,
    pub score: i32,
    pub home_team_fouls: u32,
    pub away_team_fouls: u32,
}

impl GameResult {
    pub fn is_finished(&self) -> bool {
        self.result_type.is_some()
    }

    pub fn is_auto(&self) -> bool {
        self.result_type.as_ref().is_some_and(|rt| rt.is_auto)
    }

    /// The other team of the game, if `team` plays in it.
    pub fn opponent_of(&self, team: &TeamId) -> Option<&TeamId> {
        if &self.home_team == team {
            Some(&self.away_team)
        } else if &self.away_team == team {
            Some(&self.home_team)
        } else {
            None
        }
    }

    /// Whether `team` won. `None` while the game is scheduled or `team` is not in it.
    pub fn is_won_by(&self, team: &TeamId) -> Option<bool> {
        let rt = self.result_type.as_ref()?;
        if &self.home_team == team {
            Some(rt.is_home_win)
        } else if &self.away_team == team {
            Some(rt.is_away_win())
        } else {
            None
        }
    }

    /// Word margin of the game: the typed score for regular ends and the fixed
    /// score for auto ends. 0 while scheduled.
    pub fn absolute_score(&self) -> i32 {
        match &self.result_type {
            None => 0,
            Some(rt) if rt.is_auto => rt.auto_magnitude(),
            Some(_) => self.score.abs(),
        }
    }

    /// Home-perspective score used for display.
    pub fn effective_score(&self) -> i32 {
        match &self.result_type {
            None => 0,
            Some(rt) if rt.is_auto => rt.auto_score.unwrap_or(0),
            Some(_) => self.score,
        }
    }

    /// Fouls conceded by `team` in this game.
    pub fn fouls_of(&self, team: &TeamId) -> u32 {
        if &self.home_team == team {
            self.home_team_fouls
        } else if &self.away_team == team {
            self.away_team_fouls
        } else {
            0
        }
    }

    /// Check the score invariants. Scheduled games are always valid.
    pub fn validate(&self) -> Result<(), InvalidResult> {
        let Some(rt) = &self.result_type else {
            return Ok(());
        };
        let game = self.id.to_string();

        if !(-HOME_TEAM_WORDS_NUMBER..=AWAY_TEAM_WORDS_NUMBER).contains(&self.score) {
            return Err(InvalidResult::ScoreOutOfRange {
                game,
                score: self.score,
            });
        }
        if rt.is_auto && self.score != 0 {
            return Err(InvalidResult::ScoreOnAutoResult(game));
        }
        if !rt.is_auto && self.score == 0 {
            return Err(InvalidResult::MissingScore(game));
        }
        if (rt.is_home_win && self.score < 0) || (rt.is_away_win() && self.score > 0) {
            return Err(InvalidResult::ScoreSign {
                game,
                score: self.score,
            });
        }
        Ok(())
    }
}
