//! Statistic calculators.
//!
//! Each statistic is a pure function of the games where a team played at home
//! and the games where it played away. Scheduled games are ignored by every
//! calculator.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{ForfeitKind, GameResult, TeamId};

/// Named statistic usable as a tie-breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statistic {
    Won,
    GamesPlayed,
    Absences,
    SeriousFouls,
    Fouls,
    BlackLoses,
    WordsDifference,
}

impl Statistic {
    pub const ALL: [Statistic; 7] = [
        Statistic::Won,
        Statistic::GamesPlayed,
        Statistic::Absences,
        Statistic::SeriousFouls,
        Statistic::Fouls,
        Statistic::BlackLoses,
        Statistic::WordsDifference,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Statistic::Won => "won",
            Statistic::GamesPlayed => "games_played",
            Statistic::Absences => "absences",
            Statistic::SeriousFouls => "serious_fouls",
            Statistic::Fouls => "fouls",
            Statistic::BlackLoses => "black_loses",
            Statistic::WordsDifference => "words_difference",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    /// +1 if a larger value ranks a team higher, -1 if lower.
    pub fn weight(&self) -> i64 {
        match self {
            Statistic::Won | Statistic::GamesPlayed | Statistic::WordsDifference => 1,
            Statistic::Absences
            | Statistic::SeriousFouls
            | Statistic::Fouls
            | Statistic::BlackLoses => -1,
        }
    }

    /// Compute this statistic over a team's games.
    pub fn compute(&self, games: &TeamGames<'_>) -> i64 {
        let (home, away) = (games.home.as_slice(), games.away.as_slice());
        match self {
            Statistic::Won => count_won(home, away),
            Statistic::GamesPlayed => count_games_played(home, away),
            Statistic::Absences => count_forfeits(ForfeitKind::Absence, home, away),
            Statistic::SeriousFouls => count_forfeits(ForfeitKind::SeriousFoul, home, away),
            Statistic::Fouls => count_fouls(home, away),
            Statistic::BlackLoses => count_forfeits(ForfeitKind::Black, home, away),
            Statistic::WordsDifference => count_words_difference(home, away),
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The games of one team, split by side.
#[derive(Debug, Clone, Default)]
pub struct TeamGames<'a> {
    pub home: Vec<&'a GameResult>,
    pub away: Vec<&'a GameResult>,
}

impl<'a> TeamGames<'a> {
    pub fn new(home: Vec<&'a GameResult>, away: Vec<&'a GameResult>) -> Self {
        Self { home, away }
    }

    /// Only the games against opponents in `opponents`.
    pub fn against(&self, opponents: &HashSet<&TeamId>) -> TeamGames<'a> {
        TeamGames {
            home: self
                .home
                .iter()
                .copied()
                .filter(|g| opponents.contains(&g.away_team))
                .collect(),
            away: self
                .away
                .iter()
                .copied()
                .filter(|g| opponents.contains(&g.home_team))
                .collect(),
        }
    }

    pub fn all(&self) -> impl Iterator<Item = &'a GameResult> + '_ {
        self.home.iter().chain(self.away.iter()).copied()
    }
}

fn finished<'a>(games: &'a [&'a GameResult]) -> impl Iterator<Item = &'a GameResult> + 'a {
    games.iter().copied().filter(|g| g.is_finished())
}

fn home_won(game: &GameResult) -> bool {
    game.is_won_by(&game.home_team) == Some(true)
}

fn away_won(game: &GameResult) -> bool {
    game.is_won_by(&game.away_team) == Some(true)
}

/// (won, lost) over finished games.
pub fn count_game_results(home: &[&GameResult], away: &[&GameResult]) -> (i64, i64) {
    let home_wins = finished(home).filter(|g| home_won(g)).count();
    let away_wins = finished(away).filter(|g| away_won(g)).count();
    let home_loses = finished(home).filter(|g| away_won(g)).count();
    let away_loses = finished(away).filter(|g| home_won(g)).count();

    ((home_wins + away_wins) as i64, (home_loses + away_loses) as i64)
}

pub fn count_won(home: &[&GameResult], away: &[&GameResult]) -> i64 {
    count_game_results(home, away).0
}

pub fn count_games_played(home: &[&GameResult], away: &[&GameResult]) -> i64 {
    let (won, lost) = count_game_results(home, away);
    won + lost
}

/// Games the team lost by the given kind of forfeit.
pub fn count_forfeits(kind: ForfeitKind, home: &[&GameResult], away: &[&GameResult]) -> i64 {
    let lost_by = |g: &GameResult, home_side: bool| {
        g.result_type
            .as_ref()
            .is_some_and(|rt| rt.forfeit() == Some(kind) && rt.is_home_win != home_side)
    };
    let home_count = finished(home).filter(|g| lost_by(*g, true)).count();
    let away_count = finished(away).filter(|g| lost_by(*g, false)).count();
    (home_count + away_count) as i64
}

/// Fouls conceded by the team itself.
pub fn count_fouls(home: &[&GameResult], away: &[&GameResult]) -> i64 {
    let home_fouls: i64 = finished(home).map(|g| i64::from(g.fouls_of(&g.home_team))).sum();
    let away_fouls: i64 = finished(away).map(|g| i64::from(g.fouls_of(&g.away_team))).sum();
    home_fouls + away_fouls
}

/// Signed word margin. A decisive win adds its margin, any loss subtracts its
/// margin, and an auto-resolved win adds nothing.
pub fn count_words_difference(home: &[&GameResult], away: &[&GameResult]) -> i64 {
    let contribution = |g: &GameResult, won: bool| -> i64 {
        let margin = i64::from(g.absolute_score());
        match (won, g.is_auto()) {
            (true, false) => margin,
            (true, true) => 0,
            (false, _) => -margin,
        }
    };

    let home_total: i64 = finished(home).map(|g| contribution(g, home_won(g))).sum();
    let away_total: i64 = finished(away).map(|g| contribution(g, away_won(g))).sum();
    home_total + away_total
}

/// All statistics of one team over its full schedule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStatistics {
    pub games_played: i64,
    pub won: i64,
    pub lost: i64,
    pub fouls: i64,
    pub absences: i64,
    pub serious_fouls: i64,
    pub black_loses: i64,
    pub words_difference: i64,
}

impl TeamStatistics {
    pub fn from_games(games: &TeamGames<'_>) -> Self {
        let (won, lost) = count_game_results(&games.home, &games.away);
        Self {
            games_played: won + lost,
            won,
            lost,
            fouls: Statistic::Fouls.compute(games),
            absences: Statistic::Absences.compute(games),
            serious_fouls: Statistic::SeriousFouls.compute(games),
            black_loses: Statistic::BlackLoses.compute(games),
            words_difference: Statistic::WordsDifference.compute(games),
        }
    }

    pub fn get(&self, statistic: Statistic) -> i64 {
        match statistic {
            Statistic::Won => self.won,
            Statistic::GamesPlayed => self.games_played,
            Statistic::Absences => self.absences,
            Statistic::SeriousFouls => self.serious_fouls,
            Statistic::Fouls => self.fouls,
            Statistic::BlackLoses => self.black_loses,
            Statistic::WordsDifference => self.words_difference,
        }
    }
}
