//! Ranking engine.
//!
//! Teams start fully tied. Tie-breakers are applied in order; after each one
//! the teams are re-sorted by (shared place, every tie-breaker value so far)
//! and teams whose whole key is equal keep sharing a place. A "between"
//! tie-breaker is scored only over games among the teams still sharing a
//! place, and only once every pair of them has finished its games. It is
//! applied again for as long as it keeps reducing the number of ties.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::debug;

use super::statistics::{Statistic, TeamGames};
use crate::models::TeamId;

const BETWEEN_PREFIX: &str = "optional_";
const BETWEEN_SUFFIX: &str = "_between";
const SEED_NAME: &str = "seed";

/// A tie-breaker name that does not resolve to any known tie-breaker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown tie breaker: {0}")]
pub struct UnknownTieBreaker(pub String);

/// One criterion of the ranking cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TieBreaker {
    /// Statistic over the team's whole schedule
    Overall(Statistic),
    /// Statistic over games among the teams still tied, once they are all played
    Between(Statistic),
    /// Lower seed ranks higher
    Seed,
}

impl TieBreaker {
    pub fn name(&self) -> String {
        match self {
            TieBreaker::Overall(stat) => stat.name().to_string(),
            TieBreaker::Between(stat) => {
                format!("{}{}{}", BETWEEN_PREFIX, stat.name(), BETWEEN_SUFFIX)
            }
            TieBreaker::Seed => SEED_NAME.to_string(),
        }
    }

    pub fn is_between(&self) -> bool {
        matches!(self, TieBreaker::Between(_))
    }

    /// +1 if a larger value ranks a team higher, -1 if lower.
    pub fn weight(&self) -> i64 {
        match self {
            TieBreaker::Overall(stat) | TieBreaker::Between(stat) => stat.weight(),
            TieBreaker::Seed => -1,
        }
    }
}

impl FromStr for TieBreaker {
    type Err = UnknownTieBreaker;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name == SEED_NAME {
            return Ok(TieBreaker::Seed);
        }
        let between = name
            .strip_prefix(BETWEEN_PREFIX)
            .and_then(|rest| rest.strip_suffix(BETWEEN_SUFFIX));
        let parsed = match between {
            Some(stat) => Statistic::from_name(stat).map(TieBreaker::Between),
            None => Statistic::from_name(name).map(TieBreaker::Overall),
        };
        parsed.ok_or_else(|| UnknownTieBreaker(s.to_string()))
    }
}

impl fmt::Display for TieBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Serialize for TieBreaker {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name())
    }
}

/// Resolved, ordered list of tie-breakers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TieBreakerOrder(Vec<TieBreaker>);

/// Names of the default cascade.
pub const DEFAULT_TIE_BREAKERS: [&str; 10] = [
    "won",
    "optional_won_between",
    "absences",
    "serious_fouls",
    "fouls",
    "black_loses",
    "optional_black_loses_between",
    "words_difference",
    "optional_words_difference_between",
    "games_played",
];

impl TieBreakerOrder {
    pub fn new(tie_breakers: Vec<TieBreaker>) -> Self {
        Self(tie_breakers)
    }

    /// Resolve tie-breaker names. Fails on the first unknown name.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, UnknownTieBreaker> {
        names
            .iter()
            .map(|name| name.as_ref().parse())
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    /// Append the seed as the last resolver, unless already present.
    pub fn with_seed(mut self) -> Self {
        if !self.0.contains(&TieBreaker::Seed) {
            self.0.push(TieBreaker::Seed);
        }
        self
    }

    pub fn as_slice(&self) -> &[TieBreaker] {
        &self.0
    }

    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(TieBreaker::name).collect()
    }
}

impl Default for TieBreakerOrder {
    fn default() -> Self {
        Self::from_names(&DEFAULT_TIE_BREAKERS).unwrap_or_else(|_| Self(Vec::new()))
    }
}

/// One team as seen by the engine.
#[derive(Debug, Clone)]
pub struct Contender<'a> {
    pub team: &'a TeamId,
    pub seed: u32,
    pub games: TeamGames<'a>,
}

/// Progress of a ranking computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum RankingState {
    Unranked,
    PartiallyRanked { criteria_applied: usize },
    /// Every team has a place of its own
    FullyRanked,
    /// Tie-breakers ran out with teams still sharing places
    Exhausted,
}

/// Record of one tie-breaker application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingStep {
    pub tie_breaker: TieBreaker,
    pub ties_before: usize,
    pub ties_after: usize,
}

/// A team's final position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RankedEntry {
    /// Index into the contenders passed to [`rank`]
    pub index: usize,
    /// Zero-based place, shared by teams that could not be separated
    pub shared_place: usize,
}

/// Result of a ranking computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ranking {
    /// Entries in rank order
    pub entries: Vec<RankedEntry>,
    pub state: RankingState,
    pub steps: Vec<RankingStep>,
}

impl Ranking {
    /// Number of teams that share a place with an earlier team.
    pub fn ties(&self) -> usize {
        count_ties(self.entries.iter().map(|e| e.shared_place))
    }
}

#[derive(Debug, Clone)]
struct Row {
    index: usize,
    seed: u32,
    keys: Vec<i64>,
    shared_place: usize,
}

impl Row {
    fn key(&self, through: usize) -> (usize, &[i64]) {
        (self.shared_place, &self.keys[..=through])
    }
}

fn count_ties(places: impl Iterator<Item = usize>) -> usize {
    let mut total = 0;
    let mut distinct = HashSet::new();
    for place in places {
        total += 1;
        distinct.insert(place);
    }
    total - distinct.len()
}

/// Rank `contenders` through the tie-breaker cascade.
pub fn rank(contenders: &[Contender<'_>], order: &TieBreakerOrder) -> Ranking {
    let tie_breakers = order.as_slice();

    let mut rows: Vec<Row> = contenders
        .iter()
        .enumerate()
        .map(|(index, c)| Row {
            index,
            seed: c.seed,
            keys: vec![0; tie_breakers.len()],
            shared_place: 0,
        })
        .collect();
    rows.sort_by_key(|row| row.seed);

    let ties = |rows: &[Row]| count_ties(rows.iter().map(|r| r.shared_place));

    let mut state = RankingState::Unranked;
    let mut steps = Vec::new();
    let mut position = 0;

    while position < tie_breakers.len() && ties(&rows) > 0 {
        let tie_breaker = tie_breakers[position];
        let ties_before = ties(&rows);

        match tie_breaker {
            TieBreaker::Overall(stat) => {
                for row in &mut rows {
                    row.keys[position] = stat.weight() * stat.compute(&contenders[row.index].games);
                }
            }
            TieBreaker::Between(stat) => score_between(stat, position, &mut rows, contenders),
            TieBreaker::Seed => {
                for row in &mut rows {
                    row.keys[position] = tie_breaker.weight() * i64::from(row.seed);
                }
            }
        }

        // Higher weighted values first; the stable sort keeps seed order among equals.
        rows.sort_by(|a, b| {
            a.shared_place
                .cmp(&b.shared_place)
                .then_with(|| b.keys[..=position].cmp(&a.keys[..=position]))
        });
        assign_shared_places(&mut rows, position);

        let ties_after = ties(&rows);
        debug!(
            "Applied tie breaker {}: {} ties before, {} after",
            tie_breaker, ties_before, ties_after
        );
        steps.push(RankingStep {
            tie_breaker,
            ties_before,
            ties_after,
        });
        state = RankingState::PartiallyRanked {
            criteria_applied: steps.len(),
        };

        if ties_after == 0 {
            break;
        }
        // A between tie-breaker may split new partitions, so repeat it while it helps.
        if tie_breaker.is_between() && ties_after < ties_before {
            continue;
        }
        position += 1;
    }

    state = if ties(&rows) == 0 {
        RankingState::FullyRanked
    } else {
        debug!("Tie breakers exhausted in state {:?}", state);
        RankingState::Exhausted
    };

    Ranking {
        entries: rows
            .iter()
            .map(|row| RankedEntry {
                index: row.index,
                shared_place: row.shared_place,
            })
            .collect(),
        state,
        steps,
    }
}

fn assign_shared_places(rows: &mut [Row], through: usize) {
    let mut places = vec![0; rows.len()];
    for i in 1..rows.len() {
        places[i] = if rows[i - 1].key(through) == rows[i].key(through) {
            places[i - 1]
        } else {
            i
        };
    }
    for (row, place) in rows.iter_mut().zip(places) {
        row.shared_place = place;
    }
}

/// Score `stat` over games among the members of each tied partition.
/// Partitions with an unfinished or missing pairing score 0.
fn score_between(stat: Statistic, position: usize, rows: &mut [Row], contenders: &[Contender<'_>]) {
    for row in rows.iter_mut() {
        row.keys[position] = 0;
    }

    let mut partitions: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, row) in rows.iter().enumerate() {
        partitions.entry(row.shared_place).or_default().push(i);
    }

    for (place, members) in partitions {
        if members.len() < 2 {
            continue;
        }
        let teams: HashSet<&TeamId> = members
            .iter()
            .map(|&i| contenders[rows[i].index].team)
            .collect();

        let all_finished = members.iter().all(|&i| {
            let contender = &contenders[rows[i].index];
            teams
                .iter()
                .filter(|&&opponent| opponent != contender.team)
                .all(|opponent| pairing_finished(contender, opponent))
        });
        if !all_finished {
            debug!(
                "Skipping {} for place {}: games among tied teams are not finished",
                stat,
                place + 1
            );
            continue;
        }

        for &i in &members {
            let games = contenders[rows[i].index].games.against(&teams);
            rows[i].keys[position] = stat.weight() * stat.compute(&games);
        }
    }
}

/// True when the contender has at least one game against `opponent` and all
/// such games are finished.
fn pairing_finished(contender: &Contender<'_>, opponent: &TeamId) -> bool {
    let mut games = contender
        .games
        .all()
        .filter(|g| g.opponent_of(contender.team) == Some(opponent))
        .peekable();
    games.peek().is_some() && games.all(|g| g.is_finished())
}
