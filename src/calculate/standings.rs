//! Group standings: statistics, places and head-to-head results per team.

use serde::Serialize;
use tracing::debug;

use super::ranking::{rank, Contender, RankingState, RankingStep, TieBreakerOrder};
use super::statistics::{TeamGames, TeamStatistics};
use crate::models::{GameResult, GroupId, ResultType, Team, TeamId};

/// Read access to one consistent snapshot of cup data.
pub trait GroupSource {
    /// Teams of the group. Each carries a unique seed in `[0, n)`.
    fn teams(&self, group: &GroupId) -> Vec<&Team>;

    fn games_where_team_is_home(&self, team: &TeamId, group: &GroupId) -> Vec<&GameResult>;

    fn games_where_team_is_away(&self, team: &TeamId, group: &GroupId) -> Vec<&GameResult>;

    /// Look up a result type by its short code.
    fn result_type(&self, code: &str) -> Option<&ResultType>;

    /// Display name of a team.
    fn team_name(&self, team: &Team) -> String;
}

/// The game between a team and one opponent, seen from the team's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum HeadToHead {
    /// Diagonal of the table
    Itself,
    /// No game between the two teams
    NotScheduled,
    Game { game: GameResult, is_home: bool },
}

/// One line of the standings.
#[derive(Debug, Clone, Serialize)]
pub struct StandingsRow {
    pub team: Team,
    pub name: String,
    pub seed: u32,
    /// Position of the team in seed order; indexes every row's `opponents`
    pub slot: usize,
    /// One-based place, shared by teams that could not be separated
    pub place: usize,
    pub statistics: TeamStatistics,
    /// Results against every team of the group, indexed by opponent slot
    pub opponents: Vec<HeadToHead>,
}

/// Ordered standings of a group.
#[derive(Debug, Clone, Serialize)]
pub struct Standings {
    pub group_id: GroupId,
    pub state: RankingState,
    pub steps: Vec<RankingStep>,
    /// Rows in rank order
    pub rows: Vec<StandingsRow>,
}

impl Standings {
    /// Row of the team with the given seed.
    pub fn by_seed(&self, seed: u32) -> Option<&StandingsRow> {
        self.rows.iter().find(|row| row.seed == seed)
    }
}

/// Compute the standings of a group from a data snapshot.
pub fn compute_standings<S: GroupSource + ?Sized>(
    source: &S,
    group: &GroupId,
    order: &TieBreakerOrder,
) -> Standings {
    let mut teams = source.teams(group);
    teams.sort_by_key(|t| t.seed);
    let group_size = teams.len();

    let contenders: Vec<Contender<'_>> = teams
        .iter()
        .map(|team| Contender {
            team: &team.id,
            seed: team.seed.unwrap_or(u32::MAX),
            games: TeamGames::new(
                source.games_where_team_is_home(&team.id, group),
                source.games_where_team_is_away(&team.id, group),
            ),
        })
        .collect();

    let ranking = rank(&contenders, order);
    debug!(
        "Ranked {} teams of group {} in {} steps: {:?}",
        group_size,
        group,
        ranking.steps.len(),
        ranking.state
    );

    let rows = ranking
        .entries
        .iter()
        .map(|entry| {
            let team = teams[entry.index];
            let contender = &contenders[entry.index];
            StandingsRow {
                team: team.clone(),
                name: source.team_name(team),
                seed: contender.seed,
                slot: entry.index,
                place: entry.shared_place + 1,
                statistics: TeamStatistics::from_games(&contender.games),
                opponents: head_to_head_row(contender, &teams),
            }
        })
        .collect();

    Standings {
        group_id: group.clone(),
        state: ranking.state,
        steps: ranking.steps,
        rows,
    }
}

/// Results against each team of the group, in seed order.
fn head_to_head_row(contender: &Contender<'_>, teams_by_seed: &[&Team]) -> Vec<HeadToHead> {
    let mut row: Vec<HeadToHead> = teams_by_seed
        .iter()
        .map(|t| {
            if &t.id == contender.team {
                HeadToHead::Itself
            } else {
                HeadToHead::NotScheduled
            }
        })
        .collect();

    let sides = contender
        .games
        .home
        .iter()
        .map(|g| (*g, true))
        .chain(contender.games.away.iter().map(|g| (*g, false)));

    for (game, is_home) in sides {
        let Some(opponent) = game.opponent_of(contender.team) else {
            continue;
        };
        if let Some(slot) = teams_by_seed.iter().position(|t| &t.id == opponent) {
            row[slot] = HeadToHead::Game {
                game: game.clone(),
                is_home,
            };
        }
    }

    row
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{EntityId, GameRecord, Group, Player};
    use pretty_assertions::assert_eq;

    /// In-memory source for a single group.
    pub(crate) struct MemorySource {
        pub group: Group,
        pub teams: Vec<Team>,
        pub games: Vec<GameResult>,
        pub result_types: Vec<ResultType>,
    }

    impl MemorySource {
        pub(crate) fn new(team_names: &[&str]) -> Self {
            let group = Group::new(5, "A".to_string());
            let teams = team_names
                .iter()
                .enumerate()
                .map(|(seed, name)| {
                    let first = Player::new(name.to_string(), "First".to_string());
                    let second = Player::new(name.to_string(), "Second".to_string());
                    let mut team = Team::new(first.id, second.id).in_group(group.id.clone(), seed as u32);
                    team.id = EntityId::from(*name);
                    team
                })
                .collect();
            Self {
                group,
                teams,
                games: Vec::new(),
                result_types: ResultType::standard_set(),
            }
        }

        pub(crate) fn play(&mut self, round: u32, home: &str, away: &str, code: Option<&str>, score: i32) {
            let record = GameRecord::new(
                self.group.id.clone(),
                round,
                EntityId::from(home),
                EntityId::from(away),
            );
            let record = match code {
                Some(code) => record.with_result(code, score),
                None => record,
            };
            let result_type = code.and_then(|c| self.result_type(c).cloned());
            self.games.push(record.resolve(result_type));
        }
    }

    impl GroupSource for MemorySource {
        fn teams(&self, group: &GroupId) -> Vec<&Team> {
            self.teams
                .iter()
                .filter(|t| t.group_id.as_ref() == Some(group))
                .collect()
        }

        fn games_where_team_is_home(&self, team: &TeamId, group: &GroupId) -> Vec<&GameResult> {
            self.games
                .iter()
                .filter(|g| &g.group_id == group && &g.home_team == team)
                .collect()
        }

        fn games_where_team_is_away(&self, team: &TeamId, group: &GroupId) -> Vec<&GameResult> {
            self.games
                .iter()
                .filter(|g| &g.group_id == group && &g.away_team == team)
                .collect()
        }

        fn result_type(&self, code: &str) -> Option<&ResultType> {
            self.result_types.iter().find(|rt| rt.code == code)
        }

        fn team_name(&self, team: &Team) -> String {
            team.id.to_string()
        }
    }

    fn names_and_places(standings: &Standings) -> Vec<(String, usize)> {
        standings
            .rows
            .iter()
            .map(|r| (r.name.clone(), r.place))
            .collect()
    }

    #[test]
    fn test_standings_order_and_statistics() {
        let mut source = MemorySource::new(&["a", "b", "c"]);
        source.play(0, "a", "b", Some("W1"), 5);
        source.play(1, "c", "a", Some("A2"), 0);
        source.play(2, "b", "c", None, 0);
        let group = source.group.id.clone();

        let standings = compute_standings(&source, &group, &TieBreakerOrder::default());

        assert_eq!(
            names_and_places(&standings),
            vec![
                ("a".to_string(), 1),
                ("b".to_string(), 2),
                ("c".to_string(), 3)
            ]
        );
        let a = standings.by_seed(0).unwrap();
        assert_eq!(a.statistics.won, 2);
        assert_eq!(a.statistics.words_difference, 5);
        let c = standings.by_seed(2).unwrap();
        assert_eq!(c.statistics.absences, 1);
        assert_eq!(c.statistics.words_difference, -8);
        assert_eq!(standings.state, RankingState::FullyRanked);
    }

    #[test]
    fn test_completeness_invariant() {
        let mut source = MemorySource::new(&["a", "b", "c", "d"]);
        source.play(0, "a", "b", Some("W1"), 2);
        source.play(0, "c", "d", Some("B1"), 0);
        source.play(1, "a", "c", Some("W2"), -1);
        source.play(1, "b", "d", None, 0);
        let group = source.group.id.clone();

        let standings = compute_standings(&source, &group, &TieBreakerOrder::default());
        let n = standings.rows.len() as i64;
        for row in &standings.rows {
            assert_eq!(row.statistics.won + row.statistics.lost, row.statistics.games_played);
            assert!(row.statistics.games_played <= n - 1);
        }
    }

    #[test]
    fn test_head_to_head_row_is_indexed_by_seed() {
        let mut source = MemorySource::new(&["a", "b", "c"]);
        source.play(0, "a", "b", Some("W1"), 5);
        source.play(1, "c", "a", None, 0);
        let group = source.group.id.clone();

        let standings = compute_standings(&source, &group, &TieBreakerOrder::default());
        let a = standings.by_seed(0).unwrap();

        assert_eq!(a.opponents.len(), 3);
        assert_eq!(a.opponents[0], HeadToHead::Itself);
        assert!(matches!(
            &a.opponents[1],
            HeadToHead::Game { is_home: true, game } if game.is_finished()
        ));
        assert!(matches!(
            &a.opponents[2],
            HeadToHead::Game { is_home: false, game } if !game.is_finished()
        ));

        let b = standings.by_seed(1).unwrap();
        assert_eq!(b.opponents[2], HeadToHead::NotScheduled);
    }

    #[test]
    fn test_head_to_head_with_sparse_seeds() {
        let mut source = MemorySource::new(&["a", "b", "c"]);
        source.teams[1].seed = Some(4);
        source.teams[2].seed = Some(7);
        source.play(0, "c", "a", Some("W1"), 2);
        let group = source.group.id.clone();

        let standings = compute_standings(&source, &group, &TieBreakerOrder::default());
        let c = standings.by_seed(7).unwrap();

        assert_eq!(c.slot, 2);
        assert_eq!(c.opponents[2], HeadToHead::Itself);
        assert!(matches!(
            &c.opponents[0],
            HeadToHead::Game { is_home: true, .. }
        ));
        assert_eq!(c.opponents[1], HeadToHead::NotScheduled);
    }

    #[test]
    fn test_standings_are_idempotent() {
        let mut source = MemorySource::new(&["a", "b", "c", "d"]);
        source.play(0, "a", "b", Some("W1"), 3);
        source.play(0, "c", "d", Some("W1"), 3);
        source.play(1, "b", "c", Some("W1"), 3);
        source.play(1, "d", "a", Some("W1"), 3);
        let group = source.group.id.clone();
        let order = TieBreakerOrder::default();

        let first = compute_standings(&source, &group, &order);
        let second = compute_standings(&source, &group, &order);
        assert_eq!(names_and_places(&first), names_and_places(&second));
        assert_eq!(first.state, second.state);
    }

    #[test]
    fn test_other_groups_are_ignored() {
        let mut source = MemorySource::new(&["a", "b"]);
        let other = Group::new(5, "B".to_string());
        source.play(0, "a", "b", Some("W1"), 2);
        source.games[0].group_id = other.id.clone();
        let group = source.group.id.clone();

        let standings = compute_standings(&source, &group, &TieBreakerOrder::default());
        assert!(standings.rows.iter().all(|r| r.statistics.games_played == 0));
        assert_eq!(standings.state, RankingState::Exhausted);
    }
}
