//! Team model: an ordered pair of players.

use serde::{Deserialize, Serialize};

use super::{EntityId, GroupId, Player, PlayerId, TeamId};

/// A team of two players competing in one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Unique identifier (derived from both player IDs)
    pub id: TeamId,

    pub first_player: PlayerId,

    pub second_player: PlayerId,

    /// Group the team was drawn into
    pub group_id: Option<GroupId>,

    /// Position within the group, unique in `[0, group size)`
    pub seed: Option<u32>,

    #[serde(default)]
    pub is_paid: bool,

    #[serde(default)]
    pub has_come: Option<bool>,
}

impl Team {
    /// Create a new Team with auto-generated ID.
    pub fn new(first_player: PlayerId, second_player: PlayerId) -> Self {
        let id = EntityId::generate(&["team", first_player.as_str(), second_player.as_str()]);

        Self {
            id,
            first_player,
            second_player,
            group_id: None,
            seed: None,
            is_paid: false,
            has_come: None,
        }
    }

    /// Builder method to place the team in a group with a seed.
    pub fn in_group(mut self, group_id: GroupId, seed: u32) -> Self {
        self.group_id = Some(group_id);
        self.seed = Some(seed);
        self
    }

    /// Display name, e.g. "Ivanov I./Petrov P.".
    pub fn short_name(first: &Player, second: &Player) -> String {
        format!("{}/{}", first.short(), second.short())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_creation() {
        let first = Player::new("Ivan".to_string(), "Ivanov".to_string());
        let second = Player::new("Petr".to_string(), "Petrov".to_string());
        let team = Team::new(first.id.clone(), second.id.clone());

        assert_eq!(team.first_player, first.id);
        assert!(team.group_id.is_none());
        assert!(team.seed.is_none());
        assert_eq!(Team::short_name(&first, &second), "Ivanov I./Petrov P.");
    }

    #[test]
    fn test_team_id_is_ordered() {
        let a = EntityId::from("a");
        let b = EntityId::from("b");
        assert_ne!(Team::new(a.clone(), b.clone()).id, Team::new(b, a).id);
    }

    #[test]
    fn test_team_in_group() {
        let team = Team::new(EntityId::from("a"), EntityId::from("b"))
            .in_group(EntityId::from("group-a"), 3);
        assert_eq!(team.seed, Some(3));
        assert_eq!(team.group_id, Some(EntityId::from("group-a")));
    }

    #[test]
    fn test_team_deserializes_without_optional_flags() {
        let json = r#"{"id":"t1","first_player":"p1","second_player":"p2","group_id":null,"seed":2}"#;
        let team: Team = serde_json::from_str(json).unwrap();
        assert_eq!(team.seed, Some(2));
        assert!(!team.is_paid);
        assert_eq!(team.has_come, None);
    }
}
