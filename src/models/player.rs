//! Player model.

use serde::{Deserialize, Serialize};

use super::{EntityId, PlayerId};

/// A single cup participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Unique identifier (derived from first + last name)
    pub id: PlayerId,

    pub first_name: String,

    pub last_name: String,
}

impl Player {
    /// Create a new Player with auto-generated ID.
    pub fn new(first_name: String, last_name: String) -> Self {
        let id = EntityId::generate(&[
            "player",
            &first_name.to_lowercase(),
            &last_name.to_lowercase(),
        ]);

        Self {
            id,
            first_name,
            last_name,
        }
    }

    /// Short form used in tables, e.g. "Ivanov I.".
    pub fn short(&self) -> String {
        let initial = self
            .first_name
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect::<String>())
            .unwrap_or_default();
        format!("{} {}.", capitalize(&self.last_name), initial)
    }

    /// Long form, e.g. "Ivanov Ivan".
    pub fn long(&self) -> String {
        format!(
            "{} {}",
            capitalize(&self.last_name),
            capitalize(&self.first_name)
        )
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.long())
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_short_and_long() {
        let player = Player::new("ivan".to_string(), "IVANOV".to_string());
        assert_eq!(player.short(), "Ivanov I.");
        assert_eq!(player.long(), "Ivanov Ivan");
        assert_eq!(format!("{}", player), "Ivanov Ivan");
    }

    #[test]
    fn test_player_id_ignores_case() {
        let a = Player::new("Ivan".to_string(), "Ivanov".to_string());
        let b = Player::new("ivan".to_string(), "ivanov".to_string());
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn test_player_empty_first_name() {
        let player = Player::new(String::new(), "Solo".to_string());
        assert_eq!(player.short(), "Solo .");
    }
}
