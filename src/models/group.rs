//! Cup, group and arena models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ArenaId, EntityId, GroupId};

/// Largest number of teams a round-robin group may hold.
pub const MAX_GROUP_SIZE: u32 = 10;

/// Largest arena number within a group.
pub const MAX_ARENAS_NUMBER: u32 = 10;

/// One edition of the cup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cup {
    pub number: u32,

    pub date: Option<NaiveDate>,

    pub place: Option<String>,
}

impl Cup {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            date: None,
            place: None,
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_place(mut self, place: impl Into<String>) -> Self {
        self.place = Some(place.into());
        self
    }
}

/// "Cup 5", followed by the date and place when known: "Cup 5, 16.03.2024, Moscow".
impl std::fmt::Display for Cup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Cup {}", self.number)?;
        if let Some(date) = self.date {
            write!(f, ", {}", date.format("%d.%m.%Y"))?;
        }
        if let Some(place) = &self.place {
            write!(f, ", {}", place)?;
        }
        Ok(())
    }
}

/// A round-robin pool of teams within a cup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Unique identifier (derived from cup number + name)
    pub id: GroupId,

    /// Cup this group belongs to
    pub cup_number: u32,

    /// Single letter, "A", "B", ...
    pub name: String,
}

impl Group {
    /// Create a new Group with auto-generated ID.
    pub fn new(cup_number: u32, name: String) -> Self {
        let id = EntityId::generate(&["group", &cup_number.to_string(), &name]);
        Self {
            id,
            cup_number,
            name,
        }
    }

    pub fn short(&self) -> &str {
        &self.name
    }

    pub fn long(&self) -> String {
        format!("Cup {}, group {}", self.cup_number, self.name)
    }
}

impl std::fmt::Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.long())
    }
}

/// A table where one game of a round is played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arena {
    /// Unique identifier (derived from group + number)
    pub id: ArenaId,

    pub group_id: GroupId,

    /// Arena number within the group (0..=MAX_ARENAS_NUMBER)
    pub number: u32,

    /// Room name, if the venue has several
    pub room: Option<String>,
}

impl Arena {
    /// Create a new Arena with auto-generated ID.
    pub fn new(group_id: GroupId, number: u32) -> Self {
        let id = EntityId::generate(&["arena", group_id.as_str(), &number.to_string()]);
        Self {
            id,
            group_id,
            number,
            room: None,
        }
    }

    /// Short name: group letter followed by arena number, e.g. "A3".
    pub fn short(&self, group: &Group) -> String {
        format!("{}{}", group.short(), self.number)
    }
}
