//! Content-hashed entity IDs.
//!
//! An ID is the SHA-256 of the entity's identifying fields joined by `|`,
//! cut to its first 16 hex digits. Loading the same data twice yields the
//! same IDs, so JSONL files can reference each other by ID.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

const ID_HEX_LEN: usize = 16;
const FIELD_SEPARATOR: &[u8] = b"|";

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Hash the identifying fields of an entity. The first field names the
    /// entity kind so that a player and a team never collide.
    pub fn generate(fields: &[&str]) -> Self {
        let hasher = fields
            .iter()
            .enumerate()
            .fold(Sha256::new(), |hasher, (i, field)| {
                let hasher = if i == 0 {
                    hasher
                } else {
                    hasher.chain_update(FIELD_SEPARATOR)
                };
                hasher.chain_update(field.as_bytes())
            });
        let mut id = hex::encode(hasher.finalize());
        id.truncate(ID_HEX_LEN);
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Wrap a stored ID as is, without hashing.
impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

pub type PlayerId = EntityId;
pub type TeamId = EntityId;
pub type GroupId = EntityId;
pub type ArenaId = EntityId;
pub type GameId = EntityId;
