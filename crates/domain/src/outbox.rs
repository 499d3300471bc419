use crate::shared::entity::ID;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutboxKind {
    Created,
    Updated,
    Cancelled,
}

impl OutboxKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Updated => "UPDATED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl Display for OutboxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutboxKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATED" => Ok(Self::Created),
            "UPDATED" => Ok(Self::Updated),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(format!("Unknown outbox kind: {}", other)),
        }
    }
}

/// An append-only notice that a `UnitEvent` changed and downstream
/// consumers should be told about it. Never mutated once written, the
/// delivery state lives in the job queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboxRecord {
    /// Store assigned and strictly increasing, used as replay cursor
    pub id: i64,
    pub unit_id: ID,
    pub event_id: ID,
    pub kind: OutboxKind,
    pub created_at: i64,
}

/// An `OutboxRecord` before the store has assigned its id
#[derive(Debug, Clone, PartialEq)]
pub struct NewOutboxRecord {
    pub unit_id: ID,
    pub event_id: ID,
    pub kind: OutboxKind,
    pub created_at: i64,
}

impl NewOutboxRecord {
    pub fn into_record(self, id: i64) -> OutboxRecord {
        OutboxRecord {
            id,
            unit_id: self.unit_id,
            event_id: self.event_id,
            kind: self.kind,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_string_representation_is_stable() {
        for kind in [OutboxKind::Created, OutboxKind::Updated, OutboxKind::Cancelled] {
            assert_eq!(kind.as_str().parse::<OutboxKind>(), Ok(kind));
        }
        assert!("DELETED".parse::<OutboxKind>().is_err());
    }
}
