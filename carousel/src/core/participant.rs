use helpers::general::InputValueError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// * `id` - Unique identity of the participant within a roster
/// * `payload` - Display data (name, comment, rating, avatar, ...). The engine never looks into
/// it, it is only handed through to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Participant {
    pub fn new(id: impl Into<String>) -> Participant {
        Participant {
            id: id.into(),
            payload: Map::new(),
        }
    }
}

/// Roster is the ordered list of participants taking part in a draw. The order only defines the
/// initial slot assignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    participants: Vec<Participant>,
}

impl Roster {
    pub fn new(participants: Vec<Participant>) -> Roster {
        Roster { participants }
    }

    /// from_ids creates a roster of participants without payload, mostly useful for tests and
    /// demos.
    pub fn from_ids<I, S>(ids: I) -> Roster
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Roster {
            participants: ids.into_iter().map(Participant::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Participant> {
        self.participants.get(idx)
    }

    /// position returns the roster index of the participant with the given id.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.participants.iter().position(|p| p.id == id)
    }

    pub fn as_slice(&self) -> &[Participant] {
        &self.participants
    }

    /// check_unique_ids fails on the first id that appears twice in the roster.
    pub fn check_unique_ids(&self) -> Result<(), InputValueError> {
        let mut seen = HashSet::with_capacity(self.participants.len());

        for participant in self.participants.iter() {
            if !seen.insert(participant.id.as_str()) {
                return Err(InputValueError::new(
                    "roster",
                    format!("participant id {:?} is not unique", participant.id),
                ));
            }
        }
        Ok(())
    }
}

impl From<Vec<Participant>> for Roster {
    fn from(participants: Vec<Participant>) -> Self {
        Roster::new(participants)
    }
}
