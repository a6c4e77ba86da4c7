//! Derived stanza group index.

use crate::model::{Line, LineId, StanzaId};
use std::collections::HashMap;

/// Map from stanza id to the ids of its member lines.
///
/// Rebuilt from a slide's lines after every committed change, so lookups
/// during pointer and keyboard handling never scan the full line list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupIndex {
    groups: HashMap<StanzaId, Vec<LineId>>,
}

impl GroupIndex {
    /// Index the groups present in `lines`. Member order follows `lines`.
    pub fn build(lines: &[Line]) -> Self {
        let mut groups: HashMap<StanzaId, Vec<LineId>> = HashMap::new();
        for line in lines {
            if let Some(stanza_id) = &line.stanza_id {
                groups
                    .entry(stanza_id.clone())
                    .or_default()
                    .push(line.id.clone());
            }
        }
        Self { groups }
    }

    /// Member line ids of a group (empty for unknown groups).
    pub fn members(&self, stanza_id: &str) -> &[LineId] {
        self.groups.get(stanza_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The group `line` belongs to, if any.
    pub fn group_of(&self, line: &Line) -> Option<&[LineId]> {
        line.stanza_id
            .as_deref()
            .and_then(|stanza_id| self.groups.get(stanza_id))
            .map(Vec::as_slice)
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterate over `(stanza id, members)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&StanzaId, &[LineId])> {
        self.groups.iter().map(|(id, members)| (id, members.as_slice()))
    }
}
