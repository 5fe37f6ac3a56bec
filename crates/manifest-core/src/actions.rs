//! The merger's action log

use crate::key::NodeKey;
use crate::location::SourceFilePosition;
use serde::{Deserialize, Serialize};

/// What the merger did to a node or attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionType {
    Added,
    Injected,
    Merged,
    Rejected,
    Implied,
    Converted,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Added => "ADDED",
            Self::Injected => "INJECTED",
            Self::Merged => "MERGED",
            Self::Rejected => "REJECTED",
            Self::Implied => "IMPLIED",
            Self::Converted => "CONVERTED",
        };
        f.write_str(name)
    }
}

/// One logged decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub target_key: NodeKey,
    /// Qualified attribute name for attribute records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    pub action_type: ActionType,
    pub location: SourceFilePosition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Record {
    pub fn node(
        key: impl Into<NodeKey>,
        action_type: ActionType,
        location: SourceFilePosition,
    ) -> Self {
        Self {
            target_key: key.into(),
            attribute: None,
            action_type,
            location,
            reason: None,
        }
    }

    pub fn attribute(
        key: impl Into<NodeKey>,
        attribute: impl Into<String>,
        action_type: ActionType,
        location: SourceFilePosition,
    ) -> Self {
        Self {
            attribute: Some(attribute.into()),
            ..Self::node(key, action_type, location)
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Record lookup by key. Results keep the merger's chronological order.
pub trait ActionIndex {
    /// Records about the element itself.
    fn node_records(&self, key: &NodeKey) -> Vec<&Record>;

    /// Records about one attribute of the element.
    fn attribute_records(&self, key: &NodeKey, attribute: &str) -> Vec<&Record>;
}

/// Append-only list of records in the order the merger produced them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Actions {
    records: Vec<Record>,
}

impl Actions {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ActionIndex for Actions {
    fn node_records(&self, key: &NodeKey) -> Vec<&Record> {
        self.records
            .iter()
            .filter(|record| record.attribute.is_none() && &record.target_key == key)
            .collect()
    }

    fn attribute_records(&self, key: &NodeKey, attribute: &str) -> Vec<&Record> {
        self.records
            .iter()
            .filter(|record| {
                &record.target_key == key && record.attribute.as_deref() == Some(attribute)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use manifest_xml::SourcePosition;

    fn at(line: usize) -> SourceFilePosition {
        SourceFilePosition::new("AndroidManifest.xml", SourcePosition::point(line, 1))
    }

    #[test]
    fn node_and_attribute_records_are_separate() {
        let key = NodeKey::new("activity#.Main");
        let actions = Actions::new(vec![
            Record::node(key.clone(), ActionType::Added, at(1)),
            Record::attribute(key.clone(), "android:label", ActionType::Added, at(2)),
            Record::node(key.clone(), ActionType::Merged, at(3)),
            Record::node("activity#.Other", ActionType::Added, at(4)),
        ]);

        let nodes = actions.node_records(&key);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[1].action_type, ActionType::Merged);

        let attrs = actions.attribute_records(&key, "android:label");
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].location, at(2));
        assert!(actions.attribute_records(&key, "android:icon").is_empty());
    }

    #[test]
    fn action_types_serialize_uppercase() {
        let json = serde_json::to_string(&ActionType::Injected).unwrap();
        assert_eq!(json, "\"INJECTED\"");
    }
}
