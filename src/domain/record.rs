// ============================================================
// Layer 3 — Relation Record Domain Types
// ============================================================
// One JSON line of a relation-extraction corpus looks like:
//
//   {"token": ["Bill", "Gates", "founded", "Microsoft", "."],
//    "h": {"name": "Bill Gates", "pos": [0, 2], "type": "PERSON"},
//    "t": {"name": "Microsoft",  "pos": [3, 4], "type": "ORGANIZATION"},
//    "relation": "org:founded_by"}
//
// Fields we don't model are kept in `extra` so that a record
// read and written back (e.g. by the sampler) is unchanged.
//
// Reference: Rust Book §5 (Structs)
//            serde documentation (flatten)

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::span::EntitySpan;

/// One entity of a relation instance (head or tail).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMention {
    /// Surface form as written in the corpus, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Raw-token span of the mention
    pub pos: EntitySpan,

    /// Coarse entity type (e.g. "PERSON"); absent in untyped corpora
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EntityMention {
    pub fn new(pos: impl Into<EntitySpan>) -> Self {
        Self {
            name:        None,
            pos:         pos.into(),
            entity_type: None,
            extra:       Map::new(),
        }
    }

    pub fn with_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }
}

/// A labelled relation instance: a tokenized sentence, two
/// entity mentions and the relation between them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationRecord {
    /// Raw word tokens of the sentence
    pub token: Vec<String>,

    /// Head entity
    pub h: EntityMention,

    /// Tail entity
    pub t: EntityMention,

    /// Relation label, e.g. "org:founded_by" or "no_relation"
    pub relation: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RelationRecord {
    pub fn new(
        token:    Vec<String>,
        h:        EntityMention,
        t:        EntityMention,
        relation: impl Into<String>,
    ) -> Self {
        Self {
            token,
            h,
            t,
            relation: relation.into(),
            extra:    Map::new(),
        }
    }
}

/// A relation instance after entity marking: ready-to-feed ids
/// plus the positions of the four marker tokens in `input_ids`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkedExample {
    pub input_ids: Vec<u32>,
    pub h_start:   usize,
    pub h_end:     usize,
    pub t_start:   usize,
    pub t_end:     usize,
    pub relation:  String,
}
