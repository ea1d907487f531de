// ============================================================
// Layer 4 — Entity Type Vocabulary
// ============================================================
// Assigns an integer id to every entity type seen in a training
// file, once as a subject ("subj_") and once as an object
// ("obj_") label:
//
//   {"UNK": 0, "subj_PERSON": 1, "obj_PERSON": 2,
//    "subj_ORGANIZATION": 3, "obj_ORGANIZATION": 4, ...}
//
// Ids follow first-seen order, head type before tail type.
// Both labels of a type are added together, the moment its
// "subj_" label is first missing.
//
// Saved as dataset/type2id.json, keys in id order.

use anyhow::{bail, Context, Result};
use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};
use std::{collections::HashMap, fs, path::Path};

use crate::domain::record::RelationRecord;

pub const UNK_LABEL:      &str = "UNK";
pub const SUBJECT_PREFIX: &str = "subj_";
pub const OBJECT_PREFIX:  &str = "obj_";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "HashMap<String, u32>")]
pub struct TypeVocab {
    ids:   HashMap<String, u32>,
    /// Labels in id order, for serialisation
    order: Vec<String>,
}

impl TypeVocab {
    /// A vocabulary holding only `{"UNK": 0}`
    pub fn new() -> Self {
        let mut vocab = Self { ids: HashMap::new(), order: Vec::new() };
        vocab.push(UNK_LABEL);
        vocab
    }

    /// Build from a training set. The first record decides whether
    /// the dataset is typed at all.
    pub fn build(records: &[RelationRecord]) -> Result<Self> {
        let Some(first) = records.first() else {
            bail!("Cannot build a type vocabulary from an empty dataset");
        };
        if first.h.entity_type.is_none() {
            bail!("There is no type information in this dataset");
        }

        let mut vocab = Self::new();
        for (n, rec) in records.iter().enumerate() {
            for entity in [&rec.h, &rec.t] {
                let ty = entity
                    .entity_type
                    .as_deref()
                    .with_context(|| format!("Record {} has an entity without a type", n + 1))?;
                if !vocab.contains(&subject_label(ty)) {
                    vocab.push(&subject_label(ty));
                    vocab.push(&object_label(ty));
                }
            }
        }

        tracing::info!("Type vocabulary has {} labels", vocab.len());
        Ok(vocab)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Cannot read '{}'", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Bad type vocabulary in '{}'", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string(self)?)
            .with_context(|| format!("Cannot write '{}'", path.display()))
    }

    pub fn get(&self, label: &str) -> Option<u32> {
        self.ids.get(label).copied()
    }

    pub fn subject_id(&self, entity_type: &str) -> Option<u32> {
        self.get(&subject_label(entity_type))
    }

    pub fn object_id(&self, entity_type: &str) -> Option<u32> {
        self.get(&object_label(entity_type))
    }

    pub fn contains(&self, label: &str) -> bool {
        self.ids.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Labels with their ids, in id order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.order.iter().map(|l| (l.as_str(), self.ids[l]))
    }

    fn push(&mut self, label: &str) {
        let id = self.order.len() as u32;
        self.ids.insert(label.to_string(), id);
        self.order.push(label.to_string());
    }
}

impl Default for TypeVocab {
    fn default() -> Self {
        Self::new()
    }
}

impl From<HashMap<String, u32>> for TypeVocab {
    fn from(ids: HashMap<String, u32>) -> Self {
        let mut order: Vec<String> = ids.keys().cloned().collect();
        order.sort_by(|a, b| ids[a].cmp(&ids[b]).then_with(|| a.cmp(b)));
        Self { ids, order }
    }
}

impl Serialize for TypeVocab {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (label, id) in self.iter() {
            map.serialize_entry(label, &id)?;
        }
        map.end()
    }
}

pub fn subject_label(entity_type: &str) -> String {
    format!("{SUBJECT_PREFIX}{entity_type}")
}

pub fn object_label(entity_type: &str) -> String {
    format!("{OBJECT_PREFIX}{entity_type}")
}
