use super::id::{IdGenerator, SequentialIds, UuidIds};

/// Construction-time settings of a [`super::TreeStore`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TreeConfig {
    /// Hand out sequential ids starting at `sequence` instead of random UUIDs.
    pub test_mode: bool,
    pub sequence: u64,
    /// Title given to created nodes and to records without one.
    pub default_title: String,
    /// Keep an id index for constant time repeated lookups.
    pub indexing: bool,
    /// Fill in missing fields of ingested records. When off, records must be complete.
    pub sanitize_on_walk: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfig {
            test_mode: false,
            sequence: 0,
            default_title: "New node".into(),
            indexing: true,
            sanitize_on_walk: true,
        }
    }
}

impl TreeConfig {
    /// Deterministic configuration: sequential ids from 0.
    pub fn test() -> Self {
        TreeConfig {
            test_mode: true,
            ..Default::default()
        }
    }

    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn with_default_title(mut self, title: impl Into<String>) -> Self {
        self.default_title = title.into();
        self
    }

    pub fn with_indexing(mut self, indexing: bool) -> Self {
        self.indexing = indexing;
        self
    }

    pub fn with_sanitize_on_walk(mut self, sanitize: bool) -> Self {
        self.sanitize_on_walk = sanitize;
        self
    }

    /// The id strategy selected by `test_mode`.
    pub fn id_generator(&self) -> Box<dyn IdGenerator> {
        if self.test_mode {
            Box::new(SequentialIds::starting_at(self.sequence))
        } else {
            Box::new(UuidIds)
        }
    }
}
