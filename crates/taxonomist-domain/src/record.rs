//! Classification record module - one flat taxonomy position reported by the model

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Number of hierarchy levels requested from the model for every record
pub const LEVEL_COUNT: usize = 7;

/// Placeholder key used wherever a hierarchy level is absent
pub const ABSENT_LABEL: &str = "null";

/// Wire names of the hierarchy levels, in order
pub const LEVEL_KEYS: [&str; LEVEL_COUNT] = [
    "Level 1", "Level 2", "Level 3", "Level 4", "Level 5", "Level 6", "Level 7",
];

/// Wire name of the free-text comment field
pub const COMMENT_KEY: &str = "Comment";

/// A single hierarchy label, or the explicit absent marker
///
/// The model is asked to emit `null` for levels that do not apply. Missing keys
/// and falsy values (`null`, `""`, `false`, zero, empty arrays and objects) all
/// normalize to [`Label::Absent`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Label {
    /// A label supplied by the model
    Present(String),
    /// No label at this level
    #[default]
    Absent,
}

impl Label {
    /// Create a label from text; empty text becomes [`Label::Absent`]
    ///
    /// # Examples
    ///
    /// ```
    /// use taxonomist_domain::Label;
    ///
    /// assert_eq!(Label::new("Materials").as_key(), "Materials");
    /// assert!(Label::new("").is_absent());
    /// ```
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            Label::Absent
        } else {
            Label::Present(text)
        }
    }

    /// Read a label permissively from a decoded JSON value
    ///
    /// Falsy values are absent. Other non-string values keep their JSON text
    /// (`3` becomes `"3"`).
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null | Value::Bool(false) => Label::Absent,
            Value::Number(n) if n.as_f64() == Some(0.0) => Label::Absent,
            Value::Array(items) if items.is_empty() => Label::Absent,
            Value::Object(map) if map.is_empty() => Label::Absent,
            Value::String(s) => Label::new(s.as_str()),
            other => Label::new(other.to_string()),
        }
    }

    /// Key used for this label when nesting the taxonomy tree
    pub fn as_key(&self) -> &str {
        match self {
            Label::Present(text) => text,
            Label::Absent => ABSENT_LABEL,
        }
    }

    /// The label text, if present
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Label::Present(text) => Some(text),
            Label::Absent => None,
        }
    }

    /// Whether this is the absent marker
    pub fn is_absent(&self) -> bool {
        matches!(self, Label::Absent)
    }
}

impl From<&str> for Label {
    fn from(text: &str) -> Self {
        Label::new(text)
    }
}

impl From<Option<String>> for Label {
    fn from(text: Option<String>) -> Self {
        text.map(Label::new).unwrap_or(Label::Absent)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_key())
    }
}

impl Serialize for Label {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Label::Present(text) => serializer.serialize_str(text),
            Label::Absent => serializer.serialize_none(),
        }
    }
}

/// One flat classification entry: seven ordered levels plus a comment
///
/// Records are immutable once created. They are produced by the response
/// parser and consumed by the taxonomy merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRecord {
    levels: [Label; LEVEL_COUNT],
    comment: Option<String>,
}

impl ClassificationRecord {
    /// Create a record from all seven levels and a comment
    pub fn new(levels: [Label; LEVEL_COUNT], comment: Option<String>) -> Self {
        Self { levels, comment }
    }

    /// Create a record from a leading path of labels
    ///
    /// Levels beyond the supplied path are absent; labels past the seventh are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use taxonomist_domain::ClassificationRecord;
    ///
    /// let record = ClassificationRecord::from_path(&["Materials", "Composites"], Some("c1"));
    /// assert_eq!(record.level(1).as_key(), "Composites");
    /// assert!(record.level(2).is_absent());
    /// ```
    pub fn from_path(path: &[&str], comment: Option<&str>) -> Self {
        let levels =
            std::array::from_fn(|i| path.get(i).map(|s| Label::new(*s)).unwrap_or_default());
        Self::new(levels, comment.map(str::to_string))
    }

    /// All seven levels in order
    pub fn levels(&self) -> &[Label; LEVEL_COUNT] {
        &self.levels
    }

    /// Level at a zero-based index
    ///
    /// # Panics
    ///
    /// Panics if `index >= LEVEL_COUNT`.
    pub fn level(&self, index: usize) -> &Label {
        &self.levels[index]
    }

    /// The free-text comment, if one was supplied
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}

impl Serialize for ClassificationRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(LEVEL_COUNT + 1))?;
        for (key, label) in LEVEL_KEYS.iter().zip(self.levels.iter()) {
            map.serialize_entry(key, label)?;
        }
        map.serialize_entry(COMMENT_KEY, &self.comment)?;
        map.end()
    }
}

/// Wire shape of a record as the model emits it
#[derive(Deserialize)]
struct WireRecord {
    #[serde(rename = "Level 1", alias = "Level1", default)]
    level1: Value,
    #[serde(rename = "Level 2", alias = "Level2", default)]
    level2: Value,
    #[serde(rename = "Level 3", alias = "Level3", default)]
    level3: Value,
    #[serde(rename = "Level 4", alias = "Level4", default)]
    level4: Value,
    #[serde(rename = "Level 5", alias = "Level5", default)]
    level5: Value,
    #[serde(rename = "Level 6", alias = "Level6", default)]
    level6: Value,
    #[serde(rename = "Level 7", alias = "Level7", default)]
    level7: Value,
    #[serde(rename = "Comment", alias = "comment", default)]
    comment: Value,
}

impl From<WireRecord> for ClassificationRecord {
    fn from(wire: WireRecord) -> Self {
        let levels = [
            &wire.level1,
            &wire.level2,
            &wire.level3,
            &wire.level4,
            &wire.level5,
            &wire.level6,
            &wire.level7,
        ]
        .map(Label::from_json);

        let comment = match wire.comment {
            Value::Null => None,
            Value::String(text) => Some(text),
            other => Some(other.to_string()),
        };

        Self { levels, comment }
    }
}

impl<'de> Deserialize<'de> for ClassificationRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        WireRecord::deserialize(deserializer).map(Self::from)
    }
}
