//! The onboarding draft and its attachment registry.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use uuid::Uuid;

/// Named top-level sections of the onboarding draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionId {
    BasicInfo,
    PersonalInfo,
    ProfessionalInfo,
    Identification,
}

impl SectionId {
    pub fn all() -> &'static [SectionId] {
        &[
            SectionId::BasicInfo,
            SectionId::PersonalInfo,
            SectionId::ProfessionalInfo,
            SectionId::Identification,
        ]
    }

    /// The section's key in the draft (and in dotted field paths).
    pub fn key(self) -> &'static str {
        match self {
            SectionId::BasicInfo => "basicInfo",
            SectionId::PersonalInfo => "personalInfo",
            SectionId::ProfessionalInfo => "professionalInfo",
            SectionId::Identification => "identification",
        }
    }

    pub fn from_key(key: &str) -> Option<SectionId> {
        SectionId::all().iter().copied().find(|s| s.key() == key)
    }
}

/// The full in-progress staff record being built across wizard steps.
///
/// The draft is the single mutable source of truth for the wizard. Its
/// serde shape is exactly the persisted snapshot shape; attachments appear
/// only as references (see [`Attachment`]), never as binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    #[serde(rename = "basicInfo", default)]
    pub basic_info: Value,
    #[serde(rename = "personalInfo", default)]
    pub personal_info: Value,
    #[serde(rename = "professionalInfo", default)]
    pub professional_info: Value,
    #[serde(rename = "identification", default)]
    pub identification: Value,
}

impl Default for Draft {
    fn default() -> Self {
        Self::empty()
    }
}

impl Draft {
    /// The fixed empty-section template used at wizard entry and after a
    /// successful submission.
    pub fn empty() -> Self {
        Self {
            basic_info: Value::Object(Map::new()),
            personal_info: Value::Object(Map::new()),
            professional_info: Value::Object(Map::new()),
            identification: Value::Object(Map::new()),
        }
    }

    pub fn section(&self, id: SectionId) -> &Value {
        match id {
            SectionId::BasicInfo => &self.basic_info,
            SectionId::PersonalInfo => &self.personal_info,
            SectionId::ProfessionalInfo => &self.professional_info,
            SectionId::Identification => &self.identification,
        }
    }

    pub fn section_mut(&mut self, id: SectionId) -> &mut Value {
        match id {
            SectionId::BasicInfo => &mut self.basic_info,
            SectionId::PersonalInfo => &mut self.personal_info,
            SectionId::ProfessionalInfo => &mut self.professional_info,
            SectionId::Identification => &mut self.identification,
        }
    }
}

/// Reference to a binary file attached to a draft field.
///
/// Only this reference is stored in the draft (and therefore persisted);
/// the bytes live in the in-memory [`AttachmentRegistry`] and are
/// reattached by id after a restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: Uuid,
    #[serde(rename = "fileName")]
    pub file_name: String,
}

impl Attachment {
    /// Marker key identifying attachment references inside the draft.
    pub const MARKER: &'static str = "$attachment";

    /// Draft representation: `{"$attachment": "<uuid>", "fileName": "..."}`.
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            Self::MARKER: self.id,
            "fileName": self.file_name,
        })
    }

    pub fn from_value(value: &Value) -> Option<Attachment> {
        let obj = value.as_object()?;
        let id = obj
            .get(Self::MARKER)?
            .as_str()
            .and_then(|s| Uuid::parse_str(s).ok())?;
        let file_name = obj.get("fileName")?.as_str()?.to_string();
        Some(Attachment { id, file_name })
    }
}

/// In-memory store for attachment binaries, keyed by attachment id.
///
/// Never serialized; a restored draft carries dangling references until the
/// frontend reattaches the bytes.
#[derive(Debug, Default)]
pub struct AttachmentRegistry {
    blobs: HashMap<Uuid, Vec<u8>>,
}

impl AttachmentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new binary and hand back the reference for the draft.
    pub fn register(&mut self, file_name: impl Into<String>, bytes: Vec<u8>) -> Attachment {
        let attachment = Attachment {
            id: Uuid::new_v4(),
            file_name: file_name.into(),
        };
        self.blobs.insert(attachment.id, bytes);
        attachment
    }

    /// Reattach bytes for a reference restored from a persisted draft.
    pub fn reattach(&mut self, id: Uuid, bytes: Vec<u8>) {
        self.blobs.insert(id, bytes);
    }

    pub fn bytes(&self, id: Uuid) -> Option<&[u8]> {
        self.blobs.get(&id).map(Vec::as_slice)
    }

    pub fn remove(&mut self, id: Uuid) {
        self.blobs.remove(&id);
    }

    pub fn clear(&mut self) {
        self.blobs.clear();
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}
