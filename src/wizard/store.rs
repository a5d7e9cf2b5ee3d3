//! The form state store - sole owner of the draft.
//!
//! Every mutation goes through here; each successful mutation persists the
//! new draft snapshot best-effort. Mutations are total: bad inputs degrade
//! to logged no-ops, never errors.

use serde_json::{Map, Value};
use std::sync::{Arc, Mutex};

use super::draft::{Attachment, AttachmentRegistry, Draft, SectionId};
use super::path::{self, FieldPath};
use super::persist::DraftStore;
use super::rules::{self, FieldErrors};
use super::steps::StepId;

/// Store handle shared between the frontend and the submission pipeline.
/// The lock is never held across an await point.
pub type SharedStore = Arc<Mutex<OnboardingStore>>;

/// The first step that failed a full-wizard validation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct StepValidationFailure {
    pub step: StepId,
    pub errors: FieldErrors,
}

pub struct OnboardingStore {
    draft: Draft,
    errors: FieldErrors,
    is_loading: bool,
    is_submitted: bool,
    /// Bumped whenever the active draft is replaced (reset, successful
    /// submission), so in-flight work can detect it is stale.
    generation: u64,
    drafts: DraftStore,
    attachments: AttachmentRegistry,
}

impl OnboardingStore {
    /// Create the store, restoring a persisted draft when one exists.
    pub fn new(drafts: DraftStore) -> Self {
        let draft = drafts.restore().unwrap_or_else(Draft::empty);
        Self {
            draft,
            errors: FieldErrors::new(),
            is_loading: false,
            is_submitted: false,
            generation: 0,
            drafts,
            attachments: AttachmentRegistry::new(),
        }
    }

    pub fn into_shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_submitted(&self) -> bool {
        self.is_submitted
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Look up the validation message for a dotted field path.
    pub fn field_error(&self, dotted_path: &str) -> Option<&str> {
        self.errors.get(dotted_path).map(String::as_str)
    }

    pub fn attachments(&self) -> &AttachmentRegistry {
        &self.attachments
    }

    pub fn attachments_mut(&mut self) -> &mut AttachmentRegistry {
        &mut self.attachments
    }

    // ─── Mutations ──────────────────────────────────────────────────────────

    /// Shallow-merge `fields` into a section: specified fields are fully
    /// replaced, unspecified fields are untouched.
    pub fn update_section(&mut self, section: SectionId, fields: Map<String, Value>) {
        let target = self.draft.section_mut(section);
        if !target.is_object() {
            *target = Value::Object(Map::new());
        }
        if let Some(map) = target.as_object_mut() {
            for (key, value) in fields {
                map.insert(key, value);
            }
        }
        self.persist();
    }

    /// Set the leaf at a dotted path, creating intermediate containers.
    pub fn set_field(&mut self, field_path: &FieldPath, value: Value) {
        let Some(section) = self.section_of(field_path) else {
            return;
        };
        path::set_value(
            self.draft.section_mut(section),
            field_path.within_section(),
            value,
        );
        self.persist();
    }

    /// Register a binary and place its reference at the given path.
    pub fn attach_file(
        &mut self,
        field_path: &FieldPath,
        file_name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Option<Attachment> {
        let section = self.section_of(field_path)?;
        let attachment = self.attachments.register(file_name, bytes);
        path::set_value(
            self.draft.section_mut(section),
            field_path.within_section(),
            attachment.to_value(),
        );
        self.persist();
        Some(attachment)
    }

    /// Remove the attachment reference at the given path and drop its bytes.
    pub fn remove_attachment(&mut self, field_path: &FieldPath) {
        let Some(section) = self.section_of(field_path) else {
            return;
        };
        let segments = field_path.within_section();
        if let Some(attachment) =
            path::get_value(self.draft.section(section), segments).and_then(Attachment::from_value)
        {
            self.attachments.remove(attachment.id);
        }
        path::remove_value(self.draft.section_mut(section), segments);
        self.persist();
    }

    /// Append an item to the list at a dotted path, creating the list when
    /// absent.
    pub fn add_list_item(&mut self, list_path: &FieldPath, item: Value) {
        let Some(section) = self.section_of(list_path) else {
            return;
        };
        let segments = list_path.within_section();
        let target = self.draft.section_mut(section);
        match path::get_value(target, segments).and_then(Value::as_array).cloned() {
            Some(mut items) => {
                items.push(item);
                path::set_value(target, segments, Value::Array(items));
            }
            None => {
                path::set_value(target, segments, Value::Array(vec![item]));
            }
        }
        self.persist();
    }

    /// Remove index `k` from the list at a dotted path; later items shift
    /// down by one, earlier items keep identity and position. Out-of-bounds
    /// is a no-op.
    pub fn remove_list_item(&mut self, list_path: &FieldPath, index: usize) {
        let Some(section) = self.section_of(list_path) else {
            return;
        };
        let segments = list_path.within_section();
        let target = self.draft.section_mut(section);
        let Some(mut items) = path::get_value(target, segments)
            .and_then(Value::as_array)
            .cloned()
        else {
            return;
        };
        if index >= items.len() {
            return;
        }
        items.remove(index);
        path::set_value(target, segments, Value::Array(items));
        self.persist();
    }

    /// Restore the empty template, clear errors and flags, erase the
    /// persisted snapshot. Also retires any in-flight submission via the
    /// generation counter.
    pub fn reset(&mut self) {
        self.draft = Draft::empty();
        self.errors.clear();
        self.is_loading = false;
        self.is_submitted = false;
        self.attachments.clear();
        self.generation += 1;
        self.drafts.clear();
    }

    // ─── Validation ─────────────────────────────────────────────────────────

    /// Validate one step. Replaces the error map wholesale; returns true
    /// when the step is clean.
    pub fn validate_step(&mut self, step: StepId) -> bool {
        self.errors = rules::validate_step(step, &self.draft);
        self.errors.is_empty()
    }

    /// Validate every step in order. On failure the error map holds the
    /// first failing step's errors and that step is reported, so the user
    /// can be routed back.
    pub fn validate_all_steps(&mut self) -> Result<(), StepValidationFailure> {
        for step in StepId::all() {
            let errors = rules::validate_step(*step, &self.draft);
            if !errors.is_empty() {
                self.errors = errors.clone();
                return Err(StepValidationFailure { step: *step, errors });
            }
        }
        self.errors.clear();
        Ok(())
    }

    // ─── Submission lifecycle (used by the pipeline) ────────────────────────

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn begin_submission(&mut self) {
        self.is_loading = true;
    }

    /// Confirmed success: erase storage, restore the template, mark
    /// submitted.
    pub(crate) fn complete_submission(&mut self) {
        self.drafts.clear();
        self.draft = Draft::empty();
        self.errors.clear();
        self.attachments.clear();
        self.is_loading = false;
        self.is_submitted = true;
        self.generation += 1;
    }

    /// Failed submission: draft and errors stay intact for correction.
    pub(crate) fn fail_submission(&mut self) {
        self.is_loading = false;
    }

    // ─── Internals ──────────────────────────────────────────────────────────

    fn section_of(&self, field_path: &FieldPath) -> Option<SectionId> {
        let section = SectionId::from_key(field_path.section_key());
        if section.is_none() {
            tracing::warn!(path = %field_path, "Field path names an unknown draft section");
        }
        section
    }

    /// Fire-and-forget persistence after every successful mutation.
    fn persist(&self) {
        self.drafts.save(&self.draft);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn memory_store() -> OnboardingStore {
        OnboardingStore::new(DraftStore::disabled())
    }

    fn parse(path: &str) -> FieldPath {
        FieldPath::parse(path).unwrap()
    }

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_update_section_is_shallow_merge() {
        let mut store = memory_store();
        store.update_section(
            SectionId::BasicInfo,
            object(json!({"name": "Ada", "email": "ada@clinic.test"})),
        );
        store.update_section(SectionId::BasicInfo, object(json!({"email": "new@clinic.test"})));

        assert_eq!(store.draft().basic_info["name"], "Ada");
        assert_eq!(store.draft().basic_info["email"], "new@clinic.test");
    }

    #[test]
    fn test_set_field_leaves_siblings_untouched() {
        let mut store = memory_store();
        store.set_field(&parse("personalInfo.address.city"), json!("Springfield"));
        store.set_field(&parse("personalInfo.address.zip"), json!("49007"));
        store.set_field(&parse("personalInfo.address.city"), json!("Shelbyville"));

        assert_eq!(store.draft().personal_info["address"]["city"], "Shelbyville");
        assert_eq!(store.draft().personal_info["address"]["zip"], "49007");
    }

    #[test]
    fn test_unknown_section_is_a_no_op() {
        let mut store = memory_store();
        store.set_field(&parse("bogusSection.field"), json!("x"));
        assert_eq!(store.draft(), &Draft::empty());
    }

    #[test]
    fn test_list_items_shift_down_on_remove() {
        let mut store = memory_store();
        let quals = parse("professionalInfo.qualifications");
        store.add_list_item(&quals, json!({"degree": "MD"}));
        store.add_list_item(&quals, json!({"degree": "PhD"}));
        store.add_list_item(&quals, json!({"degree": "MPH"}));

        store.remove_list_item(&quals, 1);

        let items = store.draft().professional_info["qualifications"]
            .as_array()
            .unwrap()
            .clone();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["degree"], "MD");
        assert_eq!(items[1]["degree"], "MPH");

        // Out of bounds is a no-op
        store.remove_list_item(&quals, 5);
        assert_eq!(
            store.draft().professional_info["qualifications"]
                .as_array()
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn test_attachment_lifecycle() {
        let mut store = memory_store();
        let photo = parse("identification.photo");
        let attachment = store
            .attach_file(&photo, "photo.jpg", vec![0xFF, 0xD8])
            .unwrap();

        let reference =
            Attachment::from_value(&store.draft().identification["photo"]).unwrap();
        assert_eq!(reference, attachment);
        assert!(store.attachments().bytes(attachment.id).is_some());

        store.remove_attachment(&photo);
        assert!(store.draft().identification.get("photo").is_none());
        assert!(store.attachments().is_empty());
    }

    #[test]
    fn test_validate_step_replaces_errors_wholesale() {
        let mut store = memory_store();
        assert!(!store.validate_step(StepId::BasicInfo));
        assert!(store.field_error("basicInfo.name").is_some());

        // Validating another step rebuilds the map; step-one errors are gone
        assert!(!store.validate_step(StepId::Identification));
        assert!(store.field_error("basicInfo.name").is_none());
        assert!(store.field_error("identification.idType").is_some());
    }

    #[test]
    fn test_validate_all_steps_reports_first_failure() {
        let mut store = memory_store();
        store.update_section(
            SectionId::BasicInfo,
            object(json!({"name": "Ada", "email": "ada@clinic.test", "password": "longenough1"})),
        );

        let failure = store.validate_all_steps().unwrap_err();
        assert_eq!(failure.step, StepId::PersonalInfo);
        assert_eq!(failure.step.ordinal(), 2);
        assert!(failure.errors.contains_key("personalInfo.phone"));
        assert_eq!(store.errors(), &failure.errors);
    }

    #[test]
    fn test_mutations_persist_and_restore() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("staff-onboarding.json");

        let mut store = OnboardingStore::new(DraftStore::at_path(path.clone()));
        store.set_field(&parse("basicInfo.name"), json!("Ada"));
        assert!(path.exists());

        // A second store over the same path sees the saved draft (reload)
        let reloaded = OnboardingStore::new(DraftStore::at_path(path));
        assert_eq!(reloaded.draft().basic_info["name"], "Ada");
    }

    #[test]
    fn test_reset_restores_template_and_clears_snapshot() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("staff-onboarding.json");

        let mut store = OnboardingStore::new(DraftStore::at_path(path.clone()));
        store.set_field(&parse("basicInfo.name"), json!("Ada"));
        store.validate_step(StepId::BasicInfo);
        let generation = store.generation();

        store.reset();
        assert_eq!(store.draft(), &Draft::empty());
        assert!(store.errors().is_empty());
        assert!(!store.is_loading());
        assert!(!store.is_submitted());
        assert!(!path.exists());
        assert_eq!(store.generation(), generation + 1);
    }
}
