//! Declarative per-step validation rules.
//!
//! Pure mapping `(StepId, &Draft) -> FieldErrors`: identical draft in,
//! identical error map out. A field may carry several rules but only the
//! first failing rule's message is recorded.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;

use super::draft::{Draft, SectionId};
use super::steps::StepId;

/// Dotted-path keyed validation failure messages.
pub type FieldErrors = BTreeMap<String, String>;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9][0-9 ()\-]{5,19}$").expect("valid phone regex"));

/// A single declarative rule. Format rules pass on absent/empty values;
/// pair them with `Required` when the field is mandatory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Required,
    Email,
    Phone,
    Range { min: i64, max: i64 },
    MinLength(usize),
}

impl Rule {
    fn check(self, label: &str, value: Option<&Value>) -> Option<String> {
        match self {
            Rule::Required => {
                if is_blank(value) {
                    Some(format!("{label} is required"))
                } else {
                    None
                }
            }
            Rule::Email => match text_of(value) {
                Some(text) if !EMAIL_RE.is_match(text) => {
                    Some(format!("{label} is not a valid email address"))
                }
                _ => None,
            },
            Rule::Phone => match text_of(value) {
                Some(text) if !PHONE_RE.is_match(text) => {
                    Some(format!("{label} is not a valid phone number"))
                }
                _ => None,
            },
            Rule::Range { min, max } => {
                if is_blank(value) {
                    return None;
                }
                match numeric_of(value) {
                    Some(n) if (min..=max).contains(&n) => None,
                    _ => Some(format!("{label} must be a number between {min} and {max}")),
                }
            }
            Rule::MinLength(min_len) => match text_of(value) {
                Some(text) if text.chars().count() < min_len => {
                    Some(format!("{label} must be at least {min_len} characters"))
                }
                _ => None,
            },
        }
    }
}

/// Rules for one draft field, addressed by its full dotted path.
struct FieldRule {
    path: &'static str,
    label: &'static str,
    rules: &'static [Rule],
}

/// Required field inside every item of a list field.
struct ListItemRule {
    list_path: &'static str,
    item_field: &'static str,
    label: &'static str,
}

const BASIC_INFO_RULES: &[FieldRule] = &[
    FieldRule {
        path: "basicInfo.name",
        label: "Full name",
        rules: &[Rule::Required],
    },
    FieldRule {
        path: "basicInfo.email",
        label: "Email",
        rules: &[Rule::Required, Rule::Email],
    },
    FieldRule {
        path: "basicInfo.password",
        label: "Password",
        rules: &[Rule::Required, Rule::MinLength(8)],
    },
];

const PERSONAL_INFO_RULES: &[FieldRule] = &[
    FieldRule {
        path: "personalInfo.phone",
        label: "Phone number",
        rules: &[Rule::Required, Rule::Phone],
    },
    FieldRule {
        path: "personalInfo.age",
        label: "Age",
        rules: &[Rule::Required, Rule::Range { min: 18, max: 100 }],
    },
    FieldRule {
        path: "personalInfo.address.city",
        label: "City",
        rules: &[Rule::Required],
    },
];

const PROFESSIONAL_INFO_RULES: &[FieldRule] = &[
    FieldRule {
        path: "professionalInfo.specialization",
        label: "Specialization",
        rules: &[Rule::Required],
    },
    FieldRule {
        path: "professionalInfo.licenseNumber",
        label: "License number",
        rules: &[Rule::Required],
    },
    FieldRule {
        path: "professionalInfo.yearsOfExperience",
        label: "Years of experience",
        rules: &[Rule::Range { min: 0, max: 60 }],
    },
];

const IDENTIFICATION_RULES: &[FieldRule] = &[
    FieldRule {
        path: "identification.idType",
        label: "ID type",
        rules: &[Rule::Required],
    },
    FieldRule {
        path: "identification.idNumber",
        label: "ID number",
        rules: &[Rule::Required],
    },
];

const PROFESSIONAL_INFO_LIST_RULES: &[ListItemRule] = &[
    ListItemRule {
        list_path: "professionalInfo.qualifications",
        item_field: "degree",
        label: "Qualification degree",
    },
    ListItemRule {
        list_path: "professionalInfo.qualifications",
        item_field: "institution",
        label: "Qualification institution",
    },
];

fn field_rules(step: StepId) -> &'static [FieldRule] {
    match step {
        StepId::BasicInfo => BASIC_INFO_RULES,
        StepId::PersonalInfo => PERSONAL_INFO_RULES,
        StepId::ProfessionalInfo => PROFESSIONAL_INFO_RULES,
        StepId::Identification => IDENTIFICATION_RULES,
        StepId::Review => &[],
    }
}

fn list_item_rules(step: StepId) -> &'static [ListItemRule] {
    match step {
        StepId::ProfessionalInfo => PROFESSIONAL_INFO_LIST_RULES,
        _ => &[],
    }
}

/// Validate one step against the draft. A step with no declared rules
/// (the review step) always returns an empty map.
pub fn validate_step(step: StepId, draft: &Draft) -> FieldErrors {
    let mut errors = FieldErrors::new();

    for field in field_rules(step) {
        let value = lookup(draft, field.path);
        for rule in field.rules {
            if let Some(message) = rule.check(field.label, value) {
                errors.insert(field.path.to_string(), message);
                break; // first failure wins
            }
        }
    }

    for list_rule in list_item_rules(step) {
        let Some(items) = lookup(draft, list_rule.list_path).and_then(Value::as_array) else {
            continue;
        };
        for (idx, item) in items.iter().enumerate() {
            let value = item.as_object().and_then(|o| o.get(list_rule.item_field));
            if is_blank(value) {
                errors.insert(
                    format!("{}[{idx}].{}", list_rule.list_path, list_rule.item_field),
                    format!("{} is required", list_rule.label),
                );
            }
        }
    }

    errors
}

/// Resolve a static dotted path (section key then object keys, no indices).
fn lookup<'a>(draft: &'a Draft, dotted: &str) -> Option<&'a Value> {
    let mut parts = dotted.split('.');
    let section = SectionId::from_key(parts.next()?)?;
    let mut current = draft.section(section);
    for key in parts {
        current = current.as_object()?.get(key)?;
    }
    Some(current)
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

/// Non-empty string content of a value, if it is a string.
fn text_of(value: Option<&Value>) -> Option<&str> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.as_str()),
        _ => None,
    }
}

/// Numeric content: an integer, or a string that parses as one.
fn numeric_of(value: Option<&Value>) -> Option<i64> {
    match value {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}
