//! Server-shaped submission payload, built once at submit time.
//!
//! `build_payload` is a pure projection of the draft: nested address,
//! contact, and professional sub-structures flatten into the server's
//! shape, numeric strings parse with invalid/empty falling back to 0, and
//! list fields map item-by-item. It never fails.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::draft::{Attachment, Draft};

/// The normalized staff record the server expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffPayload {
    pub name: String,
    pub email: String,
    pub password: String,

    // Flattened from personalInfo
    pub phone: String,
    pub age: u32,
    pub gender: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,

    // Flattened from professionalInfo
    pub specialization: String,
    pub license_number: String,
    pub years_of_experience: u32,
    pub department: String,
    pub qualifications: Vec<QualificationPayload>,

    // Flattened from identification
    pub id_type: String,
    pub id_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_attachment_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualificationPayload {
    pub degree: String,
    pub institution: String,
    pub year: u32,
}

/// Project the draft into the server's shape.
pub fn build_payload(draft: &Draft) -> StaffPayload {
    let basic = &draft.basic_info;
    let personal = &draft.personal_info;
    let professional = &draft.professional_info;
    let identification = &draft.identification;
    let address = personal.get("address");

    StaffPayload {
        name: text(basic.get("name")),
        email: text(basic.get("email")),
        password: text(basic.get("password")),

        phone: text(personal.get("phone")),
        age: number(personal.get("age")),
        gender: text(personal.get("gender")),
        street: text(address.and_then(|a| a.get("street"))),
        city: text(address.and_then(|a| a.get("city"))),
        state: text(address.and_then(|a| a.get("state"))),
        zip_code: text(address.and_then(|a| a.get("zip"))),

        specialization: text(professional.get("specialization")),
        license_number: text(professional.get("licenseNumber")),
        years_of_experience: number(professional.get("yearsOfExperience")),
        department: text(professional.get("department")),
        qualifications: professional
            .get("qualifications")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(qualification).collect())
            .unwrap_or_default(),

        id_type: text(identification.get("idType")),
        id_number: text(identification.get("idNumber")),
        photo_attachment_id: identification
            .get("photo")
            .and_then(Attachment::from_value)
            .map(|a| a.id),
    }
}

fn qualification(item: &Value) -> QualificationPayload {
    QualificationPayload {
        degree: text(item.get("degree")),
        institution: text(item.get("institution")),
        year: number(item.get("year")),
    }
}

fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Numeric coercion: integers pass through, numeric strings parse,
/// everything else (including empty) becomes 0.
fn number(value: Option<&Value>) -> u32 {
    match value {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0) as u32,
        Some(Value::String(s)) => s.trim().parse::<u32>().unwrap_or(0),
        _ => 0,
    }
}
