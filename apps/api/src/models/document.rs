//! Canonical document request — the single envelope shared by the form model,
//! the client transport, and the generation bridge.
//!
//! Wire shape: `{ "doc_type": "sop" | "cv" | "lor", "data": { ...flat fields } }`.
//! `data` always carries the common fields plus exactly one archetype group.
#![allow(dead_code)]

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentArchetype {
    #[serde(rename = "sop")]
    StatementOfPurpose,
    #[serde(rename = "cv")]
    CurriculumVitae,
    #[serde(rename = "lor")]
    RecommendationLetter,
}

impl DocumentArchetype {
    pub const ALL: [DocumentArchetype; 3] = [
        DocumentArchetype::StatementOfPurpose,
        DocumentArchetype::CurriculumVitae,
        DocumentArchetype::RecommendationLetter,
    ];

    /// Short wire tag, also used in the suggested filename.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentArchetype::StatementOfPurpose => "sop",
            DocumentArchetype::CurriculumVitae => "cv",
            DocumentArchetype::RecommendationLetter => "lor",
        }
    }
}

impl fmt::Display for DocumentArchetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Field groups
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommonFields {
    #[serde(deserialize_with = "lenient_string")]
    pub full_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(rename = "program", deserialize_with = "lenient_string")]
    pub target_program: String,
    #[serde(deserialize_with = "lenient_string")]
    pub gpa: String,
    /// Comma-delimited, passed through untouched.
    #[serde(rename = "skills", deserialize_with = "lenient_string")]
    pub skills_list: String,
    #[serde(rename = "experience", deserialize_with = "lenient_string")]
    pub experience_summary: String,
    #[serde(rename = "goal", deserialize_with = "lenient_string")]
    pub goal_statement: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SopFields {
    #[serde(deserialize_with = "lenient_string")]
    pub country: String,
    #[serde(rename = "university", deserialize_with = "lenient_string")]
    pub target_university: String,
}

/// Key spellings for the course fields are fixed by the worker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommenderFields {
    #[serde(deserialize_with = "lenient_string")]
    pub recommender_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub recommender_title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub recommender_institution: String,
    #[serde(deserialize_with = "lenient_string")]
    pub recommender_email: String,
    #[serde(rename = "Course_Taught", deserialize_with = "lenient_string")]
    pub course_taught: String,
    #[serde(rename = "Duration_cousre", deserialize_with = "lenient_string")]
    pub course_duration: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationEntry {
    #[serde(deserialize_with = "lenient_string")]
    pub degree: String,
    #[serde(deserialize_with = "lenient_string")]
    pub gpa: String,
    #[serde(deserialize_with = "lenient_string")]
    pub completion_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceEntry {
    #[serde(deserialize_with = "lenient_string")]
    pub company: String,
    #[serde(deserialize_with = "lenient_string")]
    pub role: String,
    #[serde(rename = "start_end", deserialize_with = "lenient_string")]
    pub date_range: String,
    #[serde(deserialize_with = "lenient_strings")]
    pub bullets: Vec<String>,
}

impl Default for ExperienceEntry {
    /// A fresh experience row starts with one empty bullet.
    fn default() -> Self {
        Self {
            company: String::new(),
            role: String::new(),
            date_range: String::new(),
            bullets: vec![String::new()],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectEntry {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CvFields {
    #[serde(deserialize_with = "lenient_records")]
    pub educations: Vec<EducationEntry>,
    #[serde(deserialize_with = "lenient_records")]
    pub experiences: Vec<ExperienceEntry>,
    #[serde(deserialize_with = "lenient_records")]
    pub projects: Vec<ProjectEntry>,
    #[serde(deserialize_with = "lenient_strings")]
    pub languages: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub certificates: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub awards: Vec<String>,
}

/// The archetype-specific portion of a request. Serialized untagged and
/// flattened next to the common fields, so only the active group's keys
/// ever appear on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ArchetypeFields {
    StatementOfPurpose(SopFields),
    CurriculumVitae(CvFields),
    RecommendationLetter(RecommenderFields),
}

impl ArchetypeFields {
    pub fn archetype(&self) -> DocumentArchetype {
        match self {
            ArchetypeFields::StatementOfPurpose(_) => DocumentArchetype::StatementOfPurpose,
            ArchetypeFields::CurriculumVitae(_) => DocumentArchetype::CurriculumVitae,
            ArchetypeFields::RecommendationLetter(_) => DocumentArchetype::RecommendationLetter,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentPayload {
    #[serde(flatten)]
    pub common: CommonFields,
    #[serde(flatten)]
    pub fields: ArchetypeFields,
}

/// Field values are forwarded, not validated: `null` reads as empty text and
/// any other non-string scalar as its JSON text.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(text_of(Value::deserialize(deserializer)?))
}

fn lenient_strings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().map(text_of).collect(),
        _ => Vec::new(),
    })
}

/// A non-array collection reads as empty; a non-object item as a blank record.
fn lenient_records<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    })
}

fn text_of(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text,
        other => other.to_string(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Envelope
// ────────────────────────────────────────────────────────────────────────────

/// Immutable once built. The archetype tag is derived from the populated
/// group, so the two can never disagree.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRequest {
    payload: DocumentPayload,
}

impl DocumentRequest {
    pub fn new(common: CommonFields, fields: ArchetypeFields) -> Self {
        Self {
            payload: DocumentPayload { common, fields },
        }
    }

    pub fn archetype(&self) -> DocumentArchetype {
        self.payload.fields.archetype()
    }

    pub fn common(&self) -> &CommonFields {
        &self.payload.common
    }

    pub fn fields(&self) -> &ArchetypeFields {
        &self.payload.fields
    }

    pub fn payload(&self) -> &DocumentPayload {
        &self.payload
    }

    /// `{full_name-or-"student"}_{doc_type}.pdf`, whitespace runs collapsed to `_`.
    pub fn suggested_filename(&self) -> String {
        suggested_filename(&self.payload.common.full_name, self.archetype())
    }
}

pub fn suggested_filename(full_name: &str, archetype: DocumentArchetype) -> String {
    let stem = full_name.split_whitespace().collect::<Vec<_>>().join("_");
    let stem = if stem.is_empty() {
        "student".to_string()
    } else {
        stem
    };
    format!("{stem}_{archetype}.pdf")
}

#[derive(Serialize)]
struct WireRequest<'a> {
    doc_type: DocumentArchetype,
    data: &'a DocumentPayload,
}

impl Serialize for DocumentRequest {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireRequest {
            doc_type: self.archetype(),
            data: &self.payload,
        }
        .serialize(serializer)
    }
}

#[derive(Deserialize)]
struct RawRequest {
    doc_type: DocumentArchetype,
    #[serde(default)]
    data: Value,
}

impl<'de> Deserialize<'de> for DocumentRequest {
    /// Decodes `data` against the group selected by `doc_type`; keys that
    /// belong to other archetypes (or to nothing) are dropped. Only `doc_type`
    /// is checked; a non-object `data` reads as empty.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        let raw = RawRequest::deserialize(deserializer)?;
        let data = match raw.data {
            data @ Value::Object(_) => data,
            _ => Value::Object(Default::default()),
        };

        let common: CommonFields = serde_json::from_value(data.clone()).map_err(D::Error::custom)?;
        let fields = match raw.doc_type {
            DocumentArchetype::StatementOfPurpose => {
                ArchetypeFields::StatementOfPurpose(serde_json::from_value(data).map_err(D::Error::custom)?)
            }
            DocumentArchetype::CurriculumVitae => {
                ArchetypeFields::CurriculumVitae(serde_json::from_value(data).map_err(D::Error::custom)?)
            }
            DocumentArchetype::RecommendationLetter => ArchetypeFields::RecommendationLetter(
                serde_json::from_value(data).map_err(D::Error::custom)?,
            ),
        };

        Ok(DocumentRequest::new(common, fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key_set(value: &Value) -> Vec<String> {
        let mut keys: Vec<String> = value["data"]
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    #[test]
    fn test_suggested_filename_collapses_whitespace() {
        assert_eq!(
            suggested_filename("Jane Doe", DocumentArchetype::CurriculumVitae),
            "Jane_Doe_cv.pdf"
        );
        assert_eq!(
            suggested_filename("  Mary   Ann\tLee ", DocumentArchetype::RecommendationLetter),
            "Mary_Ann_Lee_lor.pdf"
        );
    }

    #[test]
    fn test_suggested_filename_defaults_to_student() {
        assert_eq!(
            suggested_filename("", DocumentArchetype::CurriculumVitae),
            "student_cv.pdf"
        );
        assert_eq!(
            suggested_filename("   ", DocumentArchetype::StatementOfPurpose),
            "student_sop.pdf"
        );
    }

    #[test]
    fn test_sop_request_serializes_only_sop_keys() {
        let request = DocumentRequest::new(
            CommonFields {
                full_name: "Jane Doe".to_string(),
                ..Default::default()
            },
            ArchetypeFields::StatementOfPurpose(SopFields {
                country: "Canada".to_string(),
                target_university: "UBC".to_string(),
            }),
        );

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["doc_type"], "sop");
        assert_eq!(value["data"]["university"], "UBC");
        assert_eq!(
            key_set(&value),
            vec![
                "country",
                "email",
                "experience",
                "full_name",
                "goal",
                "gpa",
                "program",
                "skills",
                "university"
            ]
        );
    }

    #[test]
    fn test_lor_request_uses_worker_key_spellings() {
        let request = DocumentRequest::new(
            CommonFields::default(),
            ArchetypeFields::RecommendationLetter(RecommenderFields {
                course_taught: "Compilers".to_string(),
                course_duration: "Fall 2023".to_string(),
                ..Default::default()
            }),
        );

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["doc_type"], "lor");
        assert_eq!(value["data"]["Course_Taught"], "Compilers");
        assert_eq!(value["data"]["Duration_cousre"], "Fall 2023");
        assert!(value["data"].get("country").is_none());
        assert!(value["data"].get("educations").is_none());
    }

    #[test]
    fn test_deserialize_drops_foreign_archetype_keys() {
        let body = json!({
            "doc_type": "cv",
            "data": {
                "full_name": "Jane Doe",
                "country": "Canada",
                "recommender_name": "Dr. Smith",
                "experiences": [{ "company": "Acme", "role": "Intern", "start_end": "2022", "bullets": ["Built X"] }],
                "languages": ["English"]
            }
        });

        let request: DocumentRequest = serde_json::from_value(body).unwrap();
        assert_eq!(request.archetype(), DocumentArchetype::CurriculumVitae);
        assert_eq!(request.common().full_name, "Jane Doe");

        let ArchetypeFields::CurriculumVitae(cv) = request.fields() else {
            panic!("expected CV fields");
        };
        assert_eq!(cv.experiences[0].company, "Acme");
        assert_eq!(cv.experiences[0].bullets, vec!["Built X"]);
        assert_eq!(cv.languages, vec!["English"]);

        let wire = serde_json::to_value(&request).unwrap();
        assert!(wire["data"].get("country").is_none());
        assert!(wire["data"].get("recommender_name").is_none());
    }

    #[test]
    fn test_deserialize_missing_data_yields_empty_fields() {
        let request: DocumentRequest = serde_json::from_value(json!({ "doc_type": "sop" })).unwrap();
        assert_eq!(request.common(), &CommonFields::default());
        assert_eq!(
            request.fields(),
            &ArchetypeFields::StatementOfPurpose(SopFields::default())
        );
    }

    #[test]
    fn test_deserialize_forwards_non_string_scalars() {
        let body = json!({
            "doc_type": "sop",
            "data": { "full_name": null, "gpa": 3.8, "country": true, "university": ["UBC"] }
        });

        let request: DocumentRequest = serde_json::from_value(body).unwrap();
        assert_eq!(request.common().full_name, "");
        assert_eq!(request.common().gpa, "3.8");
        assert_eq!(
            request.fields(),
            &ArchetypeFields::StatementOfPurpose(SopFields {
                country: "true".to_string(),
                target_university: "[\"UBC\"]".to_string(),
            })
        );
    }

    #[test]
    fn test_deserialize_tolerates_malformed_collections() {
        let body = json!({
            "doc_type": "cv",
            "data": {
                "languages": null,
                "awards": "Dean's list",
                "certificates": ["AWS", 7, null],
                "educations": { "degree": "BSc" },
                "experiences": ["not a record", { "company": "Acme", "bullets": null }]
            }
        });

        let request: DocumentRequest = serde_json::from_value(body).unwrap();
        let ArchetypeFields::CurriculumVitae(cv) = request.fields() else {
            panic!("expected CV fields");
        };
        assert!(cv.languages.is_empty());
        assert!(cv.awards.is_empty());
        assert!(cv.educations.is_empty());
        assert_eq!(cv.certificates, vec!["AWS", "7", ""]);
        assert_eq!(cv.experiences.len(), 2);
        assert_eq!(cv.experiences[0], ExperienceEntry::default());
        assert_eq!(cv.experiences[1].company, "Acme");
        assert!(cv.experiences[1].bullets.is_empty());
    }

    #[test]
    fn test_deserialize_non_object_data_reads_as_empty() {
        let request: DocumentRequest =
            serde_json::from_value(json!({ "doc_type": "lor", "data": "oops" })).unwrap();
        assert_eq!(request.common(), &CommonFields::default());
    }

    #[test]
    fn test_deserialize_rejects_unknown_doc_type() {
        let result = serde_json::from_value::<DocumentRequest>(json!({ "doc_type": "memo", "data": {} }));
        assert!(result.is_err());
    }
}
