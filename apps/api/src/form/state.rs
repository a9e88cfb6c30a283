//! Form state for one document request.
//!
//! Holds every field for every archetype at once. Switching archetype only
//! changes which groups are relevant and which one the assembler projects;
//! nothing stored for another archetype is ever cleared.

use crate::form::editors::{FormError, RecordList};
use crate::models::document::{
    CommonFields, DocumentArchetype, EducationEntry, ExperienceEntry, ProjectEntry,
    RecommenderFields, SopFields,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarField {
    FullName,
    Email,
    TargetProgram,
    Gpa,
    SkillsList,
    ExperienceSummary,
    GoalStatement,
    Country,
    TargetUniversity,
    RecommenderName,
    RecommenderTitle,
    RecommenderInstitution,
    RecommenderEmail,
    CourseTaught,
    CourseDuration,
}

impl ScalarField {
    pub const ALL: [ScalarField; 15] = [
        ScalarField::FullName,
        ScalarField::Email,
        ScalarField::TargetProgram,
        ScalarField::Gpa,
        ScalarField::SkillsList,
        ScalarField::ExperienceSummary,
        ScalarField::GoalStatement,
        ScalarField::Country,
        ScalarField::TargetUniversity,
        ScalarField::RecommenderName,
        ScalarField::RecommenderTitle,
        ScalarField::RecommenderInstitution,
        ScalarField::RecommenderEmail,
        ScalarField::CourseTaught,
        ScalarField::CourseDuration,
    ];

    /// The archetype that owns this field, or `None` for common fields.
    pub fn owner(&self) -> Option<DocumentArchetype> {
        match self {
            ScalarField::Country | ScalarField::TargetUniversity => {
                Some(DocumentArchetype::StatementOfPurpose)
            }
            ScalarField::RecommenderName
            | ScalarField::RecommenderTitle
            | ScalarField::RecommenderInstitution
            | ScalarField::RecommenderEmail
            | ScalarField::CourseTaught
            | ScalarField::CourseDuration => Some(DocumentArchetype::RecommendationLetter),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Educations,
    Experiences,
    Projects,
    Languages,
    Certificates,
    Awards,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Educations => "educations",
            Collection::Experiences => "experiences",
            Collection::Projects => "projects",
            Collection::Languages => "languages",
            Collection::Certificates => "certificates",
            Collection::Awards => "awards",
        }
    }
}

/// Named fields inside structured CV records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    Degree,
    Gpa,
    CompletionDate,
    Company,
    Role,
    DateRange,
    Name,
    Description,
}

impl RecordField {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordField::Degree => "degree",
            RecordField::Gpa => "gpa",
            RecordField::CompletionDate => "completion_date",
            RecordField::Company => "company",
            RecordField::Role => "role",
            RecordField::DateRange => "start_end",
            RecordField::Name => "name",
            RecordField::Description => "description",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CvDraft {
    pub educations: RecordList<EducationEntry>,
    pub experiences: RecordList<ExperienceEntry>,
    pub projects: RecordList<ProjectEntry>,
    pub languages: RecordList<String>,
    pub certificates: RecordList<String>,
    pub awards: RecordList<String>,
}

impl Default for CvDraft {
    fn default() -> Self {
        Self {
            educations: RecordList::seeded("educations"),
            experiences: RecordList::seeded("experiences"),
            projects: RecordList::seeded("projects"),
            languages: RecordList::seeded("languages"),
            certificates: RecordList::seeded("certificates"),
            awards: RecordList::seeded("awards"),
        }
    }
}

impl CvDraft {
    fn text_list_mut(&mut self, collection: Collection) -> Option<&mut RecordList<String>> {
        match collection {
            Collection::Languages => Some(&mut self.languages),
            Collection::Certificates => Some(&mut self.certificates),
            Collection::Awards => Some(&mut self.awards),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    archetype: DocumentArchetype,
    common: CommonFields,
    sop: SopFields,
    recommender: RecommenderFields,
    cv: CvDraft,
}

impl FormState {
    pub fn new(archetype: DocumentArchetype) -> Self {
        Self {
            archetype,
            common: CommonFields::default(),
            sop: SopFields::default(),
            recommender: RecommenderFields::default(),
            cv: CvDraft::default(),
        }
    }

    pub fn archetype(&self) -> DocumentArchetype {
        self.archetype
    }

    pub fn select_archetype(&mut self, archetype: DocumentArchetype) {
        self.archetype = archetype;
    }

    pub fn common(&self) -> &CommonFields {
        &self.common
    }

    pub fn sop(&self) -> &SopFields {
        &self.sop
    }

    pub fn recommender(&self) -> &RecommenderFields {
        &self.recommender
    }

    pub fn cv(&self) -> &CvDraft {
        &self.cv
    }

    /// Scalar fields shown for the active archetype, in display order.
    pub fn relevant_fields(&self) -> Vec<ScalarField> {
        ScalarField::ALL
            .into_iter()
            .filter(|field| field.owner().map_or(true, |owner| owner == self.archetype))
            .collect()
    }

    pub fn field(&self, field: ScalarField) -> &str {
        match field {
            ScalarField::FullName => &self.common.full_name,
            ScalarField::Email => &self.common.email,
            ScalarField::TargetProgram => &self.common.target_program,
            ScalarField::Gpa => &self.common.gpa,
            ScalarField::SkillsList => &self.common.skills_list,
            ScalarField::ExperienceSummary => &self.common.experience_summary,
            ScalarField::GoalStatement => &self.common.goal_statement,
            ScalarField::Country => &self.sop.country,
            ScalarField::TargetUniversity => &self.sop.target_university,
            ScalarField::RecommenderName => &self.recommender.recommender_name,
            ScalarField::RecommenderTitle => &self.recommender.recommender_title,
            ScalarField::RecommenderInstitution => &self.recommender.recommender_institution,
            ScalarField::RecommenderEmail => &self.recommender.recommender_email,
            ScalarField::CourseTaught => &self.recommender.course_taught,
            ScalarField::CourseDuration => &self.recommender.course_duration,
        }
    }

    pub fn set_field(&mut self, field: ScalarField, value: impl Into<String>) {
        let slot = match field {
            ScalarField::FullName => &mut self.common.full_name,
            ScalarField::Email => &mut self.common.email,
            ScalarField::TargetProgram => &mut self.common.target_program,
            ScalarField::Gpa => &mut self.common.gpa,
            ScalarField::SkillsList => &mut self.common.skills_list,
            ScalarField::ExperienceSummary => &mut self.common.experience_summary,
            ScalarField::GoalStatement => &mut self.common.goal_statement,
            ScalarField::Country => &mut self.sop.country,
            ScalarField::TargetUniversity => &mut self.sop.target_university,
            ScalarField::RecommenderName => &mut self.recommender.recommender_name,
            ScalarField::RecommenderTitle => &mut self.recommender.recommender_title,
            ScalarField::RecommenderInstitution => &mut self.recommender.recommender_institution,
            ScalarField::RecommenderEmail => &mut self.recommender.recommender_email,
            ScalarField::CourseTaught => &mut self.recommender.course_taught,
            ScalarField::CourseDuration => &mut self.recommender.course_duration,
        };
        *slot = value.into();
    }

    pub fn len(&self, collection: Collection) -> usize {
        match collection {
            Collection::Educations => self.cv.educations.len(),
            Collection::Experiences => self.cv.experiences.len(),
            Collection::Projects => self.cv.projects.len(),
            Collection::Languages => self.cv.languages.len(),
            Collection::Certificates => self.cv.certificates.len(),
            Collection::Awards => self.cv.awards.len(),
        }
    }

    /// Appends a default record (experiences start with one empty bullet)
    /// and returns its index.
    pub fn append_record(&mut self, collection: Collection) -> usize {
        match collection {
            Collection::Educations => self.cv.educations.append(),
            Collection::Experiences => self.cv.experiences.append(),
            Collection::Projects => self.cv.projects.append(),
            Collection::Languages => self.cv.languages.append(),
            Collection::Certificates => self.cv.certificates.append(),
            Collection::Awards => self.cv.awards.append(),
        }
    }

    /// Appends an empty bullet to an experience record; returns the bullet index.
    pub fn append_sub_item(
        &mut self,
        collection: Collection,
        record_index: usize,
    ) -> Result<usize, FormError> {
        if collection != Collection::Experiences {
            return Err(FormError::NoSubItems {
                collection: collection.as_str(),
            });
        }

        let mut appended = 0;
        self.cv.experiences.update_at(record_index, |entry| {
            entry.bullets.push(String::new());
            appended = entry.bullets.len() - 1;
            Ok(())
        })?;
        Ok(appended)
    }

    pub fn update_field_at(
        &mut self,
        collection: Collection,
        record_index: usize,
        field: RecordField,
        value: impl Into<String>,
    ) -> Result<(), FormError> {
        let value = value.into();
        let mismatch = || FormError::FieldNotInCollection {
            collection: collection.as_str(),
            field: field.as_str(),
        };

        match collection {
            Collection::Educations => self.cv.educations.update_at(record_index, |entry| {
                let slot = match field {
                    RecordField::Degree => &mut entry.degree,
                    RecordField::Gpa => &mut entry.gpa,
                    RecordField::CompletionDate => &mut entry.completion_date,
                    _ => return Err(mismatch()),
                };
                *slot = value;
                Ok(())
            }),
            Collection::Experiences => self.cv.experiences.update_at(record_index, |entry| {
                let slot = match field {
                    RecordField::Company => &mut entry.company,
                    RecordField::Role => &mut entry.role,
                    RecordField::DateRange => &mut entry.date_range,
                    _ => return Err(mismatch()),
                };
                *slot = value;
                Ok(())
            }),
            Collection::Projects => self.cv.projects.update_at(record_index, |entry| {
                let slot = match field {
                    RecordField::Name => &mut entry.name,
                    RecordField::Description => &mut entry.description,
                    _ => return Err(mismatch()),
                };
                *slot = value;
                Ok(())
            }),
            Collection::Languages | Collection::Certificates | Collection::Awards => Err(mismatch()),
        }
    }

    /// Rewrites one bullet of one experience record.
    pub fn update_item_at(
        &mut self,
        collection: Collection,
        record_index: usize,
        item_index: usize,
        value: impl Into<String>,
    ) -> Result<(), FormError> {
        if collection != Collection::Experiences {
            return Err(FormError::NoSubItems {
                collection: collection.as_str(),
            });
        }

        let value = value.into();
        self.cv.experiences.update_at(record_index, |entry| {
            let len = entry.bullets.len();
            let bullet = entry
                .bullets
                .get_mut(item_index)
                .ok_or(FormError::IndexOutOfBounds {
                    collection: "experiences.bullets",
                    index: item_index,
                    len,
                })?;
            *bullet = value;
            Ok(())
        })
    }

    /// Rewrites one entry of a plain text list (languages, certificates, awards).
    pub fn update_text_at(
        &mut self,
        collection: Collection,
        index: usize,
        value: impl Into<String>,
    ) -> Result<(), FormError> {
        let list = self
            .cv
            .text_list_mut(collection)
            .ok_or(FormError::NotATextList {
                collection: collection.as_str(),
            })?;

        let value = value.into();
        list.update_at(index, |text| {
            *text = value;
            Ok(())
        })
    }
}
