use crate::form::state::FormState;
use crate::models::document::{ArchetypeFields, CvFields, DocumentArchetype, DocumentRequest};

/// Projects the form onto a `DocumentRequest` for its active archetype.
///
/// Pure and infallible. Groups owned by other archetypes are left out of the
/// request entirely; no field is validated here.
pub fn assemble(form: &FormState) -> DocumentRequest {
    let fields = match form.archetype() {
        DocumentArchetype::StatementOfPurpose => {
            ArchetypeFields::StatementOfPurpose(form.sop().clone())
        }
        DocumentArchetype::RecommendationLetter => {
            ArchetypeFields::RecommendationLetter(form.recommender().clone())
        }
        DocumentArchetype::CurriculumVitae => {
            let cv = form.cv();
            ArchetypeFields::CurriculumVitae(CvFields {
                educations: cv.educations.to_vec(),
                experiences: cv.experiences.to_vec(),
                projects: cv.projects.to_vec(),
                languages: cv.languages.to_vec(),
                certificates: cv.certificates.to_vec(),
                awards: cv.awards.to_vec(),
            })
        }
    };

    DocumentRequest::new(form.common().clone(), fields)
}
