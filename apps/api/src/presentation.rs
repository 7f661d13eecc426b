//! Client-facing views of labs: result cards and the detail overlay.

use serde::Serialize;

use crate::models::lab::{Lab, ScoredLab};

/// One entry in the ranked result list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabCard {
    pub id: i64,
    pub lab_name: String,
    pub professor_name: String,
    pub department: String,
    pub major: String,
    pub contact: String,
    pub how_to_apply: String,
    pub similarity_score: i64,
    pub match_reason: String,
}

impl From<&ScoredLab> for LabCard {
    fn from(scored: &ScoredLab) -> Self {
        let lab = &scored.lab;
        Self {
            id: lab.id,
            lab_name: lab.lab_name.clone(),
            professor_name: lab.professor_name.clone(),
            department: lab.department.clone(),
            major: lab.major.clone(),
            contact: lab.contact.clone(),
            how_to_apply: lab.how_to_apply.clone(),
            similarity_score: scored.similarity_score,
            match_reason: scored.match_reason.clone(),
        }
    }
}

/// The long-form view of a single lab.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabDetail {
    pub id: i64,
    pub lab_name: String,
    pub description: String,
}

impl From<&Lab> for LabDetail {
    fn from(lab: &Lab) -> Self {
        Self {
            id: lab.id,
            lab_name: lab.lab_name.clone(),
            description: lab.description.clone(),
        }
    }
}

pub fn cards(ranked: &[ScoredLab]) -> Vec<LabCard> {
    ranked.iter().map(LabCard::from).collect()
}
