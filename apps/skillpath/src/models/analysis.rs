use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::learning::{LearningResource, LearningSession, SkillGap};
use crate::models::profile::{JobPosting, UserProfile};

/// The pipeline's output. Immutable once built: fields are private and only
/// exposed by shared reference. Child collections keep their stage's order.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    profile: UserProfile,
    job_postings: Vec<JobPosting>,
    skill_gaps: Vec<SkillGap>,
    learning_resources: Vec<Arc<LearningResource>>,
    schedule: Vec<LearningSession>,
    created_at: DateTime<Utc>,
}

impl AnalysisResult {
    pub fn new(
        profile: UserProfile,
        job_postings: Vec<JobPosting>,
        skill_gaps: Vec<SkillGap>,
        learning_resources: Vec<Arc<LearningResource>>,
        schedule: Vec<LearningSession>,
    ) -> Self {
        Self {
            profile,
            job_postings,
            skill_gaps,
            learning_resources,
            schedule,
            created_at: Utc::now(),
        }
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn job_postings(&self) -> &[JobPosting] {
        &self.job_postings
    }

    pub fn skill_gaps(&self) -> &[SkillGap] {
        &self.skill_gaps
    }

    pub fn learning_resources(&self) -> &[Arc<LearningResource>] {
        &self.learning_resources
    }

    pub fn schedule(&self) -> &[LearningSession] {
        &self.schedule
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
