use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A skill the user lacks, scored against market demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillGap {
    pub skill: String,
    /// frequency / max frequency across the skill map, in [0, 1]
    pub importance: f64,
    pub frequency_in_jobs: u32,
    /// Collaborator-assessed, in [0, 1]; independent of importance.
    pub confidence: f64,
    pub reasoning: String,
}

impl SkillGap {
    /// importance × confidence. The ordering key for gaps and the relevance
    /// assigned to every resource curated for this gap.
    pub fn priority(&self) -> f64 {
        self.importance * self.confidence
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Course,
    Article,
    Video,
    Project,
}

impl ResourceType {
    pub const ALL: [ResourceType; 4] = [
        ResourceType::Course,
        ResourceType::Article,
        ResourceType::Video,
        ResourceType::Project,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown value '{}'", self.0)
    }
}

impl FromStr for ResourceType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "course" => Ok(ResourceType::Course),
            "article" => Ok(ResourceType::Article),
            "video" => Ok(ResourceType::Video),
            "project" => Ok(ResourceType::Project),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

impl FromStr for Difficulty {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// A curated learning item. `relevance_score` is always derived from the
/// originating gap, never taken from the collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningResource {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
    pub url: String,
    pub estimated_hours: f64,
    pub difficulty: Difficulty,
    pub relevance_score: f64,
    pub skills_covered: Vec<String>,
}

impl LearningResource {
    pub fn estimated_minutes(&self) -> f64 {
        self.estimated_hours * 60.0
    }
}

/// One scheduled study block. Several sessions may share one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningSession {
    pub resource: Arc<LearningResource>,
    pub scheduled_time: NaiveDateTime,
    pub duration_minutes: u32,
    pub skill_target: String,
}
