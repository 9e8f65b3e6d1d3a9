//! Skill Gap: compares a profile against market demand and prioritizes what is missing.
//!
//! importance = frequency / max frequency (pure, local)
//! confidence + reasoning = collaborator assessment per skill
//! ordering = importance × confidence, top 10

use std::cmp::Ordering;

use serde::Deserialize;
use tracing::{info, warn};

use crate::analysis::job_market::SkillFrequencyMap;
use crate::analysis::prompts::{GAP_ASSESSMENT_PERSONA, GAP_ASSESSMENT_PROMPT_TEMPLATE};
use crate::llm_client::prompts::json_system;
use crate::llm_client::{generate_json, LlmError, TextGenerator};
use crate::models::learning::SkillGap;
use crate::models::profile::UserProfile;

/// Max gaps returned after prioritization.
pub const MAX_GAPS: usize = 10;

const ASSESSMENT_TEMPERATURE: f32 = 0.3;

/// A market skill the user lacks, before confidence is known.
#[derive(Debug, Clone, PartialEq)]
pub struct GapCandidate {
    pub skill: String,
    pub frequency: u32,
    pub importance: f64,
}

/// Collaborator reply for one skill. Both fields are mandatory.
#[derive(Debug, Deserialize)]
struct GapAssessment {
    confidence: f64,
    reasoning: String,
}

/// Lists every map skill absent (case-insensitively) from the profile,
/// with importance normalized against the map's highest score.
pub fn candidate_gaps(profile: &UserProfile, market: &SkillFrequencyMap) -> Vec<GapCandidate> {
    let Some(max_score) = market.max_score().filter(|&m| m > 0) else {
        return Vec::new();
    };
    let user_skills = profile.normalized_skills();

    market
        .iter()
        .filter(|entry| !user_skills.contains(&entry.skill))
        .map(|entry| GapCandidate {
            skill: entry.skill.clone(),
            frequency: entry.score,
            importance: f64::from(entry.score) / f64::from(max_score),
        })
        .collect()
}

/// Sorts by priority descending (stable) and keeps the top `MAX_GAPS`.
pub fn prioritize(mut gaps: Vec<SkillGap>) -> Vec<SkillGap> {
    gaps.sort_by(|a, b| {
        b.priority()
            .partial_cmp(&a.priority())
            .unwrap_or(Ordering::Equal)
    });
    gaps.truncate(MAX_GAPS);
    gaps
}

/// Runs the full gap analysis against the collaborator.
///
/// A reply without a parseable confidence aborts the whole analysis;
/// a confidence outside [0, 1] only drops that skill.
pub async fn analyze_gaps(
    generator: &dyn TextGenerator,
    profile: &UserProfile,
    market: &SkillFrequencyMap,
) -> Result<Vec<SkillGap>, LlmError> {
    let system = json_system(GAP_ASSESSMENT_PERSONA);
    let mut gaps = Vec::new();

    for candidate in candidate_gaps(profile, market) {
        let prompt = build_assessment_prompt(profile, &candidate);
        let assessment: GapAssessment =
            generate_json(generator, &system, &prompt, ASSESSMENT_TEMPERATURE).await?;

        if !(0.0..=1.0).contains(&assessment.confidence) {
            warn!(
                "Dropping gap '{}': confidence {} outside [0, 1]",
                candidate.skill, assessment.confidence
            );
            continue;
        }

        gaps.push(SkillGap {
            skill: candidate.skill,
            importance: candidate.importance,
            frequency_in_jobs: candidate.frequency,
            confidence: assessment.confidence,
            reasoning: assessment.reasoning,
        });
    }

    let gaps = prioritize(gaps);
    info!(
        skill_gaps_identified = gaps.len(),
        high_priority_gaps = gaps.iter().filter(|g| g.confidence > 0.7).count(),
        "Skill gaps analyzed for {}",
        profile.name
    );
    Ok(gaps)
}

fn build_assessment_prompt(profile: &UserProfile, candidate: &GapCandidate) -> String {
    GAP_ASSESSMENT_PROMPT_TEMPLATE
        .replace("{current_role}", &profile.current_role)
        .replace("{target_role}", &profile.target_role)
        .replace("{experience_years}", &profile.experience_years.to_string())
        .replace("{current_skills}", &profile.skills.join(", "))
        .replace("{skill}", &candidate.skill)
        .replace("{frequency}", &candidate.frequency.to_string())
}
