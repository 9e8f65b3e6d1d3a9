//! Job Market: synthesizes market postings via the LLM and aggregates skill demand.

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analysis::prompts::{JOB_MARKET_PERSONA, JOB_MARKET_PROMPT_TEMPLATE};
use crate::analysis::slugify;
use crate::llm_client::parse::into_records;
use crate::llm_client::prompts::json_system;
use crate::llm_client::{LlmError, TextGenerator};
use crate::models::profile::{normalize_skill, JobPosting};

const POSTING_TEMPERATURE: f32 = 0.7;
const REQUIRED_WEIGHT: u32 = 2;
const PREFERRED_WEIGHT: u32 = 1;

// ────────────────────────────────────────────────────────────────────────────
// Posting synthesis
// ────────────────────────────────────────────────────────────────────────────

/// Shape the collaborator must return per posting. Records missing any field are dropped.
#[derive(Debug, Deserialize)]
struct PostingRecord {
    title: String,
    company: String,
    required_skills: Vec<String>,
    preferred_skills: Vec<String>,
    description: String,
}

/// Requests `limit` postings for `role` in `industry`.
///
/// Fails if the reply has no structured content or if no record survives validation.
pub async fn fetch_job_postings(
    generator: &dyn TextGenerator,
    role: &str,
    industry: &str,
    limit: usize,
) -> Result<Vec<JobPosting>, LlmError> {
    let prompt = JOB_MARKET_PROMPT_TEMPLATE
        .replace("{limit}", &limit.to_string())
        .replace("{role}", role)
        .replace("{industry}", industry);

    let reply = generator
        .generate_structured(&json_system(JOB_MARKET_PERSONA), &prompt, POSTING_TEMPERATURE)
        .await?;

    let postings: Vec<JobPosting> = into_records(reply)
        .into_iter()
        .filter_map(|record| match serde_json::from_value::<PostingRecord>(record) {
            Ok(p) => Some(p),
            Err(e) => {
                warn!("Dropping malformed job posting: {e}");
                None
            }
        })
        .take(limit)
        .map(|p| JobPosting {
            url: format!("https://example.com/jobs/{}", slugify(&p.company)),
            title: p.title,
            company: p.company,
            required_skills: p.required_skills,
            preferred_skills: p.preferred_skills,
            description: p.description,
            scraped_at: Utc::now(),
        })
        .collect();

    if postings.is_empty() {
        return Err(LlmError::Invalid(
            "no valid job postings in reply".to_string(),
        ));
    }

    info!(jobs_scraped = postings.len(), "Fetched job postings for {role}");
    Ok(postings)
}

// ────────────────────────────────────────────────────────────────────────────
// Skill aggregation
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillFrequency {
    pub skill: String,
    pub score: u32,
}

/// Canonical skill name → demand score, ordered by score descending with
/// first-seen order among ties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SkillFrequencyMap {
    entries: Vec<SkillFrequency>,
}

impl SkillFrequencyMap {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SkillFrequency> {
        self.entries.iter()
    }

    #[cfg(test)]
    pub fn get(&self, skill: &str) -> Option<u32> {
        let key = normalize_skill(skill);
        self.entries.iter().find(|e| e.skill == key).map(|e| e.score)
    }

    /// Highest score in the map (the first entry), if any.
    pub fn max_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }
}

impl FromIterator<(String, u32)> for SkillFrequencyMap {
    /// Sums scores per canonical skill name, then sorts by score descending.
    /// Ties keep first-seen order. Blank names are ignored.
    fn from_iter<I: IntoIterator<Item = (String, u32)>>(iter: I) -> Self {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut entries: Vec<SkillFrequency> = Vec::new();

        for (skill, score) in iter {
            let key = normalize_skill(&skill);
            if key.is_empty() {
                continue;
            }
            match index.get(&key).copied() {
                Some(i) => entries[i].score = entries[i].score.saturating_add(score),
                None => {
                    index.insert(key.clone(), entries.len());
                    entries.push(SkillFrequency { skill: key, score });
                }
            }
        }

        // Stable: ties keep first-seen order
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        Self { entries }
    }
}

/// Scores every skill across `postings`: +2 per required appearance,
/// +1 per preferred appearance. Blank skill names are ignored.
pub fn aggregate_skills(postings: &[JobPosting]) -> SkillFrequencyMap {
    postings
        .iter()
        .flat_map(|posting| {
            posting
                .required_skills
                .iter()
                .map(|s| (s.clone(), REQUIRED_WEIGHT))
                .chain(
                    posting
                        .preferred_skills
                        .iter()
                        .map(|s| (s.clone(), PREFERRED_WEIGHT)),
                )
        })
        .collect()
}
