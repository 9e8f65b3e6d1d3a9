//! Resources: curates learning material for the top gaps and ranks it by gap priority.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::analysis::prompts::{
    JUDGE_PROMPT_TEMPLATE, JUDGE_SYSTEM, RESOURCE_PERSONA, RESOURCE_PROMPT_TEMPLATE,
};
use crate::llm_client::parse::{decode, into_records};
use crate::llm_client::prompts::json_system;
use crate::llm_client::{LlmError, TextGenerator};
use crate::models::learning::{Difficulty, LearningResource, ResourceType, SkillGap};

/// Only this many leading gaps get resources.
pub const GAP_LIMIT: usize = 5;
/// Max resources after ranking.
pub const MAX_RESOURCES: usize = 15;

const RESOURCE_TEMPERATURE: f32 = 0.5;
const JUDGE_TEMPERATURE: f32 = 0.2;

/// Raw candidate as the collaborator returns it. Type and difficulty stay
/// strings until validated so one bad record never poisons the batch.
#[derive(Debug, Deserialize)]
struct ResourceCandidate {
    title: String,
    #[serde(rename = "type")]
    kind: String,
    url: String,
    estimated_hours: f64,
    difficulty: String,
    skills_covered: Vec<String>,
}

impl ResourceCandidate {
    /// Validates the candidate and stamps it with the gap-derived relevance.
    fn into_resource(self, relevance_score: f64) -> Result<LearningResource, String> {
        let kind: ResourceType = self.kind.parse().map_err(|e| format!("type: {e}"))?;
        let difficulty: Difficulty = self
            .difficulty
            .parse()
            .map_err(|e| format!("difficulty: {e}"))?;

        if self.estimated_hours.is_nan() || self.estimated_hours <= 0.0 {
            return Err(format!("estimated_hours must be positive, got {}", self.estimated_hours));
        }
        if self.skills_covered.iter().all(|s| s.trim().is_empty()) {
            return Err("skills_covered is empty".to_string());
        }

        Ok(LearningResource {
            title: self.title,
            kind,
            url: self.url,
            estimated_hours: self.estimated_hours,
            difficulty,
            relevance_score,
            skills_covered: self.skills_covered,
        })
    }
}

/// Requests up to `max_per_skill` resources for each of the first
/// `GAP_LIMIT` gaps, then ranks the lot.
///
/// Any collaborator failure fails the whole call.
pub async fn curate_resources(
    generator: &dyn TextGenerator,
    gaps: &[SkillGap],
    max_per_skill: usize,
) -> Result<Vec<LearningResource>, LlmError> {
    let system = json_system(RESOURCE_PERSONA);
    let mut resources = Vec::new();

    for gap in gaps.iter().take(GAP_LIMIT) {
        let prompt = RESOURCE_PROMPT_TEMPLATE
            .replace("{count}", &max_per_skill.to_string())
            .replace("{skill}", &gap.skill)
            .replace("{importance}", &format!("{:.2}", gap.importance));

        let reply = generator
            .generate_structured(&system, &prompt, RESOURCE_TEMPERATURE)
            .await?;

        let relevance = gap.priority();
        let accepted = into_records(reply)
            .into_iter()
            .filter_map(|record| {
                let candidate = match serde_json::from_value::<ResourceCandidate>(record) {
                    Ok(c) => c,
                    Err(e) => {
                        warn!("Dropping malformed resource for '{}': {e}", gap.skill);
                        return None;
                    }
                };
                match candidate.into_resource(relevance) {
                    Ok(r) => Some(r),
                    Err(reason) => {
                        warn!("Dropping resource for '{}': {reason}", gap.skill);
                        None
                    }
                }
            })
            .take(max_per_skill);

        let before = resources.len();
        resources.extend(accepted);
        debug!("{} resources accepted for '{}'", resources.len() - before, gap.skill);
    }

    let resources = rank_resources(resources);
    info!(
        resources_curated = resources.len(),
        "Curated learning resources for {} gaps",
        gaps.len().min(GAP_LIMIT)
    );
    Ok(resources)
}

/// Stable sort by relevance descending, truncated to `MAX_RESOURCES`.
pub fn rank_resources(mut resources: Vec<LearningResource>) -> Vec<LearningResource> {
    resources.sort_by(|a, b| {
        b.relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(Ordering::Equal)
    });
    resources.truncate(MAX_RESOURCES);
    resources
}

/// Removes repeats of the same (title, url), keeping the first occurrence.
pub fn dedupe_resources(resources: Vec<LearningResource>) -> Vec<LearningResource> {
    let mut seen = HashSet::new();
    resources
        .into_iter()
        .filter(|r| seen.insert((r.title.clone(), r.url.clone())))
        .collect()
}

/// Asks the collaborator to rate one resource. Returns a score in [0, 1].
pub async fn judge_resource_quality(
    generator: &dyn TextGenerator,
    resource: &LearningResource,
) -> Result<f64, LlmError> {
    let kind = serde_json::to_value(resource.kind)?;
    let prompt = JUDGE_PROMPT_TEMPLATE
        .replace("{title}", &resource.title)
        .replace("{kind}", kind.as_str().unwrap_or_default())
        .replace("{url}", &resource.url)
        .replace("{skills}", &resource.skills_covered.join(", "));

    let reply = generator
        .generate(JUDGE_SYSTEM, &prompt, JUDGE_TEMPERATURE)
        .await?;

    let score = match reply.trim().parse::<f64>() {
        Ok(score) => score,
        Err(_) => decode::<f64>(&reply)?,
    };

    if !(0.0..=1.0).contains(&score) {
        return Err(LlmError::Invalid(format!(
            "quality score {score} outside [0, 1]"
        )));
    }

    debug!("Judged '{}' at {score:.2}", resource.title);
    Ok(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedGenerator;

    fn gap(skill: &str, importance: f64, confidence: f64) -> SkillGap {
        SkillGap {
            skill: skill.to_string(),
            importance,
            frequency_in_jobs: 4,
            confidence,
            reasoning: "needed".to_string(),
        }
    }

    fn resource(title: &str, relevance: f64) -> LearningResource {
        LearningResource {
            title: title.to_string(),
            kind: ResourceType::Article,
            url: format!("https://example.org/{title}"),
            estimated_hours: 2.0,
            difficulty: Difficulty::Intermediate,
            relevance_score: relevance,
            skills_covered: vec!["sql".to_string()],
        }
    }

    const TWO_RESOURCES: &str = r#"[
        {"title": "Docker Mastery", "type": "Course", "url": "https://udemy.com/docker",
         "estimated_hours": 20, "difficulty": "beginner", "skills_covered": ["docker"],
         "relevance_score": 0.99},
        {"title": "Compose Project", "type": "project", "url": "https://github.com/x/compose",
         "estimated_hours": 4.5, "difficulty": "intermediate", "skills_covered": ["docker", "compose"]}
    ]"#;

    #[tokio::test]
    async fn test_relevance_is_overwritten_with_gap_priority() {
        let generator = ScriptedGenerator::new(vec![TWO_RESOURCES]);
        let gaps = vec![gap("docker", 0.5, 0.8)];

        let resources = curate_resources(&generator, &gaps, 3).await.unwrap();

        assert_eq!(resources.len(), 2);
        assert!(resources
            .iter()
            .all(|r| (r.relevance_score - 0.4).abs() < 1e-12));
        assert_eq!(resources[0].kind, ResourceType::Course);
        assert!(generator.prompts()[0].contains("Find 3 high-quality learning resources for: docker"));
    }

    #[tokio::test]
    async fn test_invalid_candidates_are_dropped() {
        let reply = r#"[
            {"title": "Podcast", "type": "podcast", "url": "u", "estimated_hours": 1,
             "difficulty": "beginner", "skills_covered": ["sql"]},
            {"title": "Zero", "type": "video", "url": "u", "estimated_hours": 0,
             "difficulty": "beginner", "skills_covered": ["sql"]},
            {"title": "No skills", "type": "video", "url": "u", "estimated_hours": 1,
             "difficulty": "beginner", "skills_covered": []},
            {"title": "Expert", "type": "video", "url": "u", "estimated_hours": 1,
             "difficulty": "expert", "skills_covered": ["sql"]},
            {"title": "No url", "type": "video", "estimated_hours": 1,
             "difficulty": "beginner", "skills_covered": ["sql"]},
            {"title": "SQL Basics", "type": "video", "url": "u", "estimated_hours": 1,
             "difficulty": "beginner", "skills_covered": ["sql"]}
        ]"#;
        let generator = ScriptedGenerator::new(vec![reply]);

        let resources = curate_resources(&generator, &[gap("sql", 1.0, 1.0)], 5)
            .await
            .unwrap();

        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].title, "SQL Basics");
    }

    #[tokio::test]
    async fn test_only_first_five_gaps_are_curated() {
        let generator = ScriptedGenerator::from_fn(|_, _| Ok(TWO_RESOURCES.to_string()));
        let gaps: Vec<_> = (0..8).map(|i| gap(&format!("s{i}"), 1.0, 0.9)).collect();

        let resources = curate_resources(&generator, &gaps, 3).await.unwrap();

        assert_eq!(generator.prompts().len(), GAP_LIMIT);
        assert_eq!(resources.len(), 10);
    }

    #[tokio::test]
    async fn test_per_skill_cap_applies() {
        let generator = ScriptedGenerator::new(vec![TWO_RESOURCES]);
        let resources = curate_resources(&generator, &[gap("docker", 1.0, 1.0)], 1)
            .await
            .unwrap();
        assert_eq!(resources.len(), 1);
    }

    #[tokio::test]
    async fn test_collaborator_failure_propagates() {
        let generator = ScriptedGenerator::failing();
        let result = curate_resources(&generator, &[gap("docker", 1.0, 1.0)], 3).await;
        assert!(matches!(result, Err(LlmError::Api { status: 503, .. })));
    }

    #[tokio::test]
    async fn test_resource_output_invariants() {
        let generator = ScriptedGenerator::from_fn(|_, _| Ok(TWO_RESOURCES.to_string()));
        let gaps = vec![
            gap("a", 0.3, 0.5),
            gap("b", 1.0, 0.9),
            gap("c", 0.6, 0.6),
            gap("d", 0.9, 0.2),
            gap("e", 0.8, 0.8),
        ];
        let resources = curate_resources(&generator, &gaps, 3).await.unwrap();

        assert!(resources.len() <= MAX_RESOURCES);
        assert!(resources
            .windows(2)
            .all(|w| w[0].relevance_score >= w[1].relevance_score));
        let priorities: Vec<f64> = gaps.iter().map(SkillGap::priority).collect();
        assert!(resources
            .iter()
            .all(|r| priorities.iter().any(|p| (p - r.relevance_score).abs() < 1e-12)));
    }

    #[test]
    fn test_rank_is_stable_and_truncates() {
        let mut input: Vec<_> = (0..20).map(|i| resource(&format!("r{i}"), 0.5)).collect();
        input.push(resource("top", 0.9));

        let ranked = rank_resources(input);

        assert_eq!(ranked.len(), MAX_RESOURCES);
        assert_eq!(ranked[0].title, "top");
        assert_eq!(ranked[1].title, "r0");
        assert_eq!(ranked[14].title, "r13");
    }

    #[test]
    fn test_dedupe_keeps_first_by_title_and_url() {
        let mut other_url = resource("a", 0.1);
        other_url.url = "https://elsewhere.org/a".to_string();
        let input = vec![resource("a", 0.9), resource("b", 0.5), resource("a", 0.2), other_url];

        let deduped = dedupe_resources(input);

        assert_eq!(deduped.len(), 3);
        assert_eq!(deduped[0].relevance_score, 0.9);
    }

    #[tokio::test]
    async fn test_judge_parses_plain_number() {
        let generator = ScriptedGenerator::new(vec![" 0.85\n"]);
        let score = judge_resource_quality(&generator, &resource("SQL", 0.5))
            .await
            .unwrap();
        assert!((score - 0.85).abs() < 1e-12);
        assert!(generator.prompts()[0].contains("Type: article"));
    }

    #[tokio::test]
    async fn test_judge_rejects_out_of_range_and_prose() {
        let generator = ScriptedGenerator::new(vec!["7", "pretty good overall"]);
        let r = resource("SQL", 0.5);

        assert!(matches!(
            judge_resource_quality(&generator, &r).await,
            Err(LlmError::Invalid(_))
        ));
        assert!(judge_resource_quality(&generator, &r).await.is_err());
    }
}
