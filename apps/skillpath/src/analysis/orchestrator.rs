//! Pipeline orchestration.
//!
//! Flow: job market → aggregate skills → skill gaps → resources → schedule → evaluate.
//!
//! Each LLM-backed stage runs against the configured generator. When there is no
//! generator, or the stage fails, that stage's deterministic fallback output is
//! used instead and the stage is listed in `fallback_stages`. A run therefore
//! always ends with a complete result.

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::evaluation::{evaluate_gaps, evaluate_resources, GapEvaluation, ResourceEvaluation};
use crate::analysis::fallback;
use crate::analysis::job_market::{aggregate_skills, fetch_job_postings};
use crate::analysis::resources::curate_resources;
use crate::analysis::schedule::build_schedule;
use crate::analysis::skill_gap::analyze_gaps;
use crate::config::PipelineSettings;
use crate::llm_client::{LlmError, TextGenerator};
use crate::models::analysis::AnalysisResult;
use crate::models::profile::UserProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    JobMarket,
    SkillGaps,
    Resources,
}

/// Everything a caller needs to render one analysis.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub result: AnalysisResult,
    pub gap_evaluation: GapEvaluation,
    pub resource_evaluation: ResourceEvaluation,
    pub evaluation_summary: Vec<String>,
    pub fallback_stages: Vec<Stage>,
}

/// Immutable after construction; shared across requests behind `Arc`.
pub struct PipelineOrchestrator {
    generator: Option<Arc<dyn TextGenerator>>,
    settings: PipelineSettings,
}

impl PipelineOrchestrator {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>, settings: PipelineSettings) -> Self {
        Self {
            generator,
            settings,
        }
    }

    /// An orchestrator that never calls a collaborator.
    pub fn fallback_only(settings: PipelineSettings) -> Self {
        Self::new(None, settings)
    }

    pub fn mode(&self) -> &'static str {
        if self.generator.is_some() {
            "live"
        } else {
            "fallback"
        }
    }

    pub fn generator(&self) -> Option<&dyn TextGenerator> {
        self.generator.as_deref()
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Runs the pipeline with the schedule starting now (local time).
    pub async fn run(&self, profile: UserProfile) -> PipelineReport {
        self.run_from(profile, Local::now().naive_local()).await
    }

    /// Runs the pipeline with the schedule starting at `start`.
    pub async fn run_from(&self, profile: UserProfile, start: NaiveDateTime) -> PipelineReport {
        let run_id = Uuid::new_v4();
        let settings = &self.settings;
        let mut fallback_stages = Vec::new();
        info!(%run_id, mode = self.mode(), "Starting analysis for {}", profile.name);

        // Stage 1: job market
        let live = match self.generator() {
            Some(g) => Some(
                fetch_job_postings(
                    g,
                    &profile.target_role,
                    &profile.industry,
                    settings.job_posting_limit,
                )
                .await,
            ),
            None => None,
        };
        let postings = settle(Stage::JobMarket, live, &mut fallback_stages, || {
            fallback::job_postings(
                &profile.target_role,
                &profile.industry,
                settings.job_posting_limit,
            )
        });

        let market = aggregate_skills(&postings);
        info!(%run_id, unique_skills = market.len(), "Aggregated market skills");
        if market.is_empty() {
            warn!(%run_id, "Postings name no skills; no gaps can be derived");
        }

        // Stage 2: skill gaps
        let live = match self.generator() {
            Some(g) => Some(analyze_gaps(g, &profile, &market).await),
            None => None,
        };
        let gaps = settle(Stage::SkillGaps, live, &mut fallback_stages, || {
            fallback::skill_gaps(&profile, &market)
        });

        // Stage 3: resources
        let live = match self.generator() {
            Some(g) => Some(curate_resources(g, &gaps, settings.max_resources_per_skill).await),
            None => None,
        };
        let resources: Vec<_> = settle(Stage::Resources, live, &mut fallback_stages, || {
            fallback::learning_resources(&gaps, settings.max_resources_per_skill)
        })
        .into_iter()
        .map(Arc::new)
        .collect();

        // Stage 4: schedule
        let schedule = build_schedule(&resources, settings.daily_minutes, settings.days_ahead, start);

        let result = AnalysisResult::new(profile, postings, gaps, resources, schedule);

        // Stage 5: evaluation
        let gap_evaluation = evaluate_gaps(result.skill_gaps(), result.job_postings());
        let resource_evaluation = evaluate_resources(result.learning_resources(), result.skill_gaps());
        let evaluation_summary = gap_evaluation.summary();

        info!(
            %run_id,
            jobs_scraped = result.job_postings().len(),
            skill_gaps_identified = result.skill_gaps().len(),
            resources_curated = result.learning_resources().len(),
            sessions_scheduled = result.schedule().len(),
            grounding_score = gap_evaluation.grounding_score,
            hallucination_rate = gap_evaluation.hallucination_rate,
            gap_quality = gap_evaluation.overall_quality,
            resource_quality = resource_evaluation.resource_quality,
            coverage = resource_evaluation.coverage,
            fallback_stages = fallback_stages.len(),
            created_at = %result.created_at(),
            "Analysis complete for {}",
            result.profile().name
        );

        PipelineReport {
            run_id,
            result,
            gap_evaluation,
            resource_evaluation,
            evaluation_summary,
            fallback_stages,
        }
    }
}

/// Resolves one stage: the live output when present and successful, otherwise
/// the fallback, recording the stage as a fallback stage.
fn settle<T>(
    stage: Stage,
    live: Option<Result<T, LlmError>>,
    fallback_stages: &mut Vec<Stage>,
    fallback: impl FnOnce() -> T,
) -> T {
    match live {
        Some(Ok(output)) => output,
        Some(Err(e)) => {
            warn!("{stage:?} stage failed, using fallback: {e}");
            fallback_stages.push(stage);
            fallback()
        }
        None => {
            fallback_stages.push(stage);
            fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::resources::MAX_RESOURCES;
    use crate::analysis::skill_gap::MAX_GAPS;
    use crate::llm_client::testing::ScriptedGenerator;
    use chrono::{Datelike, NaiveDate, Weekday};

    const POSTINGS: &str = r#"[
        {"title": "ML Engineer", "company": "TechCorp", "required_skills": ["Python", "PyTorch", "SQL"],
         "preferred_skills": ["AWS"], "description": "Ship models."},
        {"title": "Senior ML Engineer", "company": "DataCo", "required_skills": ["Python", "PyTorch"],
         "preferred_skills": ["Docker", "AWS"], "description": "Lead models."}
    ]"#;

    const RESOURCES: &str = r#"[
        {"title": "Hands-on Guide", "type": "video", "url": "https://youtube.com/guide",
         "estimated_hours": 1.5, "difficulty": "beginner", "skills_covered": ["pytorch", "aws"]}
    ]"#;

    fn profile() -> UserProfile {
        UserProfile {
            name: "Alex Johnson".to_string(),
            current_role: "Software Engineer".to_string(),
            target_role: "Senior Machine Learning Engineer".to_string(),
            skills: vec!["Python".to_string(), "SQL".to_string()],
            experience_years: 3,
            industry: "Technology".to_string(),
            resume_text: None,
        }
    }

    fn monday() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn live_generator() -> ScriptedGenerator {
        ScriptedGenerator::from_fn(|system, _| {
            let reply = if system.contains("job market analyst") {
                POSTINGS
            } else if system.contains("career advisor") {
                r#"{"confidence": 0.8, "reasoning": "Frequently required."}"#
            } else {
                RESOURCES
            };
            Ok(reply.to_string())
        })
    }

    fn assert_invariants(report: &PipelineReport) {
        let result = &report.result;
        let gaps = result.skill_gaps();
        assert!(gaps.len() <= MAX_GAPS);
        assert!(gaps.iter().all(|g| !result.profile().has_skill(&g.skill)));
        assert!(gaps.windows(2).all(|w| w[0].priority() >= w[1].priority()));

        let resources = result.learning_resources();
        assert!(resources.len() <= MAX_RESOURCES);
        assert!(resources
            .windows(2)
            .all(|w| w[0].relevance_score >= w[1].relevance_score));
        assert!(resources.iter().all(|r| gaps
            .iter()
            .any(|g| (g.priority() - r.relevance_score).abs() < 1e-12)));

        assert!(result
            .schedule()
            .iter()
            .all(|s| !matches!(s.scheduled_time.weekday(), Weekday::Sat | Weekday::Sun)));
        if report.gap_evaluation.total_gaps > 0 {
            let sum = report.gap_evaluation.grounding_score + report.gap_evaluation.hallucination_rate;
            assert!((sum - 1.0).abs() < 1e-12);
        }
    }

    #[tokio::test]
    async fn test_live_run_uses_collaborator_everywhere() {
        let generator = Arc::new(live_generator());
        let orchestrator =
            PipelineOrchestrator::new(Some(generator.clone()), PipelineSettings::default());

        let report = orchestrator.run_from(profile(), monday()).await;

        assert!(report.fallback_stages.is_empty());
        assert_eq!(orchestrator.mode(), "live");
        let result = &report.result;
        assert_eq!(result.job_postings().len(), 2);
        // pytorch 4, aws 2, docker 1; python and sql are already known
        let skills: Vec<&str> = result.skill_gaps().iter().map(|g| g.skill.as_str()).collect();
        assert_eq!(skills, vec!["pytorch", "aws", "docker"]);
        assert_eq!(result.learning_resources().len(), 3);
        assert_eq!(report.gap_evaluation.grounding_score, 1.0);
        assert_eq!(report.resource_evaluation.coverage, 2.0 / 3.0);
        assert_eq!(report.evaluation_summary.len(), 4);
        // 1 posting call + 3 gap assessments + 3 resource calls
        assert_eq!(generator.prompts().len(), 7);
        assert_invariants(&report);
    }

    #[tokio::test]
    async fn test_schedule_shares_resource_arcs() {
        let orchestrator =
            PipelineOrchestrator::new(Some(Arc::new(live_generator())), PipelineSettings::default());
        let report = orchestrator.run_from(profile(), monday()).await;

        let result = &report.result;
        let first = &result.schedule()[0];
        assert!(Arc::ptr_eq(&first.resource, &result.learning_resources()[0]));
        assert_eq!(first.duration_minutes, 30);
        assert_eq!(first.scheduled_time.date(), monday().date());
    }

    #[tokio::test]
    async fn test_no_collaborator_falls_back_on_every_stage() {
        let orchestrator = PipelineOrchestrator::fallback_only(PipelineSettings::default());

        let report = orchestrator.run_from(profile(), monday()).await;

        assert_eq!(orchestrator.mode(), "fallback");
        assert_eq!(
            report.fallback_stages,
            vec![Stage::JobMarket, Stage::SkillGaps, Stage::Resources]
        );
        assert_eq!(report.result.job_postings().len(), 5);
        assert!(!report.result.skill_gaps().is_empty());
        assert!(!report.result.learning_resources().is_empty());
        assert!(!report.result.schedule().is_empty());
        assert_invariants(&report);
    }

    #[tokio::test]
    async fn test_failing_collaborator_falls_back() {
        let orchestrator = PipelineOrchestrator::new(
            Some(Arc::new(ScriptedGenerator::failing())),
            PipelineSettings::default(),
        );

        let report = orchestrator.run_from(profile(), monday()).await;

        assert_eq!(report.fallback_stages.len(), 3);
        assert_invariants(&report);
    }

    #[tokio::test]
    async fn test_single_stage_failure_only_falls_back_that_stage() {
        let generator = ScriptedGenerator::from_fn(|system, _| {
            if system.contains("job market analyst") {
                Ok(POSTINGS.to_string())
            } else if system.contains("career advisor") {
                Ok("I am not sure.".to_string())
            } else {
                Ok(RESOURCES.to_string())
            }
        });
        let orchestrator =
            PipelineOrchestrator::new(Some(Arc::new(generator)), PipelineSettings::default());

        let report = orchestrator.run_from(profile(), monday()).await;

        assert_eq!(report.fallback_stages, vec![Stage::SkillGaps]);
        // Fallback gaps still come from the live market
        assert!(report
            .result
            .skill_gaps()
            .iter()
            .all(|g| ["pytorch", "aws", "docker"].contains(&g.skill.as_str())));
        assert_invariants(&report);
    }

    #[tokio::test]
    async fn test_empty_posting_reply_is_a_stage_failure() {
        let generator = ScriptedGenerator::from_fn(|system, _| {
            if system.contains("job market analyst") {
                Ok("[]".to_string())
            } else if system.contains("career advisor") {
                Ok(r#"{"confidence": 0.7, "reasoning": "r"}"#.to_string())
            } else {
                Ok(RESOURCES.to_string())
            }
        });
        let orchestrator =
            PipelineOrchestrator::new(Some(Arc::new(generator)), PipelineSettings::default());

        let report = orchestrator.run_from(profile(), monday()).await;

        assert_eq!(report.fallback_stages, vec![Stage::JobMarket]);
        assert_eq!(report.result.job_postings().len(), 5);
    }

    #[test]
    fn test_stage_serializes_snake_case() {
        let value = serde_json::to_value(Stage::JobMarket).unwrap();
        assert_eq!(value, "job_market");
    }
}
