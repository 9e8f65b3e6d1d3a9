//! Evaluation: pure quality metrics over gaps and resources.
//! No collaborator calls and no state between calls.

use std::borrow::Borrow;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::learning::{LearningResource, ResourceType, SkillGap};
use crate::models::profile::{normalize_skill, JobPosting};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapWeights {
    pub grounding: f64,
    pub confidence: f64,
    pub importance: f64,
}

impl Default for GapWeights {
    fn default() -> Self {
        Self {
            grounding: 0.4,
            confidence: 0.3,
            importance: 0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceWeights {
    pub relevance: f64,
    pub coverage: f64,
    pub diversity: f64,
}

impl Default for ResourceWeights {
    fn default() -> Self {
        Self {
            relevance: 0.5,
            coverage: 0.3,
            diversity: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapEvaluation {
    /// Fraction of gaps whose skill appears in some posting.
    pub grounding_score: f64,
    pub hallucination_rate: f64,
    pub avg_confidence: f64,
    pub avg_importance: f64,
    pub overall_quality: f64,
    pub grounded_gaps: usize,
    pub hallucinated_gaps: usize,
    pub total_gaps: usize,
}

impl GapEvaluation {
    /// Human-readable verdicts, one line each for grounding, hallucination,
    /// confidence and overall quality.
    pub fn summary(&self) -> Vec<String> {
        let grounding = if self.grounding_score > 0.9 {
            "Excellent grounding: all recommendations are based on job data".to_string()
        } else if self.grounding_score > 0.7 {
            "Good grounding: most recommendations are data-driven".to_string()
        } else {
            "Warning: some recommendations may not be grounded in job data".to_string()
        };

        let hallucination = if self.hallucination_rate == 0.0 {
            "Zero hallucinations detected".to_string()
        } else if self.hallucination_rate < 0.2 {
            "Low hallucination rate".to_string()
        } else {
            format!(
                "Warning: {:.0}% hallucination rate detected",
                self.hallucination_rate * 100.0
            )
        };

        let confidence = if self.avg_confidence > 0.8 {
            "High confidence in recommendations"
        } else if self.avg_confidence > 0.6 {
            "Moderate confidence: recommendations are reasonable"
        } else {
            "Low confidence: may need human review"
        };

        let overall = if self.overall_quality > 0.8 {
            "Overall: excellent quality"
        } else if self.overall_quality > 0.6 {
            "Overall: good quality"
        } else {
            "Overall: needs improvement"
        };

        vec![
            grounding,
            hallucination,
            confidence.to_string(),
            overall.to_string(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceEvaluation {
    pub resource_quality: f64,
    /// Fraction of distinct gap skills covered by at least one resource.
    pub coverage: f64,
    pub avg_relevance: f64,
    /// Fraction of the four resource types present.
    pub diversity: f64,
    pub total_resources: usize,
}

fn mean(values: impl Iterator<Item = f64>, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        values.sum::<f64>() / count as f64
    }
}

/// Scores gaps against the skills actually present in `postings`.
pub fn evaluate_gaps(gaps: &[SkillGap], postings: &[JobPosting]) -> GapEvaluation {
    let weights = GapWeights::default();
    let posting_skills: HashSet<String> = postings
        .iter()
        .flat_map(|p| p.required_skills.iter().chain(&p.preferred_skills))
        .map(|s| normalize_skill(s))
        .collect();

    let total_gaps = gaps.len();
    let grounded_gaps = gaps
        .iter()
        .filter(|g| posting_skills.contains(&normalize_skill(&g.skill)))
        .count();
    let hallucinated_gaps = total_gaps - grounded_gaps;

    let (grounding_score, hallucination_rate) = if total_gaps == 0 {
        (0.0, 0.0)
    } else {
        (
            grounded_gaps as f64 / total_gaps as f64,
            hallucinated_gaps as f64 / total_gaps as f64,
        )
    };
    let avg_confidence = mean(gaps.iter().map(|g| g.confidence), total_gaps);
    let avg_importance = mean(gaps.iter().map(|g| g.importance), total_gaps);

    GapEvaluation {
        grounding_score,
        hallucination_rate,
        avg_confidence,
        avg_importance,
        overall_quality: weights.grounding * grounding_score
            + weights.confidence * avg_confidence
            + weights.importance * avg_importance,
        grounded_gaps,
        hallucinated_gaps,
        total_gaps,
    }
}

/// Scores a resource list against the gaps it was curated for.
/// Accepts owned resources or the `Arc`s held by an analysis result.
pub fn evaluate_resources<R>(resources: &[R], gaps: &[SkillGap]) -> ResourceEvaluation
where
    R: Borrow<LearningResource>,
{
    let weights = ResourceWeights::default();
    let gap_skills: HashSet<String> = gaps.iter().map(|g| normalize_skill(&g.skill)).collect();
    let covered: HashSet<String> = resources
        .iter()
        .flat_map(|r| r.borrow().skills_covered.iter())
        .map(|s| normalize_skill(s))
        .collect();

    let coverage = if gap_skills.is_empty() {
        0.0
    } else {
        gap_skills.intersection(&covered).count() as f64 / gap_skills.len() as f64
    };
    let avg_relevance = mean(
        resources.iter().map(|r| r.borrow().relevance_score),
        resources.len(),
    );
    let kinds: HashSet<_> = resources.iter().map(|r| r.borrow().kind).collect();
    let diversity = kinds.len() as f64 / ResourceType::ALL.len() as f64;

    ResourceEvaluation {
        resource_quality: weights.relevance * avg_relevance
            + weights.coverage * coverage
            + weights.diversity * diversity,
        coverage,
        avg_relevance,
        diversity,
        total_resources: resources.len(),
    }
}
