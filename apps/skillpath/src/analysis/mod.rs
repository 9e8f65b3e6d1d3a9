// Career analysis pipeline.
// Stages: job market → skill gaps → resources → schedule, with evaluation on the side.
// All LLM calls go through llm_client; every LLM-backed stage has a deterministic fallback.

pub mod evaluation;
pub mod fallback;
pub mod handlers;
pub mod job_market;
pub mod orchestrator;
pub mod prompts;
pub mod resources;
pub mod schedule;
pub mod skill_gap;

/// URL-safe lower-case slug: runs of non-alphanumerics collapse to a single `-`.
pub fn slugify(text: &str) -> String {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
