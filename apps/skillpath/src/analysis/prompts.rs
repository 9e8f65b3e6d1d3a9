// All LLM prompt templates for the analysis pipeline.
// Placeholders in `{braces}` are replaced before sending.

pub const JOB_MARKET_PERSONA: &str = "You are a job market analyst.";

/// Replace `{limit}`, `{role}`, `{industry}`.
pub const JOB_MARKET_PROMPT_TEMPLATE: &str = r#"Generate {limit} realistic job postings for a {role} position in the {industry} industry.

Return ONLY a JSON array with exactly this structure:
[
  {
    "title": "job title",
    "company": "company name",
    "required_skills": ["skill1", "skill2", "skill3", "skill4", "skill5"],
    "preferred_skills": ["skill6", "skill7", "skill8"],
    "description": "brief 2-3 sentence description"
  }
]

Make it realistic with actual tech skills and real-sounding company names."#;

pub const GAP_ASSESSMENT_PERSONA: &str = "You are a career advisor.";

/// Replace `{current_role}`, `{target_role}`, `{experience_years}`,
/// `{current_skills}`, `{skill}`, `{frequency}`.
pub const GAP_ASSESSMENT_PROMPT_TEMPLATE: &str = r#"Analyze this skill gap:

User Profile:
- Current Role: {current_role}
- Target Role: {target_role}
- Experience: {experience_years} years
- Current Skills: {current_skills}

Missing Skill: {skill}
Frequency in job postings: {frequency}

Provide:
1. Confidence score (0-1) that this skill is truly important for their career transition
2. Brief reasoning (1 sentence)

Return as JSON: {"confidence": 0.0-1.0, "reasoning": "..."}"#;

pub const RESOURCE_PERSONA: &str = "You are a learning resource curator.";

/// Replace `{count}`, `{skill}`, `{importance}`.
pub const RESOURCE_PROMPT_TEMPLATE: &str = r#"Find {count} high-quality learning resources for: {skill}

Context: User needs to learn this for career transition. Importance: {importance}

For each resource provide:
- title
- type (course/article/video/project)
- url (use real platforms like Coursera, Udemy, YouTube, freeCodeCamp, etc.)
- estimated_hours (realistic estimate)
- difficulty (beginner/intermediate/advanced)
- skills_covered (list of specific skills)

Return as a JSON array of objects with exactly those keys."#;

pub const JUDGE_SYSTEM: &str = "You are an educational content evaluator. \
    Respond with a single number and nothing else.";

/// Replace `{title}`, `{kind}`, `{url}`, `{skills}`.
pub const JUDGE_PROMPT_TEMPLATE: &str = r#"Evaluate this learning resource quality:

Title: {title}
Type: {kind}
URL: {url}
Skills: {skills}

Rate from 0-1 based on:
- Credibility of source
- Comprehensiveness
- Practical applicability

Return only a number between 0 and 1."#;
