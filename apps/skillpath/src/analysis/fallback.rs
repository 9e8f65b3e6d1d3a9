//! Deterministic stand-ins for every LLM-backed stage.
//!
//! Used when no collaborator is configured or a stage fails. Output is keyed on a
//! focus area derived from the target role and obeys the same ordering and range
//! rules as the live stages.

use chrono::Utc;

use crate::analysis::job_market::SkillFrequencyMap;
use crate::analysis::resources::{dedupe_resources, rank_resources, GAP_LIMIT};
use crate::analysis::skill_gap::{candidate_gaps, prioritize};
use crate::analysis::slugify;
use crate::models::learning::{Difficulty, LearningResource, ResourceType, SkillGap};
use crate::models::profile::{normalize_skill, JobPosting, UserProfile};

const REQUIRED_PER_POSTING: usize = 7;
const PREFERRED_PER_POSTING: usize = 4;
const DEFAULT_CONFIDENCE: f64 = 0.6;

const COMPANIES: [&str; 8] = [
    "TechCorp",
    "DataCo",
    "StartupXYZ",
    "ResearchLabs",
    "BigTech Inc",
    "InnovateSoft",
    "CloudSystems",
    "AI Dynamics",
];

const DESCRIPTIONS: [&str; 5] = [
    "Build and deploy solutions at scale on a modern stack in a fast-paced environment.",
    "Join our team to develop new products. Strong technical skills and a collaborative mindset required.",
    "Lead technical initiatives and mentor junior engineers. Experience with production systems essential.",
    "Design and implement scalable systems. Work on hard problems with real business impact.",
    "Drive technical excellence in a growing team and help shape architecture and practices.",
];

const ML_REQUIRED: &[&str] = &["Python", "Machine Learning", "Deep Learning", "PyTorch", "TensorFlow", "Statistics", "SQL", "Git"];
const ML_PREFERRED: &[&str] = &["MLOps", "AWS", "Docker", "Kubernetes", "Spark", "NLP", "Computer Vision"];
const DATA_REQUIRED: &[&str] = &["Python", "SQL", "Data Analysis", "Statistics", "Pandas", "NumPy", "Visualization", "Git"];
const DATA_PREFERRED: &[&str] = &["Tableau", "Power BI", "Spark", "AWS", "Machine Learning", "ETL"];
const BACKEND_REQUIRED: &[&str] = &["Python", "Java", "SQL", "REST APIs", "Microservices", "Git", "Docker", "Testing"];
const BACKEND_PREFERRED: &[&str] = &["Kubernetes", "AWS", "Redis", "GraphQL", "gRPC", "CI/CD"];
const FRONTEND_REQUIRED: &[&str] = &["JavaScript", "React", "HTML", "CSS", "TypeScript", "Git", "REST APIs", "Testing"];
const FRONTEND_PREFERRED: &[&str] = &["Next.js", "Vue", "Redux", "Webpack", "GraphQL", "UI/UX"];
const DEVOPS_REQUIRED: &[&str] = &["Linux", "Docker", "Kubernetes", "CI/CD", "AWS", "Git", "Python", "Terraform"];
const DEVOPS_PREFERRED: &[&str] = &["Ansible", "Jenkins", "Prometheus", "Grafana", "Helm", "ArgoCD"];
const GENERAL_REQUIRED: &[&str] = &["Python", "JavaScript", "SQL", "Git", "REST APIs", "Testing", "Agile", "Problem Solving"];
const GENERAL_PREFERRED: &[&str] = &["Docker", "AWS", "React", "CI/CD", "Microservices", "System Design"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    MachineLearning,
    Data,
    Backend,
    Frontend,
    DevOps,
    General,
}

impl Focus {
    /// First matching keyword family wins, checked in declaration order.
    pub fn from_role(role: &str) -> Self {
        let lower = role.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        let has_word = |w: &str| words.contains(&w);

        if lower.contains("machine learning") || has_word("ml") || has_word("ai") {
            Focus::MachineLearning
        } else if lower.contains("data") {
            Focus::Data
        } else if lower.contains("backend") || has_word("api") {
            Focus::Backend
        } else if lower.contains("frontend") || lower.contains("react") {
            Focus::Frontend
        } else if lower.contains("devops") || lower.contains("cloud") {
            Focus::DevOps
        } else {
            Focus::General
        }
    }

    fn skill_set(self) -> (&'static [&'static str], &'static [&'static str]) {
        match self {
            Focus::MachineLearning => (ML_REQUIRED, ML_PREFERRED),
            Focus::Data => (DATA_REQUIRED, DATA_PREFERRED),
            Focus::Backend => (BACKEND_REQUIRED, BACKEND_PREFERRED),
            Focus::Frontend => (FRONTEND_REQUIRED, FRONTEND_PREFERRED),
            Focus::DevOps => (DEVOPS_REQUIRED, DEVOPS_PREFERRED),
            Focus::General => (GENERAL_REQUIRED, GENERAL_PREFERRED),
        }
    }

    /// (skill, confidence, reasoning) known for this focus.
    fn assessments(self) -> &'static [(&'static str, f64, &'static str)] {
        match self {
            Focus::MachineLearning => &[
                ("Machine Learning", 0.95, "Core requirement across ML positions"),
                ("Deep Learning", 0.92, "Neural networks are the industry standard for modern ML"),
                ("PyTorch", 0.88, "Leading deep learning framework, highly valued by employers"),
                ("TensorFlow", 0.85, "Alternative framework that broadens the toolkit"),
                ("MLOps", 0.82, "Bridges model development and production deployment"),
                ("Statistics", 0.88, "Mathematical foundation for understanding algorithms"),
                ("Docker", 0.75, "Containerization is expected for ML deployment"),
                ("AWS", 0.78, "Many teams deploy models on AWS"),
                ("Kubernetes", 0.72, "Container orchestration for scaling model serving"),
                ("NLP", 0.70, "Growing demand in applied AI products"),
            ],
            Focus::Data => &[
                ("Data Analysis", 0.95, "Fundamental requirement for data roles"),
                ("SQL", 0.93, "Database querying is daily work"),
                ("Python", 0.92, "Primary language for analysis and tooling"),
                ("Statistics", 0.90, "Foundation of data science"),
                ("Pandas", 0.87, "Standard data manipulation library"),
                ("Visualization", 0.85, "Communicating insights to stakeholders"),
                ("Machine Learning", 0.80, "Predictive modeling is increasingly expected"),
                ("Tableau", 0.75, "Common BI tool in enterprise environments"),
                ("Spark", 0.72, "Large-scale data processing"),
                ("ETL", 0.70, "Pipeline skills for the engineering side of data work"),
            ],
            _ => &[
                ("System Design", 0.88, "Architecture skills expected for senior roles"),
                ("Microservices", 0.85, "Widely adopted architecture pattern"),
                ("Docker", 0.83, "Standard in modern development"),
                ("AWS", 0.80, "Most common deployment target"),
                ("CI/CD", 0.78, "Automation that improves delivery speed"),
                ("Testing", 0.82, "Critical for production code"),
                ("Kubernetes", 0.72, "Valuable for running services at scale"),
                ("GraphQL", 0.68, "Modern alternative to REST"),
                ("Redis", 0.65, "Caching for application performance"),
                ("Monitoring", 0.70, "Observability for production systems"),
            ],
        }
    }
}

/// (title, url, hours, difficulty) for skills with a well-known course.
fn catalog_course(skill: &str) -> Option<(&'static str, &'static str, f64, Difficulty)> {
    let entry = match skill {
        "machine learning" => (
            "Machine Learning Specialization",
            "https://www.coursera.org/specializations/machine-learning-introduction",
            60.0,
            Difficulty::Beginner,
        ),
        "deep learning" => (
            "Deep Learning Specialization",
            "https://www.coursera.org/specializations/deep-learning",
            80.0,
            Difficulty::Intermediate,
        ),
        "pytorch" => (
            "PyTorch for Deep Learning",
            "https://www.udemy.com/course/pytorch-for-deep-learning/",
            40.0,
            Difficulty::Intermediate,
        ),
        "tensorflow" => (
            "TensorFlow Developer Certificate",
            "https://www.coursera.org/professional-certificates/tensorflow-in-practice",
            50.0,
            Difficulty::Intermediate,
        ),
        "mlops" => (
            "MLOps Fundamentals",
            "https://www.coursera.org/learn/mlops-fundamentals",
            25.0,
            Difficulty::Advanced,
        ),
        "docker" => (
            "Docker Mastery",
            "https://www.udemy.com/course/docker-mastery/",
            20.0,
            Difficulty::Beginner,
        ),
        "aws" => (
            "AWS Certified Solutions Architect",
            "https://aws.amazon.com/certification/certified-solutions-architect-associate/",
            40.0,
            Difficulty::Intermediate,
        ),
        "kubernetes" => (
            "Kubernetes for Developers",
            "https://www.udemy.com/course/kubernetes-for-developers/",
            30.0,
            Difficulty::Intermediate,
        ),
        "sql" => (
            "Complete SQL Bootcamp",
            "https://www.udemy.com/course/the-complete-sql-bootcamp/",
            15.0,
            Difficulty::Beginner,
        ),
        "python" => (
            "Python for Everybody Specialization",
            "https://www.coursera.org/specializations/python",
            35.0,
            Difficulty::Beginner,
        ),
        _ => return None,
    };
    Some(entry)
}

/// Takes `count` items from `items`, starting at `offset` and wrapping.
fn rotated(items: &[&str], offset: usize, count: usize) -> Vec<String> {
    items
        .iter()
        .cycle()
        .skip(offset % items.len().max(1))
        .take(count.min(items.len()))
        .map(|s| s.to_string())
        .collect()
}

/// `limit` postings for `role`, each drawing a rotated slice of the focus skill set.
pub fn job_postings(role: &str, industry: &str, limit: usize) -> Vec<JobPosting> {
    let (required, preferred) = Focus::from_role(role).skill_set();
    let titles = [
        role.to_string(),
        format!("Senior {role}"),
        format!("{role} II"),
        format!("Lead {role}"),
        format!("{role} ({industry})"),
    ];

    (0..limit)
        .map(|i| {
            let company = COMPANIES[i % COMPANIES.len()];
            JobPosting {
                title: titles[i % titles.len()].clone(),
                company: company.to_string(),
                required_skills: rotated(required, i, REQUIRED_PER_POSTING),
                preferred_skills: rotated(preferred, i, PREFERRED_PER_POSTING),
                description: DESCRIPTIONS[i % DESCRIPTIONS.len()].to_string(),
                url: format!("https://example.com/jobs/{}/{}", slugify(company), i + 1),
                scraped_at: Utc::now(),
            }
        })
        .collect()
}

/// Gaps from the same candidates the live stage would assess, with confidence
/// and reasoning drawn from the focus table.
pub fn skill_gaps(profile: &UserProfile, market: &SkillFrequencyMap) -> Vec<SkillGap> {
    let assessments = Focus::from_role(&profile.target_role).assessments();

    let gaps = candidate_gaps(profile, market)
        .into_iter()
        .map(|candidate| {
            let known = assessments
                .iter()
                .find(|(skill, _, _)| normalize_skill(skill) == candidate.skill);
            let (confidence, reasoning) = match known {
                Some((_, confidence, reasoning)) => (*confidence, reasoning.to_string()),
                None => (
                    DEFAULT_CONFIDENCE,
                    format!(
                        "Listed in postings for {} with a demand score of {}",
                        profile.target_role, candidate.frequency
                    ),
                ),
            };
            SkillGap {
                skill: candidate.skill,
                importance: candidate.importance,
                frequency_in_jobs: candidate.frequency,
                confidence,
                reasoning,
            }
        })
        .collect();

    prioritize(gaps)
}

/// Up to `max_per_skill` resources for each of the first gaps: a catalog course
/// when one is known, a written guide, and a hands-on project.
pub fn learning_resources(gaps: &[SkillGap], max_per_skill: usize) -> Vec<LearningResource> {
    let mut resources = Vec::new();

    for gap in gaps.iter().take(GAP_LIMIT) {
        let relevance_score = gap.priority();
        let slug = slugify(&gap.skill);
        let skills_covered = vec![gap.skill.clone()];
        let mut for_gap = Vec::with_capacity(3);

        if let Some((title, url, hours, difficulty)) = catalog_course(&normalize_skill(&gap.skill)) {
            for_gap.push(LearningResource {
                title: title.to_string(),
                kind: ResourceType::Course,
                url: url.to_string(),
                estimated_hours: hours,
                difficulty,
                relevance_score,
                skills_covered: skills_covered.clone(),
            });
        }
        for_gap.push(LearningResource {
            title: format!("Complete Guide to {}", gap.skill),
            kind: ResourceType::Article,
            url: format!("https://medium.com/topic/{slug}"),
            estimated_hours: 2.0,
            difficulty: Difficulty::Intermediate,
            relevance_score,
            skills_covered: skills_covered.clone(),
        });
        for_gap.push(LearningResource {
            title: format!("Build a {} Project", gap.skill),
            kind: ResourceType::Project,
            url: format!("https://github.com/topics/{slug}"),
            estimated_hours: 6.0,
            difficulty: Difficulty::Intermediate,
            relevance_score,
            skills_covered,
        });

        resources.extend(for_gap.into_iter().take(max_per_skill));
    }

    rank_resources(dedupe_resources(resources))
}
