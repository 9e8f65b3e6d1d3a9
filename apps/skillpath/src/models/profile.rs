use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical form used for every skill comparison: trimmed and lower-cased.
pub fn normalize_skill(skill: &str) -> String {
    skill.trim().to_lowercase()
}

/// The person being coached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub current_role: String,
    pub target_role: String,
    pub skills: Vec<String>,
    pub experience_years: u32,
    pub industry: String,
    #[serde(default)]
    pub resume_text: Option<String>,
}

impl UserProfile {
    /// The user's skills in canonical form.
    pub fn normalized_skills(&self) -> HashSet<String> {
        self.skills.iter().map(|s| normalize_skill(s)).collect()
    }

    #[cfg(test)]
    pub fn has_skill(&self, skill: &str) -> bool {
        let wanted = normalize_skill(skill);
        self.skills.iter().any(|s| normalize_skill(s) == wanted)
    }
}

/// One job posting used as market evidence.
/// `required_skills` and `preferred_skills` may overlap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    pub required_skills: Vec<String>,
    pub preferred_skills: Vec<String>,
    pub description: String,
    pub url: String,
    #[serde(default = "Utc::now")]
    pub scraped_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(skills: &[&str]) -> UserProfile {
        UserProfile {
            name: "Alex Johnson".to_string(),
            current_role: "Software Engineer".to_string(),
            target_role: "Machine Learning Engineer".to_string(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            experience_years: 3,
            industry: "Technology".to_string(),
            resume_text: None,
        }
    }

    #[test]
    fn test_has_skill_is_case_insensitive() {
        let p = profile(&["Python", " SQL "]);
        assert!(p.has_skill("python"));
        assert!(p.has_skill("sql"));
        assert!(!p.has_skill("aws"));
    }

    #[test]
    fn test_normalized_skills_dedupes_case_variants() {
        let p = profile(&["Python", "python", "PYTHON"]);
        assert_eq!(p.normalized_skills().len(), 1);
    }

    #[test]
    fn test_profile_deserializes_without_resume_text() {
        let json = r#"{
            "name": "Sam",
            "current_role": "Analyst",
            "target_role": "Data Scientist",
            "skills": ["Excel"],
            "experience_years": 2,
            "industry": "Finance"
        }"#;
        let p: UserProfile = serde_json::from_str(json).unwrap();
        assert!(p.resume_text.is_none());
    }

    #[test]
    fn test_negative_experience_is_rejected() {
        let json = r#"{
            "name": "Sam", "current_role": "A", "target_role": "B",
            "skills": [], "experience_years": -1, "industry": "C"
        }"#;
        assert!(serde_json::from_str::<UserProfile>(json).is_err());
    }
}
