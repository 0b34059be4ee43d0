//! Core data model shared across the debate pipeline.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A single experience entry on a candidate profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub title: String,
    pub org: String,
    /// Duration in years.
    pub duration_years: f64,
    pub description: String,
}

/// Candidate profile as handed to the pipeline at intake.
///
/// Immutable once a debate starts. Enrichment results live in the
/// debate state's [`ParsedProfile`] view and are never written back here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    /// Normalized skill set.
    pub skills: BTreeSet<String>,
    /// Ordered, most recent first.
    pub experience: Vec<ExperienceEntry>,
    pub raw_resume: String,
    /// Handle for the code-portfolio enrichment source (e.g. a GitHub login).
    pub portfolio_handle: Option<String>,
}

impl Profile {
    /// Sum of the durations of all experience entries.
    pub fn total_years_experience(&self) -> f64 {
        self.experience.iter().map(|e| e.duration_years).sum()
    }
}

/// A job posting as returned by the similarity index. Shared by reference,
/// never copied per debate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: String,
    pub title: String,
    pub org: String,
    pub required_skills: BTreeSet<String>,
    pub preferred_skills: BTreeSet<String>,
    pub description: String,
    /// Minimum years of experience, when the posting states one.
    pub min_experience_years: Option<f64>,
}

impl JobPosting {
    /// Required and preferred skills combined.
    pub fn all_skills(&self) -> BTreeSet<String> {
        self.required_skills
            .union(&self.preferred_skills)
            .cloned()
            .collect()
    }
}

/// Code-portfolio summary merged in from the profile-analysis source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub public_repos: u32,
    /// Free-form activity classification from the source ("High", "Low", ...).
    #[serde(default)]
    pub activity_level: String,
}

/// Normalized view of a profile produced by the Profile Parser node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedProfile {
    pub skills: BTreeSet<String>,
    pub experience_summary: String,
    pub strengths: Vec<String>,
    pub total_years_experience: f64,
    pub portfolio: Option<PortfolioSummary>,
    /// True when the portfolio source was unavailable or out of date.
    pub portfolio_stale: bool,
}

impl ParsedProfile {
    /// Minimal parsed view built straight from intake data, used when the
    /// Profile Parser node is degraded.
    pub fn baseline(profile: &Profile) -> Self {
        let experience_summary = profile
            .experience
            .iter()
            .take(3)
            .map(|e| format!("{} at {}", e.title, e.org))
            .collect::<Vec<_>>()
            .join("; ");
        Self {
            skills: profile.skills.clone(),
            experience_summary,
            strengths: Vec::new(),
            total_years_experience: profile.total_years_experience(),
            portfolio: None,
            portfolio_stale: profile.portfolio_handle.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_profile() -> Profile {
        Profile {
            id: "cand-1".into(),
            name: "Ada".into(),
            skills: ["Python", "SQL"].iter().map(|s| s.to_string()).collect(),
            experience: vec![
                ExperienceEntry {
                    title: "Data Engineer".into(),
                    org: "Acme".into(),
                    duration_years: 3.0,
                    description: "Pipelines".into(),
                },
                ExperienceEntry {
                    title: "Analyst".into(),
                    org: "Initech".into(),
                    duration_years: 2.5,
                    description: "Reporting".into(),
                },
            ],
            raw_resume: "Ada, data engineer".into(),
            portfolio_handle: Some("ada".into()),
        }
    }

    #[test]
    fn test_total_years() {
        assert!((sample_profile().total_years_experience() - 5.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_all_skills_union() {
        let posting = JobPosting {
            id: "job-1".into(),
            title: "Backend Engineer".into(),
            org: "Globex".into(),
            required_skills: ["Python", "Go"].iter().map(|s| s.to_string()).collect(),
            preferred_skills: ["SQL"].iter().map(|s| s.to_string()).collect(),
            description: "Build services".into(),
            min_experience_years: Some(3.0),
        };
        let all = posting.all_skills();
        assert_eq!(all.len(), 3);
        assert!(all.contains("Go"));
        assert!(all.contains("SQL"));
    }

    #[test]
    fn test_baseline_parse() {
        let profile = sample_profile();
        let parsed = ParsedProfile::baseline(&profile);
        assert_eq!(parsed.skills, profile.skills);
        assert!(parsed.experience_summary.contains("Data Engineer at Acme"));
        assert!(parsed.portfolio_stale);
        assert!(parsed.portfolio.is_none());
    }

    #[test]
    fn test_profile_json_roundtrip() {
        let profile = sample_profile();
        let json = serde_json::to_string(&profile).unwrap();
        let parsed: Profile = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, profile);
    }
}
