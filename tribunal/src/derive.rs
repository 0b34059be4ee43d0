//! Post-verdict derivers: artifacts computed from a terminal debate.
//!
//! All derivers trigger only once a debate is Terminal, are independent
//! and order-insensitive, and may fail individually without invalidating
//! the verdict already recorded.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::debate::state::DebateState;
use crate::debate::verdict::Verdict;

/// Importance of a skill gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapImportance {
    /// The posting requires the skill.
    Critical,
    /// The posting prefers the skill.
    High,
}

impl std::fmt::Display for GapImportance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Critical => write!(f, "critical"),
            Self::High => write!(f, "high"),
        }
    }
}

/// One missing skill with a learning plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillGap {
    pub skill: String,
    pub importance: GapImportance,
    pub learning_resources: Vec<String>,
    pub estimated_time_to_learn: String,
}

/// Error from a deriver.
#[derive(Debug, thiserror::Error)]
pub enum DeriveError {
    #[error("cover letter generation failed: {0}")]
    CoverLetter(String),
}

/// Cover-letter generator contract. The reasoning-backed implementation
/// lives with the agents; [`TemplateCoverWriter`] is the deterministic
/// fallback.
#[async_trait]
pub trait CoverWriter: Send + Sync {
    async fn write(&self, state: &DebateState, verdict: &Verdict) -> Result<String, DeriveError>;
}

/// Artifacts derived from one terminal debate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DerivedArtifacts {
    pub skill_gaps: Vec<SkillGap>,
    pub cover_letter: Option<String>,
    pub improvement_suggestions: Vec<String>,
}

/// Maximum preferred-skill gaps reported per debate.
const MAX_PREFERRED_GAPS: usize = 5;

/// Compute the skill-gap plan: required skills the candidate lacks, then
/// a capped set of preferred-skill gaps.
pub fn skill_gap_plan(state: &DebateState) -> Vec<SkillGap> {
    let have = &state.parsed.skills;
    let posting = &state.posting;

    let mut gaps: Vec<SkillGap> = posting
        .required_skills
        .iter()
        .filter(|s| !have.contains(*s))
        .map(|s| SkillGap {
            skill: s.clone(),
            importance: GapImportance::Critical,
            learning_resources: learning_resources(s),
            estimated_time_to_learn: estimate_learning_time(s),
        })
        .collect();

    gaps.extend(
        posting
            .preferred_skills
            .iter()
            .filter(|s| !have.contains(*s) && !posting.required_skills.contains(*s))
            .take(MAX_PREFERRED_GAPS)
            .map(|s| SkillGap {
                skill: s.clone(),
                importance: GapImportance::High,
                learning_resources: learning_resources(s),
                estimated_time_to_learn: estimate_learning_time(s),
            }),
    );

    gaps
}

/// Suggested resources for a skill. Curated entries for common stacks,
/// generic pointers otherwise.
fn learning_resources(skill: &str) -> Vec<String> {
    let curated: &[(&str, [&str; 3])] = &[
        (
            "python",
            [
                "Python.org official tutorial",
                "Real Python",
                "Codecademy Python course",
            ],
        ),
        (
            "kubernetes",
            [
                "Kubernetes official docs",
                "KodeKloud Kubernetes course",
                "CKAD certification",
            ],
        ),
        (
            "react",
            [
                "React official tutorial",
                "Frontend Masters React course",
                "Scrimba React course",
            ],
        ),
        (
            "aws",
            [
                "AWS free-tier labs",
                "A Cloud Guru",
                "AWS Solutions Architect certification",
            ],
        ),
        (
            "docker",
            [
                "Docker official get-started guide",
                "Docker Deep Dive (book)",
                "Play with Docker",
            ],
        ),
    ];

    let lower = skill.to_lowercase();
    for (key, resources) in curated {
        if lower.contains(key) || key.contains(lower.as_str()) {
            return resources.iter().map(|s| s.to_string()).collect();
        }
    }
    vec![
        format!("Official {skill} documentation"),
        format!("Udemy {skill} courses"),
        format!("YouTube {skill} tutorials"),
    ]
}

/// Rough time-to-learn estimate by skill complexity.
fn estimate_learning_time(skill: &str) -> String {
    const COMPLEX: &[&str] = &[
        "kubernetes",
        "machine learning",
        "system design",
        "distributed systems",
    ];
    const MEDIUM: &[&str] = &["docker", "react", "aws", "graphql", "typescript"];

    let lower = skill.to_lowercase();
    if COMPLEX.iter().any(|s| lower.contains(s)) {
        "3-6 months".to_string()
    } else if MEDIUM.iter().any(|s| lower.contains(s)) {
        "1-2 months".to_string()
    } else {
        "2-4 weeks".to_string()
    }
}

/// Maximum improvement suggestions reported per debate.
const MAX_SUGGESTIONS: usize = 5;

/// Actionable profile-improvement suggestions from the gaps, the
/// verdict's must-address list, and resume heuristics.
pub fn improvement_suggestions(state: &DebateState, gaps: &[SkillGap]) -> Vec<String> {
    let mut suggestions = Vec::new();

    if let Some(top) = gaps.iter().find(|g| g.importance == GapImportance::Critical) {
        suggestions.push(format!(
            "Priority: learn {} ({} estimated)",
            top.skill, top.estimated_time_to_learn
        ));
    }

    if let Some(verdict) = &state.verdict {
        for item in verdict.must_address.iter().take(2) {
            suggestions.push(format!("Address in applications: {item}"));
        }
    }

    if let Some(portfolio) = &state.parsed.portfolio {
        if portfolio.activity_level == "Low" {
            suggestions.push(
                "Increase code-portfolio activity: contribute to open source or create showcase projects"
                    .to_string(),
            );
        }
        if portfolio.public_repos < 5 {
            suggestions
                .push("Add more public repositories showcasing your skills".to_string());
        }
    } else if state.profile.portfolio_handle.is_some() {
        suggestions
            .push("Consider making key repositories public to demonstrate skills".to_string());
    }

    if state.profile.raw_resume.is_empty() {
        suggestions
            .push("Add a professional summary highlighting your key strengths".to_string());
    }

    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions
}

/// Deterministic cover letter built from the verdict's supporting
/// arguments. Used as the fallback when no reasoning backend is
/// configured or the backed writer fails.
pub struct TemplateCoverWriter;

#[async_trait]
impl CoverWriter for TemplateCoverWriter {
    async fn write(&self, state: &DebateState, verdict: &Verdict) -> Result<String, DeriveError> {
        let highlights: Vec<&str> = verdict
            .supporting_arguments
            .iter()
            .filter_map(|&i| state.arguments.get(i))
            .filter(|a| !a.is_failure())
            .map(|a| a.claim.as_str())
            .collect();

        let mut letter = format!(
            "Dear {} hiring team,\n\nI am writing to apply for the {} role. \
             My background in {} aligns closely with what you are looking for.\n",
            state.posting.org, state.posting.title, state.parsed.experience_summary
        );
        if !highlights.is_empty() {
            letter.push_str("\nIn particular:\n");
            for highlight in highlights {
                letter.push_str(&format!("- {highlight}\n"));
            }
        }
        letter.push_str(&format!("\nSincerely,\n{}\n", state.profile.name));
        Ok(letter)
    }
}

/// Run every deriver for a terminal debate.
///
/// A debate that has not reached Terminal, or terminated without a
/// verdict, yields empty artifacts. A failing cover writer yields no
/// letter but leaves the other artifacts intact.
pub async fn derive_artifacts(state: &DebateState, writer: &dyn CoverWriter) -> DerivedArtifacts {
    let Some(verdict) = state.verdict.as_ref().filter(|_| state.is_complete()) else {
        return DerivedArtifacts::default();
    };

    let skill_gaps = skill_gap_plan(state);
    let improvement_suggestions = improvement_suggestions(state, &skill_gaps);
    let cover_letter = match writer.write(state, verdict).await {
        Ok(letter) => Some(letter),
        Err(err) => {
            warn!(debate_id = %state.id, error = %err, "cover writer failed; verdict stands");
            None
        }
    };

    DerivedArtifacts {
        skill_gaps,
        cover_letter,
        improvement_suggestions,
    }
}
