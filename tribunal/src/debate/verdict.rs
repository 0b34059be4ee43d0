//! Verdict types: the terminal outcome of a debate and the Judge's
//! per-pass assessment that feeds it.

use serde::{Deserialize, Serialize};

/// Terminal outcome of one debate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    Match,
    NoMatch,
    Borderline,
}

impl MatchOutcome {
    /// Map a 0-100 aggregate score onto an outcome band.
    pub fn from_score(score: f64) -> Self {
        if score >= 70.0 {
            Self::Match
        } else if score >= 40.0 {
            Self::Borderline
        } else {
            Self::NoMatch
        }
    }
}

impl std::fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Match => write!(f, "match"),
            Self::NoMatch => write!(f, "no_match"),
            Self::Borderline => write!(f, "borderline"),
        }
    }
}

/// The Judge node's output for one Judging pass.
///
/// Provisional: the orchestrator may send the debate back for one more
/// round instead of accepting it. Only the accepted assessment is turned
/// into a [`Verdict`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeAssessment {
    pub outcome: MatchOutcome,
    pub rationale: String,
    /// Confidence in [0, 1].
    pub confidence: f64,
    /// 0-100 aggregate match score.
    pub score: f64,
    /// Indices into the debate's argument log.
    pub supporting: Vec<usize>,
    /// Critical concerns the candidate must address.
    pub must_address: Vec<String>,
    /// Optional improvements.
    pub nice_to_have: Vec<String>,
}

/// The terminal, immutable outcome of one debate over one
/// (profile, posting) pair. Written exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub outcome: MatchOutcome,
    pub rationale: String,
    /// Confidence in [0, 1].
    pub confidence: f64,
    /// 0-100 aggregate match score.
    pub score: f64,
    /// Indices into the argument log of the claims the verdict rests on.
    pub supporting_arguments: Vec<usize>,
    pub must_address: Vec<String>,
    pub nice_to_have: Vec<String>,
    /// True when arbitration was degraded (judge failure or cancellation).
    /// Callers surface this as a low-confidence flag, never a hard failure.
    pub degraded: bool,
}

impl Verdict {
    /// Promote an accepted assessment. Supporting indices outside the
    /// argument log are dropped.
    pub fn from_assessment(assessment: JudgeAssessment, argument_count: usize) -> Self {
        Self {
            outcome: assessment.outcome,
            rationale: assessment.rationale,
            confidence: assessment.confidence.clamp(0.0, 1.0),
            score: assessment.score.clamp(0.0, 100.0),
            supporting_arguments: assessment
                .supporting
                .into_iter()
                .filter(|&i| i < argument_count)
                .collect(),
            must_address: assessment.must_address,
            nice_to_have: assessment.nice_to_have,
            degraded: false,
        }
    }

    /// Forced terminal verdict when the Judge exhausted its retries.
    pub fn arbitration_failure(reason: &str) -> Self {
        Self {
            outcome: MatchOutcome::Borderline,
            rationale: format!("arbitration failed: {reason}"),
            confidence: 0.0,
            score: 50.0,
            supporting_arguments: Vec::new(),
            must_address: Vec::new(),
            nice_to_have: Vec::new(),
            degraded: true,
        }
    }

    /// Terminal verdict for a cooperatively cancelled debate.
    pub fn cancelled() -> Self {
        Self {
            outcome: MatchOutcome::Borderline,
            rationale: "debate cancelled before completion".to_string(),
            confidence: 0.0,
            score: 50.0,
            supporting_arguments: Vec::new(),
            must_address: Vec::new(),
            nice_to_have: Vec::new(),
            degraded: true,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assessment(confidence: f64) -> JudgeAssessment {
        JudgeAssessment {
            outcome: MatchOutcome::Match,
            rationale: "strong overlap".into(),
            confidence,
            score: 82.0,
            supporting: vec![0, 1, 7],
            must_address: vec!["learn Go".into()],
            nice_to_have: Vec::new(),
        }
    }

    #[test]
    fn test_outcome_bands() {
        assert_eq!(MatchOutcome::from_score(85.0), MatchOutcome::Match);
        assert_eq!(MatchOutcome::from_score(70.0), MatchOutcome::Match);
        assert_eq!(MatchOutcome::from_score(55.0), MatchOutcome::Borderline);
        assert_eq!(MatchOutcome::from_score(40.0), MatchOutcome::Borderline);
        assert_eq!(MatchOutcome::from_score(20.0), MatchOutcome::NoMatch);
    }

    #[test]
    fn test_from_assessment_drops_dangling_indices() {
        let verdict = Verdict::from_assessment(assessment(0.8), 2);
        assert_eq!(verdict.supporting_arguments, vec![0, 1]);
        assert!(!verdict.degraded);
    }

    #[test]
    fn test_from_assessment_clamps_confidence() {
        let verdict = Verdict::from_assessment(assessment(1.4), 3);
        assert!((verdict.confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_arbitration_failure() {
        let verdict = Verdict::arbitration_failure("judge exhausted retries");
        assert_eq!(verdict.outcome, MatchOutcome::Borderline);
        assert!(verdict.rationale.contains("arbitration failed"));
        assert!(verdict.is_degraded());
        assert!(verdict.supporting_arguments.is_empty());
    }

    #[test]
    fn test_cancelled() {
        let verdict = Verdict::cancelled();
        assert_eq!(verdict.outcome, MatchOutcome::Borderline);
        assert!(verdict.is_degraded());
    }

    #[test]
    fn test_outcome_serde() {
        let json = serde_json::to_string(&MatchOutcome::NoMatch).unwrap();
        assert_eq!(json, "\"no_match\"");
        let parsed: MatchOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, MatchOutcome::NoMatch);
    }
}
