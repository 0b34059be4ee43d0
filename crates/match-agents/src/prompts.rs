//! Prompt templates for the LLM-backed agent nodes.
//!
//! Each builder renders the debate state into one [`PromptRequest`] and
//! pins the exact JSON schema the node parser expects.

use tribunal::{ArgumentAuthor, DebateState};

use crate::backend::PromptRequest;

const RECRUITER_SYSTEM: &str = "You are the Ruthless Recruiter in a structured hiring debate. \
You argue AGAINST the match: surface the single most serious new concern about this candidate \
for this posting (skill gaps, insufficient experience, missing progression). Be specific and \
cite evidence. You respond only with JSON.";

const COACH_SYSTEM: &str = "You are the Career Coach in a structured hiring debate. \
You argue FOR the candidate: surface the single most compelling new strength for this posting \
(matching skills, transferable experience, trajectory). Respond directly to the recruiter's \
latest concern when you can. You respond only with JSON.";

const JUDGE_SYSTEM: &str = "You are the Impartial Judge in a structured hiring debate. \
Weigh the recruiter's concerns against the coach's strengths, fairly and holistically, and \
deliver a verdict on the match. You respond only with JSON.";

const DEBATER_SCHEMA: &str = r#"Respond in JSON:
{"argument": {"claim": string, "cited_skills": [string], "cited_requirements": [string], "strength": "strong"|"medium"|"weak"} | null}
Return "argument": null when you have no genuinely new point to add."#;

const JUDGE_SCHEMA: &str = r#"Respond in JSON:
{"outcome": "match"|"no_match"|"borderline", "final_score": number (0-100), "confidence": number (0-1), "rationale": string, "supporting_arguments": [argument index numbers], "must_address": [string], "nice_to_have": [string]}"#;

/// Candidate and posting summary shared by all debate prompts.
fn matchup_summary(state: &DebateState) -> String {
    let parsed = &state.parsed;
    let posting = &state.posting;
    format!(
        "## Candidate\n{}\nSkills: {}\nYears of experience: {:.1}\n\n## Posting\n{} at {}: {}\nRequired: {}\nPreferred: {}",
        parsed.experience_summary,
        join_limited(parsed.skills.iter(), 20),
        parsed.total_years_experience,
        posting.title,
        posting.org,
        truncate(&posting.description, 500),
        join_limited(posting.required_skills.iter(), 15),
        join_limited(posting.preferred_skills.iter(), 15),
    )
}

/// The argument log rendered with stable indices for the judge to cite.
fn transcript(state: &DebateState) -> String {
    if state.arguments.is_empty() {
        return "(no arguments were raised)".to_string();
    }
    state
        .arguments
        .iter()
        .enumerate()
        .map(|(i, a)| {
            if a.is_failure() {
                format!("[{i}] {} (round {}): <failed to argue>", a.author, a.round)
            } else {
                format!(
                    "[{i}] {} (round {}, {}): {}",
                    a.author, a.round, a.strength, a.claim
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prior claims from one side, rendered for the opposing debater.
fn side_claims(state: &DebateState, author: ArgumentAuthor) -> String {
    let claims: Vec<String> = state
        .arguments_by(author)
        .filter(|a| !a.is_failure())
        .map(|a| format!("- {}", a.claim))
        .collect();
    if claims.is_empty() {
        "(none yet)".to_string()
    } else {
        claims.join("\n")
    }
}

pub fn recruiter_request(state: &DebateState) -> PromptRequest {
    PromptRequest {
        system: RECRUITER_SYSTEM.to_string(),
        user: format!(
            "{}\n\n## Your previous concerns\n{}\n\n## Coach's claims so far\n{}\n\n{}",
            matchup_summary(state),
            side_claims(state, ArgumentAuthor::Recruiter),
            side_claims(state, ArgumentAuthor::Coach),
            DEBATER_SCHEMA,
        ),
        temperature: 0.7,
    }
}

pub fn coach_request(state: &DebateState) -> PromptRequest {
    PromptRequest {
        system: COACH_SYSTEM.to_string(),
        user: format!(
            "{}\n\n## Recruiter's concerns so far\n{}\n\n## Your previous claims\n{}\n\n{}",
            matchup_summary(state),
            side_claims(state, ArgumentAuthor::Recruiter),
            side_claims(state, ArgumentAuthor::Coach),
            DEBATER_SCHEMA,
        ),
        temperature: 0.7,
    }
}

pub fn judge_request(state: &DebateState) -> PromptRequest {
    PromptRequest {
        system: JUDGE_SYSTEM.to_string(),
        user: format!(
            "{}\n\n## Debate transcript (round {} complete)\n{}\n\n{}",
            matchup_summary(state),
            state.round,
            transcript(state),
            JUDGE_SCHEMA,
        ),
        // Lower temperature for consistent judgments.
        temperature: 0.3,
    }
}

pub fn cover_letter_request(state: &DebateState, highlights: &[String]) -> PromptRequest {
    let bullets = if highlights.is_empty() {
        "(no debate highlights available)".to_string()
    } else {
        highlights
            .iter()
            .map(|h| format!("- {h}"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    PromptRequest {
        system: "You write concise, specific cover letters. Lean on the provided debate \
                 highlights; never invent qualifications. You respond only with JSON."
            .to_string(),
        user: format!(
            "{}\n\n## Debate highlights to emphasize\n{}\n\nWrite a three-paragraph cover letter \
             from {} for this posting.\nRespond in JSON: {{\"cover_letter\": string}}",
            matchup_summary(state),
            bullets,
            state.profile.name,
        ),
        temperature: 0.7,
    }
}

fn join_limited<'a>(items: impl Iterator<Item = &'a String>, limit: usize) -> String {
    let collected: Vec<&str> = items.take(limit).map(|s| s.as_str()).collect();
    if collected.is_empty() {
        "none listed".to_string()
    } else {
        collected.join(", ")
    }
}

fn truncate(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
