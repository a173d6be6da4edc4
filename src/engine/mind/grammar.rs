// ── Mind: Response Grammar ─────────────────────────────────────────────────
//
// The strict expected-field grammar for generation-service responses, its
// prompt builders, and the total fallback mapping.
//
// The generation service is never trusted to follow the format: every field
// is extracted independently with a line-anchored pattern, and every missing
// or malformed field maps to a defined deterministic default. Arbitrary
// garbage in → valid plan/questions/insight out. The fallback paths are the
// same ones used when the service is unreachable, so behavior under failure
// and under malformed output is identical.
//
// Plan grammar (one field per line, case-insensitive keys):
//   GOAL: <text>
//   REASONING: <text>
//   PRIORITY: critical|high|medium|low
//   HOUR_1: <objective>           (…through HOUR_n)
//   HOUR_1_ACTIONS: <a> | <b> …   (optional, pipe- or semicolon-separated)
//
// Question grammar:  QUESTION: <text>  or numbered "1." / "1)" lines.
// Insight grammar:   INSIGHT: <text>   and   IMPORTANCE: <number in [7,9]>

use crate::atoms::plan_types::PlanPriority;
use regex::Regex;

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 1: Parsed Shapes
// ═══════════════════════════════════════════════════════════════════════════

/// Fields extracted from a daily-plan response. `None`/empty entries take
/// their deterministic fallback when the plan is composed.
#[derive(Debug, Clone, Default)]
pub struct PlanResponse {
    pub goal: Option<String>,
    pub reasoning: Option<String>,
    pub priority: Option<PlanPriority>,
    /// One objective per hour slot; index i = HOUR_{i+1}.
    pub hour_objectives: Vec<Option<String>>,
    /// Action descriptions per hour slot; padded/truncated downstream.
    pub hour_actions: Vec<Vec<String>>,
}

impl PlanResponse {
    /// True when nothing at all was extracted — the caller logs this as a
    /// full parse failure rather than a partial one.
    pub fn is_empty(&self) -> bool {
        self.goal.is_none()
            && self.reasoning.is_none()
            && self.priority.is_none()
            && self.hour_objectives.iter().all(|h| h.is_none())
            && self.hour_actions.iter().all(|a| a.is_empty())
    }
}

/// Fields extracted from a reflection-answer response.
#[derive(Debug, Clone, Default)]
pub struct InsightResponse {
    pub insight: Option<String>,
    /// Already clamped to the reflection importance band [7, 9].
    pub importance: Option<f32>,
}

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 2: Parsers
// ═══════════════════════════════════════════════════════════════════════════

/// Extract the first `KEY: value` line for a field, case-insensitively.
/// Horizontal whitespace only — a field value never leaks across lines.
fn field(text: &str, key: &str) -> Option<String> {
    let pattern = format!(r"(?mi)^[ \t]*{}[ \t]*:[ \t]*(.+)$", regex::escape(key));
    let re = Regex::new(&pattern).ok()?;
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Parse a daily-plan response for `hours` hour slots.
pub fn parse_plan_response(text: &str, hours: usize) -> PlanResponse {
    let mut response = PlanResponse {
        goal: field(text, "GOAL"),
        reasoning: field(text, "REASONING"),
        priority: field(text, "PRIORITY").and_then(|p| p.parse().ok()),
        hour_objectives: Vec::with_capacity(hours),
        hour_actions: Vec::with_capacity(hours),
    };
    for i in 1..=hours {
        response
            .hour_objectives
            .push(field(text, &format!("HOUR_{}", i)));
        let actions = field(text, &format!("HOUR_{}_ACTIONS", i))
            .map(|line| {
                line.split(['|', ';'])
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        response.hour_actions.push(actions);
    }
    response
}

/// Parse reflection questions: `QUESTION:` lines first, numbered lines as a
/// second chance. Returns at most `max` questions; empty means fall back.
pub fn parse_question_response(text: &str, max: usize) -> Vec<String> {
    let mut questions: Vec<String> = Vec::new();
    if let Ok(re) = Regex::new(r"(?mi)^[ \t]*QUESTION[ \t]*:[ \t]*(.+)$") {
        for captures in re.captures_iter(text) {
            if let Some(m) = captures.get(1) {
                let q = m.as_str().trim().to_string();
                if !q.is_empty() {
                    questions.push(q);
                }
            }
        }
    }
    if questions.is_empty() {
        if let Ok(re) = Regex::new(r"(?m)^[ \t]*\d+[.)][ \t]*(.+)$") {
            for captures in re.captures_iter(text) {
                if let Some(m) = captures.get(1) {
                    let q = m.as_str().trim().to_string();
                    if !q.is_empty() {
                        questions.push(q);
                    }
                }
            }
        }
    }
    questions.truncate(max);
    questions
}

/// Parse a reflection answer. The importance band for reflections is [7, 9];
/// any parsed number is clamped into it.
pub fn parse_insight_response(text: &str) -> InsightResponse {
    InsightResponse {
        insight: field(text, "INSIGHT"),
        importance: field(text, "IMPORTANCE")
            .and_then(|raw| raw.parse::<f32>().ok())
            .filter(|v| v.is_finite())
            .map(|v| v.clamp(7.0, 9.0)),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 3: Total Fallbacks
// ═══════════════════════════════════════════════════════════════════════════

/// Deterministic reflection questions used when the service fails or its
/// response yields nothing. Fixed order so the behavior is reproducible.
const FALLBACK_QUESTIONS: &[&str] = &[
    "What recent events mattered most, and why?",
    "What patterns connect the recent experiences?",
    "What should be approached differently from now on?",
    "Which locations or agents keep coming up, and what does that suggest?",
    "What current need is most at risk of being neglected?",
];

pub fn fallback_questions(max: usize) -> Vec<String> {
    FALLBACK_QUESTIONS
        .iter()
        .take(max.max(1))
        .map(|q| q.to_string())
        .collect()
}

/// Maximum length of an extractive fallback answer.
const FALLBACK_ANSWER_MAX_CHARS: usize = 240;

/// Extractive fallback answer: stitch the evidence together, truncated.
/// No model involved, so it is always available and always grounded.
pub fn fallback_answer(evidence_contents: &[&str]) -> String {
    if evidence_contents.is_empty() {
        return "Too little evidence to draw a conclusion yet.".to_string();
    }
    let mut combined = String::new();
    for snippet in evidence_contents {
        if !combined.is_empty() {
            combined.push_str("; ");
        }
        combined.push_str(snippet.trim());
        if combined.len() >= FALLBACK_ANSWER_MAX_CHARS {
            break;
        }
    }
    if combined.len() > FALLBACK_ANSWER_MAX_CHARS {
        let mut cut = FALLBACK_ANSWER_MAX_CHARS;
        while !combined.is_char_boundary(cut) {
            cut -= 1;
        }
        combined.truncate(cut);
        combined.push('…');
    }
    combined
}

/// Importance assigned to fallback reflections (bottom of the [7, 9] band).
pub const FALLBACK_REFLECTION_IMPORTANCE: f32 = 7.0;

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 4: Prompt Builders
// ═══════════════════════════════════════════════════════════════════════════

/// Prompt for a full daily-plan synthesis. States the exact field grammar;
/// the parser above is the other half of the contract.
pub fn daily_plan_prompt(
    situation: &str,
    recent_memories: &[String],
    recent_reflections: &[String],
    hours: usize,
) -> String {
    let mut prompt = String::new();
    prompt.push_str("You are planning the next stretch of time for a maze-dwelling agent.\n\n");
    prompt.push_str("Current situation:\n");
    prompt.push_str(situation);
    prompt.push('\n');
    if !recent_memories.is_empty() {
        prompt.push_str("\nRecent memories:\n");
        for memory in recent_memories {
            prompt.push_str("- ");
            prompt.push_str(memory);
            prompt.push('\n');
        }
    }
    if !recent_reflections.is_empty() {
        prompt.push_str("\nRecent insights:\n");
        for reflection in recent_reflections {
            prompt.push_str("- ");
            prompt.push_str(reflection);
            prompt.push('\n');
        }
    }
    prompt.push_str(
        "\nRespond with exactly these fields, one per line:\n\
         GOAL: <overall goal>\n\
         REASONING: <one sentence of reasoning>\n\
         PRIORITY: <critical|high|medium|low>\n",
    );
    for i in 1..=hours {
        prompt.push_str(&format!(
            "HOUR_{i}: <objective for hour {i}>\n\
             HOUR_{i}_ACTIONS: <short action> | <short action> | …\n"
        ));
    }
    prompt
}

/// Prompt asking for open-ended questions over the evidence records.
pub fn questions_prompt(evidence_contents: &[String], max: usize) -> String {
    let mut prompt = String::from(
        "Given only the experiences below, pose the most insightful open-ended \
         questions they raise.\n\nExperiences:\n",
    );
    for content in evidence_contents {
        prompt.push_str("- ");
        prompt.push_str(content);
        prompt.push('\n');
    }
    prompt.push_str(&format!(
        "\nRespond with 1 to {} lines, each formatted as:\nQUESTION: <the question>\n",
        max
    ));
    prompt
}

/// Prompt asking for a short grounded answer to one question.
pub fn answer_prompt(question: &str, evidence_contents: &[String]) -> String {
    let mut prompt = format!(
        "Answer the question below in 2–3 sentences, grounded ONLY in the \
         evidence provided.\n\nQuestion: {}\n\nEvidence:\n",
        question
    );
    for content in evidence_contents {
        prompt.push_str("- ");
        prompt.push_str(content);
        prompt.push('\n');
    }
    prompt.push_str(
        "\nRespond with exactly these fields, one per line:\n\
         INSIGHT: <2-3 sentence answer>\n\
         IMPORTANCE: <number from 7 to 9>\n",
    );
    prompt
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════
