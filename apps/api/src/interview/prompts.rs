// All LLM prompt constants for the Interview module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for JD parsing — enforces JSON-only output.
pub const JD_PARSE_SYSTEM: &str =
    "You are an expert technical recruiter and interview coach. \
    Parse a job description and extract structured role attributes. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// JD parsing prompt template. Replace `{jd_text}` before sending.
pub const JD_PARSE_PROMPT_TEMPLATE: &str = r#"Parse the following job description and extract structured role attributes.

Return a JSON object with this EXACT schema (no extra fields):
{
  "roleType": "software",
  "requiredSkills": ["Rust", "distributed systems"],
  "experienceLevel": "senior",
  "technologies": ["tokio", "PostgreSQL", "Kubernetes"],
  "responsibilities": ["Design and operate backend services"]
}

Rules for parsing:

ROLE TYPE (pick exactly one):
- "software": application or systems development roles — backend, frontend, full-stack, mobile, embedded
- "devops": infrastructure, platform, SRE, release engineering roles
- "security": application security, offensive security, security engineering roles

EXPERIENCE LEVEL (pick exactly one):
- "junior": 0-2 years, "entry level", "associate"
- "mid": 2-5 years, no seniority qualifier
- "senior": 5+ years, "senior" in the title or requirements
- "staff": "staff", "principal", "lead", org-wide scope language

REQUIRED SKILLS: Explicit must-haves — phrases like "required", "must have", minimum years with a named skill.
TECHNOLOGIES: Concrete tools, languages, frameworks, and platforms named anywhere in the text.
RESPONSIBILITIES: What the role actually does — one entry per distinct duty, imperative phrasing.

Job description:
{jd_text}"#;

/// System prompt for question generation.
pub const QUESTION_GEN_SYSTEM: &str =
    "You are an experienced interviewer who designs question sets tailored \
    to a specific role. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Question generation template. Replace `{role_type}`, `{experience_level}`,
/// `{skills}`, and `{technologies}` before sending.
pub const QUESTION_GEN_PROMPT_TEMPLATE: &str = r#"Generate an interview question set for this role:

Role type: {role_type}
Experience level: {experience_level}
Required skills: {skills}
Technologies: {technologies}

Return a JSON object with this EXACT schema (no extra fields):
{
  "questions": [
    {
      "category": "technical",
      "prompt": "Walk me through how you would design a rate limiter for a public API.",
      "difficulty": "medium",
      "relatedSkills": ["distributed systems"]
    }
  ]
}

Rules:
- Produce 7 questions: at least 2 "behavioral", at least 3 "technical", at least 1 "system-design".
- Each prompt must be a complete, self-contained question of at least 10 characters.
- difficulty is one of "easy", "medium", "hard" — calibrate to the experience level.
- relatedSkills entries must come from the required skills or technologies above.
- Do NOT number the prompts or prefix them with labels."#;

/// System prompt for per-answer feedback.
pub const ANSWER_FEEDBACK_SYSTEM: &str =
    "You are a direct, constructive interview coach evaluating one answer. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Per-answer feedback template. Replace `{question}`, `{category}`, and
/// `{answer}` before sending.
pub const ANSWER_FEEDBACK_PROMPT_TEMPLATE: &str = r#"Evaluate this interview answer.

Question ({category}): {question}

Candidate's answer:
{answer}

Return a JSON object with this EXACT schema (no extra fields):
{
  "score": 7.5,
  "strengths": ["Names a concrete system they built", "Quantifies the outcome"],
  "improvements": ["Explain the tradeoffs considered", "Shorten the preamble"]
}

Rules:
- score is a number from 1 to 10.
- strengths and improvements each need at least 2 entries, grounded in the answer text.
- Keep every entry under 20 words."#;

/// System prompt for whole-session feedback.
pub const SESSION_FEEDBACK_SYSTEM: &str =
    "You are an interview coach writing a final debrief across a full mock \
    interview. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Session feedback template. Replace `{role_type}`, `{experience_level}`,
/// and `{transcript}` before sending.
pub const SESSION_FEEDBACK_PROMPT_TEMPLATE: &str = r#"Write a final debrief for this mock interview.

Role type: {role_type}
Experience level: {experience_level}

Transcript (unanswered questions are marked):
{transcript}

Return a JSON object with this EXACT schema (no extra fields):
{
  "overallScore": 6.5,
  "categoryScores": {
    "behavioral": 7.0,
    "technical": 6.0,
    "systemDesign": 5.5
  },
  "strongestAreas": ["Incident retrospectives"],
  "improvementAreas": ["Capacity estimation"],
  "recommendations": ["Practice sizing exercises with real traffic numbers"]
}

Rules:
- overallScore is a number from 1 to 10; category scores from 0 to 10.
- A category with no answered questions scores 0.
- strongestAreas, improvementAreas, and recommendations each need at least 1 entry.
- Unanswered questions count against the relevant category score."#;
