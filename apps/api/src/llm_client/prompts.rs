// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

/// System prompt that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// System prompt for free-text output that is pasted straight into an email client.
pub const PLAIN_TEXT_SYSTEM: &str = "You write ready-to-send business correspondence. \
    Respond with the requested text only. \
    Do NOT add a preamble, commentary, or closing notes about what you wrote.";
