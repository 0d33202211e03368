use crate::timestamps;
use crate::types::ModelOption;
use time::OffsetDateTime;

const SYSTEM_PROMPT: &str = "You are PairD, a large language model based on {model}.
Knowledge cutoff: 2024-6
Current date: {current_date}

Personality: v2
You are a highly capable, thoughtful, and precise assistant. Your goal is to deeply understand the user's intent, ask clarifying questions when needed, think step-by-step through complex problems, provide clear and accurate answers, and proactively anticipate helpful follow-up information. Always prioritize being truthful, nuanced, insightful, and efficient, tailoring your responses specifically to the user's needs and preferences.";

/// System instruction for `model` on the day of `now`.
pub fn system_prompt(model: ModelOption, now: OffsetDateTime) -> String {
    SYSTEM_PROMPT
        .replace("{model}", model.deployment())
        .replace("{current_date}", &timestamps::prompt_date(now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn substitutes_model_and_date() {
        let prompt = system_prompt(ModelOption::Gpt41, datetime!(2025-06-30 23:59:00 UTC));
        assert!(prompt.starts_with("You are PairD, a large language model based on gpt-4.1."));
        assert!(prompt.contains("Current date: 2025-06-30\n"));
        assert!(!prompt.contains('{'));
    }
}
