// Extraction prompt templates.
// Escalation is purely textual: each retry restates the base prompt, echoes
// the rejected output and stamps the attempt counter onto the strict rules.

use serde_json::Value;

const STRICT_RULES: [&str; 6] = [
    "Return ONLY valid JSON",
    "No markdown or code fences",
    "No comments or explanations",
    "Must strictly follow OUTPUT SCHEMA",
    "Use null for missing fields",
    "Do NOT add extra fields",
];

const OUTPUT_CUE: &str = "OUTPUT (JSON only):";

/// Renders the initial prompt: instruction, template, schema and input text
/// as labelled sections, followed by the output cue.
pub fn build_prompt(instruction: &str, template: &str, schema: &Value, input_text: &str) -> String {
    let schema_text = serde_json::to_string_pretty(schema).unwrap_or_else(|_| schema.to_string());

    format!(
        "INSTRUCTION:\n{instruction}\n\n\
         TEMPLATE:\n{template}\n\n\
         OUTPUT SCHEMA:\n{schema_text}\n\n\
         INPUT TEXT:\n{input_text}\n\n\
         {OUTPUT_CUE}"
    )
}

/// Appends the rejected output, the error callout and the numbered strict
/// rules (`ATTEMPT {attempt}/{max_attempts}`) to the base prompt.
pub fn build_retry_prompt(
    base_prompt: &str,
    last_output: &str,
    attempt: u32,
    max_attempts: u32,
) -> String {
    let rules = STRICT_RULES
        .iter()
        .enumerate()
        .map(|(i, rule)| format!("{}. {rule}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{base_prompt}\n\n\
         PREVIOUS OUTPUT (invalid JSON):\n{last_output}\n\n\
         ERROR:\nThe output above is NOT valid JSON.\n\n\
         STRICT RULES (ATTEMPT {attempt}/{max_attempts}):\n{rules}\n\n\
         {OUTPUT_CUE}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_prompt() -> String {
        build_prompt(
            "Extract the person described.",
            "A person record.",
            &json!({"name": "string", "age": "number"}),
            "John is 30 years old",
        )
    }

    #[test]
    fn test_prompt_contains_sections_in_order() {
        let prompt = sample_prompt();
        let positions: Vec<usize> = [
            "INSTRUCTION:",
            "Extract the person described.",
            "TEMPLATE:",
            "A person record.",
            "OUTPUT SCHEMA:",
            "INPUT TEXT:",
            "John is 30 years old",
            "OUTPUT (JSON only):",
        ]
        .iter()
        .map(|needle| prompt.find(needle).unwrap_or_else(|| panic!("missing {needle}")))
        .collect();

        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");
        assert!(prompt.ends_with("OUTPUT (JSON only):"));
    }

    #[test]
    fn test_schema_is_indented_json() {
        let prompt = sample_prompt();
        assert!(prompt.contains("{\n  \"name\": \"string\",\n  \"age\": \"number\"\n}"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        assert_eq!(sample_prompt(), sample_prompt());
    }

    #[test]
    fn test_retry_prompt_echoes_output_and_counter() {
        let base = sample_prompt();
        let retry = build_retry_prompt(&base, "Sure! Here is {name: John}", 3, 10);

        assert!(retry.starts_with(&base));
        assert!(retry.contains("PREVIOUS OUTPUT (invalid JSON):\nSure! Here is {name: John}"));
        assert!(retry.contains("The output above is NOT valid JSON."));
        assert!(retry.contains("STRICT RULES (ATTEMPT 3/10):"));
        assert!(retry.ends_with("OUTPUT (JSON only):"));
    }

    #[test]
    fn test_retry_prompt_lists_numbered_rules() {
        let retry = build_retry_prompt("base", "oops", 2, 10);
        assert!(retry.contains("1. Return ONLY valid JSON"));
        assert!(retry.contains("2. No markdown or code fences"));
        assert!(retry.contains("3. No comments or explanations"));
        assert!(retry.contains("4. Must strictly follow OUTPUT SCHEMA"));
        assert!(retry.contains("5. Use null for missing fields"));
        assert!(retry.contains("6. Do NOT add extra fields"));
    }

    #[test]
    fn test_retry_prompt_keeps_multiline_output_verbatim() {
        let output = "{\"name\": \"John\",\n  \"age\": }";
        let retry = build_retry_prompt("base", output, 10, 10);
        assert!(retry.contains(output));
        assert!(retry.contains("ATTEMPT 10/10"));
    }
}
