// All LLM prompt templates for the analysis module.
// Placeholders in braces are filled by `fill_template` before sending.

/// Event classification prompt. Replace `{document}`.
pub const CLASSIFY_PROMPT_TEMPLATE: &str = "Classify the event described below.

Return only the event category value (for example: sports_event, product_launch, election, \
concert, space_mission). Do not add any description.

Event Description:
{document}";

/// Sentiment prompt. Replace `{document}`.
pub const SENTIMENT_PROMPT_TEMPLATE: &str = "Provide only the sentiment value \
(positive, neutral, or negative) for this event:

{document}";

/// Question generation prompt.
/// Replace: {event_description}, {event_type}, {sentiment}, {current_date}
pub const QUESTION_PROMPT_TEMPLATE: &str = r#"Create a betting question based on the following event description. The question should:
- Be specific, fact-based, and tied to measurable outcomes.
- Avoid vague predictions or generalizations.
- Be formatted for a Yes/No answer with probabilities, where the sum of the probabilities is 100%.
- Ensure the question is future-oriented by estimating the event date and validating it against the current date. If the event is in the past, generate a related future-oriented question that reflects the potential outcome or next steps.

Inputs:
- Event Description: {event_description}
- Event Type: {event_type}
- Sentiment: {sentiment}
- Current Date: {current_date}

Output exactly these two lines:
Generated Question: <a realistic, future-oriented, fact-based betting question relevant to the input>
Probability: Yes <n>%, No <m>%"#;

/// Date validation prompt.
/// Replace: {generated_question}, {current_date}, {horizon_date},
///          {last_day_of_month}, {last_day_of_year}, {horizon_days}
pub const VALIDATION_PROMPT_TEMPLATE: &str = r#"Given the generated question: '{generated_question}',
check if the date, time, or year mentioned in the question falls within the current date ({current_date})
and the next {horizon_days} days (until {horizon_date}).

Additionally:
- If the question mentions the end of the month, consider the last day of the current month ({last_day_of_month}).
- If the question mentions the end of the year, consider the last day of the current year ({last_day_of_year}).

If the condition is satisfied, return the question; otherwise, return 'No'."#;

/// Fills `{name}` placeholders in one pass. Inserted values are never rescanned,
/// so document text containing `{sentiment}` and the like stays literal.
/// Unknown placeholders and stray braces are copied through.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });

        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
