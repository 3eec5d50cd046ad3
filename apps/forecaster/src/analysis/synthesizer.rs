//! Question Synthesizer: turns an event description into a time-bounded
//! Yes/No forecasting question, or a rejection.
//!
//! Flow: generation prompt → parse question + probabilities →
//!       validation prompt against the reference dates → accept or reject.
//!
//! The current date is always an input; nothing here reads the wall clock.

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::analysis::dates::{format_prompt_date, ReferenceDates, DEFAULT_HORIZON_DAYS};
use crate::analysis::parsing::{is_rejection, parse_generation, GeneratedQuestion};
use crate::analysis::prompts::{fill_template, QUESTION_PROMPT_TEMPLATE, VALIDATION_PROMPT_TEMPLATE};
use crate::errors::GenerationError;
use crate::llm_client::TextGenerator;

/// Title emitted in place of a question that failed date validation.
pub const REJECTION_SENTINEL: &str = "No";

/// A question that passed date validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastQuestion {
    pub title: String,
    pub yes_probability: Option<String>,
    pub no_probability: Option<String>,
    /// The source description, unchanged.
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Synthesis {
    Accepted(ForecastQuestion),
    Rejected,
}

impl Synthesis {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Synthesis::Rejected)
    }

    /// Flattens into `(title-or-sentinel, yes, no, description)`.
    pub fn into_parts(self) -> (String, Option<String>, Option<String>, Option<String>) {
        match self {
            Synthesis::Accepted(q) => (
                q.title,
                q.yes_probability,
                q.no_probability,
                Some(q.description),
            ),
            Synthesis::Rejected => (REJECTION_SENTINEL.to_string(), None, None, None),
        }
    }
}

/// Two-phase question synthesizer over an opaque text generator.
#[derive(Debug, Clone, Copy)]
pub struct Synthesizer {
    horizon_days: u32,
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self::new(DEFAULT_HORIZON_DAYS)
    }
}

impl Synthesizer {
    pub fn new(horizon_days: u32) -> Self {
        Self { horizon_days }
    }

    /// Generates a question for the event and validates its implied date.
    ///
    /// Errors when a generator call fails or the generation output lacks the
    /// "Generated Question:" marker. A failed date check is not an error:
    /// it yields `Synthesis::Rejected`.
    pub async fn synthesize(
        &self,
        generator: &dyn TextGenerator,
        description: &str,
        event_type: &str,
        sentiment: &str,
        today: NaiveDate,
    ) -> Result<Synthesis, GenerationError> {
        let dates = ReferenceDates::from_today(today, self.horizon_days);

        // Phase 1: generation
        let prompt = build_question_prompt(description, event_type, sentiment, &dates);
        let raw = generator.generate(&prompt).await?;
        let generated = parse_generation(&raw)?;
        debug!("Generated question: {}", generated.question);

        // Phase 2: date validation
        let prompt = build_validation_prompt(&generated.question, &dates, self.horizon_days);
        let verdict = generator.generate(&prompt).await?;

        if is_rejection(&verdict) {
            info!(
                "Question rejected by date validation: {:?}",
                generated.question
            );
            return Ok(Synthesis::Rejected);
        }

        let GeneratedQuestion {
            question,
            yes_probability,
            no_probability,
        } = generated;

        Ok(Synthesis::Accepted(ForecastQuestion {
            title: question,
            yes_probability,
            no_probability,
            description: description.to_string(),
        }))
    }
}

fn build_question_prompt(
    description: &str,
    event_type: &str,
    sentiment: &str,
    dates: &ReferenceDates,
) -> String {
    let current_date = format_prompt_date(dates.today);
    fill_template(
        QUESTION_PROMPT_TEMPLATE,
        &[
            ("event_description", description),
            ("event_type", event_type),
            ("sentiment", sentiment),
            ("current_date", current_date.as_str()),
        ],
    )
}

fn build_validation_prompt(question: &str, dates: &ReferenceDates, horizon_days: u32) -> String {
    let current_date = format_prompt_date(dates.today);
    let horizon_days = horizon_days.to_string();
    let horizon_date = format_prompt_date(dates.horizon);
    let last_day_of_month = format_prompt_date(dates.last_day_of_month);
    let last_day_of_year = format_prompt_date(dates.last_day_of_year);
    fill_template(
        VALIDATION_PROMPT_TEMPLATE,
        &[
            ("generated_question", question),
            ("current_date", current_date.as_str()),
            ("horizon_days", horizon_days.as_str()),
            ("horizon_date", horizon_date.as_str()),
            ("last_day_of_month", last_day_of_month.as_str()),
            ("last_day_of_year", last_day_of_year.as_str()),
        ],
    )
}
