//! Pipeline Orchestrator: runs every category through every source.
//!
//! Per category: fetch (with rate-limit retry) → timeframe filter →
//! per document: classify → score sentiment → synthesize question → persist.
//!
//! Strictly sequential. A failing document is logged and counted, never fatal;
//! a failing source only skips that source for the current category.

use std::sync::Arc;

use tracing::{info, warn};

use crate::analysis::classifier::classify_event;
use crate::analysis::sentiment::score_sentiment;
use crate::analysis::synthesizer::{Synthesis, Synthesizer};
use crate::clock::Clock;
use crate::detection::timeframe::TimeframeFilter;
use crate::errors::PipelineError;
use crate::llm_client::TextGenerator;
use crate::models::document::CandidateDocument;
use crate::models::event::{pair_probabilities, NewEventRecord};
use crate::retention::manager::{save, DEFAULT_WINDOW_DAYS};
use crate::retention::store::EventStore;
use crate::retry::RetryPolicy;
use crate::sources::retry::search_with_retry;
use crate::sources::{Category, DocumentSource};

pub mod report;

pub use report::{CategoryReport, DocumentOutcome, RunReport};

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub retention_days: u32,
    pub horizon_days: u32,
    /// Store rejected questions (sentinel title, null fields) instead of dropping them.
    pub persist_rejected: bool,
    pub retry: RetryPolicy,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            retention_days: DEFAULT_WINDOW_DAYS,
            horizon_days: crate::analysis::dates::DEFAULT_HORIZON_DAYS,
            persist_rejected: true,
            retry: RetryPolicy::default(),
        }
    }
}

/// Everything a run needs, built once at startup and passed in explicitly.
pub struct Pipeline {
    sources: Vec<Box<dyn DocumentSource>>,
    generator: Arc<dyn TextGenerator>,
    store: Arc<dyn EventStore>,
    clock: Arc<dyn Clock>,
    synthesizer: Synthesizer,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(
        sources: Vec<Box<dyn DocumentSource>>,
        generator: Arc<dyn TextGenerator>,
        store: Arc<dyn EventStore>,
        clock: Arc<dyn Clock>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            sources,
            generator,
            store,
            clock,
            synthesizer: Synthesizer::new(settings.horizon_days),
            settings,
        }
    }

    /// Processes every category in order and returns the tallies.
    pub async fn run(&self, categories: &[Category]) -> RunReport {
        let mut run = RunReport::default();
        for category in categories {
            run.categories.push(self.run_category(category).await);
        }
        run
    }

    pub async fn run_category(&self, category: &Category) -> CategoryReport {
        let mut report = CategoryReport::new(category.label);
        let filter = TimeframeFilter::new(self.clock.now().date_naive());

        for source in &self.sources {
            let Some(plan) = source.plan(category) else {
                continue;
            };
            info!("Fetching '{}' from {}...", category.label, source.name());

            let documents = match search_with_retry(source.as_ref(), &plan, &self.settings.retry).await
            {
                Ok(documents) => documents,
                Err(e) => {
                    warn!(
                        "Fetching '{}' from {} failed: {e}",
                        category.label,
                        source.name()
                    );
                    report.source_failures += 1;
                    continue;
                }
            };
            report.fetched += documents.len();

            let strictness = source.strictness();
            let candidates: Vec<CandidateDocument> = documents
                .into_iter()
                .filter(|doc| filter.accepts(strictness, &doc.content))
                .collect();

            if candidates.is_empty() {
                info!(
                    "No future events found for '{}' on {}",
                    category.label,
                    source.name()
                );
                continue;
            }
            report.candidates += candidates.len();

            for document in &candidates {
                let outcome = self.process_or_skip(category, document, &filter).await;
                report.record(&outcome);
            }
        }

        info!(
            "Category '{}': fetched={}, candidates={}, persisted={}, rejected={}, unparseable={}, failed={}",
            report.category,
            report.fetched,
            report.candidates,
            report.persisted,
            report.rejected,
            report.unparseable,
            report.failed
        );
        report
    }

    /// Runs one document and folds any error into an outcome.
    async fn process_or_skip(
        &self,
        category: &Category,
        document: &CandidateDocument,
        filter: &TimeframeFilter,
    ) -> DocumentOutcome {
        match self.process_document(category, document, filter).await {
            Ok(outcome) => outcome,
            Err(e) if e.is_unparseable() => {
                warn!(
                    "Unparseable generator output for '{}' ({}): {e}",
                    category.label,
                    document.log_label()
                );
                DocumentOutcome::Unparseable
            }
            Err(e) => {
                warn!(
                    "Error processing document for '{}' ({}): {e}",
                    category.label,
                    document.log_label()
                );
                DocumentOutcome::Failed
            }
        }
    }

    async fn process_document(
        &self,
        category: &Category,
        document: &CandidateDocument,
        filter: &TimeframeFilter,
    ) -> Result<DocumentOutcome, PipelineError> {
        let generator = self.generator.as_ref();
        let content = document.content.as_str();

        let event_type = classify_event(generator, content).await?;
        let sentiment = score_sentiment(generator, content).await?;

        let now = self.clock.now();
        let synthesis = self
            .synthesizer
            .synthesize(generator, content, &event_type, &sentiment, now.date_naive())
            .await?;

        let rejected = synthesis.is_rejected();
        if rejected && !self.settings.persist_rejected {
            return Ok(DocumentOutcome::Rejected);
        }

        if let Synthesis::Accepted(question) = &synthesis {
            if !filter.mentions_future(&question.title) {
                info!(
                    "Question may not be future-oriented: {:?}",
                    question.title
                );
            }
        }

        let (title, yes, no, description) = synthesis.into_parts();
        let (probability_of_yes, probability_of_no) = pair_probabilities(yes, no);

        let record = NewEventRecord {
            category: category.label.to_string(),
            event_type,
            sentiment,
            title,
            event_description: description,
            probability_of_yes,
            probability_of_no,
            created_date: now,
        };

        let (id, _) = save(
            self.store.as_ref(),
            &record,
            now,
            self.settings.retention_days,
        )
        .await?;

        if rejected {
            info!("Saved rejected question for '{}' with ID {id}", category.label);
        } else {
            info!(
                "Saved question for '{}' with ID {id}: {}",
                category.label, record.title
            );
        }

        Ok(DocumentOutcome::Persisted { id, rejected })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::synthesizer::REJECTION_SENTINEL;
    use crate::clock::FixedClock;
    use crate::detection::timeframe::FilterStrictness;
    use crate::llm_client::{LlmError, MockTextGenerator};
    use crate::retention::memory::MemoryEventStore;
    use crate::sources::{MockDocumentSource, SearchPlan, SourceError, CATEGORIES};
    use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
    use std::time::Duration;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap()
    }

    fn category(label: &str) -> &'static Category {
        CATEGORIES.iter().find(|c| c.label == label).unwrap()
    }

    fn settings() -> PipelineSettings {
        PipelineSettings {
            retry: RetryPolicy {
                max_retries: 1,
                initial_interval: Duration::from_millis(1),
                max_interval: Duration::from_millis(5),
                multiplier: 2.0,
                randomization_factor: 0.0,
            },
            ..PipelineSettings::default()
        }
    }

    fn source_returning(
        strictness: FilterStrictness,
        documents: Vec<CandidateDocument>,
    ) -> MockDocumentSource {
        let mut source = MockDocumentSource::new();
        source.expect_name().return_const("reddit");
        source.expect_strictness().return_const(strictness);
        source.expect_plan().returning(|c: &Category| {
            Some(SearchPlan {
                topic: c.label.to_string(),
                query: "upcoming OR scheduled OR next week".to_string(),
                limit: 50,
            })
        });
        source
            .expect_search()
            .times(1)
            .returning(move |_, _, _| Ok(documents.clone()));
        source
    }

    /// Answers each prompt kind; documents containing "BROKEN" make the generator fail,
    /// documents containing "GARBLED" get an unmarked question answer.
    fn routing_generator(question: &'static str, verdict: &'static str) -> MockTextGenerator {
        let mut generator = MockTextGenerator::new();
        generator.expect_generate().returning(move |prompt: &str| {
            if prompt.contains("BROKEN") {
                return Err(LlmError::Api {
                    status: 503,
                    message: "overloaded".to_string(),
                });
            }
            if prompt.contains("Classify the event") {
                Ok("sports_event".to_string())
            } else if prompt.contains("Provide only the sentiment") {
                Ok("positive".to_string())
            } else if prompt.contains("Create a betting question") {
                if prompt.contains("GARBLED") {
                    Ok("Sorry, here is a question: will it happen?".to_string())
                } else {
                    Ok(question.to_string())
                }
            } else {
                Ok(verdict.to_string())
            }
        });
        generator
    }

    fn pipeline(
        sources: Vec<Box<dyn DocumentSource>>,
        generator: MockTextGenerator,
        store: Arc<MemoryEventStore>,
        settings: PipelineSettings,
    ) -> Pipeline {
        Pipeline::new(
            sources,
            Arc::new(generator),
            store,
            Arc::new(FixedClock(now())),
            settings,
        )
    }

    #[tokio::test]
    async fn test_end_to_end_single_document() {
        let source = source_returning(
            FilterStrictness::Strict,
            vec![CandidateDocument::new("The finals are scheduled for next year")],
        );
        let generator = routing_generator(
            "Generated Question: Will the NBA announce the finals schedule before November 9, 2026? Probability: Yes 60% No 40%",
            "Will the NBA announce the finals schedule before November 9, 2026?",
        );
        let store = Arc::new(MemoryEventStore::new());
        let pipeline = pipeline(vec![Box::new(source)], generator, store.clone(), settings());

        let report = pipeline.run_category(category("nba")).await;

        assert_eq!(report.fetched, 1);
        assert_eq!(report.candidates, 1);
        assert_eq!(report.persisted, 1);
        assert_eq!(report.failed, 0);

        let records = store.all().await;
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.category, "nba");
        assert_eq!(record.event_type, "sports_event");
        assert_eq!(record.sentiment, "positive");
        assert_eq!(
            record.title,
            "Will the NBA announce the finals schedule before November 9, 2026?"
        );
        assert_eq!(
            record.event_description.as_deref(),
            Some("The finals are scheduled for next year")
        );
        assert_eq!(record.probability_of_yes.as_deref(), Some("60%"));
        assert_eq!(record.probability_of_no.as_deref(), Some("40%"));
        assert_eq!(record.created_date, now());
    }

    #[tokio::test]
    async fn test_filtered_documents_never_reach_generator() {
        let source = source_returning(
            FilterStrictness::Strict,
            vec![CandidateDocument::new("Great game last night, we won in overtime")],
        );
        let mut generator = MockTextGenerator::new();
        generator.expect_generate().never();
        let store = Arc::new(MemoryEventStore::new());
        let pipeline = pipeline(vec![Box::new(source)], generator, store.clone(), settings());

        let report = pipeline.run_category(category("nba")).await;

        assert_eq!(report.fetched, 1);
        assert_eq!(report.candidates, 0);
        assert!(store.all().await.is_empty());
    }

    #[tokio::test]
    async fn test_failing_document_does_not_stop_the_rest() {
        let source = source_returning(
            FilterStrictness::Loose,
            vec![
                CandidateDocument::new("BROKEN upcoming launch"),
                CandidateDocument::new("GARBLED upcoming launch"),
                CandidateDocument::new("Launch scheduled next week"),
            ],
        );
        let generator = routing_generator(
            "Generated Question: Will the launch happen before November 1? Probability: Yes 70% No 30%",
            "Will the launch happen before November 1?",
        );
        let store = Arc::new(MemoryEventStore::new());
        let pipeline = pipeline(vec![Box::new(source)], generator, store.clone(), settings());

        let report = pipeline.run_category(category("space")).await;

        assert_eq!(report.candidates, 3);
        assert_eq!(report.failed, 1);
        assert_eq!(report.unparseable, 1);
        assert_eq!(report.persisted, 1);
        assert_eq!(store.all().await.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_save_is_counted_and_next_document_persists() {
        let source = source_returning(
            FilterStrictness::Loose,
            vec![
                CandidateDocument::new("First launch scheduled next week"),
                CandidateDocument::new("Second launch scheduled next month"),
            ],
        );
        let generator = routing_generator(
            "Generated Question: Will the launch happen before November 1? Probability: Yes 70% No 30%",
            "Will the launch happen before November 1?",
        );
        let store = Arc::new(MemoryEventStore::new());
        // first insert and its single retry both fail
        store.fail_next_inserts(2);
        let pipeline = pipeline(vec![Box::new(source)], generator, store.clone(), settings());

        let report = pipeline.run_category(category("space")).await;

        assert_eq!(report.candidates, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.persisted, 1);
        let records = store.all().await;
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].event_description.as_deref(),
            Some("Second launch scheduled next month")
        );
    }

    #[tokio::test]
    async fn test_rejected_question_persisted_with_sentinel() {
        let source = source_returning(
            FilterStrictness::Loose,
            vec![CandidateDocument::new("Election scheduled for 2028")],
        );
        let generator = routing_generator(
            "Generated Question: Will the 2028 election be held on time? Probability: Yes 90% No 10%",
            "No",
        );
        let store = Arc::new(MemoryEventStore::new());
        let pipeline = pipeline(vec![Box::new(source)], generator, store.clone(), settings());

        let report = pipeline.run_category(category("politics")).await;

        assert_eq!(report.persisted, 1);
        assert_eq!(report.rejected, 1);
        let record = &store.all().await[0];
        assert_eq!(record.title, REJECTION_SENTINEL);
        assert!(record.event_description.is_none());
        assert!(record.probability_of_yes.is_none());
        assert!(record.probability_of_no.is_none());
    }

    #[tokio::test]
    async fn test_rejected_question_dropped_when_configured() {
        let source = source_returning(
            FilterStrictness::Loose,
            vec![CandidateDocument::new("Election scheduled for 2028")],
        );
        let generator = routing_generator(
            "Generated Question: Will the 2028 election be held on time? Probability: Yes 90% No 10%",
            "No",
        );
        let store = Arc::new(MemoryEventStore::new());
        let settings = PipelineSettings {
            persist_rejected: false,
            ..settings()
        };
        let pipeline = pipeline(vec![Box::new(source)], generator, store.clone(), settings);

        let report = pipeline.run_category(category("politics")).await;

        assert_eq!(report.persisted, 0);
        assert_eq!(report.rejected, 1);
        assert!(store.all().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_sweeps_stale_records() {
        let stale = NewEventRecord {
            category: "nba".to_string(),
            event_type: "sports_event".to_string(),
            sentiment: "neutral".to_string(),
            title: "Old question?".to_string(),
            event_description: None,
            probability_of_yes: None,
            probability_of_no: None,
            created_date: now() - ChronoDuration::days(30),
        };
        let store = Arc::new(MemoryEventStore::seeded(vec![stale]).await);
        let source = source_returning(
            FilterStrictness::Strict,
            vec![CandidateDocument::new("The finals are scheduled for next year")],
        );
        let generator = routing_generator(
            "Generated Question: Will game 1 tip off before November 5? Probability: Yes 60% No 40%",
            "Will game 1 tip off before November 5?",
        );
        let pipeline = pipeline(vec![Box::new(source)], generator, store.clone(), settings());

        pipeline.run_category(category("nba")).await;

        let records = store.all().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Will game 1 tip off before November 5?");
    }

    #[tokio::test]
    async fn test_source_failure_skips_only_that_source() {
        let mut failing = MockDocumentSource::new();
        failing.expect_name().return_const("google");
        failing.expect_plan().returning(|c: &Category| {
            Some(SearchPlan {
                topic: c.label.to_string(),
                query: c.web_query.to_string(),
                limit: 10,
            })
        });
        failing.expect_search().times(2).returning(|_, _, _| {
            Err(SourceError::RateLimited {
                retry_after: Some(Duration::from_millis(1)),
            })
        });

        let working = source_returning(
            FilterStrictness::Strict,
            vec![CandidateDocument::new("The finals are scheduled for next year")],
        );
        let generator = routing_generator(
            "Generated Question: Will game 1 tip off before November 5? Probability: Yes 60% No 40%",
            "Will game 1 tip off before November 5?",
        );
        let store = Arc::new(MemoryEventStore::new());
        let pipeline = pipeline(
            vec![Box::new(failing), Box::new(working)],
            generator,
            store.clone(),
            settings(),
        );

        let report = pipeline.run_category(category("nba")).await;

        assert_eq!(report.source_failures, 1);
        assert_eq!(report.persisted, 1);
    }

    #[tokio::test]
    async fn test_sources_without_plan_are_skipped() {
        let mut source = MockDocumentSource::new();
        source.expect_name().return_const("twitter");
        source.expect_plan().returning(|_| None);
        source.expect_search().never();

        let mut generator = MockTextGenerator::new();
        generator.expect_generate().never();
        let store = Arc::new(MemoryEventStore::new());
        let pipeline = pipeline(vec![Box::new(source)], generator, store, settings());

        let report = pipeline.run_category(category("nba")).await;
        assert_eq!(report, CategoryReport::new("nba"));
    }

    #[tokio::test]
    async fn test_run_visits_categories_in_order() {
        let mut source = MockDocumentSource::new();
        source.expect_name().return_const("reddit");
        source.expect_strictness().return_const(FilterStrictness::Strict);
        source.expect_plan().returning(|c: &Category| {
            Some(SearchPlan {
                topic: c.label.to_string(),
                query: "q".to_string(),
                limit: 5,
            })
        });
        source.expect_search().times(3).returning(|_, _, _| Ok(vec![]));

        let store = Arc::new(MemoryEventStore::new());
        let pipeline = pipeline(
            vec![Box::new(source)],
            MockTextGenerator::new(),
            store,
            settings(),
        );

        let report = pipeline.run(&CATEGORIES[..3]).await;
        let labels: Vec<_> = report.categories.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(labels, vec!["sports", "nba", "soccer"]);
    }
}
