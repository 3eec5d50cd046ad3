use tracing::info;
use uuid::Uuid;

/// How one candidate document ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOutcome {
    /// Inserted. `rejected` is true when the title is the rejection sentinel.
    Persisted { id: Uuid, rejected: bool },
    /// Failed date validation and was not persisted.
    Rejected,
    /// Generator answered without the expected markers.
    Unparseable,
    /// A generator or store call failed.
    Failed,
}

/// Tallies for one category across all sources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryReport {
    pub category: String,
    pub fetched: usize,
    pub candidates: usize,
    pub persisted: usize,
    pub rejected: usize,
    pub unparseable: usize,
    pub failed: usize,
    pub source_failures: usize,
}

impl CategoryReport {
    pub fn new(category: &str) -> Self {
        Self {
            category: category.to_string(),
            ..Self::default()
        }
    }

    pub fn record(&mut self, outcome: &DocumentOutcome) {
        match outcome {
            DocumentOutcome::Persisted { rejected, .. } => {
                self.persisted += 1;
                if *rejected {
                    self.rejected += 1;
                }
            }
            DocumentOutcome::Rejected => self.rejected += 1,
            DocumentOutcome::Unparseable => self.unparseable += 1,
            DocumentOutcome::Failed => self.failed += 1,
        }
    }

    fn absorb(&mut self, other: &CategoryReport) {
        self.fetched += other.fetched;
        self.candidates += other.candidates;
        self.persisted += other.persisted;
        self.rejected += other.rejected;
        self.unparseable += other.unparseable;
        self.failed += other.failed;
        self.source_failures += other.source_failures;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub categories: Vec<CategoryReport>,
}

impl RunReport {
    pub fn totals(&self) -> CategoryReport {
        let mut totals = CategoryReport::new("all");
        for report in &self.categories {
            totals.absorb(report);
        }
        totals
    }

    pub fn log_summary(&self) {
        let t = self.totals();
        info!(
            "Run complete: {} categories, fetched={}, candidates={}, persisted={}, rejected={}, unparseable={}, failed={}, source_failures={}",
            self.categories.len(),
            t.fetched,
            t.candidates,
            t.persisted,
            t.rejected,
            t.unparseable,
            t.failed,
            t.source_failures
        );
    }
}
