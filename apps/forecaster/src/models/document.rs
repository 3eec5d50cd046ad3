/// A raw text unit fetched from an external source.
/// Ephemeral: filtered, analysed, then dropped once the pipeline is done with it.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateDocument {
    pub content: String,
    pub title: Option<String>,
    pub url: Option<String>,
}

impl CandidateDocument {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            title: None,
            url: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Short label for log lines: the URL, else the title, else the start of the content.
    pub fn log_label(&self) -> String {
        match (&self.url, &self.title) {
            (Some(url), _) => url.clone(),
            (None, Some(title)) => title.clone(),
            (None, None) => self.content.chars().take(60).collect(),
        }
    }
}
