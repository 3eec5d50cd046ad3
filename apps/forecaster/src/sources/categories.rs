/// A topical category. `label` is stored on every record and doubles as the subreddit name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub label: &'static str,
    /// Query used by web and tweet search.
    pub web_query: &'static str,
    pub on_twitter: bool,
}

const fn category(label: &'static str, web_query: &'static str, on_twitter: bool) -> Category {
    Category {
        label,
        web_query,
        on_twitter,
    }
}

/// The fixed category list, processed in this order.
pub const CATEGORIES: &[Category] = &[
    category("sports", "upcoming game OR match OR tournament", false),
    category("nba", "upcoming game OR playoffs OR match", false),
    category("soccer", "upcoming match OR tournament OR championship", false),
    category("tennis", "upcoming match OR tournament OR event", false),
    category("concerts", "upcoming concert OR music festival OR event", false),
    category("festival", "upcoming festival OR event OR celebration", false),
    category("movies", "upcoming movie OR release OR premiere", false),
    category("apple", "upcoming product OR event OR launch", true),
    category("Android", "upcoming product OR event OR release", true),
    category("cryptocurrency", "upcoming launch OR event OR ICO", true),
    category("politics", "upcoming election OR event OR debate", true),
    category("worldnews", "upcoming summit OR meeting OR event", true),
    category("science", "upcoming experiment OR discovery OR conference", true),
    category("space", "upcoming mission OR launch OR event", true),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_labels_are_unique() {
        let labels: HashSet<_> = CATEGORIES.iter().map(|c| c.label).collect();
        assert_eq!(labels.len(), CATEGORIES.len());
        assert_eq!(CATEGORIES.len(), 14);
    }

    #[test]
    fn test_every_category_has_a_web_query() {
        assert!(CATEGORIES.iter().all(|c| c.web_query.starts_with("upcoming ")));
    }

    #[test]
    fn test_twitter_covers_tech_news_and_science() {
        let on_twitter: Vec<_> = CATEGORIES
            .iter()
            .filter(|c| c.on_twitter)
            .map(|c| c.label)
            .collect();
        assert_eq!(
            on_twitter,
            vec!["apple", "Android", "cryptocurrency", "politics", "worldnews", "science", "space"]
        );
    }
}
