use std::collections::HashSet;

use once_cell::sync::Lazy;

/// English stop words removed before ranking. Matching is done on lowercased
/// tokens, so the list is lowercase only.
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "above", "across", "after", "again", "against", "all", "almost",
        "alone", "along", "already", "also", "although", "always", "am", "among", "an",
        "and", "another", "any", "anyone", "anything", "anywhere", "are", "around", "as",
        "at", "back", "be", "became", "because", "become", "becomes", "been", "before",
        "behind", "being", "below", "between", "both", "but", "by", "can", "cannot",
        "could", "did", "do", "does", "doing", "done", "down", "during", "each", "either",
        "else", "enough", "etc", "even", "ever", "every", "everyone", "everything",
        "everywhere", "few", "for", "found", "from", "further", "get", "give", "go",
        "had", "has", "have", "having", "he", "hence", "her", "here", "hers", "herself",
        "him", "himself", "his", "how", "however", "i", "if", "in", "indeed", "into",
        "is", "it", "its", "itself", "just", "least", "less", "like", "made", "many",
        "may", "me", "meanwhile", "might", "mine", "more", "moreover", "most", "mostly",
        "much", "must", "my", "myself", "namely", "neither", "never", "nevertheless",
        "next", "no", "nobody", "none", "nor", "not", "nothing", "now", "nowhere", "of",
        "off", "often", "on", "once", "one", "only", "onto", "or", "other", "others",
        "otherwise", "our", "ours", "ourselves", "out", "over", "own", "per", "perhaps",
        "please", "put", "rather", "re", "same", "seem", "seemed", "seeming", "seems",
        "several", "she", "should", "since", "so", "some", "somehow", "someone",
        "something", "sometime", "sometimes", "somewhere", "still", "such", "than",
        "that", "the", "their", "theirs", "them", "themselves", "then", "thence",
        "there", "thereafter", "thereby", "therefore", "therein", "thereupon", "these",
        "they", "this", "those", "though", "through", "throughout", "thus", "to",
        "together", "too", "toward", "towards", "under", "until", "up", "upon", "us",
        "used", "very", "via", "was", "we", "well", "were", "what", "whatever", "when",
        "whence", "whenever", "where", "whereas", "whereby", "wherein", "whereupon",
        "wherever", "whether", "which", "while", "whither", "who", "whoever", "whole",
        "whom", "whose", "why", "will", "with", "within", "without", "would", "yet",
        "you", "your", "yours", "yourself", "yourselves",
    ]
    .into_iter()
    .collect()
});

/// Extracts the most salient terms of a single query. The original ranking
/// was a TF-IDF fit over a one-document corpus, which collapses to plain
/// term frequency, so frequency ranking with a deterministic tie-break
/// satisfies the same contract.
#[derive(Clone, Debug)]
pub struct KeywordExtractor {
    top_n: usize,
}

impl KeywordExtractor {
    pub const DEFAULT_TOP_N: usize = 5;

    pub fn new(top_n: usize) -> Self {
        Self { top_n }
    }

    /// Top-N distinct non-stop-word terms of `query`, ranked by occurrence
    /// count, ties broken by first occurrence. Lowercased. Empty when the
    /// query holds nothing but stop words.
    pub fn extract(&self, query: &str) -> Vec<String> {
        let mut order: Vec<String> = Vec::new();
        let mut counts: Vec<usize> = Vec::new();

        for token in tokenize(query) {
            if STOP_WORDS.contains(token.as_str()) {
                continue;
            }
            match order.iter().position(|t| *t == token) {
                Some(i) => counts[i] += 1,
                None => {
                    order.push(token);
                    counts.push(1);
                }
            }
        }

        let mut ranked: Vec<(usize, usize)> = counts.iter().copied().enumerate().collect();
        // Stable sort keeps first-occurrence order within equal counts.
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        ranked
            .into_iter()
            .take(self.top_n)
            .map(|(i, _)| order[i].clone())
            .collect()
    }
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TOP_N)
    }
}

/// Lowercased alphanumeric/underscore runs of at least two characters.
/// Single-character fragments carry no retrieval signal.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_content_words_only() {
        let extractor = KeywordExtractor::default();
        let keywords = extractor.extract("What is topicality?");
        assert_eq!(keywords, vec!["topicality"]);
    }

    #[test]
    fn stop_words_only_yields_empty() {
        let extractor = KeywordExtractor::default();
        assert!(extractor.extract("the a of").is_empty());
    }

    #[test]
    fn never_returns_more_than_top_n() {
        let extractor = KeywordExtractor::new(3);
        let keywords =
            extractor.extract("kritik framework topicality counterplan solvency disad");
        assert_eq!(keywords.len(), 3);
    }

    #[test]
    fn frequency_outranks_position() {
        let extractor = KeywordExtractor::default();
        let keywords = extractor.extract("framework kritik kritik");
        assert_eq!(keywords, vec!["kritik", "framework"]);
    }

    #[test]
    fn ties_break_by_first_occurrence() {
        let extractor = KeywordExtractor::new(2);
        let keywords = extractor.extract("zebra apple mango");
        assert_eq!(keywords, vec!["zebra", "apple"]);
    }

    #[test]
    fn terms_are_distinct_and_lowercased() {
        let extractor = KeywordExtractor::default();
        let keywords = extractor.extract("Topicality TOPICALITY topicality");
        assert_eq!(keywords, vec!["topicality"]);
    }

    #[test]
    fn at_most_as_many_terms_as_distinct_non_stop_words() {
        let extractor = KeywordExtractor::default();
        let keywords = extractor.extract("what is a counterplan");
        assert_eq!(keywords, vec!["counterplan"]);
    }

    #[test]
    fn punctuation_and_short_fragments_are_dropped() {
        let extractor = KeywordExtractor::default();
        let keywords = extractor.extract("T? K! framework...");
        assert_eq!(keywords, vec!["framework"]);
    }

    #[test]
    fn empty_query_yields_empty() {
        let extractor = KeywordExtractor::default();
        assert!(extractor.extract("").is_empty());
    }
}
