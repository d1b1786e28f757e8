//! Keyword extraction over a document collection.
//!
//! Each document is scored with TF-IDF against its own collection; the three
//! best terms of every document are pooled and the most frequent pooled terms
//! become the collection's keywords. Deterministic: the same corpus always
//! yields the same keywords in the same order.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

/// Terms kept per document before pooling.
pub const TERMS_PER_DOCUMENT: usize = 3;

/// Vocabulary cap (most frequent corpus terms).
pub const MAX_FEATURES: usize = 5000;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\w\w+\b").unwrap_or_else(|e| unreachable!("static token regex: {e}"))
});

static STOP_WORDS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ENGLISH_STOP_WORDS.iter().copied().collect());

/// Fixed English stop-word list.
pub const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst",
    "amoungst", "amount", "an", "and", "another", "any", "anyhow", "anyone", "anything", "anyway",
    "anywhere", "are", "around", "as", "at", "back", "be", "became", "because", "become",
    "becomes", "becoming", "been", "before", "beforehand", "behind", "being", "below", "beside",
    "besides", "between", "beyond", "bill", "both", "bottom", "but", "by", "call", "can",
    "cannot", "cant", "co", "con", "could", "couldnt", "cry", "de", "describe", "detail", "do",
    "done", "down", "due", "during", "each", "eg", "eight", "either", "eleven", "else",
    "elsewhere", "empty", "enough", "etc", "even", "ever", "every", "everyone", "everything",
    "everywhere", "except", "few", "fifteen", "fifty", "fill", "find", "fire", "first", "five",
    "for", "former", "formerly", "forty", "found", "four", "from", "front", "full", "further",
    "get", "give", "go", "had", "has", "hasnt", "have", "he", "hence", "her", "here",
    "hereafter", "hereby", "herein", "hereupon", "hers", "herself", "him", "himself", "his",
    "how", "however", "hundred", "i", "ie", "if", "in", "inc", "indeed", "interest", "into",
    "is", "it", "its", "itself", "keep", "last", "latter", "latterly", "least", "less", "ltd",
    "made", "many", "may", "me", "meanwhile", "might", "mill", "mine", "more", "moreover",
    "most", "mostly", "move", "much", "must", "my", "myself", "name", "namely", "neither",
    "never", "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor", "not",
    "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto", "or",
    "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own", "part",
    "per", "perhaps", "please", "put", "rather", "re", "same", "see", "seem", "seemed",
    "seeming", "seems", "serious", "several", "she", "should", "show", "side", "since",
    "sincere", "six", "sixty", "so", "some", "somehow", "someone", "something", "sometime",
    "sometimes", "somewhere", "still", "such", "system", "take", "ten", "than", "that", "the",
    "their", "them", "themselves", "then", "thence", "there", "thereafter", "thereby",
    "therefore", "therein", "thereupon", "these", "they", "thick", "thin", "third", "this",
    "those", "though", "three", "through", "throughout", "thru", "thus", "to", "together", "too",
    "top", "toward", "towards", "twelve", "twenty", "two", "un", "under", "until", "up", "upon",
    "us", "very", "via", "was", "we", "well", "were", "what", "whatever", "when", "whence",
    "whenever", "where", "whereafter", "whereas", "whereby", "wherein", "whereupon", "wherever",
    "whether", "which", "while", "whither", "who", "whoever", "whole", "whom", "whose", "why",
    "will", "with", "within", "without", "would", "yet", "you", "your", "yours", "yourself",
    "yourselves",
];

/// Join a document's text fields with single spaces; missing fields count as empty.
pub fn combine_fields(fields: &[Option<&str>]) -> String {
    fields
        .iter()
        .map(|f| f.unwrap_or(""))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercased, stop-word-free tokens of at least two word characters.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TOKEN
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|t| !STOP_WORDS.contains(t))
        .map(str::to_string)
        .collect()
}

/// TF-IDF keyword extractor.
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    pub terms_per_document: usize,
    pub max_features: usize,
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self {
            terms_per_document: TERMS_PER_DOCUMENT,
            max_features: MAX_FEATURES,
        }
    }
}

impl KeywordExtractor {
    /// Return at most `top_n` keywords for the corpus.
    ///
    /// Ties in the final count keep first-seen order.
    pub fn extract<S: AsRef<str>>(&self, documents: &[S], top_n: usize) -> Vec<String> {
        if documents.is_empty() || top_n == 0 {
            return Vec::new();
        }

        let tokenized: Vec<Vec<String>> =
            documents.iter().map(|d| tokenize(d.as_ref())).collect();
        let vocabulary = self.vocabulary(&tokenized);
        if vocabulary.is_empty() {
            return Vec::new();
        }

        let n = tokenized.len() as f64;
        let mut df: HashMap<&str, usize> = HashMap::new();
        for doc in &tokenized {
            let unique: HashSet<&str> = doc
                .iter()
                .map(String::as_str)
                .filter(|t| vocabulary.contains(t))
                .collect();
            for t in unique {
                *df.entry(t).or_insert(0) += 1;
            }
        }

        // Pooled selections in first-seen order, with counts.
        let mut order: Vec<String> = Vec::new();
        let mut counts: HashMap<String, usize> = HashMap::new();

        for doc in &tokenized {
            for term in self.top_terms(doc, &vocabulary, &df, n) {
                let entry = counts.entry(term.clone()).or_insert(0);
                if *entry == 0 {
                    order.push(term);
                }
                *entry += 1;
            }
        }

        // Stable sort keeps first-seen order among equal counts.
        order.sort_by(|a, b| counts[b].cmp(&counts[a]));
        order.truncate(top_n);
        order
    }

    /// Terms kept after the max-features cap (highest corpus frequency, ties alphabetical).
    fn vocabulary<'a>(&self, tokenized: &'a [Vec<String>]) -> HashSet<&'a str> {
        let mut tf: BTreeMap<&str, usize> = BTreeMap::new();
        for doc in tokenized {
            for t in doc {
                *tf.entry(t.as_str()).or_insert(0) += 1;
            }
        }
        let mut terms: Vec<(&str, usize)> = tf.into_iter().collect();
        if terms.len() > self.max_features {
            terms.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
            terms.truncate(self.max_features);
        }
        terms.into_iter().map(|(t, _)| t).collect()
    }

    /// Best-scoring positive terms of one document.
    fn top_terms(
        &self,
        doc: &[String],
        vocabulary: &HashSet<&str>,
        df: &HashMap<&str, usize>,
        n: f64,
    ) -> Vec<String> {
        let mut tf: HashMap<&str, usize> = HashMap::new();
        for t in doc.iter().map(String::as_str).filter(|t| vocabulary.contains(t)) {
            *tf.entry(t).or_insert(0) += 1;
        }

        let mut scores: Vec<(&str, f64)> = tf
            .into_iter()
            .map(|(t, count)| {
                let d = df.get(t).copied().unwrap_or(0) as f64;
                let idf = ((1.0 + n) / (1.0 + d)).ln() + 1.0;
                (t, count as f64 * idf)
            })
            .collect();

        let norm = scores.iter().map(|(_, s)| s * s).sum::<f64>().sqrt();
        if norm <= 0.0 {
            return Vec::new();
        }
        for (_, s) in &mut scores {
            *s /= norm;
        }

        scores.sort_by(|a, b| b.1.total_cmp(&a.1).then(b.0.cmp(a.0)));
        scores
            .into_iter()
            .filter(|(_, s)| *s > 0.0)
            .take(self.terms_per_document)
            .map(|(t, _)| t.to_string())
            .collect()
    }
}

/// Extract `top_n` keywords with the default extractor.
pub fn extract<S: AsRef<str>>(documents: &[S], top_n: usize) -> Vec<String> {
    KeywordExtractor::default().extract(documents, top_n)
}
