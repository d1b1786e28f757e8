//! News collections: articles, authors, sources and keyword tags.

use serde::{Deserialize, Serialize};

use crate::graph::vocab::{Class, Property};
use crate::graph::{Graph, Literal};
use crate::identity::EntityKind;
use crate::source::{NewsCollection, NewsRow, Topic};

/// How a collection keyword is matched against an article's text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordMatch {
    /// Case-insensitive substring containment ("us" matches "business").
    #[default]
    Substring,
    /// Case-insensitive match against whole words only.
    WholeWord,
}

impl KeywordMatch {
    /// Whether `keyword` (already lowercased) occurs in any of `fields`.
    fn matches(self, keyword: &str, fields: &[String]) -> bool {
        match self {
            KeywordMatch::Substring => fields.iter().any(|f| f.contains(keyword)),
            KeywordMatch::WholeWord => fields.iter().any(|f| {
                f.split(|c: char| !(c.is_alphanumeric() || c == '_'))
                    .any(|w| w == keyword)
            }),
        }
    }
}

/// Article class of a news topic.
pub fn topic_class(topic: Topic) -> Class {
    match topic {
        Topic::Entertainment => Class::EntertainmentNews,
        Topic::Sports => Class::SportsNews,
        Topic::Technology => Class::TechNews,
    }
}

/// Statements for one topic's articles, tagged with that topic's `keywords`.
///
/// Rows without a URL have no identity and are skipped.
pub fn news(collection: &NewsCollection, keywords: &[String], mode: KeywordMatch) -> Graph {
    let class = topic_class(collection.topic);
    let lowered: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();

    let mut g = Graph::new();
    let mut skipped = 0usize;
    for row in &collection.rows {
        let Some(url) = row.url.as_deref() else {
            skipped += 1;
            continue;
        };
        let subject = EntityKind::News.node(url);
        g.add_type(&subject, class);

        if let Some(author) = row.author.as_deref() {
            let node = EntityKind::Author.node(author);
            g.add(&subject, Property::WrittenBy, &node);
            g.add(&node, Property::AuthorName, Literal::string(author));
        }
        if let Some(source) = row.source.as_deref() {
            let node = EntityKind::Source.node(source);
            g.add(&subject, Property::PublishedAt, &node);
            g.add(&node, Property::SourceName, Literal::string(source));
        }
        if let Some(title) = row.title.as_deref() {
            g.add(&subject, Property::NewsTitle, Literal::string(title));
        }
        if let Some(date) = row.published_at.as_ref().and_then(|d| d.literal()) {
            g.add(&subject, Property::NewsDate, date);
        }

        let fields = lowered_fields(row);
        for (keyword, lower) in keywords.iter().zip(&lowered) {
            if mode.matches(lower, &fields) {
                let node = EntityKind::Keyword.node(keyword.as_str());
                g.add(&subject, Property::RelatedKeyword, &node);
                g.add(&node, Property::KeywordText, Literal::string(keyword.as_str()));
            }
        }
    }
    tracing::debug!(
        topic = collection.topic.collection(),
        rows = collection.rows.len(),
        skipped,
        "assembled news"
    );
    g
}

fn lowered_fields(row: &NewsRow) -> Vec<String> {
    row.text_fields()
        .iter()
        .map(|f| f.unwrap_or("").to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Iri, Term};

    fn article(url: &str, title: &str) -> NewsRow {
        NewsRow {
            url: Some(url.into()),
            title: Some(title.into()),
            ..Default::default()
        }
    }

    fn tech(rows: Vec<NewsRow>) -> NewsCollection {
        NewsCollection {
            topic: Topic::Technology,
            rows,
        }
    }

    #[test]
    fn article_is_typed_by_topic() {
        let g = news(&tech(vec![article("https://x/1", "Chips")]), &[], KeywordMatch::Substring);
        let subject = Iri::resource(&EntityKind::News.node("https://x/1"));
        let rdf_type = Iri::new(crate::graph::vocab::RDF_TYPE);
        assert_eq!(
            g.objects(&subject, &rdf_type).cloned().collect::<Vec<_>>(),
            vec![Term::from(Class::TechNews)]
        );
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        let rows = vec![article("https://x/1", "New GPU launch")];
        let g = news(&tech(rows), &["gpu".to_string()], KeywordMatch::Substring);
        let keyword = EntityKind::Keyword.node("gpu");
        let text = Property::KeywordText.iri();
        assert_eq!(g.objects(&Iri::resource(&keyword), &text).count(), 1);
    }

    #[test]
    fn substring_mode_over_matches_and_whole_word_does_not() {
        let rows = vec![article("https://x/1", "Business outlook")];
        let kws = ["us".to_string()];
        let related = Property::RelatedKeyword.iri();
        let subject = Iri::resource(&EntityKind::News.node("https://x/1"));

        let loose = news(&tech(rows.clone()), &kws, KeywordMatch::Substring);
        assert_eq!(loose.objects(&subject, &related).count(), 1);

        let strict = news(&tech(rows), &kws, KeywordMatch::WholeWord);
        assert_eq!(strict.objects(&subject, &related).count(), 0);
    }

    #[test]
    fn shared_keyword_is_one_node() {
        let rows = vec![
            article("https://x/1", "AI chip"),
            article("https://x/2", "AI model"),
        ];
        let g = news(&tech(rows), &["ai".to_string()], KeywordMatch::WholeWord);
        let keyword = Iri::resource(&EntityKind::Keyword.node("ai"));
        let linked = g
            .iter()
            .filter(|s| s.object.as_iri() == Some(&keyword))
            .count();
        assert_eq!(linked, 2);
        assert_eq!(g.about(&keyword).count(), 1);
    }

    #[test]
    fn author_and_source_get_labels() {
        let row = NewsRow {
            url: Some("https://x/1".into()),
            author: Some("Jane Roe".into()),
            source: Some("Wired".into()),
            ..Default::default()
        };
        let g = news(&tech(vec![row]), &[], KeywordMatch::Substring);
        let author = Iri::resource(&EntityKind::Author.node("Jane Roe"));
        let source = Iri::resource(&EntityKind::Source.node("Wired"));
        assert_eq!(g.about(&author).count(), 1);
        assert_eq!(g.about(&source).count(), 1);
    }

    #[test]
    fn rows_without_url_are_skipped() {
        let row = NewsRow {
            title: Some("orphan".into()),
            ..Default::default()
        };
        assert!(news(&tech(vec![row]), &[], KeywordMatch::Substring).is_empty());
    }
}
