//! Source collections: typed rows read from the trusted zone.
//!
//! Every collection lives in `<dir>/<collection>.jsonl` (one JSON object per
//! line) or `<dir>/<collection>.json` (a JSON array). All fields are
//! optional: a null or missing field is simply absent from the row.
//!
//! Upstream exports are loose about types. Integer columns may arrive as
//! floats (`1.5e8`, `7.0`), and timestamps may lack an offset or be free
//! text. Such values are accepted rather than failing the whole collection.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SourceError;
use crate::graph::Literal;
use crate::identity::NaturalKey;

/// Result type for source operations.
pub type SourceResult<T> = std::result::Result<T, SourceError>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchRow {
    #[serde(alias = "fixture_id", default, deserialize_with = "lenient_int")]
    pub match_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub team_home_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub team_away_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub goals_home: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub goals_away: Option<i64>,
    #[serde(alias = "fixture_date")]
    pub date: Option<Timestamp>,
    #[serde(alias = "status_long")]
    pub status: Option<String>,
    #[serde(alias = "league", default, deserialize_with = "lenient_int")]
    pub league_id: Option<i64>,
    pub referee: Option<String>,
    #[serde(default, deserialize_with = "lenient_key")]
    pub venue_id: Option<NaturalKey>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountryRef {
    pub name: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeagueRow {
    #[serde(default, deserialize_with = "lenient_int")]
    pub league_id: Option<i64>,
    pub league_name: Option<String>,
    pub league_type: Option<String>,
    pub country: Option<CountryRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamRow {
    #[serde(default, deserialize_with = "lenient_int")]
    pub team_id: Option<i64>,
    pub team_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VenueRow {
    #[serde(default, deserialize_with = "lenient_key")]
    pub venue_id: Option<NaturalKey>,
    pub venue_name: Option<String>,
    pub venue_city: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieRow {
    #[serde(default, deserialize_with = "lenient_int")]
    pub film_id: Option<i64>,
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub release_date: Option<Timestamp>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub revenue: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub budget: Option<i64>,
    pub runtime: Option<f64>,
    pub adult: Option<bool>,
    pub popularity: Option<f64>,
    pub vote_average: Option<f64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub vote_count: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieGenreRow {
    #[serde(default, deserialize_with = "lenient_int")]
    pub film_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub genre_id: Option<i64>,
}

/// A row of the trending / upcoming / now-playing lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilmRef {
    #[serde(default, deserialize_with = "lenient_int")]
    pub film_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenreRow {
    #[serde(default, deserialize_with = "lenient_int")]
    pub genre_id: Option<i64>,
    #[serde(alias = "genre")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsRow {
    pub url: Option<String>,
    pub author: Option<String>,
    pub source: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    #[serde(alias = "publishedAt")]
    pub published_at: Option<Timestamp>,
}

impl NewsRow {
    /// Text fields scanned for keywords.
    pub fn text_fields(&self) -> [Option<&str>; 3] {
        [
            self.title.as_deref(),
            self.content.as_deref(),
            self.description.as_deref(),
        ]
    }
}

/// A date or timestamp as exported upstream.
///
/// Parsing tries an offset-aware timestamp, then a naive one, then a plain
/// date. Anything else is kept verbatim and emitted as a string literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Timestamp {
    Zoned(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
    Date(NaiveDate),
    Raw(String),
}

impl Timestamp {
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        if let Ok(dt) = trimmed.parse::<DateTime<FixedOffset>>() {
            return Timestamp::Zoned(dt);
        }
        if let Ok(dt) = trimmed.parse::<NaiveDateTime>() {
            return Timestamp::Naive(dt);
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f") {
            return Timestamp::Naive(dt);
        }
        if let Ok(d) = trimmed.parse::<NaiveDate>() {
            return Timestamp::Date(d);
        }
        Timestamp::Raw(text.to_string())
    }

    /// Literal for this value; blank text has none.
    pub fn literal(&self) -> Option<Literal> {
        match self {
            Timestamp::Zoned(dt) => Some(Literal::date_time(*dt)),
            Timestamp::Naive(dt) => Some(Literal::naive_date_time(*dt)),
            Timestamp::Date(d) => Some(Literal::date(*d)),
            Timestamp::Raw(raw) if raw.trim().is_empty() => None,
            Timestamp::Raw(raw) => Some(Literal::string(raw.clone())),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Zoned(dt) => f.write_str(&dt.to_rfc3339()),
            Timestamp::Naive(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
            Timestamp::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Timestamp::Raw(raw) => f.write_str(raw),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Timestamp::parse(&text))
    }
}

/// Shapes a numeric column takes in upstream exports.
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseNumber {
    Integer(i64),
    Float(f64),
    Text(String),
}

fn float_to_int<E: serde::de::Error>(value: f64) -> Result<i64, E> {
    if value.is_finite() && value.abs() < i64::MAX as f64 {
        Ok(value.trunc() as i64)
    } else {
        Err(E::custom(format!("{value} is not representable as an integer")))
    }
}

/// An optional integer that may be written as a float or a numeric string.
/// Fractions are truncated.
fn lenient_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    match Option::<LooseNumber>::deserialize(deserializer)? {
        None => Ok(None),
        Some(LooseNumber::Integer(n)) => Ok(Some(n)),
        Some(LooseNumber::Float(f)) => float_to_int(f).map(Some),
        Some(LooseNumber::Text(t)) if t.trim().is_empty() => Ok(None),
        Some(LooseNumber::Text(t)) => {
            let t = t.trim();
            if let Ok(n) = t.parse::<i64>() {
                return Ok(Some(n));
            }
            let f = t
                .parse::<f64>()
                .map_err(|_| D::Error::custom(format!("expected an integer, got {t:?}")))?;
            float_to_int(f).map(Some)
        }
    }
}

/// Shapes a key column takes in upstream exports.
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseKey {
    Integer(i64),
    Float(f64),
    Key(NaturalKey),
}

/// An optional natural key. Integral floats become integer keys, so `7.0`
/// and `7` name the same node.
fn lenient_key<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaturalKey>, D::Error> {
    Ok(match Option::<LooseKey>::deserialize(deserializer)? {
        None => None,
        Some(LooseKey::Integer(n)) => Some(NaturalKey::Integer(n)),
        Some(LooseKey::Float(f)) if f.fract() == 0.0 => Some(NaturalKey::Integer(float_to_int::<D::Error>(f)?)),
        Some(LooseKey::Float(f)) => Some(NaturalKey::Text(f.to_string())),
        Some(LooseKey::Key(key)) => Some(key),
    })
}

/// News topics, each read from its own collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Entertainment,
    Sports,
    Technology,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::Entertainment, Topic::Sports, Topic::Technology];

    pub fn collection(self) -> &'static str {
        match self {
            Topic::Entertainment => "entertainment",
            Topic::Sports => "sports",
            Topic::Technology => "technology",
        }
    }
}

/// News rows of one topic.
#[derive(Debug, Clone, PartialEq)]
pub struct NewsCollection {
    pub topic: Topic,
    pub rows: Vec<NewsRow>,
}

/// A directory of collection files.
#[derive(Debug, Clone)]
pub struct SourceDir {
    root: PathBuf,
}

impl SourceDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a collection file, if one exists.
    pub fn locate(&self, collection: &str) -> Option<PathBuf> {
        ["jsonl", "json"]
            .iter()
            .map(|ext| self.root.join(format!("{collection}.{ext}")))
            .find(|p| p.is_file())
    }

    /// Load every row of a collection.
    pub fn load<T: DeserializeOwned>(&self, collection: &str) -> SourceResult<Vec<T>> {
        let path = self.locate(collection).ok_or_else(|| SourceError::NotFound {
            collection: collection.to_string(),
            dir: self.root.display().to_string(),
        })?;
        let content = std::fs::read_to_string(&path).map_err(|e| SourceError::Read {
            path: path.display().to_string(),
            source: e,
        })?;

        let rows = if path.extension().is_some_and(|e| e == "json") {
            parse_array(&content, &path)?
        } else {
            parse_lines(&content, &path)?
        };
        tracing::debug!(collection, rows = rows.len(), "loaded source collection");
        Ok(rows)
    }

    /// Like [`SourceDir::load`], but a missing collection is an empty one.
    pub fn load_optional<T: DeserializeOwned>(&self, collection: &str) -> SourceResult<Vec<T>> {
        match self.load(collection) {
            Err(SourceError::NotFound { .. }) => {
                tracing::warn!(collection, "optional source collection missing, treating as empty");
                Ok(Vec::new())
            }
            other => other,
        }
    }
}

fn parse_array<T: DeserializeOwned>(content: &str, path: &Path) -> SourceResult<Vec<T>> {
    serde_json::from_str(content).map_err(|e| SourceError::Malformed {
        path: path.display().to_string(),
        line: e.line(),
        message: e.to_string(),
    })
}

fn parse_lines<T: DeserializeOwned>(content: &str, path: &Path) -> SourceResult<Vec<T>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|e| SourceError::Malformed {
                path: path.display().to_string(),
                line: i + 1,
                message: e.to_string(),
            })
        })
        .collect()
}

/// Every collection the assembler consumes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceData {
    pub matches: Vec<MatchRow>,
    pub leagues: Vec<LeagueRow>,
    pub teams: Vec<TeamRow>,
    pub venues: Vec<VenueRow>,
    pub movies: Vec<MovieRow>,
    pub movie_genres: Vec<MovieGenreRow>,
    pub trending: Vec<FilmRef>,
    pub upcoming: Vec<FilmRef>,
    pub now_playing: Vec<FilmRef>,
    pub genres: Vec<GenreRow>,
    pub news: Vec<NewsCollection>,
}

impl SourceData {
    /// Load all collections from a directory.
    ///
    /// The trending, upcoming and now-playing lists are optional.
    pub fn load_all(dir: &SourceDir) -> SourceResult<Self> {
        let news = Topic::ALL
            .iter()
            .map(|&topic| {
                Ok(NewsCollection {
                    topic,
                    rows: dir.load(topic.collection())?,
                })
            })
            .collect::<SourceResult<Vec<_>>>()?;

        let data = Self {
            matches: dir.load("matches")?,
            leagues: dir.load("leagues")?,
            teams: dir.load("teams")?,
            venues: dir.load("venues")?,
            movies: dir.load("movie")?,
            movie_genres: dir.load("movie_genre")?,
            trending: dir.load_optional("trending")?,
            upcoming: dir.load_optional("upcoming")?,
            now_playing: dir.load_optional("now_playing")?,
            genres: dir.load("genre")?,
            news,
        };
        tracing::info!(
            dir = %dir.root().display(),
            matches = data.matches.len(),
            movies = data.movies.len(),
            news = data.news.iter().map(|c| c.rows.len()).sum::<usize>(),
            "loaded source data"
        );
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_row_accepts_upstream_field_names() {
        let row: MatchRow = serde_json::from_str(
            r#"{"fixture_id": 42, "team_home_id": 7, "status_long": "match finished",
                "fixture_date": "2023-08-11T19:00:00+00:00", "league": 140, "venue_id": "Stadium A"}"#,
        )
        .unwrap();
        assert_eq!(row.match_id, Some(42));
        assert_eq!(row.league_id, Some(140));
        assert_eq!(row.status.as_deref(), Some("match finished"));
        assert_eq!(row.venue_id, Some(NaturalKey::Text("Stadium A".into())));
        assert!(row.date.is_some());
        assert!(row.referee.is_none());
    }

    #[test]
    fn naive_fixture_date_does_not_fail_the_collection() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("matches.jsonl"),
            concat!(
                r#"{"match_id": 1, "fixture_date": "2023-08-11T19:00:00"}"#,
                "\n",
                r#"{"match_id": 2, "fixture_date": "2023-08-12T19:00:00+02:00"}"#,
                "\n",
                r#"{"match_id": 3, "fixture_date": "postponed"}"#,
                "\n",
            ),
        )
        .unwrap();
        let rows: Vec<MatchRow> = SourceDir::new(dir.path()).load("matches").unwrap();
        assert_eq!(rows.len(), 3);
        assert!(matches!(rows[0].date, Some(Timestamp::Naive(_))));
        assert!(matches!(rows[1].date, Some(Timestamp::Zoned(_))));
        assert_eq!(rows[2].date, Some(Timestamp::Raw("postponed".into())));

        let naive = rows[0].date.as_ref().and_then(Timestamp::literal).unwrap();
        assert_eq!(naive.lexical(), "2023-08-11T19:00:00");
        let raw = rows[2].date.as_ref().and_then(Timestamp::literal).unwrap();
        assert_eq!(raw.lexical(), "postponed");
    }

    #[test]
    fn blank_dates_have_no_literal() {
        let row: MovieRow = serde_json::from_str(r#"{"film_id": 1, "release_date": ""}"#).unwrap();
        assert!(row.release_date.as_ref().and_then(Timestamp::literal).is_none());
        let row: MovieRow =
            serde_json::from_str(r#"{"film_id": 1, "release_date": "1999-10-15"}"#).unwrap();
        assert!(matches!(row.release_date, Some(Timestamp::Date(_))));
    }

    #[test]
    fn float_valued_integers_are_accepted() {
        let row: MovieRow = serde_json::from_str(
            r#"{"film_id": 550.0, "revenue": 1.5e8, "budget": "63000000", "vote_count": 27000.0}"#,
        )
        .unwrap();
        assert_eq!(row.film_id, Some(550));
        assert_eq!(row.revenue, Some(150_000_000));
        assert_eq!(row.budget, Some(63_000_000));
        assert_eq!(row.vote_count, Some(27_000));

        let row: MatchRow =
            serde_json::from_str(r#"{"match_id": 42, "goals_home": 2.0, "venue_id": 1234.0}"#).unwrap();
        assert_eq!(row.goals_home, Some(2));
        assert_eq!(row.venue_id, Some(NaturalKey::Integer(1234)));
    }

    #[test]
    fn non_numeric_integer_text_is_still_malformed() {
        assert!(serde_json::from_str::<TeamRow>(r#"{"team_id": "seven"}"#).is_err());
    }

    #[test]
    fn nulls_and_missing_fields_are_absent() {
        let row: MovieRow = serde_json::from_str(r#"{"film_id": 1, "title": null}"#).unwrap();
        assert_eq!(row.film_id, Some(1));
        assert!(row.title.is_none());
        assert!(row.runtime.is_none());
    }

    #[test]
    fn loads_json_lines_and_arrays() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("teams.jsonl"),
            "{\"team_id\": 1, \"team_name\": \"A\"}\n\n{\"team_id\": 2}\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("genre.json"),
            r#"[{"genre_id": 28, "genre": "Action"}]"#,
        )
        .unwrap();

        let src = SourceDir::new(dir.path());
        let teams: Vec<TeamRow> = src.load("teams").unwrap();
        assert_eq!(teams.len(), 2);
        let genres: Vec<GenreRow> = src.load("genre").unwrap();
        assert_eq!(genres[0].name.as_deref(), Some("Action"));
    }

    #[test]
    fn missing_collection_is_not_found() {
        let dir = tempfile::TempDir::new().unwrap();
        let src = SourceDir::new(dir.path());
        assert!(matches!(
            src.load::<TeamRow>("teams"),
            Err(SourceError::NotFound { .. })
        ));
        assert!(src.load_optional::<FilmRef>("trending").unwrap().is_empty());
    }

    #[test]
    fn malformed_line_reports_line_number() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("teams.jsonl"),
            "{\"team_id\": 1}\n{\"team_id\": \"seven\"}\n",
        )
        .unwrap();
        let src = SourceDir::new(dir.path());
        match src.load::<TeamRow>("teams") {
            Err(SourceError::Malformed { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected malformed error, got {other:?}"),
        }
    }
}
