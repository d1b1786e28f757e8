//! Namespaces, ontology classes and properties.

use super::{Datatype, Iri};

/// Ontology namespace (prefix `dbo`).
pub const ONTOLOGY_NS: &str = "http://sdm_upc.org/ontology/";
/// Instance namespace (prefix `dbr`).
pub const RESOURCE_NS: &str = "http://sdm_upc.org/resource/";
pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS_NS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";
pub const FOAF_NS: &str = "http://xmlns.com/foaf/0.1/";

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const RDFS_DOMAIN: &str = "http://www.w3.org/2000/01/rdf-schema#domain";
pub const RDFS_RANGE: &str = "http://www.w3.org/2000/01/rdf-schema#range";
pub const RDFS_SUBCLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";
pub const RDFS_SUBPROPERTY_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subPropertyOf";
pub const FOAF_PERSON: &str = "http://xmlns.com/foaf/0.1/Person";
pub const FOAF_NAME: &str = "http://xmlns.com/foaf/0.1/name";

/// Prefixes written at the top of serialized Turtle.
pub const PREFIXES: &[(&str, &str)] = &[
    ("dbo", ONTOLOGY_NS),
    ("dbr", RESOURCE_NS),
    ("rdf", RDF_NS),
    ("rdfs", RDFS_NS),
    ("xsd", XSD_NS),
    ("foaf", FOAF_NS),
];

/// Ontology classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Class {
    User,
    Country,
    Sports,
    Match,
    Competition,
    League,
    Cup,
    Team,
    Referee,
    Venue,
    Entertainment,
    Movie,
    Genre,
    Technology,
    News,
    EntertainmentNews,
    SportsNews,
    TechNews,
    Author,
    Source,
    Keyword,
}

impl Class {
    pub fn name(self) -> &'static str {
        match self {
            Class::User => "User",
            Class::Country => "Country",
            Class::Sports => "Sports",
            Class::Match => "Match",
            Class::Competition => "Competition",
            Class::League => "League",
            Class::Cup => "Cup",
            Class::Team => "Team",
            Class::Referee => "Referee",
            Class::Venue => "Venue",
            Class::Entertainment => "Entertainment",
            Class::Movie => "Movie",
            Class::Genre => "Genre",
            Class::Technology => "Technology",
            Class::News => "News",
            Class::EntertainmentNews => "Entertainment_News",
            Class::SportsNews => "Sports_News",
            Class::TechNews => "Tech_News",
            Class::Author => "Author",
            Class::Source => "Source",
            Class::Keyword => "Keyword",
        }
    }

    pub fn iri(self) -> Iri {
        Iri::new(format!("{ONTOLOGY_NS}{}", self.name()))
    }
}

/// What a property points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Range {
    Class(Class),
    Datatype(Datatype),
}

impl Range {
    pub fn iri(self) -> Iri {
        match self {
            Range::Class(c) => c.iri(),
            Range::Datatype(d) => d.iri(),
        }
    }
}

/// Ontology properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Property {
    // users
    UserName,
    UserCountry,
    LikesMovie,
    LikesGenre,
    LikesTeam,
    LikesCompetition,
    InterestedIn,
    // countries
    CountryName,
    // matches
    MatchHomeTeam,
    MatchAwayTeam,
    MatchHomeGoals,
    MatchAwayGoals,
    MatchDate,
    MatchStatus,
    MatchCompetition,
    MatchReferee,
    MatchVenue,
    // competitions, teams, referees, venues
    CompetitionCountry,
    CompetitionName,
    TeamName,
    RefereeName,
    VenueName,
    VenueCity,
    // movies and genres
    MovieTitle,
    MovieLanguage,
    MovieReleaseDate,
    MovieRevenue,
    MovieBudget,
    MovieRuntime,
    MovieAdult,
    MoviePopularity,
    MovieVoteAvg,
    MovieVoteCnt,
    UpcomingMovie,
    TrendingMovie,
    NowPlayingMovie,
    HasGenre,
    GenreName,
    // news
    WrittenBy,
    AuthorName,
    RelatedKeyword,
    PublishedAt,
    SourceName,
    NewsTitle,
    NewsDate,
    KeywordText,
}

impl Property {
    /// Every property, in ontology order.
    pub const ALL: &'static [Property] = &[
        Property::UserName,
        Property::UserCountry,
        Property::LikesMovie,
        Property::LikesGenre,
        Property::LikesTeam,
        Property::LikesCompetition,
        Property::InterestedIn,
        Property::CountryName,
        Property::MatchHomeTeam,
        Property::MatchAwayTeam,
        Property::MatchHomeGoals,
        Property::MatchAwayGoals,
        Property::MatchDate,
        Property::MatchStatus,
        Property::MatchCompetition,
        Property::MatchReferee,
        Property::MatchVenue,
        Property::CompetitionCountry,
        Property::CompetitionName,
        Property::TeamName,
        Property::RefereeName,
        Property::VenueName,
        Property::VenueCity,
        Property::MovieTitle,
        Property::MovieLanguage,
        Property::MovieReleaseDate,
        Property::MovieRevenue,
        Property::MovieBudget,
        Property::MovieRuntime,
        Property::MovieAdult,
        Property::MoviePopularity,
        Property::MovieVoteAvg,
        Property::MovieVoteCnt,
        Property::UpcomingMovie,
        Property::TrendingMovie,
        Property::NowPlayingMovie,
        Property::HasGenre,
        Property::GenreName,
        Property::WrittenBy,
        Property::AuthorName,
        Property::RelatedKeyword,
        Property::PublishedAt,
        Property::SourceName,
        Property::NewsTitle,
        Property::NewsDate,
        Property::KeywordText,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Property::UserName => "user_name",
            Property::UserCountry => "user_country",
            Property::LikesMovie => "likes_movie",
            Property::LikesGenre => "likes_genre",
            Property::LikesTeam => "likes_team",
            Property::LikesCompetition => "likes_competition",
            Property::InterestedIn => "interested_in",
            Property::CountryName => "country_name",
            Property::MatchHomeTeam => "match_home_team",
            Property::MatchAwayTeam => "match_away_team",
            Property::MatchHomeGoals => "match_home_goals",
            Property::MatchAwayGoals => "match_away_goals",
            Property::MatchDate => "match_date",
            Property::MatchStatus => "match_status",
            Property::MatchCompetition => "match_competition",
            Property::MatchReferee => "match_referee",
            Property::MatchVenue => "match_venue",
            Property::CompetitionCountry => "competition_country",
            Property::CompetitionName => "competition_name",
            Property::TeamName => "team_name",
            Property::RefereeName => "referee_name",
            Property::VenueName => "venue_name",
            Property::VenueCity => "venue_city",
            Property::MovieTitle => "movie_title",
            Property::MovieLanguage => "movie_language",
            Property::MovieReleaseDate => "movie_release_date",
            Property::MovieRevenue => "movie_revenue",
            Property::MovieBudget => "movie_budget",
            Property::MovieRuntime => "movie_runtime",
            Property::MovieAdult => "movie_adult",
            Property::MoviePopularity => "movie_popularity",
            Property::MovieVoteAvg => "movie_vote_avg",
            Property::MovieVoteCnt => "movie_vote_cnt",
            Property::UpcomingMovie => "upcoming_movie",
            Property::TrendingMovie => "trending_movie",
            Property::NowPlayingMovie => "now_playing_movie",
            Property::HasGenre => "has_genre",
            Property::GenreName => "genre_name",
            Property::WrittenBy => "written_by",
            Property::AuthorName => "author_name",
            Property::RelatedKeyword => "related_keyword",
            Property::PublishedAt => "published_at",
            Property::SourceName => "source_name",
            Property::NewsTitle => "news_title",
            Property::NewsDate => "news_date",
            Property::KeywordText => "keyword_text",
        }
    }

    pub fn iri(self) -> Iri {
        Iri::new(format!("{ONTOLOGY_NS}{}", self.name()))
    }

    /// Class of the subjects this property describes.
    pub fn domain(self) -> Class {
        use Property::*;
        match self {
            UserName | UserCountry | LikesMovie | LikesGenre | LikesTeam | LikesCompetition
            | InterestedIn => Class::User,
            CountryName => Class::Country,
            MatchHomeTeam | MatchAwayTeam | MatchHomeGoals | MatchAwayGoals | MatchDate
            | MatchStatus | MatchCompetition | MatchReferee | MatchVenue => Class::Match,
            CompetitionCountry | CompetitionName => Class::Competition,
            TeamName => Class::Team,
            RefereeName => Class::Referee,
            VenueName | VenueCity => Class::Venue,
            MovieTitle | MovieLanguage | MovieReleaseDate | MovieRevenue | MovieBudget
            | MovieRuntime | MovieAdult | MoviePopularity | MovieVoteAvg | MovieVoteCnt
            | UpcomingMovie | TrendingMovie | NowPlayingMovie | HasGenre => Class::Movie,
            GenreName => Class::Genre,
            WrittenBy | RelatedKeyword | PublishedAt | NewsTitle | NewsDate => Class::News,
            AuthorName => Class::Author,
            SourceName => Class::Source,
            KeywordText => Class::Keyword,
        }
    }

    pub fn range(self) -> Range {
        use Property::*;
        match self {
            UserCountry | CompetitionCountry => Range::Class(Class::Country),
            LikesMovie => Range::Class(Class::Movie),
            LikesGenre | HasGenre => Range::Class(Class::Genre),
            LikesTeam | MatchHomeTeam | MatchAwayTeam => Range::Class(Class::Team),
            LikesCompetition | MatchCompetition => Range::Class(Class::Competition),
            InterestedIn | RelatedKeyword => Range::Class(Class::Keyword),
            MatchReferee => Range::Class(Class::Referee),
            MatchVenue => Range::Class(Class::Venue),
            WrittenBy => Range::Class(Class::Author),
            PublishedAt => Range::Class(Class::Source),
            MatchHomeGoals | MatchAwayGoals | MovieRevenue | MovieBudget | MovieRuntime
            | MovieVoteCnt => Range::Datatype(Datatype::Integer),
            MoviePopularity | MovieVoteAvg => Range::Datatype(Datatype::Double),
            MovieAdult | UpcomingMovie | TrendingMovie | NowPlayingMovie => {
                Range::Datatype(Datatype::Boolean)
            }
            MovieReleaseDate => Range::Datatype(Datatype::Date),
            MatchDate | NewsDate => Range::Datatype(Datatype::DateTime),
            UserName | CountryName | MatchStatus | CompetitionName | TeamName | RefereeName
            | VenueName | VenueCity | MovieTitle | MovieLanguage | GenreName | AuthorName
            | SourceName | NewsTitle | KeywordText => Range::Datatype(Datatype::String),
        }
    }

    /// Name properties that specialise `foaf:name`.
    pub fn is_person_name(self) -> bool {
        matches!(
            self,
            Property::UserName | Property::AuthorName | Property::RefereeName
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_lists_every_property_once() {
        let mut names: Vec<_> = Property::ALL.iter().map(|p| p.name()).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
        assert_eq!(total, 46);
    }

    #[test]
    fn iris_live_in_ontology_namespace() {
        assert_eq!(
            Property::MatchHomeTeam.iri().as_str(),
            "http://sdm_upc.org/ontology/match_home_team"
        );
        assert_eq!(
            Class::SportsNews.iri().as_str(),
            "http://sdm_upc.org/ontology/Sports_News"
        );
    }

    #[test]
    fn has_genre_points_from_movie_to_genre() {
        assert_eq!(Property::HasGenre.domain(), Class::Movie);
        assert_eq!(Property::HasGenre.range(), Range::Class(Class::Genre));
    }
}
