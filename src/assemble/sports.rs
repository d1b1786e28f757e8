//! Sports collections: matches, competitions, teams, venues.

use crate::graph::vocab::{Class, Property};
use crate::graph::{Graph, Literal};
use crate::identity::{EntityKind, NodeId};
use crate::source::{CountryRef, LeagueRow, MatchRow, TeamRow, VenueRow};

/// Match statuses that describe a played (or settled) fixture.
pub const SETTLED_STATUSES: &[&str] = &[
    "match finished",
    "walkover",
    "technical loss",
    "match abandoned",
];

/// Country node of a competition's country, if it can be named.
///
/// International competitions carry the pseudo-country `World`, which has no
/// code and is keyed by the literal `"world"` instead.
pub fn country_node(country: &CountryRef) -> Option<NodeId> {
    if country.name.as_deref() == Some("World") {
        return Some(EntityKind::Country.node("world"));
    }
    country
        .code
        .as_deref()
        .map(|code| EntityKind::Country.node(code))
}

/// Statements for settled matches; other statuses are skipped.
pub fn matches(rows: &[MatchRow]) -> Graph {
    let mut g = Graph::new();
    let mut skipped = 0usize;
    for row in rows {
        let (Some(id), Some(status)) = (row.match_id, row.status.as_deref()) else {
            skipped += 1;
            continue;
        };
        if !SETTLED_STATUSES.contains(&status) {
            skipped += 1;
            continue;
        }
        let subject = EntityKind::Match.node(id);

        if let Some(team) = row.team_home_id {
            g.add(&subject, Property::MatchHomeTeam, EntityKind::Team.node(team));
        }
        if let Some(team) = row.team_away_id {
            g.add(&subject, Property::MatchAwayTeam, EntityKind::Team.node(team));
        }
        if let Some(goals) = row.goals_home {
            g.add(&subject, Property::MatchHomeGoals, Literal::integer(goals));
        }
        if let Some(goals) = row.goals_away {
            g.add(&subject, Property::MatchAwayGoals, Literal::integer(goals));
        }
        if let Some(date) = row.date.as_ref().and_then(|d| d.literal()) {
            g.add(&subject, Property::MatchDate, date);
        }
        g.add(&subject, Property::MatchStatus, Literal::string(status));
        if let Some(league) = row.league_id {
            g.add(
                &subject,
                Property::MatchCompetition,
                EntityKind::Competition.node(league),
            );
        }
        if let Some(referee) = row.referee.as_deref() {
            let node = EntityKind::Referee.node(referee);
            g.add(&subject, Property::MatchReferee, &node);
            g.add(&node, Property::RefereeName, Literal::string(referee));
        }
        if let Some(venue) = row.venue_id.clone() {
            g.add(&subject, Property::MatchVenue, EntityKind::Venue.node(venue));
        }
    }
    tracing::debug!(rows = rows.len(), skipped, "assembled matches");
    g
}

pub fn leagues(rows: &[LeagueRow]) -> Graph {
    let mut g = Graph::new();
    for row in rows {
        let Some(id) = row.league_id else { continue };
        let subject = EntityKind::Competition.node(id);

        let class = if row.league_type.as_deref() == Some("cup") {
            Class::Cup
        } else {
            Class::League
        };
        g.add_type(&subject, class);

        if let Some(name) = row.league_name.as_deref() {
            g.add(&subject, Property::CompetitionName, Literal::string(name));
        }
        if let Some(country) = &row.country {
            if let Some(node) = country_node(country) {
                g.add(&subject, Property::CompetitionCountry, &node);
                if let Some(name) = country.name.as_deref() {
                    g.add(&node, Property::CountryName, Literal::string(name));
                }
            }
        }
    }
    g
}

pub fn teams(rows: &[TeamRow]) -> Graph {
    let mut g = Graph::new();
    for row in rows {
        let (Some(id), Some(name)) = (row.team_id, row.team_name.as_deref()) else {
            continue;
        };
        g.add(&EntityKind::Team.node(id), Property::TeamName, Literal::string(name));
    }
    g
}

pub fn venues(rows: &[VenueRow]) -> Graph {
    let mut g = Graph::new();
    for row in rows {
        let Some(key) = row.venue_id.clone() else { continue };
        let subject = EntityKind::Venue.node(key);
        if let Some(name) = row.venue_name.as_deref() {
            g.add(&subject, Property::VenueName, Literal::string(name));
        }
        if let Some(city) = row.venue_city.as_deref() {
            g.add(&subject, Property::VenueCity, Literal::string(city));
        }
    }
    g
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Iri, Term};
    use crate::identity::NaturalKey;

    fn scenario_match() -> MatchRow {
        MatchRow {
            match_id: Some(42),
            team_home_id: Some(7),
            team_away_id: Some(9),
            goals_home: Some(2),
            goals_away: Some(2),
            status: Some("match finished".into()),
            ..Default::default()
        }
    }

    #[test]
    fn scenario_match_emits_only_present_fields() {
        let g = matches(&[scenario_match()]);
        let subject = Iri::resource(&EntityKind::Match.node(42));
        let about: Vec<_> = g.about(&subject).collect();
        assert_eq!(about.len(), 5);

        let object = |p: Property| {
            let pi = p.iri();
            g.objects(&subject, &pi).cloned().collect::<Vec<_>>()
        };
        assert_eq!(object(Property::MatchHomeTeam), vec![Term::from(EntityKind::Team.node(7))]);
        assert_eq!(object(Property::MatchAwayTeam), vec![Term::from(EntityKind::Team.node(9))]);
        assert_eq!(object(Property::MatchHomeGoals), vec![Term::from(Literal::integer(2))]);
        assert_eq!(object(Property::MatchAwayGoals), vec![Term::from(Literal::integer(2))]);
        assert_eq!(
            object(Property::MatchStatus),
            vec![Term::from(Literal::string("match finished"))]
        );
        for absent in [
            Property::MatchReferee,
            Property::MatchVenue,
            Property::MatchDate,
            Property::MatchCompetition,
        ] {
            assert!(object(absent).is_empty(), "{absent:?} should be absent");
        }
        // No referee node was created either.
        assert_eq!(g.len(), 5);
    }

    #[test]
    fn unsettled_matches_are_skipped() {
        let mut row = scenario_match();
        row.status = Some("not started".into());
        assert!(matches(&[row]).is_empty());
    }

    #[test]
    fn referee_gets_hashed_node_and_label() {
        let mut row = scenario_match();
        row.referee = Some("Pierluigi Collina".into());
        let g = matches(&[row]);
        let referee = EntityKind::Referee.node("Pierluigi Collina");
        assert!(referee.as_str().starts_with("referee_"));
        let name = Property::RefereeName.iri();
        assert_eq!(g.objects(&Iri::resource(&referee), &name).count(), 1);
    }

    #[test]
    fn venue_resolves_identically_across_collections() {
        let mut row = scenario_match();
        row.venue_id = Some(NaturalKey::from("Stadium A"));
        let from_matches = matches(&[row]);
        let from_venues = venues(&[VenueRow {
            venue_id: Some(NaturalKey::from("Stadium A")),
            venue_name: Some("Stadium A".into()),
            venue_city: None,
        }]);

        let node = EntityKind::Venue.node("Stadium A");
        let iri = Iri::resource(&node);
        assert!(from_matches.iter().any(|s| s.object.as_iri() == Some(&iri)));
        assert!(from_venues.iter().any(|s| s.subject == iri));
    }

    #[test]
    fn league_types_and_world_country() {
        let rows = [
            LeagueRow {
                league_id: Some(1),
                league_name: Some("World Cup".into()),
                league_type: Some("cup".into()),
                country: Some(CountryRef {
                    name: Some("World".into()),
                    code: None,
                }),
            },
            LeagueRow {
                league_id: Some(140),
                league_name: Some("La Liga".into()),
                league_type: Some("league".into()),
                country: Some(CountryRef {
                    name: Some("Spain".into()),
                    code: Some("ES".into()),
                }),
            },
        ];
        let g = leagues(&rows);
        let rdf_type = Iri::new(crate::graph::vocab::RDF_TYPE);
        let cup = Iri::resource(&EntityKind::Competition.node(1));
        assert_eq!(
            g.objects(&cup, &rdf_type).cloned().collect::<Vec<_>>(),
            vec![Term::from(Class::Cup)]
        );
        let world = EntityKind::Country.node("world");
        let country = Property::CompetitionCountry.iri();
        assert_eq!(
            g.objects(&cup, &country).cloned().collect::<Vec<_>>(),
            vec![Term::from(world)]
        );
        let es = Iri::resource(&EntityKind::Country.node("ES"));
        let name = Property::CountryName.iri();
        assert_eq!(g.objects(&es, &name).count(), 1);
    }

    #[test]
    fn team_without_name_emits_nothing() {
        let g = teams(&[TeamRow {
            team_id: Some(3),
            team_name: None,
        }]);
        assert!(g.is_empty());
    }
}
