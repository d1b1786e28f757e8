//! Deterministic node identifiers derived from natural keys.
//!
//! Every graph node is named `<kind prefix>_<seed>`. The seed is either the
//! upstream primary key itself ([`IdentityPolicy::Direct`]) or the SHA-256
//! of the key's canonical form ([`IdentityPolicy::ContentHash`]). The policy
//! is fixed per [`EntityKind`], so the same real-world entity resolves to the
//! same node across independent passes over different source tables.
//!
//! ## Canonical form
//!
//! - integers: decimal, no padding or grouping
//! - text: verbatim; no case folding, no whitespace trimming
//! - composites: each part canonicalized, length-prefixed as `<len>:<part>`,
//!   parts joined with `|`
//!
//! An integer and a string spelling the same decimal number share a
//! canonical form on purpose: upstream tables store the same key as either.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A real-world key used to seed a node identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NaturalKey {
    Integer(i64),
    Text(String),
    Composite(Vec<NaturalKey>),
}

impl NaturalKey {
    /// Render the key to its canonical string.
    pub fn canonical(&self) -> String {
        match self {
            NaturalKey::Integer(n) => n.to_string(),
            NaturalKey::Text(s) => s.clone(),
            NaturalKey::Composite(parts) => parts
                .iter()
                .map(|p| {
                    let c = p.canonical();
                    format!("{}:{}", c.len(), c)
                })
                .collect::<Vec<_>>()
                .join("|"),
        }
    }
}

impl From<i64> for NaturalKey {
    fn from(n: i64) -> Self {
        NaturalKey::Integer(n)
    }
}

impl From<i32> for NaturalKey {
    fn from(n: i32) -> Self {
        NaturalKey::Integer(i64::from(n))
    }
}

impl From<u32> for NaturalKey {
    fn from(n: u32) -> Self {
        NaturalKey::Integer(i64::from(n))
    }
}

impl From<&str> for NaturalKey {
    fn from(s: &str) -> Self {
        NaturalKey::Text(s.to_string())
    }
}

impl From<String> for NaturalKey {
    fn from(s: String) -> Self {
        NaturalKey::Text(s)
    }
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// Hash a natural key to a 64-char lowercase hex token.
///
/// Pure: no salt, no process-local state.
pub fn map(key: &NaturalKey) -> String {
    content_hash(&key.canonical())
}

/// SHA-256 of an already canonical string, hex encoded.
pub fn content_hash(canonical: &str) -> String {
    hex::encode(Sha256::digest(canonical.as_bytes()))
}

/// How an entity kind turns its natural key into an identifier seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentityPolicy {
    /// The upstream primary key is authoritative and used verbatim.
    Direct,
    /// No authoritative upstream key: the natural key is content-hashed.
    ContentHash,
}

/// Every kind of node the assembler names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Match,
    Team,
    Competition,
    Referee,
    Venue,
    Country,
    Film,
    Genre,
    News,
    Author,
    Source,
    Keyword,
    User,
}

impl EntityKind {
    /// Prefix of the local name.
    pub fn prefix(self) -> &'static str {
        match self {
            EntityKind::Match => "match",
            EntityKind::Team => "team",
            EntityKind::Competition => "competition",
            EntityKind::Referee => "referee",
            EntityKind::Venue => "venue",
            EntityKind::Country => "country",
            EntityKind::Film => "film",
            EntityKind::Genre => "genre",
            EntityKind::News => "news",
            EntityKind::Author => "author",
            EntityKind::Source => "source",
            EntityKind::Keyword => "keyword",
            EntityKind::User => "user",
        }
    }

    pub fn policy(self) -> IdentityPolicy {
        match self {
            EntityKind::Match
            | EntityKind::Team
            | EntityKind::Competition
            | EntityKind::Film
            | EntityKind::Genre
            | EntityKind::User => IdentityPolicy::Direct,
            EntityKind::Referee
            | EntityKind::Venue
            | EntityKind::Country
            | EntityKind::News
            | EntityKind::Author
            | EntityKind::Source
            | EntityKind::Keyword => IdentityPolicy::ContentHash,
        }
    }

    /// Resolve a natural key of this kind to its node identifier.
    pub fn node(self, key: impl Into<NaturalKey>) -> NodeId {
        let key = key.into();
        let seed = match self.policy() {
            IdentityPolicy::Direct => key.canonical(),
            IdentityPolicy::ContentHash => map(&key),
        };
        NodeId(format!("{}_{}", self.prefix(), seed))
    }
}

/// Opaque, stable local name of a graph node (e.g. `team_7`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn map_is_deterministic() {
        let k = NaturalKey::from("Camp Nou");
        assert_eq!(map(&k), map(&k));
        assert_eq!(map(&k), map(&NaturalKey::from("Camp Nou".to_string())));
    }

    #[test]
    fn map_is_sha256_hex() {
        // sha256("abc")
        assert_eq!(
            map(&NaturalKey::from("abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(map(&NaturalKey::from(1)).len(), 64);
    }

    #[test]
    fn no_collisions_over_large_sample() {
        let mut seen = HashSet::new();
        for i in 0..20_000i64 {
            assert!(seen.insert(map(&NaturalKey::from(i))));
            assert!(seen.insert(map(&NaturalKey::from(format!("key-{i}")))));
        }
    }

    #[test]
    fn text_is_not_case_folded_or_trimmed() {
        let a = map(&NaturalKey::from("Stadium A"));
        assert_ne!(a, map(&NaturalKey::from("stadium a")));
        assert_ne!(a, map(&NaturalKey::from(" Stadium A")));
    }

    #[test]
    fn integer_and_decimal_text_share_identity() {
        assert_eq!(
            EntityKind::Venue.node(556),
            EntityKind::Venue.node("556")
        );
    }

    #[test]
    fn composite_parts_are_unambiguous() {
        let ab_c = NaturalKey::Composite(vec!["a|b".into(), "c".into()]);
        let a_bc = NaturalKey::Composite(vec!["a".into(), "b|c".into()]);
        assert_ne!(ab_c.canonical(), a_bc.canonical());
        assert_ne!(map(&ab_c), map(&a_bc));
        assert_ne!(
            NaturalKey::Composite(vec!["x".into()]).canonical(),
            NaturalKey::from("x").canonical()
        );
    }

    #[test]
    fn direct_policy_keeps_primary_key() {
        assert_eq!(EntityKind::Match.node(42).as_str(), "match_42");
        assert_eq!(EntityKind::Team.node(7).as_str(), "team_7");
        assert_eq!(EntityKind::User.node(0).as_str(), "user_0");
    }

    #[test]
    fn content_hash_policy_hashes_key() {
        let venue = EntityKind::Venue.node("Stadium A");
        assert_eq!(
            venue.as_str(),
            format!("venue_{}", map(&NaturalKey::from("Stadium A")))
        );
        assert_eq!(EntityKind::Keyword.policy(), IdentityPolicy::ContentHash);
    }

    #[test]
    fn natural_key_deserializes_untagged() {
        let keys: Vec<NaturalKey> = serde_json::from_str(r#"[7, "Stadium A"]"#).unwrap();
        assert_eq!(keys[0], NaturalKey::Integer(7));
        assert_eq!(keys[1], NaturalKey::Text("Stadium A".into()));
    }
}
