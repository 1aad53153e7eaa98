//! Multi-artist credit splitting
//!
//! Tag credits like "A feat. B" or "A & B" are split into individual artist
//! identities when the artists table is rebuilt. Splitting is conservative:
//! a known act whose name contains a separator ("Simon & Garfunkel") is
//! never split, whether it is the whole credit or embedded in a larger one.
//!
//! Identity rules:
//! - a name that also occurs as an unsplit credit reuses that credit's id
//! - an unsplit credit keeps its own raw id
//! - otherwise the name gets a deterministic negative id, so split
//!   identities are recognizable by sign alone
//!
//! The [`ArtistResolver`] produced by [`rebuild`] carries the in-process
//! state queries need to reconcile negative ids back to raw credits.

use crate::Result;
use melodex_core::ids;
use melodex_core::types::*;
use sqlx::{Row, Sqlite, Transaction};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Separator tokens, tried leftmost-first with list order breaking ties.
/// Matching is ASCII-case-insensitive, so " x " also covers " X ".
const SEPARATORS: &[&str] = &[
    " feat. ",
    " ft. ",
    " featuring ",
    " / ",
    "/",
    ", ",
    " & ",
    "&",
    " and ",
    " x ",
];

/// Act names that contain separator tokens but are single artists
const EXCEPTION_ACTS: &[&str] = &[
    "simon & garfunkel",
    "hall & oates",
    "earth, wind & fire",
    "emerson, lake & palmer",
    "crosby, stills, nash & young",
    "peter, paul and mary",
    "blood, sweat & tears",
    "up, bustle and out",
    "me first and the gimme gimmes",
    "hootie & the blowfish",
    "katrina and the waves",
    "kc and the sunshine band",
    "martha and the vandellas",
    "gladys knight & the pips",
    "bob seger & the silver bullet band",
    "huey lewis and the news",
    "echo & the bunnymen",
    "tom petty and the heartbreakers",
    "bob marley & the wailers",
    "sly & the family stone",
    "bruce springsteen & the e street band",
    "diana ross & the supremes",
    "smokey robinson & the miracles",
    "joan jett & the blackhearts",
    "prince & the revolution",
    "derek & the dominos",
    "sergio mendes & brasil '66",
    "tyler, the creator",
    "panic! at the disco",
    "florence + the machine",
    "florence and the machine",
];

/// In-process lookup state for split artist identities
///
/// `combined_index` maps a normalized artist name to every combined credit
/// string that mentions it; it is rebuilt from scratch on each [`rebuild`].
/// `id_to_name` maps negative split ids back to the canonical name; the
/// mapping is a pure function of the name, so rebuilding it in full each
/// pass is equivalent to persisting it.
#[derive(Debug, Default)]
pub struct ArtistResolver {
    combined_index: HashMap<String, BTreeSet<String>>,
    id_to_name: HashMap<ArtistId, String>,
}

impl ArtistResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical name for a split id, if the id is known
    pub fn name_for_id(&self, id: ArtistId) -> Option<&str> {
        self.id_to_name.get(&id).map(String::as_str)
    }

    /// Combined credit strings that mention this artist name
    pub fn combined_credits_for(&self, name: &str) -> Vec<String> {
        self.combined_index
            .get(&ids::normalize(name))
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// The raw credit strings a split id's tracks can carry: the artist's
    /// own name plus every combined credit that mentions it
    ///
    /// Returns `None` for an unknown id, which callers treat as an empty
    /// result rather than an error.
    pub fn credit_terms_for_id(&self, id: ArtistId) -> Option<Vec<String>> {
        let name = self.id_to_name.get(&id)?;
        let mut terms = vec![name.clone()];
        terms.extend(self.combined_credits_for(name));
        Some(terms)
    }

    fn add_to_index(&mut self, split_name: &str, combined: &str) {
        self.combined_index
            .entry(ids::normalize(split_name))
            .or_default()
            .insert(combined.to_string());
    }

    fn add_id_mapping(&mut self, id: ArtistId, name: &str) {
        self.id_to_name.insert(id, name.to_string());
    }
}

/// Whether the whole credit is a known single act
fn is_exception(credit: &str) -> bool {
    let normalized = ids::normalize(credit);
    EXCEPTION_ACTS.contains(&normalized.as_str())
}

/// ASCII-case-insensitive substring search
fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }

    let len = needle.len();
    for start in 0..=(haystack.len() - len) {
        if !haystack.is_char_boundary(start) || !haystack.is_char_boundary(start + len) {
            continue;
        }
        if haystack[start..start + len].eq_ignore_ascii_case(needle) {
            return Some(start);
        }
    }
    None
}

/// Leftmost separator occurrence; ties go to the earlier list entry
fn next_separator(s: &str) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;
    for sep in SEPARATORS {
        if let Some(pos) = find_ignore_ascii_case(s, sep) {
            if best.map_or(true, |(best_pos, _)| pos < best_pos) {
                best = Some((pos, sep.len()));
            }
        }
    }
    best
}

/// Split a raw artist credit into individual artist names
///
/// Returns the original credit as the sole element when nothing splits,
/// including for credits that are known single acts.
pub fn split_credit(credit: &str) -> Vec<String> {
    if is_exception(credit) {
        return vec![credit.to_string()];
    }

    // Park known acts behind placeholder tokens so their internal
    // separators survive tokenization. Longest names first, so
    // "florence and the machine" wins over a shorter embedded match.
    let mut working = credit.to_string();
    let mut placeholders: Vec<(String, String)> = Vec::new();
    let mut acts: Vec<&str> = EXCEPTION_ACTS.to_vec();
    acts.sort_by_key(|act| std::cmp::Reverse(act.len()));

    for act in acts {
        if let Some(pos) = find_ignore_ascii_case(&working, act) {
            let original = working[pos..pos + act.len()].to_string();
            let placeholder = format!("___ACT_{}___", placeholders.len());
            working.replace_range(pos..pos + act.len(), &placeholder);
            placeholders.push((placeholder, original));
        }
    }

    let mut parts: Vec<String> = Vec::new();
    let mut rest = working.as_str();
    while let Some((pos, len)) = next_separator(rest) {
        parts.push(rest[..pos].to_string());
        rest = &rest[pos + len..];
    }
    parts.push(rest.to_string());

    let mut cleaned: Vec<String> = Vec::new();
    for mut part in parts {
        for (placeholder, original) in &placeholders {
            if let Some(pos) = part.find(placeholder.as_str()) {
                part.replace_range(pos..pos + placeholder.len(), original);
            }
        }
        let trimmed = part.trim();
        if !trimmed.is_empty() {
            cleaned.push(trimmed.to_string());
        }
    }

    if cleaned.len() > 1 {
        cleaned
    } else {
        vec![credit.to_string()]
    }
}

/// Rebuild the artists table from the tracks table
///
/// Two passes over the grouped raw credits: the first learns which names
/// exist as unsplit credits (those keep their raw ids), the second splits
/// every credit and merges counts per normalized name. Runs inside the
/// caller's aggregation transaction; returns the resolver for the new
/// generation of identities.
pub async fn rebuild(tx: &mut Transaction<'_, Sqlite>) -> Result<ArtistResolver> {
    sqlx::query("DELETE FROM artists").execute(&mut **tx).await?;

    let rows = sqlx::query(
        r#"
        SELECT
            artist_id,
            artist,
            COUNT(DISTINCT album_id) AS num_albums,
            COUNT(*) AS num_tracks
        FROM tracks
        GROUP BY artist_id
        "#,
    )
    .fetch_all(&mut **tx)
    .await?;

    struct RawCredit {
        id: ArtistId,
        credit: String,
        num_albums: i64,
        num_tracks: i64,
    }

    let raw: Vec<RawCredit> = rows
        .into_iter()
        .map(|row| RawCredit {
            id: row.get("artist_id"),
            credit: row.get("artist"),
            num_albums: row.get("num_albums"),
            num_tracks: row.get("num_tracks"),
        })
        .collect();

    // Pass 1: names that occur as unsplit credits keep their raw ids
    let mut pure_ids: HashMap<String, ArtistId> = HashMap::new();
    for entry in &raw {
        if split_credit(&entry.credit).len() == 1 {
            pure_ids.insert(ids::normalize(&entry.credit), entry.id);
        }
    }

    // Pass 2: split, merge counts per normalized name, assign ids
    let mut resolver = ArtistResolver::new();
    let mut merged: BTreeMap<String, Artist> = BTreeMap::new();

    for entry in &raw {
        let parts = split_credit(&entry.credit);

        if parts.len() > 1 {
            for name in &parts {
                resolver.add_to_index(name, &entry.credit);
            }
        }

        for name in &parts {
            let key = ids::normalize(name);

            if let Some(existing) = merged.get_mut(&key) {
                existing.num_albums += entry.num_albums;
                existing.num_tracks += entry.num_tracks;
                continue;
            }

            let id = pure_ids.get(&key).copied().unwrap_or_else(|| {
                if parts.len() == 1 {
                    entry.id
                } else {
                    ids::split_artist_id(name)
                }
            });

            if ids::is_split_id(id) {
                resolver.add_id_mapping(id, name);
            }

            merged.insert(
                key,
                Artist {
                    id,
                    name: name.clone(),
                    num_albums: entry.num_albums,
                    num_tracks: entry.num_tracks,
                },
            );
        }
    }

    for artist in merged.values() {
        sqlx::query("INSERT INTO artists (id, name, num_albums, num_tracks) VALUES (?, ?, ?, ?)")
            .bind(artist.id)
            .bind(&artist.name)
            .bind(artist.num_albums)
            .bind(artist.num_tracks)
            .execute(&mut **tx)
            .await?;
    }

    tracing::debug!(
        "Rebuilt artists table: {} identities from {} raw credits",
        merged.len(),
        raw.len()
    );

    Ok(resolver)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_credit_stays_whole() {
        assert_eq!(split_credit("Radiohead"), vec!["Radiohead"]);
    }

    #[test]
    fn empty_credit_stays_whole() {
        assert_eq!(split_credit(""), vec![""]);
    }

    #[test]
    fn feat_splits() {
        assert_eq!(
            split_credit("Daft Punk feat. Pharrell Williams"),
            vec!["Daft Punk", "Pharrell Williams"]
        );
    }

    #[test]
    fn ampersand_and_comma_split() {
        assert_eq!(split_credit("A & B"), vec!["A", "B"]);
        assert_eq!(split_credit("A, B, C"), vec!["A", "B", "C"]);
        assert_eq!(split_credit("A/B"), vec!["A", "B"]);
    }

    #[test]
    fn separators_match_case_insensitively() {
        assert_eq!(
            split_credit("KAYTRANADA X Anderson .Paak"),
            vec!["KAYTRANADA", "Anderson .Paak"]
        );
        assert_eq!(split_credit("A FEAT. B"), vec!["A", "B"]);
    }

    #[test]
    fn known_act_is_never_split() {
        assert_eq!(
            split_credit("Simon & Garfunkel"),
            vec!["Simon & Garfunkel"]
        );
        assert_eq!(
            split_credit("Earth, Wind & Fire"),
            vec!["Earth, Wind & Fire"]
        );
        assert_eq!(split_credit("Tyler, The Creator"), vec!["Tyler, The Creator"]);
    }

    #[test]
    fn known_act_survives_inside_combined_credit() {
        assert_eq!(
            split_credit("Drake, Earth, Wind & Fire"),
            vec!["Drake", "Earth, Wind & Fire"]
        );
        assert_eq!(
            split_credit("Simon & Garfunkel feat. Nina Simone"),
            vec!["Simon & Garfunkel", "Nina Simone"]
        );
    }

    #[test]
    fn longest_known_act_wins() {
        // "florence and the machine" must be protected before " and " splits it
        assert_eq!(
            split_credit("Florence and the Machine & Dizzee Rascal"),
            vec!["Florence and the Machine", "Dizzee Rascal"]
        );
    }

    #[test]
    fn whitespace_around_parts_is_trimmed() {
        assert_eq!(split_credit("A ,  B"), vec!["A", "B"]);
    }

    #[test]
    fn resolver_round_trips_names_and_credits() {
        let mut resolver = ArtistResolver::new();
        resolver.add_to_index("Daft Punk", "Daft Punk feat. Pharrell Williams");
        let id = ids::split_artist_id("Daft Punk");
        resolver.add_id_mapping(id, "Daft Punk");

        assert_eq!(resolver.name_for_id(id), Some("Daft Punk"));
        let terms = resolver.credit_terms_for_id(id).unwrap();
        assert_eq!(
            terms,
            vec![
                "Daft Punk".to_string(),
                "Daft Punk feat. Pharrell Williams".to_string()
            ]
        );
        assert!(resolver.credit_terms_for_id(-999_999).is_none());
    }
}
