//! Query parameter types for library lookups

use serde::{Deserialize, Serialize};

/// Column a track query is sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortKey {
    #[default]
    Title,
    Artist,
    Album,
    Duration,
    DateAdded,
    Size,
    DisplayName,
}

impl SortKey {
    /// Whether the sort column holds text (eligible for case-insensitive sort)
    pub fn is_text(self) -> bool {
        matches!(
            self,
            SortKey::Title | SortKey::Artist | SortKey::Album | SortKey::DisplayName
        )
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Parameters for track queries
///
/// All filters are optional and combine with AND. The free-text `search`
/// matches against title, artist, and album.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryParams {
    /// Only tracks whose path starts with this prefix
    pub path_prefix: Option<String>,
    pub artist_id: Option<i64>,
    pub album_id: Option<i64>,
    pub genre_id: Option<i64>,
    /// Substring match across title, artist, and album
    pub search: Option<String>,
    pub sort: SortKey,
    pub order: SortOrder,
    /// Case-insensitive sorting for text columns
    pub ignore_case: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self {
            ignore_case: true,
            ..Self::default()
        }
    }

    pub fn path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.path_prefix = Some(prefix.into());
        self
    }

    pub fn artist(mut self, artist_id: i64) -> Self {
        self.artist_id = Some(artist_id);
        self
    }

    pub fn album(mut self, album_id: i64) -> Self {
        self.album_id = Some(album_id);
        self
    }

    pub fn genre(mut self, genre_id: i64) -> Self {
        self.genre_id = Some(genre_id);
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn sort(mut self, sort: SortKey, order: SortOrder) -> Self {
        self.sort = sort;
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_accumulates_filters() {
        let params = QueryParams::new()
            .artist(42)
            .search("love")
            .sort(SortKey::DateAdded, SortOrder::Desc)
            .limit(10)
            .offset(20);

        assert_eq!(params.artist_id, Some(42));
        assert_eq!(params.search.as_deref(), Some("love"));
        assert_eq!(params.sort, SortKey::DateAdded);
        assert_eq!(params.order, SortOrder::Desc);
        assert_eq!(params.limit, Some(10));
        assert_eq!(params.offset, Some(20));
        assert!(params.ignore_case);
    }

    #[test]
    fn text_sort_keys() {
        assert!(SortKey::Title.is_text());
        assert!(SortKey::DisplayName.is_text());
        assert!(!SortKey::Duration.is_text());
        assert!(!SortKey::Size.is_text());
    }
}
