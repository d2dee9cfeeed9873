use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Kind of catalog entry, matching the labels the rating form uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    Movie,
    #[serde(rename = "TV Show")]
    TvShow,
}

impl Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaType::Movie => write!(f, "Movie"),
            MediaType::TvShow => write!(f, "TV Show"),
        }
    }
}

impl MediaType {
    /// Parse the stored label back into the enum
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Movie" => Some(MediaType::Movie),
            "TV Show" => Some(MediaType::TvShow),
            _ => None,
        }
    }

    /// TMDB path segment for this media type ("movie" or "tv")
    pub fn tmdb_segment(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::TvShow => "tv",
        }
    }
}

/// A movie or TV show entry from the external catalog
///
/// Not persisted beyond the rating that selects it; recommendation
/// candidates are derived from these transiently.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    pub external_id: u64,
    pub title: String,
    pub media_type: MediaType,
    pub popularity: f64,
    pub poster_url: Option<String>,
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// Raw TMDB list response, shared by multi-search and recommendations
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbListResponse {
    #[serde(default)]
    pub results: Vec<TmdbEntry>,
}

/// Single entry from a TMDB result list
///
/// Multi-search mixes movies, TV shows and people; movies carry `title`,
/// TV shows carry `name`, people carry neither media type we accept.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbEntry {
    pub id: u64,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

impl TmdbEntry {
    /// Converts a TMDB entry to a CatalogItem
    ///
    /// `fallback` supplies the media type when the entry omits one (the
    /// recommendations endpoint does not echo `media_type`). Person entries
    /// and unknown media types yield `None`.
    pub fn into_catalog_item(
        self,
        fallback: Option<MediaType>,
        image_base: &str,
    ) -> Option<CatalogItem> {
        let media_type = match self.media_type.as_deref() {
            Some("movie") => MediaType::Movie,
            Some("tv") => MediaType::TvShow,
            Some(_) => return None,
            None => fallback?,
        };

        let title = match media_type {
            MediaType::Movie => self.title.or(self.name)?,
            MediaType::TvShow => self.name.or(self.title)?,
        };

        Some(CatalogItem {
            external_id: self.id,
            title,
            media_type,
            popularity: self.popularity.unwrap_or(0.0),
            poster_url: self
                .poster_path
                .map(|path| format!("{}{}", image_base, path)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";

    #[test]
    fn test_media_type_display() {
        assert_eq!(format!("{}", MediaType::Movie), "Movie");
        assert_eq!(format!("{}", MediaType::TvShow), "TV Show");
    }

    #[test]
    fn test_media_type_parse_round_trip() {
        assert_eq!(MediaType::parse("Movie"), Some(MediaType::Movie));
        assert_eq!(MediaType::parse("TV Show"), Some(MediaType::TvShow));
        assert_eq!(MediaType::parse("documentary"), None);
    }

    #[test]
    fn test_media_type_serde_labels() {
        let json = serde_json::to_string(&MediaType::TvShow).unwrap();
        assert_eq!(json, r#""TV Show""#);

        let parsed: MediaType = serde_json::from_str(r#""Movie""#).unwrap();
        assert_eq!(parsed, MediaType::Movie);
    }

    #[test]
    fn test_tmdb_movie_entry_conversion() {
        let entry = TmdbEntry {
            id: 27205,
            media_type: Some("movie".to_string()),
            title: Some("Inception".to_string()),
            name: None,
            popularity: Some(83.5),
            poster_path: Some("/inception.jpg".to_string()),
        };

        let item = entry.into_catalog_item(None, IMAGE_BASE).unwrap();
        assert_eq!(item.external_id, 27205);
        assert_eq!(item.title, "Inception");
        assert_eq!(item.media_type, MediaType::Movie);
        assert_eq!(item.popularity, 83.5);
        assert_eq!(
            item.poster_url,
            Some("https://image.tmdb.org/t/p/w500/inception.jpg".to_string())
        );
    }

    #[test]
    fn test_tmdb_tv_entry_uses_name() {
        let entry = TmdbEntry {
            id: 1396,
            media_type: Some("tv".to_string()),
            title: None,
            name: Some("Breaking Bad".to_string()),
            popularity: Some(245.0),
            poster_path: None,
        };

        let item = entry.into_catalog_item(None, IMAGE_BASE).unwrap();
        assert_eq!(item.title, "Breaking Bad");
        assert_eq!(item.media_type, MediaType::TvShow);
        assert_eq!(item.poster_url, None);
    }

    #[test]
    fn test_tmdb_person_entry_skipped() {
        let entry = TmdbEntry {
            id: 6193,
            media_type: Some("person".to_string()),
            title: None,
            name: Some("Leonardo DiCaprio".to_string()),
            popularity: Some(50.0),
            poster_path: None,
        };

        assert!(entry.into_catalog_item(None, IMAGE_BASE).is_none());
    }

    #[test]
    fn test_tmdb_entry_without_media_type_uses_fallback() {
        let entry = TmdbEntry {
            id: 155,
            media_type: None,
            title: Some("The Dark Knight".to_string()),
            name: None,
            popularity: Some(120.0),
            poster_path: None,
        };

        let item = entry
            .clone()
            .into_catalog_item(Some(MediaType::Movie), IMAGE_BASE)
            .unwrap();
        assert_eq!(item.media_type, MediaType::Movie);

        // No fallback and no media_type: cannot classify
        assert!(entry.into_catalog_item(None, IMAGE_BASE).is_none());
    }
}
