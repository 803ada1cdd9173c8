//! Domain models for the song library
//!
//! `Song` is the persisted record. `SongDetail` is what the enrichment lookup
//! contributes at creation time and `NewSong` is the merged creation payload.

use serde::{Deserialize, Serialize};

use crate::date::ReleaseDate;

// =============================================================================
// Song
// =============================================================================

/// A stored song.
///
/// The identifier is assigned by the store on insert and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: i64,
    /// Song title, `song` on the wire
    #[serde(rename = "song")]
    pub title: String,
    /// Group or artist name
    pub group: String,
    /// Full lyrics, verses separated by a blank line
    pub text: String,
    pub link: String,
    pub release_date: ReleaseDate,
}

// =============================================================================
// Enrichment payload
// =============================================================================

/// Details returned by the external lookup for a (title, group) pair.
///
/// Only ever merged into a [`NewSong`]; never stored on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongDetail {
    pub text: String,
    pub link: String,
    pub release_date: ReleaseDate,
}

// =============================================================================
// Creation payload
// =============================================================================

/// Everything needed to insert a song, identifier excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSong {
    pub title: String,
    pub group: String,
    pub text: String,
    pub link: String,
    pub release_date: ReleaseDate,
}

impl NewSong {
    /// Merge the client-supplied title and group with enrichment details
    pub fn from_detail(title: impl Into<String>, group: impl Into<String>, detail: SongDetail) -> Self {
        Self {
            title: title.into(),
            group: group.into(),
            text: detail.text,
            link: detail.link,
            release_date: detail.release_date,
        }
    }

    /// Validate the creation payload
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Song title cannot be empty".to_string());
        }

        if self.group.trim().is_empty() {
            return Err("Group cannot be empty".to_string());
        }

        Ok(())
    }

    /// Attach the store-assigned identifier
    pub fn into_song(self, id: i64) -> Song {
        Song {
            id,
            title: self.title,
            group: self.group,
            text: self.text,
            link: self.link,
            release_date: self.release_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail() -> SongDetail {
        SongDetail {
            text: "V1\n\nV2".to_string(),
            link: "http://x".to_string(),
            release_date: ReleaseDate::from_ymd(2020, 1, 1).unwrap(),
        }
    }

    #[test]
    fn test_song_json_field_names() {
        let song = NewSong::from_detail("X", "Y", detail()).into_song(7);
        let json = serde_json::to_value(&song).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "id": 7,
                "song": "X",
                "group": "Y",
                "text": "V1\n\nV2",
                "link": "http://x",
                "releaseDate": "01.01.2020",
            })
        );
    }

    #[test]
    fn test_song_detail_decodes_lookup_body() {
        let detail: SongDetail = serde_json::from_str(
            r#"{"text":"V1\n\nV2","link":"http://x","releaseDate":"01.01.2020"}"#,
        )
        .unwrap();
        assert_eq!(detail, self::detail());

        let bad = serde_json::from_str::<SongDetail>(
            r#"{"text":"","link":"","releaseDate":"2020-01-01"}"#,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_new_song_validation() {
        let mut song = NewSong::from_detail("X", "Y", detail());
        assert!(song.validate().is_ok());

        song.title = "   ".to_string();
        assert!(song.validate().is_err());

        song.title = "X".to_string();
        song.group = String::new();
        assert!(song.validate().is_err());
    }
}
