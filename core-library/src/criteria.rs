//! Criteria model for listing and partial updates.
//!
//! Both [`SongCriteria`] and [`SongPatch`] expose their fields as a fixed,
//! statically ordered list of `(column, value)` pairs. The query builder walks
//! that list, so clause and parameter order never depends on how the caller
//! populated the struct.

use bridge_traits::database::QueryValue;
use serde::{Deserialize, Serialize};

use crate::date::ReleaseDate;
use crate::models::Song;

/// Columns of the `song` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SongColumn {
    Id,
    Title,
    Group,
    Text,
    Link,
    ReleaseDate,
}

impl SongColumn {
    /// Every column in table order
    pub const ALL: [SongColumn; 6] = [
        SongColumn::Id,
        SongColumn::Title,
        SongColumn::Group,
        SongColumn::Text,
        SongColumn::Link,
        SongColumn::ReleaseDate,
    ];

    /// Quoted identifier as used in SQL. `group` is a reserved word.
    pub const fn quoted(&self) -> &'static str {
        match self {
            SongColumn::Id => r#""id""#,
            SongColumn::Title => r#""name""#,
            SongColumn::Group => r#""group""#,
            SongColumn::Text => r#""text""#,
            SongColumn::Link => r#""link""#,
            SongColumn::ReleaseDate => r#""release_date""#,
        }
    }

    /// Unquoted column name, the key under which the adapter returns values
    pub const fn name(&self) -> &'static str {
        match self {
            SongColumn::Id => "id",
            SongColumn::Title => "name",
            SongColumn::Group => "group",
            SongColumn::Text => "text",
            SongColumn::Link => "link",
            SongColumn::ReleaseDate => "release_date",
        }
    }
}

fn text(value: &Option<String>) -> Option<QueryValue> {
    value.as_ref().map(|v| QueryValue::Text(v.clone()))
}

fn date(value: &Option<ReleaseDate>) -> Option<QueryValue> {
    value.map(|d| QueryValue::Date(d.as_naive_date()))
}

// =============================================================================
// Listing criteria
// =============================================================================

/// Optional equality filter per field. `None` means "do not filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongCriteria {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub group: Option<String>,
    pub text: Option<String>,
    pub link: Option<String>,
    pub release_date: Option<ReleaseDate>,
}

impl SongCriteria {
    /// Predicates in fixed column order, absent ones included as `None`
    pub fn predicates(&self) -> [(SongColumn, Option<QueryValue>); 6] {
        [
            (SongColumn::Id, self.id.map(QueryValue::Integer)),
            (SongColumn::Title, text(&self.title)),
            (SongColumn::Group, text(&self.group)),
            (SongColumn::Text, text(&self.text)),
            (SongColumn::Link, text(&self.link)),
            (SongColumn::ReleaseDate, date(&self.release_date)),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.predicates().iter().all(|(_, value)| value.is_none())
    }

    /// Whether `song` satisfies every present predicate
    pub fn matches(&self, song: &Song) -> bool {
        self.id.map_or(true, |id| song.id == id)
            && self.title.as_ref().map_or(true, |t| &song.title == t)
            && self.group.as_ref().map_or(true, |g| &song.group == g)
            && self.text.as_ref().map_or(true, |t| &song.text == t)
            && self.link.as_ref().map_or(true, |l| &song.link == l)
            && self.release_date.map_or(true, |d| song.release_date == d)
    }
}

// =============================================================================
// Partial update
// =============================================================================

/// Optional replacement value per mutable field. `None` leaves the field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongPatch {
    #[serde(rename = "song")]
    pub title: Option<String>,
    pub group: Option<String>,
    pub text: Option<String>,
    pub link: Option<String>,
    pub release_date: Option<ReleaseDate>,
}

impl SongPatch {
    /// Assignments in fixed column order, absent ones included as `None`
    pub fn assignments(&self) -> [(SongColumn, Option<QueryValue>); 5] {
        [
            (SongColumn::Title, text(&self.title)),
            (SongColumn::Group, text(&self.group)),
            (SongColumn::Text, text(&self.text)),
            (SongColumn::Link, text(&self.link)),
            (SongColumn::ReleaseDate, date(&self.release_date)),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.assignments().iter().all(|(_, value)| value.is_none())
    }

    /// Apply present fields to an in-memory record
    pub fn apply_to(&self, song: &mut Song) {
        if let Some(title) = &self.title {
            song.title = title.clone();
        }
        if let Some(group) = &self.group {
            song.group = group.clone();
        }
        if let Some(text) = &self.text {
            song.text = text.clone();
        }
        if let Some(link) = &self.link {
            song.link = link.clone();
        }
        if let Some(release_date) = self.release_date {
            song.release_date = release_date;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song() -> Song {
        Song {
            id: 1,
            title: "X".to_string(),
            group: "Y".to_string(),
            text: "V1".to_string(),
            link: "http://x".to_string(),
            release_date: ReleaseDate::from_ymd(2020, 1, 1).unwrap(),
        }
    }

    #[test]
    fn test_predicates_keep_column_order() {
        let criteria = SongCriteria {
            release_date: ReleaseDate::from_ymd(2020, 1, 1),
            group: Some("Y".to_string()),
            id: Some(3),
            ..Default::default()
        };

        let present: Vec<SongColumn> = criteria
            .predicates()
            .into_iter()
            .filter_map(|(column, value)| value.map(|_| column))
            .collect();

        assert_eq!(
            present,
            vec![SongColumn::Id, SongColumn::Group, SongColumn::ReleaseDate]
        );
    }

    #[test]
    fn test_empty_criteria_matches_everything() {
        let criteria = SongCriteria::default();
        assert!(criteria.is_empty());
        assert!(criteria.matches(&song()));
    }

    #[test]
    fn test_criteria_matches_with_and_semantics() {
        let criteria = SongCriteria {
            title: Some("X".to_string()),
            group: Some("Y".to_string()),
            ..Default::default()
        };
        assert!(criteria.matches(&song()));

        let criteria = SongCriteria {
            title: Some("X".to_string()),
            group: Some("Z".to_string()),
            ..Default::default()
        };
        assert!(!criteria.matches(&song()));
    }

    #[test]
    fn test_absent_filter_is_not_empty_string_filter() {
        let mut untitled = song();
        untitled.title = String::new();

        let criteria = SongCriteria {
            title: Some(String::new()),
            ..Default::default()
        };
        assert!(criteria.matches(&untitled));
        assert!(!criteria.matches(&song()));
        assert!(SongCriteria::default().matches(&song()));
    }

    #[test]
    fn test_patch_deserializes_subset() {
        let patch: SongPatch =
            serde_json::from_str(r#"{"text":"new lyrics","releaseDate":"17.03.2021"}"#).unwrap();
        assert_eq!(patch.text.as_deref(), Some("new lyrics"));
        assert_eq!(patch.release_date, ReleaseDate::from_ymd(2021, 3, 17));
        assert!(patch.title.is_none());
        assert!(!patch.is_empty());

        let empty: SongPatch = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_patch_apply_leaves_absent_fields() {
        let mut target = song();
        let patch = SongPatch {
            link: Some("http://y".to_string()),
            ..Default::default()
        };
        patch.apply_to(&mut target);

        assert_eq!(target.link, "http://y");
        assert_eq!(target.title, "X");
        assert_eq!(target.text, "V1");
    }
}
