//! In-memory song repository
//!
//! A `SongRepository` backed by a `BTreeMap`, so listing order matches the
//! Postgres store (ascending id). Used by service and end-to-end tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bridge_traits::error::BridgeError;

use crate::criteria::{SongCriteria, SongPatch};
use crate::error::{LibraryError, Result};
use crate::models::{NewSong, Song};
use crate::repositories::{PageRequest, SongRepository};

#[derive(Debug, Default)]
struct State {
    songs: BTreeMap<i64, Song>,
    last_id: i64,
}

/// Song repository holding records in process memory
#[derive(Debug, Default)]
pub struct InMemorySongRepository {
    state: Mutex<State>,
}

impl InMemorySongRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored songs
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.songs.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Snapshot of one stored record
    pub fn get(&self, id: i64) -> Result<Option<Song>> {
        Ok(self.lock()?.songs.get(&id).cloned())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| BridgeError::OperationFailed("song store lock poisoned".to_string()).into())
    }
}

#[async_trait]
impl SongRepository for InMemorySongRepository {
    async fn list(&self, criteria: &SongCriteria, page: PageRequest) -> Result<Vec<Song>> {
        let state = self.lock()?;
        Ok(state
            .songs
            .values()
            .filter(|song| criteria.matches(song))
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect())
    }

    async fn get_text(&self, id: i64) -> Result<String> {
        let state = self.lock()?;
        state
            .songs
            .get(&id)
            .map(|song| song.text.clone())
            .ok_or_else(|| LibraryError::song_not_found(id))
    }

    async fn create(&self, song: &NewSong) -> Result<i64> {
        song.validate()
            .map_err(|message| LibraryError::invalid_input("song", message))?;

        let mut state = self.lock()?;
        state.last_id += 1;
        let id = state.last_id;
        state.songs.insert(id, song.clone().into_song(id));
        Ok(id)
    }

    async fn update(&self, id: i64, patch: &SongPatch) -> Result<u64> {
        if patch.is_empty() {
            return Err(LibraryError::NoFieldsToUpdate);
        }

        let mut state = self.lock()?;
        match state.songs.get_mut(&id) {
            Some(song) => {
                patch.apply_to(song);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: i64) -> Result<u64> {
        let mut state = self.lock()?;
        Ok(state.songs.remove(&id).map_or(0, |_| 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::ReleaseDate;

    fn new_song(title: &str, group: &str) -> NewSong {
        NewSong {
            title: title.to_string(),
            group: group.to_string(),
            text: "A\n\nB".to_string(),
            link: "http://x".to_string(),
            release_date: ReleaseDate::from_ymd(2020, 1, 1).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let repo = InMemorySongRepository::new();
        let first = repo.create(&new_song("A", "G")).await.unwrap();
        let second = repo.create(&new_song("B", "G")).await.unwrap();

        assert!(second > first);
        assert_eq!(repo.len().unwrap(), 2);
        assert_eq!(repo.get(first).unwrap().unwrap().title, "A");
        assert!(repo.get(second + 1).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_filters_and_paginates() {
        let repo = InMemorySongRepository::new();
        for i in 0..5 {
            let group = if i % 2 == 0 { "even" } else { "odd" };
            repo.create(&new_song(&format!("S{i}"), group)).await.unwrap();
        }

        let criteria = SongCriteria {
            group: Some("even".to_string()),
            ..Default::default()
        };
        let first = repo
            .list(&criteria, PageRequest::new(1, 2).unwrap())
            .await
            .unwrap();
        let second = repo
            .list(&criteria, PageRequest::new(2, 2).unwrap())
            .await
            .unwrap();

        assert_eq!(
            first.iter().map(|s| s.title.as_str()).collect::<Vec<_>>(),
            vec!["S0", "S2"]
        );
        assert_eq!(
            second.iter().map(|s| s.title.as_str()).collect::<Vec<_>>(),
            vec!["S4"]
        );
    }

    #[tokio::test]
    async fn test_update_and_delete_report_rows() {
        let repo = InMemorySongRepository::new();
        let id = repo.create(&new_song("A", "G")).await.unwrap();

        let patch = SongPatch {
            text: Some("new lyrics".to_string()),
            ..Default::default()
        };
        assert_eq!(repo.update(id, &patch).await.unwrap(), 1);
        assert_eq!(repo.get_text(id).await.unwrap(), "new lyrics");
        assert_eq!(repo.update(id + 100, &patch).await.unwrap(), 0);

        assert_eq!(repo.delete(id).await.unwrap(), 1);
        assert_eq!(repo.delete(id).await.unwrap(), 0);
        assert!(matches!(
            repo.get_text(id).await,
            Err(LibraryError::NotFound { .. })
        ));
    }

    #[test]
    fn test_poisoned_lock_is_reported() {
        let repo = InMemorySongRepository::new();
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = repo.state.lock().unwrap();
            panic!("writer died holding the lock");
        }));

        assert!(matches!(repo.len(), Err(LibraryError::Bridge(_))));
        assert!(repo.is_empty().is_err());
        assert!(repo.get(1).is_err());
    }
}
