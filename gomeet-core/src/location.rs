//! Candidate location stores.
//!
//! Locations proposed while composing a draft live in the session draft
//! ([`LocalCandidateStore`]); once a meeting exists they live on the backend
//! ([`RemoteCandidateStore`]). Callers pick one with [`select_store`].

use std::future::Future;

use tracing::debug;

use crate::client::{Client, Transport};
use crate::constants::MAX_LOCATIONS;
use crate::draft::DraftStore;
use crate::error::{GoMeetError, GoMeetResult};
use crate::meeting::CandidateLocation;
use crate::protocol::{FetchLocations, FetchPopularLocations, NewLocation, VoteLocation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    #[default]
    Local,
    Permanent,
}

impl StorageMode {
    /// `"permanent"` selects the backend; anything else the draft.
    pub fn from_flag(flag: &str) -> Self {
        if flag.trim().eq_ignore_ascii_case("permanent") {
            StorageMode::Permanent
        } else {
            StorageMode::Local
        }
    }
}

/// Fields of a location that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCandidate {
    pub title: String,
    pub lat: f64,
    pub lng: f64,
    pub note: String,
}

pub trait CandidateStore {
    fn fetch(&self) -> impl Future<Output = GoMeetResult<Vec<CandidateLocation>>> + Send;

    /// Store a candidate and return its id. Local candidates have no id
    /// until submission, so the local store returns an empty one.
    fn create(&mut self, candidate: NewCandidate) -> impl Future<Output = GoMeetResult<String>> + Send;

    fn vote(&mut self, id: &str) -> impl Future<Output = GoMeetResult<()>> + Send;
}

fn require_title(candidate: &NewCandidate) -> GoMeetResult<()> {
    if candidate.title.trim().is_empty() {
        return Err(GoMeetError::BlankField("title".into()));
    }
    Ok(())
}

/// Candidates held in the session draft.
pub struct LocalCandidateStore<'a> {
    draft: &'a mut DraftStore,
}

impl<'a> LocalCandidateStore<'a> {
    pub fn new(draft: &'a mut DraftStore) -> Self {
        LocalCandidateStore { draft }
    }
}

impl CandidateStore for LocalCandidateStore<'_> {
    async fn fetch(&self) -> GoMeetResult<Vec<CandidateLocation>> {
        Ok(self.draft.locations().to_vec())
    }

    async fn create(&mut self, candidate: NewCandidate) -> GoMeetResult<String> {
        require_title(&candidate)?;

        let title = candidate.title.trim();
        if self.draft.locations().iter().any(|l| l.title == title) {
            return Err(GoMeetError::DuplicateTitle(title.to_string()));
        }
        if self.draft.locations().len() >= MAX_LOCATIONS {
            return Err(GoMeetError::MaxCandidatesReached(MAX_LOCATIONS));
        }

        self.draft.push_location(CandidateLocation {
            id: String::new(),
            title: title.to_string(),
            lat: candidate.lat,
            lng: candidate.lng,
            note: candidate.note,
            vote_count: 0,
        });
        Ok(String::new())
    }

    /// The draft's author is the only one who sees these, so there is
    /// nothing to vote on.
    async fn vote(&mut self, id: &str) -> GoMeetResult<()> {
        Err(GoMeetError::AlreadyVoted(id.to_string()))
    }
}

/// Candidates stored on the backend.
pub struct RemoteCandidateStore<'a, T> {
    client: &'a Client<T>,
}

impl<'a, T: Transport + Sync> RemoteCandidateStore<'a, T> {
    pub fn new(client: &'a Client<T>) -> Self {
        RemoteCandidateStore { client }
    }

    /// Locations ranked by the backend.
    pub async fn fetch_popular(&self) -> GoMeetResult<Vec<CandidateLocation>> {
        let locations = self.client.call(FetchPopularLocations).await?;
        Ok(locations.into_iter().map(CandidateLocation::from).collect())
    }
}

impl<T: Transport + Sync> CandidateStore for RemoteCandidateStore<'_, T> {
    async fn fetch(&self) -> GoMeetResult<Vec<CandidateLocation>> {
        let locations = self.client.call(FetchLocations).await?;
        Ok(locations.into_iter().map(CandidateLocation::from).collect())
    }

    async fn create(&mut self, candidate: NewCandidate) -> GoMeetResult<String> {
        require_title(&candidate)?;

        let key = self
            .client
            .call(NewLocation {
                title: candidate.title.trim().to_string(),
                lat: candidate.lat,
                lng: candidate.lng,
                note: candidate.note,
            })
            .await?;
        debug!(%key, "stored location");
        Ok(key)
    }

    async fn vote(&mut self, id: &str) -> GoMeetResult<()> {
        match self.client.call(VoteLocation { key: id.to_string() }).await {
            Ok(_) => Ok(()),
            Err(GoMeetError::Remote { status: 400, .. }) => {
                Err(GoMeetError::NotFound(id.to_string()))
            }
            Err(e) => Err(e),
        }
    }
}

pub enum LocationStore<'a, T> {
    Local(LocalCandidateStore<'a>),
    Remote(RemoteCandidateStore<'a, T>),
}

/// Pick the store for `mode`.
pub fn select_store<'a, T: Transport + Sync>(
    mode: StorageMode,
    draft: &'a mut DraftStore,
    client: &'a Client<T>,
) -> LocationStore<'a, T> {
    match mode {
        StorageMode::Local => LocationStore::Local(LocalCandidateStore::new(draft)),
        StorageMode::Permanent => LocationStore::Remote(RemoteCandidateStore::new(client)),
    }
}

impl<T: Transport + Sync> CandidateStore for LocationStore<'_, T> {
    async fn fetch(&self) -> GoMeetResult<Vec<CandidateLocation>> {
        match self {
            LocationStore::Local(store) => store.fetch().await,
            LocationStore::Remote(store) => store.fetch().await,
        }
    }

    async fn create(&mut self, candidate: NewCandidate) -> GoMeetResult<String> {
        match self {
            LocationStore::Local(store) => store.create(candidate).await,
            LocationStore::Remote(store) => store.create(candidate).await,
        }
    }

    async fn vote(&mut self, id: &str) -> GoMeetResult<()> {
        match self {
            LocationStore::Local(store) => store.vote(id).await,
            LocationStore::Remote(store) => store.vote(id).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;

    fn candidate(title: &str) -> NewCandidate {
        NewCandidate {
            title: title.into(),
            lat: 51.5,
            lng: -0.12,
            note: String::new(),
        }
    }

    #[test]
    fn mode_flag() {
        assert_eq!(StorageMode::from_flag("permanent"), StorageMode::Permanent);
        assert_eq!(StorageMode::from_flag("session"), StorageMode::Local);
        assert_eq!(StorageMode::from_flag(""), StorageMode::Local);
    }

    #[tokio::test]
    async fn local_rejects_sixth_candidate() {
        let mut draft = DraftStore::in_memory();
        let mut store = LocalCandidateStore::new(&mut draft);
        for i in 0..MAX_LOCATIONS {
            store.create(candidate(&format!("Place {i}"))).await.unwrap();
        }

        let err = store.create(candidate("One more")).await.unwrap_err();
        assert!(matches!(err, GoMeetError::MaxCandidatesReached(5)));
        assert_eq!(store.fetch().await.unwrap().len(), MAX_LOCATIONS);
    }

    #[tokio::test]
    async fn local_rejects_duplicate_title() {
        let mut draft = DraftStore::in_memory();
        let mut store = LocalCandidateStore::new(&mut draft);
        store.create(candidate("Cafe")).await.unwrap();

        let err = store.create(candidate("Cafe")).await.unwrap_err();
        assert!(matches!(err, GoMeetError::DuplicateTitle(t) if t == "Cafe"));

        let listed = store.fetch().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(!listed[0].is_persisted());
    }

    #[tokio::test]
    async fn blank_title_rejected_in_both_modes() {
        let mut draft = DraftStore::in_memory();
        let client = Client::new(ScriptedTransport::new(), "http://test");

        for mode in [StorageMode::Local, StorageMode::Permanent] {
            let mut store = select_store(mode, &mut draft, &client);
            assert!(matches!(
                store.create(candidate("  ")).await,
                Err(GoMeetError::BlankField(_))
            ));
        }
        assert!(client.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn local_vote_is_refused() {
        let mut draft = DraftStore::in_memory();
        let mut store = LocalCandidateStore::new(&mut draft);
        assert!(matches!(
            store.vote("anything").await,
            Err(GoMeetError::AlreadyVoted(_))
        ));
    }

    #[tokio::test]
    async fn remote_create_returns_key() {
        let transport = ScriptedTransport::new().respond("/location-data", 200, "\"k42\"");
        let client = Client::new(transport, "http://test");
        let mut store = RemoteCandidateStore::new(&client);

        let key = store.create(candidate("Cafe")).await.unwrap();
        assert_eq!(key, "k42");

        let sent = client.transport().requests_to("/location-data");
        assert_eq!(sent[0].form.len(), 4);
        assert_eq!(sent[0].param("title"), Some("Cafe"));
        assert_eq!(sent[0].param("lat"), Some("51.5"));
    }

    #[tokio::test]
    async fn remote_allows_duplicate_titles() {
        let transport = ScriptedTransport::new()
            .respond("/location-data", 200, "\"k1\"")
            .respond("/location-data", 200, "\"k2\"");
        let client = Client::new(transport, "http://test");
        let mut store = RemoteCandidateStore::new(&client);

        assert_eq!(store.create(candidate("Cafe")).await.unwrap(), "k1");
        assert_eq!(store.create(candidate("Cafe")).await.unwrap(), "k2");
    }

    #[tokio::test]
    async fn remote_vote_on_missing_id_is_not_found() {
        let transport = ScriptedTransport::new().respond_status(
            "/update-location-data",
            400,
            "Bad Request",
            "",
        );
        let client = Client::new(transport, "http://test");
        let mut store = RemoteCandidateStore::new(&client);

        assert!(matches!(
            store.vote("gone").await,
            Err(GoMeetError::NotFound(id)) if id == "gone"
        ));
    }

    #[tokio::test]
    async fn popular_failure_carries_status_text() {
        let transport = ScriptedTransport::new().respond_status(
            "/popular-location-data",
            500,
            "Internal Server Error",
            "",
        );
        let client = Client::new(transport, "http://test");
        let store = RemoteCandidateStore::new(&client);

        let err = store.fetch_popular().await.unwrap_err();
        assert_eq!(err.to_string(), "ERROR 500 Internal Server Error");
    }

    #[tokio::test]
    async fn remote_fetch_maps_keys() {
        let transport = ScriptedTransport::new().respond(
            "/location-data",
            200,
            r#"[{"title":"Cafe","lat":1.0,"lng":2.0,"note":"","voteCount":2,"keyString":"k1"}]"#,
        );
        let client = Client::new(transport, "http://test");
        let store = RemoteCandidateStore::new(&client);

        let locations = store.fetch().await.unwrap();
        assert_eq!(locations[0].id, "k1");
        assert_eq!(locations[0].vote_count, 2);
    }
}
