//! Vote accounting for candidate times and locations.
//!
//! A voter may back at most [`MAX_VOTES`] times per meeting and each item at
//! most once. Locations have no overall cap. After every vote the ballot is
//! rebuilt from fresh server state.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::client::{Client, Transport};
use crate::constants::MAX_VOTES;
use crate::draft::DraftStore;
use crate::error::{GoMeetError, GoMeetResult};
use crate::location::{CandidateStore, RemoteCandidateStore};
use crate::meeting::{
    CandidateLocation, CandidateTime, MeetingEvent, Votable, fetch_meeting, fetch_meeting_time,
};
use crate::protocol::VoteMeetingTime;

/// Sort by vote count, highest first. Ties keep their order.
pub fn sort_by_votes<C: Votable>(items: &mut [C]) {
    items.sort_by(|a, b| b.vote_count().cmp(&a.vote_count()));
}

/// Ids of the times `voter` has voted for.
pub fn voted_set<'a>(candidates: &'a [CandidateTime], voter: &str) -> HashSet<&'a str> {
    candidates
        .iter()
        .filter(|c| c.has_voter(voter))
        .map(|c| c.id.as_str())
        .collect()
}

pub fn remaining_votes(candidates: &[CandidateTime], voter: &str) -> usize {
    MAX_VOTES.saturating_sub(voted_set(candidates, voter).len())
}

#[derive(Debug, Clone, PartialEq)]
pub struct BallotRow<C> {
    pub candidate: C,
    pub voted: bool,
    /// Whether the vote control is usable.
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ballot<C> {
    pub voter: String,
    pub rows: Vec<BallotRow<C>>,
    /// Votes left, `None` when there is no cap.
    pub remaining: Option<usize>,
}

impl<C> Ballot<C> {
    pub fn row(&self, id: &str) -> Option<&BallotRow<C>>
    where
        C: HasId,
    {
        self.rows.iter().find(|r| r.candidate.id() == id)
    }
}

pub trait HasId {
    fn id(&self) -> &str;
}

impl HasId for CandidateTime {
    fn id(&self) -> &str {
        &self.id
    }
}

impl HasId for CandidateLocation {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Rank the times and work out which the voter can still vote for.
pub fn build_time_ballot(mut candidates: Vec<CandidateTime>, voter: &str) -> Ballot<CandidateTime> {
    let remaining = remaining_votes(&candidates, voter);
    sort_by_votes(&mut candidates);

    let rows = candidates
        .into_iter()
        .map(|candidate| {
            let voted = candidate.has_voter(voter);
            BallotRow {
                enabled: !voted && remaining > 0,
                voted,
                candidate,
            }
        })
        .collect();

    Ballot {
        voter: voter.to_string(),
        rows,
        remaining: Some(remaining),
    }
}

/// Rank the locations. A location the voter already backed stays disabled.
pub fn build_location_ballot(
    mut candidates: Vec<CandidateLocation>,
    voter: &str,
    draft: &DraftStore,
) -> Ballot<CandidateLocation> {
    sort_by_votes(&mut candidates);

    let rows = candidates
        .into_iter()
        .map(|candidate| {
            let voted = draft.has_voted_location(voter, &candidate.id);
            BallotRow {
                enabled: !voted,
                voted,
                candidate,
            }
        })
        .collect();

    Ballot {
        voter: voter.to_string(),
        rows,
        remaining: None,
    }
}

/// Fetch every time, skipping the ones that fail.
pub async fn fetch_candidate_times<T: Transport>(
    client: &Client<T>,
    ids: &[String],
) -> Vec<CandidateTime> {
    let mut times = Vec::with_capacity(ids.len());
    for id in ids {
        match fetch_meeting_time(client, id).await {
            Ok(time) => times.push(time),
            Err(e) => warn!(meeting_time_id = %id, error = %e, "skipping meeting time"),
        }
    }
    times
}

/// Load a meeting and the voter's ballot for its times.
pub async fn load_time_ballot<T: Transport>(
    client: &Client<T>,
    meeting_id: &str,
    voter: &str,
) -> GoMeetResult<(MeetingEvent, Ballot<CandidateTime>)> {
    let meeting = fetch_meeting(client, meeting_id).await?;
    let times = fetch_candidate_times(client, &meeting.meeting_time_ids).await;
    let ballot = build_time_ballot(times, voter);
    Ok((meeting, ballot))
}

/// Vote for one of a meeting's times and return the refreshed ballot.
///
/// Refused before anything is sent if the voter already backed this time or
/// has no votes left.
pub async fn vote_time<T: Transport>(
    client: &Client<T>,
    meeting_id: &str,
    time_id: &str,
    voter: &str,
) -> GoMeetResult<Ballot<CandidateTime>> {
    if time_id.trim().is_empty() {
        return Err(GoMeetError::MissingParam("meetingTimeId"));
    }
    if voter.trim().is_empty() {
        return Err(GoMeetError::MissingParam("voters"));
    }

    let (_, ballot) = load_time_ballot(client, meeting_id, voter).await?;
    let row = ballot
        .row(time_id)
        .ok_or_else(|| GoMeetError::NotFound(time_id.to_string()))?;

    if row.voted {
        return Err(GoMeetError::AlreadyVoted(time_id.to_string()));
    }
    if ballot.remaining == Some(0) {
        return Err(GoMeetError::MaxVotesReached(MAX_VOTES));
    }

    let request = VoteMeetingTime {
        meeting_time_id: time_id.to_string(),
        voter: voter.to_string(),
    };
    if let Err(e) = client.call(request).await {
        warn!(meeting_time_id = %time_id, error = %e, "vote failed");
        return Err(e);
    }
    info!(meeting_time_id = %time_id, %voter, "vote recorded");

    let (_, ballot) = load_time_ballot(client, meeting_id, voter).await?;
    Ok(ballot)
}

/// Load the voter's ballot for the stored locations.
pub async fn load_location_ballot<T: Transport + Sync>(
    client: &Client<T>,
    draft: &DraftStore,
    voter: &str,
) -> GoMeetResult<Ballot<CandidateLocation>> {
    let locations = RemoteCandidateStore::new(client).fetch().await?;
    Ok(build_location_ballot(locations, voter, draft))
}

/// Vote for a stored location.
///
/// On success the shown ballot is bumped in place, ahead of any re-fetch,
/// and the vote is recorded against the voter in the draft.
pub async fn vote_location<T: Transport + Sync>(
    client: &Client<T>,
    draft: &mut DraftStore,
    ballot: &mut Ballot<CandidateLocation>,
    id: &str,
) -> GoMeetResult<()> {
    let voter = ballot.voter.clone();
    if draft.has_voted_location(&voter, id) {
        return Err(GoMeetError::AlreadyVoted(id.to_string()));
    }

    RemoteCandidateStore::new(client).vote(id).await?;
    draft.record_location_vote(&voter, id);

    if let Some(row) = ballot.rows.iter_mut().find(|r| r.candidate.id == id) {
        row.candidate.vote_count += 1;
        row.voted = true;
        row.enabled = false;
    }
    Ok(())
}
