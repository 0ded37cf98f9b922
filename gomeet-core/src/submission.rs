//! Turning a finished draft into a persisted meeting and inviting guests.

use std::collections::HashMap;

use tracing::{info, warn};
use url::Url;

use crate::client::{Client, Transport};
use crate::draft::DraftStore;
use crate::error::{GoMeetError, GoMeetResult};
use crate::meeting::meeting_page_url;
use crate::protocol::{InviteGuests, NewLocation, NewMeetingEvent, NewMeetingTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InviteOutcome {
    AllSent,
    AllFailed,
    Mixed,
}

/// Guests split by whether their invitation went out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InviteReport {
    pub sent: Vec<String>,
    pub failed: Vec<String>,
}

impl InviteReport {
    /// Partition `guest_list` by send status. A guest missing from
    /// `statuses` counts as failed.
    pub fn partition(guest_list: &[String], statuses: &HashMap<String, bool>) -> Self {
        let (sent, failed) = guest_list
            .iter()
            .cloned()
            .partition(|guest| statuses.get(guest).copied().unwrap_or(false));
        InviteReport { sent, failed }
    }

    pub fn outcome(&self) -> InviteOutcome {
        match (self.sent.is_empty(), self.failed.is_empty()) {
            (_, true) => InviteOutcome::AllSent,
            (true, false) => InviteOutcome::AllFailed,
            (false, false) => InviteOutcome::Mixed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Submission {
    pub meeting_id: String,
    pub link: Url,
    pub invites: InviteReport,
}

/// Persist the draft as a meeting, invite every guest and clear the draft.
///
/// The proposed times and any locations held in the draft are stored first
/// so the meeting can reference them. If the backend hands back no meeting
/// id the submission stops there and no invitations go out. Failed
/// invitations are reported, never retried.
pub async fn submit_meeting<T: Transport>(
    client: &Client<T>,
    store: &mut DraftStore,
) -> GoMeetResult<Submission> {
    let draft = store.draft()?;
    if draft.proposed_times.is_empty() {
        return Err(GoMeetError::BlankField("meeting-time".into()));
    }

    let mut meeting_time_ids = Vec::with_capacity(draft.proposed_times.len());
    for time in &draft.proposed_times {
        let created = client
            .call(NewMeetingTime {
                datetime: time.to_string(),
            })
            .await?;
        meeting_time_ids.push(created.meeting_time_id);
    }

    let mut meeting_location_ids = Vec::with_capacity(store.locations().len());
    for location in store.locations() {
        if location.is_persisted() {
            meeting_location_ids.push(location.id.clone());
            continue;
        }
        let key = client
            .call(NewLocation {
                title: location.title.clone(),
                lat: location.lat,
                lng: location.lng,
                note: location.note.clone(),
            })
            .await?;
        meeting_location_ids.push(key);
    }

    let guest_list = draft.guest_list();
    let created = client
        .call(NewMeetingEvent {
            meeting_name: draft.name.clone(),
            duration_hours: draft.duration.hours,
            duration_mins: draft.duration.mins,
            time_find_method: draft.time_find_method.wire_name().to_string(),
            guest_list: guest_list.clone(),
            meeting_time_ids,
            meeting_location_ids,
        })
        .await?;

    let meeting_id = match created.meeting_event_id {
        Some(id) if !id.is_empty() => id,
        _ => return Err(GoMeetError::SubmissionFailed),
    };
    info!(%meeting_id, "meeting created");

    let statuses = match client
        .call(InviteGuests {
            meeting_event_id: meeting_id.clone(),
            guest_list: guest_list.clone(),
        })
        .await
    {
        Ok(statuses) => statuses,
        Err(e) => {
            warn!(%meeting_id, error = %e, "sending invitations failed");
            HashMap::new()
        }
    };

    let invites = InviteReport::partition(&guest_list, &statuses);
    for guest in &invites.failed {
        warn!(%guest, "invitation not sent");
    }

    let link = meeting_page_url(client.base_url(), &meeting_id)?;
    store.clear();

    Ok(Submission {
        meeting_id,
        link,
        invites,
    })
}
