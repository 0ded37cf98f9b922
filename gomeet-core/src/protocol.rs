//! The request/response contract with the meeting backend.
//!
//! Each backend resource is a typed request struct implementing [`Endpoint`].
//! The associated `Response` type is what a successful call decodes into, so
//! [`crate::client::Client::call`] is checked end to end.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};

use crate::error::GoMeetResult;

pub trait Endpoint {
    type Response: DeserializeOwned;

    const METHOD: Method;
    const PATH: &'static str;

    /// Parameters sent in the URL query string.
    fn query(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Parameters sent as a form-encoded body.
    fn form(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Decode a successful response body. An empty body decodes as `null`.
    fn decode(body: &str) -> GoMeetResult<Self::Response> {
        let body = if body.trim().is_empty() { "null" } else { body };
        Ok(serde_json::from_str(body)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// In-band error reported by the backend: `{status, message}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorResponse {
    #[serde(deserialize_with = "lenient_u16")]
    pub status: u16,
    #[serde(default)]
    pub message: String,
}

// ============================================================================
// Meeting events
// ============================================================================

/// A persisted meeting as the backend returns it.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingEventData {
    pub meeting_name: String,
    #[serde(deserialize_with = "lenient_u32")]
    pub duration_hours: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub duration_mins: u32,
    pub time_find_method: String,
    #[serde(default)]
    pub guest_list: serde_json::Value,
    #[serde(default)]
    pub meeting_time_ids: serde_json::Value,
    #[serde(default)]
    pub meeting_location_ids: serde_json::Value,
}

pub struct FetchMeetingEvent {
    pub meeting_event_id: String,
}

impl Endpoint for FetchMeetingEvent {
    type Response = MeetingEventData;
    const METHOD: Method = Method::Get;
    const PATH: &'static str = "/meeting-event";

    fn query(&self) -> Vec<(&'static str, String)> {
        vec![("meetingEventId", self.meeting_event_id.clone())]
    }
}

pub struct NewMeetingEvent {
    pub meeting_name: String,
    pub duration_hours: u32,
    pub duration_mins: u32,
    pub time_find_method: String,
    pub guest_list: Vec<String>,
    pub meeting_time_ids: Vec<String>,
    pub meeting_location_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMeetingEventResponse {
    #[serde(default)]
    pub meeting_event_id: Option<String>,
}

impl Endpoint for NewMeetingEvent {
    type Response = NewMeetingEventResponse;
    const METHOD: Method = Method::Post;
    const PATH: &'static str = "/meeting-event";

    fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("meetingName", self.meeting_name.clone()),
            ("durationMins", self.duration_mins.to_string()),
            ("durationHours", self.duration_hours.to_string()),
            ("timeFindMethod", self.time_find_method.clone()),
            ("guestList", self.guest_list.join(",")),
            ("meetingTimeIds", self.meeting_time_ids.join(",")),
            ("meetingLocationIds", self.meeting_location_ids.join(",")),
        ]
    }
}

// ============================================================================
// Meeting times and votes
// ============================================================================

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingTimeData {
    pub datetime: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub vote_count: u32,
    #[serde(default, deserialize_with = "nullable_list")]
    pub voters: Vec<String>,
}

pub struct FetchMeetingTime {
    pub meeting_time_id: String,
}

impl Endpoint for FetchMeetingTime {
    type Response = MeetingTimeData;
    const METHOD: Method = Method::Get;
    const PATH: &'static str = "/meeting-time";

    fn query(&self) -> Vec<(&'static str, String)> {
        vec![("meetingTimeId", self.meeting_time_id.clone())]
    }
}

pub struct NewMeetingTime {
    pub datetime: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMeetingTimeResponse {
    pub meeting_time_id: String,
}

impl Endpoint for NewMeetingTime {
    type Response = NewMeetingTimeResponse;
    const METHOD: Method = Method::Post;
    const PATH: &'static str = "/meeting-time";

    fn query(&self) -> Vec<(&'static str, String)> {
        vec![("datetime", self.datetime.clone())]
    }
}

pub struct VoteMeetingTime {
    pub meeting_time_id: String,
    pub voter: String,
}

impl Endpoint for VoteMeetingTime {
    type Response = serde_json::Value;
    const METHOD: Method = Method::Post;
    const PATH: &'static str = "/vote-meeting-time";

    fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("meetingTimeId", self.meeting_time_id.clone()),
            ("voters", self.voter.clone()),
        ]
    }
}

// ============================================================================
// Locations
// ============================================================================

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationData {
    pub title: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub note: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub vote_count: u32,
    #[serde(default, alias = "id")]
    pub key_string: String,
}

pub struct FetchLocations;

impl Endpoint for FetchLocations {
    type Response = Vec<LocationData>;
    const METHOD: Method = Method::Get;
    const PATH: &'static str = "/location-data";
}

pub struct FetchPopularLocations;

impl Endpoint for FetchPopularLocations {
    type Response = Vec<LocationData>;
    const METHOD: Method = Method::Get;
    const PATH: &'static str = "/popular-location-data";
}

pub struct NewLocation {
    pub title: String,
    pub lat: f64,
    pub lng: f64,
    pub note: String,
}

impl Endpoint for NewLocation {
    /// The key string of the stored entity.
    type Response = String;
    const METHOD: Method = Method::Post;
    const PATH: &'static str = "/location-data";

    fn form(&self) -> Vec<(&'static str, String)> {
        vec![
            ("title", self.title.clone()),
            ("lat", self.lat.to_string()),
            ("lng", self.lng.to_string()),
            ("note", self.note.clone()),
        ]
    }

    // The servlet writes the key either as a JSON string or as bare text.
    fn decode(body: &str) -> GoMeetResult<String> {
        let body = body.trim();
        match serde_json::from_str::<String>(body) {
            Ok(key) => Ok(key),
            Err(_) => Ok(body.to_string()),
        }
    }
}

pub struct VoteLocation {
    pub key: String,
}

impl Endpoint for VoteLocation {
    type Response = serde_json::Value;
    const METHOD: Method = Method::Post;
    const PATH: &'static str = "/update-location-data";

    fn form(&self) -> Vec<(&'static str, String)> {
        vec![("key", self.key.clone())]
    }
}

// ============================================================================
// Login, availability and invitations
// ============================================================================

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginStatus {
    #[serde(deserialize_with = "lenient_bool")]
    pub logged_in: bool,
    #[serde(default)]
    pub login_url: Option<String>,
    #[serde(default)]
    pub logout_url: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
}

pub struct FetchLoginStatus {
    pub meeting_event_id: Option<String>,
}

impl Endpoint for FetchLoginStatus {
    type Response = LoginStatus;
    const METHOD: Method = Method::Get;
    const PATH: &'static str = "/user-status";

    fn query(&self) -> Vec<(&'static str, String)> {
        match &self.meeting_event_id {
            Some(id) => vec![("meetingEventId", id.clone())],
            None => Vec::new(),
        }
    }
}

pub struct FindTimes {
    pub guest_list: Vec<String>,
    pub duration_hours: u32,
    pub duration_mins: u32,
    pub period_start: String,
    pub period_end: String,
}

/// The availability service answers with either a list of RFC3339
/// timestamps or an in-band `{status, message}` error.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum FindTimesResponse {
    Times(Vec<String>),
    Error(ErrorResponse),
}

impl Endpoint for FindTimes {
    type Response = FindTimesResponse;
    const METHOD: Method = Method::Get;
    const PATH: &'static str = "/gcal-find-times";

    fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("guest-list", self.guest_list.join(",")),
            ("duration-hours", self.duration_hours.to_string()),
            ("duration-mins", self.duration_mins.to_string()),
            ("period-start", self.period_start.clone()),
            ("period-end", self.period_end.clone()),
        ]
    }
}

pub struct InviteGuests {
    pub meeting_event_id: String,
    pub guest_list: Vec<String>,
}

impl Endpoint for InviteGuests {
    /// Sent status per guest address.
    type Response = HashMap<String, bool>;
    const METHOD: Method = Method::Post;
    const PATH: &'static str = "/email";

    fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("meetingEventId", self.meeting_event_id.clone()),
            ("guestList", self.guest_list.join(",")),
        ]
    }
}

// ============================================================================
// Lenient field decoding
// ============================================================================

// The backend serialises some numbers and booleans as strings.

#[derive(Deserialize)]
#[serde(untagged)]
enum NumOrString {
    Num(u64),
    Str(String),
}

fn lenient_u32<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    match NumOrString::deserialize(d)? {
        NumOrString::Num(n) => u32::try_from(n).map_err(serde::de::Error::custom),
        NumOrString::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn lenient_u16<'de, D: Deserializer<'de>>(d: D) -> Result<u16, D::Error> {
    let n = lenient_u32(d)?;
    u16::try_from(n).map_err(serde::de::Error::custom)
}

fn lenient_bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        Str(String),
    }

    match BoolOrString::deserialize(d)? {
        BoolOrString::Bool(b) => Ok(b),
        BoolOrString::Str(s) => Ok(s.eq_ignore_ascii_case("true")),
    }
}

fn nullable_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<String>>::deserialize(d)?.unwrap_or_default())
}
