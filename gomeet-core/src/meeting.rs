//! Meeting data model: drafts, durations, candidates and persisted events.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::client::{Client, Transport};
use crate::constants::{MAX_DURATION_HOURS, MAX_DURATION_MINS};
use crate::datetime::LocalMinute;
use crate::error::{
    GoMeetError, GoMeetResult, INVALID_DURATION_ALERT, INVALID_EMAILS_ALERT, ZERO_DURATION_ALERT,
};
use crate::protocol::{
    FetchLoginStatus, FetchMeetingEvent, FetchMeetingTime, LocationData, MeetingEventData,
    MeetingTimeData,
};

/// How candidate times get proposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFindMethod {
    Manual,
    /// Server-side availability lookup. Travels as `gcal` on the wire.
    Auto,
}

impl TimeFindMethod {
    pub fn wire_name(&self) -> &'static str {
        match self {
            TimeFindMethod::Manual => "manual",
            TimeFindMethod::Auto => "gcal",
        }
    }
}

impl FromStr for TimeFindMethod {
    type Err = GoMeetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manual" => Ok(TimeFindMethod::Manual),
            "auto" | "gcal" => Ok(TimeFindMethod::Auto),
            "" => Err(GoMeetError::BlankField("time-find-method".into())),
            other => Err(GoMeetError::InvalidValue(format!(
                "Unknown time-finding method '{other}' (expected manual or auto)"
            ))),
        }
    }
}

impl fmt::Display for TimeFindMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeFindMethod::Manual => write!(f, "manual"),
            TimeFindMethod::Auto => write!(f, "auto"),
        }
    }
}

/// Meeting length: 0-23 hours and 0-59 minutes, at least one minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingDuration {
    pub hours: u32,
    pub mins: u32,
}

impl MeetingDuration {
    pub fn new(hours: u32, mins: u32) -> GoMeetResult<Self> {
        if hours == 0 && mins == 0 {
            return Err(GoMeetError::InvalidValue(ZERO_DURATION_ALERT.to_string()));
        }
        if hours > MAX_DURATION_HOURS || mins > MAX_DURATION_MINS {
            return Err(GoMeetError::InvalidValue(INVALID_DURATION_ALERT.to_string()));
        }
        Ok(MeetingDuration { hours, mins })
    }

    /// Validate the raw text of the two duration inputs.
    pub fn parse(hours: &str, mins: &str) -> GoMeetResult<Self> {
        let (hours, mins) = (hours.trim(), mins.trim());
        if hours.is_empty() {
            return Err(GoMeetError::BlankField("duration-hours".into()));
        }
        if mins.is_empty() {
            return Err(GoMeetError::BlankField("duration-mins".into()));
        }

        let parse = |s: &str| -> GoMeetResult<u32> {
            let n: i64 = s
                .parse()
                .map_err(|_| GoMeetError::InvalidValue(INVALID_DURATION_ALERT.to_string()))?;
            u32::try_from(n).map_err(|_| GoMeetError::InvalidValue(INVALID_DURATION_ALERT.to_string()))
        };

        Self::new(parse(hours)?, parse(mins)?)
    }

    pub fn total_minutes(&self) -> u32 {
        self.hours * 60 + self.mins
    }
}

impl fmt::Display for MeetingDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.hours, self.mins) {
            (0, m) => write!(f, "{m}m"),
            (h, 0) => write!(f, "{h}h"),
            (h, m) => write!(f, "{h}h{m}m"),
        }
    }
}

/// Loose e-mail shape check: `local@domain.tld`, no whitespace.
pub fn is_valid_email(address: &str) -> bool {
    let Some((local, domain)) = address.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !address.chars().any(char::is_whitespace)
}

pub fn validate_emails<'a, I>(addresses: I) -> GoMeetResult<()>
where
    I: IntoIterator<Item = &'a str>,
{
    if addresses.into_iter().all(is_valid_email) {
        Ok(())
    } else {
        Err(GoMeetError::InvalidValue(INVALID_EMAILS_ALERT.to_string()))
    }
}

/// Typed view over a complete draft.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub name: String,
    pub duration: MeetingDuration,
    pub time_find_method: TimeFindMethod,
    pub host: String,
    pub guests: Vec<String>,
    pub proposed_times: Vec<LocalMinute>,
}

impl Draft {
    /// Host first, then guests in the order they were added.
    pub fn guest_list(&self) -> Vec<String> {
        std::iter::once(self.host.clone())
            .chain(self.guests.iter().cloned())
            .collect()
    }
}

/// A persisted, votable time proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateTime {
    pub id: String,
    pub datetime: String,
    pub vote_count: u32,
    pub voters: Vec<String>,
}

impl CandidateTime {
    pub fn from_data(id: &str, data: MeetingTimeData) -> Self {
        CandidateTime {
            id: id.to_string(),
            datetime: data.datetime,
            vote_count: data.vote_count,
            voters: data.voters,
        }
    }

    pub fn has_voter(&self, voter: &str) -> bool {
        self.voters.iter().any(|v| v == voter)
    }
}

/// A candidate meeting place. `id` stays empty until the backend stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateLocation {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub vote_count: u32,
}

impl CandidateLocation {
    pub fn is_persisted(&self) -> bool {
        !self.id.is_empty()
    }
}

impl From<LocationData> for CandidateLocation {
    fn from(data: LocationData) -> Self {
        CandidateLocation {
            id: data.key_string,
            title: data.title,
            lat: data.lat,
            lng: data.lng,
            note: data.note,
            vote_count: data.vote_count,
        }
    }
}

/// Anything that can be ranked by votes.
pub trait Votable {
    fn vote_count(&self) -> u32;
}

impl Votable for CandidateTime {
    fn vote_count(&self) -> u32 {
        self.vote_count
    }
}

impl Votable for CandidateLocation {
    fn vote_count(&self) -> u32 {
        self.vote_count
    }
}

/// The finalized meeting as stored on the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct MeetingEvent {
    pub id: String,
    pub name: String,
    pub duration_hours: u32,
    pub duration_mins: u32,
    pub time_find_method: String,
    pub guest_list: Vec<String>,
    pub meeting_time_ids: Vec<String>,
    pub meeting_location_ids: Vec<String>,
}

impl MeetingEvent {
    pub fn from_data(id: &str, data: MeetingEventData) -> GoMeetResult<Self> {
        Ok(MeetingEvent {
            id: id.to_string(),
            name: data.meeting_name,
            duration_hours: data.duration_hours,
            duration_mins: data.duration_mins,
            time_find_method: data.time_find_method,
            guest_list: string_list(data.guest_list, "guestList")?,
            meeting_time_ids: string_list(data.meeting_time_ids, "meetingTimeIds")?,
            meeting_location_ids: string_list(data.meeting_location_ids, "meetingLocationIds")?,
        })
    }
}

/// Accepts a JSON array of strings, a comma-joined string, or null.
fn string_list(value: serde_json::Value, field: &'static str) -> GoMeetResult<Vec<String>> {
    use serde_json::Value;

    match value {
        Value::Null => Ok(Vec::new()),
        Value::String(s) => Ok(s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                _ => Err(GoMeetError::InvalidParamType(field)),
            })
            .collect(),
        _ => Err(GoMeetError::InvalidParamType(field)),
    }
}

pub async fn fetch_meeting<T: Transport>(client: &Client<T>, id: &str) -> GoMeetResult<MeetingEvent> {
    let id = id.trim();
    if id.is_empty() {
        return Err(GoMeetError::MissingParam("meetingEventId"));
    }
    let data = client
        .call(FetchMeetingEvent {
            meeting_event_id: id.to_string(),
        })
        .await?;
    MeetingEvent::from_data(id, data)
}

pub async fn fetch_meeting_time<T: Transport>(
    client: &Client<T>,
    id: &str,
) -> GoMeetResult<CandidateTime> {
    let id = id.trim();
    if id.is_empty() {
        return Err(GoMeetError::MissingParam("meetingTimeId"));
    }
    let data = client
        .call(FetchMeetingTime {
            meeting_time_id: id.to_string(),
        })
        .await?;
    Ok(CandidateTime::from_data(id, data))
}

/// The logged-in user's address. Fails with the login URL otherwise.
pub async fn current_voter<T: Transport>(
    client: &Client<T>,
    meeting_id: Option<&str>,
) -> GoMeetResult<String> {
    let status = client
        .call(FetchLoginStatus {
            meeting_event_id: meeting_id.map(String::from),
        })
        .await?;

    match status.user_email {
        Some(email) if status.logged_in && !email.is_empty() => Ok(email),
        _ => Err(GoMeetError::NotLoggedIn(status.login_url.unwrap_or_default())),
    }
}

/// Link to the page showing a meeting, e.g.
/// `http://host/meeting-event.html?meetingEventId=abc`.
pub fn meeting_page_url(base_url: &str, id: &str) -> GoMeetResult<Url> {
    let base = format!("{}/", base_url.trim_end_matches('/'));
    let mut url = Url::parse(&base)
        .and_then(|u| u.join("meeting-event.html"))
        .map_err(|e| GoMeetError::Config(format!("Invalid backend URL '{base_url}': {e}")))?;
    url.query_pairs_mut().append_pair("meetingEventId", id);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;

    #[test]
    fn zero_duration_is_rejected() {
        let err = MeetingDuration::parse("0", "0").unwrap_err();
        assert!(matches!(err, GoMeetError::InvalidValue(ref m) if m == ZERO_DURATION_ALERT));
    }

    #[test]
    fn hours_out_of_range_is_rejected() {
        let err = MeetingDuration::parse("24", "0").unwrap_err();
        assert!(matches!(err, GoMeetError::InvalidValue(ref m) if m == INVALID_DURATION_ALERT));
        assert!(MeetingDuration::parse("1", "60").is_err());
        assert!(MeetingDuration::parse("-1", "30").is_err());
    }

    #[test]
    fn valid_duration_is_accepted() {
        let d = MeetingDuration::parse("5", "30").unwrap();
        assert_eq!(d, MeetingDuration { hours: 5, mins: 30 });
        assert_eq!(d.total_minutes(), 330);
        assert_eq!(d.to_string(), "5h30m");
    }

    #[test]
    fn blank_duration_is_blank_field() {
        assert!(matches!(
            MeetingDuration::parse("", "15"),
            Err(GoMeetError::BlankField(_))
        ));
        assert!(matches!(
            MeetingDuration::parse("1", " "),
            Err(GoMeetError::BlankField(_))
        ));
    }

    #[test]
    fn non_numeric_duration_is_invalid() {
        assert!(matches!(
            MeetingDuration::parse("one", "0"),
            Err(GoMeetError::InvalidValue(_))
        ));
    }

    #[test]
    fn method_accepts_wire_and_display_names() {
        assert_eq!("manual".parse::<TimeFindMethod>().unwrap(), TimeFindMethod::Manual);
        assert_eq!("auto".parse::<TimeFindMethod>().unwrap(), TimeFindMethod::Auto);
        assert_eq!("gcal".parse::<TimeFindMethod>().unwrap(), TimeFindMethod::Auto);
        assert_eq!(TimeFindMethod::Auto.wire_name(), "gcal");
        assert!("sometimes".parse::<TimeFindMethod>().is_err());
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("a@x.com"));
        assert!(!is_valid_email("a@"));
        assert!(!is_valid_email("@x.com"));
        assert!(!is_valid_email("a b@x.com"));
        assert!(!is_valid_email("a@@x.com"));
        assert!(!is_valid_email("a@localhost"));
        assert!(validate_emails(["a@x.com", "b@y.org"]).is_ok());
        assert!(validate_emails(["a@x.com", "nope"]).is_err());
    }

    #[test]
    fn guest_list_puts_host_first() {
        let draft = Draft {
            name: "Sync".into(),
            duration: MeetingDuration::new(1, 0).unwrap(),
            time_find_method: TimeFindMethod::Manual,
            host: "h@x.com".into(),
            guests: vec!["b@x.com".into(), "a@x.com".into()],
            proposed_times: vec![],
        };
        assert_eq!(draft.guest_list(), vec!["h@x.com", "b@x.com", "a@x.com"]);
    }

    #[test]
    fn meeting_event_accepts_comma_joined_lists() {
        let data: MeetingEventData = serde_json::from_str(
            r#"{"meetingName":"Sync","durationHours":"1","durationMins":"0",
                "timeFindMethod":"manual","guestList":"h@x.com,g@x.com",
                "meetingTimeIds":["t1","t2"],"meetingLocationIds":null}"#,
        )
        .unwrap();
        let event = MeetingEvent::from_data("m1", data).unwrap();
        assert_eq!(event.guest_list, vec!["h@x.com", "g@x.com"]);
        assert_eq!(event.meeting_time_ids, vec!["t1", "t2"]);
        assert!(event.meeting_location_ids.is_empty());
    }

    #[test]
    fn meeting_event_rejects_non_list_ids() {
        let data: MeetingEventData = serde_json::from_str(
            r#"{"meetingName":"Sync","durationHours":1,"durationMins":0,
                "timeFindMethod":"manual","meetingTimeIds":42}"#,
        )
        .unwrap();
        assert!(matches!(
            MeetingEvent::from_data("m1", data),
            Err(GoMeetError::InvalidParamType("meetingTimeIds"))
        ));
    }

    #[test]
    fn page_url_encodes_id() {
        let url = meeting_page_url("http://localhost:8080/", "a b&c").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/meeting-event.html?meetingEventId=a+b%26c"
        );
        let url = meeting_page_url("https://host/app", "m1").unwrap();
        assert_eq!(url.as_str(), "https://host/app/meeting-event.html?meetingEventId=m1");
    }

    #[tokio::test]
    async fn blank_meeting_id_is_missing_param() {
        let client = Client::new(ScriptedTransport::new(), "http://test");
        assert!(matches!(
            fetch_meeting(&client, " ").await,
            Err(GoMeetError::MissingParam("meetingEventId"))
        ));
        assert!(matches!(
            fetch_meeting_time(&client, "").await,
            Err(GoMeetError::MissingParam("meetingTimeId"))
        ));
        assert!(client.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn logged_out_user_gets_login_url() {
        let transport = ScriptedTransport::new().respond(
            "/user-status",
            200,
            r#"{"loggedIn":"false","loginUrl":"/_ah/login"}"#,
        );
        let client = Client::new(transport, "http://test");

        match current_voter(&client, Some("m1")).await {
            Err(GoMeetError::NotLoggedIn(url)) => assert_eq!(url, "/_ah/login"),
            other => panic!("unexpected: {other:?}"),
        }
        let sent = client.transport().requests_to("/user-status");
        assert_eq!(sent[0].param("meetingEventId"), Some("m1"));
    }

    #[tokio::test]
    async fn logged_in_user_is_voter() {
        let transport = ScriptedTransport::new().respond(
            "/user-status",
            200,
            r#"{"loggedIn":true,"logoutUrl":"/logout","userEmail":"a@x.com"}"#,
        );
        let client = Client::new(transport, "http://test");
        assert_eq!(current_voter(&client, None).await.unwrap(), "a@x.com");
    }
}
