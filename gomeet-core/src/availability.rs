//! Server-computed candidate times.

use tracing::{debug, warn};

use crate::client::{Client, Transport};
use crate::datetime::{LocalMinute, is_future};
use crate::draft::DraftStore;
use crate::error::{GoMeetError, GoMeetResult};
use crate::meeting::MeetingDuration;
use crate::protocol::{FindTimes, FindTimesResponse};

/// Result of an availability lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum AutoProposal {
    Times(Vec<LocalMinute>),
    /// The service could not answer. The caller should offer manual
    /// proposal instead.
    Unavailable { status: u16, message: String },
}

/// Both ends non-blank, both in the future, end after start.
pub fn validate_period(
    start: &str,
    end: &str,
    now: LocalMinute,
) -> GoMeetResult<(LocalMinute, LocalMinute)> {
    let parse = |s: &str| LocalMinute::parse(s).map_err(|_| GoMeetError::InvalidPeriod);
    let (start, end) = (parse(start)?, parse(end)?);

    if !is_future(&start, &now) || !is_future(&end, &now) || end <= start {
        return Err(GoMeetError::InvalidPeriod);
    }
    Ok((start, end))
}

/// Ask the availability service for free slots within a period.
///
/// An invalid period is refused before anything is sent.
pub async fn find_times<T: Transport>(
    client: &Client<T>,
    guest_list: &[String],
    duration: MeetingDuration,
    start: &str,
    end: &str,
    now: LocalMinute,
) -> GoMeetResult<AutoProposal> {
    let (start, end) = validate_period(start, end, now)?;
    if guest_list.is_empty() {
        return Err(GoMeetError::MissingParam("guest-list"));
    }

    let request = FindTimes {
        guest_list: guest_list.to_vec(),
        duration_hours: duration.hours,
        duration_mins: duration.mins,
        period_start: start.to_string(),
        period_end: end.to_string(),
    };

    let times = match client.call(request).await {
        Ok(FindTimesResponse::Times(times)) => times,
        Ok(FindTimesResponse::Error(e)) => {
            return Ok(AutoProposal::Unavailable {
                status: e.status,
                message: e.message,
            });
        }
        Err(GoMeetError::Remote { status, message }) => {
            warn!(status, %message, "availability lookup failed");
            return Ok(AutoProposal::Unavailable { status, message });
        }
        Err(e) => return Err(e),
    };

    let times = times
        .iter()
        .map(|t| LocalMinute::from_rfc3339(t))
        .collect::<GoMeetResult<Vec<_>>>()?;
    debug!(count = times.len(), "availability lookup returned");

    Ok(AutoProposal::Times(times))
}

/// Look up times for the saved draft and, when any are found, make them the
/// draft's proposed times. An empty answer leaves the draft as it was.
pub async fn find_times_for_draft<T: Transport>(
    client: &Client<T>,
    store: &mut DraftStore,
    start: &str,
    end: &str,
    now: LocalMinute,
) -> GoMeetResult<AutoProposal> {
    let duration = store.duration()?;
    let guest_list = store.guest_list();

    let proposal = find_times(client, &guest_list, duration, start, end, now).await?;
    if let AutoProposal::Times(times) = &proposal {
        if !times.is_empty() {
            store.set_meeting_times(times);
        }
    }
    Ok(proposal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::{MEETING_HOST, details_step, duration_step};
    use crate::meeting::TimeFindMethod;
    use crate::testing::ScriptedTransport;

    const PATH: &str = "/gcal-find-times";

    fn now() -> LocalMinute {
        LocalMinute::parse("2025-06-01T12:00").unwrap()
    }

    fn one_hour() -> MeetingDuration {
        MeetingDuration::new(1, 0).unwrap()
    }

    fn guests() -> Vec<String> {
        vec!["h@x.com".into(), "g@x.com".into()]
    }

    #[test]
    fn period_must_be_future_and_ordered() {
        assert!(validate_period("2999-01-01T09:00", "2999-01-01T17:00", now()).is_ok());
        for (start, end) in [
            ("", "2999-01-01T17:00"),
            ("2999-01-01T09:00", ""),
            ("2020-01-01T09:00", "2999-01-01T17:00"),
            ("2999-01-01T17:00", "2999-01-01T09:00"),
            ("2999-01-01T09:00", "2999-01-01T09:00"),
        ] {
            assert!(
                matches!(validate_period(start, end, now()), Err(GoMeetError::InvalidPeriod)),
                "{start} .. {end}"
            );
        }
    }

    #[tokio::test]
    async fn invalid_period_sends_nothing() {
        let client = Client::new(ScriptedTransport::new(), "http://test");
        let result = find_times(
            &client,
            &guests(),
            one_hour(),
            "2999-01-01T17:00",
            "2999-01-01T09:00",
            now(),
        )
        .await;
        assert!(matches!(result, Err(GoMeetError::InvalidPeriod)));
        assert!(client.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn returns_truncated_times() {
        let transport = ScriptedTransport::new().respond(
            PATH,
            200,
            r#"["2999-01-01T09:00:00Z","2999-01-01T13:30:45+02:00"]"#,
        );
        let client = Client::new(transport, "http://test");

        let result = find_times(
            &client,
            &guests(),
            one_hour(),
            "2999-01-01T08:00",
            "2999-01-01T18:00",
            now(),
        )
        .await
        .unwrap();

        assert_eq!(
            result,
            AutoProposal::Times(vec![
                LocalMinute::parse("2999-01-01T09:00").unwrap(),
                LocalMinute::parse("2999-01-01T13:30").unwrap(),
            ])
        );

        let sent = client.transport().requests_to(PATH);
        assert_eq!(sent[0].param("guest-list"), Some("h@x.com,g@x.com"));
        assert_eq!(sent[0].param("duration-hours"), Some("1"));
        assert_eq!(sent[0].param("period-start"), Some("2999-01-01T08:00"));
    }

    #[tokio::test]
    async fn service_error_is_unavailable() {
        let transport = ScriptedTransport::new().respond(
            PATH,
            500,
            r#"{"status":"500","message":"Calendar API unreachable"}"#,
        );
        let client = Client::new(transport, "http://test");

        let result = find_times(
            &client,
            &guests(),
            one_hour(),
            "2999-01-01T08:00",
            "2999-01-01T18:00",
            now(),
        )
        .await
        .unwrap();

        assert_eq!(
            result,
            AutoProposal::Unavailable {
                status: 500,
                message: "Calendar API unreachable".into()
            }
        );
    }

    #[tokio::test]
    async fn saves_found_times_into_draft() {
        let transport =
            ScriptedTransport::new().respond(PATH, 200, r#"["2999-01-01T09:00:00Z"]"#);
        let client = Client::new(transport, "http://test");

        let mut store = DraftStore::in_memory();
        store
            .save_step(&details_step("Sync", "h@x.com", &[]).unwrap())
            .unwrap();
        store
            .save_step(&duration_step("0", "30", Some(TimeFindMethod::Auto)).unwrap())
            .unwrap();

        find_times_for_draft(&client, &mut store, "2999-01-01T08:00", "2999-01-01T18:00", now())
            .await
            .unwrap();

        assert_eq!(store.get("meeting-time-0"), Some("2999-01-01T09:00"));
        assert_eq!(store.get(MEETING_HOST), Some("h@x.com"));
        let sent = client.transport().requests_to(PATH);
        assert_eq!(sent[0].param("duration-mins"), Some("30"));
    }

    #[tokio::test]
    async fn empty_answer_keeps_proposed_times() {
        let transport = ScriptedTransport::new().respond(PATH, 200, "[]");
        let client = Client::new(transport, "http://test");

        let mut store = DraftStore::in_memory();
        store
            .save_step(&details_step("Sync", "h@x.com", &[]).unwrap())
            .unwrap();
        store
            .save_step(&duration_step("1", "0", Some(TimeFindMethod::Auto)).unwrap())
            .unwrap();
        store.put("meeting-time-0", "2999-01-01T10:00").unwrap();

        let result =
            find_times_for_draft(&client, &mut store, "2999-01-01T08:00", "2999-01-01T18:00", now())
                .await
                .unwrap();

        assert_eq!(result, AutoProposal::Times(vec![]));
        assert_eq!(store.get("meeting-time-0"), Some("2999-01-01T10:00"));
    }
}
