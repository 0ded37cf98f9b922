//! Session draft store.
//!
//! The in-progress meeting lives in a flat key-value map, one key per form
//! input of the creation wizard, persisted to `draft.toml` in the session
//! directory so it survives between invocations. Candidate locations proposed
//! in local mode, and the per-voter record of location votes, are kept next to
//! it in the same file.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::datetime::LocalMinute;
use crate::error::{GoMeetError, GoMeetResult};
use crate::meeting::{
    CandidateLocation, Draft, MeetingDuration, TimeFindMethod, validate_emails,
};

const DRAFT_FILE: &str = "draft.toml";

pub const MEETING_NAME: &str = "meeting-name";
pub const MEETING_HOST: &str = "meeting-host";
pub const DURATION_HOURS: &str = "duration-hours";
pub const DURATION_MINS: &str = "duration-mins";
pub const TIME_FIND_METHOD: &str = "time-find-method";
pub const GUEST_PREFIX: &str = "guest-";
pub const MEETING_TIME_PREFIX: &str = "meeting-time-";

#[derive(Debug, Default, Serialize, Deserialize)]
struct DraftData {
    #[serde(default)]
    entries: BTreeMap<String, String>,
    #[serde(default)]
    locations: Vec<CandidateLocation>,
    /// Location ids each voter has voted for.
    #[serde(default)]
    location_votes: BTreeMap<String, BTreeSet<String>>,
}

/// A group of mutually exclusive options. Exactly one must be checked.
#[derive(Debug, Clone)]
pub struct RadioGroup {
    pub name: String,
    pub options: Vec<(String, bool)>,
}

impl RadioGroup {
    fn selected(&self) -> GoMeetResult<&str> {
        let mut checked = self.options.iter().filter(|(_, on)| *on);
        match (checked.next(), checked.next()) {
            (Some((value, _)), None) => Ok(value.as_str()),
            (None, _) => Err(GoMeetError::BlankField(self.name.clone())),
            (Some(_), Some(_)) => Err(GoMeetError::InvalidValue(format!(
                "More than one option selected for '{}'",
                self.name
            ))),
        }
    }
}

/// The inputs of one wizard step, saved together.
#[derive(Debug, Clone, Default)]
pub struct StepForm {
    fields: Vec<(String, String)>,
    radios: Vec<RadioGroup>,
    replaces: Vec<String>,
}

impl StepForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn radio(mut self, name: impl Into<String>, options: &[(&str, bool)]) -> Self {
        self.radios.push(RadioGroup {
            name: name.into(),
            options: options
                .iter()
                .map(|(value, on)| (value.to_string(), *on))
                .collect(),
        });
        self
    }

    /// Drop every stored key with this prefix when the step is committed,
    /// so a shorter list of repeated inputs doesn't leave stale entries.
    pub fn replacing(mut self, prefix: impl Into<String>) -> Self {
        self.replaces.push(prefix.into());
        self
    }
}

/// Step 1 of the wizard: name, host and guests.
pub fn details_step(name: &str, host: &str, guests: &[String]) -> GoMeetResult<StepForm> {
    let host = host.trim();
    let mut form = StepForm::new()
        .replacing(GUEST_PREFIX)
        .field(MEETING_NAME, name.trim())
        .field(MEETING_HOST, host);

    // The host and repeated addresses are only invited once.
    let mut seen = BTreeSet::from([host.to_ascii_lowercase()]);
    let guests: Vec<&str> = guests
        .iter()
        .map(|g| g.trim())
        .filter(|g| g.is_empty() || seen.insert(g.to_ascii_lowercase()))
        .collect();
    for (i, guest) in guests.iter().enumerate() {
        form = form.field(format!("{GUEST_PREFIX}{}", i + 1), *guest);
    }

    // Blank inputs are reported by the save itself; only shape-check the rest.
    let addresses = std::iter::once(host)
        .chain(guests.iter().copied())
        .filter(|a| !a.is_empty());
    validate_emails(addresses)?;

    Ok(form)
}

/// Step 2 of the wizard: duration and how times will be found.
pub fn duration_step(
    hours: &str,
    mins: &str,
    method: Option<TimeFindMethod>,
) -> GoMeetResult<StepForm> {
    MeetingDuration::parse(hours, mins)?;

    Ok(StepForm::new()
        .field(DURATION_HOURS, hours.trim())
        .field(DURATION_MINS, mins.trim())
        .radio(
            TIME_FIND_METHOD,
            &[
                (
                    TimeFindMethod::Manual.wire_name(),
                    method == Some(TimeFindMethod::Manual),
                ),
                (
                    TimeFindMethod::Auto.wire_name(),
                    method == Some(TimeFindMethod::Auto),
                ),
            ],
        ))
}

pub struct DraftStore {
    path: Option<PathBuf>,
    data: DraftData,
}

impl DraftStore {
    /// A store that is never written to disk.
    pub fn in_memory() -> Self {
        DraftStore {
            path: None,
            data: DraftData::default(),
        }
    }

    /// Open the draft kept in `session_dir`, starting empty if there is none.
    pub fn open(session_dir: &Path) -> GoMeetResult<Self> {
        let path = session_dir.join(DRAFT_FILE);

        let data = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            toml::from_str(&content).map_err(|e| GoMeetError::Config(e.to_string()))?
        } else {
            DraftData::default()
        };

        Ok(DraftStore {
            path: Some(path),
            data,
        })
    }

    pub fn save(&self) -> GoMeetResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(&self.data)
            .map_err(|e| GoMeetError::Config(e.to_string()))?;

        let temp = path.with_extension("toml.tmp");
        std::fs::write(&temp, content)?;
        std::fs::rename(&temp, path)?;
        Ok(())
    }

    pub fn put(&mut self, field: &str, value: &str) -> GoMeetResult<()> {
        if value.is_empty() {
            return Err(GoMeetError::BlankField(field.to_string()));
        }
        self.data
            .entries
            .insert(field.to_string(), value.to_string());
        Ok(())
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.data.entries.get(field).map(String::as_str)
    }

    pub fn get_all(&self) -> &BTreeMap<String, String> {
        &self.data.entries
    }

    pub fn is_empty(&self) -> bool {
        self.data.entries.is_empty() && self.data.locations.is_empty()
    }

    /// Save a wizard step. Every field and radio group is checked first; on
    /// any failure nothing is written.
    pub fn save_step(&mut self, form: &StepForm) -> GoMeetResult<()> {
        if let Some((name, _)) = form.fields.iter().find(|(_, v)| v.is_empty()) {
            return Err(GoMeetError::BlankField(name.clone()));
        }
        let selections = form
            .radios
            .iter()
            .map(|group| Ok((group.name.as_str(), group.selected()?)))
            .collect::<GoMeetResult<Vec<_>>>()?;

        for prefix in &form.replaces {
            self.remove_prefixed(prefix);
        }
        for (name, value) in &form.fields {
            self.data.entries.insert(name.clone(), value.clone());
        }
        for (name, value) in selections {
            self.data
                .entries
                .insert(name.to_string(), value.to_string());
        }
        Ok(())
    }

    fn remove_prefixed(&mut self, prefix: &str) {
        self.data.entries.retain(|k, _| !k.starts_with(prefix));
    }

    /// Values of `prefix<N>` keys ordered by N.
    fn numbered(&self, prefix: &str) -> Vec<&str> {
        let mut numbered: Vec<(u32, &str)> = self
            .data
            .entries
            .iter()
            .filter_map(|(k, v)| {
                let n = k.strip_prefix(prefix)?.parse().ok()?;
                Some((n, v.as_str()))
            })
            .collect();
        numbered.sort_by_key(|(n, _)| *n);
        numbered.into_iter().map(|(_, v)| v).collect()
    }

    /// Host first, then guests in the order they were added.
    pub fn guest_list(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.get(MEETING_HOST)
            .into_iter()
            .chain(self.numbered(GUEST_PREFIX))
            .filter(|a| !a.is_empty() && seen.insert(a.to_ascii_lowercase()))
            .map(String::from)
            .collect()
    }

    /// Proposed times, in input order, with duplicates and unparseable
    /// entries skipped.
    pub fn meeting_times(&self) -> Vec<LocalMinute> {
        let mut seen = BTreeSet::new();
        self.numbered(MEETING_TIME_PREFIX)
            .into_iter()
            .filter_map(|s| LocalMinute::parse(s).ok())
            .filter(|t| seen.insert(*t))
            .collect()
    }

    /// Replace every proposed time with `times`, keyed `meeting-time-0..n`.
    pub fn set_meeting_times(&mut self, times: &[LocalMinute]) {
        self.remove_prefixed(MEETING_TIME_PREFIX);
        for (i, time) in times.iter().enumerate() {
            self.data
                .entries
                .insert(format!("{MEETING_TIME_PREFIX}{i}"), time.to_string());
        }
    }

    pub fn time_find_method(&self) -> Option<TimeFindMethod> {
        self.get(TIME_FIND_METHOD)?.parse().ok()
    }

    pub fn duration(&self) -> GoMeetResult<MeetingDuration> {
        MeetingDuration::parse(
            self.get(DURATION_HOURS).unwrap_or_default(),
            self.get(DURATION_MINS).unwrap_or_default(),
        )
    }

    /// The typed draft, once every wizard step has been saved.
    pub fn draft(&self) -> GoMeetResult<Draft> {
        let required = |field: &str| -> GoMeetResult<String> {
            self.get(field)
                .filter(|v| !v.is_empty())
                .map(String::from)
                .ok_or_else(|| GoMeetError::BlankField(field.to_string()))
        };

        Ok(Draft {
            name: required(MEETING_NAME)?,
            host: required(MEETING_HOST)?,
            duration: self.duration()?,
            time_find_method: required(TIME_FIND_METHOD)?.parse()?,
            // The host is required above, so it heads the list.
            guests: self.guest_list().into_iter().skip(1).collect(),
            proposed_times: self.meeting_times(),
        })
    }

    pub fn locations(&self) -> &[CandidateLocation] {
        &self.data.locations
    }

    pub(crate) fn push_location(&mut self, location: CandidateLocation) {
        self.data.locations.push(location);
    }

    pub fn has_voted_location(&self, voter: &str, id: &str) -> bool {
        self.data
            .location_votes
            .get(voter)
            .is_some_and(|ids| ids.contains(id))
    }

    pub fn record_location_vote(&mut self, voter: &str, id: &str) {
        self.data
            .location_votes
            .entry(voter.to_string())
            .or_default()
            .insert(id.to_string());
    }

    /// Forget the draft and its local locations. Location votes are kept,
    /// they refer to persisted locations.
    pub fn clear(&mut self) {
        self.data.entries.clear();
        self.data.locations.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ZERO_DURATION_ALERT;

    fn complete_store() -> DraftStore {
        let mut store = DraftStore::in_memory();
        let guests = vec!["b@x.com".to_string(), "c@x.com".to_string()];
        store
            .save_step(&details_step("Sync", "h@x.com", &guests).unwrap())
            .unwrap();
        store
            .save_step(&duration_step("1", "30", Some(TimeFindMethod::Manual)).unwrap())
            .unwrap();
        store
    }

    #[test]
    fn put_rejects_blank_value() {
        let mut store = DraftStore::in_memory();
        assert!(matches!(
            store.put(MEETING_NAME, ""),
            Err(GoMeetError::BlankField(f)) if f == MEETING_NAME
        ));
        assert!(store.get_all().is_empty());

        store.put(MEETING_NAME, "Sync").unwrap();
        assert_eq!(store.get(MEETING_NAME), Some("Sync"));
    }

    #[test]
    fn step_with_blank_field_writes_nothing() {
        let mut store = DraftStore::in_memory();
        let form = StepForm::new()
            .field(MEETING_NAME, "Sync")
            .field(MEETING_HOST, "");

        assert!(matches!(
            store.save_step(&form),
            Err(GoMeetError::BlankField(f)) if f == MEETING_HOST
        ));
        assert!(store.get_all().is_empty());
    }

    #[test]
    fn step_with_unselected_radio_writes_nothing() {
        let mut store = DraftStore::in_memory();
        let form = StepForm::new()
            .field(DURATION_HOURS, "1")
            .field(DURATION_MINS, "0")
            .radio(TIME_FIND_METHOD, &[("manual", false), ("gcal", false)]);

        assert!(matches!(
            store.save_step(&form),
            Err(GoMeetError::BlankField(f)) if f == TIME_FIND_METHOD
        ));
        assert!(store.get(DURATION_HOURS).is_none());
    }

    #[test]
    fn radio_stores_selected_value() {
        let mut store = DraftStore::in_memory();
        store
            .save_step(&duration_step("0", "45", Some(TimeFindMethod::Auto)).unwrap())
            .unwrap();
        assert_eq!(store.get(TIME_FIND_METHOD), Some("gcal"));
        assert_eq!(store.time_find_method(), Some(TimeFindMethod::Auto));
    }

    #[test]
    fn duration_step_validates_before_building() {
        let err = duration_step("0", "0", Some(TimeFindMethod::Manual)).unwrap_err();
        assert!(matches!(err, GoMeetError::InvalidValue(ref m) if m == ZERO_DURATION_ALERT));
        assert!(duration_step("24", "0", Some(TimeFindMethod::Manual)).is_err());
    }

    #[test]
    fn details_step_rejects_bad_email() {
        let guests = vec!["not-an-email".to_string()];
        assert!(matches!(
            details_step("Sync", "h@x.com", &guests),
            Err(GoMeetError::InvalidValue(_))
        ));
    }

    #[test]
    fn resaving_details_drops_removed_guests() {
        let mut store = complete_store();
        store
            .save_step(&details_step("Sync", "h@x.com", &["z@x.com".to_string()]).unwrap())
            .unwrap();
        assert_eq!(store.guest_list(), vec!["h@x.com", "z@x.com"]);
    }

    #[test]
    fn details_drop_host_and_repeated_guests() {
        let guests = vec![
            "h@x.com".to_string(),
            "a@x.com".to_string(),
            " A@x.com ".to_string(),
            "b@x.com".to_string(),
            "a@x.com".to_string(),
        ];
        let mut store = DraftStore::in_memory();
        store
            .save_step(&details_step("Sync", "h@x.com", &guests).unwrap())
            .unwrap();

        assert_eq!(store.guest_list(), vec!["h@x.com", "a@x.com", "b@x.com"]);
        assert_eq!(store.get("guest-2"), Some("b@x.com"));
        assert_eq!(store.get("guest-3"), None);

        store
            .save_step(&duration_step("1", "0", Some(TimeFindMethod::Manual)).unwrap())
            .unwrap();
        assert_eq!(store.draft().unwrap().guests, vec!["a@x.com", "b@x.com"]);
    }

    #[test]
    fn guest_list_skips_repeats_put_directly() {
        let mut store = DraftStore::in_memory();
        store.put(MEETING_HOST, "h@x.com").unwrap();
        store.put("guest-1", "h@x.com").unwrap();
        store.put("guest-2", "a@x.com").unwrap();
        store.put("guest-3", "a@x.com").unwrap();
        assert_eq!(store.guest_list(), vec!["h@x.com", "a@x.com"]);
    }

    #[test]
    fn guest_list_is_host_first_then_numeric_order() {
        let mut store = DraftStore::in_memory();
        store.put(MEETING_HOST, "h@x.com").unwrap();
        store.put("guest-10", "j@x.com").unwrap();
        store.put("guest-2", "b@x.com").unwrap();
        store.put("guest-1", "a@x.com").unwrap();
        assert_eq!(
            store.guest_list(),
            vec!["h@x.com", "a@x.com", "b@x.com", "j@x.com"]
        );
    }

    #[test]
    fn typed_draft_from_complete_steps() {
        let mut store = complete_store();
        let time = LocalMinute::parse("2999-01-01T10:00").unwrap();
        store.set_meeting_times(&[time]);

        let draft = store.draft().unwrap();
        assert_eq!(draft.name, "Sync");
        assert_eq!(draft.duration, MeetingDuration { hours: 1, mins: 30 });
        assert_eq!(draft.time_find_method, TimeFindMethod::Manual);
        assert_eq!(draft.guests, vec!["b@x.com", "c@x.com"]);
        assert_eq!(draft.proposed_times, vec![time]);
    }

    #[test]
    fn incomplete_draft_reports_first_missing_field() {
        let mut store = DraftStore::in_memory();
        store.put(MEETING_NAME, "Sync").unwrap();
        assert!(matches!(
            store.draft(),
            Err(GoMeetError::BlankField(f)) if f == MEETING_HOST
        ));
    }

    #[test]
    fn set_meeting_times_replaces_previous() {
        let mut store = DraftStore::in_memory();
        let a = LocalMinute::parse("2999-01-01T10:00").unwrap();
        let b = LocalMinute::parse("2999-01-02T10:00").unwrap();
        store.set_meeting_times(&[a, b]);
        store.set_meeting_times(&[b]);
        assert_eq!(store.meeting_times(), vec![b]);
        assert_eq!(store.get("meeting-time-0"), Some("2999-01-02T10:00"));
    }

    #[test]
    fn persists_across_open() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = DraftStore::open(dir.path()).unwrap();
            store.put(MEETING_NAME, "Sync").unwrap();
            store.push_location(CandidateLocation {
                id: String::new(),
                title: "Cafe".into(),
                lat: 1.5,
                lng: -0.25,
                note: "window seat".into(),
                vote_count: 0,
            });
            store.record_location_vote("a@x.com", "k1");
            store.save().unwrap();
        }

        let store = DraftStore::open(dir.path()).unwrap();
        assert_eq!(store.get(MEETING_NAME), Some("Sync"));
        assert_eq!(store.locations().len(), 1);
        assert_eq!(store.locations()[0].title, "Cafe");
        assert!(store.has_voted_location("a@x.com", "k1"));
        assert!(!store.has_voted_location("b@x.com", "k1"));
    }

    #[test]
    fn clear_keeps_location_votes() {
        let mut store = complete_store();
        store.record_location_vote("a@x.com", "k1");
        store.clear();
        assert!(store.is_empty());
        assert!(store.has_voted_location("a@x.com", "k1"));
    }
}
