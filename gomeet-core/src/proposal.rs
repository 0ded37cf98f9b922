//! Manually proposed meeting times.
//!
//! A [`ProposalSession`] owns the open time inputs and the set of times
//! already accepted, so two inputs can never hold the same time and nothing in
//! the past is accepted.

use std::collections::HashSet;

use crate::constants::MAX_PROPOSED_TIMES;
use crate::datetime::{LocalMinute, is_future};
use crate::draft::{DraftStore, MEETING_TIME_PREFIX};
use crate::error::{GoMeetError, GoMeetResult};

/// Accept `candidate` if it is strictly after `now` and not already in
/// `existing`. On acceptance it is added to `existing`.
pub fn propose_time(
    candidate: LocalMinute,
    existing: &mut HashSet<LocalMinute>,
    now: LocalMinute,
) -> bool {
    if !is_future(&candidate, &now) || existing.contains(&candidate) {
        return false;
    }
    existing.insert(candidate);
    true
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeInput {
    pub name: String,
    pub value: Option<LocalMinute>,
}

#[derive(Debug)]
pub struct ProposalSession {
    inputs: Vec<TimeInput>,
    seen: HashSet<LocalMinute>,
    next_index: usize,
}

impl Default for ProposalSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ProposalSession {
    /// A fresh session with a single empty input.
    pub fn new() -> Self {
        let mut session = ProposalSession {
            inputs: Vec::new(),
            seen: HashSet::new(),
            next_index: 0,
        };
        session.push_input();
        session
    }

    /// Resume from the times already in the draft. They were checked when
    /// first proposed and are taken as they are.
    pub fn from_store(store: &DraftStore) -> Self {
        let times = store.meeting_times();
        if times.is_empty() {
            return Self::new();
        }

        let mut session = ProposalSession {
            inputs: Vec::new(),
            seen: HashSet::new(),
            next_index: 0,
        };
        for time in times {
            let index = session.push_input();
            session.inputs[index].value = Some(time);
            session.seen.insert(time);
        }
        session
    }

    fn push_input(&mut self) -> usize {
        self.inputs.push(TimeInput {
            name: format!("{MEETING_TIME_PREFIX}{}", self.next_index),
            value: None,
        });
        self.next_index += 1;
        self.inputs.len() - 1
    }

    pub fn inputs(&self) -> &[TimeInput] {
        &self.inputs
    }

    pub fn count(&self) -> usize {
        self.inputs.len()
    }

    /// Open another input. Refused once the cap is reached.
    pub fn add_input(&mut self) -> GoMeetResult<&TimeInput> {
        if self.inputs.len() >= MAX_PROPOSED_TIMES {
            return Err(GoMeetError::MaxTimesReached(MAX_PROPOSED_TIMES));
        }
        let index = self.push_input();
        Ok(&self.inputs[index])
    }

    /// Put `candidate` into the named input.
    ///
    /// A past or already-proposed time is refused and the input is left
    /// empty.
    pub fn set(&mut self, name: &str, candidate: &str, now: LocalMinute) -> GoMeetResult<LocalMinute> {
        let index = self
            .inputs
            .iter()
            .position(|i| i.name == name)
            .ok_or_else(|| GoMeetError::NotFound(name.to_string()))?;

        if let Some(previous) = self.inputs[index].value.take() {
            self.seen.remove(&previous);
        }

        let time = LocalMinute::parse(candidate)?;
        if propose_time(time, &mut self.seen, now) {
            self.inputs[index].value = Some(time);
            Ok(time)
        } else {
            Err(GoMeetError::InvalidTime(candidate.to_string()))
        }
    }

    /// Propose into the first empty input, opening a new one if needed. A
    /// newly opened input is closed again if the time is refused.
    pub fn propose(&mut self, candidate: &str, now: LocalMinute) -> GoMeetResult<LocalMinute> {
        let (name, opened) = match self.inputs.iter().find(|i| i.value.is_none()) {
            Some(input) => (input.name.clone(), false),
            None => (self.add_input()?.name.clone(), true),
        };

        let result = self.set(&name, candidate, now);
        if result.is_err() && opened {
            self.inputs.retain(|i| i.name != name);
        }
        result
    }

    /// Delete an input. Its time may be proposed again afterwards.
    pub fn remove(&mut self, name: &str) -> GoMeetResult<()> {
        let index = self
            .inputs
            .iter()
            .position(|i| i.name == name)
            .ok_or_else(|| GoMeetError::NotFound(name.to_string()))?;

        let input = self.inputs.remove(index);
        if let Some(time) = input.value {
            self.seen.remove(&time);
        }
        Ok(())
    }

    /// Delete whichever input holds `time`.
    pub fn remove_time(&mut self, time: LocalMinute) -> GoMeetResult<()> {
        let name = self
            .inputs
            .iter()
            .find(|i| i.value == Some(time))
            .map(|i| i.name.clone())
            .ok_or_else(|| GoMeetError::NotFound(time.to_string()))?;
        self.remove(&name)
    }

    /// Accepted times in input order.
    pub fn times(&self) -> Vec<LocalMinute> {
        self.inputs.iter().filter_map(|i| i.value).collect()
    }

    pub fn write_to(&self, store: &mut DraftStore) {
        store.set_meeting_times(&self.times());
    }
}
