//! Terminal rendering for gomeet-core types.
//!
//! Extension traits that add colored output to core types using owo_colors.

use gomeet_core::constants::MAX_VOTES;
use gomeet_core::datetime::LocalMinute;
use gomeet_core::meeting::{CandidateLocation, CandidateTime, MeetingEvent};
use gomeet_core::submission::{InviteOutcome, InviteReport};
use gomeet_core::voting::{Ballot, BallotRow};
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

/// Widest bar in the location chart.
const CHART_WIDTH: usize = 40;

fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

fn votes_label(count: u32) -> String {
    format!("{} {}", count, pluralize("vote", count as usize))
}

impl Render for LocalMinute {
    fn render(&self) -> String {
        self.display_long()
    }
}

impl Render for CandidateTime {
    fn render(&self) -> String {
        match LocalMinute::parse(&self.datetime) {
            Ok(time) => time.render(),
            Err(_) => self.datetime.clone(),
        }
    }
}

impl Render for CandidateLocation {
    fn render(&self) -> String {
        let mut line = format!(
            "📍 {} {}",
            self.title.bold(),
            format!("({:.5}, {:.5})", self.lat, self.lng).dimmed()
        );
        if !self.note.is_empty() {
            line.push_str(&format!(" {}", self.note.italic()));
        }
        line
    }
}

impl Render for MeetingEvent {
    fn render(&self) -> String {
        let mut lines = vec![format!("📅 {}", self.name.bold())];
        lines.push(format!(
            "   Duration: {}h {}m",
            self.duration_hours, self.duration_mins
        ));
        lines.push(format!("   Times found: {}", self.time_find_method));
        lines.push(format!("   Guests: {}", self.guest_list.join(", ")));
        lines.join("\n")
    }
}

/// A ballot row: vote state marker, the candidate, its votes and its id.
fn render_row<C: Render>(row: &BallotRow<C>, votes: u32, id: &str) -> String {
    let marker = if row.voted {
        "✓".green().to_string()
    } else if row.enabled {
        "○".to_string()
    } else {
        "·".dimmed().to_string()
    };
    let body = format!("{}  {}", row.candidate.render(), votes_label(votes));
    let body = if row.enabled || row.voted {
        body
    } else {
        body.dimmed().to_string()
    };

    format!("   {} {} {}", marker, body, id.dimmed())
}

impl Render for Ballot<CandidateTime> {
    fn render(&self) -> String {
        if self.rows.is_empty() {
            return "   No times to vote on".dimmed().to_string();
        }

        let mut lines: Vec<String> = self
            .rows
            .iter()
            .map(|row| render_row(row, row.candidate.vote_count, &row.candidate.id))
            .collect();

        let remaining = self.remaining.unwrap_or(MAX_VOTES);
        let summary = format!(
            "{} of {} votes left for {}",
            remaining, MAX_VOTES, self.voter
        );
        lines.push(String::new());
        lines.push(if remaining == 0 {
            summary.yellow().to_string()
        } else {
            summary.dimmed().to_string()
        });
        lines.join("\n")
    }
}

impl Render for Ballot<CandidateLocation> {
    fn render(&self) -> String {
        if self.rows.is_empty() {
            return "   No locations yet".dimmed().to_string();
        }

        self.rows
            .iter()
            .map(|row| render_row(row, row.candidate.vote_count, &row.candidate.id))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Render for InviteReport {
    fn render(&self) -> String {
        match self.outcome() {
            InviteOutcome::AllSent => format!(
                "{} Invitations sent to all guests",
                "✓".green()
            ),
            InviteOutcome::AllFailed => format!(
                "{} No invitations could be sent",
                "✗".red()
            ),
            InviteOutcome::Mixed => {
                let mut lines = vec!["Invitations sent to:".green().to_string()];
                lines.extend(self.sent.iter().map(|g| format!("   {g}")));
                lines.push("Invitations failed for:".red().to_string());
                lines.extend(self.failed.iter().map(|g| format!("   {g}")));
                lines.join("\n")
            }
        }
    }
}

/// Horizontal bar chart of location votes, scaled to the leader.
pub fn render_chart(locations: &[CandidateLocation]) -> String {
    if locations.is_empty() {
        return "   No locations yet".dimmed().to_string();
    }

    let label_width = locations
        .iter()
        .map(|l| l.title.chars().count())
        .max()
        .unwrap_or(0);
    let max_votes = locations.iter().map(|l| l.vote_count).max().unwrap_or(0);

    locations
        .iter()
        .map(|l| {
            let width = bar_width(l.vote_count, max_votes);
            format!(
                "   {:<label_width$} {} {}",
                l.title,
                "█".repeat(width).cyan(),
                l.vote_count
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn bar_width(votes: u32, max_votes: u32) -> usize {
    if max_votes == 0 {
        return 0;
    }
    let width = (votes as usize * CHART_WIDTH) / max_votes as usize;
    // Any vote at all shows up.
    if votes > 0 { width.max(1) } else { 0 }
}
