use anyhow::Result;
use gomeet_core::meeting::current_voter;
use gomeet_core::voting::{load_time_ballot, vote_time};
use owo_colors::OwoColorize;

use super::Context;
use crate::render::Render;
use crate::utils::tui::with_spinner;

pub async fn show(ctx: &Context, id: &str) -> Result<()> {
    let client = ctx.client()?;
    let voter = current_voter(&client, Some(id)).await?;

    let (meeting, ballot) =
        with_spinner("Loading meeting", load_time_ballot(&client, id, &voter)).await?;

    println!("{}", meeting.render());
    println!();
    println!("{}", ballot.render());
    Ok(())
}

pub async fn vote(ctx: &Context, meeting_id: &str, time_id: &str) -> Result<()> {
    let client = ctx.client()?;
    let voter = current_voter(&client, Some(meeting_id)).await?;

    let ballot = with_spinner(
        "Casting vote",
        vote_time(&client, meeting_id, time_id, &voter),
    )
    .await?;

    println!("{} Vote recorded", "✓".green());
    println!();
    println!("{}", ballot.render());
    Ok(())
}
