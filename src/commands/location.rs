use anyhow::Result;
use gomeet_core::location::{
    CandidateStore, NewCandidate, RemoteCandidateStore, StorageMode, select_store,
};
use gomeet_core::meeting::current_voter;
use gomeet_core::voting::{load_location_ballot, sort_by_votes, vote_location};
use owo_colors::OwoColorize;

use super::Context;
use crate::render::{Render, render_chart};
use crate::utils::tui::with_spinner;

pub async fn add(
    ctx: &Context,
    mode: &str,
    title: String,
    lat: f64,
    lng: f64,
    note: String,
) -> Result<()> {
    let mode = StorageMode::from_flag(mode);
    let client = ctx.client()?;
    let mut draft = ctx.open_draft()?;

    let candidate = NewCandidate {
        title,
        lat,
        lng,
        note,
    };
    let label = candidate.title.clone();

    let id = {
        let mut store = select_store(mode, &mut draft, &client);
        store.create(candidate).await?
    };

    match mode {
        StorageMode::Local => {
            draft.save()?;
            println!("{} Added {} to the draft", "✓".green(), label.bold());
        }
        StorageMode::Permanent => {
            println!("{} Stored {} {}", "✓".green(), label.bold(), id.dimmed());
        }
    }
    Ok(())
}

pub async fn list(ctx: &Context, mode: &str) -> Result<()> {
    let client = ctx.client()?;
    let mut draft = ctx.open_draft()?;

    let store = select_store(StorageMode::from_flag(mode), &mut draft, &client);
    let locations = store.fetch().await?;

    if locations.is_empty() {
        println!("{}", "No locations yet".dimmed());
        return Ok(());
    }
    for location in locations {
        if location.is_persisted() {
            println!("   {} {}", location.render(), location.id.dimmed());
        } else {
            println!("   {}", location.render());
        }
    }
    Ok(())
}

pub async fn vote(ctx: &Context, mode: &str, id: &str) -> Result<()> {
    let client = ctx.client()?;
    let mut draft = ctx.open_draft()?;

    if StorageMode::from_flag(mode) == StorageMode::Local {
        // Local candidates can't be voted on; the store says why.
        let mut store = select_store(StorageMode::Local, &mut draft, &client);
        store.vote(id).await?;
        return Ok(());
    }

    let voter = current_voter(&client, None).await?;
    let mut ballot = with_spinner(
        "Loading locations",
        load_location_ballot(&client, &draft, &voter),
    )
    .await?;

    vote_location(&client, &mut draft, &mut ballot, id).await?;
    draft.save()?;

    if let Some(row) = ballot.rows.iter().find(|r| r.candidate.id == id) {
        println!(
            "{} Voted for {} ({} votes)",
            "✓".green(),
            row.candidate.title.bold(),
            row.candidate.vote_count
        );
    }

    let ballot = load_location_ballot(&client, &draft, &voter).await?;
    println!();
    println!("{}", ballot.render());
    Ok(())
}

pub async fn popular(ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let store = RemoteCandidateStore::new(&client);

    let locations = with_spinner("Fetching popular locations", store.fetch_popular()).await?;
    if locations.is_empty() {
        println!("{}", "No locations yet".dimmed());
        return Ok(());
    }
    for (rank, location) in locations.iter().enumerate() {
        println!("{:>3}. {}", rank + 1, location.render());
    }
    Ok(())
}

pub async fn chart(ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let store = RemoteCandidateStore::new(&client);

    let mut locations = with_spinner("Fetching votes", store.fetch()).await?;
    sort_by_votes(&mut locations);
    println!("{}", render_chart(&locations));
    Ok(())
}
