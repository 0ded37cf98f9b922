use anyhow::Result;
use gomeet_core::availability::{AutoProposal, find_times_for_draft};
use gomeet_core::datetime::LocalMinute;
use gomeet_core::proposal::ProposalSession;
use owo_colors::OwoColorize;

use super::Context;
use crate::render::Render;
use crate::utils::tui::with_spinner;

pub fn add(ctx: &Context, datetime: &str) -> Result<()> {
    let mut store = ctx.open_draft()?;
    let mut session = ProposalSession::from_store(&store);

    let time = session.propose(datetime, LocalMinute::now())?;
    session.write_to(&mut store);
    store.save()?;

    println!("{} Proposed {}", "✓".green(), time.render().bold());
    Ok(())
}

pub fn remove(ctx: &Context, datetime: &str) -> Result<()> {
    let mut store = ctx.open_draft()?;
    let mut session = ProposalSession::from_store(&store);

    let time = LocalMinute::parse(datetime)?;
    session.remove_time(time)?;
    session.write_to(&mut store);
    store.save()?;

    println!("{} Withdrew {}", "✓".green(), time.render());
    Ok(())
}

pub fn list(ctx: &Context) -> Result<()> {
    let store = ctx.open_draft()?;
    let times = store.meeting_times();

    if times.is_empty() {
        println!("{}", "No times proposed yet".dimmed());
        return Ok(());
    }

    for time in times {
        println!("   {} {}", time.render(), time.to_string().dimmed());
    }
    Ok(())
}

pub async fn find(ctx: &Context, from: &str, to: &str) -> Result<()> {
    let client = ctx.client()?;
    let mut store = ctx.open_draft()?;

    let proposal = with_spinner(
        "Looking for times everyone is free",
        find_times_for_draft(&client, &mut store, from, to, LocalMinute::now()),
    )
    .await?;

    match proposal {
        AutoProposal::Times(times) => {
            if times.is_empty() {
                println!(
                    "{}",
                    "No free times in that period; proposed times left unchanged".yellow()
                );
                return Ok(());
            }
            store.save()?;
            println!("Proposed times:");
            for time in &times {
                println!("   {}", time.render());
            }
            println!();
            println!("{}", "Next: gomeet submit".dimmed());
        }
        AutoProposal::Unavailable { status, message } => {
            eprintln!("{}", format!("ERROR {status} {message}").red());
            eprintln!(
                "{}",
                "Propose times yourself instead: gomeet times add <YYYY-MM-DDTHH:MM>".dimmed()
            );
        }
    }
    Ok(())
}
