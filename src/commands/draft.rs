use anyhow::{Context as _, Result};
use gomeet_core::draft::{details_step, duration_step};
use gomeet_core::meeting::TimeFindMethod;
use owo_colors::OwoColorize;

use super::Context;
use crate::render::Render;

pub fn show(ctx: &Context) -> Result<()> {
    let store = ctx.open_draft()?;

    if store.is_empty() {
        println!("{}", "No draft yet. Start with: gomeet draft details".dimmed());
        return Ok(());
    }

    for (field, value) in store.get_all() {
        println!("{} {}", format!("{field}:").dimmed(), value);
    }

    if !store.locations().is_empty() {
        println!();
        println!("Locations:");
        for location in store.locations() {
            println!("   {}", location.render());
        }
    }

    Ok(())
}

pub fn reset(ctx: &Context) -> Result<()> {
    let mut store = ctx.open_draft()?;
    store.clear();
    store.save()?;
    println!("{} Draft cleared", "✓".green());
    Ok(())
}

pub fn details(ctx: &Context, name: &str, host: &str, guests: &[String]) -> Result<()> {
    let form = details_step(name, host, guests)?;

    let mut store = ctx.open_draft()?;
    store.save_step(&form)?;
    store.save()?;

    println!("{} Saved {} with {} guest(s)", "✓".green(), name.bold(), guests.len());
    println!("{}", "Next: gomeet draft duration".dimmed());
    Ok(())
}

pub fn duration(
    ctx: &Context,
    hours: Option<String>,
    mins: Option<String>,
    duration: Option<String>,
    method: Option<String>,
) -> Result<()> {
    let (hours, mins) = match duration {
        Some(text) => split_duration(&text)?,
        None => (hours.unwrap_or_default(), mins.unwrap_or_default()),
    };
    let method = method
        .as_deref()
        .map(str::parse::<TimeFindMethod>)
        .transpose()?;

    let form = duration_step(&hours, &mins, method)?;

    let mut store = ctx.open_draft()?;
    store.save_step(&form)?;
    store.save()?;

    let duration = store.duration()?;
    println!("{} Duration set to {}", "✓".green(), duration);
    match store.time_find_method() {
        Some(TimeFindMethod::Auto) => println!(
            "{}",
            "Next: gomeet times find --from <start> --to <end>".dimmed()
        ),
        _ => println!("{}", "Next: gomeet times add <YYYY-MM-DDTHH:MM>".dimmed()),
    }
    Ok(())
}

/// "1h30m" into the hours and minutes inputs.
fn split_duration(text: &str) -> Result<(String, String)> {
    let parsed = humantime::parse_duration(text)
        .with_context(|| format!("Could not parse duration: \"{}\"", text))?;
    let total_mins = parsed.as_secs() / 60;
    Ok(((total_mins / 60).to_string(), (total_mins % 60).to_string()))
}
