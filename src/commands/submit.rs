use anyhow::Result;
use gomeet_core::submission::submit_meeting;
use owo_colors::OwoColorize;

use super::Context;
use crate::render::Render;
use crate::utils::tui::with_spinner;

pub async fn run(ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let mut store = ctx.open_draft()?;

    let submission =
        with_spinner("Creating meeting", submit_meeting(&client, &mut store)).await?;
    store.save()?;

    println!("{} Meeting created", "✓".green());
    println!("{}", submission.invites.render());
    println!();
    println!("Share this link with your guests:");
    println!("   {}", submission.link.to_string().cyan());
    Ok(())
}
