use anyhow::Result;
use gomeet_core::protocol::FetchLoginStatus;
use owo_colors::OwoColorize;

use super::Context;

pub async fn run(ctx: &Context, meeting: Option<&str>) -> Result<()> {
    let client = ctx.client()?;
    let status = client
        .call(FetchLoginStatus {
            meeting_event_id: meeting.map(String::from),
        })
        .await?;

    if status.logged_in {
        println!(
            "Logged in as {}",
            status.user_email.unwrap_or_default().bold()
        );
        if let Some(url) = status.logout_url {
            println!("{}", format!("Log out: {url}").dimmed());
        }
    } else {
        println!("Not logged in");
        if let Some(url) = status.login_url {
            println!("Log in at {}", url.cyan());
        }
        println!(
            "{}",
            "Then put the session cookie in ~/.config/gomeet/config.toml (session_cookie)".dimmed()
        );
    }
    Ok(())
}
