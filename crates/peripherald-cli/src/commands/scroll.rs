use anyhow::Result;

use peripherald_core::{AppConfig, DaemonClient};

use crate::ScrollAction;

pub async fn run(config: &AppConfig, action: ScrollAction) -> Result<()> {
    let client = DaemonClient::new(config.socket_path());

    match action {
        ScrollAction::Get => {}
        ScrollAction::SetInterval { interval } => client.set_scroll_interval(interval).await?,
        ScrollAction::SetSteps { steps } => client.set_scroll_steps(steps).await?,
    }

    let scroll = client.smooth_scroll().await?;
    println!("Scroll smoothing:");
    println!("  Interval: {} ms", scroll.interval);
    println!("  Steps:    {}", scroll.steps);

    Ok(())
}
