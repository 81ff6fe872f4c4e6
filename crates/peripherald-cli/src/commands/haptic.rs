use anyhow::Result;

use peripherald_core::{AppConfig, DaemonClient};

use crate::HapticAction;

pub async fn run(config: &AppConfig, action: HapticAction) -> Result<()> {
    let client = DaemonClient::new(config.socket_path());

    match action {
        HapticAction::Get => {}
        HapticAction::Enable => client.set_haptic_enabled(true).await?,
        HapticAction::Disable => client.set_haptic_enabled(false).await?,
        HapticAction::SetStrength { strength } => client.set_haptic_strength(strength).await?,
        HapticAction::BatterySaving { enabled } => {
            client.set_haptic_battery_saving(enabled).await?
        }
        HapticAction::Play { effect } => {
            if client.play_haptic_effect(effect).await? {
                println!("Played effect {}.", effect);
            } else {
                println!("Effect {} was not played (haptics disabled or unknown effect).", effect);
            }
            return Ok(());
        }
    }

    let haptic = client.haptic_state().await?;
    let on_off = |flag: bool| if flag { "on" } else { "off" };
    println!("Haptic feedback:");
    println!("  Enabled:        {}", on_off(haptic.enabled));
    println!("  Strength:       {}", haptic.strength);
    println!("  Battery saving: {}", on_off(haptic.battery_saving));

    Ok(())
}
