use crate::config::WalkConfig;
use crate::walker::pause;
use std::time::Duration;
use tracing::info;

/// Give the operator `focus_delay` to bring the application to the front.
///
/// Keystrokes go to the focused window, so this is the only guard against
/// typing into the wrong one. Logs a countdown once per whole second.
pub async fn wait_for_focus(config: &WalkConfig) {
    if config.focus_delay.is_zero() {
        return;
    }

    info!(
        "Please focus {} within {:.1}s...",
        config.app_name,
        config.focus_delay.as_secs_f64()
    );

    let mut remaining = config.focus_delay;
    while !remaining.is_zero() {
        let step = remaining.min(Duration::from_secs(1));
        pause(step).await;
        remaining -= step;
        if remaining.as_secs() > 0 && remaining.subsec_nanos() == 0 {
            info!("{}...", remaining.as_secs());
        }
    }
}
