//! Refresh command implementation
//!
//! The "Refresh model" button.

use crate::cli::exit_codes;
use crate::controller::{RefreshOutcome, SettingsController};

const REFRESH_HINT: &str = "You can refresh the model with `ouoctl refresh`. \
This will spend tokens from your OpenAI account.";

/// Run the refresh command
pub async fn run(controller: &SettingsController) -> anyhow::Result<RefreshOutcome> {
    let state = controller.refresh_state();
    if !state.is_ready() {
        eprintln!("Refresh model is disabled: {}.", state.reason());
        eprintln!("Save your credentials first with `ouoctl credentials set`.");
        return Ok(RefreshOutcome::Disabled(state));
    }

    println!("{}", REFRESH_HINT);
    println!("Refreshing model...");

    Ok(controller.refresh_model().await)
}

/// Map a refresh outcome to the process exit code
pub fn exit_code(outcome: &RefreshOutcome) -> i32 {
    match outcome {
        RefreshOutcome::Success => exit_codes::SUCCESS,
        RefreshOutcome::Disabled(_) => exit_codes::REFRESH_DISABLED,
        RefreshOutcome::Rejected(_) => exit_codes::REFRESH_REJECTED,
        RefreshOutcome::Failed => exit_codes::REFRESH_FAILED,
    }
}
