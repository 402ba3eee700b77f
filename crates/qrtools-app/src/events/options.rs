use anyhow::Context;

use crate::state::AppState;

/// Apply `assignments`, save if anything changed, and render the result.
///
/// All assignments are validated before anything is written.
pub async fn run_options(
    state: &AppState,
    assignments: &[String],
    json: bool,
) -> anyhow::Result<String> {
    let mut config = state.snapshot().await;

    if !assignments.is_empty() {
        for assignment in assignments {
            config
                .apply_assignment(assignment)
                .with_context(|| format!("Rejected option {assignment:?}"))?;
        }

        state.store(config.clone()).await.with_context(|| {
            format!("Failed to save options to {}", state.config_path().display())
        })?;
        tracing::info!(
            "Saved {} option(s) to {}",
            assignments.len(),
            state.config_path().display()
        );
    }

    if json {
        Ok(serde_json::to_string_pretty(&config)?)
    } else {
        Ok(config.to_ini())
    }
}
