//! Ad-hoc analysis without a database.

use moodlens_analysis::{analyze_plain, HfInferenceClient};
use moodlens_core::AppConfig;

/// Run plain-mode analysis of `text` and print the result as JSON.
///
/// # Errors
///
/// Returns an error if the inference client cannot be built.
pub(crate) async fn run_analyze(config: &AppConfig, text: &str) -> anyhow::Result<()> {
    let client = HfInferenceClient::from_app_config(config)?;
    let result = analyze_plain(&client, text).await;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
