//! Login command handler.

use revogi_api::RevogiClient;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub async fn handle(client: &RevogiClient, global: &GlobalOpts) -> Result<(), CliError> {
    client.login().await?;

    let domain = client
        .session_domain()
        .await
        .unwrap_or_else(|| client.config().api_url.to_string());

    if !global.quiet {
        eprintln!(
            "Logged in as {} (relay: {domain})",
            client.config().username
        );
    }
    Ok(())
}
