use crate::api;
use crate::cli::actions::Action;
use anyhow::{Context, Result};
use url::Url;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            dsn,
            allowed_origins,
        } => {
            // Reject obviously malformed connection strings before dialing
            let dsn = Url::parse(&dsn).context("Invalid MongoDB connection string")?;

            api::new(port, dsn.to_string(), allowed_origins).await?;
        }
    }

    Ok(())
}
