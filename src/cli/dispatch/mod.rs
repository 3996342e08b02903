use crate::{api::cors::parse_allowed_origins, cli::actions::Action};
use anyhow::Result;

/// Map parsed arguments to the action to execute.
///
/// # Errors
///
/// Returns an error when a required argument is missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let allowed_origins = matches
        .get_one::<String>("allowed-origins")
        .map(|raw| parse_allowed_origins(raw))
        .filter(|origins| !origins.is_empty());

    Ok(Action::Server {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        dsn: matches
            .get_one("dsn")
            .map(|s: &String| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --dsn"))?,
        allowed_origins,
    })
}
