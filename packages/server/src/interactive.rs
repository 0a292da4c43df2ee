//! Interactive mode for the server.
//!
//! Prompts for the bind address, port, field, and caching before starting
//! the server.

use dialoguer::{Confirm, Input, Select};
use uhi_map_field::registry;

use crate::ServerConfig;

/// Runs the server in interactive mode, prompting for configuration.
///
/// Defaults come from the environment (see [`ServerConfig::from_env`]).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the underlying server fails to
/// start.
#[allow(clippy::future_not_send)]
pub async fn run() -> std::io::Result<()> {
    println!("Heat Map Server");
    println!();

    let defaults = ServerConfig::from_env();

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default(defaults.bind_addr.clone())
        .interact_text()
        .unwrap_or_else(|_| defaults.bind_addr.clone());

    let port: u16 = Input::new()
        .with_prompt("Port")
        .default(defaults.port)
        .interact_text()
        .unwrap_or(defaults.port);

    let field_id = defaults.field_path.as_ref().map_or_else(
        || select_field(&defaults.field_id),
        |path| {
            println!("Using field definition from {}", path.display());
            defaults.field_id.clone()
        },
    );

    let cache_field = Confirm::new()
        .with_prompt("Reuse one generated field across requests?")
        .default(defaults.cache_field)
        .interact()
        .unwrap_or(defaults.cache_field);

    if !Confirm::new()
        .with_prompt(format!("Start server on {bind_addr}:{port}?"))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::serve(ServerConfig {
        bind_addr,
        port,
        field_id,
        field_path: defaults.field_path,
        cache_field,
    })
    .await
}

fn select_field(default_id: &str) -> String {
    let fields = registry::all_fields();
    let labels: Vec<String> = fields
        .iter()
        .map(|f| format!("{} ({})", f.name, f.id))
        .collect();
    let default_idx = fields
        .iter()
        .position(|f| f.id == default_id)
        .unwrap_or(0);
    let idx = Select::new()
        .with_prompt("Heat field")
        .items(&labels)
        .default(default_idx)
        .interact()
        .unwrap_or(default_idx);

    fields
        .get(idx)
        .map_or_else(|| default_id.to_string(), |f| f.id.clone())
}
