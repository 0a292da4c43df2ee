#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Heat map API server binary.
//!
//! Reads its settings from the environment and starts the server. Pass
//! `--interactive` to be prompted for them instead.

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    if std::env::args().skip(1).any(|a| a == "--interactive" || a == "-i") {
        uhi_map_server::interactive::run().await
    } else {
        uhi_map_server::run_server().await
    }
}
