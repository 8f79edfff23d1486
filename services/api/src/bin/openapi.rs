//! services/api/src/bin/openapi.rs
//!
//! Writes the REST API's OpenAPI document, or with `--check` verifies that a
//! committed copy still matches the routes.
//!
//! Usage: `openapi [--check] [PATH]` (PATH defaults to `openapi.json`).

use api_lib::web::rest::openapi_json;
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut check = false;
    let mut path = "openapi.json".to_string();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--check" => check = true,
            _ => path = arg,
        }
    }

    let document = match openapi_json() {
        Ok(document) => document,
        Err(e) => {
            eprintln!("Failed to render the OpenAPI document: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if check {
        return match std::fs::read_to_string(&path) {
            Ok(existing) if existing == document => {
                println!("{} is up to date", path);
                ExitCode::SUCCESS
            }
            Ok(_) => {
                eprintln!("{} is stale; rerun without --check to regenerate it", path);
                ExitCode::FAILURE
            }
            Err(e) => {
                eprintln!("Cannot read {}: {}", path, e);
                ExitCode::FAILURE
            }
        };
    }

    match std::fs::write(&path, document) {
        Ok(()) => {
            println!("OpenAPI document written to {}", path);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Cannot write {}: {}", path, e);
            ExitCode::FAILURE
        }
    }
}
