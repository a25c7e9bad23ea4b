//! Curriculum validation CLI tool
//!
//! Validates an academy configuration file and reports any errors.

use academy_api::ContentRepository;
use academy_util::default_config_path;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = default_config_path();
            eprintln!("Usage: validate-curriculum [config-file]");
            eprintln!();
            eprintln!("Validates an academy curriculum/configuration file.");
            eprintln!();
            eprintln!("Example:");
            eprintln!("  validate-curriculum {}", default_path.display());
            return ExitCode::from(2);
        }
    };

    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    match academy_config::load_config(&config_path) {
        Ok(curriculum) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!("  Config version: {}", academy_config::CURRENT_CONFIG_VERSION);
            println!("  Sessions: {}", curriculum.session_count());
            println!("  Labs: {}", curriculum.labs.len());
            println!("  Access codes: {}", curriculum.learners.len());

            if !curriculum.sessions.is_empty() {
                println!();
                println!("Sessions:");
                for session in curriculum.sessions() {
                    println!(
                        "  - {} [week {}, {}]: {}",
                        session.id, session.week, session.difficulty, session.title
                    );
                    for lab_id in &session.labs {
                        match curriculum.lab(&session.id, lab_id) {
                            Some(lab) => println!("      {} ({} steps)", lab_id, lab.steps.len()),
                            None => println!("      {} (no lab definition)", lab_id),
                        }
                    }
                }
            }

            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match &e {
                academy_config::ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                academy_config::ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                academy_config::ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                academy_config::ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver,
                        academy_config::CURRENT_CONFIG_VERSION
                    );
                }
            }
            ExitCode::from(1)
        }
    }
}
