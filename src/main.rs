//! CLI tool to validate and format JJTemplate documents.

use std::fs;
use std::process::ExitCode;

const INDENT_WIDTH: usize = 2;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        eprintln!("Usage: jjtemplate <command> [files...]");
        eprintln!();
        eprintln!("Commands:");
        eprintln!("  validate  Check if document(s) tokenize cleanly");
        eprintln!("  fmt       Reformat document(s) and print to stdout");
        eprintln!("  check     Check if document(s) are formatted");
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  jjtemplate validate template.json");
        eprintln!("  jjtemplate fmt template.json");
        eprintln!("  jjtemplate check template.json");
        return ExitCode::from(2);
    }

    let command = args[1].as_str();
    let files = &args[2..];

    if files.is_empty() {
        eprintln!("Error: no files specified");
        return ExitCode::from(2);
    }

    let mut had_error = false;

    for path in files {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("{path}: {e}");
                had_error = true;
                continue;
            }
        };

        match command {
            "validate" => match jjtemplate_rs::tokenize(&content) {
                Ok(tokens) => {
                    let ranges = jjtemplate_rs::build_template_ranges(&tokens);
                    let definitions = jjtemplate_rs::local_definitions(&content);
                    eprintln!(
                        "{path}: valid ({} token(s), {} template block(s), \
                         {} definition(s))",
                        tokens.len(),
                        ranges.len(),
                        definitions.len()
                    );
                }
                Err(e) => {
                    eprintln!("{path}: {e}");
                    had_error = true;
                }
            },
            "fmt" => {
                print!("{}", jjtemplate_rs::reformat(&content, INDENT_WIDTH));
            }
            "check" => {
                let formatted = jjtemplate_rs::reformat(&content, INDENT_WIDTH);
                if formatted == content {
                    eprintln!("{path}: formatted");
                } else {
                    eprintln!("{path}: not formatted");
                    had_error = true;
                }
            }
            _ => {
                eprintln!("Unknown command: {command}");
                return ExitCode::from(2);
            }
        }
    }

    if had_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
