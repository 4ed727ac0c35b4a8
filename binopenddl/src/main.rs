//! OpenDDL command-line tool for checking documents and printing their
//! structure tree.
//!
//! Usage: openddl [OPTIONS] [FILE]
//!
//! Options:
//!   --check          Report diagnostics only (exit 1 if any error was found)
//!   -q, --quiet      Do not print diagnostics
//!   -h, --help       Print help
//!   -V, --version    Print version

use libopenddl::{format_document, LogCallback, OpenDdlParser, Severity};
use std::fs;
use std::io::{self, Read, Write};
use std::process;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut check_only = false;
    let mut quiet = false;
    let mut input_path: Option<&str> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                return;
            }
            "-V" | "--version" => {
                println!("openddl {}", libopenddl::version());
                return;
            }
            "--check" => check_only = true,
            "-q" | "--quiet" => quiet = true,
            "-" => input_path = None,
            arg if arg.starts_with('-') => {
                eprintln!("Error: Unknown option: {}", arg);
                process::exit(1);
            }
            arg => {
                if input_path.is_some() {
                    eprintln!("Error: Multiple input paths not supported");
                    process::exit(1);
                }
                input_path = Some(arg);
            }
        }
        i += 1;
    }

    let bytes: Vec<u8> = match input_path {
        Some(path) => match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                eprintln!("Error reading {}: {}", path, e);
                process::exit(1);
            }
        },
        None => {
            let mut buffer = Vec::new();
            if let Err(e) = io::stdin().read_to_end(&mut buffer) {
                eprintln!("Error reading stdin: {}", e);
                process::exit(1);
            }
            buffer
        }
    };

    let filename = input_path.unwrap_or("<stdin>");
    let exit_code = process_input(bytes, filename, check_only, quiet);
    process::exit(exit_code);
}

/// A sink that counts error diagnostics and, unless `quiet`, prints every
/// diagnostic to stderr as `file:severity: message`.
fn stderr_sink(filename: &str, quiet: bool, errors: Arc<AtomicUsize>) -> LogCallback {
    let filename = filename.to_string();
    Arc::new(move |severity: Severity, msg: &str| {
        if severity == Severity::Error {
            errors.fetch_add(1, Ordering::Relaxed);
        }
        if !quiet {
            eprintln!("{}:{}: {}", filename, severity, msg);
        }
    })
}

/// Parse one document and print its outline. Returns the exit code.
fn process_input(bytes: Vec<u8>, filename: &str, check_only: bool, quiet: bool) -> i32 {
    let errors = Arc::new(AtomicUsize::new(0));

    let mut parser = OpenDdlParser::new();
    parser.set_log_callback(Some(stderr_sink(filename, quiet, Arc::clone(&errors))));
    parser.set_owned_buffer(bytes);
    if !parser.parse() {
        if !quiet {
            eprintln!("{}: empty input", filename);
        }
        return 1;
    }

    let errors = errors.load(Ordering::Relaxed);
    if check_only {
        return i32::from(errors > 0);
    }

    let Some(context) = parser.context() else {
        return 1;
    };
    let mut stdout = io::stdout().lock();
    if let Err(e) = stdout.write_all(format_document(context).as_bytes()) {
        eprintln!("Error writing output: {}", e);
        return 1;
    }
    0
}

fn print_help() {
    println!(
        "openddl - OpenDDL command-line tool

USAGE:
    openddl [OPTIONS] [FILE]

ARGS:
    [FILE]           Input file (reads from stdin if not provided or '-')

OPTIONS:
    --check          Parse and report diagnostics without printing the tree.
                     Exits with 1 if any error was reported, 0 otherwise.

    -q, --quiet      Do not print diagnostics

    -h, --help       Print help

    -V, --version    Print version

EXAMPLES:
    openddl scene.ogex                 Print the structure tree
    openddl --check scene.ogex         Check a document for errors
    cat scene.ogex | openddl -q        Print the tree, ignoring diagnostics"
    );
}
