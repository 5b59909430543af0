//! MiniC compiler CLI.

use minicc::commands::{check_file, ir_file, parse_options};

fn main() {
    minicc::init_tracing();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = args[1].as_str();
    match command {
        "ir" | "check" => {
            let (options, path) = match parse_options(&args[2..]) {
                Ok(parsed) => parsed,
                Err(msg) => {
                    eprintln!("error: {msg}");
                    eprintln!(
                        "Usage: minicc {command} <file.c> [--strict] [--no-verify] [--error-limit=<n>]"
                    );
                    std::process::exit(1);
                }
            };
            if command == "ir" {
                ir_file(&path, &options);
            } else {
                check_file(&path, &options);
            }
        }
        "help" | "--help" | "-h" => print_usage(),
        "version" | "--version" | "-V" => println!("minicc {}", env!("CARGO_PKG_VERSION")),
        other => {
            eprintln!("error: unknown command `{other}`");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("MiniC compiler");
    println!();
    println!("Usage: minicc <command> [options]");
    println!();
    println!("Commands:");
    println!("  ir <file>       Print the generated IR");
    println!("  check <file>    Report diagnostics only");
    println!("  help            Show this message");
    println!("  version         Show version information");
    println!();
    println!("Options:");
    println!("  --strict            Treat nodes without a lowering as errors");
    println!("  --no-verify         Skip the IR verifier");
    println!("  --error-limit=<n>   Stop reporting after n errors (0 = unlimited)");
    println!();
    println!("Environment:");
    println!("  RUST_LOG=<filter>   Enable tracing output (e.g. minic_irgen=trace)");
    println!("  MINIC_LOG_TREE=1    Render tracing output as a tree");
}
