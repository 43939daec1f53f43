use std::process::ExitCode;

fn main() -> ExitCode {
    holdem_odds::cli::run()
}
