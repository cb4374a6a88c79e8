//! flux - Write a cash-flow report for a ledger.

fn main() -> std::process::ExitCode {
    flux::cmd::report_cmd::main()
}
