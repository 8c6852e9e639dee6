use std::process::ExitCode;

fn main() -> ExitCode {
    event_report_lib::run()
}
