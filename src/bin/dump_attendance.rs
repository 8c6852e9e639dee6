//! Print the normalized participants list of a CSV/Excel file as tab-separated rows.

use event_report_lib::attendance::import_attendance;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let Some(path) = std::env::args().nth(1).map(PathBuf::from) else {
        eprintln!("usage: dump_attendance <file.csv|file.xlsx>");
        return ExitCode::FAILURE;
    };
    match import_attendance(&path) {
        Ok(table) => {
            println!("sr_no\tname\tapplication_id");
            for row in &table.rows {
                println!("{}\t{}\t{}", row.sr_no, row.name, row.application_id);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
