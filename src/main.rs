use std::process::ExitCode;

fn main() -> ExitCode {
    match credit_scorer::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("credit: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
