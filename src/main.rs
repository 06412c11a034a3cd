use std::process::ExitCode;

fn main() -> ExitCode {
    match tabz::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("tabz: {err}");
            ExitCode::FAILURE
        }
    }
}
