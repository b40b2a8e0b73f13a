use std::process::ExitCode;

fn main() -> ExitCode {
    match ivcig::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ivcig: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
