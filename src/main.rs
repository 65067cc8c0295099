use std::process::ExitCode;

fn main() -> ExitCode {
    ivory::init();
    match ivory::uci::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("fatal: {err}");
            ExitCode::FAILURE
        }
    }
}
