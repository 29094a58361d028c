use std::process::ExitCode;

fn main() -> ExitCode {
    match datapub::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.is_precondition() => {
            println!("{}", err);
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
