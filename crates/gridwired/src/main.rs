use std::process::ExitCode;

fn main() -> ExitCode {
    match gridwired::run_sidecar() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(target: "gridwired::process", error = %error, "sidecar failed to start");
            eprintln!("gridwired: {error}");
            ExitCode::FAILURE
        }
    }
}
