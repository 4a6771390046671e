use std::process::ExitCode;

use tracing::error;

use super::bootstrap::build_app;

pub(crate) fn run() -> ExitCode {
    let mut app = match build_app() {
        Ok(app) => app,
        Err(err) => {
            error!(error = %err, "startup_failed");
            return ExitCode::FAILURE;
        }
    };
    app.simulation.run(app.tick_count);

    ExitCode::SUCCESS
}
