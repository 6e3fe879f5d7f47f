use dotenvy::dotenv;
use tracing::{debug, error};
use uuid::Uuid;

fn init_logging(json: bool) {
    // load .env before the subscriber so RUST_LOG from it applies
    dotenv().ok();
    common::utils::logging::init_logging(json);
    debug!(service = "crm", event = "logger_init", "tracing subscriber initialized");
}

fn main() -> std::process::ExitCode {
    let cli = console::parse_args();
    init_logging(cli.json_logs);

    let run_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    common::utils::panic::install_panic_hook("crm", run_id.to_string());

    // one command per process; a current-thread runtime is enough
    let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "crm", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    debug!(service = "crm", event = "start", %run_id, pid, version, "running command");

    match rt.block_on(console::run(cli)) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            error!(service = "crm", event = "command_failed", %run_id, error = %e, "command failed");
            eprintln!("error: {e:#}");
            std::process::ExitCode::FAILURE
        }
    }
}
