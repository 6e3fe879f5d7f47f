/// Log panics as structured `event = "panic"` records, then hand over to the
/// hook that was installed before (the default one prints to stderr).
pub fn install_panic_hook(service: &'static str, run_id: String) {
    let previous = std::panic::take_hook();
    let pid = std::process::id();
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!(service, event = "panic", %run_id, pid, message = %info, "unhandled panic occurred");
        previous(info);
    }));
}
