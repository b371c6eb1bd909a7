use std::panic;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use sprout::App;

fn crashing_app(quiet: bool) -> App {
    App::builder("tool")
        .quiet_panics(quiet)
        .command("boom", |_| panic!("kaboom"))
        .unwrap()
        .build()
}

// Kept as a single test: the panic hook is process-wide
#[test]
fn test_quiet_panics_bypass_and_restore_the_hook() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    panic::set_hook(Box::new(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    let err = crashing_app(true).parse(["boom"]).unwrap_err();
    assert_eq!(err.to_string(), "panic: kaboom");
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    // the counting hook is back in place afterwards
    let err = crashing_app(false).parse(["boom"]).unwrap_err();
    assert_eq!(err.to_string(), "panic: kaboom");
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let _ = panic::take_hook();
}
