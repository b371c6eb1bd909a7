use sprout::logging::{build_subscriber, LogConfig};
use sprout::{App, Buffer, Stream, VersionPlugin};

fn traced(debug: bool, args: &[&str]) -> String {
    let logs = Buffer::new();
    let sink = logs.clone();
    let subscriber = build_subscriber(&LogConfig::debug(), move || sink.clone());

    let app = App::builder("traced")
        .debug(debug)
        .out(Stream::new(Buffer::new()))
        .err(Stream::new(Buffer::new()))
        .command("run", |_| Ok(()))
        .unwrap()
        .build();

    tracing::subscriber::with_default(subscriber, || {
        app.parse(args.iter().copied()).unwrap();
    });
    logs.contents()
}

#[test]
fn test_debug_mode_traces_matched_dispatch() {
    let logs = traced(true, &["run", "now"]);
    assert!(logs.contains("starting dispatch"));
    assert!(logs.contains("dispatching command"));
    assert!(logs.contains("traced"));
    assert!(logs.contains("now"));
}

#[test]
fn test_debug_mode_traces_banner_branch() {
    let logs = traced(true, &[]);
    assert!(logs.contains("printing banner"));
}

#[test]
fn test_debug_mode_traces_not_found() {
    let logs = traced(true, &["missing"]);
    assert!(logs.contains("command not found"));
}

#[test]
fn test_no_events_without_debug() {
    assert!(traced(false, &["run"]).is_empty());
}

#[test]
fn test_debug_mode_traces_skipped_plugin() {
    let logs = Buffer::new();
    let sink = logs.clone();
    let subscriber = build_subscriber(&LogConfig::debug(), move || sink.clone());

    tracing::subscriber::with_default(subscriber, || {
        let app = App::builder("traced")
            .debug(true)
            .maybe_plugin(None::<VersionPlugin>)
            .unwrap()
            .maybe_plugin(Some(VersionPlugin))
            .unwrap()
            .build();
        assert_eq!(app.plugins(), ["version"]);
    });

    let logs = logs.contents();
    assert!(logs.contains("skipping empty plugin"));
    assert!(logs.contains("installed plugin"));
}
