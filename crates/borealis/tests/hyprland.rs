//! The Hyprland service against a fake event socket.

#![cfg(all(unix, feature = "hyprland"))]

use std::io::Write;
use std::os::unix::net::UnixListener;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use borealis::ext::hyprland::{HyprlandCallback, HyprlandService};
use borealis::prelude::*;
use borealis::{HyprlandConfig, Value};
use parking_lot::Mutex;

const TIMEOUT: Duration = Duration::from_secs(5);

type Log = Arc<Mutex<Vec<String>>>;

fn recorder(log: &Log) -> impl Fn(&Label, &[Value]) + Send + Sync + 'static {
    let log = log.clone();
    move |_, args| {
        let args: Vec<String> = args.iter().map(ToString::to_string).collect();
        log.lock().push(args.join("|"));
    }
}

#[test]
fn test_events_reach_widgets() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".socket2.sock");
    let listener = UnixListener::bind(&path).unwrap();
    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        stream
            .write_all(
                b"workspace>>2\n\
                  activewindow>>kitty,vim: a, b\n\
                  bogus frame\n\
                  teleport>>1\n\
                  configreloaded>>\n",
            )
            .unwrap();
    });

    let log = Log::default();
    let app = Application::new(ApplicationConfig::new("org.example.hyprland"));
    let handle = app.register(HyprlandService::new(&path)).unwrap();
    assert_eq!(handle.prefix(), Some("hyprland-on"));

    let label = Label::builder()
        .bindings(
            Bindings::new()
                .declare("hyprland_on_workspace", AttrValue::callback(recorder(&log)))
                .declare("hyprland_on_activewindow", AttrValue::callback(recorder(&log)))
                .from_annotation::<HyprlandCallback, _, _>("configreloaded", {
                    let log = log.clone();
                    move |_: &Label, _: &[Value]| log.lock().push("reloaded".to_string())
                }),
        )
        .build();
    app.set_root(move |_| Window::builder().child(label).build());
    app.activate().unwrap();
    server.join().unwrap();

    let mut ran = 0;
    while ran < 3 {
        let n = app.context().dispatch_within(TIMEOUT);
        assert!(n > 0, "events were not delivered");
        ran += n;
    }
    assert_eq!(*log.lock(), ["2", "kitty|vim: a, b", "reloaded"]);
}

#[test]
fn test_missing_socket_does_not_stop_the_application() {
    let dir = tempfile::tempdir().unwrap();
    let config = HyprlandConfig {
        socket_path: Some(dir.path().join("missing.sock")),
        ..HyprlandConfig::default()
    };

    let app = Application::new(ApplicationConfig::new("org.example.nosocket"));
    app.register(HyprlandService::from_config(&config).unwrap()).unwrap();
    app.set_root(|_| Window::builder().build());
    assert!(app.activate().is_ok());
}
