mod common;

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use common::{shim_with, Script, ScriptedDaemon};
use tls_sockopt::options::{IPPROTO_TLS, SO_HOSTNAME};
use tls_sockopt::{DaemonId, NotificationChannel, ShimConfig, SockoptError, TlsShim};

fn wait_for_sent(daemon: &ScriptedDaemon, count: usize) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while daemon.sent().len() < count {
        assert!(Instant::now() < deadline, "daemon never saw the notification");
        thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn test_setup_opens_channel_once() {
    let daemon = ScriptedDaemon::new(Script::Accept);
    let shim = shim_with(&daemon, 1_000);
    assert_eq!(daemon.opens(), 1);
    assert!(daemon.is_open());
    assert!(shim.registry().is_empty());
    assert_eq!(shim.config().response_timeout(), Duration::from_millis(1_000));
}

#[test]
fn test_setup_fails_when_channel_refuses() {
    let daemon = ScriptedDaemon::refusing_open();
    let channel: Arc<dyn NotificationChannel> = daemon.clone();
    let result = TlsShim::setup(channel, ShimConfig::new());
    assert!(matches!(result, Err(SockoptError::OutOfMemory)));
    assert_eq!(daemon.opens(), 1);
    assert_eq!(daemon.closes(), 0);
}

#[test]
fn test_teardown_drains_registry_then_closes() {
    let daemon = ScriptedDaemon::new(Script::Accept);
    let shim = shim_with(&daemon, 1_000);
    let a = shim.register_socket(DaemonId::from_raw(1));
    let b = shim.register_socket(DaemonId::from_raw(2));

    let state_a = Arc::downgrade(&shim.registry().lookup(a).unwrap());
    let state_b = Arc::downgrade(&shim.registry().lookup(b).unwrap());

    shim.teardown();

    assert_eq!(daemon.closes(), 1);
    assert!(!daemon.is_open());
    assert!(state_a.upgrade().is_none());
    assert!(state_b.upgrade().is_none());
}

#[test]
fn test_drop_closes_channel_once() {
    let daemon = ScriptedDaemon::new(Script::Accept);
    {
        let shim = shim_with(&daemon, 1_000);
        shim.register_socket(DaemonId::from_raw(1));
    }
    assert_eq!(daemon.closes(), 1);
    assert!(!daemon.is_open());
}

#[test]
fn test_reply_after_teardown_is_refused() {
    let daemon = ScriptedDaemon::new(Script::Silent);
    let shim = shim_with(&daemon, 20);
    let sock = shim.register_socket(DaemonId::from_raw(1));
    let _ = shim.setsockopt(sock, IPPROTO_TLS, SO_HOSTNAME, Some(b"x.example\0"), 10, None);
    let token = daemon.sent()[0].token;

    shim.teardown();
    assert!(!daemon.reply_status(token, 0));
}

#[test]
fn test_unregister_wakes_waiting_call() {
    let daemon = ScriptedDaemon::new(Script::Silent);
    let shim = Arc::new(shim_with(&daemon, 30_000));
    let sock = shim.register_socket(DaemonId::from_raw(1));

    let started = Instant::now();
    let caller = {
        let shim = Arc::clone(&shim);
        thread::spawn(move || {
            shim.setsockopt(sock, IPPROTO_TLS, SO_HOSTNAME, Some(b"w.example\0"), 10, None)
        })
    };

    wait_for_sent(&daemon, 1);
    shim.unregister_socket(sock).unwrap();

    let result = caller.join().unwrap();
    assert!(matches!(result, Err(SockoptError::DaemonUnresponsive { .. })));
    assert!(started.elapsed() < Duration::from_secs(30));
}

#[test]
fn test_late_reply_is_discarded_and_next_call_is_clean() {
    let daemon = ScriptedDaemon::new(Script::Silent);
    let shim = shim_with(&daemon, 20);
    let sock = shim.register_socket(DaemonId::from_raw(1));

    assert!(shim
        .setsockopt(sock, IPPROTO_TLS, SO_HOSTNAME, Some(b"x.example\0"), 10, None)
        .is_err());
    let stale = daemon.sent()[0].token;

    assert!(!daemon.reply_status(stale, -1));
    assert_eq!(shim.stats().report().discarded_replies, 1);

    daemon.set_script(Script::Accept);
    shim.setsockopt(sock, IPPROTO_TLS, SO_HOSTNAME, Some(b"y.example\0"), 10, None)
        .unwrap();
    let fresh = daemon.sent()[1].token;
    assert_ne!(stale, fresh);
    assert_eq!(fresh.socket(), stale.socket());
}

#[test]
fn test_mark_connected_unknown_socket() {
    let daemon = ScriptedDaemon::new(Script::Accept);
    let shim = shim_with(&daemon, 1_000);
    let sock = shim.register_socket(DaemonId::from_raw(1));
    shim.unregister_socket(sock).unwrap();
    assert_eq!(shim.mark_connected(sock), Err(SockoptError::UnknownSocket));
}
