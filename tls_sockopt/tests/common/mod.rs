//! Scripted TLS daemon shared by the integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use spin::Mutex;
use tls_sockopt::{
    CallToken, GetsockoptNotification, NotificationChannel, ReplyHandle, SetsockoptNotification,
    ShimConfig, SockoptError, SockoptResult, SocketId, TlsShim,
};

/// How the daemon answers the next notifications
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Script {
    /// Status 0
    Accept,
    /// Non-zero status
    Reject(i32),
    /// Status 0 with payload
    Data(Vec<u8>),
    /// Never answer
    Silent,
}

/// Which primitive carried a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Set,
    Get,
}

/// Notification as the daemon saw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sent {
    pub direction: Direction,
    pub token: CallToken,
    pub level: i32,
    pub optname: i32,
    pub optval: Option<Vec<u8>>,
}

/// Daemon double answering from its own thread
pub struct ScriptedDaemon {
    replies: Mutex<Option<ReplyHandle>>,
    script: Mutex<Script>,
    sent: Mutex<Vec<Sent>>,
    opens: AtomicUsize,
    closes: AtomicUsize,
    fail_open: bool,
}

impl ScriptedDaemon {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(None),
            script: Mutex::new(script),
            sent: Mutex::new(Vec::new()),
            opens: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
            fail_open: false,
        })
    }

    pub fn refusing_open() -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(None),
            script: Mutex::new(Script::Silent),
            sent: Mutex::new(Vec::new()),
            opens: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
            fail_open: true,
        })
    }

    pub fn set_script(&self, script: Script) {
        *self.script.lock() = script;
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().clone()
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn is_open(&self) -> bool {
        self.replies.lock().is_some()
    }

    /// Answer `token` now, bypassing the script. Returns whether a waiting
    /// call received it.
    pub fn reply_status(&self, token: CallToken, status: i32) -> bool {
        match self.replies.lock().as_ref() {
            Some(replies) => replies.report_return(token, status),
            None => false,
        }
    }

    pub fn reply_data(&self, token: CallToken, payload: &[u8]) -> bool {
        match self.replies.lock().as_ref() {
            Some(replies) => replies.report_data_return(token, payload),
            None => false,
        }
    }

    fn record_and_answer(&self, sent: Sent) {
        let token = sent.token;
        self.sent.lock().push(sent);

        let script = self.script.lock().clone();
        let Some(replies) = self.replies.lock().clone() else {
            return;
        };
        thread::spawn(move || match script {
            Script::Accept => {
                replies.report_return(token, 0);
            }
            Script::Reject(status) => {
                replies.report_return(token, status);
            }
            Script::Data(payload) => {
                replies.report_data_return(token, &payload);
            }
            Script::Silent => {}
        });
    }
}

impl NotificationChannel for ScriptedDaemon {
    fn open(&self, replies: ReplyHandle) -> SockoptResult<()> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if self.fail_open {
            return Err(SockoptError::OutOfMemory);
        }
        *self.replies.lock() = Some(replies);
        Ok(())
    }

    fn send_setsockopt(&self, n: SetsockoptNotification<'_>) {
        self.record_and_answer(Sent {
            direction: Direction::Set,
            token: n.token,
            level: n.level,
            optname: n.optname,
            optval: Some(n.optval.to_vec()),
        });
    }

    fn send_getsockopt(&self, n: GetsockoptNotification) {
        self.record_and_answer(Sent {
            direction: Direction::Get,
            token: n.token,
            level: n.level,
            optname: n.optname,
            optval: None,
        });
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
        self.replies.lock().take();
    }
}

/// Shim over `daemon` with a response bound of `timeout_ms`
pub fn shim_with(daemon: &Arc<ScriptedDaemon>, timeout_ms: u64) -> TlsShim {
    let _ = env_logger::builder().is_test(true).try_init();
    let config = ShimConfig::new();
    config.set_response_timeout(Duration::from_millis(timeout_ms));
    let channel: Arc<dyn NotificationChannel> = daemon.clone();
    TlsShim::setup(channel, config).expect("setup")
}

/// Native setsockopt that always succeeds
pub fn native_set_ok(_: SocketId, _: i32, _: i32, _: &[u8]) -> SockoptResult<()> {
    Ok(())
}

/// Native setsockopt that always fails with ENOPROTOOPT
pub fn native_set_enoprotoopt(_: SocketId, _: i32, _: i32, _: &[u8]) -> SockoptResult<()> {
    Err(SockoptError::Native(-92))
}

/// Native getsockopt producing the int 1
pub fn native_get_one(
    _: SocketId,
    _: i32,
    _: i32,
    optval: Option<&mut [u8]>,
    optlen: Option<&mut u32>,
) -> SockoptResult<()> {
    let bytes = 1i32.to_ne_bytes();
    let optval = optval.ok_or(SockoptError::TransferFault)?;
    let optlen = optlen.ok_or(SockoptError::TransferFault)?;
    let len = bytes.len().min(*optlen as usize);
    optval
        .get_mut(..len)
        .ok_or(SockoptError::TransferFault)?
        .copy_from_slice(&bytes[..len]);
    *optlen = len as u32;
    Ok(())
}
