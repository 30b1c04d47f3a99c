use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Info,
    Success,
    Warning,
    Error,
}

/// Opaque handle for dismissing a previously shown notice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NoticeHandle(pub u64);

/// User-facing notification dispatch. Fire-and-forget: never awaited,
/// never used to signal success or failure to code.
pub trait Notifier: Send + Sync {
    fn notify(&self, kind: NoticeKind, message: &str) -> NoticeHandle;

    fn dismiss(&self, handle: NoticeHandle);
}

#[derive(Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _kind: NoticeKind, _message: &str) -> NoticeHandle {
        NoticeHandle(0)
    }

    fn dismiss(&self, _handle: NoticeHandle) {}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

#[derive(Default)]
struct BufferedState {
    notices: Vec<Notice>,
    dismissed: Vec<NoticeHandle>,
}

/// Recording notifier for tests.
#[derive(Clone, Default)]
pub struct BufferedNotifier {
    inner: Arc<Mutex<BufferedState>>,
}

impl BufferedNotifier {
    pub fn snapshot(&self) -> Vec<Notice> {
        let guard = self.inner.lock().expect("buffered notifier mutex poisoned");
        guard.notices.clone()
    }

    pub fn dismissed(&self) -> Vec<NoticeHandle> {
        let guard = self.inner.lock().expect("buffered notifier mutex poisoned");
        guard.dismissed.clone()
    }
}

impl Notifier for BufferedNotifier {
    fn notify(&self, kind: NoticeKind, message: &str) -> NoticeHandle {
        let mut guard = self.inner.lock().expect("buffered notifier mutex poisoned");
        guard.notices.push(Notice {
            kind,
            message: message.to_string(),
        });
        NoticeHandle(guard.notices.len() as u64)
    }

    fn dismiss(&self, handle: NoticeHandle) {
        let mut guard = self.inner.lock().expect("buffered notifier mutex poisoned");
        guard.dismissed.push(handle);
    }
}
