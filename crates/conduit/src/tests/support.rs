//! Shared doubles and fixtures for the dispatch behaviour suites.

use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use mockall::mock;
use serde_json::{Value, json};

use conduit_types::{ContextMenuData, OpenFileDialogOptions, SaveFileDialogOptions};

use crate::correlator::Correlator;
use crate::dialogs::{DialogError, DialogFactory, FileDialog, MessageDialog};
use crate::dispatch::{
    Headers, MessageProcessor, Parameters, QueryParams, Router, RuntimeRequest, TransportResponse,
};
use crate::platform::{ButtonDefaults, PlatformButtonDefaults};
use crate::registry::{Bindings, BoundMethod, MethodError, MethodSignature, reply};
use crate::window::{Window, WindowId, WindowLocator};

/// How long tests wait for background work.
pub const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

/// Id under which the summing method is bound.
pub const SUM_ID: u32 = 7;
/// [`SUM_ID`] as sent in the method id header.
pub const SUM_ID_HEADER: &str = "7";

/// In-memory sink for formatted log lines.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .expect("log buffer mutex poisoned")
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `action` with a plain-text subscriber scoped to this thread and
/// returns everything it logged.
pub fn capture_logs(action: impl FnOnce()) -> String {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    tracing::subscriber::with_default(subscriber, action);
    let bytes = buffer.0.lock().expect("log buffer mutex poisoned");
    String::from_utf8_lossy(&bytes).into_owned()
}

/// A message pushed to a window.
#[derive(Debug, Clone, PartialEq)]
pub enum Push {
    CallResponse { id: String, payload: String },
    CallError { id: String, message: String },
    DialogResponse { id: String, payload: String, is_json: bool },
    DialogError { id: String, message: String },
    ContextMenu(ContextMenuData),
}

impl Push {
    /// Returns the error text of an error push.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::CallError { message, .. } | Self::DialogError { message, .. } => {
                Some(message.as_str())
            }
            _ => None,
        }
    }
}

/// Window double that records every push.
pub struct RecordingWindow {
    id: WindowId,
    name: String,
    pushes: Mutex<Vec<Push>>,
    changed: Condvar,
}

impl RecordingWindow {
    pub fn new(id: u32, name: &str) -> Arc<Self> {
        Arc::new(Self {
            id: WindowId(id),
            name: name.to_owned(),
            pushes: Mutex::new(Vec::new()),
            changed: Condvar::new(),
        })
    }

    /// Returns a copy of the pushes received so far.
    pub fn pushes(&self) -> Vec<Push> {
        self.pushes.lock().expect("pushes mutex poisoned").clone()
    }

    /// Waits until at least `count` pushes arrived or the timeout passes.
    pub fn wait_for(&self, count: usize, timeout: Duration) -> Vec<Push> {
        let deadline = Instant::now() + timeout;
        let mut pushes = self.pushes.lock().expect("pushes mutex poisoned");
        while pushes.len() < count {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            let (next, _) = self
                .changed
                .wait_timeout(pushes, remaining)
                .expect("pushes mutex poisoned");
            pushes = next;
        }
        pushes.clone()
    }

    fn record(&self, push: Push) {
        self.pushes.lock().expect("pushes mutex poisoned").push(push);
        self.changed.notify_all();
    }
}

impl Window for RecordingWindow {
    fn id(&self) -> WindowId {
        self.id
    }

    fn name(&self) -> &str {
        self.name.as_str()
    }

    fn call_response(&self, call_id: &str, payload: &str) {
        self.record(Push::CallResponse {
            id: call_id.to_owned(),
            payload: payload.to_owned(),
        });
    }

    fn call_error(&self, call_id: &str, message: &str) {
        self.record(Push::CallError {
            id: call_id.to_owned(),
            message: message.to_owned(),
        });
    }

    fn dialog_response(&self, dialog_id: &str, payload: &str, is_json: bool) {
        self.record(Push::DialogResponse {
            id: dialog_id.to_owned(),
            payload: payload.to_owned(),
            is_json,
        });
    }

    fn dialog_error(&self, dialog_id: &str, message: &str) {
        self.record(Push::DialogError {
            id: dialog_id.to_owned(),
            message: message.to_owned(),
        });
    }

    fn open_context_menu(&self, data: &ContextMenuData) {
        self.record(Push::ContextMenu(data.clone()));
    }
}

mock! {
    pub Locator {}

    impl WindowLocator for Locator {
        fn by_name(&self, name: &str) -> Option<Arc<dyn Window>>;
        fn by_id(&self, id: WindowId) -> Option<Arc<dyn Window>>;
    }
}

mock! {
    pub Picker {}

    impl FileDialog for Picker {
        fn prompt_for_single_selection(&mut self) -> Result<String, DialogError>;
        fn prompt_for_multiple_selection(&mut self) -> Result<Vec<String>, DialogError>;
    }
}

/// A file dialog request observed by [`RecordingDialogs`].
#[derive(Debug, Clone, PartialEq)]
pub enum FileRequest {
    Open {
        options: OpenFileDialogOptions,
        owner: Option<WindowId>,
    },
    Save {
        options: SaveFileDialogOptions,
        owner: Option<WindowId>,
    },
}

/// Dialog factory double: records message dialogs and hands out queued
/// file pickers.
#[derive(Default)]
pub struct RecordingDialogs {
    shown: Mutex<Vec<MessageDialog>>,
    requests: Mutex<Vec<FileRequest>>,
    pickers: Mutex<VecDeque<Box<dyn FileDialog>>>,
}

impl RecordingDialogs {
    /// Queues the picker returned by the next file dialog request.
    pub fn queue_picker(&self, picker: impl FileDialog + 'static) {
        self.pickers
            .lock()
            .expect("pickers mutex poisoned")
            .push_back(Box::new(picker));
    }

    /// Returns the message dialogs shown so far.
    pub fn shown(&self) -> Vec<MessageDialog> {
        self.shown.lock().expect("shown mutex poisoned").clone()
    }

    /// Returns the only message dialog shown.
    pub fn single_shown(&self) -> MessageDialog {
        let shown = self.shown();
        assert_eq!(shown.len(), 1, "expected exactly one dialog");
        shown.into_iter().next().expect("one dialog")
    }

    /// Returns the file dialog requests observed so far.
    pub fn requests(&self) -> Vec<FileRequest> {
        self.requests.lock().expect("requests mutex poisoned").clone()
    }

    fn next_picker(&self) -> Box<dyn FileDialog> {
        self.pickers
            .lock()
            .expect("pickers mutex poisoned")
            .pop_front()
            .expect("no picker queued for file dialog")
    }
}

impl DialogFactory for RecordingDialogs {
    fn show_message(&self, dialog: MessageDialog) {
        self.shown.lock().expect("shown mutex poisoned").push(dialog);
    }

    fn open_file(
        &self,
        options: OpenFileDialogOptions,
        owner: Option<Arc<dyn Window>>,
    ) -> Box<dyn FileDialog> {
        self.requests
            .lock()
            .expect("requests mutex poisoned")
            .push(FileRequest::Open {
                options,
                owner: owner.map(|window| window.id()),
            });
        self.next_picker()
    }

    fn save_file(
        &self,
        options: SaveFileDialogOptions,
        owner: Option<Arc<dyn Window>>,
    ) -> Box<dyn FileDialog> {
        self.requests
            .lock()
            .expect("requests mutex poisoned")
            .push(FileRequest::Save {
                options,
                owner: owner.map(|window| window.id()),
            });
        self.next_picker()
    }
}

/// Signature of a method on the calculator test receiver.
pub fn calc(method: &str) -> MethodSignature {
    MethodSignature::new("main", "Calc", method)
}

/// Calculator bindings used across the call suites.
///
/// `Sum` is bound under [`SUM_ID`] and sums the `a` fields of its
/// arguments. `Other` exists to prove id precedence.
pub fn calculator() -> Bindings {
    let mut builder = Bindings::builder();
    builder
        .bind(
            BoundMethod::new(calc("Sum"), |args| {
                let sum: i64 = args
                    .iter()
                    .filter_map(|arg| arg.get("a").and_then(Value::as_i64))
                    .sum();
                reply(json!({ "sum": sum }))
            })
            .with_id(SUM_ID),
        )
        .expect("bind Sum")
        .bind(BoundMethod::new(calc("Other"), |_| reply("other")))
        .expect("bind Other")
        .bind(BoundMethod::new(calc("Nothing"), |_| Ok(None)))
        .expect("bind Nothing")
        .bind(BoundMethod::new(calc("Fail"), |_| {
            Err(MethodError::failed("division by zero"))
        }))
        .expect("bind Fail")
        .bind(BoundMethod::new(calc("Unencodable"), |_| {
            let mut grid: HashMap<(i32, i32), i32> = HashMap::new();
            grid.insert((0, 0), 1);
            reply(grid)
        }))
        .expect("bind Unencodable")
        .bind(BoundMethod::new(calc("Panic"), |_| panic!("calculator exploded")))
        .expect("bind Panic")
        .bind(BoundMethod::new(calc("Pair"), |args| reply(args.len())).with_arity(2))
        .expect("bind Pair");
    builder.build()
}

/// Processor wired to recording doubles.
pub struct Harness {
    pub processor: MessageProcessor,
    pub window: Arc<RecordingWindow>,
    pub dialogs: Arc<RecordingDialogs>,
}

impl Harness {
    /// Builds a harness whose dialogs follow the macOS default-button rule.
    pub fn new(bindings: Bindings) -> Self {
        Self::with_buttons(bindings, PlatformButtonDefaults::for_os("macos"))
    }

    /// Builds a harness with an explicit default-button policy.
    pub fn with_buttons(bindings: Bindings, buttons: impl ButtonDefaults + 'static) -> Self {
        let dialogs = Arc::new(RecordingDialogs::default());
        let correlator = Correlator::new().expect("start correlator");
        let router = Router::new(
            Arc::new(bindings),
            dialogs.clone(),
            Arc::new(buttons),
            correlator,
        );
        Self {
            processor: MessageProcessor::new(router, "/conduit/runtime"),
            window: RecordingWindow::new(1, "main"),
            dialogs,
        }
    }

    /// Returns the issuing window as the trait object handlers receive.
    pub fn issuer(&self) -> Arc<dyn Window> {
        self.window.clone()
    }

    /// Sends `Category.Method` with a JSON body from the issuing window.
    pub fn send(&self, method: &str, body: &Value, headers: &[(&str, &str)]) -> TransportResponse {
        let (category, method) = method.split_once('.').expect("Category.Method");
        let request = RuntimeRequest::new(
            category,
            method,
            Headers::from_pairs(headers.iter().copied()),
            Parameters::new(QueryParams::default(), Some(body.to_string().into_bytes())),
        );
        self.processor.handle(&self.issuer(), &request)
    }

    /// Waits for launched work and returns every push so far.
    pub fn settle(&self) -> Vec<Push> {
        self.processor
            .drain(SETTLE_TIMEOUT)
            .expect("background work should settle");
        self.window.pushes()
    }
}
