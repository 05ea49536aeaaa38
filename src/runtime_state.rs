use crate::capability::PlatformCapabilities;
use crate::interceptor::{DialogBindings, InterceptorContext};
use crate::storage::{GlobalScope, LocalStorage};
use std::collections::VecDeque;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub(crate) usize);

impl WindowId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub(crate) usize);

impl ElementId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element#{}", self.0)
    }
}

/// Where recorded dialogs and queued responses live for a context.
///
/// Fixed by the first install in a context and never re-evaluated until the
/// context is reloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageMode {
    Durable,
    Volatile,
}

impl StorageMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Durable => "durable",
            Self::Volatile => "volatile",
        }
    }
}

#[derive(Debug)]
pub(crate) struct WindowState {
    pub(crate) id: WindowId,
    pub(crate) parent: Option<WindowId>,
    pub(crate) frame_element: Option<ElementId>,
    pub(crate) origin: String,
    pub(crate) capabilities: PlatformCapabilities,
    pub(crate) local_storage: LocalStorage,
    pub(crate) globals: GlobalScope,
    pub(crate) bindings: DialogBindings,
    pub(crate) interceptor: InterceptorContext,
    pub(crate) discarded: bool,
}

impl WindowState {
    pub(crate) fn new(
        id: WindowId,
        parent: Option<WindowId>,
        frame_element: Option<ElementId>,
        origin: String,
        capabilities: PlatformCapabilities,
        local_storage: LocalStorage,
    ) -> Self {
        Self {
            id,
            parent,
            frame_element,
            origin,
            capabilities,
            local_storage,
            globals: GlobalScope::default(),
            bindings: DialogBindings::default(),
            interceptor: InterceptorContext::default(),
            discarded: false,
        }
    }

    /// Drops everything a navigation replaces: globals, bindings and the
    /// installation flag. The origin's localStorage handle is swapped by the
    /// caller.
    pub(crate) fn reset_browsing_state(&mut self) {
        self.globals = GlobalScope::default();
        self.bindings = DialogBindings::default();
        self.interceptor = InterceptorContext::default();
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ElementState {
    pub(crate) tag_name: String,
    // ownerDocument.defaultView; None once the document has no browsing context.
    pub(crate) owner: Option<WindowId>,
    pub(crate) content_window: Option<WindowId>,
}

#[derive(Debug)]
pub(crate) struct TraceState {
    pub(crate) enabled: bool,
    pub(crate) dialogs: bool,
    pub(crate) logs: VecDeque<String>,
    pub(crate) log_limit: usize,
    pub(crate) to_stderr: bool,
}

impl Default for TraceState {
    fn default() -> Self {
        Self {
            enabled: false,
            dialogs: true,
            logs: VecDeque::new(),
            log_limit: 10_000,
            to_stderr: true,
        }
    }
}

impl TraceState {
    pub(crate) fn line(&mut self, line: String) {
        if self.enabled {
            if self.to_stderr {
                eprintln!("{line}");
            }
            if self.logs.len() >= self.log_limit {
                self.logs.pop_front();
            }
            self.logs.push_back(line);
        }
    }

    pub(crate) fn dialog_line(&mut self, line: String) {
        if self.enabled && self.dialogs {
            self.line(line);
        }
    }
}
