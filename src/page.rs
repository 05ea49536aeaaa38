use crate::capability::{self, PlatformCapabilities, try_detect};
use crate::dialog::{DialogKind, ResponseQueue, read_record};
use crate::frame_sync::propagate;
use crate::interceptor::{BindingSlot, DialogBinding, InstallOutcome, OverrideSet, install};
use crate::runtime_state::{
    ElementId, ElementState, StorageMode, TraceState, WindowId, WindowState,
};
use crate::runtime_values::Value;
use crate::script::ScriptCommand;
use crate::storage::{LocalStorage, StorageBackend, select_backend};
use crate::{Error, Result};
use std::collections::HashMap;
use std::rc::Rc;

const DEFAULT_ORIGIN: &str = "http://localhost";

#[derive(Debug, Clone)]
pub struct PageConfig {
    pub origin: String,
    pub capabilities: PlatformCapabilities,
    /// Raw localStorage items present for the top origin before load.
    pub local_storage: Vec<(String, String)>,
    pub trace: bool,
    pub trace_stderr: bool,
    pub trace_log_limit: usize,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            capabilities: PlatformCapabilities::full(),
            local_storage: Vec::new(),
            trace: false,
            trace_stderr: true,
            trace_log_limit: 10_000,
        }
    }
}

impl PageConfig {
    pub fn with_origin(mut self, origin: &str) -> Self {
        self.origin = origin.to_string();
        self
    }

    pub fn with_capabilities(mut self, capabilities: PlatformCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Later pairs win over earlier ones with the same key.
    pub fn with_local_storage(mut self, items: &[(&str, &str)]) -> Self {
        for (key, raw) in items {
            if let Some((_, stored)) = self.local_storage.iter_mut().find(|(name, _)| name == key) {
                *stored = (*raw).to_string();
            } else {
                self.local_storage
                    .push(((*key).to_string(), (*raw).to_string()));
            }
        }
        self
    }

    pub fn with_trace(mut self, enabled: bool) -> Self {
        self.trace = enabled;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.origin.trim().is_empty() {
            return Err(Error::InvalidConfig("origin must not be empty".into()));
        }
        if self.trace_log_limit == 0 {
            return Err(Error::InvalidConfig(
                "trace_log_limit requires at least 1 entry".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct FrameOptions {
    /// `None` inherits the parent's origin.
    pub origin: Option<String>,
    pub capabilities: PlatformCapabilities,
}

impl FrameOptions {
    pub fn with_origin(mut self, origin: &str) -> Self {
        self.origin = Some(origin.to_string());
        self
    }

    pub fn with_capabilities(mut self, capabilities: PlatformCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }
}

/// The `<iframe>` element in the parent document and its nested context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHandle {
    pub element: ElementId,
    pub window: WindowId,
}

/// A dialog that reached a native binding and would have blocked the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeDialog {
    pub window: WindowId,
    pub kind: DialogKind,
    pub message: String,
}

/// A page under automation: its execution contexts, their documents'
/// elements, and one localStorage area per origin.
#[derive(Debug)]
pub struct Page {
    windows: Vec<WindowState>,
    elements: Vec<ElementState>,
    storage_areas: HashMap<String, LocalStorage>,
    native_dialogs: Vec<NativeDialog>,
    trace_state: TraceState,
}

impl Page {
    pub fn new(config: PageConfig) -> Result<Self> {
        config.validate()?;

        let mut page = Self {
            windows: Vec::new(),
            elements: Vec::new(),
            storage_areas: HashMap::new(),
            native_dialogs: Vec::new(),
            trace_state: TraceState {
                enabled: config.trace,
                to_stderr: config.trace_stderr,
                log_limit: config.trace_log_limit,
                ..TraceState::default()
            },
        };

        let storage = page.storage_area(&config.origin);
        for (key, raw) in &config.local_storage {
            storage.set_item(key, raw.clone());
        }
        page.windows.push(WindowState::new(
            WindowId(0),
            None,
            None,
            config.origin,
            config.capabilities,
            storage,
        ));
        Ok(page)
    }

    pub fn top_window(&self) -> WindowId {
        WindowId(0)
    }

    /// Live execution contexts in creation order.
    pub fn windows(&self) -> Vec<WindowId> {
        self.windows
            .iter()
            .filter(|window| !window.discarded)
            .map(|window| window.id)
            .collect()
    }

    pub fn parent(&self, window: WindowId) -> Result<Option<WindowId>> {
        Ok(self.window(window)?.parent)
    }

    /// `window.frameElement`; `None` for the top context.
    pub fn frame_element(&self, window: WindowId) -> Result<Option<ElementId>> {
        Ok(self.window(window)?.frame_element)
    }

    pub fn origin(&self, window: WindowId) -> Result<&str> {
        Ok(self.window(window)?.origin.as_str())
    }

    pub fn add_frame(&mut self, parent: WindowId, options: FrameOptions) -> Result<FrameHandle> {
        let parent_origin = self.window(parent)?.origin.clone();
        let origin = options.origin.unwrap_or(parent_origin);

        let window = WindowId(self.windows.len());
        let element = ElementId(self.elements.len());
        self.elements.push(ElementState {
            tag_name: "iframe".to_string(),
            owner: Some(parent),
            content_window: Some(window),
        });

        let storage = self.storage_area(&origin);
        self.trace_state.line(format!(
            "[frame] created {window} in {parent} origin={origin}"
        ));
        self.windows.push(WindowState::new(
            window,
            Some(parent),
            Some(element),
            origin,
            options.capabilities,
            storage,
        ));
        Ok(FrameHandle { element, window })
    }

    pub fn create_element(&mut self, window: WindowId, tag_name: &str) -> Result<ElementId> {
        self.window(window)?;
        let element = ElementId(self.elements.len());
        self.elements.push(ElementState {
            tag_name: tag_name.to_ascii_lowercase(),
            owner: Some(window),
            content_window: None,
        });
        Ok(element)
    }

    /// An element from a document without a browsing context, such as one
    /// built by `document.implementation.createHTMLDocument`.
    pub fn create_detached_element(&mut self, tag_name: &str) -> ElementId {
        let element = ElementId(self.elements.len());
        self.elements.push(ElementState {
            tag_name: tag_name.to_ascii_lowercase(),
            owner: None,
            content_window: None,
        });
        element
    }

    pub fn tag_name(&self, element: ElementId) -> Result<&str> {
        Ok(self.element(element)?.tag_name.as_str())
    }

    /// `element.ownerDocument.defaultView`.
    pub fn owner_window(&self, element: ElementId) -> Result<Option<WindowId>> {
        Ok(self.element(element)?.owner)
    }

    /// `iframe.contentWindow`.
    pub fn content_window(&self, element: ElementId) -> Result<Option<WindowId>> {
        Ok(self.element(element)?.content_window)
    }

    pub fn reload(&mut self, window: WindowId) -> Result<()> {
        self.window(window)?;
        self.trace_state
            .line(format!("[navigation] reload {window}"));
        self.replace_document(window);
        Ok(())
    }

    pub fn navigate(&mut self, window: WindowId, origin: &str) -> Result<()> {
        self.window(window)?;
        if origin.trim().is_empty() {
            return Err(Error::InvalidConfig("origin must not be empty".into()));
        }
        self.trace_state
            .line(format!("[navigation] navigate {window} origin={origin}"));
        self.replace_document(window);
        let storage = self.storage_area(origin);
        let state = &mut self.windows[window.0];
        state.origin = origin.to_string();
        state.local_storage = storage;
        Ok(())
    }

    pub fn is_installed(&self, window: WindowId) -> Result<bool> {
        Ok(self.window(window)?.interceptor.installed)
    }

    /// The mode fixed by the context's install, if it has one.
    pub fn storage_mode(&self, window: WindowId) -> Result<Option<StorageMode>> {
        Ok(self.window(window)?.interceptor.mode)
    }

    /// Runs the capability probe for `window` without installing anything.
    pub fn probe_storage_mode(&self, window: WindowId) -> Result<StorageMode> {
        let state = self.window(window)?;
        Ok(capability::probe(state.capabilities, &state.local_storage))
    }

    pub fn set_global(&mut self, window: WindowId, name: &str, value: Value) -> Result<()> {
        self.window(window)?.globals.set(name, value);
        Ok(())
    }

    pub fn global(&self, window: WindowId, name: &str) -> Result<Option<Value>> {
        Ok(self.window(window)?.globals.get(name))
    }

    /// `localStorage.setItem` from page script; ignored when the context has
    /// no usable localStorage.
    pub fn set_storage_item(&mut self, window: WindowId, key: &str, raw: &str) -> Result<()> {
        let state = self.window(window)?;
        if state.capabilities.local_storage.is_available() {
            state.local_storage.set_item(key, raw.to_string());
        }
        Ok(())
    }

    pub fn storage_item(&self, window: WindowId, key: &str) -> Result<Option<String>> {
        let state = self.window(window)?;
        if !state.capabilities.local_storage.is_available() {
            return Ok(None);
        }
        Ok(state.local_storage.get_item(key))
    }

    pub fn alert(&mut self, window: WindowId, message: &str) -> Result<()> {
        let (slot, target) = self.dispatch(window, DialogKind::Alert)?;
        match target {
            Some(overrides) => {
                overrides.alert(message);
                self.trace_state.dialog_line(format!(
                    "[dialog] alert {window} via {} message={message:?}",
                    overrides.installer()
                ));
            }
            None => self.record_native(window, DialogKind::Alert, message, &slot),
        }
        Ok(())
    }

    pub fn confirm(&mut self, window: WindowId, message: &str) -> Result<bool> {
        let (slot, target) = self.dispatch(window, DialogKind::Confirm)?;
        let accepted = match target {
            Some(overrides) => {
                let accepted = overrides.confirm(message);
                self.trace_state.dialog_line(format!(
                    "[dialog] confirm {window} via {} message={message:?} -> {accepted}",
                    overrides.installer()
                ));
                accepted
            }
            None => {
                self.record_native(window, DialogKind::Confirm, message, &slot);
                false
            }
        };
        Ok(accepted)
    }

    pub fn prompt(
        &mut self,
        window: WindowId,
        message: Option<&str>,
        default_text: Option<&str>,
    ) -> Result<Option<String>> {
        let (slot, target) = self.dispatch(window, DialogKind::Prompt)?;
        let answer = match target {
            Some(overrides) => {
                let answer = overrides.prompt(message, default_text);
                self.trace_state.dialog_line(format!(
                    "[dialog] prompt {window} via {} mode={} message={message:?} -> {answer:?}",
                    overrides.installer(),
                    overrides.mode().as_str()
                ));
                answer
            }
            None => {
                self.record_native(window, DialogKind::Prompt, message.unwrap_or_default(), &slot);
                None
            }
        };
        Ok(answer)
    }

    pub fn dialog_binding(&self, window: WindowId, kind: DialogKind) -> Result<DialogBinding> {
        Ok(DialogBinding(self.window(window)?.bindings.get(kind).clone()))
    }

    pub fn native_dialogs(&self) -> &[NativeDialog] {
        &self.native_dialogs
    }

    pub fn take_native_dialogs(&mut self) -> Vec<NativeDialog> {
        std::mem::take(&mut self.native_dialogs)
    }

    /// Installs the interceptor in `window` once, then shares it with the
    /// context owning `element` when that is a different context.
    pub fn replace_alert_method(
        &mut self,
        window: WindowId,
        element: Option<ElementId>,
    ) -> Result<()> {
        if let Some(element) = element {
            self.element(element)?;
        }

        match install(self.window_mut(window)?) {
            InstallOutcome::Installed {
                mode,
                volatile_reason,
            } => {
                if let Some(reason) = volatile_reason {
                    self.trace_state
                        .line(format!("[probe] {window} volatile: {reason}"));
                }
                self.trace_state
                    .line(format!("[install] {window} mode={}", mode.as_str()));
            }
            InstallOutcome::AlreadyInstalled => {
                self.trace_state
                    .line(format!("[install] {window} already installed"));
            }
        }

        if let Some(element) = element {
            if let Some(target) = propagate(&mut self.windows, &self.elements, window, element) {
                self.trace_state
                    .line(format!("[frame] shared overrides {window} -> {target}"));
            }
        }
        Ok(())
    }

    /// Queues the answer for the next `prompt`, whether or not the
    /// interceptor is installed yet.
    pub fn answer_on_next_prompt(&mut self, window: WindowId, answer: &str) -> Result<()> {
        let backend = self.probed_backend(window)?;
        ResponseQueue::enqueue(backend.as_ref(), DialogKind::Prompt, Value::from(answer));
        self.trace_state.line(format!(
            "[prompt] {window} queued answer={answer:?} mode={}",
            backend.mode().as_str()
        ));
        Ok(())
    }

    /// The messages recorded for `kind`, read the way the driver reads them.
    pub fn recorded_messages(&self, window: WindowId, kind: DialogKind) -> Result<Vec<String>> {
        let backend = self.probed_backend(window)?;
        Ok(read_record(backend.as_ref(), kind))
    }

    /// Runs driver calls injected into `window`; `arguments[N]` refers to
    /// `args[N]`.
    pub fn execute_script(
        &mut self,
        window: WindowId,
        code: &str,
        args: &[ElementId],
    ) -> Result<()> {
        self.window(window)?;
        for command in ScriptCommand::parse_script(code)? {
            match command {
                ScriptCommand::ReplaceAlertMethod { element_argument } => {
                    let element = element_argument
                        .map(|index| {
                            args.get(index).copied().ok_or_else(|| {
                                Error::ScriptRuntime(format!(
                                    "arguments[{index}] is out of range ({} given)",
                                    args.len()
                                ))
                            })
                        })
                        .transpose()?;
                    self.replace_alert_method(window, element)?;
                }
                ScriptCommand::AnswerOnNextPrompt { answer } => {
                    self.answer_on_next_prompt(window, &answer)?;
                }
            }
        }
        Ok(())
    }

    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace_state.enabled = enabled;
    }

    pub fn set_trace_stderr(&mut self, enabled: bool) {
        self.trace_state.to_stderr = enabled;
    }

    pub fn set_trace_dialogs(&mut self, enabled: bool) {
        self.trace_state.dialogs = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::InvalidConfig(
                "set_trace_log_limit requires at least 1 entry".into(),
            ));
        }
        self.trace_state.log_limit = max_entries;
        while self.trace_state.logs.len() > self.trace_state.log_limit {
            self.trace_state.logs.pop_front();
        }
        Ok(())
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        self.trace_state.logs.drain(..).collect()
    }

    fn window(&self, window: WindowId) -> Result<&WindowState> {
        self.windows
            .get(window.0)
            .filter(|state| !state.discarded)
            .ok_or(Error::UnknownWindow(window.0))
    }

    fn window_mut(&mut self, window: WindowId) -> Result<&mut WindowState> {
        self.windows
            .get_mut(window.0)
            .filter(|state| !state.discarded)
            .ok_or(Error::UnknownWindow(window.0))
    }

    fn element(&self, element: ElementId) -> Result<&ElementState> {
        self.elements
            .get(element.0)
            .ok_or(Error::UnknownElement(element.0))
    }

    fn storage_area(&mut self, origin: &str) -> LocalStorage {
        self.storage_areas
            .entry(origin.to_string())
            .or_default()
            .clone()
    }

    fn probed_backend(&self, window: WindowId) -> Result<Rc<dyn StorageBackend>> {
        let state = self.window(window)?;
        let capability = try_detect(state.capabilities, &state.local_storage);
        Ok(select_backend(capability, &state.globals))
    }

    fn dispatch(
        &mut self,
        window: WindowId,
        kind: DialogKind,
    ) -> Result<(BindingSlot, Option<Rc<OverrideSet>>)> {
        let state = self.window(window)?;
        let slot = state.bindings.get(kind).clone();
        let target = state.interceptor.dispatch_target(&slot);
        if slot.is_dangling() && target.is_some() {
            self.trace_state.dialog_line(format!(
                "[dialog] {kind} {window} borrowed override was discarded, using own install"
            ));
        }
        Ok((slot, target))
    }

    fn record_native(&mut self, window: WindowId, kind: DialogKind, message: &str, slot: &BindingSlot) {
        if slot.is_dangling() {
            self.trace_state.dialog_line(format!(
                "[dialog] {kind} {window} override was discarded, falling back to native"
            ));
        }
        self.trace_state.dialog_line(format!(
            "[dialog] native {kind} {window} message={message:?}"
        ));
        self.native_dialogs.push(NativeDialog {
            window,
            kind,
            message: message.to_string(),
        });
    }

    /// Replaces `window`'s document: its elements lose their view, nested
    /// frames are discarded and its globals and bindings start over.
    fn replace_document(&mut self, window: WindowId) {
        for element in &mut self.elements {
            if element.owner == Some(window) {
                element.owner = None;
                element.content_window = None;
            }
        }

        let children: Vec<WindowId> = self
            .windows
            .iter()
            .filter(|state| state.parent == Some(window) && !state.discarded)
            .map(|state| state.id)
            .collect();
        for child in children {
            self.replace_document(child);
            self.windows[child.0].discarded = true;
            self.trace_state
                .line(format!("[navigation] discarded {child}"));
        }

        self.windows[window.0].reset_browsing_state();
    }
}
