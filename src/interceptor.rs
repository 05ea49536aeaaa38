use crate::capability::{try_detect, unavailable_reason};
use crate::dialog::{DialogKind, ResponseQueue, append_record, reset_record};
use crate::runtime_state::{StorageMode, WindowId, WindowState};
use crate::runtime_values::Value;
use crate::storage::{StorageBackend, keys, select_backend};
use std::rc::{Rc, Weak};

/// The recording `alert`/`confirm`/`prompt` installed into one context.
#[derive(Debug)]
pub(crate) struct OverrideSet {
    installer: WindowId,
    backend: Rc<dyn StorageBackend>,
}

impl OverrideSet {
    pub(crate) fn installer(&self) -> WindowId {
        self.installer
    }

    pub(crate) fn mode(&self) -> StorageMode {
        self.backend.mode()
    }

    pub(crate) fn alert(&self, message: &str) {
        append_record(self.backend.as_ref(), DialogKind::Alert, message.to_string());
    }

    pub(crate) fn confirm(&self, message: &str) -> bool {
        append_record(
            self.backend.as_ref(),
            DialogKind::Confirm,
            message.to_string(),
        );
        ResponseQueue::consume_confirm(self.backend.as_ref())
    }

    pub(crate) fn prompt(&self, message: Option<&str>, default_text: Option<&str>) -> Option<String> {
        let recorded = message.or(default_text).unwrap_or_default().to_string();
        append_record(self.backend.as_ref(), DialogKind::Prompt, recorded);
        ResponseQueue::consume_prompt(self.backend.as_ref())
    }
}

/// What a context's `alert`/`confirm`/`prompt` name currently refers to.
///
/// The installing context owns its override set; frames it propagated into
/// only hold weak references.
#[derive(Debug, Clone, Default)]
pub(crate) enum BindingSlot {
    #[default]
    Native,
    Owned(Rc<OverrideSet>),
    Shared(Weak<OverrideSet>),
}

impl BindingSlot {
    pub(crate) fn resolve(&self) -> Option<Rc<OverrideSet>> {
        match self {
            Self::Native => None,
            Self::Owned(set) => Some(Rc::clone(set)),
            Self::Shared(set) => set.upgrade(),
        }
    }

    /// The non-owning form handed to another context.
    pub(crate) fn share(&self) -> Self {
        match self {
            Self::Native => Self::Native,
            Self::Owned(set) => Self::Shared(Rc::downgrade(set)),
            Self::Shared(set) => Self::Shared(Weak::clone(set)),
        }
    }

    pub(crate) fn is_dangling(&self) -> bool {
        matches!(self, Self::Shared(set) if set.strong_count() == 0)
    }

    fn target(&self) -> Option<*const OverrideSet> {
        match self {
            Self::Native => None,
            Self::Owned(set) => Some(Rc::as_ptr(set)),
            Self::Shared(set) => Some(Weak::as_ptr(set)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct DialogBindings {
    pub(crate) alert: BindingSlot,
    pub(crate) confirm: BindingSlot,
    pub(crate) prompt: BindingSlot,
}

impl DialogBindings {
    fn owned(set: &Rc<OverrideSet>) -> Self {
        Self {
            alert: BindingSlot::Owned(Rc::clone(set)),
            confirm: BindingSlot::Owned(Rc::clone(set)),
            prompt: BindingSlot::Owned(Rc::clone(set)),
        }
    }

    pub(crate) fn get(&self, kind: DialogKind) -> &BindingSlot {
        match kind {
            DialogKind::Alert => &self.alert,
            DialogKind::Confirm => &self.confirm,
            DialogKind::Prompt => &self.prompt,
        }
    }

    pub(crate) fn shared(&self) -> Self {
        Self {
            alert: self.alert.share(),
            confirm: self.confirm.share(),
            prompt: self.prompt.share(),
        }
    }
}

/// A snapshot of one dialog binding, compared by identity of the function
/// it refers to.
#[derive(Debug, Clone)]
pub struct DialogBinding(pub(crate) BindingSlot);

impl DialogBinding {
    pub fn is_native(&self) -> bool {
        matches!(self.0, BindingSlot::Native)
    }

    /// True when the binding refers to a live override.
    pub fn is_override(&self) -> bool {
        self.0.resolve().is_some()
    }

    /// True when this context installed the override itself.
    pub fn is_owned(&self) -> bool {
        matches!(self.0, BindingSlot::Owned(_))
    }

    /// True for a borrowed override whose installing context was discarded.
    pub fn is_dangling(&self) -> bool {
        self.0.is_dangling()
    }

    pub fn installer(&self) -> Option<WindowId> {
        self.0.resolve().map(|set| set.installer())
    }
}

impl PartialEq for DialogBinding {
    fn eq(&self, other: &Self) -> bool {
        match (self.0.target(), other.0.target()) {
            (None, None) => true,
            (Some(lhs), Some(rhs)) => std::ptr::eq(lhs, rhs),
            _ => false,
        }
    }
}

/// Per-context installation state.
///
/// Holds the strong reference to the context's own override set, so the set
/// outlives reassignment of the context's bindings and ends only when the
/// context is reloaded or navigated.
#[derive(Debug, Default)]
pub(crate) struct InterceptorContext {
    pub(crate) installed: bool,
    pub(crate) mode: Option<StorageMode>,
    pub(crate) overrides: Option<Rc<OverrideSet>>,
}

impl InterceptorContext {
    /// The override a call through `slot` runs. A borrowed binding whose
    /// installer is gone falls back to this context's own installed set.
    pub(crate) fn dispatch_target(&self, slot: &BindingSlot) -> Option<Rc<OverrideSet>> {
        match slot.resolve() {
            Some(overrides) => Some(overrides),
            None if slot.is_dangling() => self.overrides.clone(),
            None => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum InstallOutcome {
    Installed {
        mode: StorageMode,
        volatile_reason: Option<String>,
    },
    AlreadyInstalled,
}

pub(crate) fn install(window: &mut WindowState) -> InstallOutcome {
    if window.interceptor.installed {
        return InstallOutcome::AlreadyInstalled;
    }
    window.interceptor.installed = true;
    window.globals.set(keys::INSTALLED, Value::Bool(true));

    let capability = try_detect(window.capabilities, &window.local_storage);
    let volatile_reason = match capability {
        Some(_) => None,
        None => unavailable_reason(window.capabilities),
    };
    let backend = select_backend(capability, &window.globals);
    let mode = backend.mode();
    window.interceptor.mode = Some(mode);

    for kind in DialogKind::ALL {
        reset_record(backend.as_ref(), kind);
        ResponseQueue::seed_default(backend.as_ref(), kind);
    }

    let overrides = Rc::new(OverrideSet {
        installer: window.id,
        backend,
    });
    window.bindings = DialogBindings::owned(&overrides);
    window.interceptor.overrides = Some(overrides);

    InstallOutcome::Installed {
        mode,
        volatile_reason,
    }
}
