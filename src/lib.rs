//! Instrumented stand-ins for a page's `alert`, `confirm` and `prompt`.
//!
//! A [`Page`] models the execution contexts of a page under remote-controlled
//! automation. Installing the interceptor in a context replaces its native
//! dialog bindings with recording versions whose state lives either in the
//! origin's localStorage (durable, survives reload) or on the context's
//! global scope (volatile). Responses for `prompt` are queued by the driver
//! and consumed once.
//!
//! ```
//! use dialog_interceptor::{DialogKind, Page, PageConfig};
//!
//! let mut page = Page::new(PageConfig::default())?;
//! let top = page.top_window();
//! page.replace_alert_method(top, None)?;
//! page.answer_on_next_prompt(top, "Taro")?;
//!
//! page.alert(top, "saved")?;
//! assert_eq!(page.prompt(top, Some("name?"), None)?, Some("Taro".to_string()));
//! assert_eq!(page.prompt(top, Some("again?"), None)?, Some(String::new()));
//! assert_eq!(page.recorded_messages(top, DialogKind::Alert)?, vec!["saved"]);
//! # Ok::<(), dialog_interceptor::Error>(())
//! ```

use std::error::Error as StdError;
use std::fmt;

mod capability;
mod dialog;
mod frame_sync;
mod interceptor;
mod page;
mod runtime_state;
mod runtime_values;
mod script;
mod storage;

#[cfg(test)]
mod tests;

pub use capability::{Availability, PlatformCapabilities};
pub use dialog::DialogKind;
pub use interceptor::DialogBinding;
pub use page::{FrameHandle, FrameOptions, NativeDialog, Page, PageConfig};
pub use runtime_state::{ElementId, StorageMode, WindowId};
pub use runtime_values::Value;
pub use script::ScriptCommand;
pub use storage::keys;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    ScriptParse(String),
    ScriptRuntime(String),
    UnknownWindow(usize),
    UnknownElement(usize),
    InvalidConfig(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScriptParse(msg) => write!(f, "script parse error: {msg}"),
            Self::ScriptRuntime(msg) => write!(f, "script runtime error: {msg}"),
            Self::UnknownWindow(id) => write!(f, "unknown window: {id}"),
            Self::UnknownElement(id) => write!(f, "unknown element: {id}"),
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl StdError for Error {}
