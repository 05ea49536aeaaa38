use crate::runtime_state::{ElementId, ElementState, WindowId, WindowState};

/// Copies `installer`'s dialog bindings into the context owning `element`.
///
/// Returns the context that received them, or `None` when the element has no
/// live owning context or already belongs to `installer`. Handles are
/// validated by the caller.
pub(crate) fn propagate(
    windows: &mut [WindowState],
    elements: &[ElementState],
    installer: WindowId,
    element: ElementId,
) -> Option<WindowId> {
    let target = elements.get(element.0)?.owner?;
    if target == installer {
        return None;
    }
    let shared = windows.get(installer.0)?.bindings.shared();
    let window = windows.get_mut(target.0).filter(|window| !window.discarded)?;
    window.bindings = shared;
    Some(target)
}
