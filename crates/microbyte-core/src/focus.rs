//! Focus scope stack.
//!
//! Every open screen or dialog owns one [`FocusScope`]. Only the top scope
//! sees keys; the scopes underneath keep their widgets and focus so a cancel
//! can return to them without rebuilding anything.

use heapless::Vec;
use log::debug;

use crate::{
    input::LogicalKey,
    toolkit::{NavigableItem, Toolkit},
};

pub const MAX_SCOPE_DEPTH: usize = 8;
pub const MAX_SCOPE_ITEMS: usize = 100;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScopeError {
    DepthExceeded,
    TooManyItems,
    Toolkit,
}

/// Widget handle plus the identity assigned when it was created.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ScopeItem<T> {
    pub item: NavigableItem,
    pub tag: T,
}

/// Outcome of routing one key to the top scope.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Routed<T> {
    Moved { index: usize },
    /// Focus sits on the first or last item already.
    Unchanged,
    Ignored,
    Activate(T),
    Cancel(Option<T>),
    Adjust { key: LogicalKey, tag: T },
}

#[derive(Debug)]
pub struct FocusScope<K, T> {
    kind: K,
    container: Option<NavigableItem>,
    items: Vec<ScopeItem<T>, MAX_SCOPE_ITEMS>,
    focused: Option<usize>,
    hide_parent: bool,
}

impl<K: Copy, T: Copy> FocusScope<K, T> {
    pub fn new(kind: K, container: Option<NavigableItem>) -> Self {
        Self {
            kind,
            container,
            items: Vec::new(),
            focused: None,
            hide_parent: false,
        }
    }

    /// Hide the parent scope's widgets while this scope is on top.
    pub fn hiding_parent(mut self) -> Self {
        self.hide_parent = true;
        self
    }

    pub fn push_item(&mut self, item: NavigableItem, tag: T) -> Result<(), ScopeError> {
        self.items
            .push(ScopeItem { item, tag })
            .map_err(|_| ScopeError::TooManyItems)
    }

    pub fn kind(&self) -> K {
        self.kind
    }

    pub fn container(&self) -> Option<NavigableItem> {
        self.container
    }

    pub fn items(&self) -> &[ScopeItem<T>] {
        &self.items
    }

    pub fn focused_index(&self) -> Option<usize> {
        self.focused
    }

    pub fn focused(&self) -> Option<ScopeItem<T>> {
        self.focused.and_then(|index| self.items.get(index).copied())
    }

    /// Hand every widget of this scope back to the toolkit.
    pub fn release<TK: Toolkit>(self, toolkit: &mut TK) {
        for entry in &self.items {
            toolkit.destroy(entry.item);
        }
        if let Some(container) = self.container {
            toolkit.destroy(container);
        }
    }

    fn position_of(&self, item: NavigableItem) -> Option<usize> {
        self.items.iter().position(|entry| entry.item == item)
    }

    fn set_visible<TK: Toolkit>(&self, toolkit: &mut TK, visible: bool) {
        match self.container {
            Some(container) => toolkit.set_visible(container, visible),
            None => {
                for entry in &self.items {
                    toolkit.set_visible(entry.item, visible);
                }
            }
        }
    }
}

#[derive(Debug)]
pub struct ScopeStack<K, T> {
    scopes: Vec<FocusScope<K, T>, MAX_SCOPE_DEPTH>,
}

impl<K: Copy + core::fmt::Debug, T: Copy> ScopeStack<K, T> {
    pub const fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn top(&self) -> Option<&FocusScope<K, T>> {
        self.scopes.last()
    }

    pub fn top_kind(&self) -> Option<K> {
        self.top().map(FocusScope::kind)
    }

    pub fn focused(&self) -> Option<ScopeItem<T>> {
        self.top().and_then(FocusScope::focused)
    }

    pub fn focused_tag(&self) -> Option<T> {
        self.focused().map(|entry| entry.tag)
    }

    pub fn focused_index(&self) -> Option<usize> {
        self.top().and_then(FocusScope::focused_index)
    }

    /// Make `scope` the new top with `initial_focus` focused.
    ///
    /// The previous top keeps its widgets and focus. On failure the scope's
    /// widgets are released before the error is returned.
    pub fn push_scope<TK: Toolkit>(
        &mut self,
        toolkit: &mut TK,
        mut scope: FocusScope<K, T>,
        initial_focus: Option<NavigableItem>,
    ) -> Result<(), ScopeError> {
        if self.scopes.is_full() {
            scope.release(toolkit);
            return Err(ScopeError::DepthExceeded);
        }

        scope.focused = initial_focus.map(|item| {
            let index = scope.position_of(item);
            assert!(index.is_some(), "initial focus outside pushed scope");
            index.unwrap_or_default()
        });
        if scope.focused.is_none() && !scope.items.is_empty() {
            scope.focused = Some(0);
        }

        if scope.hide_parent {
            if let Some(parent) = self.scopes.last() {
                parent.set_visible(toolkit, false);
            }
        }

        debug!(
            "ui-nav: push scope kind={:?} items={} depth={}",
            scope.kind,
            scope.items.len(),
            self.scopes.len() + 1
        );
        // Fullness checked above.
        let _ = self.scopes.push(scope);
        Ok(())
    }

    /// Close the top scope and return its kind. No-op at depth 1 or below.
    pub fn pop_scope<TK: Toolkit>(&mut self, toolkit: &mut TK) -> Option<K> {
        if self.scopes.len() <= 1 {
            return None;
        }

        let scope = self.scopes.pop()?;
        let kind = scope.kind;
        let hid_parent = scope.hide_parent;
        scope.release(toolkit);

        if hid_parent {
            if let Some(parent) = self.scopes.last() {
                parent.set_visible(toolkit, true);
            }
        }

        debug!(
            "ui-nav: pop scope kind={:?} depth={} focus={:?}",
            kind,
            self.scopes.len(),
            self.focused_index()
        );
        Some(kind)
    }

    /// Pop until only the root scope remains.
    pub fn unwind_to_root<TK: Toolkit>(&mut self, toolkit: &mut TK) {
        while self.pop_scope(toolkit).is_some() {}
    }

    pub fn route(&mut self, key: LogicalKey) -> Routed<T> {
        let Some(scope) = self.scopes.last_mut() else {
            return Routed::Ignored;
        };
        let focused = scope.focused();

        match key {
            LogicalKey::Next | LogicalKey::Prev => {
                let Some(current) = scope.focused else {
                    return Routed::Ignored;
                };
                let target = if key == LogicalKey::Next {
                    current + 1
                } else {
                    match current.checked_sub(1) {
                        Some(target) => target,
                        None => return Routed::Unchanged,
                    }
                };
                if target >= scope.items.len() {
                    return Routed::Unchanged;
                }
                scope.focused = Some(target);
                Routed::Moved { index: target }
            }
            LogicalKey::Enter => match focused {
                Some(entry) => Routed::Activate(entry.tag),
                None => Routed::Ignored,
            },
            LogicalKey::Cancel => Routed::Cancel(focused.map(|entry| entry.tag)),
            LogicalKey::Left | LogicalKey::Right => match focused {
                Some(entry) => Routed::Adjust {
                    key,
                    tag: entry.tag,
                },
                None => Routed::Ignored,
            },
        }
    }

    /// Focus `index` in the top scope, clamped to its last item.
    pub fn focus_index(&mut self, index: usize) {
        if let Some(scope) = self.scopes.last_mut() {
            if !scope.items.is_empty() {
                scope.focused = Some(index.min(scope.items.len() - 1));
            }
        }
    }

    /// Remove `item` from the top scope and destroy its widget.
    ///
    /// Focus stays on the same position, or the new last item when the tail
    /// was removed.
    pub fn remove_item<TK: Toolkit>(&mut self, toolkit: &mut TK, item: NavigableItem) {
        let scope = self.scopes.last_mut();
        let position = scope
            .as_ref()
            .and_then(|scope| scope.position_of(item));
        assert!(position.is_some(), "removed item outside top scope");
        let (Some(scope), Some(position)) = (scope, position) else {
            return;
        };

        scope.items.remove(position);
        toolkit.destroy(item);

        scope.focused = match scope.focused {
            _ if scope.items.is_empty() => None,
            Some(focused) if focused > position => Some(focused - 1),
            Some(focused) => Some(focused.min(scope.items.len() - 1)),
            None => None,
        };
    }
}

impl<K: Copy + core::fmt::Debug, T: Copy> Default for ScopeStack<K, T> {
    fn default() -> Self {
        Self::new()
    }
}
