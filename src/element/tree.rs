//! The element arena: ownership, mutation and dirty tracking.

use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use slotmap::{SecondaryMap, SlotMap};
use tracing::debug;

use super::behavior::Behavior;
use super::node::{Constraints, ElementData, ElementId, ElementKind, ZIndex};
use super::scroll::ScrollState;
use crate::error::EngineError;
use crate::geometry::Region;
use crate::layout::LayoutKind;
use crate::style::{resolve, ComputedStyle, StyleTable, TagSet};

/// Empty slice constant for returning when an element has no children.
const EMPTY_CHILDREN: &[ElementId] = &[];

/// The element tree, backed by a slotmap arena.
///
/// All elements live in a single `SlotMap`. Parent/child relationships are
/// stored in secondary maps; a child refers to its owner only by handle, so
/// removing an element can never leave a dangling reference.
///
/// Every mutation that can affect layout goes through a method here and
/// stamps the element's whole subtree with a fresh generation. Ancestors are
/// flagged so the layout pass knows to descend into them.
pub struct ElementTree {
    nodes: SlotMap<ElementId, ElementData>,
    children: SecondaryMap<ElementId, Vec<ElementId>>,
    parent: SecondaryMap<ElementId, ElementId>,
    keys: HashMap<String, ElementId>,
    root: Option<ElementId>,
    clock: u64,
    table: Rc<StyleTable>,
}

impl ElementTree {
    /// Create an empty tree using the built-in style table.
    pub fn new() -> Self {
        Self::with_style_table(StyleTable::builtin())
    }

    /// Create an empty tree resolving styles against `table`.
    pub fn with_style_table(table: StyleTable) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            children: SecondaryMap::new(),
            parent: SecondaryMap::new(),
            keys: HashMap::new(),
            root: None,
            clock: 0,
            table: Rc::new(table),
        }
    }

    // -----------------------------------------------------------------------
    // Structure
    // -----------------------------------------------------------------------

    /// Insert a detached element. The first element inserted becomes the root.
    pub fn insert(&mut self, data: ElementData) -> ElementId {
        let id = self.alloc(data);
        if self.root.is_none() {
            self.root = Some(id);
        }
        id
    }

    fn alloc(&mut self, data: ElementData) -> ElementId {
        let key = data.key.clone();
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        if let Some(key) = key {
            if let Some(previous) = self.keys.insert(key.clone(), id) {
                debug!(%key, ?previous, "element key reassigned");
            }
        }
        self.mark_dirty(id);
        id
    }

    /// Insert an element as the last child of `parent`.
    pub fn insert_child(
        &mut self,
        parent: ElementId,
        data: ElementData,
    ) -> Result<ElementId, EngineError> {
        self.expect_container(parent)?;
        let id = self.alloc(data);
        self.link(parent, id);
        Ok(id)
    }

    /// Attach an existing element as the last child of `parent`, detaching it
    /// from its previous owner first. The subtree stays intact.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> Result<(), EngineError> {
        self.expect_container(parent)?;
        self.existing(child)?;
        if parent == child || self.ancestors(parent).contains(&child) {
            debug!(?parent, ?child, "rejected cyclic attach");
            return Err(EngineError::WouldCycle { parent, child });
        }
        self.unlink(child);
        if self.root == Some(child) {
            self.root = self.ancestors(parent).last().copied().or(Some(parent));
        }
        self.link(parent, child);
        Ok(())
    }

    /// Move `child` under `new_parent`. Alias for [`append_child`](Self::append_child).
    pub fn reparent(&mut self, child: ElementId, new_parent: ElementId) -> Result<(), EngineError> {
        self.append_child(new_parent, child)
    }

    /// Detach `child` from `parent` without destroying it.
    pub fn detach(&mut self, parent: ElementId, child: ElementId) -> Result<(), EngineError> {
        self.existing(parent)?;
        self.existing(child)?;
        if self.parent.get(child) != Some(&parent) {
            return Err(EngineError::NotAChild { parent, child });
        }
        self.unlink(child);
        Ok(())
    }

    /// Destroy an element and its whole subtree.
    ///
    /// Returns the ids that were removed, root first, so callers can drop
    /// any state keyed by them.
    pub fn remove(&mut self, id: ElementId) -> Result<Vec<ElementId>, EngineError> {
        self.existing(id)?;
        self.unlink(id);
        if self.root == Some(id) {
            self.root = None;
        }

        let mut removed = Vec::new();
        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            if let Some(kids) = self.children.remove(current) {
                queue.extend(kids);
            }
            self.parent.remove(current);
            if let Some(data) = self.nodes.remove(current) {
                if let Some(key) = data.key {
                    if self.keys.get(&key) == Some(&current) {
                        self.keys.remove(&key);
                    }
                }
                removed.push(current);
            }
        }
        debug!(count = removed.len(), "removed subtree");
        Ok(removed)
    }

    fn link(&mut self, parent: ElementId, child: ElementId) {
        self.parent.insert(child, parent);
        if let Some(siblings) = self.children.get_mut(parent) {
            siblings.push(child);
        }
        self.mark_dirty(parent);
    }

    fn unlink(&mut self, child: ElementId) {
        if let Some(old) = self.parent.remove(child) {
            if let Some(siblings) = self.children.get_mut(old) {
                siblings.retain(|&c| c != child);
            }
            self.mark_dirty(old);
            self.mark_dirty(child);
        }
    }

    fn existing(&self, id: ElementId) -> Result<&ElementData, EngineError> {
        self.nodes.get(id).ok_or(EngineError::UnknownElement(id))
    }

    fn expect_container(&self, id: ElementId) -> Result<(), EngineError> {
        if self.existing(id)?.kind.is_container() {
            Ok(())
        } else {
            Err(EngineError::NotAContainer(id))
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.parent.get(id).copied()
    }

    /// Children in insertion order. Empty for leaves and unknown ids.
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(EMPTY_CHILDREN)
    }

    /// Ancestors from the immediate parent up to the root.
    pub fn ancestors(&self, id: ElementId) -> Vec<ElementId> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(p) = self.parent.get(current).copied() {
            result.push(p);
            current = p;
        }
        result
    }

    pub fn get(&self, id: ElementId) -> Option<&ElementData> {
        self.nodes.get(id)
    }

    /// Raw mutable access. Callers are responsible for invalidation.
    pub(crate) fn get_mut(&mut self, id: ElementId) -> Option<&mut ElementData> {
        self.nodes.get_mut(id)
    }

    /// Look an element up by its key.
    pub fn find(&self, key: &str) -> Option<ElementId> {
        self.keys.get(key).copied().filter(|id| self.nodes.contains_key(*id))
    }

    pub fn root(&self) -> Option<ElementId> {
        self.root
    }

    pub fn set_root(&mut self, id: ElementId) -> Result<(), EngineError> {
        self.existing(id)?;
        self.root = Some(id);
        self.mark_dirty(id);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Pre-order depth-first traversal starting from `start`.
    pub fn walk_depth_first(&self, start: ElementId) -> Vec<ElementId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.nodes.contains_key(current) {
                continue;
            }
            result.push(current);
            for &child in self.children(current).iter().rev() {
                stack.push(child);
            }
        }
        result
    }

    /// Depth-first order of the whole tree, or empty without a root.
    pub fn walk(&self) -> Vec<ElementId> {
        self.root.map(|root| self.walk_depth_first(root)).unwrap_or_default()
    }

    /// Whether `id` and every ancestor is visible.
    pub fn is_shown(&self, id: ElementId) -> bool {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .all(|e| self.nodes.get(e).is_some_and(|d| d.visible))
    }

    // -----------------------------------------------------------------------
    // Style
    // -----------------------------------------------------------------------

    pub fn style_table(&self) -> &StyleTable {
        &self.table
    }

    /// Swap the style table. Every element's style is recomputed lazily.
    pub fn set_style_table(&mut self, table: StyleTable) {
        self.table = Rc::new(table);
        let ids: Vec<ElementId> = self.nodes.keys().collect();
        self.clock += 1;
        for id in ids {
            if let Some(data) = self.nodes.get_mut(id) {
                data.generation = self.clock;
                data.child_dirty = true;
            }
        }
    }

    /// The element's computed style, recomputed only if its generation moved.
    pub fn style(&self, id: ElementId) -> Option<Rc<ComputedStyle>> {
        let data = self.nodes.get(id)?;
        let mut memo = data.style.borrow_mut();
        match memo.as_ref() {
            Some((generation, style)) if *generation == data.generation => Some(Rc::clone(style)),
            _ => {
                let style = Rc::new(resolve(&data.tags, &self.table));
                *memo = Some((data.generation, Rc::clone(&style)));
                Some(style)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Invalidation
    // -----------------------------------------------------------------------

    /// Stamp `id` and its descendants with a fresh generation and flag every
    /// ancestor as holding a dirty child.
    pub fn mark_dirty(&mut self, id: ElementId) {
        if !self.nodes.contains_key(id) {
            return;
        }
        self.clock += 1;
        let generation = self.clock;
        for e in self.walk_depth_first(id) {
            if let Some(data) = self.nodes.get_mut(e) {
                data.generation = generation;
            }
        }
        let mut current = id;
        while let Some(p) = self.parent.get(current).copied() {
            if let Some(data) = self.nodes.get_mut(p) {
                data.child_dirty = true;
            }
            current = p;
        }
    }

    /// Whether anything in the tree needs a layout pass.
    pub fn needs_layout(&self) -> bool {
        self.root
            .and_then(|r| self.nodes.get(r))
            .is_some_and(|d| d.is_dirty() || d.child_dirty)
    }

    pub(crate) fn mark_laid_out(&mut self, id: ElementId) {
        if let Some(data) = self.nodes.get_mut(id) {
            data.laid_out = Some(data.generation);
            data.child_dirty = false;
        }
    }

    fn update(
        &mut self,
        id: ElementId,
        f: impl FnOnce(&mut ElementData) -> bool,
    ) -> Result<(), EngineError> {
        let data = self.nodes.get_mut(id).ok_or(EngineError::UnknownElement(id))?;
        if f(data) {
            self.mark_dirty(id);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Set the requested box.
    pub fn set_rect(&mut self, id: ElementId, rect: Region) -> Result<(), EngineError> {
        self.update(id, |d| std::mem::replace(&mut d.requested, rect) != rect)
    }

    pub fn set_position(&mut self, id: ElementId, x: i32, y: i32) -> Result<(), EngineError> {
        self.update(id, |d| {
            let changed = d.requested.x != x || d.requested.y != y;
            d.requested.x = x;
            d.requested.y = y;
            changed
        })
    }

    pub fn set_size(&mut self, id: ElementId, width: i32, height: i32) -> Result<(), EngineError> {
        self.update(id, |d| {
            let changed = d.requested.width != width || d.requested.height != height;
            d.requested.width = width;
            d.requested.height = height;
            changed
        })
    }

    /// Replace the whole tag set.
    pub fn set_tags(&mut self, id: ElementId, tags: TagSet) -> Result<(), EngineError> {
        self.update(id, |d| std::mem::replace(&mut d.tags, tags) != d.tags)
    }

    /// Add every tag in a class string.
    pub fn add_tags(&mut self, id: ElementId, classes: &str) -> Result<(), EngineError> {
        self.update(id, |d| {
            let before = d.tags.len();
            d.tags.extend_str(classes);
            d.tags.len() != before
        })
    }

    /// Remove every tag in a class string.
    pub fn remove_tags(&mut self, id: ElementId, classes: &str) -> Result<(), EngineError> {
        let doomed = TagSet::parse(classes);
        self.update(id, |d| {
            let mut changed = false;
            for tag in doomed.iter() {
                changed |= d.tags.remove(tag);
            }
            changed
        })
    }

    pub fn set_constraints(
        &mut self,
        id: ElementId,
        constraints: Constraints,
    ) -> Result<(), EngineError> {
        self.update(id, |d| std::mem::replace(&mut d.constraints, constraints) != constraints)
    }

    pub fn set_z_index(&mut self, id: ElementId, z: ZIndex) -> Result<(), EngineError> {
        self.update(id, |d| std::mem::replace(&mut d.z, z) != z)
    }

    pub fn set_visible(&mut self, id: ElementId, visible: bool) -> Result<(), EngineError> {
        self.update(id, |d| std::mem::replace(&mut d.visible, visible) != visible)
    }

    /// Enable or disable input. Does not affect layout.
    pub fn set_enabled(&mut self, id: ElementId, enabled: bool) -> Result<(), EngineError> {
        self.update(id, |d| {
            d.enabled = enabled;
            false
        })
    }

    pub fn set_focusable(&mut self, id: ElementId, focusable: bool) -> Result<(), EngineError> {
        self.update(id, |d| {
            d.focusable = focusable;
            false
        })
    }

    /// Replace a text leaf's content.
    pub fn set_text(&mut self, id: ElementId, text: &str) -> Result<(), EngineError> {
        self.update(id, |d| match &mut d.kind {
            ElementKind::Text(content) if content.text != text => {
                content.text = text.to_owned();
                true
            }
            _ => false,
        })
    }

    /// Change a container's child layout.
    pub fn set_layout(&mut self, id: ElementId, layout: LayoutKind) -> Result<(), EngineError> {
        self.expect_container(id)?;
        self.update(id, |d| match &mut d.kind {
            ElementKind::Container(current) | ElementKind::Scroll { layout: current, .. } => {
                std::mem::replace(current, layout) != layout
            }
            _ => false,
        })
    }

    /// Attach or replace an element's behavior.
    pub fn set_behavior(
        &mut self,
        id: ElementId,
        behavior: impl Behavior + 'static,
    ) -> Result<(), EngineError> {
        self.update(id, |d| {
            d.behavior = Some(Box::new(behavior));
            false
        })
    }

    /// Mutable access to an element's behavior.
    pub fn behavior_mut(&mut self, id: ElementId) -> Option<&mut (dyn Behavior + 'static)> {
        self.nodes.get_mut(id)?.behavior_mut()
    }

    /// Downcast an element's behavior.
    pub fn behavior_as<T: 'static>(&self, id: ElementId) -> Option<&T> {
        self.nodes.get(id)?.behavior()?.as_any().downcast_ref::<T>()
    }

    /// Scroll state of a scroll container.
    pub fn scroll_state(&self, id: ElementId) -> Option<&ScrollState> {
        self.nodes.get(id)?.kind.scroll()
    }

    /// Mutate a scroll container's state. Children are re-laid out if the
    /// offset moved. Returns `Ok(None)` for non-scroll elements.
    pub fn with_scroll<R>(
        &mut self,
        id: ElementId,
        f: impl FnOnce(&mut ScrollState) -> R,
    ) -> Result<Option<R>, EngineError> {
        let data = self.nodes.get_mut(id).ok_or(EngineError::UnknownElement(id))?;
        let Some(state) = data.kind.scroll_mut() else {
            return Ok(None);
        };
        let before = state.offset;
        let result = f(state);
        if state.offset != before {
            self.mark_dirty(id);
        }
        Ok(Some(result))
    }
}

impl Default for ElementTree {
    fn default() -> Self {
        Self::new()
    }
}
