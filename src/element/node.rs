//! Element types: ElementId, ElementData, ElementKind, z-index and constraints.

use std::cell::RefCell;
use std::rc::Rc;

use slotmap::new_key_type;

use super::behavior::Behavior;
use super::scroll::ScrollState;
use crate::geometry::{ClipBounds, Region, Size};
use crate::layout::LayoutKind;
use crate::style::{ComputedStyle, TagSet};

new_key_type! {
    /// Stable handle to an element in the tree. Copy, lightweight (u64).
    pub struct ElementId;
}

// ---------------------------------------------------------------------------
// Z-index
// ---------------------------------------------------------------------------

/// Coarse stacking layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Layer {
    Background,
    #[default]
    Content,
    Overlay,
    Modal,
    Tooltip,
    Debug,
}

/// Stacking order: layer first, then priority within the layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ZIndex {
    pub layer: Layer,
    pub priority: i32,
}

impl ZIndex {
    pub const fn new(layer: Layer, priority: i32) -> Self {
        Self { layer, priority }
    }

    /// Raise this index's layer to at least `parent`'s layer.
    pub fn within(self, parent: ZIndex) -> ZIndex {
        ZIndex { layer: self.layer.max(parent.layer), priority: self.priority }
    }
}

// ---------------------------------------------------------------------------
// Constraints
// ---------------------------------------------------------------------------

/// Optional explicit size constraints.
///
/// Percentages are of the parent's content box and replace the requested
/// size; min/max clamp whatever size results.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Constraints {
    pub min_width: Option<i32>,
    pub max_width: Option<i32>,
    pub min_height: Option<i32>,
    pub max_height: Option<i32>,
    pub width_percent: Option<f32>,
    pub height_percent: Option<f32>,
}

impl Constraints {
    pub fn is_empty(&self) -> bool {
        *self == Constraints::default()
    }

    /// Apply percentages against `parent` and then min/max to `size`.
    pub fn apply(&self, size: Size, parent: Size) -> Size {
        let percent = |pct: Option<f32>, extent: i32, fallback: i32| match pct {
            Some(p) => (extent as f32 * p / 100.0).floor() as i32,
            None => fallback,
        };
        let clamp = |value: i32, min: Option<i32>, max: Option<i32>| {
            let value = max.map_or(value, |m| value.min(m));
            min.map_or(value, |m| value.max(m)).max(0)
        };
        Size::new(
            clamp(
                percent(self.width_percent, parent.width, size.width),
                self.min_width,
                self.max_width,
            ),
            clamp(
                percent(self.height_percent, parent.height, size.height),
                self.min_height,
                self.max_height,
            ),
        )
    }
}

// ---------------------------------------------------------------------------
// Kind
// ---------------------------------------------------------------------------

/// A text leaf's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextContent {
    pub text: String,
    /// Wrap to the available width instead of taking the natural width.
    pub wrap: bool,
}

/// The closed set of element variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Leaf,
    Text(TextContent),
    Container(LayoutKind),
    /// A container whose children are laid out inside a scrolled viewport
    /// and clipped to it.
    Scroll { layout: LayoutKind, state: ScrollState },
}

impl ElementKind {
    /// Whether this variant may own children.
    pub fn is_container(&self) -> bool {
        matches!(self, ElementKind::Container(_) | ElementKind::Scroll { .. })
    }

    /// The child layout, for containers.
    pub fn layout(&self) -> Option<LayoutKind> {
        match self {
            ElementKind::Container(layout) | ElementKind::Scroll { layout, .. } => Some(*layout),
            _ => None,
        }
    }

    pub fn scroll(&self) -> Option<&ScrollState> {
        match self {
            ElementKind::Scroll { state, .. } => Some(state),
            _ => None,
        }
    }

    pub fn scroll_mut(&mut self) -> Option<&mut ScrollState> {
        match self {
            ElementKind::Scroll { state, .. } => Some(state),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ElementData
// ---------------------------------------------------------------------------

/// Style memo keyed by the generation it was computed at.
pub(crate) type StyleMemo = RefCell<Option<(u64, Rc<ComputedStyle>)>>;

/// Data associated with a single element.
pub struct ElementData {
    /// Optional lookup key.
    pub key: Option<String>,
    pub kind: ElementKind,
    pub(crate) requested: Region,
    pub(crate) tags: TagSet,
    pub(crate) constraints: Constraints,
    pub(crate) z: ZIndex,
    pub(crate) visible: bool,
    pub(crate) enabled: bool,
    pub(crate) focusable: bool,
    pub(crate) behavior: Option<Box<dyn Behavior>>,

    // Layout output.
    pub(crate) calculated: Region,
    pub(crate) clip: ClipBounds,
    pub(crate) effective_z: ZIndex,

    // Interaction state, owned by the dispatcher and paint pass.
    pub(crate) hovered: bool,
    pub(crate) focused: bool,
    pub(crate) rendered: bool,

    // Invalidation.
    pub(crate) generation: u64,
    pub(crate) laid_out: Option<u64>,
    pub(crate) child_dirty: bool,
    pub(crate) style: StyleMemo,
}

impl ElementData {
    /// A new element of the given kind with sensible defaults.
    pub fn new(kind: ElementKind) -> Self {
        Self {
            key: None,
            kind,
            requested: Region::EMPTY,
            tags: TagSet::new(),
            constraints: Constraints::default(),
            z: ZIndex::default(),
            visible: true,
            enabled: true,
            focusable: false,
            behavior: None,
            calculated: Region::EMPTY,
            clip: ClipBounds::INVALID,
            effective_z: ZIndex::default(),
            hovered: false,
            focused: false,
            rendered: false,
            generation: 0,
            laid_out: None,
            child_dirty: false,
            style: RefCell::new(None),
        }
    }

    pub fn leaf() -> Self {
        Self::new(ElementKind::Leaf)
    }

    pub fn container(layout: LayoutKind) -> Self {
        Self::new(ElementKind::Container(layout))
    }

    pub fn scroll(layout: LayoutKind, state: ScrollState) -> Self {
        Self::new(ElementKind::Scroll { layout, state })
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(ElementKind::Text(TextContent { text: text.into(), wrap: false }))
    }

    /// Text that wraps to the width it is given.
    pub fn wrapped_text(text: impl Into<String>) -> Self {
        Self::new(ElementKind::Text(TextContent { text: text.into(), wrap: true }))
    }

    /// Set the lookup key (builder).
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Add tags from a class string (builder).
    pub fn with_tags(mut self, classes: &str) -> Self {
        self.tags.extend_str(classes);
        self
    }

    /// Set the requested box (builder).
    pub fn with_rect(mut self, rect: Region) -> Self {
        self.requested = rect;
        self
    }

    /// Set the requested size, keeping position (builder).
    pub fn with_size(mut self, width: i32, height: i32) -> Self {
        self.requested.width = width;
        self.requested.height = height;
        self
    }

    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_z(mut self, z: ZIndex) -> Self {
        self.z = z;
        self
    }

    pub fn focusable(mut self, focusable: bool) -> Self {
        self.focusable = focusable;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Attach interaction/paint hooks (builder).
    pub fn with_behavior(mut self, behavior: impl Behavior + 'static) -> Self {
        self.behavior = Some(Box::new(behavior));
        self
    }

    // -- read accessors ---------------------------------------------------

    pub fn requested(&self) -> Region {
        self.requested
    }

    /// Post-layout box. Only trustworthy once the element is clean.
    pub fn calculated(&self) -> Region {
        self.calculated
    }

    /// Effective clip after intersecting with every ancestor's clip.
    pub fn clip(&self) -> ClipBounds {
        self.clip
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    pub fn constraints(&self) -> Constraints {
        self.constraints
    }

    pub fn z_index(&self) -> ZIndex {
        self.z
    }

    /// Z-index after inheriting the parent's layer.
    pub fn effective_z(&self) -> ZIndex {
        self.effective_z
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_focusable(&self) -> bool {
        self.focusable
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Whether the last paint pass drew this element.
    pub fn was_rendered(&self) -> bool {
        self.rendered
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether calculated geometry is stale.
    pub fn is_dirty(&self) -> bool {
        self.laid_out != Some(self.generation)
    }

    pub fn behavior(&self) -> Option<&dyn Behavior> {
        self.behavior.as_deref()
    }

    pub fn behavior_mut(&mut self) -> Option<&mut (dyn Behavior + 'static)> {
        self.behavior.as_deref_mut()
    }

    /// Visible, enabled, and either reacts to input or can take focus.
    pub fn is_interactable(&self) -> bool {
        self.visible && self.enabled && (self.behavior.is_some() || self.focusable)
    }
}

impl std::fmt::Debug for ElementData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementData")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("requested", &self.requested)
            .field("calculated", &self.calculated)
            .field("tags", &self.tags)
            .field("z", &self.z)
            .field("visible", &self.visible)
            .field("enabled", &self.enabled)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}
