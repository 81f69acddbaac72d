//! Scene of mounted graphics and attached off-screen surfaces
//!
//! Renderers mount their vector output under a well-known identifier so later
//! callbacks (export) can find it again. Off-screen raster surfaces are
//! attached to the scene only through [`SurfaceGuard`], which detaches them
//! when dropped.
//!
//! The scene lives on the UI thread; interior mutability is `RefCell`, not a
//! lock.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::ops::{Deref, DerefMut};

use tiny_skia::{Color, Pixmap};

use crate::domain::core::SurfaceSize;

/// Vector output of a renderer, kept as SVG markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorGraphic {
    /// Identifier the graphic is mounted under
    pub id: String,
    /// Full SVG markup, root element included
    pub markup: String,
}

impl VectorGraphic {
    pub fn new(id: impl Into<String>, markup: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            markup: markup.into(),
        }
    }
}

/// Identifier of an attached surface
pub type SurfaceId = u64;

#[derive(Debug, Default)]
pub struct Scene {
    graphics: HashMap<String, VectorGraphic>,
    surfaces: RefCell<BTreeMap<SurfaceId, SurfaceSize>>,
    next_surface: Cell<SurfaceId>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mounts a graphic, replacing any graphic with the same id
    pub fn mount(&mut self, graphic: VectorGraphic) {
        tracing::trace!(id = %graphic.id, bytes = graphic.markup.len(), "mounted graphic");
        self.graphics.insert(graphic.id.clone(), graphic);
    }

    /// Removes a mounted graphic, returning it if it was present
    pub fn unmount(&mut self, id: &str) -> Option<VectorGraphic> {
        let removed = self.graphics.remove(id);
        if removed.is_some() {
            tracing::trace!(id, "unmounted graphic");
        }
        removed
    }

    /// Looks a mounted graphic up by identifier
    pub fn find(&self, id: &str) -> Option<&VectorGraphic> {
        self.graphics.get(id)
    }

    pub fn is_mounted(&self, id: &str) -> bool {
        self.graphics.contains_key(id)
    }

    /// Allocates an off-screen surface and attaches it to the scene
    ///
    /// The surface starts filled with opaque white. Returns `None` when the
    /// size cannot be allocated (zero or oversized dimensions).
    pub fn attach_surface(&self, size: SurfaceSize) -> Option<SurfaceGuard<'_>> {
        let mut pixmap = Pixmap::new(size.width, size.height)?;
        pixmap.fill(Color::WHITE);

        let id = self.next_surface.get();
        self.next_surface.set(id + 1);
        self.surfaces.borrow_mut().insert(id, size);
        tracing::debug!(id, width = size.width, height = size.height, "attached raster surface");

        Some(SurfaceGuard {
            scene: self,
            id,
            pixmap,
        })
    }

    /// Number of surfaces currently attached
    pub fn attached_surfaces(&self) -> usize {
        self.surfaces.borrow().len()
    }

    fn detach_surface(&self, id: SurfaceId) {
        if self.surfaces.borrow_mut().remove(&id).is_some() {
            tracing::debug!(id, "detached raster surface");
        }
    }
}

/// RAII wrapper for an attached raster surface
///
/// Detaches the surface from its scene on drop, whichever way the owning
/// scope is left.
#[derive(Debug)]
pub struct SurfaceGuard<'a> {
    scene: &'a Scene,
    id: SurfaceId,
    pixmap: Pixmap,
}

impl SurfaceGuard<'_> {
    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn size(&self) -> SurfaceSize {
        SurfaceSize::new(self.pixmap.width(), self.pixmap.height())
    }
}

impl Deref for SurfaceGuard<'_> {
    type Target = Pixmap;

    fn deref(&self) -> &Pixmap {
        &self.pixmap
    }
}

impl DerefMut for SurfaceGuard<'_> {
    fn deref_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }
}

impl Drop for SurfaceGuard<'_> {
    fn drop(&mut self) {
        self.scene.detach_surface(self.id);
    }
}
