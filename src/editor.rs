//! Editor facades and the shared collection handle.
//!
//! Two front-ends (a compact inline view and a full modal view) edit the
//! same [`BoxCollection`]. Instead of ambient globals, both facades
//! receive an explicit [`SharedCollection`] handle at construction;
//! mutations raise the subscribers' redraw flags, and whole-content
//! replacement (cancel/restore) additionally bumps a generation counter
//! the facades re-sync against before rendering.

use std::cell::{Cell, Ref, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use image::RgbaImage;

use crate::error::EditorError;
use crate::geometry::ViewTransform;
use crate::interaction::{DefaultClass, InteractionController, PointerEvent};
use crate::model::{BoxCollection, ClassLabels};
use crate::persist::{SavePayload, SaveTracker, SaveTransport};
use crate::render::RenderSurface;

/// Shared, single-owner handle to the box collection.
///
/// The `Rc` identity is stable for the lifetime of the page session;
/// cancel/restore swaps the *contents* in place and bumps the
/// generation, so facades never need re-pointing.
#[derive(Clone)]
pub struct SharedCollection {
    inner: Rc<RefCell<BoxCollection>>,
    generation: Rc<Cell<u64>>,
    redraw_flags: Rc<RefCell<Vec<Rc<Cell<bool>>>>>,
}

impl SharedCollection {
    pub fn new(collection: BoxCollection) -> Self {
        Self {
            inner: Rc::new(RefCell::new(collection)),
            generation: Rc::new(Cell::new(0)),
            redraw_flags: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Register a subscriber; the returned flag is raised after every
    /// mutation made through this handle.
    pub fn subscribe(&self) -> Rc<Cell<bool>> {
        let flag = Rc::new(Cell::new(true));
        self.redraw_flags.borrow_mut().push(Rc::clone(&flag));
        flag
    }

    /// Read access.
    pub fn read(&self) -> Ref<'_, BoxCollection> {
        self.inner.borrow()
    }

    /// Run a mutation and notify all subscribers.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut BoxCollection) -> R) -> R {
        let result = f(&mut self.inner.borrow_mut());
        self.notify();
        result
    }

    /// Replace the collection contents wholesale (cancel/restore). The
    /// generation bump tells facades their cached view is logically new.
    pub fn replace_contents(&self, collection: BoxCollection) {
        *self.inner.borrow_mut() = collection;
        self.generation.set(self.generation.get() + 1);
        self.notify();
        log::debug!("🔄 Collection contents replaced (gen {})", self.generation.get());
    }

    /// Generation counter, incremented on whole-content replacement.
    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    fn notify(&self) {
        for flag in self.redraw_flags.borrow().iter() {
            flag.set(true);
        }
    }
}

/// Which presentation a facade drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacadeKind {
    /// Compact always-visible editor.
    Inline,
    /// Full editor shown in a modal session.
    Modal,
}

/// Binds one render surface and one interaction controller to the shared
/// collection; exposes selection, class assignment, snapshot/restore and
/// remote persistence to the surrounding UI controls.
pub struct EditorFacade {
    kind: FacadeKind,
    shared: SharedCollection,
    surface: RenderSurface,
    controller: InteractionController,
    default_class: Box<dyn DefaultClass>,
    labels: ClassLabels,
    transport: Rc<dyn SaveTransport>,
    tracker: SaveTracker,
    /// Deep copy taken at `open`; replaced after every successful save.
    snapshot: Option<BoxCollection>,
    /// Collection state captured at each `begin_save`, keyed by sequence
    /// number. The baseline after a successful completion is the state
    /// that was actually sent, not the live collection, which may have
    /// been edited while the request was in flight.
    pending_saves: HashMap<u64, BoxCollection>,
    redraw: Rc<Cell<bool>>,
    seen_generation: u64,
    open: bool,
    /// Pending user-visible persistence notification, if any.
    notification: Option<String>,
}

impl EditorFacade {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kind: FacadeKind,
        shared: SharedCollection,
        transport: Rc<dyn SaveTransport>,
        default_class: Box<dyn DefaultClass>,
        labels: ClassLabels,
        transform: ViewTransform,
        image_w: f32,
        image_h: f32,
    ) -> Self {
        let redraw = shared.subscribe();
        let seen_generation = shared.generation();
        Self {
            kind,
            shared,
            surface: RenderSurface::new(),
            controller: InteractionController::new(transform, image_w, image_h),
            default_class,
            labels,
            transport,
            tracker: SaveTracker::new(),
            snapshot: None,
            pending_saves: HashMap::new(),
            redraw,
            seen_generation,
            open: false,
            notification: None,
        }
    }

    pub fn kind(&self) -> FacadeKind {
        self.kind
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Start an editing session: snapshot the collection for cancel and
    /// set the initial selection.
    pub fn open(&mut self, index: Option<usize>) {
        self.snapshot = Some(self.shared.read().clone());
        self.shared.with_mut(|c| c.select(index));
        self.open = true;
        log::debug!("📝 {:?} editor opened (selection {:?})", self.kind, index);
    }

    /// Select a box. A no-op when the index is not currently visible.
    pub fn select_box(&mut self, index: usize) {
        self.shared.with_mut(|c| {
            if c.is_visible(index) {
                c.select(Some(index));
            }
        });
    }

    /// Display string for the selected box's class, falling back to
    /// class 0 when no label was ever set.
    pub fn selected_label_display(&self) -> Option<String> {
        let c = self.shared.read();
        let sel = c.selection()?;
        Some(self.labels.display(c.label(sel).unwrap_or(0)))
    }

    /// Whether the selected box carries the crowd flag.
    pub fn selected_crowd(&self) -> Option<bool> {
        let c = self.shared.read();
        c.crowd(c.selection()?)
    }

    pub fn set_label(&mut self, index: usize, label: i32) {
        self.shared.with_mut(|c| {
            let result = c.update_label(index, label);
            Self::recover_index(c, result);
        });
    }

    pub fn set_crowd(&mut self, index: usize, flag: bool) {
        self.shared.with_mut(|c| {
            let result = c.update_crowd(index, flag);
            Self::recover_index(c, result);
        });
    }

    /// Delete the selected box, if any. Selection resets to none.
    pub fn delete_selected(&mut self) {
        self.shared.with_mut(|c| {
            if let Some(sel) = c.selection() {
                let result = c.delete_box(sel);
                Self::recover_index(c, result);
            }
            c.select(None);
        });
    }

    /// Delete every box. Selection resets to none.
    pub fn delete_all(&mut self) {
        self.shared.with_mut(|c| c.delete_all());
    }

    /// Stale-index recovery: reset selection, never surface to the user.
    fn recover_index(c: &mut BoxCollection, result: crate::error::Result<()>) {
        if let Err(e @ EditorError::IndexOutOfRange { .. }) = result {
            log::warn!("⚠️ {} - resetting selection", e);
            c.select(None);
        } else if let Err(e) = result {
            log::error!("❗ {}", e);
        }
    }

    /// Feed a pointer event through the gesture state machine.
    pub fn pointer(&mut self, event: PointerEvent) {
        let controller = &mut self.controller;
        let default_class = self.default_class.as_ref();
        self.shared
            .with_mut(|c| controller.handle(event, c, default_class));
    }

    /// Replace the view transform (container resize, modal layout).
    pub fn set_transform(&mut self, transform: ViewTransform) {
        self.controller.set_transform(transform);
        self.redraw.set(true);
    }

    /// Whether this facade needs to redraw (mutation since last render or
    /// a whole-content replacement it has not observed yet).
    pub fn needs_redraw(&self) -> bool {
        self.redraw.get() || self.seen_generation != self.shared.generation()
    }

    /// Render the current state. Re-syncs against the shared generation
    /// and clears the redraw flag.
    pub fn render(&mut self, base: &RgbaImage) -> RgbaImage {
        self.seen_generation = self.shared.generation();
        self.redraw.set(false);
        self.surface
            .render(base, &self.shared.read(), self.controller.temp_box())
    }

    /// Restore the snapshot taken at `open` and close any modal
    /// presentation. The in-place replacement bumps the shared
    /// generation so the other facade re-renders too.
    pub fn cancel(&mut self) {
        if let Some(snapshot) = self.snapshot.clone() {
            self.shared.replace_contents(snapshot);
        }
        self.open = false;
        log::debug!("↩️ {:?} editor cancelled", self.kind);
    }

    /// Persist the visible boxes through the transport. Blocking
    /// transports complete inline; asynchronous hosts can instead use
    /// [`EditorFacade::begin_save`] / [`EditorFacade::complete_save`].
    /// Returns the request sequence number.
    pub fn save(&mut self, image_name: &str) -> u64 {
        let (seq, payload) = self.begin_save(image_name);
        let result = self
            .transport
            .send(&payload)
            .map(|_| ())
            .map_err(|e| e.to_string());
        self.complete_save(seq, result);
        seq
    }

    /// Build the payload and allocate its sequence number without
    /// dispatching. The UI stays interactive while the save is in
    /// flight; a second save may begin before the first completes.
    pub fn begin_save(&mut self, image_name: &str) -> (u64, SavePayload) {
        let payload = SavePayload::from_collection(image_name, &self.shared.read());
        let seq = self.tracker.begin();
        self.pending_saves.insert(seq, self.shared.read().clone());
        (seq, payload)
    }

    /// Deliver a save completion. Success with the newest sequence
    /// refreshes the snapshot baseline to the just-saved state; stale
    /// completions are discarded; failure leaves all state unchanged and
    /// surfaces a dismissable notification.
    pub fn complete_save(&mut self, seq: u64, result: Result<(), String>) {
        // Terminal either way: the pending entry is consumed.
        let sent = self.pending_saves.remove(&seq);
        match result {
            Ok(()) => {
                if self.tracker.try_apply(seq) {
                    if let Some(sent) = sent {
                        self.snapshot = Some(sent);
                        log::info!("💾 Save {} applied, snapshot baseline refreshed", seq);
                    }
                }
            }
            Err(msg) => {
                let err = EditorError::Persistence(msg);
                log::error!("❗ {}", err);
                self.notification = Some(err.to_string());
            }
        }
    }

    /// Take the pending persistence notification, dismissing it.
    pub fn take_notification(&mut self) -> Option<String> {
        self.notification.take()
    }
}
