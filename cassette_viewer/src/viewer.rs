// Copyright 2026 the Cassette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A construct viewer: scene, layout and input layer for one construct.

use alloc::boxed::Box;
use alloc::vec::Vec;

use cassette_dnd::{DragCoordinator, DragError, DropTarget, Payload, TargetId};
use cassette_event_state::PointerInput;
use cassette_geometry::{Box2D, Vector2D};
use cassette_layout::{BlockId, BlockStore, CollapseStore, Layout, LayoutResult, UpdateOptions};
use cassette_scene::{DisplayList, SceneGraph};

use crate::config::ViewerConfig;
use crate::interface::{ConstructViewerUserInterface, ViewerContext};
use crate::types::{Document, DragItem, Focus, ViewerAction};

fn context<'b>(
    scene: &'b mut SceneGraph,
    layout: &'b mut Layout,
    document: &'b mut Document<'_>,
) -> ViewerContext<'b> {
    ViewerContext {
        scene,
        layout,
        blocks: document.blocks,
        focus: document.focus,
        collapse: &mut *document.collapse,
    }
}

/// One construct on the canvas.
///
/// Owns the construct's [`SceneGraph`] and [`Layout`] and the
/// [`ConstructViewerUserInterface`] reading input over them. The host feeds it raw pointer
/// input in document space and performs the [`ViewerAction`]s it asks for.
///
/// Call [`update`](Self::update) after the blocks or the focus change and
/// [`render`](Self::render) to get what changed on screen.
#[derive(Debug)]
pub struct ConstructViewer {
    construct: BlockId,
    scene: SceneGraph,
    layout: Layout,
    ui: ConstructViewerUserInterface,
    target: Option<TargetId>,
    document_offset: Vector2D,
}

impl ConstructViewer {
    /// A viewer for `construct` in a window of `width x height`.
    pub fn new(construct: impl Into<BlockId>, width: f64, height: f64) -> Self {
        Self::with_config(construct, width, height, ViewerConfig::default())
    }

    /// A viewer with explicit thresholds.
    pub fn with_config(
        construct: impl Into<BlockId>,
        width: f64,
        height: f64,
        config: ViewerConfig,
    ) -> Self {
        let construct = construct.into();
        Self {
            ui: ConstructViewerUserInterface::with_config(construct.clone(), config),
            construct,
            scene: SceneGraph::new(width, height),
            layout: Layout::new(),
            target: None,
            document_offset: Vector2D::ZERO,
        }
    }

    /// The construct shown.
    pub fn construct_id(&self) -> &str {
        &self.construct
    }

    /// The scene.
    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    /// The layout.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// The input layer.
    pub fn ui(&self) -> &ConstructViewerUserInterface {
        &self.ui
    }

    /// The input layer.
    pub fn ui_mut(&mut self) -> &mut ConstructViewerUserInterface {
        &mut self.ui
    }

    /// Lay the construct out again and refresh the selection overlay.
    pub fn update(
        &mut self,
        blocks: &BlockStore,
        focus: &Focus,
        collapse: &dyn CollapseStore,
    ) -> LayoutResult {
        let options = UpdateOptions::new(&self.construct, blocks)
            .with_current_blocks(&focus.block_ids)
            .with_focused_options(&focus.options);
        let result = self.layout.update(&mut self.scene, collapse, &options);
        let focused = focus.construct_id.as_deref() == Some(self.construct.as_str());
        self.ui.update(&mut self.scene, &self.layout, focused);
        log::trace!(
            "viewer {} laid out, {} tall, {} clipped",
            self.construct,
            result.height,
            result.clipped_blocks
        );
        result
    }

    /// Changes to draw since the last render.
    pub fn render(&mut self) -> DisplayList {
        self.scene.update()
    }

    /// The window was resized. Takes effect on the next [`update`](Self::update).
    pub fn window_resized(&mut self, width: f64, height: f64) {
        self.scene.set_available_size(width, height);
    }

    /// Where the viewer's element sits in the document.
    pub fn set_document_offset(&mut self, offset: Vector2D) {
        self.document_offset = offset;
        self.ui.mouse_trap_mut().set_element_offset(offset);
    }

    /// The viewer's area in document space.
    pub fn document_bounds(&self) -> Box2D {
        let size = self.scene.size();
        Box2D::new(self.document_offset.x, self.document_offset.y, size.x, size.y)
    }

    /// The drop target registered for this viewer.
    pub fn drop_target(&self) -> Option<TargetId> {
        self.target
    }

    /// Register the viewer as a drop target of `dnd`, once.
    pub fn register_drop_target<H: ViewerHost + 'static>(
        &mut self,
        dnd: &mut DragCoordinator<DragItem, H>,
    ) -> TargetId {
        if let Some(target) = self.target {
            return target;
        }
        let target = dnd.register_target(
            self.document_bounds(),
            0,
            Box::new(ViewerDropTarget::new(self.construct.clone())),
        );
        self.target = Some(target);
        target
    }

    /// Move the drop target to the viewer's current area.
    pub fn sync_drop_target<H>(&self, dnd: &mut DragCoordinator<DragItem, H>) -> Result<(), DragError> {
        match self.target {
            Some(target) => dnd.set_target_bounds(target, self.document_bounds()),
            None => Ok(()),
        }
    }

    // --- pointer input, in document space ---

    /// A button went down over the viewer.
    pub fn pointer_down<H>(
        &mut self,
        document: &mut Document<'_>,
        dnd: &mut DragCoordinator<DragItem, H>,
        input: PointerInput,
    ) {
        if let Some(event) = self.ui.mouse_trap_mut().mouse_down(input) {
            let mut cx = context(&mut self.scene, &mut self.layout, document);
            self.ui.handle_event(&mut cx, dnd, event);
        }
    }

    /// The pointer moved over the viewer, or anywhere while a press started here is held.
    pub fn pointer_move<H>(
        &mut self,
        document: &mut Document<'_>,
        dnd: &mut DragCoordinator<DragItem, H>,
        input: PointerInput,
    ) {
        let event = self.ui.mouse_trap_mut().mouse_move(input);
        let mut cx = context(&mut self.scene, &mut self.layout, document);
        self.ui.handle_event(&mut cx, dnd, event);
    }

    /// A button went up anywhere in the document.
    pub fn pointer_up<H>(
        &mut self,
        document: &mut Document<'_>,
        dnd: &mut DragCoordinator<DragItem, H>,
        input: PointerInput,
    ) {
        if let Some(event) = self.ui.mouse_trap_mut().mouse_up(input) {
            let mut cx = context(&mut self.scene, &mut self.layout, document);
            self.ui.handle_event(&mut cx, dnd, event);
        }
    }

    /// A context menu was requested over the viewer.
    pub fn context_menu<H>(
        &mut self,
        document: &mut Document<'_>,
        dnd: &mut DragCoordinator<DragItem, H>,
        input: PointerInput,
    ) {
        let event = self.ui.mouse_trap().context_menu(input);
        let mut cx = context(&mut self.scene, &mut self.layout, document);
        self.ui.handle_event(&mut cx, dnd, event);
    }

    /// The pointer entered the viewer.
    pub fn pointer_enter(&mut self, document: &mut Document<'_>) {
        let mut cx = context(&mut self.scene, &mut self.layout, document);
        self.ui.mouse_enter(&mut cx);
    }

    /// The pointer left the viewer.
    pub fn pointer_leave(&mut self, document: &mut Document<'_>) {
        let mut cx = context(&mut self.scene, &mut self.layout, document);
        self.ui.mouse_leave(&mut cx);
    }

    // --- drops ---

    /// A drag entered the viewer.
    pub fn drag_enter(&mut self, document: &mut Document<'_>) {
        let mut cx = context(&mut self.scene, &mut self.layout, document);
        self.ui.drag_enter(&mut cx);
    }

    /// A drag moved over the viewer.
    pub fn drag_over(
        &mut self,
        document: &mut Document<'_>,
        position: Vector2D,
        payload: &Payload<DragItem>,
        proxy_size: Vector2D,
    ) {
        let mut cx = context(&mut self.scene, &mut self.layout, document);
        self.ui.drag_over(&mut cx, position, payload, proxy_size);
    }

    /// A drag left the viewer.
    pub fn drag_leave(&mut self) {
        self.ui.drag_leave();
    }

    /// A payload was dropped on the viewer.
    pub fn drop_payload(&mut self, document: &mut Document<'_>, payload: &Payload<DragItem>) -> bool {
        let mut cx = context(&mut self.scene, &mut self.layout, document);
        self.ui.drop_payload(&mut cx, payload)
    }

    /// Actions collected since the last call.
    pub fn take_actions(&mut self) -> Vec<ViewerAction> {
        self.ui.take_actions()
    }

    /// Release the viewer's nodes and drop target.
    pub fn dispose<H>(&mut self, dnd: &mut DragCoordinator<DragItem, H>) {
        if let Some(target) = self.target.take()
            && let Err(error) = dnd.unregister_target(target)
        {
            log::warn!("viewer {}: {error}", self.construct);
        }
        if !self.layout.is_disposed() {
            self.layout.dispose(&mut self.scene);
        }
        self.ui.overlay_mut().update(&self.scene);
    }
}

/// A viewer together with the document data it reads.
#[derive(Debug)]
pub struct ViewerAccess<'a> {
    /// The viewer.
    pub viewer: &'a mut ConstructViewer,
    /// Blocks, focus and collapsed state.
    pub document: Document<'a>,
}

/// Host context of a [`DragCoordinator`] whose targets include construct viewers.
pub trait ViewerHost {
    /// The viewer showing `construct`, if it is still open.
    fn viewer(&mut self, construct: &str) -> Option<ViewerAccess<'_>>;
}

/// Drop target standing in for a [`ConstructViewer`] inside a [`DragCoordinator`].
///
/// Holds only the construct id; the viewer is looked up through [`ViewerHost`] on every
/// callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewerDropTarget {
    construct: BlockId,
}

impl ViewerDropTarget {
    /// A target for the viewer of `construct`.
    pub fn new(construct: impl Into<BlockId>) -> Self {
        Self {
            construct: construct.into(),
        }
    }

    fn with_viewer<H: ViewerHost>(&self, host: &mut H, f: impl FnOnce(ViewerAccess<'_>)) {
        match host.viewer(&self.construct) {
            Some(access) => f(access),
            None => log::warn!("drop target for closed viewer {}", self.construct),
        }
    }
}

impl<H: ViewerHost> DropTarget<DragItem, H> for ViewerDropTarget {
    fn drag_enter(&mut self, ctx: &mut H, _position: Vector2D, _payload: &Payload<DragItem>) {
        self.with_viewer(ctx, |mut access| access.viewer.drag_enter(&mut access.document));
    }

    fn drag_over(
        &mut self,
        ctx: &mut H,
        position: Vector2D,
        payload: &Payload<DragItem>,
        proxy_size: Vector2D,
    ) {
        self.with_viewer(ctx, |mut access| {
            access
                .viewer
                .drag_over(&mut access.document, position, payload, proxy_size);
        });
    }

    fn drag_leave(&mut self, ctx: &mut H) {
        self.with_viewer(ctx, |access| access.viewer.drag_leave());
    }

    fn drop_payload(
        &mut self,
        ctx: &mut H,
        _position: Vector2D,
        payload: &Payload<DragItem>,
        _proxy_size: Vector2D,
    ) {
        self.with_viewer(ctx, |mut access| {
            if !access.viewer.drop_payload(&mut access.document, payload) {
                log::debug!("viewer {} ignored a drop", self.construct);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::String;
    use cassette_dnd::{DragOptions, Release};
    use cassette_layout::{Block, BlockStore, MemoryCollapseStore};
    use kurbo::Point;

    use crate::types::{Edge, Insertion};

    struct Host {
        viewer: ConstructViewer,
        blocks: BlockStore,
        focus: Focus,
        collapse: MemoryCollapseStore,
    }

    impl Host {
        fn new() -> Self {
            let blocks: BlockStore = [
                Block::new("c").with_name("Construct").with_components(["a", "b", "g"]),
                Block::new("a").with_name("pTet"),
                Block::new("b").with_name("RBS1"),
                Block::new("g").with_name("GFP"),
            ]
            .into_iter()
            .collect();
            let mut host = Self {
                viewer: ConstructViewer::new("c", 1000.0, 600.0),
                blocks,
                focus: Focus {
                    construct_id: Some("c".into()),
                    ..Focus::default()
                },
                collapse: MemoryCollapseStore::new(),
            };
            host.viewer.set_document_offset(Vector2D::new(100.0, 50.0));
            host.viewer.update(&host.blocks, &host.focus, &host.collapse);
            host
        }

        fn split(&mut self) -> (&mut ConstructViewer, Document<'_>) {
            (
                &mut self.viewer,
                Document {
                    blocks: &self.blocks,
                    focus: &self.focus,
                    collapse: &mut self.collapse,
                },
            )
        }
    }

    impl ViewerHost for Host {
        fn viewer(&mut self, construct: &str) -> Option<ViewerAccess<'_>> {
            if construct != self.viewer.construct_id() {
                return None;
            }
            let (viewer, document) = self.split();
            Some(ViewerAccess { viewer, document })
        }
    }

    fn left(x: f64, y: f64, timestamp: u64) -> PointerInput {
        PointerInput::left(Point::new(x, y), timestamp)
    }

    fn ids(values: &[&str]) -> Vec<BlockId> {
        values.iter().map(|&v| String::from(v)).collect()
    }

    #[test]
    fn click_in_document_space_selects() {
        let mut host = Host::new();
        let mut dnd: DragCoordinator<DragItem, Host> = DragCoordinator::new();
        let (viewer, mut document) = host.split();
        viewer.pointer_down(&mut document, &mut dnd, left(140.0, 127.0, 0));
        viewer.pointer_up(&mut document, &mut dnd, left(140.0, 127.0, 10));
        assert_eq!(viewer.take_actions(), [ViewerAction::BlockSelected(ids(&["a"]))]);

        viewer.pointer_down(&mut document, &mut dnd, left(141.0, 127.0, 100));
        assert_eq!(viewer.take_actions(), [ViewerAction::OpenInspector]);
    }

    #[test]
    fn dragging_a_block_starts_a_drag() {
        let mut host = Host::new();
        let mut dnd: DragCoordinator<DragItem, Host> = DragCoordinator::new();
        let (viewer, mut document) = host.split();
        viewer.pointer_down(&mut document, &mut dnd, left(140.0, 127.0, 0));
        viewer.pointer_move(&mut document, &mut dnd, left(145.0, 127.0, 5));
        assert!(!dnd.is_dragging(), "below the threshold");
        viewer.pointer_move(&mut document, &mut dnd, left(160.0, 127.0, 10));
        assert!(dnd.is_dragging());
        assert_eq!(
            dnd.session().map(|s| s.position()),
            Some(Vector2D::new(160.0, 127.0))
        );
        assert!(!viewer.ui().mouse_trap().is_dragging());
        assert_eq!(
            viewer.take_actions(),
            [
                ViewerAction::Transact,
                ViewerAction::BlockSelected(ids(&["a"])),
                ViewerAction::RemoveBlocks(ids(&["a"])),
            ]
        );
        viewer.pointer_up(&mut document, &mut dnd, left(160.0, 127.0, 20));
        assert!(viewer.take_actions().is_empty(), "the trap no longer tracks the press");
    }

    #[test]
    fn drops_reach_the_viewer_through_the_host() {
        let mut host = Host::new();
        let mut dnd: DragCoordinator<DragItem, Host> = DragCoordinator::new();
        let target = host.viewer.register_drop_target(&mut dnd);
        assert_eq!(host.viewer.register_drop_target(&mut dnd), target);
        assert_eq!(dnd.target_bounds(target), Some(host.viewer.document_bounds()));

        let payload = Payload::new(DragItem::Role("terminator".into()));
        dnd.start_drag(
            Vector2D::new(20.0, 20.0),
            Vector2D::new(0.0, 0.0),
            payload.clone(),
            DragOptions::default(),
        )
        .expect("idle");
        dnd.pointer_move(&mut host, Vector2D::new(175.0, 127.0));
        assert!(host.viewer.ui().is_drag_inside());
        let a = host.viewer.layout().node_from_element("a").expect("laid out");
        let expected = Insertion {
            block: "a".into(),
            node: a,
            edge: Some(Edge::Right),
        };
        assert_eq!(host.viewer.ui().insertion_point(), Some(&expected));

        assert_eq!(dnd.pointer_up(&mut host, Vector2D::new(175.0, 127.0)), Release::Dropped(target));
        assert!(!host.viewer.ui().is_drag_inside());
        assert_eq!(
            host.viewer.take_actions(),
            [
                ViewerAction::AddItemAtInsertionPoint {
                    payload,
                    insertion: Some(expected),
                },
                ViewerAction::ConstructSelected("c".into()),
            ]
        );
    }

    #[test]
    fn resize_and_dispose() {
        let mut host = Host::new();
        let mut dnd: DragCoordinator<DragItem, Host> = DragCoordinator::new();
        let target = host.viewer.register_drop_target(&mut dnd);
        let title = host.viewer.layout().title_node().expect("title");
        assert_eq!(host.viewer.scene().aabb_of(title).w, 970.0);

        host.viewer.window_resized(600.0, 400.0);
        host.viewer.update(&host.blocks, &host.focus, &host.collapse);
        assert_eq!(host.viewer.scene().aabb_of(title).w, 570.0);
        host.viewer.sync_drop_target(&mut dnd).expect("registered");
        assert_eq!(dnd.target_bounds(target), Some(host.viewer.document_bounds()));
        assert!(!host.viewer.render().items.is_empty());

        host.viewer.dispose(&mut dnd);
        assert_eq!(host.viewer.drop_target(), None);
        assert_eq!(dnd.target_at(Vector2D::new(150.0, 100.0)), None);
        assert!(!host.viewer.scene().is_alive(title));
    }
}
