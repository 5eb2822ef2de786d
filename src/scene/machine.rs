//! The machine diagram: call stack on the left, heap on the right
//!
//! [`MachineScene::redraw`] runs one complete pass:
//!
//! 1. query the introspector for targets, threads and frames
//! 2. throw away the previous call stack and build a fresh one; heap objects
//!    persist and are refreshed in place
//! 3. resolve deferred references, round after round, until none are left
//! 4. paint the tree, collecting arrows on the way, then paint the arrows
//!    last so they lie above every box
//!
//! Mouse events go through [`MachineScene::handle_mouse`]. Handlers never
//! repaint directly; they raise a redraw request the host picks up with
//! [`MachineScene::take_redraw_request`].

use super::arrow::route_arrow;
use super::columns::{Column, ColumnTable};
use super::frame::{frame_width, is_displayed_frame, is_displayed_local, FrameNode, ReturnFrameNode};
use super::heap::{object_title, paint_close_button, HeapRegistry, ObjectNode};
use super::row::VariableRow;
use super::tree::{HoverTransition, NodeId, Tree};
use crate::config::{Metrics, SceneConfig, StackOrder};
use crate::introspect::{
    FirstLocalIsReturnValue, FrameInfo, IntrospectionError, Introspector, ObjectId, ObjectState,
    ReturnValuePolicy, Variable,
};
use crate::render::{CursorShape, Point, Size, Surface};
use crate::ui::theme::DEFAULT_THEME;
use tracing::{debug, trace, warn};

pub const NO_PROGRAM_MESSAGE: &str = "No program running.";

/// Every kind of node in the diagram
#[derive(Debug)]
pub enum NodeKind {
    /// Root of the tree; spans the whole view
    Canvas,
    /// Holds the call stack and the heap; shifted below any banners
    Machine,
    CallStack,
    Frame(FrameNode),
    ReturnFrame(ReturnFrameNode),
    Row(VariableRow),
    Heap,
    Object(ObjectNode),
    /// Collapses the parent object when released on
    CloseButton,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventKind {
    Moved,
    Released,
    DoubleClicked,
}

/// Summary of one redraw pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedrawOutcome {
    /// No debug target: only the fallback message was drawn
    NoProgram,
    Shown {
        frames: usize,
        objects: usize,
        arrows: usize,
    },
    /// The pass was abandoned; the fallback message was drawn
    Faulted(IntrospectionError),
}

/// Work postponed until the pass's tree has been built
#[derive(Debug, Clone, Copy)]
enum Deferred {
    /// Point a row at the node of the object it references
    ResolveRow { row: NodeId, object: ObjectId },
}

#[derive(Debug, Clone, Copy)]
struct Layers {
    machine: NodeId,
    heap: NodeId,
    stack: Option<NodeId>,
}

pub struct MachineScene {
    tree: Tree<NodeKind>,
    canvas: NodeId,
    layers: Option<Layers>,
    heap: HeapRegistry,
    stack_table: ColumnTable,
    deferred: Vec<Deferred>,
    banners: Vec<String>,
    config: SceneConfig,
    return_policy: Box<dyn ReturnValuePolicy>,
    viewport: Size,
    cursor: CursorShape,
    redraw_requested: bool,
    transitions: Vec<HoverTransition>,
}

impl MachineScene {
    pub fn new(config: SceneConfig) -> Self {
        let mut tree = Tree::new();
        let canvas = tree.insert(NodeKind::Canvas, None);
        MachineScene {
            tree,
            canvas,
            layers: None,
            heap: HeapRegistry::new(&config.metrics),
            stack_table: ColumnTable::initial(&config.metrics),
            deferred: Vec::new(),
            banners: Vec::new(),
            config,
            return_policy: Box::new(FirstLocalIsReturnValue),
            viewport: Size::default(),
            cursor: CursorShape::Arrow,
            redraw_requested: false,
            transitions: Vec::new(),
        }
    }

    /// Replace the convention used to find the active frame's return value
    pub fn with_return_policy(mut self, policy: Box<dyn ReturnValuePolicy>) -> Self {
        self.return_policy = policy;
        self
    }

    /// Size of the host's drawing area, in pixels
    pub fn set_viewport(&mut self, size: Size) {
        self.viewport = size;
        let canvas = self.tree.get_mut(self.canvas);
        canvas.width = size.width;
        canvas.height = size.height;
        self.sync_layout();
    }

    pub fn metrics(&self) -> &Metrics {
        &self.config.metrics
    }

    pub fn tree(&self) -> &Tree<NodeKind> {
        &self.tree
    }

    pub fn canvas(&self) -> NodeId {
        self.canvas
    }

    /// Column widths shared by every stack frame
    pub fn stack_table(&self) -> &ColumnTable {
        &self.stack_table
    }

    pub fn call_stack(&self) -> Option<NodeId> {
        self.layers.and_then(|l| l.stack)
    }

    /// Frame boxes from top to bottom
    pub fn frames(&self) -> Vec<NodeId> {
        self.call_stack()
            .map(|stack| {
                self.tree
                    .get(stack)
                    .children()
                    .iter()
                    .copied()
                    .filter(|c| matches!(self.tree.payload(*c), NodeKind::Frame(_)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Rows directly below `parent` (a frame, return frame, or object)
    pub fn rows(&self, parent: NodeId) -> Vec<NodeId> {
        self.tree
            .get(parent)
            .children()
            .iter()
            .copied()
            .filter(|c| matches!(self.tree.payload(*c), NodeKind::Row(_)))
            .collect()
    }

    pub fn row(&self, id: NodeId) -> Option<&VariableRow> {
        match self.tree.payload(id) {
            NodeKind::Row(row) => Some(row),
            _ => None,
        }
    }

    /// Node of a heap object, shown or collapsed
    pub fn object_node(&self, id: ObjectId) -> Option<NodeId> {
        self.heap.get(id)
    }

    /// Number of objects known to the heap registry
    pub fn object_count(&self) -> usize {
        self.heap.len()
    }

    /// Whether `node` is part of the visible tree
    pub fn is_shown(&self, node: NodeId) -> bool {
        self.tree.contains(node) && self.tree.root_of(node) == self.canvas
    }

    pub fn banners(&self) -> &[String] {
        &self.banners
    }

    /// Pointer shape requested by the last mouse move
    pub fn cursor(&self) -> CursorShape {
        self.cursor
    }

    /// Hover enter/exit transitions caused by the last mouse event
    pub fn hover_transitions(&self) -> &[HoverTransition] {
        &self.transitions
    }

    /// Consume a pending redraw request
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    /// Run one full pass: rebuild from the introspector and paint
    pub fn redraw(&mut self, introspector: &dyn Introspector, surface: &mut dyn Surface) -> RedrawOutcome {
        match self.rebuild(introspector, surface) {
            Ok(false) => {
                self.paint_fallback(surface);
                RedrawOutcome::NoProgram
            }
            Ok(true) => {
                let arrows = self.paint(surface);
                let frames = self.frames().len();
                let objects = self
                    .heap
                    .nodes()
                    .filter(|(_, node)| self.is_shown(*node))
                    .count();
                debug!(frames, objects, arrows, "redraw pass complete");
                RedrawOutcome::Shown {
                    frames,
                    objects,
                    arrows,
                }
            }
            Err(err) => {
                warn!(error = %err, "introspection failed, abandoning redraw pass");
                self.deferred.clear();
                self.banners.clear();
                self.abandon_unresolved();
                self.discard_call_stack();
                self.paint_fallback(surface);
                RedrawOutcome::Faulted(err)
            }
        }
    }

    /// Returns `false` when no program is running
    fn rebuild(&mut self, introspector: &dyn Introspector, surface: &mut dyn Surface) -> Result<bool, IntrospectionError> {
        self.banners.clear();
        let targets = introspector.targets()?;
        let Some(target) = targets.first() else {
            self.clear();
            return Ok(false);
        };
        if targets.len() > 1 {
            self.banners.push(format!(
                "Multiple debug targets exist. Showing target {}.",
                target.name
            ));
        }

        let threads = introspector.threads(target)?;
        let user_threads: Vec<_> = threads.iter().filter(|t| !t.is_system).collect();
        if user_threads.len() > 1 {
            let ignored = user_threads[1..]
                .iter()
                .map(|t| t.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            self.banners.push(format!(
                "Target has multiple threads. Showing thread {}. Ignoring threads {}.",
                user_threads[0].name, ignored
            ));
        }
        let shown = user_threads.first().copied().or(threads.first());
        let frames = match shown {
            Some(thread) => introspector.frames(thread)?,
            None => Vec::new(),
        };

        let banner_height: i32 = self
            .banners
            .iter()
            .map(|b| 1 + surface.measure_text(b).height + 1)
            .sum();
        self.discard_call_stack();
        if frames.is_empty() {
            if let Some(layers) = self.layers {
                self.tree.get_mut(layers.machine).y = banner_height;
            }
            self.sync_layout();
            return Ok(true);
        }

        self.heap.begin_pass();
        let layers = self.ensure_layers();
        self.tree.get_mut(layers.machine).y = banner_height;

        self.build_call_stack(introspector, surface, layers.machine, &frames)?;
        self.drain_deferred(introspector, surface)?;
        self.sync_layout();
        Ok(true)
    }

    fn ensure_layers(&mut self) -> Layers {
        if let Some(layers) = self.layers {
            return layers;
        }
        let machine = self.tree.insert(NodeKind::Machine, Some(self.canvas));
        let heap = self.tree.insert(NodeKind::Heap, Some(machine));
        let layers = Layers {
            machine,
            heap,
            stack: None,
        };
        self.layers = Some(layers);
        layers
    }

    fn discard_call_stack(&mut self) {
        if let Some(layers) = &mut self.layers {
            if let Some(stack) = layers.stack.take() {
                self.tree.destroy(stack);
            }
        }
    }

    /// Demote object rows left unresolved by an abandoned pass to plain text;
    /// the object keeps its fields and height until it is next reached
    fn abandon_unresolved(&mut self) {
        let objects: Vec<NodeId> = self.heap.nodes().map(|(_, node)| node).collect();
        for object in objects {
            for row in self.rows(object) {
                if let NodeKind::Row(r) = self.tree.payload_mut(row) {
                    r.abandon_reference();
                }
            }
        }
    }

    /// Forget everything, including the heap registry
    fn clear(&mut self) {
        for (_, node) in self.heap.nodes().collect::<Vec<_>>() {
            if self.tree.contains(node) {
                self.tree.destroy(node);
            }
        }
        if let Some(layers) = self.layers.take() {
            self.tree.destroy(layers.machine);
        }
        self.heap = HeapRegistry::new(&self.config.metrics);
        self.deferred.clear();
    }

    fn build_call_stack(
        &mut self,
        introspector: &dyn Introspector,
        surface: &mut dyn Surface,
        machine: NodeId,
        frames: &[FrameInfo],
    ) -> Result<(), IntrospectionError> {
        let m = self.config.metrics;
        let stack = self.tree.insert(NodeKind::CallStack, Some(machine));
        if let Some(layers) = &mut self.layers {
            layers.stack = Some(stack);
        }

        // `frames` is innermost first; index 0 is the active frame
        let order: Vec<usize> = match self.config.stack_order {
            StackOrder::OldestFirst => (0..frames.len()).rev().collect(),
            StackOrder::NewestFirst => (0..frames.len()).collect(),
        };
        let mut y = m.outer_margin;
        for index in order {
            let frame = &frames[index];
            let active = index == 0;
            if is_displayed_frame(frame, active) {
                y = self.build_frame(introspector, surface, stack, frame, active, y)?;
            }
        }

        let node = self.tree.get_mut(stack);
        node.width = m.outer_margin + frame_width(&self.stack_table, &m) + m.outer_margin;
        node.height = y + m.outer_margin;
        Ok(())
    }

    /// Returns the y just below the frame (and its return-value box)
    fn build_frame(
        &mut self,
        introspector: &dyn Introspector,
        surface: &mut dyn Surface,
        stack: NodeId,
        frame: &FrameInfo,
        active: bool,
        y: i32,
    ) -> Result<i32, IntrospectionError> {
        let m = self.config.metrics;
        let mut variables = introspector.variables(frame)?;
        let return_value = if active {
            self.return_policy.take_return_value(&mut variables)
        } else {
            None
        };

        let payload = FrameNode::new(frame, active, surface);
        let mut row_y = payload.rows_top(&m);
        let node = self.tree.insert(NodeKind::Frame(payload), Some(stack));
        let rows_x = m.border + m.padding;
        for variable in variables.iter().filter(|v| is_displayed_local(v)) {
            let table = self.stack_table.clone();
            let height = self.add_row(surface, node, variable, table, Point::new(rows_x, row_y));
            row_y += height + m.padding;
        }
        row_y += m.border;

        let width = frame_width(&self.stack_table, &m);
        let frame_node = self.tree.get_mut(node);
        frame_node.x = m.outer_margin;
        frame_node.y = y;
        frame_node.width = width;
        frame_node.height = row_y;
        let mut bottom = y + row_y;

        if let Some(value) = return_value {
            let ret = self
                .tree
                .insert(NodeKind::ReturnFrame(ReturnFrameNode), Some(stack));
            let table = self.stack_table.clone();
            let edge = m.border + m.padding;
            let row_height = self.add_row(surface, ret, &value, table, Point::new(edge, edge));
            let ret_node = self.tree.get_mut(ret);
            ret_node.x = m.outer_margin;
            ret_node.y = bottom;
            ret_node.width = width;
            ret_node.height = row_height + 2 * m.padding + 2 * m.border;
            bottom += ret_node.height;
        }
        Ok(bottom)
    }

    /// Returns the row's height
    fn add_row(
        &mut self,
        surface: &dyn Surface,
        parent: NodeId,
        variable: &Variable,
        table: ColumnTable,
        at: Point,
    ) -> i32 {
        let row = VariableRow::new(variable, table, surface);
        let height = row.height(&self.config.metrics);
        let width = row.table.total();
        let pending = row.pending_object();
        let id = self.tree.insert(NodeKind::Row(row), Some(parent));
        let node = self.tree.get_mut(id);
        node.x = at.x;
        node.y = at.y;
        node.width = width;
        node.height = height;
        if let Some(object) = pending {
            self.deferred.push(Deferred::ResolveRow { row: id, object });
        }
        height
    }

    fn drain_deferred(&mut self, introspector: &dyn Introspector, surface: &mut dyn Surface) -> Result<(), IntrospectionError> {
        let mut round = 0;
        while !self.deferred.is_empty() {
            round += 1;
            let batch = std::mem::take(&mut self.deferred);
            trace!(round, items = batch.len(), "resolving deferred references");
            for item in batch {
                match item {
                    Deferred::ResolveRow { row, object } => {
                        if !self.tree.contains(row) {
                            continue;
                        }
                        let node = self.heap_object(introspector, surface, object)?;
                        if let NodeKind::Row(row) = self.tree.payload_mut(row) {
                            row.resolve(node);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Node for `id`: created at the placement cursor on first sight,
    /// otherwise refreshed in place (at most once per pass)
    fn heap_object(
        &mut self,
        introspector: &dyn Introspector,
        surface: &mut dyn Surface,
        id: ObjectId,
    ) -> Result<NodeId, IntrospectionError> {
        if let Some(node) = self.heap.get(id) {
            if self.heap.mark_refreshed(id) {
                let state = introspector.object(id)?;
                self.refresh_object(surface, node, &state);
            }
            return Ok(node);
        }

        let state = introspector.object(id)?;
        self.heap.mark_refreshed(id);
        let heap = self.ensure_layers().heap;
        let m = self.config.metrics;
        let close_button = self.tree.insert(NodeKind::CloseButton, None);
        let title = object_title(id, &state);
        let payload = ObjectNode {
            id,
            title_extent: surface.measure_text(&title),
            title,
            table: ColumnTable::initial(&m),
            close_button,
        };
        let node = self.tree.insert(NodeKind::Object(payload), Some(heap));
        self.tree.add(node, close_button);
        let position = self.heap.next_position();
        let object = self.tree.get_mut(node);
        object.x = position.x;
        object.y = position.y;
        self.refresh_object(surface, node, &state);

        let height = self.tree.get(node).height;
        self.heap.register(id, node, height);
        debug!(id, x = position.x, y = position.y, "placed heap object");
        Ok(node)
    }

    /// Rebuild title and field rows; position and visibility are untouched
    fn refresh_object(&mut self, surface: &mut dyn Surface, node: NodeId, state: &ObjectState) {
        let m = self.config.metrics;
        let stale_rows = self.rows(node);
        for row in stale_rows {
            self.tree.destroy(row);
        }

        let (table, rows_top) = match self.tree.payload_mut(node) {
            NodeKind::Object(object) => {
                object.title = object_title(object.id, state);
                object.title_extent = surface.measure_text(&object.title);
                (object.table.clone(), object.rows_top(&m))
            }
            other => panic!("Expected a heap object, found {:?}", other),
        };

        let rows_x = m.border + m.padding;
        let mut y = rows_top;
        for field in state.fields.iter().filter(|f| !f.is_static) {
            let height = self.add_row(surface, node, field, table.clone(), Point::new(rows_x, y));
            y += height + m.padding;
        }
        y += m.border;
        self.tree.get_mut(node).height = y;
        self.layout_object(node);
    }

    fn layout_object(&mut self, node: NodeId) {
        let m = self.config.metrics;
        let (width, total, close_button) = match self.tree.payload(node) {
            NodeKind::Object(object) => (object.width(&m), object.table.total(), object.close_button),
            _ => return,
        };
        for row in self.rows(node) {
            self.tree.get_mut(row).width = total;
        }
        self.tree.get_mut(node).width = width;
        let button = self.tree.get_mut(close_button);
        button.x = width - m.border - m.padding - m.close_button_size;
        button.y = m.border + m.padding;
        button.width = m.close_button_size;
        button.height = m.close_button_size;
    }

    /// Propagate column widths to every box and size the containers
    fn sync_layout(&mut self) {
        let Some(layers) = self.layers else {
            return;
        };
        let m = self.config.metrics;

        let mut stack_width = 0;
        let mut content_height = 0;
        if let Some(stack) = layers.stack {
            let width = frame_width(&self.stack_table, &m);
            let total = self.stack_table.total();
            for frame in self.tree.get(stack).children().to_vec() {
                self.tree.get_mut(frame).width = width;
                for row in self.rows(frame) {
                    self.tree.get_mut(row).width = total;
                }
            }
            let node = self.tree.get_mut(stack);
            node.width = m.outer_margin + width + m.outer_margin;
            stack_width = node.width;
            content_height = node.height;
        }

        let objects: Vec<NodeId> = self.heap.nodes().map(|(_, node)| node).collect();
        let mut right = 0;
        for node in objects {
            self.layout_object(node);
            if self.is_shown(node) {
                let b = self.tree.get(node).bounds();
                right = right.max(b.right() + m.outer_margin);
                content_height = content_height.max(b.bottom() + m.outer_margin);
            }
        }

        let machine_y = self.tree.get(layers.machine).y;
        let height = content_height.max(self.viewport.height - machine_y);
        if let Some(stack) = layers.stack {
            self.tree.get_mut(stack).height = height;
        }
        let heap = self.tree.get_mut(layers.heap);
        heap.x = stack_width;
        heap.width = right.max(self.viewport.width - stack_width);
        heap.height = height;
        let heap_right = heap.x + heap.width;

        let machine = self.tree.get_mut(layers.machine);
        machine.width = heap_right;
        machine.height = height;

        let canvas = self.tree.get_mut(self.canvas);
        canvas.width = self.viewport.width.max(heap_right);
        canvas.height = self.viewport.height.max(machine_y + height);
    }

    fn paint_fallback(&self, surface: &mut dyn Surface) {
        surface.draw_string(NO_PROGRAM_MESSAGE, Point::new(1, 1), DEFAULT_THEME.comment);
    }

    /// Returns the number of arrows drawn
    fn paint(&self, surface: &mut dyn Surface) -> usize {
        let mut y = 0;
        for banner in &self.banners {
            surface.draw_string(banner, Point::new(1, y + 1), DEFAULT_THEME.secondary);
            y += 1 + surface.measure_text(banner).height + 1;
        }
        if self.layers.is_none() {
            return 0;
        }

        let mut arrows = Vec::new();
        self.paint_node(self.canvas, surface, &mut arrows);
        for (from, target) in &arrows {
            let bounds = self.tree.root_bounds(*target);
            route_arrow(*from, bounds, &self.config.metrics).paint(surface, DEFAULT_THEME.arrow);
        }
        arrows.len()
    }

    fn paint_node(&self, id: NodeId, surface: &mut dyn Surface, arrows: &mut Vec<(Point, NodeId)>) {
        let m = &self.config.metrics;
        let node = self.tree.get(id);
        let size = Size::new(node.width, node.height);
        match &node.payload {
            NodeKind::Frame(frame) => frame.paint(surface, size, m),
            NodeKind::ReturnFrame(ret) => ret.paint(surface, size),
            NodeKind::Object(object) => object.paint(surface, size, m),
            NodeKind::CloseButton => {
                let owner_hovered = node
                    .parent()
                    .is_some_and(|owner| self.tree.get(owner).mouse_inside());
                paint_close_button(surface, size, owner_hovered);
            }
            NodeKind::Row(row) => {
                if let Some((from, target)) = row.paint(surface, node.height, m, |n| self.is_shown(n)) {
                    arrows.push((self.tree.map_point(id, from, None), target));
                }
            }
            NodeKind::Canvas | NodeKind::Machine | NodeKind::CallStack | NodeKind::Heap => {}
        }
        for child in node.children() {
            let offset = self.tree.get(*child).bounds().origin();
            surface.translate(offset.x, offset.y);
            self.paint_node(*child, surface, arrows);
            surface.translate(-offset.x, -offset.y);
        }
    }

    /// Route a pointer event, in canvas coordinates, into the tree
    ///
    /// Returns whether some node handled it.
    pub fn handle_mouse(&mut self, kind: MouseEventKind, point: Point) -> bool {
        // Transitions caused by rebuilding are not the pointer's doing
        self.tree.take_transitions();
        let handled = self.layers.is_some() && self.dispatch(self.canvas, kind, point);
        self.transitions = self.tree.take_transitions();
        for transition in &self.transitions {
            trace!(node = ?transition.node, change = ?transition.change, "hover");
            let is_object = self.tree.contains(transition.node)
                && matches!(self.tree.payload(transition.node), NodeKind::Object(_));
            if is_object {
                // The close button appears and disappears with the pointer
                self.redraw_requested = true;
            }
        }
        handled
    }

    fn dispatch(&mut self, id: NodeId, kind: MouseEventKind, point: Point) -> bool {
        if let Some(handled) = self.handle_own(id, kind, point) {
            return handled;
        }
        match self.tree.child_at(id, point) {
            Some(child) => {
                let offset = self.tree.get(child).bounds().origin();
                self.tree.set_hovered(id, Some(child));
                self.dispatch(child, kind, point - offset)
            }
            None => {
                self.tree.set_hovered(id, None);
                if kind == MouseEventKind::Moved {
                    self.cursor = self.cursor_policy(id, point);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Node-specific handling that preempts the default child routing
    fn handle_own(&mut self, id: NodeId, kind: MouseEventKind, point: Point) -> Option<bool> {
        let payload = self.tree.payload(id);
        let is_row = matches!(payload, NodeKind::Row(_));
        let is_close_button = matches!(payload, NodeKind::CloseButton);
        match kind {
            MouseEventKind::DoubleClicked if is_row => {
                self.row_double_clicked(id, point);
                Some(true)
            }
            MouseEventKind::Released if is_close_button => {
                if let Some(object) = self.tree.get(id).parent() {
                    self.collapse(object);
                }
                Some(true)
            }
            _ => None,
        }
    }

    fn cursor_policy(&self, id: NodeId, point: Point) -> CursorShape {
        match self.tree.payload(id) {
            NodeKind::Row(row) => row.cursor(point.x, &self.config.metrics),
            _ => CursorShape::Arrow,
        }
    }

    fn row_double_clicked(&mut self, id: NodeId, point: Point) {
        let Some(row) = self.row(id) else {
            return;
        };
        let boundary = row.table.boundary_at(point.x, &self.config.metrics);
        let in_values = point.x >= row.table.names();
        let target = row.target();
        match boundary {
            Some(column) => {
                self.auto_fit(id, column);
            }
            None if in_values => {
                if let Some(target) = target.filter(|t| !self.is_shown(*t)) {
                    self.show_object(target);
                }
            }
            None => {}
        }
    }

    /// Fit `column` of the table `row` belongs to around every row (and
    /// frame label or object title) sharing that table. Returns the width.
    pub fn auto_fit(&mut self, row: NodeId, column: Column) -> i32 {
        let m = self.config.metrics;
        let Some(table) = self.row(row).map(|r| r.table.clone()) else {
            panic!("Auto-fit requested on {:?}, which is not a row", row);
        };
        let owner = self
            .tree
            .find_ancestor(row, |k| matches!(k, NodeKind::CallStack | NodeKind::Object(_)))
            .unwrap_or(row);
        let is_stack_table = table.shares_with(&self.stack_table);
        let demands: Vec<i32> = self
            .tree
            .descendants(owner)
            .into_iter()
            .filter_map(|n| match self.tree.payload(n) {
                NodeKind::Row(r) if r.table.shares_with(&table) => Some(r.desired_width(column, &m)),
                NodeKind::Frame(f) if is_stack_table => Some(f.desired_width(column, &table, &m)),
                NodeKind::Object(o) if o.table.shares_with(&table) => Some(o.desired_width(column, &m)),
                _ => None,
            })
            .collect();
        let width = table.auto_fit(column, demands, m.min_column_width);
        debug!(?column, width, "auto-fit column");
        self.sync_layout();
        self.redraw_requested = true;
        width
    }

    /// Detach an object from the heap; it stays registered under its identity
    pub fn collapse(&mut self, object: NodeId) {
        if let Some(heap) = self.tree.get(object).parent() {
            self.tree.remove(heap, object);
            self.redraw_requested = true;
        }
    }

    /// Re-attach a collapsed object at its previous position
    pub fn show_object(&mut self, object: NodeId) {
        if let Some(layers) = self.layers {
            self.tree.add(layers.heap, object);
            self.sync_layout();
            self.redraw_requested = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspect::{NoReturnValue, ScriptedProcess};
    use crate::render::recording::RecordingSurface;
    use crate::render::Bounds;
    use crate::scene::tree::HoverChange;

    /// `main` with `x = 1` and `n -> Node(id=42) { f = 10 }`
    ///
    /// Layout with the recording metrics: the frame sits at (4, 4) and is
    /// 310 wide, so the heap starts at x = 318 and object 42 at (348, 4).
    /// Row `n` is at (9, 47) in canvas space.
    fn linked() -> (ScriptedProcess, MachineScene, RecordingSurface) {
        let (mut process, thread) = ScriptedProcess::with_main_thread();
        process.push_frame(
            thread,
            FrameInfo::method("demo.Main", "main", &[], 3),
            vec![
                Variable::primitive("x", "int", "1"),
                Variable::object("n", "demo.Node", 42),
            ],
        );
        process.put_object(42, ObjectState::new("demo.Node", vec![Variable::primitive("f", "int", "10")]));
        let mut scene = MachineScene::new(SceneConfig::default()).with_return_policy(Box::new(NoReturnValue));
        scene.set_viewport(Size::new(1000, 600));
        (process, scene, RecordingSurface::new())
    }

    #[test]
    fn test_layout_of_stack_and_heap() {
        let (process, mut scene, mut surface) = linked();
        scene.redraw(&process, &mut surface);

        let frame = scene.frames()[0];
        assert_eq!(scene.tree().root_bounds(frame), Bounds::new(4, 4, 310, 65));
        let object = scene.object_node(42).unwrap();
        assert_eq!(scene.tree().root_bounds(object).origin(), Point::new(348, 4));
        let rows = scene.rows(frame);
        assert_eq!(scene.tree().root_bounds(rows[1]).origin(), Point::new(9, 47));
    }

    #[test]
    fn test_hover_enters_and_exits_objects() {
        let (process, mut scene, mut surface) = linked();
        scene.redraw(&process, &mut surface);
        let object = scene.object_node(42).unwrap();

        assert!(scene.handle_mouse(MouseEventKind::Moved, Point::new(398, 14)));
        assert!(scene.tree().get(object).mouse_inside());
        assert!(scene.take_redraw_request());

        scene.handle_mouse(MouseEventKind::Moved, Point::new(10, 300));
        let exits: Vec<_> = scene
            .hover_transitions()
            .iter()
            .filter(|t| t.change == HoverChange::Exited)
            .map(|t| t.node)
            .collect();
        let heap = scene.tree().get(object).parent().unwrap();
        assert_eq!(exits, vec![object, heap]);
        assert!(!scene.tree().get(object).mouse_inside());
        assert!(scene.take_redraw_request());
    }

    #[test]
    fn test_cursor_changes_over_column_boundaries() {
        let (process, mut scene, mut surface) = linked();
        scene.redraw(&process, &mut surface);

        // Names boundary of row `n` is at 9 + 150
        scene.handle_mouse(MouseEventKind::Moved, Point::new(161, 50));
        assert_eq!(scene.cursor(), CursorShape::ResizeHorizontal);
        scene.handle_mouse(MouseEventKind::Moved, Point::new(200, 50));
        assert_eq!(scene.cursor(), CursorShape::Arrow);
        // Values boundary at 9 + 300, wider tolerance
        scene.handle_mouse(MouseEventKind::Moved, Point::new(300, 50));
        assert_eq!(scene.cursor(), CursorShape::ResizeHorizontal);
    }

    #[test]
    fn test_close_button_collapses_and_double_click_reshows() {
        let (process, mut scene, mut surface) = linked();
        scene.redraw(&process, &mut surface);
        let object = scene.object_node(42).unwrap();
        scene.take_redraw_request();

        // Close button: object origin + (295, 5)
        assert!(scene.handle_mouse(MouseEventKind::Released, Point::new(645, 11)));
        assert!(!scene.is_shown(object));
        assert!(scene.take_redraw_request());

        surface.clear();
        let outcome = scene.redraw(&process, &mut surface);
        assert_eq!(
            outcome,
            RedrawOutcome::Shown {
                frames: 1,
                objects: 0,
                arrows: 0
            }
        );
        assert!(surface.texts().contains(&"Node (id=42)"));
        assert_eq!(scene.object_node(42), Some(object));

        assert!(scene.handle_mouse(MouseEventKind::DoubleClicked, Point::new(209, 52)));
        assert!(scene.is_shown(object));
        assert!(scene.take_redraw_request());
        assert_eq!(scene.tree().root_bounds(object).origin(), Point::new(348, 4));
    }

    #[test]
    fn test_double_click_on_boundary_auto_fits_column() {
        let (process, mut scene, mut surface) = linked();
        scene.redraw(&process, &mut surface);

        assert!(scene.handle_mouse(MouseEventKind::DoubleClicked, Point::new(159, 52)));
        assert_eq!(scene.stack_table().names(), 20);
        assert!(scene.take_redraw_request());
        // Frame and heap follow the narrower table
        assert_eq!(scene.tree().get(scene.frames()[0]).width, 5 + 170 + 5);

        let rows = scene.rows(scene.frames()[0]);
        assert_eq!(scene.auto_fit(rows[0], Column::Names), 20);
    }

    #[test]
    fn test_fault_leaves_fields_in_place() {
        let (mut process, mut scene, mut surface) = linked();
        process.put_object(
            42,
            ObjectState::new(
                "demo.Node",
                vec![
                    Variable::primitive("f", "int", "10"),
                    Variable::object("g", "demo.Node", 43),
                ],
            ),
        );
        process.put_object(43, ObjectState::new("demo.Node", vec![Variable::primitive("f", "int", "11")]));
        assert!(matches!(scene.redraw(&process, &mut surface), RedrawOutcome::Shown { arrows: 2, .. }));
        let object = scene.object_node(42).unwrap();
        let height = scene.tree().get(object).height;

        // 42 is rebuilt, then its field g fails to resolve
        process.remove_object(43);
        let outcome = scene.redraw(&process, &mut surface);
        assert!(matches!(outcome, RedrawOutcome::Faulted(IntrospectionError::UnknownObject(43))));
        assert!(scene.call_stack().is_none());
        let rows = scene.rows(object);
        assert_eq!(rows.len(), 2);
        let g = scene.row(rows[1]).unwrap();
        assert_eq!(g.pending_object(), None);
        assert_eq!(g.target(), None);
        assert_eq!(scene.tree().get(object).height, height);

        process.put_object(43, ObjectState::new("demo.Node", vec![Variable::primitive("f", "int", "11")]));
        surface.clear();
        let outcome = scene.redraw(&process, &mut surface);
        assert!(matches!(outcome, RedrawOutcome::Shown { arrows: 2, .. }));
    }

    #[test]
    fn test_unavailable_process_recovers() {
        let (mut process, mut scene, mut surface) = linked();
        scene.redraw(&process, &mut surface);
        process.set_unavailable(Some("VM disconnected"));
        let outcome = scene.redraw(&process, &mut surface);
        assert!(matches!(outcome, RedrawOutcome::Faulted(_)));
        assert!(scene.call_stack().is_none());

        process.set_unavailable(None);
        surface.clear();
        let outcome = scene.redraw(&process, &mut surface);
        assert!(matches!(outcome, RedrawOutcome::Shown { arrows: 1, .. }));
    }
}
