//! Reorderable list driven by mouse drags
//!
//! Pointer events flow through a small state machine:
//!
//! ```text
//! Idle --press(primary, on item)--> Pressed --move(delta != 0)--> Dragging
//!  ^                                   |                              |
//!  +-------------release---------------+-------------release----------+
//! ```
//!
//! A new primary press while captured starts over from `Idle`.
//!
//! Only the first move after a press is special: it starts the drag and does
//! not move the item. Every following move shifts the captured item by the
//! number of rows the pointer travelled, clamped to the list bounds.

use std::future::Future;

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::{layout::Rect, Frame};
use serde_json::Value;
use tracing::debug;

use crate::browser_tui::{
    components::list_view::{ListViewConfig, SelectableList, Selected},
    traits::Navigable,
    ui::Theme,
};
use crate::itkdb::{record_i64, ItkdbError, Record};

/// Where the pointer interaction currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    /// Primary button held on `index`, pointer not moved yet
    Pressed { index: usize, column: u16, row: u16 },
    /// Item at `index` follows the pointer; `row` is the last applied position
    Dragging { index: usize, row: u16 },
}

/// Notifications produced by pointer events
#[derive(Debug, Clone, PartialEq)]
pub enum DragEvent {
    /// A plain click on an item, no movement in between
    Clicked(Selected),
    DragStarted { index: usize },
    Moved { from: usize, to: usize },
    DragStopped { index: usize },
}

/// Result of trying to persist one item's new position
#[derive(Debug, Clone, PartialEq)]
pub struct OrderChange {
    pub label: String,
    pub old_order: Option<i64>,
    pub new_order: i64,
    pub result: Result<(), String>,
}

impl OrderChange {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }

    /// One log line describing the attempt
    pub fn describe(&self) -> String {
        let old = self
            .old_order
            .map(|o| o.to_string())
            .unwrap_or_else(|| "?".to_string());
        match &self.result {
            Ok(()) => format!("✓ {}: {} ▶ {}", self.label, old, self.new_order),
            Err(e) => format!("✗ {}: {} ▶ {} ({})", self.label, old, self.new_order, e),
        }
    }
}

pub struct DraggableList {
    pub list: SelectableList,
    drag: DragState,
    order_key: String,
}

impl DraggableList {
    pub fn new(config: ListViewConfig, order_key: &str) -> Self {
        Self {
            list: SelectableList::new(config),
            drag: DragState::Idle,
            order_key: order_key.to_string(),
        }
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    /// Repopulate from `records` sorted by the order key, dropping any drag in progress
    pub fn rebuild(&mut self, records: Vec<Record>) {
        self.drag = DragState::Idle;
        self.list.populate(records, &self.order_key);
    }

    pub fn clear(&mut self) {
        self.drag = DragState::Idle;
        self.list.clear();
    }

    /// Primary button went down at a terminal cell
    ///
    /// A press while still captured means the release was never delivered
    /// (button let go outside the terminal); the stale capture is dropped first.
    pub fn press(&mut self, button: MouseButton, column: u16, row: u16) -> Option<DragEvent> {
        if button != MouseButton::Left {
            return None;
        }
        if self.drag != DragState::Idle {
            debug!("Dropping stale capture {:?}", self.drag);
            self.drag = DragState::Idle;
        }
        let index = self.list.item_at(column, row)?;
        self.drag = DragState::Pressed { index, column, row };
        None
    }

    /// Pointer moved while captured
    pub fn move_to(&mut self, column: u16, row: u16) -> Option<DragEvent> {
        match self.drag {
            DragState::Idle => None,
            DragState::Pressed {
                index,
                column: origin_column,
                row: origin_row,
            } => {
                if column == origin_column && row == origin_row {
                    return None;
                }
                self.drag = DragState::Dragging {
                    index,
                    row: origin_row,
                };
                self.list.set_selected_index(Some(index));
                debug!("Drag started on item {}", index);
                Some(DragEvent::DragStarted { index })
            }
            DragState::Dragging { index, row: last_row } => {
                let delta = row as i64 - last_row as i64;
                if delta == 0 {
                    return None;
                }
                let to = self.shift(index, delta);
                self.drag = DragState::Dragging { index: to, row };
                (to != index).then_some(DragEvent::Moved { from: index, to })
            }
        }
    }

    /// Primary button released, wherever the pointer is
    pub fn release(&mut self, button: MouseButton) -> Option<DragEvent> {
        if button != MouseButton::Left {
            return None;
        }
        let previous = std::mem::replace(&mut self.drag, DragState::Idle);
        match previous {
            DragState::Idle => None,
            DragState::Pressed { index, .. } => self.list.select(index).map(DragEvent::Clicked),
            DragState::Dragging { index, .. } => {
                debug!("Drag stopped on item {}", index);
                Some(DragEvent::DragStopped { index })
            }
        }
    }

    /// Dispatch a raw crossterm mouse event to press / move / release
    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> Option<DragEvent> {
        match mouse.kind {
            MouseEventKind::Down(button) => self.press(button, mouse.column, mouse.row),
            MouseEventKind::Drag(MouseButton::Left) => self.move_to(mouse.column, mouse.row),
            MouseEventKind::Up(button) => self.release(button),
            _ => None,
        }
    }

    /// Move the highlighted item by `delta` rows from the keyboard
    pub fn move_highlighted(&mut self, delta: i64) -> Option<DragEvent> {
        if self.drag != DragState::Idle {
            return None;
        }
        let from = self.list.highlighted()?;
        let to = self.shift(from, delta);
        (to != from).then_some(DragEvent::Moved { from, to })
    }

    fn shift(&mut self, index: usize, delta: i64) -> usize {
        let last = self.list.len().saturating_sub(1) as i64;
        let target = (index as i64 + delta).clamp(0, last) as usize;
        if target != index {
            self.list.move_item(index, target);
        }
        target
    }

    /// Assign 1-based orders top to bottom and persist every changed item.
    ///
    /// Each item is attempted even when earlier ones failed; an item only takes
    /// its new order when `save` succeeded for it.
    pub async fn commit_order<F, Fut>(&mut self, mut save: F) -> Vec<OrderChange>
    where
        F: FnMut(Record, i64) -> Fut,
        Fut: Future<Output = Result<(), ItkdbError>>,
    {
        let order_key = self.order_key.clone();
        let mut changes = Vec::new();

        for (position, item) in self.list.items_mut().iter_mut().enumerate() {
            let new_order = position as i64 + 1;
            let old_order = record_i64(&item.value, &order_key);
            if old_order == Some(new_order) {
                continue;
            }

            let result = save(item.value.clone(), new_order).await;
            if result.is_ok() {
                item.value
                    .insert(order_key.clone(), Value::from(new_order));
            }
            changes.push(OrderChange {
                label: item.label.clone(),
                old_order,
                new_order,
                result: result.map_err(|e| e.to_string()),
            });
        }

        changes
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, theme: Theme) {
        self.list.render(f, area, theme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::itkdb::{record_str, testing::record};
    use ratatui::{backend::TestBackend, Terminal};
    use serde_json::json;
    use std::cell::RefCell;

    const TOP: u16 = 1;

    fn stages(n: usize) -> Vec<Record> {
        (1..=n)
            .map(|i| {
                record(json!({
                    "code": format!("S{}", i),
                    "name": format!("Stage {}", i),
                    "order": i
                }))
            })
            .collect()
    }

    /// Render once so the list knows its geometry: item i sits on row TOP + i
    fn rendered(records: Vec<Record>) -> DraggableList {
        let mut list = DraggableList::new(ListViewConfig::new("Stages"), "order");
        list.rebuild(records);
        let mut terminal = Terminal::new(TestBackend::new(30, 12)).unwrap();
        terminal
            .draw(|f| list.render(f, f.size(), Theme::Dark))
            .unwrap();
        list
    }

    fn codes(list: &DraggableList) -> Vec<String> {
        list.list
            .items()
            .iter()
            .map(|item| record_str(&item.value, "code").unwrap())
            .collect()
    }

    fn orders(list: &DraggableList) -> Vec<i64> {
        list.list
            .items()
            .iter()
            .map(|item| record_i64(&item.value, "order").unwrap())
            .collect()
    }

    fn drag(list: &mut DraggableList, from_row: u16, to_rows: &[u16]) -> Vec<DragEvent> {
        let mut events = Vec::new();
        events.extend(list.press(MouseButton::Left, 3, from_row));
        for row in to_rows {
            events.extend(list.move_to(3, *row));
        }
        events.extend(list.release(MouseButton::Left));
        events
    }

    #[test]
    fn test_click_without_movement_is_not_a_drag() {
        let mut list = rendered(stages(3));
        let events = drag(&mut list, TOP + 1, &[]);
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], DragEvent::Clicked(sel) if sel.index == 1));
        assert_eq!(codes(&list), vec!["S1", "S2", "S3"]);
        assert_eq!(list.drag_state(), DragState::Idle);
    }

    #[test]
    fn test_first_move_only_starts_the_drag() {
        let mut list = rendered(stages(3));
        list.press(MouseButton::Left, 3, TOP);
        assert_eq!(
            list.move_to(3, TOP + 1),
            Some(DragEvent::DragStarted { index: 0 })
        );
        assert_eq!(codes(&list), vec!["S1", "S2", "S3"]);
        assert_eq!(
            list.move_to(3, TOP + 2),
            Some(DragEvent::Moved { from: 0, to: 2 })
        );
        assert_eq!(codes(&list), vec!["S2", "S3", "S1"]);
        assert_eq!(
            list.release(MouseButton::Left),
            Some(DragEvent::DragStopped { index: 2 })
        );
        assert_eq!(list.list.highlighted(), Some(2));
    }

    #[test]
    fn test_horizontal_move_starts_drag_too() {
        let mut list = rendered(stages(2));
        list.press(MouseButton::Left, 3, TOP);
        assert_eq!(list.move_to(4, TOP), Some(DragEvent::DragStarted { index: 0 }));
        assert_eq!(list.move_to(5, TOP), None);
    }

    #[test]
    fn test_drag_is_clamped_at_both_ends() {
        let mut list = rendered(stages(4));
        let events = drag(&mut list, TOP, &[TOP, TOP + 1, TOP + 9]);
        assert!(events.contains(&DragEvent::DragStopped { index: 3 }));
        assert_eq!(codes(&list), vec!["S2", "S3", "S4", "S1"]);

        let mut list = rendered(stages(4));
        list.press(MouseButton::Left, 3, TOP + 3);
        list.move_to(3, TOP + 2);
        // four rows up from index 3 is pinned at index 0
        assert_eq!(list.move_to(3, 0), Some(DragEvent::Moved { from: 3, to: 0 }));
        list.release(MouseButton::Left);
        assert_eq!(codes(&list), vec!["S4", "S1", "S2", "S3"]);
    }

    #[test]
    fn test_other_buttons_are_ignored() {
        let mut list = rendered(stages(3));
        assert_eq!(list.press(MouseButton::Right, 3, TOP), None);
        assert_eq!(list.drag_state(), DragState::Idle);

        list.press(MouseButton::Left, 3, TOP);
        list.move_to(3, TOP + 1);
        assert_eq!(list.release(MouseButton::Right), None);
        assert!(matches!(list.drag_state(), DragState::Dragging { .. }));
        assert_eq!(
            list.release(MouseButton::Left),
            Some(DragEvent::DragStopped { index: 0 })
        );
    }

    #[test]
    fn test_press_outside_items_does_nothing() {
        let mut list = rendered(stages(2));
        assert_eq!(list.press(MouseButton::Left, 3, TOP + 5), None);
        assert_eq!(list.drag_state(), DragState::Idle);
    }

    #[test]
    fn test_only_one_item_captured_at_a_time() {
        let mut list = rendered(stages(3));
        list.press(MouseButton::Left, 3, TOP);
        list.press(MouseButton::Left, 3, TOP + 2);
        assert!(matches!(list.drag_state(), DragState::Pressed { index: 2, .. }));
    }

    #[test]
    fn test_missed_release_does_not_leak_into_next_drag() {
        let mut list = rendered(stages(3));
        // drag S1 to the bottom, then the release never arrives
        list.press(MouseButton::Left, 3, TOP);
        list.move_to(3, TOP + 1);
        list.move_to(3, TOP + 2);
        assert_eq!(codes(&list), vec!["S2", "S3", "S1"]);
        assert!(matches!(list.drag_state(), DragState::Dragging { index: 2, .. }));

        // a fresh drag on S3 moves S3, not the stale S1
        list.press(MouseButton::Left, 3, TOP + 1);
        assert!(matches!(list.drag_state(), DragState::Pressed { index: 1, .. }));
        assert_eq!(
            list.move_to(3, TOP),
            Some(DragEvent::DragStarted { index: 1 })
        );
        assert_eq!(
            list.move_to(3, TOP),
            Some(DragEvent::Moved { from: 1, to: 0 })
        );
        assert_eq!(
            list.release(MouseButton::Left),
            Some(DragEvent::DragStopped { index: 0 })
        );
        assert_eq!(codes(&list), vec!["S3", "S2", "S1"]);

        // a press outside any item still clears the stale capture
        list.press(MouseButton::Left, 3, TOP);
        list.move_to(3, TOP + 1);
        assert_eq!(list.press(MouseButton::Left, 3, TOP + 8), None);
        assert_eq!(list.drag_state(), DragState::Idle);
    }

    #[test]
    fn test_rebuild_discards_drag_state() {
        let mut list = rendered(stages(3));
        list.press(MouseButton::Left, 3, TOP);
        list.move_to(3, TOP + 1);
        list.rebuild(stages(3));
        assert_eq!(list.drag_state(), DragState::Idle);
        assert_eq!(list.release(MouseButton::Left), None);
    }

    #[test]
    fn test_keyboard_move() {
        let mut list = rendered(stages(3));
        list.list.select(1);
        assert_eq!(list.move_highlighted(-1), Some(DragEvent::Moved { from: 1, to: 0 }));
        assert_eq!(list.move_highlighted(-1), None);
        assert_eq!(codes(&list), vec!["S2", "S1", "S3"]);
    }

    #[tokio::test]
    async fn test_commit_order_is_a_permutation() {
        let mut list = rendered(stages(5));
        drag(&mut list, TOP, &[TOP + 1, TOP + 4]);
        drag(&mut list, TOP + 2, &[TOP + 1, TOP]);

        let mut before = codes(&list);
        let changes = list.commit_order(|_, _| async { Ok::<(), ItkdbError>(()) }).await;
        assert!(changes.iter().all(OrderChange::succeeded));

        assert_eq!(orders(&list), vec![1, 2, 3, 4, 5]);
        let mut after = codes(&list);
        assert_eq!(before, after);
        before.sort();
        after.sort();
        assert_eq!(after, vec!["S1", "S2", "S3", "S4", "S5"]);
    }

    #[tokio::test]
    async fn test_commit_order_skips_unchanged_items() {
        let mut list = rendered(stages(3));
        let calls = RefCell::new(Vec::new());
        let changes = list
            .commit_order(|stage, order| {
                calls.borrow_mut().push((record_str(&stage, "code").unwrap(), order));
                async { Ok::<(), ItkdbError>(()) }
            })
            .await;
        assert!(changes.is_empty());
        assert!(calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_commit_order_partial_failure() {
        // S3 S1 S2: every item changes position
        let mut list = rendered(stages(3));
        drag(&mut list, TOP + 2, &[TOP + 1, TOP - 1]);
        assert_eq!(codes(&list), vec!["S3", "S1", "S2"]);

        let attempted = RefCell::new(Vec::new());
        let changes = list
            .commit_order(|stage, _| {
                let code = record_str(&stage, "code").unwrap();
                attempted.borrow_mut().push(code.clone());
                async move {
                    if code == "S1" {
                        Err(ItkdbError::request("updateComponentTypeStage", 400, "locked"))
                    } else {
                        Ok(())
                    }
                }
            })
            .await;

        assert_eq!(*attempted.borrow(), vec!["S3", "S1", "S2"]);
        assert_eq!(changes.len(), 3);
        assert_eq!(changes.iter().filter(|c| c.succeeded()).count(), 2);
        assert!(!changes[1].succeeded());
        // S3 -> 1, S1 keeps 1, S2 -> 3
        assert_eq!(orders(&list), vec![1, 1, 3]);
        assert_eq!(changes[0].describe(), "✓ Stage 3: 3 ▶ 1");
        assert!(changes[1].describe().starts_with("✗ Stage 1: 1 ▶ 2 ("));

        // a retry only touches the item that failed
        let retried = list.commit_order(|_, _| async { Ok::<(), ItkdbError>(()) }).await;
        assert_eq!(retried.len(), 1);
        assert_eq!(retried[0].label, "Stage 1");
        assert_eq!(orders(&list), vec![1, 2, 3]);
    }
}
