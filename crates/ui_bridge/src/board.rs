//! Render-free model of a screen of draggable widgets driven by gestures.

use serde::Serialize;
use tracing::debug;

use crate::{dispatch::GestureHandler, error::BoardError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Edges count as inside.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        (self.x..=self.right()).contains(&x) && (self.y..=self.bottom()).contains(&y)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Widget {
    name: String,
    bounds: Rect,
}

impl Widget {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }
}

/// Something the board did in response to a gesture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "notice", rename_all = "snake_case")]
pub enum BoardNotice {
    Grabbed { name: String },
    Moved { name: String, x: i32, y: i32 },
    Released { name: String },
    Clicked { name: String },
}

#[derive(Debug, Clone, Copy)]
struct Grab {
    index: usize,
    offset_x: i32,
    offset_y: i32,
}

#[derive(Debug, Clone)]
pub struct WidgetBoard {
    area: Rect,
    /// Stacking order: later entries are drawn above earlier ones.
    widgets: Vec<Widget>,
    cursor: (i32, i32),
    pinching: bool,
    grab: Option<Grab>,
    notices: Vec<BoardNotice>,
}

impl WidgetBoard {
    pub fn new(area: Rect) -> Result<Self, BoardError> {
        if area.width <= 0 || area.height <= 0 {
            return Err(BoardError::InvalidArea {
                width: area.width,
                height: area.height,
            });
        }
        Ok(Self {
            area,
            widgets: Vec::new(),
            cursor: (area.x + area.width / 2, area.y + area.height / 2),
            pinching: false,
            grab: None,
            notices: Vec::new(),
        })
    }

    /// Adds a widget on top of the stack. Its position is clamped into the board.
    pub fn add_widget(&mut self, name: impl Into<String>, bounds: Rect) -> Result<(), BoardError> {
        let name = name.into();
        if self.widgets.iter().any(|widget| widget.name == name) {
            return Err(BoardError::DuplicateWidget(name));
        }
        if bounds.width <= 0 || bounds.height <= 0 {
            return Err(BoardError::EmptyWidget {
                name,
                width: bounds.width,
                height: bounds.height,
            });
        }
        if bounds.width > self.area.width || bounds.height > self.area.height {
            return Err(BoardError::WidgetTooLarge { name });
        }

        let (x, y) = self.clamp_origin(bounds, bounds.x, bounds.y);
        self.widgets.push(Widget {
            name,
            bounds: Rect { x, y, ..bounds },
        });
        Ok(())
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    pub fn widget(&self, name: &str) -> Option<&Widget> {
        self.widgets.iter().find(|widget| widget.name == name)
    }

    pub fn cursor(&self) -> (i32, i32) {
        self.cursor
    }

    /// Whether the cursor should be drawn in its pinched style.
    pub fn is_pinching(&self) -> bool {
        self.pinching
    }

    pub fn grabbed(&self) -> Option<&str> {
        self.grab
            .and_then(|grab| self.widgets.get(grab.index))
            .map(Widget::name)
    }

    /// Topmost widget under the point.
    pub fn hit_test(&self, x: i32, y: i32) -> Option<&Widget> {
        self.hit_index(x, y).map(|index| &self.widgets[index])
    }

    pub fn take_notices(&mut self) -> Vec<BoardNotice> {
        std::mem::take(&mut self.notices)
    }

    fn hit_index(&self, x: i32, y: i32) -> Option<usize> {
        self.widgets
            .iter()
            .rposition(|widget| widget.bounds.contains(x, y))
    }

    fn clamp_origin(&self, bounds: Rect, x: i32, y: i32) -> (i32, i32) {
        let max_x = self.area.right() - bounds.width;
        let max_y = self.area.bottom() - bounds.height;
        (x.clamp(self.area.x, max_x), y.clamp(self.area.y, max_y))
    }

    fn release(&mut self) {
        if let Some(grab) = self.grab.take() {
            let name = self.widgets[grab.index].name.clone();
            debug!(widget = %name, "widget released");
            self.notices.push(BoardNotice::Released { name });
        }
    }
}

impl GestureHandler for WidgetBoard {
    fn cursor_moved(&mut self, x: i32, y: i32) {
        self.cursor = (x, y);
    }

    fn pinch_started(&mut self, x: i32, y: i32) {
        self.cursor = (x, y);
        self.pinching = true;
        if self.grab.is_some() {
            return;
        }

        if let Some(index) = self.hit_index(x, y) {
            let bounds = self.widgets[index].bounds;
            self.grab = Some(Grab {
                index,
                offset_x: x - bounds.x,
                offset_y: y - bounds.y,
            });
            let name = self.widgets[index].name.clone();
            debug!(widget = %name, x, y, "widget grabbed");
            self.notices.push(BoardNotice::Grabbed { name });
        }
    }

    fn drag_started(&mut self, x: i32, y: i32, _start_x: i32, _start_y: i32) {
        // The grab was taken at pinch start; the widget moves from the next DragMove.
        self.cursor = (x, y);
    }

    fn drag_moved(&mut self, x: i32, y: i32, _dx: i32, _dy: i32) {
        self.cursor = (x, y);
        let Some(grab) = self.grab else {
            return;
        };

        let bounds = self.widgets[grab.index].bounds;
        let (new_x, new_y) = self.clamp_origin(bounds, x - grab.offset_x, y - grab.offset_y);
        if (new_x, new_y) == (bounds.x, bounds.y) {
            return;
        }

        let widget = &mut self.widgets[grab.index];
        widget.bounds.x = new_x;
        widget.bounds.y = new_y;
        self.notices.push(BoardNotice::Moved {
            name: widget.name.clone(),
            x: new_x,
            y: new_y,
        });
    }

    fn drag_ended(&mut self, x: i32, y: i32) {
        self.cursor = (x, y);
        self.pinching = false;
        self.release();
    }

    fn clicked(&mut self, x: i32, y: i32) {
        self.cursor = (x, y);
        self.pinching = false;
        self.release();
        if let Some(widget) = self.hit_test(x, y) {
            let name = widget.name.clone();
            debug!(widget = %name, x, y, "widget clicked");
            self.notices.push(BoardNotice::Clicked { name });
        }
    }
}

#[cfg(test)]
#[path = "tests/board_tests.rs"]
mod tests;
