// src/geometry.rs

//! Screen geometry for the popup: monitor lookup under the pointer and the
//! final top-left placement of the window.
//!
//! Nothing here is clamped to the visible screen. An offset that pushes the
//! popup off-screen is honoured as requested.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// A position in root-window pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle, used for monitors and for the popup itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle of `size` anchored at the origin, e.g. the whole screen.
    pub const fn from_size(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    /// Area shared by `self` and `other`, zero when they are disjoint.
    pub fn intersection_area(&self, other: &Rect) -> u64 {
        let overlap_w = self.right().min(other.right()) - (self.x as i64).max(other.x as i64);
        let overlap_h = self.bottom().min(other.bottom()) - (self.y as i64).max(other.y as i64);
        (overlap_w.max(0) * overlap_h.max(0)) as u64
    }

    pub fn contains(&self, point: Point) -> bool {
        self.intersection_area(&Rect::new(point.x, point.y, 1, 1)) != 0
    }
}

/// Picks the monitor under `pointer`.
///
/// The first monitor overlapping a 1x1 probe at the pointer wins, so
/// overlapping (mirrored) outputs resolve to whichever the server listed
/// first. Falls back to `screen` when the list is empty or nothing matches.
pub fn resolve_monitor(pointer: Point, monitors: &[Rect], screen: Rect) -> Rect {
    monitors
        .iter()
        .copied()
        .find(|monitor| monitor.contains(pointer))
        .unwrap_or(screen)
}

bitflags! {
    /// Screen corner the anchored popup is measured from.
    ///
    /// The empty set is the top-left corner; each flag flips one axis.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Corner: u8 {
        const RIGHT = 1 << 0;
        const BOTTOM = 1 << 1;
    }
}

impl Corner {
    pub const TOP_LEFT: Corner = Corner::empty();
    pub const TOP_RIGHT: Corner = Corner::RIGHT;
    pub const BOTTOM_LEFT: Corner = Corner::BOTTOM;
    pub const BOTTOM_RIGHT: Corner = Corner::RIGHT.union(Corner::BOTTOM);
}

/// How the popup is positioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Centered on the given monitor (usually the one under the pointer).
    Centered { monitor: Rect },
    /// `offset` pixels away from `corner` of a `screen`-sized root window.
    /// `border` is the window border width, counted twice on flipped axes.
    Anchored {
        screen: Size,
        offset: Point,
        corner: Corner,
        border: u32,
    },
}

/// Top-left coordinate of a popup of `popup` size under `placement`.
///
/// Centering uses truncating division, so an odd leftover pixel goes to the
/// far side and a popup larger than the monitor shifts toward its origin.
pub fn place(popup: Size, placement: &Placement) -> Point {
    match *placement {
        Placement::Centered { monitor } => Point::new(
            monitor.x + (monitor.width as i32 - popup.width as i32) / 2,
            monitor.y + (monitor.height as i32 - popup.height as i32) / 2,
        ),
        Placement::Anchored {
            screen,
            offset,
            corner,
            border,
        } => {
            let mut origin = offset;
            if corner.contains(Corner::RIGHT) {
                origin.x = screen.width as i32 - popup.width as i32 - 2 * border as i32 - offset.x;
            }
            if corner.contains(Corner::BOTTOM) {
                origin.y =
                    screen.height as i32 - popup.height as i32 - 2 * border as i32 - offset.y;
            }
            origin
        }
    }
}

/// Window height for `line_count` lines of text.
pub fn popup_height(line_count: usize, text_height: u32, line_spacing: u32, padding: u32) -> u32 {
    let lines = line_count as u32;
    lines.saturating_sub(1) * line_spacing + lines * text_height + 2 * padding
}

/// Baseline of line `index`, measured from the top of the window.
pub fn baseline_y(index: usize, text_height: u32, line_spacing: u32, padding: u32) -> i32 {
    let i = index as i32;
    line_spacing as i32 * i + text_height as i32 * (i + 1) + padding as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: Rect = Rect::new(0, 0, 3840, 1080);

    fn dual_head() -> Vec<Rect> {
        vec![Rect::new(0, 0, 1920, 1080), Rect::new(1920, 0, 1920, 1080)]
    }

    #[test_log::test]
    fn intersection_of_disjoint_rects_is_zero() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(20, 20, 10, 10);
        assert_eq!(a.intersection_area(&b), 0);
        assert_eq!(b.intersection_area(&a), 0);
    }

    #[test_log::test]
    fn intersection_of_overlapping_rects() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, -5, 10, 10);
        assert_eq!(a.intersection_area(&b), 25);
    }

    #[test_log::test]
    fn touching_edges_do_not_intersect() {
        let a = Rect::new(0, 0, 10, 10);
        assert!(!a.contains(Point::new(10, 5)));
        assert!(a.contains(Point::new(9, 9)));
    }

    #[test_log::test]
    fn resolves_monitor_under_pointer() {
        let monitors = dual_head();
        assert_eq!(
            resolve_monitor(Point::new(2000, 500), &monitors, SCREEN),
            monitors[1]
        );
        assert_eq!(
            resolve_monitor(Point::new(0, 0), &monitors, SCREEN),
            monitors[0]
        );
    }

    #[test_log::test]
    fn first_listed_monitor_wins_when_mirrored() {
        let monitors = vec![Rect::new(0, 0, 1280, 1024), Rect::new(0, 0, 1920, 1080)];
        assert_eq!(
            resolve_monitor(Point::new(100, 100), &monitors, SCREEN),
            monitors[0]
        );
    }

    #[test_log::test]
    fn falls_back_to_screen_without_monitors() {
        assert_eq!(resolve_monitor(Point::new(100, 100), &[], SCREEN), SCREEN);
    }

    #[test_log::test]
    fn falls_back_to_screen_when_pointer_is_outside_every_monitor() {
        let monitors = vec![Rect::new(0, 0, 100, 100)];
        assert_eq!(
            resolve_monitor(Point::new(500, 500), &monitors, SCREEN),
            SCREEN
        );
    }

    #[test_log::test]
    fn centers_on_monitor() {
        let placement = Placement::Centered {
            monitor: Rect::new(1920, 0, 1920, 1080),
        };
        let origin = place(Size::new(450, 100), &placement);
        assert_eq!(origin, Point::new(1920 + 735, 490));
    }

    #[test_log::test]
    fn centering_rounds_toward_monitor_origin() {
        let monitor = Rect::new(10, 10, 101, 51);
        let origin = place(Size::new(50, 20), &Placement::Centered { monitor });
        assert_eq!(origin, Point::new(10 + 25, 10 + 15));

        let origin = place(Size::new(105, 55), &Placement::Centered { monitor });
        assert_eq!(origin, Point::new(10 - 2, 10 - 2));
    }

    fn anchored(corner: Corner) -> Placement {
        Placement::Anchored {
            screen: Size::new(1920, 1080),
            offset: Point::new(30, 60),
            corner,
            border: 2,
        }
    }

    #[test_log::test]
    fn anchors_to_every_corner() {
        let popup = Size::new(450, 100);
        assert_eq!(place(popup, &anchored(Corner::TOP_LEFT)), Point::new(30, 60));
        assert_eq!(
            place(popup, &anchored(Corner::TOP_RIGHT)),
            Point::new(1920 - 450 - 4 - 30, 60)
        );
        assert_eq!(
            place(popup, &anchored(Corner::BOTTOM_LEFT)),
            Point::new(30, 1080 - 100 - 4 - 60)
        );
        assert_eq!(
            place(popup, &anchored(Corner::BOTTOM_RIGHT)),
            Point::new(1920 - 450 - 4 - 30, 1080 - 100 - 4 - 60)
        );
    }

    #[test_log::test]
    fn off_screen_offsets_are_not_clamped() {
        let placement = Placement::Anchored {
            screen: Size::new(800, 600),
            offset: Point::new(-50, 5000),
            corner: Corner::TOP_LEFT,
            border: 0,
        };
        assert_eq!(place(Size::new(450, 100), &placement), Point::new(-50, 5000));
    }

    #[test_log::test]
    fn height_accounts_for_spacing_and_padding() {
        assert_eq!(popup_height(1, 9, 5, 15), 9 + 30);
        assert_eq!(popup_height(3, 9, 5, 15), 2 * 5 + 3 * 9 + 30);
        assert_eq!(popup_height(0, 9, 5, 15), 30);
    }

    #[test_log::test]
    fn baselines_step_by_text_height_plus_spacing() {
        assert_eq!(baseline_y(0, 9, 5, 15), 24);
        assert_eq!(baseline_y(1, 9, 5, 15), 38);
    }

    #[test_log::test]
    fn corner_parses_from_flag_names() {
        let corner: Corner = serde_json::from_str("\"RIGHT | BOTTOM\"").unwrap();
        assert_eq!(corner, Corner::BOTTOM_RIGHT);
        let corner: Corner = serde_json::from_str("\"\"").unwrap();
        assert_eq!(corner, Corner::TOP_LEFT);
    }
}
