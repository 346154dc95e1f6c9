//! Placing floating overlays next to an anchor element.
//!
//! Overlays go 5px below the anchor, shifted 50px left, then get nudged back
//! into the viewport: horizontally by clamping, vertically by flipping above
//! the anchor when there is room, otherwise pinning near the top with a
//! capped height.

use web_sys::{Element, HtmlElement};

use crate::dom::set_style;

const GAP: f64 = 5.0;
const LEFT_SHIFT: f64 = 50.0;
const MARGIN: f64 = 10.0;

/// Viewport-relative rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    fn of(element: &Element) -> Self {
        let r = element.get_bounding_client_rect();
        Self {
            left: r.left(),
            top: r.top(),
            width: r.width(),
            height: r.height(),
        }
    }
}

/// Page-relative placement for an overlay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayPosition {
    pub top: f64,
    pub left: f64,
    pub max_height: Option<f64>,
}

/// Where an overlay of size `overlay` should go for `anchor`, given the
/// viewport size and scroll offsets.
pub fn compute_position(
    anchor: Rect,
    overlay: (f64, f64),
    viewport: (f64, f64),
    scroll: (f64, f64),
) -> OverlayPosition {
    let (width, height) = overlay;
    let (viewport_width, viewport_height) = viewport;
    let (scroll_x, scroll_y) = scroll;

    let mut left = anchor.left - LEFT_SHIFT;
    if left + width > viewport_width {
        left = (viewport_width - width - MARGIN).max(MARGIN - scroll_x);
    } else if left < 0.0 {
        left = MARGIN;
    }

    let mut top = anchor.bottom() + GAP;
    let mut max_height = None;
    if top + height > viewport_height {
        if anchor.top > height {
            top = anchor.top - height - GAP;
        } else {
            top = (viewport_height - height - MARGIN).max(MARGIN);
            if height > viewport_height - 2.0 * MARGIN {
                max_height = Some(viewport_height - 4.0 * MARGIN);
            }
        }
    }

    OverlayPosition {
        top: top + scroll_y,
        left: left + scroll_x,
        max_height,
    }
}

/// Position `overlay` (already attached, `position: absolute`) near `anchor`.
pub fn position_near(overlay: &HtmlElement, anchor: &Element) {
    let Some(window) = overlay
        .owner_document()
        .and_then(|d| d.default_view())
    else {
        return;
    };
    let viewport = (
        window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0),
        window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0),
    );
    let scroll = (
        window.scroll_x().unwrap_or(0.0),
        window.scroll_y().unwrap_or(0.0),
    );
    let own = Rect::of(overlay);
    let pos = compute_position(Rect::of(anchor), (own.width, own.height), viewport, scroll);

    let style = overlay.style();
    set_style(&style, "top", &format!("{}px", pos.top));
    set_style(&style, "left", &format!("{}px", pos.left));
    if let Some(max) = pos.max_height {
        set_style(&style, "max-height", &format!("{max}px"));
        set_style(&style, "overflow-y", "auto");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor(left: f64, top: f64) -> Rect {
        Rect {
            left,
            top,
            width: 40.0,
            height: 20.0,
        }
    }

    #[test]
    fn test_below_and_shifted_left() {
        let pos = compute_position(anchor(200.0, 100.0), (180.0, 120.0), (1024.0, 768.0), (0.0, 0.0));
        assert_eq!(pos.top, 125.0);
        assert_eq!(pos.left, 150.0);
        assert_eq!(pos.max_height, None);
    }

    #[test]
    fn test_scroll_offsets_are_added() {
        let pos = compute_position(anchor(200.0, 100.0), (180.0, 120.0), (1024.0, 768.0), (5.0, 300.0));
        assert_eq!(pos.top, 425.0);
        assert_eq!(pos.left, 155.0);
    }

    #[test]
    fn test_clamped_at_right_edge() {
        let pos = compute_position(anchor(980.0, 100.0), (180.0, 120.0), (1024.0, 768.0), (0.0, 0.0));
        assert_eq!(pos.left, 1024.0 - 180.0 - 10.0);
    }

    #[test]
    fn test_clamped_at_left_edge() {
        let pos = compute_position(anchor(10.0, 100.0), (180.0, 120.0), (1024.0, 768.0), (0.0, 0.0));
        assert_eq!(pos.left, 10.0);
    }

    #[test]
    fn test_flips_above_when_no_room_below() {
        let pos = compute_position(anchor(200.0, 700.0), (180.0, 120.0), (1024.0, 768.0), (0.0, 0.0));
        assert_eq!(pos.top, 700.0 - 120.0 - 5.0);
    }

    #[test]
    fn test_tall_overlay_gets_max_height() {
        let pos = compute_position(anchor(200.0, 50.0), (180.0, 900.0), (1024.0, 768.0), (0.0, 0.0));
        assert_eq!(pos.top, 10.0);
        assert_eq!(pos.max_height, Some(728.0));
    }
}
