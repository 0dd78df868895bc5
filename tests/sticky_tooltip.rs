use std::time::{Duration, Instant};

use scout_terminal::radar::Rgba;
use scout_terminal::tooltip::{HIDE_DELAY, StickyTooltip, TooltipContent, TooltipRow};

fn content() -> TooltipContent {
    TooltipContent::Chart {
        title: "Gls".to_string(),
        description: String::new(),
        rows: vec![TooltipRow {
            name: "Input".to_string(),
            value: "0.9".to_string(),
            color: Rgba::new(0, 0, 0, 1.0),
        }],
    }
}

fn shown() -> StickyTooltip {
    let mut tip = StickyTooltip::default();
    tip.pointer_enter_canvas();
    tip.show_chart(content(), (10, 5));
    tip
}

#[test]
fn chart_tooltip_is_offset_from_caret() {
    let tip = shown();
    assert!(tip.is_visible());
    assert_eq!(tip.anchor(), (12, 6));
}

#[test]
fn stays_visible_while_moving_from_canvas_into_panel() {
    let now = Instant::now();
    let mut tip = shown();

    tip.pointer_leave_canvas(now);
    tip.pointer_enter_tooltip();
    tip.tick(now + HIDE_DELAY * 3);
    assert!(tip.is_visible());

    // No active point while the pointer sits on the panel: ignored.
    tip.chart_inactive(now + HIDE_DELAY * 3);
    tip.tick(now + HIDE_DELAY * 6);
    assert!(tip.is_visible());
}

#[test]
fn hides_after_delay_outside_both_regions() {
    let now = Instant::now();
    let mut tip = shown();

    tip.pointer_leave_canvas(now);
    tip.tick(now + Duration::from_millis(100));
    assert!(tip.is_visible());
    tip.tick(now + HIDE_DELAY);
    assert!(!tip.is_visible());
}

#[test]
fn reentering_cancels_pending_hide() {
    let now = Instant::now();
    let mut tip = shown();

    tip.pointer_leave_canvas(now);
    tip.pointer_enter_canvas();
    assert_eq!(tip.hide_deadline(), None);
    tip.tick(now + HIDE_DELAY * 2);
    assert!(tip.is_visible());

    tip.pointer_leave_canvas(now + HIDE_DELAY * 2);
    tip.pointer_enter_tooltip();
    tip.tick(now + HIDE_DELAY * 4);
    assert!(tip.is_visible());
    tip.pointer_leave_tooltip(now + HIDE_DELAY * 4);
    tip.tick(now + HIDE_DELAY * 5);
    assert!(!tip.is_visible());
}

#[test]
fn inactive_inside_canvas_keeps_panel() {
    let now = Instant::now();
    let mut tip = shown();
    tip.chart_inactive(now);
    assert_eq!(tip.hide_deadline(), None);
    tip.tick(now + HIDE_DELAY * 2);
    assert!(tip.is_visible());
}
