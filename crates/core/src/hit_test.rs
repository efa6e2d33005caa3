//! Map a surface point back to the event drawn under it.

use serde::Serialize;
use tracelane_protocol::Point;

use crate::model::EventId;
use crate::views::{TimelineLayout, TimelineScene};

/// What lies under a point inside the track area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HitResult {
    /// Index of the track row under the point.
    pub track: usize,
    /// Time under the point's x coordinate (µs).
    pub time: f64,
    /// Topmost event bar under the point, if any.
    pub event: Option<EventId>,
}

/// Hit-test `point` against `scene`.
///
/// Returns `None` outside the surface, over the header band or below the
/// last track. The whole row height belongs to the row, padding included.
/// Candidates are scanned in reverse draw order through the same culling and
/// bar geometry the renderer uses, so the result is always the bar painted
/// last at that spot.
pub fn hit_test(
    scene: &TimelineScene<'_>,
    layout: &TimelineLayout,
    point: Point,
) -> Option<HitResult> {
    if !scene.surface.bounds().contains(point) {
        return None;
    }
    let track_index = layout.row_at(point.y, scene.scroll_y)?;
    let track = scene.trace.tracks().get(track_index)?;

    let event = track.draw_order().rev().find_map(|(_, id)| {
        let event = scene.trace.event(id)?;
        let bar = scene.bar(event)?;
        bar.contains_x(point.x).then_some(id)
    });

    Some(HitResult {
        track: track_index,
        time: scene.viewport.to_time(point.x),
        event,
    })
}

#[cfg(test)]
mod tests {
    use tracelane_protocol::{RenderCommand, Surface};

    use super::*;
    use crate::config::TimelineConfig;
    use crate::model::{Phase, Trace, TraceEvent, TrackOrder};
    use crate::selection::Selection;
    use crate::viewport::Viewport;
    use crate::views::render_timeline;

    fn scene(trace: &Trace, viewport: Viewport) -> TimelineScene<'_> {
        TimelineScene {
            trace,
            viewport,
            surface: Surface::new(800.0, 600.0),
            scroll_y: 0.0,
            selection: Selection::default(),
        }
    }

    /// Middle of row 0's bar band with the default layout.
    const ROW0_Y: f64 = 50.0;

    #[test]
    fn overlapping_events_resolve_to_the_later_one() {
        let trace = Trace::from_events(
            vec![
                TraceEvent::complete("A", 0.0, 100.0, 1, 1),
                TraceEvent::complete("B", 50.0, 100.0, 1, 1),
            ],
            TrackOrder::FirstSeen,
        );
        let vp = Viewport::new(0.0, 2.0);
        let s = scene(&trace, vp);
        let layout = TimelineLayout::default();

        let hit = hit_test(&s, &layout, Point::new(vp.to_pixel(75.0), ROW0_Y)).unwrap();
        assert_eq!(hit.track, 0);
        assert_eq!(hit.event, Some(EventId(1)));
        assert!((hit.time - 75.0).abs() < 1e-9);

        let hit = hit_test(&s, &layout, Point::new(vp.to_pixel(25.0), ROW0_Y)).unwrap();
        assert_eq!(hit.event, Some(EventId(0)));
    }

    #[test]
    fn empty_space_in_a_row_hits_the_track_only() {
        let trace = Trace::from_events(
            vec![TraceEvent::complete("A", 0.0, 10.0, 1, 1)],
            TrackOrder::FirstSeen,
        );
        let s = scene(&trace, Viewport::new(0.0, 1.0));
        let hit = hit_test(&s, &TimelineLayout::default(), Point::new(500.0, ROW0_Y)).unwrap();
        assert_eq!(hit.track, 0);
        assert_eq!(hit.event, None);
    }

    #[test]
    fn whole_row_height_selects() {
        let trace = Trace::from_events(
            vec![TraceEvent::complete("A", 0.0, 100.0, 1, 1)],
            TrackOrder::FirstSeen,
        );
        let s = scene(&trace, Viewport::new(0.0, 1.0));
        // Row 0 spans 30..70; its padding band still belongs to the row.
        for y in [30.0, 31.0, 50.0, 69.0] {
            let hit = hit_test(&s, &TimelineLayout::default(), Point::new(50.0, y)).unwrap();
            assert_eq!(hit.event, Some(EventId(0)), "y={y}");
        }
    }

    #[test]
    fn misses_outside_tracks() {
        let trace = Trace::from_events(
            vec![TraceEvent::complete("A", 0.0, 100.0, 1, 1)],
            TrackOrder::FirstSeen,
        );
        let s = scene(&trace, Viewport::new(0.0, 1.0));
        let layout = TimelineLayout::default();
        assert_eq!(hit_test(&s, &layout, Point::new(50.0, 10.0)), None);
        assert_eq!(hit_test(&s, &layout, Point::new(50.0, 200.0)), None);
        assert_eq!(hit_test(&s, &layout, Point::new(-1.0, ROW0_Y)), None);
        assert_eq!(hit_test(&s, &layout, Point::new(900.0, ROW0_Y)), None);
    }

    #[test]
    fn zero_width_event_is_clickable_at_its_minimum_width() {
        let trace = Trace::from_events(
            vec![TraceEvent::new("mark", Phase::Instant, 100.0, 1, 1)],
            TrackOrder::FirstSeen,
        );
        let s = scene(&trace, Viewport::new(0.0, 1.0));
        let layout = TimelineLayout::default();
        let hit = hit_test(&s, &layout, Point::new(100.5, ROW0_Y)).unwrap();
        assert_eq!(hit.event, Some(EventId(0)));
        let hit = hit_test(&s, &layout, Point::new(102.0, ROW0_Y)).unwrap();
        assert_eq!(hit.event, None);
    }

    #[test]
    fn hit_matches_last_drawn_rect_under_point() {
        let events: Vec<_> = (0..30)
            .map(|i| {
                let i = f64::from(i);
                TraceEvent::complete("e", i * 7.0, 20.0 + (i * 3.0) % 11.0, 1, 1)
            })
            .collect();
        let trace = Trace::from_events(events, TrackOrder::FirstSeen);
        let s = scene(&trace, Viewport::new(0.0, 3.0));
        let config = TimelineConfig::default();
        let commands = render_timeline(&s, &config);

        for x in (0..800).step_by(7) {
            let point = Point::new(f64::from(x) + 0.25, ROW0_Y);
            let painted = commands.iter().rev().find_map(|cmd| match cmd {
                RenderCommand::DrawRect {
                    rect,
                    event_id: Some(id),
                    ..
                } if rect.contains(point) => Some(*id),
                _ => None,
            });
            let hit = hit_test(&s, &config.layout, point).and_then(|h| h.event);
            assert_eq!(hit.map(u64::from), painted, "x={}", point.x);
        }
    }
}
