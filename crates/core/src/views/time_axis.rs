use tracelane_protocol::{Point, RenderCommand, SharedStr, TextAlign, ThemeToken};

use crate::viewport::Viewport;

const MAJOR_TICK_HEIGHT: f64 = 10.0;
const MINOR_TICK_HEIGHT: f64 = 4.0;
const FONT_SIZE: f64 = 10.0;
const MIN_MAJOR_SPACING_PX: f64 = 100.0;
/// Safety valve against pathological widths or scales.
const MAX_TICKS: usize = 2_000;

/// Render the time ruler that sits in the header band: minor ticks, major
/// ticks and a label per major tick. Times are absolute microseconds.
pub fn render_time_axis(viewport: &Viewport, width: f64, height: f64) -> Vec<RenderCommand> {
    if width <= 0.0 || height <= 0.0 {
        return Vec::new();
    }
    let visible = viewport.visible_range(width);
    let (major, subdivisions) = nice_interval(visible.duration(), width);
    let minor = major / f64::from(subdivisions);

    let mut commands = Vec::with_capacity(64);
    commands.push(RenderCommand::BeginGroup {
        id: SharedStr::from("time-axis"),
        label: None,
    });

    let first = (visible.start / minor).floor() as i64;
    let last = (visible.end / minor).ceil() as i64;
    let count = usize::try_from(last - first).unwrap_or(0).min(MAX_TICKS);
    let subdivisions = i64::from(subdivisions);

    for step in 0..=count as i64 {
        let index = first + step;
        let t = index as f64 * minor;
        let x = viewport.to_pixel(t);
        if x < 0.0 || x > width {
            continue;
        }
        if index.rem_euclid(subdivisions) == 0 {
            commands.push(RenderCommand::DrawLine {
                from: Point::new(x, height - MAJOR_TICK_HEIGHT),
                to: Point::new(x, height),
                color: ThemeToken::AxisTick,
                width: 1.0,
            });
            commands.push(RenderCommand::DrawText {
                position: Point::new(x + 3.0, height - MAJOR_TICK_HEIGHT - 4.0),
                text: SharedStr::from(format_time_label(t)),
                color: ThemeToken::AxisText,
                font_size: FONT_SIZE,
                align: TextAlign::Left,
            });
        } else {
            commands.push(RenderCommand::DrawLine {
                from: Point::new(x, height - MINOR_TICK_HEIGHT),
                to: Point::new(x, height),
                color: ThemeToken::AxisTick,
                width: 0.5,
            });
        }
    }

    commands.push(RenderCommand::EndGroup);
    commands
}

/// Choose a 1-2-5 major tick interval (µs) giving roughly one label per
/// `MIN_MAJOR_SPACING_PX`. Returns `(major_interval, subdivisions)`.
fn nice_interval(duration_us: f64, width_px: f64) -> (f64, u32) {
    let target_count = (width_px / MIN_MAJOR_SPACING_PX).max(1.0);
    let raw = (duration_us / target_count).max(f64::MIN_POSITIVE);
    let magnitude = 10f64.powi(raw.log10().floor() as i32);
    // Tolerate rounding so exact decades don't bump up a step.
    let normalized = raw / magnitude - 1e-9;
    let (step, subdivisions) = if normalized <= 1.0 {
        (1.0, 5)
    } else if normalized <= 2.0 {
        (2.0, 4)
    } else if normalized <= 5.0 {
        (5.0, 5)
    } else {
        (10.0, 5)
    };
    (step * magnitude, subdivisions)
}

/// Format an absolute time in microseconds as a compact label.
pub fn format_time_label(us: f64) -> String {
    let abs = us.abs();
    if abs >= 60_000_000.0 {
        let mins = (us / 60_000_000.0).trunc();
        let secs = (us - mins * 60_000_000.0) / 1_000_000.0;
        format!("{mins:.0}m{secs:.1}s")
    } else if abs >= 1_000_000.0 {
        format!("{:.3}s", us / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{:.2}ms", us / 1_000.0)
    } else if abs >= 1.0 || abs == 0.0 {
        format!("{us:.0}µs")
    } else {
        format!("{:.0}ns", us * 1_000.0)
    }
}
