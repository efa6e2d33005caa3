//! SVG renderer: replays `RenderCommand` lists into standalone SVG strings.

use std::fmt::Write;

use tracelane_protocol::{RenderCommand, Surface, TextAlign, ThemeToken};

/// Render a list of commands as an SVG document string.
///
/// `surface` defines the viewBox. `dark` selects the color palette.
/// Clip regions become `<clipPath>` groups; groups become `<g>` elements
/// whose labels show as tooltips.
pub fn render_svg(commands: &[RenderCommand], surface: Surface, dark: bool) -> String {
    let Surface { width, height } = surface;
    let mut svg = String::with_capacity(commands.len() * 120 + 256);
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}" style="font-family:system-ui,-apple-system,sans-serif">"#,
    );

    let mut next_clip = 0usize;
    let mut clip_open = false;
    let mut open_groups = 0usize;

    for cmd in commands {
        match cmd {
            RenderCommand::DrawRect {
                rect,
                color,
                event_id,
            } => {
                let _ = write!(
                    svg,
                    r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}""#,
                    rect.x,
                    rect.y,
                    rect.w,
                    rect.h,
                    resolve_color(*color, dark),
                );
                if let Some(id) = event_id {
                    let _ = write!(svg, r#" data-event="{id}""#);
                }
                svg.push_str("/>");
            }
            RenderCommand::DrawText {
                position,
                text,
                color,
                font_size,
                align,
            } => {
                let anchor = match align {
                    TextAlign::Left => "start",
                    TextAlign::Center => "middle",
                    TextAlign::Right => "end",
                };
                let _ = write!(
                    svg,
                    r#"<text x="{}" y="{}" fill="{}" font-size="{font_size}" text-anchor="{anchor}">{}</text>"#,
                    position.x,
                    position.y,
                    resolve_color(*color, dark),
                    escape_xml(text),
                );
            }
            RenderCommand::DrawLine {
                from,
                to,
                color,
                width: line_width,
            } => {
                let _ = write!(
                    svg,
                    r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{line_width}"/>"#,
                    from.x,
                    from.y,
                    to.x,
                    to.y,
                    resolve_color(*color, dark),
                );
            }
            RenderCommand::SetClip { rect } => {
                if clip_open {
                    svg.push_str("</g>");
                }
                let id = next_clip;
                next_clip += 1;
                let _ = write!(
                    svg,
                    r#"<clipPath id="clip{id}"><rect x="{}" y="{}" width="{}" height="{}"/></clipPath><g clip-path="url(#clip{id})">"#,
                    rect.x,
                    rect.y,
                    rect.w,
                    rect.h,
                );
                clip_open = true;
            }
            RenderCommand::ClearClip => {
                if clip_open {
                    svg.push_str("</g>");
                    clip_open = false;
                }
            }
            RenderCommand::BeginGroup { id, label } => {
                if clip_open {
                    svg.push_str("</g>");
                    clip_open = false;
                }
                let _ = write!(svg, r#"<g id="{}">"#, escape_xml(id));
                if let Some(label) = label {
                    let _ = write!(svg, "<title>{}</title>", escape_xml(label));
                }
                open_groups += 1;
            }
            RenderCommand::EndGroup => {
                if clip_open {
                    svg.push_str("</g>");
                    clip_open = false;
                }
                if open_groups > 0 {
                    svg.push_str("</g>");
                    open_groups -= 1;
                }
            }
        }
    }

    if clip_open {
        svg.push_str("</g>");
    }
    for _ in 0..open_groups {
        svg.push_str("</g>");
    }
    svg.push_str("</svg>");
    svg
}

/// CSS color for a theme token.
pub fn resolve_color(token: ThemeToken, dark: bool) -> &'static str {
    match token {
        ThemeToken::Palette0 => "#4285F4",
        ThemeToken::Palette1 => "#EA4335",
        ThemeToken::Palette2 => "#FBBC05",
        ThemeToken::Palette3 => "#34A853",
        ThemeToken::Palette4 => "#8AB4F8",
        ThemeToken::Palette5 => "#F28B82",
        ThemeToken::TrackLabelBackground => {
            if dark {
                "rgba(0,0,0,0.5)"
            } else {
                "rgba(255,255,255,0.6)"
            }
        }
        _ if dark => match token {
            ThemeToken::SelectionHighlight | ThemeToken::EventLabelText => "#ffffff",
            ThemeToken::Background => "#000000",
            ThemeToken::RowBackground => "#1e1e1e",
            ThemeToken::AxisBackground => "#111111",
            ThemeToken::TrackLabelText => "#cccccc",
            ThemeToken::AxisTick => "#666666",
            _ => "#aaaaaa",
        },
        _ => match token {
            ThemeToken::SelectionHighlight => "#000000",
            ThemeToken::EventLabelText => "#ffffff",
            ThemeToken::Background => "#ffffff",
            ThemeToken::RowBackground => "#f1f3f4",
            ThemeToken::AxisBackground => "#f8f9fa",
            ThemeToken::TrackLabelText => "#333333",
            ThemeToken::AxisTick => "#bbbbbb",
            _ => "#555555",
        },
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracelane_protocol::{Point, Rect, SharedStr};

    #[test]
    fn basic_svg_output() {
        let commands = vec![
            RenderCommand::DrawRect {
                rect: Rect::new(10.0, 20.0, 100.0, 32.0),
                color: ThemeToken::Palette1,
                event_id: Some(3),
            },
            RenderCommand::DrawText {
                position: Point::new(12.0, 41.0),
                text: SharedStr::from("main"),
                color: ThemeToken::EventLabelText,
                font_size: 12.0,
                align: TextAlign::Left,
            },
        ];
        let svg = render_svg(&commands, Surface::new(800.0, 600.0), true);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains(r##"fill="#EA4335""##));
        assert!(svg.contains(r#"data-event="3""#));
        assert!(svg.contains(">main</text>"));
    }

    #[test]
    fn clip_regions_wrap_following_text() {
        let commands = vec![
            RenderCommand::SetClip {
                rect: Rect::new(0.0, 0.0, 30.0, 10.0),
            },
            RenderCommand::DrawText {
                position: Point::new(2.0, 8.0),
                text: SharedStr::from("clipped"),
                color: ThemeToken::EventLabelText,
                font_size: 12.0,
                align: TextAlign::Left,
            },
            RenderCommand::ClearClip,
        ];
        let svg = render_svg(&commands, Surface::new(100.0, 100.0), false);
        let clip = svg.find(r#"clip-path="url(#clip0)""#).unwrap();
        let text = svg.find("clipped").unwrap();
        assert!(clip < text);
        assert_eq!(svg.matches("<g").count(), svg.matches("</g>").count());
    }

    #[test]
    fn unbalanced_groups_are_closed() {
        let commands = vec![
            RenderCommand::BeginGroup {
                id: SharedStr::from("track-1-1"),
                label: Some(SharedStr::from("PID: 1 TID: 1")),
            },
            RenderCommand::SetClip {
                rect: Rect::new(0.0, 0.0, 1.0, 1.0),
            },
        ];
        let svg = render_svg(&commands, Surface::new(10.0, 10.0), true);
        assert_eq!(svg.matches("<g").count(), svg.matches("</g>").count());
        assert!(svg.contains("<title>PID: 1 TID: 1</title>"));
    }

    #[test]
    fn escapes_text() {
        let commands = vec![RenderCommand::DrawText {
            position: Point::new(0.0, 0.0),
            text: SharedStr::from("<a & \"b\">"),
            color: ThemeToken::AxisText,
            font_size: 10.0,
            align: TextAlign::Center,
        }];
        let svg = render_svg(&commands, Surface::new(10.0, 10.0), true);
        assert!(svg.contains("&lt;a &amp; &quot;b&quot;&gt;"));
        assert!(svg.contains(r#"text-anchor="middle""#));
    }
}
