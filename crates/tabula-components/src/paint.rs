//! SVG painting of recorded shapes

use leptos::prelude::*;
use tabula_charts::{Point, Shape, TextAlign, TextBaseline, TextStyle};

const FONT_FAMILY: &str = "JetBrains Mono, monospace";

pub fn text_anchor(align: TextAlign) -> &'static str {
    match align {
        TextAlign::Left => "start",
        TextAlign::Center => "middle",
        TextAlign::Right => "end",
    }
}

pub fn dominant_baseline(baseline: TextBaseline) -> &'static str {
    match baseline {
        TextBaseline::Top => "hanging",
        TextBaseline::Middle => "central",
        TextBaseline::Bottom => "alphabetic",
    }
}

/// `rotate(...)` transform about the anchor, `None` when upright
pub fn text_transform(style: &TextStyle, at: Point) -> Option<String> {
    (style.rotation != 0.0).then(|| format!("rotate({:.2} {:.2} {:.2})", style.rotation.to_degrees(), at.x, at.y))
}

pub fn points_attr(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{:.2},{:.2}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

/// One recorded shape as an SVG element
pub fn paint_shape(shape: Shape) -> AnyView {
    let path = shape.svg_path();
    match shape {
        Shape::Rect { rect, fill, stroke } => {
            let fill = fill.map(|c| c.to_css()).unwrap_or_else(|| "none".to_string());
            let (stroke, stroke_width) = match stroke {
                Some((color, width)) => (color.to_css(), width),
                None => ("none".to_string(), 0.0),
            };
            view! {
                <rect
                    x=rect.x
                    y=rect.y
                    width=rect.width
                    height=rect.height
                    fill=fill
                    stroke=stroke
                    stroke-width=stroke_width
                />
            }
            .into_any()
        }
        Shape::Sector { fill, .. } => view! {
            <path d=path.unwrap_or_default() fill=fill.to_css() />
        }
        .into_any(),
        Shape::Circle { center, radius, fill } => view! {
            <circle cx=center.x cy=center.y r=radius fill=fill.to_css() />
        }
        .into_any(),
        Shape::Line { from, to, stroke, width } => view! {
            <line
                x1=from.x
                y1=from.y
                x2=to.x
                y2=to.y
                stroke=stroke.to_css()
                stroke-width=width
            />
        }
        .into_any(),
        Shape::Polyline { points, stroke, width } => view! {
            <polyline
                points=points_attr(&points)
                fill="none"
                stroke=stroke.to_css()
                stroke-width=width
            />
        }
        .into_any(),
        Shape::Text { text, at, style } => {
            let transform = text_transform(&style, at);
            let weight = if style.bold { "bold" } else { "normal" };
            view! {
                <text
                    x=at.x
                    y=at.y
                    fill=style.color.to_css()
                    font-size=style.size
                    font-family=FONT_FAMILY
                    font-weight=weight
                    text-anchor=text_anchor(style.align)
                    dominant-baseline=dominant_baseline(style.baseline)
                    transform=transform
                >
                    {text}
                </text>
            }
            .into_any()
        }
    }
}
