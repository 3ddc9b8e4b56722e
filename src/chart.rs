use std::fs::{self, File};
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::{debug, info};

use crate::colormap::{normalize, rd_yl_bu};
use crate::error::RenderError;
use crate::metrics::{DerivedRow, DerivedTable};
use crate::selection::Performers;

/// Room left around the data on each axis, in goals.
pub const AXIS_PADDING: f64 = 5.0;

const FONT: &str = "sans-serif";
const COLORBAR_STEPS: usize = 64;

/// Cosmetic settings. Sizes are in points and scaled by `dpi / 72`.
#[derive(Debug, Clone)]
pub struct ChartStyle {
    pub title: String,
    pub subtitle: String,
    pub x_desc: String,
    pub y_desc: String,
    pub colorbar_desc: String,
    pub width_in: f64,
    pub height_in: f64,
    pub dpi: f64,
    pub over_color: RGBColor,
    pub under_color: RGBColor,
    /// Marker area in points squared.
    pub marker_area: f64,
    pub marker_alpha: f64,
    pub label_size: f64,
    /// Label anchor offsets from the point, in points, y up.
    pub over_offset: (f64, f64),
    pub under_offset: (f64, f64),
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            title: "Expected Goals vs Actual Goals".to_string(),
            subtitle: "Top 5 European Leagues".to_string(),
            x_desc: "Expected Goals (xG)".to_string(),
            y_desc: "Goals Scored (GF)".to_string(),
            colorbar_desc: "Goals Scored vs xG".to_string(),
            width_in: 12.0,
            height_in: 8.0,
            dpi: 150.0,
            over_color: RGBColor(0, 100, 0),
            under_color: RGBColor(139, 0, 0),
            marker_area: 100.0,
            marker_alpha: 0.7,
            label_size: 9.0,
            over_offset: (5.0, 5.0),
            under_offset: (5.0, -15.0),
        }
    }
}

impl ChartStyle {
    fn scale(&self) -> f64 {
        self.dpi / 72.0
    }

    fn px(&self, points: f64) -> f64 {
        points * self.scale()
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        (
            (self.width_in * self.dpi).round() as u32,
            (self.height_in * self.dpi).round() as u32,
        )
    }
}

/// Data-space extents of the chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartLayout {
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    /// Span of the y = x line, taken from the xG limits.
    pub reference: (f64, f64),
    pub difference_range: (f64, f64),
}

impl ChartLayout {
    pub fn from_table(table: &DerivedTable) -> Result<Self, RenderError> {
        let (Some((xg_lo, xg_hi)), Some((gf_lo, gf_hi)), Some((d_lo, d_hi))) = (
            table.expected_goals_range(),
            table.goals_for_range(),
            table.difference_range(),
        ) else {
            return Err(RenderError::EmptyTable);
        };
        let x_range = (xg_lo - AXIS_PADDING, xg_hi + AXIS_PADDING);
        Ok(Self {
            x_range,
            y_range: (gf_lo - AXIS_PADDING, gf_hi + AXIS_PADDING),
            reference: x_range,
            difference_range: (d_lo, d_hi),
        })
    }

    /// Part of the reference line that falls inside the y limits.
    pub fn reference_segment(&self) -> Option<(f64, f64)> {
        let start = self.reference.0.max(self.y_range.0);
        let end = self.reference.1.min(self.y_range.1);
        (start < end).then_some((start, end))
    }

    /// Colorbar range, widened when every row has the same difference.
    fn colorbar_range(&self) -> (f64, f64) {
        let (lo, hi) = self.difference_range;
        if hi - lo < f64::EPSILON {
            (lo - 0.5, hi + 0.5)
        } else {
            (lo, hi)
        }
    }
}

/// Pixel geometry of one annotation, relative to its data point (y down).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelGeometry {
    pub text_origin: (i32, i32),
    pub box_min: (i32, i32),
    pub box_max: (i32, i32),
}

impl LabelGeometry {
    /// `offset_px` is the text's bottom-left corner relative to the point, y up.
    pub fn new(offset_px: (f64, f64), text_size: (u32, u32), pad: i32) -> Self {
        let left = offset_px.0.round() as i32;
        let bottom = (-offset_px.1).round() as i32;
        let top = bottom - text_size.1 as i32;
        let right = left + text_size.0 as i32;
        Self {
            text_origin: (left, top),
            box_min: (left - pad, top - pad),
            box_max: (right + pad, bottom + pad),
        }
    }

    /// Outline of the box with corners cut into short arcs.
    pub fn rounded_outline(&self, radius: i32) -> Vec<(i32, i32)> {
        let (x0, y0) = self.box_min;
        let (x1, y1) = self.box_max;
        let r = radius.min((x1 - x0) / 2).min((y1 - y0) / 2).max(0);
        let corners = [
            ((x1 - r, y0 + r), -90.0),
            ((x1 - r, y1 - r), 0.0),
            ((x0 + r, y1 - r), 90.0),
            ((x0 + r, y0 + r), 180.0),
        ];
        let mut points = Vec::with_capacity(corners.len() * 5);
        for ((cx, cy), start) in corners {
            for step in 0..=4 {
                let angle = (start + step as f64 * 22.5_f64).to_radians();
                points.push((
                    cx + (r as f64 * angle.cos()).round() as i32,
                    cy + (r as f64 * angle.sin()).round() as i32,
                ));
            }
        }
        points
    }
}

/// Draw the scatter plot to `path`, replacing any existing file.
///
/// The image is encoded next to `path` and renamed over it once complete, so a
/// failed render leaves the previous file untouched.
pub fn render_chart(
    table: &DerivedTable,
    performers: &Performers,
    style: &ChartStyle,
    path: &Path,
) -> Result<(), RenderError> {
    let layout = ChartLayout::from_table(table)?;
    debug!(?layout, "chart layout");

    let tmp = temp_path(path);
    // Surface permission and missing-directory errors before drawing.
    File::create(&tmp).map_err(|source| RenderError::Io {
        path: tmp.clone(),
        source,
    })?;

    if let Err(err) = render_to(&tmp, table, performers, style, &layout) {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }
    if let Err(source) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(RenderError::Io {
            path: path.to_path_buf(),
            source,
        });
    }
    info!(path = %path.display(), rows = table.len(), "chart written");
    Ok(())
}

/// Sibling of `path` that keeps its extension, which picks the image encoder.
fn temp_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "png".to_string());
    path.with_file_name(format!(".{stem}.tmp.{ext}"))
}

// The backend is dropped before returning so nothing writes to `path` afterwards.
fn render_to(
    path: &Path,
    table: &DerivedTable,
    performers: &Performers,
    style: &ChartStyle,
    layout: &ChartLayout,
) -> Result<(), RenderError> {
    let root = BitMapBackend::new(path, style.canvas_size()).into_drawing_area();
    draw(&root, table, performers, style, layout)?;
    root.present().map_err(drawing)
}

fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    table: &DerivedTable,
    performers: &Performers,
    style: &ChartStyle,
    layout: &ChartLayout,
) -> Result<(), RenderError> {
    root.fill(&WHITE).map_err(drawing)?;

    let title_font = (FONT, style.px(14.0)).into_font().style(FontStyle::Bold);
    let area = root.titled(&style.title, title_font).map_err(drawing)?;
    let area = area
        .titled(&style.subtitle, (FONT, style.px(12.0)))
        .map_err(drawing)?;
    let area = area.margin(
        style.px(6.0) as i32,
        style.px(12.0) as i32,
        style.px(6.0) as i32,
        style.px(6.0) as i32,
    );

    let (width, _) = area.dim_in_pixel();
    let colorbar_width = style.px(70.0).min(width as f64 / 3.0) as u32;
    let (plot_area, bar_area) = area.split_horizontally(width.saturating_sub(colorbar_width) as i32);

    draw_scatter(&plot_area, table, performers, style, layout)?;
    draw_colorbar(&bar_area, style, layout)
}

fn draw_scatter<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    table: &DerivedTable,
    performers: &Performers,
    style: &ChartStyle,
    layout: &ChartLayout,
) -> Result<(), RenderError> {
    let (x0, x1) = layout.x_range;
    let (y0, y1) = layout.y_range;
    let mut chart = ChartBuilder::on(area)
        .margin(style.px(4.0) as i32)
        .x_label_area_size(style.px(32.0) as i32)
        .y_label_area_size(style.px(40.0) as i32)
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(drawing)?;

    chart
        .configure_mesh()
        .x_desc(style.x_desc.as_str())
        .y_desc(style.y_desc.as_str())
        .axis_desc_style((FONT, style.px(12.0)))
        .label_style((FONT, style.px(10.0)))
        .bold_line_style(BLACK.mix(0.1).stroke_width(1))
        .light_line_style(TRANSPARENT)
        .axis_style(BLACK.mix(0.5).stroke_width(1))
        .draw()
        .map_err(drawing)?;

    let reference_style = BLACK.mix(0.4).stroke_width(style.px(1.5).round().max(1.0) as u32);
    if let Some((start, end)) = layout.reference_segment() {
        let dash = style.px(5.0) as i32;
        chart
            .draw_series(DashedLineSeries::new(
                vec![(start, start), (end, end)],
                dash,
                dash / 2 + 1,
                reference_style,
            ))
            .map_err(drawing)?;
    }

    let (d_lo, d_hi) = layout.difference_range;
    let radius = style.px(style.marker_area.sqrt() / 2.0).round() as i32;
    let edge = style.px(1.5).round().max(1.0) as u32;
    let alpha = style.marker_alpha;
    chart
        .draw_series(table.rows.iter().map(|row| {
            let color = rd_yl_bu(normalize(row.difference, d_lo, d_hi));
            EmptyElement::at((row.expected_goals, row.goals_for))
                + Circle::new((0, 0), radius, color.mix(alpha).filled())
                + Circle::new((0, 0), radius, WHITE.stroke_width(edge))
        }))
        .map_err(drawing)?;

    annotate(&mut chart, area, &performers.over, style, style.over_offset, style.over_color)?;
    annotate(&mut chart, area, &performers.under, style, style.under_offset, style.under_color)

}

fn annotate<DB: DrawingBackend>(
    chart: &mut ChartContext<'_, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    area: &DrawingArea<DB, Shift>,
    rows: &[DerivedRow],
    style: &ChartStyle,
    offset: (f64, f64),
    color: RGBColor,
) -> Result<(), RenderError> {
    let font_size = style.px(style.label_size);
    let text_style = TextStyle::from((FONT, font_size).into_font())
        .color(&color)
        .pos(Pos::new(HPos::Left, VPos::Top));
    let pad = (0.3 * font_size).round() as i32;
    let offset_px = (style.px(offset.0), style.px(offset.1));

    for row in rows {
        let size = area
            .estimate_text_size(&row.team, &text_style)
            .map_err(drawing)?;
        let geom = LabelGeometry::new(offset_px, size, pad);
        let outline = geom.rounded_outline(pad);
        let mut border = outline.clone();
        border.push(outline[0]);

        let element = EmptyElement::at((row.expected_goals, row.goals_for))
            + Polygon::new(outline, WHITE.mix(0.8).filled())
            + PathElement::new(border, color.mix(0.8).stroke_width(1))
            + Text::new(row.team.clone(), geom.text_origin, text_style.clone());
        chart
            .draw_series(std::iter::once(element))
            .map_err(drawing)?;
    }
    Ok(())
}

fn draw_colorbar<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    style: &ChartStyle,
    layout: &ChartLayout,
) -> Result<(), RenderError> {
    let (lo, hi) = layout.colorbar_range();
    let (d_lo, d_hi) = layout.difference_range;
    let mut bar = ChartBuilder::on(area)
        .margin_top(style.px(4.0) as i32)
        .margin_bottom(style.px(36.0) as i32)
        .margin_left(style.px(6.0) as i32)
        .y_label_area_size(style.px(46.0) as i32)
        .build_cartesian_2d(0.0..1.0, lo..hi)
        .map_err(drawing)?;

    bar.configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .disable_x_axis()
        .y_desc(style.colorbar_desc.as_str())
        .axis_desc_style((FONT, style.px(11.0)))
        .label_style((FONT, style.px(9.0)))
        .draw()
        .map_err(drawing)?;

    let step = (hi - lo) / COLORBAR_STEPS as f64;
    bar.draw_series((0..COLORBAR_STEPS).map(|i| {
        let v0 = lo + step * i as f64;
        let v1 = v0 + step;
        let color = rd_yl_bu(normalize((v0 + v1) / 2.0, d_lo, d_hi));
        Rectangle::new([(0.0, v0), (1.0, v1)], color.filled())
    }))
    .map_err(drawing)?;
    Ok(())
}

fn drawing<E: std::fmt::Display>(err: E) -> RenderError {
    RenderError::Drawing(err.to_string())
}
