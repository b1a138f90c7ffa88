//! Rasterisation of the rendered timetable grid.

use std::borrow::Cow;

use anyhow::{Context, Result};
use image::{Rgb, RgbImage, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use swash::FontRef;
use swash::scale::{Render, ScaleContext, Source};
use swash::shape::ShapeContext;
use swash::zeno::{Format, Vector};

use super::grid::TimetableGrid;

/// Anything that can draw itself into pixels at a given oversampling factor.
pub trait RenderSurface: Send + Sync {
    fn rasterize(&self, scale: f32) -> Result<RgbaImage>;
}

/// DejaVu Sans Condensed, used for labels unless another font is supplied.
pub const BUNDLED_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSansCondensed.ttf");

const DAY_COLUMN_PX: f32 = 120.0;
const SLOT_COLUMN_PX: f32 = 140.0;
const HEADER_ROW_PX: f32 = 40.0;
const DAY_ROW_PX: f32 = 90.0;
const GAP_PX: f32 = 2.0;

const PADDING_PX: f32 = 6.0;
const LABEL_FONT_PX: f32 = 13.0;
const CELL_FONT_PX: f32 = 11.0;
const CELL_LINE_PX: f32 = 14.0;

/// Largest raster side we are willing to allocate.
const MAX_RASTER_PX: f32 = 16_384.0;

const HEADER_FILL: Rgba<u8> = Rgba([30, 41, 59, 255]);
const DAY_FILL: Rgba<u8> = Rgba([51, 65, 85, 255]);
const EMPTY_FILL: Rgba<u8> = Rgba([241, 245, 249, 255]);
const TEXT_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

const COURSE_PALETTE: [Rgba<u8>; 6] = [
    Rgba([37, 99, 235, 255]),
    Rgba([5, 150, 105, 255]),
    Rgba([217, 119, 6, 255]),
    Rgba([124, 58, 237, 255]),
    Rgba([219, 39, 119, 255]),
    Rgba([13, 148, 136, 255]),
];

/// Rendering of a [`TimetableGrid`]: one labelled tile per cell, occupied
/// cells coloured per course. Gaps between tiles stay transparent.
#[derive(Clone)]
pub struct GridSurface {
    grid: TimetableGrid,
    font: Cow<'static, [u8]>,
}

impl GridSurface {
    pub fn new(grid: TimetableGrid) -> Self {
        Self {
            grid,
            font: Cow::Borrowed(BUNDLED_FONT),
        }
    }

    /// Use another TrueType/OpenType font for the labels.
    pub fn with_font(mut self, data: Vec<u8>) -> Result<Self> {
        if FontRef::from_index(&data, 0).is_none() {
            anyhow::bail!("Font data is not a usable TrueType or OpenType font");
        }
        self.font = Cow::Owned(data);
        Ok(self)
    }

    /// Unscaled size in pixels.
    pub fn base_size(&self) -> (f32, f32) {
        let slots = self.grid.column_count().saturating_sub(1) as f32;
        let width = DAY_COLUMN_PX + slots * SLOT_COLUMN_PX;
        let height = HEADER_ROW_PX + self.grid.days.len() as f32 * DAY_ROW_PX;
        (width, height)
    }
}

impl RenderSurface for GridSurface {
    fn rasterize(&self, scale: f32) -> Result<RgbaImage> {
        if !scale.is_finite() || scale <= 0.0 {
            anyhow::bail!("Invalid raster scale {}", scale);
        }

        let (base_w, base_h) = self.base_size();
        let (scaled_w, scaled_h) = ((base_w * scale).round(), (base_h * scale).round());
        if scaled_w > MAX_RASTER_PX || scaled_h > MAX_RASTER_PX {
            anyhow::bail!(
                "Timetable raster of {}x{} px exceeds the {} px limit",
                scaled_w,
                scaled_h,
                MAX_RASTER_PX
            );
        }
        let mut img = RgbaImage::new((scaled_w as u32).max(1), (scaled_h as u32).max(1));
        let mut text = TextPainter::new(&self.font, scale)?;

        let col_x = |col: usize| -> f32 {
            if col == 0 {
                0.0
            } else {
                DAY_COLUMN_PX + (col - 1) as f32 * SLOT_COLUMN_PX
            }
        };
        let col_w = |col: usize| if col == 0 { DAY_COLUMN_PX } else { SLOT_COLUMN_PX };
        let label_y = (HEADER_ROW_PX - LABEL_FONT_PX) / 2.0;

        // Header band
        for (col, label) in self.grid.header.iter().enumerate() {
            let (x, w) = (col_x(col), col_w(col));
            fill_tile(&mut img, scale, x, 0.0, w, HEADER_ROW_PX, HEADER_FILL);
            text.draw_line(&mut img, label, x + PADDING_PX, label_y, LABEL_FONT_PX, w - 2.0 * PADDING_PX);
        }

        // Day rows
        for (row_idx, row) in self.grid.days.iter().enumerate() {
            let y = HEADER_ROW_PX + row_idx as f32 * DAY_ROW_PX;
            fill_tile(&mut img, scale, 0.0, y, DAY_COLUMN_PX, DAY_ROW_PX, DAY_FILL);
            text.draw_line(
                &mut img,
                &row.day,
                PADDING_PX,
                y + (DAY_ROW_PX - LABEL_FONT_PX) / 2.0,
                LABEL_FONT_PX,
                DAY_COLUMN_PX - 2.0 * PADDING_PX,
            );

            for (slot, cell) in row.cells.iter().enumerate() {
                let x = col_x(slot + 1);
                if cell.is_empty() {
                    fill_tile(&mut img, scale, x, y, SLOT_COLUMN_PX, DAY_ROW_PX, EMPTY_FILL);
                    continue;
                }
                fill_tile(&mut img, scale, x, y, SLOT_COLUMN_PX, DAY_ROW_PX, course_color(cell));
                for (line_idx, line) in cell.lines().enumerate() {
                    let line_y = y + PADDING_PX + line_idx as f32 * CELL_LINE_PX;
                    if line_y + CELL_LINE_PX > y + DAY_ROW_PX {
                        break;
                    }
                    text.draw_line(
                        &mut img,
                        line,
                        x + PADDING_PX,
                        line_y,
                        CELL_FONT_PX,
                        SLOT_COLUMN_PX - 2.0 * PADDING_PX,
                    );
                }
            }
        }

        Ok(img)
    }
}

/// Shapes and blends single lines of text onto a raster.
struct TextPainter<'a> {
    font: FontRef<'a>,
    scale: f32,
    shape_context: ShapeContext,
    scale_context: ScaleContext,
}

impl<'a> TextPainter<'a> {
    fn new(font_data: &'a [u8], scale: f32) -> Result<Self> {
        let font = FontRef::from_index(font_data, 0).context("Failed to load label font")?;
        Ok(Self {
            font,
            scale,
            shape_context: ShapeContext::new(),
            scale_context: ScaleContext::new(),
        })
    }

    /// Draw `text` with its top-left corner at (`x`, `y`) in unscaled pixels.
    /// Glyphs that would cross `max_width` are dropped.
    fn draw_line(&mut self, img: &mut RgbaImage, text: &str, x: f32, y: f32, size: f32, max_width: f32) {
        let size = size * self.scale;
        let mut shaper = self.shape_context.builder(self.font).size(size).build();
        shaper.add_str(text);
        let mut scaler = self.scale_context.builder(self.font).size(size).hint(true).build();

        let mut pen_x = x * self.scale;
        let pen_y = y * self.scale + size;
        let right = (x + max_width) * self.scale;
        let mut clipped = false;

        shaper.shape_with(|cluster| {
            for glyph in cluster.glyphs {
                if clipped || pen_x + glyph.advance > right {
                    clipped = true;
                    return;
                }

                let rendered = Render::new(&[Source::Outline])
                    .format(Format::Alpha)
                    .offset(Vector::new(glyph.x, glyph.y))
                    .render(&mut scaler, glyph.id);

                if let Some(glyph_image) = rendered {
                    let left = (pen_x + glyph_image.placement.left as f32) as i32;
                    let top = (pen_y - glyph_image.placement.top as f32) as i32;
                    let width = glyph_image.placement.width;

                    for (idx, &alpha) in glyph_image.data.iter().enumerate() {
                        if alpha == 0 {
                            continue;
                        }
                        let dest_x = left + (idx as u32 % width) as i32;
                        let dest_y = top + (idx as u32 / width) as i32;
                        if dest_x < 0
                            || dest_y < 0
                            || dest_x as u32 >= img.width()
                            || dest_y as u32 >= img.height()
                        {
                            continue;
                        }
                        blend(img.get_pixel_mut(dest_x as u32, dest_y as u32), TEXT_COLOR, alpha);
                    }
                }

                pen_x += glyph.advance;
            }
        });
    }
}

fn blend(dest: &mut Rgba<u8>, color: Rgba<u8>, alpha: u8) {
    let a = f32::from(alpha) / 255.0;
    for channel in 0..3 {
        dest[channel] = (f32::from(color[channel]) * a + f32::from(dest[channel]) * (1.0 - a)) as u8;
    }
    dest[3] = 255;
}

/// Stable colour per course, keyed on the course code prefix of the cell text.
fn course_color(cell_text: &str) -> Rgba<u8> {
    let code = cell_text.split(':').next().unwrap_or(cell_text);
    let hash = code
        .bytes()
        .fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
    COURSE_PALETTE[hash % COURSE_PALETTE.len()]
}

fn fill_tile(img: &mut RgbaImage, scale: f32, x: f32, y: f32, w: f32, h: f32, color: Rgba<u8>) {
    let x0 = ((x + GAP_PX / 2.0) * scale).round();
    let y0 = ((y + GAP_PX / 2.0) * scale).round();
    let width = ((w - GAP_PX) * scale).round();
    let height = ((h - GAP_PX) * scale).round();
    if width < 1.0 || height < 1.0 {
        return;
    }
    let rect = Rect::at(x0 as i32, y0 as i32).of_size(width as u32, height as u32);
    draw_filled_rect_mut(img, rect, color);
}

/// Composite an RGBA raster over white, dropping the alpha channel.
pub fn flatten_on_white(img: &RgbaImage) -> RgbImage {
    let mut out = RgbImage::new(img.width(), img.height());
    for (x, y, Rgba([r, g, b, a])) in img.enumerate_pixels() {
        let alpha = u16::from(*a);
        let blend = |c: u8| ((u16::from(c) * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        out.put_pixel(x, y, Rgb([blend(*r), blend(*g), blend(*b)]));
    }
    out
}
