//! Shape rasterization: draws a target shape (text, bitmap image or a
//! procedural silhouette) into a fixed-resolution coverage/luminance grid and
//! extracts the lit cells that become particle home positions.
//!
//! Sample coordinates are y-up (row 0 at the bottom) so they map directly
//! into the field's world space; the drawing helpers work y-down like the
//! source canvases and the flip happens once, in [`Raster::samples`].

use crate::constants::{EYE_LUMINANCE, LIT_THRESHOLD, MAX_PARTICLES};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use rusttype::{point, Font, Scale};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RasterError {
    #[error("failed to decode shape image: {0}")]
    ImageDecode(#[from] image::ImageError),
    #[error("no usable font found for text rasterization")]
    FontUnavailable,
}

/// Particle classification, fixed at sampling time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tag {
    Body,
    /// Lit but near-black cell (eye socket); gets the color-cycling treatment.
    Eye,
}

/// One sampled grid cell: position in raster pixels (y-up), source luminance
/// and classification.
#[derive(Clone, Copy, Debug)]
pub struct ShapeSample {
    pub x: f32,
    pub y: f32,
    pub luminance: f32,
    pub tag: Tag,
}

/// Procedural silhouettes drawn with explicit primitives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Silhouette {
    /// Halo, head, triangle body and quadratic-curve wings.
    Angel,
    /// Cranium, jaw, dark eye sockets, nose hole and teeth.
    Skull,
    /// Dome with a wavy hem and dark eye sockets.
    Ghost,
}

/// One line of centered text; the font size is `raster_width / size_divisor`
/// and the line is vertically centered at `center * raster_height`.
#[derive(Clone, Copy, Debug)]
pub struct TextLine<'a> {
    pub text: &'a str,
    pub size_divisor: f32,
    pub center: f32,
}

pub enum ShapeSource<'a> {
    Text {
        lines: &'a [TextLine<'a>],
        font: &'a Font<'a>,
    },
    Image {
        bytes: &'a [u8],
    },
    Silhouette(Silhouette),
}

/// Fixed-resolution raster with independent coverage and luminance channels.
/// A cell can be lit yet dark (a socket), which is what drives the eye tag.
#[derive(Debug)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    coverage: Vec<f32>,
    luminance: Vec<f32>,
}

impl Raster {
    pub fn new(width: u32, height: u32) -> Self {
        let n = (width * height) as usize;
        Self {
            width,
            height,
            coverage: vec![0.0; n],
            luminance: vec![0.0; n],
        }
    }

    #[inline]
    fn idx(&self, x: u32, y: u32) -> usize {
        (y * self.width + x) as usize
    }

    #[inline]
    fn plot(&mut self, x: i32, y: i32, coverage: f32, luminance: f32) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let i = self.idx(x as u32, y as u32);
        if coverage >= self.coverage[i] {
            self.coverage[i] = coverage;
            self.luminance[i] = luminance;
        }
    }

    /// True when the cell at y-down coordinates is lit.
    pub fn lit_at(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.coverage[self.idx(x, y)] > LIT_THRESHOLD
    }

    /// Extract every lit cell, y flipped to y-up, with eye classification.
    pub fn samples(&self) -> Vec<ShapeSample> {
        let mut out = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let i = self.idx(x, y);
                if self.coverage[i] <= LIT_THRESHOLD {
                    continue;
                }
                let lum = self.luminance[i];
                out.push(ShapeSample {
                    x: x as f32,
                    y: (self.height - 1 - y) as f32,
                    luminance: lum,
                    tag: if lum < EYE_LUMINANCE { Tag::Eye } else { Tag::Body },
                });
            }
        }
        out
    }

    // ── drawing helpers (y-down, canvas-style) ──────────────────────────

    fn fill_ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, lum: f32) {
        let (x0, x1) = ((cx - rx).floor() as i32, (cx + rx).ceil() as i32);
        let (y0, y1) = ((cy - ry).floor() as i32, (cy + ry).ceil() as i32);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = (x as f32 + 0.5 - cx) / rx.max(1e-3);
                let dy = (y as f32 + 0.5 - cy) / ry.max(1e-3);
                if dx * dx + dy * dy <= 1.0 {
                    self.plot(x, y, 1.0, lum);
                }
            }
        }
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, lum: f32) {
        self.fill_ellipse(cx, cy, r, r, lum);
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, lum: f32) {
        for py in y.floor() as i32..(y + h).ceil() as i32 {
            for px in x.floor() as i32..(x + w).ceil() as i32 {
                self.plot(px, py, 1.0, lum);
            }
        }
    }

    /// Even-odd scanline fill of a closed polygon.
    fn fill_polygon(&mut self, pts: &[Vec2], lum: f32) {
        if pts.len() < 3 {
            return;
        }
        let y0 = pts.iter().map(|p| p.y).fold(f32::MAX, f32::min).floor() as i32;
        let y1 = pts.iter().map(|p| p.y).fold(f32::MIN, f32::max).ceil() as i32;
        for y in y0..=y1 {
            let yc = y as f32 + 0.5;
            let mut xs: Vec<f32> = Vec::new();
            for i in 0..pts.len() {
                let a = pts[i];
                let b = pts[(i + 1) % pts.len()];
                if (a.y <= yc && b.y > yc) || (b.y <= yc && a.y > yc) {
                    xs.push(a.x + (yc - a.y) / (b.y - a.y) * (b.x - a.x));
                }
            }
            xs.sort_by(f32::total_cmp);
            for pair in xs.chunks_exact(2) {
                for x in pair[0].round() as i32..=pair[1].round() as i32 {
                    self.plot(x, y, 1.0, lum);
                }
            }
        }
    }
}

/// Append `steps` points of a quadratic bezier (excluding the start point).
fn quad_to(pts: &mut Vec<Vec2>, ctrl: Vec2, end: Vec2, steps: u32) {
    let Some(&start) = pts.last() else {
        return;
    };
    for i in 1..=steps {
        let t = i as f32 / steps as f32;
        let u = 1.0 - t;
        pts.push(start * (u * u) + ctrl * (2.0 * u * t) + end * (t * t));
    }
}

/// Rasterize a shape source at the given resolution.
pub fn rasterize(source: &ShapeSource, width: u32, height: u32) -> Result<Raster, RasterError> {
    let mut raster = Raster::new(width, height);
    match source {
        ShapeSource::Text { lines, font } => {
            for line in lines.iter() {
                draw_text_line(&mut raster, font, line);
            }
        }
        ShapeSource::Image { bytes } => {
            let img = image::load_from_memory(bytes)?.to_luma8();
            let scaled =
                image::imageops::resize(&img, width, height, image::imageops::FilterType::Triangle);
            for (x, y, p) in scaled.enumerate_pixels() {
                let v = p.0[0] as f32 / 255.0;
                raster.plot(x as i32, y as i32, v, v);
            }
        }
        ShapeSource::Silhouette(s) => draw_silhouette(&mut raster, *s),
    }
    Ok(raster)
}

/// Silhouette rasterization is infallible; skip the `Result` plumbing.
pub fn rasterize_silhouette(s: Silhouette, width: u32, height: u32) -> Raster {
    let mut raster = Raster::new(width, height);
    draw_silhouette(&mut raster, s);
    raster
}

fn draw_text_line(raster: &mut Raster, font: &Font, line: &TextLine) {
    let w = raster.width as f32;
    let h = raster.height as f32;
    let scale = Scale::uniform(w / line.size_divisor.max(1.0));
    let v_metrics = font.v_metrics(scale);

    let glyphs: Vec<_> = font.layout(line.text, scale, point(0.0, 0.0)).collect();
    let text_width = glyphs.last().map_or(0.0, |g| {
        g.position().x + g.unpositioned().h_metrics().advance_width
    });
    let start_x = ((w - text_width) / 2.0).max(0.0);
    let baseline = h * line.center + (v_metrics.ascent + v_metrics.descent) / 2.0;

    for glyph in font.layout(line.text, scale, point(start_x, baseline)) {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, coverage| {
                if coverage > 0.1 {
                    let px = bb.min.x + gx as i32;
                    let py = bb.min.y + gy as i32;
                    raster.plot(px, py, coverage, coverage);
                }
            });
        }
    }
}

fn draw_silhouette(r: &mut Raster, s: Silhouette) {
    let cx = r.width as f32 / 2.0;
    let cy = r.height as f32 / 2.0;
    match s {
        Silhouette::Angel => {
            // Halo
            r.fill_ellipse(cx, cy - 50.0, 18.0, 6.0, 1.0);
            // Head
            r.fill_circle(cx, cy - 35.0, 12.0, 1.0);
            // Body
            r.fill_polygon(
                &[
                    Vec2::new(cx - 25.0, cy + 40.0),
                    Vec2::new(cx + 25.0, cy + 40.0),
                    Vec2::new(cx, cy - 20.0),
                ],
                1.0,
            );
            // Wings
            let mut left = vec![Vec2::new(cx - 15.0, cy - 10.0)];
            quad_to(&mut left, Vec2::new(cx - 70.0, cy - 40.0), Vec2::new(cx - 55.0, cy + 15.0), 16);
            quad_to(&mut left, Vec2::new(cx - 35.0, cy), Vec2::new(cx - 15.0, cy + 5.0), 16);
            r.fill_polygon(&left, 0.95);
            let mut right = vec![Vec2::new(cx + 15.0, cy - 10.0)];
            quad_to(&mut right, Vec2::new(cx + 70.0, cy - 40.0), Vec2::new(cx + 55.0, cy + 15.0), 16);
            quad_to(&mut right, Vec2::new(cx + 35.0, cy), Vec2::new(cx + 15.0, cy + 5.0), 16);
            r.fill_polygon(&right, 0.95);
        }
        Silhouette::Skull => {
            let rad = (r.width.min(r.height) as f32) * 0.28;
            // Cranium and jaw in bone white
            r.fill_ellipse(cx, cy - rad * 0.1, rad, rad * 1.1, 0.9);
            r.fill_polygon(
                &[
                    Vec2::new(cx - rad * 0.55, cy + rad * 0.5),
                    Vec2::new(cx + rad * 0.55, cy + rad * 0.5),
                    Vec2::new(cx + rad * 0.35, cy + rad),
                    Vec2::new(cx - rad * 0.35, cy + rad),
                ],
                0.9,
            );
            // Eye sockets: lit but near-black, so they classify as eyes
            let eye_y = cy - rad * 0.15;
            r.fill_ellipse(cx - rad * 0.32, eye_y, rad * 0.28, rad * 0.32, 0.02);
            r.fill_ellipse(cx + rad * 0.32, eye_y, rad * 0.28, rad * 0.32, 0.02);
            // Nose hole
            r.fill_polygon(
                &[
                    Vec2::new(cx, cy + rad * 0.15),
                    Vec2::new(cx - rad * 0.12, cy + rad * 0.35),
                    Vec2::new(cx + rad * 0.12, cy + rad * 0.35),
                ],
                0.02,
            );
            // Teeth
            let teeth_y = cy + rad * 0.55;
            for i in -3..=3 {
                let x = cx + i as f32 * rad * 0.1 - rad * 0.03;
                r.fill_rect(x, teeth_y, rad * 0.06, rad * 0.15, 0.75);
            }
        }
        Silhouette::Ghost => {
            let rad = (r.width.min(r.height) as f32) * 0.25;
            // Dome and body
            r.fill_circle(cx, cy - rad * 0.2, rad, 0.85);
            r.fill_rect(cx - rad, cy - rad * 0.2, rad * 2.0, rad, 0.85);
            // Wavy hem, drawn as column strips
            let hem_top = cy + rad * 0.8;
            let x0 = (cx - rad) as i32;
            let x1 = (cx + rad) as i32;
            for x in x0..=x1 {
                let wave = ((x as f32 - cx) * 0.2).sin() * rad * 0.12;
                let bottom = hem_top + rad * 0.12 + wave;
                for y in hem_top as i32..=bottom as i32 {
                    r.plot(x, y, 1.0, 0.85);
                }
            }
            // Eye sockets
            let eye_y = cy - rad * 0.35;
            r.fill_ellipse(cx - rad * 0.35, eye_y, rad * 0.16, rad * 0.22, 0.02);
            r.fill_ellipse(cx + rad * 0.35, eye_y, rad * 0.16, rad * 0.22, 0.02);
        }
    }
}

/// Sample a raster to exactly `budget` particles: shuffle-truncate when more
/// cells are lit, pad with scattered off-screen fallback positions when fewer.
/// The instanced buffer is therefore always fully populated.
pub fn sample_with_budget(raster: &Raster, budget: usize, rng: &mut StdRng) -> Vec<ShapeSample> {
    let budget = budget.clamp(1, MAX_PARTICLES);
    let mut samples = raster.samples();
    if samples.len() > budget {
        samples.shuffle(rng);
        samples.truncate(budget);
    } else {
        let w = raster.width as f32;
        let h = raster.height as f32;
        while samples.len() < budget {
            samples.push(ShapeSample {
                x: rng.gen::<f32>() * w,
                y: -(0.5 * h + rng.gen::<f32>() * 0.5 * h),
                luminance: 0.0,
                tag: Tag::Body,
            });
        }
    }
    samples
}

/// Morph start positions for `target` samples: the text cell at the same grid
/// position shifted below the frame when the text covers it, otherwise a
/// random scatter under the bottom edge. One entry per target sample.
pub fn morph_starts(target: &[ShapeSample], text: &Raster, rng: &mut StdRng) -> Vec<Vec2> {
    let w = text.width as f32;
    let h = text.height as f32;
    target
        .iter()
        .map(|s| {
            let gx = s.x.clamp(0.0, w - 1.0) as u32;
            let gy_down = (h - 1.0 - s.y.clamp(0.0, h - 1.0)) as u32;
            if s.y >= 0.0 && text.lit_at(gx, gy_down) {
                Vec2::new(s.x, s.y - 0.8 * h)
            } else {
                Vec2::new(rng.gen::<f32>() * w, -(0.5 * h + rng.gen::<f32>() * 0.5 * h))
            }
        })
        .collect()
}

/// Locate a usable TTF for text shapes. Checks `SEANCE_FONT` first, then the
/// common Linux system fonts. Callers fall back to scatter-only morph starts
/// when none is found.
pub fn load_font() -> Option<Font<'static>> {
    let candidates = [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
        "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
        "/usr/share/fonts/noto/NotoSans-Bold.ttf",
    ];
    let env_font = std::env::var("SEANCE_FONT").ok();
    let paths = env_font.iter().map(String::as_str).chain(candidates);
    for path in paths {
        if let Ok(bytes) = std::fs::read(path) {
            if let Some(font) = Font::try_from_vec(bytes) {
                return Some(font);
            }
        }
    }
    None
}
