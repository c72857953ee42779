//! Matrix rain canvas background.

use web_sys::CanvasRenderingContext2d;

use crate::config::RainConfig;
use crate::rng::RandomSource;
use crate::surface::{Component, NodeId, Surface};
use crate::Result;

pub const CANVAS_ID: &str = "matrix-canvas";

const FADE: &str = "rgba(5, 5, 5, 0.05)";
const GREEN: &str = "#0F0";
const RED: &str = "#F00";

/// One glyph painted during a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Glyph {
    pub ch: char,
    pub x: f64,
    pub y: f64,
    pub red: bool,
}

/// Everything to paint for one tick: a translucent fade over the whole canvas,
/// then one glyph per column.
#[derive(Clone, Debug, PartialEq)]
pub struct RainFrame {
    pub width: u32,
    pub height: u32,
    pub glyph_size: u32,
    pub glyphs: Vec<Glyph>,
}

/// Column drop positions, counted in glyph rows.
#[derive(Clone, Debug, PartialEq)]
pub struct RainState {
    drops: Vec<u32>,
    width: u32,
    height: u32,
    glyph_size: u32,
}

impl RainState {
    pub fn new(width: u32, height: u32, glyph_size: u32) -> Self {
        let glyph_size = glyph_size.max(1);
        Self {
            drops: vec![1; width.div_ceil(glyph_size) as usize],
            width,
            height,
            glyph_size,
        }
    }

    pub fn drops(&self) -> &[u32] {
        &self.drops
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// New canvas size; the column set and positions are left alone.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn tick(&mut self, cfg: &RainConfig, rng: &mut dyn RandomSource) -> RainFrame {
        let charset: Vec<char> = cfg.glyphs.chars().collect();
        let g = self.glyph_size;
        let mut glyphs = Vec::with_capacity(self.drops.len());
        for (i, drop) in self.drops.iter_mut().enumerate() {
            let ch = charset.get(rng.index(charset.len())).copied().unwrap_or(' ');
            let red = rng.chance(cfg.red_chance);
            let y = *drop as u64 * g as u64;
            glyphs.push(Glyph {
                ch,
                x: (i as u64 * g as u64) as f64,
                y: y as f64,
                red,
            });
            if y > self.height as u64 && rng.chance(cfg.reset_chance) {
                *drop = 0;
            }
            *drop = drop.saturating_add(1);
        }
        RainFrame {
            width: self.width,
            height: self.height,
            glyph_size: g,
            glyphs,
        }
    }
}

pub struct MatrixRain {
    config: RainConfig,
    canvas: Option<NodeId>,
    state: Option<RainState>,
    viewport: (u32, u32),
}

impl MatrixRain {
    pub fn new(config: RainConfig, width: u32, height: u32) -> Self {
        Self {
            config,
            canvas: None,
            state: None,
            viewport: (width, height),
        }
    }

    pub fn canvas(&self) -> Option<NodeId> {
        self.canvas
    }

    pub fn state(&self) -> Option<&RainState> {
        self.state.as_ref()
    }

    pub fn period_ms(&self) -> u32 {
        self.config.period_ms
    }

    pub fn resize(&mut self, surface: &mut dyn Surface, width: u32, height: u32) -> Result<()> {
        self.viewport = (width, height);
        if let (Some(canvas), Some(state)) = (self.canvas, self.state.as_mut()) {
            size_canvas(surface, canvas, width, height)?;
            state.resize(width, height);
        }
        Ok(())
    }

    pub fn tick(&mut self, rng: &mut dyn RandomSource) -> Option<RainFrame> {
        let cfg = &self.config;
        self.state.as_mut().map(|s| s.tick(cfg, rng))
    }
}

fn size_canvas(surface: &mut dyn Surface, canvas: NodeId, w: u32, h: u32) -> Result<()> {
    surface.set_attribute(canvas, "width", &w.to_string())?;
    surface.set_attribute(canvas, "height", &h.to_string())
}

impl Component for MatrixRain {
    fn name(&self) -> &'static str {
        "matrix-rain"
    }

    fn mount(&mut self, surface: &mut dyn Surface) -> Result<()> {
        if self.canvas.is_some() || surface.exists(CANVAS_ID) {
            log::debug!("matrix canvas already present");
            return Ok(());
        }
        let canvas = surface.create("canvas")?;
        surface.set_id(canvas, CANVAS_ID)?;
        let (w, h) = self.viewport;
        size_canvas(surface, canvas, w, h)?;
        let root = surface.root();
        surface.prepend(root, canvas)?;
        self.canvas = Some(canvas);
        self.state = Some(RainState::new(w, h, self.config.glyph_size));
        Ok(())
    }

    fn unmount(&mut self, surface: &mut dyn Surface) -> Result<()> {
        if let Some(canvas) = self.canvas.take() {
            surface.remove(canvas)?;
        }
        self.state = None;
        Ok(())
    }

    fn is_mounted(&self) -> bool {
        self.canvas.is_some()
    }
}

/// Paint a frame onto the 2D context.
pub fn paint(ctx: &CanvasRenderingContext2d, frame: &RainFrame) -> Result<()> {
    ctx.set_fill_style_str(FADE);
    ctx.fill_rect(0.0, 0.0, frame.width as f64, frame.height as f64);
    ctx.set_font(&format!("{}px monospace", frame.glyph_size));
    let mut buf = [0u8; 4];
    for glyph in &frame.glyphs {
        ctx.set_fill_style_str(if glyph.red { RED } else { GREEN });
        ctx.fill_text(glyph.ch.encode_utf8(&mut buf), glyph.x, glyph.y)?;
    }
    Ok(())
}
