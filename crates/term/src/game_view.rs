//! GameView: maps a [`GameSnapshot`] into a terminal framebuffer.
//!
//! This module is pure (no I/O). Each platform is drawn in its own frame and
//! shifted vertically by the eased tilt, the gap between them stays empty apart
//! from the fulcrum, and a side panel carries score, the balance gauge and the
//! balanced-time bar.

use crate::core::snapshot::kind_from_code;
use crate::core::{GameSnapshot, Phase};
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::tilt::TiltSmoother;
use crate::types::{ColumnRange, PieceKind, Platform};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// What the side panel shows about the observation adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterStatusView {
    pub enabled: bool,
    pub client_count: u16,
    pub streaming_count: u16,
}

const PLAY_BG: Rgb = Rgb::new(30, 30, 40);
const SCREEN_BG: Rgb = Rgb::new(0, 0, 0);
const GAUGE_CELLS: u16 = 9;
const BAR_CELLS: u16 = 10;

pub struct GameView {
    /// Board cell width in terminal columns.
    cell_w: u16,
    /// Board cell height in terminal rows.
    cell_h: u16,
}

impl Default for GameView {
    fn default() -> Self {
        // 2x1 helps compensate for typical terminal glyph aspect ratio.
        Self { cell_w: 2, cell_h: 1 }
    }
}

/// Screen placement of the board for one frame
#[derive(Debug, Clone, Copy)]
struct BoardOrigin {
    x: u16,
    y: u16,
    max_shift: u16,
    height: i8,
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
        }
    }

    /// Terminal size needed to show the board frames without clipping.
    pub fn board_size(&self, snap: &GameSnapshot) -> (u16, u16) {
        let max_shift = TiltSmoother::max_row_offset(self.cell_h);
        let w = snap.width as u16 * self.cell_w + 2;
        let h = snap.layout.height as u16 * self.cell_h + 2 + 2 * max_shift;
        (w, h)
    }

    /// Render into an existing framebuffer, resizing it to the viewport.
    pub fn render_into(
        &self,
        snap: &GameSnapshot,
        tilt: &TiltSmoother,
        adapter: Option<&AdapterStatusView>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::new(Rgb::new(220, 220, 220), SCREEN_BG).glyph(' '));

        let (frame_w, frame_h) = self.board_size(snap);
        let origin = BoardOrigin {
            x: viewport.width.saturating_sub(frame_w + 16) / 2,
            y: viewport.height.saturating_sub(frame_h) / 2,
            max_shift: TiltSmoother::max_row_offset(self.cell_h),
            height: snap.layout.height,
        };

        for platform in [Platform::Left, Platform::Right] {
            let range = match platform {
                Platform::Left => snap.layout.left,
                Platform::Right => snap.layout.right,
            };
            let shift = tilt.row_offset(platform == Platform::Left, self.cell_h);
            self.draw_platform(fb, snap, origin, range, shift);
        }

        if let Some(active) = &snap.active {
            let shift = tilt.row_offset(active.platform == Platform::Left, self.cell_h);
            for cell in &active.cells {
                if cell.row < 0 || cell.row >= origin.height || cell.col < 0 {
                    continue;
                }
                self.draw_cell(fb, origin, cell.col as u16, cell.row as u16, shift, active.kind);
            }
        }

        self.draw_fulcrum(fb, snap, origin, frame_h);
        self.draw_side_panel(fb, snap, adapter, viewport, origin.x + frame_w + 2, origin.y);

        match snap.phase {
            Phase::Idle => self.draw_overlay_text(fb, origin, frame_w, frame_h, "PRESS ENTER"),
            Phase::GameOver => self.draw_overlay_text(fb, origin, frame_w, frame_h, "GAME OVER"),
            Phase::Running => {}
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &GameSnapshot, tilt: &TiltSmoother, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, tilt, None, viewport, &mut fb);
        fb
    }

    fn draw_platform(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        origin: BoardOrigin,
        range: ColumnRange,
        shift: i16,
    ) {
        let border = CellStyle::new(Rgb::new(200, 200, 200), SCREEN_BG);
        let empty = CellStyle::new(Rgb::new(90, 90, 100), PLAY_BG).dim();

        let box_x = origin.x + range.start as u16 * self.cell_w;
        let box_y = shifted(origin.y + origin.max_shift, shift);
        let box_w = range.len() as u16 * self.cell_w + 2;
        let box_h = origin.height as u16 * self.cell_h + 2;
        fb.draw_box(box_x, box_y, box_w, box_h, border);

        for row in 0..origin.height {
            for col in range.iter() {
                let (x, y) = (col as u16, row as u16);
                match kind_from_code(snap.cell(col, row)) {
                    Some(kind) => self.draw_cell(fb, origin, x, y, shift, kind),
                    None => self.fill_cell(fb, origin, x, y, shift, '·', empty),
                }
            }
        }
    }

    fn draw_cell(&self, fb: &mut FrameBuffer, origin: BoardOrigin, col: u16, row: u16, shift: i16, kind: PieceKind) {
        let style = CellStyle::new(kind_color(kind), PLAY_BG).bold();
        self.fill_cell(fb, origin, col, row, shift, '█', style);
    }

    fn fill_cell(
        &self,
        fb: &mut FrameBuffer,
        origin: BoardOrigin,
        col: u16,
        row: u16,
        shift: i16,
        ch: char,
        style: CellStyle,
    ) {
        // Row 0 is the bottom of the board, y grows downward on screen.
        let flipped = (origin.height as u16).saturating_sub(1 + row);
        let px = origin.x + 1 + col * self.cell_w;
        let py = shifted(origin.y + origin.max_shift + 1 + flipped * self.cell_h, shift);
        fb.fill_rect(px, py, self.cell_w, self.cell_h, ch, style);
    }

    fn draw_fulcrum(&self, fb: &mut FrameBuffer, snap: &GameSnapshot, origin: BoardOrigin, frame_h: u16) {
        let gap_start = snap.layout.left.end as u16 + 1;
        let gap_end = snap.layout.right.start as u16;
        let mid_col = (gap_start + gap_end) as f32 / 2.0;
        let x = origin.x + 1 + (mid_col * self.cell_w as f32) as u16;
        let y = origin.y + frame_h - 1;
        let style = CellStyle::new(Rgb::new(160, 160, 170), SCREEN_BG);
        fb.put_char(x.saturating_sub(1), y, '▲', style);
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        adapter: Option<&AdapterStatusView>,
        viewport: Viewport,
        panel_x: u16,
        start_y: u16,
    ) {
        if panel_x >= viewport.width || viewport.width - panel_x < 12 {
            return;
        }

        let label = CellStyle::new(Rgb::new(220, 220, 220), SCREEN_BG).bold();
        let value = CellStyle::new(Rgb::new(200, 200, 200), SCREEN_BG);
        let dim = value.dim();

        let mut y = start_y;
        for (name, n) in [("SCORE", snap.score), ("LEVEL", snap.level), ("LINES", snap.lines)] {
            fb.put_str(panel_x, y, name, label);
            fb.put_u32(panel_x, y + 1, n, value);
            y += 3;
        }

        fb.put_str(panel_x, y, "BALANCE", label);
        y += 1;
        self.draw_gauge(fb, panel_x, y, snap.tilt, value);
        y += 1;
        fb.put_char(panel_x, y, 'L', dim);
        let n = fb.put_u32(panel_x + 2, y, snap.left_count as u32, value);
        let rx = panel_x + 2 + n.max(3) + 1;
        fb.put_char(rx, y, 'R', dim);
        fb.put_u32(rx + 2, y, snap.right_count as u32, value);
        y += 1;
        self.draw_bar(fb, panel_x, y, snap.balanced_ms, snap.balance_unit_ms);
        y += 2;

        fb.put_str(panel_x, y, "AI", label);
        y += 1;
        match adapter {
            Some(st) if st.enabled => {
                fb.put_str(panel_x, y, "ON", value);
                fb.put_str(panel_x + 3, y, "C", dim);
                fb.put_u32(panel_x + 5, y, st.client_count as u32, value);
                fb.put_str(panel_x + 8, y, "S", dim);
                fb.put_u32(panel_x + 10, y, st.streaming_count as u32, value);
            }
            _ => fb.put_str(panel_x, y, "OFF", value),
        }
    }

    /// `[----|----]` with a marker at the tilt position (left heavy = left).
    fn draw_gauge(&self, fb: &mut FrameBuffer, x: u16, y: u16, tilt: f32, style: CellStyle) {
        let marker = CellStyle::new(Rgb::new(255, 210, 90), SCREEN_BG).bold();
        fb.put_char(x, y, '[', style);
        for i in 0..GAUGE_CELLS {
            let ch = if i == GAUGE_CELLS / 2 { '|' } else { '-' };
            fb.put_char(x + 1 + i, y, ch, style);
        }
        fb.put_char(x + 1 + GAUGE_CELLS, y, ']', style);

        let t = (1.0 - tilt.clamp(-1.0, 1.0)) / 2.0;
        let pos = (t * (GAUGE_CELLS - 1) as f32).round() as u16;
        fb.put_char(x + 1 + pos, y, '●', marker);
    }

    fn draw_bar(&self, fb: &mut FrameBuffer, x: u16, y: u16, elapsed_ms: u32, unit_ms: u32) {
        let filled_style = CellStyle::new(Rgb::new(100, 220, 120), SCREEN_BG);
        let empty_style = CellStyle::new(Rgb::new(70, 70, 80), SCREEN_BG);
        let unit = unit_ms.max(1) as u64;
        let filled = ((elapsed_ms as u64).min(unit) * BAR_CELLS as u64 / unit) as u16;
        for i in 0..BAR_CELLS {
            if i < filled {
                fb.put_char(x + i, y, '▰', filled_style);
            } else {
                fb.put_char(x + i, y, '▱', empty_style);
            }
        }
    }

    fn draw_overlay_text(&self, fb: &mut FrameBuffer, origin: BoardOrigin, frame_w: u16, frame_h: u16, text: &str) {
        let style = CellStyle::new(Rgb::new(255, 255, 255), SCREEN_BG).bold();
        let text_w = text.chars().count() as u16;
        let x = origin.x + frame_w.saturating_sub(text_w) / 2;
        fb.put_str(x, origin.y + frame_h / 2, text, style);
    }
}

fn shifted(y: u16, shift: i16) -> u16 {
    (y as i32 + shift as i32).max(0) as u16
}

fn kind_color(kind: PieceKind) -> Rgb {
    match kind {
        PieceKind::I => Rgb::new(80, 220, 220),
        PieceKind::O => Rgb::new(240, 220, 80),
        PieceKind::T => Rgb::new(200, 120, 220),
        PieceKind::S => Rgb::new(100, 220, 120),
        PieceKind::Z => Rgb::new(220, 80, 80),
        PieceKind::J => Rgb::new(80, 120, 220),
        PieceKind::L => Rgb::new(255, 165, 0),
        PieceKind::Domino => Rgb::new(180, 180, 180),
        PieceKind::Mono => Rgb::new(240, 240, 240),
    }
}
