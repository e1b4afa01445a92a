//! GameView: maps a `core::GameSnapshot` into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested. The same layout is
//! used for drawing and for mouse hit-testing, so a click always lands on the
//! card that was drawn under it.

use crate::core::{CardView, GameSnapshot};
use crate::faces::face_for;
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{grid_columns, ElapsedTime};

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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterStatusView {
    pub enabled: bool,
    pub client_count: u16,
    pub controller_id: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Center,
    Top,
}

/// Where the board frame and its cards sit for a given card count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub start_x: u16,
    pub start_y: u16,
    pub frame_w: u16,
    pub frame_h: u16,
    pub columns: u16,
    pub rows: u16,
}

const BLACK: Rgb = Rgb::new(0, 0, 0);
const TABLE: Rgb = Rgb::new(24, 40, 32);
const CARD_BACK: Rgb = Rgb::new(40, 70, 140);
const CARD_FACE: Rgb = Rgb::new(235, 230, 215);
const CURSOR: Rgb = Rgb::new(250, 220, 60);

/// A lightweight terminal renderer for the card grid.
pub struct GameView {
    /// Card width in terminal columns.
    card_w: u16,
    /// Card height in terminal rows.
    card_h: u16,
    gap_x: u16,
    gap_y: u16,
    anchor_y: AnchorY,
}

impl Default for GameView {
    fn default() -> Self {
        Self {
            card_w: 10,
            card_h: 3,
            gap_x: 1,
            gap_y: 1,
            anchor_y: AnchorY::Center,
        }
    }
}

impl GameView {
    pub fn new(card_w: u16, card_h: u16) -> Self {
        Self {
            card_w: card_w.max(1),
            card_h: card_h.max(1),
            ..Self::default()
        }
    }

    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    pub fn layout(&self, card_count: usize, viewport: Viewport) -> GridLayout {
        let columns = grid_columns(card_count) as u16;
        let rows = (card_count as u16).div_ceil(columns).max(1);

        // border + padding on each side
        let frame_w = columns * self.card_w + (columns - 1) * self.gap_x + 4;
        let frame_h = rows * self.card_h + (rows - 1) * self.gap_y + 4;

        let start_x = viewport.width.saturating_sub(frame_w + PANEL_W) / 2;
        let start_y = match self.anchor_y {
            AnchorY::Center => viewport.height.saturating_sub(frame_h) / 2,
            AnchorY::Top => 0,
        };

        GridLayout {
            start_x,
            start_y,
            frame_w,
            frame_h,
            columns,
            rows,
        }
    }

    fn card_origin(&self, layout: &GridLayout, index: usize) -> (u16, u16) {
        let col = index as u16 % layout.columns;
        let row = index as u16 / layout.columns;
        (
            layout.start_x + 2 + col * (self.card_w + self.gap_x),
            layout.start_y + 2 + row * (self.card_h + self.gap_y),
        )
    }

    /// Deck index of the card drawn at terminal cell (`x`, `y`).
    pub fn hit_test(&self, card_count: usize, viewport: Viewport, x: u16, y: u16) -> Option<usize> {
        let layout = self.layout(card_count, viewport);
        let gx = x.checked_sub(layout.start_x + 2)?;
        let gy = y.checked_sub(layout.start_y + 2)?;

        let pitch_x = self.card_w + self.gap_x;
        let pitch_y = self.card_h + self.gap_y;
        if gx % pitch_x >= self.card_w || gy % pitch_y >= self.card_h {
            return None;
        }

        let col = gx / pitch_x;
        let row = gy / pitch_y;
        if col >= layout.columns || row >= layout.rows {
            return None;
        }
        let index = (row * layout.columns + col) as usize;
        (index < card_count).then_some(index)
    }

    /// Render into an existing framebuffer, reusing its allocation.
    pub fn render_into(
        &self,
        snap: &GameSnapshot,
        cursor: Option<usize>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        self.render_into_with_adapter(snap, cursor, None, viewport, fb);
    }

    pub fn render_into_with_adapter(
        &self,
        snap: &GameSnapshot,
        cursor: Option<usize>,
        adapter: Option<&AdapterStatusView>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().into_cell(' '));

        let layout = self.layout(snap.cards.len(), viewport);
        let table = CellStyle::new(Rgb::new(60, 90, 70), TABLE);
        let border = CellStyle::new(Rgb::new(200, 200, 200), BLACK);

        fb.fill_rect(
            layout.start_x + 1,
            layout.start_y + 1,
            layout.frame_w.saturating_sub(2),
            layout.frame_h.saturating_sub(2),
            ' ',
            table,
        );
        draw_border(
            fb,
            layout.start_x,
            layout.start_y,
            layout.frame_w,
            layout.frame_h,
            border,
        );

        for (index, card) in snap.cards.iter().enumerate() {
            let (x, y) = self.card_origin(&layout, index);
            self.draw_card(fb, x, y, card);
            if cursor == Some(index) {
                self.draw_cursor(fb, x, y);
            }
        }

        self.draw_side_panel(fb, snap, adapter, viewport, &layout);

        if let Some(done) = snap.completion {
            let best = done.new_best_moves || done.new_best_time;
            self.draw_completion(fb, &layout, done.moves, done.time, best);
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(
        &self,
        snap: &GameSnapshot,
        cursor: Option<usize>,
        viewport: Viewport,
    ) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, cursor, viewport, &mut fb);
        fb
    }

    pub fn render_with_adapter(
        &self,
        snap: &GameSnapshot,
        cursor: Option<usize>,
        adapter: Option<&AdapterStatusView>,
        viewport: Viewport,
    ) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into_with_adapter(snap, cursor, adapter, viewport, &mut fb);
        fb
    }

    fn draw_card(&self, fb: &mut FrameBuffer, x: u16, y: u16, card: &CardView) {
        if !card.revealed() {
            let back = CellStyle::new(Rgb::new(90, 120, 200), CARD_BACK);
            fb.fill_rect(x, y, self.card_w, self.card_h, '▒', back);
            return;
        }

        let face = face_for(card.value);
        let mut style = CellStyle::new(face.color, CARD_FACE).bold();
        if card.cleared {
            style = CellStyle::new(face.color, Rgb::new(70, 80, 75)).dim();
        }
        fb.fill_rect(x, y, self.card_w, self.card_h, ' ', style);

        let mid = y + self.card_h / 2;
        if self.card_h >= 3 {
            fb.put_char(x + self.card_w / 2, mid - 1, face.glyph, style);
        }
        let name_w = (face.name.chars().count() as u16).min(self.card_w);
        let name_x = x + (self.card_w - name_w) / 2;
        let text = CellStyle {
            fg: if card.cleared { Rgb::new(160, 160, 160) } else { Rgb::new(30, 30, 30) },
            ..style
        };
        for (i, ch) in face.name.chars().take(name_w as usize).enumerate() {
            fb.put_char(name_x + i as u16, mid, ch, text);
        }
    }

    /// Markers in the gaps left and right of the card.
    fn draw_cursor(&self, fb: &mut FrameBuffer, x: u16, y: u16) {
        let style = CellStyle::new(CURSOR, TABLE).bold();
        let mid = y + self.card_h / 2;
        fb.put_char(x - 1, mid, '▶', style);
        fb.put_char(x + self.card_w, mid, '◀', style);
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        adapter: Option<&AdapterStatusView>,
        viewport: Viewport,
        layout: &GridLayout,
    ) {
        let panel_x = layout.start_x.saturating_add(layout.frame_w).saturating_add(2);
        if panel_x >= viewport.width || viewport.width - panel_x < 12 {
            return;
        }

        let label = CellStyle::new(Rgb::new(220, 220, 220), BLACK).bold();
        let value = CellStyle::new(Rgb::new(200, 200, 200), BLACK);

        let mut y = layout.start_y;
        fb.put_str(panel_x, y, "MOVES", label);
        fb.put_u32(panel_x, y + 1, snap.moves, value);
        y += 3;

        fb.put_str(panel_x, y, "TIME", label);
        put_time(fb, panel_x, y + 1, snap.elapsed, value);
        y += 3;

        fb.put_str(panel_x, y, "BEST", label);
        match snap.best.moves {
            Some(m) => fb.put_u32(panel_x, y + 1, m, value),
            None => fb.put_str(panel_x, y + 1, "-", value),
        };
        y += 3;

        fb.put_str(panel_x, y, "BEST TIME", label);
        put_time(fb, panel_x, y + 1, snap.best.effective_time(), value);
        y += 3;

        fb.put_str(panel_x, y, "PAIRS", label);
        let w = fb.put_u32(panel_x, y + 1, snap.cleared_pairs as u32, value);
        fb.put_char(panel_x + w, y + 1, '/', value);
        fb.put_u32(panel_x + w + 1, y + 1, snap.pair_count as u32, value);
        y += 3;

        fb.put_str(panel_x, y, "AI", label);
        match adapter {
            Some(st) if st.enabled => {
                let w = fb.put_str(panel_x + 3, y, "ON ", value);
                fb.put_u32(panel_x + 3 + w, y, st.client_count as u32, value.dim());
                if let Some(id) = st.controller_id {
                    fb.put_str(panel_x, y + 1, "CTRL", value);
                    fb.put_u32(panel_x + 5, y + 1, id as u32, value);
                }
            }
            _ => {
                fb.put_str(panel_x + 3, y, "OFF", value);
            }
        }
        y += 3;

        let help = value.dim();
        for line in ["arrows move", "enter flips", "r restart", "q quit"] {
            if y >= viewport.height {
                break;
            }
            fb.put_str(panel_x, y, line, help);
            y += 1;
        }
    }

    fn draw_completion(
        &self,
        fb: &mut FrameBuffer,
        layout: &GridLayout,
        moves: u32,
        time: ElapsedTime,
        new_best: bool,
    ) {
        let box_w: u16 = 22;
        let box_h: u16 = if new_best { 7 } else { 6 };
        let x = layout.start_x + layout.frame_w.saturating_sub(box_w) / 2;
        let y = layout.start_y + layout.frame_h.saturating_sub(box_h) / 2;

        let bg = CellStyle::new(Rgb::new(255, 255, 255), BLACK);
        fb.fill_rect(x, y, box_w, box_h, ' ', bg);
        draw_border(fb, x, y, box_w, box_h, bg.bold());

        let title = "COMPLETE!";
        let tx = x + (box_w - title.len() as u16) / 2;
        fb.put_str(tx, y + 1, title, bg.bold());

        let w = fb.put_str(x + 3, y + 2, "MOVES ", bg);
        fb.put_u32(x + 3 + w, y + 2, moves, bg);
        let w = fb.put_str(x + 3, y + 3, "TIME  ", bg);
        put_time(fb, x + 3 + w, y + 3, time, bg);

        let mut row = y + 4;
        if new_best {
            let style = CellStyle::new(CURSOR, BLACK).bold();
            fb.put_str(x + 3, row, "NEW BEST!", style);
            row += 1;
        }
        fb.put_str(x + 3, row, "r to play again", bg.dim());
    }
}

const PANEL_W: u16 = 14;

fn draw_border(fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16, style: CellStyle) {
    if w < 2 || h < 2 {
        return;
    }

    fb.put_char(x, y, '┌', style);
    fb.put_char(x + w - 1, y, '┐', style);
    fb.put_char(x, y + h - 1, '└', style);
    fb.put_char(x + w - 1, y + h - 1, '┘', style);

    for dx in 1..w - 1 {
        fb.put_char(x + dx, y, '─', style);
        fb.put_char(x + dx, y + h - 1, '─', style);
    }
    for dy in 1..h - 1 {
        fb.put_char(x, y + dy, '│', style);
        fb.put_char(x + w - 1, y + dy, '│', style);
    }
}

/// `MM:SS`, minutes grow past two digits when needed.
fn put_time(fb: &mut FrameBuffer, x: u16, y: u16, t: ElapsedTime, style: CellStyle) -> u16 {
    let w = fb.put_u32_padded(x, y, t.minutes, 2, style);
    fb.put_char(x + w, y, ':', style);
    let s = fb.put_u32_padded(x + w + 1, y, t.seconds as u32, 2, style);
    w + 1 + s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GameState;

    #[test]
    fn layout_for_default_board_is_four_by_four() {
        let view = GameView::default();
        let l = view.layout(16, Viewport::new(80, 24));
        assert_eq!((l.columns, l.rows), (4, 4));
        // 4*10 + 3 + 4
        assert_eq!(l.frame_w, 47);
        // 4*3 + 3 + 4
        assert_eq!(l.frame_h, 19);
    }

    #[test]
    fn hit_test_matches_card_origins() {
        let view = GameView::default();
        let vp = Viewport::new(80, 24);
        let layout = view.layout(16, vp);
        for index in 0..16 {
            let (x, y) = view.card_origin(&layout, index);
            assert_eq!(view.hit_test(16, vp, x, y), Some(index));
            assert_eq!(view.hit_test(16, vp, x + 9, y + 2), Some(index));
        }
    }

    #[test]
    fn hit_test_misses_gaps_and_border() {
        let view = GameView::default();
        let vp = Viewport::new(80, 24);
        let layout = view.layout(16, vp);
        let (x, y) = view.card_origin(&layout, 0);
        assert_eq!(view.hit_test(16, vp, x + 10, y), None);
        assert_eq!(view.hit_test(16, vp, x, y + 3), None);
        assert_eq!(view.hit_test(16, vp, layout.start_x, layout.start_y), None);
        assert_eq!(view.hit_test(16, vp, 0, 0), None);
    }

    #[test]
    fn hit_test_ignores_empty_slots_in_short_row() {
        let view = GameView::default();
        let vp = Viewport::new(100, 30);
        // 10 cards on a 4-column grid: slot 10 is empty.
        let layout = view.layout(10, vp);
        let (x, y) = view.card_origin(&layout, 10);
        assert_eq!(view.hit_test(10, vp, x, y), None);
    }

    #[test]
    fn face_down_cards_hide_their_value() {
        let mut gs = GameState::new(3, 8);
        gs.start();
        let snap = gs.snapshot();
        let view = GameView::default();
        let vp = Viewport::new(80, 24);
        let fb = view.render(&snap, None, vp);

        let layout = view.layout(16, vp);
        let (x, y) = view.card_origin(&layout, 0);
        assert_eq!(fb.get(x, y).unwrap().ch, '▒');
        assert_eq!(fb.get(x + 5, y + 1).unwrap().ch, '▒');
    }

    #[test]
    fn put_time_pads() {
        let mut fb = FrameBuffer::new(8, 1);
        let w = put_time(&mut fb, 0, 0, ElapsedTime::new(3, 7), CellStyle::default());
        assert_eq!(w, 5);
        assert_eq!(fb.row_text(0), "03:07   ");
    }
}
