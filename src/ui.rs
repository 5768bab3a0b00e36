//! Console renderer: keeps a copy of both boards and prints them whenever the
//! status line changes.

use std::io::{self, Write};

use crate::common::{Coord, ShotResult};
use crate::config::GRID_SIZE;
use crate::renderer::{BoardSide, CellView, Preview, Renderer};
use crate::stats::MatchStats;

pub struct ConsoleRenderer<W: Write = io::Stdout> {
    out: W,
    own: [[CellView; GRID_SIZE]; GRID_SIZE],
    target: [[CellView; GRID_SIZE]; GRID_SIZE],
    preview: Option<Preview>,
    score: (u32, u32),
}

impl ConsoleRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            own: [[CellView::Empty; GRID_SIZE]; GRID_SIZE],
            target: [[CellView::Empty; GRID_SIZE]; GRID_SIZE],
            preview: None,
            score: (0, 0),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn glyph(view: CellView) -> char {
        match view {
            CellView::Empty => '.',
            CellView::Piece(_) => '#',
            CellView::Flag => 'F',
            CellView::Shot(ShotResult::Head) => '@',
            CellView::Shot(ShotResult::Hit) => 'X',
            CellView::Shot(ShotResult::Miss) => 'o',
        }
    }

    fn own_glyph(&self, at: Coord) -> char {
        if let Some(preview) = &self.preview {
            if preview.cells.contains(&at) {
                return if preview.valid { '+' } else { '!' };
            }
        }
        Self::glyph(self.own[at.row][at.col])
    }

    fn header(line: &mut String) {
        line.push_str("   ");
        for c in 0..GRID_SIZE {
            line.push(' ');
            line.push((b'A' + c as u8) as char);
        }
    }

    /// Both boards side by side, own on the left.
    pub fn render_boards(&self) -> String {
        let mut text = format!(
            "{:<24}{}\n",
            "   Your planes", "     Opponent"
        );
        let mut line = String::new();
        Self::header(&mut line);
        line.push_str("    ");
        Self::header(&mut line);
        text.push_str(&line);
        text.push('\n');
        for r in 0..GRID_SIZE {
            let mut line = format!("{:2} ", r + 1);
            for c in 0..GRID_SIZE {
                line.push(' ');
                line.push(self.own_glyph(Coord::new(r, c)));
            }
            line.push_str(&format!("    {:2} ", r + 1));
            for c in 0..GRID_SIZE {
                line.push(' ');
                line.push(Self::glyph(self.target[r][c]));
            }
            text.push_str(&line);
            text.push('\n');
        }
        text.push_str(&format!(
            "Heads hit - You: {} Opponent: {}\n",
            self.score.0, self.score.1
        ));
        text
    }

    fn print(&mut self, text: &str) {
        let _ = self.out.write_all(text.as_bytes());
        let _ = self.out.flush();
    }
}

impl<W: Write> Renderer for ConsoleRenderer<W> {
    fn on_cell_state_changed(&mut self, side: BoardSide, at: Coord, state: CellView) {
        if !at.in_bounds() {
            return;
        }
        match side {
            BoardSide::Own => self.own[at.row][at.col] = state,
            BoardSide::Target => self.target[at.row][at.col] = state,
        }
    }

    fn on_status_changed(&mut self, text: &str) {
        let boards = self.render_boards();
        self.print(&format!("\n{}{}\n", boards, text));
    }

    fn on_score_changed(&mut self, heads_hit: u32, opponent_heads_hit: u32) {
        self.score = (heads_hit, opponent_heads_hit);
    }

    fn on_match_ended(&mut self, did_win: bool, stats: &MatchStats) {
        let title = if did_win { "Victory!" } else { "Defeat!" };
        self.print(&format!(
            "\n*** {} ***\nShots fired: {}\nHits: {}\nHit ratio: {}%\nTime played: {}\n",
            title,
            stats.total_shots(),
            stats.hits(),
            stats.hit_ratio(),
            stats.elapsed_display()
        ));
    }

    fn on_preview(&mut self, preview: Option<&Preview>) {
        self.preview = preview.cloned();
        if let Some(p) = preview {
            let verdict = if p.valid { "fits" } else { "does not fit" };
            let boards = self.render_boards();
            self.print(&format!("\n{}Preview {}\n", boards, verdict));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::PieceColor;

    #[test]
    fn boards_show_pieces_shots_and_flags() {
        let mut r = ConsoleRenderer::new(Vec::new());
        r.on_cell_state_changed(BoardSide::Own, Coord::new(0, 0), CellView::Piece(PieceColor([1, 2, 3])));
        r.on_cell_state_changed(BoardSide::Own, Coord::new(0, 1), CellView::Shot(ShotResult::Head));
        r.on_cell_state_changed(BoardSide::Target, Coord::new(0, 0), CellView::Flag);
        r.on_cell_state_changed(BoardSide::Target, Coord::new(0, 1), CellView::Shot(ShotResult::Miss));
        let text = r.render_boards();
        let first_row = text.lines().nth(2).unwrap();
        assert!(first_row.starts_with(" 1  # @ ."));
        assert!(first_row.contains(" 1  F o ."));
    }

    #[test]
    fn status_change_prints_boards_and_text() {
        let mut r = ConsoleRenderer::new(Vec::new());
        r.on_score_changed(1, 2);
        r.on_status_changed("Your turn!");
        let out = String::from_utf8(r.into_inner()).unwrap();
        assert!(out.contains("Heads hit - You: 1 Opponent: 2"));
        assert!(out.trim_end().ends_with("Your turn!"));
    }

    #[test]
    fn preview_overlays_own_board() {
        let mut r = ConsoleRenderer::new(Vec::new());
        let preview = Preview {
            cells: vec![Coord::new(2, 2)],
            valid: false,
        };
        r.on_preview(Some(&preview));
        assert!(r.render_boards().lines().nth(4).unwrap().starts_with(" 3  . . !"));
        r.on_preview(None);
        assert!(r.render_boards().lines().nth(4).unwrap().starts_with(" 3  . . ."));
    }
}
