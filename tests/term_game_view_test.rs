use tui_memory::core::{Deck, GameState};
use tui_memory::term::{AdapterStatusView, AnchorY, FrameBuffer, GameView, Viewport};
use tui_memory::types::{CardValue, GameAction, RESOLVE_DELAY_MS};

fn two_pair_game() -> GameState {
    let v = CardValue;
    let mut gs = GameState::from_deck(1, Deck::from_cards(vec![v(0), v(1), v(0), v(1)]));
    gs.start();
    gs
}

fn screen_contains(fb: &FrameBuffer, needle: &str) -> bool {
    (0..fb.height()).any(|y| fb.row_text(y).contains(needle))
}

#[test]
fn term_view_renders_border_corners() {
    let mut gs = GameState::new(1, 8);
    gs.start();
    let view = GameView::default().with_anchor_y(AnchorY::Top);
    let vp = Viewport::new(80, 24);
    let layout = view.layout(16, vp);
    let fb = view.render(&gs.snapshot(), None, vp);

    let (x0, y0) = (layout.start_x, layout.start_y);
    let (x1, y1) = (x0 + layout.frame_w - 1, y0 + layout.frame_h - 1);
    assert_eq!(y0, 0);
    assert_eq!(fb.get(x0, y0).unwrap().ch, '┌');
    assert_eq!(fb.get(x1, y0).unwrap().ch, '┐');
    assert_eq!(fb.get(x0, y1).unwrap().ch, '└');
    assert_eq!(fb.get(x1, y1).unwrap().ch, '┘');
}

#[test]
fn term_view_shows_face_of_revealed_card_only() {
    let mut gs = two_pair_game();
    gs.apply_action(GameAction::Select(0));

    let view = GameView::default();
    let vp = Viewport::new(80, 24);
    let layout = view.layout(4, vp);
    let fb = view.render(&gs.snapshot(), None, vp);

    // Card 0 sits two cells inside the frame; its name is on the middle row.
    let mid = layout.start_y + 2 + 1;
    let row = fb.row_text(mid);
    assert!(row.contains("Agumon"), "row was {:?}", row);
    assert!(!screen_contains(&fb, "Patamon"));
}

#[test]
fn term_view_draws_cursor_beside_card() {
    let gs = two_pair_game();
    let view = GameView::default();
    let vp = Viewport::new(80, 24);
    let layout = view.layout(4, vp);
    let fb = view.render(&gs.snapshot(), Some(3), vp);

    // Card 3 is bottom-right of the 2x2 grid.
    let x = layout.start_x + 2 + 11;
    let mid = layout.start_y + 2 + 4 + 1;
    assert_eq!(fb.get(x - 1, mid).unwrap().ch, '▶');
    assert_eq!(fb.get(x + 10, mid).unwrap().ch, '◀');
}

#[test]
fn term_view_draws_side_panel_when_wide_enough() {
    let mut gs = two_pair_game();
    gs.apply_action(GameAction::Select(0));
    gs.apply_action(GameAction::Select(1));

    let view = GameView::default();
    let fb = view.render(&gs.snapshot(), None, Viewport::new(80, 24));
    for label in ["MOVES", "TIME", "BEST", "BEST TIME", "PAIRS", "AI"] {
        assert!(screen_contains(&fb, label), "missing {}", label);
    }
    assert!(screen_contains(&fb, "99:59"));
    assert!(screen_contains(&fb, "0/2"));
    assert!(screen_contains(&fb, "OFF"));
}

#[test]
fn term_view_hides_side_panel_when_narrow() {
    let gs = two_pair_game();
    let view = GameView::default();
    let fb = view.render(&gs.snapshot(), None, Viewport::new(30, 24));
    assert!(!screen_contains(&fb, "MOVES"));
}

#[test]
fn term_view_shows_adapter_status() {
    let gs = two_pair_game();
    let view = GameView::default();
    let status = AdapterStatusView {
        enabled: true,
        client_count: 2,
        controller_id: Some(7),
    };
    let fb = view.render_with_adapter(&gs.snapshot(), None, Some(&status), Viewport::new(80, 24));
    assert!(screen_contains(&fb, "ON 2"));
    assert!(screen_contains(&fb, "CTRL 7"));
}

#[test]
fn term_view_shows_completion_overlay() {
    let mut gs = two_pair_game();
    for (a, b) in [(0, 2), (1, 3)] {
        gs.apply_action(GameAction::Select(a));
        gs.apply_action(GameAction::Select(b));
        gs.advance(RESOLVE_DELAY_MS);
    }
    assert!(gs.is_complete());

    let view = GameView::default();
    let fb = view.render(&gs.snapshot(), None, Viewport::new(80, 24));
    assert!(screen_contains(&fb, "COMPLETE!"));
    assert!(screen_contains(&fb, "MOVES 2"));
    assert!(screen_contains(&fb, "NEW BEST!"));
    assert!(screen_contains(&fb, "r to play again"));
}
