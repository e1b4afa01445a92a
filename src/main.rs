//! Terminal memory game runner.
//!
//! One loop owns the session: it reads keyboard and mouse input, applies
//! adapter commands, advances the game clock in fixed frames and redraws
//! through the diffing framebuffer renderer.

use std::fs::OpenOptions;
use std::hash::Hasher;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event};

use tui_memory::adapter::{create_ack, Adapter, InboundPayload, ObservationFeed, OutboundMessage};
use tui_memory::core::snapshot::Fnv1aHasher;
use tui_memory::core::{GameSnapshot, GameState, Session};
use tui_memory::input::{
    handle_key_event, handle_mouse_event, should_quit, GridCursor, InputAction,
};
use tui_memory::store::FileStore;
use tui_memory::term::{
    AdapterStatusView, FrameBuffer, FrameGate, GameView, TerminalRenderer, Viewport,
};
use tui_memory::types::{GameAction, FRAME_MS};
use tui_memory::AppConfig;

/// Redraw at least this often even when nothing changed.
const IDLE_REDRAW_MS: u64 = 500;

fn main() -> Result<()> {
    let config = AppConfig::from_env();
    if let Some(path) = &config.log_path {
        init_logging(path)?;
    }
    log::info!(
        "starting: seed={} pairs={} records={}",
        config.seed,
        config.pair_count,
        config.records_path.display()
    );

    let store = FileStore::open(&config.records_path);
    let mut session = Session::new(GameState::new(config.seed, config.pair_count), store);
    session.start();

    let mut adapter = match Adapter::start_from_env() {
        Ok(adapter) => adapter,
        Err(e) => {
            log::warn!("adapter not started: {:#}", e);
            None
        }
    };

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, &mut session, adapter.as_mut());

    // Always try to restore terminal state.
    let _ = term.exit();
    if let Err(e) = &result {
        log::error!("exiting with error: {:#}", e);
    }
    result
}

fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .context("installing logger")?;
    Ok(())
}

fn run(
    term: &mut TerminalRenderer,
    session: &mut Session<FileStore>,
    mut adapter: Option<&mut Adapter>,
) -> Result<()> {
    let view = GameView::default();
    let mut snap = GameSnapshot::default();
    session.snapshot_into(&mut snap);

    let mut cursor = GridCursor::new(snap.cards.len());
    let mut fb = FrameBuffer::new(0, 0);
    let mut gate = FrameGate::new(IDLE_REDRAW_MS);

    let started = Instant::now();
    let frame = Duration::from_millis(FRAME_MS as u64);
    let mut last_frame = Instant::now();
    let mut feed = ObservationFeed::new();

    loop {
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let viewport = Viewport::new(w, h);

        // Input with timeout until the next frame.
        let timeout = frame.saturating_sub(last_frame.elapsed());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    if should_quit(key) {
                        return Ok(());
                    }
                    match handle_key_event(key) {
                        Some(InputAction::Move(dir)) => cursor.move_by(dir),
                        Some(InputAction::Select) => {
                            session.apply_action(GameAction::Select(cursor.index()));
                        }
                        Some(InputAction::Restart) => {
                            session.apply_action(GameAction::Restart);
                        }
                        None => {}
                    }
                }
                Event::Mouse(mouse) => {
                    if let Some((x, y)) = handle_mouse_event(mouse) {
                        if let Some(index) = view.hit_test(snap.cards.len(), viewport, x, y) {
                            cursor.set(index);
                            session.apply_action(GameAction::Select(index));
                        }
                    }
                }
                Event::Resize(_, _) => {
                    term.invalidate();
                    gate.invalidate();
                }
                _ => {}
            }
        }

        if let Some(adapter) = adapter.as_deref_mut() {
            while let Some(cmd) = adapter.try_recv() {
                match cmd.payload {
                    InboundPayload::Command(action) => {
                        let applied = session.apply_action(action);
                        if let (true, GameAction::Select(index)) = (applied, action) {
                            cursor.set(index);
                        }
                        adapter.send(OutboundMessage::ToClientAck {
                            client_id: cmd.client_id,
                            ack: create_ack(cmd.seq, applied),
                        });
                    }
                    InboundPayload::SnapshotRequest => {
                        session.snapshot_into(&mut snap);
                        adapter.send(feed.reply(cmd.client_id, &snap));
                    }
                }
            }
        }

        // Advance the clock by whole elapsed milliseconds, carrying the rest.
        let elapsed_ms = last_frame.elapsed().as_millis().min(u32::MAX as u128) as u32;
        if elapsed_ms >= FRAME_MS {
            last_frame += Duration::from_millis(elapsed_ms as u64);
            session.advance(elapsed_ms);
        }

        session.snapshot_into(&mut snap);
        cursor.resize(snap.cards.len());
        let state_fp = snap.fingerprint();
        let event = session.take_last_event();

        if let Some(adapter) = adapter.as_deref_mut() {
            if let Some(msg) = feed.broadcast(&snap, event) {
                adapter.send(msg);
            }
        }

        let adapter_view = adapter.as_deref().map(|a| AdapterStatusView {
            enabled: true,
            client_count: a.status().client_count().min(u16::MAX as usize) as u16,
            controller_id: a.status().controller_id(),
        });

        let mut hasher = Fnv1aHasher::new();
        hasher.write_u64(state_fp);
        hasher.write_usize(cursor.index());
        hasher.write_u16(w);
        hasher.write_u16(h);
        if let Some(status) = &adapter_view {
            hasher.write_u16(status.client_count);
            hasher.write_usize(status.controller_id.unwrap_or(0));
        }

        let now_ms = started.elapsed().as_millis() as u64;
        if gate.should_render(now_ms, hasher.finish()) {
            view.render_into_with_adapter(
                &snap,
                Some(cursor.index()),
                adapter_view.as_ref(),
                viewport,
                &mut fb,
            );
            term.draw_swap(&mut fb)?;
        }
    }
}
