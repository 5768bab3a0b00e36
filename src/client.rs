//! Event loop tying the session, the renderer and the transport together.

use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::mpsc;

use crate::{
    airplane::{Airplane, Orientation},
    cli::Command,
    common::{Coord, PlacementError, ShotError},
    config::{ClientConfig, GRID_SIZE},
    game::GameSession,
    protocol::{decode, ServerMessage},
    renderer::{BoardSide, CellView, Renderer},
    transport::{Connector, TransportClient, TransportEvent},
};

/// Owns one match worth of state plus its connection.
///
/// Every transport event and user command is handled to completion before the
/// next one is looked at.
pub struct GameClient<R: Renderer> {
    session: GameSession,
    renderer: R,
    connector: Arc<dyn Connector>,
    config: ClientConfig,
    transport: Option<TransportClient>,
    events: Option<mpsc::Receiver<TransportEvent>>,
    status: String,
}

impl<R: Renderer> GameClient<R> {
    /// Draw the empty boards and open the connection.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        session: GameSession,
        config: ClientConfig,
        connector: Arc<dyn Connector>,
        renderer: R,
    ) -> Self {
        let mut client = Self {
            session,
            renderer,
            connector,
            config,
            transport: None,
            events: None,
            status: String::new(),
        };
        client.redraw();
        client.connect();
        client.show_welcome();
        client
    }

    fn connect(&mut self) {
        let (transport, events) = TransportClient::start(Arc::clone(&self.connector), &self.config);
        self.transport = Some(transport);
        self.events = Some(events);
    }

    fn show_welcome(&mut self) {
        let text = format!(
            "Welcome, {}! Waiting for opponent...",
            self.session.player().name()
        );
        self.set_status(text);
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn is_connected(&self) -> bool {
        self.transport
            .as_ref()
            .is_some_and(TransportClient::is_connected)
    }

    fn set_status(&mut self, text: String) {
        if text != self.status {
            self.renderer.on_status_changed(&text);
            self.status = text;
        }
    }

    fn redraw(&mut self) {
        for row in 0..GRID_SIZE {
            for col in 0..GRID_SIZE {
                let at = Coord::new(row, col);
                self.renderer
                    .on_cell_state_changed(BoardSide::Own, at, self.session.own_view(at));
                self.renderer
                    .on_cell_state_changed(BoardSide::Target, at, self.session.target_view(at));
            }
        }
        self.renderer.on_score_changed(
            self.session.heads_hit(),
            self.session.opponent_heads_hit(),
        );
    }

    fn redraw_target(&mut self) {
        for row in 0..GRID_SIZE {
            for col in 0..GRID_SIZE {
                let at = Coord::new(row, col);
                self.renderer
                    .on_cell_state_changed(BoardSide::Target, at, self.session.target_view(at));
            }
        }
    }

    /// Push the full local state to the server.
    fn push_state(&self) {
        let Some(transport) = &self.transport else {
            return;
        };
        match self.session.outbound().to_json() {
            Ok(json) => transport.send(json),
            Err(e) => warn!("could not encode state: {}", e),
        }
    }

    pub fn handle_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Connected => {
                self.set_status("Connected! Waiting for opponent...".to_string())
            }
            TransportEvent::Disconnected => self.set_status("Disconnected from server".to_string()),
            TransportEvent::Error(e) => warn!("transport error: {}", e),
            TransportEvent::Message(text) => self.handle_message(&text),
        }
    }

    /// Handle transport events until a connection is open. Returns `false` if
    /// the connection is torn down first.
    pub async fn wait_connected(&mut self) -> bool {
        while !self.is_connected() {
            if !self.handle_next_event().await {
                return false;
            }
        }
        true
    }

    /// Wait for one transport event and handle it. Returns `false` once the
    /// connection has been torn down and no more events will come.
    pub async fn handle_next_event(&mut self) -> bool {
        let Some(events) = self.events.as_mut() else {
            return false;
        };
        match events.recv().await {
            Some(event) => {
                self.handle_event(event);
                true
            }
            None => {
                self.events = None;
                false
            }
        }
    }

    fn handle_message(&mut self, text: &str) {
        let Some(msg) = decode(text) else {
            return;
        };
        let update = match msg {
            ServerMessage::Init { player_id, game_id } => {
                info!(
                    "joined game {} as player {}",
                    game_id.as_deref().unwrap_or("?"),
                    player_id.as_deref().unwrap_or("?")
                );
                self.set_status("Waiting for opponent...".to_string());
                return;
            }
            ServerMessage::Update(update) | ServerMessage::OpponentUpdate(update) => update,
        };

        let fx = self.session.apply_update(&update);
        if fx.ignored {
            return;
        }
        for (at, marker) in &fx.new_opponent_shots {
            self.renderer
                .on_cell_state_changed(BoardSide::Own, *at, CellView::Shot(*marker));
        }
        self.redraw_target();
        self.renderer.on_score_changed(
            self.session.heads_hit(),
            self.session.opponent_heads_hit(),
        );
        self.set_status(self.session.status_text());
        if let Some(outcome) = fx.outcome {
            self.renderer
                .on_match_ended(outcome.did_win(), self.session.stats());
        }
    }

    /// Show (or clear, with `None`) the candidate airplane at `anchor`.
    pub fn preview(&mut self, anchor: Option<Coord>) {
        let preview = anchor.and_then(|a| self.session.preview(a));
        self.renderer.on_preview(preview.as_ref());
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.session.set_orientation(orientation);
        debug!("orientation set to {}", orientation);
    }

    pub fn place(&mut self, anchor: Coord) -> Result<Airplane, PlacementError> {
        let placed = self.session.place_airplane(anchor);
        self.after_placement(placed)
    }

    /// Place the next airplane at a random legal spot.
    pub fn auto_place(&mut self) -> Result<Airplane, PlacementError> {
        let placed = self.session.auto_place();
        self.after_placement(placed)
    }

    fn after_placement(
        &mut self,
        placed: Result<Airplane, PlacementError>,
    ) -> Result<Airplane, PlacementError> {
        self.renderer.on_preview(None);
        let plane = match placed {
            Ok(plane) => plane,
            Err(e) => {
                debug!("placement rejected: {}", e);
                return Err(e);
            }
        };
        for at in plane.in_bounds_cells() {
            self.renderer
                .on_cell_state_changed(BoardSide::Own, at, self.session.own_view(at));
        }
        self.set_status(self.session.status_text());
        self.push_state();
        Ok(plane)
    }

    pub fn fire(&mut self, target: Coord) -> Result<(), ShotError> {
        if let Err(e) = self.session.fire(target) {
            debug!("shot at {} rejected: {}", target, e);
            return Err(e);
        }
        self.renderer
            .on_cell_state_changed(BoardSide::Target, target, self.session.target_view(target));
        self.push_state();
        self.set_status(self.session.status_text());
        Ok(())
    }

    pub fn toggle_flag(&mut self, target: Coord) -> Result<bool, ShotError> {
        let flagged = self.session.toggle_flag(target).map_err(|e| {
            debug!("flag at {} rejected: {}", target, e);
            e
        })?;
        self.renderer
            .on_cell_state_changed(BoardSide::Target, target, self.session.target_view(target));
        Ok(flagged)
    }

    /// Drop the connection for good. Pending events are discarded.
    pub async fn teardown(&mut self) {
        self.events = None;
        if let Some(mut transport) = self.transport.take() {
            transport.disconnect().await;
        }
    }

    /// Start a fresh match on a fresh connection.
    pub async fn restart(&mut self) {
        self.teardown().await;
        self.session.reset();
        self.status.clear();
        self.renderer.on_preview(None);
        self.redraw();
        self.connect();
        self.show_welcome();
    }

    /// Apply one user command. Returns `false` on [`Command::Quit`].
    pub async fn execute(&mut self, command: Command) -> bool {
        match command {
            Command::Place(at) => {
                let _ = self.place(at);
            }
            Command::Preview(at) => self.preview(at),
            Command::Rotate(o) => self.set_orientation(o),
            Command::Fire(at) => {
                let _ = self.fire(at);
            }
            Command::Flag(at) => {
                let _ = self.toggle_flag(at);
            }
            Command::AutoPlace => {
                let _ = self.auto_place();
            }
            Command::Restart => self.restart().await,
            Command::Quit => return false,
        }
        true
    }

    /// Process transport events and user commands in arrival order until the
    /// user quits or the command stream ends. Tears down on the way out.
    pub async fn run(&mut self, mut commands: mpsc::Receiver<Command>) -> anyhow::Result<()> {
        loop {
            let Some(events) = self.events.as_mut() else {
                break;
            };
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => {
                        debug!("event stream closed");
                        self.events = None;
                    }
                },
                command = commands.recv() => match command {
                    Some(command) => {
                        if !self.execute(command).await {
                            break;
                        }
                    }
                    None => break,
                },
            }
        }
        self.teardown().await;
        Ok(())
    }
}
