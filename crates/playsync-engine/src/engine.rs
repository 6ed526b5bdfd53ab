//! Threaded playlist engine: owns a [`Playlist`] on a worker thread.

use std::sync::Arc;
use std::thread::{JoinHandle, ThreadId};

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use parking_lot::Mutex;
use playsync_core::{
    EngineEvent, EngineListener, Error, ItemMetadata, ListenerId, PlaylistEngine, PlaylistItem,
    RepeatMode, Result, SortKey, SortOrder,
};
use tracing::{debug, info, trace, warn};

use crate::config::EngineConfig;
use crate::playlist::Playlist;

/// Commands processed by the engine worker, in submission order.
enum PlaylistCommand {
    Insert {
        index: Option<usize>,
        items: Vec<PlaylistItem>,
    },
    Remove {
        index: usize,
        count: usize,
    },
    Move {
        index: usize,
        count: usize,
        target: usize,
    },
    Clear,
    GoTo(Option<usize>),
    Next,
    Prev,
    SetRepeatMode(RepeatMode),
    SetRandom(bool),
    SetPlayAndExit(bool),
    Sort(SortKey, SortOrder),
    UpdateItem {
        index: usize,
        metadata: ItemMetadata,
    },
    AddListener {
        listener: Arc<dyn EngineListener>,
        notify_current_state: bool,
        reply: Sender<Result<ListenerId>>,
    },
    RemoveListener {
        id: ListenerId,
        reply: Sender<()>,
    },
    /// Replies once every earlier command has been processed.
    Flush(Sender<()>),
    Shutdown,
}

/// Registered listeners, shared between the worker and callers that run on
/// the worker thread itself (callbacks that unregister).
struct ListenerTable {
    next_id: u64,
    max_listeners: usize,
    entries: Vec<(ListenerId, Arc<dyn EngineListener>)>,
}

impl ListenerTable {
    const fn new(max_listeners: usize) -> Self {
        Self {
            next_id: 1,
            max_listeners,
            entries: Vec::new(),
        }
    }

    fn insert(&mut self, listener: Arc<dyn EngineListener>) -> Result<ListenerId> {
        if self.entries.len() >= self.max_listeners {
            return Err(Error::Registration(format!(
                "listener limit of {} reached",
                self.max_listeners
            )));
        }
        let id = ListenerId::new(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        Ok(id)
    }

    fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        before != self.entries.len()
    }

    fn contains(&self, id: ListenerId) -> bool {
        self.entries.iter().any(|(entry_id, _)| *entry_id == id)
    }
}

type SharedListeners = Arc<Mutex<ListenerTable>>;

/// Playlist engine running on its own thread.
///
/// Mutations are queued and never block the caller. Listeners are invoked on
/// the engine thread. [`PlaylistEngine::remove_listener`] synchronizes with
/// the worker so that no callback for the removed listener runs afterwards.
pub struct ThreadedEngine {
    command_tx: Sender<PlaylistCommand>,
    listeners: SharedListeners,
    worker_thread: ThreadId,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ThreadedEngine {
    /// Create a new engine with an empty playlist.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let (command_tx, command_rx) = unbounded();
        let listeners = Arc::new(Mutex::new(ListenerTable::new(config.max_listeners)));

        let worker_listeners = listeners.clone();
        let handle = std::thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || EngineWorker::new(command_rx, worker_listeners).run())
            .map_err(|e| {
                Error::EngineUnavailable(format!("Failed to spawn engine thread: {e}"))
            })?;

        info!("Playlist engine started on thread {:?}", config.thread_name);

        Ok(Self {
            command_tx,
            listeners,
            worker_thread: handle.thread().id(),
            worker: Mutex::new(Some(handle)),
        })
    }

    fn send_command(&self, command: PlaylistCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .map_err(|_| Error::EngineUnavailable("engine thread has stopped".to_string()))
    }

    fn on_worker_thread(&self) -> bool {
        std::thread::current().id() == self.worker_thread
    }

    /// Append items at the end of the playlist.
    pub fn append(&self, items: Vec<PlaylistItem>) -> Result<()> {
        self.send_command(PlaylistCommand::Insert { index: None, items })
    }

    /// Insert items at `index`.
    pub fn insert(&self, index: usize, items: Vec<PlaylistItem>) -> Result<()> {
        self.send_command(PlaylistCommand::Insert {
            index: Some(index),
            items,
        })
    }

    /// Remove `count` items starting at `index`.
    pub fn remove(&self, index: usize, count: usize) -> Result<()> {
        self.send_command(PlaylistCommand::Remove { index, count })
    }

    /// Move `count` items starting at `index` to start at `target`.
    pub fn move_items(&self, index: usize, count: usize, target: usize) -> Result<()> {
        self.send_command(PlaylistCommand::Move {
            index,
            count,
            target,
        })
    }

    pub fn clear(&self) -> Result<()> {
        self.send_command(PlaylistCommand::Clear)
    }

    pub fn go_to(&self, index: Option<usize>) -> Result<()> {
        self.send_command(PlaylistCommand::GoTo(index))
    }

    pub fn next(&self) -> Result<()> {
        self.send_command(PlaylistCommand::Next)
    }

    pub fn prev(&self) -> Result<()> {
        self.send_command(PlaylistCommand::Prev)
    }

    pub fn set_repeat_mode(&self, mode: RepeatMode) -> Result<()> {
        self.send_command(PlaylistCommand::SetRepeatMode(mode))
    }

    pub fn set_random(&self, random: bool) -> Result<()> {
        self.send_command(PlaylistCommand::SetRandom(random))
    }

    pub fn set_play_and_exit(&self, play_and_exit: bool) -> Result<()> {
        self.send_command(PlaylistCommand::SetPlayAndExit(play_and_exit))
    }

    pub fn sort(&self, key: SortKey, order: SortOrder) -> Result<()> {
        self.send_command(PlaylistCommand::Sort(key, order))
    }

    /// Refresh the metadata of the item at `index`.
    pub fn update_item(&self, index: usize, metadata: ItemMetadata) -> Result<()> {
        self.send_command(PlaylistCommand::UpdateItem { index, metadata })
    }

    /// Block until every command sent so far has been processed.
    pub fn flush(&self) -> Result<()> {
        if self.on_worker_thread() {
            return Ok(());
        }
        let (reply_tx, reply_rx) = bounded(1);
        self.send_command(PlaylistCommand::Flush(reply_tx))?;
        reply_rx
            .recv()
            .map_err(|_| Error::EngineUnavailable("engine stopped during flush".to_string()))
    }

    /// Stop the worker thread and wait for it to exit.
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(PlaylistCommand::Shutdown);
        if self.on_worker_thread() {
            return;
        }
        if let Some(handle) = self.worker.lock().take() {
            if handle.join().is_err() {
                warn!("Playlist engine thread panicked");
            }
        }
    }
}

impl PlaylistEngine for ThreadedEngine {
    fn add_listener(
        &self,
        listener: Arc<dyn EngineListener>,
        notify_current_state: bool,
    ) -> Result<ListenerId> {
        if self.on_worker_thread() {
            // A callback registering another listener; no replay is possible
            // without re-entering the playlist, so none is attempted.
            if notify_current_state {
                warn!("Listener registered from the engine thread; current state is not replayed");
            }
            return self.listeners.lock().insert(listener);
        }

        let (reply_tx, reply_rx) = bounded(1);
        self.send_command(PlaylistCommand::AddListener {
            listener,
            notify_current_state,
            reply: reply_tx,
        })?;
        reply_rx.recv().map_err(|_| {
            Error::EngineUnavailable("engine stopped during registration".to_string())
        })?
    }

    fn remove_listener(&self, id: ListenerId) {
        if self.on_worker_thread() {
            // Called from a callback: the worker re-checks membership before
            // every delivery, so removing the entry is enough.
            if self.listeners.lock().remove(id) {
                debug!("Removed {id} from the engine thread");
            }
            return;
        }

        let (reply_tx, reply_rx) = bounded(1);
        if self
            .send_command(PlaylistCommand::RemoveListener { id, reply: reply_tx })
            .is_err()
        {
            // No worker, so no callback can be running.
            self.listeners.lock().remove(id);
            return;
        }
        let _ = reply_rx.recv();
    }
}

impl Drop for ThreadedEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Internal worker that owns the playlist.
struct EngineWorker {
    command_rx: Receiver<PlaylistCommand>,
    listeners: SharedListeners,
    playlist: Playlist,
}

impl EngineWorker {
    fn new(command_rx: Receiver<PlaylistCommand>, listeners: SharedListeners) -> Self {
        Self {
            command_rx,
            listeners,
            playlist: Playlist::new(),
        }
    }

    fn run(mut self) {
        info!("Playlist engine worker started");

        while let Ok(command) = self.command_rx.recv() {
            if matches!(command, PlaylistCommand::Shutdown) {
                info!("Playlist engine shutting down");
                break;
            }
            self.handle_command(command);
        }

        self.listeners.lock().entries.clear();
        debug!("Playlist engine worker exited");
    }

    fn handle_command(&mut self, command: PlaylistCommand) {
        let events = match command {
            PlaylistCommand::Insert { index, items } => match index {
                Some(index) => self.playlist.insert(index, items),
                None => self.playlist.append(items),
            },
            PlaylistCommand::Remove { index, count } => self.playlist.remove(index, count),
            PlaylistCommand::Move {
                index,
                count,
                target,
            } => self.playlist.move_items(index, count, target),
            PlaylistCommand::Clear => self.playlist.clear(),
            PlaylistCommand::GoTo(index) => self.playlist.go_to(index),
            PlaylistCommand::Next => self.playlist.next(),
            PlaylistCommand::Prev => self.playlist.prev(),
            PlaylistCommand::SetRepeatMode(mode) => self.playlist.set_repeat_mode(mode),
            PlaylistCommand::SetRandom(random) => self.playlist.set_random(random),
            PlaylistCommand::SetPlayAndExit(value) => self.playlist.set_play_and_exit(value),
            PlaylistCommand::Sort(key, order) => self.playlist.sort(key, order),
            PlaylistCommand::UpdateItem { index, metadata } => {
                self.playlist.update_item(index, metadata)
            }
            PlaylistCommand::AddListener {
                listener,
                notify_current_state,
                reply,
            } => {
                self.add_listener(listener, notify_current_state, &reply);
                return;
            }
            PlaylistCommand::RemoveListener { id, reply } => {
                if self.listeners.lock().remove(id) {
                    debug!("Removed {id}");
                } else {
                    trace!("{id} was not registered");
                }
                let _ = reply.send(());
                return;
            }
            PlaylistCommand::Flush(reply) => {
                let _ = reply.send(());
                return;
            }
            PlaylistCommand::Shutdown => return,
        };

        self.emit(events);
    }

    fn add_listener(
        &self,
        listener: Arc<dyn EngineListener>,
        notify_current_state: bool,
        reply: &Sender<Result<ListenerId>>,
    ) {
        let result = self.listeners.lock().insert(listener.clone());
        match &result {
            Ok(id) => {
                debug!("Registered {id}");
                if notify_current_state {
                    for event in self.playlist.state_events() {
                        listener.on_event(event);
                    }
                }
            }
            Err(e) => warn!("Listener registration refused: {e}"),
        }
        let _ = reply.send(result);
    }

    fn emit(&self, events: Vec<EngineEvent>) {
        if events.is_empty() {
            return;
        }
        let targets: Vec<(ListenerId, Arc<dyn EngineListener>)> =
            self.listeners.lock().entries.clone();

        for event in events {
            trace!("Emitting {} to {} listeners", event.kind(), targets.len());
            for (id, listener) in &targets {
                // A callback may have unregistered this listener.
                if self.listeners.lock().contains(*id) {
                    listener.on_event(event.clone());
                }
            }
        }
    }
}
