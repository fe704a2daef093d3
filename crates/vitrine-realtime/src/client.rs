//! The realtime client.
//!
//! One [`RealtimeClient`] owns one logical connection to the update server.
//! It is a constructible service: build it with a [`RealtimeConfig`], clone
//! the handle freely, and inject it wherever the storefront or admin code
//! needs updates. There is deliberately no process-wide instance.
//!
//! Lifecycle: [`connect`](RealtimeClient::connect) spawns a background run
//! loop that negotiates a transport (WebSocket, then long-poll), re-binds the
//! identity, and pumps frames until the connection drops — at which point it
//! reconnects with exponential backoff. [`disconnect`](RealtimeClient::disconnect)
//! tears the current loop down; a later `connect` starts a fresh one, and the
//! stored identity is bound again on that connection like any other.
//!
//! Server-side room membership does not survive a reconnect, and the client
//! does not replay joins on its own. Consumers that join rooms should watch
//! [`watch_connected`](RealtimeClient::watch_connected) and re-issue their
//! joins whenever it flips back to `true`.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use vitrine_core::{Frame, Identity};

use crate::config::RealtimeConfig;
use crate::dispatch::Dispatcher;
use crate::registry::{Callback, Registry, Subscription};
use crate::transport::polling::LongPollTransport;
use crate::transport::websocket::WebSocketTransport;
use crate::transport::{Transport, TransportError};

struct Inner {
    config: RealtimeConfig,
    registry: Arc<Registry>,
    dispatcher: Dispatcher,
    identity: Mutex<Option<Identity>>,
    outbound: Mutex<Option<mpsc::UnboundedSender<Frame>>>,
    connected_tx: watch::Sender<bool>,
    /// Cancellation token of the current run loop. A cancelled (or absent)
    /// token means no loop is live and `connect` may start one.
    run: Mutex<Option<CancellationToken>>,
}

/// Client for the Vitrine realtime update service.
///
/// Cheap to clone; all clones share the same connection, registry, and
/// identity.
#[derive(Clone)]
pub struct RealtimeClient {
    inner: Arc<Inner>,
}

impl RealtimeClient {
    /// Create a client. No connection is made until [`connect`](Self::connect).
    pub fn new(config: RealtimeConfig) -> Self {
        let registry = Arc::new(Registry::new());
        let dispatcher = Dispatcher::new(Arc::clone(&registry));
        let (connected_tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                config,
                registry,
                dispatcher,
                identity: Mutex::new(None),
                outbound: Mutex::new(None),
                connected_tx,
                run: Mutex::new(None),
            }),
        }
    }

    /// Start the background connection loop.
    ///
    /// Idempotent: a no-op while a loop is already live. After
    /// [`disconnect`](Self::disconnect) (or after the reconnect budget was
    /// exhausted) it starts a fresh loop. Never panics or returns an error;
    /// outside a tokio runtime it logs and does nothing.
    pub fn connect(&self) {
        let token = {
            let mut run = self.inner.run.lock();
            if run.as_ref().is_some_and(|t| !t.is_cancelled()) {
                return;
            }
            let token = CancellationToken::new();
            *run = Some(token.clone());
            token
        };

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("connect called outside a tokio runtime, ignoring");
            token.cancel();
            return;
        };
        let inner = Arc::clone(&self.inner);
        let _ = handle.spawn(run_loop(inner, token));
    }

    /// Tear down the current connection and stop reconnecting.
    ///
    /// Safe to call when already disconnected. A later
    /// [`connect`](Self::connect) starts over with a fresh outage budget.
    pub fn disconnect(&self) {
        if let Some(token) = self.inner.run.lock().as_ref() {
            token.cancel();
        }
        *self.inner.outbound.lock() = None;
        let _ = self.inner.connected_tx.send_replace(false);
    }

    /// Whether a transport is currently established.
    pub fn is_connected(&self) -> bool {
        *self.inner.connected_tx.borrow()
    }

    /// Watch connection state transitions.
    ///
    /// Flips to `true` on every successful (re)connect — the hook for
    /// consumers to re-issue room joins.
    pub fn watch_connected(&self) -> watch::Receiver<bool> {
        self.inner.connected_tx.subscribe()
    }

    /// Register `callback` for every update on `topic`.
    pub fn subscribe<F>(&self, topic: &str, callback: F) -> Subscription
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.inner.registry.subscribe(topic, Arc::new(callback))
    }

    /// Register `callback` for updates on `topic` whose payload passes
    /// `matcher`.
    ///
    /// Filtering happens before the callback, so a chat screen subscribed via
    /// [`scope::session_scope`](crate::scope::session_scope) never sees
    /// another session's traffic.
    pub fn subscribe_scoped<M, F>(&self, topic: &str, matcher: M, callback: F) -> Subscription
    where
        M: Fn(&Value) -> bool + Send + Sync + 'static,
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let filtered: Callback = Arc::new(move |payload: &Value| {
            if matcher(payload) {
                callback(payload);
            }
        });
        self.inner.registry.subscribe(topic, filtered)
    }

    /// Send a frame to the server, fire-and-forget.
    ///
    /// While disconnected the frame is dropped with a debug log; emit never
    /// errors and never blocks.
    pub fn emit(&self, event: impl Into<String>, data: Value) {
        let frame = Frame::new(event, data);
        let guard = self.inner.outbound.lock();
        match guard.as_ref() {
            Some(tx) => {
                if tx.send(frame).is_err() {
                    debug!("outbound channel closed, dropping frame");
                }
            }
            None => debug!("not connected, dropping outbound frame"),
        }
    }

    /// Bind (or replace) the connection identity.
    ///
    /// Sent to the server immediately when connected, and re-sent after every
    /// reconnect — the server keeps no memory of previous connections.
    pub fn set_identity(&self, identity: Identity) {
        let frame = identity.bind_frame();
        *self.inner.identity.lock() = Some(identity);
        let guard = self.inner.outbound.lock();
        if let Some(tx) = guard.as_ref() {
            let _ = tx.send(frame);
        }
    }
}

async fn run_loop(inner: Arc<Inner>, cancel: CancellationToken) {
    let mut failures: u32 = 0;
    loop {
        if cancel.is_cancelled() {
            break;
        }

        let transport = tokio::select! {
            () = cancel.cancelled() => break,
            result = negotiate(&inner.config) => match result {
                Ok(transport) => transport,
                Err(err) => {
                    failures += 1;
                    if failures >= inner.config.reconnect.max_attempts {
                        error!(%err, attempts = failures, "giving up after repeated connection failures");
                        // Mark this run dead so a later connect() can start over.
                        cancel.cancel();
                        break;
                    }
                    let delay = inner.config.reconnect.delay_for_attempt(failures - 1);
                    warn!(%err, attempt = failures, ?delay, "connection failed, retrying");
                    tokio::select! {
                        () = cancel.cancelled() => break,
                        () = tokio::time::sleep(delay) => {}
                    }
                    continue;
                }
            },
        };

        failures = 0;
        let (tx, rx) = mpsc::unbounded_channel::<Frame>();
        serve_connection(&inner, &cancel, transport, tx.clone(), rx).await;
        release_connection(&inner, &tx);

        if cancel.is_cancelled() {
            break;
        }
        info!("connection lost, reconnecting");
    }
}

/// Clear the connected state, but only if it still belongs to this run.
///
/// A `disconnect()` followed by an immediate `connect()` can start a new run
/// while the old one is still winding down; the old run must not clobber the
/// new run's outbound sender or connected flag.
fn release_connection(inner: &Inner, tx: &mpsc::UnboundedSender<Frame>) {
    let mut guard = inner.outbound.lock();
    if guard.as_ref().is_some_and(|current| current.same_channel(tx)) {
        *guard = None;
        drop(guard);
        let _ = inner.connected_tx.send_replace(false);
    }
}

/// Establish a transport: WebSocket when preferred and reachable, long-poll
/// otherwise.
async fn negotiate(config: &RealtimeConfig) -> Result<Box<dyn Transport>, TransportError> {
    if config.prefer_websocket {
        match WebSocketTransport::connect(&config.url).await {
            Ok(transport) => return Ok(Box::new(transport)),
            Err(err) => warn!(%err, "websocket connect failed, trying long-poll"),
        }
    }
    let transport = LongPollTransport::connect(&config.poll_url).await?;
    Ok(Box::new(transport))
}

/// Pump one established connection until it drops or the run is cancelled.
async fn serve_connection(
    inner: &Arc<Inner>,
    cancel: &CancellationToken,
    mut transport: Box<dyn Transport>,
    tx: mpsc::UnboundedSender<Frame>,
    mut rx: mpsc::UnboundedReceiver<Frame>,
) {
    info!(kind = ?transport.kind(), "connected");

    // Re-bind identity before anything else so the server can route
    // user-addressed updates from the first frame on.
    let identity = inner.identity.lock().clone();
    if let Some(identity) = identity {
        if let Err(err) = transport.send(&identity.bind_frame()).await {
            warn!(%err, "failed to send identity bind, dropping connection");
            transport.close().await;
            return;
        }
    }

    *inner.outbound.lock() = Some(tx);
    let _ = inner.connected_tx.send_replace(true);

    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                transport.close().await;
                return;
            }
            outbound = rx.recv() => {
                let Some(frame) = outbound else { return };
                if let Err(err) = transport.send(&frame).await {
                    warn!(%err, "send failed, dropping connection");
                    return;
                }
            }
            inbound = transport.recv() => {
                match inbound {
                    Ok(Some(frame)) => inner.dispatcher.handle_frame(&frame),
                    Ok(None) => {
                        info!("server closed the connection");
                        return;
                    }
                    Err(err) => {
                        warn!(%err, "receive failed, dropping connection");
                        return;
                    }
                }
            }
        }
    }
}
