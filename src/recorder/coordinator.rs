//! Session coordinator
//!
//! Owns the transport connection and the recording state, and forwards each
//! observer's record to the collector as soon as it is published:
//!
//! ```text
//! host DOM ──► EventDispatcher ──► observers ──► mailboxes ──► coordinator ──► transport
//!                                                                  ▲
//!                                       directives ◄───────────────┘
//! ```
//!
//! Records are forwarded only while connected and after a directive has been
//! applied on the current connection. Records captured before that stay
//! pending in their mailbox (overwritten by newer captures) and are drained
//! when the directive arrives.

use crate::capture::{
    CaptureContext, CapturedEvent, Category, ClickObserver, ClickRecord, FormObserver, FormRecord,
    MoveObserver, MoveRecord, PageChangeWatcher, PagePoller, PageRecord, RecordingGate,
    ScrollObserver, ScrollRecord,
};
use crate::config::CollectorConfig;
use crate::dispatch::{EventDispatcher, Mailbox, Subscription};
use crate::dom::{ElementRef, PageEnvironment};
use crate::recorder::channel::{
    EventEnvelope, OutboundMessage, PageEnvelope, Transport, TransportError, TransportEvent,
    TransportResult,
};
use crate::recorder::state::{RecordingDirective, SessionSnapshot, SessionState};
use parking_lot::RwLock;
use std::sync::{Arc, Weak};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

/// State reachable from mailbox and page listeners
struct Shared {
    transport: Arc<dyn Transport>,
    gate: Arc<RecordingGate>,
    page: Arc<PageChangeWatcher>,
    session: RwLock<SessionState>,
    mailboxes: Mailboxes,
}

struct Mailboxes {
    click: Mailbox<ClickRecord>,
    movement: Mailbox<MoveRecord>,
    scroll: Mailbox<ScrollRecord>,
    form: Mailbox<FormRecord>,
}

impl Shared {
    fn emit(&self, message: &OutboundMessage) {
        if let Err(e) = self.transport.emit(message) {
            warn!("Failed to emit {} message: {}", message.name(), e);
        }
    }

    /// Send the pending record of `mailbox`, clearing it.
    fn forward<R>(&self, mailbox: &Mailbox<R>)
    where
        R: Clone + Send + Into<CapturedEvent> + 'static,
    {
        let recordings_id = {
            let session = self.session.read();
            if !session.can_forward() {
                trace!("Not forwarding: session is {}", session.connection_state());
                return;
            }
            session.recordings_id
        };
        let Some(record) = mailbox.take() else {
            return;
        };

        let page = self.page.current();
        self.emit(&OutboundMessage::Event(EventEnvelope {
            event: record.into(),
            recordings_id,
            url: page.url,
            title: page.title,
        }));
    }

    fn announce_page(&self, page: &PageRecord) {
        let recordings_id = {
            let mut session = self.session.write();
            if !session.can_forward() {
                return;
            }
            session.announced_url = Some(page.url.clone());
            session.recordings_id
        };
        self.emit(&OutboundMessage::PageChange(PageEnvelope {
            events: page.clone(),
            recordings_id,
        }));
    }

    fn request_directive(&self) {
        let user_id = self.session.read().user_id.clone();
        debug!("Requesting recording directive for user {:?}", user_id);
        self.emit(&OutboundMessage::GetData { user_id });
    }

    fn apply_directive(&self, directive: RecordingDirective) {
        let categories = directive.categories();
        self.gate.replace(categories.iter().copied());

        let drain = {
            let mut session = self.session.write();
            session.recordings_id = directive.id;
            if session.connected {
                session.synced = true;
            }
            session.can_forward()
        };
        info!(
            "Recording directive applied (enabled={:?}, id={:?})",
            categories, directive.id
        );

        if drain {
            self.drain();
        }
    }

    /// Flush what accumulated while forwarding was blocked.
    fn drain(&self) {
        self.drain_category(Category::Clicks, &self.mailboxes.click);
        self.drain_category(Category::Movements, &self.mailboxes.movement);
        self.drain_category(Category::Scrolls, &self.mailboxes.scroll);
        self.drain_category(Category::Forms, &self.mailboxes.form);

        let page = self.page.current();
        let announced = self.session.read().announced_url.as_deref() == Some(page.url.as_str());
        if !announced {
            self.announce_page(&page);
        }
    }

    fn drain_category<R>(&self, category: Category, mailbox: &Mailbox<R>)
    where
        R: Clone + Send + Into<CapturedEvent> + 'static,
    {
        if !mailbox.is_pending() {
            return;
        }
        if self.gate.allows(category) {
            self.forward(mailbox);
        } else {
            trace!("Discarding pending {} record", category);
            mailbox.clear();
        }
    }
}

fn forwarder<R>(shared: &Weak<Shared>) -> impl Fn(&Mailbox<R>) + Send + Sync + 'static
where
    R: Clone + Send + Into<CapturedEvent> + 'static,
{
    let shared = shared.clone();
    move |mailbox| {
        if let Some(shared) = shared.upgrade() {
            shared.forward(mailbox);
        }
    }
}

/// Host requests applied by [`SessionCoordinator::run`]
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    SetUserId(String),
    SetAuthKey(String),
}

/// Cloneable control surface for a coordinator whose event loop is running.
///
/// Commands are queued and applied in order between transport events.
#[derive(Clone)]
pub struct CoordinatorHandle {
    commands: mpsc::UnboundedSender<Command>,
    shutdown: CancellationToken,
}

impl CoordinatorHandle {
    /// Follow a host user change. Returns false once the coordinator is gone.
    pub fn set_user_id(&self, user_id: &str) -> bool {
        self.commands
            .send(Command::SetUserId(user_id.to_string()))
            .is_ok()
    }

    /// Swap the credential, reconnecting if a connection is up.
    pub fn set_auth_key(&self, auth_key: &str) -> bool {
        self.commands
            .send(Command::SetAuthKey(auth_key.to_string()))
            .is_ok()
    }

    /// Stop the event loop.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

pub struct SessionCoordinator {
    config: CollectorConfig,
    shared: Arc<Shared>,
    dispatcher: Arc<EventDispatcher>,
    click: ClickObserver,
    movement: MoveObserver,
    scroll: ScrollObserver,
    form: FormObserver,
    forwarding: Vec<Subscription>,
    poller: Option<PagePoller>,
    events_tx: mpsc::UnboundedSender<TransportEvent>,
    events_rx: mpsc::UnboundedReceiver<TransportEvent>,
    commands_tx: mpsc::UnboundedSender<Command>,
    commands_rx: mpsc::UnboundedReceiver<Command>,
    shutdown: CancellationToken,
}

impl SessionCoordinator {
    /// Instrument a container: attach every observer to a fresh dispatcher
    /// and wire their mailboxes to the transport.
    pub fn mount(
        config: CollectorConfig,
        transport: Arc<dyn Transport>,
        environment: Arc<dyn PageEnvironment>,
        container: Option<ElementRef>,
    ) -> Self {
        let gate = Arc::new(RecordingGate::new());
        let dispatcher = Arc::new(EventDispatcher::new());
        let context = CaptureContext::new(gate.clone(), environment.clone(), container);

        let click = ClickObserver::attach(&dispatcher, context.clone());
        let movement = MoveObserver::attach(&dispatcher, context.clone());
        let scroll = ScrollObserver::attach(&dispatcher, context.clone());
        let form = FormObserver::attach(&dispatcher, context);
        let page = PageChangeWatcher::new(environment, gate.clone());

        let shared = Arc::new(Shared {
            transport,
            gate,
            page: page.clone(),
            session: RwLock::new(SessionState::new(&config.user_id)),
            mailboxes: Mailboxes {
                click: click.mailbox().clone(),
                movement: movement.mailbox().clone(),
                scroll: scroll.mailbox().clone(),
                form: form.mailbox().clone(),
            },
        });

        let weak = Arc::downgrade(&shared);
        let page_listener = {
            let weak = weak.clone();
            page.subscribe(move |record| {
                if let Some(shared) = weak.upgrade() {
                    shared.announce_page(record);
                }
            })
        };
        let forwarding = vec![
            click.mailbox().subscribe(forwarder::<ClickRecord>(&weak)),
            movement.mailbox().subscribe(forwarder::<MoveRecord>(&weak)),
            scroll.mailbox().subscribe(forwarder::<ScrollRecord>(&weak)),
            form.mailbox().subscribe(forwarder::<FormRecord>(&weak)),
            page_listener,
        ];

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        info!("Instrumentation mounted for user {:?}", config.user_id);

        Self {
            config,
            shared,
            dispatcher,
            click,
            movement,
            scroll,
            form,
            forwarding,
            poller: None,
            events_tx,
            events_rx,
            commands_tx,
            commands_rx,
            shutdown: CancellationToken::new(),
        }
    }

    /// The dispatcher the host feeds native events into.
    pub fn dispatcher(&self) -> Arc<EventDispatcher> {
        self.dispatcher.clone()
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    pub fn page_watcher(&self) -> &Arc<PageChangeWatcher> {
        &self.shared.page
    }

    pub fn click_observer(&self) -> &ClickObserver {
        &self.click
    }

    pub fn move_observer(&self) -> &MoveObserver {
        &self.movement
    }

    pub fn scroll_observer(&self) -> &ScrollObserver {
        &self.scroll
    }

    pub fn form_observer(&self) -> &FormObserver {
        &self.form
    }

    pub fn is_connected(&self) -> bool {
        self.shared.session.read().connected
    }

    pub fn state(&self) -> SessionSnapshot {
        let session = self.shared.session.read();
        SessionSnapshot {
            state: session.connection_state(),
            user_id: session.user_id.clone(),
            recordings_id: session.recordings_id,
            enabled: self
                .shared
                .gate
                .enabled()
                .into_iter()
                .map(|c| c.as_str().to_string())
                .collect(),
        }
    }

    /// Control handle usable while [`run`](Self::run) owns the coordinator.
    pub fn handle(&self) -> CoordinatorHandle {
        CoordinatorHandle {
            commands: self.commands_tx.clone(),
            shutdown: self.shutdown.clone(),
        }
    }

    /// Token that stops [`run`](Self::run) when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Handshake with the collector using the configured credential.
    pub async fn connect(&mut self) -> TransportResult<()> {
        let timeout = self.config.connect_timeout();
        let handshake = self
            .shared
            .transport
            .connect(&self.config.auth_key, self.events_tx.clone());

        match tokio::time::timeout(timeout, handshake).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout),
        }
    }

    /// Process transport events and handle commands until shut down.
    /// Cancellation is final: a later call returns immediately.
    pub async fn run(&mut self) {
        loop {
            tokio::select! {
                event = self.events_rx.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => break,
                },
                Some(command) = self.commands_rx.recv() => self.handle_command(command).await,
                _ = self.shutdown.cancelled() => break,
            }
        }
        debug!("Coordinator event loop stopped");
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::SetUserId(user_id) => self.set_user_id(&user_id),
            Command::SetAuthKey(auth_key) => {
                if let Err(e) = self.set_auth_key(&auth_key).await {
                    warn!("Failed to reconnect with new credential: {}", e);
                }
            }
        }
    }

    /// Apply every transport event already queued. Returns how many ran.
    pub fn process_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    pub fn handle_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Connected => {
                self.shared.session.write().on_connected();
                info!("Connected; waiting for recording directive");
                self.shared.gate.set_page_tracking(true);
                self.start_page_polling();
                self.shared.request_directive();
            }
            TransportEvent::Disconnected => {
                self.shared.session.write().on_disconnected();
                self.shared.gate.set_page_tracking(false);
                // Dropping the poller cancels it; unmount awaits it instead.
                self.poller = None;
                info!("Disconnected; forwarding suspended");
            }
            TransportEvent::Directive(directive) => self.shared.apply_directive(directive),
        }
    }

    fn start_page_polling(&mut self) {
        if tokio::runtime::Handle::try_current().is_err() {
            warn!("No tokio runtime; page changes will not be polled");
            return;
        }
        let interval = self.config.page_poll_interval();
        self.poller = Some(self.shared.page.spawn_polling(interval));
    }

    /// Mirror the host's user id. While connected a new directive is
    /// requested; the current one stays in effect until it arrives.
    pub fn set_user_id(&mut self, user_id: &str) {
        let connected = {
            let mut session = self.shared.session.write();
            if session.user_id == user_id {
                return;
            }
            session.user_id = user_id.to_string();
            session.connected
        };
        self.config.user_id = user_id.to_string();
        info!("User changed to {:?}", user_id);

        if connected {
            self.shared.request_directive();
        }
    }

    /// Replace the credential, recreating the connection if one is up.
    pub async fn set_auth_key(&mut self, auth_key: &str) -> TransportResult<()> {
        if self.config.auth_key == auth_key {
            return Ok(());
        }
        self.config.auth_key = auth_key.to_string();

        if !self.shared.transport.is_connected() {
            return Ok(());
        }
        info!("Credential changed; reconnecting");
        self.shared.transport.disconnect().await?;
        self.process_pending();
        self.connect().await
    }

    /// Tear the instrumentation down: stop listening, stop polling, close
    /// the connection.
    pub async fn unmount(mut self) {
        self.forwarding.clear();
        self.shared.gate.set_page_tracking(false);
        if let Some(poller) = self.poller.take() {
            poller.stop().await;
        }
        self.shutdown.cancel();

        if let Err(e) = self.shared.transport.disconnect().await {
            warn!("Failed to close collector connection: {}", e);
        }
        info!("Instrumentation unmounted");
    }
}
