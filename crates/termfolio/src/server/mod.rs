//! SSH transport.
//!
//! Each connection gets a [`ConnectionHandler`]. A shell request on a
//! channel starts a [`Session`] task that owns the visitor's
//! [`App`](crate::ui::App); the handler only forwards decoded keys and
//! window sizes to it.

pub mod auth;
pub mod host_key;
pub mod session;
pub mod terminal;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use russh::server::{self, Auth, Msg, Server as _};
use russh::{Channel, ChannelId, Pty};
use russh_keys::key::PublicKey;
use tokio::sync::mpsc;
use tracing::{debug, info, warn, Instrument};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::feed::FeedService;
use crate::logging::connection_span;
use crate::storage::VisitorStore;
use crate::ui::{parse_keys, App, SessionInfo};

pub use auth::{AuthMode, AuthPolicy, AuthorizedKeys};
pub use session::{Session, SessionEvent};
pub use terminal::TerminalHandle;

/// Terminal size assumed until the client sends a pty request.
const DEFAULT_SIZE: (u16, u16) = (80, 24);

/// State shared by every connection.
#[derive(Debug)]
pub struct Shared {
    policy: AuthPolicy,
    store: Option<Arc<VisitorStore>>,
    feed: Option<Arc<FeedService>>,
    geolite_path: Option<PathBuf>,
}

impl Shared {
    /// Bundle the server-wide services.
    #[must_use]
    pub fn new(
        policy: AuthPolicy,
        store: Option<Arc<VisitorStore>>,
        feed: Option<Arc<FeedService>>,
        geolite_path: Option<PathBuf>,
    ) -> Self {
        Self {
            policy,
            store,
            feed,
            geolite_path,
        }
    }

    /// Record the visit from `ip` and describe the new session.
    ///
    /// Opted-out visitors are not recorded. Counter failures are logged and
    /// leave the count at zero. Blocks on the visitor database.
    #[must_use]
    pub fn session_info(&self, ip: Option<&str>) -> SessionInfo {
        let mut info = SessionInfo {
            remote_ip: ip.map(str::to_string),
            store: self.store.clone(),
            feed: self.feed.clone(),
            geolite_path: self.geolite_path.clone(),
            ..SessionInfo::default()
        };
        let Some(store) = &self.store else {
            return info;
        };

        let counted = match ip {
            Some(ip) => match store.is_opted_out(ip) {
                Ok(true) => {
                    debug!("Visitor {} has opted out", ip);
                    store.count()
                }
                Ok(false) => {
                    info.tracking_enabled = true;
                    store.record_visit(ip)
                }
                Err(e) => Err(e),
            },
            None => store.count(),
        };
        match counted {
            Ok(count) => info.visitor_count = count,
            Err(e) => warn!("Visitor counter failed: {}", e),
        }
        info
    }
}

/// Accepts connections and hands out handlers.
#[derive(Debug, Clone)]
pub struct PortfolioServer {
    shared: Arc<Shared>,
    next_id: u64,
}

impl PortfolioServer {
    /// A server around `shared`.
    #[must_use]
    pub fn new(shared: Shared) -> Self {
        Self {
            shared: Arc::new(shared),
            next_id: 0,
        }
    }
}

impl server::Server for PortfolioServer {
    type Handler = ConnectionHandler;

    fn new_client(&mut self, peer_addr: Option<SocketAddr>) -> ConnectionHandler {
        self.next_id += 1;
        ConnectionHandler::new(self.next_id, peer_addr, Arc::clone(&self.shared))
    }
}

#[derive(Debug)]
struct ChannelState {
    size: (u16, u16),
    events: Option<mpsc::UnboundedSender<SessionEvent>>,
}

impl Default for ChannelState {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            events: None,
        }
    }
}

/// One SSH connection.
#[derive(Debug)]
pub struct ConnectionHandler {
    id: u64,
    peer: Option<SocketAddr>,
    shared: Arc<Shared>,
    channels: HashMap<ChannelId, ChannelState>,
}

impl ConnectionHandler {
    fn new(id: u64, peer: Option<SocketAddr>, shared: Arc<Shared>) -> Self {
        Self {
            id,
            peer,
            shared,
            channels: HashMap::new(),
        }
    }

    fn remote_ip(&self) -> Option<String> {
        self.peer.map(|addr| addr.ip().to_string())
    }

    fn send_resize(&mut self, channel: ChannelId, width: u32, height: u32) {
        let (width, height) = terminal_size(width, height);
        let state = self.channels.entry(channel).or_default();
        state.size = (width, height);
        if let Some(events) = &state.events {
            let _ = events.send(SessionEvent::Resize { width, height });
        }
    }
}

fn reject() -> Auth {
    Auth::Reject {
        proceed_with_methods: None,
    }
}

/// Clamp SSH window dimensions to terminal cell counts.
fn terminal_size(width: u32, height: u32) -> (u16, u16) {
    (
        u16::try_from(width).unwrap_or(u16::MAX),
        u16::try_from(height).unwrap_or(u16::MAX),
    )
}

#[async_trait]
impl server::Handler for ConnectionHandler {
    type Error = Error;

    async fn auth_none(&mut self, user: &str) -> Result<Auth> {
        if self.shared.policy.allows_none() {
            info!(conn = self.id, "Accepted {} without credentials", user);
            Ok(Auth::Accept)
        } else {
            Ok(reject())
        }
    }

    async fn auth_publickey(&mut self, user: &str, public_key: &PublicKey) -> Result<Auth> {
        if self.shared.policy.allows_key(user, public_key) {
            info!(conn = self.id, "Accepted public key for {}", user);
            Ok(Auth::Accept)
        } else {
            debug!(conn = self.id, "Rejected public key for {}", user);
            Ok(reject())
        }
    }

    async fn channel_open_session(
        &mut self,
        channel: Channel<Msg>,
        _session: &mut server::Session,
    ) -> Result<bool> {
        self.channels.insert(channel.id(), ChannelState::default());
        Ok(true)
    }

    #[allow(clippy::too_many_arguments)]
    async fn pty_request(
        &mut self,
        channel: ChannelId,
        term: &str,
        col_width: u32,
        row_height: u32,
        _pix_width: u32,
        _pix_height: u32,
        _modes: &[(Pty, u32)],
        session: &mut server::Session,
    ) -> Result<()> {
        debug!(conn = self.id, "pty {} {}x{}", term, col_width, row_height);
        self.send_resize(channel, col_width, row_height);
        session.channel_success(channel);
        Ok(())
    }

    async fn window_change_request(
        &mut self,
        channel: ChannelId,
        col_width: u32,
        row_height: u32,
        _pix_width: u32,
        _pix_height: u32,
        _session: &mut server::Session,
    ) -> Result<()> {
        self.send_resize(channel, col_width, row_height);
        Ok(())
    }

    async fn shell_request(
        &mut self,
        channel: ChannelId,
        session: &mut server::Session,
    ) -> Result<()> {
        let ip = self.remote_ip();
        let shared = Arc::clone(&self.shared);
        let info = tokio::task::spawn_blocking(move || shared.session_info(ip.as_deref()))
            .await
            .map_err(|e| Error::internal(e.to_string()))?;
        info!(
            conn = self.id,
            "Session started (visitors: {}, tracked: {})",
            info.visitor_count,
            info.tracking_enabled
        );

        let state = self.channels.entry(channel).or_default();
        let (width, height) = state.size;
        let (events, events_rx) = mpsc::unbounded_channel();
        let output = TerminalHandle::start(session.handle(), channel);
        let ui = Session::new(App::new(info), output, width, height, events_rx)?;
        state.events = Some(events);
        session.channel_success(channel);

        tokio::spawn(
            async move {
                match ui.run().await {
                    Ok(()) => info!("Session ended"),
                    Err(e) => debug!("Session ended: {}", e),
                }
            }
            .instrument(connection_span(self.id, self.peer)),
        );
        Ok(())
    }

    async fn data(
        &mut self,
        channel: ChannelId,
        data: &[u8],
        _session: &mut server::Session,
    ) -> Result<()> {
        let Some(events) = self.channels.get(&channel).and_then(|s| s.events.as_ref()) else {
            return Ok(());
        };
        for key in parse_keys(data) {
            if events.send(SessionEvent::Key(key)).is_err() {
                break;
            }
        }
        Ok(())
    }

    async fn channel_close(
        &mut self,
        channel: ChannelId,
        _session: &mut server::Session,
    ) -> Result<()> {
        debug!(conn = self.id, "Channel closed");
        self.channels.remove(&channel);
        Ok(())
    }
}

fn open_store(config: &Config) -> Option<Arc<VisitorStore>> {
    if !config.counter.enabled {
        info!("Visitor counter disabled");
        return None;
    }
    match VisitorStore::open(config.database_path()) {
        Ok(store) => {
            info!("Visitor counter at {}", store.path().display());
            Some(Arc::new(store))
        }
        Err(e) => {
            warn!("Visitor counter unavailable: {}", e);
            None
        }
    }
}

/// Serve the portfolio until interrupted.
///
/// # Errors
///
/// Returns an error if the host key cannot be prepared, the feed client
/// cannot be built, or the listener fails.
pub async fn run(config: &Config, generate_host_key: bool) -> Result<()> {
    let key = host_key::ensure_host_key(&config.host_key_path(), generate_host_key)?;
    let policy = AuthPolicy::from_config(&config.ssh);
    let store = open_store(config);
    let geolite_path = store.as_ref().and(config.counter.geolite_path.clone());
    let feed = Arc::new(FeedService::new(config.feed.clone())?);

    let ssh_config = server::Config {
        inactivity_timeout: config.inactivity_timeout(),
        auth_rejection_time: Duration::from_secs(1),
        auth_rejection_time_initial: Some(Duration::ZERO),
        methods: policy.methods(),
        keys: vec![key],
        ..Default::default()
    };

    let mut portfolio = PortfolioServer::new(Shared::new(policy, store, Some(feed), geolite_path));
    info!(
        "Listening on {} (auth: {})",
        config.listen_addr(),
        config.ssh.auth_mode
    );

    tokio::select! {
        result = portfolio.run_on_address(
            Arc::new(ssh_config),
            (config.ssh.address.as_str(), config.ssh.port),
        ) => result?,
        _ = tokio::signal::ctrl_c() => info!("Shutting down"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::Path;

    fn shared_with_store() -> (Shared, Arc<VisitorStore>) {
        let store = Arc::new(VisitorStore::open_in_memory().unwrap());
        let shared = Shared::new(AuthPolicy::Open, Some(Arc::clone(&store)), None, None);
        (shared, store)
    }

    #[test]
    fn test_terminal_size_clamps() {
        assert_eq!(terminal_size(80, 24), (80, 24));
        assert_eq!(terminal_size(100_000, 7), (u16::MAX, 7));
    }

    #[test]
    fn test_session_info_records_visit() {
        let (shared, store) = shared_with_store();
        let info = shared.session_info(Some("203.0.113.5"));

        assert_eq!(info.visitor_count, 1);
        assert!(info.tracking_enabled);
        assert_eq!(info.remote_ip.as_deref(), Some("203.0.113.5"));
        assert_eq!(store.count().unwrap(), 1);

        // A repeat visit is not counted twice.
        assert_eq!(shared.session_info(Some("203.0.113.5")).visitor_count, 1);
    }

    #[test]
    fn test_session_info_respects_opt_out() {
        let (shared, store) = shared_with_store();
        store.record_visit("198.51.100.1").unwrap();
        store.set_opt_out("203.0.113.5", true).unwrap();

        let info = shared.session_info(Some("203.0.113.5"));
        assert_eq!(info.visitor_count, 1);
        assert!(!info.tracking_enabled);
        assert!(store.is_opted_out("203.0.113.5").unwrap());
    }

    #[test]
    fn test_session_info_without_ip() {
        let (shared, store) = shared_with_store();
        store.record_visit("198.51.100.1").unwrap();

        let info = shared.session_info(None);
        assert_eq!(info.visitor_count, 1);
        assert!(!info.tracking_enabled);
    }

    #[test]
    fn test_session_info_without_store() {
        let shared = Shared::new(AuthPolicy::Open, None, None, None);
        let info = shared.session_info(Some("203.0.113.5"));

        assert_eq!(info.visitor_count, 0);
        assert!(!info.tracking_enabled);
        assert!(info.store.is_none());
    }

    #[test]
    fn test_server_numbers_connections() {
        let mut portfolio = PortfolioServer::new(Shared::new(AuthPolicy::Open, None, None, None));
        let first = server::Server::new_client(&mut portfolio, None);
        let second = server::Server::new_client(&mut portfolio, None);
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    const KEY: &str = "AAAAC3NzaC1lZDI1NTE5AAAAIOMqqnkVzrm0SdG6UOoqKLsabgH5C9okWi0dh2l9GKJl";
    const OTHER_KEY: &str = "AAAAC3NzaC1lZDI1NTE5AAAAIPtZaUZ2E5M16B7Fuk/jNWm4p2HQBdt+qf0CJ5afcxoP";

    fn handler(policy: AuthPolicy) -> ConnectionHandler {
        ConnectionHandler::new(1, None, Arc::new(Shared::new(policy, None, None, None)))
    }

    fn key(base64: &str) -> PublicKey {
        russh_keys::parse_public_key_base64(base64).unwrap()
    }

    #[tokio::test]
    async fn test_handler_open_accepts_none() {
        let mut handler = handler(AuthPolicy::Open);
        let auth = server::Handler::auth_none(&mut handler, "visitor").await.unwrap();
        assert!(matches!(auth, Auth::Accept));
    }

    #[tokio::test]
    async fn test_handler_keys_policy() {
        let keys = AuthorizedKeys::parse(
            &format!("ssh-ed25519 {KEY} visitor@example\n"),
            Path::new("authorized_keys"),
        );
        let mut handler = handler(AuthPolicy::Keys(keys));

        let auth = server::Handler::auth_none(&mut handler, "visitor").await.unwrap();
        assert!(matches!(auth, Auth::Reject { .. }));

        let auth = server::Handler::auth_publickey(&mut handler, "visitor", &key(KEY))
            .await
            .unwrap();
        assert!(matches!(auth, Auth::Accept));

        let auth = server::Handler::auth_publickey(&mut handler, "visitor", &key(OTHER_KEY))
            .await
            .unwrap();
        assert!(matches!(auth, Auth::Reject { .. }));
    }

    #[tokio::test]
    async fn test_handler_any_key_policy() {
        let mut handler = handler(AuthPolicy::AnyKey);

        let auth = server::Handler::auth_none(&mut handler, "visitor").await.unwrap();
        assert!(matches!(auth, Auth::Reject { .. }));

        let auth = server::Handler::auth_publickey(&mut handler, "visitor", &key(OTHER_KEY))
            .await
            .unwrap();
        assert!(matches!(auth, Auth::Accept));
    }

    #[test]
    fn test_open_store_disabled() {
        let mut config = Config::default();
        config.counter.enabled = false;
        assert!(open_store(&config).is_none());
    }

    #[test]
    fn test_open_store_at_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.counter.database_path = Some(dir.path().join("data").join("visitors.db"));

        let store = open_store(&config).unwrap();
        assert_eq!(store.record_visit("203.0.113.5").unwrap(), 1);
    }
}
