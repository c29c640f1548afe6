use std::io::ErrorKind;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use bytes::Bytes;
use crossbeam_channel::{Receiver, Sender, TrySendError};
use tracing::{debug, info, trace, warn};

use crate::config::{EndpointConfig, OverflowPolicy, QueueConfig};
use crate::error::{Result, TransportError};
use crate::stats::{TransportStats, TransportStatsSnapshot};
use crate::traits::DatagramSource;

/// Largest payload a single UDP datagram can carry.
const MAX_DATAGRAM_SIZE: usize = 65_535;

const RECV_THREAD_NAME: &str = "motionrelay-recv";

/// UDP transport with a background receive loop.
///
/// Binding starts a dedicated thread that blocks on the socket and feeds a
/// bounded queue. [`UdpTransport::stop`] (or dropping the transport) ends the
/// thread, forcing a blocked receive to return, and closes the socket.
pub struct UdpTransport {
    /// Emptied by `stop`; the descriptor closes once the receive thread's
    /// handle is gone too.
    socket: Mutex<Option<Arc<UdpSocket>>>,
    local_addr: SocketAddr,
    destination: SocketAddr,
    queue: Receiver<Bytes>,
    queue_config: QueueConfig,
    running: Arc<AtomicBool>,
    stats: Arc<TransportStats>,
    recv_thread: Mutex<Option<JoinHandle<()>>>,
}

impl UdpTransport {
    /// Bind the receive socket on every interface and start the receive loop.
    ///
    /// Fails if the peer address does not parse or the listen port is taken.
    /// No thread is left running on failure.
    pub fn bind(endpoint: &EndpointConfig, queue_config: QueueConfig) -> Result<Self> {
        let listen_addr = endpoint.listen_addr()?;
        let destination = endpoint.send_addr()?;

        let socket = UdpSocket::bind(listen_addr).map_err(|source| TransportError::Bind {
            addr: listen_addr,
            source,
        })?;
        let local_addr = socket.local_addr()?;
        let socket = Arc::new(socket);

        let (tx, rx) = crossbeam_channel::bounded(queue_config.effective_capacity());
        let running = Arc::new(AtomicBool::new(true));
        let stats = Arc::new(TransportStats::default());

        let receive_loop = ReceiveLoop {
            socket: Arc::clone(&socket),
            tx,
            evict: rx.clone(),
            overflow: queue_config.overflow,
            running: Arc::clone(&running),
            stats: Arc::clone(&stats),
        };
        let handle = thread::Builder::new()
            .name(RECV_THREAD_NAME.to_string())
            .spawn(move || receive_loop.run())
            .map_err(TransportError::Spawn)?;

        info!(
            %local_addr,
            %destination,
            capacity = queue_config.effective_capacity(),
            overflow = ?queue_config.overflow,
            "udp transport bound"
        );

        Ok(Self {
            socket: Mutex::new(Some(socket)),
            local_addr,
            destination,
            queue: rx,
            queue_config,
            running,
            stats,
            recv_thread: Mutex::new(Some(handle)),
        })
    }

    /// Send one datagram to the fixed destination.
    ///
    /// Fire-and-forget: failures are counted and logged, never returned.
    /// Does nothing once the transport is stopped.
    pub fn send(&self, datagram: &[u8]) {
        let socket = match self.socket() {
            Some(socket) if self.is_running() => socket,
            _ => {
                trace!(len = datagram.len(), "transport stopped; dropping outgoing datagram");
                return;
            }
        };

        match socket.send_to(datagram, self.destination) {
            Ok(_) => TransportStats::bump(&self.stats.datagrams_sent),
            Err(err) => {
                TransportStats::bump(&self.stats.send_errors);
                debug!(destination = %self.destination, error = %err, "send failed");
            }
        }
    }

    /// Pop the oldest received datagram without blocking.
    pub fn dequeue(&self) -> Option<Bytes> {
        self.queue.try_recv().ok()
    }

    /// Number of datagrams waiting in the receive queue.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Stop the receive loop and close the socket. Idempotent.
    ///
    /// The listen port is free again when this returns, even if clones of an
    /// `Arc<UdpTransport>` are still alive.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::AcqRel) {
            return;
        }

        if let Some(socket) = self.socket() {
            interrupt_receive(&socket, self.local_addr);
        }

        let handle = match self.recv_thread.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            if handle.join().is_err() {
                warn!("receive thread panicked");
            }
        }

        // Last handle now that the receive thread is gone.
        drop(self.socket_slot().take());

        info!(local_addr = %self.local_addr, "udp transport stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Actual bound address (resolves an ephemeral listen port).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Destination of [`UdpTransport::send`].
    pub fn destination(&self) -> SocketAddr {
        self.destination
    }

    pub fn queue_config(&self) -> QueueConfig {
        self.queue_config
    }

    pub fn stats(&self) -> TransportStatsSnapshot {
        self.stats.snapshot()
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        "udp"
    }

    fn socket_slot(&self) -> MutexGuard<'_, Option<Arc<UdpSocket>>> {
        match self.socket.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn socket(&self) -> Option<Arc<UdpSocket>> {
        self.socket_slot().clone()
    }
}

/// Force a blocked `recv_from` on the receive thread to return.
fn interrupt_receive(socket: &UdpSocket, local_addr: SocketAddr) {
    #[cfg(unix)]
    {
        use std::os::fd::AsRawFd;

        // SAFETY: `socket` is borrowed, so the descriptor stays open for the
        // duration of this call. Shutting down the read half only wakes
        // pending receivers; the descriptor itself is closed on drop.
        let rc = unsafe { libc::shutdown(socket.as_raw_fd(), libc::SHUT_RD) };
        if rc != 0 {
            trace!(
                error = %std::io::Error::last_os_error(),
                "read shutdown not supported on this socket"
            );
        }
    }

    // Platforms that ignore the shutdown still wake on any datagram.
    if let Err(err) = socket.send_to(&[], wake_addr(local_addr)) {
        trace!(error = %err, "wake datagram not sent");
    }
}

impl DatagramSource for UdpTransport {
    fn dequeue(&self) -> Option<Bytes> {
        UdpTransport::dequeue(self)
    }

    fn pending(&self) -> usize {
        UdpTransport::pending(self)
    }
}

impl Drop for UdpTransport {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for UdpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpTransport")
            .field("local_addr", &self.local_addr)
            .field("destination", &self.destination)
            .field("running", &self.is_running())
            .finish()
    }
}

/// Loopback equivalent of the wildcard bind, so the wake datagram is routable.
fn wake_addr(local: SocketAddr) -> SocketAddr {
    let ip = match local.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        ip => ip,
    };
    SocketAddr::new(ip, local.port())
}

/// State moved onto the receive thread.
struct ReceiveLoop {
    socket: Arc<UdpSocket>,
    tx: Sender<Bytes>,
    /// Second handle on the queue, used to evict under `DropOldest`.
    evict: Receiver<Bytes>,
    overflow: OverflowPolicy,
    running: Arc<AtomicBool>,
    stats: Arc<TransportStats>,
}

impl ReceiveLoop {
    fn run(self) {
        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
        debug!("receive loop started");

        while self.running.load(Ordering::Acquire) {
            match self.socket.recv_from(&mut buf) {
                Ok((len, from)) => {
                    if !self.running.load(Ordering::Acquire) {
                        break;
                    }
                    if len == 0 {
                        trace!(%from, "ignoring empty datagram");
                        continue;
                    }
                    TransportStats::bump(&self.stats.datagrams_received);
                    trace!(%from, len, "datagram received");
                    self.enqueue(Bytes::copy_from_slice(&buf[..len]));
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => {
                    if !self.running.load(Ordering::Acquire) {
                        break;
                    }
                    // Includes ICMP-driven resets when the peer is not up yet.
                    TransportStats::bump(&self.stats.recv_errors);
                    debug!(error = %err, "receive failed; continuing");
                }
            }
        }

        debug!("receive loop exited");
    }

    fn enqueue(&self, mut datagram: Bytes) {
        loop {
            match self.tx.try_send(datagram) {
                Ok(()) => return,
                Err(TrySendError::Full(rejected)) => match self.overflow {
                    OverflowPolicy::DropNewest => {
                        TransportStats::bump(&self.stats.datagrams_dropped);
                        trace!(len = rejected.len(), "queue full; dropped newest datagram");
                        return;
                    }
                    OverflowPolicy::DropOldest => {
                        if let Ok(evicted) = self.evict.try_recv() {
                            TransportStats::bump(&self.stats.datagrams_dropped);
                            trace!(len = evicted.len(), "queue full; dropped oldest datagram");
                        }
                        datagram = rejected;
                    }
                },
                Err(TrySendError::Disconnected(_)) => return,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn loopback(listen_port: u16, send_port: u16) -> EndpointConfig {
        EndpointConfig::device()
            .with_listen_port(listen_port)
            .with_send_port(send_port)
    }

    /// Where a local client reaches a transport bound on every interface.
    fn loopback_addr(transport: &UdpTransport) -> SocketAddr {
        wake_addr(transport.local_addr())
    }

    fn wait_for_pending(transport: &UdpTransport, count: usize) {
        let deadline = Instant::now() + Duration::from_secs(3);
        while transport.pending() < count {
            assert!(Instant::now() < deadline, "timed out waiting for datagrams");
            thread::sleep(Duration::from_millis(5));
        }
    }

    fn receive_loop(capacity: usize, overflow: OverflowPolicy) -> (ReceiveLoop, Receiver<Bytes>) {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        let receive_loop = ReceiveLoop {
            socket: Arc::new(socket),
            tx,
            evict: rx.clone(),
            overflow,
            running: Arc::new(AtomicBool::new(true)),
            stats: Arc::new(TransportStats::default()),
        };
        (receive_loop, rx)
    }

    #[test]
    fn test_bind_ephemeral_and_receive() {
        let transport = UdpTransport::bind(&loopback(0, 9), QueueConfig::default()).unwrap();
        assert_ne!(transport.local_addr().port(), 0);
        assert!(transport.local_addr().ip().is_unspecified());

        let client = UdpSocket::bind("127.0.0.1:0").unwrap();
        client.send_to(b"hello", loopback_addr(&transport)).unwrap();

        wait_for_pending(&transport, 1);
        assert_eq!(transport.dequeue().unwrap().as_ref(), b"hello");
        assert!(transport.dequeue().is_none());
        assert_eq!(transport.stats().datagrams_received, 1);
    }

    #[test]
    fn test_preserves_arrival_order() {
        let transport = UdpTransport::bind(&loopback(0, 9), QueueConfig::default()).unwrap();
        let client = UdpSocket::bind("127.0.0.1:0").unwrap();
        for i in 0u8..5 {
            client.send_to(&[i], loopback_addr(&transport)).unwrap();
        }

        wait_for_pending(&transport, 5);
        let received: Vec<u8> = std::iter::from_fn(|| transport.dequeue())
            .map(|d| d[0])
            .collect();
        assert_eq!(received, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_bind_conflict_fails() {
        let first = UdpTransport::bind(&loopback(0, 9), QueueConfig::default()).unwrap();
        let taken = first.local_addr().port();
        let second = UdpTransport::bind(&loopback(taken, 9), QueueConfig::default());
        assert!(matches!(second, Err(TransportError::Bind { .. })));
    }

    #[test]
    fn test_non_local_peer_address_binds() {
        let config = loopback(0, 15600).with_bind_address("192.0.2.10");
        let transport = UdpTransport::bind(&config, QueueConfig::default())
            .expect("a remote peer address must not affect the listen socket");

        assert!(transport.local_addr().ip().is_unspecified());
        assert_eq!(
            transport.destination(),
            "192.0.2.10:15600".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_invalid_address_fails() {
        let config = loopback(0, 9).with_bind_address("localhost:nope");
        let result = UdpTransport::bind(&config, QueueConfig::default());
        assert!(matches!(result, Err(TransportError::InvalidAddress { .. })));
    }

    #[test]
    fn test_stop_unblocks_receive_and_is_idempotent() {
        let transport = UdpTransport::bind(&loopback(0, 9), QueueConfig::default()).unwrap();
        // give the receive thread time to block in recv_from
        thread::sleep(Duration::from_millis(50));

        let started = Instant::now();
        transport.stop();
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(!transport.is_running());

        transport.stop();
        assert!(transport.recv_thread.lock().unwrap().is_none());
        assert!(transport.socket().is_none());
    }

    #[test]
    fn test_stop_releases_port_while_transport_alive() {
        let transport =
            Arc::new(UdpTransport::bind(&loopback(0, 9), QueueConfig::default()).unwrap());
        let other_handle = Arc::clone(&transport);
        let port = transport.local_addr().port();

        transport.stop();

        let rebound = UdpSocket::bind(("0.0.0.0", port));
        assert!(rebound.is_ok(), "port should be free after stop: {rebound:?}");

        other_handle.send(b"late");
        assert_eq!(other_handle.stats().send_errors, 0);
        assert_eq!(other_handle.stats().datagrams_sent, 0);
    }

    #[test]
    fn test_send_after_stop_is_noop() {
        let transport = UdpTransport::bind(&loopback(0, 9), QueueConfig::default()).unwrap();
        transport.stop();
        transport.send(b"late");
        assert_eq!(transport.stats().datagrams_sent, 0);
        assert_eq!(transport.stats().send_errors, 0);
    }

    #[test]
    fn test_drop_oldest_keeps_newest() {
        let (receive_loop, rx) = receive_loop(2, OverflowPolicy::DropOldest);
        for payload in [b"a", b"b", b"c", b"d"] {
            receive_loop.enqueue(Bytes::from_static(payload));
        }

        assert_eq!(rx.dequeue().unwrap().as_ref(), b"c");
        assert_eq!(rx.dequeue().unwrap().as_ref(), b"d");
        assert!(rx.dequeue().is_none());
        assert_eq!(receive_loop.stats.snapshot().datagrams_dropped, 2);
    }

    #[test]
    fn test_drop_newest_keeps_oldest() {
        let (receive_loop, rx) = receive_loop(2, OverflowPolicy::DropNewest);
        for payload in [b"a", b"b", b"c", b"d"] {
            receive_loop.enqueue(Bytes::from_static(payload));
        }

        assert_eq!(rx.dequeue().unwrap().as_ref(), b"a");
        assert_eq!(rx.dequeue().unwrap().as_ref(), b"b");
        assert!(rx.dequeue().is_none());
        assert_eq!(receive_loop.stats.snapshot().datagrams_dropped, 2);
    }

    #[test]
    fn test_wake_addr_maps_wildcard_to_loopback() {
        let wildcard: SocketAddr = "0.0.0.0:4000".parse().unwrap();
        assert_eq!(wake_addr(wildcard), "127.0.0.1:4000".parse().unwrap());

        let bound: SocketAddr = "127.0.0.1:4000".parse().unwrap();
        assert_eq!(wake_addr(bound), bound);
    }
}
