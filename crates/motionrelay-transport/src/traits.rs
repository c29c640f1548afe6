use bytes::Bytes;
use crossbeam_channel::Receiver;

/// A non-blocking source of raw datagrams.
///
/// This is the seam between the receive side and whatever drains it. The
/// transport implements it over its receive queue; a bare channel receiver
/// implements it too, which lets consumers run without a socket.
pub trait DatagramSource {
    /// Pop the oldest queued datagram, or `None` if nothing is queued.
    fn dequeue(&self) -> Option<Bytes>;

    /// Number of datagrams queued right now.
    fn pending(&self) -> usize;
}

impl DatagramSource for Receiver<Bytes> {
    fn dequeue(&self) -> Option<Bytes> {
        self.try_recv().ok()
    }

    fn pending(&self) -> usize {
        self.len()
    }
}

impl<T: DatagramSource + ?Sized> DatagramSource for std::sync::Arc<T> {
    fn dequeue(&self) -> Option<Bytes> {
        (**self).dequeue()
    }

    fn pending(&self) -> usize {
        (**self).pending()
    }
}
