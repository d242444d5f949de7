//! Transfer dispatch shared by the SPI and i80 buses
//!
//! [`Bus`] is the uniform wrapper around a vendor panel IO endpoint. It
//! forwards parameter transfers directly, serializes color transfers through
//! the transfer-active flag, and services completion events by invoking the
//! registered callback on the foreground task, never in the signalling
//! (ISR) context.
//!
//! # Example
//!
//! ```
//! use esp_lcd_bus::{Bus, PanelIo, TransferState};
//! use esp_lcd_bus::Error;
//! extern crate alloc;
//! use alloc::sync::Arc;
//!
//! struct Loopback;
//! impl PanelIo for Loopback {
//!     fn tx_param(&mut self, _cmd: Option<i32>, _data: &[u8]) -> Result<(), Error> { Ok(()) }
//!     fn tx_color(&mut self, _cmd: Option<i32>, _data: &[u8]) -> Result<(), Error> { Ok(()) }
//! }
//!
//! let state = Arc::new(TransferState::new());
//! let mut bus = Bus::new(Loopback, state.clone());
//! bus.send(Some(0x2A), &[0x00, 0x00, 0x00, 0xEF])?;
//!
//! bus.send_color(Some(0x2C), &[0x07, 0xE0])?;
//! state.complete_from_isr(); // normally signalled by the vendor driver
//! assert_eq!(bus.service_completions(), 1);
//! # Ok::<(), esp_lcd_bus::Error>(())
//! ```

#[cfg(not(feature = "alloc"))]
compile_error!("the bus dispatch layer requires the `alloc` feature to be enabled");

extern crate alloc;

use alloc::boxed::Box;
use alloc::sync::Arc;

use crate::byteswap;
use crate::error::Error;
use crate::io::PanelIo;
use crate::notify::TransferState;

/// A completion callback invoked once per finished color transfer.
pub type CompletionCallback = Box<dyn FnMut() + Send>;

/// A display bus wrapping a vendor panel IO endpoint.
///
/// At most one color transfer is in flight per `Bus` instance. There is no
/// timeout on the wait for the color path: an endpoint that never signals
/// completion blocks the caller indefinitely.
pub struct Bus<I> {
    io: I,
    state: Arc<TransferState>,
    callback: Option<CompletionCallback>,
}

impl<I: PanelIo> Bus<I> {
    /// Wraps a panel IO endpoint.
    ///
    /// `state` must be the same [`TransferState`] the endpoint's transfer-done
    /// callback signals.
    pub fn new(io: I, state: Arc<TransferState>) -> Self {
        Self {
            io,
            state,
            callback: None,
        }
    }

    /// Sends a command and optional parameters through the parameter path.
    ///
    /// `None` sends a payload-only write. The vendor driver flushes any
    /// queued color transfers before the command goes out.
    pub fn send(&mut self, cmd: Option<i32>, data: &[u8]) -> Result<(), Error> {
        self.io.tx_param(cmd, data)
    }

    /// Queues a pixel payload on the color path.
    ///
    /// Blocks while a previous color transfer is still in flight, servicing
    /// completion events in the meantime, then issues the transfer and
    /// returns. Completion of this transfer is asynchronous; it is observed
    /// through [`Bus::service_completions`] or [`Bus::wait_idle`].
    ///
    /// If the vendor driver rejects the transfer the active flag is released
    /// and the status code is returned.
    pub fn send_color(&mut self, cmd: Option<i32>, data: &[u8]) -> Result<(), Error> {
        while !self.state.try_begin() {
            self.service_completions();
            core::hint::spin_loop();
        }

        match self.io.tx_color(cmd, data) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.state.abort();
                Err(e)
            }
        }
    }

    /// Registers the completion callback, or clears it with `None`.
    ///
    /// The callback runs on the foreground task when completions are
    /// serviced, once per finished transfer.
    pub fn register_callback(&mut self, callback: Option<CompletionCallback>) {
        self.callback = callback;
    }

    /// Invokes the registered callback once per completion signalled since
    /// the last service, and returns how many transfers completed.
    ///
    /// Events are consumed whether or not a callback is registered.
    pub fn service_completions(&mut self) -> usize {
        let n = self.state.take_pending();
        if let Some(cb) = self.callback.as_mut() {
            for _ in 0..n {
                dispatch(cb);
            }
        }
        n
    }

    /// Blocks until no color transfer is in flight, then drains any
    /// outstanding completion events.
    pub fn wait_idle(&mut self) {
        while self.state.is_active() {
            self.service_completions();
            core::hint::spin_loop();
        }
        self.service_completions();
    }

    /// In-place 16-bit endianness flip of a pixel buffer.
    ///
    /// See [`byteswap::swap_bytes`].
    pub fn swap_bytes(&self, buf: &mut [u8]) -> Result<(), Error> {
        byteswap::swap_bytes(buf)
    }

    /// The wrapped panel IO endpoint.
    pub fn io(&self) -> &I {
        &self.io
    }

    /// The wrapped panel IO endpoint, mutably.
    pub fn io_mut(&mut self) -> &mut I {
        &mut self.io
    }

    /// The transfer handshake state shared with the completion callback.
    pub fn transfer_state(&self) -> &Arc<TransferState> {
        &self.state
    }
}

#[cfg(feature = "std")]
fn dispatch(cb: &mut CompletionCallback) {
    if std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| cb())).is_err() {
        log::error!("completion callback panicked; not propagated");
    }
}

// Without unwinding support the callback runs bare; a panic aborts.
#[cfg(not(feature = "std"))]
fn dispatch(cb: &mut CompletionCallback) {
    cb();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Debug, PartialEq)]
    enum Tx {
        Param(Option<i32>, Vec<u8>),
        Color(Option<i32>, Vec<u8>),
    }

    /// Never signals completion on its own; tests drive the shared
    /// [`TransferState`] the way the vendor ISR would.
    struct MockIo {
        log: Arc<Mutex<Vec<Tx>>>,
        fail_with: Option<Error>,
    }

    impl MockIo {
        fn new(log: Arc<Mutex<Vec<Tx>>>) -> Self {
            Self {
                log,
                fail_with: None,
            }
        }
    }

    impl PanelIo for MockIo {
        fn tx_param(&mut self, cmd: Option<i32>, data: &[u8]) -> Result<(), Error> {
            if let Some(e) = self.fail_with {
                return Err(e);
            }
            self.log.lock().unwrap().push(Tx::Param(cmd, data.to_vec()));
            Ok(())
        }

        fn tx_color(&mut self, cmd: Option<i32>, data: &[u8]) -> Result<(), Error> {
            if let Some(e) = self.fail_with {
                return Err(e);
            }
            self.log.lock().unwrap().push(Tx::Color(cmd, data.to_vec()));
            Ok(())
        }
    }

    fn test_bus() -> (Bus<MockIo>, Arc<TransferState>, Arc<Mutex<Vec<Tx>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let state = Arc::new(TransferState::new());
        let bus = Bus::new(MockIo::new(log.clone()), state.clone());
        (bus, state, log)
    }

    #[test]
    fn send_forwards_command_and_payload() {
        let (mut bus, _, log) = test_bus();
        bus.send(Some(0x2A), &[0x00, 0xEF]).unwrap();
        bus.send(None, &[0x12]).unwrap();
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                Tx::Param(Some(0x2A), vec![0x00, 0xEF]),
                Tx::Param(None, vec![0x12]),
            ]
        );
    }

    #[test]
    fn send_color_blocks_until_previous_transfer_completes() {
        let (mut bus, state, log) = test_bus();
        bus.send_color(Some(0x2C), &[1, 2]).unwrap();
        assert!(state.is_active());

        let issued = Arc::new(AtomicUsize::new(0));
        let probe = issued.clone();
        let handle = std::thread::spawn(move || {
            bus.send_color(Some(0x2C), &[3, 4]).unwrap();
            probe.store(1, Ordering::SeqCst);
            bus
        });

        // No completion signalled yet: the second transfer must not issue.
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(issued.load(Ordering::SeqCst), 0);
        assert_eq!(log.lock().unwrap().len(), 1);

        state.complete_from_isr();
        let bus = handle.join().unwrap();
        assert_eq!(issued.load(Ordering::SeqCst), 1);
        assert_eq!(log.lock().unwrap().len(), 2);
        assert!(state.is_active());
        drop(bus);
    }

    #[test]
    fn callback_runs_exactly_once_per_completion() {
        let (mut bus, state, _) = test_bus();
        let hits = Arc::new(AtomicUsize::new(0));
        let probe = hits.clone();
        bus.register_callback(Some(Box::new(move || {
            probe.fetch_add(1, Ordering::SeqCst);
        })));

        bus.send_color(None, &[0xAA]).unwrap();
        state.complete_from_isr();
        assert!(!state.is_active());

        assert_eq!(bus.service_completions(), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        // Already drained: a second service invokes nothing.
        assert_eq!(bus.service_completions(), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cleared_callback_is_not_invoked() {
        let (mut bus, state, _) = test_bus();
        let hits = Arc::new(AtomicUsize::new(0));
        let probe = hits.clone();
        bus.register_callback(Some(Box::new(move || {
            probe.fetch_add(1, Ordering::SeqCst);
        })));
        bus.register_callback(None);

        bus.send_color(None, &[0xAA]).unwrap();
        state.complete_from_isr();
        assert_eq!(bus.service_completions(), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn rejected_color_transfer_reports_and_releases_flag() {
        let (mut bus, state, _) = test_bus();
        bus.io_mut().fail_with = Some(Error::Io(-1));
        assert_eq!(bus.send_color(Some(0x2C), &[1]), Err(Error::Io(-1)));
        assert!(!state.is_active());

        // The flag is free again for the next transfer.
        bus.io_mut().fail_with = None;
        bus.send_color(Some(0x2C), &[1]).unwrap();
        assert!(state.is_active());
    }

    #[test]
    fn rejected_param_transfer_reports() {
        let (mut bus, _, log) = test_bus();
        bus.io_mut().fail_with = Some(Error::Io(263));
        assert_eq!(bus.send(Some(0x01), &[]), Err(Error::Io(263)));
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn wait_idle_drains_completions() {
        let (mut bus, state, _) = test_bus();
        let hits = Arc::new(AtomicUsize::new(0));
        let probe = hits.clone();
        bus.register_callback(Some(Box::new(move || {
            probe.fetch_add(1, Ordering::SeqCst);
        })));

        bus.send_color(None, &[0xAA]).unwrap();
        let waiter = std::thread::spawn(move || {
            bus.wait_idle();
            bus
        });
        std::thread::sleep(Duration::from_millis(20));
        state.complete_from_isr();
        let bus = waiter.join().unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        drop(bus);
    }

    #[test]
    fn panicking_callback_is_contained() {
        let (mut bus, state, _) = test_bus();
        bus.register_callback(Some(Box::new(|| panic!("callback"))));
        bus.send_color(None, &[0xAA]).unwrap();
        state.complete_from_isr();
        // Must not unwind into the caller.
        assert_eq!(bus.service_completions(), 1);
    }
}
