//! Shared hardware link
//!
//! One board link is shared by every sensor and relay in the process.
//! [`LinkManager`] owns it and counts holders: the first
//! [`LinkManager::acquire`] opens the link, and dropping (or releasing)
//! the last [`LinkHandle`] shuts it down.
//!
//! ```text
//! LinkManager ──acquire()──► LinkHandle ──► PinWriter / AnalogSource
//!      ▲                          │
//!      └──────── release ◄────────┘ (Drop or release(), once)
//! ```

use alloc::boxed::Box;
use alloc::sync::Arc;
use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use log::{debug, info};
use thermorelay_hal::{
    AnalogCallback, AnalogPin, AnalogSource, DigitalPin, HardwareLink, LinkError, PinWriter,
};

/// Opens the underlying link
pub type LinkOpener<L> = Box<dyn Fn() -> Result<L, LinkError> + Send + Sync>;

struct LinkState<L> {
    link: Option<L>,
    holders: usize,
}

/// Reference-counted owner of one hardware link
pub struct LinkManager<L> {
    opener: LinkOpener<L>,
    state: Mutex<CriticalSectionRawMutex, RefCell<LinkState<L>>>,
}

impl<L: HardwareLink + Send> LinkManager<L> {
    /// Create a manager; nothing is opened until the first acquire
    pub fn new(opener: LinkOpener<L>) -> Arc<Self> {
        Arc::new(Self {
            opener,
            state: Mutex::new(RefCell::new(LinkState {
                link: None,
                holders: 0,
            })),
        })
    }

    /// Take a share of the link, opening it if this is the first holder
    pub fn acquire(self: &Arc<Self>) -> Result<LinkHandle<L>, LinkError> {
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            if state.link.is_none() {
                state.link = Some((self.opener)()?);
                info!("Hardware link opened");
            }
            state.holders += 1;
            debug!("Link acquired ({} holders)", state.holders);
            Ok::<(), LinkError>(())
        })?;

        Ok(LinkHandle {
            manager: self.clone(),
            released: false,
        })
    }

    /// Number of live handles
    pub fn holders(&self) -> usize {
        self.state.lock(|state| state.borrow().holders)
    }

    pub fn is_open(&self) -> bool {
        self.state.lock(|state| state.borrow().link.is_some())
    }

    /// Run `f` against the open link
    pub fn with_link<R>(
        &self,
        f: impl FnOnce(&mut L) -> Result<R, LinkError>,
    ) -> Result<R, LinkError> {
        self.state.lock(|state| match state.borrow_mut().link.as_mut() {
            Some(link) => f(link),
            None => Err(LinkError::Unavailable),
        })
    }

    fn release(&self) {
        let closing = self.state.lock(|state| {
            let mut state = state.borrow_mut();
            state.holders = state.holders.saturating_sub(1);
            debug!("Link released ({} holders)", state.holders);
            if state.holders == 0 {
                state.link.take()
            } else {
                None
            }
        });

        if let Some(mut link) = closing {
            link.shutdown();
            info!("Hardware link closed");
        }
    }
}

/// One holder's share of the link
///
/// Released exactly once: either explicitly through [`LinkHandle::release`]
/// or when dropped.
pub struct LinkHandle<L: HardwareLink + Send> {
    manager: Arc<LinkManager<L>>,
    released: bool,
}

impl<L: HardwareLink + Send> LinkHandle<L> {
    /// Give up this share now
    pub fn release(mut self) {
        self.release_once();
    }

    pub fn manager(&self) -> &Arc<LinkManager<L>> {
        &self.manager
    }

    fn release_once(&mut self) {
        if !self.released {
            self.released = true;
            self.manager.release();
        }
    }
}

impl<L: HardwareLink + Send> Drop for LinkHandle<L> {
    fn drop(&mut self) {
        self.release_once();
    }
}

impl<L: HardwareLink + Send> PinWriter for LinkHandle<L> {
    fn configure_digital_output(&mut self, pin: DigitalPin) -> Result<(), LinkError> {
        self.manager
            .with_link(|link| link.configure_digital_output(pin))
    }

    fn write_digital(&mut self, pin: DigitalPin, level: bool) -> Result<(), LinkError> {
        self.manager.with_link(|link| link.write_digital(pin, level))
    }
}

impl<L: HardwareLink + Send> AnalogSource for LinkHandle<L> {
    fn configure_analog_input(
        &mut self,
        pin: AnalogPin,
        on_change: AnalogCallback,
    ) -> Result<(), LinkError> {
        self.manager
            .with_link(|link| link.configure_analog_input(pin, on_change))
    }
}
