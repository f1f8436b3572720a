use std::cell::Cell;
use std::rc::Rc;

/// A cancellable repeating task that drives the live display. Implementations
/// call back into the app's `handle_pump` once per interval until stopped.
/// The app guards start/stop itself, so a pump never sees two starts in a row.
pub trait Pump {
    fn start(&mut self, interval_ms: u32);
    fn stop(&mut self);
}

/// Counts start/stop requests instead of scheduling anything. Clones share
/// counters.
#[derive(Clone, Default)]
pub struct CountingPump {
    starts: Rc<Cell<usize>>,
    stops: Rc<Cell<usize>>,
    interval_ms: Rc<Cell<u32>>,
}

impl CountingPump {
    pub fn starts(&self) -> usize {
        self.starts.get()
    }

    pub fn stops(&self) -> usize {
        self.stops.get()
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms.get()
    }

    pub fn active(&self) -> bool {
        self.starts.get() > self.stops.get()
    }
}

impl Pump for CountingPump {
    fn start(&mut self, interval_ms: u32) {
        self.interval_ms.set(interval_ms);
        self.starts.set(self.starts.get() + 1);
    }

    fn stop(&mut self) {
        self.stops.set(self.stops.get() + 1);
    }
}
