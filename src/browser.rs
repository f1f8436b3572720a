//! Browser bindings for the platform seams: console logging, `localStorage`,
//! `performance.now()` and a `setInterval` pump.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{console, Performance, Storage, Window};

use crate::clock::Clock;
use crate::error::StoreError;
use crate::pump::Pump;
use crate::storage::{KeyValueStore, MemoryStore};

struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            log::Level::Error => console::error_1(&line),
            log::Level::Warn => console::warn_1(&line),
            log::Level::Info => console::info_1(&line),
            _ => console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

pub fn init_logging(level: log::LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

fn js_err(e: JsValue) -> StoreError {
    StoreError::Unavailable(e.as_string().unwrap_or_else(|| format!("{:?}", e)))
}

pub struct PerformanceClock {
    performance: Performance,
}

impl PerformanceClock {
    pub fn new(window: &Window) -> Result<Self, JsValue> {
        let performance = window
            .performance()
            .ok_or_else(|| JsValue::from_str("performance timer unavailable"))?;
        Ok(Self { performance })
    }
}

impl Clock for PerformanceClock {
    fn now_ms(&self) -> u64 {
        self.performance.now() as u64
    }
}

pub struct LocalStorageStore {
    storage: Storage,
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage.get_item(key).map_err(js_err)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage.set_item(key, value).map_err(js_err)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.storage.remove_item(key).map_err(js_err)
    }
}

/// `localStorage` when the page may use it, otherwise an in-memory store so
/// the stopwatch still works for the life of the page.
pub fn local_storage(window: &Window) -> Box<dyn KeyValueStore> {
    match window.local_storage() {
        Ok(Some(storage)) => Box::new(LocalStorageStore { storage }),
        Ok(None) => {
            log::warn!("localStorage unavailable, history will not persist");
            Box::new(MemoryStore::new())
        }
        Err(e) => {
            log::warn!("localStorage blocked ({:?}), history will not persist", e);
            Box::new(MemoryStore::new())
        }
    }
}

/// Holds the tick callback. The pump is built before the app it calls into,
/// so the callback is bound afterwards.
#[derive(Clone, Default)]
pub struct TickSlot {
    callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
}

impl TickSlot {
    pub fn bind(&self, callback: Closure<dyn FnMut()>) {
        *self.callback.borrow_mut() = Some(callback);
    }
}

pub struct IntervalPump {
    window: Window,
    tick: TickSlot,
    handle: Option<i32>,
}

impl IntervalPump {
    pub fn new(window: Window, tick: TickSlot) -> Self {
        Self { window, tick, handle: None }
    }
}

impl Pump for IntervalPump {
    fn start(&mut self, interval_ms: u32) {
        if self.handle.is_some() {
            return;
        }
        let callback = self.tick.callback.borrow();
        let Some(callback) = callback.as_ref() else {
            log::error!("pump started before a tick callback was bound");
            return;
        };
        match self.window.set_interval_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            interval_ms as i32,
        ) {
            Ok(handle) => self.handle = Some(handle),
            Err(e) => log::error!("Failed to start display refresh: {:?}", e),
        }
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.window.clear_interval_with_handle(handle);
        }
    }
}

impl Drop for IntervalPump {
    fn drop(&mut self) {
        self.stop();
    }
}
