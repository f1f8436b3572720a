use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event};

use crate::app::StopwatchApp;
use crate::browser::{self, IntervalPump, PerformanceClock, TickSlot};
use crate::config::StopwatchConfig;
use crate::dom::{self, DomView};

type SharedApp = Rc<RefCell<StopwatchApp>>;

fn read_config(document: &Document) -> StopwatchConfig {
    let config = StopwatchConfig::default();
    match document.get_element_by_id(dom::ROOT_ID) {
        Some(root) => config
            .with_storage_key(root.get_attribute("data-storage-key").as_deref())
            .with_tick_interval(root.get_attribute("data-tick-ms").as_deref()),
        None => config,
    }
}

/// Runs `handler` on the app for every event of `kind` on element `id`.
fn listen<F>(document: &Document, id: &str, kind: &str, app: &SharedApp, handler: F) -> Result<(), JsValue>
where
    F: Fn(&mut StopwatchApp, &Event) + 'static,
{
    let target = dom::element(document, id)?;
    let app = Rc::clone(app);
    let callback = Closure::<dyn FnMut(Event)>::new(move |event: Event| match app.try_borrow_mut() {
        Ok(mut app) => handler(&mut app, &event),
        Err(_) => log::warn!("dropped event, app busy"),
    });
    target.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())?;
    // Listeners live as long as the page.
    callback.forget();
    Ok(())
}

fn session_index(event: &Event) -> Option<usize> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    let row = target
        .closest(&format!("li[{}]", dom::SESSION_INDEX_ATTR))
        .ok()??;
    row.get_attribute(dom::SESSION_INDEX_ATTR)?.parse().ok()
}

fn is_backdrop(event: &Event) -> bool {
    match (event.target(), event.current_target()) {
        (Some(target), Some(current)) => target == current,
        _ => false,
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    browser::init_logging(log::LevelFilter::Info);

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;
    let config = read_config(&document);
    log::info!(
        "stopwatch starting, key {:?}, tick {}ms",
        config.storage_key,
        config.tick_interval_ms
    );

    let clock = PerformanceClock::new(&window)?;
    let backend = browser::local_storage(&window);
    let tick = TickSlot::default();
    let pump = IntervalPump::new(window.clone(), tick.clone());
    let view = DomView::new(window.clone(), document.clone(), &config)?;

    let app: SharedApp = Rc::new(RefCell::new(StopwatchApp::new(
        config,
        Box::new(clock),
        backend,
        Box::new(pump),
        Box::new(view),
    )));

    // Weak: the pump holding this callback is owned by the app.
    let weak = Rc::downgrade(&app);
    tick.bind(Closure::<dyn FnMut()>::new(move || {
        let Some(app) = weak.upgrade() else { return };
        let Ok(mut app) = app.try_borrow_mut() else { return };
        app.handle_pump();
    }));

    listen(&document, dom::START_ID, "click", &app, |app, _| app.start())?;
    listen(&document, dom::PAUSE_ID, "click", &app, |app, _| app.pause())?;
    listen(&document, dom::RESET_ID, "click", &app, |app, _| app.reset())?;
    listen(&document, dom::LAP_ID, "click", &app, |app, _| app.record_lap())?;
    listen(&document, dom::CLEAR_ID, "click", &app, |app, _| app.request_clear_history())?;
    listen(&document, dom::CONFIRM_ID, "click", &app, |app, _| app.confirm_clear_history())?;
    listen(&document, dom::CANCEL_ID, "click", &app, |app, _| app.cancel_clear_history())?;
    listen(&document, dom::MODAL_ID, "click", &app, |app, event| {
        if is_backdrop(event) {
            app.cancel_clear_history();
        }
    })?;
    listen(&document, dom::SESSIONS_ID, "click", &app, |app, event| {
        if let Some(index) = session_index(event) {
            app.toggle_session(index);
        }
    })?;

    app.borrow_mut().init();
    Ok(())
}
