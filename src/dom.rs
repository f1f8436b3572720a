use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Window};

use crate::config::StopwatchConfig;
use crate::ui::{self, LapRow, Screen, SessionRow, View};

pub const ROOT_ID: &str = "stopwatch";
pub const DISPLAY_ID: &str = "display";
pub const START_ID: &str = "startBtn";
pub const PAUSE_ID: &str = "pauseBtn";
pub const RESET_ID: &str = "resetBtn";
pub const LAP_ID: &str = "lapBtn";
pub const LAPS_ID: &str = "laps";
pub const SESSIONS_ID: &str = "sessions";
pub const CLEAR_ID: &str = "clearHistoryBtn";
pub const MODAL_ID: &str = "confirmModal";
pub const MODAL_TITLE_ID: &str = "confirmTitle";
pub const MODAL_MESSAGE_ID: &str = "confirmMessage";
pub const CONFIRM_ID: &str = "confirmClearBtn";
pub const CANCEL_ID: &str = "cancelClearBtn";

/// Attribute carrying a session row's position in the history.
pub const SESSION_INDEX_ATTR: &str = "data-index";

const HIDDEN: &str = "hidden";
const SHOW: &str = "show";

pub fn element(document: &Document, id: &str) -> Result<Element, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing element #{}", id)))
}

pub struct DomView {
    window: Window,
    document: Document,
    display: Element,
    start_btn: Element,
    pause_btn: Element,
    lap_btn: Element,
    clear_btn: Element,
    laps_list: Element,
    sessions_list: Element,
    modal: Element,
    modal_visible: bool,
    // Bumped on every modal transition so a late timeout from an older one
    // does nothing.
    modal_generation: Rc<Cell<u32>>,
    show_delay_ms: u32,
    hide_delay_ms: u32,
}

impl DomView {
    pub fn new(window: Window, document: Document, config: &StopwatchConfig) -> Result<Self, JsValue> {
        element(&document, MODAL_TITLE_ID)?.set_text_content(Some(ui::CONFIRM_TITLE));
        element(&document, MODAL_MESSAGE_ID)?.set_text_content(Some(ui::CONFIRM_MESSAGE));
        Ok(Self {
            display: element(&document, DISPLAY_ID)?,
            start_btn: element(&document, START_ID)?,
            pause_btn: element(&document, PAUSE_ID)?,
            lap_btn: element(&document, LAP_ID)?,
            clear_btn: element(&document, CLEAR_ID)?,
            laps_list: element(&document, LAPS_ID)?,
            sessions_list: element(&document, SESSIONS_ID)?,
            modal: element(&document, MODAL_ID)?,
            modal_visible: false,
            modal_generation: Rc::new(Cell::new(0)),
            show_delay_ms: config.modal_show_delay_ms,
            hide_delay_ms: config.modal_hide_delay_ms,
            window,
            document,
        })
    }

    fn render(&mut self, screen: &Screen) -> Result<(), JsValue> {
        self.display.set_text_content(Some(&screen.display));

        let controls = &screen.controls;
        set_hidden(&self.start_btn, !controls.start_visible)?;
        set_hidden(&self.pause_btn, !controls.pause_visible)?;
        set_disabled(&self.lap_btn, !controls.lap_enabled)?;
        set_disabled(&self.clear_btn, !controls.clear_enabled)?;

        self.render_laps(&screen.laps)?;
        self.render_sessions(&screen.sessions)?;

        if screen.confirm_visible != self.modal_visible {
            self.modal_visible = screen.confirm_visible;
            if screen.confirm_visible {
                self.show_modal()?;
            } else {
                self.hide_modal()?;
            }
        }
        Ok(())
    }

    fn li(&self, class: &str) -> Result<Element, JsValue> {
        let li = self.document.create_element("li")?;
        li.set_class_name(class);
        Ok(li)
    }

    fn span(&self, class: &str, text: &str) -> Result<Element, JsValue> {
        let span = self.document.create_element("span")?;
        span.set_class_name(class);
        span.set_text_content(Some(text));
        Ok(span)
    }

    fn placeholder(&self, text: &str) -> Result<Element, JsValue> {
        let li = self.li("text-gray-500 text-center p-2")?;
        li.set_text_content(Some(text));
        Ok(li)
    }

    fn render_laps(&self, laps: &[LapRow]) -> Result<(), JsValue> {
        self.laps_list.set_inner_html("");
        if laps.is_empty() {
            self.laps_list.append_child(&self.placeholder(ui::NO_LAPS)?)?;
            return Ok(());
        }
        for lap in laps {
            let li = self.li("flex justify-between items-center p-2 bg-gray-800 rounded-md fade-in")?;
            li.append_child(&self.span("font-medium text-gray-400", &lap.label())?)?;
            li.append_child(&self.span("font-mono text-lg", &lap.time)?)?;
            self.laps_list.append_child(&li)?;
        }
        Ok(())
    }

    fn render_sessions(&self, sessions: &[SessionRow]) -> Result<(), JsValue> {
        self.sessions_list.set_inner_html("");
        if sessions.is_empty() {
            self.sessions_list.append_child(&self.placeholder(ui::NO_SESSIONS)?)?;
            return Ok(());
        }
        for row in sessions {
            let li = self.li("bg-gray-800 rounded-md p-3 cursor-pointer hover:bg-gray-700 transition")?;
            li.set_attribute(SESSION_INDEX_ATTR, &row.index.to_string())?;

            let header = self.document.create_element("div")?;
            header.set_class_name("flex justify-between items-center");
            let summary = self.document.create_element("div")?;
            let total = self.document.create_element("div")?;
            total.set_class_name("font-bold text-lg");
            total.set_text_content(Some(&row.total));
            let date = self.document.create_element("div")?;
            date.set_class_name("text-xs text-gray-400");
            date.set_text_content(Some(&row.recorded));
            summary.append_child(&total)?;
            summary.append_child(&date)?;
            header.append_child(&summary)?;
            header.append_child(&self.span("text-sm text-gray-500", &row.lap_summary())?)?;
            li.append_child(&header)?;

            let details = self.document.create_element("ul")?;
            details.set_class_name("laps-details mt-2 space-y-1 pl-4 border-l-2 border-gray-600");
            set_hidden(&details, !row.expanded)?;
            for lap in &row.laps {
                let item = self.li("flex justify-between text-sm")?;
                item.append_child(&self.span("text-gray-400", &lap.label())?)?;
                item.append_child(&self.span("", &lap.time)?)?;
                details.append_child(&item)?;
            }
            li.append_child(&details)?;
            self.sessions_list.append_child(&li)?;
        }
        Ok(())
    }

    fn next_generation(&self) -> u32 {
        let generation = self.modal_generation.get().wrapping_add(1);
        self.modal_generation.set(generation);
        generation
    }

    /// Un-hide first, then trigger the fade-in on the next beat.
    fn show_modal(&self) -> Result<(), JsValue> {
        let generation = self.next_generation();
        self.modal.class_list().remove_1(HIDDEN)?;
        let modal = self.modal.clone();
        let current = Rc::clone(&self.modal_generation);
        self.after(self.show_delay_ms, move || {
            if current.get() == generation {
                modal.class_list().add_1(SHOW).ok();
            }
        })
    }

    /// Fade out, then hide once the transition has run.
    fn hide_modal(&self) -> Result<(), JsValue> {
        let generation = self.next_generation();
        self.modal.class_list().remove_1(SHOW)?;
        let modal = self.modal.clone();
        let current = Rc::clone(&self.modal_generation);
        self.after(self.hide_delay_ms, move || {
            if current.get() == generation {
                modal.class_list().add_1(HIDDEN).ok();
            }
        })
    }

    fn after(&self, delay_ms: u32, f: impl FnOnce() + 'static) -> Result<(), JsValue> {
        let callback = Closure::once_into_js(f);
        self.window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay_ms as i32)?;
        Ok(())
    }
}

impl View for DomView {
    fn draw(&mut self, screen: &Screen) {
        if let Err(e) = self.render(screen) {
            log::error!("Failed to draw: {:?}", e);
        }
    }

    fn draw_clock(&mut self, display: &str) {
        self.display.set_text_content(Some(display));
    }
}

fn set_hidden(el: &Element, hidden: bool) -> Result<(), JsValue> {
    el.class_list().toggle_with_force(HIDDEN, hidden)?;
    Ok(())
}

fn set_disabled(el: &Element, disabled: bool) -> Result<(), JsValue> {
    if disabled {
        el.set_attribute("disabled", "")
    } else {
        el.remove_attribute("disabled")
    }
}
