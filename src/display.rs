//! Page lifecycle: bootstrap on load, checkbox listener, countdown ticker
//! and teardown.

use std::cell::RefCell;

use chrono::Utc;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Event, EventTarget, HtmlInputElement, Window};

use crate::components::tz_badge::{self, BadgeHandle};
use crate::dom::DomPage;
use crate::error::DisplayError;
use crate::model::Config;
use crate::refresh;

pub const CONFIG_SCRIPT_ID: &str = "timestamp-display-config";
pub const TOGGLE_GLOBAL: &str = "toggleBrowserTZ";

/// Repeating timer, cleared on drop.
pub struct Interval {
    window: Window,
    id: i32,
    _callback: Closure<dyn FnMut()>,
}

impl Interval {
    pub fn start(
        window: &Window,
        millis: u32,
        tick: impl FnMut() + 'static,
    ) -> Result<Self, DisplayError> {
        let callback = Closure::wrap(Box::new(tick) as Box<dyn FnMut()>);
        let timeout = i32::try_from(millis).unwrap_or(i32::MAX);
        let id = window.set_interval_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            timeout,
        )?;
        Ok(Self {
            window: window.clone(),
            id,
            _callback: callback,
        })
    }
}

impl Drop for Interval {
    fn drop(&mut self) {
        self.window.clear_interval_with_handle(self.id);
    }
}

/// Event listener, removed on drop.
pub struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    pub fn add(
        target: &EventTarget,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, DisplayError> {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            event,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}

/// Function installed as a property of `window`, deleted on drop.
pub struct GlobalHook {
    window: Window,
    name: &'static str,
    _callback: Closure<dyn FnMut(JsValue)>,
}

impl GlobalHook {
    pub fn set(
        window: &Window,
        name: &'static str,
        hook: impl FnMut(JsValue) + 'static,
    ) -> Result<Self, DisplayError> {
        let callback = Closure::wrap(Box::new(hook) as Box<dyn FnMut(JsValue)>);
        js_sys::Reflect::set(window, &JsValue::from_str(name), callback.as_ref())?;
        Ok(Self {
            window: window.clone(),
            name,
            _callback: callback,
        })
    }
}

impl Drop for GlobalHook {
    fn drop(&mut self) {
        let _ = js_sys::Reflect::delete_property(&self.window, &JsValue::from_str(self.name));
    }
}

/// Everything the display attached to the page. Dropping it detaches it.
pub struct TimestampDisplay {
    _ticker: Interval,
    _toggle: Option<Listener>,
    _global_toggle: GlobalHook,
    _badge: Option<BadgeHandle>,
}

impl TimestampDisplay {
    pub fn install(config: &Config) -> Result<Self, DisplayError> {
        let window = web_sys::window().ok_or(DisplayError::NoWindow)?;
        let page = DomPage::new(window.document().ok_or(DisplayError::NoDocument)?);
        let anchor = page.element_by_id(&config.toggle_id);

        let badge = match (&anchor, config.show_tz_badge) {
            (Some(anchor), true) => match tz_badge::browser_time_zone() {
                Some(tz) => tz_badge::mount(anchor, tz)?,
                None => None,
            },
            _ => None,
        };

        let toggle = match anchor.and_then(|a| a.dyn_into::<HtmlInputElement>().ok()) {
            Some(checkbox) => {
                // the browser may restore a checked box on reload
                if checkbox.checked() {
                    refresh::toggle_browser_tz(&page, true);
                }
                let page = page.clone();
                Some(Listener::add(&checkbox, "change", move |event: Event| {
                    if let Some(target) = event.target() {
                        toggle_from_checkbox(&page, &target);
                    }
                })?)
            }
            None => {
                log::debug!("no #{} checkbox, toggle not wired", config.toggle_id);
                None
            }
        };

        // inline `onchange="toggleBrowserTZ(this)"` markup resolves this global
        let global_toggle = {
            let page = page.clone();
            GlobalHook::set(&window, TOGGLE_GLOBAL, move |checkbox: JsValue| {
                toggle_from_checkbox(&page, &checkbox);
            })?
        };

        let ticked = refresh::tick_due_in(&page, &Utc::now());
        let filled = refresh::fill_due_browser(&page);
        log::debug!("initial pass: {} countdowns, {} browser cells", ticked, filled);

        let ticker = {
            let page = page.clone();
            Interval::start(&window, config.tick_interval_ms, move || {
                let n = refresh::tick_due_in(&page, &Utc::now());
                log::trace!("ticked {} countdowns", n);
            })?
        };

        Ok(Self {
            _ticker: ticker,
            _toggle: toggle,
            _global_toggle: global_toggle,
            _badge: badge,
        })
    }

    pub fn teardown(self) {
        drop(self);
        log::debug!("timestamp display torn down");
    }
}

fn toggle_from_checkbox(page: &DomPage, checkbox: &JsValue) {
    let checked = match checkbox.dyn_ref::<HtmlInputElement>() {
        Some(input) => input.checked(),
        None => js_sys::Reflect::get(checkbox, &JsValue::from_str("checked"))
            .ok()
            .and_then(|v| v.as_bool())
            .unwrap_or(false),
    };
    let n = refresh::toggle_browser_tz(page, checked);
    log::debug!("browser tz {} on {} cells", checked, n);
}

thread_local! {
    static INSTALLED: RefCell<Option<TimestampDisplay>> = const { RefCell::new(None) };
}

/// Installs the display once the document is parsed.
pub fn install_on_load() {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        log::warn!("{}", DisplayError::NoDocument);
        return;
    };
    if document.ready_state() == "loading" {
        let once = Closure::once_into_js(install_now);
        if let Err(e) =
            document.add_event_listener_with_callback("DOMContentLoaded", once.unchecked_ref())
        {
            log::warn!("{}", DisplayError::from(e));
        }
    } else {
        install_now();
    }
}

fn install_now() {
    let config = load_config();
    match TimestampDisplay::install(&config) {
        Ok(display) => {
            let previous = INSTALLED.with(|slot| slot.borrow_mut().replace(display));
            if let Some(previous) = previous {
                previous.teardown();
            }
        }
        Err(e) => log::warn!("timestamp display not installed: {}", e),
    }
}

fn load_config() -> Config {
    let raw = DomPage::current()
        .ok()
        .and_then(|page| page.element_by_id(CONFIG_SCRIPT_ID))
        .and_then(|el| el.text_content());
    match raw {
        Some(raw) => Config::from_json(&raw).unwrap_or_else(|e| {
            log::warn!("{}, using defaults", e);
            Config::default()
        }),
        None => Config::default(),
    }
}

/// Releases the installed display, for hosts that swap pages in place.
#[wasm_bindgen(js_name = teardownTimestampDisplay)]
pub fn teardown_timestamp_display() {
    let installed = INSTALLED.with(|slot| slot.borrow_mut().take());
    if let Some(display) = installed {
        display.teardown();
    }
}
