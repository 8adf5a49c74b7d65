use wasm_bindgen::JsValue;
use web_sys::Element;
use yew::AppHandle;
use yew::prelude::*;

use crate::error::DisplayError;

#[derive(Properties, PartialEq, Clone)]
pub struct TzBadgeProps {
    pub time_zone: AttrValue,
}

#[function_component(TzBadge)]
pub fn tz_badge(props: &TzBadgeProps) -> Html {
    html! {<span style="margin-left:6px; font-size:0.9em; color:#555;">{ badge_text(&props.time_zone) }</span>}
}

pub fn badge_text(time_zone: &str) -> String {
    format!("(Your TZ: {})", time_zone)
}

/// IANA name of the viewer's zone as the browser resolves it.
pub fn browser_time_zone() -> Option<String> {
    let format = js_sys::Intl::DateTimeFormat::new(&js_sys::Array::new(), &js_sys::Object::new());
    let options = format.resolved_options();
    js_sys::Reflect::get(&options, &JsValue::from_str("timeZone"))
        .ok()?
        .as_string()
}

/// A mounted badge. Dropping it unmounts the app and removes its host span.
pub struct BadgeHandle {
    host: Element,
    app: Option<AppHandle<TzBadge>>,
}

impl Drop for BadgeHandle {
    fn drop(&mut self) {
        if let Some(app) = self.app.take() {
            app.destroy();
        }
        self.host.remove();
    }
}

/// Appends the badge after `anchor` inside its parent. `None` when the
/// anchor is detached.
pub fn mount(anchor: &Element, time_zone: String) -> Result<Option<BadgeHandle>, DisplayError> {
    let Some(parent) = anchor.parent_element() else {
        return Ok(None);
    };
    let document = anchor.owner_document().ok_or(DisplayError::NoDocument)?;
    let host = document.create_element("span")?;
    host.set_class_name("tz-badge");
    parent.append_child(&host)?;
    let app = yew::Renderer::<TzBadge>::with_root_and_props(
        host.clone(),
        TzBadgeProps {
            time_zone: time_zone.into(),
        },
    )
    .render();
    Ok(Some(BadgeHandle {
        host,
        app: Some(app),
    }))
}
