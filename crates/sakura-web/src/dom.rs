//! DOM surface: one absolutely positioned `div.sakura` per petal.

use sakura_engine::{PetalInstance, Surface, Viewport};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, Window};

const STYLE_ID: &str = "sakura-style";
const PETAL_CLASS: &str = "sakura";

/// Petal look: soft pink radial gradient, asymmetric petal outline,
/// a faint glow and a highlight on top.
const PETAL_CSS: &str = r#"
.sakura {
    position: fixed;
    pointer-events: none;
    z-index: 9999;
    background: radial-gradient(ellipse at center,
        rgba(255,220,230,0.9) 0%,
        rgba(255,180,200,0.7) 70%,
        rgba(255,160,180,0.4) 100%);
    border-radius: 70% 30% 70% 30% / 60% 40% 60% 40%;
    box-shadow: 0 0 6px rgba(255,255,255,0.6);
}
.sakura:before {
    content: '';
    position: absolute;
    top: 15%;
    left: 15%;
    width: 70%;
    height: 70%;
    border-radius: 50%;
    background: rgba(255,255,255,0.3);
}
"#;

pub struct DomSurface {
    window: Window,
    document: Document,
    body: HtmlElement,
}

impl DomSurface {
    pub fn new() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global `window`"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("window has no document"))?;
        let body = document
            .body()
            .ok_or_else(|| JsValue::from_str("document has no body"))?;

        let surface = Self { window, document, body };
        surface.inject_styles()?;
        Ok(surface)
    }

    /// Add the petal stylesheet to `<head>` unless a previous run already did.
    fn inject_styles(&self) -> Result<(), JsValue> {
        if self.document.get_element_by_id(STYLE_ID).is_some() {
            return Ok(());
        }
        let style = self.document.create_element("style")?;
        style.set_id(STYLE_ID);
        style.set_text_content(Some(PETAL_CSS));
        match self.document.head() {
            Some(head) => head.append_child(&style)?,
            None => self.body.append_child(&style)?,
        };
        log::debug!("sakura: injected petal styles");
        Ok(())
    }

    fn dimension(value: Result<JsValue, JsValue>) -> f32 {
        value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32
    }
}

impl Surface for DomSurface {
    type Handle = HtmlElement;
    type Error = JsValue;

    fn viewport(&self) -> Viewport {
        Viewport::new(
            Self::dimension(self.window.inner_width()),
            Self::dimension(self.window.inner_height()),
        )
    }

    fn attach(&mut self, petal: &PetalInstance) -> Result<HtmlElement, JsValue> {
        let element: HtmlElement = self.document.create_element("div")?.dyn_into()?;
        element.class_list().add_1(PETAL_CLASS)?;

        let style = element.style();
        style.set_property("width", &format!("{}px", petal.width))?;
        style.set_property("height", &format!("{}px", petal.height))?;
        style.set_property("opacity", &petal.opacity.to_string())?;

        self.draw(&element, petal)?;
        self.body.append_child(&element)?;
        Ok(element)
    }

    fn detach(&mut self, handle: HtmlElement) -> Result<(), JsValue> {
        handle.remove();
        Ok(())
    }

    fn draw(&mut self, handle: &HtmlElement, petal: &PetalInstance) -> Result<(), JsValue> {
        let style = handle.style();
        style.set_property("left", &format!("{}px", petal.x))?;
        style.set_property("top", &format!("{}px", petal.y))?;
        style.set_property("transform", &format!("rotate({}deg)", petal.rotation))?;
        Ok(())
    }
}
