//! `requestAnimationFrame` loop with explicit cancellation.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

type FrameCallback = Closure<dyn FnMut(f64)>;

/// Calls `on_frame` once per display refresh until it returns `false` or the
/// loop is stopped. Dropping the loop stops it.
pub struct FrameLoop {
    /// The closure re-requests itself through this slot. Taking it out breaks
    /// the `Rc` cycle and frees the closure.
    callback: Rc<RefCell<Option<FrameCallback>>>,
    request_id: Rc<Cell<Option<i32>>>,
}

fn window() -> Result<web_sys::Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no global `window`"))
}

fn request_frame(callback: &FrameCallback) -> Result<i32, JsValue> {
    window()?.request_animation_frame(callback.as_ref().unchecked_ref())
}

impl FrameLoop {
    pub fn start(mut on_frame: impl FnMut() -> bool + 'static) -> Result<Self, JsValue> {
        let callback: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));
        let request_id = Rc::new(Cell::new(None));

        let next = Rc::clone(&callback);
        let id = Rc::clone(&request_id);
        *callback.borrow_mut() = Some(Closure::new(move |_timestamp: f64| {
            id.set(None);
            if !on_frame() {
                return;
            }
            if let Some(cb) = next.borrow().as_ref() {
                match request_frame(cb) {
                    Ok(handle) => id.set(Some(handle)),
                    Err(err) => log::error!("sakura: requestAnimationFrame failed: {:?}", err),
                }
            }
        }));

        if let Some(cb) = callback.borrow().as_ref() {
            request_id.set(Some(request_frame(cb)?));
        }

        Ok(Self { callback, request_id })
    }

    /// True while a frame is pending.
    pub fn is_active(&self) -> bool {
        self.request_id.get().is_some()
    }

    /// Cancel the pending frame and release the callback.
    pub fn stop(&mut self) {
        if let Some(handle) = self.request_id.take() {
            if let Ok(win) = window() {
                if let Err(err) = win.cancel_animation_frame(handle) {
                    log::warn!("sakura: cancelAnimationFrame failed: {:?}", err);
                }
            }
        }
        self.callback.borrow_mut().take();
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
