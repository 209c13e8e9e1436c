pub mod dom;
pub mod frame;
pub mod runner;

pub use dom::DomSurface;
pub use frame::FrameLoop;
pub use runner::PetalRunner;

use std::cell::RefCell;

use sakura_engine::FieldConfig;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// A window event listener kept alive until teardown.
struct Listener {
    event: &'static str,
    closure: Closure<dyn FnMut()>,
}

thread_local! {
    static RUNNER: RefCell<Option<PetalRunner<DomSurface>>> = RefCell::new(None);
    static FRAME_LOOP: RefCell<Option<FrameLoop>> = RefCell::new(None);
    static LISTENERS: RefCell<Vec<Listener>> = RefCell::new(Vec::new());
}

fn with_runner<R>(f: impl FnOnce(&mut PetalRunner<DomSurface>) -> R) -> Option<R> {
    RUNNER.with(|cell| cell.borrow_mut().as_mut().map(f))
}

fn window() -> Result<web_sys::Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no global `window`"))
}

fn listen(event: &'static str, handler: impl FnMut() + 'static) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut()>::new(handler);
    window()?.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    LISTENERS.with(|cell| cell.borrow_mut().push(Listener { event, closure }));
    Ok(())
}

fn remove_listeners() {
    let listeners = LISTENERS.with(|cell| std::mem::take(&mut *cell.borrow_mut()));
    let Ok(win) = window() else {
        return;
    };
    for Listener { event, closure } in listeners {
        if let Err(err) = win.remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
            log::warn!("sakura: failed to remove {} listener: {:?}", event, err);
        }
    }
}

/// Build the DOM surface, attach petals and start the frame loop.
fn boot(config: FieldConfig) -> Result<(), JsValue> {
    let mut runner = PetalRunner::new(config, DomSurface::new()?);
    runner.start()?;
    RUNNER.with(|cell| *cell.borrow_mut() = Some(runner));

    listen("resize", || {
        if let Some(Err(err)) = with_runner(|r| r.resize()) {
            log::error!("sakura: resize failed: {:?}", err);
        }
    })?;

    let frame_loop = FrameLoop::start(|| match with_runner(|r| r.frame()) {
        Some(Ok(())) => true,
        Some(Err(err)) => {
            log::error!("sakura: frame failed, stopping: {:?}", err);
            false
        }
        None => false,
    })?;
    FRAME_LOOP.with(|cell| *cell.borrow_mut() = Some(frame_loop));
    Ok(())
}

/// Cancel the frame loop, drop listeners and detach every petal.
fn teardown() -> Result<(), JsValue> {
    FRAME_LOOP.with(|cell| cell.borrow_mut().take());
    remove_listeners();
    match RUNNER.with(|cell| cell.borrow_mut().take()) {
        Some(mut runner) => runner.stop(),
        None => Ok(()),
    }
}

/// Start the petal effect.
///
/// `config_json` overrides any subset of [`FieldConfig`]. `seed` fixes the
/// random sequence; by default the current time is used. If the page has not
/// finished loading yet, the effect starts on the window `load` event.
/// Calling again replaces the running effect.
#[wasm_bindgen]
pub fn sakura_init(config_json: Option<String>, seed: Option<f64>) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let config = match config_json {
        Some(json) => FieldConfig::from_json(&json)
            .map_err(|e| JsValue::from_str(&format!("invalid sakura config: {}", e)))?,
        None => FieldConfig::default(),
    };
    let config = config.with_seed(seed.unwrap_or_else(js_sys::Date::now) as u64);

    teardown()?;

    let document = window()?
        .document()
        .ok_or_else(|| JsValue::from_str("window has no document"))?;
    if document.ready_state() == "complete" {
        boot(config)?;
        log::info!("sakura: initialized");
    } else {
        let mut pending = Some(config);
        listen("load", move || {
            let Some(config) = pending.take() else {
                return;
            };
            match boot(config) {
                Ok(()) => log::info!("sakura: initialized on load"),
                Err(err) => log::error!("sakura: start failed: {:?}", err),
            }
        })?;
    }
    Ok(())
}

/// Stop the effect and remove every petal from the page.
#[wasm_bindgen]
pub fn sakura_stop() -> Result<(), JsValue> {
    teardown()
}

#[cfg(feature = "autostart")]
#[wasm_bindgen(start)]
pub fn sakura_autostart() -> Result<(), JsValue> {
    sakura_init(None, None)
}

// ---- Data accessors ----

#[wasm_bindgen]
pub fn sakura_is_running() -> bool {
    with_runner(|r| r.is_running()).unwrap_or(false)
}

#[wasm_bindgen]
pub fn sakura_frame_count() -> f64 {
    with_runner(|r| r.frame_count() as f64).unwrap_or(0.0)
}

/// Pointer to the petal instance buffer (6 floats per petal) in WASM memory.
#[wasm_bindgen]
pub fn sakura_instances_ptr() -> *const f32 {
    with_runner(|r| r.instances_ptr()).unwrap_or(std::ptr::null())
}

#[wasm_bindgen]
pub fn sakura_instance_count() -> u32 {
    with_runner(|r| r.instance_count()).unwrap_or(0)
}
