use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{window, CanvasRenderingContext2d, Document, HtmlCanvasElement, VisibilityState};

use crate::config::FrameConfig;
use crate::watchdog::{Recovery, Watchdog};

/// After each return to the tab, sample the canvas corner and reload the page
/// if nothing was drawn.
pub fn install(document: &Document, canvas: HtmlCanvasElement, config: &FrameConfig) -> Result<(), JsValue> {
    let watchdog = Rc::new(RefCell::new(Watchdog::new()));
    let delay_ms = config.watchdog_delay_ms.max(1.0) as i32;
    let side = config.watchdog_sample_px.max(1);

    let doc = document.clone();
    let on_visibility = Closure::wrap(Box::new(move || {
        if doc.visibility_state() != VisibilityState::Visible {
            return;
        }
        if !watchdog.borrow_mut().on_visible() {
            return;
        }

        let watchdog = watchdog.clone();
        let canvas = canvas.clone();
        let check = Closure::once_into_js(move || {
            let recovery = match sample(&canvas, side) {
                Ok(pixels) => watchdog.borrow_mut().check(&pixels),
                Err(err) => {
                    log::warn!("canvas sample failed: {err:?}");
                    watchdog.borrow_mut().check(&[])
                }
            };
            if recovery == Recovery::Reload {
                if let Some(window) = window() {
                    if let Err(err) = window.location().reload() {
                        log::warn!("page reload failed: {err:?}");
                    }
                }
            }
        });
        if let Some(window) = window() {
            if let Err(err) = window
                .set_timeout_with_callback_and_timeout_and_arguments_0(check.unchecked_ref(), delay_ms)
            {
                log::warn!("could not schedule render watchdog: {err:?}");
            }
        }
    }) as Box<dyn FnMut()>);

    document.add_event_listener_with_callback("visibilitychange", on_visibility.as_ref().unchecked_ref())?;
    on_visibility.forget();
    Ok(())
}

fn sample(canvas: &HtmlCanvasElement, side: u32) -> Result<Vec<u8>, JsValue> {
    let ctx = canvas
        .get_context("2d")?
        .ok_or("2D canvas not supported")?
        .dyn_into::<CanvasRenderingContext2d>()?;
    let side = f64::from(side);
    Ok(ctx.get_image_data(0.0, 0.0, side, side)?.data().0)
}
