//! DOM listeners that translate browser signals into [`SeaEvent`]s.

use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    CustomEvent, Document, Element, Event, EventTarget, HtmlAnchorElement, HtmlElement,
    MouseEvent, VisibilityState, Window,
};

use super::render::FrameLoop;
use super::SeaContext;
use crate::driver::{Directive, SeaEvent, Visibility};
use crate::navigation::{should_save_before_navigation, LinkTarget, SAVE_EVENT};

pub fn install(
    window: &Window,
    document: &Document,
    body: &HtmlElement,
    context: SeaContext,
    frames: FrameLoop,
) -> Result<(), JsValue> {
    let now = monotonic_clock(window);

    {
        let context = context.clone();
        let win = window.clone();
        let now = now.clone();
        listen(window, "resize", move |_| {
            let width = win.inner_width().ok().and_then(|w| w.as_f64()).unwrap_or(0.0);
            let height = win.inner_height().ok().and_then(|h| h.as_f64()).unwrap_or(0.0);
            // the painter resizes the canvas once the debounced rebuild lands
            dispatch(
                &context,
                SeaEvent::Resize {
                    width,
                    height,
                    timestamp: now(),
                },
            );
        })?;
    }

    {
        let context = context.clone();
        let now = now.clone();
        listen(document, "mousemove", move |event| {
            if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
                dispatch(
                    &context,
                    SeaEvent::PointerMove {
                        x: f64::from(mouse.client_x()),
                        y: f64::from(mouse.client_y()),
                        timestamp: now(),
                    },
                );
            }
        })?;
    }

    if let Some(root) = document.document_element() {
        let context = context.clone();
        listen(&root, "mouseleave", move |_| {
            dispatch(&context, SeaEvent::PointerLeave);
        })?;
    }

    {
        let context = context.clone();
        let now = now.clone();
        let period = context.borrow().sea().config().pointer.idle_check_ms;
        let tick = Closure::wrap(Box::new(move || {
            dispatch(&context, SeaEvent::IdleCheck { timestamp: now() });
        }) as Box<dyn FnMut()>);
        window.set_interval_with_callback_and_timeout_and_arguments_0(
            tick.as_ref().unchecked_ref(),
            period.max(1.0) as i32,
        )?;
        tick.forget();
    }

    {
        let context = context.clone();
        let doc = document.clone();
        listen(document, "visibilitychange", move |_| {
            let visibility = match doc.visibility_state() {
                VisibilityState::Hidden => Visibility::Hidden,
                _ => Visibility::Visible,
            };
            if dispatch(&context, SeaEvent::Visibility(visibility)) == Directive::ResumeLoop {
                if let Err(err) = frames.request() {
                    log::warn!("could not resume frame loop: {err:?}");
                }
            }
        })?;
    }

    for (target, name) in [
        (window.unchecked_ref::<EventTarget>(), "beforeunload"),
        (document.unchecked_ref::<EventTarget>(), "page:before-change"),
        (window.unchecked_ref::<EventTarget>(), SAVE_EVENT),
    ] {
        let context = context.clone();
        listen(target, name, move |_| {
            dispatch(&context, SeaEvent::SaveRequested);
        })?;
    }

    let win = window.clone();
    listen(body, "click", move |event| {
        if let Err(err) = save_before_navigation(&win, &event) {
            log::warn!("navigation save hook failed: {err:?}");
        }
    })?;

    Ok(())
}

fn dispatch(context: &SeaContext, event: SeaEvent) -> Directive {
    context
        .borrow_mut()
        .handle_event(event, js_sys::Date::now())
}

/// Raise the save event when the click lands on an internal link.
fn save_before_navigation(window: &Window, event: &Event) -> Result<(), JsValue> {
    let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
        return Ok(());
    };
    let Some(anchor) = target
        .closest("a")?
        .and_then(|a| a.dyn_into::<HtmlAnchorElement>().ok())
    else {
        return Ok(());
    };

    let href = anchor.get_attribute("href");
    let link_target = anchor.get_attribute("target");
    let origin = anchor.origin();
    let page_origin = window.location().origin()?;
    let link = LinkTarget {
        href: href.as_deref(),
        origin: &origin,
        page_origin: &page_origin,
        download: anchor.has_attribute("download"),
        target: link_target.as_deref(),
    };

    if should_save_before_navigation(&link) {
        window.dispatch_event(&CustomEvent::new(SAVE_EVENT)?)?;
    }
    Ok(())
}

fn listen<F>(target: &EventTarget, name: &str, handler: F) -> Result<(), JsValue>
where
    F: FnMut(Event) + 'static,
{
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// `performance.now()`, falling back to wall-clock time.
fn monotonic_clock(window: &Window) -> std::rc::Rc<dyn Fn() -> f64> {
    let performance = window.performance();
    std::rc::Rc::new(move || match &performance {
        Some(performance) => performance.now(),
        None => js_sys::Date::now(),
    })
}
