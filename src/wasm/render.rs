use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{window, CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement};

use super::{SeaContext, CANVAS_ID};
use crate::driver::{Directive, SeaEvent};
use crate::glow::{paint_order, CreatureGlow, Illumination, PointerHalo};
use crate::sea::Sea;

/// Reuse the page's `#sea-background` canvas or insert a fixed, full-viewport
/// one behind the content.
pub fn mount_canvas(document: &Document, body: &HtmlElement) -> Result<HtmlCanvasElement, JsValue> {
    if let Some(existing) = document.get_element_by_id(CANVAS_ID) {
        return Ok(existing.dyn_into::<HtmlCanvasElement>()?);
    }

    let canvas = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()?;
    canvas.set_id(CANVAS_ID);
    let style = canvas.style();
    for (property, value) in [
        ("position", "fixed"),
        ("top", "0"),
        ("left", "0"),
        ("width", "100%"),
        ("height", "100%"),
        ("z-index", "-1"),
        ("pointer-events", "none"),
    ] {
        style.set_property(property, value)?;
    }
    body.prepend_with_node_1(&canvas)?;
    Ok(canvas)
}

/// Handle to the self-rescheduling animation-frame callback.
#[derive(Clone)]
pub struct FrameLoop {
    // The closure has to exist before it can reference itself, hence the
    // `Option` behind shared ownership.
    callback: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>,
}

impl FrameLoop {
    pub fn request(&self) -> Result<i32, JsValue> {
        let callback = self.callback.borrow();
        let callback = callback.as_ref().ok_or("frame loop not started")?;
        window()
            .ok_or("no window")?
            .request_animation_frame(callback.as_ref().unchecked_ref())
    }
}

/// Build the frame callback. Nothing runs until [`FrameLoop::request`].
pub fn start(canvas: HtmlCanvasElement, context: SeaContext) -> Result<FrameLoop, JsValue> {
    let ctx = canvas
        .get_context("2d")?
        .ok_or("2D canvas not supported")?
        .dyn_into::<CanvasRenderingContext2d>()?;
    let painter = Painter { canvas, ctx };

    let frames = FrameLoop {
        callback: Rc::new(RefCell::new(None)),
    };
    let next = frames.clone();
    *frames.callback.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
        let directive = context
            .borrow_mut()
            .handle_event(SeaEvent::Frame { timestamp }, js_sys::Date::now());
        if directive != Directive::Paint {
            log::debug!("frame loop halted while hidden");
            return;
        }

        if let Err(err) = painter.paint(context.borrow().sea()) {
            log::warn!("paint failed: {err:?}");
        }
        // schedule next
        if let Err(err) = next.request() {
            log::warn!("could not schedule next frame: {err:?}");
        }
    }) as Box<dyn FnMut(f64)>));

    Ok(frames)
}

struct Painter {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl Painter {
    fn paint(&self, sea: &Sea) -> Result<(), JsValue> {
        let bounds = sea.bounds();
        let (width, height) = (bounds.width.max(0.0) as u32, bounds.height.max(0.0) as u32);
        if self.canvas.width() != width || self.canvas.height() != height {
            self.canvas.set_width(width);
            self.canvas.set_height(height);
        }

        self.ctx.clear_rect(0.0, 0.0, bounds.width, bounds.height);
        self.ctx.set_fill_style_str("#000000");
        self.ctx.fill_rect(0.0, 0.0, bounds.width, bounds.height);

        if let Some(halo) = PointerHalo::new(sea.pointer(), sea.config()) {
            self.pointer_halo(&halo)?;
        }

        let creatures = sea.creatures();
        for index in paint_order(creatures) {
            let creature = &creatures[index];
            let glow = CreatureGlow::new(creature, sea.field(), sea.pointer(), sea.config());
            self.creature(&glow)?;

            if let Some(halo) = Illumination::new(
                creature,
                glow.wave_response,
                sea.field(),
                sea.pointer(),
                sea.config(),
                bounds.width,
                bounds.height,
            ) {
                self.halo(&halo)?;
            }
        }
        Ok(())
    }

    fn creature(&self, glow: &CreatureGlow) -> Result<(), JsValue> {
        let (x, y) = (glow.draw_x, glow.draw_y);
        let gradient = self
            .ctx
            .create_radial_gradient(x, y, 0.0, x, y, glow.glow_radius)?;
        gradient.add_color_stop(0.0, &glow.center_color())?;
        gradient.add_color_stop(0.4, &glow.mid_color())?;
        gradient.add_color_stop(1.0, &glow.outer_color())?;
        self.ctx.set_fill_style_canvas_gradient(&gradient);
        self.disc(x, y, glow.glow_radius)?;

        self.ctx.set_fill_style_str(&glow.core_color());
        self.disc(x, y, glow.core_radius)
    }

    fn halo(&self, halo: &Illumination) -> Result<(), JsValue> {
        let gradient = self.ctx.create_radial_gradient(
            halo.x,
            halo.y,
            halo.radius * 0.3,
            halo.x,
            halo.y,
            halo.radius,
        )?;
        gradient.add_color_stop(0.0, &halo.inner_color())?;
        gradient.add_color_stop(1.0, &halo.outer_color())?;
        self.ctx.set_fill_style_canvas_gradient(&gradient);
        self.disc(halo.x, halo.y, halo.radius)?;

        for highlight in &halo.highlights {
            self.ctx.set_fill_style_str(&halo.highlight_color(highlight));
            self.disc(highlight.x, highlight.y, highlight.radius)?;
        }
        Ok(())
    }

    fn pointer_halo(&self, halo: &PointerHalo) -> Result<(), JsValue> {
        self.ctx.set_stroke_style_str(PointerHalo::RING_COLOR);
        self.ctx.begin_path();
        self.ctx.arc(halo.x, halo.y, halo.reach, 0.0, TAU)?;
        self.ctx.stroke();

        self.ctx.set_fill_style_str(PointerHalo::CORE_COLOR);
        self.disc(halo.x, halo.y, halo.core_radius)
    }

    fn disc(&self, x: f64, y: f64, radius: f64) -> Result<(), JsValue> {
        self.ctx.begin_path();
        self.ctx.arc(x, y, radius.max(0.0), 0.0, TAU)?;
        self.ctx.fill();
        Ok(())
    }
}
