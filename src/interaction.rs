//! In-camera interaction: drag to pan, wheel to zoom, pinch to zoom.
//!
//! `InteractionHandlers` is a subscription bundle: `attach` registers every
//! listener and hands back the owning struct, `dispose` removes exactly what
//! was added. The camera session holds at most one bundle, so repeated
//! session starts cannot stack listeners.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    AddEventListenerOptions, HtmlElement, PointerEvent, TouchEvent, TouchList, WheelEvent, Window,
};

use crate::model::Transform;
use crate::state::GestureState;

/// Re-applies the shared transform to the viewer's inline style. Called after
/// every pan/zoom mutation; style failures are ignored.
pub fn apply_transform(viewer: &HtmlElement, tf: &Transform) {
    let _ = viewer.style().set_property("transform", &tf.css());
}

fn pinch_distance(touches: &TouchList) -> Option<f64> {
    let t0 = touches.item(0)?;
    let t1 = touches.item(1)?;
    let dx = (t1.client_x() - t0.client_x()) as f64;
    let dy = (t1.client_y() - t0.client_y()) as f64;
    Some((dx * dx + dy * dy).sqrt())
}

pub struct InteractionHandlers {
    viewer: HtmlElement,
    window: Window,
    pointer_down: Closure<dyn FnMut(PointerEvent)>,
    pointer_move: Closure<dyn FnMut(PointerEvent)>,
    pointer_up: Closure<dyn FnMut(PointerEvent)>,
    wheel: Closure<dyn FnMut(WheelEvent)>,
    touch_start: Closure<dyn FnMut(TouchEvent)>,
    touch_move: Closure<dyn FnMut(TouchEvent)>,
    touch_end: Closure<dyn FnMut(TouchEvent)>,
}

impl InteractionHandlers {
    /// Wires pointer events on the viewer (move/up on the window so drags
    /// survive leaving the element), non-passive wheel, and passive touch
    /// listeners for pinch zoom.
    pub fn attach(
        viewer: &HtmlElement,
        transform: Rc<RefCell<Transform>>,
        gesture: Rc<RefCell<GestureState>>,
    ) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let _ = viewer.style().set_property("touch-action", "none");

        let pointer_down = {
            let viewer = viewer.clone();
            let transform = transform.clone();
            let gesture = gesture.clone();
            Closure::wrap(Box::new(move |e: PointerEvent| {
                gesture.borrow_mut().begin_drag(
                    e.client_x() as f64,
                    e.client_y() as f64,
                    &transform.borrow(),
                );
                let _ = viewer.set_pointer_capture(e.pointer_id());
            }) as Box<dyn FnMut(_)>)
        };

        let pointer_move = {
            let viewer = viewer.clone();
            let transform = transform.clone();
            let gesture = gesture.clone();
            Closure::wrap(Box::new(move |e: PointerEvent| {
                let mut tf = transform.borrow_mut();
                if gesture.borrow().drag_to(e.client_x() as f64, e.client_y() as f64, &mut tf) {
                    apply_transform(&viewer, &tf);
                }
            }) as Box<dyn FnMut(_)>)
        };

        let pointer_up = {
            let gesture = gesture.clone();
            Closure::wrap(Box::new(move |_e: PointerEvent| {
                gesture.borrow_mut().end_drag();
            }) as Box<dyn FnMut(_)>)
        };

        let wheel = {
            let viewer = viewer.clone();
            let transform = transform.clone();
            Closure::wrap(Box::new(move |e: WheelEvent| {
                e.prevent_default();
                let mut tf = transform.borrow_mut();
                tf.zoom_by_wheel(e.delta_y());
                apply_transform(&viewer, &tf);
            }) as Box<dyn FnMut(_)>)
        };

        let touch_start = {
            let transform = transform.clone();
            let gesture = gesture.clone();
            Closure::wrap(Box::new(move |e: TouchEvent| {
                if e.touches().length() == 2 {
                    if let Some(dist) = pinch_distance(&e.touches()) {
                        gesture.borrow_mut().begin_pinch(dist, &transform.borrow());
                    }
                }
            }) as Box<dyn FnMut(_)>)
        };

        let touch_move = {
            let viewer = viewer.clone();
            let transform = transform.clone();
            let gesture = gesture.clone();
            Closure::wrap(Box::new(move |e: TouchEvent| {
                if e.touches().length() == 2 {
                    if let Some(dist) = pinch_distance(&e.touches()) {
                        let mut tf = transform.borrow_mut();
                        if gesture.borrow().pinch_to(dist, &mut tf) {
                            apply_transform(&viewer, &tf);
                        }
                    }
                }
            }) as Box<dyn FnMut(_)>)
        };

        let touch_end = {
            let gesture = gesture.clone();
            Closure::wrap(Box::new(move |_e: TouchEvent| {
                gesture.borrow_mut().end_pinch();
            }) as Box<dyn FnMut(_)>)
        };

        viewer
            .add_event_listener_with_callback("pointerdown", pointer_down.as_ref().unchecked_ref())?;
        window
            .add_event_listener_with_callback("pointermove", pointer_move.as_ref().unchecked_ref())?;
        window.add_event_listener_with_callback("pointerup", pointer_up.as_ref().unchecked_ref())?;
        let wheel_opts = AddEventListenerOptions::new();
        wheel_opts.set_passive(false);
        viewer.add_event_listener_with_callback_and_add_event_listener_options(
            "wheel",
            wheel.as_ref().unchecked_ref(),
            &wheel_opts,
        )?;
        let touch_opts = AddEventListenerOptions::new();
        touch_opts.set_passive(true);
        viewer.add_event_listener_with_callback_and_add_event_listener_options(
            "touchstart",
            touch_start.as_ref().unchecked_ref(),
            &touch_opts,
        )?;
        viewer.add_event_listener_with_callback_and_add_event_listener_options(
            "touchmove",
            touch_move.as_ref().unchecked_ref(),
            &touch_opts,
        )?;
        viewer.add_event_listener_with_callback_and_add_event_listener_options(
            "touchend",
            touch_end.as_ref().unchecked_ref(),
            &touch_opts,
        )?;

        Ok(Self {
            viewer: viewer.clone(),
            window,
            pointer_down,
            pointer_move,
            pointer_up,
            wheel,
            touch_start,
            touch_move,
            touch_end,
        })
    }

    /// Removes every listener registered by `attach` and restores the
    /// viewer's touch-action. Consumes the bundle; the closures drop here.
    pub fn dispose(self) {
        let _ = self.viewer.remove_event_listener_with_callback(
            "pointerdown",
            self.pointer_down.as_ref().unchecked_ref(),
        );
        let _ = self.window.remove_event_listener_with_callback(
            "pointermove",
            self.pointer_move.as_ref().unchecked_ref(),
        );
        let _ = self.window.remove_event_listener_with_callback(
            "pointerup",
            self.pointer_up.as_ref().unchecked_ref(),
        );
        let _ = self
            .viewer
            .remove_event_listener_with_callback("wheel", self.wheel.as_ref().unchecked_ref());
        let _ = self.viewer.remove_event_listener_with_callback(
            "touchstart",
            self.touch_start.as_ref().unchecked_ref(),
        );
        let _ = self.viewer.remove_event_listener_with_callback(
            "touchmove",
            self.touch_move.as_ref().unchecked_ref(),
        );
        let _ = self.viewer.remove_event_listener_with_callback(
            "touchend",
            self.touch_end.as_ref().unchecked_ref(),
        );
        let _ = self.viewer.style().remove_property("touch-action");
    }
}
