//! Camera session lifecycle: acquire the rear camera, overlay the viewer on
//! the feed, and tear everything back down.
//!
//! Start and stop are guarded by the session phase enum, so double invocation
//! is safe regardless of what the DOM currently shows. The entrance animation
//! is a chain of one-shot timeouts, each of which re-checks the shared
//! animation token so a later start or stop supersedes the stages still in
//! flight.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{
    AddEventListenerOptions, HtmlElement, HtmlVideoElement, MediaStream, MediaStreamConstraints,
    MediaStreamTrack, MediaTrackConstraints,
};

use crate::interaction::{InteractionHandlers, apply_transform};
use crate::model::Transform;
use crate::state::session::DomHome;
use crate::state::{AnimationToken, CameraSession, GestureState, SessionPhase};
use crate::storage::{LocalStore, load_transform, save_transform};

/// Page elements the camera session reads and relocates.
#[derive(Clone)]
pub struct ArDom {
    pub viewer: HtmlElement,
    pub ip_label: HtmlElement,
    /// The overlay showing the live feed; hidden while inactive.
    pub camera_surface: HtmlElement,
    /// Host element the viewer and label move into during a session.
    pub camera_container: HtmlElement,
    pub video: HtmlVideoElement,
}

/// Shared mutable state handed to event handlers instead of module globals,
/// so a page could host several independent viewers.
#[derive(Clone)]
pub struct ViewerCtx {
    pub transform: Rc<RefCell<Transform>>,
    pub gesture: Rc<RefCell<GestureState>>,
    pub session: Rc<RefCell<CameraSession>>,
    pub current_src: Rc<RefCell<String>>,
}

pub fn toggle_session(dom: &ArDom, ctx: &ViewerCtx) {
    let phase = ctx.session.borrow().phase;
    match phase {
        SessionPhase::Inactive => start_session(dom, ctx),
        SessionPhase::Active => stop_session(dom, ctx),
    }
}

/// Requests the camera and, once granted, brings the viewer into the feed.
/// Permission denial or missing device support logs a warning and leaves the
/// session inactive; there is no retry.
pub fn start_session(dom: &ArDom, ctx: &ViewerCtx) {
    if ctx.session.borrow().phase == SessionPhase::Active {
        return;
    }
    let dom = dom.clone();
    let ctx = ctx.clone();
    spawn_local(async move {
        match acquire_stream().await {
            Ok(stream) => enter_camera(&dom, &ctx, stream),
            Err(err) => log::warn!("camera access denied or unavailable: {:?}", err),
        }
    });
}

async fn acquire_stream() -> Result<MediaStream, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let devices = window.navigator().media_devices()?;
    let video = MediaTrackConstraints::new();
    video.set_facing_mode(&JsValue::from_str("environment"));
    let constraints = MediaStreamConstraints::new();
    constraints.set_video(&JsValue::from(video));
    constraints.set_audio(&JsValue::FALSE);
    let promise = devices.get_user_media_with_constraints(&constraints)?;
    JsFuture::from(promise).await?.dyn_into::<MediaStream>()
}

fn enter_camera(dom: &ArDom, ctx: &ViewerCtx, stream: MediaStream) {
    let mut session = ctx.session.borrow_mut();
    if session.phase == SessionPhase::Active {
        // A second start raced the permission prompt; drop the extra stream.
        stop_tracks(&stream);
        return;
    }
    session.phase = SessionPhase::Active;
    dom.video.set_src_object(Some(&stream));
    session.stream = Some(stream);
    let _ = dom.camera_surface.class_list().remove_1("hidden");

    session.viewer_home = dom_home_of(&dom.viewer);
    session.overlay_home = dom_home_of(&dom.ip_label);
    let _ = dom.camera_container.append_child(&dom.viewer);
    let _ = dom.camera_container.append_child(&dom.ip_label);
    let _ = dom.viewer.class_list().add_1("in-camera");
    let _ = dom.viewer.set_attribute("auto-rotate", "");

    // Orbit controls would fight the drag pan while overlaid.
    session.had_camera_controls = dom.viewer.has_attribute("camera-controls");
    if session.had_camera_controls {
        let _ = dom.viewer.remove_attribute("camera-controls");
    }

    {
        let mut tf = ctx.transform.borrow_mut();
        load_transform(&LocalStore, &ctx.current_src.borrow(), &mut tf);
        apply_transform(&dom.viewer, &tf);
    }

    match InteractionHandlers::attach(&dom.viewer, ctx.transform.clone(), ctx.gesture.clone()) {
        Ok(handlers) => session.handlers = Some(handlers),
        Err(err) => log::warn!("failed to attach interaction handlers: {:?}", err),
    }

    let token = session.animation.clone();
    drop(session);
    play_entrance(&dom.viewer, &ctx.transform, &token);
}

/// Stops the stream, persists the transform, and restores the viewer and
/// IP overlay to where they lived before the session.
pub fn stop_session(dom: &ArDom, ctx: &ViewerCtx) {
    let mut session = ctx.session.borrow_mut();
    if session.phase != SessionPhase::Active {
        return;
    }
    session.phase = SessionPhase::Inactive;
    session.animation.cancel();

    if let Some(stream) = session.stream.take() {
        stop_tracks(&stream);
    }
    dom.video.set_src_object(None);
    let _ = dom.camera_surface.class_list().add_1("hidden");

    save_transform(&LocalStore, &ctx.current_src.borrow(), &ctx.transform.borrow());

    let _ = dom.viewer.class_list().remove_1("in-camera");
    let style = dom.viewer.style();
    let _ = style.remove_property("transition");
    let _ = style.remove_property("opacity");

    if let Some(home) = session.viewer_home.take() {
        restore_home(&dom.viewer, &home);
    }
    if let Some(home) = session.overlay_home.take() {
        restore_home(&dom.ip_label, &home);
    }

    let _ = dom.viewer.set_attribute("auto-rotate", "");
    if session.had_camera_controls {
        let _ = dom.viewer.set_attribute("camera-controls", "");
    }
    session.had_camera_controls = false;

    if let Some(handlers) = session.handlers.take() {
        handlers.dispose();
    }
}

fn dom_home_of(el: &HtmlElement) -> Option<DomHome> {
    el.parent_element()
        .map(|parent| DomHome { parent, next_sibling: el.next_element_sibling() })
}

fn restore_home(el: &HtmlElement, home: &DomHome) {
    match &home.next_sibling {
        Some(sib) if sib.parent_element().as_ref() == Some(&home.parent) => {
            let _ = home.parent.insert_before(el, Some(sib));
        }
        _ => {
            let _ = home.parent.append_child(el);
        }
    }
}

fn stop_tracks(stream: &MediaStream) {
    for track in stream.get_tracks().iter() {
        track.unchecked_into::<MediaStreamTrack>().stop();
    }
}

/// Entrance animation: drop in from slightly above at 0.8 scale, fade in,
/// then overshoot and settle. Timings follow the overlay CSS transitions:
/// 380 ms transform / 320 ms opacity in, 160 ms overshoot, 140 ms settle,
/// and a 170 ms trailing delay before the transition override is cleared.
pub fn play_entrance(viewer: &HtmlElement, transform: &Rc<RefCell<Transform>>, token: &AnimationToken) {
    if !viewer.class_list().contains("in-camera") {
        return;
    }
    let Some(window) = web_sys::window() else {
        return;
    };
    let generation = token.begin();

    let style = viewer.style();
    let _ = style.set_property("transition", "none");
    let _ = style.set_property("opacity", "0");
    let _ = style.set_property("transform", "translate(-50%, -60%) scale(0.8)");
    // Force layout so the start state commits before the transition arms.
    let _ = viewer.get_bounding_client_rect();
    let _ = style.set_property(
        "transition",
        "transform 380ms cubic-bezier(.2,.9,.3,1), opacity 320ms ease",
    );
    apply_transform(viewer, &transform.borrow());
    let _ = style.set_property("opacity", "1");

    let on_end = {
        let viewer = viewer.clone();
        let transform = transform.clone();
        let token = token.clone();
        let window = window.clone();
        Closure::once_into_js(move || {
            if !token.is_current(generation) {
                return;
            }
            let tf = *transform.borrow();
            let tx = tf.css_translate();
            let overshoot = (tf.scale * 1.06).min(1.12);
            let style = viewer.style();
            let _ = style.set_property("transition", "transform 160ms ease");
            let _ = style.set_property("transform", &format!("{} scale({})", tx, overshoot));

            let settle = {
                let viewer = viewer.clone();
                let token = token.clone();
                let window = window.clone();
                Closure::once_into_js(move || {
                    if !token.is_current(generation) {
                        return;
                    }
                    let style = viewer.style();
                    let _ = style.set_property("transition", "transform 140ms ease");
                    let _ = style.set_property("transform", &format!("{} scale({})", tx, tf.scale));

                    let clear = {
                        let viewer = viewer.clone();
                        let token = token.clone();
                        Closure::once_into_js(move || {
                            if !token.is_current(generation) {
                                return;
                            }
                            let _ = viewer.style().remove_property("transition");
                        })
                    };
                    let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                        clear.unchecked_ref(),
                        170,
                    );
                })
            };
            let _ = window
                .set_timeout_with_callback_and_timeout_and_arguments_0(settle.unchecked_ref(), 160);
        })
    };
    let opts = AddEventListenerOptions::new();
    opts.set_once(true);
    let _ = viewer.add_event_listener_with_callback_and_add_event_listener_options(
        "transitionend",
        on_end.unchecked_ref(),
        &opts,
    );
}
