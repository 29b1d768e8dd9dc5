//! Page wiring for the EduAR Net viewer: model selection, toolbar, the
//! simulated IP overlay, and the camera session lifecycle. All shared state
//! lives in `use_mut_ref` cells grouped into a `ViewerCtx`; the imperative
//! listeners are registered in a single mount effect with symmetric cleanup.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Event, HtmlElement, HtmlSelectElement, HtmlVideoElement, KeyboardEvent};
use yew::prelude::*;

use super::controls_panel::ControlsPanel;
use crate::camera::{self, ArDom, ViewerCtx};
use crate::interaction::apply_transform;
use crate::model::{MODELS, ModelDescriptor, Transform, model_by_src, model_index_by_src};
use crate::state::ip::REFRESH_INTERVAL_MS;
use crate::state::{CameraSession, GestureState, IpLabels};
use crate::storage::{LocalStore, load_transform, save_transform, switch_transform};

/// Switches the viewer to `model`: persists the outgoing transform, swaps the
/// source (marking it loading), re-enables auto-rotation, makes sure the
/// model has an IP entry and repaints the overlay, and applies whatever
/// transform the incoming model had saved.
fn select_model(
    dom: &ArDom,
    ctx: &ViewerCtx,
    ips: &Rc<RefCell<IpLabels>>,
    spinner: &HtmlElement,
    model: &ModelDescriptor,
) {
    let _ = spinner.class_list().remove_1("hidden");
    {
        let prev = ctx.current_src.borrow().clone();
        let mut tf = ctx.transform.borrow_mut();
        switch_transform(
            &LocalStore,
            (!prev.is_empty()).then_some(prev.as_str()),
            model.src,
            &mut tf,
        );
    }
    let _ = dom.viewer.set_attribute("src", model.src);
    *ctx.current_src.borrow_mut() = model.src.to_string();
    let _ = dom.viewer.set_attribute("auto-rotate", "");

    {
        let now = js_sys::Date::now();
        let mut ips = ips.borrow_mut();
        ips.ensure(model.id, now, &mut || js_sys::Math::random());
        if let Some(text) = ips.label_text(model.id, model.label, now) {
            dom.ip_label.set_text_content(Some(&text));
        }
    }

    if dom.viewer.class_list().contains("in-camera") {
        apply_transform(&dom.viewer, &ctx.transform.borrow());
    }
}

#[function_component(App)]
pub fn app() -> Html {
    let viewer_ref = use_node_ref();
    let select_ref = use_node_ref();
    let spinner_ref = use_node_ref();
    let ip_label_ref = use_node_ref();
    let camera_surface_ref = use_node_ref();
    let camera_container_ref = use_node_ref();
    let video_ref = use_node_ref();

    let transform = use_mut_ref(Transform::default);
    let gesture = use_mut_ref(GestureState::default);
    let session = use_mut_ref(CameraSession::default);
    let current_src = use_mut_ref(String::new);
    let ips = use_mut_ref(IpLabels::default);

    let ctx = ViewerCtx {
        transform: transform.clone(),
        gesture: gesture.clone(),
        session: session.clone(),
        current_src: current_src.clone(),
    };

    let resolve_dom = {
        let viewer_ref = viewer_ref.clone();
        let ip_label_ref = ip_label_ref.clone();
        let camera_surface_ref = camera_surface_ref.clone();
        let camera_container_ref = camera_container_ref.clone();
        let video_ref = video_ref.clone();
        move || -> Option<ArDom> {
            Some(ArDom {
                viewer: viewer_ref.cast::<HtmlElement>()?,
                ip_label: ip_label_ref.cast::<HtmlElement>()?,
                camera_surface: camera_surface_ref.cast::<HtmlElement>()?,
                camera_container: camera_container_ref.cast::<HtmlElement>()?,
                video: video_ref.cast::<HtmlVideoElement>()?,
            })
        }
    };

    // Mount effect: resolve elements, select the default model, and register
    // every page-level listener with a cleanup that removes them all again.
    {
        let resolve_dom = resolve_dom.clone();
        let select_ref = select_ref.clone();
        let spinner_ref = spinner_ref.clone();
        let ctx = ctx.clone();
        let ips = ips.clone();
        use_effect_with((), move |_| {
            let window = web_sys::window().expect("window");
            let document = window.document().expect("document");
            let dom = resolve_dom().expect("viewer elements");
            let select: HtmlSelectElement = select_ref.cast().expect("select");
            let spinner: HtmlElement = spinner_ref.cast().expect("spinner");

            select_model(&dom, &ctx, &ips, &spinner, &MODELS[0]);

            // Left/right arrows cycle the catalog, wrapping at the ends.
            let key_cb = {
                let dom = dom.clone();
                let ctx = ctx.clone();
                let ips = ips.clone();
                let spinner = spinner.clone();
                let select = select.clone();
                Closure::wrap(Box::new(move |e: KeyboardEvent| {
                    let delta = match e.key().as_str() {
                        "ArrowRight" => 1,
                        "ArrowLeft" => -1,
                        _ => return,
                    };
                    let Some(cur) = model_index_by_src(&ctx.current_src.borrow()) else {
                        return;
                    };
                    let len = MODELS.len() as i32;
                    let idx = (cur as i32 + delta).rem_euclid(len);
                    select.set_selected_index(idx);
                    select_model(&dom, &ctx, &ips, &spinner, &MODELS[idx as usize]);
                }) as Box<dyn FnMut(_)>)
            };
            window
                .add_event_listener_with_callback("keydown", key_cb.as_ref().unchecked_ref())
                .unwrap();

            // Pause auto-rotate while the tab is hidden.
            let vis_cb = {
                let viewer = dom.viewer.clone();
                let document = document.clone();
                Closure::wrap(Box::new(move |_e: Event| {
                    if document.hidden() {
                        let _ = viewer.remove_attribute("auto-rotate");
                    } else {
                        let _ = viewer.set_attribute("auto-rotate", "");
                    }
                }) as Box<dyn FnMut(_)>)
            };
            document
                .add_event_listener_with_callback(
                    "visibilitychange",
                    vis_cb.as_ref().unchecked_ref(),
                )
                .unwrap();

            // Model finished loading: announce it, hide the spinner, and when
            // overlaid replay the entrance once layout has settled.
            let load_cb = {
                let dom = dom.clone();
                let ctx = ctx.clone();
                let spinner = spinner.clone();
                let window = window.clone();
                Closure::wrap(Box::new(move |_e: Event| {
                    let label = model_by_src(&ctx.current_src.borrow())
                        .map(|m| m.label)
                        .unwrap_or("model");
                    let _ = dom.viewer.set_attribute("alt", &format!("3D model: {}", label));
                    let _ = spinner.class_list().add_1("hidden");
                    if dom.viewer.class_list().contains("in-camera") {
                        {
                            let mut tf = ctx.transform.borrow_mut();
                            load_transform(&LocalStore, &ctx.current_src.borrow(), &mut tf);
                            apply_transform(&dom.viewer, &tf);
                        }
                        let viewer = dom.viewer.clone();
                        let transform = ctx.transform.clone();
                        let token = ctx.session.borrow().animation.clone();
                        let replay = Closure::once_into_js(move || {
                            camera::play_entrance(&viewer, &transform, &token);
                        });
                        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                            replay.unchecked_ref(),
                            60,
                        );
                    }
                }) as Box<dyn FnMut(_)>)
            };
            dom.viewer
                .add_event_listener_with_callback("load", load_cb.as_ref().unchecked_ref())
                .unwrap();

            let err_cb = {
                let spinner = spinner.clone();
                let window = window.clone();
                Closure::wrap(Box::new(move |e: Event| {
                    log::error!("model viewer error: {:?}", e);
                    let _ = spinner.class_list().add_1("hidden");
                    let _ = window.alert_with_message(
                        "Failed to load the 3D model. Check the .glb files under assets/models/ or open the console for details.",
                    );
                }) as Box<dyn FnMut(_)>)
            };
            dom.viewer
                .add_event_listener_with_callback("error", err_cb.as_ref().unchecked_ref())
                .unwrap();

            // Periodic IP churn; repaint the overlay for the displayed model.
            let ip_tick = {
                let dom = dom.clone();
                let ctx = ctx.clone();
                let ips = ips.clone();
                Closure::wrap(Box::new(move || {
                    let now = js_sys::Date::now();
                    let mut ips = ips.borrow_mut();
                    ips.refresh_all(now, &mut || js_sys::Math::random());
                    if let Some(m) = model_by_src(&ctx.current_src.borrow()) {
                        if let Some(text) = ips.label_text(m.id, m.label, now) {
                            dom.ip_label.set_text_content(Some(&text));
                        }
                    }
                }) as Box<dyn FnMut()>)
            };
            let ip_tick_id = window
                .set_interval_with_callback_and_timeout_and_arguments_0(
                    ip_tick.as_ref().unchecked_ref(),
                    REFRESH_INTERVAL_MS,
                )
                .unwrap();

            let unload_cb = {
                let ctx = ctx.clone();
                Closure::wrap(Box::new(move |_e: Event| {
                    save_transform(&LocalStore, &ctx.current_src.borrow(), &ctx.transform.borrow());
                }) as Box<dyn FnMut(_)>)
            };
            window
                .add_event_listener_with_callback("beforeunload", unload_cb.as_ref().unchecked_ref())
                .unwrap();

            // Start the camera shortly after mount so the permission prompt
            // does not race initial layout.
            let auto_start_id = {
                let dom = dom.clone();
                let ctx = ctx.clone();
                let auto_start = Closure::once_into_js(move || {
                    camera::start_session(&dom, &ctx);
                });
                window
                    .set_timeout_with_callback_and_timeout_and_arguments_0(
                        auto_start.unchecked_ref(),
                        300,
                    )
                    .ok()
            };

            let window_cleanup = window.clone();
            let document_cleanup = document.clone();
            let ctx_cleanup = ctx.clone();
            move || {
                let _ = window_cleanup
                    .remove_event_listener_with_callback("keydown", key_cb.as_ref().unchecked_ref());
                let _ = document_cleanup.remove_event_listener_with_callback(
                    "visibilitychange",
                    vis_cb.as_ref().unchecked_ref(),
                );
                let _ = dom
                    .viewer
                    .remove_event_listener_with_callback("load", load_cb.as_ref().unchecked_ref());
                let _ = dom
                    .viewer
                    .remove_event_listener_with_callback("error", err_cb.as_ref().unchecked_ref());
                let _ = window_cleanup.remove_event_listener_with_callback(
                    "beforeunload",
                    unload_cb.as_ref().unchecked_ref(),
                );
                window_cleanup.clear_interval_with_handle(ip_tick_id);
                if let Some(id) = auto_start_id {
                    window_cleanup.clear_timeout_with_handle(id);
                }
                camera::stop_session(&dom, &ctx_cleanup);
                let _keep_alive = (&key_cb, &vis_cb, &load_cb, &err_cb, &ip_tick, &unload_cb);
            }
        });
    }

    let on_select_change = {
        let resolve_dom = resolve_dom.clone();
        let spinner_ref = spinner_ref.clone();
        let ctx = ctx.clone();
        let ips = ips.clone();
        Callback::from(move |e: Event| {
            let Some(select) = e.target_dyn_into::<HtmlSelectElement>() else {
                return;
            };
            let Some(model) = model_by_src(&select.value()) else {
                return;
            };
            if let (Some(dom), Some(spinner)) =
                (resolve_dom(), spinner_ref.cast::<HtmlElement>())
            {
                select_model(&dom, &ctx, &ips, &spinner, model);
            }
        })
    };

    let on_toggle_rotate = {
        let viewer_ref = viewer_ref.clone();
        Callback::from(move |_| {
            if let Some(viewer) = viewer_ref.cast::<HtmlElement>() {
                if viewer.has_attribute("auto-rotate") {
                    let _ = viewer.remove_attribute("auto-rotate");
                } else {
                    let _ = viewer.set_attribute("auto-rotate", "");
                }
            }
        })
    };

    let on_fullscreen = {
        let viewer_ref = viewer_ref.clone();
        Callback::from(move |_| {
            if let Some(viewer) = viewer_ref.cast::<HtmlElement>() {
                if let Err(err) = viewer.request_fullscreen() {
                    log::warn!("fullscreen not supported: {:?}", err);
                }
            }
        })
    };

    let on_toggle_camera = {
        let resolve_dom = resolve_dom.clone();
        let ctx = ctx.clone();
        Callback::from(move |_| {
            if let Some(dom) = resolve_dom() {
                camera::toggle_session(&dom, &ctx);
            }
        })
    };

    html! {
        <div id="app-root">
            <header id="top-bar" style="display:flex; gap:12px; align-items:center; padding:10px 14px;">
                <h1 style="margin:0; font-size:18px;">{"EduAR Net"}</h1>
                <select id="model-select" ref={select_ref} onchange={on_select_change}>
                    { for MODELS.iter().map(|m| html! {
                        <option value={m.src}>{ m.label }</option>
                    }) }
                </select>
                <ControlsPanel
                    on_toggle_rotate={on_toggle_rotate}
                    on_fullscreen={on_fullscreen}
                    on_toggle_camera={on_toggle_camera}
                />
            </header>
            <main id="viewer-panel" style="position:relative; flex:1;">
                <model-viewer id="modelViewer" ref={viewer_ref} camera-controls="">
                </model-viewer>
                <div id="model-spinner" ref={spinner_ref} class="spinner hidden"></div>
                <div id="ip-label" ref={ip_label_ref} class="ip-label"></div>
            </main>
            <div id="camera-overlay" ref={camera_surface_ref} class="hidden">
                <video id="cameraVideo" ref={video_ref} autoplay=true playsinline=true muted=true></video>
                <div id="camera-container" ref={camera_container_ref}></div>
            </div>
        </div>
    }
}
