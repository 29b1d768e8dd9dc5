use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct ControlsPanelProps {
    pub on_toggle_rotate: Callback<()>,
    pub on_fullscreen: Callback<()>,
    pub on_toggle_camera: Callback<()>,
}

#[function_component(ControlsPanel)]
pub fn controls_panel(props: &ControlsPanelProps) -> Html {
    let rotate = {
        let cb = props.on_toggle_rotate.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let fullscreen = {
        let cb = props.on_fullscreen.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let camera = {
        let cb = props.on_toggle_camera.clone();
        Callback::from(move |_| cb.emit(()))
    };
    html! {<div style="display:flex; gap:6px; align-items:center;">
        <button id="rotate-toggle" onclick={rotate}> {"Rotate"} </button>
        <button id="fullscreen" onclick={fullscreen}> {"Fullscreen"} </button>
        <button id="camera-toggle" onclick={camera}> {"Scan"} </button>
    </div>}
}
