//! Per-model persistence of the in-camera transform.
//!
//! Records live under `eduar:transform:<modelSource>` as JSON
//! `{panX, panY, scale}`. Storage failures (quota, parse, missing
//! localStorage) are swallowed; the in-memory transform simply keeps its
//! current values.

use crate::model::Transform;

/// Key-value seam so the pure save/load/switch logic is testable without a
/// browser. The only production impl wraps `window.localStorage`.
pub trait TransformStore {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&self, key: &str, value: &str);
}

/// `localStorage` backing. Every failure path degrades to a no-op.
pub struct LocalStore;

impl TransformStore for LocalStore {
    fn read(&self, key: &str) -> Option<String> {
        let store = web_sys::window()?.local_storage().ok()??;
        store.get_item(key).ok()?
    }

    fn write(&self, key: &str, value: &str) {
        if let Some(win) = web_sys::window() {
            if let Ok(Some(store)) = win.local_storage() {
                let _ = store.set_item(key, value);
            }
        }
    }
}

pub fn transform_key(model_src: &str) -> String {
    format!("eduar:transform:{}", model_src)
}

pub fn save_transform(store: &dyn TransformStore, model_src: &str, tf: &Transform) {
    if model_src.is_empty() {
        return;
    }
    if let Ok(json) = serde_json::to_string(tf) {
        store.write(&transform_key(model_src), &json);
    }
}

/// Applies a stored record field by field: each of panX/panY/scale is taken
/// only when present and numeric, so a partial or malformed record never
/// clobbers the rest of the state. Returns whether anything was applied.
pub fn load_transform(store: &dyn TransformStore, model_src: &str, tf: &mut Transform) -> bool {
    if model_src.is_empty() {
        return false;
    }
    let Some(raw) = store.read(&transform_key(model_src)) else {
        return false;
    };
    let Ok(value) = serde_json::from_str::<serde_json::Value>(&raw) else {
        return false;
    };
    let mut applied = false;
    if let Some(x) = value.get("panX").and_then(|v| v.as_f64()) {
        tf.pan_x = x;
        applied = true;
    }
    if let Some(y) = value.get("panY").and_then(|v| v.as_f64()) {
        tf.pan_y = y;
        applied = true;
    }
    if let Some(s) = value.get("scale").and_then(|v| v.as_f64()) {
        tf.set_scale(s);
        applied = true;
    }
    applied
}

/// Model-switch path: persist the outgoing model's transform before loading
/// whatever the incoming model has saved. When the incoming model has no
/// record the current values carry over unchanged.
pub fn switch_transform(
    store: &dyn TransformStore,
    prev_src: Option<&str>,
    next_src: &str,
    tf: &mut Transform,
) {
    if let Some(prev) = prev_src {
        save_transform(store, prev, tf);
    }
    load_transform(store, next_src, tf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemoryStore {
        map: RefCell<HashMap<String, String>>,
    }

    impl TransformStore for MemoryStore {
        fn read(&self, key: &str) -> Option<String> {
            self.map.borrow().get(key).cloned()
        }
        fn write(&self, key: &str, value: &str) {
            self.map.borrow_mut().insert(key.to_string(), value.to_string());
        }
    }

    #[test]
    fn key_is_namespaced_by_source() {
        assert_eq!(
            transform_key("assets/models/pc.glb"),
            "eduar:transform:assets/models/pc.glb"
        );
    }

    #[test]
    fn save_then_load_round_trips() {
        let store = MemoryStore::default();
        let saved = Transform { pan_x: 40.0, pan_y: -10.0, scale: 1.002 };
        save_transform(&store, "assets/models/hp.glb", &saved);

        let mut loaded = Transform::default();
        assert!(load_transform(&store, "assets/models/hp.glb", &mut loaded));
        assert_eq!(loaded, saved);
    }

    #[test]
    fn stored_json_uses_camel_case_keys() {
        let store = MemoryStore::default();
        save_transform(&store, "m", &Transform { pan_x: 1.0, pan_y: 2.0, scale: 1.5 });
        let raw = store.read("eduar:transform:m").unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["panX"], 1.0);
        assert_eq!(value["panY"], 2.0);
        assert_eq!(value["scale"], 1.5);
    }

    #[test]
    fn missing_record_is_a_no_op() {
        let store = MemoryStore::default();
        let mut tf = Transform { pan_x: 7.0, pan_y: 8.0, scale: 2.0 };
        assert!(!load_transform(&store, "assets/models/pc.glb", &mut tf));
        assert_eq!(tf, Transform { pan_x: 7.0, pan_y: 8.0, scale: 2.0 });
    }

    #[test]
    fn malformed_record_is_swallowed() {
        let store = MemoryStore::default();
        store.write("eduar:transform:m", "not json {");
        let mut tf = Transform::default();
        assert!(!load_transform(&store, "m", &mut tf));
        assert_eq!(tf, Transform::default());
    }

    #[test]
    fn partial_record_applies_only_typed_fields() {
        let store = MemoryStore::default();
        store.write("eduar:transform:m", r#"{"panX": 12.5, "scale": "big"}"#);
        let mut tf = Transform { pan_x: 0.0, pan_y: 5.0, scale: 1.4 };
        assert!(load_transform(&store, "m", &mut tf));
        assert_eq!(tf.pan_x, 12.5);
        assert_eq!(tf.pan_y, 5.0);
        assert_eq!(tf.scale, 1.4);
    }

    #[test]
    fn out_of_range_stored_scale_is_clamped_on_load() {
        let store = MemoryStore::default();
        store.write("eduar:transform:m", r#"{"scale": 9.0}"#);
        let mut tf = Transform::default();
        assert!(load_transform(&store, "m", &mut tf));
        assert_eq!(tf.scale, crate::model::MAX_SCALE);
    }

    #[test]
    fn switching_models_persists_previous_before_loading_next() {
        let store = MemoryStore::default();
        let mut tf = Transform { pan_x: 40.0, pan_y: -10.0, scale: 1.002 };

        // Leave model A; model B has nothing saved so values carry over.
        switch_transform(&store, Some("a"), "b", &mut tf);
        assert_eq!(tf, Transform { pan_x: 40.0, pan_y: -10.0, scale: 1.002 });

        // Mutate while on B, then switch back to A: A's record is restored.
        tf.pan_x = -3.0;
        tf.set_scale(0.5);
        switch_transform(&store, Some("b"), "a", &mut tf);
        assert_eq!(tf, Transform { pan_x: 40.0, pan_y: -10.0, scale: 1.002 });

        // And B's mutated state was persisted on the way out.
        let mut back = Transform::default();
        assert!(load_transform(&store, "b", &mut back));
        assert_eq!(back, Transform { pan_x: -3.0, pan_y: -10.0, scale: 0.5 });
    }
}
