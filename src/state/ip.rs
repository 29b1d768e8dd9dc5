//! Simulated IP labels: one randomly generated address per model id, with a
//! last-updated timestamp for the relative-time display. Held in memory only;
//! nothing here is persisted across reloads.

use std::collections::HashMap;

use crate::util::time_ago;

/// How often every known address is regenerated, in milliseconds.
pub const REFRESH_INTERVAL_MS: i32 = 12_000;

#[derive(Clone, Debug, PartialEq)]
pub struct IpEntry {
    pub address: String,
    pub last_updated_ms: f64,
}

#[derive(Default)]
pub struct IpLabels {
    entries: HashMap<String, IpEntry>,
}

impl IpLabels {
    /// Returns the entry for `model_id`, creating it with a fresh address on
    /// first reference. Subsequent calls leave the address untouched until an
    /// explicit refresh.
    pub fn ensure(
        &mut self,
        model_id: &str,
        now_ms: f64,
        rng: &mut dyn FnMut() -> f64,
    ) -> &IpEntry {
        self.entries
            .entry(model_id.to_string())
            .or_insert_with(|| IpEntry { address: simulated_address(rng), last_updated_ms: now_ms })
    }

    pub fn refresh(&mut self, model_id: &str, now_ms: f64, rng: &mut dyn FnMut() -> f64) {
        self.entries.insert(
            model_id.to_string(),
            IpEntry { address: simulated_address(rng), last_updated_ms: now_ms },
        );
    }

    /// Periodic tick: regenerate every known address.
    pub fn refresh_all(&mut self, now_ms: f64, rng: &mut dyn FnMut() -> f64) {
        for entry in self.entries.values_mut() {
            entry.address = simulated_address(rng);
            entry.last_updated_ms = now_ms;
        }
    }

    /// Overlay text for a model: address, label, and how long ago the address
    /// was assigned.
    pub fn label_text(&self, model_id: &str, model_label: &str, now_ms: f64) -> Option<String> {
        let entry = self.entries.get(model_id)?;
        Some(format!(
            "IP: {} · {} · {}",
            entry.address,
            model_label,
            time_ago(now_ms, entry.last_updated_ms)
        ))
    }
}

/// Four random octets. The first octet stays in [10, 254] and the last in
/// [1, 253] so the simulated address never ends in .0/.255 or starts in
/// reserved low space; the middle octets are unconstrained.
pub fn simulated_address(rng: &mut dyn FnMut() -> f64) -> String {
    let octet = |r: f64, lo: u32, hi: u32| lo + (r * ((hi - lo + 1) as f64)).floor() as u32;
    let a = octet(rng(), 10, 254);
    let b = octet(rng(), 0, 255);
    let c = octet(rng(), 0, 255);
    let d = octet(rng(), 1, 253);
    format!("{}.{}.{}.{}", a, b, c, d)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Deterministic rng feeding values from a cycle.
    fn seq(values: Vec<f64>) -> impl FnMut() -> f64 {
        let mut i = 0;
        move || {
            let v = values[i % values.len()];
            i += 1;
            v
        }
    }

    #[test]
    fn address_octets_stay_in_range() {
        let mut low = seq(vec![0.0]);
        assert_eq!(simulated_address(&mut low), "10.0.0.1");
        let mut high = seq(vec![0.999_999_9]);
        assert_eq!(simulated_address(&mut high), "254.255.255.253");
    }

    #[test]
    fn address_bounds_hold_across_samples() {
        let mut i = 0u64;
        let mut rng = move || {
            // cheap LCG, enough to sweep the range
            i = i.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
            (i >> 11) as f64 / (1u64 << 53) as f64
        };
        for _ in 0..1000 {
            let addr = simulated_address(&mut rng);
            let parts: Vec<u32> = addr.split('.').map(|p| p.parse().unwrap()).collect();
            assert_eq!(parts.len(), 4);
            assert!((10..=254).contains(&parts[0]), "first octet {}", parts[0]);
            assert!(parts[1] <= 255 && parts[2] <= 255);
            assert!((1..=253).contains(&parts[3]), "last octet {}", parts[3]);
        }
    }

    #[test]
    fn ensure_is_lazy_and_stable_until_refresh() {
        let mut labels = IpLabels::default();
        let mut rng = seq(vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8]);
        let first = labels.ensure("pc", 1_000.0, &mut rng).clone();
        let second = labels.ensure("pc", 2_000.0, &mut rng).clone();
        assert_eq!(first, second);

        labels.refresh("pc", 3_000.0, &mut rng);
        let third = labels.ensure("pc", 9_999.0, &mut rng).clone();
        assert_ne!(third.address, first.address);
        assert_eq!(third.last_updated_ms, 3_000.0);
    }

    #[test]
    fn refresh_all_touches_every_known_model() {
        let mut labels = IpLabels::default();
        let mut rng = seq(vec![0.11, 0.42, 0.73, 0.24, 0.95, 0.36, 0.57, 0.18]);
        labels.ensure("pc", 0.0, &mut rng);
        labels.ensure("router", 0.0, &mut rng);
        labels.refresh_all(12_000.0, &mut rng);
        assert_eq!(labels.ensure("pc", 0.0, &mut rng).last_updated_ms, 12_000.0);
        assert_eq!(labels.ensure("router", 0.0, &mut rng).last_updated_ms, 12_000.0);
        assert!(labels.label_text("wifi", "Access Point", 0.0).is_none());
    }

    #[test]
    fn label_text_combines_address_label_and_age() {
        let mut labels = IpLabels::default();
        let mut rng = seq(vec![0.0]);
        labels.ensure("hp", 0.0, &mut rng);
        let text = labels.label_text("hp", "Laptop", 30_000.0).unwrap();
        assert_eq!(text, "IP: 10.0.0.1 · Laptop · 30s ago");
        assert!(labels.label_text("pc", "PC", 0.0).is_none());
    }
}
