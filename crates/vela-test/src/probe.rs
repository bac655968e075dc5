//! Scripted probes.
//!
//! Deterministic stand-ins for a real resource: each property replays a
//! script of readings and records when it was probed.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;
use vela_core::{PolicyKey, PolicyOutcome, ProbeReading, PropertyProbe};

/// Replays a script of readings per property; the last reading repeats.
///
/// Unscripted properties read as an empty string.
#[derive(Default)]
pub struct ScriptedProbe {
    scripts: Mutex<HashMap<String, VecDeque<ProbeReading>>>,
    calls: Mutex<HashMap<String, Vec<Instant>>>,
}

impl ScriptedProbe {
    /// Creates a probe with no scripts.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Scripts `property` with plain values.
    #[must_use]
    pub fn script(self: &Arc<Self>, property: &str, values: &[&str]) -> Arc<Self> {
        self.script_readings(property, values.iter().map(|v| Ok((*v).to_string())).collect())
    }

    /// Scripts `property` with readings that may be errors.
    #[must_use]
    pub fn script_readings(self: &Arc<Self>, property: &str, readings: Vec<ProbeReading>) -> Arc<Self> {
        self.scripts
            .lock()
            .insert(property.to_string(), readings.into_iter().collect());
        Arc::clone(self)
    }

    /// Instants at which `property` was probed.
    #[must_use]
    pub fn calls(&self, property: &str) -> Vec<Instant> {
        self.calls.lock().get(property).cloned().unwrap_or_default()
    }

    /// Total number of reads across all properties.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.calls.lock().values().map(Vec::len).sum()
    }
}

#[async_trait]
impl PropertyProbe for ScriptedProbe {
    async fn read(&self, _resource: &str, property: &str) -> ProbeReading {
        self.calls
            .lock()
            .entry(property.to_string())
            .or_default()
            .push(Instant::now());

        let mut scripts = self.scripts.lock();
        let next = scripts.get_mut(property).and_then(|script| {
            if script.len() > 1 {
                script.pop_front()
            } else {
                script.front().cloned()
            }
        });
        next.unwrap_or_else(|| Ok(String::new()))
    }
}

/// Probe that never answers.
#[derive(Debug, Default, Clone, Copy)]
pub struct HangingProbe;

#[async_trait]
impl PropertyProbe for HangingProbe {
    async fn read(&self, _resource: &str, _property: &str) -> ProbeReading {
        std::future::pending().await
    }
}

/// `"status: done"` passes, `"status: error"` fails, anything else keeps checking.
#[must_use]
pub fn status_classifier(key: &PolicyKey, reading: &ProbeReading) -> PolicyOutcome {
    match reading {
        Ok(v) if v == "status: done" => PolicyOutcome::ended(key.clone(), true, v.clone()),
        Ok(v) if v == "status: error" => PolicyOutcome::ended(key.clone(), false, v.clone()),
        Ok(v) => PolicyOutcome::checking(key.clone(), v.clone()),
        Err(e) => PolicyOutcome::checking(key.clone(), e.to_string()),
    }
}
