//! Persisted scene schema
//!
//! A [`Scene`] is the JSON snapshot of the whole [`PanelState`]. Decoding is
//! tolerant: each missing, null or mistyped field falls back to its factory
//! default and out-of-range numbers are clamped, so scenes written by older
//! panel versions still load. This holds for nested sections too: a section
//! of the wrong shape reads as absent and a broken channel entry is skipped.

use super::store::PanelState;
use super::types::{
    BusStrip, ChannelState, EqBands, FxEngine, FxSettings, MasterState, CENTER, COMP_MAX,
};
use crate::codec::default_label;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Field-level decoders that never fail
mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// A nested object, `None` when it has the wrong shape
    pub fn object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(serde_json::from_value(value).ok())
    }

    pub fn object_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Default,
    {
        Ok(object(deserializer)?.unwrap_or_default())
    }

    /// An array of objects. Unreadable entries are dropped, anything other
    /// than an array reads as empty.
    pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let Value::Array(items) = Value::deserialize(deserializer)? else {
            return Ok(Vec::new());
        };
        Ok(items
            .into_iter()
            .filter_map(|item| match serde_json::from_value(item) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::debug!("Dropping unreadable scene entry: {}", e);
                    None
                }
            })
            .collect())
    }

    /// Any JSON number, rounded and clamped to 0..=127
    pub fn level<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(value
            .as_f64()
            .map(|n| crate::codec::round_half_up(n).clamp(0, 127) as u8))
    }

    /// Booleans, with numbers treated as truthy when non-zero
    pub fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Bool(b) => Some(b),
            Value::Number(n) => n.as_f64().map(|n| n != 0.0),
            _ => None,
        })
    }

    pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::String(s) if !s.trim().is_empty() => Some(s),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    #[serde(default, deserialize_with = "lenient::flag")]
    pub exclusive_solo: Option<bool>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub log_taper: Option<bool>,
    #[serde(default, deserialize_with = "lenient::object")]
    pub master: Option<SceneMaster>,
    #[serde(default, deserialize_with = "lenient::object")]
    pub bus_pairs: Option<SceneBusPairs>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub channels: Vec<SceneChannel>,
    #[serde(default, deserialize_with = "lenient::object")]
    pub fx: Option<SceneFx>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneMaster {
    #[serde(default, deserialize_with = "lenient::level")]
    pub level: Option<u8>,
    #[serde(default, deserialize_with = "lenient::level")]
    pub limiter: Option<u8>,
    #[serde(default, deserialize_with = "lenient::level")]
    pub balance: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneBusPairs {
    #[serde(default, deserialize_with = "lenient::object_or_default")]
    pub fx: SceneFxPair,
    #[serde(default, deserialize_with = "lenient::object_or_default")]
    pub mon: SceneMonPair,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneFxPair {
    #[serde(default, deserialize_with = "lenient::level")]
    pub fx1_limiter: Option<u8>,
    #[serde(default, deserialize_with = "lenient::level")]
    pub fx1_level: Option<u8>,
    #[serde(default, deserialize_with = "lenient::level")]
    pub fx2_limiter: Option<u8>,
    #[serde(default, deserialize_with = "lenient::level")]
    pub fx2_level: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneMonPair {
    #[serde(default, deserialize_with = "lenient::level")]
    pub mon1_limiter: Option<u8>,
    #[serde(default, deserialize_with = "lenient::level")]
    pub mon1_level: Option<u8>,
    #[serde(default, deserialize_with = "lenient::level")]
    pub mon2_limiter: Option<u8>,
    #[serde(default, deserialize_with = "lenient::level")]
    pub mon2_level: Option<u8>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub stereo_link: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneEq {
    #[serde(default, deserialize_with = "lenient::level")]
    pub low: Option<u8>,
    #[serde(default, deserialize_with = "lenient::level")]
    pub lowmid: Option<u8>,
    #[serde(default, deserialize_with = "lenient::level")]
    pub himid: Option<u8>,
    #[serde(default, deserialize_with = "lenient::level")]
    pub hi: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneChannel {
    /// Entries without a usable channel number are dropped on load
    pub channel: u8,
    #[serde(default, deserialize_with = "lenient::level")]
    pub level: Option<u8>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub mute: Option<bool>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub solo: Option<bool>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub phantom: Option<bool>,
    #[serde(default, deserialize_with = "lenient::level")]
    pub fx1: Option<u8>,
    #[serde(default, deserialize_with = "lenient::level")]
    pub fx2: Option<u8>,
    #[serde(default, deserialize_with = "lenient::level")]
    pub mon1: Option<u8>,
    #[serde(default, deserialize_with = "lenient::level")]
    pub mon2: Option<u8>,
    #[serde(default, deserialize_with = "lenient::level")]
    pub pan: Option<u8>,
    #[serde(default, deserialize_with = "lenient::level")]
    pub gain: Option<u8>,
    #[serde(default, deserialize_with = "lenient::level")]
    pub lowcut: Option<u8>,
    #[serde(default, deserialize_with = "lenient::level")]
    pub comp: Option<u8>,
    #[serde(default, deserialize_with = "lenient::object")]
    pub eq: Option<SceneEq>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    /// Older scenes carried the label under this key as well
    #[serde(default, skip_serializing, deserialize_with = "lenient::text")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneFxSettings {
    #[serde(default, deserialize_with = "lenient::level")]
    pub preset: Option<u8>,
    #[serde(default, deserialize_with = "lenient::level")]
    pub param1: Option<u8>,
    #[serde(default, deserialize_with = "lenient::level")]
    pub param2: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneFx {
    #[serde(default, deserialize_with = "lenient::object_or_default")]
    pub fx1: SceneFxSettings,
    #[serde(default, deserialize_with = "lenient::object_or_default")]
    pub fx2: SceneFxSettings,
}

impl Scene {
    /// Snapshot of the full panel state
    pub fn from_state(state: &PanelState) -> Self {
        let b = &state.buses;
        Self {
            exclusive_solo: Some(state.options.exclusive_solo),
            log_taper: Some(state.options.log_taper),
            master: Some(SceneMaster {
                level: Some(state.master.level),
                limiter: Some(state.master.limiter),
                balance: Some(state.master.balance),
            }),
            bus_pairs: Some(SceneBusPairs {
                fx: SceneFxPair {
                    fx1_limiter: Some(b.fx1.limiter),
                    fx1_level: Some(b.fx1.level),
                    fx2_limiter: Some(b.fx2.limiter),
                    fx2_level: Some(b.fx2.level),
                },
                mon: SceneMonPair {
                    mon1_limiter: Some(b.mon1.limiter),
                    mon1_level: Some(b.mon1.level),
                    mon2_limiter: Some(b.mon2.limiter),
                    mon2_level: Some(b.mon2.level),
                    stereo_link: Some(b.stereo_link),
                },
            }),
            channels: state
                .channels()
                .map(|(ch, st)| SceneChannel::from_state(ch, st))
                .collect(),
            fx: Some(SceneFx {
                fx1: SceneFxSettings::from_state(&state.fx.fx1),
                fx2: SceneFxSettings::from_state(&state.fx.fx2),
            }),
        }
    }

    /// Overwrite `state` with this scene, defaulting every absent field.
    /// Entries for channels the panel does not have are ignored.
    pub fn apply_to(&self, state: &mut PanelState) {
        state.options.exclusive_solo = self.exclusive_solo.unwrap_or(false);
        state.options.log_taper = self.log_taper.unwrap_or(false);

        let master = self.master.clone().unwrap_or_default();
        let defaults = MasterState::default();
        state.master = MasterState {
            level: master.level.unwrap_or(defaults.level),
            limiter: master.limiter.unwrap_or(defaults.limiter),
            balance: master.balance.unwrap_or(defaults.balance),
        };

        let pairs = self.bus_pairs.clone().unwrap_or_default();
        let strip = |level: Option<u8>, limiter: Option<u8>| {
            let d = BusStrip::default();
            BusStrip {
                level: level.unwrap_or(d.level),
                limiter: limiter.unwrap_or(d.limiter),
            }
        };
        state.buses.fx1 = strip(pairs.fx.fx1_level, pairs.fx.fx1_limiter);
        state.buses.fx2 = strip(pairs.fx.fx2_level, pairs.fx.fx2_limiter);
        state.buses.mon1 = strip(pairs.mon.mon1_level, pairs.mon.mon1_limiter);
        state.buses.mon2 = strip(pairs.mon.mon2_level, pairs.mon.mon2_limiter);
        state.buses.stereo_link = pairs.mon.stereo_link.unwrap_or(false);

        for entry in &self.channels {
            match state.channel_mut(entry.channel) {
                Ok(strip) => *strip = entry.to_state(),
                Err(_) => debug!("Ignoring scene entry for unknown channel {}", entry.channel),
            }
        }

        let fx = self.fx.clone().unwrap_or_default();
        for engine in FxEngine::all() {
            let saved = match engine {
                FxEngine::Fx1 => &fx.fx1,
                FxEngine::Fx2 => &fx.fx2,
            };
            let d = FxSettings::default();
            *state.fx.engine_mut(*engine) = FxSettings {
                preset: saved.preset.unwrap_or(d.preset),
                param1: saved.param1.unwrap_or(d.param1),
                param2: saved.param2.unwrap_or(d.param2),
            };
            let preset = i32::from(state.fx.engine(*engine).preset);
            state.set_preset(*engine, preset);
        }
    }
}

impl SceneChannel {
    fn from_state(channel: u8, st: &ChannelState) -> Self {
        Self {
            channel,
            level: Some(st.level),
            mute: Some(st.mute),
            solo: Some(st.solo),
            phantom: Some(st.phantom),
            fx1: Some(st.fx1),
            fx2: Some(st.fx2),
            mon1: Some(st.mon1),
            mon2: Some(st.mon2),
            pan: Some(st.pan),
            gain: Some(st.gain),
            lowcut: Some(st.lowcut),
            comp: Some(st.comp),
            eq: Some(SceneEq {
                low: Some(st.eq.low),
                lowmid: Some(st.eq.lowmid),
                himid: Some(st.eq.himid),
                hi: Some(st.eq.hi),
            }),
            name: Some(st.label.clone()),
            label: None,
        }
    }

    fn to_state(&self) -> ChannelState {
        let d = ChannelState::new(self.channel);
        let eq = self.eq.clone().unwrap_or_default();
        ChannelState {
            level: self.level.unwrap_or(d.level),
            mute: self.mute.unwrap_or(false),
            solo: self.solo.unwrap_or(false),
            phantom: self.phantom.unwrap_or(false) && PanelState::has_phantom(self.channel),
            fx1: self.fx1.unwrap_or(0),
            fx2: self.fx2.unwrap_or(0),
            mon1: self.mon1.unwrap_or(0),
            mon2: self.mon2.unwrap_or(0),
            pan: self.pan.unwrap_or(CENTER),
            gain: self.gain.unwrap_or(d.gain),
            lowcut: self.lowcut.unwrap_or(0),
            comp: self.comp.unwrap_or(0).min(COMP_MAX),
            eq: EqBands {
                low: eq.low.unwrap_or(CENTER),
                lowmid: eq.lowmid.unwrap_or(CENTER),
                himid: eq.himid.unwrap_or(CENTER),
                hi: eq.hi.unwrap_or(CENTER),
            },
            label: self
                .name
                .clone()
                .or_else(|| self.label.clone())
                .unwrap_or_else(|| default_label(self.channel)),
        }
    }
}

impl SceneFxSettings {
    fn from_state(fx: &FxSettings) -> Self {
        Self {
            preset: Some(fx.preset),
            param1: Some(fx.param1),
            param2: Some(fx.param2),
        }
    }
}
