//! Panel - gesture handling and coupling rules
//!
//! [`Panel`] is the application context: it owns the state store, the device
//! session, the scene store and the two kinds of timers (scene debounce and
//! 48V hold). Every gesture follows the same order: mutate state, emit MIDI,
//! then re-arm the debounced scene write.
//!
//! Coupling rules enforced here:
//! - exclusive solo: soloing a channel un-solos every other soloed channel
//!   first (state and MIDI);
//! - stereo link: while the monitor pair is linked, mon2 level, limiter and
//!   sends cannot be changed and nothing mon2-targeted is transmitted;
//! - 48V hold-to-activate, see [`phantom`].
//!
//! Timers never fire on their own. The event loop calls [`Panel::tick`] at a
//! fixed cadence and the panel compares deadlines with its [`Clock`].

pub mod knob;
pub mod phantom;
pub mod replay;
#[cfg(test)]
mod tests;

use crate::clock::Clock;
use crate::device::{DeviceError, DeviceSession};
use crate::midi::{cc, channel, panic_sequence, switch_value, MidiMessage};
use crate::state::persistence::{read_scene, write_scene};
use crate::state::types::{CENTER, PHANTOM_CHANNELS};
use crate::state::{
    ChannelState, Control, Debounce, EqBand, EqBands, FxEngine, KeyValueStore, PanelState,
    Scene, StateError, StoreError, DEFAULT_DEBOUNCE_MS, DEFAULT_SCENE_KEY,
};
use knob::{wheel_value, Drag};
use phantom::{HoldAction, HoldButton, DEFAULT_HOLD_MS};
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Snapshot slots on the mixer
pub const SNAPSHOT_COUNT: u8 = 15;

#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    #[error(transparent)]
    State(#[from] StateError),

    #[error("EQ dialog is not open")]
    NoEqChannel,

    #[error("snapshot {0} does not exist (1-{max})", max = SNAPSHOT_COUNT)]
    UnknownSnapshot(u8),

    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, PanelError>;

/// Channel strip switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Switch {
    Mute,
    Solo,
    Phantom,
}

/// Global toggles exposed to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelOption {
    ExclusiveSolo,
    LogTaper,
}

/// Notifications for whatever renders the panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelEvent {
    /// A continuous control has a new value
    Readout {
        control: Control,
        value: u8,
        text: String,
    },
    Switch {
        channel: u8,
        switch: Switch,
        on: bool,
    },
    /// A 48V button started or stopped arming
    PhantomArming { channel: u8, arming: bool },
    StereoLink(bool),
    /// Channel the EQ dialog is bound to, `None` when closed
    EqDialog(Option<u8>),
    Preset {
        engine: FxEngine,
        preset: u8,
        name: String,
    },
    Snapshot(u8),
    Label { channel: u8, label: String },
    OptionChanged { option: PanelOption, on: bool },
    Status(String),
}

pub type Listener = Box<dyn Fn(&PanelEvent) + Send>;

/// Timing and storage settings
#[derive(Debug, Clone)]
pub struct PanelSettings {
    pub scene_key: String,
    pub debounce: Duration,
    pub hold: Duration,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            scene_key: DEFAULT_SCENE_KEY.to_string(),
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            hold: Duration::from_millis(DEFAULT_HOLD_MS),
        }
    }
}

pub struct Panel {
    state: PanelState,
    device: DeviceSession,
    store: Box<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
    scene_key: String,
    save: Debounce,
    /// One per phantom-equipped channel, index = channel - 1
    holds: Vec<HoldButton>,
    eq_channel: Option<u8>,
    drag: Option<Drag>,
    active_snapshot: Option<u8>,
    listeners: Vec<Listener>,
}

impl Panel {
    pub fn new(
        device: DeviceSession,
        store: Box<dyn KeyValueStore>,
        clock: Box<dyn Clock>,
        settings: PanelSettings,
    ) -> Self {
        Self {
            state: PanelState::new(),
            device,
            store,
            clock,
            scene_key: settings.scene_key,
            save: Debounce::new(settings.debounce),
            holds: (0..PHANTOM_CHANNELS)
                .map(|_| HoldButton::new(settings.hold))
                .collect(),
            eq_channel: None,
            drag: None,
            active_snapshot: None,
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn device(&self) -> &DeviceSession {
        &self.device
    }

    pub fn eq_channel(&self) -> Option<u8> {
        self.eq_channel
    }

    pub fn active_snapshot(&self) -> Option<u8> {
        self.active_snapshot
    }

    pub fn hold_state(&self, channel: u8) -> Option<phantom::HoldState> {
        self.hold(channel).map(HoldButton::state)
    }

    /// A debounced scene write is pending
    pub fn save_pending(&self) -> bool {
        self.save.is_armed()
    }

    /// Startup: pick an output, then restore the saved scene onto it
    pub fn start(&mut self) {
        self.refresh_devices();
        self.status("MIDI ready (Out only)");
        self.load_scene();
    }

    /// Fire due timers
    pub fn tick(&mut self) {
        let now = self.clock.now();

        for ch in 1..=PHANTOM_CHANNELS {
            let action = match self.hold_mut(ch) {
                Some(button) => button.poll(now),
                None => HoldAction::None,
            };
            if action == HoldAction::Activate {
                self.set_phantom(ch, true);
            }
        }

        if self.save.poll(now) {
            trace!("Debounced scene write");
            if let Err(e) = self.persist() {
                warn!("Scene save failed: {}", e);
            }
        }
    }

    // ----- continuous controls -----

    /// Set a fader or knob. Returns the stored value, or `None` when the
    /// control is locked by the stereo link.
    pub fn set_control(&mut self, control: Control, value: i32) -> Result<Option<u8>> {
        let stored = self.apply(control, value)?;
        if stored.is_some() {
            self.touch();
        }
        Ok(stored)
    }

    /// Start dragging a knob at vertical pointer position `y`
    pub fn knob_press(&mut self, control: Control, y: f64) -> Result<u8> {
        let start_value = self.state.value(control)?;
        self.drag = Some(Drag {
            control,
            start_y: y,
            start_value,
        });
        Ok(start_value)
    }

    /// Pointer moved during a drag. Returns the new value if one was applied.
    pub fn knob_move(&mut self, y: f64) -> Result<Option<u8>> {
        let Some(drag) = self.drag else {
            return Ok(None);
        };
        self.apply(drag.control, i32::from(drag.value_at(y)))
    }

    /// End the drag and schedule the scene write
    pub fn knob_release(&mut self) {
        if self.drag.take().is_some() {
            self.touch();
        }
    }

    /// One wheel notch over a knob, coarse when shift is held
    pub fn knob_wheel(&mut self, control: Control, up: bool, coarse: bool) -> Result<Option<u8>> {
        let current = self.state.value(control)?;
        let next = wheel_value(current, up, coarse, control.max());
        self.set_control(control, i32::from(next))
    }

    fn apply(&mut self, control: Control, value: i32) -> Result<Option<u8>> {
        self.state.validate(control)?;
        if control.targets_mon2() && self.state.buses.stereo_link {
            trace!("{} locked by stereo link", control);
            return Ok(None);
        }
        let stored = self.state.set_value(control, value)?;
        self.emit(control.message(stored, self.state.options.log_taper));
        self.notify_readout(control, stored);
        Ok(Some(stored))
    }

    // ----- switches -----

    pub fn toggle_mute(&mut self, ch: u8) -> Result<bool> {
        let strip = self.state.channel_mut(ch)?;
        strip.mute = !strip.mute;
        let on = strip.mute;
        self.emit(MidiMessage::cc(cc::MUTE, switch_value(on), ch));
        self.notify(PanelEvent::Switch {
            channel: ch,
            switch: Switch::Mute,
            on,
        });
        self.touch();
        Ok(on)
    }

    pub fn toggle_solo(&mut self, ch: u8) -> Result<bool> {
        let on = !self.state.channel(ch)?.solo;
        if on && self.state.options.exclusive_solo {
            for other in self.state.soloed_except(ch) {
                self.state.channel_mut(other)?.solo = false;
                self.emit(MidiMessage::cc(cc::SOLO, switch_value(false), other));
                self.notify(PanelEvent::Switch {
                    channel: other,
                    switch: Switch::Solo,
                    on: false,
                });
            }
        }
        self.state.channel_mut(ch)?.solo = on;
        self.emit(MidiMessage::cc(cc::SOLO, switch_value(on), ch));
        self.notify(PanelEvent::Switch {
            channel: ch,
            switch: Switch::Solo,
            on,
        });
        self.touch();
        Ok(on)
    }

    // ----- 48V -----

    pub fn phantom_press(&mut self, ch: u8) -> Result<()> {
        let now = self.clock.now();
        let button = self.hold_checked(ch)?;
        let was_arming = button.is_arming();
        button.press(now);
        if !was_arming && button.is_arming() {
            self.notify(PanelEvent::PhantomArming {
                channel: ch,
                arming: true,
            });
        }
        Ok(())
    }

    pub fn phantom_release(&mut self, ch: u8) -> Result<()> {
        let button = self.hold_checked(ch)?;
        let was_arming = button.is_arming();
        let action = button.release();
        if was_arming {
            self.notify(PanelEvent::PhantomArming {
                channel: ch,
                arming: false,
            });
        }
        if action == HoldAction::Deactivate {
            self.set_phantom(ch, false);
        }
        Ok(())
    }

    /// Pointer left the button or the gesture was cancelled
    pub fn phantom_leave(&mut self, ch: u8) -> Result<()> {
        let button = self.hold_checked(ch)?;
        if button.is_arming() {
            button.leave();
            self.notify(PanelEvent::PhantomArming {
                channel: ch,
                arming: false,
            });
        }
        Ok(())
    }

    fn set_phantom(&mut self, ch: u8, on: bool) {
        if let Err(e) = self.state.set_phantom(ch, on) {
            warn!("{}", e);
            return;
        }
        self.emit(MidiMessage::cc(cc::PHANTOM, switch_value(on), ch));
        self.notify(PanelEvent::Switch {
            channel: ch,
            switch: Switch::Phantom,
            on,
        });
        self.touch();
        let state = if on { "ON" } else { "OFF" };
        self.status(format!("48V {} (CH {})", state, ch));
    }

    fn hold(&self, ch: u8) -> Option<&HoldButton> {
        usize::from(ch).checked_sub(1).and_then(|i| self.holds.get(i))
    }

    fn hold_mut(&mut self, ch: u8) -> Option<&mut HoldButton> {
        usize::from(ch)
            .checked_sub(1)
            .and_then(|i| self.holds.get_mut(i))
    }

    fn hold_checked(&mut self, ch: u8) -> Result<&mut HoldButton> {
        self.state.channel(ch)?;
        self.hold_mut(ch).ok_or_else(|| {
            PanelError::State(StateError::NotApplicable {
                what: "48V".to_string(),
                channel: ch,
            })
        })
    }

    // ----- channel strip -----

    /// Restore factory values on one channel. 48V and the label are kept.
    pub fn reset_channel(&mut self, ch: u8) -> Result<()> {
        let strip = self.state.channel_mut(ch)?;
        let defaults = ChannelState::new(ch);
        *strip = ChannelState {
            phantom: strip.phantom && PanelState::has_phantom(ch),
            label: std::mem::take(&mut strip.label),
            ..defaults
        };
        debug!("Channel {} reset", ch);

        for message in replay::channel_messages(&self.state, ch) {
            self.emit(message);
        }
        self.notify_channel(ch);
        self.touch();
        Ok(())
    }

    pub fn set_label(&mut self, ch: u8, label: &str) -> Result<String> {
        let label = label.trim();
        let label = if label.is_empty() {
            crate::codec::default_label(ch)
        } else {
            label.to_string()
        };
        self.state.channel_mut(ch)?.label = label.clone();
        self.notify(PanelEvent::Label {
            channel: ch,
            label: label.clone(),
        });
        self.touch();
        Ok(label)
    }

    // ----- EQ dialog -----

    /// Bind the EQ dialog to a channel
    pub fn open_eq(&mut self, ch: u8) -> Result<EqBands> {
        self.state.validate(Control::Eq(ch, EqBand::Low))?;
        self.eq_channel = Some(ch);
        self.notify(PanelEvent::EqDialog(Some(ch)));
        for band in EqBand::all() {
            let control = Control::Eq(ch, *band);
            let value = self.state.value(control)?;
            self.notify_readout(control, value);
        }
        Ok(self.state.channel(ch)?.eq)
    }

    pub fn close_eq(&mut self) {
        if self.eq_channel.take().is_some() {
            self.notify(PanelEvent::EqDialog(None));
        }
    }

    /// EQ band control of the channel the dialog is bound to
    pub fn eq_control(&self, band: EqBand) -> Result<Control> {
        self.eq_channel
            .map(|ch| Control::Eq(ch, band))
            .ok_or(PanelError::NoEqChannel)
    }

    pub fn set_eq_band(&mut self, band: EqBand, value: i32) -> Result<Option<u8>> {
        let control = self.eq_control(band)?;
        self.set_control(control, value)
    }

    /// Flatten all four bands of the open channel
    pub fn reset_eq(&mut self) -> Result<()> {
        let ch = self.eq_channel.ok_or(PanelError::NoEqChannel)?;
        for band in EqBand::all() {
            self.apply(Control::Eq(ch, *band), i32::from(CENTER))?;
        }
        self.touch();
        Ok(())
    }

    // ----- buses and FX -----

    pub fn toggle_stereo_link(&mut self) -> bool {
        let linked = !self.state.buses.stereo_link;
        self.state.buses.stereo_link = linked;
        info!("Stereo link {}", if linked { "on" } else { "off" });
        self.notify(PanelEvent::StereoLink(linked));
        if !linked {
            for control in replay::all_controls() {
                if control.targets_mon2() {
                    if let Ok(value) = self.state.value(control) {
                        self.notify_readout(control, value);
                    }
                }
            }
        }
        self.touch();
        linked
    }

    /// Select a 1-based preset on an FX engine
    pub fn select_preset(&mut self, engine: FxEngine, preset: i32) -> u8 {
        let preset = self.state.set_preset(engine, preset);
        self.emit(MidiMessage::program(preset, engine.midi_channel()));
        let name = engine.preset_name(preset).unwrap_or_default().to_string();
        self.status(format!("{} → {}", engine.as_str().to_uppercase(), name));
        self.notify(PanelEvent::Preset {
            engine,
            preset,
            name,
        });
        self.touch();
        preset
    }

    /// Recall a mixer snapshot. Not part of the scene.
    pub fn recall_snapshot(&mut self, snapshot: u8) -> Result<()> {
        if !(1..=SNAPSHOT_COUNT).contains(&snapshot) {
            return Err(PanelError::UnknownSnapshot(snapshot));
        }
        self.emit(MidiMessage::program(snapshot, channel::SNAPSHOT));
        self.active_snapshot = Some(snapshot);
        self.notify(PanelEvent::Snapshot(snapshot));
        Ok(())
    }

    pub fn tap_tempo(&mut self) {
        for message in replay::tap_tempo() {
            self.emit(message);
        }
    }

    pub fn set_option(&mut self, option: PanelOption, on: bool) {
        match option {
            PanelOption::ExclusiveSolo => self.state.options.exclusive_solo = on,
            PanelOption::LogTaper => self.state.options.log_taper = on,
        }
        self.notify(PanelEvent::OptionChanged { option, on });
        self.touch();
    }

    // ----- scene -----

    /// Write the scene immediately, dropping any pending debounced write
    pub fn save_scene_now(&mut self) -> Result<()> {
        self.save.cancel();
        match self.persist() {
            Ok(()) => {
                self.status("Scene saved");
                Ok(())
            }
            Err(e) => {
                self.status(format!("Scene save failed: {}", e));
                Err(e.into())
            }
        }
    }

    /// Restore the saved scene and re-drive the whole mixer. Returns false
    /// when there is nothing usable to load.
    pub fn load_scene(&mut self) -> bool {
        let Some(scene) = read_scene(self.store.as_ref(), &self.scene_key) else {
            self.status("No saved scene");
            return false;
        };

        scene.apply_to(&mut self.state);
        for ch in 1..=PHANTOM_CHANNELS {
            let on = self.state.channel(ch).map(|s| s.phantom).unwrap_or(false);
            if let Some(button) = self.hold_mut(ch) {
                button.sync(on);
            }
        }

        let sequence = replay::full_sequence(&self.state);
        debug!("Replaying {} messages", sequence.len());
        for message in sequence {
            self.emit(message);
        }

        self.notify_all();
        self.status("Scene loaded");
        true
    }

    /// Write a pending debounced save right away, e.g. before exiting
    pub fn flush(&mut self) {
        if self.save.is_armed() {
            self.save.cancel();
            if let Err(e) = self.persist() {
                warn!("Scene save failed: {}", e);
            }
        }
    }

    /// Remove the saved scene. A pending debounced write is dropped too.
    pub fn clear_scene(&mut self) -> Result<()> {
        self.save.cancel();
        self.store.remove(&self.scene_key)?;
        self.status("Scene cleared");
        Ok(())
    }

    fn persist(&mut self) -> std::result::Result<(), StoreError> {
        let scene = Scene::from_state(&self.state);
        write_scene(self.store.as_mut(), &self.scene_key, &scene)
    }

    fn touch(&mut self) {
        self.save.arm(self.clock.now());
    }

    // ----- device -----

    /// Re-enumerate outputs, auto-selecting one if none is selected
    pub fn refresh_devices(&mut self) -> Vec<String> {
        let was_connected = self.device.is_connected();
        match self.device.refresh() {
            Ok(ports) => {
                let ports = ports.to_vec();
                if !was_connected {
                    self.announce_output();
                }
                ports
            }
            Err(e) => {
                warn!("{}", e);
                self.status(format!("MIDI failed: {}", e));
                Vec::new()
            }
        }
    }

    pub fn select_device(&mut self, pattern: &str) -> Result<()> {
        let result = self.device.select(pattern).map(|_| ());
        self.announce_output();
        Ok(result?)
    }

    fn announce_output(&mut self) {
        let message = match self.device.current_name() {
            Some(name) => format!("Out: {}", name),
            None => "No Out".to_string(),
        };
        self.status(message);
    }

    /// Broadcast the recovery sequence to all 16 channels
    pub fn panic(&mut self) {
        if !self.device.is_connected() {
            return;
        }
        for message in panic_sequence() {
            self.emit(message);
        }
        self.status("Panic sent");
    }

    fn emit(&mut self, message: MidiMessage) {
        self.device.send(&message);
    }

    // ----- notifications -----

    fn notify(&self, event: PanelEvent) {
        for listener in &self.listeners {
            listener(&event);
        }
    }

    fn status(&self, message: impl Into<String>) {
        let message = message.into();
        info!("{}", message);
        self.notify(PanelEvent::Status(message));
    }

    fn notify_readout(&self, control: Control, value: u8) {
        self.notify(PanelEvent::Readout {
            control,
            value,
            text: control.display(value),
        });
    }

    /// mon2 controls are hidden while the monitor pair is linked
    fn shown(&self, control: Control) -> bool {
        !(self.state.buses.stereo_link && control.targets_mon2())
    }

    fn notify_channel(&self, ch: u8) {
        if self.listeners.is_empty() {
            return;
        }
        for control in replay::all_controls() {
            if control.channel() == Some(ch) && self.shown(control) {
                if let Ok(value) = self.state.value(control) {
                    self.notify_readout(control, value);
                }
            }
        }
        if let Ok(strip) = self.state.channel(ch) {
            let mut switches = vec![(Switch::Mute, strip.mute), (Switch::Solo, strip.solo)];
            if PanelState::has_phantom(ch) {
                switches.push((Switch::Phantom, strip.phantom));
            }
            for (switch, on) in switches {
                self.notify(PanelEvent::Switch {
                    channel: ch,
                    switch,
                    on,
                });
            }
        }
    }

    fn notify_all(&self) {
        if self.listeners.is_empty() {
            return;
        }
        for ch in PanelState::channel_numbers() {
            self.notify_channel(ch);
            if let Ok(strip) = self.state.channel(ch) {
                self.notify(PanelEvent::Label {
                    channel: ch,
                    label: strip.label.clone(),
                });
            }
        }
        for control in replay::all_controls() {
            if control.channel().is_none() && self.shown(control) {
                if let Ok(value) = self.state.value(control) {
                    self.notify_readout(control, value);
                }
            }
        }
        for engine in FxEngine::all() {
            let preset = self.state.fx.engine(*engine).preset;
            self.notify(PanelEvent::Preset {
                engine: *engine,
                preset,
                name: engine.preset_name(preset).unwrap_or_default().to_string(),
            });
        }
        let options = self.state.options;
        self.notify(PanelEvent::OptionChanged {
            option: PanelOption::ExclusiveSolo,
            on: options.exclusive_solo,
        });
        self.notify(PanelEvent::OptionChanged {
            option: PanelOption::LogTaper,
            on: options.log_taper,
        });
        self.notify(PanelEvent::StereoLink(self.state.buses.stereo_link));
    }
}
