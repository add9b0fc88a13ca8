use super::*;
use crate::clock::ManualClock;
use crate::device::mock::MockBackend;
use crate::state::{Bus, MemoryStore};
use parking_lot::Mutex;
use std::sync::Arc;

struct Harness {
    panel: Panel,
    backend: MockBackend,
    store: MemoryStore,
    clock: ManualClock,
    events: Arc<Mutex<Vec<PanelEvent>>>,
}

impl Harness {
    fn with_store(store: MemoryStore, ports: &[&str]) -> Self {
        let backend = MockBackend::with_ports(ports);
        let device = DeviceSession::new(Box::new(backend.clone()), "FLOW 8");
        let clock = ManualClock::new();
        let mut panel = Panel::new(
            device,
            Box::new(store.clone()),
            Box::new(clock.clone()),
            PanelSettings::default(),
        );

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        panel.subscribe(Box::new(move |e| sink.lock().push(e.clone())));
        panel.refresh_devices();

        Self {
            panel,
            backend,
            store,
            clock,
            events,
        }
    }

    /// Controls named by readout events, drained
    fn readouts(&self) -> Vec<Control> {
        self.events
            .lock()
            .drain(..)
            .filter_map(|e| match e {
                PanelEvent::Readout { control, .. } => Some(control),
                _ => None,
            })
            .collect()
    }

    fn new() -> Self {
        Self::with_store(MemoryStore::new(), &["Midi Through", "FLOW 8 MIDI"])
    }

    fn sent(&self) -> Vec<Vec<u8>> {
        self.backend.take_sent()
    }

    fn statuses(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                PanelEvent::Status(s) => Some(s.clone()),
                _ => None,
            })
            .collect()
    }

    fn advance(&mut self, ms: u64) {
        self.clock.advance_ms(ms);
        self.panel.tick();
    }
}

#[test]
fn test_refresh_auto_selects_flow8() {
    let h = Harness::new();
    assert_eq!(h.panel.device().current_name(), Some("FLOW 8 MIDI"));
    assert_eq!(h.statuses(), vec!["Out: FLOW 8 MIDI".to_string()]);
}

#[test]
fn test_fader_emits_cc_and_readout() {
    let mut h = Harness::new();
    assert_eq!(h.panel.set_control(Control::Fader(3), 111).unwrap(), Some(111));
    assert_eq!(h.sent(), vec![vec![0xB2, 7, 111]]);
    assert!(h.events.lock().contains(&PanelEvent::Readout {
        control: Control::Fader(3),
        value: 111,
        text: "0 dB".to_string(),
    }));
}

#[test]
fn test_set_control_clamps() {
    let mut h = Harness::new();
    assert_eq!(h.panel.set_control(Control::Pan(1), 400).unwrap(), Some(127));
    assert_eq!(h.panel.set_control(Control::Comp(2), 127).unwrap(), Some(100));
    assert_eq!(h.sent(), vec![vec![0xB0, 10, 127], vec![0xB1, 11, 100]]);
}

#[test]
fn test_log_taper_only_changes_transmitted_value() {
    let mut h = Harness::new();
    h.panel.set_option(PanelOption::LogTaper, true);
    h.panel.set_control(Control::Fader(1), 64).unwrap();
    h.panel.set_control(Control::MasterLevel, 127).unwrap();
    assert_eq!(h.panel.state().channel(1).unwrap().level, 64);
    assert_eq!(h.sent(), vec![vec![0xB0, 7, 28], vec![0xB7, 7, 127]]);
}

#[test]
fn test_invalid_targets_rejected() {
    let mut h = Harness::new();
    assert!(h.panel.set_control(Control::Fader(8), 10).is_err());
    assert!(h.panel.set_control(Control::Gain(7), 10).is_err());
    assert!(h.panel.toggle_mute(0).is_err());
    assert!(h.sent().is_empty());
}

#[test]
fn test_exclusive_solo_clears_others_first() {
    let mut h = Harness::new();
    h.panel.toggle_solo(1).unwrap();
    h.panel.toggle_solo(5).unwrap();
    h.panel.set_option(PanelOption::ExclusiveSolo, true);
    h.sent();

    assert!(h.panel.toggle_solo(3).unwrap());

    assert_eq!(
        h.sent(),
        vec![vec![0xB0, 6, 0], vec![0xB4, 6, 0], vec![0xB2, 6, 127]]
    );
    let state = h.panel.state();
    assert!(!state.channel(1).unwrap().solo);
    assert!(!state.channel(5).unwrap().solo);
    assert!(state.channel(3).unwrap().solo);
}

#[test]
fn test_solo_without_exclusive_accumulates() {
    let mut h = Harness::new();
    h.panel.toggle_solo(1).unwrap();
    h.panel.toggle_solo(2).unwrap();
    assert_eq!(h.sent(), vec![vec![0xB0, 6, 127], vec![0xB1, 6, 127]]);

    // switching solo off never touches other channels
    h.panel.set_option(PanelOption::ExclusiveSolo, true);
    assert!(!h.panel.toggle_solo(1).unwrap());
    assert_eq!(h.sent(), vec![vec![0xB0, 6, 0]]);
    assert!(h.panel.state().channel(2).unwrap().solo);
}

#[test]
fn test_mute_toggles() {
    let mut h = Harness::new();
    assert!(h.panel.toggle_mute(7).unwrap());
    assert!(!h.panel.toggle_mute(7).unwrap());
    assert_eq!(h.sent(), vec![vec![0xB6, 5, 127], vec![0xB6, 5, 0]]);
}

#[test]
fn test_phantom_short_press_does_nothing() {
    let mut h = Harness::new();
    h.panel.phantom_press(1).unwrap();
    h.advance(1500);
    h.panel.phantom_release(1).unwrap();
    h.advance(1000);

    assert!(h.sent().is_empty());
    assert!(!h.panel.state().channel(1).unwrap().phantom);
    assert_eq!(h.panel.hold_state(1), Some(phantom::HoldState::Inactive));
}

#[test]
fn test_phantom_hold_activates_once() {
    let mut h = Harness::new();
    h.panel.phantom_press(2).unwrap();
    h.advance(1999);
    assert!(h.sent().is_empty());
    h.advance(1);
    h.panel.phantom_release(2).unwrap();
    h.advance(100);

    assert_eq!(h.sent(), vec![vec![0xB1, 12, 127]]);
    assert!(h.panel.state().channel(2).unwrap().phantom);
    assert!(matches!(
        h.panel.hold_state(2),
        Some(phantom::HoldState::Active { .. })
    ));
    assert!(h.statuses().contains(&"48V ON (CH 2)".to_string()));

    // a later click switches it off
    h.panel.phantom_press(2).unwrap();
    h.panel.phantom_release(2).unwrap();
    assert_eq!(h.sent(), vec![vec![0xB1, 12, 0]]);
    assert!(!h.panel.state().channel(2).unwrap().phantom);
    assert!(h.statuses().contains(&"48V OFF (CH 2)".to_string()));
}

#[test]
fn test_phantom_leave_cancels_arming() {
    let mut h = Harness::new();
    h.panel.phantom_press(1).unwrap();
    h.advance(1000);
    h.panel.phantom_leave(1).unwrap();
    h.advance(5000);
    assert!(h.sent().is_empty());
    assert!(h.events.lock().contains(&PanelEvent::PhantomArming {
        channel: 1,
        arming: false
    }));
}

#[test]
fn test_phantom_only_on_first_two_channels() {
    let mut h = Harness::new();
    assert!(matches!(
        h.panel.phantom_press(3),
        Err(PanelError::State(StateError::NotApplicable { channel: 3, .. }))
    ));
    assert!(h.panel.phantom_press(9).is_err());
}

#[test]
fn test_reset_channel_4() {
    let mut h = Harness::new();
    h.panel.set_control(Control::Fader(4), 20).unwrap();
    h.panel.set_control(Control::Pan(4), 3).unwrap();
    h.panel.set_control(Control::Send(4, Bus::Fx2), 90).unwrap();
    h.panel.set_control(Control::Eq(4, EqBand::HiMid), 0).unwrap();
    h.panel.set_label(4, "Vocals").unwrap();
    h.panel.toggle_mute(4).unwrap();
    h.sent();
    h.events.lock().clear();

    h.panel.reset_channel(4).unwrap();

    let strip = h.panel.state().channel(4).unwrap();
    assert_eq!(strip.level, 100);
    assert_eq!(strip.pan, 64);
    assert_eq!(Control::Pan(4).display(strip.pan), "C");
    for bus in Bus::all() {
        assert_eq!(strip.send(*bus), 0);
    }
    for band in EqBand::all() {
        assert_eq!(strip.eq.get(*band), 64);
        assert_eq!(Control::Eq(4, *band).display(64), "+0dB");
    }
    assert!(!strip.mute);
    assert_eq!(strip.label, "Vocals");

    assert_eq!(
        h.sent(),
        vec![
            vec![0xB3, 7, 100],
            vec![0xB3, 5, 0],
            vec![0xB3, 6, 0],
            vec![0xB3, 16, 0],
            vec![0xB3, 17, 0],
            vec![0xB3, 14, 0],
            vec![0xB3, 15, 0],
            vec![0xB3, 10, 64],
            vec![0xB3, 8, 32],
            vec![0xB3, 9, 0],
            vec![0xB3, 11, 0],
            vec![0xB3, 1, 64],
            vec![0xB3, 2, 64],
            vec![0xB3, 3, 64],
            vec![0xB3, 4, 64],
        ]
    );
    assert!(h.events.lock().contains(&PanelEvent::Readout {
        control: Control::Pan(4),
        value: 64,
        text: "C".to_string(),
    }));
}

#[test]
fn test_reset_channel_2_keeps_phantom() {
    let mut h = Harness::new();
    h.panel.phantom_press(2).unwrap();
    h.advance(2000);
    h.panel.phantom_release(2).unwrap();
    h.sent();

    h.panel.reset_channel(2).unwrap();

    assert!(h.panel.state().channel(2).unwrap().phantom);
    let sent = h.sent();
    assert_eq!(sent.len(), 16);
    assert_eq!(sent.last(), Some(&vec![0xB1, 12, 127]));
}

#[test]
fn test_reset_while_linked_skips_mon2_send() {
    let mut h = Harness::new();
    h.panel.toggle_stereo_link();
    h.panel.reset_channel(7).unwrap();
    let sent = h.sent();
    assert_eq!(sent.len(), 7);
    assert!(!sent.contains(&vec![0xB6, 15, 0]));
}

#[test]
fn test_stereo_link_suppresses_mon2() {
    let mut h = Harness::new();
    h.panel.set_control(Control::Send(1, Bus::Mon2), 20).unwrap();
    h.sent();

    assert!(h.panel.toggle_stereo_link());
    assert_eq!(h.panel.set_control(Control::Send(1, Bus::Mon2), 50).unwrap(), None);
    assert_eq!(h.panel.set_control(Control::BusLevel(Bus::Mon2), 50).unwrap(), None);
    assert_eq!(h.panel.set_control(Control::BusLimiter(Bus::Mon2), 50).unwrap(), None);
    assert_eq!(
        h.panel.knob_wheel(Control::Send(2, Bus::Mon2), true, true).unwrap(),
        None
    );
    assert!(h.sent().is_empty());
    assert_eq!(h.panel.state().channel(1).unwrap().mon2, 20);
    assert_eq!(h.panel.state().buses.mon2.level, 110);

    // mon1 is unaffected
    h.panel.set_control(Control::BusLevel(Bus::Mon1), 90).unwrap();
    assert_eq!(h.sent(), vec![vec![0xB8, 7, 90]]);

    assert!(!h.panel.toggle_stereo_link());
    assert_eq!(
        h.panel.set_control(Control::Send(1, Bus::Mon2), 50).unwrap(),
        Some(50)
    );
    assert_eq!(h.sent(), vec![vec![0xB0, 15, 50]]);
}

#[test]
fn test_stereo_link_hides_mon2_readouts() {
    let mut h = Harness::new();
    h.panel.toggle_stereo_link();
    h.readouts();

    h.panel.reset_channel(3).unwrap();
    let shown = h.readouts();
    assert!(shown.contains(&Control::Send(3, Bus::Mon1)));
    assert!(!shown.iter().any(|c| c.targets_mon2()));

    h.panel.save_scene_now().unwrap();
    assert!(h.panel.load_scene());
    let shown = h.readouts();
    assert!(shown.contains(&Control::BusLevel(Bus::Mon1)));
    assert!(!shown.iter().any(|c| c.targets_mon2()));

    h.panel.toggle_stereo_link();
    let shown = h.readouts();
    assert_eq!(shown.len(), 9);
    assert!(shown.iter().all(|c| c.targets_mon2()));
    assert!(shown.contains(&Control::BusLimiter(Bus::Mon2)));
}

#[test]
fn test_knob_drag_applies_and_persists_on_release() {
    let mut h = Harness::new();
    assert_eq!(h.panel.knob_press(Control::Comp(1), 200.0).unwrap(), 0);
    assert_eq!(h.panel.knob_move(100.0).unwrap(), Some(50));
    assert_eq!(h.panel.knob_move(-400.0).unwrap(), Some(100));
    assert!(!h.panel.save_pending());
    h.panel.knob_release();
    assert!(h.panel.save_pending());

    assert_eq!(h.sent(), vec![vec![0xB0, 11, 50], vec![0xB0, 11, 100]]);
    assert_eq!(h.panel.knob_move(0.0).unwrap(), None);
}

#[test]
fn test_knob_drag_off_screen_clamps() {
    let mut h = Harness::new();
    h.panel.knob_press(Control::Fader(1), 0.0).unwrap();
    assert_eq!(h.panel.knob_move(f64::NEG_INFINITY).unwrap(), Some(127));
    assert_eq!(h.panel.knob_move(1e20).unwrap(), Some(0));
    h.panel.knob_release();
    assert_eq!(h.sent(), vec![vec![0xB0, 7, 127], vec![0xB0, 7, 0]]);
}

#[test]
fn test_knob_wheel_steps() {
    let mut h = Harness::new();
    h.panel.knob_wheel(Control::Gain(1), true, false).unwrap();
    h.panel.knob_wheel(Control::Gain(1), true, true).unwrap();
    h.panel.knob_wheel(Control::Gain(1), false, false).unwrap();
    assert_eq!(h.panel.state().channel(1).unwrap().gain, 42);
    assert_eq!(
        h.sent(),
        vec![vec![0xB0, 8, 34], vec![0xB0, 8, 44], vec![0xB0, 8, 42]]
    );
}

#[test]
fn test_eq_dialog_binding() {
    let mut h = Harness::new();
    assert!(matches!(
        h.panel.set_eq_band(EqBand::Low, 70),
        Err(PanelError::NoEqChannel)
    ));
    assert!(h.panel.open_eq(7).is_err());

    h.panel.open_eq(3).unwrap();
    assert_eq!(h.panel.eq_channel(), Some(3));
    h.panel.set_eq_band(EqBand::Low, 70).unwrap();
    h.panel.set_eq_band(EqBand::Hi, 10).unwrap();
    assert_eq!(h.sent(), vec![vec![0xB2, 1, 70], vec![0xB2, 4, 10]]);

    h.panel.reset_eq().unwrap();
    assert_eq!(
        h.sent(),
        vec![
            vec![0xB2, 1, 64],
            vec![0xB2, 2, 64],
            vec![0xB2, 3, 64],
            vec![0xB2, 4, 64],
        ]
    );
    assert_eq!(h.panel.state().channel(3).unwrap().eq, EqBands::FLAT);

    h.panel.close_eq();
    assert_eq!(h.panel.eq_channel(), None);
    assert!(matches!(h.panel.reset_eq(), Err(PanelError::NoEqChannel)));
}

#[test]
fn test_preset_selection() {
    let mut h = Harness::new();
    assert_eq!(h.panel.select_preset(FxEngine::Fx1, 6), 6);
    assert_eq!(h.panel.select_preset(FxEngine::Fx2, 99), 16);
    assert_eq!(h.sent(), vec![vec![0xCD, 5], vec![0xCE, 15]]);
    let statuses = h.statuses();
    assert!(statuses.contains(&"FX1 → Chamber".to_string()));
    assert!(statuses.contains(&"FX2 → Deep Chorus".to_string()));
}

#[test]
fn test_fx_params() {
    let mut h = Harness::new();
    h.panel.set_control(Control::FxParam1(FxEngine::Fx2), 127).unwrap();
    h.panel.set_control(Control::FxParam2(FxEngine::Fx1), 2).unwrap();
    assert_eq!(h.sent(), vec![vec![0xBE, 1, 127], vec![0xBD, 2, 2]]);
}

#[test]
fn test_snapshot_recall_is_not_persisted() {
    let mut h = Harness::new();
    h.panel.recall_snapshot(3).unwrap();
    assert_eq!(h.sent(), vec![vec![0xCF, 2]]);
    assert_eq!(h.panel.active_snapshot(), Some(3));
    assert!(!h.panel.save_pending());

    assert!(matches!(
        h.panel.recall_snapshot(0),
        Err(PanelError::UnknownSnapshot(0))
    ));
    assert!(h.panel.recall_snapshot(SNAPSHOT_COUNT + 1).is_err());
    assert!(h.sent().is_empty());
}

#[test]
fn test_tap_tempo() {
    let mut h = Harness::new();
    h.panel.tap_tempo();
    assert_eq!(h.sent(), vec![vec![0x9F, 60, 127], vec![0x8F, 60, 0]]);
}

#[test]
fn test_panic_broadcast() {
    let mut h = Harness::new();
    h.panel.panic();
    let sent = h.sent();
    assert_eq!(sent.len(), 64);
    assert_eq!(sent[0], vec![0xB0, 121, 0]);
    assert!(h.statuses().contains(&"Panic sent".to_string()));
}

#[test]
fn test_without_device_state_still_tracks() {
    let mut h = Harness::with_store(MemoryStore::new(), &[]);
    assert!(!h.panel.device().is_connected());
    assert_eq!(h.statuses(), vec!["No Out".to_string()]);

    h.panel.set_control(Control::Fader(1), 5).unwrap();
    h.panel.toggle_mute(1).unwrap();
    h.panel.panic();
    assert_eq!(h.panel.state().channel(1).unwrap().level, 5);
    assert!(h.sent().is_empty());
    assert!(!h.statuses().contains(&"Panic sent".to_string()));
}

#[test]
fn test_enumeration_failure_is_a_status() {
    let h = Harness::new();
    h.backend.fail_enumeration(true);
    let mut panel = h.panel;
    assert!(panel.refresh_devices().is_empty());
    assert!(h
        .events
        .lock()
        .iter()
        .any(|e| matches!(e, PanelEvent::Status(s) if s.starts_with("MIDI failed"))));
}

#[test]
fn test_select_device_swaps_target() {
    let mut h = Harness::new();
    h.panel.select_device("through").unwrap();
    h.panel.toggle_mute(1).unwrap();
    assert_eq!(h.backend.sent_to("Midi Through"), vec![vec![0xB0, 5, 127]]);
    assert!(h.statuses().contains(&"Out: Midi Through".to_string()));

    assert!(h.panel.select_device("missing").is_err());
    assert!(!h.panel.device().is_connected());
    assert_eq!(h.statuses().last().map(String::as_str), Some("No Out"));
}

#[test]
fn test_debounce_coalesces_writes() {
    let mut h = Harness::new();
    for v in 0..5 {
        h.panel.set_control(Control::Fader(1), v * 10).unwrap();
        h.advance(200);
    }
    assert_eq!(h.store.write_count(), 0);

    h.advance(99);
    assert_eq!(h.store.write_count(), 0);
    h.advance(1);
    assert_eq!(h.store.write_count(), 1);

    h.advance(1000);
    assert_eq!(h.store.write_count(), 1);
}

#[test]
fn test_save_now_cancels_pending_write() {
    let mut h = Harness::new();
    h.panel.set_control(Control::Fader(1), 3).unwrap();
    h.panel.save_scene_now().unwrap();
    assert_eq!(h.store.write_count(), 1);
    h.advance(500);
    assert_eq!(h.store.write_count(), 1);
    assert!(h.statuses().contains(&"Scene saved".to_string()));
}

#[test]
fn test_flush_writes_pending_save() {
    let mut h = Harness::new();
    h.panel.flush();
    assert_eq!(h.store.write_count(), 0);

    h.panel.toggle_mute(2).unwrap();
    assert!(h.panel.save_pending());
    h.panel.flush();
    assert_eq!(h.store.write_count(), 1);
    assert!(!h.panel.save_pending());

    h.advance(1000);
    assert_eq!(h.store.write_count(), 1);
}

#[test]
fn test_save_then_load_restores_and_redrives() {
    let mut h = Harness::new();
    h.panel.set_option(PanelOption::ExclusiveSolo, true);
    h.panel.set_control(Control::Fader(2), 12).unwrap();
    h.panel.set_control(Control::Send(6, Bus::Mon2), 77).unwrap();
    h.panel.set_control(Control::Eq(1, EqBand::LowMid), 99).unwrap();
    h.panel.set_control(Control::MasterBalance, 30).unwrap();
    h.panel.set_control(Control::BusLimiter(Bus::Fx2), 40).unwrap();
    h.panel.set_control(Control::FxParam1(FxEngine::Fx1), 88).unwrap();
    h.panel.select_preset(FxEngine::Fx2, 4);
    h.panel.toggle_solo(5).unwrap();
    h.panel.set_label(3, "Bass").unwrap();
    h.panel.phantom_press(1).unwrap();
    h.advance(2000);
    h.panel.phantom_release(1).unwrap();
    h.panel.save_scene_now().unwrap();
    let saved = h.panel.state().clone();

    let mut fresh = Harness::with_store(h.store.clone(), &["FLOW 8"]);
    fresh.sent();
    assert!(fresh.panel.load_scene());

    assert_eq!(fresh.panel.state(), &saved);
    let expected: Vec<Vec<u8>> = replay::full_sequence(&saved)
        .iter()
        .map(MidiMessage::encode)
        .collect();
    assert_eq!(fresh.sent(), expected);
    assert_eq!(expected.len(), 117);
    assert!(expected.contains(&vec![0xB5, 15, 77]));
    assert!(expected.contains(&vec![0xB0, 12, 127]));
    assert!(fresh.statuses().contains(&"Scene loaded".to_string()));
    assert!(matches!(
        fresh.panel.hold_state(1),
        Some(phantom::HoldState::Active {
            just_activated: false
        })
    ));
}

#[test]
fn test_load_with_stereo_link_skips_mon2() {
    let mut h = Harness::new();
    h.panel.toggle_stereo_link();
    h.panel.save_scene_now().unwrap();

    let mut fresh = Harness::with_store(h.store.clone(), &["FLOW 8"]);
    fresh.sent();
    fresh.panel.load_scene();
    let sent = fresh.sent();

    // one mon2 send per channel plus the mon2 level and limiter
    assert_eq!(sent.len(), 117 - 7 - 2);
    assert!(sent.iter().all(|m| m[0] != 0xB9));
    assert!(!sent.iter().any(|m| m[0] & 0xF0 == 0xB0 && m[0] <= 0xB6 && m[1] == 15));
}

#[test]
fn test_load_without_scene() {
    let mut h = Harness::new();
    h.sent();
    assert!(!h.panel.load_scene());
    assert!(h.sent().is_empty());
    assert_eq!(h.statuses().last().map(String::as_str), Some("No saved scene"));

    h.store.insert_raw(DEFAULT_SCENE_KEY, b"[1, 2");
    assert!(!h.panel.load_scene());
    assert!(h.sent().is_empty());
}

#[test]
fn test_load_scene_with_mistyped_master_keeps_channels() {
    let mut h = Harness::new();
    h.store.insert_raw(
        DEFAULT_SCENE_KEY,
        br#"{"master": 5, "channels": [{"channel": 1, "level": 10}]}"#,
    );
    h.sent();
    assert!(h.panel.load_scene());

    assert_eq!(h.panel.state().channel(1).unwrap().level, 10);
    assert_eq!(h.panel.state().master.level, 110);
    let sent = h.sent();
    assert_eq!(sent.len(), 117);
    assert!(sent.contains(&vec![0xB0, 7, 10]));
    assert!(h.statuses().contains(&"Scene loaded".to_string()));
}

#[test]
fn test_load_partial_scene_defaults_missing_fields() {
    let mut h = Harness::new();
    h.store.insert_raw(
        DEFAULT_SCENE_KEY,
        br#"{"logTaper": true, "channels": [{"channel": 3, "level": 50, "mute": true}]}"#,
    );
    h.sent();
    assert!(h.panel.load_scene());

    let state = h.panel.state();
    assert!(state.options.log_taper);
    let strip = state.channel(3).unwrap();
    assert_eq!(strip.level, 50);
    assert!(strip.mute);
    assert_eq!(strip.pan, 64);
    assert_eq!(strip.gain, 32);
    assert_eq!(strip.label, "CH 3");
    assert_eq!(state.master.level, 110);
    assert_eq!(h.sent().len(), 117);
}

#[test]
fn test_clear_scene() {
    let mut h = Harness::new();
    h.panel.save_scene_now().unwrap();
    h.panel.set_control(Control::Fader(1), 1).unwrap();
    h.panel.clear_scene().unwrap();
    h.advance(1000);

    assert_eq!(h.store.raw(DEFAULT_SCENE_KEY), None);
    assert!(!h.panel.load_scene());
    assert!(h.statuses().contains(&"Scene cleared".to_string()));
}

#[test]
fn test_labels() {
    let mut h = Harness::new();
    assert_eq!(h.panel.set_label(5, "  Keys ").unwrap(), "Keys");
    assert_eq!(h.panel.set_label(5, "   ").unwrap(), "CH 5/6");
    assert!(h.panel.save_pending());
    assert!(h.sent().is_empty());
}

#[test]
fn test_start_loads_scene_onto_selected_output() {
    let store = MemoryStore::new();
    {
        let mut h = Harness::with_store(store.clone(), &["FLOW 8"]);
        h.panel.set_control(Control::Fader(1), 77).unwrap();
        h.panel.save_scene_now().unwrap();
    }

    let mut h = Harness::with_store(store, &["FLOW 8"]);
    h.sent();
    h.panel.start();
    assert_eq!(h.panel.state().channel(1).unwrap().level, 77);
    assert_eq!(h.sent()[0], vec![0xB0, 7, 77]);
    assert!(h.statuses().contains(&"MIDI ready (Out only)".to_string()));
}
