//! Value/display conversions
//!
//! Maps raw 7-bit control values to the readouts shown next to each control,
//! and applies the optional logarithmic taper to outgoing fader values.

/// Rounds half-way cases towards positive infinity (`-0.5 -> 0`, `-69.5 -> -69`).
pub fn round_half_up(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

fn signed(value: i64, non_negative: bool) -> String {
    if non_negative {
        format!("+{}", value)
    } else {
        value.to_string()
    }
}

/// Linear map of `raw` from 0..=127 onto `lo..=lo+span`
fn linear(raw: u8, lo: f64, span: f64) -> f64 {
    lo + raw as f64 * (span / 127.0)
}

/// Fader value actually transmitted. Identity unless `log_taper` is set.
pub fn map_fader_out(raw: u8, log_taper: bool) -> u8 {
    if !log_taper {
        return raw;
    }
    let n = (raw as f64 / 127.0).clamp(0.0, 1.0);
    round_half_up(n.powf(2.2) * 127.0).clamp(0, 127) as u8
}

/// Fader level readout (`-70 dB` .. `+10 dB`)
pub fn fader_db(raw: u8) -> String {
    if raw == 0 {
        return "-70 dB".to_string();
    }
    let db = linear(raw, -70.0, 80.0);
    format!("{} dB", signed(round_half_up(db), db >= 0.0))
}

/// Send level readout, `OFF` at zero
pub fn send_display(raw: u8) -> String {
    if raw == 0 {
        return "OFF".to_string();
    }
    let db = linear(raw, -70.0, 80.0);
    format!("{}dB", signed(round_half_up(db), db >= 0.0))
}

/// Percentage of `max`
pub fn percent_display(raw: u8, max: u8) -> String {
    if max == 0 {
        return "0%".to_string();
    }
    format!("{}%", round_half_up(raw as f64 / max as f64 * 100.0))
}

/// `C` at centre (64), `L<n>` left of it, `R<n>` right of it
pub fn pan_display(raw: u8) -> String {
    match raw {
        64 => "C".to_string(),
        r if r < 64 => format!("L{}", 64 - r),
        r => format!("R{}", r - 64),
    }
}

pub fn balance_display(raw: u8) -> String {
    pan_display(raw)
}

/// Preamp gain readout (-20 dB .. +60 dB)
pub fn gain_display(raw: u8) -> String {
    let db = linear(raw, -20.0, 80.0);
    format!("{}dB", signed(round_half_up(db), db >= 0.0))
}

/// Low-cut corner frequency (20 Hz .. 600 Hz)
pub fn low_cut_display(raw: u8) -> String {
    format!("{}Hz", round_half_up(linear(raw, 20.0, 580.0)))
}

/// Compressor amount, knob range 0..=100
pub fn comp_display(raw: u8) -> String {
    percent_display(raw, 100)
}

/// EQ band readout (-15 dB .. +15 dB)
pub fn eq_display(raw: u8) -> String {
    let db = linear(raw, -15.0, 30.0);
    format!("{}dB", signed(round_half_up(db), db >= 0.0))
}

/// Factory label of an input channel
pub fn default_label(channel: u8) -> String {
    match channel {
        5 => "CH 5/6".to_string(),
        6 => "CH 7/8".to_string(),
        7 => "USB / BT".to_string(),
        n => format!("CH {}", n),
    }
}
