//! Interactive console
//!
//! Each line typed at the `flow8>` prompt is parsed into a [`Command`] and
//! sent to the event loop, which applies it to the [`Panel`]. The prompt
//! runs on its own thread so the loop keeps ticking timers meanwhile.

use crate::panel::{Panel, PanelError, PanelEvent, PanelOption, Switch};
use crate::state::{Control, EqBand, FxEngine, ParseControlError, PanelState};
use colored::*;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::str::FromStr;
use tokio::sync::mpsc;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Set(Control, i32),
    Wheel { control: Control, up: bool, coarse: bool },
    /// Drag a knob by `dy` pixels, positive is upwards
    Drag(Control, f64),
    Mute(u8),
    Solo(u8),
    Reset(u8),
    Label(u8, String),
    PhantomPress(u8),
    PhantomRelease(u8),
    PhantomLeave(u8),
    EqOpen(u8),
    EqClose,
    EqReset,
    EqBand(EqBand, i32),
    StereoLink,
    Preset(FxEngine, i32),
    Snapshot(u8),
    Tap,
    SetOption(PanelOption, bool),
    Save,
    Load,
    Clear,
    Ports,
    Output(String),
    Panic,
    Show(Option<u8>),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error(transparent)]
    Control(#[from] ParseControlError),
}

const HELP: &str = "\
set <control> <value>        e.g. set ch3.fader 100, set master.balance 64
wheel <control> up|down [shift]
drag <control> <dy>          positive dy drags upwards
mute|solo|reset <ch>
label <ch> <text>
48v <ch> press|release|leave
eq open <ch> | close | reset | <low|lowmid|himid|hi> <value>
link                         toggle mon1/mon2 stereo link
preset fx1|fx2 <n>
snapshot <n>
tap
option exclusive-solo|log-taper on|off
save | load | clear
ports | out <name>
panic
show [ch]
quit";

fn number<T: FromStr>(arg: Option<&&str>, usage: &'static str) -> Result<T, CommandError> {
    arg.and_then(|s| s.parse().ok())
        .ok_or(CommandError::Usage(usage))
}

fn on_off(arg: Option<&&str>, usage: &'static str) -> Result<bool, CommandError> {
    match arg.map(|s| s.to_lowercase()).as_deref() {
        Some("on" | "true" | "1") => Ok(true),
        Some("off" | "false" | "0") => Ok(false),
        _ => Err(CommandError::Usage(usage)),
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((head, args)) = words.split_first() else {
            return Err(CommandError::Usage("help"));
        };

        let cmd = match head.to_lowercase().as_str() {
            "set" => {
                const USAGE: &str = "set <control> <value>";
                let control = args.first().ok_or(CommandError::Usage(USAGE))?.parse()?;
                Command::Set(control, number(args.get(1), USAGE)?)
            }
            "wheel" => {
                const USAGE: &str = "wheel <control> up|down [shift]";
                let control = args.first().ok_or(CommandError::Usage(USAGE))?.parse()?;
                let up = match args.get(1).copied() {
                    Some("up") => true,
                    Some("down") => false,
                    _ => return Err(CommandError::Usage(USAGE)),
                };
                let coarse = args.get(2).is_some_and(|s| *s == "shift");
                Command::Wheel { control, up, coarse }
            }
            "drag" => {
                const USAGE: &str = "drag <control> <dy>";
                let control = args.first().ok_or(CommandError::Usage(USAGE))?.parse()?;
                Command::Drag(control, number(args.get(1), USAGE)?)
            }
            "mute" => Command::Mute(number(args.first(), "mute <ch>")?),
            "solo" => Command::Solo(number(args.first(), "solo <ch>")?),
            "reset" => Command::Reset(number(args.first(), "reset <ch>")?),
            "label" => {
                const USAGE: &str = "label <ch> <text>";
                Command::Label(number(args.first(), USAGE)?, args[1..].join(" "))
            }
            "48v" | "phantom" => {
                const USAGE: &str = "48v <ch> press|release|leave";
                let ch = number(args.first(), USAGE)?;
                match args.get(1).copied() {
                    Some("press") => Command::PhantomPress(ch),
                    Some("release") => Command::PhantomRelease(ch),
                    Some("leave") => Command::PhantomLeave(ch),
                    _ => return Err(CommandError::Usage(USAGE)),
                }
            }
            "eq" => {
                const USAGE: &str = "eq open <ch> | close | reset | <band> <value>";
                match args.first().copied() {
                    Some("open") => Command::EqOpen(number(args.get(1), USAGE)?),
                    Some("close") => Command::EqClose,
                    Some("reset") => Command::EqReset,
                    Some(band) => {
                        let band = EqBand::parse(band).ok_or(CommandError::Usage(USAGE))?;
                        Command::EqBand(band, number(args.get(1), USAGE)?)
                    }
                    None => return Err(CommandError::Usage(USAGE)),
                }
            }
            "link" => Command::StereoLink,
            "preset" => {
                const USAGE: &str = "preset fx1|fx2 <n>";
                let engine = args
                    .first()
                    .and_then(|s| FxEngine::parse(s))
                    .ok_or(CommandError::Usage(USAGE))?;
                Command::Preset(engine, number(args.get(1), USAGE)?)
            }
            "snapshot" => Command::Snapshot(number(args.first(), "snapshot <n>")?),
            "tap" => Command::Tap,
            "option" => {
                const USAGE: &str = "option exclusive-solo|log-taper on|off";
                let option = match args.first().copied() {
                    Some("exclusive-solo") => PanelOption::ExclusiveSolo,
                    Some("log-taper") => PanelOption::LogTaper,
                    _ => return Err(CommandError::Usage(USAGE)),
                };
                Command::SetOption(option, on_off(args.get(1), USAGE)?)
            }
            "save" => Command::Save,
            "load" => Command::Load,
            "clear" => Command::Clear,
            "ports" => Command::Ports,
            "out" => {
                if args.is_empty() {
                    return Err(CommandError::Usage("out <name>"));
                }
                Command::Output(args.join(" "))
            }
            "panic" => Command::Panic,
            "show" => Command::Show(args.first().and_then(|s| s.parse().ok())),
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(cmd)
    }
}

/// Run the prompt on its own thread, forwarding parsed commands. Sends
/// `Quit` when input ends. The thread is detached so a blocked read never
/// holds up runtime shutdown.
pub fn spawn_repl(tx: mpsc::Sender<Command>) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                warn!("Console unavailable: {}", e);
                return;
            }
        };

        loop {
            match rl.readline("flow8> ") {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(line.as_str());
                    match line.parse::<Command>() {
                        Ok(cmd) => {
                            let quit = cmd == Command::Quit;
                            if tx.blocking_send(cmd).is_err() || quit {
                                break;
                            }
                        }
                        Err(e) => eprintln!("{}", e.to_string().red()),
                    }
                }
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                    let _ = tx.blocking_send(Command::Quit);
                    break;
                }
                Err(e) => {
                    warn!("Console error: {}", e);
                    break;
                }
            }
        }
        debug!("Console closed");
    })
}

/// Apply one command to the panel
pub fn execute(panel: &mut Panel, cmd: Command) -> Result<(), PanelError> {
    match cmd {
        Command::Set(control, value) => {
            report(control, panel.set_control(control, value)?);
        }
        Command::Wheel { control, up, coarse } => {
            report(control, panel.knob_wheel(control, up, coarse)?);
        }
        Command::Drag(control, dy) => {
            panel.knob_press(control, 0.0)?;
            let result = panel.knob_move(-dy);
            panel.knob_release();
            report(control, result?);
        }
        Command::Mute(ch) => {
            panel.toggle_mute(ch)?;
        }
        Command::Solo(ch) => {
            panel.toggle_solo(ch)?;
        }
        Command::Reset(ch) => {
            panel.reset_channel(ch)?;
            print_channel(panel.state(), ch);
        }
        Command::Label(ch, text) => {
            let label = panel.set_label(ch, &text)?;
            println!("CH {} → {}", ch, label.bold());
        }
        Command::PhantomPress(ch) => panel.phantom_press(ch)?,
        Command::PhantomRelease(ch) => panel.phantom_release(ch)?,
        Command::PhantomLeave(ch) => panel.phantom_leave(ch)?,
        Command::EqOpen(ch) => {
            let eq = panel.open_eq(ch)?;
            for band in EqBand::all() {
                let control = Control::Eq(ch, *band);
                println!("  {:<8} {}", band.to_string(), control.display(eq.get(*band)));
            }
        }
        Command::EqClose => panel.close_eq(),
        Command::EqReset => panel.reset_eq()?,
        Command::EqBand(band, value) => {
            let control = panel.eq_control(band)?;
            report(control, panel.set_eq_band(band, value)?);
        }
        Command::StereoLink => {
            panel.toggle_stereo_link();
        }
        Command::Preset(engine, n) => {
            panel.select_preset(engine, n);
        }
        Command::Snapshot(n) => panel.recall_snapshot(n)?,
        Command::Tap => panel.tap_tempo(),
        Command::SetOption(option, on) => panel.set_option(option, on),
        Command::Save => panel.save_scene_now()?,
        Command::Load => {
            panel.load_scene();
        }
        Command::Clear => panel.clear_scene()?,
        Command::Ports => {
            let ports = panel.refresh_devices();
            let current = panel.device().current_name().map(str::to_string);
            print_ports(&ports, current.as_deref());
        }
        Command::Output(name) => panel.select_device(&name)?,
        Command::Panic => panel.panic(),
        Command::Show(Some(ch)) => print_channel(panel.state(), ch),
        Command::Show(None) => print_overview(panel),
        Command::Help => println!("{}", HELP),
        Command::Quit => {}
    }
    Ok(())
}

fn report(control: Control, stored: Option<u8>) {
    match stored {
        Some(value) => println!("{} = {}", control.to_string().cyan(), control.display(value)),
        None => println!("{} {}", control.to_string().cyan(), "locked by stereo link".dimmed()),
    }
}

pub fn print_ports(ports: &[String], current: Option<&str>) {
    println!("\n{}", "Output Ports:".bold());
    if ports.is_empty() {
        println!("  {}", "No output ports found".dimmed());
    }
    for port in ports {
        if Some(port.as_str()) == current {
            println!("  {} {}", "[OUT]".green(), port.bright_white());
        } else {
            println!("        {}", port);
        }
    }
}

fn print_channel(state: &PanelState, ch: u8) {
    let Ok(strip) = state.channel(ch) else {
        println!("{}", format!("channel {} does not exist", ch).red());
        return;
    };
    let flag = |on: bool, name: &str| {
        if on {
            name.yellow().bold()
        } else {
            name.dimmed()
        }
    };
    println!(
        "{} {:<10} {} {} {}",
        format!("CH {}", ch).bold(),
        strip.label,
        flag(strip.mute, "M"),
        flag(strip.solo, "S"),
        if PanelState::has_phantom(ch) {
            flag(strip.phantom, "48V")
        } else {
            "".normal()
        },
    );
    let mut controls = vec![Control::Fader(ch), Control::Pan(ch)];
    controls.extend(crate::state::Bus::all().iter().map(|b| Control::Send(ch, *b)));
    if PanelState::has_preamp(ch) {
        controls.extend([Control::Gain(ch), Control::LowCut(ch), Control::Comp(ch)]);
        controls.extend(EqBand::all().iter().map(|b| Control::Eq(ch, *b)));
    }
    for control in controls {
        if let Ok(value) = state.value(control) {
            println!("  {:<14} {}", control.to_string(), control.display(value));
        }
    }
}

fn print_overview(panel: &Panel) {
    let state = panel.state();
    for (ch, strip) in state.channels() {
        println!(
            "{:<6} {:<10} {:>7}  pan {:<4} {}{}",
            format!("CH {}", ch).bold(),
            strip.label,
            Control::Fader(ch).display(strip.level),
            Control::Pan(ch).display(strip.pan),
            if strip.mute { "M ".red() } else { "  ".normal() },
            if strip.solo { "S".yellow() } else { " ".normal() },
        );
    }
    println!(
        "{:<6} {:<10} {:>7}  bal {}",
        "MAIN".bold(),
        "",
        Control::MasterLevel.display(state.master.level),
        Control::MasterBalance.display(state.master.balance)
    );
    for engine in FxEngine::all() {
        let fx = state.fx.engine(*engine);
        println!(
            "{:<6} {}",
            engine.to_string().to_uppercase().bold(),
            engine.preset_name(fx.preset).unwrap_or_default()
        );
    }
    let link = if state.buses.stereo_link { "linked".green() } else { "unlinked".dimmed() };
    println!("MON    {}", link);
    let device = panel.device();
    let out = device.current_name().unwrap_or("No Out");
    println!("OUT    {} ({} sent)", out, device.sent_count());
}

/// Console listener: status lines and 48V feedback
pub fn print_event(event: &PanelEvent) {
    match event {
        PanelEvent::Status(message) => println!("{} {}", "●".cyan(), message),
        PanelEvent::PhantomArming {
            channel,
            arming: true,
        } => println!("{} CH {} (keep holding)", "48V".yellow(), channel),
        PanelEvent::Switch {
            channel,
            switch,
            on,
        } if *switch != Switch::Phantom => {
            let name = match switch {
                Switch::Mute => "Mute",
                _ => "Solo",
            };
            let state = if *on { "on".green() } else { "off".dimmed() };
            println!("{} CH {} {}", name, channel, state);
        }
        PanelEvent::StereoLink(linked) => {
            println!("Stereo link {}", if *linked { "on".green() } else { "off".dimmed() })
        }
        PanelEvent::EqDialog(Some(ch)) => println!("{} CH {}", "EQ".bold(), ch),
        PanelEvent::Snapshot(n) => println!("Snapshot {}", n.to_string().bold()),
        _ => {}
    }
}
