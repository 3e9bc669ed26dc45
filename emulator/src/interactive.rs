//! Real-time terminal simulation of the speed trap.
//!
//! A background thread plays the 1 ms tick interrupt while the main thread
//! runs the same control loop as the firmware, with keyboard keys standing in
//! for the two strips.

use std::io::{self, Stdout, Write};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{self, ClearType};
use crossterm::{cursor, execute, queue};
use embedded_hal::delay::DelayNs;
use speedtrap_core::capture::CaptureState;
use speedtrap_core::clock::{MillisCounter, TICK_PERIOD_MS};
use speedtrap_core::config::TrapConfig;
use speedtrap_core::control::SpeedTrap;
use speedtrap_core::sim::{CapturedDisplay, CapturedLeds};
use speedtrap_core::trigger::{TriggerId, TriggerInputs};

use crate::render::{display_rows, led_row};
use crate::replay::describe;

/// Loop iterations a key press holds its strip down.
const PULSE_ITERATIONS: u8 = 3;

/// Captures listed under the display.
const RECENT_CAPTURES: usize = 5;

static CLOCK: MillisCounter = MillisCounter::new();

type HostTrap = SpeedTrap<PulsedTriggers, CapturedDisplay, CapturedLeds>;

/// Strips pressed for a few loop iterations per key press.
#[derive(Debug, Default)]
struct PulsedTriggers {
    remaining: [u8; 2],
}

impl PulsedTriggers {
    fn pulse(&mut self, id: TriggerId) {
        self.remaining[id.as_index()] = PULSE_ITERATIONS;
    }
}

impl TriggerInputs for PulsedTriggers {
    fn is_triggered(&mut self, id: TriggerId) -> bool {
        let remaining = &mut self.remaining[id.as_index()];
        if *remaining == 0 {
            return false;
        }
        *remaining -= 1;
        true
    }
}

/// Delay backed by the host scheduler.
struct HostDelay;

impl DelayNs for HostDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }
}

/// Raw mode and hidden cursor for as long as it lives.
struct TerminalGuard {
    out: Stdout,
}

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = io::stdout();
        execute!(out, cursor::Hide, terminal::Clear(ClearType::All))?;
        Ok(Self { out })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(self.out, cursor::Show, Print("\r\n"));
        let _ = terminal::disable_raw_mode();
    }
}

enum Command {
    Pulse(TriggerId),
    Quit,
}

fn command_for(key: KeyEvent) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('1') => Some(Command::Pulse(TriggerId::First)),
        KeyCode::Char('2') => Some(Command::Pulse(TriggerId::Second)),
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => Some(Command::Quit),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Command::Quit)
        }
        _ => None,
    }
}

fn start_ticker() {
    thread::spawn(|| {
        let period = Duration::from_millis(u64::from(TICK_PERIOD_MS));
        loop {
            thread::sleep(period);
            CLOCK.tick();
        }
    });
}

/// Runs until the user quits.
///
/// # Errors
///
/// Fails when the terminal cannot be driven.
pub fn run(config: TrapConfig) -> io::Result<()> {
    let mut trap: HostTrap = SpeedTrap::new(
        config,
        PulsedTriggers::default(),
        CapturedDisplay::new(),
        CapturedLeds::new(),
    );
    let mut delay = HostDelay;
    let mut guard = TerminalGuard::enter()?;
    start_ticker();

    loop {
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                match command_for(key) {
                    Some(Command::Pulse(id)) => trap.inputs_mut().pulse(id),
                    Some(Command::Quit) => return Ok(()),
                    None => {}
                }
            }
        }

        trap.run_iteration(&CLOCK, &mut delay);
        draw(&mut guard.out, &trap)?;
    }
}

fn screen(trap: &HostTrap) -> Vec<String> {
    let engine = trap.engine();
    let mut lines = vec![
        "speedtrap emulator   1: entry strip   2: exit strip   q: quit".to_string(),
        String::new(),
    ];
    lines.extend(display_rows(&trap.display().shown_all()));
    lines.push(String::new());
    lines.push(format!(
        "leds  {}   counter {}",
        led_row(&trap.leds().states()),
        engine.counter()
    ));
    lines.push(match engine.capture_state() {
        CaptureState::Idle => "state idle".to_string(),
        CaptureState::Armed { started_at } => format!("state armed since {started_at}"),
    });
    lines.push(format!("clock {}", CLOCK.now()));
    lines.push(String::new());
    lines.push("recent captures:".to_string());
    let recent: Vec<_> = engine.history().collect();
    lines.extend(
        recent
            .iter()
            .rev()
            .take(RECENT_CAPTURES)
            .map(|report| format!("  {}", describe(report))),
    );
    lines
}

fn draw(out: &mut Stdout, trap: &HostTrap) -> io::Result<()> {
    for (row, line) in (0u16..).zip(screen(trap)) {
        queue!(
            out,
            cursor::MoveTo(0, row),
            Print(line),
            terminal::Clear(ClearType::UntilNewLine)
        )?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;
    use speedtrap_core::config::DEFAULT_TRAP_CONFIG;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn pulse_holds_for_a_few_samples() {
        let mut triggers = PulsedTriggers::default();
        triggers.pulse(TriggerId::First);
        for _ in 0..PULSE_ITERATIONS {
            assert!(triggers.is_triggered(TriggerId::First));
            assert!(!triggers.is_triggered(TriggerId::Second));
        }
        assert!(!triggers.is_triggered(TriggerId::First));
    }

    #[test]
    fn keys_map_to_commands() {
        assert!(matches!(
            command_for(press(KeyCode::Char('1'))),
            Some(Command::Pulse(TriggerId::First))
        ));
        assert!(matches!(
            command_for(press(KeyCode::Char('2'))),
            Some(Command::Pulse(TriggerId::Second))
        ));
        assert!(matches!(command_for(press(KeyCode::Esc)), Some(Command::Quit)));
        assert!(command_for(press(KeyCode::Char('x'))).is_none());

        let mut release = press(KeyCode::Char('1'));
        release.kind = KeyEventKind::Release;
        assert!(command_for(release).is_none());
    }

    #[test]
    fn idle_screen_shows_blank_display() {
        let trap: HostTrap = SpeedTrap::new(
            DEFAULT_TRAP_CONFIG,
            PulsedTriggers::default(),
            CapturedDisplay::new(),
            CapturedLeds::new(),
        );
        let lines = screen(&trap);
        assert!(lines[2..5].iter().all(String::is_empty));
        assert_eq!(lines[6], "leds  . . . .   counter 0");
        assert_eq!(lines[7], "state idle");
    }
}
