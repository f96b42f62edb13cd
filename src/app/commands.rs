//! Inbound console commands.
//!
//! Small grammar: a verb plus typed arguments.
//!
//! ```text
//!  line    := "" | verb | "set" key value
//!  verb    := status | config | json | sound | leds | debug | reset | help
//!  key     := temp | distance | score
//! ```
//!
//! Matching is case-insensitive on whitespace-trimmed input.  `set` values
//! follow the device's string-to-number rules: the longest leading numeric
//! prefix is used and a value with no numeric prefix reads as zero.

use crate::config::MAX_LINE_LEN;

/// A runtime setting carried by `set`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Setting {
    /// `set temp X` — thermal differential threshold (°C).
    Temp(f32),
    /// `set distance X` — range delta threshold (cm).
    Distance(f32),
    /// `set score X` — detection threshold.
    Score(i32),
}

/// Commands the console can send into the service.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Empty line: one-shot diagnostic sample plus state dump.
    Diagnostic,
    Status,
    Config,
    ToggleJson,
    ToggleSound,
    ToggleLeds,
    ToggleDebug,
    Set(Setting),
    /// Request a full restart.
    Reset,
    Help,
    /// Anything else; carries the offending input.
    Unknown(heapless::String<MAX_LINE_LEN>),
}

impl Command {
    /// Parse one complete line (terminator already stripped).
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let lower = line.to_ascii_lowercase();
        let mut words = lower.split_whitespace();

        let Some(verb) = words.next() else {
            return Self::Diagnostic;
        };

        match (verb, words.next()) {
            ("status", None) => Self::Status,
            ("config", None) => Self::Config,
            ("json", None) => Self::ToggleJson,
            ("sound", None) => Self::ToggleSound,
            ("leds", None) => Self::ToggleLeds,
            ("debug", None) => Self::ToggleDebug,
            ("reset", None) => Self::Reset,
            ("help", None) => Self::Help,
            ("set", Some(key)) => {
                let value = words.next().unwrap_or("");
                match key {
                    "temp" => Self::Set(Setting::Temp(lenient_f32(value))),
                    "distance" => Self::Set(Setting::Distance(lenient_f32(value))),
                    "score" => Self::Set(Setting::Score(lenient_i32(value))),
                    _ => Self::unknown(line),
                }
            }
            _ => Self::unknown(line),
        }
    }

    fn unknown(line: &str) -> Self {
        let mut s = heapless::String::new();
        for c in line.chars() {
            if s.push(c).is_err() {
                break;
            }
        }
        Self::Unknown(s)
    }
}

/// Help text listing every command.
pub const HELP: &str = "\
commands:
  status            state and counters
  config            current configuration
  json              toggle JSON output
  sound             toggle sound feedback
  leds              toggle LED feedback
  debug             toggle per-tick debug logging
  set temp X        thermal threshold (C)
  set distance X    range delta threshold (cm)
  set score X       detection score threshold
  reset             restart the controller
  help              this text
  <empty line>      one-shot diagnostic sample";

// ---------------------------------------------------------------------------
// Lenient numeric parsing
// ---------------------------------------------------------------------------

/// Length of the leading `[+-]digits[.digits][e[+-]digits]` run in `s`.
/// Without `allow_fraction` only the sign and integer digits count.
fn numeric_prefix_len(s: &str, allow_fraction: bool) -> usize {
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut i = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(i);
    let mut mantissa_digits = int_end - i;
    i = int_end;
    if !allow_fraction {
        return i;
    }
    if bytes.get(i) == Some(&b'.') {
        let frac_end = digits_from(i + 1);
        mantissa_digits += frac_end - (i + 1);
        i = frac_end;
    }
    if mantissa_digits == 0 {
        return i;
    }
    // Exponent only counts when at least one digit follows it.
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_end = digits_from(j);
        if exp_end > j {
            i = exp_end;
        }
    }
    i
}

/// Float from the leading numeric prefix, 0 if there is none.
/// Out-of-range magnitudes saturate at `f32::MAX` so the stored value
/// always prints back as a number.
pub fn lenient_f32(s: &str) -> f32 {
    let end = numeric_prefix_len(s, true);
    s[..end]
        .parse::<f32>()
        .map(|v| v.clamp(-f32::MAX, f32::MAX))
        .unwrap_or(0.0)
}

/// Integer from the leading numeric prefix, 0 if there is none.
/// Saturates at the `i32` bounds.
pub fn lenient_i32(s: &str) -> i32 {
    let end = numeric_prefix_len(s, false);
    s[..end]
        .parse::<i64>()
        .map(|v| v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
        .unwrap_or(0)
}
