//! User-facing console messages, kept apart from tracing logs.
//!
//! Progress and results go to stdout, problems to stderr. Each stream is colored
//! only when it is a terminal, so piping either one yields plain `tag: message` lines.

use owo_colors::OwoColorize;
use std::path::PathBuf;

#[derive(Clone, Copy)]
enum Tone {
    Info,
    Success,
    Warn,
    Error,
}

impl Tone {
    fn tag(self) -> &'static str {
        match self {
            Tone::Info => "info:",
            Tone::Success => "ok:",
            Tone::Warn => "warn:",
            Tone::Error => "error:",
        }
    }

    fn stream(self) -> atty::Stream {
        match self {
            Tone::Info | Tone::Success => atty::Stream::Stdout,
            Tone::Warn | Tone::Error => atty::Stream::Stderr,
        }
    }

    fn painted_tag(self) -> String {
        let tag = self.tag();
        if !atty::is(self.stream()) {
            return tag.to_string();
        }
        match self {
            Tone::Info => tag.cyan().bold().to_string(),
            Tone::Success => tag.green().bold().to_string(),
            Tone::Warn => tag.yellow().bold().to_string(),
            Tone::Error => tag.red().bold().to_string(),
        }
    }
}

fn emit(tone: Tone, msg: &str) {
    let line = format!("{} {msg}", tone.painted_tag());
    match tone.stream() {
        atty::Stream::Stdout => println!("{line}"),
        _ => eprintln!("{line}"),
    }
}

pub fn print_info(msg: &str) {
    emit(Tone::Info, msg);
}

pub fn print_success(msg: &str) {
    emit(Tone::Success, msg);
}

pub fn print_warn(msg: &str) {
    emit(Tone::Warn, msg);
}

pub fn print_error(msg: &str) {
    emit(Tone::Error, msg);
}

/// One untagged line per affected path, for scripts consuming the result.
pub fn print_paths<'a>(paths: impl IntoIterator<Item = &'a PathBuf>) {
    for p in paths {
        println!("{}", p.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn problems_go_to_stderr() {
        assert!(matches!(Tone::Warn.stream(), atty::Stream::Stderr));
        assert!(matches!(Tone::Error.stream(), atty::Stream::Stderr));
        assert!(matches!(Tone::Success.stream(), atty::Stream::Stdout));
        assert_eq!(Tone::Success.tag(), "ok:");
    }
}
