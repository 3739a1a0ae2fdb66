use std::io::Write;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

use crate::timer::TimerEvent;

/// Player/sound pairs tried in order; the first whose file exists is used
const SOUND_PLAYERS: [(&str, &str); 3] = [
    ("paplay", "/usr/share/sounds/freedesktop/stereo/complete.oga"),
    ("aplay", "/usr/share/sounds/sound-icons/guitar-11.wav"),
    ("aplay", "/usr/share/sounds/generic.wav"),
];

/// Best-effort signal that a countdown reached zero. Never fails.
pub trait Notifier {
    fn notify(&self, event: &TimerEvent);
}

/// Terminal bell plus a system sound when one is installed
#[derive(Debug, Default)]
pub struct SoundNotifier;

impl Notifier for SoundNotifier {
    fn notify(&self, event: &TimerEvent) {
        if !event.wants_notification() {
            return;
        }
        let mut stdout = std::io::stdout();
        let _ = stdout.write_all(b"\x07");
        let _ = stdout.flush();

        std::thread::spawn(|| {
            if let Some((player, sound)) = SOUND_PLAYERS
                .iter()
                .find(|(_, sound)| Path::new(sound).exists())
            {
                let _ = play(player, sound);
            }
        });
    }
}

/// Run a sound player to completion; waiting reaps the child process
fn play(player: &str, sound: &str) -> std::io::Result<ExitStatus> {
    Command::new(player)
        .arg(sound)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
}

#[derive(Debug, Default)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, _event: &TimerEvent) {}
}

/// Notifier chosen by the `sound_enabled` setting
pub fn from_settings(sound_enabled: bool) -> Box<dyn Notifier> {
    if sound_enabled {
        Box::new(SoundNotifier)
    } else {
        Box::new(SilentNotifier)
    }
}
