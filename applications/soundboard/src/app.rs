/// Shell commands applied to the playback tracker
use crate::shell::{render_grid, ButtonView, Command, Target, HELP};
use soundboard_playback::{AudioBackend, PlaybackTracker, SoundId, SoundboardEvent};
use std::ops::ControlFlow;

/// Current button row: every scanned sound with its state and slider value
pub fn buttons<B: AudioBackend>(tracker: &PlaybackTracker<B>) -> Vec<ButtonView> {
    tracker
        .sounds()
        .into_iter()
        .map(|entry| ButtonView {
            state: tracker.state(&entry.id),
            volume: entry.volume.get(),
            id: entry.id,
        })
        .collect()
}

fn ids<B: AudioBackend>(tracker: &PlaybackTracker<B>) -> Vec<SoundId> {
    tracker.sounds().into_iter().map(|entry| entry.id).collect()
}

/// Run one command, returning the text to show (if any)
///
/// State transitions are not echoed here: the tracker publishes them as events
/// and the event printer shows each one once, including those the user did
/// not ask for (single-slot replacement, one-shots finishing). Failures are
/// reported here only. `Break` means the user asked to quit; shutdown is left
/// to the caller.
pub fn execute<B: AudioBackend>(
    tracker: &PlaybackTracker<B>,
    command: Command,
    columns: usize,
) -> ControlFlow<String, Option<String>> {
    let ids = ids(tracker);
    let unknown = |target: &Target| Some(format!("No button {}", target));
    let failed = |result: soundboard_playback::Result<()>| result.err().map(|e| e.to_string());

    let output = match command {
        Command::List => Some(render_grid(&buttons(tracker), columns)),
        Command::Help => Some(HELP.to_string()),
        Command::Quit => return ControlFlow::Break("Bye".to_string()),
        Command::StopAll => failed(tracker.stop_all()),
        Command::Toggle(target) => match target.resolve(&ids) {
            Some(id) => failed(tracker.toggle(&id).map(|_| ())),
            None => unknown(&target),
        },
        Command::Stop(target) => match target.resolve(&ids) {
            Some(id) => failed(tracker.stop(&id)),
            None => unknown(&target),
        },
        Command::Volume(target, level) => match target
            .resolve(&ids)
            .and_then(|id| tracker.volume_control(&id).map(|volume| (id, volume)))
        {
            Some((id, volume)) => {
                volume.set(level);
                Some(format!("{}: volume {:.0}%", id, level * 100.0))
            }
            None => unknown(&target),
        },
    };

    ControlFlow::Continue(output)
}

/// One-line description of a state change event
///
/// Error events are skipped; the command that caused them already reports
/// the failure.
pub fn describe(event: &SoundboardEvent) -> Option<String> {
    match event {
        SoundboardEvent::StateChanged { id, state } => Some(format!("{}: {:?}", id, state)),
        SoundboardEvent::Error { .. } => None,
    }
}
