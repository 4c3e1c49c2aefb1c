// src/main.rs
//
// Headless sanity run: drives the player against the simulated engine and
// audio output and prints what the page would show after each step.
//
// Usage: starry-night-player [config.json]

use std::error::Error;

use starrynight::{
    AudioContextState, Command, Direction, EngineEvent, Epoch, KeyDisplay, Player, PlayerConfig,
    Track,
    sim::{SimulatedAudio, SimulatedEngine},
};

type SimPlayer = Player<SimulatedEngine, SimulatedAudio>;

/// ===============================
/// Rendering
/// ===============================

fn key_row(keys: &KeyDisplay) -> String {
    keys.iter()
        .map(|slot| match (slot.highlighted, slot.color.is_some()) {
            (true, _) => '#',
            (false, true) => '+',
            (false, false) => '.',
        })
        .collect()
}

fn show(step: &str, player: &SimPlayer) {
    let r = player.readback();
    println!("--- {step} ---");
    println!(
        "{:?} | track {} \"{}\" | {:?} / {:?} | {:?} | {} / {}",
        r.screen,
        r.track_index,
        r.track_name,
        r.playback_state,
        r.load_status,
        r.display_mode,
        r.now_label,
        r.end_label
    );
    println!("{}", key_row(player.keys()));
    if let Some(error) = &r.last_error {
        println!("error: {error}");
    }
}

fn notes(player: &mut SimPlayer, epoch: Epoch, on: bool, notes: &[u8]) {
    let status = if on { 0x90 } else { 0x80 };
    for &note in notes {
        if let Some(event) = EngineEvent::from_midi(epoch, status, note) {
            player.handle_event(event);
        }
    }
}

fn default_config() -> PlayerConfig {
    PlayerConfig::new(vec![
        Track::new("midi/clair_de_lune.mid", "Clair de Lune"),
        Track::new("midi/gymnopedie_1.mid", "Gymnopédie No. 1"),
        Track::new("midi/reverie.mid", "Rêverie"),
    ])
}

/// ===============================
/// Main
/// ===============================

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => PlayerConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => default_config(),
    };

    let mut player = Player::new(
        &config,
        SimulatedEngine::new(),
        SimulatedAudio::new(Some(AudioContextState::Suspended)),
    )?;
    show("Title screen", &player);

    // Two handlers fire for the same click; only one start happens.
    player.press_play();
    player.press_play();
    player.transport_mut().audio_mut().state = Some(AudioContextState::Running);
    player.audio_resumed(Ok(()));
    let epoch = player.transport().epoch();
    player.handle_event(EngineEvent::Loaded { epoch });
    show("First play", &player);

    notes(&mut player, epoch, true, &[48, 60, 64, 67]);
    player.handle_event(EngineEvent::Progress {
        epoch,
        now: 12.0,
        end: 185.0,
    });
    show("Chord held", &player);

    notes(&mut player, epoch, false, &[64, 67]);
    show("Partly released", &player);

    player.send(Command::ToggleDisplayMode);
    notes(&mut player, epoch, true, &[72]);
    notes(&mut player, epoch, false, &[48, 60, 72]);
    show("Persisting colours", &player);

    player.skip(Direction::Previous);
    // Late note from the superseded track.
    notes(&mut player, epoch, true, &[90]);
    show("Skipped back (loading)", &player);

    let epoch = player.transport().epoch();
    player.handle_event(EngineEvent::LoadFailed {
        epoch,
        reason: "soundfont request timed out".to_string(),
    });
    show("Load failed", &player);

    player.toggle_play_pause();
    let epoch = player.transport().epoch();
    player.handle_event(EngineEvent::Loaded { epoch });
    player.handle_event(EngineEvent::Ended { epoch });
    player.handle_event(EngineEvent::Ended { epoch });
    show("Track ended", &player);

    player.stop();
    show("Stopped", &player);

    let engine = player.transport().engine();
    println!(
        "Engine received {} calls ({} loads). Sanity run completed.",
        engine.calls.len(),
        engine.load_count()
    );
    Ok(())
}
