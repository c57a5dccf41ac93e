//! Neon Breaker entry point
//!
//! On the web the game is driven by `WebGame` from the library. Natively this
//! runs a headless autopilot session and logs what happens:
//!
//! ```text
//! neon-breaker [breakout|invaders] [seconds] [seed]
//! ```

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use neon_breaker::sim::{EventKind, GameEvent, GamePhase};
    use neon_breaker::{Engine, Settings, Tuning};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let tuning = match args.next().as_deref() {
        Some("invaders") => Tuning::invaders(),
        Some("breakout") | None => Tuning::breakout(),
        Some(other) => {
            log::error!("Unknown rules '{}' (expected breakout or invaders)", other);
            std::process::exit(2);
        }
    };
    let seconds: f32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(120.0);
    let seed: u64 = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map_or(0, |d| d.as_secs())
        });

    log::info!("Neon Breaker (native) starting...");

    let mut engine = Engine::new(seed, tuning, Settings::default());
    for kind in [EventKind::LevelCleared, EventKind::Lives, EventKind::GameOver] {
        engine.on(kind, |event| match event {
            GameEvent::LevelCleared(level) => log::info!("Level {} cleared", level),
            GameEvent::Lives(lives) => log::info!("Lives: {}", lives),
            GameEvent::GameOver => log::info!("Game over"),
            _ => {}
        });
    }
    engine.on(EventKind::Score, |event| {
        if let GameEvent::Score(score) = event {
            log::debug!("Score: {}", score);
        }
    });

    engine.set_autopilot(true);
    engine.start();

    let dt = 1.0 / 60.0;
    let frames = (seconds / dt) as u32;
    let mut played = 0.0;
    for _ in 0..frames {
        engine.step(dt);
        played += dt;
        if engine.phase() == GamePhase::GameOver {
            break;
        }
    }

    log::info!(
        "Session over after {:.1}s: score {}, level {}, lives {}, phase {}",
        played,
        engine.score(),
        engine.level(),
        engine.lives(),
        engine.phase().as_str()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is `wasm_start` in the library
}
