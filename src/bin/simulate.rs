use clap::Parser;
use echo_crawler::autopilot::Autopilot;
use echo_crawler::collision;
use echo_crawler::config::{load_options, parse_weapon};
use echo_crawler::engine::{GameEngine, GameEngineOptions, RunStats};
use echo_crawler::error::HostError;
use echo_crawler::logging::{emit_log, log_runtime_event, LogLevel};
use echo_crawler::types::{ItemId, RoomState, RuntimeEvent, WeaponKind};
use serde::Serialize;
use serde_json::json;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

const DEFAULT_TICKS: u64 = 60 * 60 * 2;
const MAX_TICKS: u64 = 60 * 60 * 60;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    single: bool,
    #[arg(long)]
    ticks: Option<u64>,
    #[arg(long)]
    weapon: Option<String>,
    #[arg(long)]
    floor: Option<u32>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    session_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Scenario {
    name: String,
    ticks: u64,
    options: GameEngineOptions,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScenarioResultLine {
    scenario: String,
    seed: u32,
    weapon: WeaponKind,
    ticks: u64,
    finished_tick: u64,
    floor_reached: u32,
    level: u32,
    game_over: bool,
    revives: usize,
    level_ups: usize,
    stats: RunStats,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug)]
struct ScenarioRunResult {
    result: ScenarioResultLine,
    anomaly_records: Vec<AnomalyRecord>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunSummary {
    session_id: String,
    started_at_ms: u64,
    finished_at_ms: u64,
    scenario_count: usize,
    anomaly_count: usize,
    game_over_count: usize,
    deepest_floor: u32,
    scenarios: Vec<ScenarioResultLine>,
}

#[derive(Debug, Default)]
struct InvariantWatch {
    floor: u32,
    room_ranks: Vec<u8>,
    inventory: BTreeMap<ItemId, u32>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let session_id_seed = cli.seed.unwrap_or_else(now_ms);
    let session_id = cli
        .session_id
        .clone()
        .unwrap_or_else(|| default_session_id(session_id_seed as u32, now_ms()));

    let scenarios = match resolve_scenarios(&cli) {
        Ok(scenarios) => scenarios,
        Err(error) => {
            emit_log(
                LogLevel::Error,
                "config_failed",
                &session_id,
                None,
                None,
                json!({ "error": error.to_string() }),
            );
            return ExitCode::from(2);
        }
    };

    let run_started_at_ms = now_ms();
    let mut scenario_results = Vec::new();
    let mut has_anomaly = false;

    for scenario in &scenarios {
        let seed = scenario.options.seed;
        emit_log(
            LogLevel::Info,
            "scenario_started",
            &session_id,
            Some(seed),
            None,
            json!({
                "scenario": scenario.name,
                "ticks": scenario.ticks,
                "weapon": scenario.options.starting_weapon,
                "floor": scenario.options.starting_floor,
            }),
        );

        let scenario_run = run_scenario(scenario, &session_id);
        if !scenario_run.result.anomalies.is_empty() {
            has_anomaly = true;
        }
        for anomaly in &scenario_run.anomaly_records {
            emit_log(
                LogLevel::Warn,
                "anomaly_detected",
                &session_id,
                Some(seed),
                Some(anomaly.tick),
                json!({
                    "scenario": scenario.name,
                    "message": anomaly.message,
                }),
            );
        }

        emit_log(
            LogLevel::Info,
            "scenario_finished",
            &session_id,
            Some(seed),
            Some(scenario_run.result.finished_tick),
            json!({
                "scenario": scenario.name,
                "floorReached": scenario_run.result.floor_reached,
                "level": scenario_run.result.level,
                "gameOver": scenario_run.result.game_over,
                "anomalyCount": scenario_run.result.anomalies.len(),
            }),
        );
        match serde_json::to_string(&scenario_run.result) {
            Ok(line) => println!("{line}"),
            Err(error) => emit_log(
                LogLevel::Error,
                "result_serialize_failed",
                &session_id,
                Some(seed),
                None,
                json!({ "error": error.to_string() }),
            ),
        }
        scenario_results.push(scenario_run.result);
    }

    let summary = build_run_summary(
        session_id.clone(),
        run_started_at_ms,
        now_ms(),
        scenario_results,
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                LogLevel::Error,
                "summary_write_failed",
                &session_id,
                None,
                None,
                json!({ "error": error.to_string() }),
            );
            return ExitCode::from(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        LogLevel::Info,
        "run_finished",
        &session_id,
        None,
        None,
        json!({
            "scenarioCount": summary.scenario_count,
            "anomalyCount": summary.anomaly_count,
            "gameOverCount": summary.game_over_count,
            "deepestFloor": summary.deepest_floor,
            "summaryOut": summary_out_written,
        }),
    );

    if has_anomaly {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run_scenario(scenario: &Scenario, session_id: &str) -> ScenarioRunResult {
    let mut engine = GameEngine::new(scenario.options.clone());
    let mut pilot = Autopilot::new();
    let mut watch = InvariantWatch::default();
    watch.observe(&engine);

    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut revives = 0;
    let mut level_ups = 0;

    while engine.tick() < scenario.ticks && !engine.is_game_over() {
        if engine.is_pending_level_up() {
            if let Some(item) = pilot.choose_upgrade(&engine) {
                engine.select_upgrade(item);
            }
        }
        let input = pilot.decide(&engine);
        let before = engine.tick();
        engine.step(&input);
        if engine.tick() == before && !engine.is_game_over() && !engine.is_pending_level_up() {
            // hit-stop frames do not advance the tick counter
            continue;
        }

        let snapshot = engine.build_snapshot(true);
        for event in &snapshot.events {
            match event {
                RuntimeEvent::PlayerRevived => revives += 1,
                RuntimeEvent::LevelUp { .. } => level_ups += 1,
                _ => {}
            }
            log_runtime_event(session_id, scenario.options.seed, snapshot.tick, event);
        }
        for message in watch.check(&engine) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                engine.tick(),
                message,
            );
        }
    }

    let player = engine.player();
    ScenarioRunResult {
        result: ScenarioResultLine {
            scenario: scenario.name.clone(),
            seed: scenario.options.seed,
            weapon: scenario.options.starting_weapon,
            ticks: scenario.ticks,
            finished_tick: engine.tick(),
            floor_reached: engine.floor(),
            level: player.level,
            game_over: engine.is_game_over(),
            revives,
            level_ups,
            stats: engine.run_stats().clone(),
            anomalies,
        },
        anomaly_records,
    }
}

impl InvariantWatch {
    fn observe(&mut self, engine: &GameEngine) {
        self.floor = engine.floor();
        self.room_ranks = room_ranks(engine);
        self.inventory = engine
            .player()
            .inventory
            .entries()
            .into_iter()
            .map(|entry| (entry.item, entry.stacks))
            .collect();
    }

    fn check(&mut self, engine: &GameEngine) -> Vec<String> {
        let mut anomalies = Vec::new();
        let player = engine.player();

        if !player.hp.is_finite() || player.hp > player.max_hp + f32::EPSILON {
            anomalies.push(format!("player hp out of range: {}/{}", player.hp, player.max_hp));
        }
        if player.hp <= 0.0 && !engine.is_game_over() {
            anomalies.push(format!("player alive with hp {}", player.hp));
        }
        let body = &player.body;
        if collision::blocked(engine.dungeon(), body.x, body.y, body.w, body.h) {
            anomalies.push(format!("player inside blocking tile at ({:.1}, {:.1})", body.x, body.y));
        }
        for enemy in engine.enemies() {
            if !enemy.body.x.is_finite() || !enemy.body.y.is_finite() {
                anomalies.push(format!("enemy {} has non-finite position", enemy.id));
            }
        }

        for (item, stacks) in &self.inventory {
            let now = player.inventory.stacks(*item);
            if now < *stacks {
                anomalies.push(format!("inventory shrank: {} {} -> {}", item.key(), stacks, now));
            }
        }

        if engine.floor() == self.floor {
            let ranks = room_ranks(engine);
            for (room_id, (before, after)) in self.room_ranks.iter().zip(ranks.iter()).enumerate() {
                if after < before {
                    anomalies.push(format!("room {room_id} regressed from {before} to {after}"));
                }
            }
        }

        self.observe(engine);
        anomalies
    }
}

fn room_ranks(engine: &GameEngine) -> Vec<u8> {
    engine
        .dungeon()
        .rooms
        .iter()
        .map(|room| match room.state() {
            RoomState::Undiscovered => 0,
            RoomState::Active => 1,
            RoomState::Cleared => 2,
        })
        .collect()
}

fn resolve_scenarios(cli: &Cli) -> Result<Vec<Scenario>, HostError> {
    let mut base = match cli.config.as_deref() {
        Some(path) => load_options(path)?,
        None => GameEngineOptions::default(),
    };
    if let Some(seed) = cli.seed {
        base.seed = normalize_seed(seed);
    } else if cli.config.is_none() {
        base.seed = normalize_seed(now_ms());
    }
    if let Some(raw) = cli.weapon.as_deref() {
        base.starting_weapon = parse_weapon(raw)?;
    }
    if let Some(floor) = cli.floor {
        base.starting_floor = floor;
    }
    let ticks = cli.ticks.unwrap_or(DEFAULT_TICKS).clamp(1, MAX_TICKS);

    if cli.single || cli.weapon.is_some() || cli.floor.is_some() || cli.ticks.is_some() {
        return Ok(vec![Scenario {
            name: format!("custom-{}", weapon_key(base.starting_weapon)),
            ticks,
            options: base,
        }]);
    }

    Ok(vec![
        Scenario {
            name: "quick-check-blade".to_string(),
            ticks: DEFAULT_TICKS,
            options: GameEngineOptions {
                starting_weapon: WeaponKind::Blade,
                ..base.clone()
            },
        },
        Scenario {
            name: "ranged-check-bow".to_string(),
            ticks: DEFAULT_TICKS,
            options: GameEngineOptions {
                seed: base.seed.wrapping_add(1),
                starting_weapon: WeaponKind::Bow,
                ..base.clone()
            },
        },
        Scenario {
            name: "deep-floor-scythe".to_string(),
            ticks: DEFAULT_TICKS,
            options: GameEngineOptions {
                seed: base.seed.wrapping_add(2),
                starting_floor: base.starting_floor + 3,
                starting_weapon: WeaponKind::Scythe,
                ..base
            },
        },
    ])
}

fn weapon_key(weapon: WeaponKind) -> &'static str {
    match weapon {
        WeaponKind::Blade => "blade",
        WeaponKind::Scythe => "scythe",
        WeaponKind::Bow => "bow",
        WeaponKind::Staff => "staff",
    }
}

fn normalize_seed(seed: u64) -> u32 {
    seed as u32
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_session_id(seed: u32, timestamp_ms: u64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn build_run_summary(
    session_id: String,
    started_at_ms: u64,
    finished_at_ms: u64,
    scenarios: Vec<ScenarioResultLine>,
) -> RunSummary {
    RunSummary {
        session_id,
        started_at_ms,
        finished_at_ms,
        scenario_count: scenarios.len(),
        anomaly_count: scenarios.iter().map(|s| s.anomalies.len()).sum(),
        game_over_count: scenarios.iter().filter(|s| s.game_over).count(),
        deepest_floor: scenarios.iter().map(|s| s.floor_reached).max().unwrap_or(0),
        scenarios,
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn write_summary(path: &Path, summary: &RunSummary) -> Result<(), HostError> {
    let summary_text = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, summary_text).map_err(|source| HostError::Write {
        path: path.to_string_lossy().to_string(),
        source,
    })
}
