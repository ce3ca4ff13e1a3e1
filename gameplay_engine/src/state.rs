/// Gameplay Engine: State Construction
///
/// `create_initial_state` is the only way a session state comes into being;
/// afterwards it is only ever replaced wholesale by transitions.
use std::collections::BTreeMap;

use crate::arithmetic::{clamp, hash_seed, PLAYHEAD_MAX_MS};
use crate::catalog::{self, MUTATOR_WINDOW, NARRATIVE_START_NODE};
use crate::domain::{
    BossAction, BossState, CampaignState, CinematicState, CraftRecipe, DirectorState,
    EconomyState, GameplayConstants, GameplayState, GuildState, LiveOpsState, Loadout,
    NarrativeState, OutcomeState, ProgressionState, PvPState, RaidObjective, RaidRole, RaidState,
    RewardsState, SafetyState, SandboxState, SkillTier, SkillTreeState, TimeFork, TimeState,
    STATE_SCHEMA_VERSION,
};
use crate::economy::inflation_index;
use crate::transitions::boss::refresh_boss_phase;
use crate::transitions::campaign::{dedupe_mutators, generate_mission};
use crate::transitions::liveops::challenge_for_week;
use crate::transitions::raid::refresh_raid_completion;

pub const PRIMARY_FORK_ID: &str = "primary";
pub const CINEMATIC_QUEUE_LIMIT: usize = 12;
pub const REWARD_HISTORY_LIMIT: usize = 60;
pub const LEDGER_LIMIT: usize = 200;
pub const TUNING_HISTORY_LIMIT: usize = 20;
pub const REPORT_LIMIT: usize = 40;

fn objective(id: &str, label: &str) -> RaidObjective {
    RaidObjective {
        id: id.to_string(),
        label: label.to_string(),
        progress: 0,
        target: 100,
        completed: false,
    }
}

/// Create a fresh session state from a seed source string.
pub fn create_initial_state(
    seed_source: &str,
    constants: Option<GameplayConstants>,
) -> GameplayState {
    let seed = hash_seed(seed_source);
    let constants = constants.unwrap_or_default();
    let mutators = vec!["baseline".to_string()];
    let credits = 160;

    let mut roles = BTreeMap::new();
    roles.insert("director".to_string(), RaidRole::Strategist);

    let mut boss = BossState {
        name: "Causality Hydra".to_string(),
        phase: 1,
        hp: 360,
        max_hp: 360,
        enraged: false,
        vulnerability: BossAction::Exploit,
        phase_mechanic: String::new(),
        adaptive_pattern: "observe".to_string(),
    };
    refresh_boss_phase(&mut boss);

    GameplayState {
        schema_version: STATE_SCHEMA_VERSION,
        seed,
        raid: RaidState {
            party: vec!["director".to_string()],
            roles,
            objectives: vec![
                objective("obj-root-cause", "Identify root cause chain"),
                objective("obj-recover", "Recover operational stability"),
                objective("obj-harden", "Harden replay strategy"),
            ],
            completed: false,
            cooldowns: BTreeMap::new(),
        },
        campaign: CampaignState {
            depth: 1,
            lives: constants.max_lives,
            current_mission: generate_mission(seed, 1, &mutators),
            completed_mission_ids: Vec::new(),
            mutators,
        },
        narrative: NarrativeState {
            current_node_id: NARRATIVE_START_NODE.to_string(),
            nodes: catalog::narrative_nodes(),
            history: Vec::new(),
            tension: 35,
        },
        skills: SkillTreeState {
            points: catalog::INITIAL_SKILL_POINTS,
            nodes: catalog::skill_nodes(),
            loadout: Loadout::default(),
        },
        pvp: PvPState {
            round: 0,
            stability: 72,
            sabotage: 28,
            fog: 40,
            winner: None,
        },
        time: TimeState {
            active_fork_id: PRIMARY_FORK_ID.to_string(),
            forks: vec![TimeFork {
                id: PRIMARY_FORK_ID.to_string(),
                label: "Primary timeline".to_string(),
                playhead_ms: 0,
                history: vec![0],
                parent_fork_id: None,
            }],
            fork_seq: 1,
        },
        boss,
        director: DirectorState {
            risk: 30,
            hint: "Start with the bottleneck path and branch cautiously.".to_string(),
            goal: "Stabilize flow and isolate fault chain.".to_string(),
            recommended_modifier: CraftRecipe::StabilityPatch,
            skill_tier: SkillTier::Mid,
            hazard_bias: "balanced".to_string(),
            last_outcome: None,
        },
        economy: EconomyState {
            credits,
            materials: 100,
            crafted: Vec::new(),
            inflation_index: inflation_index(&constants.economy, credits),
            ledger: Vec::new(),
        },
        rewards: RewardsState::default(),
        guild: GuildState {
            guild_id: None,
            name: "Trace Guild".to_string(),
            members: 4,
            operations_score: 0,
            events_completed: 0,
        },
        cinematic: CinematicState::default(),
        liveops: LiveOpsState {
            season: format!("Season-{}", 2026 + seed % 2),
            week: 1,
            challenge: challenge_for_week(seed, 1, 1.0, 1.0),
            tuning_history: Vec::new(),
            difficulty_factor: 1.0,
            reward_multiplier: 1.0,
            challenge_completions: 0,
            revision: 0,
        },
        safety: SafetyState::default(),
        sandbox: SandboxState::default(),
        outcome: OutcomeState::default(),
        progression: ProgressionState::default(),
        constants,
    }
}

/// Re-derive every derived field and re-apply every bound.
///
/// Run once when a persisted state is loaded. On a state produced by
/// transitions this is the identity.
pub fn normalize_state(state: &mut GameplayState) {
    state.schema_version = STATE_SCHEMA_VERSION;

    for objective in &mut state.raid.objectives {
        objective.progress = clamp(objective.progress, 0, objective.target);
    }
    refresh_raid_completion(&mut state.raid);

    state.campaign.lives = state.campaign.lives.min(state.constants.max_lives);
    state.campaign.mutators = dedupe_mutators(&state.campaign.mutators, MUTATOR_WINDOW);
    state.narrative.tension = clamp(state.narrative.tension, 0, 100);
    if !state.narrative.nodes.contains_key(&state.narrative.current_node_id) {
        state.narrative.current_node_id = NARRATIVE_START_NODE.to_string();
    }

    let nodes = &state.skills.nodes;
    state
        .skills
        .loadout
        .equipped
        .retain(|id| nodes.get(id).is_some_and(|node| node.unlocked));

    state.pvp.stability = clamp(state.pvp.stability, 0, 100);
    state.pvp.sabotage = clamp(state.pvp.sabotage, 0, 100);
    state.pvp.fog = clamp(state.pvp.fog, 0, 100);

    normalize_time(&mut state.time);

    state.boss.max_hp = state.boss.max_hp.max(1);
    state.boss.hp = clamp(state.boss.hp, 0, state.boss.max_hp);
    refresh_boss_phase(&mut state.boss);

    state.director.risk = clamp(state.director.risk, 0, 100);

    state.economy.credits = state.economy.credits.max(0);
    state.economy.materials = state.economy.materials.max(0);
    state.economy.inflation_index =
        inflation_index(&state.constants.economy, state.economy.credits);
    truncate_oldest(&mut state.economy.ledger, LEDGER_LIMIT);

    state.rewards.history.truncate(REWARD_HISTORY_LIMIT);
    state.cinematic.queue.truncate(CINEMATIC_QUEUE_LIMIT);
    state.liveops.tuning_history.truncate(TUNING_HISTORY_LIMIT);
    state.safety.reports.truncate(REPORT_LIMIT);
}

fn normalize_time(time: &mut TimeState) {
    if !time.forks.iter().any(|fork| fork.id == PRIMARY_FORK_ID) {
        time.forks.insert(
            0,
            TimeFork {
                id: PRIMARY_FORK_ID.to_string(),
                label: "Primary timeline".to_string(),
                playhead_ms: 0,
                history: vec![0],
                parent_fork_id: None,
            },
        );
    }
    for fork in &mut time.forks {
        fork.playhead_ms = clamp(fork.playhead_ms, 0, PLAYHEAD_MAX_MS);
    }
    if !time.forks.iter().any(|fork| fork.id == time.active_fork_id) {
        time.active_fork_id = PRIMARY_FORK_ID.to_string();
    }
    let highest_issued = time
        .forks
        .iter()
        .filter_map(|fork| fork.id.strip_prefix("fork-"))
        .filter_map(|suffix| suffix.parse::<u32>().ok())
        .max()
        .unwrap_or(1);
    time.fork_seq = time.fork_seq.max(highest_issued);
}

/// Drop entries from the front of an append-ordered log.
pub(crate) fn truncate_oldest<T>(log: &mut Vec<T>, limit: usize) {
    if log.len() > limit {
        let excess = log.len() - limit;
        log.drain(..excess);
    }
}
