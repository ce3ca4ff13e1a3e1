//! Read-only display projection of a session state.
//!
//! The projection never mutates and never decides anything the transitions
//! do not: availability flags come from the same evaluators the
//! transitions gate on.
use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{
    BossAction, CameraState, GameplayState, LoadoutSlot, OutcomeStatus, PvPSide, RewardKind,
};
use crate::transitions::rewards::{evaluate_cadence_reward, MASTERIES};
use crate::transitions::skills::{evaluate_skill_equip, evaluate_skill_unlock};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameplayView {
    pub outcome: OutcomeView,
    pub raid: RaidView,
    pub campaign: CampaignView,
    pub narrative: NarrativeView,
    pub skills: Vec<SkillView>,
    pub skill_points: u32,
    pub pvp: PvPView,
    pub timeline: TimelineView,
    pub boss: BossView,
    pub economy: EconomyView,
    pub rewards: Vec<RewardView>,
    pub liveops: LiveOpsView,
    pub camera_state: CameraState,
    pub level: u32,
    pub xp: i64,
    pub next_level_xp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeView {
    pub status: OutcomeStatus,
    pub reason: String,
    pub terminal: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaidView {
    pub party_size: usize,
    pub objectives_completed: usize,
    pub objectives_total: usize,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignView {
    pub depth: u32,
    pub lives: u32,
    pub mission_title: String,
    pub difficulty: u32,
    pub hazards: Vec<String>,
    pub sandbox: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NarrativeView {
    pub node_title: String,
    pub body: String,
    pub choices: Vec<(String, String)>,
    pub tension: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillView {
    pub id: String,
    pub label: String,
    pub slot: LoadoutSlot,
    pub unlocked: bool,
    pub equipped: bool,
    pub unlock_blocker: Option<String>,
    pub equip_blocker: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PvPView {
    pub round: u32,
    pub stability: i64,
    pub sabotage: i64,
    pub fog: i64,
    pub winner: Option<PvPSide>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineView {
    pub active_fork_id: String,
    pub active_label: String,
    pub playhead_ms: i64,
    pub fork_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BossView {
    pub name: String,
    pub hp: i64,
    pub max_hp: i64,
    pub phase: u8,
    pub vulnerability: BossAction,
    pub enraged: bool,
    pub mechanic: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EconomyView {
    pub credits: i64,
    pub materials: i64,
    pub inflation_index: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RewardView {
    pub kind: RewardKind,
    pub mastery_id: Option<String>,
    pub claimable: bool,
    pub blocker: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveOpsView {
    pub season: String,
    pub week: u32,
    pub challenge_title: String,
    pub progress: i64,
    pub goal: i64,
    pub completed: bool,
}

fn blocker<E: ToString>(check: Result<(), E>) -> Option<String> {
    check.err().map(|e| e.to_string())
}

/// Build the display view. `today` decides daily-reward availability.
pub fn project(state: &GameplayState, today: NaiveDate) -> GameplayView {
    let narrative_node = state.narrative.nodes.get(&state.narrative.current_node_id);
    let active_fork = state
        .time
        .forks
        .iter()
        .find(|f| f.id == state.time.active_fork_id);

    let skills = state
        .skills
        .nodes
        .values()
        .map(|node| SkillView {
            id: node.id.clone(),
            label: node.label.clone(),
            slot: node.slot,
            unlocked: node.unlocked,
            equipped: state.skills.loadout.equipped.contains(&node.id),
            unlock_blocker: blocker(evaluate_skill_unlock(state, &node.id)),
            equip_blocker: blocker(evaluate_skill_equip(state, &node.id)),
        })
        .collect();

    let mut rewards: Vec<RewardView> = [RewardKind::Daily, RewardKind::Session, RewardKind::Streak]
        .into_iter()
        .map(|kind| {
            let check = evaluate_cadence_reward(state, kind, None, today);
            RewardView {
                kind,
                mastery_id: None,
                claimable: check.is_ok(),
                blocker: blocker(check),
            }
        })
        .collect();
    rewards.extend(MASTERIES.iter().map(|(id, _)| {
        let check = evaluate_cadence_reward(state, RewardKind::Mastery, Some(*id), today);
        RewardView {
            kind: RewardKind::Mastery,
            mastery_id: Some(id.to_string()),
            claimable: check.is_ok(),
            blocker: blocker(check),
        }
    }));

    GameplayView {
        outcome: OutcomeView {
            status: state.outcome.status,
            reason: state.outcome.reason.clone(),
            terminal: state.outcome.status.is_terminal(),
        },
        raid: RaidView {
            party_size: state.raid.party.len(),
            objectives_completed: state.raid.objectives.iter().filter(|o| o.completed).count(),
            objectives_total: state.raid.objectives.len(),
            completed: state.raid.completed,
        },
        campaign: CampaignView {
            depth: state.campaign.depth,
            lives: state.campaign.lives,
            mission_title: state.campaign.current_mission.title.clone(),
            difficulty: state.campaign.current_mission.difficulty,
            hazards: state.campaign.current_mission.hazards.clone(),
            sandbox: state.sandbox.enabled,
        },
        narrative: NarrativeView {
            node_title: narrative_node.map(|n| n.title.clone()).unwrap_or_default(),
            body: narrative_node.map(|n| n.body.clone()).unwrap_or_default(),
            choices: narrative_node
                .map(|n| {
                    n.choices
                        .iter()
                        .map(|c| (c.id.clone(), c.label.clone()))
                        .collect()
                })
                .unwrap_or_default(),
            tension: state.narrative.tension,
        },
        skills,
        skill_points: state.skills.points,
        pvp: PvPView {
            round: state.pvp.round,
            stability: state.pvp.stability,
            sabotage: state.pvp.sabotage,
            fog: state.pvp.fog,
            winner: state.pvp.winner,
        },
        timeline: TimelineView {
            active_fork_id: state.time.active_fork_id.clone(),
            active_label: active_fork.map(|f| f.label.clone()).unwrap_or_default(),
            playhead_ms: active_fork.map(|f| f.playhead_ms).unwrap_or(0),
            fork_count: state.time.forks.len(),
        },
        boss: BossView {
            name: state.boss.name.clone(),
            hp: state.boss.hp,
            max_hp: state.boss.max_hp,
            phase: state.boss.phase,
            vulnerability: state.boss.vulnerability,
            enraged: state.boss.enraged,
            mechanic: state.boss.phase_mechanic.clone(),
        },
        economy: EconomyView {
            credits: state.economy.credits,
            materials: state.economy.materials,
            inflation_index: state.economy.inflation_index,
        },
        rewards,
        liveops: LiveOpsView {
            season: state.liveops.season.clone(),
            week: state.liveops.week,
            challenge_title: state.liveops.challenge.title.clone(),
            progress: state.liveops.challenge.progress,
            goal: state.liveops.challenge.goal,
            completed: state.liveops.challenge.completed,
        },
        camera_state: state.cinematic.camera_state,
        level: state.progression.level,
        xp: state.progression.xp,
        next_level_xp: state.progression.next_level_xp,
    }
}
