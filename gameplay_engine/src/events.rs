/// Gameplay Engine: Action Definitions
///
/// Actions are pure data. They carry intent and payload only and contain
/// no transition logic. On the wire an action is `{ "type", "payload" }`;
/// the envelope adds who sent it and the deterministic clock reading used
/// for dates and timestamps.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    BossAction, CinematicEventType, CraftRecipe, PvPAction, RaidAbility, RaidRole, RewardKind,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum GameplayAction {
    #[serde(rename = "session.sandbox")]
    SetSandbox { enabled: bool },

    #[serde(rename = "raid.join")]
    JoinRaid { member: String, role: RaidRole },
    #[serde(rename = "raid.objective_progress")]
    AdvanceObjective { objective_id: String, delta: i64 },
    #[serde(rename = "raid.use_ability")]
    UseAbility { member: String, ability: RaidAbility },

    #[serde(rename = "campaign.resolve_mission")]
    ResolveMission { success: bool },

    #[serde(rename = "narrative.choose")]
    ChooseNarrative { choice_id: String },

    #[serde(rename = "skills.unlock")]
    UnlockSkill { skill_id: String },
    #[serde(rename = "skills.equip")]
    EquipSkill { skill_id: String },
    #[serde(rename = "skills.unequip")]
    UnequipSkill { skill_id: String },

    #[serde(rename = "pvp.act")]
    PvPRound { action: PvPAction },

    #[serde(rename = "time.fork")]
    CreateFork {
        #[serde(default)]
        label: String,
        playhead_ms: i64,
    },
    #[serde(rename = "time.rewind")]
    Rewind { amount_ms: i64 },
    #[serde(rename = "time.merge")]
    MergeFork {
        #[serde(default)]
        fork_id: Option<String>,
    },

    #[serde(rename = "boss.act")]
    BossAct { action: BossAction },

    #[serde(rename = "director.evaluate")]
    EvaluateDirector {
        #[serde(default)]
        failures: u32,
        #[serde(default)]
        latency_ms: u64,
        #[serde(default)]
        retries: u32,
    },

    #[serde(rename = "economy.craft")]
    Craft { recipe_id: CraftRecipe },

    #[serde(rename = "rewards.claim")]
    ClaimReward {
        kind: RewardKind,
        #[serde(default)]
        mastery_id: Option<String>,
    },

    #[serde(rename = "guild.op")]
    GuildOperation { impact: i64 },

    #[serde(rename = "cinematic.emit")]
    EmitCinematic {
        event_type: CinematicEventType,
        #[serde(default)]
        message: String,
        #[serde(default = "default_intensity")]
        intensity: i64,
    },

    #[serde(rename = "liveops.progress")]
    LiveOpsProgress { delta: i64 },
    #[serde(rename = "liveops.balance")]
    LiveOpsBalance {
        #[serde(default)]
        difficulty_factor: Option<f64>,
        #[serde(default)]
        reward_multiplier: Option<f64>,
        #[serde(default)]
        note: String,
    },
    #[serde(rename = "liveops.advance_week")]
    AdvanceLiveOpsWeek,

    #[serde(rename = "safety.mute")]
    MutePlayer { target_player_id: String },
    #[serde(rename = "safety.block")]
    BlockPlayer { target_player_id: String },
    #[serde(rename = "safety.report")]
    ReportPlayer {
        target_player_id: String,
        reason: String,
    },
}

fn default_intensity() -> i64 {
    1
}

impl GameplayAction {
    /// Wire name of the action, as found in the `type` field.
    pub fn action_type(&self) -> &'static str {
        match self {
            GameplayAction::SetSandbox { .. } => "session.sandbox",
            GameplayAction::JoinRaid { .. } => "raid.join",
            GameplayAction::AdvanceObjective { .. } => "raid.objective_progress",
            GameplayAction::UseAbility { .. } => "raid.use_ability",
            GameplayAction::ResolveMission { .. } => "campaign.resolve_mission",
            GameplayAction::ChooseNarrative { .. } => "narrative.choose",
            GameplayAction::UnlockSkill { .. } => "skills.unlock",
            GameplayAction::EquipSkill { .. } => "skills.equip",
            GameplayAction::UnequipSkill { .. } => "skills.unequip",
            GameplayAction::PvPRound { .. } => "pvp.act",
            GameplayAction::CreateFork { .. } => "time.fork",
            GameplayAction::Rewind { .. } => "time.rewind",
            GameplayAction::MergeFork { .. } => "time.merge",
            GameplayAction::BossAct { .. } => "boss.act",
            GameplayAction::EvaluateDirector { .. } => "director.evaluate",
            GameplayAction::Craft { .. } => "economy.craft",
            GameplayAction::ClaimReward { .. } => "rewards.claim",
            GameplayAction::GuildOperation { .. } => "guild.op",
            GameplayAction::EmitCinematic { .. } => "cinematic.emit",
            GameplayAction::LiveOpsProgress { .. } => "liveops.progress",
            GameplayAction::LiveOpsBalance { .. } => "liveops.balance",
            GameplayAction::AdvanceLiveOpsWeek => "liveops.advance_week",
            GameplayAction::MutePlayer { .. } => "safety.mute",
            GameplayAction::BlockPlayer { .. } => "safety.block",
            GameplayAction::ReportPlayer { .. } => "safety.report",
        }
    }
}

/// Who acted, and when. Every timestamp and calendar date written by a
/// transition comes from here, never from the system clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionContext {
    pub actor: String,
    pub at: DateTime<Utc>,
}

impl ActionContext {
    pub fn new(actor: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            actor: actor.into(),
            at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEnvelope {
    pub player_id: String,
    pub at: DateTime<Utc>,
    pub action: GameplayAction,
}

impl ActionEnvelope {
    pub fn new(player_id: impl Into<String>, at: DateTime<Utc>, action: GameplayAction) -> Self {
        Self {
            player_id: player_id.into(),
            at,
            action,
        }
    }

    pub fn context(&self) -> ActionContext {
        ActionContext::new(self.player_id.clone(), self.at)
    }

    /// Parse an envelope from JSON. Malformed input never reaches the engine.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
