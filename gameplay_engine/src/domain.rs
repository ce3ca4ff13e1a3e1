/// Gameplay Engine: Domain Types
///
/// The aggregate `GameplayState` and every slice it is composed of. All
/// slices are plain data: behaviour lives in `transitions`, derived values
/// are recomputed by the transition that touches their inputs.
///
/// Slices added after schema v1 carry `#[serde(default)]` so a v1 snapshot
/// still deserializes; `state::normalize_state` re-derives the rest.
use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current persisted schema of `GameplayState`.
pub const STATE_SCHEMA_VERSION: u32 = 2;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaidRole {
    Strategist,
    Operator,
    Analyst,
    Saboteur,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaidAbility {
    FocusMark,
    StabilityShield,
    ScanPulse,
    ChaosSpike,
}

impl RaidAbility {
    pub fn as_str(self) -> &'static str {
        match self {
            RaidAbility::FocusMark => "focus_mark",
            RaidAbility::StabilityShield => "stability_shield",
            RaidAbility::ScanPulse => "scan_pulse",
            RaidAbility::ChaosSpike => "chaos_spike",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PvPAction {
    Sabotage,
    Stabilize,
    Scan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PvPSide {
    Operator,
    Saboteur,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BossAction {
    Strike,
    Shield,
    Exploit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CraftRecipe {
    StabilityPatch,
    PrecisionLens,
    OverclockCore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Success,
    Failure,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillTier {
    High,
    Mid,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadoutSlot {
    Core,
    Utility,
    Power,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    Daily,
    Session,
    Streak,
    Mastery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CinematicEventType {
    Critical,
    Success,
    Warning,
    Twist,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraState {
    #[default]
    Wide,
    Medium,
    Tight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    Reward,
    Spend,
    Sink,
    Upkeep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    #[default]
    InProgress,
    Win,
    Loss,
    Partial,
}

// ---------------------------------------------------------------------------
// Constants (tunable, stored in the state)
// ---------------------------------------------------------------------------

/// Anti-inflation policy for every credit reward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomyPolicy {
    pub reserve_target: i64,
    pub sink_threshold_ratio: f64,
    pub sink_rate: f64,
    pub reward_floor: f64,
    pub reward_ceiling: f64,
    pub catch_up_rate: f64,
    pub damping_rate: f64,
    pub upkeep_rate: f64,
    pub upkeep_min: i64,
}

impl Default for EconomyPolicy {
    fn default() -> Self {
        Self {
            reserve_target: 320,
            sink_threshold_ratio: 1.7,
            sink_rate: 0.22,
            reward_floor: 0.45,
            reward_ceiling: 1.12,
            catch_up_rate: 0.12,
            damping_rate: 0.35,
            upkeep_rate: 0.08,
            upkeep_min: 6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotCaps {
    pub core: usize,
    pub utility: usize,
    pub power: usize,
}

impl SlotCaps {
    pub fn cap(&self, slot: LoadoutSlot) -> usize {
        match slot {
            LoadoutSlot::Core => self.core,
            LoadoutSlot::Utility => self.utility,
            LoadoutSlot::Power => self.power,
        }
    }
}

impl Default for SlotCaps {
    fn default() -> Self {
        Self {
            core: 1,
            utility: 1,
            power: 1,
        }
    }
}

/// Balancing knobs. Passed to `create_initial_state`; fixed for the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplayConstants {
    pub economy: EconomyPolicy,
    pub max_party_size: usize,
    pub loadout_capacity: usize,
    pub slot_caps: SlotCaps,
    pub max_lives: u32,
    pub win_depth: u32,
}

impl Default for GameplayConstants {
    fn default() -> Self {
        Self {
            economy: EconomyPolicy::default(),
            max_party_size: 5,
            loadout_capacity: 3,
            slot_caps: SlotCaps::default(),
            max_lives: 3,
            win_depth: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// Slices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaidObjective {
    pub id: String,
    pub label: String,
    pub progress: i64,
    pub target: i64,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaidState {
    pub party: Vec<String>,
    pub roles: BTreeMap<String, RaidRole>,
    pub objectives: Vec<RaidObjective>,
    pub completed: bool,
    /// `"{member}:{ability}"` -> first pvp round the ability is ready again.
    #[serde(default)]
    pub cooldowns: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignMission {
    pub id: String,
    pub title: String,
    pub difficulty: u32,
    pub hazards: Vec<String>,
    pub reward_credits: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignState {
    pub depth: u32,
    pub lives: u32,
    pub current_mission: CampaignMission,
    pub completed_mission_ids: Vec<String>,
    pub mutators: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeChoice {
    pub id: String,
    pub label: String,
    pub next_node_id: String,
    pub tension_delta: i64,
    pub mutator: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeNode {
    pub id: String,
    pub title: String,
    pub body: String,
    pub choices: Vec<NarrativeChoice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeStep {
    pub node_id: String,
    pub choice_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeState {
    pub current_node_id: String,
    pub nodes: BTreeMap<String, NarrativeNode>,
    pub history: Vec<NarrativeStep>,
    pub tension: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillNode {
    pub id: String,
    pub label: String,
    pub cost: u32,
    pub requires: Vec<String>,
    #[serde(default = "default_min_level")]
    pub min_level: u32,
    #[serde(default)]
    pub milestones: Vec<String>,
    pub tier: u8,
    pub slot: LoadoutSlot,
    pub unlocked: bool,
}

fn default_min_level() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Loadout {
    pub equipped: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillTreeState {
    pub points: u32,
    pub nodes: BTreeMap<String, SkillNode>,
    #[serde(default)]
    pub loadout: Loadout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PvPState {
    pub round: u32,
    pub stability: i64,
    pub sabotage: i64,
    pub fog: i64,
    pub winner: Option<PvPSide>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeFork {
    pub id: String,
    pub label: String,
    pub playhead_ms: i64,
    pub history: Vec<i64>,
    #[serde(default)]
    pub parent_fork_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeState {
    pub active_fork_id: String,
    pub forks: Vec<TimeFork>,
    /// Highest fork sequence ever issued; ids are `fork-{seq}`.
    #[serde(default)]
    pub fork_seq: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossState {
    pub name: String,
    pub phase: u8,
    pub hp: i64,
    pub max_hp: i64,
    #[serde(default)]
    pub enraged: bool,
    #[serde(default = "default_vulnerability")]
    pub vulnerability: BossAction,
    #[serde(default)]
    pub phase_mechanic: String,
    #[serde(default)]
    pub adaptive_pattern: String,
}

fn default_vulnerability() -> BossAction {
    BossAction::Exploit
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectorState {
    pub risk: i64,
    pub hint: String,
    pub goal: String,
    pub recommended_modifier: CraftRecipe,
    pub skill_tier: SkillTier,
    pub hazard_bias: String,
    pub last_outcome: Option<RunOutcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub kind: LedgerKind,
    pub reason: String,
    /// Signed change applied to credits.
    pub credits: i64,
    pub materials: i64,
    pub multiplier: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomyState {
    pub credits: i64,
    pub materials: i64,
    pub crafted: Vec<CraftRecipe>,
    #[serde(default)]
    pub inflation_index: f64,
    #[serde(default)]
    pub ledger: Vec<LedgerEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardEntry {
    pub id: String,
    pub kind: RewardKind,
    pub amount: i64,
    pub detail: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardsState {
    pub daily_claimed_date: Option<NaiveDate>,
    pub last_daily_claim_date: Option<NaiveDate>,
    pub session_claimed: bool,
    pub streak_days: u32,
    pub streak_claimed_for: u32,
    pub mastery_claims: BTreeSet<String>,
    pub history: Vec<RewardEntry>,
    pub claims_issued: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuildState {
    pub guild_id: Option<String>,
    pub name: String,
    pub members: u32,
    pub operations_score: i64,
    pub events_completed: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CinematicEvent {
    pub id: String,
    pub event_type: CinematicEventType,
    pub message: String,
    pub intensity: u8,
    pub camera_state: CameraState,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CinematicState {
    pub queue: Vec<CinematicEvent>,
    pub camera_state: CameraState,
    pub emitted: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveOpsChallenge {
    pub id: String,
    pub title: String,
    pub goal: i64,
    pub progress: i64,
    pub reward_credits: i64,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuningEntry {
    pub id: String,
    pub week: u32,
    pub difficulty_factor: f64,
    pub reward_multiplier: f64,
    pub note: String,
    pub actor_player_id: String,
    pub changed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveOpsState {
    pub season: String,
    pub week: u32,
    pub challenge: LiveOpsChallenge,
    #[serde(default)]
    pub tuning_history: Vec<TuningEntry>,
    #[serde(default = "default_factor")]
    pub difficulty_factor: f64,
    #[serde(default = "default_factor")]
    pub reward_multiplier: f64,
    #[serde(default)]
    pub challenge_completions: u32,
    #[serde(default)]
    pub revision: u32,
}

fn default_factor() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyReport {
    pub id: String,
    pub target_player_id: String,
    pub reporter_player_id: String,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyState {
    pub muted_player_ids: BTreeSet<String>,
    pub blocked_player_ids: BTreeSet<String>,
    pub reports: Vec<SafetyReport>,
    pub reports_filed: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxState {
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutcomeState {
    pub status: OutcomeStatus,
    pub reason: String,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for OutcomeState {
    fn default() -> Self {
        Self {
            status: OutcomeStatus::InProgress,
            reason: "Run in progress".to_string(),
            updated_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionState {
    pub xp: i64,
    pub level: u32,
    pub next_level_xp: i64,
    pub milestones: BTreeSet<String>,
}

impl Default for ProgressionState {
    fn default() -> Self {
        Self {
            xp: 0,
            level: 1,
            next_level_xp: 200,
            milestones: BTreeSet::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameplayState {
    pub schema_version: u32,
    pub seed: u64,
    #[serde(default)]
    pub constants: GameplayConstants,
    pub raid: RaidState,
    pub campaign: CampaignState,
    pub narrative: NarrativeState,
    pub skills: SkillTreeState,
    pub pvp: PvPState,
    pub time: TimeState,
    pub boss: BossState,
    pub director: DirectorState,
    pub economy: EconomyState,
    #[serde(default)]
    pub rewards: RewardsState,
    pub guild: GuildState,
    #[serde(default)]
    pub cinematic: CinematicState,
    pub liveops: LiveOpsState,
    #[serde(default)]
    pub safety: SafetyState,
    #[serde(default)]
    pub sandbox: SandboxState,
    #[serde(default)]
    pub outcome: OutcomeState,
    #[serde(default)]
    pub progression: ProgressionState,
}

// ---------------------------------------------------------------------------
// Transition results
// ---------------------------------------------------------------------------

/// Why an action left the state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum Rejection {
    #[error("member id must be non-empty")]
    BlankMember,
    #[error("party is full ({max} members)")]
    PartyFull { max: usize },
    #[error("{0} is not in the raid party")]
    NotInParty(String),
    #[error("unknown objective {0}")]
    UnknownObjective(String),
    #[error("ability {ability} is not granted to role {role}")]
    AbilityNotForRole { ability: String, role: String },
    #[error("ability on cooldown until pvp round {ready_round}")]
    AbilityOnCooldown { ready_round: u32 },
    #[error("unknown choice {0} for the current narrative node")]
    UnknownChoice(String),
    #[error("unknown skill {0}")]
    UnknownSkill(String),
    #[error("skill already unlocked")]
    AlreadyUnlocked,
    #[error("prerequisite {0} is not unlocked")]
    MissingPrerequisite(String),
    #[error("requires level {required}")]
    LevelTooLow { required: u32 },
    #[error("requires milestone {0}")]
    MissingMilestone(String),
    #[error("requires {required} skill points, {available} available")]
    InsufficientSkillPoints { required: u32, available: u32 },
    #[error("skill is not unlocked")]
    NotUnlocked,
    #[error("skill already equipped")]
    AlreadyEquipped,
    #[error("skill is not equipped")]
    NotEquipped,
    #[error("loadout is full ({capacity} slots)")]
    LoadoutFull { capacity: usize },
    #[error("{slot} slot is full")]
    SlotFull { slot: String },
    #[error("unknown fork {0}")]
    UnknownFork(String),
    #[error("the primary fork cannot be merged")]
    CannotMergePrimary,
    #[error("insufficient credits or materials")]
    InsufficientResources,
    #[error("reward already claimed")]
    AlreadyClaimed,
    #[error("no qualifying session activity")]
    NoQualifyingActivity,
    #[error("streak of {days} days is below the minimum of 3")]
    StreakTooShort { days: u32 },
    #[error("unknown mastery {0}")]
    UnknownMastery(String),
    #[error("mastery milestone {0} not reached")]
    MasteryNotMet(String),
    #[error("progress delta must be positive")]
    NonPositiveDelta,
    #[error("target player id must be non-empty")]
    BlankTarget,
    #[error("report reason must be non-empty")]
    BlankReason,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionResult {
    pub action_type: String,
    pub applied: bool,
    pub rejection: Option<Rejection>,
    pub outcome_changed: bool,
}
