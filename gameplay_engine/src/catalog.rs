//! Static content tables: hazards, narrative graph, skill tree, recipes,
//! live-ops challenges and the raid role/ability table.
use std::collections::BTreeMap;

use crate::domain::{
    BossAction, CraftRecipe, LoadoutSlot, NarrativeChoice, NarrativeNode, RaidAbility, RaidRole,
    SkillNode,
};

pub const HAZARD_POOL: [&str; 6] = [
    "latency storm",
    "cache divergence",
    "tool timeout chain",
    "schema mismatch surge",
    "context drift",
    "dependency deadlock",
];

pub const FAILURE_MUTATOR: &str = "failure-loop";
pub const MUTATOR_WINDOW: usize = 6;
pub const LEVEL_MILESTONES: [u32; 3] = [3, 5, 10];
pub const NARRATIVE_START_NODE: &str = "node-alpha";

pub fn milestone_id(level: u32) -> String {
    format!("milestone-level-{level}")
}

// ── Narrative ──

fn choice(id: &str, label: &str, next: &str, tension_delta: i64, mutator: &str) -> NarrativeChoice {
    NarrativeChoice {
        id: id.to_string(),
        label: label.to_string(),
        next_node_id: next.to_string(),
        tension_delta,
        mutator: mutator.to_string(),
    }
}

/// The three-node narrative loop alpha -> beta -> gamma -> alpha.
pub fn narrative_nodes() -> BTreeMap<String, NarrativeNode> {
    let nodes = vec![
        NarrativeNode {
            id: "node-alpha".to_string(),
            title: "Signal Fracture".to_string(),
            body: "Telemetry splinters across three regions and the pager will not stop.".to_string(),
            choices: vec![
                choice("alpha-risk", "Chase the hottest signal", "node-beta", 10, "risk-surge"),
                choice("alpha-safe", "Freeze deploys first", "node-beta", -6, "stability-first"),
            ],
        },
        NarrativeNode {
            id: "node-beta".to_string(),
            title: "Protocol Fork".to_string(),
            body: "Two remediation paths diverge; only one can run before the next wave.".to_string(),
            choices: vec![
                choice("beta-speed", "Push the fast patch", "node-gamma", 7, "throughput-boost"),
                choice("beta-clarity", "Map the blast radius", "node-gamma", -4, "clarity-path"),
            ],
        },
        NarrativeNode {
            id: "node-gamma".to_string(),
            title: "Final Directive".to_string(),
            body: "The root cause surfaces. Commit to a strike or reset the tempo.".to_string(),
            choices: vec![
                choice("gamma-strike", "Strike the root cause", "node-alpha", 8, "strike-loop"),
                choice("gamma-reset", "Reset and regroup", "node-alpha", -7, "tempo-reset"),
            ],
        },
    ];
    nodes.into_iter().map(|node| (node.id.clone(), node)).collect()
}

// ── Skill tree ──

struct SkillSpec {
    id: &'static str,
    label: &'static str,
    cost: u32,
    requires: &'static [&'static str],
    min_level: u32,
    milestones: &'static [&'static str],
    slot: LoadoutSlot,
    tier: u8,
}

const SKILL_TREE: [SkillSpec; 6] = [
    SkillSpec {
        id: "skill-focus",
        label: "Focus Matrix",
        cost: 1,
        requires: &[],
        min_level: 1,
        milestones: &[],
        slot: LoadoutSlot::Core,
        tier: 1,
    },
    SkillSpec {
        id: "skill-resilience",
        label: "Resilience Mesh",
        cost: 1,
        requires: &[],
        min_level: 1,
        milestones: &[],
        slot: LoadoutSlot::Utility,
        tier: 1,
    },
    SkillSpec {
        id: "skill-surge",
        label: "Surge Compiler",
        cost: 2,
        requires: &["skill-focus"],
        min_level: 2,
        milestones: &[],
        slot: LoadoutSlot::Power,
        tier: 2,
    },
    SkillSpec {
        id: "skill-echo",
        label: "Echo Anticipator",
        cost: 2,
        requires: &["skill-resilience"],
        min_level: 2,
        milestones: &[],
        slot: LoadoutSlot::Utility,
        tier: 2,
    },
    SkillSpec {
        id: "skill-ward",
        label: "Ward Lattice",
        cost: 2,
        requires: &["skill-resilience"],
        min_level: 3,
        milestones: &["milestone-level-3"],
        slot: LoadoutSlot::Power,
        tier: 2,
    },
    SkillSpec {
        id: "skill-overclock",
        label: "Overclock Conduit",
        cost: 3,
        requires: &["skill-surge", "skill-echo"],
        min_level: 4,
        milestones: &["milestone-level-3"],
        slot: LoadoutSlot::Power,
        tier: 3,
    },
];

pub const INITIAL_SKILL_POINTS: u32 = 4;

/// Every skill node, locked, keyed by id.
pub fn skill_nodes() -> BTreeMap<String, SkillNode> {
    SKILL_TREE
        .iter()
        .map(|spec| {
            let node = SkillNode {
                id: spec.id.to_string(),
                label: spec.label.to_string(),
                cost: spec.cost,
                requires: spec.requires.iter().map(|id| id.to_string()).collect(),
                min_level: spec.min_level,
                milestones: spec.milestones.iter().map(|id| id.to_string()).collect(),
                tier: spec.tier,
                slot: spec.slot,
                unlocked: false,
            };
            (node.id.clone(), node)
        })
        .collect()
}

// ── Crafting ──

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecipeCost {
    pub credits: i64,
    pub materials: i64,
}

pub fn recipe_cost(recipe: CraftRecipe) -> RecipeCost {
    match recipe {
        CraftRecipe::StabilityPatch => RecipeCost { credits: 20, materials: 10 },
        CraftRecipe::PrecisionLens => RecipeCost { credits: 30, materials: 14 },
        CraftRecipe::OverclockCore => RecipeCost { credits: 42, materials: 20 },
    }
}

// ── Live-ops ──

pub struct ChallengeSpec {
    pub id: &'static str,
    pub title: &'static str,
    pub goal: i64,
    pub reward_credits: i64,
}

pub const LIVEOPS_CATALOG: [ChallengeSpec; 4] = [
    ChallengeSpec {
        id: "challenge-raid",
        title: "Complete 3 raid objectives",
        goal: 3,
        reward_credits: 120,
    },
    ChallengeSpec {
        id: "challenge-boss",
        title: "Defeat a boss phase",
        goal: 1,
        reward_credits: 180,
    },
    ChallengeSpec {
        id: "challenge-guild",
        title: "Complete 2 guild ops",
        goal: 2,
        reward_credits: 150,
    },
    ChallengeSpec {
        id: "challenge-fork",
        title: "Merge 2 forks",
        goal: 2,
        reward_credits: 140,
    },
];

// ── Raid roles ──

/// The single ability a role grants, with its cooldown in pvp rounds.
pub fn role_ability(role: RaidRole) -> (RaidAbility, u32) {
    match role {
        RaidRole::Strategist => (RaidAbility::FocusMark, 3),
        RaidRole::Operator => (RaidAbility::StabilityShield, 2),
        RaidRole::Analyst => (RaidAbility::ScanPulse, 2),
        RaidRole::Saboteur => (RaidAbility::ChaosSpike, 3),
    }
}

pub fn role_name(role: RaidRole) -> &'static str {
    match role {
        RaidRole::Strategist => "strategist",
        RaidRole::Operator => "operator",
        RaidRole::Analyst => "analyst",
        RaidRole::Saboteur => "saboteur",
    }
}

// ── Boss ──

/// Base damage per phase, before the vulnerability bonus.
pub fn boss_damage(phase: u8, action: BossAction) -> i64 {
    match (phase, action) {
        (2, BossAction::Exploit) => 34,
        (2, BossAction::Strike) => 28,
        (2, BossAction::Shield) => 10,
        (3, BossAction::Exploit) => 26,
        (3, BossAction::Strike) => 18,
        (3, BossAction::Shield) => 14,
        (_, BossAction::Exploit) => 42,
        (_, BossAction::Strike) => 24,
        (_, BossAction::Shield) => 8,
    }
}

pub const VULNERABILITY_BONUS: i64 = 8;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_narrative_graph_is_closed() {
        let nodes = narrative_nodes();
        for node in nodes.values() {
            for choice in &node.choices {
                assert!(
                    nodes.contains_key(&choice.next_node_id),
                    "{} points at missing node {}",
                    choice.id,
                    choice.next_node_id
                );
            }
        }
        assert!(nodes.contains_key(NARRATIVE_START_NODE));
    }

    #[test]
    fn test_skill_prerequisites_exist() {
        let nodes = skill_nodes();
        assert_eq!(nodes.len(), 6);
        for node in nodes.values() {
            for req in &node.requires {
                assert!(nodes.contains_key(req), "{} requires unknown {}", node.id, req);
            }
        }
    }

    #[test]
    fn test_boss_damage_table() {
        assert_eq!(boss_damage(1, BossAction::Exploit), 42);
        assert_eq!(boss_damage(2, BossAction::Strike), 28);
        assert_eq!(boss_damage(3, BossAction::Shield), 14);
    }
}
