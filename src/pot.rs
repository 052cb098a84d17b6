//! PotManager (§4.3) — the hardest arithmetic in the engine: from
//! per-player contributions plus the all-in and folded sets, derive
//! the main pot and any side pots, and later distribute them with
//! split-pot and odd-chip rules.
//!
//! Grounded on the teacher's `gameplay::showdown::Showdown`
//! stake-layering loop (`next_stake`/`distribute`) and on the
//! `pastly-cookerpoker` pot-layering approach in the retrieval pack,
//! generalized into the two explicit entry points §4.3 names:
//! `calculate_pots` and `award_pots`.

use crate::ids::PlayerId;
use crate::Chips;
use std::collections::{BTreeMap, HashMap, HashSet};

pub type PotId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PotType {
    Main,
    Side,
}

#[derive(Debug, Clone)]
pub struct Pot {
    pub id: PotId,
    pub amount: Chips,
    pub kind: PotType,
    pub creation_order: u32,
    pub eligible: HashSet<PlayerId>,
}

/// Result of `calculate_pots`: the pots proper, plus any uncallable
/// overage that must be returned to its contributor before showdown
/// rather than ever becoming a pot.
#[derive(Debug, Clone, Default)]
pub struct PotCalculation {
    pub pots: Vec<Pot>,
    pub returned_overage: Vec<(PlayerId, Chips)>,
}

pub struct PotManager;

impl PotManager {
    /// Derives main/side pots from `contributions` (every player who
    /// put chips in this hand, folded or not), `all_in` (active
    /// players — i.e. not folded — currently at zero stack), and
    /// `folded`.
    pub fn calculate_pots(
        contributions: &BTreeMap<PlayerId, Chips>,
        all_in: &HashSet<PlayerId>,
        folded: &HashSet<PlayerId>,
        next_pot_id: &mut PotId,
    ) -> PotCalculation {
        let active_contributions: BTreeMap<PlayerId, Chips> = contributions
            .iter()
            .filter(|(p, _)| !folded.contains(*p))
            .map(|(p, c)| (*p, *c))
            .collect();

        if active_contributions.is_empty() {
            let total: Chips = contributions.values().sum();
            if total == 0 {
                return PotCalculation::default();
            }
            let id = *next_pot_id;
            *next_pot_id += 1;
            return PotCalculation {
                pots: vec![Pot {
                    id,
                    amount: total,
                    kind: PotType::Main,
                    creation_order: 0,
                    eligible: contributions.keys().copied().collect(),
                }],
                returned_overage: Vec::new(),
            };
        }

        // A lone active contributor has no opponent left to contest
        // any of it — the whole pot (including folded players' dead
        // money) is theirs, not uncallable overage. The general
        // layering below can't express this: every layer's eligible
        // set would have size one and the overage-pop loop would
        // wrongly hand back folded players' forfeited chips instead
        // of forming a pot.
        if active_contributions.len() == 1 {
            let total: Chips = contributions.values().sum();
            if total == 0 {
                return PotCalculation::default();
            }
            let winner = *active_contributions.keys().next().unwrap();
            let id = *next_pot_id;
            *next_pot_id += 1;
            return PotCalculation {
                pots: vec![Pot {
                    id,
                    amount: total,
                    kind: PotType::Main,
                    creation_order: 0,
                    eligible: std::iter::once(winner).collect(),
                }],
                returned_overage: Vec::new(),
            };
        }

        let max_active = *active_contributions.values().max().unwrap();
        let mut levels: Vec<Chips> = active_contributions
            .iter()
            .filter(|(p, _)| all_in.contains(*p))
            .map(|(_, c)| *c)
            .collect();
        levels.push(max_active);
        levels.sort_unstable();
        levels.dedup();

        let mut layers: Vec<(Chips, Chips, HashSet<PlayerId>)> = Vec::new(); // (delta, amount, eligible)
        let mut prev = 0 as Chips;
        for &level in &levels {
            let delta = level - prev;
            let eligible: HashSet<PlayerId> = active_contributions
                .iter()
                .filter(|(_, c)| **c >= level)
                .map(|(p, _)| *p)
                .collect();
            let amount: Chips = contributions
                .values()
                .map(|c| (c - prev).max(0).min(delta))
                .sum();
            layers.push((delta, amount, eligible));
            prev = level;
        }

        // A layer whose eligibility has shrunk to a single player
        // holds chips no opponent could ever call; per §4.3/§8 that
        // is uncallable overage, returned to the contributor, never a
        // side pot. Because eligibility only shrinks as levels climb,
        // this can only ever be a suffix — in practice just the final
        // layer.
        let mut returned_overage = Vec::new();
        while let Some((_, amount, eligible)) = layers.last() {
            if eligible.len() == 1 {
                let player = *eligible.iter().next().unwrap();
                returned_overage.push((player, *amount));
                layers.pop();
            } else {
                break;
            }
        }

        let mut pots = Vec::with_capacity(layers.len());
        for (order, (_, amount, eligible)) in layers.into_iter().enumerate() {
            if amount == 0 {
                continue;
            }
            let id = *next_pot_id;
            *next_pot_id += 1;
            pots.push(Pot {
                id,
                amount,
                kind: if order == 0 { PotType::Main } else { PotType::Side },
                creation_order: order as u32,
                eligible,
            });
        }

        PotCalculation {
            pots,
            returned_overage,
        }
    }

    /// Awards each pot (in creation order) to the argmin-rank winners
    /// among `winners_by_pot[pot.id] ∩ pot.eligible`. Splits evenly by
    /// floor division; the remainder (one chip per extra winner, at
    /// most `winners-1` chips) goes to whichever winners sort first by
    /// `priority` (lower value = earlier seat left of button, i.e.
    /// first to act). Zeroes each pot after award. Pots with no
    /// eligible winner present are skipped (should not happen if
    /// `winners_by_pot` was derived from `pot.eligible`).
    pub fn award_pots(
        pots: &mut [Pot],
        winners_by_pot: &HashMap<PotId, Vec<PlayerId>>,
        priority: &HashMap<PlayerId, u32>,
    ) -> HashMap<PlayerId, Chips> {
        let mut awarded: HashMap<PlayerId, Chips> = HashMap::new();
        let mut ordered_pots: Vec<&mut Pot> = pots.iter_mut().collect();
        ordered_pots.sort_by_key(|p| p.creation_order);

        for pot in ordered_pots {
            let Some(candidates) = winners_by_pot.get(&pot.id) else {
                continue;
            };
            let mut winners: Vec<PlayerId> = candidates
                .iter()
                .filter(|p| pot.eligible.contains(*p))
                .copied()
                .collect();
            if winners.is_empty() {
                continue;
            }
            winners.sort_by_key(|p| priority.get(p).copied().unwrap_or(u32::MAX));

            let share = pot.amount / winners.len() as Chips;
            let remainder = (pot.amount % winners.len() as Chips) as usize;
            for (i, winner) in winners.iter().enumerate() {
                let extra = if i < remainder { 1 } else { 0 };
                *awarded.entry(*winner).or_insert(0) += share + extra;
            }
            pot.amount = 0;
        }
        awarded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid() -> PlayerId {
        PlayerId::new()
    }

    #[test]
    fn three_way_call_down_single_main_pot() {
        let (p1, p2, p3) = (pid(), pid(), pid());
        let mut contributions = BTreeMap::new();
        contributions.insert(p1, 2);
        contributions.insert(p2, 2);
        contributions.insert(p3, 2);
        let mut next_id = 1;
        let calc = PotManager::calculate_pots(&contributions, &HashSet::new(), &HashSet::new(), &mut next_id);
        assert_eq!(calc.pots.len(), 1);
        assert_eq!(calc.pots[0].amount, 6);
        assert_eq!(calc.pots[0].kind, PotType::Main);
        assert!(calc.returned_overage.is_empty());
    }

    #[test]
    fn three_all_ins_plus_a_caller_produce_main_and_two_side_pots() {
        // S3: P1=30 (all-in), P2=60 (all-in), P3=100 (all-in), P4=100 (call)
        let (p1, p2, p3, p4) = (pid(), pid(), pid(), pid());
        let mut contributions = BTreeMap::new();
        contributions.insert(p1, 30);
        contributions.insert(p2, 60);
        contributions.insert(p3, 100);
        contributions.insert(p4, 100);
        let all_in: HashSet<PlayerId> = [p1, p2, p3].into_iter().collect();
        let mut next_id = 1;
        let calc = PotManager::calculate_pots(&contributions, &all_in, &HashSet::new(), &mut next_id);
        assert_eq!(calc.pots.len(), 3);
        assert_eq!(calc.pots[0].amount, 120);
        assert_eq!(calc.pots[0].eligible.len(), 4);
        assert_eq!(calc.pots[1].amount, 90);
        assert_eq!(calc.pots[1].eligible.len(), 3);
        assert_eq!(calc.pots[2].amount, 80);
        assert_eq!(calc.pots[2].eligible.len(), 2);
        assert_eq!(
            calc.pots.iter().map(|p| p.amount).sum::<Chips>(),
            290
        );
    }

    #[test]
    fn uncallable_overage_returned_not_side_pot() {
        // S5: Short all-in 50, Deep all-in 150 (uncalled 100 returned).
        let (short, deep) = (pid(), pid());
        let mut contributions = BTreeMap::new();
        contributions.insert(short, 50);
        contributions.insert(deep, 150);
        let all_in: HashSet<PlayerId> = [short, deep].into_iter().collect();
        let mut next_id = 1;
        let calc = PotManager::calculate_pots(&contributions, &all_in, &HashSet::new(), &mut next_id);
        assert_eq!(calc.pots.len(), 1);
        assert_eq!(calc.pots[0].amount, 100);
        assert_eq!(calc.returned_overage, vec![(deep, 100)]);
    }

    #[test]
    fn lone_survivor_collects_folded_dead_money_as_main_pot() {
        // Everyone but one player folds; the survivor's pot must
        // include the folded players' forfeited contributions rather
        // than having them swallowed as "overage".
        let (survivor, folder1, folder2) = (pid(), pid(), pid());
        let mut contributions = BTreeMap::new();
        contributions.insert(survivor, 2);
        contributions.insert(folder1, 1);
        contributions.insert(folder2, 0);
        let folded: HashSet<PlayerId> = [folder1, folder2].into_iter().collect();
        let mut next_id = 1;
        let calc = PotManager::calculate_pots(&contributions, &HashSet::new(), &folded, &mut next_id);
        assert_eq!(calc.pots.len(), 1);
        assert_eq!(calc.pots[0].amount, 3);
        assert_eq!(calc.pots[0].kind, PotType::Main);
        assert_eq!(calc.pots[0].eligible, [survivor].into_iter().collect());
        assert!(calc.returned_overage.is_empty());
    }

    #[test]
    fn all_in_for_exact_call_creates_no_side_pot() {
        let (a, b) = (pid(), pid());
        let mut contributions = BTreeMap::new();
        contributions.insert(a, 100);
        contributions.insert(b, 100);
        let all_in: HashSet<PlayerId> = [a].into_iter().collect();
        let mut next_id = 1;
        let calc = PotManager::calculate_pots(&contributions, &all_in, &HashSet::new(), &mut next_id);
        assert_eq!(calc.pots.len(), 1);
        assert_eq!(calc.pots[0].amount, 200);
    }

    #[test]
    fn award_pots_splits_remainder_by_priority() {
        let (a, b) = (pid(), pid());
        let mut pots = vec![Pot {
            id: 1,
            amount: 7,
            kind: PotType::Main,
            creation_order: 0,
            eligible: [a, b].into_iter().collect(),
        }];
        let mut winners_by_pot = HashMap::new();
        winners_by_pot.insert(1, vec![a, b]);
        let mut priority = HashMap::new();
        priority.insert(a, 0);
        priority.insert(b, 1);
        let awarded = PotManager::award_pots(&mut pots, &winners_by_pot, &priority);
        assert_eq!(awarded[&a], 4);
        assert_eq!(awarded[&b], 3);
        assert_eq!(pots[0].amount, 0);
    }

    #[test]
    fn all_in_for_less_cannot_win_more_than_eligible_pots() {
        let (p1, p2, p3, p4) = (pid(), pid(), pid(), pid());
        let mut contributions = BTreeMap::new();
        contributions.insert(p1, 30);
        contributions.insert(p2, 60);
        contributions.insert(p3, 100);
        contributions.insert(p4, 100);
        let all_in: HashSet<PlayerId> = [p1, p2, p3].into_iter().collect();
        let mut next_id = 1;
        let calc = PotManager::calculate_pots(&contributions, &all_in, &HashSet::new(), &mut next_id);
        // p1 has the best hand and would win every pot it is eligible
        // for, but it is only eligible for the main pot (30x4=120).
        let mut winners_by_pot = HashMap::new();
        for pot in &calc.pots {
            winners_by_pot.insert(pot.id, vec![p1]);
        }
        let mut pots = calc.pots;
        let priority = HashMap::new();
        let awarded = PotManager::award_pots(&mut pots, &winners_by_pot, &priority);
        assert_eq!(awarded.get(&p1).copied().unwrap_or(0), 120);
        assert!(awarded.get(&p1).copied().unwrap_or(0) <= 30 * 4);
    }
}
