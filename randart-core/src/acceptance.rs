use crate::config::SetMinimums;
use crate::object::{Artifact, ItemClass};

/// Items per structural category across a generated set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SetCounts {
    pub swords: usize,
    pub polearms: usize,
    pub blunts: usize,
    pub bows: usize,
    pub body_armor: usize,
    pub shields: usize,
    pub cloaks: usize,
    pub headgear: usize,
    pub gloves: usize,
    pub boots: usize,
}

impl SetCounts {
    pub fn of(items: &[Artifact]) -> Self {
        let mut c = SetCounts::default();
        for item in items.iter().filter(|a| !a.is_unused()) {
            match item.class {
                ItemClass::Sword => c.swords += 1,
                ItemClass::Polearm => c.polearms += 1,
                ItemClass::Hafted => c.blunts += 1,
                ItemClass::Bow => c.bows += 1,
                ItemClass::Shield => c.shields += 1,
                ItemClass::Cloak => c.cloaks += 1,
                ItemClass::Gloves => c.gloves += 1,
                ItemClass::Boots => c.boots += 1,
                class if class.is_body_armor() => c.body_armor += 1,
                class if class.is_headgear() => c.headgear += 1,
                _ => {}
            }
        }
        c
    }

    /// Categories below their minimum as `(name, have, need)`.
    pub fn shortfalls(&self, min: &SetMinimums) -> Vec<(&'static str, usize, usize)> {
        [
            ("swords", self.swords, min.swords),
            ("polearms", self.polearms, min.polearms),
            ("blunt weapons", self.blunts, min.blunts),
            ("bows", self.bows, min.bows),
            ("body armour", self.body_armor, min.body_armor),
            ("shields", self.shields, min.shields),
            ("cloaks", self.cloaks, min.cloaks),
            ("headgear", self.headgear, min.headgear),
            ("gloves", self.gloves, min.gloves),
            ("boots", self.boots, min.boots),
        ]
        .into_iter()
        .filter(|&(_, have, need)| have < need)
        .collect()
    }
}

/// Whether a generated set is structurally balanced.
pub fn accept(items: &[Artifact], minimums: &SetMinimums) -> bool {
    SetCounts::of(items).shortfalls(minimums).is_empty()
}
