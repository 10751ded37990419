//! 配饰商店：猫头鹰装扮的商品目录与槽位
//!
//! 纯数据表，价格以鱼币计。

/// 可装备的槽位
pub const SLOTS: &[&str] = &["head", "eyes", "neck", "back"];

/// 单件配饰
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accessory {
    pub id: &'static str,
    pub name: &'static str,
    pub price: i64,
    pub slot: &'static str,
    pub emoji: &'static str,
}

const ACCESSORIES: &[Accessory] = &[
    // 头部
    Accessory { id: "grad_cap", name: "Graduation Cap", price: 50, slot: "head", emoji: "🎓" },
    Accessory { id: "crown", name: "Royal Crown", price: 100, slot: "head", emoji: "👑" },
    Accessory { id: "wizard_hat", name: "Wizard Hat", price: 75, slot: "head", emoji: "🧙" },
    Accessory { id: "party_hat", name: "Party Hat", price: 15, slot: "head", emoji: "🎉" },
    Accessory { id: "detective_hat", name: "Detective Hat", price: 45, slot: "head", emoji: "🕵️" },
    // 眼部
    Accessory { id: "sunglasses", name: "Cool Sunglasses", price: 30, slot: "eyes", emoji: "😎" },
    Accessory { id: "nerdy_glasses", name: "Nerdy Glasses", price: 20, slot: "eyes", emoji: "🤓" },
    Accessory { id: "star_glasses", name: "Star Glasses", price: 40, slot: "eyes", emoji: "⭐" },
    // 颈部
    Accessory { id: "bow_tie", name: "Red Bow Tie", price: 25, slot: "neck", emoji: "🎀" },
    Accessory { id: "scarf", name: "Winter Scarf", price: 35, slot: "neck", emoji: "🧣" },
    Accessory { id: "medal", name: "Gold Medal", price: 60, slot: "neck", emoji: "🏅" },
    // 背部
    Accessory { id: "cape", name: "Super Cape", price: 80, slot: "back", emoji: "🦸" },
    Accessory { id: "wings", name: "Angel Wings", price: 90, slot: "back", emoji: "👼" },
    Accessory { id: "backpack", name: "School Backpack", price: 35, slot: "back", emoji: "🎒" },
];

pub fn all_accessories() -> &'static [Accessory] {
    ACCESSORIES
}

pub fn get_accessory(item_id: &str) -> Option<&'static Accessory> {
    ACCESSORIES.iter().find(|a| a.id == item_id)
}

pub fn accessories_by_slot(slot: &str) -> Vec<&'static Accessory> {
    ACCESSORIES.iter().filter(|a| a.slot == slot).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_accessory_uses_a_known_slot() {
        for a in all_accessories() {
            assert!(SLOTS.contains(&a.slot), "{} has unknown slot {}", a.id, a.slot);
        }
    }

    #[test]
    fn test_lookup() {
        assert_eq!(get_accessory("crown").unwrap().price, 100);
        assert!(get_accessory("jetpack").is_none());
        assert_eq!(accessories_by_slot("eyes").len(), 3);
    }
}
