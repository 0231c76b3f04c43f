//! Display metadata for conditions, priority levels and object kinds.
//!
//! One static table per enumeration. Every consumer (map markers, legend,
//! detail panels, CLI output) reads from here.

use serde::Serialize;

use crate::domain::{ObjectKind, PriorityLevel, TechnicalCondition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConditionInfo {
    pub level: u8,
    /// Hex marker color
    pub color: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriorityInfo {
    pub level: PriorityLevel,
    pub color: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

pub static CONDITIONS: [ConditionInfo; 5] = [
    ConditionInfo {
        level: 1,
        color: "#10B981",
        label: "Категория 1 - Отличное",
        description: "Объект в идеальном состоянии",
    },
    ConditionInfo {
        level: 2,
        color: "#84CC16",
        label: "Категория 2 - Хорошее",
        description: "Минимальный износ",
    },
    ConditionInfo {
        level: 3,
        color: "#F59E0B",
        label: "Категория 3 - Удовлетворительное",
        description: "Требует внимания",
    },
    ConditionInfo {
        level: 4,
        color: "#F97316",
        label: "Категория 4 - Плохое",
        description: "Необходим ремонт",
    },
    ConditionInfo {
        level: 5,
        color: "#EF4444",
        label: "Категория 5 - Критическое",
        description: "Срочное вмешательство",
    },
];

pub static PRIORITIES: [PriorityInfo; 3] = [
    PriorityInfo {
        level: PriorityLevel::High,
        color: "#DC2626",
        label: "Высокий приоритет",
        description: "Требует немедленного обследования",
    },
    PriorityInfo {
        level: PriorityLevel::Medium,
        color: "#CA8A04",
        label: "Средний приоритет",
        description: "Планируется обследование",
    },
    PriorityInfo {
        level: PriorityLevel::Low,
        color: "#16A34A",
        label: "Низкий приоритет",
        description: "Находится под наблюдением",
    },
];

impl TechnicalCondition {
    pub fn info(self) -> &'static ConditionInfo {
        // Conditions are 1..=5 by construction
        &CONDITIONS[usize::from(self.value() - 1)]
    }
}

impl PriorityLevel {
    pub fn info(self) -> &'static PriorityInfo {
        match self {
            PriorityLevel::High => &PRIORITIES[0],
            PriorityLevel::Medium => &PRIORITIES[1],
            PriorityLevel::Low => &PRIORITIES[2],
        }
    }
}

impl ObjectKind {
    pub fn label(self) -> &'static str {
        match self {
            ObjectKind::WaterBody => "Водоём",
            ObjectKind::Facility => "Гидротехническое сооружение",
            ObjectKind::CriticalZone => "Критическая зона",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_table_lines_up_with_levels() {
        for condition in TechnicalCondition::all() {
            assert_eq!(condition.info().level, condition.value());
        }
        assert_eq!(TechnicalCondition::WORST.info().color, "#EF4444");
    }

    #[test]
    fn test_priority_table_lines_up_with_levels() {
        for level in [PriorityLevel::High, PriorityLevel::Medium, PriorityLevel::Low] {
            assert_eq!(level.info().level, level);
        }
    }

    #[test]
    fn test_tables_are_shared_not_copied() {
        let a = TechnicalCondition::DEFAULT.info();
        let b = TechnicalCondition::DEFAULT.info();
        assert!(std::ptr::eq(a, b));
    }
}
