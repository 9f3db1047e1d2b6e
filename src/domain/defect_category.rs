use std::fmt;

use super::Severity;

/// Below this confidence an automated result must be confirmed by a human.
pub const CONFIDENCE_THRESHOLD: f32 = 0.65;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefectCategory {
    StructuralDamage,
    ElectricalHazard,
    WaterDamage,
    FireRisk,
    EquipmentIssue,
    FallHazard,
    ClearNoDefect,
    /// A label outside the taxonomy, or no usable label at all.
    Unknown,
}

impl DefectCategory {
    /// The taxonomy in the order candidate labels are offered to classifiers.
    pub const TAXONOMY: [DefectCategory; 7] = [
        DefectCategory::StructuralDamage,
        DefectCategory::ElectricalHazard,
        DefectCategory::WaterDamage,
        DefectCategory::FireRisk,
        DefectCategory::EquipmentIssue,
        DefectCategory::FallHazard,
        DefectCategory::ClearNoDefect,
    ];

    pub fn candidate_labels() -> Vec<&'static str> {
        Self::TAXONOMY.iter().map(|c| c.label()).collect()
    }

    pub fn label(&self) -> &'static str {
        match self {
            DefectCategory::StructuralDamage => "structural damage",
            DefectCategory::ElectricalHazard => "electrical hazard",
            DefectCategory::WaterDamage => "water damage",
            DefectCategory::FireRisk => "fire risk",
            DefectCategory::EquipmentIssue => "equipment issue",
            DefectCategory::FallHazard => "fall hazard",
            DefectCategory::ClearNoDefect => "clear/no defect",
            DefectCategory::Unknown => "unknown",
        }
    }

    pub fn from_label(label: &str) -> Self {
        let normalized = label.trim().to_lowercase();
        Self::TAXONOMY
            .into_iter()
            .find(|c| c.label() == normalized)
            .unwrap_or(DefectCategory::Unknown)
    }

    /// Fixed category to severity table. `None` for labels outside the taxonomy.
    pub fn severity(&self) -> Option<Severity> {
        match self {
            DefectCategory::StructuralDamage | DefectCategory::ElectricalHazard => {
                Some(Severity::Critical)
            }
            DefectCategory::FireRisk | DefectCategory::WaterDamage | DefectCategory::FallHazard => {
                Some(Severity::High)
            }
            DefectCategory::EquipmentIssue => Some(Severity::Medium),
            DefectCategory::ClearNoDefect => Some(Severity::Clear),
            DefectCategory::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, DefectCategory::Unknown)
    }
}

impl fmt::Display for DefectCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
