//! Fixed choices offered by the intake form.

/// Stage that requires a free-text elaboration.
pub const OTHER_STAGE: &str = "Other";

pub const STAGE_OPTIONS: [&str; 6] = [
    "Just getting started / Exploring",
    "Building community support",
    "Researching harm and forms of repair",
    "Developing proposals / advocacy",
    "Implementing initiatives",
    OTHER_STAGE,
];

pub const TOPIC_OPTIONS: [&str; 15] = [
    "Allyship (Including Other Justice Movements)",
    "Interfaith Collaboration",
    "Arts and Culture",
    "Communications",
    "Community Engagement",
    "Form of Repair",
    "Funding Repair",
    "Fundraising The Work",
    "General / Just Getting Started",
    "Harm Report Consultation",
    "Leadership Coaching",
    "Legal Strategy",
    "Legislative Strategy",
    "Movement and Well-being",
    "Reparations Education",
];

pub fn is_known_stage(stage: &str) -> bool {
    STAGE_OPTIONS.contains(&stage)
}

pub fn is_known_topic(topic: &str) -> bool {
    TOPIC_OPTIONS.contains(&topic)
}
