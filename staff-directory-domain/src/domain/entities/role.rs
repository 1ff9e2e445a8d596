use super::common::attribute_keys;
use super::identity::NewIdentity;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Clinical staff roles, each backed by a provider group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StaffRole {
    Doctor,
    Nurse,
    Administrative,
    HumanResources,
    Support,
}

impl StaffRole {
    pub const ALL: [StaffRole; 5] = [
        StaffRole::Doctor,
        StaffRole::Nurse,
        StaffRole::Administrative,
        StaffRole::HumanResources,
        StaffRole::Support,
    ];

    /// Group name in the user pool
    pub fn group_name(&self) -> &'static str {
        match self {
            StaffRole::Doctor => "doctor",
            StaffRole::Nurse => "nurse",
            StaffRole::Administrative => "administrative",
            StaffRole::HumanResources => "humanR",
            StaffRole::Support => "support",
        }
    }

    /// Value stored in the `custom:role` attribute
    pub fn attribute_value(&self) -> &'static str {
        match self {
            StaffRole::Doctor => "DOCTOR",
            StaffRole::Nurse => "NURSE",
            StaffRole::Administrative => "ADMINISTRATIVE",
            StaffRole::HumanResources => "HUMAN_RESOURCES",
            StaffRole::Support => "SUPPORT",
        }
    }

    pub fn from_group_name(group: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.group_name() == group)
    }
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.attribute_value())
    }
}

impl FromStr for StaffRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.attribute_value().eq_ignore_ascii_case(s) || role.group_name() == s)
            .ok_or_else(|| format!("Invalid staff role: {s}"))
    }
}

/// Everything needed to bring a new staff member into the directory
#[derive(Debug, Clone)]
pub struct StaffOnboarding {
    pub candidate: NewIdentity,
    pub role: StaffRole,
    pub send_invite: bool,
}

impl StaffOnboarding {
    pub fn new(candidate: NewIdentity, role: StaffRole) -> Self {
        Self {
            candidate,
            role,
            send_invite: false,
        }
    }

    pub fn with_invite(mut self, send_invite: bool) -> Self {
        self.send_invite = send_invite;
        self
    }

    /// Candidate with the role attribute stamped on it
    pub fn candidate_with_role(&self) -> NewIdentity {
        self.candidate
            .clone()
            .with_attribute(attribute_keys::ROLE, self.role.attribute_value())
    }
}
