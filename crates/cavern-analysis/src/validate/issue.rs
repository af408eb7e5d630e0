//! Validation issues and the ordered report.

use std::fmt;

use cavern_core::Coord;
use serde::Serialize;

/// How serious an issue is. Orders `Error < Warning < Info`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    /// The level cannot be played as authored.
    Error,
    /// Playable, but almost certainly not what the author intended.
    Warning,
    /// Noted, not checked.
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        })
    }
}

/// Stable machine-readable issue identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueCode {
    /// Cell array length differs from `width * height`.
    MalformedGrid,
    /// Grid smaller than the configured minimum.
    GridTooSmall,
    /// Tile id outside the catalogue.
    IllegalTile,
    /// Tally of illegal tiles beyond the per-cell reporting cap.
    IllegalTileSummary,
    /// Building placed on a non-pathable tile.
    BuildingOnImpassableTile,
    /// Tally of misplaced buildings beyond the per-cell reporting cap.
    BuildingPlacementSummary,
    /// No tool store and no start position.
    MissingOrigin,
    /// Start position outside the grid.
    OriginOutOfBounds,
    /// Pathable cell with no pathable neighbour.
    IsolatedCell,
    /// Pathable cluster no origin can reach.
    UnreachableRegion,
    /// Resource cell not reachable by walking or drilling.
    UnreachableResource,
    /// Resource cell sealed in by impassable, undrillable walls.
    EnclosedResource,
    /// Objective needs more than the level holds.
    ObjectiveExceedsSupply,
    /// Objective needs nearly everything the level holds.
    ObjectiveTightMargin,
    /// Objective kind not checked against the grid.
    ObjectiveUnverified,
    /// Objective refers to a cell outside the grid.
    ObjectiveOutOfBounds,
    /// Script names a cell or building that does not exist.
    ScriptMissingEntity,
}

impl IssueCode {
    /// Fixed severity of this code.
    pub fn severity(self) -> Severity {
        match self {
            Self::MalformedGrid
            | Self::GridTooSmall
            | Self::IllegalTile
            | Self::IllegalTileSummary
            | Self::BuildingOnImpassableTile
            | Self::BuildingPlacementSummary
            | Self::MissingOrigin
            | Self::OriginOutOfBounds
            | Self::ObjectiveExceedsSupply
            | Self::ObjectiveOutOfBounds
            | Self::ScriptMissingEntity => Severity::Error,
            Self::IsolatedCell
            | Self::UnreachableRegion
            | Self::UnreachableResource
            | Self::EnclosedResource
            | Self::ObjectiveTightMargin => Severity::Warning,
            Self::ObjectiveUnverified => Severity::Info,
        }
    }

    /// Kebab-case wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MalformedGrid => "malformed-grid",
            Self::GridTooSmall => "grid-too-small",
            Self::IllegalTile => "illegal-tile",
            Self::IllegalTileSummary => "illegal-tile-summary",
            Self::BuildingOnImpassableTile => "building-on-impassable-tile",
            Self::BuildingPlacementSummary => "building-placement-summary",
            Self::MissingOrigin => "missing-origin",
            Self::OriginOutOfBounds => "origin-out-of-bounds",
            Self::IsolatedCell => "isolated-cell",
            Self::UnreachableRegion => "unreachable-region",
            Self::UnreachableResource => "unreachable-resource",
            Self::EnclosedResource => "enclosed-resource",
            Self::ObjectiveExceedsSupply => "objective-exceeds-supply",
            Self::ObjectiveTightMargin => "objective-tight-margin",
            Self::ObjectiveUnverified => "objective-unverified",
            Self::ObjectiveOutOfBounds => "objective-out-of-bounds",
            Self::ScriptMissingEntity => "script-missing-entity",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Derived from `code`.
    pub severity: Severity,
    /// What was found.
    pub code: IssueCode,
    /// Human-readable detail.
    pub message: String,
    /// Offending cell, when the issue has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Coord>,
}

impl ValidationIssue {
    /// An issue without a location.
    pub fn new(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: code.severity(),
            code,
            message: message.into(),
            location: None,
        }
    }

    /// Attach a location.
    pub fn at(mut self, coord: Coord) -> Self {
        self.location = Some(coord);
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.severity, self.code)?;
        if let Some(at) = self.location {
            write!(f, " at {at}")?;
        }
        write!(f, ": {}", self.message)
    }
}

/// All issues from one validation run, ordered errors first.
///
/// Within a severity, issues keep the order their phases produced them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Order `issues` by severity, stably.
    pub fn from_issues(mut issues: Vec<ValidationIssue>) -> Self {
        issues.sort_by_key(|i| i.severity);
        Self { issues }
    }

    /// Every issue.
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Issues of one severity.
    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |i| i.severity == severity)
    }

    /// Error-severity issues.
    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.with_severity(Severity::Error)
    }

    /// Warning-severity issues.
    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.with_severity(Severity::Warning)
    }

    /// Info-severity issues.
    pub fn infos(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.with_severity(Severity::Info)
    }

    /// Issues carrying `code`.
    pub fn by_code(&self, code: IssueCode) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |i| i.code == code)
    }

    /// Number of issues.
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// No issues at all.
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// No errors. Warnings and infos do not block play.
    pub fn is_playable(&self) -> bool {
        self.errors().next().is_none()
    }

    /// Consume the report.
    pub fn into_issues(self) -> Vec<ValidationIssue> {
        self.issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_orders_by_severity_stably() {
        let report = ValidationReport::from_issues(vec![
            ValidationIssue::new(IssueCode::ObjectiveUnverified, "a"),
            ValidationIssue::new(IssueCode::IsolatedCell, "b"),
            ValidationIssue::new(IssueCode::IllegalTile, "c"),
            ValidationIssue::new(IssueCode::UnreachableRegion, "d"),
            ValidationIssue::new(IssueCode::MissingOrigin, "e"),
        ]);
        let messages: Vec<_> = report.issues().iter().map(|i| i.message.as_str()).collect();
        assert_eq!(messages, ["c", "e", "b", "d", "a"]);
        assert!(!report.is_playable());
        assert_eq!(report.warnings().count(), 2);
    }

    #[test]
    fn issue_display_and_json() {
        let issue =
            ValidationIssue::new(IssueCode::IllegalTile, "tile 13 is not in the catalogue")
                .at(Coord::new(3, 4));
        assert_eq!(
            issue.to_string(),
            "error[illegal-tile] at (3, 4): tile 13 is not in the catalogue"
        );
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["severity"], "error");
        assert_eq!(json["code"], "illegal-tile");
        assert_eq!(json["location"]["x"], 3);
    }

    #[test]
    fn as_str_matches_serde_name() {
        for code in [
            IssueCode::BuildingOnImpassableTile,
            IssueCode::BuildingPlacementSummary,
            IssueCode::ObjectiveTightMargin,
            IssueCode::ScriptMissingEntity,
        ] {
            assert_eq!(serde_json::to_value(code).unwrap(), code.as_str());
        }
    }
}
