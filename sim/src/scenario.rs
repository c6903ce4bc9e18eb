//! Placement directives as supplied by a scenario loader.

use crate::components::{ArchetypeKind, Fraction, MovementMode};
use crate::error::SimResult;
use crate::registry::UnitBatch;
use crate::spatial::Cell;
use serde::{Deserialize, Serialize};

/// One batch of identical units, with the archetype still given by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementDirective {
    pub count: u32,
    pub archetype: String,
    pub fraction: Fraction,
    #[serde(default)]
    pub movement: MovementMode,
    /// Missing or `null` means no route.
    #[serde(default, deserialize_with = "route_or_empty")]
    pub route: Vec<Cell>,
    /// Missing or `null` places every unit on a random cell.
    #[serde(default)]
    pub position: Option<Cell>,
}

fn route_or_empty<'de, D>(deserializer: D) -> Result<Vec<Cell>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<Cell>>::deserialize(deserializer)?.unwrap_or_default())
}

impl PlacementDirective {
    pub fn new(count: u32, archetype: &str, fraction: Fraction) -> Self {
        Self {
            count,
            archetype: archetype.to_string(),
            fraction,
            movement: MovementMode::Stay,
            route: Vec::new(),
            position: None,
        }
    }

    pub fn at(mut self, cell: Cell) -> Self {
        self.position = Some(cell);
        self
    }

    pub fn moving(mut self, movement: MovementMode) -> Self {
        self.movement = movement;
        self
    }

    pub fn along(mut self, route: Vec<Cell>) -> Self {
        self.movement = MovementMode::Route;
        self.route = route;
        self
    }

    /// Resolve the archetype name. Unknown names are a configuration error.
    pub fn resolve(&self) -> SimResult<UnitBatch> {
        let kind: ArchetypeKind = self.archetype.parse()?;
        Ok(UnitBatch {
            count: self.count,
            kind,
            fraction: self.fraction,
            movement: self.movement,
            route: self.route.clone(),
            position: self.position,
        })
    }
}

/// Ordered list of placement batches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub batches: Vec<PlacementDirective>,
}

impl Scenario {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, directive: PlacementDirective) -> Self {
        self.batches.push(directive);
        self
    }

    pub fn from_json(json: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Two flanking columns of allies advancing from the south on seven
    /// entrenched enemy squads. Laid out for a 100x100 grid.
    pub fn small_battle(infantry: u32, medics: u32, mortars: u32) -> Self {
        let west_east = vec![(40, 90), (60, 90)];
        let east_west = vec![(60, 90), (40, 90)];
        let staging = (50, 20);

        let mut scenario = Self::new();
        for position in [(40, 90), (45, 90), (50, 90), (55, 90), (60, 90), (40, 70), (60, 70)] {
            scenario =
                scenario.with(PlacementDirective::new(5, "infantry", Fraction::Enemy).at(position));
        }
        scenario = scenario.with(
            PlacementDirective::new(infantry / 2, "infantry", Fraction::Ally)
                .at(staging)
                .along(west_east.clone()),
        );
        if medics > 0 {
            scenario = scenario.with(
                PlacementDirective::new(medics, "medic", Fraction::Ally)
                    .at(staging)
                    .along(west_east),
            );
        }
        scenario = scenario.with(
            PlacementDirective::new(infantry / 2, "infantry", Fraction::Ally)
                .at(staging)
                .along(east_west),
        );
        if mortars > 0 {
            scenario =
                scenario.with(PlacementDirective::new(mortars, "mortar", Fraction::Ally).at(staging));
        }
        scenario
    }

    /// Resolve every batch, failing on the first unknown archetype.
    pub fn resolve(&self) -> SimResult<Vec<UnitBatch>> {
        self.batches.iter().map(PlacementDirective::resolve).collect()
    }
}
