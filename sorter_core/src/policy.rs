//! Category to actuator position policy.
//!
//! Only issues a command when the target differs from the last position
//! successfully commanded.

use sorter_traits::Actuator;

use crate::error::{Result, SorterError};
use crate::hw_error::map_hw_error;
use crate::types::Category;

/// Target position per category; `None` leaves the actuator where it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionMap {
    pub plastic: Option<i32>,
    pub glass: Option<i32>,
    pub metal: Option<i32>,
}

impl Default for PositionMap {
    fn default() -> Self {
        Self {
            plastic: Some(80),
            glass: Some(100),
            metal: Some(125),
        }
    }
}

impl PositionMap {
    /// `Unknown` never has a target.
    pub fn target(&self, category: Category) -> Option<i32> {
        match category {
            Category::Unknown => None,
            Category::Plastic => self.plastic,
            Category::Glass => self.glass,
            Category::Metal => self.metal,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ActuationPolicy {
    positions: PositionMap,
    initial: i32,
    last_commanded: i32,
}

impl ActuationPolicy {
    pub fn new(positions: PositionMap, initial_position: i32) -> Self {
        Self {
            positions,
            initial: initial_position,
            last_commanded: initial_position,
        }
    }

    pub fn positions(&self) -> &PositionMap {
        &self.positions
    }

    pub fn last_commanded(&self) -> i32 {
        self.last_commanded
    }

    pub fn target_position(&self, category: Category) -> Option<i32> {
        self.positions.target(category)
    }

    /// Position to command for `category`, or `None` when no move is needed.
    pub fn plan(&self, category: Category) -> Option<i32> {
        self.target_position(category)
            .filter(|&p| p != self.last_commanded)
    }

    /// Drive `actuator` for `category`. Returns the commanded position, if any.
    ///
    /// State is updated only after the actuator accepts the command.
    pub fn apply<A: Actuator + ?Sized>(
        &mut self,
        category: Category,
        actuator: &mut A,
    ) -> Result<Option<i32>> {
        let Some(pos) = self.plan(category) else {
            return Ok(None);
        };
        Self::command(actuator, pos)?;
        tracing::info!(
            category = category.as_str(),
            from = self.last_commanded,
            to = pos,
            "actuator moved"
        );
        self.last_commanded = pos;
        Ok(Some(pos))
    }

    /// Send the actuator to the initial position unconditionally.
    pub fn home<A: Actuator + ?Sized>(&mut self, actuator: &mut A) -> Result<()> {
        Self::command(actuator, self.initial)?;
        tracing::info!(position = self.initial, "actuator homed");
        self.last_commanded = self.initial;
        Ok(())
    }

    fn command<A: Actuator + ?Sized>(actuator: &mut A, pos: i32) -> Result<()> {
        actuator.move_to(pos).map_err(|e| {
            let mapped: SorterError = map_hw_error(&*e);
            eyre::Report::new(mapped)
        })
    }
}

impl Default for ActuationPolicy {
    fn default() -> Self {
        let cfg = crate::config::ActuationCfg::default();
        Self::new(cfg.positions, cfg.initial_position)
    }
}
