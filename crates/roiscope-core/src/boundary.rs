//! Boundary actions attached to one direction of a polygon edge.
//!
//! A `notify` action carries a condition and no counter; `increment` and
//! `decrement` carry a counter reference and no condition. The constructors
//! are the only way to build a [`BoundaryAction`], and deserialization goes
//! through the same validation.

use crate::{Result, RoiError};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Crossing direction relative to the polygon interior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Inward,
    Outward,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Inward => Direction::Outward,
            Direction::Outward => Direction::Inward,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Inward => "inward",
            Direction::Outward => "outward",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// What happens when an object crosses the edge in the given direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Notify,
    Increment,
    Decrement,
}

impl ActionKind {
    pub fn uses_counter(self) -> bool {
        matches!(self, ActionKind::Increment | ActionKind::Decrement)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Notify => "notify",
            ActionKind::Increment => "increment",
            ActionKind::Decrement => "decrement",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Unvalidated wire form of a [`BoundaryAction`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawBoundaryAction {
    edge_index: usize,
    direction: Direction,
    kind: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    counter_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notify_condition: Option<String>,
}

/// A validated action on one edge direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawBoundaryAction", into = "RawBoundaryAction")]
pub struct BoundaryAction {
    edge_index: usize,
    direction: Direction,
    kind: ActionKind,
    counter_ref: Option<String>,
    notify_condition: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl BoundaryAction {
    /// Build an action, enforcing the notify/counter exclusivity.
    ///
    /// # Errors
    ///
    /// [`RoiError::InvalidBoundaryAction`] when a notify action lacks a
    /// condition or carries a counter, or a counter action lacks a counter
    /// or carries a condition.
    pub fn new(
        edge_index: usize,
        direction: Direction,
        kind: ActionKind,
        counter_ref: Option<String>,
        notify_condition: Option<String>,
    ) -> Result<Self> {
        let counter_ref = non_blank(counter_ref);
        let notify_condition = non_blank(notify_condition);
        match kind {
            ActionKind::Notify => {
                if notify_condition.is_none() {
                    return Err(RoiError::InvalidBoundaryAction(
                        "notify action requires a condition".into(),
                    ));
                }
                if counter_ref.is_some() {
                    return Err(RoiError::InvalidBoundaryAction(
                        "notify action must not reference a counter".into(),
                    ));
                }
            }
            ActionKind::Increment | ActionKind::Decrement => {
                if counter_ref.is_none() {
                    return Err(RoiError::InvalidBoundaryAction(format!(
                        "{kind} action requires a counter"
                    )));
                }
                if notify_condition.is_some() {
                    return Err(RoiError::InvalidBoundaryAction(format!(
                        "{kind} action must not carry a notify condition"
                    )));
                }
            }
        }
        Ok(Self {
            edge_index,
            direction,
            kind,
            counter_ref,
            notify_condition,
        })
    }

    /// Notify action with the given condition.
    pub fn notify(
        edge_index: usize,
        direction: Direction,
        condition: impl Into<String>,
    ) -> Result<Self> {
        Self::new(
            edge_index,
            direction,
            ActionKind::Notify,
            None,
            Some(condition.into()),
        )
    }

    /// Increment or decrement action on a counter.
    pub fn counter(
        edge_index: usize,
        direction: Direction,
        kind: ActionKind,
        counter_ref: impl Into<String>,
    ) -> Result<Self> {
        if !kind.uses_counter() {
            return Err(RoiError::InvalidBoundaryAction(
                "notify is not a counter action".into(),
            ));
        }
        Self::new(edge_index, direction, kind, Some(counter_ref.into()), None)
    }

    pub fn edge_index(&self) -> usize {
        self.edge_index
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn counter_ref(&self) -> Option<&str> {
        self.counter_ref.as_deref()
    }

    pub fn notify_condition(&self) -> Option<&str> {
        self.notify_condition.as_deref()
    }
}

impl TryFrom<RawBoundaryAction> for BoundaryAction {
    type Error = RoiError;

    fn try_from(raw: RawBoundaryAction) -> Result<Self> {
        BoundaryAction::new(
            raw.edge_index,
            raw.direction,
            raw.kind,
            raw.counter_ref,
            raw.notify_condition,
        )
    }
}

impl From<BoundaryAction> for RawBoundaryAction {
    fn from(a: BoundaryAction) -> Self {
        Self {
            edge_index: a.edge_index,
            direction: a.direction,
            kind: a.kind,
            counter_ref: a.counter_ref,
            notify_condition: a.notify_condition,
        }
    }
}

/// Check the per-edge-direction counter rules over a set of actions.
///
/// Within one edge and direction a counter may appear at most once, and
/// never as both `increment` and `decrement`.
pub fn validate_edge_actions(actions: &[BoundaryAction]) -> Result<()> {
    let mut seen: HashMap<(usize, Direction, &str), ActionKind> = HashMap::new();
    let mut conditions: HashSet<(usize, Direction, &str)> = HashSet::new();
    for action in actions {
        if let Some(counter) = action.counter_ref() {
            let key = (action.edge_index, action.direction, counter);
            if let Some(prev) = seen.insert(key, action.kind) {
                let msg = if prev == action.kind {
                    format!(
                        "counter '{counter}' is duplicated on edge {} ({})",
                        action.edge_index, action.direction
                    )
                } else {
                    format!(
                        "counter '{counter}' is both incremented and decremented on edge {} ({})",
                        action.edge_index, action.direction
                    )
                };
                return Err(RoiError::InvalidBoundaryAction(msg));
            }
        } else if let Some(condition) = action.notify_condition() {
            if !conditions.insert((action.edge_index, action.direction, condition)) {
                log::debug!(
                    "duplicate notify condition '{}' on edge {} ({})",
                    condition,
                    action.edge_index,
                    action.direction
                );
            }
        }
    }
    Ok(())
}

/// Check that every action references an edge of an `n`-edge polygon.
pub fn validate_edge_indices(actions: &[BoundaryAction], n: usize) -> Result<()> {
    match actions.iter().find(|a| a.edge_index >= n) {
        Some(a) => Err(RoiError::OutOfRange(format!(
            "action references edge {} of a polygon with {} edges",
            a.edge_index, n
        ))),
        None => Ok(()),
    }
}
