use serde::{Deserialize, Serialize};

use crate::order_types::OrderMapProjection;

/// Carries a fresh projection of the order map to an observer. Trackers receive the full live map; pickers receive a
/// projection with `Collected` entries filtered out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderMapUpdatedEvent {
    pub projection: OrderMapProjection,
}

impl OrderMapUpdatedEvent {
    pub fn new(projection: OrderMapProjection) -> Self {
        Self { projection }
    }
}
