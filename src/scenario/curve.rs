//! Cost curve: totals for every headcount from 0 to the full roster, via one sort and a
//! running sum.

use serde::Serialize;

use crate::data::roster::Roster;
use crate::scenario::{average_comp, sorted_by_comp, SelectionDirection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CurvePoint {
    pub headcount: usize,
    pub total_compensation: i128,
    pub average_compensation: i64,
}

/// Point `h` matches the totals of `evaluate(roster, h, direction)`.
pub fn cost_curve(roster: &Roster, direction: SelectionDirection) -> Vec<CurvePoint> {
    let ordered = sorted_by_comp(roster, direction);
    let mut points = Vec::with_capacity(ordered.len() + 1);
    points.push(CurvePoint {
        headcount: 0,
        total_compensation: 0,
        average_compensation: 0,
    });

    let mut running = 0i128;
    for (index, record) in ordered.iter().enumerate() {
        running += i128::from(record.comp_usd);
        let headcount = index + 1;
        points.push(CurvePoint {
            headcount,
            total_compensation: running,
            average_compensation: average_comp(running, headcount),
        });
    }
    points
}
