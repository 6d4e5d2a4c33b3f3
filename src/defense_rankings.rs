use std::collections::BTreeMap;

use crate::error::{ScoutError, ScoutResult};
use crate::model::{DefenseRow, DefenseTable, Position, RankedDefenseRow, RankedDefenseTable, RawTable};
use crate::stat_table::parse_number;

const TEAM_COLUMN: &str = "team";

impl DefenseTable {
    /// Reads a defense-vs-position table: one `Team` column, every other
    /// column numeric. Unreadable cells are left out of that row.
    pub fn from_raw(position: Position, raw: &RawTable) -> ScoutResult<Self> {
        let scope = format!("defense table {position}");
        if raw.is_empty() {
            return Err(ScoutError::upstream_empty(scope));
        }
        let team_idx = raw
            .headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(TEAM_COLUMN))
            .ok_or_else(|| ScoutError::data_shape(&scope, "no Team column"))?;

        let columns: Vec<String> = raw
            .headers
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != team_idx)
            .map(|(_, h)| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for cells in raw.rows() {
            let team = cells.get(team_idx).map(|c| c.trim()).unwrap_or_default();
            if team.is_empty() {
                continue;
            }
            let mut values = BTreeMap::new();
            for (idx, header) in raw.headers.iter().enumerate() {
                if idx == team_idx {
                    continue;
                }
                if let Some(v) = cells.get(idx).and_then(|c| parse_number(c)) {
                    values.insert(header.trim().to_string(), v);
                }
            }
            rows.push(DefenseRow {
                team: team.to_string(),
                values,
            });
        }

        Ok(DefenseTable {
            position,
            columns,
            rows,
        })
    }
}

/// Adds a rank per requested stat, ascending: the team allowing the least
/// ranks 1. Ties share the lowest rank of their group.
pub fn rank_defense_table(table: &DefenseTable, stats: &[String]) -> ScoutResult<RankedDefenseTable> {
    for stat in stats {
        if !table.columns.iter().any(|c| c == stat) {
            return Err(ScoutError::data_shape(
                format!("defense table {}", table.position),
                format!("missing stat column {stat}"),
            ));
        }
    }

    let mut rows: Vec<RankedDefenseRow> = table
        .rows
        .iter()
        .map(|row| RankedDefenseRow {
            team: row.team.clone(),
            values: row.values.clone(),
            ranks: BTreeMap::new(),
        })
        .collect();

    for stat in stats {
        let values: Vec<Option<f64>> = table
            .rows
            .iter()
            .map(|row| row.values.get(stat).copied())
            .collect();
        for (row, rank) in rows.iter_mut().zip(competition_ranks(&values)) {
            if let Some(rank) = rank {
                row.ranks.insert(stat.clone(), rank);
            }
        }
    }

    Ok(RankedDefenseTable {
        position: table.position,
        team_count: rows.len(),
        rows,
    })
}

/// Standard competition ranking ("1224") in ascending order.
/// Missing values get no rank and do not occupy a slot.
pub fn competition_ranks(values: &[Option<f64>]) -> Vec<Option<u32>> {
    let mut order: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(idx, v)| match v {
            Some(x) if x.is_finite() => Some((idx, *x)),
            _ => None,
        })
        .collect();
    order.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

    let mut out = vec![None; values.len()];
    let mut prev: Option<(f64, u32)> = None;
    for (slot, (idx, value)) in order.into_iter().enumerate() {
        let rank = match prev {
            Some((pv, pr)) if pv == value => pr,
            _ => (slot + 1) as u32,
        };
        out[idx] = Some(rank);
        prev = Some((value, rank));
    }
    out
}
