//! Ephemeris and coordinate lookups for catalog identifiers.

use tracing::{info, warn};

use crate::ImportError;
use crate::catalog::{CatalogKind, CatalogRow, CatalogSource, CatalogTable, TIC_COLUMN};
use crate::resolve::NameResolver;
use crate::target_id::{CandidateId, TargetId};

/// Transit timing as listed in a catalog. Values stay optional so blank
/// cells surface as ephemeris validation errors downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct EphemerisParams {
    pub epoch_bjd: Option<f64>,
    pub period_days: Option<f64>,
    pub duration_days: Option<f64>,
    /// Catalog entry the values came from, e.g. `TOI 1234.01`.
    pub source: String,
}

/// Star position as listed in a catalog or returned by the resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct StarPosition {
    pub ra_deg: f64,
    pub dec_deg: f64,
    pub distance_pc: Option<f64>,
    pub source: String,
}

fn candidate_rows(table: &CatalogTable, id: CandidateId) -> Result<CatalogTable, ImportError> {
    let column = table.kind().id_column();
    table.require_column(column)?;
    Ok(table.filter(|row| {
        row.get(column)
            .and_then(|value| value.parse::<CandidateId>().ok())
            == Some(id)
    }))
}

fn tic_rows(table: &CatalogTable, tic: u64) -> Result<CatalogTable, ImportError> {
    table.require_column(TIC_COLUMN)?;
    Ok(table
        .filter(|row| row.get(TIC_COLUMN).and_then(|v| v.parse::<u64>().ok()) == Some(tic))
        .sorted_by_id())
}

fn warn_if_false_positive(kind: CatalogKind, row: &CatalogRow<'_>, entry: &str) {
    if row.get(kind.disposition_column()) == Some("FP") {
        warn!(entry, "{} disposition is a false positive", kind.disposition_column());
    }
}

fn ephemeris_from_row(kind: CatalogKind, row: &CatalogRow<'_>) -> EphemerisParams {
    let (epoch, duration_hours) = match kind {
        CatalogKind::Toi => ("Epoch (BJD)", "Duration (hours)"),
        CatalogKind::Ctoi => ("Midpoint (BJD)", "Duration (hrs)"),
    };
    let id = row.get(kind.id_column()).unwrap_or("?");
    let source = format!("{} {}", kind.label(), id);
    warn_if_false_positive(kind, row, &source);
    EphemerisParams {
        epoch_bjd: row.number(epoch),
        period_days: row.number("Period (days)"),
        duration_days: row
            .number(duration_hours)
            .map(transit_core::units::hours_to_days),
        source,
    }
}

fn position_from_row(kind: CatalogKind, row: &CatalogRow<'_>) -> Option<StarPosition> {
    Some(StarPosition {
        ra_deg: row.number("RA")?,
        dec_deg: row.number("Dec")?,
        distance_pc: row.number("Stellar Distance (pc)").filter(|d| *d > 0.0),
        source: format!("{} {}", kind.label(), row.get(kind.id_column()).unwrap_or("?")),
    })
}

/// Ephemeris for a catalog identifier.
///
/// TIC numbers are looked up in the TOI table first (the n-th candidate by
/// the id suffix), then in the CTOI table.
pub fn ephemeris_for(source: &dyn CatalogSource, id: &TargetId) -> Result<EphemerisParams, ImportError> {
    match id {
        TargetId::Toi(candidate) | TargetId::Ctoi(candidate) => {
            let kind = match id {
                TargetId::Toi(_) => CatalogKind::Toi,
                _ => CatalogKind::Ctoi,
            };
            let table = source.fetch_or_load(kind, false)?;
            let rows = candidate_rows(&table, *candidate)?;
            let row = rows
                .rows()
                .next()
                .ok_or_else(|| ImportError::NotFound(id.label()))?;
            Ok(ephemeris_from_row(kind, &row))
        }
        TargetId::Tic { tic, candidate } => {
            let index = candidate.unwrap_or(1).saturating_sub(1) as usize;
            let tois = tic_rows(&source.fetch_or_load(CatalogKind::Toi, false)?, *tic)?;
            if !tois.is_empty() {
                let row = tois
                    .rows()
                    .nth(index)
                    .ok_or_else(|| ImportError::NotFound(id.label()))?;
                let params = ephemeris_from_row(CatalogKind::Toi, &row);
                info!(tic, entry = %params.source, "using TOI ephemeris");
                return Ok(params);
            }
            let ctois = tic_rows(&source.fetch_or_load(CatalogKind::Ctoi, false)?, *tic)?;
            match ctois.rows().next() {
                Some(row) => {
                    let params = ephemeris_from_row(CatalogKind::Ctoi, &row);
                    info!(tic, entry = %params.source, candidates = ctois.len(), "using CTOI ephemeris");
                    Ok(params)
                }
                None => Err(ImportError::EphemerisUnavailable(id.label())),
            }
        }
        TargetId::Coordinates { .. } | TargetId::Name(_) => {
            Err(ImportError::EphemerisUnavailable(id.label()))
        }
    }
}

/// Position for any identifier: explicit coordinates pass through, catalog
/// ids read their table, and names (or TIC numbers missing from both tables)
/// go to the resolver.
pub fn position_for(
    source: &dyn CatalogSource,
    resolver: &dyn NameResolver,
    id: &TargetId,
) -> Result<StarPosition, ImportError> {
    let from_table = |kind: CatalogKind, rows: &CatalogTable| {
        rows.rows()
            .next()
            .map(|row| position_from_row(kind, &row).ok_or_else(|| ImportError::Unresolved(id.label())))
    };

    match id {
        TargetId::Coordinates { ra_deg, dec_deg } => Ok(StarPosition {
            ra_deg: *ra_deg,
            dec_deg: *dec_deg,
            distance_pc: None,
            source: "coordinates".to_string(),
        }),
        TargetId::Toi(candidate) => {
            let rows = candidate_rows(&source.fetch_or_load(CatalogKind::Toi, false)?, *candidate)?;
            from_table(CatalogKind::Toi, &rows).unwrap_or_else(|| Err(ImportError::NotFound(id.label())))
        }
        TargetId::Ctoi(candidate) => {
            let rows = candidate_rows(&source.fetch_or_load(CatalogKind::Ctoi, false)?, *candidate)?;
            from_table(CatalogKind::Ctoi, &rows).unwrap_or_else(|| Err(ImportError::NotFound(id.label())))
        }
        TargetId::Tic { tic, .. } => {
            for kind in [CatalogKind::Toi, CatalogKind::Ctoi] {
                let rows = tic_rows(&source.fetch_or_load(kind, false)?, *tic)?;
                if let Some(found) = from_table(kind, &rows) {
                    return found;
                }
            }
            resolve_name(resolver, &format!("TIC {tic}"))
        }
        TargetId::Name(name) => resolve_name(resolver, name),
    }
}

fn resolve_name(resolver: &dyn NameResolver, name: &str) -> Result<StarPosition, ImportError> {
    let (ra_deg, dec_deg) = resolver.resolve(name)?;
    Ok(StarPosition {
        ra_deg,
        dec_deg,
        distance_pc: None,
        source: format!("Sesame {name}"),
    })
}
