//! Trigger-fed sequence lookup.

use crate::error::Result;
use crate::executor::CatalogExecutor;
use crate::fetch::{Fetcher, QueryKind};
use crate::queries::SEQUENCE_SQL;

/// Name of the sequence a trigger on `table_name` draws from, if any.
///
/// The lookup goes through the session user's dependency views, so only the table's
/// local name is bound.
pub(crate) fn find_sequence<E: CatalogExecutor + ?Sized>(
    fetcher: &Fetcher<'_, E>,
    table_name: &str,
) -> Result<Option<String>> {
    let sequence = fetcher
        .scalar(QueryKind::Sequence, SEQUENCE_SQL, &[table_name])?
        .filter(|name| !name.trim().is_empty());
    if let Some(name) = &sequence {
        log::debug!("Table {} is fed by sequence {}", table_name, name);
    }
    Ok(sequence)
}
