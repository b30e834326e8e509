//! On-demand loading along the entity relations.

use sea_orm::entity::prelude::*;
use sea_orm::ConnectionTrait;
use tracing::debug;

use crate::errors::Result;
use crate::query::{fetch, CrudEntity, FindManyArgs};

/// Rows of `R` owned by `parent`, shaped by `args`.
pub async fn load_children<P, R, C>(db: &C, parent: &P::Model, args: &FindManyArgs<R>) -> Result<Vec<R::Model>>
where
    P: EntityTrait + Related<R>,
    R: CrudEntity,
    C: ConnectionTrait,
{
    let rows = fetch(db, parent.find_related(R::default()), args).await?;
    debug!(parent = P::default().table_name(), child = R::NAME, rows = rows.len(), "load_children");
    Ok(rows)
}

/// The row `child` points at, `None` only for an unset optional reference.
pub async fn load_parent<Ch, P, C>(db: &C, child: &Ch::Model) -> Result<Option<P::Model>>
where
    Ch: EntityTrait + Related<P>,
    P: EntityTrait,
    C: ConnectionTrait,
{
    Ok(child.find_related(P::default()).one(db).await?)
}
