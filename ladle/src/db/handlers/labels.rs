//! Shared query shapes for the two user-scoped label tables (tags and
//! ingredients).
//!
//! Both tables have the same columns and the same listing contract: rows are
//! owner-scoped, ordered by name descending, and an `assigned_only` filter
//! restricts the result to labels referenced by at least one of the owner's
//! recipes, collapsed with DISTINCT so a label linked from several recipes
//! appears once. The SQL lives here so the [`super::Tags`] and
//! [`super::Ingredients`] repositories stay in lockstep.

use crate::db::errors::Result;
use crate::types::UserId;
use sqlx::{postgres::PgRow, FromRow, PgConnection, QueryBuilder};

/// Filter for listing labels (tags or ingredients)
#[derive(Debug, Clone)]
pub struct LabelFilter {
    pub user_id: UserId,
    /// Restrict to labels referenced by at least one of the owner's recipes
    pub assigned_only: bool,
}

impl LabelFilter {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            assigned_only: false,
        }
    }

    pub fn assigned_only(mut self, assigned_only: bool) -> Self {
        self.assigned_only = assigned_only;
        self
    }
}

/// The two tables sharing the label shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelTable {
    Tags,
    Ingredients,
}

impl LabelTable {
    fn table(self) -> &'static str {
        match self {
            LabelTable::Tags => "tags",
            LabelTable::Ingredients => "ingredients",
        }
    }

    fn link_table(self) -> &'static str {
        match self {
            LabelTable::Tags => "recipe_tags",
            LabelTable::Ingredients => "recipe_ingredients",
        }
    }

    fn link_column(self) -> &'static str {
        match self {
            LabelTable::Tags => "tag_id",
            LabelTable::Ingredients => "ingredient_id",
        }
    }
}

/// List labels for one owner, ordered by name descending.
///
/// With `assigned_only`, the join through the owner's recipes is collapsed
/// with DISTINCT so each label appears at most once.
pub(crate) async fn list_labels<T>(db: &mut PgConnection, table: LabelTable, filter: &LabelFilter) -> Result<Vec<T>>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let mut query = if filter.assigned_only {
        let mut query = QueryBuilder::new("SELECT DISTINCT l.* FROM ");
        query.push(table.table());
        query.push(" l INNER JOIN ");
        query.push(table.link_table());
        query.push(" rl ON rl.");
        query.push(table.link_column());
        query.push(" = l.id INNER JOIN recipes r ON r.id = rl.recipe_id WHERE l.user_id = ");
        query.push_bind(filter.user_id);
        query.push(" AND r.user_id = ");
        query.push_bind(filter.user_id);
        query
    } else {
        let mut query = QueryBuilder::new("SELECT l.* FROM ");
        query.push(table.table());
        query.push(" l WHERE l.user_id = ");
        query.push_bind(filter.user_id);
        query
    };

    query.push(" ORDER BY l.name DESC");

    let labels = query.build_query_as::<T>().fetch_all(&mut *db).await?;

    Ok(labels)
}
