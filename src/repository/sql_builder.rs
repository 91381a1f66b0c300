// ==========================================
// App Granja - SQL builder
// ==========================================
// Fluent SELECT builder that keeps bind values next to their
// conditions, so optional batch/shed/date filters stay parameterized.
// ==========================================

use crate::domain::types::Scope;
use chrono::NaiveDate;

/// SQL query builder (fluent API)
///
/// # Example
/// ```
/// use app_granja::repository::sql_builder::SqlQueryBuilder;
///
/// let (sql, params) = SqlQueryBuilder::new("SELECT * FROM daily_tracking t")
///     .where_param("t.batch_id = ?", "b-1")
///     .and_if(Some("t.mortalidad > 0"))
///     .order_by("t.fecha_seguimiento")
///     .limit(10)
///     .build();
///
/// assert_eq!(
///     sql,
///     "SELECT * FROM daily_tracking t WHERE t.batch_id = ? AND t.mortalidad > 0 ORDER BY t.fecha_seguimiento LIMIT 10"
/// );
/// assert_eq!(params, vec!["b-1".to_string()]);
/// ```
#[derive(Debug, Clone)]
pub struct SqlQueryBuilder {
    select_clause: String,
    where_clauses: Vec<String>,
    params: Vec<String>,
    order_by_clause: Option<String>,
    limit_clause: Option<usize>,
}

impl SqlQueryBuilder {
    pub fn new(select: &str) -> Self {
        Self {
            select_clause: select.to_string(),
            where_clauses: Vec::new(),
            params: Vec::new(),
            order_by_clause: None,
            limit_clause: None,
        }
    }

    /// Condition without bind values
    pub fn where_clause(mut self, condition: &str) -> Self {
        self.where_clauses.push(condition.to_string());
        self
    }

    /// Condition with a single `?` placeholder
    pub fn where_param(mut self, condition: &str, value: impl Into<String>) -> Self {
        self.where_clauses.push(condition.to_string());
        self.params.push(value.into());
        self
    }

    /// Condition added only when present
    pub fn and_if(mut self, condition: Option<&str>) -> Self {
        if let Some(cond) = condition {
            self.where_clauses.push(cond.to_string());
        }
        self
    }

    /// Inclusive date range on `column` (stored as %Y-%m-%d text)
    pub fn date_between(self, column: &str, start: NaiveDate, end: NaiveDate) -> Self {
        self.where_param(&format!("{} >= ?", column), start.format("%Y-%m-%d").to_string())
            .where_param(&format!("{} <= ?", column), end.format("%Y-%m-%d").to_string())
    }

    /// Batch or shed filter; `batch_col` / `shed_col` are qualified column names
    pub fn scope(self, scope: &Scope, batch_col: &str, shed_col: &str) -> Self {
        match scope {
            Scope::Todos => self,
            Scope::Lote(id) => self.where_param(&format!("{} = ?", batch_col), id.clone()),
            Scope::Galpon(id) => self.where_param(&format!("{} = ?", shed_col), id.clone()),
        }
    }

    pub fn order_by(mut self, order: &str) -> Self {
        self.order_by_clause = Some(order.to_string());
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit_clause = Some(n);
        self
    }

    /// Final SQL plus its bind values, in placeholder order
    pub fn build(self) -> (String, Vec<String>) {
        let mut sql = self.select_clause;

        if !self.where_clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.where_clauses.join(" AND "));
        }

        if let Some(order) = self.order_by_clause {
            sql.push_str(" ORDER BY ");
            sql.push_str(&order);
        }

        if let Some(n) = self.limit_clause {
            sql.push_str(&format!(" LIMIT {}", n));
        }

        (sql, self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_and_dates() {
        let (sql, params) = SqlQueryBuilder::new("SELECT 1 FROM t")
            .date_between(
                "t.fecha",
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            )
            .scope(&Scope::Galpon("g-7".to_string()), "b.batch_id", "b.shed_id")
            .build();
        assert_eq!(
            sql,
            "SELECT 1 FROM t WHERE t.fecha >= ? AND t.fecha <= ? AND b.shed_id = ?"
        );
        assert_eq!(params, vec!["2024-01-01", "2024-01-31", "g-7"]);
    }

    #[test]
    fn test_scope_all_adds_nothing() {
        let (sql, params) = SqlQueryBuilder::new("SELECT 1 FROM t")
            .scope(&Scope::Todos, "b.batch_id", "b.shed_id")
            .build();
        assert_eq!(sql, "SELECT 1 FROM t");
        assert!(params.is_empty());
    }
}
