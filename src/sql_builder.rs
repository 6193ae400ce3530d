//! Parameterized SELECT construction for the query interfaces.
//!
//! Values always travel as `?` placeholders; only column and table names
//! (which come from this crate, never from callers) are interpolated.
//!
//! ```rust
//! use swachh_sdk::SqlBuilder;
//! let (sql, params) = SqlBuilder::new("reports")
//!     .select(&["id", "location"])
//!     .where_eq("user_id", "7")
//!     .order_by(&["created_at DESC"])
//!     .limit(10)
//!     .build();
//! assert_eq!(params, vec!["7"]);
//! assert!(sql.ends_with("LIMIT 10"));
//! ```

pub struct SqlBuilder {
    select_cols: Vec<String>,
    from_table: String,
    where_clauses: Vec<String>,
    params: Vec<String>,
    order_by_cols: Vec<String>,
    limit_val: Option<usize>,
}

impl SqlBuilder {
    /// Start a `SELECT *` against the given table.
    pub fn new(table: &str) -> Self {
        Self {
            select_cols: vec!["*".to_string()],
            from_table: table.to_string(),
            where_clauses: Vec::new(),
            params: Vec::new(),
            order_by_cols: Vec::new(),
            limit_val: None,
        }
    }

    /// Replace the selected columns.
    pub fn select(&mut self, cols: &[&str]) -> &mut Self {
        self.select_cols = cols.iter().map(|c| c.to_string()).collect();
        self
    }

    /// `{column} = ?`
    pub fn where_eq(&mut self, column: &str, value: &str) -> &mut Self {
        self.where_clauses.push(format!("{} = ?", column));
        self.params.push(value.to_string());
        self
    }

    /// `{column} = ?` for a BIGINT key.
    pub fn where_id(&mut self, column: &str, id: i64) -> &mut Self {
        self.where_clauses
            .push(format!("{} = CAST(? AS BIGINT)", column));
        self.params.push(id.to_string());
        self
    }

    /// Case-insensitive `{column} = ?`.
    pub fn where_eq_ignore_case(&mut self, column: &str, value: &str) -> &mut Self {
        self.where_clauses
            .push(format!("LOWER({}) = LOWER(?)", column));
        self.params.push(value.to_string());
        self
    }

    /// A literal condition without parameters, e.g. `"is_read = FALSE"`.
    pub fn where_raw(&mut self, condition: &str) -> &mut Self {
        self.where_clauses.push(condition.to_string());
        self
    }

    /// Timestamp lower bound (inclusive).
    pub fn created_since(&mut self, column: &str, ts: &str) -> &mut Self {
        self.where_clauses
            .push(format!("{} >= CAST(? AS TIMESTAMP)", column));
        self.params.push(ts.to_string());
        self
    }

    pub fn order_by(&mut self, clauses: &[&str]) -> &mut Self {
        self.order_by_cols
            .extend(clauses.iter().map(|c| c.to_string()));
        self
    }

    pub fn limit(&mut self, n: usize) -> &mut Self {
        self.limit_val = Some(n);
        self
    }

    /// Render the SQL string and its parameter list.
    pub fn build(&self) -> (String, Vec<String>) {
        let mut parts = vec![
            format!("SELECT {}", self.select_cols.join(", ")),
            format!("FROM {}", self.from_table),
        ];

        if !self.where_clauses.is_empty() {
            parts.push(format!("WHERE {}", self.where_clauses.join(" AND ")));
        }

        if !self.order_by_cols.is_empty() {
            parts.push(format!("ORDER BY {}", self.order_by_cols.join(", ")));
        }

        if let Some(n) = self.limit_val {
            parts.push(format!("LIMIT {}", n));
        }

        (parts.join("\n"), self.params.clone())
    }
}
