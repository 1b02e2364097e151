//! Rendering of specifications into SQLite statements

use nest_admin_core::specification::{Criteria, Queryable, Specification, Value};
use sqlx::{QueryBuilder, Sqlite};

/// Maps a queryable field to its column
pub type ColumnOf<F> = fn(F) -> &'static str;

fn like_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '%' | '_' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            c => out.push(c),
        }
    }
    out
}

fn like_contains(s: &str) -> String {
    format!("%{}%", like_escape(&s.to_lowercase()))
}

fn push_value(qb: &mut QueryBuilder<'_, Sqlite>, value: &Value) {
    match value {
        Value::Text(s) => qb.push_bind(s.clone()),
        Value::Uuid(u) => qb.push_bind(u.to_string()),
        Value::Int(i) => qb.push_bind(*i),
        Value::Bool(b) => qb.push_bind(*b),
    };
}

/// Append the boolean SQL expression for `criteria`
pub fn push_criteria<F: Copy>(
    qb: &mut QueryBuilder<'_, Sqlite>,
    criteria: &Criteria<F>,
    column: ColumnOf<F>,
) {
    match criteria {
        Criteria::All => {
            qb.push("1 = 1");
        }
        Criteria::Eq(field, value) => {
            qb.push(column(*field)).push(" = ");
            push_value(qb, value);
        }
        Criteria::Contains(field, text) => {
            qb.push("LOWER(")
                .push(column(*field))
                .push(") LIKE ");
            qb.push_bind(like_contains(text));
            qb.push(" ESCAPE '\\'");
        }
        Criteria::And(a, b) => {
            qb.push("(");
            push_criteria(qb, a, column);
            qb.push(" AND ");
            push_criteria(qb, b, column);
            qb.push(")");
        }
        Criteria::Or(a, b) => {
            qb.push("(");
            push_criteria(qb, a, column);
            qb.push(" OR ");
            push_criteria(qb, b, column);
            qb.push(")");
        }
        Criteria::Not(c) => {
            qb.push("NOT (");
            push_criteria(qb, c, column);
            qb.push(")");
        }
    }
}

/// `SELECT` for a full specification: filter, ordering and page window
pub fn select<E: Queryable>(
    table: &str,
    columns: &str,
    spec: &Specification<E>,
    column: ColumnOf<E::Field>,
) -> QueryBuilder<'static, Sqlite> {
    let mut qb = QueryBuilder::new(format!("SELECT {columns} FROM {table} WHERE "));
    push_criteria(&mut qb, spec.criteria(), column);

    qb.push(" ORDER BY ");
    let mut order = qb.separated(", ");
    for (field, dir) in spec.sort_keys() {
        order.push(format!("{} {}", column(field), dir.as_sql()));
    }

    if let Some(paging) = spec.paging() {
        qb.push(" LIMIT ");
        qb.push_bind(paging.take() as i64);
        qb.push(" OFFSET ");
        qb.push_bind(paging.skip() as i64);
    }
    qb
}

/// `SELECT COUNT(*)` over the criteria of a specification; paging is ignored
pub fn count<E: Queryable>(
    table: &str,
    spec: &Specification<E>,
    column: ColumnOf<E::Field>,
) -> QueryBuilder<'static, Sqlite> {
    let mut qb = QueryBuilder::new(format!("SELECT COUNT(*) FROM {table} WHERE "));
    push_criteria(&mut qb, spec.criteria(), column);
    qb
}

#[cfg(test)]
mod tests {
    use super::*;
    use nest_admin_core::establishment::{Establishment, EstablishmentField};
    use nest_admin_core::specification::{Field, SortDir};

    #[test]
    fn test_like_escape() {
        assert_eq!(like_contains("50%_Off\\"), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn test_select_sql() {
        let spec = Specification::<Establishment>::new(
            Criteria::contains(EstablishmentField::Name, "Inn")
                .and(Criteria::eq(EstablishmentField::Status, 1i64).negate()),
        )
        .ordered_by(EstablishmentField::Name, SortDir::Desc)
        .with_paging(2, 10)
        .unwrap();

        let qb = select("establishments", "id, name", &spec, EstablishmentField::name);
        assert_eq!(
            qb.sql(),
            "SELECT id, name FROM establishments WHERE (LOWER(name) LIKE ? ESCAPE '\\' AND NOT (status = ?)) \
             ORDER BY name DESC, id ASC LIMIT ? OFFSET ?"
        );

        let qb = count("establishments", &spec.without_paging(), EstablishmentField::name);
        assert!(qb.sql().starts_with("SELECT COUNT(*) FROM establishments WHERE ("));
    }

    #[test]
    fn test_all_renders_tautology() {
        let spec = Specification::<Establishment>::default();
        let qb = count("establishments", &spec, EstablishmentField::name);
        assert_eq!(qb.sql(), "SELECT COUNT(*) FROM establishments WHERE 1 = 1");
    }
}
