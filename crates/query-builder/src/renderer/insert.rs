use crate::{ast::insert::Insert, renderer::Render};

impl Render for Insert {
    fn render(&self, r: &mut super::Renderer) {
        // 1. INSERT INTO table (...)
        r.sql.push_str("INSERT INTO ");
        r.render_table_ref(&self.table);
        r.sql.push_str(" (");
        let quoted_columns: Vec<String> = self
            .columns
            .iter()
            .map(|c| r.dialect.quote_identifier(c))
            .collect();
        r.sql.push_str(&quoted_columns.join(", "));
        r.sql.push(')');

        // 2. VALUES (...)
        r.sql.push_str(" VALUES ");
        for (i, row) in self.values.iter().enumerate() {
            if i > 0 {
                r.sql.push_str(", ");
            }
            r.sql.push('(');
            for (j, val) in row.iter().enumerate() {
                if j > 0 {
                    r.sql.push_str(", ");
                }
                r.add_param(val.clone());
            }
            r.sql.push(')');
        }
        r.sql.push(';');
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        ast::insert::Insert,
        dialect::Postgres,
        renderer::{Render, Renderer},
    };
    use model::core::value::Value;

    #[test]
    fn test_render_batch_insert_postgres() {
        let ast = Insert::multi_row(
            "executive_monthly_reports",
            &["clinic".to_string(), "visits".to_string()],
            vec![
                vec![Value::String("Alpha".to_string()), Value::Float(120.0)],
                vec![Value::String("Beta".to_string()), Value::Null],
            ],
        );

        let dialect = Postgres;
        let mut renderer = Renderer::new(&dialect);
        ast.render(&mut renderer);
        let (sql, params) = renderer.finish();

        let expected_sql = concat!(
            "INSERT INTO \"executive_monthly_reports\" (\"clinic\", \"visits\") ",
            "VALUES ($1, $2), ($3, $4);"
        );
        assert_eq!(sql, expected_sql);
        assert_eq!(
            params,
            vec![
                Value::String("Alpha".to_string()),
                Value::Float(120.0),
                Value::String("Beta".to_string()),
                Value::Null,
            ]
        );
    }

    #[test]
    fn test_quote_characters_never_reach_the_statement_text() {
        // Regression for the interpolation defect: a value containing quote
        // characters and SQL metacharacters must travel as a bound parameter,
        // leaving the statement text untouched.
        let hostile = "Bob's'); DROP TABLE executive_monthly_reports; --";
        let ast = Insert::multi_row(
            "executive_monthly_reports",
            &["clinic".to_string()],
            vec![vec![Value::String(hostile.to_string())]],
        );

        let dialect = Postgres;
        let mut renderer = Renderer::new(&dialect);
        ast.render(&mut renderer);
        let (sql, params) = renderer.finish();

        assert_eq!(
            sql,
            "INSERT INTO \"executive_monthly_reports\" (\"clinic\") VALUES ($1);"
        );
        assert!(!sql.contains("DROP TABLE"));
        assert_eq!(params, vec![Value::String(hostile.to_string())]);
    }

    #[test]
    fn test_placeholder_numbering_spans_rows() {
        let ast = Insert::multi_row(
            "t",
            &["a".to_string()],
            vec![
                vec![Value::Int(1)],
                vec![Value::Int(2)],
                vec![Value::Int(3)],
            ],
        );

        let dialect = Postgres;
        let mut renderer = Renderer::new(&dialect);
        ast.render(&mut renderer);
        let (sql, _) = renderer.finish();

        assert_eq!(sql, "INSERT INTO \"t\" (\"a\") VALUES ($1), ($2), ($3);");
    }
}
